use actix_web::web;

use crate::handlers::work_records;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/work-records")
            .route("", web::post().to(work_records::create_work_record))
            .route("", web::get().to(work_records::get_work_records))
            .route(
                "/by-month",
                web::get().to(work_records::get_work_records_by_month),
            )
            .route(
                "/by-salary/{id}",
                web::get().to(work_records::get_work_records_by_salary),
            )
            .route("/{id}", web::get().to(work_records::get_work_record))
            .route("/{id}", web::put().to(work_records::update_work_record))
            .route("/{id}", web::delete().to(work_records::delete_work_record)),
    );
}
