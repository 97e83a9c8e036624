use actix_web::web;

use crate::handlers::salaries;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/salaries")
            .route("/calculate", web::post().to(salaries::calculate_salary))
            .route(
                "/calculate-all",
                web::post().to(salaries::calculate_salary_for_all),
            )
            .route("", web::get().to(salaries::get_salaries))
            .route("/{id}", web::get().to(salaries::get_salary))
            .route(
                "/{id}/allowances",
                web::put().to(salaries::update_allowances),
            )
            .route("/{id}/pay", web::post().to(salaries::pay_salary))
            .route("/{id}", web::delete().to(salaries::delete_salary)),
    );
}
