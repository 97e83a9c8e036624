use actix_web::web;

pub mod reports;
pub mod salaries;
pub mod work_records;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(work_records::configure)
            .configure(salaries::configure)
            .configure(reports::configure),
    );
}
