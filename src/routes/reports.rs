use actix_web::web;

use crate::handlers::reports;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/reports")
            .route("/weekly", web::get().to(reports::get_weekly_report))
            .route("/monthly", web::get().to(reports::get_monthly_report)),
    );
}
