pub mod loan_admin_controller;
pub mod loan_controller;

use actix_web::web;

/// Wire the loan routes into the application
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users/{user_id}")
            .route("/loans", web::post().to(loan_controller::apply_loan))
            .route("/loans", web::get().to(loan_controller::get_user_loans))
            .route(
                "/loans/outstanding",
                web::get().to(loan_controller::total_outstanding),
            )
            .route(
                "/loans/overdue",
                web::get().to(loan_controller::get_overdue_emis),
            )
            .route(
                "/loans/{loan_id}/schedule",
                web::get().to(loan_controller::get_emi_schedule),
            )
            .route(
                "/loans/{loan_id}/repay",
                web::post().to(loan_controller::repay_loan),
            )
            .route(
                "/loans/{loan_id}/preclose",
                web::post().to(loan_controller::pre_close_loan),
            )
            .route(
                "/credit-score",
                web::get().to(loan_controller::get_credit_score),
            )
            .route(
                "/loan-eligibility",
                web::get().to(loan_controller::check_eligibility),
            )
            .route(
                "/loan-recommendation",
                web::get().to(loan_controller::loan_recommendation),
            ),
    )
    .service(
        web::scope("/admin")
            .route(
                "/loans/{loan_id}/decision",
                web::post().to(loan_admin_controller::decide_loan),
            )
            .route("/loans", web::get().to(loan_admin_controller::get_all_loans))
            .route(
                "/loans/overdue-sweep",
                web::post().to(loan_admin_controller::run_overdue_sweep),
            ),
    );
}
