//! Admin loan endpoints
//!
//! Routes:
//! - POST /admin/loans/{loan_id}/decision : approve or reject an application
//! - GET  /admin/loans                    : list all loans
//! - POST /admin/loans/overdue-sweep      : trigger the sweep out of schedule

use actix_web::{web, HttpResponse};

use crate::core::Result;
use crate::modules::loans::controllers::loan_controller::LoanResponse;
use crate::modules::loans::services::{LoanDecision, LoanService, OverdueSweeper};

/// POST /admin/loans/{loan_id}/decision
pub async fn decide_loan(
    loan_id: web::Path<String>,
    request: web::Json<LoanDecision>,
    service: web::Data<LoanService>,
) -> Result<HttpResponse> {
    let loan = service.decide(&loan_id, request.into_inner()).await?;

    Ok(HttpResponse::Ok().json(LoanResponse::from(loan)))
}

/// GET /admin/loans
pub async fn get_all_loans(service: web::Data<LoanService>) -> Result<HttpResponse> {
    let loans = service.get_all_loans().await?;

    Ok(HttpResponse::Ok().json(
        loans
            .into_iter()
            .map(LoanResponse::from)
            .collect::<Vec<_>>(),
    ))
}

/// POST /admin/loans/overdue-sweep
pub async fn run_overdue_sweep(sweeper: web::Data<OverdueSweeper>) -> Result<HttpResponse> {
    let summary = sweeper.run_overdue_sweep().await?;

    Ok(HttpResponse::Ok().json(summary))
}
