//! User-facing loan endpoints
//!
//! Routes:
//! - POST /users/{user_id}/loans                    : apply for a loan
//! - GET  /users/{user_id}/loans                    : list own loans
//! - GET  /users/{user_id}/loans/outstanding        : total outstanding balance
//! - GET  /users/{user_id}/loans/overdue            : past-due pending EMIs
//! - GET  /users/{user_id}/loans/{loan_id}/schedule : EMI schedule (owner only)
//! - POST /users/{user_id}/loans/{loan_id}/repay    : pay the next EMI
//! - POST /users/{user_id}/loans/{loan_id}/preclose : settle early with fee
//! - GET  /users/{user_id}/credit-score             : raw credit score
//! - GET  /users/{user_id}/loan-eligibility         : risk-only report
//! - GET  /users/{user_id}/loan-recommendation      : advisory amount and rate

use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::core::Result;
use crate::modules::loans::models::{Loan, LoanInstallment};
use crate::modules::loans::services::{LoanApplication, LoanService, RepaymentReceipt};

/// Loan representation returned by the API
#[derive(Debug, Serialize)]
pub struct LoanResponse {
    pub id: String,
    pub user_id: String,
    pub amount: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interest_rate: Option<String>,
    pub tenure_months: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emi_amount: Option<String>,
    pub remaining_amount: String,
    pub purpose: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

impl From<Loan> for LoanResponse {
    fn from(loan: Loan) -> Self {
        Self {
            id: loan.id,
            user_id: loan.user_id,
            amount: loan.amount.to_string(),
            interest_rate: loan.interest_rate.map(|r| r.to_string()),
            tenure_months: loan.tenure_months,
            emi_amount: loan.emi_amount.map(|e| e.to_string()),
            remaining_amount: loan.remaining_amount.to_string(),
            purpose: loan.purpose,
            status: loan.status.to_string(),
            start_date: loan.start_date.map(|d| d.to_string()),
            end_date: loan.end_date.map(|d| d.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InstallmentResponse {
    pub id: String,
    pub installment_number: u32,
    pub amount: String,
    pub due_date: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<String>,
}

impl From<LoanInstallment> for InstallmentResponse {
    fn from(installment: LoanInstallment) -> Self {
        Self {
            id: installment.id,
            installment_number: installment.installment_number,
            amount: installment.amount.to_string(),
            due_date: installment.due_date.to_string(),
            status: installment.status.to_string(),
            paid_at: installment.paid_at.map(|t| t.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RepaymentResponse {
    pub loan_id: String,
    pub installment_number: u32,
    pub amount_paid: String,
    pub penalty_applied: bool,
    pub remaining_amount: String,
    pub loan_closed: bool,
}

impl From<RepaymentReceipt> for RepaymentResponse {
    fn from(receipt: RepaymentReceipt) -> Self {
        Self {
            loan_id: receipt.loan_id,
            installment_number: receipt.installment_number,
            amount_paid: receipt.amount_paid.to_string(),
            penalty_applied: receipt.penalty_applied,
            remaining_amount: receipt.remaining_amount.to_string(),
            loan_closed: receipt.loan_closed,
        }
    }
}

/// POST /users/{user_id}/loans
pub async fn apply_loan(
    user_id: web::Path<String>,
    request: web::Json<LoanApplication>,
    service: web::Data<LoanService>,
) -> Result<HttpResponse> {
    let loan = service.apply(&user_id, request.into_inner()).await?;

    Ok(HttpResponse::Created().json(LoanResponse::from(loan)))
}

/// GET /users/{user_id}/loans
pub async fn get_user_loans(
    user_id: web::Path<String>,
    service: web::Data<LoanService>,
) -> Result<HttpResponse> {
    let loans = service.get_user_loans(&user_id).await?;

    Ok(HttpResponse::Ok().json(
        loans
            .into_iter()
            .map(LoanResponse::from)
            .collect::<Vec<_>>(),
    ))
}

/// GET /users/{user_id}/loans/outstanding
pub async fn total_outstanding(
    user_id: web::Path<String>,
    service: web::Data<LoanService>,
) -> Result<HttpResponse> {
    let total = service.total_outstanding(&user_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "user_id": user_id.into_inner(),
        "total_outstanding": total.to_string(),
    })))
}

/// GET /users/{user_id}/loans/overdue
pub async fn get_overdue_emis(
    user_id: web::Path<String>,
    service: web::Data<LoanService>,
) -> Result<HttpResponse> {
    let installments = service.get_overdue_emis(&user_id).await?;

    Ok(HttpResponse::Ok().json(
        installments
            .into_iter()
            .map(InstallmentResponse::from)
            .collect::<Vec<_>>(),
    ))
}

/// GET /users/{user_id}/credit-score
pub async fn get_credit_score(
    user_id: web::Path<String>,
    service: web::Data<LoanService>,
) -> Result<HttpResponse> {
    let score = service.credit().calculate_credit_score(&user_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "user_id": user_id.into_inner(),
        "credit_score": score,
    })))
}

/// GET /users/{user_id}/loans/{loan_id}/schedule
pub async fn get_emi_schedule(
    path: web::Path<(String, String)>,
    service: web::Data<LoanService>,
) -> Result<HttpResponse> {
    let (user_id, loan_id) = path.into_inner();

    let installments = service.get_emi_schedule(&user_id, &loan_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "loan_id": loan_id,
        "installments": installments
            .into_iter()
            .map(InstallmentResponse::from)
            .collect::<Vec<_>>(),
    })))
}

/// POST /users/{user_id}/loans/{loan_id}/repay
pub async fn repay_loan(
    path: web::Path<(String, String)>,
    service: web::Data<LoanService>,
) -> Result<HttpResponse> {
    let (user_id, loan_id) = path.into_inner();

    let receipt = service.repay(&user_id, &loan_id).await?;

    Ok(HttpResponse::Ok().json(RepaymentResponse::from(receipt)))
}

/// POST /users/{user_id}/loans/{loan_id}/preclose
pub async fn pre_close_loan(
    path: web::Path<(String, String)>,
    service: web::Data<LoanService>,
) -> Result<HttpResponse> {
    let (user_id, loan_id) = path.into_inner();

    let loan = service.pre_close(&user_id, &loan_id).await?;

    Ok(HttpResponse::Ok().json(LoanResponse::from(loan)))
}

/// GET /users/{user_id}/loan-eligibility
pub async fn check_eligibility(
    user_id: web::Path<String>,
    service: web::Data<LoanService>,
) -> Result<HttpResponse> {
    let report = service.check_eligibility(&user_id).await?;

    Ok(HttpResponse::Ok().json(report))
}

/// GET /users/{user_id}/loan-recommendation
pub async fn loan_recommendation(
    user_id: web::Path<String>,
    service: web::Data<LoanService>,
) -> Result<HttpResponse> {
    let recommendation = service.loan_recommendation(&user_id).await?;

    Ok(HttpResponse::Ok().json(recommendation))
}
