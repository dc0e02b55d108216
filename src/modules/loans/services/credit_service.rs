use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::core::Result;
use crate::modules::loans::models::{
    dynamic_interest_for, loan_limit_for, recommended_amount_for, risk_tier_for, vip_tier_for,
    EligibilityReport, InstallmentStatus, LoanRecommendation, RiskTier, VipTier,
    BASE_CREDIT_SCORE, MAX_CREDIT_SCORE, MIN_CREDIT_SCORE,
};
use crate::modules::loans::repositories::InstallmentRepository;

/// Credit scoring, tiering, and eligibility over a user's installment history
///
/// Read-only: every operation derives everything from a single score read so
/// the risk and VIP classifications can never disagree between call sites.
pub struct CreditService {
    installments: Arc<dyn InstallmentRepository>,
}

impl CreditService {
    pub fn new(installments: Arc<dyn InstallmentRepository>) -> Self {
        Self { installments }
    }

    /// `700 + 2*paid - 5*overdue`, clamped to [300, 850]
    ///
    /// Intentionally history-length-insensitive: a user with no installments
    /// scores exactly 700.
    pub async fn calculate_credit_score(&self, user_id: &str) -> Result<i32> {
        let installments = self.installments.find_by_user(user_id).await?;

        let mut paid = 0i32;
        let mut overdue = 0i32;
        for installment in &installments {
            match installment.status {
                InstallmentStatus::Paid => paid += 1,
                InstallmentStatus::Overdue => overdue += 1,
                InstallmentStatus::Pending => {}
            }
        }

        let score =
            (BASE_CREDIT_SCORE + 2 * paid - 5 * overdue).clamp(MIN_CREDIT_SCORE, MAX_CREDIT_SCORE);

        debug!(user_id, paid, overdue, score, "credit score computed");

        Ok(score)
    }

    pub async fn risk_tier(&self, user_id: &str) -> Result<RiskTier> {
        Ok(risk_tier_for(self.calculate_credit_score(user_id).await?))
    }

    pub async fn vip_tier(&self, user_id: &str) -> Result<VipTier> {
        Ok(vip_tier_for(self.calculate_credit_score(user_id).await?))
    }

    pub async fn loan_limit(&self, user_id: &str) -> Result<Decimal> {
        Ok(loan_limit_for(self.calculate_credit_score(user_id).await?))
    }

    /// Base interest for the score band minus the VIP discount
    pub async fn dynamic_interest(&self, user_id: &str) -> Result<Decimal> {
        let score = self.calculate_credit_score(user_id).await?;
        let interest = dynamic_interest_for(score);

        debug!(user_id, score, interest = %interest, "dynamic interest resolved");

        Ok(interest)
    }

    /// The strict check used by the apply path: HIGH risk is always
    /// ineligible, otherwise the requested amount must fit the limit
    pub async fn is_eligible_for_loan(&self, user_id: &str, requested: Decimal) -> Result<bool> {
        let score = self.calculate_credit_score(user_id).await?;

        if risk_tier_for(score) == RiskTier::High {
            warn!(user_id, score, "high-risk user, loan not eligible");
            return Ok(false);
        }

        let limit = loan_limit_for(score);
        let eligible = requested <= limit;

        debug!(
            user_id, score, requested = %requested, limit = %limit, eligible,
            "amount eligibility checked"
        );

        Ok(eligible)
    }

    /// The looser report used by the eligibility endpoint: the flag reflects
    /// risk tier only and ignores any requested amount. This diverges from
    /// `is_eligible_for_loan` on purpose; both semantics are load-bearing.
    pub async fn check_eligibility(&self, user_id: &str) -> Result<EligibilityReport> {
        let score = self.calculate_credit_score(user_id).await?;
        let risk = risk_tier_for(score);

        Ok(EligibilityReport {
            credit_score: score,
            risk_tier: risk,
            max_eligible_amount: loan_limit_for(score),
            eligible: risk != RiskTier::High,
        })
    }

    /// Advisory amount and expected rate; offered even to HIGH-risk users
    pub async fn loan_recommendation(&self, user_id: &str) -> Result<LoanRecommendation> {
        let score = self.calculate_credit_score(user_id).await?;

        let recommendation = LoanRecommendation {
            credit_score: score,
            risk_tier: risk_tier_for(score),
            vip_tier: vip_tier_for(score),
            recommended_amount: recommended_amount_for(score),
            expected_interest: dynamic_interest_for(score),
        };

        info!(
            user_id,
            score,
            recommended = %recommendation.recommended_amount,
            "loan recommendation generated"
        );

        Ok(recommendation)
    }
}
