use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Credit score floor and ceiling
pub const MIN_CREDIT_SCORE: i32 = 300;
pub const MAX_CREDIT_SCORE: i32 = 850;

/// Score of a user with no installment history
pub const BASE_CREDIT_SCORE: i32 = 700;

/// Coarse creditworthiness bucket driving eligibility and base interest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

/// Loyalty bucket driving an interest discount, orthogonal to risk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VipTier {
    None,
    Gold,
    Platinum,
}

impl VipTier {
    /// Percentage points subtracted from the base annual interest
    pub fn interest_discount(&self) -> Decimal {
        match self {
            VipTier::Platinum => Decimal::from(2),
            VipTier::Gold => Decimal::ONE,
            VipTier::None => Decimal::ZERO,
        }
    }
}

/// Risk tier thresholds: LOW >= 750, MEDIUM >= 650, else HIGH
pub fn risk_tier_for(score: i32) -> RiskTier {
    if score >= 750 {
        RiskTier::Low
    } else if score >= 650 {
        RiskTier::Medium
    } else {
        RiskTier::High
    }
}

/// VIP tier thresholds: PLATINUM >= 780, GOLD >= 720, else NONE
pub fn vip_tier_for(score: i32) -> VipTier {
    if score >= 780 {
        VipTier::Platinum
    } else if score >= 720 {
        VipTier::Gold
    } else {
        VipTier::None
    }
}

/// Maximum loan amount per score band
pub fn loan_limit_for(score: i32) -> Decimal {
    if score >= 750 {
        Decimal::from(1_000_000)
    } else if score >= 700 {
        Decimal::from(500_000)
    } else if score >= 650 {
        Decimal::from(200_000)
    } else {
        Decimal::from(50_000)
    }
}

/// Base annual interest (percent) per score band, before the VIP discount
pub fn base_interest_for(score: i32) -> Decimal {
    if score >= 750 {
        Decimal::from(8)
    } else if score >= 700 {
        Decimal::from(10)
    } else if score >= 650 {
        Decimal::from(12)
    } else {
        Decimal::from(15)
    }
}

/// Annual interest after the VIP discount, both derived from the same score
pub fn dynamic_interest_for(score: i32) -> Decimal {
    base_interest_for(score) - vip_tier_for(score).interest_discount()
}

/// Read-only eligibility report
///
/// The `eligible` flag here reflects risk tier only and deliberately ignores
/// any requested amount; the apply path uses the stricter amount-aware check.
#[derive(Debug, Clone, Serialize)]
pub struct EligibilityReport {
    pub credit_score: i32,
    pub risk_tier: RiskTier,
    pub max_eligible_amount: Decimal,
    pub eligible: bool,
}

/// Advisory loan recommendation, offered even to HIGH-risk users
#[derive(Debug, Clone, Serialize)]
pub struct LoanRecommendation {
    pub credit_score: i32,
    pub risk_tier: RiskTier,
    pub vip_tier: VipTier,
    pub recommended_amount: Decimal,
    pub expected_interest: Decimal,
}

/// Suggested amount as a share of the limit: LOW 100%, MEDIUM 70%, HIGH 40%
pub fn recommended_amount_for(score: i32) -> Decimal {
    let limit = loan_limit_for(score);
    match risk_tier_for(score) {
        RiskTier::Low => limit,
        RiskTier::Medium => limit * Decimal::new(7, 1),
        RiskTier::High => limit * Decimal::new(4, 1),
    }
}
