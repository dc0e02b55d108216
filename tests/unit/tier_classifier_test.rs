#[path = "../helpers/mod.rs"]
mod helpers;

use rust_decimal_macros::dec;

use helpers::test_world;
use revpay::modules::loans::models::{RiskTier, VipTier};

#[tokio::test]
async fn test_spotless_history_reaches_low_risk() {
    let world = test_world();
    // 700 + 2*25 = 750, the LOW boundary
    world.store.seed_history("u1", 25, 0);

    let credit = world.service.credit();
    assert_eq!(credit.risk_tier("u1").await.unwrap(), RiskTier::Low);
    assert_eq!(credit.vip_tier("u1").await.unwrap(), VipTier::Gold);
    assert_eq!(credit.loan_limit("u1").await.unwrap(), dec!(1000000));
    // 8% base for LOW, minus the 1% GOLD discount
    assert_eq!(credit.dynamic_interest("u1").await.unwrap(), dec!(7));
}

#[tokio::test]
async fn test_long_clean_history_reaches_platinum() {
    let world = test_world();
    // 700 + 2*40 = 780, the PLATINUM boundary
    world.store.seed_history("u1", 40, 0);

    let credit = world.service.credit();
    assert_eq!(credit.risk_tier("u1").await.unwrap(), RiskTier::Low);
    assert_eq!(credit.vip_tier("u1").await.unwrap(), VipTier::Platinum);
    // 8% base minus the 2% PLATINUM discount
    assert_eq!(credit.dynamic_interest("u1").await.unwrap(), dec!(6));
}

#[tokio::test]
async fn test_new_user_lands_in_medium() {
    let world = test_world();

    let credit = world.service.credit();
    assert_eq!(credit.risk_tier("u1").await.unwrap(), RiskTier::Medium);
    assert_eq!(credit.vip_tier("u1").await.unwrap(), VipTier::None);
    assert_eq!(credit.loan_limit("u1").await.unwrap(), dec!(500000));
    assert_eq!(credit.dynamic_interest("u1").await.unwrap(), dec!(10));
}

#[tokio::test]
async fn test_overdue_history_drops_to_medium_floor() {
    let world = test_world();
    // 700 - 5*10 = 650, the MEDIUM boundary
    world.store.seed_history("u1", 0, 10);

    let credit = world.service.credit();
    assert_eq!(credit.risk_tier("u1").await.unwrap(), RiskTier::Medium);
    assert_eq!(credit.loan_limit("u1").await.unwrap(), dec!(200000));
    assert_eq!(credit.dynamic_interest("u1").await.unwrap(), dec!(12));
}

#[tokio::test]
async fn test_one_more_overdue_tips_into_high() {
    let world = test_world();
    // 700 - 5*11 = 645
    world.store.seed_history("u1", 0, 11);

    let credit = world.service.credit();
    assert_eq!(credit.risk_tier("u1").await.unwrap(), RiskTier::High);
    assert_eq!(credit.vip_tier("u1").await.unwrap(), VipTier::None);
    assert_eq!(credit.loan_limit("u1").await.unwrap(), dec!(50000));
    assert_eq!(credit.dynamic_interest("u1").await.unwrap(), dec!(15));
}

#[tokio::test]
async fn test_risk_and_vip_derive_from_the_same_score() {
    let world = test_world();
    // 700 + 2*10 = 720: GOLD while still MEDIUM risk
    world.store.seed_history("u1", 10, 0);

    let credit = world.service.credit();
    assert_eq!(credit.risk_tier("u1").await.unwrap(), RiskTier::Medium);
    assert_eq!(credit.vip_tier("u1").await.unwrap(), VipTier::Gold);
    // 10% base for MEDIUM minus the 1% GOLD discount
    assert_eq!(credit.dynamic_interest("u1").await.unwrap(), dec!(9));
}
