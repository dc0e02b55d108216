#[path = "../helpers/mod.rs"]
mod helpers;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use helpers::{test_world, TestWorld};
use revpay::core::AppError;
use revpay::modules::loans::models::{InstallmentStatus, Loan, LoanStatus};
use revpay::modules::loans::services::{EmiCalculator, LoanApplication, LoanDecision};
use revpay::modules::users::Role;

const OWNER: &str = "merchant-1";

fn open_business_account(world: &TestWorld, user_id: &str, balance: Decimal) {
    world.users.add_user(user_id, Role::Business);
    world.ledger.open_wallet(user_id, balance);
}

fn application(amount: Decimal, tenure_months: u32) -> LoanApplication {
    LoanApplication {
        amount,
        tenure_months,
        purpose: "inventory restock".to_string(),
    }
}

fn approval(rate: Decimal) -> LoanDecision {
    LoanDecision {
        approved: true,
        interest_rate: Some(rate),
    }
}

async fn approved_loan(world: &TestWorld, user_id: &str) -> Loan {
    let loan = world
        .service
        .apply(user_id, application(dec!(50000), 12))
        .await
        .unwrap();
    world
        .service
        .decide(&loan.id, approval(dec!(10)))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_application_starts_in_applied() {
    let world = test_world();
    open_business_account(&world, OWNER, dec!(0));

    let loan = world
        .service
        .apply(OWNER, application(dec!(50000), 12))
        .await
        .unwrap();

    assert_eq!(loan.status, LoanStatus::Applied);
    assert_eq!(loan.remaining_amount, dec!(50000));
    assert!(loan.interest_rate.is_none());
    assert!(loan.emi_amount.is_none());
    assert_eq!(world.notifications.count_for(OWNER), 1);
}

#[tokio::test]
async fn test_personal_accounts_cannot_apply() {
    let world = test_world();
    world.users.add_user("shopper", Role::Personal);

    let err = world
        .service
        .apply("shopper", application(dec!(10000), 6))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Forbidden(_)));
    assert!(world.service.get_user_loans("shopper").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_user_cannot_apply() {
    let world = test_world();

    let err = world
        .service
        .apply("ghost", application(dec!(10000), 6))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_ineligible_amount_persists_nothing() {
    let world = test_world();
    open_business_account(&world, OWNER, dec!(0));

    // New user score is 700; the limit for that band is 500,000
    let err = world
        .service
        .apply(OWNER, application(dec!(600000), 24))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Domain(_)));
    assert!(world.service.get_user_loans(OWNER).await.unwrap().is_empty());
    // No application notification either
    assert_eq!(world.notifications.count_for(OWNER), 0);
}

#[tokio::test]
async fn test_high_risk_user_cannot_apply_at_all() {
    let world = test_world();
    open_business_account(&world, OWNER, dec!(0));
    // 700 - 5*11 = 645, HIGH risk
    world.store.seed_history(OWNER, 0, 11);

    let err = world
        .service
        .apply(OWNER, application(dec!(1000), 6))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Domain(_)));
}

#[tokio::test]
async fn test_approval_disburses_and_schedules() {
    let world = test_world();
    open_business_account(&world, OWNER, dec!(1000));

    let loan = approved_loan(&world, OWNER).await;
    let emi = EmiCalculator::calculate_emi(dec!(50000), dec!(10), 12).unwrap();

    assert_eq!(loan.status, LoanStatus::Active);
    assert_eq!(loan.interest_rate, Some(dec!(10)));
    assert_eq!(loan.emi_amount, Some(emi));
    assert!(loan.start_date.is_some());

    // Disbursement landed in the wallet
    assert_eq!(world.ledger.balance(OWNER), dec!(51000));

    // Exactly tenure_months installments, all pending, due monthly starting
    // one month after approval
    let schedule = world.store.installments_of(&loan.id);
    assert_eq!(schedule.len(), 12);

    let start = loan.start_date.unwrap();
    for (index, installment) in schedule.iter().enumerate() {
        assert_eq!(installment.installment_number, (index + 1) as u32);
        assert_eq!(installment.status, InstallmentStatus::Pending);
        assert_eq!(installment.amount, emi);
        assert_eq!(
            installment.due_date,
            start
                .checked_add_months(chrono::Months::new((index + 1) as u32))
                .unwrap()
        );
    }
}

#[tokio::test]
async fn test_rejection_is_terminal() {
    let world = test_world();
    open_business_account(&world, OWNER, dec!(0));

    let loan = world
        .service
        .apply(OWNER, application(dec!(50000), 12))
        .await
        .unwrap();

    let rejected = world
        .service
        .decide(
            &loan.id,
            LoanDecision {
                approved: false,
                interest_rate: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(rejected.status, LoanStatus::Rejected);
    assert!(world.store.installments_of(&loan.id).is_empty());
    // No disbursement happened
    assert_eq!(world.ledger.balance(OWNER), dec!(0));

    // A rejected loan cannot be decided again
    let err = world
        .service
        .decide(&loan.id, approval(dec!(10)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Domain(_)));
}

#[tokio::test]
async fn test_approval_without_override_uses_dynamic_rate() {
    let world = test_world();
    open_business_account(&world, OWNER, dec!(0));

    let loan = world
        .service
        .apply(OWNER, application(dec!(50000), 12))
        .await
        .unwrap();

    let active = world
        .service
        .decide(
            &loan.id,
            LoanDecision {
                approved: true,
                interest_rate: None,
            },
        )
        .await
        .unwrap();

    // Score 700: 10% base, no VIP discount
    assert_eq!(active.interest_rate, Some(dec!(10)));
}

#[tokio::test]
async fn test_negative_rate_override_is_refused() {
    let world = test_world();
    open_business_account(&world, OWNER, dec!(0));

    let loan = world
        .service
        .apply(OWNER, application(dec!(50000), 12))
        .await
        .unwrap();

    let err = world
        .service
        .decide(&loan.id, approval(dec!(-1)))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Domain(_)));
    assert_eq!(world.store.loan(&loan.id).unwrap().status, LoanStatus::Applied);
}

#[tokio::test]
async fn test_failed_disbursement_leaves_loan_applied() {
    let world = test_world();
    // User exists but never opened a wallet, so the ledger credit fails
    world.users.add_user(OWNER, Role::Business);

    let loan = world
        .service
        .apply(OWNER, application(dec!(50000), 12))
        .await
        .unwrap();

    let err = world
        .service
        .decide(&loan.id, approval(dec!(10)))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(world.store.loan(&loan.id).unwrap().status, LoanStatus::Applied);
    assert!(world.store.installments_of(&loan.id).is_empty());
}

#[tokio::test]
async fn test_failed_activation_reverses_the_disbursement() {
    let world = test_world();
    open_business_account(&world, OWNER, dec!(1000));

    let loan = world
        .service
        .apply(OWNER, application(dec!(50000), 12))
        .await
        .unwrap();

    world.store.fail_next_activate();
    let err = world
        .service
        .decide(&loan.id, approval(dec!(10)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Internal(_)));

    // The compensating debit took the disbursement back out
    assert_eq!(world.ledger.balance(OWNER), dec!(1000));
    assert!(world
        .ledger
        .entries()
        .iter()
        .any(|e| e.memo == "Loan Disbursement Reversal"));

    assert_eq!(world.store.loan(&loan.id).unwrap().status, LoanStatus::Applied);
    assert!(world.store.installments_of(&loan.id).is_empty());

    // Retrying once the store recovers succeeds normally
    let active = world
        .service
        .decide(&loan.id, approval(dec!(10)))
        .await
        .unwrap();
    assert_eq!(active.status, LoanStatus::Active);
    assert_eq!(world.ledger.balance(OWNER), dec!(51000));
}

#[tokio::test]
async fn test_repayment_settles_first_installment() {
    let world = test_world();
    open_business_account(&world, OWNER, dec!(1000));

    let loan = approved_loan(&world, OWNER).await;
    let emi = loan.emi_amount.unwrap();
    let balance_before = world.ledger.balance(OWNER);

    let receipt = world.service.repay(OWNER, &loan.id).await.unwrap();

    assert_eq!(receipt.installment_number, 1);
    assert_eq!(receipt.amount_paid, emi);
    assert!(!receipt.penalty_applied);
    assert_eq!(receipt.remaining_amount, dec!(50000) - emi);
    assert!(!receipt.loan_closed);

    assert_eq!(world.ledger.balance(OWNER), balance_before - emi);

    let schedule = world.store.installments_of(&loan.id);
    assert_eq!(schedule[0].status, InstallmentStatus::Paid);
    assert!(schedule[0].paid_at.is_some());
    assert_eq!(schedule[1].status, InstallmentStatus::Pending);
}

#[tokio::test]
async fn test_repaying_every_installment_closes_the_loan() {
    let world = test_world();
    open_business_account(&world, OWNER, dec!(10000));

    let loan = approved_loan(&world, OWNER).await;

    for round in 1..=12u32 {
        let receipt = world.service.repay(OWNER, &loan.id).await.unwrap();
        assert_eq!(receipt.installment_number, round);
        assert_eq!(receipt.loan_closed, round == 12);
    }

    let closed = world.store.loan(&loan.id).unwrap();
    assert_eq!(closed.status, LoanStatus::Closed);
    assert_eq!(closed.remaining_amount, Decimal::ZERO);

    // A closed loan refuses further repayments
    let err = world.service.repay(OWNER, &loan.id).await.unwrap_err();
    assert!(matches!(err, AppError::Domain(_)));
}

#[tokio::test]
async fn test_only_the_owner_may_repay_or_view() {
    let world = test_world();
    open_business_account(&world, OWNER, dec!(1000));
    open_business_account(&world, "merchant-2", dec!(100000));

    let loan = approved_loan(&world, OWNER).await;

    let err = world.service.repay("merchant-2", &loan.id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = world
        .service
        .get_emi_schedule("merchant-2", &loan.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let schedule = world.service.get_emi_schedule(OWNER, &loan.id).await.unwrap();
    assert_eq!(schedule.len(), 12);
}

#[tokio::test]
async fn test_repaying_unknown_loan_is_not_found() {
    let world = test_world();
    open_business_account(&world, OWNER, dec!(1000));

    let err = world.service.repay(OWNER, "no-such-loan").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_insufficient_funds_leaves_installment_untouched() {
    let world = test_world();
    open_business_account(&world, OWNER, dec!(0));

    let loan = approved_loan(&world, OWNER).await;
    // Drain the wallet below one EMI
    world.ledger.open_wallet(OWNER, dec!(100));

    let err = world.service.repay(OWNER, &loan.id).await.unwrap_err();
    assert!(matches!(err, AppError::InsufficientFunds(_)));

    let schedule = world.store.installments_of(&loan.id);
    assert_eq!(schedule[0].status, InstallmentStatus::Pending);
    assert_eq!(
        world.store.loan(&loan.id).unwrap().remaining_amount,
        dec!(50000)
    );
    assert_eq!(world.ledger.balance(OWNER), dec!(100));
}

#[tokio::test]
async fn test_failed_settlement_reverses_the_debit() {
    let world = test_world();
    open_business_account(&world, OWNER, dec!(1000));

    let loan = approved_loan(&world, OWNER).await;
    let balance_before = world.ledger.balance(OWNER);

    world.store.fail_next_settle();
    let err = world.service.repay(OWNER, &loan.id).await.unwrap_err();
    assert!(matches!(err, AppError::Internal(_)));

    // The compensating credit restored the wallet
    assert_eq!(world.ledger.balance(OWNER), balance_before);
    assert!(world
        .ledger
        .entries()
        .iter()
        .any(|e| e.memo == "EMI Payment Reversal"));

    let schedule = world.store.installments_of(&loan.id);
    assert_eq!(schedule[0].status, InstallmentStatus::Pending);
}

#[tokio::test]
async fn test_pre_closure_charges_two_percent_on_the_balance() {
    let world = test_world();
    open_business_account(&world, OWNER, dec!(10000));

    let loan = approved_loan(&world, OWNER).await;
    // One regular payment first, so the fee applies to a reduced balance
    let receipt = world.service.repay(OWNER, &loan.id).await.unwrap();

    let remaining = receipt.remaining_amount;
    let fee = (remaining * dec!(0.02)).round_dp(2);
    let balance_before = world.ledger.balance(OWNER);

    let closed = world.service.pre_close(OWNER, &loan.id).await.unwrap();

    assert_eq!(closed.status, LoanStatus::Closed);
    assert_eq!(closed.remaining_amount, Decimal::ZERO);
    assert_eq!(world.ledger.balance(OWNER), balance_before - remaining - fee);
    assert!(world
        .ledger
        .entries()
        .iter()
        .any(|e| e.memo == "Loan Pre-closure"));
}

#[tokio::test]
async fn test_pre_closure_requires_funds_for_balance_plus_fee() {
    let world = test_world();
    open_business_account(&world, OWNER, dec!(0));

    let loan = approved_loan(&world, OWNER).await;
    // Exactly the balance is not enough once the 2% fee is added
    world.ledger.open_wallet(OWNER, dec!(50000));

    let err = world.service.pre_close(OWNER, &loan.id).await.unwrap_err();
    assert!(matches!(err, AppError::InsufficientFunds(_)));

    assert_eq!(world.store.loan(&loan.id).unwrap().status, LoanStatus::Active);
    assert_eq!(world.ledger.balance(OWNER), dec!(50000));
}

#[tokio::test]
async fn test_total_outstanding_sums_across_loans() {
    let world = test_world();
    open_business_account(&world, OWNER, dec!(0));

    let first = approved_loan(&world, OWNER).await;
    let second = world
        .service
        .apply(OWNER, application(dec!(20000), 6))
        .await
        .unwrap();
    world
        .service
        .decide(&second.id, approval(dec!(12)))
        .await
        .unwrap();

    assert_eq!(
        world.service.total_outstanding(OWNER).await.unwrap(),
        dec!(70000)
    );

    let loans = world.service.get_user_loans(OWNER).await.unwrap();
    assert_eq!(loans.len(), 2);
    assert!(loans.iter().any(|l| l.id == first.id));

    // Repaying reduces the total by the face amount
    let receipt = world.service.repay(OWNER, &first.id).await.unwrap();
    assert_eq!(
        world.service.total_outstanding(OWNER).await.unwrap(),
        dec!(70000) - receipt.amount_paid
    );
}
