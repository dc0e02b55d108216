use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use revpay::modules::loans::services::EmiCalculator;

#[test]
fn test_standard_amortization_table() {
    // Figures cross-checked against a standard EMI table
    let cases = [
        (dec!(50000), dec!(10), 12, dec!(4395.79)),
        (dec!(100000), dec!(12), 24, dec!(4707.35)),
        (dec!(1000000), dec!(8), 120, dec!(12132.76)),
    ];

    for (principal, rate, tenure, expected) in cases {
        let emi = EmiCalculator::calculate_emi(principal, rate, tenure).unwrap();
        assert!(
            (emi - expected).abs() <= dec!(0.02),
            "EMI for {} at {}% over {} months was {}, expected ~{}",
            principal,
            rate,
            tenure,
            emi,
            expected
        );
    }
}

#[test]
fn test_single_installment_is_principal_plus_one_month_interest() {
    // n = 1 degenerates to P * (1 + i)
    let emi = EmiCalculator::calculate_emi(dec!(12000), dec!(12), 1).unwrap();
    assert_eq!(emi, dec!(12120));
}

proptest! {
    #[test]
    fn test_total_repayment_covers_principal(
        principal in 1_000u32..1_000_000,
        rate in 1u32..=30,
        tenure in 1u32..=60,
    ) {
        let principal = Decimal::from(principal);
        let emi = EmiCalculator::calculate_emi(principal, Decimal::from(rate), tenure).unwrap();

        prop_assert!(
            emi * Decimal::from(tenure) >= principal,
            "EMI {} over {} months does not amortize {}",
            emi, tenure, principal
        );
    }

    #[test]
    fn test_emi_strictly_increases_with_rate(
        principal in 1_000u32..500_000,
        rate in 1u32..30,
        tenure in 2u32..=60,
    ) {
        let principal = Decimal::from(principal);
        let lower = EmiCalculator::calculate_emi(principal, Decimal::from(rate), tenure).unwrap();
        let higher = EmiCalculator::calculate_emi(principal, Decimal::from(rate + 1), tenure).unwrap();

        prop_assert!(higher > lower);
    }

    #[test]
    fn test_emi_strictly_decreases_with_tenure(
        principal in 1_000u32..500_000,
        rate in 1u32..=30,
        tenure in 1u32..60,
    ) {
        let principal = Decimal::from(principal);
        let rate = Decimal::from(rate);
        let shorter = EmiCalculator::calculate_emi(principal, rate, tenure).unwrap();
        let longer = EmiCalculator::calculate_emi(principal, rate, tenure + 1).unwrap();

        prop_assert!(longer < shorter);
    }

    #[test]
    fn test_emi_always_cent_precision(
        principal in 1u32..1_000_000,
        rate in 0u32..=30,
        tenure in 1u32..=360,
    ) {
        let emi = EmiCalculator::calculate_emi(
            Decimal::from(principal),
            Decimal::from(rate),
            tenure,
        )
        .unwrap();

        prop_assert!(emi.scale() <= 2);
        prop_assert!(emi > Decimal::ZERO);
    }
}
