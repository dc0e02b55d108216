use rust_decimal::Decimal;

use crate::core::{AppError, Result};
use crate::modules::loans::models::MAX_TENURE_MONTHS;

/// Pure equated-monthly-installment calculator
///
/// All arithmetic stays in `Decimal`; binary floating point would drift at
/// cent level across thousands of installments.
pub struct EmiCalculator;

impl EmiCalculator {
    /// Compute the fixed monthly installment for a loan
    ///
    /// With monthly rate `i = annual_rate / 1200`:
    ///
    /// ```text
    /// EMI = P * i * (1+i)^n / ((1+i)^n - 1)
    /// ```
    ///
    /// A zero rate degenerates to `P / n`; the compound formula would divide
    /// by zero there. The result is rounded to cent precision and the same
    /// inputs always yield the same output.
    pub fn calculate_emi(
        principal: Decimal,
        annual_rate: Decimal,
        tenure_months: u32,
    ) -> Result<Decimal> {
        if principal <= Decimal::ZERO {
            return Err(AppError::domain("Principal must be positive"));
        }

        if annual_rate < Decimal::ZERO {
            return Err(AppError::domain("Interest rate cannot be negative"));
        }

        if tenure_months == 0 || tenure_months > MAX_TENURE_MONTHS {
            return Err(AppError::domain(format!(
                "Tenure must be between 1 and {} months",
                MAX_TENURE_MONTHS
            )));
        }

        let monthly_rate = annual_rate / Decimal::from(1200);

        if monthly_rate.is_zero() {
            return Ok((principal / Decimal::from(tenure_months)).round_dp(2));
        }

        let growth = Self::compound(Decimal::ONE + monthly_rate, tenure_months);

        let emi = principal * monthly_rate * growth / (growth - Decimal::ONE);

        Ok(emi.round_dp(2))
    }

    /// `base^n` by repeated multiplication; n is bounded by MAX_TENURE_MONTHS
    fn compound(base: Decimal, n: u32) -> Decimal {
        let mut acc = Decimal::ONE;
        for _ in 0..n {
            acc *= base;
        }
        acc
    }
}
