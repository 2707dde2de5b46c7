//! Bounds and overflow-checked arithmetic for money amounts.

use rust_decimal::Decimal;

use crate::Error;

/// The largest amount, in whole currency units, accepted for a single
/// transaction, budget or goal.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;

/// Check that `amount` is greater than zero and at most [MAX_AMOUNT].
///
/// `name` is the field name used in the error message.
///
/// # Errors
///
/// Returns [Error::Validation] if `amount` is out of range.
pub fn check_amount(amount: Decimal, name: &str) -> Result<(), Error> {
    if amount <= Decimal::ZERO {
        return Err(Error::Validation(format!("{name} must be greater than zero")));
    }

    if amount > Decimal::from(MAX_AMOUNT) {
        return Err(Error::Validation(format!("{name} cannot be more than {MAX_AMOUNT}")));
    }

    Ok(())
}

/// Add `amount` to `total`.
///
/// # Errors
///
/// Returns [Error::Validation] if the sum does not fit in a [Decimal].
pub fn add_amounts(total: Decimal, amount: Decimal) -> Result<Decimal, Error> {
    total.checked_add(amount).ok_or_else(|| {
        tracing::warn!("Adding {amount} to {total} overflowed");
        Error::Validation("the total is too large to record".to_owned())
    })
}

#[cfg(test)]
mod amount_tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::Error;

    use super::{MAX_AMOUNT, add_amounts, check_amount};

    #[test]
    fn check_amount_accepts_up_to_max() {
        assert_eq!(check_amount(dec!(0.01), "amount"), Ok(()));
        assert_eq!(check_amount(Decimal::from(MAX_AMOUNT), "amount"), Ok(()));
    }

    #[test]
    fn check_amount_rejects_out_of_range() {
        for amount in [dec!(0), dec!(-5), Decimal::from(MAX_AMOUNT) + dec!(0.01), Decimal::MAX] {
            assert!(matches!(
                check_amount(amount, "amount"),
                Err(Error::Validation(_))
            ));
        }
    }

    #[test]
    fn add_amounts_sums() {
        assert_eq!(add_amounts(dec!(10.25), dec!(-0.25)), Ok(dec!(10.00)));
    }

    #[test]
    fn add_amounts_fails_on_overflow() {
        assert!(matches!(
            add_amounts(Decimal::MAX, Decimal::MAX),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            add_amounts(Decimal::MIN, dec!(-1)),
            Err(Error::Validation(_))
        ));
    }
}
