use rust_decimal::{Decimal, RoundingStrategy};

/// Round half-up to whole cents and fix the scale at two places, so the
/// value always displays and serializes as e.g. `450.00`.
pub fn cents(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Currency display used in text reports
pub fn display_amount(amount: Decimal) -> String {
    let amount = cents(amount);
    if amount.is_sign_negative() && !amount.is_zero() {
        format!("-${}", amount.abs())
    } else {
        format!("${}", amount)
    }
}

/// Parse a user-supplied amount, accepting an optional `$` and thousands separators
pub fn parse_amount(s: &str) -> Result<Decimal, rust_decimal::Error> {
    let cleaned: String = s
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    cleaned.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rounds_half_up() {
        assert_eq!(cents(dec!(161.145833)).to_string(), "161.15");
        assert_eq!(cents(dec!(0.005)).to_string(), "0.01");
        assert_eq!(cents(dec!(0.004999)).to_string(), "0.00");
        assert_eq!(cents(dec!(2.675)).to_string(), "2.68");
    }

    #[test]
    fn fixes_scale_at_two() {
        assert_eq!(cents(dec!(450)).to_string(), "450.00");
        assert_eq!(cents(dec!(49.2)).to_string(), "49.20");
        assert_eq!(cents(Decimal::ZERO).to_string(), "0.00");
    }

    #[test]
    fn display_amounts() {
        assert_eq!(display_amount(dec!(1234.5)), "$1234.50");
        assert_eq!(display_amount(dec!(-3)), "-$3.00");
    }

    #[test]
    fn parse_amounts() {
        assert_eq!(parse_amount("3000.00").unwrap(), dec!(3000));
        assert_eq!(parse_amount("$3,000.50").unwrap(), dec!(3000.50));
        assert!(parse_amount("abc").is_err());
    }
}
