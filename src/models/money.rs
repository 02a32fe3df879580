//! Money and percentage types
//!
//! All monetary arithmetic uses `rust_decimal::Decimal`, an exact base-10
//! fixed-point number, so values like 0.1 + 0.2 stay exact. Rounding to cents
//! happens only where a figure is fixed (a line total, an invoice total), and
//! always rounds a trailing 5 away from zero ("round half up" for the
//! non-negative amounts this tool deals in).

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of fractional digits kept on fixed monetary figures
pub const MONEY_DECIMALS: u32 = 2;

/// Round a value to cents using round-half-up
pub fn round_half_up(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(MONEY_DECIMALS, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_DECIMALS);
    rounded
}

/// Shortest text form of a number, always with a fractional part
///
/// `25` reads `25.0` and `12.50` reads `12.5`, which is what catalog
/// search matches numeric queries against.
pub fn number_text(value: Decimal) -> String {
    let normalized = value.normalize();
    if normalized.scale() == 0 {
        format!("{}.0", normalized)
    } else {
        normalized.to_string()
    }
}

/// A monetary amount in the configured currency
///
/// The amount is kept at whatever precision it was entered with; `rounded`
/// and `Display` present it to cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a Money amount from cents
    ///
    /// # Examples
    /// ```
    /// use billbook_cli::models::Money;
    /// assert_eq!(Money::from_cents(1050).to_string(), "10.50");
    /// ```
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, MONEY_DECIMALS))
    }

    pub const fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Fix an exact intermediate result to cents
    pub fn round_from(value: Decimal) -> Self {
        Self(round_half_up(value))
    }

    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// This amount rounded to cents
    pub fn rounded(&self) -> Self {
        Self::round_from(self.0)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Parse an amount such as "10.50", "$10.50" or "10"
    pub fn parse(s: &str) -> Result<Self, MoneyParseError> {
        let trimmed = s.trim();
        let (negative, rest) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let rest = rest.trim_start_matches(|c: char| !c.is_ascii_digit() && c != '.');
        let rest = rest.replace(',', "");

        let amount = Decimal::from_str(&rest)
            .map_err(|_| MoneyParseError::InvalidFormat(s.to_string()))?;
        Ok(Self(if negative { -amount } else { amount }))
    }

    /// Format with a currency symbol, e.g. "$10.50"
    pub fn format_with_symbol(&self, symbol: &str) -> String {
        let rounded = self.rounded();
        if rounded.is_negative() {
            format!("-{}{}", symbol, rounded.0.abs())
        } else {
            format!("{}{}", symbol, rounded.0)
        }
    }

    /// Sum of two amounts, `None` if it overflows
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// The amount exactly as stored, used for text matching
    pub fn raw_text(&self) -> String {
        self.0.to_string()
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", round_half_up(self.0))
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

/// Error type for money parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyParseError {
    InvalidFormat(String),
}

impl fmt::Display for MoneyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoneyParseError::InvalidFormat(s) => write!(f, "Invalid money format: {}", s),
        }
    }
}

impl std::error::Error for MoneyParseError {}

/// A percentage between 0 and 100 inclusive (tax or discount)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Rate(Decimal);

impl Rate {
    pub fn new(percent: Decimal) -> Result<Self, RateError> {
        if percent < Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
            return Err(RateError::OutOfRange(percent));
        }
        Ok(Self(percent))
    }

    pub const fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// The rate as entered, e.g. 18 for 18%
    pub const fn percent(&self) -> Decimal {
        self.0
    }

    /// The rate as a fraction, e.g. 0.18 for 18%
    pub fn fraction(&self) -> Decimal {
        self.0 / Decimal::ONE_HUNDRED
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Parse "18", "18.5" or "18%"
    pub fn parse(s: &str) -> Result<Self, RateError> {
        let trimmed = s.trim().trim_end_matches('%').trim();
        let percent =
            Decimal::from_str(trimmed).map_err(|_| RateError::InvalidFormat(s.to_string()))?;
        Self::new(percent)
    }
}

impl Default for Rate {
    fn default() -> Self {
        Self::zero()
    }
}

impl TryFrom<Decimal> for Rate {
    type Error = RateError;

    fn try_from(percent: Decimal) -> Result<Self, Self::Error> {
        Self::new(percent)
    }
}

impl From<Rate> for Decimal {
    fn from(rate: Rate) -> Self {
        rate.0
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

/// Error type for percentage parsing and validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateError {
    InvalidFormat(String),
    OutOfRange(Decimal),
}

impl fmt::Display for RateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateError::InvalidFormat(s) => write!(f, "Invalid percentage: {}", s),
            RateError::OutOfRange(p) => {
                write!(f, "Percentage must be between 0 and 100, got {}", p)
            }
        }
    }
}

impl std::error::Error for RateError {}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_half_up_boundary() {
        assert_eq!(round_half_up(dec!(12.345)), dec!(12.35));
        assert_eq!(round_half_up(dec!(12.344)), dec!(12.34));
        assert_eq!(round_half_up(dec!(0.005)), dec!(0.01));
        assert_eq!(round_half_up(dec!(2.675)), dec!(2.68));
    }

    #[test]
    fn test_round_half_up_pads_scale() {
        assert_eq!(round_half_up(dec!(270)).to_string(), "270.00");
        assert_eq!(round_half_up(dec!(57.6)).to_string(), "57.60");
    }

    #[test]
    fn test_number_text() {
        assert_eq!(number_text(dec!(25)), "25.0");
        assert_eq!(number_text(dec!(25.00)), "25.0");
        assert_eq!(number_text(dec!(12.50)), "12.5");
        assert_eq!(number_text(dec!(0.25)), "0.25");
        assert_eq!(number_text(dec!(0)), "0.0");
    }

    #[test]
    fn test_exact_decimal_addition() {
        let total = Money::new(dec!(0.1)).checked_add(Money::new(dec!(0.2))).unwrap();
        assert_eq!(total.amount(), dec!(0.3));
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1050).to_string(), "10.50");
        assert_eq!(Money::new(dec!(3)).to_string(), "3.00");
        assert_eq!(Money::new(dec!(12.345)).format_with_symbol("$"), "$12.35");
        assert_eq!(Money::new(dec!(-4.5)).format_with_symbol("$"), "-$4.50");
    }

    #[test]
    fn test_parse() {
        assert_eq!(Money::parse("10.50").unwrap().amount(), dec!(10.50));
        assert_eq!(Money::parse("$10.50").unwrap().amount(), dec!(10.50));
        assert_eq!(Money::parse("1,250.00").unwrap().amount(), dec!(1250.00));
        assert_eq!(Money::parse("-3").unwrap().amount(), dec!(-3));
        assert!(Money::parse("ten").is_err());
    }

    #[test]
    fn test_checked_add_overflow() {
        assert_eq!(
            Money::from_cents(100).checked_add(Money::from_cents(250)),
            Some(Money::from_cents(350))
        );
        assert_eq!(Money::new(Decimal::MAX).checked_add(Money::from_cents(1)), None);
    }

    #[test]
    fn test_rate_bounds() {
        assert!(Rate::new(dec!(0)).is_ok());
        assert!(Rate::new(dec!(100)).is_ok());
        assert_eq!(
            Rate::new(dec!(100.5)),
            Err(RateError::OutOfRange(dec!(100.5)))
        );
        assert!(Rate::new(dec!(-1)).is_err());
    }

    #[test]
    fn test_rate_parse_and_fraction() {
        let rate = Rate::parse("18%").unwrap();
        assert_eq!(rate.percent(), dec!(18));
        assert_eq!(rate.fraction(), dec!(0.18));
        assert_eq!(rate.to_string(), "18");
        assert!(Rate::parse("abc").is_err());
    }

    #[test]
    fn test_rate_deserialize_validates() {
        let ok: Rate = serde_json::from_str("\"12.5\"").unwrap();
        assert_eq!(ok.percent(), dec!(12.5));
        let from_number: Rate = serde_json::from_str("7").unwrap();
        assert_eq!(from_number.percent(), dec!(7));
        assert!(serde_json::from_str::<Rate>("\"250\"").is_err());
    }
}
