//! Fixed-point currency parsing
//!
//! Order snapshots carry prices in a mix of shapes: `$12.50`, `12.50$`,
//! `USD 12.50`, `12$50¢`, `€10`, `EUR 10`, stray whitespace, trailing dots.
//! Everything is normalized to USD as a `rust_decimal::Decimal`; EUR amounts
//! convert at a fixed 1.2 rate. Floating point is never involved, so summed
//! revenue does not drift.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

/// Fixed EUR→USD conversion rate (1 EUR = 1.2 USD)
static EUR_TO_USD: Lazy<Decimal> = Lazy::new(|| Decimal::new(12, 1));

static DOLLAR_CENTS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\$(\d+)¢").unwrap());
static EURO_CENTS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)€(\d+)¢").unwrap());
static TRAILING_SYMBOL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+\.?\d*)([$€])").unwrap());

/// Round to whole cents
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp(2)
}

/// Parse a raw price string into USD cents-precision decimal.
///
/// Returns `None` when no numeric amount can be recovered; the caller
/// records the row as a normalization error.
pub fn parse_price(raw: &str) -> Option<Decimal> {
    // Strip whitespace, reduce currency codes to symbols
    let mut s: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    s = s.replace("USD", "$").replace("EUR", "€");
    if let Some(stripped) = s.strip_suffix('.') {
        s = stripped.to_string();
    }

    // Cent notation: 12$50¢ → $12.50, 12€50¢ → €12.50
    s = DOLLAR_CENTS_RE.replace_all(&s, "$$${1}.${2}").into_owned();
    s = EURO_CENTS_RE.replace_all(&s, "€${1}.${2}").into_owned();
    s = s.replace('¢', ".");

    // Symbol-after-amount: 12.50$ → $12.50
    s = TRAILING_SYMBOL_RE.replace_all(&s, "${2}${1}").into_owned();

    let is_eur = s.starts_with('€');
    let digits = s.trim_start_matches(['$', '€']);
    let digits = digits.strip_suffix('.').unwrap_or(digits);

    let amount: Decimal = digits.parse().ok()?;
    if is_eur {
        Some(round_cents(amount * *EUR_TO_USD))
    } else {
        Some(amount)
    }
}
