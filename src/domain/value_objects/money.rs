//! Currency helpers shared by spend, revenue and report rows.

/// Google Ads reports every amount in micro-units of the account currency
pub const MICROS_PER_UNIT: f64 = 1_000_000.0;

/// Round an amount to two fractional digits
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Convert a micro-unit amount to currency units rounded to cents
pub fn micros_to_amount(micros: i64) -> f64 {
    round_cents(micros as f64 / MICROS_PER_UNIT)
}

/// Parse a tracker amount that may arrive as "150.00", "" or a bare number
pub fn parse_amount(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}
