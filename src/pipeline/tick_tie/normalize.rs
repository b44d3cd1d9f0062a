//! Deterministic normalization of numeric literals as they appear on slides.
//!
//! The extraction stage supplies its own normalized values, but a literal
//! the backend mis-normalizes would poison the tolerance comparison, so any
//! literal this module can parse overrides the backend's number.

use std::sync::OnceLock;

use regex::Regex;

fn percent_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\(?(-?[\d,]+(?:\.\d+)?)\s*%\)?$").expect("percent regex"))
}

fn multiple_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(-?[\d,]+(?:\.\d+)?)\s*[xX]$").expect("multiple regex"))
}

fn currency_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^\(?\$\s*(-?[\d,]+(?:\.\d+)?)\s*(tn|trillion|bn|billion|b|mm|mn|million|m|k|thousand)?\)?$")
            .expect("currency regex")
    })
}

fn plain_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\(?(-?[\d,]+(?:\.\d+)?)\)?$").expect("plain number regex"))
}

fn parse_decimal(digits: &str) -> Option<f64> {
    digits.replace(',', "").parse().ok()
}

fn magnitude(suffix: &str) -> Option<f64> {
    match suffix.to_ascii_lowercase().as_str() {
        "tn" | "trillion" => Some(1e12),
        "bn" | "billion" | "b" => Some(1e9),
        "mm" | "mn" | "million" | "m" => Some(1e6),
        "k" | "thousand" => Some(1e3),
        _ => None,
    }
}

/// Parse a value literal into `(normalized value, unit)`.
///
/// - `"6%"` → `(0.06, "pct")`
/// - `"12.5x"` → `(12.5, "x")`
/// - `"$1.2bn"` → `(1_200_000_000, "usd")` — absolute when the magnitude
///   suffix is known
/// - `"$1,200"` → `(1200, "usd")`
/// - `"1,200"` → `(1200, None)`
///
/// Returns `None` for anything this module cannot interpret.
pub fn parse_value_literal(raw: &str) -> Option<(f64, Option<String>)> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Some(caps) = percent_re().captures(raw) {
        let v = parse_decimal(&caps[1])?;
        return Some((v / 100.0, Some("pct".to_string())));
    }

    if let Some(caps) = multiple_re().captures(raw) {
        let v = parse_decimal(&caps[1])?;
        return Some((v, Some("x".to_string())));
    }

    if let Some(caps) = currency_re().captures(raw) {
        let v = parse_decimal(&caps[1])?;
        return match caps.get(2) {
            Some(suffix) => {
                let scale = magnitude(suffix.as_str())?;
                Some((v * scale, Some("usd".to_string())))
            }
            None => Some((v, Some("usd".to_string()))),
        };
    }

    if let Some(caps) = plain_number_re().captures(raw) {
        let v = parse_decimal(&caps[1])?;
        return Some((v, None));
    }

    None
}

/// Reconcile the backend-supplied value/unit with the on-slide literal.
///
/// A parseable literal wins outright. When the literal cannot be parsed, the
/// backend's value is kept as-is; a fact with neither is unusable and yields
/// `None`.
pub fn reconcile(
    value: Option<f64>,
    unit: Option<String>,
    raw: &str,
) -> Option<(f64, Option<String>)> {
    if let Some((parsed, parsed_unit)) = parse_value_literal(raw) {
        // Keep the backend's more specific unit label when the literal parse
        // has no opinion of its own.
        let unit = parsed_unit.or(unit);
        return Some((parsed, unit));
    }
    value.map(|v| (v, unit))
}
