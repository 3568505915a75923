//! Display formatting shared by the view reducers.
//!
//! Currency amounts use two decimals, log-return predictions four. These
//! rules apply to rendering only; stored values keep full precision.

pub const NOT_AVAILABLE: &str = "N/A";
pub const NO_VALUE: &str = "-";

/// Currency amount with two decimals, e.g. `123.40`.
pub fn price(value: f64) -> String {
    format!("{value:.2}")
}

/// Percentage with an explicit `+` for positive values, e.g. `+2.50%`.
pub fn signed_pct(value: f64) -> String {
    if value > 0.0 {
        format!("+{value:.2}%")
    } else {
        format!("{value:.2}%")
    }
}

/// Log-return style value with four decimals.
pub fn log_value(value: f64) -> String {
    format!("{value:.4}")
}

/// Fraction in `[0, 1]` as a one-decimal percentage, e.g. `30.0%`.
pub fn fraction_pct(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

pub fn or_na(value: Option<f64>, render: fn(f64) -> String) -> String {
    value
        .filter(|v| v.is_finite())
        .map(render)
        .unwrap_or_else(|| String::from(NOT_AVAILABLE))
}

pub fn or_dash(value: Option<f64>, render: fn(f64) -> String) -> String {
    value
        .filter(|v| v.is_finite())
        .map(render)
        .unwrap_or_else(|| String::from(NO_VALUE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_percentages() {
        assert_eq!(signed_pct(2.5), "+2.50%");
        assert_eq!(signed_pct(-1.2), "-1.20%");
        assert_eq!(signed_pct(0.0), "0.00%");
    }

    #[test]
    fn prices_and_log_values() {
        assert_eq!(price(101.456), "101.46");
        assert_eq!(log_value(0.012345), "0.0123");
        assert_eq!(fraction_pct(0.3), "30.0%");
    }

    #[test]
    fn missing_values_render_placeholders() {
        assert_eq!(or_na(None, price), "N/A");
        assert_eq!(or_na(Some(f64::NAN), price), "N/A");
        assert_eq!(or_dash(None, log_value), "-");
        assert_eq!(or_dash(Some(0.0), log_value), "0.0000");
    }
}
