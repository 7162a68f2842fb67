//! Numeric and label normalization for upstream quotes
//!
//! Upstream feeds mix comma-decimal strings, unsigned percentages and
//! provider-specific labels. These helpers turn them into the common form.

/// Round to 2 decimal places, halves away from zero.
///
/// Quotes are always positive, so this is standard round-half-up.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Replace every comma with a dot: "70,43" → "70.43"
pub fn replace_comma(value: &str) -> String {
    value.replace(',', ".")
}

/// Parse a decimal that may use a comma as fraction separator.
///
/// # Examples
/// ```
/// use coinbani::services::normalizer::parse_locale_decimal;
///
/// assert_eq!(parse_locale_decimal("70,43"), Some(70.43));
/// assert_eq!(parse_locale_decimal("10"), Some(10.0));
/// assert_eq!(parse_locale_decimal("No Cotiza"), None);
/// ```
pub fn parse_locale_decimal(value: &str) -> Option<f64> {
    replace_comma(value.trim())
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Prefix non-negative percentages with "+".
///
/// A value is negative when it contains a "-"; those are returned untouched.
///
/// # Examples
/// ```
/// use coinbani::services::normalizer::format_percent;
///
/// assert_eq!(format_percent("0,810"), "+0,810");
/// assert_eq!(format_percent("-0,920"), "-0,920");
/// ```
pub fn format_percent(percent_change: &str) -> String {
    if percent_change.contains('-') {
        percent_change.to_string()
    } else {
        format!("+{}", percent_change)
    }
}

/// Short labels for rates whose upstream name is too long for a table cell
const DOLLAR_NAME_ALIASES: &[(&str, &str)] = &[("Bolsa", "MEP"), ("Contado con Liqui", "CCL")];

/// Convert an upstream dollar rate name to its display label.
///
/// - "Dolar Oficial" → "Oficial"
/// - "Dolar Bolsa" → "MEP"
/// - "Dolar Contado con Liqui" → "CCL"
pub fn format_dollar_name(name: &str) -> String {
    let short = name.replace("Dolar ", "");

    DOLLAR_NAME_ALIASES
        .iter()
        .find(|(from, _)| *from == short)
        .map(|(_, to)| to.to_string())
        .unwrap_or(short)
}

/// Upper-case pair label: ("dai", "ars") → "DAI/ARS"
pub fn pair_description(base: &str, quote: &str) -> String {
    format!("{}/{}", base.to_uppercase(), quote.to_uppercase())
}

/// Buenbit labels pesos as "AR$"; render the dollar sign as "S"
pub fn normalize_currency_label(currency: &str) -> String {
    currency.replace('$', "S")
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========== round2 ==========

    #[test]
    fn test_round2_down() {
        assert_eq!(round2(125.7009), 125.7);
    }

    #[test]
    fn test_round2_half_up() {
        assert_eq!(round2(1.125), 1.13);
    }

    #[test]
    fn test_round2_tax_product() {
        assert_eq!(round2(65.72 * 1.3), 85.44);
        assert_eq!(round2(70.72 * 1.3), 91.94);
    }

    // ========== comma handling ==========

    #[test]
    fn test_replace_comma_with_dot() {
        assert_eq!(replace_comma("70,43"), "70.43");
    }

    #[test]
    fn test_replace_without_comma() {
        assert_eq!(replace_comma("10"), "10");
    }

    #[test]
    fn test_replace_empty_string() {
        assert_eq!(replace_comma(""), "");
    }

    #[test]
    fn test_parse_locale_decimal_comma() {
        assert_eq!(parse_locale_decimal("70,43"), Some(70.43));
    }

    #[test]
    fn test_parse_locale_decimal_integer() {
        assert_eq!(parse_locale_decimal("10"), Some(10.0));
    }

    #[test]
    fn test_parse_locale_decimal_invalid() {
        assert_eq!(parse_locale_decimal(""), None);
        assert_eq!(parse_locale_decimal("No Cotiza"), None);
        assert_eq!(parse_locale_decimal("NaN"), None);
    }

    // ========== percent ==========

    #[test]
    fn test_format_percent_adds_plus() {
        assert_eq!(format_percent("0,810"), "+0,810");
    }

    #[test]
    fn test_format_percent_keeps_negative() {
        assert_eq!(format_percent("-0,920"), "-0,920");
    }

    #[test]
    fn test_format_percent_zero() {
        assert_eq!(format_percent("0"), "+0");
    }

    // ========== labels ==========

    #[test]
    fn test_format_dollar_name_mep() {
        assert_eq!(format_dollar_name("Dolar Bolsa"), "MEP");
    }

    #[test]
    fn test_format_dollar_name_ccl() {
        assert_eq!(format_dollar_name("Dolar Contado con Liqui"), "CCL");
    }

    #[test]
    fn test_format_dollar_name_passthrough() {
        assert_eq!(format_dollar_name("Dolar Oficial"), "Oficial");
        assert_eq!(format_dollar_name("Ahorro"), "Ahorro");
    }

    #[test]
    fn test_format_dollar_name_empty() {
        assert_eq!(format_dollar_name(""), "");
    }

    #[test]
    fn test_pair_description() {
        assert_eq!(pair_description("dai", "ars"), "DAI/ARS");
        assert_eq!(pair_description("BTC", "usd"), "BTC/USD");
    }

    #[test]
    fn test_normalize_currency_label() {
        assert_eq!(normalize_currency_label("AR$"), "ARS");
        assert_eq!(normalize_currency_label("USD"), "USD");
    }
}
