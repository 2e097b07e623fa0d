//! Display formatting for numeric results.

/// Round to `digits` decimal places.
///
/// Goes through the decimal representation so that halfway cases are decided
/// on the exact binary value, e.g. `round_to(2.675, 2) == 2.67`.
pub fn round_to(value: f64, digits: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{:.*}", digits, value).parse().unwrap_or(value)
}

/// Render a result rounded to `digits` decimals in its shortest form.
pub fn format_value(value: f64, digits: usize) -> String {
    let rounded = round_to(value, digits);
    if rounded == 0.0 {
        // Avoid printing "-0"
        return "0".to_string();
    }
    rounded.to_string()
}
