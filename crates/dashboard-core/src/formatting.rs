/// Placeholder rendered for any statistic that is undefined (empty selection).
pub const NOT_AVAILABLE: &str = "N/A";

/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// # Examples
///
/// ```
/// use dashboard_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5,  1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    // Handle the sign separately so the thousands grouping works on the
    // absolute value.
    let negative = value < 0.0;
    let abs_value = value.abs();

    // Nudge by a relative epsilon so exact binary midpoints round up.
    let factor = 10_f64.powi(decimals as i32);
    let epsilon = f64::EPSILON * abs_value * factor;
    let rounded = ((abs_value * factor) + epsilon).round() / factor;

    let integer_part = rounded.trunc() as u64;
    let frac_part = rounded - rounded.trunc();

    let int_str = integer_part.to_string();
    let grouped = group_thousands(&int_str);

    let result = if decimals == 0 {
        grouped
    } else {
        // `frac_str` starts with "0.", e.g. "0.50".
        let frac_str = format!("{:.prec$}", frac_part, prec = decimals as usize);
        format!("{}{}", grouped, &frac_str[1..])
    };

    if negative {
        format!("-{}", result)
    } else {
        result
    }
}

/// Format a quantity with the K/M magnitude suffix used across the report.
///
/// * `≥ 1,000,000` → `"X.XXM"`
/// * `≥ 1,000`     → `"X.XXK"`
/// * otherwise     → `"X.XX"`
///
/// # Examples
///
/// ```
/// use dashboard_core::formatting::format_magnitude;
///
/// assert_eq!(format_magnitude(500.0), "500.00");
/// assert_eq!(format_magnitude(5_000.0), "5.00K");
/// assert_eq!(format_magnitude(5_000_000.0), "5.00M");
/// ```
pub fn format_magnitude(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("{:.2}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("{:.2}K", value / 1_000.0)
    } else {
        format!("{:.2}", value)
    }
}

/// [`format_magnitude`] for an optional statistic; `None` renders as `"N/A"`.
pub fn format_magnitude_or_na(value: Option<f64>) -> String {
    value
        .map(format_magnitude)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// [`format_number`] for an optional statistic; `None` renders as `"N/A"`.
pub fn format_number_or_na(value: Option<f64>, decimals: u32) -> String {
    value
        .map(|v| format_number(v, decimals))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Render an hour of day as `"H:00"`, matching the insight statements.
///
/// ```
/// use dashboard_core::formatting::format_hour;
///
/// assert_eq!(format_hour(7), "7:00");
/// assert_eq!(format_hour(18), "18:00");
/// ```
pub fn format_hour(hour: u32) -> String {
    format!("{}:00", hour)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────
