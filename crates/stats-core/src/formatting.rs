/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// # Examples
///
/// ```
/// use stats_core::formatting::format_number;
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

    // Round to the requested decimal places.
    // Add a tiny epsilon (half ULP at the target precision) before rounding
    // to avoid IEEE 754 binary-representation issues at exact midpoints.
    let factor = 10_f64.powi(decimals as i32);
    let epsilon = f64::EPSILON * abs_value * factor;
    let rounded = ((abs_value * factor) + epsilon).round() / factor;

    let integer_part = rounded.trunc() as u64;
    let frac_part = rounded - rounded.trunc();

    // Build the thousands-separated integer portion.
    let int_str = integer_part.to_string();
    let grouped = group_thousands(&int_str);

    let result = if decimals == 0 {
        grouped
    } else {
        // Format the fractional part to the exact number of decimals.
        let frac_str = format!("{:.prec$}", frac_part, prec = decimals as usize);
        // `frac_str` starts with "0.", e.g. "0.50". Strip the leading "0".
        let decimal_digits = &frac_str[1..]; // ".50"
        format!("{}{}", grouped, decimal_digits)
    };

    if negative {
        format!("-{}", result)
    } else {
        result
    }
}

/// Format an estimated watch time given in hours.
///
/// * `< 1` hour    → whole minutes, `"45 min"`
/// * `< 24` hours  → hours to one decimal, `"3.5 hrs"`
/// * `< 720` hours → days to one decimal, `"2.0 days"`
/// * otherwise     → 30-day months to one decimal, `"2.0 months"`
///
/// # Examples
///
/// ```
/// use stats_core::formatting::format_duration;
///
/// assert_eq!(format_duration(0.5),    "30 min");
/// assert_eq!(format_duration(3.5),    "3.5 hrs");
/// assert_eq!(format_duration(48.0),   "2.0 days");
/// assert_eq!(format_duration(1440.0), "2.0 months");
/// ```
pub fn format_duration(hours: f64) -> String {
    if hours < 1.0 {
        return format!("{} min", (hours * 60.0).round() as i64);
    }
    if hours < 24.0 {
        return format!("{:.1} hrs", hours);
    }
    let days = hours / 24.0;
    if days < 30.0 {
        return format!("{:.1} days", days);
    }
    format!("{:.1} months", days / 30.0)
}

/// Share of `part` in `whole` as an unrounded percentage.
///
/// Returns `0.0` when `whole` is zero.
pub fn share_percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

/// Render a share of total to one decimal with a trailing `%`.
///
/// # Examples
///
/// ```
/// use stats_core::formatting::format_share;
///
/// assert_eq!(format_share(1, 4), "25.0%");
/// assert_eq!(format_share(0, 0), "0.0%");
/// ```
pub fn format_share(part: u64, whole: u64) -> String {
    format!("{:.1}%", share_percentage(part, whole))
}

/// `"1 day"`, `"3 days"`: a count followed by a singular or plural unit.
pub fn pluralize(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("{} {}", count, unit)
    } else {
        format!("{} {}s", count, unit)
    }
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
