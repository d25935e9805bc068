/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// # Examples
///
/// ```
/// use attendance_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5, 1), "1,234.5");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    let factor = 10_f64.powi(decimals as i32);
    let abs_value = value.abs();
    let epsilon = f64::EPSILON * abs_value * factor;
    let rounded = ((abs_value * factor) + epsilon).round() / factor;
    // -0.001 rounds to zero and must not print as "-0.00".
    let negative = value < 0.0 && rounded > 0.0;

    let grouped = group_thousands(&(rounded.trunc() as u64).to_string());

    let body = if decimals == 0 {
        grouped
    } else {
        let frac_str = format!("{:.prec$}", rounded.fract(), prec = decimals as usize);
        // "0.50" -> ".50"
        format!("{}{}", grouped, &frac_str[1..])
    };

    if negative {
        format!("-{}", body)
    } else {
        body
    }
}

/// Format an hour amount with two decimals and an `h` suffix.
///
/// ```
/// use attendance_core::formatting::format_hours;
///
/// assert_eq!(format_hours(32.0), "32.00h");
/// assert_eq!(format_hours(1234.567), "1,234.57h");
/// ```
pub fn format_hours(hours: f64) -> String {
    format!("{}h", format_number(hours, 2))
}

/// Format a gap so that shortfalls and surpluses read differently.
///
/// A positive gap (hours still owed) gets a leading `+`, a surplus keeps its
/// minus sign.
///
/// ```
/// use attendance_core::formatting::format_gap;
///
/// assert_eq!(format_gap(8.0), "+8.00h");
/// assert_eq!(format_gap(-5.5), "-5.50h");
/// assert_eq!(format_gap(0.0), "0.00h");
/// ```
pub fn format_gap(gap_hours: f64) -> String {
    let body = format_hours(gap_hours);
    if body.starts_with('-') || gap_hours.abs() < 0.005 {
        body
    } else {
        format!("+{}", body)
    }
}

/// Format a percentage with one decimal.
///
/// ```
/// use attendance_core::formatting::format_percent;
///
/// assert_eq!(format_percent(80.0), "80.0%");
/// assert_eq!(format_percent(33.333), "33.3%");
/// ```
pub fn format_percent(value: f64) -> String {
    format!("{}%", format_number(value, 1))
}

/// Format fractional hours as a clock duration.
///
/// * whole hours → `"8h"`
/// * with minutes → `"8h 30m"`
/// * under an hour → `"45m"`
///
/// ```
/// use attendance_core::formatting::format_duration;
///
/// assert_eq!(format_duration(8.0), "8h");
/// assert_eq!(format_duration(8.5), "8h 30m");
/// assert_eq!(format_duration(0.75), "45m");
/// assert_eq!(format_duration(-1.5), "-1h 30m");
/// ```
pub fn format_duration(hours: f64) -> String {
    let total_mins = (hours * 60.0).round() as i64;
    let sign = if total_mins < 0 { "-" } else { "" };
    let mins = total_mins.abs();
    let (h, m) = (mins / 60, mins % 60);
    match (h, m) {
        (0, m) => format!("{}{}m", sign, m),
        (h, 0) => format!("{}{}h", sign, h),
        (h, m) => format!("{}{}h {}m", sign, h, m),
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let remainder = s.len() % 3;
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i != 0 && i % 3 == remainder {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────
