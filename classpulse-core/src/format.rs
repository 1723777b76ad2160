//! Formatting helpers shared across reports.

/// Human-readable name for a calendar month (e.g., "March 2025").
///
/// Every period label in reports goes through this function.
pub fn month_label(year: i32, month: u32) -> String {
    let name = match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Unknown",
    };
    format!("{} {}", name, year)
}

/// Format a signed percentage change for display (e.g., "+23%" or "-15%").
pub fn format_delta(delta: f64) -> String {
    if delta >= 0.0 {
        format!("+{:.0}%", delta)
    } else {
        format!("{:.0}%", delta)
    }
}

/// Format a percentage with one decimal (e.g., "33.3%").
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
