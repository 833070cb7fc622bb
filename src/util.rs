/// Round `numerator / denominator` to the nearest whole number, 0 for an
/// empty denominator
pub fn rounded_ratio(numerator: u64, denominator: u64) -> u64 {
    match denominator {
        0 => 0,
        d => (numerator as f64 / d as f64).round() as u64,
    }
}

/// Whole percentage of `part` in `total`, 0 when total is 0
pub fn percentage(part: u64, total: u64) -> u64 {
    match total {
        0 => 0,
        t => ((part as f64 / t as f64) * 100.0).round() as u64,
    }
}

/// `MM:SS`, prefixed with `-` for overtime
pub fn format_clock(seconds: i64) -> String {
    let sign = if seconds < 0 { "-" } else { "" };
    let abs = seconds.unsigned_abs();
    format!("{}{:02}:{:02}", sign, abs / 60, abs % 60)
}

/// `Hh Mm` once an hour is reached, otherwise `Mm`
pub fn format_hours_minutes(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;

    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounded_ratio() {
        assert_eq!(rounded_ratio(10, 4), 3);
        assert_eq!(rounded_ratio(9, 4), 2);
        assert_eq!(rounded_ratio(2160, 1), 2160);
    }

    #[test]
    fn test_rounded_ratio_empty() {
        assert_eq!(rounded_ratio(100, 0), 0);
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(60, 2160), 3);
        assert_eq!(percentage(1, 2), 50);
        assert_eq!(percentage(5, 0), 0);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(1500), "25:00");
        assert_eq!(format_clock(5400), "90:00");
        assert_eq!(format_clock(59), "00:59");
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(-75), "-01:15");
    }

    #[test]
    fn test_format_hours_minutes() {
        assert_eq!(format_hours_minutes(0), "0m");
        assert_eq!(format_hours_minutes(59), "0m");
        assert_eq!(format_hours_minutes(1500), "25m");
        assert_eq!(format_hours_minutes(3600), "1h 0m");
        assert_eq!(format_hours_minutes(5460), "1h 31m");
    }
}
