/// Smallest bar drawn for any weekday, so empty days stay visible
pub const MIN_BAR_PERCENT: u64 = 5;

/// Bar length for a weekday average relative to the busiest weekday
pub fn bar_percentage(average: u64, max_average: u64) -> u64 {
    if max_average == 0 {
        return MIN_BAR_PERCENT;
    }
    let pct = (average as f64 / max_average as f64 * 100.0).floor() as u64;
    pct.max(MIN_BAR_PERCENT)
}

/// Share of a weekday's bar that is overtime, capped at the whole bar
pub fn overtime_portion(overtime: u64, average: u64) -> u64 {
    if average == 0 {
        return 0;
    }
    ((overtime as f64 / average as f64 * 100.0).round() as u64).min(100)
}

/// Split a bar of `pct` percent of `width` cells into (regular, overtime) cell counts
pub fn bar_cells(width: u16, pct: u64, overtime_pct: u64) -> (u16, u16) {
    let filled = (width as u64 * pct.min(100) / 100) as u16;
    let overtime = (filled as u64 * overtime_pct / 100) as u16;
    (filled - overtime, overtime)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_percentage() {
        assert_eq!(bar_percentage(3600, 3600), 100);
        assert_eq!(bar_percentage(1800, 3600), 50);
        assert_eq!(bar_percentage(0, 3600), 5);
        assert_eq!(bar_percentage(100, 3600), 5);
        assert_eq!(bar_percentage(0, 0), 5);
    }

    #[test]
    fn test_overtime_portion() {
        assert_eq!(overtime_portion(60, 2160), 3);
        assert_eq!(overtime_portion(500, 100), 100);
        assert_eq!(overtime_portion(10, 0), 0);
    }

    #[test]
    fn test_bar_cells() {
        assert_eq!(bar_cells(40, 100, 0), (40, 0));
        assert_eq!(bar_cells(40, 50, 50), (10, 10));
        assert_eq!(bar_cells(0, 100, 100), (0, 0));
    }
}
