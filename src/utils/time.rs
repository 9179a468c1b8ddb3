//! Time utilities: lenient `H:MM` / `HH:MM` / `HH:MM:SS` handling.

/// Parse a clock time and render it as fixed-width `HH:MM`, clamping the
/// hour to 0..=23 and the minute to 0..=59. `None` when the text is not a
/// colon-separated time at all.
pub fn normalize_clock(s: &str) -> Option<String> {
    let mut parts = s.trim().split(':');
    let hh = parts.next()?.trim().parse::<i64>().ok()?;
    let mm = parts.next()?.trim().parse::<i64>().ok()?;
    if let Some(ss) = parts.next() {
        ss.trim().parse::<i64>().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(format!("{:02}:{:02}", hh.clamp(0, 23), mm.clamp(0, 59)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_and_truncates_seconds() {
        assert_eq!(normalize_clock("9:05").as_deref(), Some("09:05"));
        assert_eq!(normalize_clock("09:05").as_deref(), Some("09:05"));
        assert_eq!(normalize_clock("09:05:59").as_deref(), Some("09:05"));
    }

    #[test]
    fn clamps_out_of_range_values() {
        assert_eq!(normalize_clock("25:70").as_deref(), Some("23:59"));
        assert_eq!(normalize_clock("-1:30").as_deref(), Some("00:30"));
    }

    #[test]
    fn rejects_non_times() {
        assert_eq!(normalize_clock("after lunch"), None);
        assert_eq!(normalize_clock("10"), None);
        assert_eq!(normalize_clock("1:2:3:4"), None);
    }
}
