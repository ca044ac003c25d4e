//! Pure helpers for chart colors and the "last updated" notice.

use chrono::{DateTime, Duration, NaiveTime, Utc};

const DISTINCT_COLORS: [&str; 20] = [
    "#E74C3C", "#2980B9", "#27AE60", "#F39C12", "#8E44AD",
    "#16A085", "#D35400", "#C0392B", "#2C3E50", "#9B59B6",
    "#34495E", "#E67E22", "#1ABC9C", "#7D3C98", "#F1C40F",
    "#2ECC71", "#E84393", "#3498DB", "#D68910", "#A569BD",
];

const GOLDEN_RATIO_CONJUGATE: f64 = 0.618033988749895;

/// `n` chart colors. The first twenty are fixed; beyond that, hues step
/// around the wheel by the golden-ratio conjugate from a fixed start, so the
/// same `n` always yields the same colors.
pub fn palette(n: usize) -> Vec<String> {
    let mut colors: Vec<String> = DISTINCT_COLORS
        .iter()
        .take(n)
        .map(|c| c.to_string())
        .collect();

    let mut hue = 0.0_f64;
    while colors.len() < n {
        hue = (hue + GOLDEN_RATIO_CONJUGATE) % 1.0;
        colors.push(format!("hsl({}, 85%, 50%)", (hue * 360.0).round() as u32));
    }

    colors
}

/// The collector job runs daily at 08:10 UTC.
fn collector_run_time() -> NaiveTime {
    NaiveTime::from_hms_opt(8, 10, 0).unwrap_or(NaiveTime::MIN)
}

/// Whole hours since the most recent scheduled collector run at `now`.
pub fn hours_since_update(now: DateTime<Utc>) -> i64 {
    let mut update = now.date_naive().and_time(collector_run_time()).and_utc();
    if now < update {
        update -= Duration::days(1);
    }
    (now - update).num_hours()
}

pub fn last_updated_label(now: DateTime<Utc>) -> String {
    let hours = hours_since_update(now);
    let plural = if hours == 1 { "" } else { "s" };
    format!("Updated about {hours} hour{plural} ago")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn palette_is_prefix_stable_and_deterministic() {
        assert_eq!(palette(3), vec!["#E74C3C", "#2980B9", "#27AE60"]);
        assert_eq!(palette(0).len(), 0);

        let wide = palette(26);
        assert_eq!(wide.len(), 26);
        assert_eq!(&wide[..20], &palette(20)[..]);
        assert!(wide[20].starts_with("hsl("));
        assert_eq!(wide, palette(26));
    }

    #[test]
    fn counts_hours_since_morning_run() {
        let after = Utc.with_ymd_and_hms(2025, 8, 13, 11, 40, 0).unwrap();
        assert_eq!(hours_since_update(after), 3);

        let before = Utc.with_ymd_and_hms(2025, 8, 13, 7, 0, 0).unwrap();
        assert_eq!(hours_since_update(before), 22);
    }

    #[test]
    fn label_uses_singular_for_one_hour() {
        let now = Utc.with_ymd_and_hms(2025, 8, 13, 9, 30, 0).unwrap();
        assert_eq!(last_updated_label(now), "Updated about 1 hour ago");
    }
}
