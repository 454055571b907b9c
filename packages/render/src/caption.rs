//! Post caption built from a [`DailySummary`].

use daily_quakes_quake_models::{DailySummary, MagnitudeBucket};

/// Long date format used in the caption and on the map (e.g., "January 09, 2024").
pub const LONG_DATE_FORMAT: &str = "%B %d, %Y";

const fn bucket_marker(bucket: MagnitudeBucket) -> &'static str {
    match bucket {
        MagnitudeBucket::BelowTwo => "\u{1F7E2}",
        MagnitudeBucket::TwoToThree => "\u{1F7E1}",
        MagnitudeBucket::ThreeToFour => "\u{1F7E0}",
        MagnitudeBucket::FourToFive => "\u{1F534}",
        MagnitudeBucket::FivePlus => "\u{26AB}",
    }
}

/// Formats a magnitude the way the caption and map show it (`M6.0`).
#[must_use]
pub fn format_magnitude(magnitude: f64) -> String {
    format!("M{magnitude:.1}")
}

/// Builds the caption text.
///
/// Lists the day, the total, every bucket with its share of the total,
/// and the strongest event last so that a length cut drops the least
/// important line.
#[must_use]
pub fn build_caption(summary: &DailySummary) -> String {
    let date = summary.date.format(LONG_DATE_FORMAT);
    let mut caption = format!("\u{1F30D} Global Earthquakes on {date}:\n\n");

    if summary.is_empty() {
        caption.push_str("No earthquakes recorded.");
        return caption;
    }

    let noun = if summary.total == 1 {
        "Earthquake"
    } else {
        "Earthquakes"
    };
    let mut lines = vec![format!("\u{1F50D} {} {noun} detected.", summary.total)];

    for &bucket in MagnitudeBucket::ALL {
        lines.push(format!(
            "{} {} ({:.1}%) M{}",
            bucket_marker(bucket),
            summary.count(bucket),
            summary.share(bucket),
            bucket.label()
        ));
    }

    if summary.unrated > 0 {
        lines.push(format!("\u{2754} {} without magnitude", summary.unrated));
    }

    if let Some(max) = summary.max_magnitude {
        let mut strongest = format!("\u{1F4C8} Strongest: {}", format_magnitude(max));
        if let Some(place) = &summary.strongest_place {
            strongest.push_str(", ");
            strongest.push_str(place);
        }
        lines.push(strongest);
    }

    caption.push_str(&lines.join("\n"));
    caption
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, NaiveDate};
    use daily_quakes_quake_models::EarthquakeEvent;

    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 9).unwrap()
    }

    fn event(magnitude: Option<f64>) -> EarthquakeEvent {
        EarthquakeEvent {
            id: "x".to_string(),
            time: DateTime::from_timestamp(1_704_800_000, 0).unwrap(),
            latitude: -33.0,
            longitude: -71.6,
            magnitude,
            magnitude_type: None,
            depth_km: None,
            place: Some("offshore Valparaiso, Chile".to_string()),
        }
    }

    #[test]
    fn caption_for_three_event_day() {
        let events = [event(Some(1.5)), event(Some(4.2)), event(Some(6.0))];
        let summary = daily_quakes_analytics::summarize(date(), &events);
        let caption = build_caption(&summary);

        assert!(caption.starts_with("\u{1F30D} Global Earthquakes on January 09, 2024:"));
        assert!(caption.contains("3 Earthquakes detected."));
        assert!(caption.contains("1 (33.3%) M<2"));
        assert!(caption.contains("0 (0.0%) M2-3"));
        assert!(caption.contains("1 (33.3%) M5+"));
        assert!(caption.ends_with("Strongest: M6.0, offshore Valparaiso, Chile"));
    }

    #[test]
    fn one_line_per_figure() {
        let summary = daily_quakes_analytics::summarize(date(), &[event(None), event(Some(3.4))]);
        let caption = build_caption(&summary);
        let lines: Vec<&str> = caption.lines().collect();

        assert_eq!(lines.len(), 10);
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "\u{1F50D} 2 Earthquakes detected.");
        assert_eq!(lines[5], "\u{1F7E0} 1 (50.0%) M3-4");
        assert_eq!(lines[8], "\u{2754} 1 without magnitude");
        assert_eq!(lines[9], "\u{1F4C8} Strongest: M3.4, offshore Valparaiso, Chile");
    }

    #[test]
    fn caption_for_empty_day() {
        let caption = build_caption(&DailySummary::empty(date()));
        assert!(caption.contains("January 09, 2024"));
        assert!(caption.ends_with("No earthquakes recorded."));
    }

    #[test]
    fn caption_mentions_unrated_events() {
        let summary = daily_quakes_analytics::summarize(date(), &[event(None), event(Some(2.0))]);
        let caption = build_caption(&summary);
        assert!(caption.contains("1 without magnitude"));
        assert!(caption.contains("2 Earthquakes detected."));
    }

    #[test]
    fn singular_noun_for_one_event() {
        let summary = daily_quakes_analytics::summarize(date(), &[event(Some(2.0))]);
        assert!(build_caption(&summary).contains("1 Earthquake detected."));
    }
}
