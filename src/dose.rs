//! Dose schedule arithmetic
//!
//! Pure time-of-day calculations: generating a medication's dose times
//! for the day, classifying how urgent the next dose is, and describing
//! elapsed time since the last dose.

use crate::config::{CLOCK_FORMAT, MINUTES_PER_DAY, MIN_DOSE_INTERVAL_MINUTES};
use chrono::{DateTime, Duration, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// How urgent the next dose is, most urgent first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoseUrgency {
    Overdue,
    Imminent,
    Soon,
    Later,
    Scheduled,
}

/// Color tag attached to a status read-out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusColor {
    Red,
    Orange,
    Amber,
    Blue,
    Green,
    Gray,
}

impl StatusColor {
    pub fn hex(self) -> &'static str {
        match self {
            StatusColor::Red => "#E74C3C",
            StatusColor::Orange => "#E67E22",
            StatusColor::Amber => "#F39C12",
            StatusColor::Blue => "#3498DB",
            StatusColor::Green => "#27AE60",
            StatusColor::Gray => "#95A5A6",
        }
    }
}

/// Classified status of an upcoming dose
#[derive(Debug, Clone, Serialize)]
pub struct DoseStatus {
    pub urgency: DoseUrgency,
    pub label: String,
    pub color: StatusColor,
}

/// Generate the day's dose times as HH:mm clock strings, evenly spaced
/// from `start` at `frequency_hours` apart until 24 hours are covered.
/// The cursor wraps past midnight, so a schedule started in the evening
/// continues into the small hours.
pub fn generate_dose_times(start: NaiveTime, frequency_hours: f32) -> Vec<String> {
    let interval = ((frequency_hours * 60.0) as i64).max(MIN_DOSE_INTERVAL_MINUTES);

    let mut times = Vec::new();
    let mut cursor = start;
    let mut covered: i64 = 0;

    while covered < MINUTES_PER_DAY {
        times.push(cursor.format(CLOCK_FORMAT).to_string());
        cursor = cursor + Duration::minutes(interval);
        covered += interval;
    }

    times
}

/// Pick the next dose strictly after `now` in clock order, wrapping to
/// the earliest time of day when the rest of today is exhausted.
pub fn next_dose_after(times: &[String], now: NaiveTime) -> Option<String> {
    if times.is_empty() {
        return None;
    }

    let now_minutes = minutes_of_day(now);
    let mut sorted: Vec<String> = times.to_vec();
    sorted.sort_by_key(|t| clock_minutes(t));

    let next = sorted
        .iter()
        .find(|t| clock_minutes(t) > now_minutes)
        .unwrap_or(&sorted[0]);

    Some(next.clone())
}

/// Classify how urgent a dose at `next_dose` is relative to `now`.
///
/// Works purely on the two times of day; a dose earlier on the clock than
/// `now` reads as overdue even if it belongs to tomorrow.
pub fn classify_dose(next_dose: &str, now: NaiveTime) -> DoseStatus {
    let diff = clock_minutes(next_dose) - minutes_of_day(now);

    if diff <= 0 {
        DoseStatus {
            urgency: DoseUrgency::Overdue,
            label: "Time to take now".to_string(),
            color: StatusColor::Red,
        }
    } else if diff <= 15 {
        DoseStatus {
            urgency: DoseUrgency::Imminent,
            label: "Very soon".to_string(),
            color: StatusColor::Amber,
        }
    } else if diff <= 60 {
        DoseStatus {
            urgency: DoseUrgency::Soon,
            label: format!("In {} minutes", diff),
            color: StatusColor::Blue,
        }
    } else if diff <= 180 {
        DoseStatus {
            urgency: DoseUrgency::Later,
            label: format!("In {}h {}min", diff / 60, diff % 60),
            color: StatusColor::Green,
        }
    } else {
        DoseStatus {
            urgency: DoseUrgency::Scheduled,
            label: "Scheduled".to_string(),
            color: StatusColor::Gray,
        }
    }
}

/// Human-readable elapsed time since the last recorded dose.
pub fn describe_time_since(last_taken: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let taken = match last_taken {
        Some(taken) => taken,
        None => return "Not taken today".to_string(),
    };

    let minutes = now.signed_duration_since(taken).num_minutes();

    if minutes < 5 {
        "Just taken".to_string()
    } else if minutes < 60 {
        format!("{} min ago", minutes)
    } else if minutes < 24 * 60 {
        format!("{}h {}min ago", minutes / 60, minutes % 60)
    } else {
        format!("{} days ago", minutes / (24 * 60))
    }
}

/// Parse an HH:mm clock string into minutes of the day.
/// Unparseable components count as zero.
fn clock_minutes(clock: &str) -> i64 {
    let mut parts = clock.splitn(2, ':');
    let hours: i64 = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    let minutes: i64 = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    hours * 60 + minutes
}

fn minutes_of_day(time: NaiveTime) -> i64 {
    i64::from(time.hour()) * 60 + i64::from(time.minute())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    #[test]
    fn test_generate_dose_times_count_for_whole_hours() {
        let start = at(9, 30);

        for hours in 1..=24u32 {
            let times = generate_dose_times(start, hours as f32);
            let interval = i64::from(hours) * 60;
            let expected = (MINUTES_PER_DAY + interval - 1) / interval;

            assert_eq!(
                times.len() as i64,
                expected,
                "frequency {}h produced wrong entry count",
                hours
            );

            for time in &times {
                assert!(
                    NaiveTime::parse_from_str(time, CLOCK_FORMAT).is_ok(),
                    "'{}' is not a valid clock string",
                    time
                );
            }
        }
    }

    #[test]
    fn test_generate_dose_times_spacing() {
        let times = generate_dose_times(at(8, 0), 6.0);
        assert_eq!(times, vec!["08:00", "14:00", "20:00", "02:00"]);
    }

    #[test]
    fn test_generate_wraps_past_midnight() {
        let times = generate_dose_times(at(22, 0), 8.0);
        assert_eq!(times, vec!["22:00", "06:00", "14:00"]);
    }

    #[test]
    fn test_generate_long_interval_single_entry() {
        assert_eq!(generate_dose_times(at(7, 15), 24.0), vec!["07:15"]);
        assert_eq!(generate_dose_times(at(7, 15), 48.0), vec!["07:15"]);
    }

    #[test]
    fn test_generate_fractional_frequency() {
        let times = generate_dose_times(at(0, 0), 0.5);
        assert_eq!(times.len(), 48);
        assert_eq!(times[1], "00:30");
    }

    #[test]
    fn test_generate_interval_floor() {
        // 0.01h is under a minute; the interval clamps to one minute
        let times = generate_dose_times(at(0, 0), 0.01);
        assert_eq!(times.len(), MINUTES_PER_DAY as usize);
        assert_eq!(times[1], "00:01");
    }

    #[test]
    fn test_next_dose_after_picks_upcoming() {
        let times = vec!["22:00".to_string(), "06:00".to_string(), "14:00".to_string()];

        assert_eq!(next_dose_after(&times, at(5, 0)), Some("06:00".to_string()));
        assert_eq!(next_dose_after(&times, at(6, 0)), Some("14:00".to_string()));
        assert_eq!(next_dose_after(&times, at(23, 30)), Some("06:00".to_string()));
        assert_eq!(next_dose_after(&[], at(12, 0)), None);
    }

    #[test]
    fn test_classify_tier_boundaries() {
        let now = at(12, 0);

        assert_eq!(classify_dose("12:00", now).urgency, DoseUrgency::Overdue);
        assert_eq!(classify_dose("11:00", now).urgency, DoseUrgency::Overdue);
        assert_eq!(classify_dose("12:01", now).urgency, DoseUrgency::Imminent);
        assert_eq!(classify_dose("12:15", now).urgency, DoseUrgency::Imminent);
        assert_eq!(classify_dose("12:16", now).urgency, DoseUrgency::Soon);
        assert_eq!(classify_dose("13:00", now).urgency, DoseUrgency::Soon);
        assert_eq!(classify_dose("13:01", now).urgency, DoseUrgency::Later);
        assert_eq!(classify_dose("15:00", now).urgency, DoseUrgency::Later);
        assert_eq!(classify_dose("15:01", now).urgency, DoseUrgency::Scheduled);
    }

    #[test]
    fn test_classify_labels_and_colors() {
        let now = at(9, 0);

        let overdue = classify_dose("08:00", now);
        assert_eq!(overdue.label, "Time to take now");
        assert_eq!(overdue.color.hex(), "#E74C3C");

        let soon = classify_dose("09:45", now);
        assert_eq!(soon.label, "In 45 minutes");
        assert_eq!(soon.color, StatusColor::Blue);

        let later = classify_dose("11:30", now);
        assert_eq!(later.label, "In 2h 30min");
        assert_eq!(later.color, StatusColor::Green);
    }

    #[test]
    fn test_classify_is_monotonic_in_time_to_dose() {
        let now = at(0, 0);
        let mut previous = classify_dose("00:00", now).urgency;

        for minutes in 1..MINUTES_PER_DAY {
            let clock = format!("{:02}:{:02}", minutes / 60, minutes % 60);
            let urgency = classify_dose(&clock, now).urgency;

            assert!(
                urgency >= previous,
                "urgency regressed at {} minutes out",
                minutes
            );
            previous = urgency;
        }
    }

    #[test]
    fn test_classify_unparseable_time_counts_as_midnight() {
        let status = classify_dose("soon", at(12, 0));
        assert_eq!(status.urgency, DoseUrgency::Overdue);
    }

    #[test]
    fn test_describe_time_since_tiers() {
        let now = Utc::now();

        assert_eq!(describe_time_since(None, now), "Not taken today");
        assert_eq!(
            describe_time_since(Some(now - Duration::minutes(2)), now),
            "Just taken"
        );
        assert_eq!(
            describe_time_since(Some(now - Duration::minutes(30)), now),
            "30 min ago"
        );
        assert_eq!(
            describe_time_since(Some(now - Duration::minutes(150)), now),
            "2h 30min ago"
        );
        assert_eq!(
            describe_time_since(Some(now - Duration::days(3)), now),
            "3 days ago"
        );
    }
}
