use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PROCESSING_TIME_DAYS: u32 = 15;
pub const SAFETY_BUFFER_DAYS: i64 = 7;
pub const PREPARATION_DAYS: i64 = 14;

/// Submission and decision deadlines derived from an entry date and a
/// processing-time estimate. All arithmetic is calendar-day based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisaTimeline {
    pub latest_submission_date: NaiveDate,
    pub recommended_submission_date: NaiveDate,
    pub expected_decision_date: Option<NaiveDate>,
}

/// Pure date arithmetic; missing inputs fall back to defaults, so there is
/// no failure mode.
pub fn calculate_timeline(
    processing_time_max: Option<u32>,
    entry_date: NaiveDate,
    submission_date: Option<NaiveDate>,
) -> VisaTimeline {
    let max_days = i64::from(processing_time_max.unwrap_or(DEFAULT_PROCESSING_TIME_DAYS));

    let latest_submission_date = entry_date - Duration::days(max_days + SAFETY_BUFFER_DAYS);
    let recommended_submission_date = latest_submission_date - Duration::days(PREPARATION_DAYS);
    let expected_decision_date =
        submission_date.map(|submitted| submitted + Duration::days(max_days));

    VisaTimeline {
        latest_submission_date,
        recommended_submission_date,
        expected_decision_date,
    }
}

/// Urgency classification of an application timeline, consumed by the
/// daily alert sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimelineRisk {
    OnTrack,
    ApplyNow,
    Tight,
    High,
}

impl VisaTimeline {
    /// HIGH once the latest submission date has passed, TIGHT inside the
    /// safety buffer before it, APPLY_NOW from the recommended date on.
    pub fn risk(&self, today: NaiveDate) -> TimelineRisk {
        if today > self.latest_submission_date {
            TimelineRisk::High
        } else if today > self.latest_submission_date - Duration::days(SAFETY_BUFFER_DAYS) {
            TimelineRisk::Tight
        } else if today >= self.recommended_submission_date {
            TimelineRisk::ApplyNow
        } else {
            TimelineRisk::OnTrack
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn deadlines_from_entry_date_and_processing_max() {
        let timeline = calculate_timeline(Some(10), date(2026, 6, 1), None);

        assert_eq!(timeline.latest_submission_date, date(2026, 5, 15));
        assert_eq!(timeline.recommended_submission_date, date(2026, 5, 1));
        assert_eq!(timeline.expected_decision_date, None);
    }

    #[test]
    fn decision_date_from_submission() {
        let timeline = calculate_timeline(Some(10), date(2026, 6, 1), Some(date(2026, 5, 1)));

        assert_eq!(timeline.expected_decision_date, Some(date(2026, 5, 11)));
    }

    #[test]
    fn missing_processing_estimate_defaults_to_fifteen_days() {
        let timeline = calculate_timeline(None, date(2026, 6, 1), None);

        // 15 + 7 = 22 days back from entry
        assert_eq!(timeline.latest_submission_date, date(2026, 5, 10));
        assert_eq!(timeline.recommended_submission_date, date(2026, 4, 26));
    }

    #[test]
    fn risk_classification_boundaries() {
        let timeline = calculate_timeline(Some(10), date(2026, 6, 1), None);
        // latest = 2026-05-15, recommended = 2026-05-01

        assert_eq!(timeline.risk(date(2026, 4, 20)), TimelineRisk::OnTrack);
        assert_eq!(timeline.risk(date(2026, 5, 1)), TimelineRisk::ApplyNow);
        assert_eq!(timeline.risk(date(2026, 5, 9)), TimelineRisk::Tight);
        assert_eq!(timeline.risk(date(2026, 5, 15)), TimelineRisk::Tight);
        assert_eq!(timeline.risk(date(2026, 5, 16)), TimelineRisk::High);
    }
}
