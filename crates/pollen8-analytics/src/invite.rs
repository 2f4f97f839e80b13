//! Click analytics for invite links.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use pollen8_core::{
    InviteConfig, InviteLink, Pollen8Error, Result, UserId, Validate, MAX_CLICK_WINDOW_DAYS,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::round2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyClicks {
    pub date: NaiveDate,
    pub clicks: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteStats {
    pub code: String,
    pub total_clicks: u64,
    pub window_clicks: u64,
    pub average_daily_clicks: f64,
    pub peak_day: Option<DailyClicks>,
    pub daily: Vec<DailyClicks>,
}

/// New invite with a random code of the configured length.
pub fn create_invite(user_id: UserId, config: &InviteConfig, now: DateTime<Utc>) -> InviteLink {
    let link = InviteLink::new(user_id, config.code_length, now);
    debug!(user = %user_id, code = %link.code, "invite created");
    link
}

/// Zero-filled click counts for the `days` days ending on `end`, oldest first.
///
/// `days` must be in `1..=MAX_CLICK_WINDOW_DAYS`.
pub fn invite_click_series(link: &InviteLink, end: NaiveDate, days: u32) -> Result<Vec<DailyClicks>> {
    if days == 0 || days > MAX_CLICK_WINDOW_DAYS {
        return Err(Pollen8Error::invalid_input(format!(
            "days must be 1..={}, got {}",
            MAX_CLICK_WINDOW_DAYS, days
        )));
    }
    let start = end
        .checked_sub_signed(Duration::days(i64::from(days) - 1))
        .ok_or_else(|| {
            Pollen8Error::invalid_input(format!("{} days before {} is out of range", days, end))
        })?;
    Ok(start
        .iter_days()
        .take(days as usize)
        .map(|date| DailyClicks {
            date,
            clicks: link.clicks_on(date),
        })
        .collect())
}

pub fn summarize_invite(link: &InviteLink, end: NaiveDate, days: u32) -> Result<InviteStats> {
    link.validate()?;
    let daily = invite_click_series(link, end, days)?;
    let window_clicks: u64 = daily.iter().map(|d| d.clicks).sum();

    // Earliest date wins ties.
    let peak_day = daily
        .iter()
        .filter(|d| d.clicks > 0)
        .fold(None::<DailyClicks>, |best, day| match best {
            Some(b) if b.clicks >= day.clicks => Some(b),
            _ => Some(*day),
        });

    let stats = InviteStats {
        code: link.code.clone(),
        total_clicks: link.click_count,
        window_clicks,
        average_daily_clicks: round2(window_clicks as f64 / f64::from(days)),
        peak_day,
        daily,
    };
    debug!(
        code = %stats.code,
        window_clicks = stats.window_clicks,
        days,
        "invite stats"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    fn link_with_clicks(clicks: &[(u32, u32)]) -> InviteLink {
        let mut link = InviteLink::with_code(Uuid::new_v4(), "Pollen8x", at(1, 0));
        for &(day, hour) in clicks {
            link.record_click(at(day, hour)).unwrap();
        }
        link
    }

    #[test]
    fn create_invite_uses_configured_length() {
        let config = InviteConfig {
            code_length: 10,
            ..InviteConfig::default()
        };
        let link = create_invite(Uuid::new_v4(), &config, at(1, 0));
        assert_eq!(link.code.len(), 10);
        assert!(link.is_active);
        assert!(link.validate().is_ok());
    }

    #[test]
    fn series_is_contiguous_and_zero_filled() {
        let link = link_with_clicks(&[(3, 8), (3, 9), (5, 1)]);
        let series = invite_click_series(&link, date(6), 5).unwrap();

        let dates: Vec<NaiveDate> = series.iter().map(|d| d.date).collect();
        assert_eq!(dates, vec![date(2), date(3), date(4), date(5), date(6)]);
        let clicks: Vec<u64> = series.iter().map(|d| d.clicks).collect();
        assert_eq!(clicks, vec![0, 2, 0, 1, 0]);
    }

    #[test]
    fn series_rejects_empty_window() {
        let link = link_with_clicks(&[]);
        assert!(invite_click_series(&link, date(6), 0)
            .unwrap_err()
            .is_invalid_input());
    }

    #[test]
    fn oversized_window_is_invalid_input() {
        let link = link_with_clicks(&[(3, 8)]);
        let err = summarize_invite(&link, date(1), 200_000_000).unwrap_err();
        assert!(err.is_invalid_input());
        assert!(invite_click_series(&link, date(1), MAX_CLICK_WINDOW_DAYS + 1)
            .unwrap_err()
            .is_invalid_input());

        let series = invite_click_series(&link, date(1), MAX_CLICK_WINDOW_DAYS).unwrap();
        assert_eq!(series.len(), MAX_CLICK_WINDOW_DAYS as usize);
        assert_eq!(series.last().map(|d| d.date), Some(date(1)));
    }

    #[test]
    fn window_before_earliest_date_is_invalid_input() {
        let link = link_with_clicks(&[]);
        assert!(invite_click_series(&link, NaiveDate::MIN, 2)
            .unwrap_err()
            .is_invalid_input());
        assert_eq!(invite_click_series(&link, NaiveDate::MIN, 1).unwrap().len(), 1);
    }

    #[test]
    fn stats_cover_only_the_window() {
        let link = link_with_clicks(&[(1, 0), (4, 10), (4, 11), (6, 9), (6, 10), (7, 0)]);
        let stats = summarize_invite(&link, date(7), 4).unwrap();

        assert_eq!(stats.total_clicks, 6);
        assert_eq!(stats.window_clicks, 5);
        assert_eq!(stats.average_daily_clicks, 1.25);
        assert_eq!(
            stats.peak_day,
            Some(DailyClicks {
                date: date(4),
                clicks: 2
            })
        );
        assert_eq!(stats.daily.len(), 4);
    }

    #[test]
    fn quiet_window_has_no_peak() {
        let link = link_with_clicks(&[(1, 0)]);
        let stats = summarize_invite(&link, date(20), 7).unwrap();
        assert_eq!(stats.window_clicks, 0);
        assert_eq!(stats.average_daily_clicks, 0.0);
        assert!(stats.peak_day.is_none());
    }

    #[test]
    fn stats_reject_malformed_code() {
        let link = InviteLink::with_code(Uuid::new_v4(), "bad code", at(1, 0));
        assert!(summarize_invite(&link, date(2), 7).is_err());
    }
}
