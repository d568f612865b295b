//! Pure aggregates over rounds, sessions and the full history.
//!
//! History slices are ordered most-recent-first, the way `SessionHistory`
//! stores them. Calendar questions (today, streaks, per-day performance) are
//! answered in the time zone of the `now` value passed in.

pub mod format;

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use crate::models::{RoundOutcome, SessionRecord};

/// Number of entries shown on the personal records board.
pub const TOP_RECORDS_LIMIT: usize = 10;

fn caught_times(rounds: &[RoundOutcome]) -> impl Iterator<Item = f64> + '_ {
    rounds.iter().filter_map(RoundOutcome::caught_time)
}

pub fn caught_count(rounds: &[RoundOutcome]) -> usize {
    rounds.iter().filter(|round| round.caught).count()
}

pub fn success_rate(rounds: &[RoundOutcome]) -> f64 {
    rate(caught_count(rounds), rounds.len())
}

pub fn average_reaction_time(rounds: &[RoundOutcome]) -> Option<f64> {
    mean(caught_times(rounds))
}

pub fn best_reaction_time(rounds: &[RoundOutcome]) -> Option<f64> {
    caught_times(rounds).min_by(f64::total_cmp)
}

pub fn worst_reaction_time(rounds: &[RoundOutcome]) -> Option<f64> {
    caught_times(rounds).max_by(f64::total_cmp)
}

fn rate(caught: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    caught as f64 / total as f64 * 100.0
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub sessions: usize,
    pub rounds: usize,
    pub caught: usize,
    pub missed: usize,
}

impl Totals {
    pub fn success_rate(&self) -> f64 {
        rate(self.caught, self.caught + self.missed)
    }
}

pub fn totals<'a>(sessions: impl IntoIterator<Item = &'a SessionRecord>) -> Totals {
    sessions
        .into_iter()
        .fold(Totals::default(), |mut acc, session| {
            let caught = session.caught_count();
            acc.sessions += 1;
            acc.rounds += session.total_rounds();
            acc.caught += caught;
            acc.missed += session.total_rounds() - caught;
            acc
        })
}

pub fn overall_best_reaction_time(history: &[SessionRecord]) -> Option<f64> {
    history
        .iter()
        .filter_map(SessionRecord::best_reaction_time)
        .min_by(f64::total_cmp)
}

pub fn overall_average_reaction_time(history: &[SessionRecord]) -> Option<f64> {
    mean(history.iter().flat_map(|session| caught_times(&session.rounds)))
}

fn local_day<Tz: TimeZone>(at: &DateTime<Utc>, tz: &Tz) -> NaiveDate {
    at.with_timezone(tz).date_naive()
}

pub fn sessions_for_date<'a, Tz: TimeZone>(
    history: &'a [SessionRecord],
    day: NaiveDate,
    tz: &Tz,
) -> Vec<&'a SessionRecord> {
    history
        .iter()
        .filter(|session| local_day(&session.date, tz) == day)
        .collect()
}

/// Success rate across every session played on `day`; `None` when nothing was played.
pub fn performance_for_date<Tz: TimeZone>(
    history: &[SessionRecord],
    day: NaiveDate,
    tz: &Tz,
) -> Option<f64> {
    let day_totals = totals(sessions_for_date(history, day, tz));
    if day_totals.rounds == 0 {
        return None;
    }
    Some(day_totals.success_rate())
}

pub fn today_totals<Tz: TimeZone>(history: &[SessionRecord], now: &DateTime<Tz>) -> Totals {
    totals(sessions_for_date(history, now.date_naive(), &now.timezone()))
}

/// Consecutive training days ending today, or ending yesterday if today has no session yet.
pub fn current_streak<Tz: TimeZone>(history: &[SessionRecord], now: &DateTime<Tz>) -> u32 {
    let tz = now.timezone();
    let trained: HashSet<NaiveDate> = history
        .iter()
        .map(|session| local_day(&session.date, &tz))
        .collect();

    let today = now.date_naive();
    let mut day = if trained.contains(&today) {
        Some(today)
    } else {
        today.pred_opt()
    };

    let mut streak = 0;
    while let Some(current) = day {
        if !trained.contains(&current) {
            break;
        }
        streak += 1;
        day = current.pred_opt();
    }
    streak
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalRecord {
    pub rank: usize,
    pub reaction_time: f64,
    pub date: DateTime<Utc>,
}

/// Fastest catches across the history. Equal times keep their encounter order.
pub fn top_records(history: &[SessionRecord], limit: usize) -> Vec<PersonalRecord> {
    let mut catches: Vec<(f64, DateTime<Utc>)> = history
        .iter()
        .flat_map(|session| caught_times(&session.rounds).map(move |t| (t, session.date)))
        .collect();

    catches.sort_by(|a, b| a.0.total_cmp(&b.0));

    catches
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(index, (reaction_time, date))| PersonalRecord {
            rank: index + 1,
            reaction_time,
            date,
        })
        .collect()
}

/// Whether `session` matches or beats the best time found in `history`.
pub fn is_new_record(session: &SessionRecord, history: &[SessionRecord]) -> bool {
    match (
        session.best_reaction_time(),
        overall_best_reaction_time(history),
    ) {
        (Some(best), Some(all_time)) => best <= all_time,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Difficulty;
    use chrono::{Duration, FixedOffset};

    fn session_at(date: DateTime<Utc>, times: &[Option<f64>]) -> SessionRecord {
        let mut session = SessionRecord::new(Difficulty::Expert, date);
        for (index, time) in times.iter().enumerate() {
            let number = index as u32 + 1;
            session.rounds.push(match time {
                Some(t) => RoundOutcome::caught(number, 2.0, *t, date),
                None => RoundOutcome::missed(number, 2.0, date),
            });
        }
        session.end_time = Some(date);
        session
    }

    fn noon(days_ago: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap() - Duration::days(days_ago)
    }

    #[test]
    fn success_rate_is_zero_without_rounds() {
        assert_eq!(success_rate(&[]), 0.0);
        assert!(average_reaction_time(&[]).is_none());
    }

    #[test]
    fn streak_counts_back_from_today() {
        let history = vec![
            session_at(noon(0), &[Some(0.3)]),
            session_at(noon(1), &[Some(0.3)]),
            session_at(noon(2), &[None]),
            session_at(noon(4), &[Some(0.3)]),
        ];
        assert_eq!(current_streak(&history, &noon(0)), 3);
    }

    #[test]
    fn streak_is_zero_without_sessions() {
        assert_eq!(current_streak(&[], &noon(0)), 0);
    }

    #[test]
    fn streak_starts_yesterday_when_today_is_untrained() {
        let history = vec![session_at(noon(1), &[Some(0.3)])];
        assert_eq!(current_streak(&history, &noon(0)), 1);

        let stale = vec![session_at(noon(2), &[Some(0.3)])];
        assert_eq!(current_streak(&stale, &noon(0)), 0);
    }

    #[test]
    fn streak_uses_the_calendar_of_now() {
        // 23:30 UTC is already the next day at UTC+2.
        let late = Utc.with_ymd_and_hms(2024, 6, 14, 23, 30, 0).unwrap();
        let history = vec![session_at(late, &[Some(0.3)])];
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let now = Utc
            .with_ymd_and_hms(2024, 6, 15, 8, 0, 0)
            .unwrap()
            .with_timezone(&offset);

        assert_eq!(current_streak(&history, &now), 1);
        assert_eq!(today_totals(&history, &now).sessions, 1);
    }

    #[test]
    fn top_records_are_stable_for_ties() {
        let first = session_at(noon(0), &[Some(0.31), Some(0.18)]);
        let second = session_at(noon(1), &[Some(0.52), None, Some(0.18)]);
        let history = vec![first, second];

        let records = top_records(&history, TOP_RECORDS_LIMIT);
        let times: Vec<f64> = records.iter().map(|r| r.reaction_time).collect();
        let ranks: Vec<usize> = records.iter().map(|r| r.rank).collect();

        assert_eq!(times, vec![0.18, 0.18, 0.31, 0.52]);
        assert_eq!(ranks, vec![1, 2, 3, 4]);
        assert_eq!(records[0].date, noon(0));
        assert_eq!(records[1].date, noon(1));
    }

    #[test]
    fn top_records_are_limited() {
        let times: Vec<Option<f64>> = (0..15).map(|i| Some(0.2 + i as f64 * 0.01)).collect();
        let history = vec![session_at(noon(0), &times)];
        let records = top_records(&history, TOP_RECORDS_LIMIT);
        assert_eq!(records.len(), 10);
        assert_eq!(records.last().unwrap().rank, 10);
    }

    #[test]
    fn per_day_performance_merges_sessions() {
        let history = vec![
            session_at(noon(0), &[Some(0.3), None]),
            session_at(noon(0) - Duration::hours(2), &[Some(0.3), Some(0.4)]),
            session_at(noon(3), &[None]),
        ];

        let today = noon(0).date_naive();
        assert_eq!(performance_for_date(&history, today, &Utc), Some(75.0));
        assert_eq!(
            performance_for_date(&history, noon(3).date_naive(), &Utc),
            Some(0.0)
        );
        assert_eq!(performance_for_date(&history, noon(1).date_naive(), &Utc), None);
    }

    #[test]
    fn history_totals_and_extrema() {
        let history = vec![
            session_at(noon(0), &[Some(0.4), None]),
            session_at(noon(1), &[Some(0.2), Some(0.3), None]),
        ];

        let all = totals(&history);
        assert_eq!(all.sessions, 2);
        assert_eq!(all.rounds, 5);
        assert_eq!(all.caught, 3);
        assert_eq!(all.missed, 2);
        assert_eq!(all.success_rate(), 60.0);
        assert_eq!(overall_best_reaction_time(&history), Some(0.2));

        let average = overall_average_reaction_time(&history).unwrap();
        assert!((average - 0.3).abs() < 1e-9);
    }

    #[test]
    fn new_record_compares_against_all_time_best() {
        let history = vec![session_at(noon(1), &[Some(0.25)])];
        assert!(is_new_record(&session_at(noon(0), &[Some(0.25)]), &history));
        assert!(!is_new_record(&session_at(noon(0), &[Some(0.26)]), &history));
        assert!(!is_new_record(&session_at(noon(0), &[None]), &history));
    }
}
