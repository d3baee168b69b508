//! Dashboard statistics derived from a task snapshot.
//!
//! Everything here is a pure function of the tasks and a reference `now`.
//! Calendar days are taken in `now`'s time zone, so the caller decides what
//! "local" means (`chrono::Local` in the binary, fixed offsets in tests).

use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};

use crate::api::models::Task;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    /// Tasks created on today's calendar day.
    pub today: usize,
    /// Consecutive days, ending today, with at least one completion.
    pub streak: u32,
    /// Percentage of completed tasks, rounded.
    pub completion_rate: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayBucket {
    pub date: NaiveDate,
    pub label: &'static str,
    pub created: usize,
    pub completed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekBucket {
    pub label: String,
    pub total: usize,
    pub completed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Completed,
    Pending,
}

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

fn local_day<Tz: TimeZone>(at: &DateTime<Utc>, tz: &Tz) -> NaiveDate {
    at.with_timezone(tz).date_naive()
}

pub fn summarize<Tz: TimeZone>(tasks: &[Task], now: &DateTime<Tz>) -> Summary {
    let tz = now.timezone();
    let today = now.date_naive();
    let total = tasks.len();
    let completed = tasks.iter().filter(|t| t.completed).count();
    let created_today = tasks
        .iter()
        .filter(|t| local_day(&t.created_at, &tz) == today)
        .count();
    let completion_rate = if total == 0 {
        0
    } else {
        ((completed as f64 / total as f64) * 100.0).round() as u8
    };
    Summary {
        total,
        completed,
        pending: total - completed,
        today: created_today,
        streak: streak(tasks, now),
        completion_rate,
    }
}

/// Walks back from today over the distinct days on which a completed task was
/// last updated, stopping at the first day without one.
pub fn streak<Tz: TimeZone>(tasks: &[Task], now: &DateTime<Tz>) -> u32 {
    let tz = now.timezone();
    let days: BTreeSet<NaiveDate> = tasks
        .iter()
        .filter(|t| t.completed)
        .map(|t| local_day(&t.updated_at, &tz))
        .collect();

    let mut expected = now.date_naive();
    let mut count = 0;
    for day in days.iter().rev() {
        if *day != expected {
            break;
        }
        count += 1;
        match expected.pred_opt() {
            Some(prev) => expected = prev,
            None => break,
        }
    }
    count
}

/// One bucket per calendar day for the trailing week, oldest first.
pub fn weekly<Tz: TimeZone>(tasks: &[Task], now: &DateTime<Tz>) -> Vec<DayBucket> {
    let tz = now.timezone();
    let today = now.date_naive();
    (0..7i64)
        .rev()
        .map(|back| {
            let date = today - Duration::days(back);
            let mut bucket = DayBucket {
                date,
                label: WEEKDAYS[date.weekday().num_days_from_sunday() as usize],
                created: 0,
                completed: 0,
            };
            for task in tasks.iter().filter(|t| local_day(&t.created_at, &tz) == date) {
                bucket.created += 1;
                if task.completed {
                    bucket.completed += 1;
                }
            }
            bucket
        })
        .collect()
}

/// Four seven-day blocks ending at `now`, oldest first. Block `i` covers
/// `[now - (4 - i) weeks, now - (3 - i) weeks)` of creation time.
pub fn monthly<Tz: TimeZone>(tasks: &[Task], now: &DateTime<Tz>) -> Vec<WeekBucket> {
    (0..4i64)
        .map(|i| {
            let start = now.clone() - Duration::days((4 - i) * 7);
            let end = start.clone() + Duration::days(7);
            let in_week: Vec<&Task> = tasks
                .iter()
                .filter(|t| t.created_at >= start && t.created_at < end)
                .collect();
            WeekBucket {
                label: format!("Week {}", i + 1),
                total: in_week.len(),
                completed: in_week.iter().filter(|t| t.completed).count(),
            }
        })
        .collect()
}

/// Completed/pending split with empty slices left out.
pub fn distribution(summary: &Summary) -> Vec<(Status, usize)> {
    [(Status::Completed, summary.completed), (Status::Pending, summary.pending)]
        .into_iter()
        .filter(|(_, n)| *n > 0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn zone() -> FixedOffset {
        FixedOffset::east_opt(2 * 3600).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
        zone().with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn now() -> DateTime<FixedOffset> {
        at(2026, 10, 16, 12, 0)
    }

    fn task(id: &str, created: DateTime<FixedOffset>, updated: DateTime<FixedOffset>, completed: bool) -> Task {
        Task {
            id: id.to_string(),
            title: format!("task {id}"),
            description: None,
            completed,
            user_id: Some("u1".into()),
            created_at: created.with_timezone(&Utc),
            updated_at: updated.with_timezone(&Utc),
        }
    }

    fn done_on(id: &str, updated: DateTime<FixedOffset>) -> Task {
        task(id, updated - Duration::days(3), updated, true)
    }

    #[test]
    fn empty_snapshot_is_all_zero() {
        let n = now();
        assert_eq!(summarize(&[], &n), Summary::default());
        let week = weekly(&[], &n);
        assert_eq!(week.len(), 7);
        assert!(week.iter().all(|b| b.created == 0 && b.completed == 0));
        let month = monthly(&[], &n);
        assert_eq!(month.len(), 4);
        assert!(month.iter().all(|b| b.total == 0 && b.completed == 0));
        assert!(distribution(&Summary::default()).is_empty());
    }

    #[test]
    fn counts_add_up() {
        let n = now();
        let tasks = vec![
            task("a", at(2026, 10, 16, 9, 0), at(2026, 10, 16, 9, 0), false),
            task("b", at(2026, 10, 10, 9, 0), at(2026, 10, 16, 10, 0), true),
            task("c", at(2026, 9, 1, 9, 0), at(2026, 9, 2, 10, 0), true),
            task("d", at(2026, 10, 15, 9, 0), at(2026, 10, 15, 9, 0), false),
        ];
        let s = summarize(&tasks, &n);
        assert_eq!(s.total, 4);
        assert_eq!(s.completed, 2);
        assert_eq!(s.pending, 2);
        assert_eq!(s.completed + s.pending, s.total);
        assert_eq!(s.today, 1);
        assert_eq!(s.completion_rate, 50);
        assert_eq!(distribution(&s), vec![(Status::Completed, 2), (Status::Pending, 2)]);
    }

    #[test]
    fn counts_add_up_for_every_mix() {
        let n = now();
        // Every completion pattern over zero to five tasks, which includes the
        // empty, single, all-completed and all-pending snapshots.
        for len in 0..=5usize {
            for mask in 0..(1u32 << len) {
                let tasks: Vec<Task> = (0..len)
                    .map(|i| {
                        let created = n - Duration::days(i as i64 * 3);
                        task(&i.to_string(), created, created, mask & (1 << i) != 0)
                    })
                    .collect();
                let s = summarize(&tasks, &n);
                assert_eq!(s.total, len);
                assert_eq!(s.completed, mask.count_ones() as usize, "mask {mask:b}");
                assert_eq!(s.completed + s.pending, s.total, "mask {mask:b}");
                assert_eq!(distribution(&s).iter().map(|(_, c)| c).sum::<usize>(), s.total);
                let month_total: usize = monthly(&tasks, &n).iter().map(|b| b.total).sum();
                assert!(month_total <= s.total);
            }
        }
    }

    #[test]
    fn completion_rate_rounds() {
        let n = now();
        let tasks = vec![
            done_on("a", at(2026, 10, 1, 9, 0)),
            task("b", at(2026, 10, 1, 9, 0), at(2026, 10, 1, 9, 0), false),
            task("c", at(2026, 10, 1, 9, 0), at(2026, 10, 1, 9, 0), false),
        ];
        assert_eq!(summarize(&tasks, &n).completion_rate, 33);
        let s = summarize(&tasks[..1], &n);
        assert_eq!(s.completion_rate, 100);
        assert_eq!(distribution(&s), vec![(Status::Completed, 1)]);
    }

    #[test]
    fn today_uses_calendar_days_not_24h() {
        let n = at(2026, 10, 16, 0, 30);
        let late = task("late", at(2026, 10, 15, 23, 59), at(2026, 10, 15, 23, 59), false);
        let early = task("early", at(2026, 10, 16, 0, 1), at(2026, 10, 16, 0, 1), false);
        let s = summarize(&[late.clone(), early.clone()], &n);
        assert_eq!(s.today, 1);

        let week = weekly(&[late, early], &n);
        let yesterday = week.iter().find(|b| b.date == NaiveDate::from_ymd_opt(2026, 10, 15).unwrap()).unwrap();
        let today = week.last().unwrap();
        assert_eq!(yesterday.created, 1);
        assert_eq!(today.created, 1);
    }

    #[test]
    fn today_follows_the_reference_zone() {
        // 23:30 UTC on the 15th is already the 16th at UTC+2.
        let created = Utc.with_ymd_and_hms(2026, 10, 15, 23, 30, 0).unwrap().with_timezone(&zone());
        let t = task("z", created, created, false);
        assert_eq!(summarize(&[t.clone()], &now()).today, 1);
        let utc_now = now().with_timezone(&Utc);
        assert_eq!(summarize(&[t], &utc_now).today, 0);
    }

    #[test]
    fn streak_today_and_yesterday() {
        let tasks = vec![
            done_on("a", at(2026, 10, 16, 8, 0)),
            done_on("b", at(2026, 10, 16, 11, 0)),
            done_on("c", at(2026, 10, 15, 20, 0)),
        ];
        assert_eq!(streak(&tasks, &now()), 2);
    }

    #[test]
    fn streak_stops_at_gap() {
        let tasks = vec![
            done_on("a", at(2026, 10, 16, 8, 0)),
            done_on("b", at(2026, 10, 14, 8, 0)),
            done_on("c", at(2026, 10, 13, 8, 0)),
        ];
        assert_eq!(streak(&tasks, &now()), 1);
    }

    #[test]
    fn streak_requires_a_completion_today() {
        assert_eq!(streak(&[done_on("a", at(2026, 10, 15, 8, 0))], &now()), 0);
        assert_eq!(streak(&[done_on("a", at(2026, 10, 14, 8, 0))], &now()), 0);
        assert_eq!(streak(&[], &now()), 0);
    }

    #[test]
    fn streak_ignores_pending_tasks() {
        let tasks = vec![
            task("a", at(2026, 10, 16, 8, 0), at(2026, 10, 16, 8, 0), false),
            done_on("b", at(2026, 10, 15, 8, 0)),
        ];
        assert_eq!(streak(&tasks, &now()), 0);
    }

    #[test]
    fn long_streak_counts_every_day() {
        let n = now();
        let tasks: Vec<Task> = (0..10)
            .map(|d| done_on(&d.to_string(), n - Duration::days(d)))
            .collect();
        assert_eq!(streak(&tasks, &n), 10);
        assert_eq!(summarize(&tasks, &n).streak, 10);
    }

    #[test]
    fn weekly_places_one_task_per_day() {
        let n = now();
        let tasks: Vec<Task> = (0..7)
            .map(|d| {
                let created = n - Duration::days(d) - Duration::hours(1);
                task(&d.to_string(), created, created, d % 2 == 0)
            })
            .collect();
        let week = weekly(&tasks, &n);
        assert_eq!(week.len(), 7);
        assert!(week.iter().all(|b| b.created == 1));
        assert_eq!(week.iter().map(|b| b.completed).sum::<usize>(), 4);
        assert_eq!(week.first().unwrap().date, NaiveDate::from_ymd_opt(2026, 10, 10).unwrap());
        assert_eq!(week.last().unwrap().date, n.date_naive());
        // 2026-10-16 is a Friday.
        assert_eq!(week.last().unwrap().label, "Fri");
        assert_eq!(week.first().unwrap().label, "Sat");
    }

    #[test]
    fn weekly_ignores_older_tasks() {
        let old = task("old", at(2026, 10, 9, 12, 0), at(2026, 10, 9, 12, 0), true);
        assert!(weekly(&[old], &now()).iter().all(|b| b.created == 0));
    }

    #[test]
    fn monthly_blocks_are_half_open() {
        let n = now();
        let tasks = vec![
            // First instant of block 1.
            task("a", n - Duration::days(28), n, true),
            // Last block, just before now.
            task("b", n - Duration::minutes(1), n, false),
            // Boundary between blocks 2 and 3 belongs to block 3.
            task("c", n - Duration::days(14), n, true),
            // Exactly now and older than four weeks fall outside.
            task("d", n, n, false),
            task("e", n - Duration::days(29), n, false),
        ];
        let month = monthly(&tasks, &n);
        let totals: Vec<usize> = month.iter().map(|b| b.total).collect();
        assert_eq!(totals, vec![1, 0, 1, 1]);
        let done: Vec<usize> = month.iter().map(|b| b.completed).collect();
        assert_eq!(done, vec![1, 0, 1, 0]);
        assert_eq!(month[0].label, "Week 1");
        assert_eq!(month[3].label, "Week 4");
    }
}
