use colored::Colorize;

use crate::metrics::{DayBucket, Status, Summary, WeekBucket};

const BAR_WIDTH: usize = 24;

fn bar(value: usize, max: usize) -> String {
    if max == 0 || value == 0 {
        return String::new();
    }
    let len = (value * BAR_WIDTH).div_ceil(max).max(1);
    "█".repeat(len)
}

pub fn stat_cards(summary: &Summary) -> String {
    let streak = match summary.streak {
        0 => "0".to_string(),
        1 => "1 day".to_string(),
        n => format!("{n} days"),
    };
    [
        format!("{} {}", "Total".dimmed(), summary.total.to_string().bold()),
        format!("{} {}", "Completed".dimmed(), summary.completed.to_string().green().bold()),
        format!("{} {}", "Pending".dimmed(), summary.pending.to_string().yellow().bold()),
        format!("{} {}", "Today".dimmed(), summary.today.to_string().bold()),
        format!("{} {}", "Streak".dimmed(), streak.magenta().bold()),
        format!("{} {}%", "Rate".dimmed(), summary.completion_rate.to_string().bold()),
    ]
    .join("   ")
}

pub fn weekly_activity(days: &[DayBucket]) -> String {
    let max = days.iter().map(|d| d.created).max().unwrap_or(0);
    let mut out = format!("{}\n", "Weekly activity".bold());
    for day in days {
        out.push_str(&format!(
            "  {} {}  {:>3} {} {}\n",
            day.label,
            day.date.format("%m-%d").to_string().dimmed(),
            day.created,
            format!("({} done)", day.completed).dimmed(),
            bar(day.created, max).purple(),
        ));
    }
    out
}

pub fn monthly_trend(weeks: &[WeekBucket]) -> String {
    let max = weeks.iter().map(|w| w.total).max().unwrap_or(0);
    let mut out = format!("{}\n", "Monthly trend".bold());
    for week in weeks {
        out.push_str(&format!(
            "  {:<7} {:>3} total {:>3} completed {}\n",
            week.label,
            week.total,
            week.completed,
            bar(week.completed, max).green(),
        ));
    }
    out
}

pub fn status_split(slices: &[(Status, usize)]) -> String {
    let mut out = format!("{}\n", "Task status".bold());
    if slices.is_empty() {
        out.push_str(&format!("  {}\n", "No tasks yet".dimmed()));
        return out;
    }
    let total: usize = slices.iter().map(|(_, n)| n).sum();
    for (status, n) in slices {
        let label = match status {
            Status::Completed => "Completed".green(),
            Status::Pending => "Pending".yellow(),
        };
        out.push_str(&format!("  {label:<10} {n:>3}  {}\n", bar(*n, total)));
    }
    out
}

pub fn render(
    greeting: &str,
    summary: &Summary,
    days: &[DayBucket],
    weeks: &[WeekBucket],
    slices: &[(Status, usize)],
) -> String {
    [
        greeting.to_string(),
        stat_cards(summary),
        String::new(),
        weekly_activity(days),
        monthly_trend(weeks),
        status_split(slices),
    ]
    .join("\n")
}
