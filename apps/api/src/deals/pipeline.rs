use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::activity::{DealMilestone, DealTask};
use crate::models::deal::Deal;

pub const SIMILAR_DEALS_LIMIT: usize = 3;
/// A deal with no activity for this many days is flagged stale.
pub const STALE_AFTER_DAYS: i64 = 7;
/// Past this the deal is at risk of going cold.
pub const GOING_COLD_AFTER_DAYS: i64 = 10;
pub const MILESTONE_LOOKBACK_DAYS: i64 = 7;
pub const MILESTONE_LOOKAHEAD_DAYS: i64 = 30;
const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActionUrgency {
    Overdue,
    DueSoon,
    OnTrack,
}

/// Urgency of the deal's next action relative to `today`. `None` when no due date is set.
pub fn next_action_urgency(deal: &Deal, today: NaiveDate) -> Option<ActionUrgency> {
    let due = deal.next_action_due_date?;
    let days = (due - today).num_days();
    Some(match days {
        d if d < 0 => ActionUrgency::Overdue,
        d if d <= 1 => ActionUrgency::DueSoon,
        _ => ActionUrgency::OnTrack,
    })
}

/// Other deals in the same industry or at the same stage, in source order.
pub fn similar_deals(deal: &Deal, candidates: &[Deal], limit: usize) -> Vec<Deal> {
    candidates
        .iter()
        .filter(|c| c.id != deal.id)
        .filter(|c| {
            let same_industry = match (&deal.industry, &c.industry) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            };
            same_industry || c.stage == deal.stage
        })
        .take(limit)
        .cloned()
        .collect()
}

/// Whole days elapsed since `last`, rounded down.
pub fn days_since(last: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - last).num_milliseconds().div_euclid(MILLIS_PER_DAY)
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ActivityStatus {
    pub days_since_last_activity: Option<i64>,
    pub is_stale: bool,
    pub going_cold: bool,
}

/// A deal that has never had activity is neither stale nor going cold.
pub fn activity_status(last: Option<DateTime<Utc>>, now: DateTime<Utc>) -> ActivityStatus {
    let days = last.map(|t| days_since(t, now));
    ActivityStatus {
        days_since_last_activity: days,
        is_stale: days.is_some_and(|d| d >= STALE_AFTER_DAYS),
        going_cold: days.is_some_and(|d| d >= GOING_COLD_AFTER_DAYS),
    }
}

/// Inclusive due-date window for the upcoming milestones view.
pub fn milestone_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    (
        today - Duration::days(MILESTONE_LOOKBACK_DAYS),
        today + Duration::days(MILESTONE_LOOKAHEAD_DAYS),
    )
}

#[derive(Debug, Clone, Serialize)]
pub struct UpcomingMilestone {
    #[serde(flatten)]
    pub milestone: DealMilestone,
    pub company_name: String,
    /// Negative when overdue.
    pub days_until: i64,
    pub is_overdue: bool,
}

/// Keeps incomplete milestones inside the window around `today`, earliest due
/// first, each tagged with its deal's company name ("Unknown" if the deal is gone).
pub fn upcoming_milestones(
    milestones: Vec<DealMilestone>,
    company_names: &HashMap<Uuid, String>,
    today: NaiveDate,
) -> Vec<UpcomingMilestone> {
    let (from, to) = milestone_window(today);
    let mut upcoming: Vec<UpcomingMilestone> = milestones
        .into_iter()
        .filter(|m| !m.completed && m.due_date >= from && m.due_date <= to)
        .map(|milestone| {
            let days_until = (milestone.due_date - today).num_days();
            UpcomingMilestone {
                company_name: company_names
                    .get(&milestone.deal_id)
                    .cloned()
                    .unwrap_or_else(|| "Unknown".to_string()),
                days_until,
                is_overdue: days_until < 0,
                milestone,
            }
        })
        .collect();
    upcoming.sort_by_key(|u| u.milestone.due_date);
    upcoming
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct TaskProgress {
    pub completed: usize,
    pub total: usize,
}

pub fn task_progress<'a>(tasks: impl IntoIterator<Item = &'a DealTask>) -> TaskProgress {
    tasks
        .into_iter()
        .fold(TaskProgress::default(), |mut acc, t| {
            acc.total += 1;
            if t.is_completed() {
                acc.completed += 1;
            }
            acc
        })
}
