use crate::models::{Cause, Checkin, FrequencyUnit, Goal, Milestone};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;

/// Orders milestones by target value, keeping fetch order for ties.
pub fn rank_milestones(milestones: &[Milestone]) -> Vec<Milestone> {
    let mut ranked = milestones.to_vec();
    ranked.sort_by(|a, b| a.target_value.total_cmp(&b.target_value));
    ranked
}

/// First milestone in `ranked` that `current` has not reached yet.
pub fn next_milestone(ranked: &[Milestone], current: f64) -> Option<&Milestone> {
    ranked.iter().find(|milestone| milestone.target_value > current)
}

/// Percentage of `target` reached by `current`, clamped to `[0, 100]`.
///
/// A target of zero or below divides by one instead, so any progress of at
/// least one saturates the ratio.
pub fn progress_ratio(current: f64, target: f64) -> f64 {
    let divisor = if target > 0.0 { target } else { 1.0 };
    let percentage = current * 100.0 / divisor;
    if percentage.is_nan() || percentage <= 0.0 {
        return 0.0;
    }
    percentage.min(100.0)
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MilestonePartition<'a> {
    pub completed: Vec<&'a Milestone>,
    pub upcoming: Vec<&'a Milestone>,
}

/// Splits milestones into reached and not-yet-reached, preserving input order.
pub fn partition_milestones(milestones: &[Milestone], current: f64) -> MilestonePartition<'_> {
    let (completed, upcoming): (Vec<_>, Vec<_>) = milestones
        .iter()
        .partition(|milestone| milestone.target_value <= current);
    MilestonePartition { completed, upcoming }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub next_milestone: Option<Milestone>,
    pub percentage: f64,
    pub completed: Vec<Milestone>,
    pub upcoming: Vec<Milestone>,
}

pub fn evaluate(milestones: &[Milestone], current: f64, target: f64) -> Evaluation {
    let ranked = rank_milestones(milestones);
    let next = next_milestone(&ranked, current).cloned();
    let partition = partition_milestones(&ranked, current);

    Evaluation {
        next_milestone: next,
        percentage: progress_ratio(current, target),
        completed: partition.completed.into_iter().cloned().collect(),
        upcoming: partition.upcoming.into_iter().cloned().collect(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GrowthStage {
    Seedling,
    Growing,
    Flourishing,
}

impl GrowthStage {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage < 30.0 {
            Self::Seedling
        } else if percentage < 70.0 {
            Self::Growing
        } else {
            Self::Flourishing
        }
    }

    pub fn emoji(self, personal: bool) -> &'static str {
        match (self, personal) {
            (Self::Seedling, true) => "🌱",
            (Self::Growing, true) => "🌿",
            (Self::Flourishing, true) => "🌳",
            (Self::Seedling, false) => "💧",
            (Self::Growing, false) => "🌊",
            (Self::Flourishing, false) => "🌎",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CauseProgress {
    pub cause_id: i64,
    pub name: String,
    pub emoji: String,
    pub current: f64,
    pub target: f64,
    pub percentage: f64,
    pub stage: GrowthStage,
    pub next_unlock: Option<String>,
    pub completed: Vec<Milestone>,
    pub upcoming: Vec<Milestone>,
}

/// Community progress towards the cause's next milestone. Once every
/// milestone is met the highest one becomes the target.
pub fn cause_progress(cause: &Cause) -> CauseProgress {
    let current = cause.current_total.max(0.0);
    let ranked = rank_milestones(&cause.milestones);
    let target = next_milestone(&ranked, current)
        .or_else(|| ranked.last())
        .map(|milestone| milestone.target_value)
        .unwrap_or(0.0);
    let evaluation = evaluate(&ranked, current, target);

    CauseProgress {
        cause_id: cause.id,
        name: cause.name.clone(),
        emoji: cause.emoji.clone(),
        current,
        target,
        percentage: evaluation.percentage,
        stage: GrowthStage::from_percentage(evaluation.percentage),
        next_unlock: evaluation.next_milestone.map(|milestone| milestone.action),
        completed: evaluation.completed,
        upcoming: evaluation.upcoming,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProgress {
    pub goal_id: i64,
    pub title: String,
    pub unit: FrequencyUnit,
    pub current: f64,
    pub target: f64,
    pub percentage: f64,
    pub stage: GrowthStage,
}

pub fn goal_progress(goal: &Goal) -> GoalProgress {
    goal_progress_at(Utc::now(), goal)
}

/// Personal progress for the week containing `now`. Figures reported by the
/// backend take precedence over the locally summed check-ins.
pub fn goal_progress_at(now: DateTime<Utc>, goal: &Goal) -> GoalProgress {
    let (current, target) = match &goal.progress {
        Some(reported) => (reported.current, reported.target),
        None => (
            weekly_total(&goal.checkins, now.date_naive()),
            f64::from(goal.target_frequency),
        ),
    };
    let percentage = progress_ratio(current, target);

    GoalProgress {
        goal_id: goal.id,
        title: goal.title.clone(),
        unit: goal.frequency_unit,
        current,
        target,
        percentage,
        stage: GrowthStage::from_percentage(percentage),
    }
}

/// Sum of check-in values from Monday to Sunday of the week holding `today`.
pub fn weekly_total(checkins: &[Checkin], today: NaiveDate) -> f64 {
    let start = week_start(today);
    let end = start + Duration::days(6);
    checkins
        .iter()
        .filter(|checkin| {
            let date = checkin.checkin_date.date_naive();
            date >= start && date <= end
        })
        .fold(0.0, |total, checkin| total + checkin.value)
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}
