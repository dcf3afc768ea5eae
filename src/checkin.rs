use crate::models::{CreateCheckinRequest, FrequencyUnit, Goal};

pub const QUICK_PICKS: [u32; 4] = [1, 2, 3, 5];

const MIN_AMOUNT: u32 = 1;

/// Largest amount a single check-in may log for a goal with `unit`.
pub fn max_amount(unit: Option<FrequencyUnit>) -> u32 {
    match unit {
        Some(FrequencyUnit::Days) => 7,
        _ => 100,
    }
}

/// Amount stepper for the check-in dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckinDraft {
    pub goal_id: Option<i64>,
    pub unit: Option<FrequencyUnit>,
    pub amount: u32,
    pub notes: String,
}

impl Default for CheckinDraft {
    fn default() -> Self {
        Self {
            goal_id: None,
            unit: None,
            amount: MIN_AMOUNT,
            notes: String::new(),
        }
    }
}

impl CheckinDraft {
    /// Selects the goal by id from `goals`; an unknown id clears the
    /// selection. The amount always resets.
    pub fn select_goal(&mut self, goals: &[Goal], goal_id: Option<i64>) {
        let goal = goal_id.and_then(|id| goals.iter().find(|goal| goal.id == id));
        self.goal_id = goal.map(|goal| goal.id);
        self.unit = goal.map(|goal| goal.frequency_unit);
        self.amount = MIN_AMOUNT;
    }

    /// Typed input: only the leading integer counts ("2.5" is 2), no digits
    /// count as zero. The result is clamped to the goal's bounds.
    pub fn set_amount_text(&mut self, text: &str) {
        let value = leading_integer(text);
        let max = i64::from(self.max());
        self.amount = value.clamp(i64::from(MIN_AMOUNT), max) as u32;
    }

    /// Applies a `-`/`+` stepper button. Unknown steps are ignored.
    pub fn nudge(&mut self, step: &str) -> bool {
        match step {
            "inc" => self.increment(),
            "dec" => self.decrement(),
            _ => return false,
        }
        true
    }

    pub fn increment(&mut self) {
        self.amount = (self.amount + 1).min(self.max());
    }

    pub fn decrement(&mut self) {
        self.amount = self.amount.saturating_sub(1).max(MIN_AMOUNT);
    }

    pub fn max(&self) -> u32 {
        max_amount(self.unit)
    }

    pub fn request(&self, user_id: &str) -> Option<CreateCheckinRequest> {
        Some(CreateCheckinRequest {
            goal_id: self.goal_id?,
            value: self.amount,
            notes: self.notes.trim().to_string(),
            user_id: user_id.to_string(),
        })
    }
}

fn leading_integer(text: &str) -> i64 {
    let text = text.trim_start();
    let (negative, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let end = rest
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(rest.len());
    if end == 0 {
        return 0;
    }
    let magnitude = rest[..end].parse::<i64>().unwrap_or(i64::MAX);
    if negative { -magnitude } else { magnitude }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GoalStatus;

    fn goal(id: i64, unit: FrequencyUnit) -> Goal {
        Goal {
            id,
            user_id: None,
            title: format!("goal {id}"),
            target_frequency: 3,
            frequency_unit: unit,
            cause_id: None,
            start_date: None,
            end_date: None,
            status: GoalStatus::Active,
            cause: None,
            checkins: Vec::new(),
            progress: None,
            next_milestone: None,
        }
    }

    #[test]
    fn day_goals_cap_at_seven() {
        let goals = vec![goal(1, FrequencyUnit::Days), goal(2, FrequencyUnit::Minutes)];
        let mut draft = CheckinDraft::default();

        draft.select_goal(&goals, Some(1));
        draft.set_amount_text("12");
        assert_eq!(draft.amount, 7);
        draft.increment();
        assert_eq!(draft.amount, 7);

        draft.select_goal(&goals, Some(2));
        assert_eq!(draft.amount, 1);
        draft.set_amount_text("250");
        assert_eq!(draft.amount, 100);
    }

    #[test]
    fn typed_amount_never_drops_below_one() {
        let mut draft = CheckinDraft::default();
        draft.set_amount_text("nope");
        assert_eq!(draft.amount, 1);
        draft.set_amount_text("-4");
        assert_eq!(draft.amount, 1);
        draft.decrement();
        assert_eq!(draft.amount, 1);
    }

    #[test]
    fn typed_amount_uses_leading_digits() {
        let mut draft = CheckinDraft::default();
        draft.set_amount_text("2.5");
        assert_eq!(draft.amount, 2);
        draft.set_amount_text(" 12abc");
        assert_eq!(draft.amount, 12);
        draft.set_amount_text("abc12");
        assert_eq!(draft.amount, 1);
        draft.set_amount_text("99999999999999999999999");
        assert_eq!(draft.amount, 100);
    }

    #[test]
    fn stepper_buttons_move_by_one() {
        let mut draft = CheckinDraft::default();
        assert!(draft.nudge("inc"));
        assert!(draft.nudge("inc"));
        assert_eq!(draft.amount, 3);
        assert!(draft.nudge("dec"));
        assert_eq!(draft.amount, 2);
        assert!(!draft.nudge("sideways"));
        assert_eq!(draft.amount, 2);
    }

    #[test]
    fn request_requires_selected_goal() {
        let goals = vec![goal(1, FrequencyUnit::Times)];
        let mut draft = CheckinDraft::default();
        assert!(draft.request("42").is_none());

        draft.select_goal(&goals, Some(99));
        assert!(draft.request("42").is_none());

        draft.select_goal(&goals, Some(1));
        draft.increment();
        draft.notes = "  felt good ".to_string();
        let request = draft.request("42").unwrap();
        assert_eq!(request.goal_id, 1);
        assert_eq!(request.value, 2);
        assert_eq!(request.notes, "felt good");
        assert_eq!(request.user_id, "42");
    }
}
