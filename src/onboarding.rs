use crate::models::{CreateGoalRequest, FrequencyUnit, GoalStatus};
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Step {
    #[default]
    Welcome,
    Goal,
    Cause,
    Ready,
}

impl Step {
    pub const ALL: [Step; 4] = [Self::Welcome, Self::Goal, Self::Cause, Self::Ready];

    pub fn number(self) -> usize {
        match self {
            Self::Welcome => 1,
            Self::Goal => 2,
            Self::Cause => 3,
            Self::Ready => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Welcome => "Welcome",
            Self::Goal => "Goal",
            Self::Cause => "Cause",
            Self::Ready => "Ready",
        }
    }

    pub fn next(self) -> Option<Self> {
        match self {
            Self::Welcome => Some(Self::Goal),
            Self::Goal => Some(Self::Cause),
            Self::Cause => Some(Self::Ready),
            Self::Ready => None,
        }
    }

    pub fn previous(self) -> Option<Self> {
        match self {
            Self::Welcome => None,
            Self::Goal => Some(Self::Welcome),
            Self::Cause => Some(Self::Goal),
            Self::Ready => Some(Self::Cause),
        }
    }

    /// Fill fraction of the step indicator bar.
    pub fn completion(self) -> f64 {
        (self.number() - 1) as f64 / 3.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OnboardingForm {
    pub name: String,
    pub goal_title: String,
    pub target_frequency: String,
    pub frequency_unit: FrequencyUnit,
    pub cause_id: Option<i64>,
}

impl Default for OnboardingForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            goal_title: String::new(),
            target_frequency: "3".to_string(),
            frequency_unit: FrequencyUnit::Times,
            cause_id: None,
        }
    }
}

/// Partial form update as posted by the wizard page. Absent fields are left
/// untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormUpdate {
    pub name: Option<String>,
    pub goal_title: Option<String>,
    pub target_frequency: Option<String>,
    pub frequency_unit: Option<String>,
    pub cause_id: Option<String>,
}

pub type FieldErrors = BTreeMap<&'static str, &'static str>;

#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    Moved(Step),
    Invalid,
    Submit(CreateGoalRequest),
}

#[derive(Debug, Clone, Default)]
pub struct Wizard {
    pub step: Step,
    pub form: OnboardingForm,
    pub errors: FieldErrors,
    pub user_id: Option<String>,
}

impl Wizard {
    pub fn new(user_id: Option<String>) -> Self {
        Self {
            user_id,
            ..Self::default()
        }
    }

    /// Applies edited fields; editing a field clears its error.
    pub fn apply(&mut self, update: FormUpdate) {
        if let Some(name) = update.name {
            self.form.name = name;
            self.errors.remove("name");
        }
        if let Some(goal_title) = update.goal_title {
            self.form.goal_title = goal_title;
            self.errors.remove("goalTitle");
        }
        if let Some(target) = update.target_frequency {
            self.form.target_frequency = target;
            self.errors.remove("targetFrequency");
        }
        if let Some(unit) = update.frequency_unit.as_deref().and_then(FrequencyUnit::parse) {
            self.form.frequency_unit = unit;
        }
        if let Some(cause_id) = update.cause_id {
            self.select_cause(cause_id.trim().parse().ok());
        }
    }

    pub fn select_cause(&mut self, cause_id: Option<i64>) {
        self.form.cause_id = cause_id;
        if cause_id.is_some() {
            self.errors.remove("causeId");
        }
    }

    pub fn advance(&mut self) -> Advance {
        self.errors = validate_step(self.step, &self.form);
        if !self.errors.is_empty() {
            return Advance::Invalid;
        }

        match self.step.next() {
            Some(next) => {
                self.step = next;
                Advance::Moved(next)
            }
            None => match self.goal_request() {
                Some(request) => Advance::Submit(request),
                None => Advance::Invalid,
            },
        }
    }

    pub fn back(&mut self) -> Step {
        self.errors.clear();
        if let Some(previous) = self.step.previous() {
            self.step = previous;
        }
        self.step
    }

    /// Goal payload for the completed form, if the form still validates.
    pub fn goal_request(&self) -> Option<CreateGoalRequest> {
        Some(CreateGoalRequest {
            user_id: self.user_id.clone(),
            title: self.form.goal_title.trim().to_string(),
            target_frequency: parse_target(&self.form.target_frequency)?,
            frequency_unit: self.form.frequency_unit,
            cause_id: self.form.cause_id?,
            status: GoalStatus::Active,
        })
    }
}

pub fn validate_step(step: Step, form: &OnboardingForm) -> FieldErrors {
    let mut errors = FieldErrors::new();
    match step {
        Step::Welcome | Step::Ready => {}
        Step::Goal => {
            if form.name.trim().is_empty() {
                errors.insert("name", "Name is required");
            }
            if form.goal_title.trim().is_empty() {
                errors.insert("goalTitle", "Goal description is required");
            }
            if parse_target(&form.target_frequency).is_none() {
                errors.insert("targetFrequency", "Valid target is required");
            }
        }
        Step::Cause => {
            if form.cause_id.is_none() {
                errors.insert("causeId", "Please select a cause");
            }
        }
    }
    errors
}

fn parse_target(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok().filter(|target| *target > 0)
}
