use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: i64,
    pub target_value: f64,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cause {
    #[serde(deserialize_with = "lenient_id")]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub emoji: String,
    #[serde(default)]
    pub conversion_rate: f64,
    #[serde(default)]
    pub current_total: f64,
    #[serde(rename = "Milestones", default)]
    pub milestones: Vec<Milestone>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrequencyUnit {
    #[default]
    Times,
    Minutes,
    Days,
}

impl FrequencyUnit {
    pub const ALL: [FrequencyUnit; 3] = [Self::Times, Self::Minutes, Self::Days];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Times => "times",
            Self::Minutes => "minutes",
            Self::Days => "days",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Times => "Times per week",
            Self::Minutes => "Minutes per day",
            Self::Days => "Days per week",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "times" => Some(Self::Times),
            "minutes" => Some(Self::Minutes),
            "days" => Some(Self::Days),
            _ => None,
        }
    }
}

impl fmt::Display for FrequencyUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GoalStatus {
    Active,
    Inactive,
    Other(String),
}

impl From<String> for GoalStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "ACTIVE" => Self::Active,
            "INACTIVE" => Self::Inactive,
            _ => Self::Other(value),
        }
    }
}

impl From<GoalStatus> for String {
    fn from(status: GoalStatus) -> Self {
        match status {
            GoalStatus::Active => "ACTIVE".to_string(),
            GoalStatus::Inactive => "INACTIVE".to_string(),
            GoalStatus::Other(value) => value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkin {
    pub id: i64,
    pub goal_id: i64,
    pub checkin_date: DateTime<Utc>,
    pub value: f64,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Progress as reported by the backend alongside a goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportedProgress {
    pub current: f64,
    pub target: f64,
    #[serde(default)]
    pub percentage: Option<f64>,
    #[serde(default)]
    pub frequency_unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: i64,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub user_id: Option<String>,
    pub title: String,
    pub target_frequency: u32,
    pub frequency_unit: FrequencyUnit,
    #[serde(default)]
    pub cause_id: Option<i64>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default = "default_status")]
    pub status: GoalStatus,
    #[serde(rename = "Cause", default)]
    pub cause: Option<Cause>,
    /// Most recent first.
    #[serde(rename = "Checkins", default)]
    pub checkins: Vec<Checkin>,
    #[serde(default)]
    pub progress: Option<ReportedProgress>,
    #[serde(default)]
    pub next_milestone: Option<Milestone>,
}

fn default_status() -> GoalStatus {
    GoalStatus::Active
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserResponse {
    #[serde(deserialize_with = "lenient_string")]
    pub user_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CausesResponse {
    #[serde(default)]
    pub causes: Vec<Cause>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGoalRequest {
    pub user_id: Option<String>,
    pub title: String,
    pub target_frequency: u32,
    pub frequency_unit: FrequencyUnit,
    pub cause_id: i64,
    pub status: GoalStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoalsResponse {
    #[serde(default)]
    pub goals: Vec<Goal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckinRequest {
    pub goal_id: i64,
    pub value: u32,
    pub notes: String,
    pub user_id: String,
}

/// Ids show up both as JSON numbers and as numeric strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            Self::Number(id) => id.to_string(),
            Self::Text(text) => text,
        }
    }
}

fn lenient_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match RawId::deserialize(deserializer)? {
        RawId::Number(id) => Ok(id),
        RawId::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(RawId::deserialize(deserializer)?.into_string())
}

fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawId>::deserialize(deserializer)?.map(RawId::into_string))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cause_accepts_string_id_and_missing_milestones() {
        let cause: Cause = serde_json::from_value(json!({
            "id": "7",
            "name": "Clean Oceans",
            "emoji": "🌊",
            "conversionRate": 150
        }))
        .unwrap();
        assert_eq!(cause.id, 7);
        assert!(cause.milestones.is_empty());
        assert_eq!(cause.current_total, 0.0);
    }

    #[test]
    fn goal_reads_capitalised_relations() {
        let goal: Goal = serde_json::from_value(json!({
            "id": 1,
            "userId": "42",
            "title": "Meditate",
            "targetFrequency": 5,
            "frequencyUnit": "days",
            "causeId": 2,
            "status": "PAUSED",
            "Cause": {
                "id": 2,
                "name": "Mental Health Support",
                "emoji": "🧠",
                "conversionRate": 150,
                "currentTotal": 34250,
                "Milestones": [{ "id": 1, "targetValue": 10000, "action": "Fund a workshop" }]
            },
            "Checkins": [{
                "id": 9,
                "goalId": 1,
                "checkinDate": "2026-01-05T08:00:00Z",
                "value": 2,
                "notes": null
            }]
        }))
        .unwrap();

        assert_eq!(goal.frequency_unit, FrequencyUnit::Days);
        assert_eq!(goal.status, GoalStatus::Other("PAUSED".to_string()));
        assert_eq!(goal.cause.as_ref().map(|c| c.milestones.len()), Some(1));
        assert_eq!(goal.checkins[0].value, 2.0);
    }

    #[test]
    fn create_goal_request_uses_wire_names() {
        let payload = CreateGoalRequest {
            user_id: Some("42".to_string()),
            title: "Run".to_string(),
            target_frequency: 3,
            frequency_unit: FrequencyUnit::Times,
            cause_id: 2,
            status: GoalStatus::Active,
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({
                "userId": "42",
                "title": "Run",
                "targetFrequency": 3,
                "frequencyUnit": "times",
                "causeId": 2,
                "status": "ACTIVE"
            })
        );
    }

    #[test]
    fn create_user_response_accepts_numeric_id() {
        let response: CreateUserResponse = serde_json::from_value(json!({ "user_id": 12 })).unwrap();
        assert_eq!(response.user_id, "12");
    }
}
