use crate::models::{
    Cause, CausesResponse, Checkin, CreateCheckinRequest, CreateGoalRequest, CreateUserRequest,
    CreateUserResponse, Goal, GoalsResponse,
};
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("could not reach the Ripple Goal service: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Ripple Goal service answered {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("unexpected response from the Ripple Goal service: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Registers the user and returns the backend's user id.
    pub async fn create_user(&self, name: &str, email: &str) -> Result<String, BackendError> {
        let request = CreateUserRequest {
            name: name.to_string(),
            email: email.to_string(),
        };
        let response: CreateUserResponse = self.post("/api/auth/create-user", &request).await?;
        info!(user_id = %response.user_id, "created backend user");
        Ok(response.user_id)
    }

    pub async fn list_causes(&self) -> Result<Vec<Cause>, BackendError> {
        let response: CausesResponse = self.get("/api/causes").await?;
        Ok(response.causes)
    }

    pub async fn create_goal(&self, request: &CreateGoalRequest) -> Result<Goal, BackendError> {
        let goal: Goal = self.post("/api/goals/create-goal", request).await?;
        info!(goal_id = goal.id, cause_id = request.cause_id, "created goal");
        Ok(goal)
    }

    pub async fn list_goals(
        &self,
        user_id: &str,
        include_checkins: bool,
    ) -> Result<Vec<Goal>, BackendError> {
        let path = format!("/api/goals/user/{user_id}?includeCheckins={include_checkins}");
        let response: GoalsResponse = self.get(&path).await?;
        Ok(response.goals)
    }

    pub async fn create_checkin(
        &self,
        request: &CreateCheckinRequest,
    ) -> Result<Checkin, BackendError> {
        let checkin: Checkin = self.post("/api/checkins/create-checkin", request).await?;
        info!(goal_id = request.goal_id, value = request.value, "logged check-in");
        Ok(checkin)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        let url = format!("{}{path}", self.base_url);
        debug!(url = %url, "GET");
        let response = self.client.get(&url).send().await.map_err(|err| {
            error!("request to {url} failed: {err}");
            BackendError::Network(err)
        })?;
        decode(response).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, BackendError> {
        let url = format!("{}{path}", self.base_url);
        debug!(url = %url, "POST");
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|err| {
                error!("request to {url} failed: {err}");
                BackendError::Network(err)
            })?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BackendError> {
    let status = response.status();
    let text = response.text().await?;
    if !status.is_success() {
        error!(status = %status, "backend error: {text}");
        return Err(BackendError::Status { status, body: text });
    }
    Ok(serde_json::from_str(&text)?)
}
