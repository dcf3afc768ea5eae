use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum IdentityError {
    /// Message exactly as the provider reported it.
    #[error("{0}")]
    Provider(String),
    #[error("{0}")]
    Network(#[from] reqwest::Error),
    #[error("unexpected identity provider response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub local_id: String,
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    pub id_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Clone)]
pub struct IdentityClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl IdentityClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, IdentityError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, IdentityError> {
        let user = self.call("accounts:signUp", email, password).await?;
        info!(uid = %user.local_id, "registered account");
        Ok(user)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, IdentityError> {
        let user = self.call("accounts:signInWithPassword", email, password).await?;
        info!(uid = %user.local_id, "signed in");
        Ok(user)
    }

    async fn call(
        &self,
        method: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, IdentityError> {
        let url = format!("{}/{method}", self.base_url);
        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&PasswordRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            let message = provider_message(&text);
            error!(status = %status, "identity provider rejected {method}: {message}");
            return Err(IdentityError::Provider(message));
        }
        Ok(serde_json::from_str(&text)?)
    }
}

fn provider_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_message_is_passed_through() {
        let body = r#"{"error":{"code":400,"message":"EMAIL_EXISTS","errors":[]}}"#;
        assert_eq!(provider_message(body), "EMAIL_EXISTS");
        assert_eq!(provider_message(" upstream down "), "upstream down");
    }

    #[test]
    fn auth_user_reads_provider_fields() {
        let user: AuthUser = serde_json::from_str(
            r#"{"localId":"abc","email":"a@b.c","displayName":"","idToken":"t","refreshToken":"r"}"#,
        )
        .unwrap();
        assert_eq!(user.local_id, "abc");
        assert_eq!(user.display_name.as_deref(), Some(""));
    }
}
