use crate::backend::BackendClient;
use crate::chat::{ChatRelay, Transcript};
use crate::checkin::CheckinDraft;
use crate::config::Config;
use crate::identity::IdentityClient;
use crate::models::{Cause, Goal};
use crate::notify::Toasts;
use crate::onboarding::Wizard;
use crate::sequencer::{Sequencer, Ticket};
use crate::storage::LocalData;
use axum::http::{header::COOKIE, HeaderMap};
use std::{collections::HashMap, path::PathBuf, sync::Arc};
use tokio::sync::Mutex;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "ripple_session";

#[derive(Debug, Clone, PartialEq)]
pub struct SessionUser {
    pub user_id: String,
    pub name: String,
    pub email: String,
}

/// UI state of one visitor.
#[derive(Debug, Default)]
pub struct Session {
    pub user: Option<SessionUser>,
    pub wizard: Wizard,
    pub causes: Vec<Cause>,
    pub goals: Vec<Goal>,
    pub draft: CheckinDraft,
    pub toasts: Toasts,
    pub transcript: Transcript,
    pub form_error: Option<String>,
    goal_fetches: Sequencer,
}

impl Session {
    pub fn signed_in(user: SessionUser) -> Self {
        let mut wizard = Wizard::new(Some(user.user_id.clone()));
        wizard.form.name = user.name.clone();
        Self {
            user: Some(user),
            wizard,
            ..Self::default()
        }
    }

    /// Session for a visitor who is not signed in yet, holding the message of
    /// a failed sign-in attempt.
    pub fn anonymous(form_error: &str) -> Self {
        Self {
            form_error: Some(form_error.to_string()),
            ..Self::default()
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|user| user.user_id.as_str())
    }

    pub fn begin_goal_fetch(&self) -> Ticket {
        self.goal_fetches.issue()
    }

    /// Stores `goals` only if no newer fetch was started after `ticket`.
    pub fn accept_goals(&mut self, ticket: Ticket, goals: Vec<Goal>) -> bool {
        if !self.goal_fetches.is_current(ticket) {
            return false;
        }
        self.goals = goals;
        true
    }
}

pub type SharedSession = Arc<Mutex<Session>>;

/// Live sessions by the id carried in the session cookie.
#[derive(Clone, Default)]
pub struct Sessions {
    inner: Arc<Mutex<HashMap<String, SharedSession>>>,
}

impl Sessions {
    pub async fn get(&self, id: &str) -> Option<SharedSession> {
        self.inner.lock().await.get(id).cloned()
    }

    /// Registers `session` under a fresh random id.
    pub async fn insert(&self, session: Session) -> (String, SharedSession) {
        let id = Uuid::new_v4().simple().to_string();
        let shared = Arc::new(Mutex::new(session));
        self.inner.lock().await.insert(id.clone(), shared.clone());
        (id, shared)
    }

    pub async fn remove(&self, id: &str) -> Option<SharedSession> {
        self.inner.lock().await.remove(id)
    }
}

pub fn session_id(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value)
}

pub fn session_cookie(id: &str) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax")
}

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub data: Arc<Mutex<LocalData>>,
    pub sessions: Sessions,
    pub backend: BackendClient,
    pub identity: IdentityClient,
    pub chat: Option<ChatRelay>,
}

impl AppState {
    pub fn new(
        config: &Config,
        data: LocalData,
        backend: BackendClient,
        identity: IdentityClient,
        chat: Option<ChatRelay>,
    ) -> Self {
        Self {
            data_path: config.data_path.clone(),
            data: Arc::new(Mutex::new(data)),
            sessions: Sessions::default(),
            backend,
            identity,
            chat,
        }
    }
}
