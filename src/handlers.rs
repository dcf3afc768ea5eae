use crate::backend::BackendError;
use crate::chat::ChatMessage;
use crate::errors::AppError;
use crate::models::{Goal, Milestone};
use crate::notify::Toast;
use crate::onboarding::{Advance, FormUpdate, Wizard};
use crate::progress::{cause_progress, evaluate, goal_progress, CauseProgress, Evaluation, GoalProgress};
use crate::state::{session_cookie, session_id, AppState, Session, SessionUser, SharedSession};
use crate::storage::persist_data;
use crate::ui;
use axum::{
    extract::{Path, State},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, error, info, warn};

const ONBOARDING_FAILED: &str = "An error occurred while onboarding you, please try again.😞";

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CauseForm {
    pub cause_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckinForm {
    pub goal_id: String,
    #[serde(default)]
    pub amount: String,
    /// Quick-pick button, wins over the typed amount.
    #[serde(default)]
    pub pick: Option<String>,
    #[serde(default)]
    pub notes: String,
}

/// `-`/`+` buttons of the check-in form.
#[derive(Debug, Deserialize)]
pub struct StepForm {
    #[serde(default)]
    pub goal_id: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub notes: String,
    pub step: String,
}

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    pub current: f64,
    pub target: f64,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub goals: Vec<GoalProgress>,
    pub causes: Vec<CauseProgress>,
}

pub async fn register_page(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let (error, toasts) = notices(&state, &headers).await;
    Html(ui::render_register(error.as_deref(), &toasts))
}

pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<RegisterForm>,
) -> Response {
    if form.password != form.confirm_password {
        return auth_failure(&state, &headers, "/", "Passwords do not match").await;
    }

    let account = match state.identity.sign_up(form.email.trim(), &form.password).await {
        Ok(account) => account,
        Err(err) => {
            error!("registration error: {err}");
            let message = fallback_message(err.to_string(), "Registration failed");
            return auth_failure(&state, &headers, "/", &message).await;
        }
    };

    let name = account
        .display_name
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| form.name.trim().to_string());
    let email = account.email.unwrap_or_else(|| form.email.trim().to_string());

    let user_id = match state.backend.create_user(&name, &email).await {
        Ok(user_id) => user_id,
        Err(err) => {
            error!("error adding user to database: {err}");
            return auth_failure(&state, &headers, "/", &err.to_string()).await;
        }
    };

    let (id, handle) = start_session(&state, &headers, SessionUser { user_id, name, email }).await;
    handle.lock().await.toasts.success(
        "Registration successful!",
        Some("Welcome to Ripple Goal! Your account has been created.".to_string()),
    );
    with_session_cookie(&id, Redirect::to("/onboarding"))
}

pub async fn login_page(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let (error, toasts) = notices(&state, &headers).await;
    Html(ui::render_login(error.as_deref(), &toasts))
}

pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Response {
    let email = form.email.trim();
    if email.is_empty() || form.password.is_empty() {
        return auth_failure(&state, &headers, "/login", "Email and password are required").await;
    }

    let account = match state.identity.sign_in(email, &form.password).await {
        Ok(account) => account,
        Err(err) => {
            error!("login error: {err}");
            let message = fallback_message(err.to_string(), "Login failed");
            return auth_failure(&state, &headers, "/login", &message).await;
        }
    };

    let name = account.display_name.filter(|name| !name.is_empty()).unwrap_or_default();
    let email = account.email.unwrap_or_else(|| email.to_string());
    let user_id = match state.backend.create_user(&name, &email).await {
        Ok(user_id) => user_id,
        Err(err) => {
            error!("could not resolve backend user: {err}");
            return auth_failure(&state, &headers, "/login", &err.to_string()).await;
        }
    };

    let welcome = format!("Welcome back {name}!");
    let (id, handle) = start_session(&state, &headers, SessionUser { user_id, name, email }).await;
    handle
        .lock()
        .await
        .toasts
        .success("Login successful!", Some(welcome));
    with_session_cookie(&id, Redirect::to("/onboarding"))
}

pub async fn onboarding_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some((handle, _)) = signed_in(&state, &headers).await else {
        return Redirect::to("/").into_response();
    };

    let needs_causes = handle.lock().await.causes.is_empty();
    if needs_causes {
        match state.backend.list_causes().await {
            Ok(causes) => handle.lock().await.causes = causes,
            Err(err) => error!("error fetching available causes: {err}"),
        }
    }

    let mut session = handle.lock().await;
    let toasts = session.toasts.active();
    Html(ui::render_onboarding(&session.wizard, &session.causes, &toasts)).into_response()
}

pub async fn onboarding_next(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(update): Form<FormUpdate>,
) -> Redirect {
    let Some((handle, user_id)) = signed_in(&state, &headers).await else {
        return Redirect::to("/");
    };

    let advance = {
        let mut session = handle.lock().await;
        session.wizard.apply(update);
        session.wizard.advance()
    };

    let request = match advance {
        Advance::Moved(step) => {
            debug!(step = step.label(), "onboarding advanced");
            return Redirect::to("/onboarding");
        }
        Advance::Invalid => return Redirect::to("/onboarding"),
        Advance::Submit(request) => request,
    };

    match state.backend.create_goal(&request).await {
        Ok(goal) => {
            info!(goal_id = goal.id, "onboarding complete");
            handle.lock().await.wizard = Wizard::new(Some(user_id));
            Redirect::to("/dashboard")
        }
        Err(err) => {
            error!("error creating goal: {err}");
            handle.lock().await.toasts.error(ONBOARDING_FAILED, None);
            Redirect::to("/onboarding")
        }
    }
}

pub async fn onboarding_back(State(state): State<AppState>, headers: HeaderMap) -> Redirect {
    let Some((handle, _)) = signed_in(&state, &headers).await else {
        return Redirect::to("/");
    };
    handle.lock().await.wizard.back();
    Redirect::to("/onboarding")
}

pub async fn onboarding_cause(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<CauseForm>,
) -> Result<Redirect, AppError> {
    let Some((handle, _)) = signed_in(&state, &headers).await else {
        return Ok(Redirect::to("/"));
    };
    let cause_id = form
        .cause_id
        .trim()
        .parse::<i64>()
        .map_err(|_| AppError::bad_request("cause_id must be a number"))?;

    let mut session = handle.lock().await;
    if !session.causes.iter().any(|cause| cause.id == cause_id) {
        return Err(AppError::bad_request("unknown cause"));
    }
    session.wizard.select_cause(Some(cause_id));
    Ok(Redirect::to("/onboarding"))
}

pub async fn dashboard(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some((handle, user_id)) = signed_in(&state, &headers).await else {
        return Redirect::to("/").into_response();
    };

    if let Err(err) = refresh_goals(&state, &handle, &user_id).await {
        error!("error fetching goals: {err}");
        handle
            .lock()
            .await
            .toasts
            .error("We couldn't load your progress.", Some(err.to_string()));
    }

    let seen_popup = state.data.lock().await.seen_popup;
    let mut session = handle.lock().await;
    let view = dashboard_view(&session.goals);
    let toasts = session.toasts.active();
    let chat = state.chat.as_ref().map(|_| session.transcript.messages.as_slice());
    Html(ui::render_dashboard(
        &view.goals,
        &view.causes,
        &session.goals,
        &session.draft,
        &toasts,
        chat,
        !seen_popup && state.chat.is_some(),
    ))
    .into_response()
}

pub async fn get_dashboard(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<DashboardResponse>, AppError> {
    let (handle, user_id) = signed_in(&state, &headers)
        .await
        .ok_or_else(|| AppError::unauthorized("sign in first"))?;
    refresh_goals(&state, &handle, &user_id).await?;

    let session = handle.lock().await;
    Ok(Json(dashboard_view(&session.goals)))
}

pub async fn create_checkin(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<CheckinForm>,
) -> Redirect {
    let Some((handle, user_id)) = signed_in(&state, &headers).await else {
        return Redirect::to("/");
    };

    let goals_loaded = !handle.lock().await.goals.is_empty();
    if !goals_loaded {
        if let Err(err) = refresh_goals(&state, &handle, &user_id).await {
            error!("error fetching goals before check-in: {err}");
            handle
                .lock()
                .await
                .toasts
                .error("We couldn't load your goals.", Some(err.to_string()));
            return Redirect::to("/dashboard");
        }
    }

    let request = {
        let mut session = handle.lock().await;
        let goals = session.goals.clone();
        let draft = &mut session.draft;
        draft.select_goal(&goals, form.goal_id.trim().parse().ok());
        draft.set_amount_text(form.pick.as_deref().unwrap_or(&form.amount));
        draft.notes = form.notes;
        let request = draft.request(&user_id);
        if request.is_none() {
            session
                .toasts
                .error("Select a goal before logging progress.", None);
        }
        request
    };
    let Some(request) = request else {
        return Redirect::to("/dashboard");
    };

    match state.backend.create_checkin(&request).await {
        Ok(_) => {
            {
                let mut session = handle.lock().await;
                session.draft = Default::default();
                session.toasts.success(
                    "You are doing great!!",
                    Some(format!("Logged {} toward your goal.", request.value)),
                );
            }
            if let Err(err) = refresh_goals(&state, &handle, &user_id).await {
                error!("error refreshing goals after check-in: {err}");
                handle
                    .lock()
                    .await
                    .toasts
                    .error("We couldn't refresh your progress.", Some(err.to_string()));
            }
        }
        Err(err) => {
            error!("error logging progress: {err}");
            handle.lock().await.toasts.error(
                "We couldn't log your progress, please try again.",
                Some(err.to_string()),
            );
        }
    }
    Redirect::to("/dashboard")
}

pub async fn step_checkin(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<StepForm>,
) -> Redirect {
    let Some((handle, _)) = signed_in(&state, &headers).await else {
        return Redirect::to("/");
    };

    let mut session = handle.lock().await;
    let goals = session.goals.clone();
    let draft = &mut session.draft;
    let goal_id: Option<i64> = form.goal_id.trim().parse().ok();
    if draft.goal_id == goal_id {
        draft.set_amount_text(&form.amount);
    } else {
        draft.select_goal(&goals, goal_id);
    }
    draft.notes = form.notes;
    if !draft.nudge(&form.step) {
        warn!(step = %form.step, "ignoring unknown stepper button");
    }
    Redirect::to("/dashboard")
}

pub async fn evaluate_progress(Json(payload): Json<EvaluateRequest>) -> Json<Evaluation> {
    Json(evaluate(&payload.milestones, payload.current, payload.target))
}

pub async fn chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<Vec<ChatMessage>>, AppError> {
    let (handle, user_id) = signed_in(&state, &headers)
        .await
        .ok_or_else(|| AppError::unauthorized("sign in first"))?;
    relay_chat(&state, &handle, &user_id, &payload.message).await?;

    let session = handle.lock().await;
    Ok(Json(session.transcript.messages.clone()))
}

pub async fn chat_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<ChatRequest>,
) -> Result<Redirect, AppError> {
    let Some((handle, user_id)) = signed_in(&state, &headers).await else {
        return Ok(Redirect::to("/"));
    };
    relay_chat(&state, &handle, &user_id, &form.message).await?;
    Ok(Redirect::to("/dashboard"))
}

pub async fn dismiss_popup(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Redirect, AppError> {
    if signed_in(&state, &headers).await.is_none() {
        return Ok(Redirect::to("/"));
    }

    let mut data = state.data.lock().await;
    if !data.seen_popup {
        data.seen_popup = true;
        persist_data(&state.data_path, &data).await?;
    }
    Ok(Redirect::to("/dashboard"))
}

pub async fn dismiss_toast(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> StatusCode {
    let Some(handle) = visitor(&state, &headers).await else {
        return StatusCode::NOT_FOUND;
    };
    if handle.lock().await.toasts.dismiss(id) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// Re-fetches the user's goals. Only the newest of several overlapping
/// fetches for a session is allowed to replace its cached goals.
async fn refresh_goals(
    state: &AppState,
    handle: &SharedSession,
    user_id: &str,
) -> Result<(), BackendError> {
    let ticket = handle.lock().await.begin_goal_fetch();
    let goals = state.backend.list_goals(user_id, true).await?;

    if !handle.lock().await.accept_goals(ticket, goals) {
        warn!(?ticket, "dropping stale goals response");
    }
    Ok(())
}

async fn relay_chat(
    state: &AppState,
    handle: &SharedSession,
    user_id: &str,
    message: &str,
) -> Result<(), AppError> {
    let relay = state
        .chat
        .as_ref()
        .ok_or_else(|| AppError::unavailable("chat is not configured"))?;

    let mut transcript = handle.lock().await.transcript.clone();
    relay.converse(&mut transcript, message, user_id).await;
    handle.lock().await.transcript = transcript;
    Ok(())
}

fn dashboard_view(goals: &[Goal]) -> DashboardResponse {
    let mut seen = BTreeSet::new();
    let causes = goals
        .iter()
        .filter_map(|goal| goal.cause.as_ref())
        .filter(|cause| seen.insert(cause.id))
        .map(cause_progress)
        .collect();

    DashboardResponse {
        goals: goals.iter().map(goal_progress).collect(),
        causes,
    }
}

async fn visitor(state: &AppState, headers: &HeaderMap) -> Option<SharedSession> {
    state.sessions.get(session_id(headers)?).await
}

/// Session and backend user id of a signed-in visitor.
async fn signed_in(state: &AppState, headers: &HeaderMap) -> Option<(SharedSession, String)> {
    let handle = visitor(state, headers).await?;
    let user_id = {
        let session = handle.lock().await;
        session.user_id().map(str::to_string)
    }?;
    Some((handle, user_id))
}

/// Signing in always gets a fresh session id; the previous session and any
/// fetch still running for it are discarded.
async fn start_session(
    state: &AppState,
    headers: &HeaderMap,
    user: SessionUser,
) -> (String, SharedSession) {
    if let Some(previous) = session_id(headers) {
        state.sessions.remove(previous).await;
    }
    state.sessions.insert(Session::signed_in(user)).await
}

async fn notices(state: &AppState, headers: &HeaderMap) -> (Option<String>, Vec<Toast>) {
    match visitor(state, headers).await {
        Some(handle) => {
            let mut session = handle.lock().await;
            (session.form_error.take(), session.toasts.active())
        }
        None => (None, Vec::new()),
    }
}

async fn auth_failure(state: &AppState, headers: &HeaderMap, page: &str, message: &str) -> Response {
    if let Some(handle) = visitor(state, headers).await {
        handle.lock().await.form_error = Some(message.to_string());
        return Redirect::to(page).into_response();
    }

    let (id, _) = state.sessions.insert(Session::anonymous(message)).await;
    with_session_cookie(&id, Redirect::to(page))
}

fn with_session_cookie(id: &str, redirect: Redirect) -> Response {
    ([(SET_COOKIE, session_cookie(id))], redirect).into_response()
}

fn fallback_message(message: String, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}
