use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::register_page))
        .route("/register", post(handlers::register))
        .route("/login", get(handlers::login_page).post(handlers::login))
        .route("/onboarding", get(handlers::onboarding_page))
        .route("/onboarding/next", post(handlers::onboarding_next))
        .route("/onboarding/back", post(handlers::onboarding_back))
        .route("/onboarding/cause", post(handlers::onboarding_cause))
        .route("/dashboard", get(handlers::dashboard))
        .route("/checkin", post(handlers::create_checkin))
        .route("/checkin/step", post(handlers::step_checkin))
        .route("/chat", post(handlers::chat_form))
        .route("/popup/dismiss", post(handlers::dismiss_popup))
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route("/api/evaluate", post(handlers::evaluate_progress))
        .route("/api/chat", post(handlers::chat))
        .route("/api/toasts/:id/dismiss", post(handlers::dismiss_toast))
        .with_state(state)
}
