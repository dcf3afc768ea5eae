pub mod app;
pub mod backend;
pub mod chat;
pub mod checkin;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod identity;
pub mod models;
pub mod notify;
pub mod onboarding;
pub mod progress;
pub mod sequencer;
pub mod storage;
pub mod ui;
pub mod state;

pub use app::router;
pub use config::Config;
pub use progress::{evaluate, next_milestone, partition_milestones, progress_ratio, rank_milestones};
pub use state::AppState;
pub use storage::load_data;
