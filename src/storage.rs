use crate::errors::AppError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::error;

/// The only state kept on disk between runs.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct LocalData {
    #[serde(default)]
    pub seen_popup: bool,
}

pub async fn load_data(path: &Path) -> LocalData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(err) => {
                error!("failed to parse data file: {err}");
                LocalData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => LocalData::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            LocalData::default()
        }
    }
}

pub async fn persist_data(path: &Path, data: &LocalData) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    let payload = serde_json::to_vec_pretty(data).map_err(AppError::internal)?;
    fs::write(path, payload).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("ripple_goal_{}_{name}", std::process::id()));
        path.push("state.json");
        path
    }

    #[tokio::test]
    async fn missing_file_loads_defaults() {
        let data = load_data(&scratch_path("missing")).await;
        assert!(!data.seen_popup);
    }

    #[tokio::test]
    async fn popup_flag_survives_reload() {
        let path = scratch_path("roundtrip");
        persist_data(&path, &LocalData { seen_popup: true }).await.unwrap();
        assert!(load_data(&path).await.seen_popup);
        let _ = fs::remove_dir_all(path.parent().unwrap()).await;
    }
}
