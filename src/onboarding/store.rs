//! File-backed store of onboarding state, one JSON file per tenant.
//!
//! Layout under the base directory:
//! - `<tenant_id>/state.json`: the last complete save
//! - `<tenant_id>/state.json.<uuid>.tmp`: transient, only during a save
//!
//! Nothing is cached: every `load` re-reads the file so a restarted process
//! sees exactly what the previous one persisted. There is no locking between
//! processes; concurrent writers for one tenant race and the last save wins.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::StoreError;

use super::state::OnboardingState;

const STATE_FILE: &str = "state.json";

/// Durable store of [`OnboardingState`] records.
#[derive(Debug, Clone)]
pub struct StateStore {
    base_path: PathBuf,
}

impl StateStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn tenant_dir(&self, tenant_id: u64) -> PathBuf {
        self.base_path.join(tenant_id.to_string())
    }

    /// Canonical state file path for a tenant.
    pub fn state_path(&self, tenant_id: u64) -> PathBuf {
        self.tenant_dir(tenant_id).join(STATE_FILE)
    }

    /// Create and persist a fresh session, replacing any existing one.
    pub async fn start(&self, tenant_id: u64) -> Result<OnboardingState, StoreError> {
        let state = OnboardingState::new(tenant_id);
        self.save(&state).await?;
        Ok(state)
    }

    /// Atomically persist a complete record.
    ///
    /// The new content is written and synced to a temporary file in the same
    /// directory, then renamed over `state.json`.
    pub async fn save(&self, state: &OnboardingState) -> Result<(), StoreError> {
        let dir = self.tenant_dir(state.tenant_id);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| StoreError::io(&dir, e))?;

        let bytes = serde_json::to_vec_pretty(state)?;
        let tmp_path = dir.join(format!("{STATE_FILE}.{}.tmp", Uuid::new_v4()));
        let final_path = dir.join(STATE_FILE);

        replace_file(&tmp_path, &final_path, &bytes).await?;

        tracing::debug!(
            tenant_id = state.tenant_id,
            phase = %state.phase,
            path = %final_path.display(),
            "Saved onboarding state"
        );
        Ok(())
    }

    /// Load a tenant's record; `Ok(None)` if it has never been started.
    pub async fn load(&self, tenant_id: u64) -> Result<Option<OnboardingState>, StoreError> {
        let path = self.state_path(tenant_id);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io(&path, e)),
        };
        let state: OnboardingState = serde_json::from_slice(&bytes)?;
        tracing::debug!(tenant_id, phase = %state.phase, "Loaded onboarding state");
        Ok(Some(state))
    }

    pub async fn exists(&self, tenant_id: u64) -> bool {
        fs::try_exists(self.state_path(tenant_id))
            .await
            .unwrap_or(false)
    }

    /// Tenant ids that have a saved state, ascending.
    pub async fn tenants(&self) -> Result<Vec<u64>, StoreError> {
        let mut read_dir = match fs::read_dir(&self.base_path).await {
            Ok(rd) => rd,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&self.base_path, e)),
        };

        let mut ids = Vec::new();
        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| StoreError::io(&self.base_path, e))?
        {
            if let Some(id) = entry.file_name().to_str().and_then(|n| n.parse::<u64>().ok())
                && self.exists(id).await
            {
                ids.push(id);
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }
}

/// Write `bytes` to `tmp_path`, sync, then rename over `final_path`.
///
/// On failure the temporary file is removed and `final_path` is untouched.
async fn replace_file(tmp_path: &Path, final_path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    if let Err(e) = write_synced(tmp_path, bytes).await {
        fs::remove_file(tmp_path).await.ok();
        return Err(StoreError::io(tmp_path, e));
    }
    if let Err(e) = fs::rename(tmp_path, final_path).await {
        fs::remove_file(tmp_path).await.ok();
        return Err(StoreError::io(final_path, e));
    }
    Ok(())
}

async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    Ok(())
}
