//! Console host wiring
//!
//! Records live under the data directory as JSON files and requests go out
//! over reqwest. A console user owns the machine, so the capability check
//! always passes; the anti-forgery token is still issued and verified per
//! request with a secret that lives only as long as the process.

use anyhow::{Context, Result};
use keyward_core::endpoint::{LICENSE_KEY_FIELD, TOKEN_FIELD};
use keyward_core::{
    EndpointAction, EndpointController, EndpointRequest, EndpointResponse, FileStore,
    LicenseConfig, LicenseFacade, LicenseRegistry, ReqwestTransport, SessionTokenGuard,
    StaticCapability, Transport,
};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Returns `--data-dir` if given, else `~/.config/keyward/`.
pub fn data_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }
    dirs::config_dir()
        .map(|d| d.join("keyward"))
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
}

pub struct Session {
    facade: LicenseFacade,
    controller: EndpointController,
    data_dir: PathBuf,
}

impl Session {
    /// Loads the config and connects over the live HTTP transport.
    pub fn open(config_path: &Path, data_dir: Option<&Path>) -> Result<Self> {
        let transport = ReqwestTransport::new()?;
        Self::open_with(config_path, data_dir, Arc::new(transport))
    }

    pub fn open_with(
        config_path: &Path,
        data_dir: Option<&Path>,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        let config = LicenseConfig::from_file(config_path)
            .with_context(|| format!("load config {}", config_path.display()))?;
        let data_dir = self::data_dir(data_dir)?;
        tracing::debug!(data_dir = %data_dir.display(), "opening license session");

        let store = Arc::new(FileStore::new(&data_dir));
        let mut facade = LicenseFacade::new(config, store, transport)?;
        let mut registry = LicenseRegistry::new();
        facade.connect(&mut registry)?;

        let controller = facade.controller(
            Arc::new(StaticCapability(true)),
            Arc::new(SessionTokenGuard::new(process_secret())),
        )?;

        Ok(Self {
            facade,
            controller,
            data_dir,
        })
    }

    pub fn facade(&self) -> &LicenseFacade {
        &self.facade
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn activate(&self, key: &str) -> EndpointResponse {
        self.call(
            EndpointAction::Activate,
            self.signed().with(LICENSE_KEY_FIELD, key),
        )
    }

    pub fn deactivate(&self) -> EndpointResponse {
        self.call(EndpointAction::Deactivate, self.signed())
    }

    /// Forced refresh against the license server.
    pub fn status(&self) -> EndpointResponse {
        self.call(EndpointAction::Status, self.signed())
    }

    fn signed(&self) -> EndpointRequest {
        EndpointRequest::new().with(TOKEN_FIELD, self.controller.issue_token())
    }

    fn call(&self, action: EndpointAction, request: EndpointRequest) -> EndpointResponse {
        let route = action.name_for(&self.facade.config().slug());
        tracing::debug!(route = %route, "dispatching");
        self.controller
            .dispatch(&route, &request)
            .unwrap_or_else(|| {
                EndpointResponse::unprocessable(json!({
                    "message": format!("Unknown license action: {route}")
                }))
            })
    }
}

fn process_secret() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(format!("{}:{}", std::process::id(), nanos));
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}
