//! Provision stamp: proof that an environment finished installing

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AssistError, Result};

pub const STAMP_FILE: &str = ".assistbot-stamp.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisionStamp {
    pub runtime_version: String,
    /// Normalized requirement names from the manifest, in declaration order
    pub requirements: Vec<String>,
    /// Frozen package set after installation, sorted
    pub packages: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl ProvisionStamp {
    pub fn path(env_dir: &Path) -> PathBuf {
        env_dir.join(STAMP_FILE)
    }

    pub fn write(&self, env_dir: &Path) -> Result<()> {
        let path = Self::path(env_dir);
        let tmp = path.with_extension("json.tmp");
        let body = serde_json::to_string_pretty(self)
            .map_err(|e| AssistError::Dependency(format!("cannot encode stamp: {}", e)))?;
        fs::write(&tmp, body)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    /// Read the stamp, `None` when the environment was never fully provisioned
    pub fn read(env_dir: &Path) -> Result<Option<Self>> {
        let path = Self::path(env_dir);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&content).map(Some).map_err(|e| {
            AssistError::Entry(format!("corrupt provision stamp {}: {}", path.display(), e))
        })
    }
}
