//! Bootstrap configuration
//!
//! Every field defaults to the stock recipe: a pinned `python3` runtime, the
//! current directory copied to `/app`, a `venv` environment inside it,
//! `requirements.txt` installed without a download cache, and `main.py`
//! launched as the entry program.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::{AssistError, Result};

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "Bootstrap.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BootstrapConfig {
    pub runtime: RuntimeConfig,
    pub workspace: WorkspaceConfig,
    pub environment: EnvironmentConfig,
    pub dependencies: DependencyConfig,
    pub entry: EntryConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Interpreter command used to probe the runtime and create the environment
    pub interpreter: String,
    /// Pinned version identifier, matched as a prefix of the reported version
    pub version: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            interpreter: "python3".to_string(),
            version: "3.12".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkspaceConfig {
    pub source: PathBuf,
    pub destination: PathBuf,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("."),
            destination: PathBuf::from("/app"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvironmentConfig {
    /// Environment directory, relative to the workspace destination
    pub dir: PathBuf,
    /// Refuse to create the environment when less space is available
    pub min_free_bytes: Option<u64>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("venv"),
            min_free_bytes: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DependencyConfig {
    /// Manifest path, relative to the workspace destination
    pub manifest: PathBuf,
    pub no_cache: bool,
}

impl Default for DependencyConfig {
    fn default() -> Self {
        Self {
            manifest: PathBuf::from("requirements.txt"),
            no_cache: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EntryConfig {
    /// Entry program, relative to the workspace destination
    pub program: PathBuf,
}

impl Default for EntryConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("main.py"),
        }
    }
}

impl BootstrapConfig {
    /// Parse a TOML document; `${VAR}` references in paths are expanded
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: BootstrapConfig =
            toml::from_str(content).map_err(|e| AssistError::Config(e.to_string()))?;
        config.expand_paths();
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            AssistError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    /// Load an explicit config, else `Bootstrap.toml` if present, else defaults
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let fallback = Path::new(DEFAULT_CONFIG_FILE);
        if fallback.is_file() {
            tracing::debug!(path = %fallback.display(), "using config from working directory");
            Self::load(fallback)
        } else {
            Ok(Self::default())
        }
    }

    pub fn env_dir(&self) -> PathBuf {
        self.workspace.destination.join(&self.environment.dir)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.workspace.destination.join(&self.dependencies.manifest)
    }

    pub fn entry_path(&self) -> PathBuf {
        self.workspace.destination.join(&self.entry.program)
    }

    fn expand_paths(&mut self) {
        let expand = |p: &mut PathBuf| {
            if let Some(s) = p.to_str() {
                *p = PathBuf::from(expand_env_vars(s));
            }
        };
        expand(&mut self.workspace.source);
        expand(&mut self.workspace.destination);
        expand(&mut self.environment.dir);
        expand(&mut self.dependencies.manifest);
        expand(&mut self.entry.program);
    }

    fn validate(&self) -> Result<()> {
        if self.runtime.interpreter.trim().is_empty() {
            return Err(AssistError::Config("runtime.interpreter is empty".to_string()));
        }
        if self.runtime.version.trim().is_empty() {
            return Err(AssistError::Config("runtime.version is empty".to_string()));
        }
        let env_dir = &self.environment.dir;
        let nested = env_dir
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if env_dir.is_absolute() || !nested || env_dir.as_os_str().is_empty() {
            return Err(AssistError::Config(
                "environment.dir must be a subdirectory of the workspace destination".to_string(),
            ));
        }
        if self.entry.program.as_os_str().is_empty() {
            return Err(AssistError::Config("entry.program is empty".to_string()));
        }
        Ok(())
    }
}

/// Replace `${VAR}` with the variable's value (empty when unset)
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let var = &after[..end];
                if !var.is_empty() {
                    out.push_str(&env::var(var).unwrap_or_default());
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
