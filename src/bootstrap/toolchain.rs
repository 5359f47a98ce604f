//! Runtime toolchain: the external processes behind each bootstrap stage

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use crate::error::{AssistError, Result};

#[cfg(windows)]
const BIN_DIR: &str = "Scripts";
#[cfg(not(windows))]
const BIN_DIR: &str = "bin";

#[cfg(windows)]
const PYTHON_EXE: &str = "python.exe";
#[cfg(not(windows))]
const PYTHON_EXE: &str = "python";

/// An isolated dependency environment on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    pub root: PathBuf,
    pub bin_dir: PathBuf,
    pub python: PathBuf,
}

impl Environment {
    pub fn at(root: &Path) -> Self {
        let bin_dir = root.join(BIN_DIR);
        let python = bin_dir.join(PYTHON_EXE);
        Self {
            root: root.to_path_buf(),
            bin_dir,
            python,
        }
    }

    /// Whether the environment's interpreter exists
    pub fn exists(&self) -> bool {
        self.python.exists()
    }

    /// Activate the environment for a child process
    pub fn apply(&self, cmd: &mut Command) {
        let mut path = OsString::from(self.bin_dir.as_os_str());
        if let Some(existing) = std::env::var_os("PATH") {
            if !existing.is_empty() {
                path.push(if cfg!(windows) { ";" } else { ":" });
                path.push(existing);
            }
        }
        cmd.env("VIRTUAL_ENV", &self.root)
            .env("PATH", path)
            .env_remove("PYTHONHOME");
    }
}

/// The operations the bootstrap sequence delegates to a runtime
pub trait Toolchain {
    /// Report the version of `interpreter`, e.g. `3.12.4`
    fn runtime_version(&self, interpreter: &str) -> Result<String>;

    /// Create a fresh environment at `env_dir`
    fn create_env(&self, interpreter: &str, env_dir: &Path) -> Result<Environment>;

    /// Install every package declared in `manifest` into `env`
    fn install(&self, env: &Environment, manifest: &Path, no_cache: bool) -> Result<()>;

    /// The installed package set, one `name==version` per entry
    fn freeze(&self, env: &Environment) -> Result<Vec<String>>;

    /// Run `program` in the foreground and return its exit code
    fn launch(&self, env: &Environment, program: &Path, cwd: &Path) -> Result<i32>;
}

/// Toolchain backed by a CPython interpreter, `venv` and `pip`
#[derive(Debug, Default, Clone)]
pub struct PythonToolchain;

impl PythonToolchain {
    pub fn new() -> Self {
        Self
    }
}

impl Toolchain for PythonToolchain {
    fn runtime_version(&self, interpreter: &str) -> Result<String> {
        tracing::debug!(interpreter, "probing runtime version");
        let output = Command::new(interpreter)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => {
                    AssistError::Provisioning(format!("runtime '{}' not found", interpreter))
                }
                _ => AssistError::Provisioning(format!("cannot run '{}': {}", interpreter, e)),
            })?;

        if !output.status.success() {
            return Err(AssistError::Provisioning(format!(
                "'{} --version' exited with {}",
                interpreter, output.status
            )));
        }

        // Older interpreters print the banner on stderr
        let banner = if output.stdout.is_empty() {
            String::from_utf8_lossy(&output.stderr).into_owned()
        } else {
            String::from_utf8_lossy(&output.stdout).into_owned()
        };
        parse_version_banner(&banner).ok_or_else(|| {
            AssistError::Provisioning(format!("unrecognized version output: {}", banner.trim()))
        })
    }

    fn create_env(&self, interpreter: &str, env_dir: &Path) -> Result<Environment> {
        let mut cmd = Command::new(interpreter);
        cmd.arg("-m").arg("venv").arg(env_dir).stdin(Stdio::null());
        tracing::debug!(?cmd, "creating environment");

        let status = cmd
            .status()
            .map_err(|e| AssistError::Environment(format!("cannot run '{}': {}", interpreter, e)))?;
        if !status.success() {
            return Err(AssistError::Environment(format!(
                "'{} -m venv' exited with {}",
                interpreter, status
            )));
        }

        let env = Environment::at(env_dir);
        if !env.exists() {
            return Err(AssistError::Environment(format!(
                "no interpreter at {} after creation",
                env.python.display()
            )));
        }
        Ok(env)
    }

    fn install(&self, env: &Environment, manifest: &Path, no_cache: bool) -> Result<()> {
        let mut cmd = Command::new(&env.python);
        cmd.args(["-m", "pip", "install"]);
        if no_cache {
            cmd.arg("--no-cache-dir");
        }
        cmd.arg("-r")
            .arg(manifest)
            .env("PIP_DISABLE_PIP_VERSION_CHECK", "1")
            .stdin(Stdio::null());
        env.apply(&mut cmd);
        tracing::debug!(?cmd, "installing dependencies");

        let status = cmd
            .status()
            .map_err(|e| AssistError::Dependency(format!("cannot run pip: {}", e)))?;
        if !status.success() {
            return Err(AssistError::Dependency(format!("pip install exited with {}", status)));
        }
        Ok(())
    }

    fn freeze(&self, env: &Environment) -> Result<Vec<String>> {
        let mut cmd = Command::new(&env.python);
        cmd.args(["-m", "pip", "freeze"])
            .env("PIP_DISABLE_PIP_VERSION_CHECK", "1")
            .stdin(Stdio::null());
        env.apply(&mut cmd);

        let output = cmd
            .output()
            .map_err(|e| AssistError::Dependency(format!("cannot run pip freeze: {}", e)))?;
        if !output.status.success() {
            return Err(AssistError::Dependency(format!(
                "pip freeze exited with {}",
                output.status
            )));
        }

        let mut packages: Vec<String> = String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        packages.sort();
        Ok(packages)
    }

    fn launch(&self, env: &Environment, program: &Path, cwd: &Path) -> Result<i32> {
        let mut cmd = Command::new(&env.python);
        cmd.arg(program).current_dir(cwd);
        env.apply(&mut cmd);
        tracing::debug!(?cmd, "launching entry program");

        // The child shares our terminal and receives Ctrl-C itself; we keep waiting
        if let Err(e) = ctrlc::set_handler(|| {}) {
            tracing::debug!("interrupt handler not installed: {}", e);
        }

        let status = cmd
            .status()
            .map_err(|e| AssistError::Entry(format!("cannot start {}: {}", program.display(), e)))?;
        Ok(exit_code(status))
    }
}

/// Extract `3.12.4` from a banner such as `Python 3.12.4`
pub fn parse_version_banner(banner: &str) -> Option<String> {
    banner
        .split_whitespace()
        .find(|token| token.chars().next().is_some_and(|c| c.is_ascii_digit()))
        .map(str::to_string)
}

/// Whether `reported` satisfies the pinned identifier, compared per component
pub fn version_matches(pinned: &str, reported: &str) -> bool {
    let pinned: Vec<&str> = pinned.trim().split('.').collect();
    let reported: Vec<&str> = reported.trim().split('.').collect();
    pinned.len() <= reported.len() && pinned.iter().zip(&reported).all(|(p, r)| p == r)
}

/// Map a child's status to a shell-style exit code
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}
