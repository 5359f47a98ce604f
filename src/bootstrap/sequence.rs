//! The bootstrap sequence: runtime → workspace → environment → dependencies → entry

use chrono::Utc;
use serde::Serialize;
use std::fs;
use std::time::Instant;

use crate::bootstrap::preflight::ensure_free_space;
use crate::bootstrap::stage::Stage;
use crate::bootstrap::stamp::ProvisionStamp;
use crate::bootstrap::toolchain::{version_matches, Environment, PythonToolchain, Toolchain};
use crate::bootstrap::workspace::{materialize, CopyStats};
use crate::config::BootstrapConfig;
use crate::error::{AssistError, Result};
use crate::manifest::load_manifest;

/// What a completed stage did
#[derive(Debug, Clone, Serialize)]
pub struct StageRecord {
    pub stage: Stage,
    pub detail: String,
    pub elapsed_ms: u64,
}

/// Outcome of a bootstrap phase
#[derive(Debug, Clone, Default, Serialize)]
pub struct BootstrapReport {
    pub stages: Vec<StageRecord>,
    pub runtime_version: Option<String>,
    pub workspace: Option<CopyStats>,
    pub packages: Vec<String>,
    pub exit_code: Option<i32>,
}

impl BootstrapReport {
    pub fn completed(&self) -> Vec<Stage> {
        self.stages.iter().map(|r| r.stage).collect()
    }

    fn merge(&mut self, other: BootstrapReport) {
        self.stages.extend(other.stages);
        if other.runtime_version.is_some() {
            self.runtime_version = other.runtime_version;
        }
        if other.workspace.is_some() {
            self.workspace = other.workspace;
        }
        if !other.packages.is_empty() {
            self.packages = other.packages;
        }
        self.exit_code = other.exit_code.or(self.exit_code);
    }
}

/// Runs the bootstrap stages for one config against a toolchain
pub struct Bootstrap<T: Toolchain = PythonToolchain> {
    config: BootstrapConfig,
    toolchain: T,
}

impl Bootstrap<PythonToolchain> {
    pub fn python(config: BootstrapConfig) -> Self {
        Self::new(config, PythonToolchain::new())
    }
}

impl<T: Toolchain> Bootstrap<T> {
    /// A relative workspace destination is resolved against the current directory
    /// so every stage sees the same paths after the entry program changes directory.
    pub fn new(mut config: BootstrapConfig, toolchain: T) -> Self {
        if let Ok(destination) = std::path::absolute(&config.workspace.destination) {
            config.workspace.destination = destination;
        }
        Self { config, toolchain }
    }

    pub fn toolchain(&self) -> &T {
        &self.toolchain
    }

    /// Probe the runtime and check it against the pinned version
    pub fn select_runtime(&self) -> Result<String> {
        let runtime = &self.config.runtime;
        let reported = self.toolchain.runtime_version(&runtime.interpreter)?;
        if !version_matches(&runtime.version, &reported) {
            return Err(AssistError::Provisioning(format!(
                "'{}' reports version {}, pinned {}",
                runtime.interpreter, reported, runtime.version
            )));
        }
        Ok(reported)
    }

    pub fn materialize(&self) -> Result<CopyStats> {
        let ws = &self.config.workspace;
        materialize(&ws.source, &ws.destination)
    }

    /// Replace any previous environment with a freshly created one
    pub fn create_env(&self) -> Result<Environment> {
        let env_dir = self.config.env_dir();
        if let Some(min_free) = self.config.environment.min_free_bytes {
            ensure_free_space(&self.config.workspace.destination, min_free)?;
        }

        if env_dir.exists() {
            tracing::info!(path = %env_dir.display(), "removing previous environment");
            fs::remove_dir_all(&env_dir).map_err(|e| {
                AssistError::Environment(format!("cannot remove {}: {}", env_dir.display(), e))
            })?;
        }

        self.toolchain
            .create_env(&self.config.runtime.interpreter, &env_dir)
    }

    /// Install the manifest into `env`; any failure discards the environment
    pub fn install_deps(&self, env: &Environment, runtime_version: &str) -> Result<ProvisionStamp> {
        match self.try_install(env, runtime_version) {
            Ok(stamp) => Ok(stamp),
            Err(e) => {
                self.discard_env(env);
                Err(e)
            }
        }
    }

    fn try_install(&self, env: &Environment, runtime_version: &str) -> Result<ProvisionStamp> {
        let manifest_path = self.config.manifest_path();
        let manifest = load_manifest(&manifest_path)?;
        tracing::info!(
            manifest = %manifest_path.display(),
            requirements = manifest.requirements().count(),
            "installing dependencies"
        );

        self.toolchain
            .install(env, &manifest_path, self.config.dependencies.no_cache)?;
        let packages = self.toolchain.freeze(env)?;

        let stamp = ProvisionStamp {
            runtime_version: runtime_version.to_string(),
            requirements: manifest.names(),
            packages,
            created_at: Utc::now(),
        };
        stamp.write(&env.root).map_err(|e| {
            AssistError::Dependency(format!("cannot record installed packages: {}", e))
        })?;
        Ok(stamp)
    }

    fn discard_env(&self, env: &Environment) {
        if let Err(e) = fs::remove_dir_all(&env.root) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %env.root.display(), "cannot discard environment: {}", e);
            }
        }
    }

    /// Start the entry program in the provisioned environment
    pub fn launch(&self) -> Result<i32> {
        let env_dir = self.config.env_dir();
        if ProvisionStamp::read(&env_dir)?.is_none() {
            return Err(AssistError::Entry(format!(
                "environment {} is not provisioned; run build first",
                env_dir.display()
            )));
        }

        let entry = self.config.entry_path();
        if !entry.is_file() {
            return Err(AssistError::Entry(format!(
                "entry program {} not found",
                entry.display()
            )));
        }

        let env = Environment::at(&env_dir);
        self.toolchain
            .launch(&env, &self.config.entry.program, &self.config.workspace.destination)
    }

    /// Runtime selection through dependency installation
    pub fn build(&self) -> Result<BootstrapReport> {
        let mut report = BootstrapReport::default();

        let version = stage(&mut report, Stage::SelectRuntime, || {
            let v = self.select_runtime()?;
            let detail = format!("{} {}", self.config.runtime.interpreter, v);
            Ok((v, detail))
        })?;
        report.runtime_version = Some(version.clone());

        let stats = stage(&mut report, Stage::Materialize, || {
            let stats = self.materialize()?;
            let detail = format!(
                "{} files, {} directories into {}",
                stats.files,
                stats.dirs,
                self.config.workspace.destination.display()
            );
            Ok((stats, detail))
        })?;
        report.workspace = Some(stats);

        let env = stage(&mut report, Stage::CreateEnv, || {
            let env = self.create_env()?;
            let detail = env.root.display().to_string();
            Ok((env, detail))
        })?;

        let stamp = stage(&mut report, Stage::InstallDeps, || {
            let stamp = self.install_deps(&env, &version)?;
            let detail = format!("{} packages installed", stamp.packages.len());
            Ok((stamp, detail))
        })?;
        report.packages = stamp.packages;

        Ok(report)
    }

    /// Launch the entry program; the report carries its exit code
    pub fn run(&self) -> Result<BootstrapReport> {
        let mut report = BootstrapReport::default();
        if let Some(stamp) = ProvisionStamp::read(&self.config.env_dir())? {
            report.runtime_version = Some(stamp.runtime_version);
            report.packages = stamp.packages;
        }

        let code = stage(&mut report, Stage::Launch, || {
            let code = self.launch()?;
            Ok((code, format!("{} exited with {}", self.config.entry.program.display(), code)))
        })?;
        report.exit_code = Some(code);
        Ok(report)
    }

    /// Every stage in order
    pub fn up(&self) -> Result<BootstrapReport> {
        let mut report = self.build()?;
        report.merge(self.run()?);
        Ok(report)
    }
}

fn stage<R>(
    report: &mut BootstrapReport,
    stage: Stage,
    f: impl FnOnce() -> Result<(R, String)>,
) -> Result<R> {
    tracing::info!(%stage, "stage started");
    let started = Instant::now();
    match f() {
        Ok((value, detail)) => {
            let elapsed_ms = started.elapsed().as_millis() as u64;
            tracing::info!(%stage, elapsed_ms, "{}", detail);
            report.stages.push(StageRecord {
                stage,
                detail,
                elapsed_ms,
            });
            Ok(value)
        }
        Err(e) => {
            tracing::info!(%stage, error = %e, "stage failed");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Version,
        CreateEnv(PathBuf),
        Install { no_cache: bool },
        Freeze,
        Launch { program: PathBuf, cwd: PathBuf, python: PathBuf },
    }

    struct FakeToolchain {
        version: String,
        unresolvable: Vec<String>,
        fail_create_env: bool,
        exit_code: i32,
        calls: RefCell<Vec<Call>>,
    }

    impl FakeToolchain {
        fn new() -> Self {
            Self {
                version: "3.12.4".to_string(),
                unresolvable: Vec::new(),
                fail_create_env: false,
                exit_code: 0,
                calls: RefCell::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.borrow().clone()
        }

        fn site_packages(env: &Environment) -> PathBuf {
            env.root.join("site-packages")
        }
    }

    impl Toolchain for FakeToolchain {
        fn runtime_version(&self, _interpreter: &str) -> Result<String> {
            self.calls.borrow_mut().push(Call::Version);
            Ok(self.version.clone())
        }

        fn create_env(&self, _interpreter: &str, env_dir: &Path) -> Result<Environment> {
            self.calls.borrow_mut().push(Call::CreateEnv(env_dir.to_path_buf()));
            if self.fail_create_env {
                return Err(AssistError::Environment("venv module unavailable".to_string()));
            }
            let env = Environment::at(env_dir);
            fs::create_dir_all(&env.bin_dir)?;
            fs::write(&env.python, "")?;
            Ok(env)
        }

        fn install(&self, env: &Environment, manifest: &Path, no_cache: bool) -> Result<()> {
            self.calls.borrow_mut().push(Call::Install { no_cache });
            let site = Self::site_packages(env);
            fs::create_dir_all(&site)?;
            for name in load_manifest(manifest)?.names() {
                if self.unresolvable.contains(&name) {
                    return Err(AssistError::Dependency(format!("no matching distribution for {name}")));
                }
                fs::write(site.join(&name), "1.0")?;
            }
            Ok(())
        }

        fn freeze(&self, env: &Environment) -> Result<Vec<String>> {
            self.calls.borrow_mut().push(Call::Freeze);
            let mut packages: Vec<String> = fs::read_dir(Self::site_packages(env))?
                .filter_map(|e| e.ok())
                .map(|e| format!("{}==1.0", e.file_name().to_string_lossy()))
                .collect();
            packages.sort();
            Ok(packages)
        }

        fn launch(&self, env: &Environment, program: &Path, cwd: &Path) -> Result<i32> {
            self.calls.borrow_mut().push(Call::Launch {
                program: program.to_path_buf(),
                cwd: cwd.to_path_buf(),
                python: env.python.clone(),
            });
            Ok(self.exit_code)
        }
    }

    struct Fixture {
        _root: TempDir,
        config: BootstrapConfig,
    }

    fn fixture(manifest: &str) -> Fixture {
        let root = TempDir::new().unwrap();
        let source = root.path().join("src");
        fs::create_dir_all(&source).unwrap();
        fs::write(source.join("main.py"), "print('hello')\n").unwrap();
        fs::write(source.join("requirements.txt"), manifest).unwrap();

        let mut config = BootstrapConfig::default();
        config.workspace.source = source;
        config.workspace.destination = root.path().join("app");
        Fixture { _root: root, config }
    }

    #[test]
    fn test_up_runs_every_stage_in_order() {
        let fx = fixture("requests\nrich>=13\n");
        let bootstrap = Bootstrap::new(fx.config.clone(), FakeToolchain::new());

        let report = bootstrap.up().unwrap();
        assert_eq!(report.completed(), Stage::ALL.to_vec());
        assert_eq!(report.packages, vec!["requests==1.0", "rich==1.0"]);
        assert_eq!(report.exit_code, Some(0));

        let calls = bootstrap.toolchain().calls();
        assert_eq!(calls[0], Call::Version);
        assert_eq!(calls[1], Call::CreateEnv(fx.config.env_dir()));
        assert_eq!(calls[2], Call::Install { no_cache: true });
        assert_eq!(calls[3], Call::Freeze);
        assert!(matches!(calls[4], Call::Launch { .. }));
    }

    #[test]
    fn test_exit_code_comes_from_entry_program() {
        let fx = fixture("");
        let mut toolchain = FakeToolchain::new();
        toolchain.exit_code = 3;
        let report = Bootstrap::new(fx.config, toolchain).up().unwrap();
        assert_eq!(report.exit_code, Some(3));
    }

    #[test]
    fn test_unresolvable_package_aborts_before_launch() {
        let fx = fixture("requests\nno-such-package\n");
        let mut toolchain = FakeToolchain::new();
        toolchain.unresolvable = vec!["no-such-package".to_string()];
        let bootstrap = Bootstrap::new(fx.config.clone(), toolchain);

        let err = bootstrap.up().unwrap_err();
        assert_eq!(err.stage(), Some(Stage::InstallDeps));
        assert!(!fx.config.env_dir().exists(), "partial environment must be discarded");
        assert!(!bootstrap
            .toolchain()
            .calls()
            .iter()
            .any(|c| matches!(c, Call::Launch { .. })));
        assert!(bootstrap.run().is_err());
    }

    #[test]
    fn test_malformed_manifest_fails_install_stage() {
        let fx = fixture("flask ==\n");
        let bootstrap = Bootstrap::new(fx.config.clone(), FakeToolchain::new());
        let err = bootstrap.build().unwrap_err();
        assert!(matches!(err, AssistError::Manifest { line: 1, .. }));
        assert!(!fx.config.env_dir().exists());
    }

    #[test]
    fn test_unreadable_source_aborts_before_environment() {
        let mut fx = fixture("");
        fx.config.workspace.source = PathBuf::from("/nonexistent/assistbot-src");
        let bootstrap = Bootstrap::new(fx.config, FakeToolchain::new());

        let err = bootstrap.build().unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Materialize));
        assert_eq!(bootstrap.toolchain().calls(), vec![Call::Version]);
    }

    #[test]
    fn test_pinned_version_mismatch_is_provisioning_failure() {
        let fx = fixture("");
        let mut toolchain = FakeToolchain::new();
        toolchain.version = "3.11.9".to_string();
        let bootstrap = Bootstrap::new(fx.config.clone(), toolchain);

        let err = bootstrap.build().unwrap_err();
        assert!(matches!(err, AssistError::Provisioning(_)));
        assert!(!fx.config.workspace.destination.exists());
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let fx = fixture("requests\nrich\n");
        let bootstrap = Bootstrap::new(fx.config, FakeToolchain::new());
        let first = bootstrap.build().unwrap();
        let second = bootstrap.build().unwrap();
        assert_eq!(first.packages, second.packages);
    }

    #[test]
    fn test_rebuild_replaces_stale_environment() {
        let fx = fixture("requests\n");
        let bootstrap = Bootstrap::new(fx.config.clone(), FakeToolchain::new());
        bootstrap.build().unwrap();
        let site = FakeToolchain::site_packages(&Environment::at(&fx.config.env_dir()));
        fs::write(site.join("stale"), "").unwrap();

        let report = bootstrap.build().unwrap();
        assert_eq!(report.packages, vec!["requests==1.0"]);
    }

    #[test]
    fn test_entry_launched_without_args_from_destination() {
        let fx = fixture("");
        let bootstrap = Bootstrap::new(fx.config.clone(), FakeToolchain::new());
        bootstrap.build().unwrap();
        fs::write(fx.config.workspace.source.join("unrelated.txt"), "noise").unwrap();

        bootstrap.run().unwrap();
        let launch = bootstrap.toolchain().calls().pop().unwrap();
        assert_eq!(
            launch,
            Call::Launch {
                program: PathBuf::from("main.py"),
                cwd: fx.config.workspace.destination.clone(),
                python: Environment::at(&fx.config.env_dir()).python,
            }
        );
    }

    #[test]
    fn test_relative_destination_launches_with_absolute_paths() {
        let fx = fixture("requests\n");
        let cwd = std::env::current_dir().unwrap();
        let scratch = TempDir::new_in(&cwd).unwrap();
        let relative = scratch.path().strip_prefix(&cwd).unwrap().join("app");
        assert!(relative.is_relative());

        let mut config = fx.config.clone();
        config.workspace.destination = relative.clone();
        let bootstrap = Bootstrap::new(config, FakeToolchain::new());
        bootstrap.up().unwrap();

        let expected = cwd.join(&relative);
        match bootstrap.toolchain().calls().pop().unwrap() {
            Call::Launch { cwd, python, .. } => {
                assert_eq!(cwd, expected);
                assert!(python.is_absolute());
                assert!(python.starts_with(&expected));
                assert!(python.is_file());
            }
            other => panic!("Expected launch, got {other:?}"),
        }
        assert!(expected.join("main.py").is_file());
    }

    #[test]
    fn test_environment_failure_stops_before_install() {
        let fx = fixture("requests\n");
        let mut toolchain = FakeToolchain::new();
        toolchain.fail_create_env = true;
        let bootstrap = Bootstrap::new(fx.config, toolchain);

        let err = bootstrap.up().unwrap_err();
        assert_eq!(err.stage(), Some(Stage::CreateEnv));
        assert!(!bootstrap
            .toolchain()
            .calls()
            .iter()
            .any(|c| matches!(c, Call::Install { .. } | Call::Launch { .. })));
        assert!(matches!(bootstrap.run(), Err(AssistError::Entry(_))));
    }

    #[test]
    fn test_insufficient_space_stops_at_create_env() {
        let mut fx = fixture("requests\n");
        if crate::bootstrap::preflight::available_space(fx._root.path()).is_none() {
            return;
        }
        fx.config.environment.min_free_bytes = Some(u64::MAX);
        let bootstrap = Bootstrap::new(fx.config.clone(), FakeToolchain::new());

        let err = bootstrap.build().unwrap_err();
        assert_eq!(err.stage(), Some(Stage::CreateEnv));
        assert_eq!(bootstrap.toolchain().calls(), vec![Call::Version]);
        assert!(!fx.config.env_dir().exists());
        assert!(bootstrap.run().is_err());
    }

    #[test]
    fn test_run_without_build_refuses() {
        let fx = fixture("");
        let bootstrap = Bootstrap::new(fx.config, FakeToolchain::new());
        let err = bootstrap.run().unwrap_err();
        assert!(matches!(err, AssistError::Entry(_)));
        assert!(bootstrap.toolchain().calls().is_empty());
    }

    #[test]
    fn test_cache_flag_follows_config() {
        let mut fx = fixture("");
        fx.config.dependencies.no_cache = false;
        let bootstrap = Bootstrap::new(fx.config, FakeToolchain::new());
        bootstrap.build().unwrap();
        assert!(bootstrap
            .toolchain()
            .calls()
            .contains(&Call::Install { no_cache: false }));
    }
}
