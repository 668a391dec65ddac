//! PMD installation lookup and invocation.
//!
//! The installation is resolved once at setup: an explicit `pmd_path`, or
//! `<cache_dir>/pmd-bin-<version>`. Fetching releases is left to the operator;
//! a missing installation is a setup error naming the release archive.
//!
//! Each run spawns `pmd check` on a current-thread tokio runtime so the
//! blocking call can be bounded by a wall-clock timeout. The child is killed
//! when the timeout fires.

use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use tokio::process::Command;
use tokio::runtime::Runtime;
use tokio::time::timeout;

use super::{resolve_outcome, Analyzer, Invocation};
use crate::error::{AppError, Result};
use crate::models::AnalysisResult;

const JAVA_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct PmdOptions {
    pub version: String,
    pub pmd_path: Option<PathBuf>,
    pub cache_dir: PathBuf,
    pub skip_download: bool,
}

#[derive(Debug, Clone)]
pub struct PmdInstallation {
    pub home: PathBuf,
    pub launcher: PathBuf,
}

impl PmdInstallation {
    pub fn locate(options: &PmdOptions) -> Result<Self> {
        let home = match &options.pmd_path {
            Some(path) if path.exists() => {
                tracing::info!("Using provided PMD installation at {}", path.display());
                path.clone()
            }
            Some(path) => {
                return Err(AppError::AnalyzerUnavailable(format!(
                    "PMD installation not found at {}",
                    path.display()
                )));
            }
            None => {
                let cached = options.cache_dir.join(format!("pmd-bin-{}", options.version));
                if !cached.exists() {
                    return Err(missing_installation(options, &cached));
                }
                tracing::info!("Using PMD installation at {}", cached.display());
                cached
            }
        };

        let launcher = home.join("bin").join(launcher_name());
        if !launcher.is_file() {
            return Err(AppError::AnalyzerUnavailable(format!(
                "PMD binary not found at {}",
                launcher.display()
            )));
        }
        ensure_executable(&launcher)?;

        Ok(Self { home, launcher })
    }
}

fn missing_installation(options: &PmdOptions, cached: &Path) -> AppError {
    if options.skip_download {
        AppError::AnalyzerUnavailable(format!(
            "download skipped and no existing PMD installation at {}",
            cached.display()
        ))
    } else {
        AppError::AnalyzerUnavailable(format!(
            "PMD {} is not installed at {}; download {} and extract it into {}",
            options.version,
            cached.display(),
            release_url(&options.version),
            options.cache_dir.display()
        ))
    }
}

pub fn release_url(version: &str) -> String {
    format!(
        "https://github.com/pmd/pmd/releases/download/pmd_releases%2F{version}/pmd-bin-{version}.zip"
    )
}

fn launcher_name() -> &'static str {
    if cfg!(windows) { "pmd.bat" } else { "pmd" }
}

#[cfg(unix)]
fn ensure_executable(launcher: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = std::fs::metadata(launcher)?.permissions();
    if permissions.mode() & 0o111 == 0 {
        permissions.set_mode(0o755);
        std::fs::set_permissions(launcher, permissions)?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn ensure_executable(_launcher: &Path) -> Result<()> {
    Ok(())
}

pub struct PmdRunner {
    installation: PmdInstallation,
    timeout: Duration,
    runtime: Runtime,
}

impl PmdRunner {
    pub fn new(installation: PmdInstallation, timeout: Duration) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        Ok(Self {
            installation,
            timeout,
            runtime,
        })
    }

    pub fn installation(&self) -> &PmdInstallation {
        &self.installation
    }

    /// Probe for a Java runtime; PMD cannot start without one.
    pub fn check_java(&self) -> Result<()> {
        let probe = self.runtime.block_on(async {
            timeout(
                JAVA_CHECK_TIMEOUT,
                Command::new("java").arg("-version").kill_on_drop(true).output(),
            )
            .await
        });

        let output = match probe {
            Err(_) => {
                return Err(AppError::RuntimeMissing(
                    "`java -version` timed out".to_string(),
                ));
            }
            Ok(Err(e)) => {
                return Err(AppError::RuntimeMissing(format!(
                    "Java is not available in PATH; install Java 11+ ({e})"
                )));
            }
            Ok(Ok(output)) => output,
        };

        if !output.status.success() {
            return Err(AppError::RuntimeMissing("`java -version` failed".to_string()));
        }

        // java prints its version banner on stderr
        let banner = if output.stderr.is_empty() {
            String::from_utf8_lossy(&output.stdout).to_string()
        } else {
            String::from_utf8_lossy(&output.stderr).to_string()
        };
        tracing::debug!(
            "Java version check: {}",
            banner.lines().next().unwrap_or("unknown")
        );
        Ok(())
    }

    fn execute(&self, tree: &Path, ruleset: &Path, report: &Path) -> Result<Output> {
        let mut command = Command::new(&self.installation.launcher);
        command
            .arg("check")
            .arg("-d")
            .arg(tree)
            .arg("-R")
            .arg(ruleset)
            .args(["-f", "xml", "-r"])
            .arg(report)
            .arg("--no-cache")
            .arg("--fail-on-violation=false")
            .kill_on_drop(true);

        tracing::debug!("Running PMD: {:?}", command.as_std());

        let limit = self.timeout;
        let output = self
            .runtime
            .block_on(async { timeout(limit, command.output()).await })
            .map_err(|_| AppError::AnalyzerTimeout(limit))??;

        Ok(output)
    }
}

impl Analyzer for PmdRunner {
    fn run(&self, tree: &Path, ruleset: &Path) -> Result<AnalysisResult> {
        let scratch = tempfile::Builder::new().prefix("pmd-report-").tempdir()?;
        let report_path = scratch.path().join("report.xml");

        let output = self.execute(tree, ruleset, &report_path)?;
        let code = output.status.code();
        tracing::debug!("PMD exit code: {:?}", code);

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        if !stdout.is_empty() {
            tracing::debug!("PMD stdout: {}", stdout);
        }
        if !stderr.is_empty() {
            tracing::debug!("PMD stderr: {}", stderr);
        }

        let report = match std::fs::read_to_string(&report_path) {
            Ok(contents) => Some(contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        resolve_outcome(
            Invocation {
                code,
                report,
                stdout,
                stderr,
            },
            tree,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(cache_dir: &Path) -> PmdOptions {
        PmdOptions {
            version: "7.15.0".to_string(),
            pmd_path: None,
            cache_dir: cache_dir.to_path_buf(),
            skip_download: false,
        }
    }

    fn fake_install(home: &Path) {
        let bin = home.join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        std::fs::write(bin.join(launcher_name()), "#!/bin/sh\nexit 0\n").unwrap();
    }

    #[test]
    fn missing_installation_names_release() {
        let dir = tempfile::tempdir().unwrap();
        let err = PmdInstallation::locate(&options(dir.path())).unwrap_err();

        assert!(err.is_setup());
        assert!(err.to_string().contains(&release_url("7.15.0")));
    }

    #[test]
    fn skip_download_requires_existing_installation() {
        let dir = tempfile::tempdir().unwrap();
        let mut opts = options(dir.path());
        opts.skip_download = true;

        let err = PmdInstallation::locate(&opts).unwrap_err();
        assert!(err.to_string().contains("download skipped"));
    }

    #[test]
    fn finds_cached_installation() {
        let dir = tempfile::tempdir().unwrap();
        fake_install(&dir.path().join("pmd-bin-7.15.0"));

        let install = PmdInstallation::locate(&options(dir.path())).unwrap();
        assert!(install.launcher.ends_with(Path::new("bin").join(launcher_name())));
    }

    #[test]
    fn explicit_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        let home = dir.path().join("custom");
        fake_install(&home);
        let mut opts = options(&dir.path().join("unused"));
        opts.pmd_path = Some(home.clone());

        let install = PmdInstallation::locate(&opts).unwrap();
        assert_eq!(install.home, home);
    }

    #[test]
    fn explicit_path_without_launcher_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut opts = options(dir.path());
        opts.pmd_path = Some(dir.path().to_path_buf());

        let err = PmdInstallation::locate(&opts).unwrap_err();
        assert!(matches!(err, AppError::AnalyzerUnavailable(_)));
    }

    #[cfg(unix)]
    #[test]
    fn run_times_out_on_slow_analyzer() {
        let dir = tempfile::tempdir().unwrap();
        let home = dir.path().join("slow");
        let bin = home.join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        std::fs::write(bin.join("pmd"), "#!/bin/sh\nsleep 5\n").unwrap();

        let install = PmdInstallation::locate(&PmdOptions {
            pmd_path: Some(home),
            ..options(dir.path())
        })
        .unwrap();
        let runner = PmdRunner::new(install, Duration::from_millis(200)).unwrap();

        let err = runner.run(dir.path(), Path::new("rules.xml")).unwrap_err();
        assert!(matches!(err, AppError::AnalyzerTimeout(_)));
    }

    #[cfg(unix)]
    #[test]
    fn run_reads_report_written_by_analyzer() {
        let dir = tempfile::tempdir().unwrap();
        let home = dir.path().join("scripted");
        let bin = home.join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        // Arguments: check -d TREE -R RULES -f xml -r REPORT ...
        std::fs::write(
            bin.join("pmd"),
            "#!/bin/sh\ncat > \"$9\" <<'EOF'\n<pmd><file name=\"A.java\"><violation rule=\"R\" priority=\"3\">m</violation></file></pmd>\nEOF\nexit 4\n",
        )
        .unwrap();

        let install = PmdInstallation::locate(&PmdOptions {
            pmd_path: Some(home),
            ..options(dir.path())
        })
        .unwrap();
        let runner = PmdRunner::new(install, Duration::from_secs(30)).unwrap();

        let result = runner.run(dir.path(), Path::new("rules.xml")).unwrap();
        assert_eq!(result.violation_count, 1);
        assert_eq!(result.violations[0].priority, 3);
    }
}
