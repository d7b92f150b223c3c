use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use super::request::TagRequest;
use crate::config::ExifToolConfig;
use crate::error::{Error, Result};

const EXIFTOOL: &str = "exiftool";

/// Something that can apply a [`TagRequest`] to a file in place.
///
/// [`ExifTool`] is the production implementation. The batch code only sees
/// this trait, so tests can substitute a recording writer.
#[async_trait::async_trait]
pub trait TagWriter: Send + Sync {
    /// Display name used in log lines.
    fn name(&self) -> &str;
    /// Overwrite the tags in `request` on `path`. No backup is kept.
    async fn write_tags(&self, path: &Path, request: &TagRequest) -> Result<()>;
}

/// Runs the `exiftool` executable once per file.
#[derive(Debug, Clone)]
pub struct ExifTool {
    program: PathBuf,
    timeout: Duration,
    preserve_file_times: bool,
}

impl ExifTool {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: Duration::from_secs(60),
            preserve_file_times: true,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_preserve_file_times(mut self, preserve: bool) -> Self {
        self.preserve_file_times = preserve;
        self
    }

    /// Find exiftool according to `config`.
    ///
    /// An explicit `path` wins. Otherwise the configured search paths are
    /// probed in order, then every `PATH` entry.
    pub fn locate(config: &ExifToolConfig) -> Result<Self> {
        let program = match config.path.as_deref() {
            Some(explicit) => {
                let explicit = PathBuf::from(explicit);
                if !is_executable(&explicit) {
                    return Err(Error::ToolNotFound {
                        searched: explicit.display().to_string(),
                    });
                }
                explicit
            }
            None => {
                let mut dirs: Vec<PathBuf> = config.search_paths.iter().map(PathBuf::from).collect();
                if let Some(path_var) = std::env::var_os("PATH") {
                    dirs.extend(std::env::split_paths(&path_var));
                }
                find_in_dirs(&dirs).ok_or_else(|| Error::ToolNotFound {
                    searched: dirs
                        .iter()
                        .map(|d| d.display().to_string())
                        .collect::<Vec<_>>()
                        .join(", "),
                })?
            }
        };

        log::debug!("Using exiftool at {}", program.display());
        Ok(Self::new(program)
            .with_timeout(Duration::from_secs(config.timeout_secs))
            .with_preserve_file_times(config.preserve_file_times))
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Full argument list for tagging `path`.
    ///
    /// `--` ends option parsing so file names starting with `-` are safe.
    pub fn command_args(&self, path: &Path, request: &TagRequest) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();
        if self.preserve_file_times {
            args.push("-P".into());
        }
        args.push("-overwrite_original".into());
        args.extend(request.to_args().into_iter().map(OsString::from));
        args.push("--".into());
        args.push(path.as_os_str().to_owned());
        args
    }
}

#[async_trait::async_trait]
impl TagWriter for ExifTool {
    fn name(&self) -> &str {
        EXIFTOOL
    }

    async fn write_tags(&self, path: &Path, request: &TagRequest) -> Result<()> {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.command_args(path, request))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(Error::TagWrite {
                    path: path.to_path_buf(),
                    reason: format!("failed to run {}: {e}", self.program.display()),
                });
            }
            Err(_) => {
                return Err(Error::TagWrite {
                    path: path.to_path_buf(),
                    reason: format!("timed out after {:?}", self.timeout),
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::TagWrite {
                path: path.to_path_buf(),
                reason: format!("exiftool exited with {}: {}", output.status, stderr.trim()),
            });
        }

        log::trace!(
            "exiftool {}: {}",
            path.display(),
            String::from_utf8_lossy(&output.stdout).trim()
        );
        Ok(())
    }
}

/// First `exiftool` executable found in `dirs`.
fn find_in_dirs(dirs: &[PathBuf]) -> Option<PathBuf> {
    dirs.iter()
        .map(|dir| dir.join(EXIFTOOL))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
