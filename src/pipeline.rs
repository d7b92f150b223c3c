use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::exif::{TagRequest, TagWriter};
use crate::metadata::{MetadataSet, load_metadata};

/// Extensions (compared case-insensitively) of the files that get tagged.
const JPEG_EXTENSIONS: &[&str] = &["jpg", "jpeg"];

/// Sidecar extensions, probed in this order.
const SIDECAR_EXTENSIONS: &[&str] = &["xmp", "XMP"];

/// One JPEG and the XMP sidecar found next to it, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTask {
    pub jpeg: PathBuf,
    pub sidecar: Option<PathBuf>,
}

impl FileTask {
    /// Build a task for `jpeg`, resolving its sidecar on disk.
    pub fn new(jpeg: PathBuf) -> Self {
        let sidecar = resolve_sidecar(&jpeg);
        Self { jpeg, sidecar }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Failure,
}

/// The final state of one [`FileTask`].
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub sidecar: Option<PathBuf>,
    pub outcome: Outcome,
    /// Tool errors for the JPEG and/or the sidecar, joined with `; `.
    pub error: Option<String>,
}

impl FileOutcome {
    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }
}

/// Aggregate over every task of one directory.
///
/// `outcomes` is in enumeration order, so `first_error_path` does not depend
/// on which worker finished first.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    pub success_count: usize,
    pub error_count: usize,
    pub sidecar_count: usize,
    pub first_error_path: Option<PathBuf>,
    /// Requests were only logged; no file was modified.
    pub dry_run: bool,
    pub outcomes: Vec<FileOutcome>,
}

impl BatchResult {
    fn from_outcomes(outcomes: Vec<FileOutcome>, dry_run: bool) -> Self {
        let success_count = outcomes.iter().filter(|o| o.is_success()).count();
        let sidecar_count = outcomes.iter().filter(|o| o.sidecar.is_some()).count();
        let first_error_path = outcomes
            .iter()
            .find(|o| !o.is_success())
            .map(|o| o.path.clone());

        Self {
            success_count,
            error_count: outcomes.len() - success_count,
            sidecar_count,
            first_error_path,
            dry_run,
            outcomes,
        }
    }

    pub fn total(&self) -> usize {
        self.success_count + self.error_count
    }

    /// Human-readable summary, one statement per line.
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        if self.dry_run {
            lines.push("Dry run, nothing was written.".to_string());
        }
        if self.error_count == 0 {
            lines.push(format!(
                "{} of {} JPEG file(s) updated.",
                self.success_count,
                self.total()
            ));
            if self.sidecar_count > 0 {
                lines.push(format!("{} XMP sidecar file(s) also updated.", self.sidecar_count));
            } else {
                lines.push("No XMP sidecar files found.".to_string());
            }
        } else {
            lines.push(format!(
                "{} succeeded, {} failed.",
                self.success_count, self.error_count
            ));
            if self.sidecar_count > 0 {
                lines.push(format!("{} XMP sidecar file(s) processed.", self.sidecar_count));
            } else {
                lines.push("No XMP sidecar files found.".to_string());
            }
            if let Some(ref first) = self.first_error_path {
                lines.push(format!("First error: {}", first.display()));
            }
        }
        lines.join("\n")
    }
}

/// Worker pool settings for [`apply_batch`].
#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    pub concurrency: usize,
    pub dry_run: bool,
}

impl From<&Config> for BatchOptions {
    fn from(config: &Config) -> Self {
        Self {
            concurrency: config.concurrency(),
            dry_run: config.output.dry_run,
        }
    }
}

/// What happened to one directory of a run.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DirectoryReport {
    /// The directory was not processed. No file in it was touched.
    Skipped { directory: PathBuf, reason: String },
    /// Metadata was valid but the directory holds no JPEGs.
    NoFiles { directory: PathBuf },
    Completed {
        directory: PathBuf,
        result: BatchResult,
    },
}

impl DirectoryReport {
    pub fn directory(&self) -> &Path {
        match self {
            Self::Skipped { directory, .. }
            | Self::NoFiles { directory }
            | Self::Completed { directory, .. } => directory.as_path(),
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::Skipped { reason, .. } => reason.clone(),
            Self::NoFiles { .. } => "No JPEG files found.".to_string(),
            Self::Completed { result, .. } => result.summary(),
        }
    }
}

/// List the JPEGs directly inside `dir`, sorted by file name.
///
/// Subdirectories are not descended into. Symlinks count when they point at
/// a regular file.
///
/// # Example
///
/// ```rust,no_run
/// use film_exif::pipeline::collect_jpegs;
///
/// let jpegs = collect_jpegs("./roll-042".as_ref());
/// println!("Found {} JPEGs", jpegs.len());
/// ```
pub fn collect_jpegs(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("Skipping unreadable entry in {}: {e}", dir.display());
                None
            }
        })
        .filter(|e| e.file_type().is_file() && is_jpeg(e.path()))
        .map(|e| e.into_path())
        .collect()
}

/// Check if a file has a JPEG extension.
fn is_jpeg(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| JPEG_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Find the XMP sidecar of a JPEG.
///
/// Base names are tried from most to least specific: the name without its
/// last extension (`IMG_1.edit` for `IMG_1.edit.jpg`), then the name up to
/// its first dot (`IMG_1`). Each base is tried with `.xmp` then `.XMP`, and
/// the first regular file found wins.
pub fn resolve_sidecar(jpeg: &Path) -> Option<PathBuf> {
    let dir = jpeg.parent()?;
    let file_name = jpeg.file_name()?.to_str()?;

    let mut bases: Vec<&str> = Vec::new();
    if let Some(stem) = jpeg.file_stem().and_then(|s| s.to_str()) {
        bases.push(stem);
    }
    if let Some((first, _)) = file_name.split_once('.') {
        if !first.is_empty() && !bases.contains(&first) {
            bases.push(first);
        }
    }

    bases
        .iter()
        .flat_map(|base| {
            SIDECAR_EXTENSIONS
                .iter()
                .map(move |ext| dir.join(format!("{base}.{ext}")))
        })
        .find(|candidate| candidate.is_file())
}

/// Enumerate `dir` into tasks, one per JPEG.
pub fn collect_tasks(dir: &Path) -> Vec<FileTask> {
    collect_jpegs(dir).into_iter().map(FileTask::new).collect()
}

async fn apply(
    writer: &dyn TagWriter,
    path: &Path,
    request: &TagRequest,
    dry_run: bool,
) -> Result<()> {
    if dry_run {
        log::info!(
            "  Would write {}: {}",
            path.display(),
            request.to_args().join(" ")
        );
        return Ok(());
    }
    log::debug!("  {} {}: {}", writer.name(), path.display(), request.to_args().join(" "));
    writer.write_tags(path, request).await
}

/// Tag one JPEG and, if present, its sidecar.
///
/// The sidecar is attempted even when the JPEG write fails. The outcome is
/// a success only if every attempted write succeeded.
pub async fn process_file(
    task: &FileTask,
    metadata: &MetadataSet,
    writer: &dyn TagWriter,
    dry_run: bool,
) -> FileOutcome {
    let mut errors = Vec::new();

    let jpeg_request = TagRequest::for_jpeg(metadata);
    if let Err(e) = apply(writer, &task.jpeg, &jpeg_request, dry_run).await {
        log::warn!("{e}");
        errors.push(e.to_string());
    }

    if let Some(ref sidecar) = task.sidecar {
        let sidecar_request = TagRequest::for_sidecar(metadata);
        if let Err(e) = apply(writer, sidecar, &sidecar_request, dry_run).await {
            log::warn!("{e}");
            errors.push(e.to_string());
        }
    }

    FileOutcome {
        path: task.jpeg.clone(),
        sidecar: task.sidecar.clone(),
        outcome: if errors.is_empty() {
            Outcome::Success
        } else {
            Outcome::Failure
        },
        error: (!errors.is_empty()).then(|| errors.join("; ")),
    }
}

/// Tag every task with at most `options.concurrency` files in flight.
///
/// Returns once every task has resolved. A task whose worker died without
/// reporting is counted as a failure, so `success_count + error_count`
/// always equals `tasks.len()`.
///
/// # Example
///
/// ```rust,no_run
/// use film_exif::config::Config;
/// use film_exif::exif::{ExifTool, TagWriter};
/// use film_exif::metadata::load_metadata;
/// use film_exif::pipeline::{apply_batch, collect_tasks, BatchOptions};
/// use std::path::Path;
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::default();
/// let dir = Path::new("./roll-042");
/// let writer: Arc<dyn TagWriter> = Arc::new(ExifTool::locate(&config.exiftool)?);
/// let metadata = Arc::new(load_metadata(dir, "metadata.json")?);
///
/// let result = apply_batch(collect_tasks(dir), metadata, writer, BatchOptions::from(&config)).await;
/// println!("{}", result.summary());
/// # Ok(())
/// # }
/// ```
pub async fn apply_batch(
    tasks: Vec<FileTask>,
    metadata: Arc<MetadataSet>,
    writer: Arc<dyn TagWriter>,
    options: BatchOptions,
) -> BatchResult {
    let semaphore = Arc::new(Semaphore::new(options.concurrency.max(1)));
    let mut slots: Vec<Option<FileOutcome>> = vec![None; tasks.len()];
    let mut workers = JoinSet::new();

    for (index, task) in tasks.iter().cloned().enumerate() {
        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            break;
        };
        let metadata = Arc::clone(&metadata);
        let writer = Arc::clone(&writer);
        workers.spawn(async move {
            let _permit = permit;
            let outcome = process_file(&task, &metadata, writer.as_ref(), options.dry_run).await;
            (index, outcome)
        });
    }

    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok((index, outcome)) => slots[index] = Some(outcome),
            Err(e) => log::error!("Worker failed: {e}"),
        }
    }

    let outcomes = slots
        .into_iter()
        .zip(tasks)
        .map(|(slot, task)| {
            slot.unwrap_or_else(|| FileOutcome {
                path: task.jpeg,
                sidecar: task.sidecar,
                outcome: Outcome::Failure,
                error: Some("worker did not complete".to_string()),
            })
        })
        .collect();

    BatchResult::from_outcomes(outcomes, options.dry_run)
}

/// Load metadata, enumerate, and tag one directory.
///
/// Never fails: problems with the directory or its metadata file become a
/// [`DirectoryReport::Skipped`] so the caller can move on.
pub async fn process_directory(
    dir: &Path,
    writer: Arc<dyn TagWriter>,
    config: &Config,
) -> DirectoryReport {
    if !dir.is_dir() {
        let err = Error::DirectoryNotFound(dir.to_path_buf());
        log::error!("{err}");
        return DirectoryReport::Skipped {
            directory: dir.to_path_buf(),
            reason: err.to_string(),
        };
    }

    if let Err(source) = std::fs::read_dir(dir) {
        let err = Error::UnreadableDirectory {
            path: dir.to_path_buf(),
            source,
        };
        log::error!("{err}");
        return DirectoryReport::Skipped {
            directory: dir.to_path_buf(),
            reason: err.to_string(),
        };
    }

    let metadata = match load_metadata(dir, &config.batch.metadata_file) {
        Ok(metadata) => metadata,
        Err(e) => {
            log::error!("Skipping {}: {e}", dir.display());
            return DirectoryReport::Skipped {
                directory: dir.to_path_buf(),
                reason: e.to_string(),
            };
        }
    };

    let tasks = collect_tasks(dir);
    if tasks.is_empty() {
        log::info!("No JPEG files found in {}", dir.display());
        return DirectoryReport::NoFiles {
            directory: dir.to_path_buf(),
        };
    }

    log::info!(
        "Tagging {} JPEG(s) in {} ({} {}, {})",
        tasks.len(),
        dir.display(),
        metadata.camera_make,
        metadata.camera_model,
        metadata.film
    );

    let result = apply_batch(tasks, Arc::new(metadata), writer, BatchOptions::from(config)).await;
    DirectoryReport::Completed {
        directory: dir.to_path_buf(),
        result,
    }
}

/// Process directories one after another.
pub async fn process_directories(
    dirs: &[PathBuf],
    writer: Arc<dyn TagWriter>,
    config: &Config,
) -> Vec<DirectoryReport> {
    let mut reports = Vec::with_capacity(dirs.len());
    for (i, dir) in dirs.iter().enumerate() {
        log::info!("[{}/{}] {}", i + 1, dirs.len(), dir.display());
        reports.push(process_directory(dir, Arc::clone(&writer), config).await);
    }
    reports
}
