//! A single backup run from dependency check to the final report.
//!
//! Preconditions are checked in order, each a hard stop: capabilities, the
//! backup directory (created when missing), then the source directory. The
//! pipeline then streams into `backup-<timestamp>.tar.gz` while an interrupt
//! listener is armed; the listener only exists for that window. Anything but
//! a clean pipeline result leaves no archive behind.

use crate::backup::archive::tree_size;
use crate::backup::backup_config::BackupConfig;
use crate::backup::cleanup::PartialArchive;
use crate::backup::logging::{success, SEPARATOR};
use crate::backup::pipeline::Pipeline;
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::toolbox::{Toolbox, Tools};
use crate::backup::validate::{validate_dir_exist, validate_dir_exist_or_created};
use chrono::Local;
use indicatif::HumanBytes;
use std::fs::File;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn, Dispatch};

/// How long stages get to unwind after an interrupt before the archive is removed anyway.
static TEARDOWN_GRACE: Duration = Duration::from_secs(5);

pub struct Orchestrator<'a> {
    config: &'a BackupConfig,
    toolbox: &'a Toolbox,
}

impl<'a> Orchestrator<'a> {
    pub fn new(config: &'a BackupConfig, toolbox: &'a Toolbox) -> Self {
        Self { config, toolbox }
    }

    /// Runs the backup, treating SIGINT/SIGTERM during the pipeline as a failure.
    pub fn run(&self) -> Result<PathBuf> {
        self.run_until(wait_for_interrupt())
    }

    /// Runs the backup; `interrupt` completing while the pipeline runs cancels it.
    ///
    /// Returns the path of the kept archive.
    pub fn run_until<F: Future<Output = ()>>(&self, interrupt: F) -> Result<PathBuf> {
        info!("Starting Professional Backup Script");

        let tools = self.check_dependencies()?;
        let (src_dir, backup_dir) = self.check_directories()?;

        let file_name = self.config.archive_file_name(&Local::now());
        info!("Backup file name: {}", file_name);

        let guard = PartialArchive::new(backup_dir.join(file_name));
        match self.archive(tools, &src_dir, guard.path(), interrupt) {
            Ok(metered) => {
                let archive_path = guard.keep();
                let size = std::fs::metadata(&archive_path).map(|m| m.len()).unwrap_or(0);
                success!("Backup completed successfully");
                info!(
                    "Backup file: {} ({} compressed, {} streamed)",
                    archive_path.display(),
                    HumanBytes(size),
                    HumanBytes(metered)
                );
                Ok(archive_path)
            }
            Err(e) => {
                if e.is_interrupted() {
                    error!("Backup interrupted before completion");
                } else {
                    error!("Backup failed: {}", e);
                }
                drop(guard);
                info!("{}", SEPARATOR);
                Err(e)
            }
        }
    }

    fn check_dependencies(&self) -> Result<Tools> {
        info!("Checking dependencies...");
        self.toolbox.require().map_err(|missing| {
            for capability in &missing {
                error!("Required tool is not available: {}", capability);
            }
            Error::MissingTools(missing)
        })
    }

    fn check_directories(&self) -> Result<(PathBuf, PathBuf)> {
        let backup_dir = self.config.backup_dir();
        validate_dir_exist_or_created(backup_dir).map_err(|e| {
            error!("Cannot use backup directory {}: {}", backup_dir.display(), e);
            Error::from(e)
        })?;

        let src_dir = self.config.source_dir();
        validate_dir_exist(src_dir).map_err(|e| {
            error!("Source directory is not usable: {}", e);
            Error::from(e)
        })?;

        let src_dir = resolve(src_dir, "source")?;
        let backup_dir = resolve(backup_dir, "backup")?;
        info!("Source directory: {}", src_dir.display());
        info!("Backup directory: {}", backup_dir.display());
        info!("Log file: {}", self.config.log_file().display());
        Ok((src_dir, backup_dir))
    }

    /// Sizes the tree, then streams it into `archive_path` unless interrupted first.
    fn archive<F: Future<Output = ()>>(
        &self,
        tools: Tools,
        src_dir: &Path,
        archive_path: &Path,
        interrupt: F,
    ) -> Result<u64> {
        let total = tree_size(src_dir)?;
        info!("Total size to back up: {}", HumanBytes(total));

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let res = runtime.block_on(stream(tools, src_dir, total, archive_path, interrupt));
        // tokio keeps its signal handlers registered for the rest of the process,
        // so a later SIGINT no longer terminates it; main returns right after this.
        runtime.shutdown_background();
        res
    }
}

fn resolve(dir: &Path, role: &str) -> Result<PathBuf> {
    dir.canonicalize().map_err(|e| {
        error!("Cannot resolve {} directory {}: {}", role, dir.display(), e);
        Error::from(e)
    })
}

/// Runs the pipeline into a new `archive_path`, racing it against `interrupt`.
///
/// `interrupt` is polled once before the file is created so that signal
/// listeners are registered before there is anything to clean up.
async fn stream<F: Future<Output = ()>>(
    tools: Tools,
    src_dir: &Path,
    total: u64,
    archive_path: &Path,
    interrupt: F,
) -> Result<u64> {
    tokio::pin!(interrupt);
    let interrupted = tokio::select! {
        biased;
        _ = &mut interrupt => true,
        _ = std::future::ready(()) => false,
    };
    if interrupted {
        warn!("Interrupt received before archiving started");
        return Err(Error::Interrupted);
    }

    info!("Starting archive and compression...");
    let file = File::create(archive_path)?;
    let cancel = CancellationToken::new();
    let pipeline = Pipeline::new(tools, cancel.clone());
    let src_dir = src_dir.to_path_buf();
    let dispatch = tracing::dispatcher::get_default(Dispatch::clone);

    let mut handle = tokio::task::spawn_blocking(move || {
        tracing::dispatcher::with_default(&dispatch, || pipeline.run(&src_dir, total, file))
    });
    tokio::select! {
        joined = &mut handle => match joined {
            Ok(res) => res,
            Err(e) => Err(Error::from(e)),
        },
        _ = &mut interrupt => {
            warn!("Interrupt received, stopping backup pipeline");
            cancel.cancel();
            if tokio::time::timeout(TEARDOWN_GRACE, handle).await.is_err() {
                warn!("Pipeline did not stop within {:?}", TEARDOWN_GRACE);
            }
            Err(Error::Interrupted)
        }
    }
}

/// Resolves on the first SIGINT (or SIGTERM on unix).
///
/// The signal handlers are registered on the first poll.
pub async fn wait_for_interrupt() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
