//! # dir_backup
//!
//! Archives a directory into a timestamped `.tar.gz` with progress feedback.
//!
//! ## Features
//!
//! - **Streaming**: tar, progress meter and gzip run as concurrent stages over bounded pipes
//! - **All or nothing**: a failure in any stage fails the run and removes the partial archive
//! - **Interrupt safe**: SIGINT/SIGTERM during archiving cancel the pipeline and clean up
//! - **Run log**: every step is appended to `<backup-dir>/backup.log` and echoed to the console
//!
//! ## Quick Start
//!
//! ```no_run
//! use dir_backup::backup::backup_config::BackupConfig;
//! use dir_backup::backup::logging;
//! use dir_backup::backup::orchestrator::Orchestrator;
//! use dir_backup::backup::toolbox::Toolbox;
//!
//! let config = BackupConfig::builder()
//!     .source_dir("/home/me/documents")
//!     .backup_dir("/mnt/backups")
//!     .build();
//!
//! let _log = logging::install(config.log_file(), true)?;
//! let archive = Orchestrator::new(&config, &Toolbox::builtin(&config)).run()?;
//! println!("{}", archive.display());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod backup;
