use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::result_error::WithMsg;
use bon::Builder;
use chrono::{DateTime, NaiveDateTime, TimeZone};
use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::fs::File;
use std::path::{Path, PathBuf};
use validator::Validate;

pub static DEFAULT_SOURCE_DIR: &str = "/path/to/source";
pub static DEFAULT_BACKUP_DIR: &str = "/path/to/backup";
pub static DEFAULT_COMPRESSION_LEVEL: u32 = 6;

static ARCHIVE_PREFIX: &str = "backup";
static ARCHIVE_FILE_EXT: &str = "tar.gz";
static TIME_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";
static LOG_FILE_NAME: &str = "backup.log";

/// Everything a single backup run needs, resolved once after argument parsing.
#[derive(Clone, Debug, Validate, Builder, Getters, CopyGetters)]
pub struct BackupConfig {
    #[builder(into)]
    #[getset(get = "pub")]
    source_dir: PathBuf,
    #[builder(into)]
    #[getset(get = "pub")]
    backup_dir: PathBuf,
    /// Gzip level, 0 (store) to 9 (smallest).
    #[validate(range(min = 0, max = 9))]
    #[builder(default = DEFAULT_COMPRESSION_LEVEL)]
    #[getset(get_copy = "pub")]
    level: u32,
    #[builder(default = true)]
    #[getset(get_copy = "pub")]
    progress: bool,
    #[builder(default = true)]
    #[getset(get_copy = "pub")]
    color: bool,
}

impl BackupConfig {
    pub fn log_file(&self) -> PathBuf {
        self.backup_dir.join(LOG_FILE_NAME)
    }

    pub fn archive_file_name<T: TimeZone>(&self, dt: &DateTime<T>) -> String
    where
        T::Offset: Display,
    {
        format!(
            "{}-{}.{}",
            ARCHIVE_PREFIX,
            dt.format(TIME_FORMAT),
            ARCHIVE_FILE_EXT
        )
    }

    /// Capture time embedded in an archive file name, `None` if the name is not one of ours.
    pub fn archive_time<P: AsRef<Path>>(file_path: P) -> Option<NaiveDateTime> {
        let file_name = file_path.as_ref().file_name()?.to_str()?;
        let time_string = file_name
            .strip_prefix(ARCHIVE_PREFIX)?
            .strip_prefix('-')?
            .strip_suffix(ARCHIVE_FILE_EXT)?
            .strip_suffix('.')?;

        NaiveDateTime::parse_from_str(time_string, TIME_FORMAT).ok()
    }
}

/// One source of settings: the YAML file or the command line.
///
/// Unset fields fall through to the next layer, then to the built-in defaults.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
    pub source_dir: Option<PathBuf>,
    pub backup_dir: Option<PathBuf>,
    pub level: Option<u32>,
    pub progress: Option<bool>,
    pub color: Option<bool>,
}

impl ConfigLayer {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        File::open(path)
            .map_err(Error::from)
            .and_then(|f| serde_yml::from_reader::<_, ConfigLayer>(f).map_err(Error::from))
            .with_msg(format!("Parse YAML config failed: {:?}", path))
    }

    /// Fields set here win over `lower`.
    pub fn or(self, lower: ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            source_dir: self.source_dir.or(lower.source_dir),
            backup_dir: self.backup_dir.or(lower.backup_dir),
            level: self.level.or(lower.level),
            progress: self.progress.or(lower.progress),
            color: self.color.or(lower.color),
        }
    }

    pub fn into_config(self) -> Result<BackupConfig> {
        let config = BackupConfig::builder()
            .source_dir(self.source_dir.unwrap_or_else(|| DEFAULT_SOURCE_DIR.into()))
            .backup_dir(self.backup_dir.unwrap_or_else(|| DEFAULT_BACKUP_DIR.into()))
            .maybe_level(self.level)
            .maybe_progress(self.progress)
            .maybe_color(self.color)
            .build();
        config
            .validate()
            .map_err(Error::from)
            .map(|_| config)
            .with_msg("Config validation failed")
    }
}
