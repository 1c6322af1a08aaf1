use crate::backup::pipeline::Stage;
use crate::backup::result_error::WithMsg;
use crate::backup::toolbox::Capability;
use itertools::Itertools;
use std::fmt::Debug;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),
    #[error(transparent)]
    ValidationError(#[from] validator::ValidationError),
    #[error(transparent)]
    ValidationErrors(#[from] validator::ValidationErrors),
    #[error(transparent)]
    SerdeYml(#[from] serde_yml::Error),
    #[error(transparent)]
    ProgressTemplate(#[from] indicatif::style::TemplateError),
    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),
    #[error("Missing required tools: {}", .0.iter().join(", "))]
    MissingTools(Vec<Capability>),
    #[error("{} stage failed:\n{}", stage, indent::indent_all_with("  ", error.to_string()))]
    Stage { stage: Stage, error: Box<Error> },
    #[error("{0} stage panicked")]
    StagePanicked(Stage),
    #[error("Backup interrupted")]
    Interrupted,
    #[error("{}:\n{}", msg, indent::indent_all_with("  ", error.to_string()))]
    WithMsg { msg: String, error: Box<Error> },
    #[error("{}", itertools::join(.0, "\n"))]
    LotsOfError(Vec<Error>),
}

impl<S: Into<String>> WithMsg<S> for Error {
    fn with_msg(self, msg: S) -> Self {
        Self::WithMsg {
            msg: msg.into(),
            error: Box::new(self),
        }
    }
}

impl Error {
    pub fn into_iter(self) -> Box<dyn Iterator<Item = Error>> {
        match self {
            Error::LotsOfError(v) => Box::new(v.into_iter().flat_map(|e| e.into_iter())),
            e => Box::new(std::iter::once(e)),
        }
    }

    pub fn stage(stage: Stage, error: Error) -> Error {
        Error::Stage {
            stage,
            error: Box::new(error),
        }
    }

    /// Whether the failure was caused by an interrupt, possibly wrapped by a stage.
    pub fn is_interrupted(&self) -> bool {
        match self {
            Error::Interrupted => true,
            Error::Stage { error, .. } | Error::WithMsg { error, .. } => error.is_interrupted(),
            Error::LotsOfError(v) => v.iter().any(Error::is_interrupted),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = Error::from(io_error);

        match error {
            Error::Io(_) => (),
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_error_with_msg() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = Error::from(io_error).with_msg("Custom message");

        match error {
            Error::WithMsg { msg, .. } => assert_eq!(msg, "Custom message"),
            _ => panic!("Expected WithMsg error"),
        }
    }

    #[test]
    fn test_into_iter_flattens_nested_lots_of_error() {
        let error = Error::LotsOfError(vec![
            Error::Interrupted,
            Error::LotsOfError(vec![
                Error::Io(std::io::Error::other("error1")),
                Error::Io(std::io::Error::other("error2")),
            ]),
        ]);
        assert_eq!(error.into_iter().count(), 3);
    }

    #[test]
    fn test_stage_error_display() {
        let error = Error::stage(Stage::Archive, std::io::Error::other("disk gone").into());
        let error_str = error.to_string();

        assert!(error_str.starts_with("archive stage failed:"));
        assert!(error_str.contains("  disk gone"));
    }

    #[test]
    fn test_missing_tools_display() {
        let error = Error::MissingTools(vec![Capability::Archiver, Capability::Compressor]);
        assert_eq!(
            error.to_string(),
            "Missing required tools: tar archiver, gzip compressor"
        );
    }

    #[test]
    fn test_is_interrupted_through_wrappers() {
        let error = Error::LotsOfError(vec![
            Error::stage(Stage::Archive, std::io::Error::other("pipe").into()),
            Error::stage(Stage::Meter, Error::Interrupted),
        ]);
        assert!(error.is_interrupted());
        assert!(!Error::Io(std::io::Error::other("x")).is_interrupted());
    }
}
