use crate::backup::result_error::error::Error;
use crate::backup::result_error::WithMsg;
use itertools::Itertools;

pub type Result<T> = std::result::Result<T, Error>;

impl<R, S: Into<String>> WithMsg<S> for Result<R> {
    fn with_msg(self, msg: S) -> Self {
        self.map_err(|e| e.with_msg(msg))
    }
}

/// Collapses the failures of several stages into one combined status.
///
/// Nested `LotsOfError`s are flattened; a single failure is returned as is.
pub fn convert_error_vec(errors: Vec<Error>) -> Result<()> {
    let mut errors = errors.into_iter().flat_map(Error::into_iter).collect_vec();
    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(Error::LotsOfError(errors)),
    }
}
