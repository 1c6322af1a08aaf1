pub mod size;
pub mod tar_stream;

use crate::backup::result_error::result::Result;
use std::io::Write;
use std::path::Path;

pub use self::size::tree_size;
pub use self::tar_stream::TarArchiver;

/// Serializes a directory tree into an uncompressed archive byte stream.
///
/// Implementations write everything to `out` and return only once the
/// stream is complete; an error at any point fails the archive stage.
pub trait Archiver: Send + Sync {
    fn archive(&self, src_dir: &Path, out: &mut dyn Write) -> Result<()>;
}
