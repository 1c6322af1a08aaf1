pub mod gzip;

use crate::backup::result_error::result::Result;
use std::io::{Read, Write};

pub use self::gzip::GzipCompressor;

/// Compresses a byte stream until its input reaches EOF.
pub trait Compressor: Send + Sync {
    fn compress(&self, input: &mut dyn Read, out: &mut dyn Write) -> Result<()>;
}
