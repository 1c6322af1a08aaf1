use crate::backup::compress::Compressor;
use crate::backup::result_error::result::Result;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{Read, Write};
use validator::Validate;

/// Gzip compressor
///
/// Level 0 stores the stream uncompressed inside a gzip envelope, 9 trades CPU time
/// for the smallest output. The pipeline default is 6, same as `gzip(1)`.
#[derive(Clone, Debug, Validate)]
pub struct GzipCompressor {
    #[validate(range(min = 0, max = 9))]
    level: u32,
}

impl GzipCompressor {
    pub fn new(level: u32) -> Self {
        Self { level }
    }
}

impl Compressor for GzipCompressor {
    fn compress(&self, input: &mut dyn Read, out: &mut dyn Write) -> Result<()> {
        self.validate()?;
        tracing::debug!("Creating gzip compressor with level={}", self.level);

        let mut encoder = GzEncoder::new(out, Compression::new(self.level));
        std::io::copy(input, &mut encoder)?;
        encoder.finish()?.flush()?;
        Ok(())
    }
}
