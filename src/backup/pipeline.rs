//! Archive -> meter -> compress, each stage on its own thread.
//!
//! Stages are joined by bounded [`pipe`](crate::backup::pipe)s, so a slow
//! consumer stalls its producer. Every stage reports its own outcome and the
//! run fails if any of them failed: an archiver that dies half way must not
//! be hidden behind a compressor that happily finished a truncated stream.

use crate::backup::pipe::{pipe, PipeReader, PipeWriter};
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::{convert_error_vec, Result};
use crate::backup::toolbox::Tools;
use derive_more::Display;
use std::fs::File;
use std::io::{BufWriter, IntoInnerError, Write};
use std::path::Path;
use std::thread::{self, ScopedJoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::Dispatch;

/// Chunks in flight between two stages.
static PIPE_DEPTH: usize = 16;
static CHUNK_SIZE: usize = 64 * 1024;

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum Stage {
    #[display("archive")]
    Archive,
    #[display("progress")]
    Meter,
    #[display("compress")]
    Compress,
}

pub struct Pipeline {
    tools: Tools,
    cancel: CancellationToken,
}

impl Pipeline {
    pub fn new(tools: Tools, cancel: CancellationToken) -> Self {
        Self { tools, cancel }
    }

    /// Streams `src_dir` into `dst` and returns the number of archive bytes metered.
    ///
    /// `total` is the expected uncompressed size, used for progress only.
    /// Fails with every stage error combined if one or more stages failed.
    pub fn run(&self, src_dir: &Path, total: u64, dst: File) -> Result<u64> {
        let (archive_tx, archive_rx) = pipe(PIPE_DEPTH);
        let (metered_tx, metered_rx) = pipe(PIPE_DEPTH);
        let dispatch = tracing::dispatcher::get_default(Dispatch::clone);
        let dispatch = &dispatch;

        let (archived, metered, compressed) = thread::scope(|s| {
            let archive = s.spawn(move || {
                tracing::dispatcher::with_default(dispatch, || self.archive(src_dir, archive_tx))
            });
            let meter = s.spawn(move || {
                tracing::dispatcher::with_default(dispatch, || {
                    self.meter(total, archive_rx, metered_tx)
                })
            });
            let compress = s.spawn(move || {
                tracing::dispatcher::with_default(dispatch, || self.compress(metered_rx, dst))
            });
            (
                join(Stage::Archive, archive),
                join(Stage::Meter, meter),
                join(Stage::Compress, compress),
            )
        });

        let bytes = metered.as_ref().ok().copied().unwrap_or_default();
        convert_error_vec(
            [archived.err(), metered.err(), compressed.err()]
                .into_iter()
                .flatten()
                .collect(),
        )?;
        Ok(bytes)
    }

    fn archive(&self, src_dir: &Path, tx: PipeWriter) -> Result<()> {
        let mut out = BufWriter::with_capacity(CHUNK_SIZE, tx);
        self.tools.archiver.archive(src_dir, &mut out)?;
        out.flush()?;
        Ok(())
    }

    fn meter(&self, total: u64, mut rx: PipeReader, tx: PipeWriter) -> Result<u64> {
        let mut out = BufWriter::with_capacity(CHUNK_SIZE, tx);
        let n = self.tools.meter.meter(total, &mut rx, &mut out, &self.cancel)?;
        out.flush()?;
        Ok(n)
    }

    fn compress(&self, mut rx: PipeReader, dst: File) -> Result<()> {
        let mut out = BufWriter::with_capacity(CHUNK_SIZE, dst);
        self.tools.compressor.compress(&mut rx, &mut out)?;
        out.into_inner()
            .map_err(IntoInnerError::into_error)?
            .sync_all()?;
        Ok(())
    }
}

fn join<T>(stage: Stage, handle: ScopedJoinHandle<'_, Result<T>>) -> Result<T> {
    match handle.join() {
        Ok(res) => res.map_err(|e| Error::stage(stage, e)),
        Err(_) => Err(Error::StagePanicked(stage)),
    }
}
