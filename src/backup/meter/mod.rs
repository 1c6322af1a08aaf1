pub mod progress_bar;

use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use std::io::{ErrorKind, Read, Write};
use tokio_util::sync::CancellationToken;

pub use self::progress_bar::IndicatifMeter;

static CHUNK_SIZE: usize = 64 * 1024;

/// Passthrough stage: forwards bytes unchanged while reporting progress.
pub trait ProgressMeter: Send + Sync {
    /// Copies `input` to `out` until EOF and returns the number of bytes forwarded.
    ///
    /// `total` is the expected size, used only for display. Must fail with
    /// [`Error::Interrupted`] once `cancel` is set.
    fn meter(
        &self,
        total: u64,
        input: &mut dyn Read,
        out: &mut dyn Write,
        cancel: &CancellationToken,
    ) -> Result<u64>;
}

/// Copy loop shared by meters; `on_chunk` is called with each forwarded chunk size.
pub fn forward<F: FnMut(u64)>(
    input: &mut dyn Read,
    out: &mut dyn Write,
    cancel: &CancellationToken,
    mut on_chunk: F,
) -> Result<u64> {
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut forwarded = 0u64;
    loop {
        if cancel.is_cancelled() {
            return Err(Error::Interrupted);
        }
        let n = match input.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        out.write_all(&buf[..n])?;
        forwarded += n as u64;
        on_chunk(n as u64);
    }
    out.flush()?;
    Ok(forwarded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_forward_copies_unchanged() {
        let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        let mut out = Vec::new();
        let mut seen = 0u64;

        let n = forward(
            &mut Cursor::new(&data),
            &mut out,
            &CancellationToken::default(),
            |c| seen += c,
        )
        .unwrap();

        assert_eq!(n, data.len() as u64);
        assert_eq!(seen, n);
        assert_eq!(out, data);
    }

    #[test]
    fn test_forward_stops_when_cancelled() {
        let cancel = CancellationToken::default();
        cancel.cancel();
        let mut out = Vec::new();

        let err = forward(&mut Cursor::new(vec![1u8; 10]), &mut out, &cancel, |_| {}).unwrap_err();
        assert!(matches!(err, Error::Interrupted));
        assert!(out.is_empty());
    }

    #[test]
    fn test_forward_propagates_write_error() {
        struct Closed;
        impl Write for Closed {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(ErrorKind::BrokenPipe, "closed"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let res = forward(
            &mut Cursor::new(vec![1u8; 10]),
            &mut Closed,
            &CancellationToken::default(),
            |_| {},
        );
        assert!(matches!(res, Err(Error::Io(e)) if e.kind() == ErrorKind::BrokenPipe));
    }
}
