use crate::backup::meter::{forward, ProgressMeter};
use crate::backup::result_error::result::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{Read, Write};
use tokio_util::sync::CancellationToken;

static TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";

/// Progress bar on stderr, hidden when stderr is not a terminal or when `visible` is off.
#[derive(Clone, Debug)]
pub struct IndicatifMeter {
    visible: bool,
}

impl IndicatifMeter {
    pub fn new(visible: bool) -> Self {
        Self { visible }
    }

    fn progress_bar(&self, total: u64) -> Result<ProgressBar> {
        if !self.visible {
            return Ok(ProgressBar::hidden());
        }
        let style = ProgressStyle::with_template(TEMPLATE)?.progress_chars("#>-");
        Ok(ProgressBar::new(total).with_style(style))
    }
}

impl ProgressMeter for IndicatifMeter {
    fn meter(
        &self,
        total: u64,
        input: &mut dyn Read,
        out: &mut dyn Write,
        cancel: &CancellationToken,
    ) -> Result<u64> {
        let bar = self.progress_bar(total)?;
        let res = forward(input, out, cancel, |n| bar.inc(n));
        match &res {
            Ok(_) => bar.finish(),
            Err(_) => bar.abandon(),
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::result_error::error::Error;
    use std::io::Cursor;

    #[test]
    fn test_hidden_meter_forwards_bytes() {
        let data = vec![9u8; 300_000];
        let mut out = Vec::new();
        let n = IndicatifMeter::new(false)
            .meter(
                data.len() as u64,
                &mut Cursor::new(&data),
                &mut out,
                &CancellationToken::default(),
            )
            .unwrap();

        assert_eq!(n, 300_000);
        assert_eq!(out, data);
    }

    #[test]
    fn test_visible_meter_accepts_wrong_total() {
        // archive headers make the stream larger than the tree size
        let mut out = Vec::new();
        let n = IndicatifMeter::new(true)
            .meter(10, &mut Cursor::new(vec![1u8; 100]), &mut out, &CancellationToken::default())
            .unwrap();
        assert_eq!(n, 100);
    }

    #[test]
    fn test_meter_cancelled() {
        let cancel = CancellationToken::default();
        cancel.cancel();
        let mut out = Vec::new();
        let res = IndicatifMeter::new(false).meter(1, &mut Cursor::new(vec![1u8]), &mut out, &cancel);
        assert!(matches!(res, Err(Error::Interrupted)));
    }
}
