//! Registry of the stage implementations a backup run depends on.
//!
//! The binary registers the built-in tar, progress and gzip stages. Callers
//! embedding the library may swap any of them out or leave one unset; a run
//! refuses to start until every capability is present.

use crate::backup::archive::{Archiver, TarArchiver};
use crate::backup::backup_config::BackupConfig;
use crate::backup::compress::{Compressor, GzipCompressor};
use crate::backup::meter::{IndicatifMeter, ProgressMeter};
use derive_more::Display;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum Capability {
    #[display("tar archiver")]
    Archiver,
    #[display("progress meter")]
    ProgressMeter,
    #[display("gzip compressor")]
    Compressor,
}

#[derive(Clone, Default)]
pub struct Toolbox {
    archiver: Option<Arc<dyn Archiver>>,
    meter: Option<Arc<dyn ProgressMeter>>,
    compressor: Option<Arc<dyn Compressor>>,
}

/// A toolbox that passed the dependency check.
#[derive(Clone)]
pub struct Tools {
    pub archiver: Arc<dyn Archiver>,
    pub meter: Arc<dyn ProgressMeter>,
    pub compressor: Arc<dyn Compressor>,
}

impl Toolbox {
    pub fn builtin(config: &BackupConfig) -> Self {
        Self::default()
            .with_archiver(TarArchiver)
            .with_meter(IndicatifMeter::new(config.progress()))
            .with_compressor(GzipCompressor::new(config.level()))
    }

    pub fn with_archiver<A: Archiver + 'static>(mut self, archiver: A) -> Self {
        self.archiver = Some(Arc::new(archiver));
        self
    }

    pub fn with_meter<M: ProgressMeter + 'static>(mut self, meter: M) -> Self {
        self.meter = Some(Arc::new(meter));
        self
    }

    pub fn with_compressor<C: Compressor + 'static>(mut self, compressor: C) -> Self {
        self.compressor = Some(Arc::new(compressor));
        self
    }

    /// Every missing capability, in pipeline order.
    pub fn missing(&self) -> Vec<Capability> {
        let mut missing = Vec::new();
        if self.archiver.is_none() {
            missing.push(Capability::Archiver);
        }
        if self.meter.is_none() {
            missing.push(Capability::ProgressMeter);
        }
        if self.compressor.is_none() {
            missing.push(Capability::Compressor);
        }
        missing
    }

    pub fn require(&self) -> Result<Tools, Vec<Capability>> {
        match (&self.archiver, &self.meter, &self.compressor) {
            (Some(archiver), Some(meter), Some(compressor)) => Ok(Tools {
                archiver: archiver.clone(),
                meter: meter.clone(),
                compressor: compressor.clone(),
            }),
            _ => Err(self.missing()),
        }
    }
}
