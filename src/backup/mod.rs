pub mod archive;
pub mod backup_config;
pub mod cleanup;
pub mod compress;
pub mod logging;
pub mod meter;
pub mod orchestrator;
pub mod pipe;
pub mod pipeline;
pub mod result_error;
pub mod toolbox;
pub mod validate;
