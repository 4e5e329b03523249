#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Reading, segmenting and writing image files.
pub mod batch;

/// Pipeline parameters and the named presets.
pub mod config;

/// Error types for the segmentation pipeline.
pub mod error;

/// Hooks invoked after every pipeline stage.
pub mod observer;

/// The horizon segmentor.
pub mod segmentor;

/// The stages of the pipeline.
pub mod stage;

pub use crate::batch::{process_file, run_batch, run_batch_with, FileOutcome};
pub use crate::config::{DilationSource, OutputNaming, SegmentorConfig, Variant};
pub use crate::error::SegmentError;
pub use crate::observer::{LogObserver, NoopObserver, StageObserver};
pub use crate::segmentor::{segment, Segmentor};
pub use crate::stage::Stage;
