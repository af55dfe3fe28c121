//! File-facing side of the pictograph engine: datasets on disk, `pg.toml`
//! configuration and legacy-format sequence files.

pub mod config;
pub mod dataset;
pub mod error;
pub mod sequence_file;

pub use config::GeneratorConfig;
pub use dataset::{load_dataset, load_dataset_or_reference, reference_dataset};
pub use error::{Result, StoreError};
pub use sequence_file::{read_sequence, write_sequence};
