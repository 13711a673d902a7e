//! # Batch Module
//!
//! Conversione di intere directory, separata in sottomoduli:
//! - `batch_converter`: Orchestratore del batch e accumulo statistiche
//! - `path_resolver`: Calcolo dei path di output e regola di skip

pub mod batch_converter;
pub mod path_resolver;

pub use batch_converter::BatchConverter;
pub use path_resolver::PathResolver;
