//! # Optimizer Module
//!
//! Separa le responsabilità della pipeline in sottomoduli:
//! - `media_optimizer`: Orchestratore principale
//! - `task_optimizer`: Worker per singoli file
//! - `regression_guard`: Fallback a copia verbatim se l'output cresce
//! - `path_resolver`: Logica di calcolo path centralizzata

pub mod media_optimizer;
pub mod path_resolver;
pub mod regression_guard;
pub mod task_optimizer;

pub use media_optimizer::PhotoCompressor;
pub use path_resolver::PathResolver;
pub use regression_guard::{GuardReport, RegressionGuard};
pub use task_optimizer::{FileOutcome, TaskOptimizer};
