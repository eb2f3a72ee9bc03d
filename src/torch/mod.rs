//! Torch-backed policy estimator and optimizers
mod mlp;
pub mod optimizers;
mod policy;

pub use mlp::{parse_hidden_sizes, Mlp, MlpConfig};
pub use optimizers::{AdamConfig, BuildOptimizer, Optimizer, OptimizerStepError};
pub use policy::{ParameterError, PolicyNetwork, PolicyParameters};
