//! Cart-pole balancing with the REINFORCE policy gradient.
#![warn(clippy::cast_lossless)]
#![warn(clippy::cast_possible_truncation)]
#![warn(clippy::doc_markdown)]
#![warn(clippy::explicit_iter_loop)]
#![warn(clippy::missing_const_for_fn)] // has some false positives
#![warn(clippy::needless_borrow)]
#![warn(clippy::needless_pass_by_value)]
#![warn(clippy::redundant_closure_for_method_calls)]
#![warn(clippy::use_self)] // also triggered by macro expansions
pub mod envs;
mod error;
pub mod logging;
pub mod policy;
pub mod simulation;
pub mod torch;
pub mod utils;

pub use envs::{CartPole, CartPoleState, Environment, Push};
pub use error::{ConfigError, Error};
pub use policy::{NumericError, Policy};
pub use simulation::{IterationReport, StopSignal, TrainError, TrainHook, Trainer, TrainerConfig};
pub use torch::PolicyNetwork;

/// Pseudo-random number generator used throughout the crate.
pub type Prng = rand_chacha::ChaCha8Rng;
