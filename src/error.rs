//! Error types
use crate::policy::NumericError;
use crate::simulation::TrainError;
use crate::torch::ParameterError;
use thiserror::Error;

/// Invalid training or network configuration.
///
/// Detected before any network is built or any game is played.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid hidden layer sizes {0:?}: expected a non-empty list of positive integers")]
    InvalidHiddenLayerSizes(String),
    #[error("invalid number of iterations: {0}")]
    InvalidIterations(usize),
    #[error("invalid number of games per iteration: {0}")]
    InvalidGamesPerIteration(usize),
    #[error("invalid max. steps per game: {0} (must be greater than 1)")]
    InvalidMaxSteps(usize),
    #[error("invalid discount rate: {0} (must be strictly between 0 and 1)")]
    InvalidDiscountFactor(f64),
    #[error("invalid learning rate: {0}")]
    InvalidLearningRate(f64),
    #[error("invalid Adam coefficient {name} = {value} (must be in [0, 1))")]
    InvalidAdamBeta { name: &'static str, value: f64 },
    #[error("invalid number of threads: {0}")]
    InvalidNumThreads(usize),
}

/// Error from the cart-pole policy gradient crate.
#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error")]
    Config(#[from] ConfigError),
    #[error("numeric error")]
    Numeric(#[from] NumericError),
    #[error("training error")]
    Train(#[from] TrainError),
    #[error("parameter error")]
    Parameters(#[from] ParameterError),
    #[error("torch error")]
    Torch(#[from] tch::TchError),
    #[error("I/O error")]
    Io(#[from] std::io::Error),
}
