//! Playing games and training the policy
mod episode;
pub mod hooks;
mod returns;
mod rollout;
mod train;

pub use episode::{play_episode, play_episode_observed, Trajectory, TrajectoryStep};
pub use hooks::TrainHook;
pub use returns::{discounted_returns, normalize_returns, normalized_returns, NORMALIZATION_EPSILON};
pub use rollout::{play_games, Batch, RolloutConfig};
pub use train::{IterationReport, Iterations, StopSignal, TrainError, Trainer, TrainerConfig};
