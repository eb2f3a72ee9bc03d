//! REINFORCE training loop
use super::episode::{play_episode, Trajectory};
use super::hooks::TrainHook;
use super::returns::normalized_returns;
use super::rollout::{play_games, RolloutConfig};
use crate::envs::{CartPole, EnvironmentParams, PhysicalConstants};
use crate::error::ConfigError;
use crate::logging::{StatsLogger, WithScope};
use crate::policy::NumericError;
use crate::torch::{
    AdamConfig, BuildOptimizer, MlpConfig, Optimizer, OptimizerStepError, ParameterError,
    PolicyNetwork, PolicyParameters,
};
use crate::Prng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tch::{COptimizer, Kind, TchError, Tensor};
use thiserror::Error;

/// Configuration of a [`Trainer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Policy network architecture.
    pub policy: MlpConfig,
    /// Policy optimizer.
    pub optimizer: AdamConfig,
    /// Physical constants of the simulated cart-pole.
    pub physics: PhysicalConstants,
    /// Cart-pole force, termination thresholds and reset jitter.
    pub env: EnvironmentParams,
    /// Number of training iterations. Each iteration performs one policy update.
    pub num_iterations: usize,
    /// Number of games played with the current policy per iteration.
    pub games_per_iteration: usize,
    /// Cap on the length of each game.
    pub max_steps_per_game: usize,
    /// Discount factor for the return. Strictly between 0 and 1.
    pub discount_factor: f64,
    /// Number of threads used to play the games of an iteration.
    pub num_threads: usize,
    /// Report the states of the first game of each iteration to [`TrainHook::on_observe`].
    pub observe: bool,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            policy: MlpConfig::default(),
            optimizer: AdamConfig::default(),
            physics: PhysicalConstants::default(),
            env: EnvironmentParams::default(),
            num_iterations: 20,
            games_per_iteration: 20,
            max_steps_per_game: 500,
            discount_factor: 0.95,
            num_threads: 1,
            observe: false,
        }
    }
}

impl TrainerConfig {
    /// Check the configuration, reporting the first invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.policy.validate()?;
        if self.num_iterations == 0 {
            return Err(ConfigError::InvalidIterations(self.num_iterations));
        }
        if self.games_per_iteration == 0 {
            return Err(ConfigError::InvalidGamesPerIteration(
                self.games_per_iteration,
            ));
        }
        if self.max_steps_per_game <= 1 {
            return Err(ConfigError::InvalidMaxSteps(self.max_steps_per_game));
        }
        if !(self.discount_factor > 0.0 && self.discount_factor < 1.0) {
            return Err(ConfigError::InvalidDiscountFactor(self.discount_factor));
        }
        self.optimizer.validate()?;
        if self.num_threads == 0 {
            return Err(ConfigError::InvalidNumThreads(self.num_threads));
        }
        Ok(())
    }

    fn rollout_config(&self) -> RolloutConfig {
        RolloutConfig {
            num_games: self.games_per_iteration,
            max_steps: self.max_steps_per_game,
            num_threads: self.num_threads,
            observe: self.observe,
        }
    }

    fn new_env(&self) -> CartPole {
        CartPole::new(self.physics, self.env)
    }
}

/// Error during training.
#[derive(Debug, Error)]
pub enum TrainError {
    #[error("configuration error")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Numeric(#[from] NumericError),
    #[error("parameter error")]
    Parameters(#[from] ParameterError),
    #[error("torch error")]
    Torch(#[from] TchError),
}

impl From<OptimizerStepError> for TrainError {
    fn from(error: OptimizerStepError) -> Self {
        match error {
            OptimizerStepError::NonFiniteLoss(loss) => NumericError::NonFiniteLoss(loss).into(),
            OptimizerStepError::Torch(error) => error.into(),
        }
    }
}

/// Requests that training stop at the next iteration boundary.
///
/// Clones share the same flag.
#[derive(Debug, Default, Clone)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop. An iteration in progress still runs to completion.
    pub fn request(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

/// Summary of one completed training iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationReport {
    /// Zero-based iteration index.
    pub iteration: usize,
    /// Number of steps of each game in game index order.
    pub episode_lengths: Vec<usize>,
    /// Value of the surrogate loss before the update.
    pub loss: f64,
    /// Wall-clock time of the iteration.
    pub elapsed: Duration,
}

impl IterationReport {
    /// Mean number of steps per game.
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_length(&self) -> f64 {
        if self.episode_lengths.is_empty() {
            return 0.0;
        }
        self.total_steps() as f64 / self.episode_lengths.len() as f64
    }

    pub fn total_steps(&self) -> usize {
        self.episode_lengths.iter().sum()
    }

    /// Simulation throughput of the whole iteration.
    #[allow(clippy::cast_precision_loss)]
    pub fn steps_per_second(&self) -> f64 {
        let seconds = self.elapsed.as_secs_f64();
        if seconds <= 0.0 {
            return 0.0;
        }
        self.total_steps() as f64 / seconds
    }
}

/// Trains a [`PolicyNetwork`] on cart-pole with the REINFORCE policy gradient.
///
/// Every iteration plays a batch of games with the current policy, weights the
/// log-probability of each chosen action by its normalized discounted return, and takes
/// exactly one optimizer step on the mean weighted negative log-probability.
pub struct Trainer {
    config: TrainerConfig,
    policy: PolicyNetwork,
    optimizer: COptimizer,
    rng: Prng,
    stop: StopSignal,
    num_updates: u64,
}

impl Trainer {
    /// Create a trainer with a newly initialized policy.
    ///
    /// All randomness (network initialization, environment resets and action sampling)
    /// derives from `seed`.
    pub fn new(config: TrainerConfig, seed: u64) -> Result<Self, TrainError> {
        config.validate()?;
        let mut rng = Prng::seed_from_u64(seed);
        let policy = PolicyNetwork::new(&config.policy, &mut rng)?;
        Self::from_policy(config, policy, rng)
    }

    /// Create a trainer for an existing policy.
    ///
    /// The policy architecture in `config` is replaced by that of `policy`.
    pub fn from_policy(
        mut config: TrainerConfig,
        policy: PolicyNetwork,
        rng: Prng,
    ) -> Result<Self, TrainError> {
        config.policy = policy.config().clone();
        config.validate()?;
        let optimizer = config.optimizer.build_optimizer(policy.var_store())?;
        Ok(Self {
            config,
            policy,
            optimizer,
            rng,
            stop: StopSignal::new(),
            num_updates: 0,
        })
    }

    pub const fn config(&self) -> &TrainerConfig {
        &self.config
    }

    pub const fn policy(&self) -> &PolicyNetwork {
        &self.policy
    }

    pub fn into_policy(self) -> PolicyNetwork {
        self.policy
    }

    /// Replace the policy parameters. The optimizer state is kept.
    pub fn load_parameters(&mut self, params: &PolicyParameters) -> Result<(), ParameterError> {
        self.policy.load_parameters(params)
    }

    /// Handle for stopping training from another thread or from a hook.
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Total number of parameter updates applied.
    pub const fn num_updates(&self) -> u64 {
        self.num_updates
    }

    /// Lazily run the configured number of training iterations.
    ///
    /// Clears any pending stop request first. Iteration stops early when a stop is requested
    /// or after the first error. Calling this again continues training the same policy.
    pub fn iterations<'a>(
        &'a mut self,
        hook: &'a mut dyn TrainHook,
        logger: &'a mut dyn StatsLogger,
    ) -> Iterations<'a> {
        self.stop.reset();
        Iterations {
            trainer: self,
            hook,
            logger,
            next_iteration: 0,
            failed: false,
        }
    }

    /// Run all training iterations, stopping at the first error.
    pub fn train(
        &mut self,
        hook: &mut dyn TrainHook,
        logger: &mut dyn StatsLogger,
    ) -> Result<Vec<IterationReport>, TrainError> {
        self.iterations(hook, logger).collect()
    }

    /// Play and update for one iteration.
    pub fn train_iteration(
        &mut self,
        iteration: usize,
        hook: &mut dyn TrainHook,
        logger: &mut dyn StatsLogger,
    ) -> Result<IterationReport, TrainError> {
        let start = Instant::now();
        hook.on_iteration_start(iteration, self.config.num_iterations);

        let env_config = &self.config;
        let batch = play_games(
            &|| env_config.new_env(),
            &self.policy,
            &self.config.rollout_config(),
            &mut self.rng,
            hook,
        )?;
        let update_start = Instant::now();
        let episode_lengths = batch.lengths();

        let mut episode_logger = logger.with_scope("episode");
        for &length in &episode_lengths {
            #[allow(clippy::cast_precision_loss)]
            episode_logger.log_scalar("length", length as f64);
        }
        episode_logger.log_counter_increment("count", episode_lengths.len() as u64);
        logger
            .with_scope("step")
            .log_counter_increment("count", batch.total_steps() as u64);
        logger
            .with_scope("rollout")
            .log_duration("time", update_start - start);

        #[allow(clippy::cast_possible_truncation)]
        let weights: Vec<f32> = normalized_returns(batch.trajectories(), self.config.discount_factor)
            .into_iter()
            .flatten()
            .map(|w| w as f32)
            .collect();
        let weights = Tensor::of_slice(&weights);
        let states = PolicyNetwork::states_tensor(batch.steps().map(|step| &step.state));
        let actions = PolicyNetwork::actions_tensor(batch.steps().map(|step| step.action));

        let snapshot = self.policy.parameters();
        let policy = &self.policy;
        let loss_fn = || -(policy.log_probs(&states, &actions) * &weights).mean(Kind::Float);
        let mut update_logger = logger.with_scope("update");
        let loss = self.optimizer.backward_step(&loss_fn, &mut update_logger)?;
        if !self.policy.parameters_are_finite() {
            self.policy.load_parameters(&snapshot)?;
            return Err(NumericError::NonFiniteParameters.into());
        }
        self.num_updates += 1;
        update_logger.log_duration("time", update_start.elapsed());
        update_logger.log_counter_increment("count", 1);

        Ok(IterationReport {
            iteration,
            episode_lengths,
            loss,
            elapsed: start.elapsed(),
        })
    }

    /// Play one game with the current policy without training.
    pub fn evaluate(&mut self, max_steps: usize) -> Result<Trajectory, NumericError> {
        let mut env = self.config.new_env();
        play_episode(&mut env, &self.policy, max_steps, &mut self.rng)
    }
}

/// Iterator over training iterations. Created by [`Trainer::iterations`].
pub struct Iterations<'a> {
    trainer: &'a mut Trainer,
    hook: &'a mut dyn TrainHook,
    logger: &'a mut dyn StatsLogger,
    next_iteration: usize,
    failed: bool,
}

impl Iterator for Iterations<'_> {
    type Item = Result<IterationReport, TrainError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed
            || self.next_iteration >= self.trainer.config.num_iterations
            || self.trainer.stop.is_requested()
        {
            return None;
        }
        let result =
            self.trainer
                .train_iteration(self.next_iteration, &mut *self.hook, &mut *self.logger);
        self.next_iteration += 1;
        self.failed = result.is_err();
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .trainer
            .config
            .num_iterations
            .saturating_sub(self.next_iteration);
        (0, Some(remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::super::hooks::testing::RecordingHook;
    use super::*;
    use crate::envs::CartPoleState;
    use crate::logging::{testing::RecordingLogger, LogValue};
    use rstest::{fixture, rstest};

    #[fixture]
    fn config() -> TrainerConfig {
        TrainerConfig {
            policy: MlpConfig {
                hidden_sizes: vec![8],
            },
            optimizer: AdamConfig {
                learning_rate: 0.01,
                ..AdamConfig::default()
            },
            num_iterations: 3,
            games_per_iteration: 4,
            max_steps_per_game: 50,
            num_threads: 2,
            ..TrainerConfig::default()
        }
    }

    #[test]
    fn default_config_valid() {
        assert_eq!(TrainerConfig::default().validate(), Ok(()));
    }

    #[rstest]
    #[case::no_iterations(
        TrainerConfig { num_iterations: 0, ..TrainerConfig::default() },
        ConfigError::InvalidIterations(0)
    )]
    #[case::no_games(
        TrainerConfig { games_per_iteration: 0, ..TrainerConfig::default() },
        ConfigError::InvalidGamesPerIteration(0)
    )]
    #[case::one_step(
        TrainerConfig { max_steps_per_game: 1, ..TrainerConfig::default() },
        ConfigError::InvalidMaxSteps(1)
    )]
    #[case::zero_discount(
        TrainerConfig { discount_factor: 0.0, ..TrainerConfig::default() },
        ConfigError::InvalidDiscountFactor(0.0)
    )]
    #[case::unit_discount(
        TrainerConfig { discount_factor: 1.0, ..TrainerConfig::default() },
        ConfigError::InvalidDiscountFactor(1.0)
    )]
    #[case::large_discount(
        TrainerConfig { discount_factor: 1.5, ..TrainerConfig::default() },
        ConfigError::InvalidDiscountFactor(1.5)
    )]
    #[case::no_threads(
        TrainerConfig { num_threads: 0, ..TrainerConfig::default() },
        ConfigError::InvalidNumThreads(0)
    )]
    #[case::zero_learning_rate(
        TrainerConfig {
            optimizer: AdamConfig { learning_rate: 0.0, ..AdamConfig::default() },
            ..TrainerConfig::default()
        },
        ConfigError::InvalidLearningRate(0.0)
    )]
    #[case::no_hidden_layers(
        TrainerConfig { policy: MlpConfig { hidden_sizes: vec![] }, ..TrainerConfig::default() },
        ConfigError::InvalidHiddenLayerSizes("[]".into())
    )]
    fn invalid_config(#[case] config: TrainerConfig, #[case] expected: ConfigError) {
        assert_eq!(config.validate(), Err(expected));
        assert!(matches!(
            Trainer::new(config, 0),
            Err(TrainError::Config(_))
        ));
    }

    #[test]
    fn nan_discount_invalid() {
        let config = TrainerConfig {
            discount_factor: f64::NAN,
            ..TrainerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDiscountFactor(_))
        ));
    }

    #[test]
    fn config_from_partial_json() {
        let config: TrainerConfig = serde_json::from_str(
            r#"{"policy": {"hidden_sizes": [32, 16]}, "num_iterations": 5, "observe": true}"#,
        )
        .unwrap();
        assert_eq!(config.policy.hidden_sizes, vec![32, 16]);
        assert_eq!(config.num_iterations, 5);
        assert!(config.observe);
        assert_eq!(config.games_per_iteration, 20);
        assert_eq!(config.discount_factor, 0.95);
        assert_eq!(config.optimizer, AdamConfig::default());
    }

    #[rstest]
    fn single_update_per_iteration(config: TrainerConfig) {
        let learning_rate = config.optimizer.learning_rate;
        let mut trainer = Trainer::new(config, 1).unwrap();
        let before = trainer.policy().parameters();
        let report = trainer.train_iteration(0, &mut (), &mut ()).unwrap();
        assert_eq!(trainer.num_updates(), 1);
        assert!(report.loss.is_finite());
        // The first Adam step moves each parameter by at most the learning rate
        let change = trainer.policy().parameters().max_abs_diff(&before);
        assert!(change <= learning_rate * 1.001, "change: {}", change);
        assert!(change >= learning_rate * 0.9, "change: {}", change);
    }

    #[rstest]
    fn report_matches_batch(config: TrainerConfig) {
        let max_steps = config.max_steps_per_game;
        let games = config.games_per_iteration;
        let mut trainer = Trainer::new(config, 2).unwrap();
        let report = trainer.train_iteration(0, &mut (), &mut ()).unwrap();
        assert_eq!(report.iteration, 0);
        assert_eq!(report.episode_lengths.len(), games);
        assert!(report
            .episode_lengths
            .iter()
            .all(|&len| len >= 1 && len <= max_steps));
        assert_eq!(report.total_steps(), report.episode_lengths.iter().sum::<usize>());
        assert!(report.mean_length() >= 1.0);
        assert!(report.steps_per_second() > 0.0);
    }

    #[rstest]
    fn iterations_run_configured_count(config: TrainerConfig) {
        let mut trainer = Trainer::new(config, 3).unwrap();
        let mut hook = RecordingHook::default();
        let reports = trainer.train(&mut hook, &mut ()).unwrap();
        assert_eq!(
            reports.iter().map(|r| r.iteration).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert_eq!(hook.iteration_starts, vec![(0, 3), (1, 3), (2, 3)]);
        assert_eq!(hook.game_ends.len(), 12);
        assert!(hook.observed.is_empty());
        assert_eq!(trainer.num_updates(), 3);
    }

    #[rstest]
    fn observe_first_game(config: TrainerConfig) {
        let config = TrainerConfig {
            num_iterations: 1,
            observe: true,
            ..config
        };
        let mut trainer = Trainer::new(config, 4).unwrap();
        let mut hook = RecordingHook::default();
        let reports = trainer.train(&mut hook, &mut ()).unwrap();
        assert_eq!(hook.observed.len(), reports[0].episode_lengths[0] + 1);
    }

    #[rstest]
    fn deterministic_across_thread_counts(config: TrainerConfig) {
        let run = |num_threads| {
            let config = TrainerConfig {
                num_threads,
                ..config.clone()
            };
            let mut trainer = Trainer::new(config, 5).unwrap();
            let lengths: Vec<_> = trainer
                .train(&mut (), &mut ())
                .unwrap()
                .into_iter()
                .map(|r| r.episode_lengths)
                .collect();
            (lengths, trainer.policy().parameters())
        };
        let (serial_lengths, serial_params) = run(1);
        let (parallel_lengths, parallel_params) = run(3);
        assert_eq!(serial_lengths, parallel_lengths);
        assert_eq!(serial_params.max_abs_diff(&parallel_params), 0.0);
    }

    /// Requests a stop when the given iteration starts.
    struct StopAt {
        signal: StopSignal,
        iteration: usize,
    }

    impl TrainHook for StopAt {
        fn on_iteration_start(&mut self, iteration: usize, _: usize) {
            if iteration == self.iteration {
                self.signal.request();
            }
        }
    }

    #[rstest]
    fn stop_takes_effect_between_iterations(config: TrainerConfig) {
        let config = TrainerConfig {
            num_iterations: 5,
            ..config
        };
        let mut trainer = Trainer::new(config, 6).unwrap();
        let mut hook = StopAt {
            signal: trainer.stop_signal(),
            iteration: 1,
        };
        let reports = trainer.train(&mut hook, &mut ()).unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(trainer.num_updates(), 2);
        assert!(trainer.stop_signal().is_requested());

        // Restarting clears the request and continues with the same policy
        let reports = trainer.train(&mut (), &mut ()).unwrap();
        assert_eq!(reports.len(), 5);
        assert_eq!(trainer.num_updates(), 7);
    }

    #[rstest]
    fn non_finite_policy_ends_iteration(config: TrainerConfig) {
        let mut trainer = Trainer::new(config, 7).unwrap();
        tch::no_grad(|| {
            for mut var in trainer.policy.var_store().trainable_variables() {
                let _ = var.fill_(f64::NAN);
            }
        });
        let (mut hook, mut logger) = ((), ());
        let mut iterations = trainer.iterations(&mut hook, &mut logger);
        assert!(matches!(
            iterations.next(),
            Some(Err(TrainError::Numeric(
                NumericError::NonFiniteProbabilities(_)
            )))
        ));
        assert!(iterations.next().is_none());
        drop(iterations);
        assert_eq!(trainer.num_updates(), 0);
    }

    #[rstest]
    fn non_finite_update_restores_parameters(config: TrainerConfig) {
        let mut trainer = Trainer::new(config, 8).unwrap();
        // An infinite step size sends every parameter with a nonzero gradient to infinity
        let overflowing = AdamConfig {
            learning_rate: f64::INFINITY,
            ..AdamConfig::default()
        };
        trainer.optimizer = overflowing
            .build_optimizer(trainer.policy.var_store())
            .unwrap();
        let before = trainer.policy().parameters();
        let result = trainer.train_iteration(0, &mut (), &mut ());
        assert!(matches!(
            result,
            Err(TrainError::Numeric(NumericError::NonFiniteParameters))
        ));
        assert!(trainer.policy().parameters_are_finite());
        assert_eq!(trainer.policy().parameters().max_abs_diff(&before), 0.0);
        assert_eq!(trainer.num_updates(), 0);
    }

    #[test]
    fn report_rates_without_elapsed_time() {
        let report = IterationReport {
            iteration: 0,
            episode_lengths: vec![10, 20],
            loss: 0.0,
            elapsed: Duration::ZERO,
        };
        assert_eq!(report.mean_length(), 15.0);
        assert_eq!(report.steps_per_second(), 0.0);

        let report = IterationReport {
            episode_lengths: vec![],
            elapsed: Duration::from_secs(2),
            ..report
        };
        assert_eq!(report.mean_length(), 0.0);
        assert_eq!(report.steps_per_second(), 0.0);

        let report = IterationReport {
            episode_lengths: vec![30, 10],
            ..report
        };
        assert_eq!(report.steps_per_second(), 20.0);
    }

    #[rstest]
    fn config_constants_reach_environment(config: TrainerConfig) {
        let config = TrainerConfig {
            physics: PhysicalConstants {
                gravity: 3.7,
                ..PhysicalConstants::default()
            },
            env: EnvironmentParams {
                max_pos: 1.0,
                ..EnvironmentParams::default()
            },
            ..config
        };
        let env = config.new_env();
        assert_eq!(env.physical_constants(), &config.physics);
        assert_eq!(env.params(), &config.env);
    }

    #[test]
    fn non_finite_loss_is_numeric_error() {
        let error = TrainError::from(OptimizerStepError::NonFiniteLoss(f64::INFINITY));
        assert!(matches!(
            error,
            TrainError::Numeric(NumericError::NonFiniteLoss(loss)) if loss.is_infinite()
        ));
    }

    #[rstest]
    fn logs_iteration_statistics(config: TrainerConfig) {
        let games = config.games_per_iteration;
        let mut trainer = Trainer::new(config, 9).unwrap();
        let mut logger = RecordingLogger::default();
        let report = trainer.train_iteration(0, &mut (), &mut logger).unwrap();
        #[allow(clippy::cast_precision_loss)]
        let lengths: Vec<f64> = report.episode_lengths.iter().map(|&l| l as f64).collect();
        assert_eq!(logger.scalars("episode/length"), lengths);
        assert_eq!(logger.scalars("update/loss"), vec![report.loss]);
        assert!(logger
            .entries
            .contains(&("episode/count".into(), LogValue::CounterIncrement(games as u64))));
        assert!(logger
            .entries
            .iter()
            .any(|(id, value)| id == "rollout/time" && matches!(value, LogValue::Duration(_))));
    }

    #[rstest]
    fn evaluate_does_not_train(config: TrainerConfig) {
        let mut trainer = Trainer::new(config, 10).unwrap();
        let before = trainer.policy().parameters();
        let trajectory = trainer.evaluate(20).unwrap();
        assert!(!trajectory.is_empty() && trajectory.len() <= 20);
        let start = trajectory.steps()[0].state;
        assert!(start.pole_angle.abs() <= 0.05 && start != CartPoleState::default());
        assert_eq!(trainer.policy().parameters().max_abs_diff(&before), 0.0);
        assert_eq!(trainer.num_updates(), 0);
    }

    #[rstest]
    fn parameters_transfer_between_trainers(config: TrainerConfig) {
        let mut trained = Trainer::new(config.clone(), 11).unwrap();
        trained.train(&mut (), &mut ()).unwrap();
        let mut fresh = Trainer::new(config, 12).unwrap();
        fresh.load_parameters(&trained.policy().parameters()).unwrap();
        assert_eq!(
            fresh
                .policy()
                .parameters()
                .max_abs_diff(&trained.policy().parameters()),
            0.0
        );
    }

    #[test]
    fn training_lengthens_games() {
        let config = TrainerConfig {
            policy: MlpConfig {
                hidden_sizes: vec![32],
            },
            num_iterations: 30,
            games_per_iteration: 16,
            max_steps_per_game: 200,
            num_threads: 4,
            ..TrainerConfig::default()
        };
        let mut trainer = Trainer::new(config, 0).unwrap();
        let means: Vec<f64> = trainer
            .train(&mut (), &mut ())
            .unwrap()
            .iter()
            .map(IterationReport::mean_length)
            .collect();
        let final_mean = means[25..].iter().sum::<f64>() / 5.0;
        assert!(
            final_mean > means[0],
            "initial: {}, final: {}",
            means[0],
            final_mean
        );
    }
}
