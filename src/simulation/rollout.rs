//! Playing a batch of games, possibly in parallel
use super::episode::{play_episode_observed, Trajectory, TrajectoryStep};
use super::hooks::TrainHook;
use crate::envs::{CartPoleState, Environment};
use crate::policy::{NumericError, Policy};
use crate::Prng;
use crossbeam::channel::{self, Sender};
use rand::{Rng, SeedableRng};
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};

/// Configuration for [`play_games`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RolloutConfig {
    /// Number of games to play.
    pub num_games: usize,
    /// Maximum number of steps per game.
    pub max_steps: usize,
    /// Number of worker threads. The main thread only coordinates.
    pub num_threads: usize,
    /// Report the states of game 0 to [`TrainHook::on_observe`].
    pub observe: bool,
}

/// Trajectories of a batch of games in game index order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Batch {
    trajectories: Vec<Trajectory>,
}

impl Batch {
    pub fn trajectories(&self) -> &[Trajectory] {
        &self.trajectories
    }

    /// Number of steps of each game.
    pub fn lengths(&self) -> Vec<usize> {
        self.trajectories.iter().map(Trajectory::len).collect()
    }

    pub fn total_steps(&self) -> usize {
        self.trajectories.iter().map(Trajectory::len).sum()
    }

    /// All steps of all games, game by game.
    pub fn steps(&self) -> impl Iterator<Item = &TrajectoryStep> {
        self.trajectories.iter().flat_map(Trajectory::steps)
    }
}

impl From<Vec<Trajectory>> for Batch {
    fn from(trajectories: Vec<Trajectory>) -> Self {
        Self { trajectories }
    }
}

enum Message {
    Observe(CartPoleState),
    GameEnd {
        game: usize,
        result: Result<Trajectory, NumericError>,
    },
}

/// Play a batch of games with a fixed policy.
///
/// Each game gets a fresh environment from `env_factory` and its own random number generator,
/// derived from `rng` in game index order before any game starts. The resulting batch is
/// therefore the same for any number of threads.
///
/// Hook calls happen on the calling thread.
///
/// # Errors
/// If any game fails, the remaining unstarted games are skipped and the error of the
/// lowest-indexed failed game is returned.
pub fn play_games<E, F, P, H>(
    env_factory: &F,
    policy: &P,
    config: &RolloutConfig,
    rng: &mut Prng,
    hook: &mut H,
) -> Result<Batch, NumericError>
where
    F: Fn() -> E + Sync,
    E: Environment,
    P: Policy + Sync + ?Sized,
    H: TrainHook + ?Sized,
{
    let num_games = config.num_games;
    let num_workers = config.num_threads.max(1).min(num_games.max(1));

    let mut assignments: Vec<Vec<(usize, Prng)>> = (0..num_workers).map(|_| Vec::new()).collect();
    for game in 0..num_games {
        let game_rng = Prng::seed_from_u64(rng.gen());
        assignments[game % num_workers].push((game, game_rng));
    }

    let mut results: Vec<Option<Result<Trajectory, NumericError>>> =
        (0..num_games).map(|_| None).collect();
    let abort = AtomicBool::new(false);

    let scope_result = crossbeam::scope(|scope| {
        let (sender, receiver) = channel::unbounded();
        for games in assignments {
            let sender = sender.clone();
            let abort = &abort;
            scope.spawn(move |_| {
                run_worker(env_factory, policy, config, games, abort, &sender);
            });
        }
        drop(sender);

        // Ends once every worker has finished and dropped its sender
        for message in receiver {
            match message {
                Message::Observe(state) => hook.on_observe(&state),
                Message::GameEnd { game, result } => {
                    if result.is_err() {
                        abort.store(true, Ordering::Relaxed);
                    } else {
                        hook.on_game_end(game, num_games);
                    }
                    results[game] = Some(result);
                }
            }
        }
    });
    if let Err(panic_payload) = scope_result {
        panic::resume_unwind(panic_payload);
    }

    // Unplayed games only occur after a failure, which is returned first
    let trajectories = results
        .into_iter()
        .flatten()
        .collect::<Result<Vec<_>, _>>()?;
    debug_assert_eq!(trajectories.len(), num_games);
    Ok(trajectories.into())
}

fn run_worker<E, F, P>(
    env_factory: &F,
    policy: &P,
    config: &RolloutConfig,
    games: Vec<(usize, Prng)>,
    abort: &AtomicBool,
    sender: &Sender<Message>,
) where
    F: Fn() -> E,
    E: Environment,
    P: Policy + ?Sized,
{
    for (game, mut game_rng) in games {
        if abort.load(Ordering::Relaxed) {
            return;
        }
        let mut env = env_factory();
        let result = if config.observe && game == 0 {
            play_episode_observed(
                &mut env,
                policy,
                config.max_steps,
                &mut game_rng,
                &mut |state| {
                    let _ = sender.send(Message::Observe(*state));
                },
            )
        } else {
            play_episode_observed(&mut env, policy, config.max_steps, &mut game_rng, &mut |_| {})
        };
        // The receiver outlives all workers
        let _ = sender.send(Message::GameEnd { game, result });
    }
}
