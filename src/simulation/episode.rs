use crate::envs::{self, CartPoleState, Environment, Push, Transition};
use crate::policy::{NumericError, Policy, SampledAction};
use crate::Prng;

/// One recorded step of a game.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TrajectoryStep {
    /// State in which the action was taken.
    pub state: CartPoleState,
    /// The action taken.
    pub action: Push,
    /// Log-probability of the action under the policy that chose it.
    pub log_prob: f64,
    /// Reward for the step; see [`envs::step_reward`].
    pub reward: f64,
}

/// The record of one game from reset to termination or the step cap.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Trajectory {
    steps: Vec<TrajectoryStep>,
    terminated: bool,
}

impl Trajectory {
    pub fn steps(&self) -> &[TrajectoryStep] {
        &self.steps
    }

    /// Number of steps played; longer is better.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Whether the game ended by the pole falling or the cart leaving the track
    /// rather than by reaching the step cap.
    pub const fn terminated(&self) -> bool {
        self.terminated
    }

    pub fn rewards(&self) -> impl Iterator<Item = f64> + '_ {
        self.steps.iter().map(|step| step.reward)
    }

    pub fn total_reward(&self) -> f64 {
        self.rewards().sum()
    }
}

/// Play one game.
///
/// Resets the environment then alternates between sampling an action from the policy and
/// stepping the environment until the episode terminates or `max_steps` steps are taken.
/// Reaching the step cap is a successful game, not an error.
///
/// # Errors
/// A non-finite action distribution or simulation state aborts the game.
pub fn play_episode<E, P>(
    env: &mut E,
    policy: &P,
    max_steps: usize,
    rng: &mut Prng,
) -> Result<Trajectory, NumericError>
where
    E: Environment + ?Sized,
    P: Policy + ?Sized,
{
    play_episode_observed(env, policy, max_steps, rng, &mut |_| {})
}

/// Play one game, passing every state (starting with the initial state) to `observe`.
pub fn play_episode_observed<E, P>(
    env: &mut E,
    policy: &P,
    max_steps: usize,
    rng: &mut Prng,
    observe: &mut dyn FnMut(&CartPoleState),
) -> Result<Trajectory, NumericError>
where
    E: Environment + ?Sized,
    P: Policy + ?Sized,
{
    let mut trajectory = Trajectory {
        steps: Vec::with_capacity(max_steps.min(1024)),
        terminated: false,
    };
    let mut state = env.reset(rng);
    observe(&state);
    for _ in 0..max_steps {
        let SampledAction { action, log_prob } = policy.sample_action(&state, rng)?;
        let Transition {
            state: next_state,
            done,
        } = env.step(action);
        if !next_state.is_finite() {
            return Err(NumericError::NonFiniteState(next_state));
        }
        trajectory.steps.push(TrajectoryStep {
            state,
            action,
            log_prob,
            reward: envs::step_reward(done),
        });
        observe(&next_state);
        if done {
            trajectory.terminated = true;
            break;
        }
        state = next_state;
    }
    Ok(trajectory)
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use crate::envs::CartPole;

    /// Cart-pole that always restarts from the same state.
    #[derive(Debug, Default, Clone)]
    pub struct FixedStart {
        pub env: CartPole,
        pub start: CartPoleState,
    }

    impl FixedStart {
        pub fn new(start: CartPoleState) -> Self {
            Self {
                env: CartPole::default(),
                start,
            }
        }
    }

    impl Environment for FixedStart {
        fn reset(&mut self, _: &mut Prng) -> CartPoleState {
            self.env.set_state(self.start);
            self.start
        }
        fn step(&mut self, action: Push) -> Transition {
            self.env.step(action)
        }
        fn state(&self) -> CartPoleState {
            self.env.state()
        }
    }

    /// Policy with broken output.
    #[derive(Debug, Default, Copy, Clone)]
    pub struct NanPolicy;

    impl Policy for NanPolicy {
        fn action_probabilities(&self, _: &CartPoleState) -> Result<[f64; 2], NumericError> {
            crate::policy::check_probabilities([f64::NAN, f64::NAN])
        }
    }
}
