//! Control environments
mod cartpole;

pub use cartpole::{
    CartPole, CartPoleState, EnvironmentParams, InvalidActionIndex, PhysicalConstants, Push,
};

use crate::Prng;

/// Reward for a step that keeps the pole balanced.
pub const SURVIVAL_REWARD: f64 = 1.0;
/// Reward for the step on which the episode terminates.
pub const TERMINAL_REWARD: f64 = 0.0;

/// Reward of a step given whether that step terminated the episode.
///
/// Every step that does not end the episode earns [`SURVIVAL_REWARD`]; the step on which the
/// pole falls or the cart leaves the track earns [`TERMINAL_REWARD`].
/// A step that reaches the step cap without terminating is a surviving step.
#[inline]
pub const fn step_reward(done: bool) -> f64 {
    if done {
        TERMINAL_REWARD
    } else {
        SURVIVAL_REWARD
    }
}

/// Result of advancing an environment by one time step.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transition {
    /// State after the step.
    pub state: CartPoleState,
    /// Whether the new state is terminal.
    pub done: bool,
}

/// A cart-pole control environment.
///
/// Owns its physical state exclusively; the state changes only through [`reset`] and [`step`].
///
/// [`reset`]: Environment::reset
/// [`step`]: Environment::step
pub trait Environment {
    /// Reset to a new initial state and return it.
    ///
    /// All randomness of the environment enters here.
    fn reset(&mut self, rng: &mut Prng) -> CartPoleState;

    /// Apply an action for one time step.
    ///
    /// Must be a deterministic function of the current state and the action.
    fn step(&mut self, action: Push) -> Transition;

    /// The current state.
    fn state(&self) -> CartPoleState;
}

impl<E: Environment + ?Sized> Environment for Box<E> {
    fn reset(&mut self, rng: &mut Prng) -> CartPoleState {
        E::reset(self, rng)
    }
    fn step(&mut self, action: Push) -> Transition {
        E::step(self, action)
    }
    fn state(&self) -> CartPoleState {
        E::state(self)
    }
}

impl<E: Environment + ?Sized> Environment for &'_ mut E {
    fn reset(&mut self, rng: &mut Prng) -> CartPoleState {
        E::reset(self, rng)
    }
    fn step(&mut self, action: Push) -> Transition {
        E::step(self, action)
    }
    fn state(&self) -> CartPoleState {
        E::state(self)
    }
}
