//! Action-selection policies
use crate::envs::{CartPoleState, Push};
use crate::Prng;
use rand::Rng;
use thiserror::Error;

/// A stochastic mapping from cart-pole states to actions.
pub trait Policy {
    /// Probability of each action in [`Push::ALL`] order.
    ///
    /// # Errors
    /// Returns an error if the estimator produces a non-finite output.
    fn action_probabilities(&self, state: &CartPoleState) -> Result<[f64; 2], NumericError>;

    /// Sample an action from [`action_probabilities`](Policy::action_probabilities).
    ///
    /// Draws exactly one uniform value from `rng`.
    fn sample_action(
        &self,
        state: &CartPoleState,
        rng: &mut Prng,
    ) -> Result<SampledAction, NumericError> {
        let probs = self.action_probabilities(state)?;
        Ok(SampledAction::from_probabilities(probs, rng.gen()))
    }
}

impl<P: Policy + ?Sized> Policy for &'_ P {
    fn action_probabilities(&self, state: &CartPoleState) -> Result<[f64; 2], NumericError> {
        P::action_probabilities(self, state)
    }
    fn sample_action(
        &self,
        state: &CartPoleState,
        rng: &mut Prng,
    ) -> Result<SampledAction, NumericError> {
        P::sample_action(self, state, rng)
    }
}

/// An action drawn from a policy along with its log-probability under that policy.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SampledAction {
    pub action: Push,
    pub log_prob: f64,
}

impl SampledAction {
    /// Select an action by inverse-CDF sampling with a uniform value in `[0, 1)`.
    pub fn from_probabilities(probs: [f64; 2], uniform: f64) -> Self {
        let action = if uniform < probs[0] {
            Push::Left
        } else {
            Push::Right
        };
        Self {
            action,
            log_prob: probs[action.index()].ln(),
        }
    }
}

/// Non-finite value produced by the policy, the simulation, or an update.
#[derive(Debug, Copy, Clone, PartialEq, Error)]
pub enum NumericError {
    #[error("policy produced non-finite action probabilities {0:?}")]
    NonFiniteProbabilities([f64; 2]),
    #[error("simulation produced a non-finite state {0:?}")]
    NonFiniteState(CartPoleState),
    #[error("loss is not finite: {0}")]
    NonFiniteLoss(f64),
    #[error("policy parameters became non-finite after an update")]
    NonFiniteParameters,
}

/// Check that a pair of probabilities is a valid distribution.
pub(crate) fn check_probabilities(probs: [f64; 2]) -> Result<[f64; 2], NumericError> {
    if probs.iter().all(|p| p.is_finite() && *p >= 0.0) {
        Ok(probs)
    } else {
        Err(NumericError::NonFiniteProbabilities(probs))
    }
}

/// A policy that always chooses the same action.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FixedPolicy(pub Push);

impl Policy for FixedPolicy {
    fn action_probabilities(&self, _: &CartPoleState) -> Result<[f64; 2], NumericError> {
        Ok(match self.0 {
            Push::Left => [1.0, 0.0],
            Push::Right => [0.0, 1.0],
        })
    }
}

/// A policy that chooses both actions with equal probability.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct UniformPolicy;

impl Policy for UniformPolicy {
    fn action_probabilities(&self, _: &CartPoleState) -> Result<[f64; 2], NumericError> {
        Ok([0.5, 0.5])
    }
}
