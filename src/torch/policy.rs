//! Policy network
use super::mlp::{Mlp, MlpConfig};
use crate::envs::{CartPoleState, Push};
use crate::error::ConfigError;
use crate::policy::{check_probabilities, NumericError, Policy};
use crate::Prng;
use std::collections::BTreeMap;
use std::path::Path;
use tch::{nn::Module, nn::VarStore, Device, Kind, TchError, Tensor};
use thiserror::Error;

/// Cart-pole policy parameterized by a multi-layer perceptron.
///
/// The network maps the four state variables to a single logit `z`, the log-odds of
/// [`Push::Left`]:
/// `p(Left) = sigmoid(z)` and `p(Right) = 1 - sigmoid(z) = sigmoid(-z)`.
#[derive(Debug)]
pub struct PolicyNetwork {
    vs: VarStore,
    mlp: Mlp,
    config: MlpConfig,
}

impl PolicyNetwork {
    /// Build a new network with parameters initialized from `rng`.
    pub fn new(config: &MlpConfig, rng: &mut Prng) -> Result<Self, ConfigError> {
        let vs = VarStore::new(Device::Cpu);
        let mlp = config.build_module(&vs.root(), CartPoleState::DIM, 1, rng)?;
        Ok(Self {
            vs,
            mlp,
            config: config.clone(),
        })
    }

    /// Variable store holding the trainable parameters.
    pub const fn var_store(&self) -> &VarStore {
        &self.vs
    }

    /// Hidden layer sizes, needed to build a network compatible with [`parameters`].
    ///
    /// [`parameters`]: PolicyNetwork::parameters
    pub fn hidden_sizes(&self) -> &[usize] {
        &self.config.hidden_sizes
    }

    pub const fn config(&self) -> &MlpConfig {
        &self.config
    }

    /// Stack states into a float tensor of shape `[N, 4]`.
    #[allow(clippy::cast_possible_wrap)]
    pub fn states_tensor<'a, I>(states: I) -> Tensor
    where
        I: IntoIterator<Item = &'a CartPoleState>,
    {
        let features: Vec<f32> = states.into_iter().flat_map(|s| s.features()).collect();
        let num_states = (features.len() / CartPoleState::DIM) as i64;
        Tensor::of_slice(&features).reshape(&[num_states, CartPoleState::DIM as i64])
    }

    /// Actions as an `i64` index tensor of shape `[N]`.
    pub fn actions_tensor<I>(actions: I) -> Tensor
    where
        I: IntoIterator<Item = Push>,
    {
        let indices: Vec<i64> = actions.into_iter().map(i64::from).collect();
        Tensor::of_slice(&indices)
    }

    /// Logits of `Push::Left` for a batch of states.
    ///
    /// # Args
    /// * `states` - Float tensor of shape `[N, 4]`.
    ///
    /// # Returns
    /// Float tensor of shape `[N]`.
    pub fn logits(&self, states: &Tensor) -> Tensor {
        self.mlp.forward(states).reshape(&[-1])
    }

    /// Differentiable log-probabilities of the given actions.
    ///
    /// # Args
    /// * `states` - Float tensor of shape `[N, 4]`.
    /// * `actions` - Action index tensor of shape `[N]`; `0` is left and `1` is right.
    ///
    /// # Returns
    /// Float tensor of shape `[N]`.
    pub fn log_probs(&self, states: &Tensor, actions: &Tensor) -> Tensor {
        // +1 for left and -1 for right so that log p(a) = log_sigmoid(sign * z)
        let sign = actions.to_kind(Kind::Float) * -2.0 + 1.0;
        (self.logits(states) * sign).log_sigmoid()
    }

    /// Detached copies of all parameters.
    pub fn parameters(&self) -> PolicyParameters {
        let tensors = self
            .vs
            .variables()
            .into_iter()
            .map(|(name, tensor)| (name, tensor.detach().copy()))
            .collect();
        PolicyParameters {
            hidden_sizes: self.config.hidden_sizes.clone(),
            tensors,
        }
    }

    /// Overwrite all parameters with the given values.
    ///
    /// Either every parameter is loaded or, on error, none is modified.
    pub fn load_parameters(&mut self, params: &PolicyParameters) -> Result<(), ParameterError> {
        if params.hidden_sizes != self.config.hidden_sizes {
            return Err(ParameterError::ArchitectureMismatch {
                expected: self.config.hidden_sizes.clone(),
                actual: params.hidden_sizes.clone(),
            });
        }
        let variables = self.vs.variables();
        for (name, var) in &variables {
            let value = params
                .tensors
                .get(name)
                .ok_or_else(|| ParameterError::Missing(name.clone()))?;
            if value.size() != var.size() {
                return Err(ParameterError::ShapeMismatch {
                    name: name.clone(),
                    expected: var.size(),
                    actual: value.size(),
                });
            }
        }
        if let Some(name) = params.tensors.keys().find(|n| !variables.contains_key(*n)) {
            return Err(ParameterError::Unexpected(name.clone()));
        }
        tch::no_grad(|| {
            for (name, mut var) in variables {
                if let Some(value) = params.tensors.get(&name) {
                    var.copy_(value);
                }
            }
        });
        Ok(())
    }

    /// Whether every parameter value is finite.
    pub fn parameters_are_finite(&self) -> bool {
        self.vs
            .trainable_variables()
            .iter()
            .all(|t| f64::from(t.abs().sum(Kind::Double)).is_finite())
    }

    /// Save the parameters to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), TchError> {
        self.vs.save(path)
    }

    /// Load parameters from a file written by [`save`](PolicyNetwork::save).
    ///
    /// The network must have been built with the same hidden sizes.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<(), TchError> {
        self.vs.load(path)
    }
}

impl Policy for PolicyNetwork {
    fn action_probabilities(&self, state: &CartPoleState) -> Result<[f64; 2], NumericError> {
        let logit = tch::no_grad(|| self.logits(&Self::states_tensor([state])).double_value(&[0]));
        let p_left = sigmoid(logit);
        check_probabilities([p_left, 1.0 - p_left])
    }
}

/// Numerically stable logistic function.
fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        (1.0 + (-x).exp()).recip()
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Snapshot of the parameters of a [`PolicyNetwork`].
#[derive(Debug)]
pub struct PolicyParameters {
    hidden_sizes: Vec<usize>,
    tensors: BTreeMap<String, Tensor>,
}

impl PolicyParameters {
    pub fn hidden_sizes(&self) -> &[usize] {
        &self.hidden_sizes
    }

    pub fn get(&self, name: &str) -> Option<&Tensor> {
        self.tensors.get(name)
    }

    /// Iterate over `(name, tensor)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Tensor)> {
        self.tensors.iter().map(|(name, t)| (name.as_str(), t))
    }

    /// Largest absolute elementwise difference from another snapshot of the same network.
    pub fn max_abs_diff(&self, other: &Self) -> f64 {
        self.tensors
            .iter()
            .filter_map(|(name, t)| {
                other
                    .tensors
                    .get(name)
                    .map(|o| f64::from((t - o).abs().max()))
            })
            .fold(0.0, f64::max)
    }
}

/// Error loading policy parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParameterError {
    #[error("hidden layer sizes {actual:?} do not match the network's {expected:?}")]
    ArchitectureMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
    #[error("missing parameter \"{0}\"")]
    Missing(String),
    #[error("unexpected parameter \"{0}\"")]
    Unexpected(String),
    #[error("parameter \"{name}\" has shape {actual:?}, expected {expected:?}")]
    ShapeMismatch {
        name: String,
        expected: Vec<i64>,
        actual: Vec<i64>,
    },
}
