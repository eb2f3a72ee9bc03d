//! Multi-layer perceptron
use crate::error::ConfigError;
use crate::Prng;
use rand::distributions::{Distribution, Uniform};
use serde::{Deserialize, Serialize};
use std::iter;
use tch::{nn, Tensor};

/// Multi-Layer Perceptron Configuration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MlpConfig {
    /// Sizes of the hidden layers
    pub hidden_sizes: Vec<usize>,
}

impl Default for MlpConfig {
    fn default() -> Self {
        Self {
            hidden_sizes: vec![128],
        }
    }
}

impl MlpConfig {
    /// Check that there is at least one hidden layer and every layer has positive width.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hidden_sizes.is_empty() || self.hidden_sizes.contains(&0) {
            return Err(ConfigError::InvalidHiddenLayerSizes(format!(
                "{:?}",
                self.hidden_sizes
            )));
        }
        Ok(())
    }

    /// Build the MLP, registering its variables under `vs`.
    ///
    /// Weights and biases are initialized from `U(-1/sqrt(fan_in), 1/sqrt(fan_in))`
    /// with values drawn from `rng`.
    pub fn build_module(
        &self,
        vs: &nn::Path,
        input_dim: usize,
        output_dim: usize,
        rng: &mut Prng,
    ) -> Result<Mlp, ConfigError> {
        self.validate()?;
        let iter_in_dim = iter::once(&input_dim).chain(self.hidden_sizes.iter());
        let iter_out_dim = self.hidden_sizes.iter().chain(iter::once(&output_dim));

        let layers = iter_in_dim
            .zip(iter_out_dim)
            .enumerate()
            .map(|(i, (&in_dim, &out_dim))| {
                Layer::new(&(vs / format!("layer_{}", i)), in_dim, out_dim, rng)
            })
            .collect();
        Ok(Mlp { layers })
    }
}

/// Parse comma-separated hidden layer sizes such as `"128, 64"`.
///
/// Every entry must be a positive integer.
pub fn parse_hidden_sizes(s: &str) -> Result<Vec<usize>, ConfigError> {
    let invalid = || ConfigError::InvalidHiddenLayerSizes(s.to_string());
    s.trim()
        .split(',')
        .map(|v| match v.trim().parse::<i64>() {
            Ok(size) if size > 0 => usize::try_from(size).map_err(|_| invalid()),
            _ => Err(invalid()),
        })
        .collect()
}

/// Multi-layer perceptron with ELU activations between layers and a linear output.
#[derive(Debug)]
pub struct Mlp {
    layers: Vec<Layer>,
}

impl Mlp {
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }
}

impl nn::Module for Mlp {
    fn forward(&self, xs: &Tensor) -> Tensor {
        self.layers
            .iter()
            .enumerate()
            .fold(xs.shallow_clone(), |hidden, (i, layer)| {
                let hidden = if i > 0 { hidden.elu() } else { hidden };
                layer.forward(&hidden)
            })
    }
}

/// Fully-connected layer.
#[derive(Debug)]
struct Layer {
    /// Shape `[out_dim, in_dim]`
    weight: Tensor,
    /// Shape `[out_dim]`
    bias: Tensor,
}

impl Layer {
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn new(vs: &nn::Path, in_dim: usize, out_dim: usize, rng: &mut Prng) -> Self {
        let bound = (in_dim as f32).sqrt().recip();
        let dist = Uniform::new_inclusive(-bound, bound);
        let weight_init: Vec<f32> = (0..in_dim * out_dim).map(|_| dist.sample(rng)).collect();
        let bias_init: Vec<f32> = (0..out_dim).map(|_| dist.sample(rng)).collect();
        let weight = vs.var_copy(
            "weight",
            &Tensor::of_slice(&weight_init).reshape(&[out_dim as i64, in_dim as i64]),
        );
        let bias = vs.var_copy("bias", &Tensor::of_slice(&bias_init));
        Self { weight, bias }
    }

    fn forward(&self, xs: &Tensor) -> Tensor {
        xs.matmul(&self.weight.tr()) + &self.bias
    }
}
