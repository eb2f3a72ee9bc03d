//! Torch optimizer wrappers and configuration
use crate::error::ConfigError;
use crate::logging::StatsLogger;
use serde::{Deserialize, Serialize};
use tch::{nn::VarStore, COptimizer, TchError, Tensor};
use thiserror::Error;

/// Optimizer that minimizes a loss function.
pub trait Optimizer {
    /// Zero out the gradients of all optimized tensors
    fn zero_grad(&mut self) -> Result<(), OptimizerStepError>;

    /// Perform a loss minimization step using the gradient of a loss function.
    ///
    /// Obtains gradients by backpropagating the result of `loss_fn`.
    ///
    /// # Args
    /// * `loss_fn` - Loss function to minimize.
    ///     Called to obtain the loss tensor, which is back-propagated to obtain a gradient.
    /// * `logger` - Logger for statistics about the step.
    ///
    /// # Returns
    /// The value of the loss before the step.
    ///
    /// A non-finite loss is rejected without modifying the parameters.
    fn backward_step(
        &mut self,
        loss_fn: &dyn Fn() -> Tensor,
        logger: &mut dyn StatsLogger,
    ) -> Result<f64, OptimizerStepError>;
}

impl Optimizer for COptimizer {
    fn zero_grad(&mut self) -> Result<(), OptimizerStepError> {
        COptimizer::zero_grad(self)?;
        Ok(())
    }

    fn backward_step(
        &mut self,
        loss_fn: &dyn Fn() -> Tensor,
        logger: &mut dyn StatsLogger,
    ) -> Result<f64, OptimizerStepError> {
        let loss = loss_fn();
        let loss_value = loss.double_value(&[]);
        if !loss_value.is_finite() {
            return Err(OptimizerStepError::NonFiniteLoss(loss_value));
        }
        Optimizer::zero_grad(self)?;
        loss.backward();
        COptimizer::step(self)?;
        logger.log_scalar("loss", loss_value);
        Ok(loss_value)
    }
}

/// Error performing an optimization step.
#[derive(Debug, Error)]
pub enum OptimizerStepError {
    #[error("loss is not finite: {0}")]
    NonFiniteLoss(f64),
    #[error("torch error")]
    Torch(#[from] TchError),
}

/// Build an optimizer
pub trait BuildOptimizer {
    type Optimizer;

    /// Build an optimizer for the trainable variables in a variable store.
    fn build_optimizer(&self, vs: &VarStore) -> Result<Self::Optimizer, TchError>;
}

/// Configuration for the Adam optimizer.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdamConfig {
    /// Learning rate
    pub learning_rate: f64,
    /// Coefficient for the running average of the gradient
    pub beta1: f64,
    /// Coefficient for the running average of the square of the gradient
    pub beta2: f64,
    /// Weight decay (L2 penalty)
    pub weight_decay: f64,
}

impl Default for AdamConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.05,
            beta1: 0.9,
            beta2: 0.999,
            weight_decay: 0.0,
        }
    }
}

impl AdamConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(ConfigError::InvalidLearningRate(self.learning_rate));
        }
        for (name, value) in [("beta1", self.beta1), ("beta2", self.beta2)] {
            if !(0.0..1.0).contains(&value) {
                return Err(ConfigError::InvalidAdamBeta { name, value });
            }
        }
        Ok(())
    }
}

impl BuildOptimizer for AdamConfig {
    type Optimizer = COptimizer;

    fn build_optimizer(&self, vs: &VarStore) -> Result<COptimizer, TchError> {
        let mut optimizer =
            COptimizer::adam(self.learning_rate, self.beta1, self.beta2, self.weight_decay)?;
        for var in vs.trainable_variables() {
            optimizer.add_parameters(&var, 0)?;
        }
        Ok(optimizer)
    }
}
