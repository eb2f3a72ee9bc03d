use super::{Environment, Transition};
use crate::Prng;
use rand::distributions::{Distribution, Uniform};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;
use thiserror::Error;

/// Cart-Pole environment
///
/// Consists of a simulated cart on a track with a vertical pole attached by a hinge on the top.
/// The goal is to keep the pole upright by applying left and right forces to the cart.
///
/// The dynamics are the frictionless equations of [Barto et al. (1983)][barto1983]
/// integrated with explicit Euler steps, as in the classic [OpenAI Gym][gym_cartpole]
/// environment whose constants are used as defaults.
///
/// [barto1983]: https://ieeexplore.ieee.org/document/6313077
/// [gym_cartpole]: https://github.com/openai/gym/blob/master/gym/envs/classic_control/cartpole.py
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartPole {
    phys: InternalPhysicalConstants,
    env: EnvironmentParams,
    state: CartPoleState,
}

impl CartPole {
    /// Create a cart-pole at rest in the upright equilibrium.
    pub fn new(phys: PhysicalConstants, env: EnvironmentParams) -> Self {
        Self {
            phys: phys.into(),
            env,
            state: CartPoleState::default(),
        }
    }

    /// Overwrite the physical state.
    pub fn set_state(&mut self, state: CartPoleState) {
        self.state = state;
    }

    pub const fn physical_constants(&self) -> &PhysicalConstants {
        &self.phys.c
    }

    pub const fn params(&self) -> &EnvironmentParams {
        &self.env
    }

    /// Whether a state lies outside the allowed track or angle range.
    pub fn is_terminal(&self, state: &CartPoleState) -> bool {
        state.cart_position.abs() > self.env.max_pos || state.pole_angle.abs() > self.env.max_angle
    }
}

impl Environment for CartPole {
    fn reset(&mut self, rng: &mut Prng) -> CartPoleState {
        // All parameters are sampled from the same range of values
        let jitter = self.env.reset_jitter;
        let dist = Uniform::new_inclusive(-jitter, jitter);
        self.state = CartPoleState {
            cart_position: dist.sample(rng),
            cart_velocity: dist.sample(rng),
            pole_angle: dist.sample(rng),
            pole_angular_velocity: dist.sample(rng),
        };
        self.state
    }

    fn step(&mut self, action: Push) -> Transition {
        let applied_force = match action {
            Push::Left => -self.env.action_force,
            Push::Right => self.env.action_force,
        };
        self.state = self.phys.next_state(&self.state, applied_force);
        Transition {
            state: self.state,
            done: self.is_terminal(&self.state),
        }
    }

    fn state(&self) -> CartPoleState {
        self.state
    }
}

/// Direction of the force applied to the cart.
///
/// Encoded as the action index `0` (left) or `1` (right).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Push {
    Left,
    Right,
}

impl Push {
    /// Both actions in index order.
    pub const ALL: [Self; 2] = [Self::Left, Self::Right];

    pub const fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Right => 1,
        }
    }
}

/// Action index outside of `{0, 1}`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
#[error("invalid action index {0}, expected 0 (left) or 1 (right)")]
pub struct InvalidActionIndex(pub i64);

impl TryFrom<i64> for Push {
    type Error = InvalidActionIndex;

    fn try_from(index: i64) -> Result<Self, Self::Error> {
        match index {
            0 => Ok(Self::Left),
            1 => Ok(Self::Right),
            _ => Err(InvalidActionIndex(index)),
        }
    }
}

impl From<Push> for i64 {
    fn from(action: Push) -> Self {
        match action {
            Push::Left => 0,
            Push::Right => 1,
        }
    }
}

impl fmt::Display for Push {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Left => write!(f, "←"),
            Self::Right => write!(f, "→"),
        }
    }
}

/// Physical constants for the [`CartPole`] environment.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalConstants {
    /// Downward force of gravity (m/s^2)
    pub gravity: f64,
    /// Mass of the cart (kg)
    pub mass_cart: f64,
    /// Mass of the pole (kg)
    pub mass_pole: f64,
    /// Half the length of the pole (m)
    pub length_half_pole: f64,
    /// Simulation time step (s)
    pub time_step: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            gravity: 9.8,
            mass_cart: 1.0,
            mass_pole: 0.1,
            length_half_pole: 0.5,
            time_step: 0.02,
        }
    }
}

/// Parameters for [`CartPole`] as a control environment.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentParams {
    /// Magnitude of the force (N) applied by actions.
    pub action_force: f64,
    /// Maximum absolute position (meters) before the episode is ended.
    pub max_pos: f64,
    /// Maximum absolute pole angle from vertical (radians) before the episode is ended.
    pub max_angle: f64,
    /// Half-width of the uniform range from which each initial state variable is drawn.
    pub reset_jitter: f64,
}

impl Default for EnvironmentParams {
    fn default() -> Self {
        Self {
            action_force: 10.0,
            max_pos: 2.4,
            max_angle: 12.0f64.to_radians(), // 12 degrees
            reset_jitter: 0.05,
        }
    }
}

/// Internal cart-pole constants with pre-computed common values.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
struct InternalPhysicalConstants {
    /// Fundamental constants
    c: PhysicalConstants,
    /// `mass_cart + mass_pole`
    total_mass: f64,
    /// `mass_pole * length_half_pole`
    mass_length_pole: f64,
}

impl Default for InternalPhysicalConstants {
    fn default() -> Self {
        PhysicalConstants::default().into()
    }
}

impl From<PhysicalConstants> for InternalPhysicalConstants {
    fn from(c: PhysicalConstants) -> Self {
        Self {
            c,
            total_mass: c.mass_cart + c.mass_pole,
            mass_length_pole: c.mass_pole * c.length_half_pole,
        }
    }
}

impl InternalPhysicalConstants {
    /// Simulate the state for one time step with an applied force on the cart (in N).
    fn next_state(&self, state: &CartPoleState, applied_force: f64) -> CartPoleState {
        let (sin_angle, cos_angle) = state.pole_angle.sin_cos();
        let angular_velocity_squared = state.pole_angular_velocity * state.pole_angular_velocity;

        let temp = (applied_force + self.mass_length_pole * angular_velocity_squared * sin_angle)
            / self.total_mass;
        let angular_acceleration = (self.c.gravity * sin_angle - cos_angle * temp)
            / (self.c.length_half_pole
                * (4.0 / 3.0 - self.c.mass_pole * cos_angle * cos_angle / self.total_mass));
        let cart_acceleration =
            temp - self.mass_length_pole * angular_acceleration * cos_angle / self.total_mass;

        // Explicit Euler: positions advance with the velocities from the start of the step
        let dt = self.c.time_step;
        CartPoleState {
            cart_position: state.cart_position + dt * state.cart_velocity,
            cart_velocity: state.cart_velocity + dt * cart_acceleration,
            pole_angle: state.pole_angle + dt * state.pole_angular_velocity,
            pole_angular_velocity: state.pole_angular_velocity + dt * angular_acceleration,
        }
    }
}

/// Physical state of the [`CartPole`] environment.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartPoleState {
    /// Cart position from the track midpoint (m).
    pub cart_position: f64,
    /// Cart velocity (m/s).
    pub cart_velocity: f64,
    /// Angle of the pole from vertical (radians).
    pub pole_angle: f64,
    /// Pole angular velocity about the hinge (radians / s).
    pub pole_angular_velocity: f64,
}

impl CartPoleState {
    /// Number of state variables.
    pub const DIM: usize = 4;

    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|x| x.is_finite())
    }

    pub const fn to_array(&self) -> [f64; 4] {
        [
            self.cart_position,
            self.cart_velocity,
            self.pole_angle,
            self.pole_angular_velocity,
        ]
    }

    /// State variables as network input features.
    #[allow(clippy::cast_possible_truncation)]
    pub fn features(&self) -> [f32; 4] {
        self.to_array().map(|x| x as f32)
    }
}
