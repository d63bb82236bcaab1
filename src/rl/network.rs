//! Q-value function approximator
//!
//! A small feed-forward network mapping the 11-element state vector to one
//! unbounded action value per relative move. Two linear layers with a ReLU
//! between them; the output stays linear so values can take any sign.

use burn::{
    module::Module,
    nn::{Linear, LinearConfig},
    tensor::{activation::relu, backend::Backend, Tensor},
};
use serde::{Deserialize, Serialize};

use crate::game::Turn;
use crate::rl::observation::STATE_DIM;

/// Configuration for the Q-network architecture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QNetworkConfig {
    /// Size of the input feature vector
    pub state_dim: usize,

    /// Width of the hidden layer
    pub hidden_dim: usize,

    /// Number of action-value outputs
    pub num_actions: usize,
}

impl QNetworkConfig {
    /// Create a configuration with the given hidden width
    pub fn new(hidden_dim: usize) -> Self {
        Self {
            state_dim: STATE_DIM,
            hidden_dim,
            num_actions: Turn::COUNT,
        }
    }

    /// Initialize the Q-network from this configuration
    pub fn init<B: Backend>(&self, device: &B::Device) -> QNetwork<B> {
        QNetwork {
            linear1: LinearConfig::new(self.state_dim, self.hidden_dim).init(device),
            linear2: LinearConfig::new(self.hidden_dim, self.num_actions).init(device),
        }
    }
}

impl Default for QNetworkConfig {
    fn default() -> Self {
        Self::new(256)
    }
}

/// Feed-forward Q-network
///
/// Generic over the Burn backend so the same module runs plain for inference
/// and wrapped in `Autodiff` for training.
#[derive(Module, Debug)]
pub struct QNetwork<B: Backend> {
    linear1: Linear<B>,
    linear2: Linear<B>,
}

impl<B: Backend> QNetwork<B> {
    /// Forward pass: `[batch, state_dim]` states to `[batch, num_actions]`
    /// action values. Deterministic, no internal randomness.
    pub fn forward(&self, states: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = relu(self.linear1.forward(states));
        self.linear2.forward(x)
    }

    /// Forward pass for a single state vector
    pub fn forward_one(&self, state: Tensor<B, 1>) -> Tensor<B, 1> {
        self.forward(state.unsqueeze_dim(0)).squeeze(0)
    }
}
