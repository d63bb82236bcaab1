//! Q-learning hyperparameter configuration

use serde::{Deserialize, Serialize};

/// Configuration for the Q-learning agent
///
/// Default values mirror the classic tabular-free snake DQN setup: a replay
/// memory of 100k transitions, batches of 1000, Adam at 1e-3, discount 0.9,
/// and a linear exploration schedule over the first 80 episodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Replay memory capacity; oldest experiences are evicted beyond this
    ///
    /// Default: 100_000
    pub max_memory: usize,

    /// Number of experiences drawn for each long-memory training pass
    ///
    /// Default: 1000
    pub batch_size: usize,

    /// Learning rate for the Adam optimizer
    ///
    /// Default: 1e-3
    pub learning_rate: f64,

    /// Discount factor for future rewards (gamma)
    ///
    /// Default: 0.9
    pub gamma: f32,

    /// Exploration schedule base: epsilon = max(0, base - episodes), and a
    /// random action is taken with probability epsilon/200
    ///
    /// Default: 80
    pub exploration_base: u32,

    /// Width of the Q-network hidden layer
    ///
    /// Default: 256
    pub hidden_dim: usize,
}

impl AgentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), String> {
        if self.max_memory == 0 {
            return Err("max_memory must be at least 1".to_string());
        }

        if self.batch_size == 0 {
            return Err("batch_size must be at least 1".to_string());
        }

        if self.batch_size > self.max_memory {
            return Err(format!(
                "batch_size ({}) cannot exceed max_memory ({})",
                self.batch_size, self.max_memory
            ));
        }

        if self.learning_rate <= 0.0 {
            return Err(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            ));
        }

        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(format!("gamma must be in [0, 1], got {}", self.gamma));
        }

        if self.hidden_dim == 0 {
            return Err("hidden_dim must be at least 1".to_string());
        }

        Ok(())
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_memory: 100_000,
            batch_size: 1000,
            learning_rate: 1e-3,
            gamma: 0.9,
            exploration_base: 80,
            hidden_dim: 256,
        }
    }
}
