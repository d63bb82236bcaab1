//! Q-learning infrastructure for the Snake agent
//!
//! Provides:
//! - 11-element feature-vector observations
//! - the Q-network function approximator
//! - the temporal-difference trainer (Bellman updates)
//! - bounded FIFO replay memory
//! - the experience agent tying them together

pub mod agent;
pub mod backend;
pub mod config;
pub mod memory;
pub mod network;
pub mod observation;
pub mod persistence;
pub mod trainer;

pub use agent::Agent;
pub use backend::{default_device, InferenceBackend, TrainingBackend};
pub use config::AgentConfig;
pub use memory::{Experience, ReplayMemory};
pub use network::{QNetwork, QNetworkConfig};
pub use observation::{encode, observation, STATE_DIM};
pub use persistence::{load_model, save_model, ModelMetadata, DEFAULT_MODEL_PATH};
pub use trainer::{DivergenceError, QTrainer, ShapeMismatchError, TrainError};
