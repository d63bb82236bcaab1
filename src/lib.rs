//! q_snake - grid snake trained by deep Q-learning
//!
//! This library provides:
//! - Core game logic (game module)
//! - Q-learning infrastructure: state encoder, Q-network, temporal-difference
//!   trainer, replay memory and agent (rl module)
//! - Training statistics (metrics module)
//! - The training loop and its observer sinks (modes module)

pub mod game;
pub mod metrics;
pub mod modes;
pub mod rl;
