//! Training mode: the Q-learning episode loop
//!
//! Drives episodes end to end: encode the state, pick an action, step the
//! simulator, train online on the fresh transition, store it, and on episode
//! end run a replay-batch update, track the record and checkpoint the network
//! whenever it improves. Runs until the configured episode budget is
//! exhausted, or indefinitely when none is set.

use anyhow::{anyhow, Context, Result};
use burn::tensor::backend::AutodiffBackend;
use log::info;
use std::path::PathBuf;

use crate::game::{GameConfig, GameEngine, GameState};
use crate::metrics::TrainingStats;
use crate::modes::sink::{FrameSink, ScoreSink};
use crate::rl::{
    encode, load_model, save_model, Agent, AgentConfig, Experience, ModelMetadata, QNetworkConfig,
    DEFAULT_MODEL_PATH,
};

/// Configuration for training mode
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Number of episodes to train; `None` runs until interrupted
    pub num_episodes: Option<usize>,

    /// Where record-breaking checkpoints are written
    pub save_path: PathBuf,

    /// Print a progress summary every N episodes
    pub log_frequency: usize,

    /// Seed for agent exploration and food placement; `None` uses entropy
    pub seed: Option<u64>,

    /// Game configuration (grid size, rewards, stall guard)
    pub game_config: GameConfig,

    /// Agent hyperparameters
    pub agent_config: AgentConfig,
}

impl TrainConfig {
    pub fn new(num_episodes: Option<usize>) -> Self {
        Self {
            num_episodes,
            save_path: PathBuf::from(DEFAULT_MODEL_PATH),
            log_frequency: 50,
            seed: None,
            game_config: GameConfig::default(),
            agent_config: AgentConfig::default(),
        }
    }
}

/// Training mode for the Q-learning agent
pub struct TrainMode<B: AutodiffBackend> {
    agent: Agent<B>,
    engine: GameEngine,
    state: GameState,
    stats: TrainingStats,
    config: TrainConfig,
}

impl<B: AutodiffBackend> TrainMode<B> {
    /// Create a training mode; validates both configurations up front
    pub fn new(config: TrainConfig, device: B::Device) -> Result<Self> {
        config
            .game_config
            .validate()
            .map_err(|e| anyhow!("invalid game config: {e}"))?;
        config
            .agent_config
            .validate()
            .map_err(|e| anyhow!("invalid agent config: {e}"))?;

        let agent = match config.seed {
            Some(seed) => Agent::seeded(config.agent_config.clone(), device, seed),
            None => Agent::new(config.agent_config.clone(), device),
        };

        let mut engine = match config.seed {
            Some(seed) => GameEngine::seeded(config.game_config.clone(), seed),
            None => GameEngine::new(config.game_config.clone()),
        };
        let state = engine.reset().context("Failed to set up initial episode")?;

        Ok(Self {
            agent,
            engine,
            state,
            stats: TrainingStats::new(100),
            config,
        })
    }

    /// Resume from a checkpoint: restores weights and the episode counter,
    /// so the exploration schedule continues where it left off
    pub fn resume_from(&mut self, path: &std::path::Path) -> Result<()> {
        let expected = QNetworkConfig::new(self.config.agent_config.hidden_dim);
        let device = self.agent.device().clone();

        let (network, metadata) = load_model::<B>(path, &expected, &device)?;
        self.agent.set_network(network);
        self.agent.set_episodes(metadata.episodes_trained);

        info!(
            "resumed from {:?} at episode {} (record {})",
            path, metadata.episodes_trained, metadata.record
        );
        Ok(())
    }

    pub fn stats(&self) -> &TrainingStats {
        &self.stats
    }

    /// Run the training loop, reporting each frame and each finished episode
    /// to the sinks
    pub fn run(&mut self, frames: &mut dyn FrameSink, scores: &mut dyn ScoreSink) -> Result<()> {
        self.print_header();

        loop {
            if let Some(limit) = self.config.num_episodes {
                if self.stats.episodes() >= limit {
                    break;
                }
            }

            let score = self.run_episode(frames)?;
            self.finish_episode(score, scores)?;
        }

        println!("\nTraining complete.");
        println!("{}", self.stats.format_summary());

        Ok(())
    }

    /// Play one episode to termination, training online on every transition
    fn run_episode(&mut self, frames: &mut dyn FrameSink) -> Result<u32> {
        loop {
            let observed = encode(&self.state);
            let action = self.agent.select_action(&observed);

            let result = self.engine.step(&mut self.state, action)?;
            let next_observed = encode(&self.state);

            let exp = Experience {
                state: observed,
                action,
                reward: result.reward,
                next_state: next_observed,
                terminal: result.terminated,
            };

            let loss = self.agent.train_short(&exp)?;
            self.stats.record_loss(loss);
            self.agent.remember(exp);

            frames.frame(&self.state);

            if result.terminated {
                return Ok(self.state.score);
            }
        }
    }

    /// Episode epilogue: reset, decay exploration, replay training, record
    /// tracking, checkpointing and reporting
    fn finish_episode(&mut self, score: u32, scores: &mut dyn ScoreSink) -> Result<()> {
        self.state = self
            .engine
            .reset()
            .context("Failed to reset for next episode")?;
        self.agent.increment_episode();

        let loss = self.agent.train_long()?;
        self.stats.record_loss(loss);

        let new_record = self.stats.record_episode(score);
        if new_record {
            self.save_checkpoint()?;
        }

        println!(
            "Game {} Score {} Record: {}",
            self.agent.episodes(),
            score,
            self.stats.record()
        );

        if self.config.log_frequency > 0 && self.stats.episodes() % self.config.log_frequency == 0 {
            println!("  {}", self.stats.format_summary());
        }

        scores.publish(self.stats.scores(), self.stats.mean_scores());

        Ok(())
    }

    /// Persist the current network alongside its training metadata
    fn save_checkpoint(&self) -> Result<()> {
        let metadata = ModelMetadata::new(
            QNetworkConfig::new(self.config.agent_config.hidden_dim),
            self.agent.episodes(),
            self.stats.record(),
        );

        save_model(self.agent.network(), &metadata, &self.config.save_path)
            .with_context(|| format!("Failed to save checkpoint to {:?}", self.config.save_path))?;

        info!("checkpoint saved: {:?}", self.config.save_path);
        Ok(())
    }

    fn print_header(&self) {
        println!("{}", "=".repeat(60));
        println!("Q-learning training - q_snake");
        println!("{}", "=".repeat(60));
        match self.config.num_episodes {
            Some(n) => println!("Episodes: {}", n),
            None => println!("Episodes: unlimited (interrupt to stop)"),
        }
        println!(
            "Grid: {}x{} cells",
            self.config.game_config.grid_width, self.config.game_config.grid_height
        );
        println!("Agent:");
        println!(
            "  Learning rate: {}",
            self.config.agent_config.learning_rate
        );
        println!("  Gamma: {}", self.config.agent_config.gamma);
        println!(
            "  Exploration base: {}",
            self.config.agent_config.exploration_base
        );
        println!("  Replay memory: {}", self.config.agent_config.max_memory);
        println!("  Batch size: {}", self.config.agent_config.batch_size);
        println!("  Hidden width: {}", self.config.agent_config.hidden_dim);
        println!("Save path: {:?}", self.config.save_path);
        println!("{}", "=".repeat(60));
        println!();
    }
}
