use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use q_snake::game::GameConfig;
use q_snake::modes::{ConsoleScoreSink, NoopFrameSink, NoopScoreSink, TrainConfig, TrainMode};
use q_snake::rl::{default_device, AgentConfig, TrainingBackend, DEFAULT_MODEL_PATH};

#[derive(Parser)]
#[command(name = "q_snake")]
#[command(version, about = "Snake trained by deep Q-learning")]
struct Cli {
    /// Execution mode
    #[arg(long, default_value = "train")]
    mode: Mode,

    /// Grid width in cells
    #[arg(long, default_value = "32")]
    width: usize,

    /// Grid height in cells
    #[arg(long, default_value = "24")]
    height: usize,

    /// Number of episodes to run; omit to train until interrupted
    #[arg(long)]
    episodes: Option<usize>,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Checkpoint path for record-breaking models
    #[arg(long, default_value = DEFAULT_MODEL_PATH)]
    model: PathBuf,

    /// Resume weights and episode counter from the checkpoint before training
    #[arg(long)]
    resume: bool,

    /// Echo the cumulative score history after every episode
    #[arg(long)]
    plot_scores: bool,

    /// Learning rate for the Adam optimizer
    #[arg(long, default_value = "0.001")]
    learning_rate: f64,

    /// Discount factor
    #[arg(long, default_value = "0.9")]
    gamma: f32,

    /// Hidden layer width of the Q-network
    #[arg(long, default_value = "256")]
    hidden: usize,
}

#[derive(Clone, ValueEnum)]
enum Mode {
    /// Train the Q-learning agent
    Train,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut train_config = TrainConfig::new(cli.episodes);
    train_config.save_path = cli.model.clone();
    train_config.seed = cli.seed;
    train_config.game_config = GameConfig::new(cli.width, cli.height);
    train_config.agent_config = AgentConfig {
        learning_rate: cli.learning_rate,
        gamma: cli.gamma,
        hidden_dim: cli.hidden,
        ..Default::default()
    };

    match cli.mode {
        Mode::Train => {
            let mut mode = TrainMode::<TrainingBackend>::new(train_config, default_device())?;
            if cli.resume {
                mode.resume_from(&cli.model)?;
            }
            if cli.plot_scores {
                mode.run(&mut NoopFrameSink, &mut ConsoleScoreSink)?;
            } else {
                mode.run(&mut NoopFrameSink, &mut NoopScoreSink)?;
            }
        }
    }

    Ok(())
}
