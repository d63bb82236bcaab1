//! Checkpointing for the Q-network
//!
//! Weights go through Burn's Record system into a single file; a JSON
//! side-file carries the architecture and training metadata needed to rebuild
//! the exact same network before the weights are loaded back.

use anyhow::{Context, Result};
use burn::{
    module::Module,
    record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder},
    tensor::backend::Backend,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::rl::network::{QNetwork, QNetworkConfig};
use crate::rl::trainer::ShapeMismatchError;

/// Default checkpoint location
pub const DEFAULT_MODEL_PATH: &str = "model/model.mpk";

/// Metadata saved next to the model weights
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Architecture of the persisted network
    pub network: QNetworkConfig,

    /// Number of episodes the agent had completed
    pub episodes_trained: u32,

    /// Best score achieved when this checkpoint was written
    pub record: u32,

    /// Crate version that wrote the checkpoint
    pub version: String,
}

impl ModelMetadata {
    pub fn new(network: QNetworkConfig, episodes_trained: u32, record: u32) -> Self {
        Self {
            network,
            episodes_trained,
            record,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Save network weights and metadata.
///
/// Creates missing parent directories and overwrites any existing checkpoint
/// at `path`. Writes two files: `<path>` (weights, Burn record format) and
/// `<path>.meta.json`.
pub fn save_model<B: Backend>(
    network: &QNetwork<B>,
    metadata: &ModelMetadata,
    path: &Path,
) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
    }

    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    recorder
        .record(network.clone().into_record(), path.to_path_buf())
        .context("Failed to save network weights")?;

    let meta_path = path.with_extension("meta.json");
    let meta_json =
        serde_json::to_string_pretty(metadata).context("Failed to serialize metadata")?;
    std::fs::write(&meta_path, meta_json)
        .with_context(|| format!("Failed to write metadata to {:?}", meta_path))?;

    Ok(())
}

/// Load a previously saved network.
///
/// The architecture recorded in the metadata must match `expected`; a drifted
/// architecture fails with [`ShapeMismatchError`] before any weight is read.
pub fn load_model<B: Backend>(
    path: &Path,
    expected: &QNetworkConfig,
    device: &B::Device,
) -> Result<(QNetwork<B>, ModelMetadata)> {
    let meta_path = path.with_extension("meta.json");
    let meta_json = std::fs::read_to_string(&meta_path)
        .with_context(|| format!("Failed to read metadata from {:?}", meta_path))?;
    let metadata: ModelMetadata =
        serde_json::from_str(&meta_json).context("Failed to deserialize metadata")?;

    check_architecture(expected, &metadata.network)?;

    let mut network = metadata.network.init::<B>(device);

    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    let record = recorder
        .load(path.to_path_buf(), device)
        .with_context(|| format!("Failed to load network weights from {:?}", path))?;
    network = network.load_record(record);

    Ok((network, metadata))
}

fn check_architecture(
    expected: &QNetworkConfig,
    persisted: &QNetworkConfig,
) -> Result<(), ShapeMismatchError> {
    let dims = [
        ("state_dim", expected.state_dim, persisted.state_dim),
        ("hidden_dim", expected.hidden_dim, persisted.hidden_dim),
        ("num_actions", expected.num_actions, persisted.num_actions),
    ];

    for (what, expected, actual) in dims {
        if expected != actual {
            return Err(ShapeMismatchError {
                what: format!("persisted network {what}"),
                expected,
                actual,
            });
        }
    }

    Ok(())
}
