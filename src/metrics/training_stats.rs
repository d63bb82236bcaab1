//! Training statistics tracking
//!
//! Keeps the cumulative per-episode score history the plotting sink consumes
//! (scores plus running mean over all episodes), the best score so far, and a
//! rolling window of recent losses for progress reporting.

use std::collections::VecDeque;

/// Episode-level training statistics
#[derive(Debug, Clone)]
pub struct TrainingStats {
    /// Score of every completed episode, in order
    scores: Vec<u32>,

    /// Running mean score after each episode
    mean_scores: Vec<f32>,

    /// Sum of all scores, feeding the running mean
    total_score: u64,

    /// Best episode score observed so far
    record: u32,

    /// Recent training losses (rolling window)
    losses: VecDeque<f32>,

    /// Window size for the rolling loss average
    window_size: usize,
}

impl TrainingStats {
    /// Create a tracker keeping `window_size` recent losses
    pub fn new(window_size: usize) -> Self {
        Self {
            scores: Vec::new(),
            mean_scores: Vec::new(),
            total_score: 0,
            record: 0,
            losses: VecDeque::with_capacity(window_size),
            window_size,
        }
    }

    /// Record a completed episode; returns true when the score sets a new
    /// record
    pub fn record_episode(&mut self, score: u32) -> bool {
        self.scores.push(score);
        self.total_score += u64::from(score);
        self.mean_scores
            .push(self.total_score as f32 / self.scores.len() as f32);

        if score > self.record {
            self.record = score;
            return true;
        }
        false
    }

    /// Record a training loss
    pub fn record_loss(&mut self, loss: f32) {
        if self.losses.len() == self.window_size {
            self.losses.pop_front();
        }
        self.losses.push_back(loss);
    }

    /// All episode scores, oldest first
    pub fn scores(&self) -> &[u32] {
        &self.scores
    }

    /// Running mean score after each episode
    pub fn mean_scores(&self) -> &[f32] {
        &self.mean_scores
    }

    /// Best episode score so far
    pub fn record(&self) -> u32 {
        self.record
    }

    /// Number of completed episodes
    pub fn episodes(&self) -> usize {
        self.scores.len()
    }

    /// Mean loss over the rolling window
    pub fn mean_loss(&self) -> f32 {
        if self.losses.is_empty() {
            return 0.0;
        }
        self.losses.iter().sum::<f32>() / self.losses.len() as f32
    }

    /// One-line summary for progress logging
    pub fn format_summary(&self) -> String {
        let mean = self.mean_scores.last().copied().unwrap_or(0.0);
        format!(
            "episodes: {} | mean score: {:.2} | record: {} | loss: {:.4}",
            self.episodes(),
            mean,
            self.record,
            self.mean_loss()
        )
    }
}
