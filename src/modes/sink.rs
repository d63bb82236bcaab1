//! Observer sinks for the training loop
//!
//! Rendering and plotting live outside the core. The loop only pushes data
//! through these traits: a frame per simulator step, and the cumulative score
//! history per completed episode. Sinks are fire-and-forget; nothing they
//! return is consumed.

use crate::game::GameState;

/// Receives the simulator state after every step, e.g. for rendering
pub trait FrameSink {
    fn frame(&mut self, state: &GameState);
}

/// Receives `(scores, mean_scores)` once per completed episode, e.g. for
/// plotting training progress
pub trait ScoreSink {
    fn publish(&mut self, scores: &[u32], mean_scores: &[f32]);
}

/// Default frame sink: does nothing
#[derive(Default)]
pub struct NoopFrameSink;

impl FrameSink for NoopFrameSink {
    fn frame(&mut self, _state: &GameState) {}
}

/// Default score sink: does nothing
#[derive(Default)]
pub struct NoopScoreSink;

impl ScoreSink for NoopScoreSink {
    fn publish(&mut self, _scores: &[u32], _mean_scores: &[f32]) {}
}

/// Prints the latest score and running mean to stdout
#[derive(Default)]
pub struct ConsoleScoreSink;

impl ScoreSink for ConsoleScoreSink {
    fn publish(&mut self, scores: &[u32], mean_scores: &[f32]) {
        if let (Some(score), Some(mean)) = (scores.last(), mean_scores.last()) {
            println!(
                "episode {}: score {} (mean {:.2})",
                scores.len(),
                score,
                mean
            );
        }
    }
}
