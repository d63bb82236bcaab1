//! Feature-vector observations for the Q-learning agent
//!
//! The simulator state is compressed into 11 bits rather than a full grid
//! image: three danger indicators relative to the heading, a one-hot heading,
//! and four food-direction indicators. The derivation is stateless and
//! recomputed at every decision point.

use burn::tensor::{backend::Backend, Tensor, TensorData};

use crate::game::{Direction, GameState, Turn};

/// Length of the encoded feature vector
pub const STATE_DIM: usize = 11;

/// Encode the simulator state into the fixed 11-element feature vector:
///
/// ```text
/// [danger straight, danger right, danger left,
///  dir left, dir right, dir up, dir down,
///  food left, food right, food up, food down]
/// ```
///
/// Danger bits probe the cell one step along the (possibly turned) heading.
/// Food bits are strict comparisons against the head, so an aligned
/// coordinate yields false on both of its bits.
pub fn encode(state: &GameState) -> [f32; STATE_DIM] {
    let head = state.snake.head();
    let dir = state.snake.direction;

    let danger = |turn: Turn| -> f32 {
        let probe = head.moved_in_direction(dir.turned(turn));
        bit(state.is_collision(probe))
    };

    [
        danger(Turn::Straight),
        danger(Turn::Right),
        danger(Turn::Left),
        bit(dir == Direction::Left),
        bit(dir == Direction::Right),
        bit(dir == Direction::Up),
        bit(dir == Direction::Down),
        bit(state.food.x < head.x),
        bit(state.food.x > head.x),
        bit(state.food.y < head.y),
        bit(state.food.y > head.y),
    ]
}

/// Encode the state as a rank-1 tensor on the given device
pub fn observation<B: Backend>(state: &GameState, device: &B::Device) -> Tensor<B, 1> {
    Tensor::from_data(TensorData::new(encode(state).to_vec(), [STATE_DIM]), device)
}

fn bit(b: bool) -> f32 {
    if b {
        1.0
    } else {
        0.0
    }
}
