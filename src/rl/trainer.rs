//! Temporal-difference trainer for the Q-network
//!
//! Implements the Bellman update: action values are pulled toward
//! `reward + gamma * max Q(next_state)` (or the bare reward on terminal
//! transitions) for the taken action only, via a mean-squared-error loss and
//! a single Adam step per call.

use burn::{
    module::AutodiffModule,
    optim::{adaptor::OptimizerAdaptor, Adam, AdamConfig, GradientsParams, Optimizer},
    tensor::{backend::AutodiffBackend, ElementConversion, Tensor, TensorData},
};
use thiserror::Error;

use crate::game::Turn;
use crate::rl::memory::Experience;
use crate::rl::network::QNetwork;
use crate::rl::observation::STATE_DIM;

/// Batch components disagree in length, or a persisted architecture does not
/// match the one in memory.
#[derive(Debug, Clone, Error)]
#[error("shape mismatch in {what}: expected {expected}, got {actual}")]
pub struct ShapeMismatchError {
    pub what: String,
    pub expected: usize,
    pub actual: usize,
}

/// The loss came out non-finite; the optimizer step was withheld.
#[derive(Debug, Clone, Error)]
#[error("training diverged: loss is {loss}")]
pub struct DivergenceError {
    pub loss: f32,
}

/// Errors surfaced by a training step
#[derive(Debug, Error)]
pub enum TrainError {
    #[error(transparent)]
    ShapeMismatch(#[from] ShapeMismatchError),
    #[error(transparent)]
    Divergence(#[from] DivergenceError),
}

/// Applies Bellman updates to the Q-network parameters
pub struct QTrainer<B: AutodiffBackend> {
    network: QNetwork<B>,
    optim: OptimizerAdaptor<Adam, QNetwork<B>, B>,
    learning_rate: f64,
    gamma: f32,
    device: B::Device,
}

impl<B: AutodiffBackend> QTrainer<B> {
    /// Create a trainer around a network; `gamma` is fixed for its lifetime
    pub fn new(network: QNetwork<B>, learning_rate: f64, gamma: f32, device: B::Device) -> Self {
        Self {
            network,
            optim: AdamConfig::new().init(),
            learning_rate,
            gamma,
            device,
        }
    }

    pub fn gamma(&self) -> f32 {
        self.gamma
    }

    /// The network being trained
    pub fn network(&self) -> &QNetwork<B> {
        &self.network
    }

    /// Replace the network, e.g. with weights loaded from a checkpoint
    pub fn set_network(&mut self, network: QNetwork<B>) {
        self.network = network;
    }

    /// Train on a single experience, promoted to a batch of one
    pub fn train_one(&mut self, exp: &Experience) -> Result<f32, TrainError> {
        self.train(
            &[exp.state],
            &[exp.action],
            &[exp.reward],
            &[exp.next_state],
            &[exp.terminal],
        )
    }

    /// Train on a batch of equal-length experience columns.
    ///
    /// Computes predicted action values for `states`, overwrites the
    /// taken-action slot of a detached copy with the Bellman target, and
    /// descends the mean squared error between the two. Non-taken slots stay
    /// equal to the prediction and contribute zero gradient. Gradients are
    /// computed fresh on every call.
    pub fn train(
        &mut self,
        states: &[[f32; STATE_DIM]],
        actions: &[Turn],
        rewards: &[f32],
        next_states: &[[f32; STATE_DIM]],
        terminals: &[bool],
    ) -> Result<f32, TrainError> {
        if states.is_empty() {
            return Err(ShapeMismatchError {
                what: "states".to_string(),
                expected: 1,
                actual: 0,
            }
            .into());
        }

        let n = states.len();
        check_len("actions", n, actions.len())?;
        check_len("rewards", n, rewards.len())?;
        check_len("next_states", n, next_states.len())?;
        check_len("terminals", n, terminals.len())?;

        let states_t = self.batch_tensor::<B>(states);

        // Max action value of each successor state, without gradient tracking
        let next_t = self.batch_tensor::<B::InnerBackend>(next_states);
        let next_q = self.network.valid().forward(next_t).into_data();
        let next_q = next_q
            .as_slice::<f32>()
            .expect("next-state action values are f32");

        let pred = self.network.forward(states_t);
        let pred_data = pred.to_data();
        let pred_values = pred_data
            .as_slice::<f32>()
            .expect("predicted action values are f32");

        let targets = bellman_targets(pred_values, next_q, actions, rewards, terminals, self.gamma);
        let target_t: Tensor<B, 2> = Tensor::from_data(
            TensorData::new(targets, [n, Turn::COUNT]),
            &self.device,
        );

        let diff = pred - target_t;
        let loss = (diff.clone() * diff).mean();

        let loss_value = loss.clone().into_scalar().elem::<f32>();
        if !loss_value.is_finite() {
            return Err(DivergenceError { loss: loss_value }.into());
        }

        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &self.network);
        self.network = self
            .optim
            .step(self.learning_rate, self.network.clone(), grads);

        Ok(loss_value)
    }

    /// Stack state rows into a `[n, STATE_DIM]` tensor on the given backend
    fn batch_tensor<Back>(&self, rows: &[[f32; STATE_DIM]]) -> Tensor<Back, 2>
    where
        Back: burn::tensor::backend::Backend<Device = B::Device>,
    {
        let flat: Vec<f32> = rows.iter().flatten().copied().collect();
        Tensor::from_data(TensorData::new(flat, [rows.len(), STATE_DIM]), &self.device)
    }
}

/// Compute Bellman targets for a flattened `[n, Turn::COUNT]` prediction.
///
/// Every row starts as a copy of the prediction; only the taken-action slot
/// is replaced, by `reward` for terminal transitions and by
/// `reward + gamma * max(next_values row)` otherwise.
fn bellman_targets(
    pred: &[f32],
    next_values: &[f32],
    actions: &[Turn],
    rewards: &[f32],
    terminals: &[bool],
    gamma: f32,
) -> Vec<f32> {
    let mut targets = pred.to_vec();

    for i in 0..actions.len() {
        let row = &next_values[i * Turn::COUNT..(i + 1) * Turn::COUNT];
        let mut q = rewards[i];
        if !terminals[i] {
            let best_next = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            q += gamma * best_next;
        }
        targets[i * Turn::COUNT + actions[i].index()] = q;
    }

    targets
}

fn check_len(what: &str, expected: usize, actual: usize) -> Result<(), ShapeMismatchError> {
    if expected != actual {
        return Err(ShapeMismatchError {
            what: what.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}
