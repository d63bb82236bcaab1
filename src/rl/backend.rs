//! Backend type aliases and device management
//!
//! NdArray is sufficient for this environment: the state vector has 11
//! elements and the network a single hidden layer, so CPU tensors win over
//! any transfer overhead.

use burn::backend::{
    ndarray::{NdArray, NdArrayDevice},
    Autodiff,
};

/// Backend type for training (with autodiff)
pub type TrainingBackend = Autodiff<NdArray<f32>>;

/// Backend type for inference (without autodiff)
pub type InferenceBackend = NdArray<f32>;

/// Get the default device for computation
pub fn default_device() -> NdArrayDevice {
    NdArrayDevice::default()
}
