//! Image generation from latent vectors.
//!
//! The generator is a boundary: anything that maps a latent to a CHW float
//! image can drive the display. The built-in implementation is a candle
//! coordinate network; post-processing to bytes lives in `frame`.

mod cppn;
mod frame;
mod weights;

use candle_core::Device;
use log::{info, warn};

use crate::error::GeneratorError;
use crate::latent::LatentVector;
use crate::params::DevicePreference;

// Re-export public types
pub use cppn::CppnGenerator;
pub use frame::{tensor_to_frame, to_byte, Frame, FrameMeta, ImageTensor};
pub use weights::{
    apply_weights, load_checkpoint, select_generator_weights, LoadReport, WeightSource,
};

/// Maps a latent vector to a channel-first image in [-1, 1]
pub trait Generator {
    /// Side length of the square output
    fn image_size(&self) -> usize;

    fn generate(&mut self, latent: &LatentVector) -> Result<ImageTensor, GeneratorError>;
}

/// Resolve the compute device. GPU is used when built with the `cuda`
/// feature and a device is present.
pub fn select_device(preference: DevicePreference) -> Device {
    match preference {
        DevicePreference::Cpu => {
            info!("Generator device: CPU (forced)");
            Device::Cpu
        }
        DevicePreference::Auto => match Device::cuda_if_available(0) {
            Ok(device) if device.is_cuda() => {
                info!("Generator device: CUDA 0");
                device
            }
            Ok(device) => {
                warn!("No GPU available, generator running on CPU");
                device
            }
            Err(e) => {
                warn!("GPU initialisation failed ({}), generator running on CPU", e);
                Device::Cpu
            }
        },
    }
}
