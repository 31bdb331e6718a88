//! Latent-conditioned coordinate network (CPPN).
//!
//! Every output pixel is computed from its (x, y, r) coordinate plus a shared
//! embedding of the latent vector, so one forward pass renders the whole
//! image at any resolution. Weights come from a safetensors checkpoint when
//! one is configured, otherwise from the network's random initialisation.

use candle_core::{DType, Device, Tensor};
use candle_nn::{Linear, Module, VarBuilder, VarMap};
use log::{debug, info, warn};

use super::frame::ImageTensor;
use super::weights::load_checkpoint;
use super::{select_device, Generator};
use crate::error::GeneratorError;
use crate::latent::LatentVector;
use crate::params::GeneratorConfig;

const RGB: usize = 3;

pub struct CppnGenerator {
    config: GeneratorConfig,
    device: Device,
    varmap: VarMap,
    embed: Linear,
    coords: Linear,
    layers: Vec<Linear>,
    to_rgb: Linear,
    /// (x, y, r) per pixel, (pixels, 3)
    grid: Tensor,
    /// `coords` applied to `grid`; depends only on weights
    coord_features: Tensor,
}

impl CppnGenerator {
    /// Build the network on the preferred device and load weights if a
    /// checkpoint is configured. An unreadable checkpoint is logged and the
    /// random initialisation kept.
    pub fn load(config: &GeneratorConfig, seed: Option<u64>) -> Result<Self, GeneratorError> {
        let device = select_device(config.device);
        if let Some(seed) = seed {
            if let Err(e) = device.set_seed(seed) {
                debug!("Device RNG not seeded: {}", e);
            }
        }
        let mut generator = Self::build(config.clone(), device)?;

        match &config.model_path {
            Some(path) => match load_checkpoint(path, &generator.varmap, &generator.device) {
                Ok((source, report)) => info!(
                    "Loaded {:?} generator weights from {} ({} tensors)",
                    source,
                    path.display(),
                    report.loaded.len()
                ),
                Err(e) => warn!(
                    "Could not load {}: {}. Using random weights",
                    path.display(),
                    e
                ),
            },
            None => info!("No model configured, using random weights"),
        }
        generator.refresh_coordinates()?;

        Ok(generator)
    }

    /// Randomly initialised network on an explicit device
    pub fn build(config: GeneratorConfig, device: Device) -> Result<Self, GeneratorError> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let (dim, hidden) = (config.latent_dim, config.hidden_width);

        let embed = candle_nn::linear(dim, hidden, vb.pp("embed"))?;
        let coords = candle_nn::linear_no_bias(3, hidden, vb.pp("coords"))?;
        let layers = (0..config.hidden_layers)
            .map(|i| candle_nn::linear(hidden, hidden, vb.pp(format!("layers.{}", i))))
            .collect::<Result<Vec<_>, _>>()?;
        let to_rgb = candle_nn::linear(hidden, RGB, vb.pp("to_rgb"))?;

        let grid = coordinate_grid(config.image_size, &device)?;
        let coord_features = coords.forward(&grid)?;

        info!(
            "CPPN generator: {}x{} output, latent {}, hidden {}x{}, device {:?}",
            config.image_size, config.image_size, dim, config.hidden_layers, hidden, device
        );

        Ok(Self {
            config,
            device,
            varmap,
            embed,
            coords,
            layers,
            to_rgb,
            grid,
            coord_features,
        })
    }

    /// Recompute the cached coordinate projection after weights change
    pub fn refresh_coordinates(&mut self) -> Result<(), GeneratorError> {
        self.coord_features = self.coords.forward(&self.grid)?;
        Ok(())
    }

    pub fn varmap(&self) -> &VarMap {
        &self.varmap
    }

    fn forward(&self, latent: &LatentVector) -> Result<Vec<f32>, GeneratorError> {
        let z = Tensor::from_slice(latent.as_slice(), (1, latent.dim()), &self.device)?;
        let z = self.embed.forward(&z)?;

        let mut h = self.coord_features.broadcast_add(&z)?.tanh()?;
        for layer in &self.layers {
            h = layer.forward(&h)?.tanh()?;
        }
        let rgb = self.to_rgb.forward(&h)?.tanh()?;

        // (pixels, 3) → (3, pixels), flattened channel-first
        Ok(rgb.t()?.contiguous()?.flatten_all()?.to_vec1::<f32>()?)
    }
}

impl Generator for CppnGenerator {
    fn image_size(&self) -> usize {
        self.config.image_size
    }

    fn generate(&mut self, latent: &LatentVector) -> Result<ImageTensor, GeneratorError> {
        if latent.dim() != self.config.latent_dim {
            return Err(GeneratorError::LatentDim {
                expected: self.config.latent_dim,
                actual: latent.dim(),
            });
        }
        let size = self.config.image_size;
        ImageTensor::new(RGB, size, size, self.forward(latent)?)
    }
}

/// Row-major (x, y, r) for every pixel, x and y in [-1, 1]
fn coordinate_grid(size: usize, device: &Device) -> Result<Tensor, GeneratorError> {
    let axis = |i: usize| {
        if size > 1 {
            i as f32 / (size - 1) as f32 * 2.0 - 1.0
        } else {
            0.0
        }
    };

    let mut data = Vec::with_capacity(size * size * 3);
    for row in 0..size {
        let y = axis(row);
        for col in 0..size {
            let x = axis(col);
            data.extend_from_slice(&[x, y, (x * x + y * y).sqrt()]);
        }
    }
    Ok(Tensor::from_vec(data, (size * size, 3), device)?)
}
