//! Checkpoint weight selection and non-strict loading.
//!
//! Checkpoints store the whole GAN: discriminator, base generator (`G.`), and
//! the exponential-moving-average generator (`GE.`), optionally under a `GAN.`
//! namespace. Only one generator's weights are kept, prefix stripped.

use std::collections::HashMap;
use std::path::Path;

use candle_core::{Device, Tensor};
use candle_nn::VarMap;
use log::{debug, info, warn};

use crate::error::GeneratorError;

const NAMESPACE: &str = "GAN.";
const EMA_PREFIX: &str = "GE.";
const BASE_PREFIX: &str = "G.";

/// Which generator the weights came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightSource {
    /// Exponential-moving-average generator
    Ema,
    /// Raw trained generator
    Base,
}

/// Pick the generator weights out of a full checkpoint.
///
/// EMA entries win whenever at least one is present; otherwise base entries
/// are used, excluding mixed-precision `scaler` state.
pub fn select_generator_weights<T>(
    checkpoint: HashMap<String, T>,
) -> (WeightSource, HashMap<String, T>) {
    let entries: Vec<(String, T)> = checkpoint
        .into_iter()
        .map(|(name, value)| match name.strip_prefix(NAMESPACE) {
            Some(inner) => (inner.to_string(), value),
            None => (name, value),
        })
        .collect();

    let has_ema = entries.iter().any(|(name, _)| name.starts_with(EMA_PREFIX));
    let (source, prefix) = if has_ema {
        (WeightSource::Ema, EMA_PREFIX)
    } else {
        (WeightSource::Base, BASE_PREFIX)
    };

    let selected = entries
        .into_iter()
        .filter(|(name, _)| source == WeightSource::Ema || !name.contains("scaler"))
        .filter_map(|(name, value)| {
            name.strip_prefix(prefix)
                .map(|stripped| (stripped.to_string(), value))
        })
        .collect();

    (source, selected)
}

/// What a non-strict load did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: Vec<String>,
    /// Present in both, shapes differ; model keeps its initial value
    pub shape_mismatch: Vec<String>,
    /// Model parameters absent from the checkpoint
    pub missing: Vec<String>,
    /// Checkpoint entries the model has no parameter for
    pub unexpected: Vec<String>,
}

/// Copy matching tensors into the model's variables, skipping anything that
/// does not fit.
pub fn apply_weights(
    varmap: &VarMap,
    weights: &HashMap<String, Tensor>,
) -> Result<LoadReport, GeneratorError> {
    let mut report = LoadReport::default();
    let vars = varmap
        .data()
        .lock()
        .map_err(|_| candle_core::Error::Msg("variable map lock poisoned".to_string()))?;

    for (name, var) in vars.iter() {
        match weights.get(name) {
            Some(tensor) if tensor.dims() == var.dims() => {
                let tensor = tensor.to_device(var.device())?.to_dtype(var.dtype())?;
                var.set(&tensor)?;
                report.loaded.push(name.clone());
            }
            Some(tensor) => {
                warn!(
                    "Skipping {}: checkpoint shape {:?}, model shape {:?}",
                    name,
                    tensor.dims(),
                    var.dims()
                );
                report.shape_mismatch.push(name.clone());
            }
            None => report.missing.push(name.clone()),
        }
    }

    report.unexpected = weights
        .keys()
        .filter(|name| !vars.contains_key(*name))
        .cloned()
        .collect();

    report.loaded.sort();
    report.shape_mismatch.sort();
    report.missing.sort();
    report.unexpected.sort();
    Ok(report)
}

/// Read a safetensors checkpoint, select a generator, and load it non-strictly
pub fn load_checkpoint(
    path: &Path,
    varmap: &VarMap,
    device: &Device,
) -> Result<(WeightSource, LoadReport), GeneratorError> {
    let checkpoint = candle_core::safetensors::load(path, device)?;
    let (source, weights) = select_generator_weights(checkpoint);
    match source {
        WeightSource::Ema => info!("EMA weights (GE) found and selected"),
        WeightSource::Base => info!("EMA weights not found, using base generator weights (G)"),
    }

    let report = apply_weights(varmap, &weights)?;
    if !report.missing.is_empty() {
        warn!("{} model parameters not in checkpoint", report.missing.len());
    }
    if !report.unexpected.is_empty() {
        debug!("Ignoring checkpoint entries: {:?}", report.unexpected);
    }
    Ok((source, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::DType;
    use candle_nn::VarBuilder;

    fn checkpoint(names: &[&str]) -> HashMap<String, u32> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.to_string(), i as u32))
            .collect()
    }

    fn sorted_keys<T>(map: &HashMap<String, T>) -> Vec<String> {
        let mut keys: Vec<String> = map.keys().cloned().collect();
        keys.sort();
        keys
    }

    #[test]
    fn test_ema_preferred() {
        let ckpt = checkpoint(&["G.embed.weight", "GE.embed.weight", "D.conv.weight"]);
        let (source, weights) = select_generator_weights(ckpt);

        assert_eq!(source, WeightSource::Ema);
        assert_eq!(sorted_keys(&weights), vec!["embed.weight"]);
        // Value comes from the GE entry (index 1)
        assert_eq!(weights["embed.weight"], 1);
    }

    #[test]
    fn test_base_fallback_skips_scaler() {
        let ckpt = checkpoint(&[
            "G.embed.weight",
            "G.to_rgb.bias",
            "G.scaler.scale",
            "D.conv.weight",
        ]);
        let (source, weights) = select_generator_weights(ckpt);

        assert_eq!(source, WeightSource::Base);
        assert_eq!(sorted_keys(&weights), vec!["embed.weight", "to_rgb.bias"]);
    }

    #[test]
    fn test_namespace_stripped() {
        let ckpt = checkpoint(&["GAN.GE.layers.0.weight", "GAN.D.x"]);
        let (source, weights) = select_generator_weights(ckpt);

        assert_eq!(source, WeightSource::Ema);
        assert_eq!(sorted_keys(&weights), vec!["layers.0.weight"]);
    }

    #[test]
    fn test_apply_weights_non_strict() {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let _a = candle_nn::linear(3, 2, vb.pp("a")).unwrap();
        let _b = candle_nn::linear_no_bias(2, 2, vb.pp("b")).unwrap();

        let mut weights = HashMap::new();
        weights.insert(
            "a.weight".to_string(),
            Tensor::ones((2, 3), DType::F32, &device).unwrap(),
        );
        // Wrong shape: model has (2, 2)
        weights.insert(
            "b.weight".to_string(),
            Tensor::ones((4, 4), DType::F32, &device).unwrap(),
        );
        weights.insert(
            "extra.weight".to_string(),
            Tensor::ones(1, DType::F32, &device).unwrap(),
        );

        let report = apply_weights(&varmap, &weights).unwrap();
        assert_eq!(report.loaded, vec!["a.weight"]);
        assert_eq!(report.shape_mismatch, vec!["b.weight"]);
        assert_eq!(report.missing, vec!["a.bias"]);
        assert_eq!(report.unexpected, vec!["extra.weight"]);

        let vars = varmap.data().lock().unwrap();
        let loaded: Vec<Vec<f32>> = vars["a.weight"].as_tensor().to_vec2().unwrap();
        assert_eq!(loaded, vec![vec![1.0; 3]; 2]);
        let kept: Vec<Vec<f32>> = vars["b.weight"].as_tensor().to_vec2().unwrap();
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_checkpoint_file_round_trip() {
        let device = Device::Cpu;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.safetensors");

        let mut tensors = HashMap::new();
        tensors.insert(
            "G.head.weight".to_string(),
            Tensor::full(0.25f32, (2, 2), &device).unwrap(),
        );
        candle_core::safetensors::save(&tensors, &path).unwrap();

        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let _head = candle_nn::linear_no_bias(2, 2, vb.pp("head")).unwrap();

        let (source, report) = load_checkpoint(&path, &varmap, &device).unwrap();
        assert_eq!(source, WeightSource::Base);
        assert_eq!(report.loaded, vec!["head.weight"]);
    }

    #[test]
    fn test_missing_checkpoint_is_an_error() {
        let varmap = VarMap::new();
        let path = Path::new("/nonexistent/model.safetensors");
        assert!(load_checkpoint(path, &varmap, &Device::Cpu).is_err());
    }
}
