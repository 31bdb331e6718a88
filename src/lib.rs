//! Latentwave library - audio-reactive latent-space navigation

pub mod audio;
pub mod cli;
pub mod driver;
pub mod error;
pub mod generator;
pub mod latent;
pub mod output;
pub mod params;
pub mod rendering;
