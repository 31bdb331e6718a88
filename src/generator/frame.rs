//! Generator output → displayable pixels.

use crate::error::GeneratorError;

/// Channel-first float image as produced by a generator, nominally in [-1, 1]
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    pub channels: usize,
    pub height: usize,
    pub width: usize,
    /// CHW layout
    pub data: Vec<f32>,
}

impl ImageTensor {
    pub fn new(
        channels: usize,
        height: usize,
        width: usize,
        data: Vec<f32>,
    ) -> Result<Self, GeneratorError> {
        if data.len() != channels * height * width {
            return Err(GeneratorError::TensorShape {
                channels,
                height,
                width,
                actual: data.len(),
            });
        }
        Ok(Self {
            channels,
            height,
            width,
            data,
        })
    }
}

/// Per-frame metadata carried to sinks
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameMeta {
    /// Sequence number of published frames
    pub index: u64,
    pub position_ms: u64,
    pub loudness: f32,
}

/// Channel-last RGB8 image
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// HWC, 3 bytes per pixel
    pub pixels: Vec<u8>,
    pub meta: FrameMeta,
}

impl Frame {
    pub const CHANNELS: usize = 3;

    /// All-black frame
    pub fn black(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * Self::CHANNELS],
            meta: FrameMeta::default(),
        }
    }

    pub fn with_meta(mut self, meta: FrameMeta) -> Self {
        self.meta = meta;
        self
    }

    /// Pixels expanded to RGBA8 (opaque) for GPU upload
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut rgba = Vec::with_capacity(self.pixels.len() / 3 * 4);
        for px in self.pixels.chunks_exact(Self::CHANNELS) {
            rgba.extend_from_slice(&[px[0], px[1], px[2], 255]);
        }
        rgba
    }
}

/// [-1, 1] → [0, 255]; non-finite values become 0 first
pub fn to_byte(value: f32) -> u8 {
    let value = if value.is_finite() { value } else { 0.0 };
    ((value.clamp(-1.0, 1.0) + 1.0) / 2.0 * 255.0) as u8
}

/// Convert a CHW tensor into a channel-last RGB frame.
///
/// Single-channel tensors are broadcast to grey; channels past the third are
/// ignored.
pub fn tensor_to_frame(tensor: &ImageTensor) -> Frame {
    let (h, w, c) = (tensor.height, tensor.width, tensor.channels);
    let plane = h * w;
    let mut pixels = vec![0u8; plane * Frame::CHANNELS];

    if c > 0 {
        for (i, px) in pixels.chunks_exact_mut(Frame::CHANNELS).enumerate() {
            for (ch, out) in px.iter_mut().enumerate() {
                let src = ch.min(c - 1);
                *out = to_byte(tensor.data[src * plane + i]);
            }
        }
    }

    Frame {
        width: w as u32,
        height: h as u32,
        pixels,
        meta: FrameMeta::default(),
    }
}
