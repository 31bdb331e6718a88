//! Uncompressed frame stream for piping into an encoder or another process.
//!
//! Each record is a little-endian header followed by the HWC RGB bytes:
//!
//! ```text
//! magic     4  b"LWFR"
//! width     u32
//! height    u32
//! channels  u8   (3)
//! order     3  b"RGB"
//! index     u64
//! position  u64  (ms)
//! loudness  f32
//! pixels    width * height * 3
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::FrameSink;
use crate::error::SinkError;
use crate::generator::Frame;

pub const RAW_MAGIC: &[u8; 4] = b"LWFR";
const CHANNEL_ORDER: &[u8; 3] = b"RGB";

pub struct RawFrameSink<W: Write> {
    writer: W,
}

impl RawFrameSink<BufWriter<File>> {
    pub fn create(path: &Path) -> Result<Self, SinkError> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> RawFrameSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> FrameSink for RawFrameSink<W> {
    fn publish(&mut self, frame: &Frame) -> Result<(), SinkError> {
        let w = &mut self.writer;
        w.write_all(RAW_MAGIC)?;
        w.write_all(&frame.width.to_le_bytes())?;
        w.write_all(&frame.height.to_le_bytes())?;
        w.write_all(&[Frame::CHANNELS as u8])?;
        w.write_all(CHANNEL_ORDER)?;
        w.write_all(&frame.meta.index.to_le_bytes())?;
        w.write_all(&frame.meta.position_ms.to_le_bytes())?;
        w.write_all(&frame.meta.loudness.to_le_bytes())?;
        w.write_all(&frame.pixels)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}
