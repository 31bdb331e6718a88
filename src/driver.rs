//! Fixed-interval frame scheduling and the per-tick pipeline.
//!
//! One tick: playback snapshot → audio chunk → loudness → latent step →
//! generator → byte frame → sinks. `on_tick` takes `&mut self`, so ticks
//! are serialized by construction.

use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::audio::{FeatureExtractor, PlaybackState, Transport};
use crate::error::GeneratorError;
use crate::generator::{tensor_to_frame, CppnGenerator, Frame, FrameMeta, Generator};
use crate::latent::{build_strategy, make_rng, LatentStrategy, StrategyKind};
use crate::output::FrameSink;
use crate::params::Settings;

/// Fixed-period deadline tracker. Missed deadlines are dropped, not queued.
#[derive(Debug, Clone)]
pub struct Ticker {
    interval: Duration,
    next: Instant,
}

impl Ticker {
    /// First tick is due immediately
    pub fn new(interval: Duration, start: Instant) -> Self {
        Self {
            interval,
            next: start,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Next deadline, for `ControlFlow::WaitUntil`
    pub fn deadline(&self) -> Instant {
        self.next
    }

    /// True once per elapsed deadline
    pub fn due(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }
        self.next += self.interval;
        if self.next <= now {
            // Fell behind by at least a whole period: skip ahead
            self.next = now + self.interval;
        }
        true
    }
}

/// Allows one event per interval
#[derive(Debug, Clone)]
struct RateLimit {
    interval: Duration,
    last: Option<Instant>,
    suppressed: u64,
}

impl RateLimit {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
            suppressed: 0,
        }
    }

    /// Returns the number of events suppressed since the last allowed one
    fn allow(&mut self, now: Instant) -> Option<u64> {
        match self.last {
            Some(last) if now.duration_since(last) < self.interval => {
                self.suppressed += 1;
                None
            }
            _ => {
                self.last = Some(now);
                Some(std::mem::take(&mut self.suppressed))
            }
        }
    }
}

/// Owns the navigator and generator; everything the tick path mutates
pub struct FrameDriver {
    extractor: FeatureExtractor,
    strategy: Box<dyn LatentStrategy>,
    generator: Box<dyn Generator>,
    sinks: Vec<Box<dyn FrameSink>>,
    frames_published: u64,
    last_frame: Option<Frame>,
    inference_log: RateLimit,
    sink_log: RateLimit,
}

impl FrameDriver {
    pub fn new(
        extractor: FeatureExtractor,
        strategy: Box<dyn LatentStrategy>,
        generator: Box<dyn Generator>,
    ) -> Self {
        Self {
            extractor,
            strategy,
            generator,
            sinks: Vec::new(),
            frames_published: 0,
            last_frame: None,
            inference_log: RateLimit::new(Duration::from_secs(1)),
            sink_log: RateLimit::new(Duration::from_secs(1)),
        }
    }

    /// Driver with the built-in generator and the selected strategy
    pub fn from_settings(
        settings: &Settings,
        kind: StrategyKind,
        seed: Option<u64>,
    ) -> Result<Self, GeneratorError> {
        let strategy = build_strategy(
            kind,
            &settings.navigator,
            &settings.volume,
            make_rng(seed),
        );
        let generator = CppnGenerator::load(&settings.render, seed)?;
        let extractor = FeatureExtractor::new(settings.audio.window_size.samples());
        info!(
            "Navigator: {} strategy, latent dim {}, {} Hz",
            strategy.name(),
            strategy.latent_dim(),
            settings.fps.hz()
        );
        Ok(Self::new(extractor, strategy, Box::new(generator)))
    }

    pub fn add_sink(&mut self, sink: Box<dyn FrameSink>) {
        self.sinks.push(sink);
    }

    /// For installing the decoded waveform
    pub fn extractor_mut(&mut self) -> &mut FeatureExtractor {
        &mut self.extractor
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn frames_published(&self) -> u64 {
        self.frames_published
    }

    /// Most recent frame, kept for redraws while paused
    pub fn last_frame(&self) -> Option<&Frame> {
        self.last_frame.as_ref()
    }

    /// Run one tick. Returns the published frame, or `None` when playback is
    /// not progressing and the tick was skipped.
    pub fn on_tick(&mut self, playback: &PlaybackState) -> Option<&Frame> {
        if !playback.is_playing() {
            return None;
        }
        let now = Instant::now();

        let chunk = self.extractor.current_chunk(playback.position_ms);
        let loudness = chunk.loudness();
        let latent = self.strategy.step(loudness);

        let size = self.generator.image_size() as u32;
        let frame = match self.generator.generate(latent) {
            Ok(tensor) => tensor_to_frame(&tensor),
            Err(e) => {
                if let Some(suppressed) = self.inference_log.allow(now) {
                    warn!(
                        "Generation failed: {} ({} similar suppressed)",
                        e, suppressed
                    );
                }
                Frame::black(size, size)
            }
        };
        let frame = frame.with_meta(FrameMeta {
            index: self.frames_published,
            position_ms: playback.position_ms,
            loudness,
        });

        for sink in &mut self.sinks {
            if let Err(e) = sink.publish(&frame) {
                if let Some(suppressed) = self.sink_log.allow(now) {
                    warn!(
                        "Frame sink write failed: {} ({} similar suppressed)",
                        e, suppressed
                    );
                }
            }
        }

        debug!(
            "Frame {} at {} ms, loudness {:.4}",
            self.frames_published, playback.position_ms, loudness
        );
        self.frames_published += 1;
        self.last_frame = Some(frame);
        self.last_frame.as_ref()
    }

    /// Flush and close every sink
    pub fn finish(&mut self) {
        for sink in &mut self.sinks {
            if let Err(e) = sink.finish() {
                warn!("Failed to finalise frame sink: {}", e);
            }
        }
    }
}

/// Render a whole file without a window, advancing a synthetic playback
/// clock by one tick interval per frame. Returns the number of frames.
pub fn render_offline(driver: &mut FrameDriver, duration_ms: u64, interval: Duration) -> u64 {
    if duration_ms == 0 || interval.is_zero() {
        warn!("Nothing to render: empty audio or zero tick interval");
        driver.finish();
        return 0;
    }

    let mut transport = Transport::new();
    transport.set_duration_ms(duration_ms);
    let start = Instant::now();
    transport.play_at(start);

    let mut now = start;
    let mut next_report_ms = 0;
    while !transport.update_at(now) {
        let playback = transport.snapshot_at(now);
        driver.on_tick(&playback);
        if playback.position_ms >= next_report_ms {
            info!("Rendering {}", playback.time_label());
            next_report_ms += 10_000;
        }
        now += interval;
    }

    driver.finish();
    info!("Rendered {} frames", driver.frames_published());
    driver.frames_published()
}
