//! Latentwave - audio-reactive latent-space navigation
//!
//! Plays a WAV file and, once per visual tick, turns the loudness of the
//! audio under the playhead into a step through a generator's latent space.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context};
use clap::Parser;
use log::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use latentwave::audio::{AudioOutput, LoadStatus, SharedTransport, Transport, WaveformLoader};
use latentwave::cli::Args;
use latentwave::driver::{render_offline, FrameDriver, Ticker};
use latentwave::error::DisplayError;
use latentwave::output::{PngSequenceSink, RawFrameSink};
use latentwave::params::{DisplayConfig, Settings};
use latentwave::rendering::DisplaySurface;

/// Main application state
struct App {
    // Window and rendering
    window: Option<Arc<Window>>,
    display: Option<DisplaySurface>,
    display_config: DisplayConfig,
    startup_error: Option<DisplayError>,

    // Pipeline
    driver: FrameDriver,
    ticker: Ticker,

    // Audio
    transport: SharedTransport,
    loader: Option<WaveformLoader>,
    audio_output: Option<AudioOutput>,

    // Configuration
    settings: Settings,
    mute: bool,

    title_label: String,
}

impl App {
    fn new(args: &Args, settings: Settings, driver: FrameDriver) -> anyhow::Result<Self> {
        let loader = WaveformLoader::spawn(&args.audio)?;
        let ticker = Ticker::new(settings.fps.interval(), Instant::now());

        Ok(Self {
            window: None,
            display: None,
            display_config: DisplayConfig::default(),
            startup_error: None,
            driver,
            ticker,
            transport: Transport::new().shared(),
            loader: Some(loader),
            audio_output: None,
            settings,
            mute: args.mute,
            title_label: String::new(),
        })
    }

    fn with_transport<R>(&self, f: impl FnOnce(&mut Transport) -> R) -> R {
        let mut transport = self.transport.lock().unwrap_or_else(|p| p.into_inner());
        f(&mut transport)
    }

    /// Hand a finished decode to the pipeline and start playing
    fn poll_loader(&mut self) {
        let Some(loader) = &mut self.loader else {
            return;
        };

        match loader.poll() {
            LoadStatus::Pending => return,
            LoadStatus::Ready(waveform) => {
                let waveform = Arc::new(waveform);
                self.driver
                    .extractor_mut()
                    .set_waveform(Arc::clone(&waveform));

                if !self.mute {
                    match AudioOutput::start(
                        Arc::clone(&waveform),
                        Arc::clone(&self.transport),
                        self.settings.audio.output_resync_ms,
                    ) {
                        Ok(output) => self.audio_output = Some(output),
                        Err(e) => warn!("{}. Continuing without sound", e),
                    }
                }

                let duration_ms = waveform.duration_ms();
                let now = Instant::now();
                if self.with_transport(|t| t.start_media_at(duration_ms, now)) {
                    info!("Playing ({} ms)", duration_ms);
                } else {
                    warn!("Audio file is empty; nothing to play");
                }
            }
            LoadStatus::Failed(e) => {
                error!("Audio unavailable: {}", e);
            }
            LoadStatus::Idle => {}
        }
        self.loader = None;
    }

    fn handle_key(&mut self, code: KeyCode, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let step = self.settings.audio.seek_step_ms as i64;
        match code {
            KeyCode::Escape => event_loop.exit(),
            KeyCode::Space => {
                let playing = self.with_transport(|t| t.play_pause_at(now));
                info!("{}", if playing { "Play" } else { "Pause" });
            }
            KeyCode::KeyS => {
                self.with_transport(|t| t.stop());
                info!("Stop");
            }
            KeyCode::ArrowLeft => self.with_transport(|t| t.seek_by_at(-step, now)),
            KeyCode::ArrowRight => self.with_transport(|t| t.seek_by_at(step, now)),
            _ => {}
        }
    }

    /// Run a tick if one is due and show its frame
    fn tick(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        if !self.ticker.due(now) {
            return;
        }

        let playback = self.with_transport(|t| {
            t.update_at(now);
            t.snapshot_at(now)
        });

        if let Some(frame) = self.driver.on_tick(&playback) {
            if let Some(display) = &mut self.display {
                match display.present(frame) {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        error!("GPU out of memory");
                        event_loop.exit();
                    }
                    Err(e) => warn!("Present failed: {:?}", e),
                }
            }
        }

        let label = playback.time_label();
        if label != self.title_label {
            if let Some(window) = &self.window {
                window.set_title(&format!("{} - {}", self.display_config.title, label));
            }
            self.title_label = label;
        }
    }
}

impl ApplicationHandler for App {
    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.poll_loader();
        self.tick(event_loop);
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.ticker.deadline()));
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized
        }

        let window_attributes = Window::default_attributes()
            .with_title(self.display_config.title.as_str())
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.display_config.window_width,
                self.display_config.window_height,
            ));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        match pollster::block_on(DisplaySurface::new(Arc::clone(&window))) {
            Ok(display) => self.display = Some(display),
            Err(e) => {
                self.startup_error = Some(e);
                event_loop.exit();
                return;
            }
        }

        info!("Space: play/pause | S: stop | Left/Right: seek | Esc: quit");
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(code),
                        ..
                    },
                ..
            } => self.handle_key(code, event_loop),
            WindowEvent::Resized(size) => {
                if let Some(display) = &mut self.display {
                    display.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                // Repaint the last frame (paused, or after expose)
                if let (Some(display), Some(frame)) = (&mut self.display, self.driver.last_frame())
                {
                    if let Err(e) = display.present(frame) {
                        warn!("Redraw failed: {:?}", e);
                    }
                }
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.driver.finish();
    }
}

/// Attach the file sinks requested on the command line
fn add_sinks(args: &Args, driver: &mut FrameDriver) -> anyhow::Result<()> {
    if let Some(config) = args.recording_config() {
        driver.add_sink(Box::new(PngSequenceSink::new(config)?));
    }
    if let Some(path) = &args.raw_out {
        let sink = RawFrameSink::create(path)
            .with_context(|| format!("cannot create {}", path.display()))?;
        driver.add_sink(Box::new(sink));
        info!("Streaming raw frames to {}", path.display());
    }
    Ok(())
}

/// Decode up front and render every frame as fast as possible
fn run_headless(args: &Args, settings: &Settings, mut driver: FrameDriver) -> anyhow::Result<()> {
    if args.record.is_none() && args.raw_out.is_none() {
        warn!("Headless render without --record or --raw-out writes nothing");
    }

    let waveform = match WaveformLoader::spawn(&args.audio)?.wait() {
        LoadStatus::Ready(waveform) => Arc::new(waveform),
        LoadStatus::Failed(e) => return Err(e.into()),
        LoadStatus::Pending | LoadStatus::Idle => bail!("audio decode produced no result"),
    };
    let duration_ms = waveform.duration_ms();
    driver.extractor_mut().set_waveform(waveform);

    let started = Instant::now();
    let frames = render_offline(&mut driver, duration_ms, settings.fps.interval());
    info!(
        "Offline render finished: {} frames in {:.1}s",
        frames,
        started.elapsed().as_secs_f32()
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let settings = args.resolve_settings()?;
    info!("Latentwave - {}", args.audio.display());

    let mut driver = FrameDriver::from_settings(&settings, args.strategy, args.seed)?;
    add_sinks(&args, &mut driver)?;

    if args.headless {
        return run_headless(&args, &settings, driver);
    }

    let mut app = App::new(&args, settings, driver)?;
    let event_loop = EventLoop::new()?;
    event_loop.run_app(&mut app)?;

    if let Some(e) = app.startup_error {
        return Err(e.into());
    }
    Ok(())
}
