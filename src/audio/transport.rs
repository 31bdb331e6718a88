//! Transport controls and the pull-based playback snapshot.
//!
//! The tick loop never subscribes to transport events; it asks for a
//! `PlaybackState` each frame. Positions are milliseconds on the wall clock.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use log::info;

/// Transport play state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Snapshot of the transport taken once per tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaybackState {
    pub state: PlayState,
    pub position_ms: u64,
    pub duration_ms: u64,
}

impl PlaybackState {
    pub fn is_playing(&self) -> bool {
        self.state == PlayState::Playing
    }

    /// `MM:SS / MM:SS` label
    pub fn time_label(&self) -> String {
        format!(
            "{} / {}",
            format_time(self.position_ms),
            format_time(self.duration_ms)
        )
    }
}

/// Format milliseconds as zero-padded `MM:SS`
pub fn format_time(ms: u64) -> String {
    let seconds = (ms / 1000) % 60;
    let minutes = ms / 60_000;
    format!("{:02}:{:02}", minutes, seconds)
}

/// Transport handle shared with the audio output callback
pub type SharedTransport = Arc<Mutex<Transport>>;

/// Wall-clock transport.
///
/// Every query has an `_at(now)` form so callers and tests can pin the clock.
#[derive(Debug, Clone, Default)]
pub struct Transport {
    state: PlayState,
    /// Position at the moment `anchor` was taken
    offset_ms: u64,
    /// Set while playing
    anchor: Option<Instant>,
    duration_ms: u64,
    /// A decoded source has been installed (its duration may be 0)
    media_loaded: bool,
    /// Bumped on every discontinuity (seek, stop) so followers can resync
    seek_generation: u64,
}

impl Transport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(self) -> SharedTransport {
        Arc::new(Mutex::new(self))
    }

    pub fn state(&self) -> PlayState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayState::Playing
    }

    pub fn seek_generation(&self) -> u64 {
        self.seek_generation
    }

    /// Duration in ms (0 until a source is loaded)
    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn set_duration_ms(&mut self, duration_ms: u64) {
        self.duration_ms = duration_ms;
    }

    /// Install a freshly decoded source and play it from the start. An empty
    /// source is already at its end, so the transport stays stopped.
    pub fn start_media_at(&mut self, duration_ms: u64, now: Instant) -> bool {
        self.set_duration_ms(duration_ms);
        self.media_loaded = true;
        self.seek_at(0, now);
        if duration_ms == 0 {
            info!("End of media (empty source)");
            self.stop();
            return false;
        }
        self.play_at(now);
        true
    }

    pub fn position_ms(&self) -> u64 {
        self.position_ms_at(Instant::now())
    }

    pub fn position_ms_at(&self, now: Instant) -> u64 {
        let elapsed = self
            .anchor
            .map(|anchor| now.saturating_duration_since(anchor).as_millis() as u64)
            .unwrap_or(0);
        let position = self.offset_ms + elapsed;
        if self.duration_ms > 0 {
            position.min(self.duration_ms)
        } else {
            position
        }
    }

    pub fn play_at(&mut self, now: Instant) {
        if self.state != PlayState::Playing {
            self.anchor = Some(now);
            self.state = PlayState::Playing;
        }
    }

    pub fn pause_at(&mut self, now: Instant) {
        if self.state == PlayState::Playing {
            self.offset_ms = self.position_ms_at(now);
            self.anchor = None;
            self.state = PlayState::Paused;
        }
    }

    /// Toggle play/pause; returns true when now playing
    pub fn play_pause_at(&mut self, now: Instant) -> bool {
        if self.is_playing() {
            self.pause_at(now);
            false
        } else {
            self.play_at(now);
            true
        }
    }

    /// Stop and rewind to the origin
    pub fn stop(&mut self) {
        self.state = PlayState::Stopped;
        self.anchor = None;
        self.offset_ms = 0;
        self.seek_generation += 1;
    }

    /// Jump to an absolute position (clamped to the duration when known)
    pub fn seek_at(&mut self, position_ms: u64, now: Instant) {
        self.offset_ms = if self.duration_ms > 0 {
            position_ms.min(self.duration_ms)
        } else {
            position_ms
        };
        if self.anchor.is_some() {
            self.anchor = Some(now);
        }
        self.seek_generation += 1;
    }

    /// Relative seek, saturating at the origin
    pub fn seek_by_at(&mut self, delta_ms: i64, now: Instant) {
        let current = self.position_ms_at(now);
        let target = if delta_ms.is_negative() {
            current.saturating_sub(delta_ms.unsigned_abs())
        } else {
            current.saturating_add(delta_ms as u64)
        };
        self.seek_at(target, now);
    }

    /// Stop at end of media; returns true when playback just finished
    pub fn update_at(&mut self, now: Instant) -> bool {
        let bounded = self.duration_ms > 0 || self.media_loaded;
        if self.is_playing() && bounded && self.position_ms_at(now) >= self.duration_ms {
            info!("End of media");
            self.stop();
            return true;
        }
        false
    }

    pub fn snapshot(&self) -> PlaybackState {
        self.snapshot_at(Instant::now())
    }

    pub fn snapshot_at(&self, now: Instant) -> PlaybackState {
        PlaybackState {
            state: self.state,
            position_ms: self.position_ms_at(now),
            duration_ms: self.duration_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_unloaded_transport_reports_zero() {
        let transport = Transport::new();
        let snapshot = transport.snapshot();
        assert_eq!(snapshot.position_ms, 0);
        assert_eq!(snapshot.duration_ms, 0);
        assert!(!snapshot.is_playing());
    }

    #[test]
    fn test_position_advances_only_while_playing() {
        let t0 = Instant::now();
        let mut transport = Transport::new();
        transport.set_duration_ms(60_000);

        assert!(transport.play_pause_at(t0));
        assert_eq!(transport.position_ms_at(t0 + ms(250)), 250);

        assert!(!transport.play_pause_at(t0 + ms(250)));
        assert_eq!(transport.state(), PlayState::Paused);
        // Frozen while paused
        assert_eq!(transport.position_ms_at(t0 + ms(5000)), 250);

        transport.play_at(t0 + ms(5000));
        assert_eq!(transport.position_ms_at(t0 + ms(5100)), 350);
    }

    #[test]
    fn test_start_media_plays_from_origin() {
        let t0 = Instant::now();
        let mut transport = Transport::new();
        transport.seek_at(4000, t0);

        assert!(transport.start_media_at(10_000, t0));
        assert!(transport.is_playing());
        assert_eq!(transport.position_ms_at(t0 + ms(100)), 100);
    }

    #[test]
    fn test_empty_source_never_plays() {
        let t0 = Instant::now();
        let mut transport = Transport::new();

        assert!(!transport.start_media_at(0, t0));
        assert_eq!(transport.state(), PlayState::Stopped);
        let later = t0 + ms(60_000);
        assert!(!transport.update_at(later));
        assert_eq!(transport.snapshot_at(later).position_ms, 0);

        // Play pressed on an empty source ends on the next update
        assert!(transport.play_pause_at(later));
        assert!(transport.update_at(later + ms(10)));
        assert_eq!(transport.state(), PlayState::Stopped);
    }

    #[test]
    fn test_stop_rewinds_to_origin() {
        let t0 = Instant::now();
        let mut transport = Transport::new();
        transport.play_at(t0);
        let generation = transport.seek_generation();

        transport.stop();
        assert_eq!(transport.state(), PlayState::Stopped);
        assert_eq!(transport.position_ms_at(t0 + ms(1000)), 0);
        assert!(transport.seek_generation() > generation);
    }

    #[test]
    fn test_seek_clamps_to_duration() {
        let t0 = Instant::now();
        let mut transport = Transport::new();
        transport.set_duration_ms(10_000);

        transport.seek_at(4_000, t0);
        assert_eq!(transport.position_ms_at(t0), 4_000);

        transport.seek_at(99_000, t0);
        assert_eq!(transport.position_ms_at(t0), 10_000);

        transport.seek_by_at(-20_000, t0);
        assert_eq!(transport.position_ms_at(t0), 0);
    }

    #[test]
    fn test_seek_while_playing_continues_from_new_position() {
        let t0 = Instant::now();
        let mut transport = Transport::new();
        transport.play_at(t0);
        transport.seek_at(3_000, t0 + ms(100));
        assert_eq!(transport.position_ms_at(t0 + ms(600)), 3_500);
    }

    #[test]
    fn test_end_of_media_stops() {
        let t0 = Instant::now();
        let mut transport = Transport::new();
        transport.set_duration_ms(1_000);
        transport.play_at(t0);

        assert!(!transport.update_at(t0 + ms(999)));
        assert!(transport.update_at(t0 + ms(1_000)));
        assert_eq!(transport.state(), PlayState::Stopped);
        assert_eq!(transport.position_ms_at(t0 + ms(2_000)), 0);
    }

    #[test]
    fn test_time_label() {
        let snapshot = PlaybackState {
            state: PlayState::Playing,
            position_ms: 65_000,
            duration_ms: 3_601_000,
        };
        assert_eq!(snapshot.time_label(), "01:05 / 60:01");
    }
}
