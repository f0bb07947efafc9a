use std::time::Instant;

use crate::player::MediaElement;

/// A [`MediaElement`] that keeps time without producing sound.
///
/// The terminal can't play audio, so this tracks where playback of the source would be, letting
/// the user listen in any player and mark positions here.
#[derive(Debug, Default)]
pub struct TransportClock {
    source: Option<String>,
    /// Position when the clock was last started, paused, or seeked.
    base: f64,
    /// Set while running.
    started: Option<Instant>,
}

impl TransportClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MediaElement for TransportClock {
    fn load(&mut self, url: &str) {
        self.source = Some(url.to_string());
        self.base = 0.0;
        self.started = None;
    }

    fn position(&self) -> f64 {
        match self.started {
            Some(started) => self.base + started.elapsed().as_secs_f64(),
            None => self.base,
        }
    }

    fn seek(&mut self, position: f64) {
        self.base = position;
        if self.started.is_some() {
            self.started = Some(Instant::now());
        }
    }

    fn play(&mut self) {
        if self.started.is_none() {
            self.started = Some(Instant::now());
        }
    }

    fn pause(&mut self) {
        self.base = self.position();
        self.started = None;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_stopped_clock_holds_position() {
        let mut clock = TransportClock::new();
        clock.load("https://x/a.mp3");
        clock.seek(42.0);
        std::thread::sleep(Duration::from_millis(10));
        assert_eq!(clock.position(), 42.0);
        assert_eq!(clock.source.as_deref(), Some("https://x/a.mp3"));
    }

    #[test]
    fn test_running_clock_advances_and_pause_freezes() {
        let mut clock = TransportClock::new();
        clock.load("https://x/a.mp3");
        clock.seek(10.0);
        clock.play();
        std::thread::sleep(Duration::from_millis(20));
        clock.pause();

        let paused_at = clock.position();
        assert!(paused_at > 10.0);
        std::thread::sleep(Duration::from_millis(10));
        assert_eq!(clock.position(), paused_at);
        assert!(clock.started.is_none());
    }

    #[test]
    fn test_load_resets() {
        let mut clock = TransportClock::new();
        clock.load("https://x/a.mp3");
        clock.seek(5.0);
        clock.play();
        clock.load("https://x/b.mp3");
        assert_eq!(clock.position(), 0.0);
        assert!(clock.started.is_none());
    }
}
