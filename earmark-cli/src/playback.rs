use crate::player::MediaElement;

/// Plays one audio resource from `start` to `end` and then stops.
///
/// The owner drives it by calling [`ClipPlayback::on_time_update`] whenever the media reports
/// progress; playback pauses the first time the position reaches `end`.
pub struct ClipPlayback<M> {
    media: M,
    end: f64,
    finished: bool,
}

impl<M: MediaElement> ClipPlayback<M> {
    /// Load `url` into a fresh media element, seek to `start` and begin playing.
    pub fn start(mut media: M, url: &str, start: f64, end: f64) -> Self {
        media.load(url);
        media.seek(start);
        media.play();
        ClipPlayback {
            media,
            end,
            finished: false,
        }
    }

    /// Check the position; returns `true` while the clip is still playing.
    pub fn on_time_update(&mut self) -> bool {
        if !self.finished && self.media.position() >= self.end {
            self.media.pause();
            self.finished = true;
        }
        !self.finished
    }

    /// Stop early. Later time updates are ignored.
    pub fn cancel(&mut self) {
        if !self.finished {
            self.media.pause();
            self.finished = true;
        }
    }

    pub fn position(&self) -> f64 {
        self.media.position()
    }
}
