//! The clip-marking player: one audio source, a play/pause toggle, and two marks.
use earmark_api_structs::NewClip;
use thiserror::Error as ThisError;

/// Something that can play an audio resource and report where it is.
///
/// This is the seam to whatever actually produces sound; positions are in seconds.
pub trait MediaElement {
    fn load(&mut self, url: &str);
    fn position(&self) -> f64;
    fn seek(&mut self, position: f64);
    fn play(&mut self);
    fn pause(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerState {
    /// No audio URL has been given.
    Unset,
    /// Audio is loaded and has not been started.
    Loaded,
    Playing,
    Paused,
}

/// Why a clip can't be submitted yet.
#[derive(ThisError, Debug, PartialEq, Eq)]
pub enum Invalid {
    #[error("Please enter a title and audio URL")]
    MissingTitleOrUrl,
    #[error("Start time must be before end time")]
    StartNotBeforeEnd,
}

pub struct Player<M> {
    media: M,
    state: PlayerState,
    audio_url: String,
    title: String,
    start_time: f64,
    end_time: f64,
}

impl<M: MediaElement> Player<M> {
    pub fn new(media: M) -> Self {
        Player {
            media,
            state: PlayerState::Unset,
            audio_url: String::new(),
            title: String::new(),
            start_time: 0.0,
            end_time: 0.0,
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn audio_url(&self) -> &str {
        &self.audio_url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    pub fn position(&self) -> f64 {
        self.media.position()
    }

    /// Point the player at a new audio source. A blank URL unloads the player.
    pub fn set_url(&mut self, url: &str) {
        self.audio_url = url.to_string();
        if url.trim().is_empty() {
            self.media.pause();
            self.state = PlayerState::Unset;
        } else {
            self.media.load(url.trim());
            self.state = PlayerState::Loaded;
        }
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    pub fn play(&mut self) {
        if self.state != PlayerState::Unset {
            self.media.play();
            self.state = PlayerState::Playing;
        }
    }

    pub fn pause(&mut self) {
        if self.state != PlayerState::Unset {
            self.media.pause();
            self.state = PlayerState::Paused;
        }
    }

    /// Play if not playing, pause if playing. Nothing happens without a source.
    pub fn toggle(&mut self) -> PlayerState {
        match self.state {
            PlayerState::Unset => {}
            PlayerState::Playing => self.pause(),
            PlayerState::Loaded | PlayerState::Paused => self.play(),
        }
        self.state
    }

    pub fn seek(&mut self, position: f64) {
        if self.state != PlayerState::Unset {
            self.media.seek(position.max(0.0));
        }
    }

    /// Use the current position as the start of the clip.
    pub fn mark_start(&mut self) -> f64 {
        self.start_time = self.media.position();
        self.start_time
    }

    /// Use the current position as the end of the clip.
    pub fn mark_end(&mut self) -> f64 {
        self.end_time = self.media.position();
        self.end_time
    }

    /// The clip as it would be saved, if it is complete.
    pub fn submission(&self) -> Result<NewClip, Invalid> {
        let title = self.title.trim();
        let audio_url = self.audio_url.trim();
        if title.is_empty() || audio_url.is_empty() {
            return Err(Invalid::MissingTitleOrUrl);
        }
        if self.start_time >= self.end_time {
            return Err(Invalid::StartNotBeforeEnd);
        }
        Ok(NewClip {
            title: title.to_string(),
            audio_url: audio_url.to_string(),
            start_time: self.start_time,
            end_time: self.end_time,
        })
    }

    /// Clear the form after a save. The URL stays so more clips can be cut from the same audio.
    pub fn clip_saved(&mut self) {
        self.title.clear();
        self.start_time = 0.0;
        self.end_time = 0.0;
    }
}
