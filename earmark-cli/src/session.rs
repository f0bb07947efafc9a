//! The interactive marking session behind `earmark clip mark`.
use std::str::FromStr;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt};

use crate::api::ApiClient;
use crate::playback::ClipPlayback;
use crate::player::{Invalid, Player, PlayerState};
use crate::transport::TransportClock;
use crate::view::{format_time, parse_time};
use crate::Error;

const HELP: &str = "\
Commands:
  load <url>     listen to a different audio source
  play | pause   start or stop the clock
  toggle         play if paused, pause if playing
  seek <time>    jump to a position (seconds or m:ss)
  start | end    mark the current position as the clip start or end
  title <text>   name the clip
  preview        run the marked interval from start to end
  status         show the position, marks, and title
  save           save the clip
  quit           leave the session";

#[derive(Debug, PartialEq)]
pub enum SessionCommand {
    Load(String),
    Play,
    Pause,
    Toggle,
    Seek(f64),
    MarkStart,
    MarkEnd,
    Title(String),
    Preview,
    Status,
    Save,
    Help,
    Quit,
}

impl FromStr for SessionCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let command = match word.to_lowercase().as_str() {
            "load" | "url" if !rest.is_empty() => SessionCommand::Load(rest.to_string()),
            "play" => SessionCommand::Play,
            "pause" => SessionCommand::Pause,
            "toggle" | "p" => SessionCommand::Toggle,
            "seek" => SessionCommand::Seek(parse_time(rest)?),
            "start" => SessionCommand::MarkStart,
            "end" => SessionCommand::MarkEnd,
            "title" => SessionCommand::Title(rest.to_string()),
            "preview" => SessionCommand::Preview,
            "status" | "" => SessionCommand::Status,
            "save" => SessionCommand::Save,
            "help" | "?" => SessionCommand::Help,
            "quit" | "exit" | "q" => SessionCommand::Quit,
            "load" | "url" => return Err("load needs an audio URL".to_string()),
            other => return Err(format!("Unknown command '{other}'; try 'help'")),
        };
        Ok(command)
    }
}

/// Whether the session keeps reading commands.
#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Session {
    player: Player<TransportClock>,
    api: ApiClient,
}

impl Session {
    pub fn new(api: ApiClient, audio_url: Option<&str>) -> Self {
        let mut player = Player::new(TransportClock::new());
        if let Some(url) = audio_url {
            player.set_url(url);
        }
        Session { player, api }
    }

    /// Read commands line by line until `quit` or the end of input.
    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, input: R) -> Result<(), Error> {
        let mut stdout = tokio::io::stdout();
        let mut lines = input.lines();
        println!("{HELP}\n");
        println!("{}", self.status_line());
        loop {
            stdout.write_all(b"> ").await?;
            stdout.flush().await?;
            let Some(line) = lines.next_line().await? else {
                return Ok(());
            };
            let command = match line.parse::<SessionCommand>() {
                Ok(command) => command,
                Err(message) => {
                    println!("{message}");
                    continue;
                }
            };
            match self.handle(command).await {
                Ok(Flow::Quit) => return Ok(()),
                Ok(Flow::Continue) => {}
                Err(e) => println!("{e}"),
            }
        }
    }

    async fn handle(&mut self, command: SessionCommand) -> Result<Flow, Error> {
        match command {
            SessionCommand::Load(url) => {
                self.player.set_url(&url);
                println!("{}", self.status_line());
            }
            SessionCommand::Play => {
                self.player.play();
                println!("{}", self.status_line());
            }
            SessionCommand::Pause => {
                self.player.pause();
                println!("{}", self.status_line());
            }
            SessionCommand::Toggle => {
                self.player.toggle();
                println!("{}", self.status_line());
            }
            SessionCommand::Seek(position) => {
                self.player.seek(position);
                println!("{}", self.status_line());
            }
            SessionCommand::MarkStart => {
                println!("Start: {}", format_time(self.player.mark_start()));
            }
            SessionCommand::MarkEnd => {
                println!("End: {}", format_time(self.player.mark_end()));
            }
            SessionCommand::Title(title) => self.player.set_title(&title),
            SessionCommand::Preview => self.preview().await?,
            SessionCommand::Status => println!("{}", self.status_line()),
            SessionCommand::Save => {
                let clip = self.player.submission()?;
                match self.api.create_clip(&clip).await {
                    Ok(clip) => {
                        println!(
                            "Saved '{}' ({} - {})",
                            clip.title,
                            format_time(clip.start_time),
                            format_time(clip.end_time)
                        );
                        self.player.clip_saved();
                    }
                    Err(e) => println!("Failed to save clip. Please try again. ({e})"),
                }
            }
            SessionCommand::Help => println!("{HELP}"),
            SessionCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Run the marked interval on its own clock, independent of the main transport.
    async fn preview(&self) -> Result<(), Error> {
        let audio_url = self.player.audio_url().trim();
        if audio_url.is_empty() {
            return Err(Invalid::MissingTitleOrUrl.into());
        }
        let (start_time, end_time) = (self.player.start_time(), self.player.end_time());
        if start_time >= end_time {
            return Err(Invalid::StartNotBeforeEnd.into());
        }

        let mut playback =
            ClipPlayback::start(TransportClock::new(), audio_url, start_time, end_time);
        let mut stdout = tokio::io::stdout();
        let mut ticks = tokio::time::interval(Duration::from_millis(250));
        while playback.on_time_update() {
            let line = format!(
                "\r  {} / {}",
                format_time(playback.position()),
                format_time(end_time)
            );
            stdout.write_all(line.as_bytes()).await?;
            stdout.flush().await?;
            tokio::select! {
                _ = ticks.tick() => {}
                _ = tokio::signal::ctrl_c() => playback.cancel(),
            }
        }
        println!(
            "\r  {} / {}",
            format_time(playback.position().min(end_time)),
            format_time(end_time)
        );
        Ok(())
    }

    fn status_line(&self) -> String {
        let state = match self.player.state() {
            PlayerState::Unset => return "No audio loaded; use 'load <url>'".to_string(),
            PlayerState::Loaded => "loaded",
            PlayerState::Playing => "playing",
            PlayerState::Paused => "paused",
        };
        let title = match self.player.title() {
            "" => "(untitled)",
            title => title,
        };
        format!(
            "[{state}] {} at {}  start {}  end {}  {title}",
            self.player.audio_url().trim(),
            format_time(self.player.position()),
            format_time(self.player.start_time()),
            format_time(self.player.end_time()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            "load https://x/a.mp3".parse(),
            Ok(SessionCommand::Load("https://x/a.mp3".to_string()))
        );
        assert_eq!("  PLAY ".parse(), Ok(SessionCommand::Play));
        assert_eq!("p".parse(), Ok(SessionCommand::Toggle));
        assert_eq!("seek 1:30".parse(), Ok(SessionCommand::Seek(90.0)));
        assert_eq!("start".parse(), Ok(SessionCommand::MarkStart));
        assert_eq!("end".parse(), Ok(SessionCommand::MarkEnd));
        assert_eq!(
            "title  The good part ".parse(),
            Ok(SessionCommand::Title("The good part".to_string()))
        );
        assert_eq!("".parse(), Ok(SessionCommand::Status));
        assert_eq!("q".parse(), Ok(SessionCommand::Quit));
    }

    #[test]
    fn test_parse_errors() {
        assert!("load".parse::<SessionCommand>().is_err());
        assert!("seek later".parse::<SessionCommand>().is_err());
        assert!("rewind".parse::<SessionCommand>().is_err());
    }

    fn offline() -> Session {
        let api = ApiClient::new(url::Url::parse("http://127.0.0.1:9/").unwrap()).unwrap();
        Session::new(api, Some("https://x/a.mp3"))
    }

    #[tokio::test]
    async fn test_marking_flow() {
        let mut session = offline();
        assert_eq!(
            session.handle(SessionCommand::Seek(5.0)).await.unwrap(),
            Flow::Continue
        );
        session.handle(SessionCommand::MarkStart).await.unwrap();
        session.handle(SessionCommand::Seek(12.0)).await.unwrap();
        session.handle(SessionCommand::MarkEnd).await.unwrap();
        session
            .handle(SessionCommand::Title("Intro".into()))
            .await
            .unwrap();

        let clip = session.player.submission().unwrap();
        assert_eq!((clip.start_time, clip.end_time), (5.0, 12.0));
        assert_eq!(session.player.state(), PlayerState::Loaded);
        assert_eq!(
            session.handle(SessionCommand::Quit).await.unwrap(),
            Flow::Quit
        );
    }

    #[tokio::test]
    async fn test_save_keeps_audio_and_clears_marks() {
        let api = crate::api::tests::fake_api().await;
        let mut session = Session::new(api, Some("https://x/a.mp3"));
        session.handle(SessionCommand::Seek(5.0)).await.unwrap();
        session.handle(SessionCommand::MarkStart).await.unwrap();
        session.handle(SessionCommand::Seek(12.0)).await.unwrap();
        session.handle(SessionCommand::MarkEnd).await.unwrap();
        session
            .handle(SessionCommand::Title("Intro".into()))
            .await
            .unwrap();

        assert_eq!(
            session.handle(SessionCommand::Save).await.unwrap(),
            Flow::Continue
        );
        assert_eq!(session.player.audio_url(), "https://x/a.mp3");
        assert_eq!(session.player.title(), "");
        assert_eq!(session.player.start_time(), 0.0);
        assert_eq!(session.player.end_time(), 0.0);
    }

    #[tokio::test]
    async fn test_failed_save_keeps_the_clip() {
        let mut session = offline();
        session.handle(SessionCommand::Seek(12.0)).await.unwrap();
        session.handle(SessionCommand::MarkEnd).await.unwrap();
        session
            .handle(SessionCommand::Title("Intro".into()))
            .await
            .unwrap();

        session.handle(SessionCommand::Save).await.unwrap();
        assert_eq!(session.player.title(), "Intro");
        assert_eq!(session.player.end_time(), 12.0);
    }

    #[tokio::test]
    async fn test_save_rejects_incomplete_clip_locally() {
        let mut session = offline();
        session
            .handle(SessionCommand::Title("Intro".into()))
            .await
            .unwrap();
        assert!(matches!(
            session.handle(SessionCommand::Save).await,
            Err(Error::Invalid(Invalid::StartNotBeforeEnd))
        ));
    }

    #[tokio::test]
    async fn test_preview_rejects_unmarked_interval() {
        let mut session = offline();
        assert!(matches!(
            session.handle(SessionCommand::Preview).await,
            Err(Error::Invalid(Invalid::StartNotBeforeEnd))
        ));
    }
}
