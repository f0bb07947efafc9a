use clap::{Parser, Subcommand};
use reqwest::Url;
use thiserror::Error as ThisError;

use crate::api::ApiClient;
use crate::player::{Invalid, Player};
use crate::session::Session;
use crate::transport::TransportClock;
use crate::view::{load, parse_time, render_library, render_quote, Loadable, TerminalPrompt};

mod api;
mod playback;
mod player;
mod session;
mod transport;
mod view;

#[derive(ThisError, Debug)]
pub enum Error {
    #[error("An HTTP error occurred: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("Unable to parse Earmark server URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("Unable to use the terminal: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unable to serialize to valid JSON: {0}")]
    Json(#[from] serde_json::error::Error),
    #[error("The server answered {status}: {message}")]
    Api {
        status: reqwest::StatusCode,
        message: String,
    },
    #[error("No clips available for today")]
    NoClips,
    #[error("{0}")]
    Fetch(String),
    #[error("{0}")]
    Invalid(#[from] Invalid),
}

/// Command-line interface for the Earmark clip library
///
/// Browse saved clips, pick a quote of the day, and cut new clips from audio on the web.
#[derive(Parser, Debug)]
#[command(name = "earmark")]
#[command(about = "Save and replay timestamped clips of audio", long_about = None)]
struct Cli {
    /// Base URL of the Earmark server
    #[arg(long, env = "EARMARK_URL", default_value = "http://127.0.0.1:8080/")]
    url: Url,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Work with audio clips
    #[command(subcommand)]
    Clip(Clip),
}

#[derive(Subcommand, Debug)]
enum Clip {
    /// Show the clip library, newest first
    List {},
    /// Show one clip picked at random: the quote of the day
    Random {},
    /// Save a clip with known start and end times
    Add {
        /// A title for the clip
        #[arg(short, long)]
        title: String,
        /// Where the clip starts, in seconds or m:ss
        #[arg(short, long, value_parser = parse_time)]
        start: f64,
        /// Where the clip ends, in seconds or m:ss
        #[arg(short, long, value_parser = parse_time)]
        end: f64,
        /// URL of the audio
        audio_url: String,
    },
    /// Listen along and mark clips interactively
    Mark {
        /// URL of the audio to start with
        audio_url: Option<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let opts = Cli::parse();
    if let Err(e) = process_command(opts).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn process_command(opts: Cli) -> Result<(), Error> {
    let api = ApiClient::new(opts.url)?;

    match opts.command {
        Command::Clip(subcommand) => match subcommand {
            Clip::List {} => {
                let state = load(
                    || api.clips(),
                    &mut TerminalPrompt,
                    |state: &Loadable<_>| show(state, render_library),
                )
                .await;
                finish(state)
            }
            Clip::Random {} => {
                let state = load(
                    || api.random_clip(),
                    &mut TerminalPrompt,
                    |state: &Loadable<_>| show(state, render_quote),
                )
                .await;
                finish(state)
            }
            Clip::Add {
                title,
                start,
                end,
                audio_url,
            } => {
                let mut player = Player::new(TransportClock::new());
                player.set_url(&audio_url);
                player.set_title(&title);
                player.seek(start);
                player.mark_start();
                player.seek(end);
                player.mark_end();
                let clip = api.create_clip(&player.submission()?).await?;
                println!("{}", serde_json::to_string_pretty(&clip)?);
                Ok(())
            }
            Clip::Mark { audio_url } => {
                let mut session = Session::new(api, audio_url.as_deref());
                let stdin = tokio::io::BufReader::new(tokio::io::stdin());
                session.run(stdin).await
            }
        },
    }
}

/// Print loading and content states. A failure is reported once, by `main`, after the user
/// has stopped retrying.
fn show<T>(state: &Loadable<T>, render: fn(&Loadable<T>) -> String) {
    if !matches!(state, Loadable::Failed(_)) {
        println!("{}", render(state));
    }
}

fn finish<T>(state: Loadable<T>) -> Result<(), Error> {
    match state {
        Loadable::Failed(message) => Err(Error::Fetch(message)),
        _ => Ok(()),
    }
}
