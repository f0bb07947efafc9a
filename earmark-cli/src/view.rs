//! Terminal rendering for the library and the quote of the day.
use std::future::Future;
use std::io::{BufRead, IsTerminal, Write};

use chrono::{DateTime, Local, Utc};
use earmark_api_structs::Clip;
use prettytable::{format, row, Table};
use url::Url;

use crate::Error;

/// The state of a fetch, as shown to the user.
#[derive(Debug, PartialEq)]
pub enum Loadable<T> {
    Loading,
    Failed(String),
    Ready(T),
}

/// Asks whether a failed fetch should be tried again.
pub trait RetryPrompt {
    fn retry(&mut self, message: &str) -> bool;
}

/// Offers a retry on an interactive terminal; never retries otherwise.
pub struct TerminalPrompt;

impl RetryPrompt for TerminalPrompt {
    fn retry(&mut self, message: &str) -> bool {
        let stdin = std::io::stdin();
        if !stdin.is_terminal() {
            return false;
        }
        print!("{message}\nRetry? [y/N] ");
        let _ = std::io::stdout().flush();
        let mut answer = String::new();
        match stdin.lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim(), "y" | "Y" | "yes"),
            Err(_) => false,
        }
    }
}

/// Run `fetch`, showing each state as it is reached, until it succeeds or the user stops
/// retrying. No retry happens without the prompt agreeing to it.
pub async fn load<T, F, Fut, P, S>(mut fetch: F, prompt: &mut P, mut show: S) -> Loadable<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, Error>>,
    P: RetryPrompt,
    S: FnMut(&Loadable<T>),
{
    loop {
        show(&Loadable::Loading);
        let state = match fetch().await {
            Ok(value) => Loadable::Ready(value),
            Err(e) => Loadable::Failed(e.to_string()),
        };
        show(&state);
        match &state {
            Loadable::Failed(message) if prompt.retry(message) => continue,
            _ => return state,
        }
    }
}

/// `m:ss`, with whole seconds.
pub fn format_time(seconds: f64) -> String {
    if seconds < 0.0 {
        return format!("-{}", format_time(-seconds));
    }
    let minutes = (seconds / 60.0).floor() as u64;
    let seconds = (seconds % 60.0).floor() as u64;
    format!("{minutes}:{seconds:02}")
}

/// Parse a position given as plain seconds (`75`, `75.5`) or as `m:ss` (`1:15`).
pub fn parse_time(value: &str) -> Result<f64, String> {
    let value = value.trim();
    let seconds = match value.split_once(':') {
        Some((minutes, seconds)) => {
            let minutes: u64 = minutes
                .parse()
                .map_err(|_| format!("'{value}' is not a time"))?;
            let seconds: f64 = seconds
                .parse()
                .map_err(|_| format!("'{value}' is not a time"))?;
            if !(0.0..60.0).contains(&seconds) {
                return Err(format!("'{value}' has more than 59 seconds"));
            }
            minutes as f64 * 60.0 + seconds
        }
        None => value
            .parse()
            .map_err(|_| format!("'{value}' is not a time"))?,
    };
    if seconds < 0.0 || !seconds.is_finite() {
        return Err(format!("'{value}' is not a position in the audio"));
    }
    Ok(seconds)
}

pub fn format_date(time: DateTime<Utc>) -> String {
    time.with_timezone(&Local).format("%Y-%m-%d").to_string()
}

/// A link that plays only the clip's interval in a browser, using a media fragment.
pub fn play_link(clip: &Clip) -> String {
    let fragment = format!("t={},{}", clip.start_time, clip.end_time);
    match Url::parse(&clip.audio_url) {
        Ok(mut url) => {
            url.set_fragment(Some(&fragment));
            url.to_string()
        }
        Err(_) => format!("{}#{fragment}", clip.audio_url),
    }
}

pub fn library_table(clips: &[Clip]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_CLEAN);
    table.set_titles(row!["Title", "Date", "Clip", "Duration", "Play"]);
    for clip in clips {
        table.add_row(row![
            clip.title,
            format_date(clip.created_at),
            format!(
                "{} - {}",
                format_time(clip.start_time),
                format_time(clip.end_time)
            ),
            format_time(clip.duration()),
            play_link(clip),
        ]);
    }
    table
}

pub fn render_library(state: &Loadable<Vec<Clip>>) -> String {
    match state {
        Loadable::Loading => "Loading clips...".to_string(),
        Loadable::Failed(message) => message.clone(),
        Loadable::Ready(clips) if clips.is_empty() => {
            "No clips saved yet. Create your first clip with 'earmark clip add'.".to_string()
        }
        Loadable::Ready(clips) => library_table(clips).to_string(),
    }
}

pub fn render_quote(state: &Loadable<Clip>) -> String {
    match state {
        Loadable::Loading => "Loading today's quote...".to_string(),
        Loadable::Failed(message) => message.clone(),
        Loadable::Ready(clip) => format!(
            "Quote of the Day\n\n  {}\n  {} - {}\n\n  Play: {}\n  Open: {}",
            clip.title,
            format_time(clip.start_time),
            format_time(clip.end_time),
            play_link(clip),
            clip.audio_url,
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    fn clip(start_time: f64, end_time: f64) -> Clip {
        Clip {
            id: "1".to_string(),
            title: "Intro".to_string(),
            audio_url: "https://x/a.mp3".to_string(),
            start_time,
            end_time,
            created_at: Utc::now(),
        }
    }

    struct Scripted(Vec<bool>);

    impl RetryPrompt for Scripted {
        fn retry(&mut self, _message: &str) -> bool {
            self.0.pop().unwrap_or(false)
        }
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(5.9), "0:05");
        assert_eq!(format_time(75.0), "1:15");
        assert_eq!(format_time(3600.0), "60:00");
        assert_eq!(format_time(-7.0), "-0:07");
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time("75"), Ok(75.0));
        assert_eq!(parse_time("1:15"), Ok(75.0));
        assert_eq!(parse_time(" 0:02.5 "), Ok(2.5));
        assert!(parse_time("1:75").is_err());
        assert!(parse_time("-3").is_err());
        assert!(parse_time("soon").is_err());
    }

    #[test]
    fn test_play_link() {
        assert_eq!(play_link(&clip(5.0, 12.5)), "https://x/a.mp3#t=5,12.5");
        let mut odd = clip(1.0, 2.0);
        odd.audio_url = "not a url".to_string();
        assert_eq!(play_link(&odd), "not a url#t=1,2");
    }

    #[test]
    fn test_render_library() {
        assert!(render_library(&Loadable::Ready(vec![])).starts_with("No clips saved yet"));
        let table = render_library(&Loadable::Ready(vec![clip(5.0, 12.0)]));
        assert!(table.contains("Intro"));
        assert!(table.contains("0:05 - 0:12"));
        assert!(table.contains("0:07"));
    }

    #[test]
    fn test_render_quote() {
        let quote = render_quote(&Loadable::Ready(clip(65.0, 70.0)));
        assert!(quote.contains("1:05 - 1:10"));
        assert!(quote.contains("https://x/a.mp3#t=65,70"));
        assert_eq!(
            render_quote(&Loadable::Failed(Error::NoClips.to_string())),
            "No clips available for today"
        );
    }

    #[tokio::test]
    async fn test_load_retries_only_when_asked() {
        let attempts = Cell::new(0);
        let mut shown = vec![];
        let state = load(
            || {
                attempts.set(attempts.get() + 1);
                let attempt = attempts.get();
                async move {
                    if attempt < 2 {
                        Err(Error::NoClips)
                    } else {
                        Ok(attempt)
                    }
                }
            },
            &mut Scripted(vec![true]),
            |state: &Loadable<u32>| {
                shown.push(match state {
                    Loadable::Loading => "loading",
                    Loadable::Failed(_) => "failed",
                    Loadable::Ready(_) => "ready",
                })
            },
        )
        .await;

        assert_eq!(state, Loadable::Ready(2));
        assert_eq!(shown, vec!["loading", "failed", "loading", "ready"]);
    }

    #[tokio::test]
    async fn test_load_gives_up_without_retry() {
        let state: Loadable<()> = load(
            || async { Err(Error::NoClips) },
            &mut Scripted(vec![]),
            |_: &Loadable<()>| {},
        )
        .await;
        assert_eq!(
            state,
            Loadable::Failed("No clips available for today".to_string())
        );
    }
}
