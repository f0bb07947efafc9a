use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A named time interval over an external audio resource.
///
/// Field names match the columns of the `audio_clips` table so rows can be
/// passed through from the store unchanged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    /// The unique identifier for the clip, assigned by the store.
    ///
    /// Opaque to everything but the store. Numeric ids, such as those of an identity column,
    /// are carried as their decimal string.
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    /// A title for human consumption.
    pub title: String,
    /// Absolute URL of the audio the clip was cut from.
    pub audio_url: String,
    /// Offset into the audio, in seconds, where the clip begins.
    pub start_time: f64,
    /// Offset into the audio, in seconds, where the clip ends.
    pub end_time: f64,
    /// The time when the store accepted the clip.
    pub created_at: DateTime<Utc>,
}

fn opaque_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Integer(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(id) => id,
        Id::Integer(id) => id.to_string(),
    })
}

impl Clip {
    /// Length of the clip in seconds. Negative if the clip was stored inverted.
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// A clip that has not been stored yet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewClip {
    pub title: String,
    pub audio_url: String,
    pub start_time: f64,
    pub end_time: f64,
}

impl NewClip {
    /// Attach the store-assigned fields.
    pub fn into_clip(self, id: String, created_at: DateTime<Utc>) -> Clip {
        Clip {
            id,
            title: self.title,
            audio_url: self.audio_url,
            start_time: self.start_time,
            end_time: self.end_time,
            created_at,
        }
    }
}
