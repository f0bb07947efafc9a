use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    Json,
};
use earmark_api_structs::{Clip, NewClip};
use rand::Rng;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::store::ClipStore;
use crate::Error;

const MISSING_FIELDS: &str = "Missing required fields";
const NO_CLIPS: &str = "No clips found";

/// The body accepted when creating a clip.
///
/// Every field is optional here so that an incomplete request can be answered with a 400
/// rather than a deserialization failure.
#[derive(Debug, Default, Deserialize)]
pub struct CreateClip {
    pub title: Option<String>,
    pub audio_url: Option<String>,
    pub start_time: Option<f64>,
    pub end_time: Option<f64>,
}

impl CreateClip {
    /// Check that every field is present.
    ///
    /// Text fields must also be non-empty. A time of `0` is a real position in the audio and
    /// counts as present. The ordering of the times and the shape of the URL are left to the
    /// caller.
    pub fn into_new_clip(self) -> Result<NewClip, Error> {
        let text = |value: Option<String>| value.filter(|v| !v.is_empty());
        match (
            text(self.title),
            text(self.audio_url),
            self.start_time,
            self.end_time,
        ) {
            (Some(title), Some(audio_url), Some(start_time), Some(end_time)) => Ok(NewClip {
                title,
                audio_url,
                start_time,
                end_time,
            }),
            _ => Err(Error::BadRequest(MISSING_FIELDS.to_string())),
        }
    }
}

/// List every clip, newest first.
#[instrument(skip(store))]
pub async fn get_all<S: ClipStore>(
    Extension(store): Extension<Arc<S>>,
) -> Result<Json<Vec<Clip>>, Error> {
    Ok(store.list().await?.into())
}

/// Create a new clip.
#[instrument(skip(store))]
pub async fn create<S: ClipStore>(
    Extension(store): Extension<Arc<S>>,
    payload: Result<Json<CreateClip>, JsonRejection>,
) -> Result<(StatusCode, Json<Clip>), Error> {
    let Json(payload) = payload.map_err(|rejection| Error::BadRequest(rejection.body_text()))?;
    let clip = store.insert(payload.into_new_clip()?).await?;
    info!(id = %clip.id, title = %clip.title, "Created clip");
    Ok((StatusCode::CREATED, clip.into()))
}

/// Pick one clip uniformly at random.
///
/// The count and the fetch are two separate store calls, so a clip inserted in between can
/// shift which row the chosen offset lands on.
#[instrument(skip(store))]
pub async fn random<S: ClipStore>(
    Extension(store): Extension<Arc<S>>,
) -> Result<Json<Clip>, Error> {
    let count = store.count().await?;
    let offset = pick_offset(&mut rand::thread_rng(), count)
        .ok_or_else(|| Error::NotFound(NO_CLIPS.to_string()))?;
    store
        .fetch_at(offset)
        .await?
        .map(Json)
        .ok_or_else(|| Error::NotFound(NO_CLIPS.to_string()))
}

/// A uniform offset in `[0, count)`, or `None` when there is nothing to pick.
pub(crate) fn pick_offset<R: Rng + ?Sized>(rng: &mut R, count: u64) -> Option<u64> {
    (count > 0).then(|| rng.gen_range(0..count))
}
