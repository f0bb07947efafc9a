/// Defines public-facing structures used in the web API
use serde::{Deserialize, Serialize};

mod clip;

pub use clip::{Clip, NewClip};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Status {
    /// Number of clips currently held by the store.
    pub clips: u64,
}

/// The body of every unsuccessful API response.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ErrorBody {
    pub error: String,
}
