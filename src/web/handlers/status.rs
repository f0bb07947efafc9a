use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, Json};
use earmark_api_structs::Status;
use tracing::{error, instrument};

use crate::store::ClipStore;

/// Reports on the health of the web server and its store.
#[instrument(skip(store))]
pub async fn get<S: ClipStore>(
    Extension(store): Extension<Arc<S>>,
) -> Result<Json<Status>, StatusCode> {
    match store.count().await {
        Ok(clips) => Ok(Status { clips }.into()),
        Err(err) => {
            error!("Clip store is unavailable: {:?}", err);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}
