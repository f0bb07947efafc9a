use earmark_api_structs::{Clip, NewClip};
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_RANGE},
    Client, RequestBuilder, Response,
};
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use super::ClipStore;
use crate::config;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// A clip store backed by a hosted PostgREST endpoint.
///
/// The handle is cheap to clone; clones share the underlying connection pool.
#[derive(Clone, Debug)]
pub struct PostgrestStore {
    client: Client,
    table_url: Url,
}

/// The error document PostgREST returns alongside a non-2xx status.
#[derive(Deserialize)]
struct ErrorDocument {
    message: String,
}

impl PostgrestStore {
    /// Build a store handle from the `[store]` configuration section.
    pub fn new(store: &config::Store) -> Result<Self, crate::Error> {
        let (url, api_key) = store.connection()?;
        let table_url = url
            .join("rest/v1/")
            .and_then(|rest| rest.join(&store.table))
            .map_err(|e| crate::Error::ConfigValueError(format!("invalid store URL: {e}")))?;

        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&api_key)
            .map_err(|_| crate::Error::ConfigValueError("invalid store API key".into()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|_| crate::Error::ConfigValueError("invalid store API key".into()))?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let client = reqwest::ClientBuilder::new()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(store.timeout())
            .build()?;

        Ok(PostgrestStore { client, table_url })
    }

    fn table(&self, query: &[(&str, &str)]) -> Url {
        let mut url = self.table_url.clone();
        url.query_pairs_mut().extend_pairs(query);
        url
    }

    async fn send(request: RequestBuilder) -> Result<Response, crate::Error> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorDocument>(&body)
            .map(|doc| doc.message)
            .unwrap_or(body);
        Err(crate::Error::Store { status, message })
    }
}

impl ClipStore for PostgrestStore {
    #[instrument(skip_all)]
    async fn list(&self) -> Result<Vec<Clip>, crate::Error> {
        let url = self.table(&[("select", "*"), ("order", "created_at.desc")]);
        let clips = Self::send(self.client.get(url))
            .await?
            .json::<Vec<Clip>>()
            .await?;
        debug!(clips = clips.len(), "Listed clips");
        Ok(clips)
    }

    #[instrument(skip_all)]
    async fn count(&self) -> Result<u64, crate::Error> {
        let url = self.table(&[("select", "*")]);
        let response = Self::send(self.client.head(url).header("Prefer", "count=exact")).await?;
        let range = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                crate::Error::UnexpectedResponse("missing Content-Range header".into())
            })?;
        total_from_content_range(range).ok_or_else(|| {
            crate::Error::UnexpectedResponse(format!("unusable Content-Range header '{range}'"))
        })
    }

    #[instrument(skip(self))]
    async fn fetch_at(&self, offset: u64) -> Result<Option<Clip>, crate::Error> {
        let offset = offset.to_string();
        let url = self.table(&[("select", "*"), ("offset", &offset), ("limit", "1")]);
        let mut clips = Self::send(self.client.get(url))
            .await?
            .json::<Vec<Clip>>()
            .await?;
        Ok(if clips.is_empty() {
            None
        } else {
            Some(clips.swap_remove(0))
        })
    }

    #[instrument(skip(self))]
    async fn insert(&self, clip: NewClip) -> Result<Clip, crate::Error> {
        let url = self.table(&[("select", "*")]);
        let request = self
            .client
            .post(url)
            .header("Prefer", "return=representation")
            .json(&[clip]);
        Self::send(request)
            .await?
            .json::<Vec<Clip>>()
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                crate::Error::UnexpectedResponse("the store returned no row for the insert".into())
            })
    }
}

/// Pull the total out of a `Content-Range` header such as `0-24/3573` or `*/0`.
fn total_from_content_range(range: &str) -> Option<u64> {
    range.rsplit_once('/')?.1.trim().parse().ok()
}
