use std::time::Duration;

use earmark_api_structs::{Clip, ErrorBody, NewClip};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};

use crate::Error;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// A client for the Earmark clip API.
pub struct ApiClient {
    client: Client,
    base: Url,
}

impl ApiClient {
    /// Requests resolve relative to `base`, so a server mounted under a path keeps its prefix.
    pub fn new(mut base: Url) -> Result<Self, Error> {
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = reqwest::ClientBuilder::new()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(ApiClient { client, base })
    }

    async fn send(request: RequestBuilder) -> Result<Response, Error> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .json::<ErrorBody>()
            .await
            .map(|body| body.error)
            .unwrap_or_else(|_| status.to_string());
        Err(Error::Api { status, message })
    }

    /// Every saved clip, newest first.
    pub async fn clips(&self) -> Result<Vec<Clip>, Error> {
        let url = self.base.join("api/clips")?;
        Ok(Self::send(self.client.get(url)).await?.json().await?)
    }

    /// One clip picked at random by the server.
    pub async fn random_clip(&self) -> Result<Clip, Error> {
        let url = self.base.join("api/clips/random")?;
        match Self::send(self.client.get(url)).await {
            Ok(response) => Ok(response.json().await?),
            Err(Error::Api { status, .. }) if status == StatusCode::NOT_FOUND => {
                Err(Error::NoClips)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn create_clip(&self, clip: &NewClip) -> Result<Clip, Error> {
        let url = self.base.join("api/clips")?;
        Ok(Self::send(self.client.post(url).json(clip))
            .await?
            .json()
            .await?)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use axum::{
        http::StatusCode,
        response::IntoResponse,
        routing::{get, post},
        Json, Router,
    };
    use chrono::Utc;
    use serde_json::json;

    use super::*;

    async fn created(Json(clip): Json<NewClip>) -> impl IntoResponse {
        (StatusCode::CREATED, Json(clip.into_clip("7".to_string(), Utc::now())))
    }

    async fn no_clips() -> impl IntoResponse {
        (StatusCode::NOT_FOUND, Json(json!({"error": "No clips found"})))
    }

    async fn broken() -> impl IntoResponse {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "Internal server error"})),
        )
    }

    async fn bad_gateway() -> impl IntoResponse {
        (StatusCode::BAD_GATEWAY, "upstream went away")
    }

    /// Serve `router` on a random local port.
    pub(crate) async fn serve(router: Router) -> Url {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        Url::parse(&format!("http://{addr}/")).unwrap()
    }

    /// An Earmark server with no clips that accepts every new one.
    pub(crate) async fn fake_api() -> ApiClient {
        let router = Router::new()
            .route("/api/clips", post(created))
            .route("/api/clips/random", get(no_clips));
        ApiClient::new(serve(router).await).unwrap()
    }

    fn new_clip() -> NewClip {
        NewClip {
            title: "Intro".to_string(),
            audio_url: "https://x/a.mp3".to_string(),
            start_time: 5.0,
            end_time: 12.0,
        }
    }

    #[tokio::test]
    async fn test_create_clip() {
        let api = fake_api().await;
        let clip = api.create_clip(&new_clip()).await.unwrap();
        assert_eq!(clip.id, "7");
        assert_eq!(clip.title, "Intro");
        assert_eq!((clip.start_time, clip.end_time), (5.0, 12.0));
    }

    #[tokio::test]
    async fn test_empty_library_has_no_quote() {
        let api = fake_api().await;
        let err = api.random_clip().await.unwrap_err();
        assert!(matches!(err, Error::NoClips));
        assert_eq!(err.to_string(), "No clips available for today");
    }

    #[tokio::test]
    async fn test_error_body_becomes_api_error() {
        let router = Router::new().route("/api/clips", get(broken));
        let api = ApiClient::new(serve(router).await).unwrap();
        match api.clips().await {
            Err(Error::Api { status, message }) => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(message, "Internal server error");
            }
            other => panic!("expected an API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unexpected_body_falls_back_to_status() {
        let router = Router::new().route("/api/clips/random", get(bad_gateway));
        let api = ApiClient::new(serve(router).await).unwrap();
        match api.random_clip().await {
            Err(Error::Api { status, message }) => {
                assert_eq!(status, StatusCode::BAD_GATEWAY);
                assert_eq!(message, "502 Bad Gateway");
            }
            other => panic!("expected an API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_base_path_is_kept() {
        let router = Router::new().route("/earmark/api/clips", post(created));
        let base = serve(router).await.join("earmark").unwrap();
        assert_eq!(base.path(), "/earmark");

        let api = ApiClient::new(base).unwrap();
        assert_eq!(api.create_clip(&new_clip()).await.unwrap().title, "Intro");
    }
}
