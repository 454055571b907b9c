//! X (Twitter) publisher.
//!
//! Posting takes two signed requests: the PNG goes to the v1.1 media
//! upload endpoint as multipart form data, then a v2 create-post request
//! attaches the returned media id to the caption.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::{Credentials, Post, PostId, PublishError, Publisher, oauth};

/// Default v1.1 media upload endpoint.
pub const DEFAULT_MEDIA_UPLOAD_URL: &str = "https://upload.twitter.com/1.1/media/upload.json";

/// Default v2 create-post endpoint.
pub const DEFAULT_CREATE_POST_URL: &str = "https://api.twitter.com/2/tweets";

/// Longest service error detail kept in a [`PublishError`].
const MAX_DETAIL_LEN: usize = 300;

/// Publishes to X with OAuth 1.0a user-context credentials.
pub struct XPublisher {
    client: reqwest::Client,
    credentials: Credentials,
    media_upload_url: String,
    create_post_url: String,
}

#[derive(Deserialize)]
struct MediaUploadResponse {
    media_id_string: String,
}

#[derive(Serialize)]
struct CreatePostRequest<'a> {
    text: &'a str,
    media: CreatePostMedia<'a>,
}

#[derive(Serialize)]
struct CreatePostMedia<'a> {
    media_ids: [&'a str; 1],
}

#[derive(Deserialize)]
struct CreatePostResponse {
    data: CreatedPost,
}

#[derive(Deserialize)]
struct CreatedPost {
    id: String,
}

impl XPublisher {
    /// Creates a publisher using the default endpoints, failing requests
    /// that take longer than `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Http`] if the HTTP client cannot be built.
    pub fn new(credentials: Credentials, timeout: Duration) -> Result<Self, PublishError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("daily_quakes/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            credentials,
            media_upload_url: DEFAULT_MEDIA_UPLOAD_URL.to_string(),
            create_post_url: DEFAULT_CREATE_POST_URL.to_string(),
        })
    }

    /// Overrides the two endpoints.
    #[must_use]
    pub fn with_endpoints(
        mut self,
        media_upload_url: impl Into<String>,
        create_post_url: impl Into<String>,
    ) -> Self {
        self.media_upload_url = media_upload_url.into();
        self.create_post_url = create_post_url.into();
        self
    }

    fn authorization(&self, url: &str) -> Result<String, PublishError> {
        let nonce = uuid::Uuid::new_v4().simple().to_string();
        let timestamp = chrono::Utc::now().timestamp();
        oauth::authorization_header("POST", url, &[], &self.credentials, &nonce, timestamp)
    }

    async fn upload_media(&self, png: &[u8]) -> Result<String, PublishError> {
        let part = reqwest::multipart::Part::bytes(png.to_vec())
            .file_name("map.png")
            .mime_str("image/png")?;
        let form = reqwest::multipart::Form::new().part("media", part);

        let resp = self
            .client
            .post(&self.media_upload_url)
            .header(
                reqwest::header::AUTHORIZATION,
                self.authorization(&self.media_upload_url)?,
            )
            .multipart(form)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(classify(status, &body));
        }

        let upload: MediaUploadResponse =
            serde_json::from_str(&body).map_err(|e| PublishError::UnexpectedResponse {
                message: format!("media upload: {e}"),
            })?;
        Ok(upload.media_id_string)
    }

    async fn create_post(&self, text: &str, media_id: &str) -> Result<PostId, PublishError> {
        let request = CreatePostRequest {
            text,
            media: CreatePostMedia {
                media_ids: [media_id],
            },
        };

        let resp = self
            .client
            .post(&self.create_post_url)
            .header(
                reqwest::header::AUTHORIZATION,
                self.authorization(&self.create_post_url)?,
            )
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(classify(status, &body));
        }

        let created: CreatePostResponse =
            serde_json::from_str(&body).map_err(|e| PublishError::UnexpectedResponse {
                message: format!("create post: {e}"),
            })?;
        Ok(PostId(created.data.id))
    }
}

#[async_trait]
impl Publisher for XPublisher {
    fn name(&self) -> &str {
        "X"
    }

    async fn publish(&self, post: &Post) -> Result<PostId, PublishError> {
        log::info!("Uploading map image ({} bytes)", post.image().len());
        let media_id = self.upload_media(post.image()).await?;
        log::debug!("Uploaded media {media_id}");

        let id = self.create_post(post.caption(), &media_id).await?;
        log::info!("Created post {id}");
        Ok(id)
    }
}

/// Maps a non-success response to the matching [`PublishError`].
#[must_use]
pub fn classify(status: StatusCode, body: &str) -> PublishError {
    let detail = error_detail(status, body);
    match status {
        StatusCode::TOO_MANY_REQUESTS => PublishError::RateLimited { detail },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PublishError::Unauthorized {
            status: status.as_u16(),
            detail,
        },
        _ => PublishError::Rejected {
            status: status.as_u16(),
            detail,
        },
    }
}

/// Pulls a readable message out of an error body.
///
/// Understands the v2 problem shape (`detail`/`title`) and the v1.1
/// `errors[].message` shape; anything else is passed through, shortened.
fn error_detail(status: StatusCode, body: &str) -> String {
    let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
    let message = parsed.as_ref().and_then(|value| {
        value["detail"]
            .as_str()
            .or_else(|| value["title"].as_str())
            .or_else(|| value["errors"][0]["message"].as_str())
            .map(str::to_string)
    });

    match message {
        Some(message) => message,
        None if body.trim().is_empty() => status.to_string(),
        None => body.trim().chars().take(MAX_DETAIL_LEN).collect(),
    }
}
