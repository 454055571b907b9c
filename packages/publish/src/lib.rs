#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Publishing the daily map and caption.
//!
//! A [`Post`] is validated when it is built, so a [`Publisher`] only ever
//! sees a caption that fits and a PNG the service accepts. [`XPublisher`]
//! submits it to X with OAuth 1.0a user-context signing.
//!
//! Publishing is attempted once. Every failure is returned to the caller
//! as a [`PublishError`]; nothing is retried here.

pub mod credentials;
pub mod oauth;
pub mod post;
pub mod x;

use async_trait::async_trait;

pub use credentials::Credentials;
pub use post::Post;
pub use x::XPublisher;

/// Errors that can occur while publishing.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// A required credential environment variable is missing or empty.
    #[error("missing credential: {name}")]
    MissingCredential {
        /// Name of the environment variable.
        name: &'static str,
    },

    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service throttled the request.
    #[error("rate limited: {detail}")]
    RateLimited {
        /// Detail reported by the service.
        detail: String,
    },

    /// The credentials were refused.
    #[error("unauthorized (HTTP {status}): {detail}")]
    Unauthorized {
        /// Response status code.
        status: u16,
        /// Detail reported by the service.
        detail: String,
    },

    /// The service rejected the request for another reason.
    #[error("rejected (HTTP {status}): {detail}")]
    Rejected {
        /// Response status code.
        status: u16,
        /// Detail reported by the service.
        detail: String,
    },

    /// The post cannot be submitted as built.
    #[error("invalid payload: {message}")]
    InvalidPayload {
        /// Description of what went wrong.
        message: String,
    },

    /// Request signing failed.
    #[error("signing failed: {message}")]
    Signing {
        /// Description of what went wrong.
        message: String,
    },

    /// A success response did not have the expected shape.
    #[error("unexpected response: {message}")]
    UnexpectedResponse {
        /// Description of what went wrong.
        message: String,
    },
}

/// Identifier the service assigned to a published post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostId(pub String);

impl std::fmt::Display for PostId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trait implemented by every publishing target.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Returns a short human-readable name (e.g., `"X"`).
    fn name(&self) -> &str;

    /// Publishes `post` and returns the identifier of the created post.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError`] if the target cannot be reached or refuses
    /// the post. No retry is attempted.
    async fn publish(&self, post: &Post) -> Result<PostId, PublishError>;
}
