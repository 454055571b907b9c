//! X API user-context credentials.

use crate::PublishError;

/// Environment variable holding the consumer (API) key.
pub const API_KEY: &str = "API_KEY";
/// Environment variable holding the consumer (API) secret.
pub const API_KEY_SECRET: &str = "API_KEY_SECRET";
/// Environment variable holding the access token.
pub const ACCESS_TOKEN: &str = "ACCESS_TOKEN";
/// Environment variable holding the access token secret.
pub const ACCESS_TOKEN_SECRET: &str = "ACCESS_TOKEN_SECRET";

/// The four OAuth 1.0a values needed to post on behalf of the account.
///
/// `Debug` never prints the values.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub(crate) consumer_key: String,
    pub(crate) consumer_secret: String,
    pub(crate) access_token: String,
    pub(crate) access_token_secret: String,
}

impl Credentials {
    /// Builds credentials from explicit values.
    #[must_use]
    pub fn new(
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
        access_token: impl Into<String>,
        access_token_secret: impl Into<String>,
    ) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            access_token: access_token.into(),
            access_token_secret: access_token_secret.into(),
        }
    }

    /// Reads the credentials from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::MissingCredential`] naming the first
    /// variable that is unset or empty.
    pub fn from_env() -> Result<Self, PublishError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the credentials through `lookup`, which maps a variable name
    /// to its value.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::MissingCredential`] naming the first
    /// variable that `lookup` cannot resolve to a non-blank value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, PublishError> {
        let read = |name: &'static str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or(PublishError::MissingCredential { name })
        };

        Ok(Self {
            consumer_key: read(API_KEY)?,
            consumer_secret: read(API_KEY_SECRET)?,
            access_token: read(ACCESS_TOKEN)?,
            access_token_secret: read(ACCESS_TOKEN_SECRET)?,
        })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &"<redacted>")
            .field("consumer_secret", &"<redacted>")
            .field("access_token", &"<redacted>")
            .field("access_token_secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn reads_all_four_values() {
        let credentials = Credentials::from_lookup(lookup_from(&[
            (API_KEY, "ck"),
            (API_KEY_SECRET, "cs"),
            (ACCESS_TOKEN, "at"),
            (ACCESS_TOKEN_SECRET, "ats"),
        ]))
        .unwrap();

        assert_eq!(credentials, Credentials::new("ck", "cs", "at", "ats"));
    }

    #[test]
    fn missing_value_is_named() {
        let result = Credentials::from_lookup(lookup_from(&[
            (API_KEY, "ck"),
            (API_KEY_SECRET, "cs"),
            (ACCESS_TOKEN_SECRET, "ats"),
        ]));

        assert!(matches!(
            result,
            Err(PublishError::MissingCredential { name: ACCESS_TOKEN })
        ));
    }

    #[test]
    fn blank_value_counts_as_missing() {
        let result = Credentials::from_lookup(lookup_from(&[
            (API_KEY, "  "),
            (API_KEY_SECRET, "cs"),
            (ACCESS_TOKEN, "at"),
            (ACCESS_TOKEN_SECRET, "ats"),
        ]));

        assert!(matches!(
            result,
            Err(PublishError::MissingCredential { name: API_KEY })
        ));
    }

    #[test]
    fn debug_output_is_redacted() {
        let credentials = Credentials::new("key-value", "secret-value", "token-value", "ts");
        let debug = format!("{credentials:?}");

        assert!(!debug.contains("key-value"));
        assert!(!debug.contains("secret-value"));
        assert!(!debug.contains("token-value"));
        assert!(debug.contains("<redacted>"));
    }
}
