//! Post payload validation.
//!
//! X counts text by weight: code points in the Latin, general punctuation
//! and related ranges weigh 1 and everything else (CJK, emoji) weighs 2.
//! The caption must fit in [`MAX_WEIGHTED_LENGTH`].

use crate::PublishError;

/// Weighted length limit of a post.
pub const MAX_WEIGHTED_LENGTH: usize = 280;

/// Largest accepted image in bytes.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

const ELLIPSIS: char = '\u{2026}';

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'];

/// Code point ranges that weigh 1.
const LIGHT_RANGES: [(u32, u32); 4] = [
    (0x0000, 0x10FF),
    (0x2000, 0x200D),
    (0x2010, 0x201F),
    (0x2032, 0x2037),
];

/// Weight of one character.
#[must_use]
pub fn char_weight(ch: char) -> usize {
    let code = u32::from(ch);
    if LIGHT_RANGES
        .iter()
        .any(|&(low, high)| (low..=high).contains(&code))
    {
        1
    } else {
        2
    }
}

/// Weighted length of `text`.
#[must_use]
pub fn weighted_length(text: &str) -> usize {
    text.chars().map(char_weight).sum()
}

/// Cuts `text` so its weighted length is at most `limit`, ending it with
/// an ellipsis when anything was removed.
#[must_use]
pub fn truncate_weighted(text: &str, limit: usize) -> String {
    if weighted_length(text) <= limit {
        return text.to_string();
    }

    let budget = limit.saturating_sub(char_weight(ELLIPSIS));
    let mut used = 0;
    let mut kept = String::new();
    for ch in text.chars() {
        let weight = char_weight(ch);
        if used + weight > budget {
            break;
        }
        used += weight;
        kept.push(ch);
    }

    let mut truncated = kept.trim_end().to_string();
    truncated.push(ELLIPSIS);
    truncated
}

/// A caption and image ready to submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    caption: String,
    image: Vec<u8>,
}

impl Post {
    /// Builds a post, truncating the caption to the weighted limit.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::InvalidPayload`] if `png` is not a PNG image
    /// or is larger than [`MAX_IMAGE_BYTES`].
    pub fn new(caption: &str, png: Vec<u8>) -> Result<Self, PublishError> {
        if !png.starts_with(&PNG_SIGNATURE) {
            return Err(PublishError::InvalidPayload {
                message: "image is not a PNG".to_string(),
            });
        }
        if png.len() > MAX_IMAGE_BYTES {
            return Err(PublishError::InvalidPayload {
                message: format!(
                    "image is {} bytes, limit is {MAX_IMAGE_BYTES}",
                    png.len()
                ),
            });
        }

        let truncated = truncate_weighted(caption, MAX_WEIGHTED_LENGTH);
        if truncated.len() != caption.len() {
            log::warn!(
                "Caption weighs {} and was truncated to {MAX_WEIGHTED_LENGTH}",
                weighted_length(caption)
            );
        }

        Ok(Self {
            caption: truncated,
            image: png,
        })
    }

    /// Caption text, within the weighted limit.
    #[must_use]
    pub fn caption(&self) -> &str {
        &self.caption
    }

    /// PNG image bytes.
    #[must_use]
    pub fn image(&self) -> &[u8] {
        &self.image
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(len: usize) -> Vec<u8> {
        let mut bytes = PNG_SIGNATURE.to_vec();
        bytes.resize(len.max(PNG_SIGNATURE.len()), 0);
        bytes
    }

    #[test]
    fn latin_weighs_one_and_emoji_two() {
        assert_eq!(weighted_length("M6.0"), 4);
        assert_eq!(weighted_length("\u{1F30D}"), 2);
        assert_eq!(weighted_length("\u{2026}"), 2);
        assert_eq!(weighted_length("\u{201C}q\u{201D}"), 3);
    }

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(truncate_weighted("hello", 280), "hello");
    }

    #[test]
    fn long_text_is_cut_with_ellipsis() {
        let text = "a".repeat(300);
        let truncated = truncate_weighted(&text, 280);
        assert_eq!(weighted_length(&truncated), 280);
        assert!(truncated.ends_with('\u{2026}'));
    }

    #[test]
    fn wide_characters_are_never_split_over_limit() {
        let text = "\u{1F534}".repeat(200);
        let truncated = truncate_weighted(&text, 280);
        assert!(weighted_length(&truncated) <= 280);
        assert!(truncated.ends_with('\u{2026}'));
    }

    #[test]
    fn trailing_whitespace_is_dropped_before_ellipsis() {
        let text = format!("{} {}", "a".repeat(277), "b".repeat(10));
        let truncated = truncate_weighted(&text, 280);
        assert_eq!(truncated, format!("{}\u{2026}", "a".repeat(277)));
    }

    #[test]
    fn post_truncates_caption() {
        let post = Post::new(&"x".repeat(400), png(64)).unwrap();
        assert!(weighted_length(post.caption()) <= MAX_WEIGHTED_LENGTH);
        assert_eq!(post.image().len(), 64);
    }

    #[test]
    fn post_rejects_non_png() {
        let result = Post::new("caption", b"GIF89a....".to_vec());
        assert!(matches!(result, Err(PublishError::InvalidPayload { .. })));
    }

    #[test]
    fn post_rejects_oversized_image() {
        let result = Post::new("caption", png(MAX_IMAGE_BYTES + 1));
        assert!(matches!(result, Err(PublishError::InvalidPayload { .. })));
    }
}
