#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

const MAX_ID_LEN: usize = 128;
pub const MAX_SLUG_LEN: usize = 160;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn try_new(value: impl Into<String>) -> Result<Self, ContentIdError> {
        let value = value.into();
        validate_identifier(&value).map_err(ContentIdError)?;
        Ok(Self(value))
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn try_new(value: impl Into<String>) -> Result<Self, OwnerIdError> {
        let value = value.into();
        validate_identifier(&value).map_err(OwnerIdError)?;
        Ok(Self(value))
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum IdentifierError {
    #[error("must not be empty")]
    Empty,
    #[error("is too long")]
    TooLong,
    #[error("must not have surrounding whitespace")]
    Untrimmed,
    #[error("contains control characters")]
    ContainsControl,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("content id {0}")]
pub struct ContentIdError(pub IdentifierError);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("owner id {0}")]
pub struct OwnerIdError(pub IdentifierError);

fn validate_identifier(value: &str) -> Result<(), IdentifierError> {
    if value.trim().is_empty() {
        return Err(IdentifierError::Empty);
    }
    if value.len() > MAX_ID_LEN {
        return Err(IdentifierError::TooLong);
    }
    if value.trim() != value {
        return Err(IdentifierError::Untrimmed);
    }
    if value.chars().any(|c| c.is_control()) {
        return Err(IdentifierError::ContainsControl);
    }
    Ok(())
}

/// Human-readable root identifier, unique per owner.
///
/// Slugs are lowercase ASCII alphanumerics separated by single dashes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn try_new(value: impl Into<String>) -> Result<Self, SlugError> {
        let value = value.into();
        validate_slug(&value)?;
        Ok(Self(value))
    }

    /// Derives a slug from a title, or `None` when the title has no usable characters.
    pub fn from_title(title: &str) -> Option<Self> {
        let mut out = String::with_capacity(title.len().min(MAX_SLUG_LEN));
        let mut pending_dash = false;
        for ch in title.chars() {
            if ch.is_ascii_alphanumeric() {
                if pending_dash && !out.is_empty() {
                    out.push('-');
                }
                pending_dash = false;
                out.push(ch.to_ascii_lowercase());
            } else {
                pending_dash = true;
            }
            if out.len() >= MAX_SLUG_LEN {
                break;
            }
        }
        out.truncate(MAX_SLUG_LEN);
        while out.ends_with('-') {
            out.pop();
        }
        if out.is_empty() { None } else { Some(Self(out)) }
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SlugError {
    #[error("slug must not be empty")]
    Empty,
    #[error("slug is too long")]
    TooLong,
    #[error("slug contains invalid character {ch:?} at {index}")]
    InvalidChar { ch: char, index: usize },
    #[error("slug must not start or end with '-' or contain '--'")]
    MisplacedDash,
}

fn validate_slug(value: &str) -> Result<(), SlugError> {
    if value.is_empty() {
        return Err(SlugError::Empty);
    }
    if value.len() > MAX_SLUG_LEN {
        return Err(SlugError::TooLong);
    }
    for (index, ch) in value.chars().enumerate() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-' {
            continue;
        }
        return Err(SlugError::InvalidChar { ch, index });
    }
    if value.starts_with('-') || value.ends_with('-') || value.contains("--") {
        return Err(SlugError::MisplacedDash);
    }
    Ok(())
}
