//! Store name and slug validation

use once_cell::sync::Lazy;
use regex::Regex;

use super::validation::required_text;
use super::ValidationError;

/// Maximum length for store names
const MAX_STORE_NAME_LEN: usize = 256;

/// Maximum length for store slugs
const MAX_SLUG_LEN: usize = 64;

/// Slug pattern: starts with alphanumeric, allows hyphens/underscores
static SLUG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9][a-z0-9_-]{0,63}$").expect("invalid slug regex")
});

/// Validated store display name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreName(String);

impl StoreName {
    /// Create a new store name.
    ///
    /// # Rules
    /// - Non-empty (after trimming whitespace)
    /// - Max 256 characters
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        required_text("store name", s, MAX_STORE_NAME_LEN).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validated store slug (unique across all stores)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreSlug(String);

impl StoreSlug {
    /// Create a new store slug, validating slug format.
    ///
    /// # Rules
    /// - Non-empty (after trimming whitespace), max 64 characters
    /// - Lowercase alphanumeric, hyphens, underscores
    /// - Must start with alphanumeric
    ///
    /// # Example
    /// ```
    /// use pagekit_server::models::StoreSlug;
    ///
    /// assert!(StoreSlug::new("shop").is_ok());
    /// assert!(StoreSlug::new("My Shop").is_err());
    /// assert!(StoreSlug::new("   ").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let slug = required_text("store slug", s, MAX_SLUG_LEN)?;

        if !SLUG_RE.is_match(&slug) {
            return Err(ValidationError::InvalidFormat {
                field: "store slug",
                reason: "must be lowercase alphanumeric with hyphens/underscores, starting with alphanumeric",
            });
        }

        Ok(Self(slug))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
