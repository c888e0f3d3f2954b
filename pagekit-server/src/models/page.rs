//! Page name and route validation

use super::validation::required_text;
use super::ValidationError;

/// Maximum length for page names
const MAX_PAGE_NAME_LEN: usize = 256;

/// Maximum length for page routes
const MAX_ROUTE_LEN: usize = 512;

/// Validated page name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageName(String);

impl PageName {
    /// Create a new page name.
    ///
    /// # Example
    /// ```
    /// use pagekit_server::models::PageName;
    ///
    /// assert_eq!(PageName::new("  Home ").unwrap().as_str(), "Home");
    /// assert!(PageName::new("").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        required_text("page name", s, MAX_PAGE_NAME_LEN).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validated page route, unique within its store
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageRoute(String);

impl PageRoute {
    /// Create a new page route.
    ///
    /// # Rules
    /// - Non-empty (after trimming whitespace)
    /// - Max 512 characters
    /// - No interior whitespace
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let route = required_text("page route", s, MAX_ROUTE_LEN)?;

        if route.chars().any(char::is_whitespace) {
            return Err(ValidationError::InvalidFormat {
                field: "page route",
                reason: "must not contain whitespace",
            });
        }

        Ok(Self(route))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
