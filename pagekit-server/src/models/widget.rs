//! Widget type set and configuration map

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Free-form, key-ordered widget configuration.
///
/// `serde_json::Map` is BTreeMap-backed, so keys serialize in sorted order.
pub type WidgetConfig = serde_json::Map<String, serde_json::Value>;

/// Closed set of widget kinds a page can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetType {
    Banner,
    ProductGrid,
    Text,
    Image,
    Spacer,
}

impl WidgetType {
    pub const ALL: [WidgetType; 5] = [
        Self::Banner,
        Self::ProductGrid,
        Self::Text,
        Self::Image,
        Self::Spacer,
    ];

    /// Get string representation (matches the `widgets.type` column).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Banner => "banner",
            Self::ProductGrid => "product_grid",
            Self::Text => "text",
            Self::Image => "image",
            Self::Spacer => "spacer",
        }
    }
}

impl fmt::Display for WidgetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised widget type string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown widget type '{0}'")]
pub struct UnknownWidgetType(pub String);

impl FromStr for WidgetType {
    type Err = UnknownWidgetType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownWidgetType(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_str_round_trips_through_from_str() {
        for t in WidgetType::ALL {
            assert_eq!(t.as_str().parse::<WidgetType>().unwrap(), t);
        }
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&WidgetType::ProductGrid).unwrap();
        assert_eq!(json, "\"product_grid\"");

        let parsed: WidgetType = serde_json::from_str("\"spacer\"").unwrap();
        assert_eq!(parsed, WidgetType::Spacer);
    }

    #[test]
    fn rejects_unknown_type() {
        assert!(serde_json::from_str::<WidgetType>("\"carousel\"").is_err());
        assert_eq!(
            "Banner".parse::<WidgetType>().unwrap_err(),
            UnknownWidgetType("Banner".into())
        );
    }

    #[test]
    fn config_keys_are_ordered() {
        let config: WidgetConfig =
            serde_json::from_str(r#"{"zeta": 1, "alpha": 2, "mid": 3}"#).unwrap();
        let keys: Vec<_> = config.keys().map(String::as_str).collect();
        assert_eq!(keys, ["alpha", "mid", "zeta"]);
    }
}
