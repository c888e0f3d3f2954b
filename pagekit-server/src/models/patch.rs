//! Tri-state field wrapper for partial updates

use serde::{Deserialize, Deserializer};

use super::ValidationError;

/// A field in a partial-update payload.
///
/// Distinguishes a key that was never sent from one sent as `null`.
/// Struct fields using it must carry `#[serde(default)]` so a missing key
/// lands on `Absent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    /// Key not present: leave the stored value untouched
    Absent,
    /// Key present with `null`: clear the stored value
    Null,
    /// Key present with a value: overwrite
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Self::Absent
    }
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// For fields with no cleared state: `Null` is a validation error,
    /// `Absent` becomes `None`.
    pub fn required(self, field: &'static str) -> Result<Option<T>, ValidationError> {
        match self {
            Self::Absent => Ok(None),
            Self::Null => Err(ValidationError::Null { field }),
            Self::Value(v) => Ok(Some(v)),
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(|value| match value {
            Some(v) => Self::Value(v),
            None => Self::Null,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Update {
        #[serde(default)]
        name: Patch<String>,
        #[serde(default)]
        config: Patch<serde_json::Value>,
    }

    #[test]
    fn distinguishes_absent_null_and_value() {
        let u: Update = serde_json::from_str(r#"{"name": "x", "config": null}"#).unwrap();
        assert_eq!(u.name, Patch::Value("x".to_owned()));
        assert_eq!(u.config, Patch::Null);

        let u: Update = serde_json::from_str("{}").unwrap();
        assert!(u.name.is_absent());
        assert!(u.config.is_absent());
    }

    #[test]
    fn required_rejects_null() {
        assert_eq!(
            Patch::<String>::Null.required("page name"),
            Err(ValidationError::Null { field: "page name" })
        );
        assert_eq!(Patch::<String>::Absent.required("page name"), Ok(None));
    }
}
