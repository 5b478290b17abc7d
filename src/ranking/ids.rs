//! Typed identifiers so query, document and entity keys never mix.

use serde::Serialize;
use std::fmt;
use std::hash::Hash;

/// Identifier usable as a ranked candidate (document or entity).
pub trait CandidateId: Clone + Eq + Hash + Ord + fmt::Display + From<String> {
    fn as_str(&self) -> &str;
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Topic identifier joining rankings, qrels and link data.
    QueryId
);
string_id!(
    /// Document identifier.
    DocId
);
string_id!(
    /// Entity identifier.
    EntityId
);

impl CandidateId for DocId {
    fn as_str(&self) -> &str {
        &self.0
    }
}

impl CandidateId for EntityId {
    fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_display_their_raw_text() {
        assert_eq!(QueryId::new("301").to_string(), "301");
        assert_eq!(DocId::from("clueweb-0001").as_str(), "clueweb-0001");
        assert_eq!(EntityId::from("Q42".to_string()).to_string(), "Q42");
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let json = serde_json::to_string(&EntityId::new("12")).unwrap();
        assert_eq!(json, "\"12\"");
    }
}
