use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(MovieId);

/// Genre identifier as handed out by the catalog.
///
/// Data sources may key genres by integer or by string, so the id is kept as
/// text. It decodes from either a JSON string or a JSON integer and encodes
/// back to an integer whenever the text is a canonical integer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GenreId(pub String);

impl GenreId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Integer form of the id, when it has one.
    pub fn as_i64(&self) -> Option<i64> {
        let parsed = self.0.parse::<i64>().ok()?;
        (parsed.to_string() == self.0).then_some(parsed)
    }
}

impl From<i64> for GenreId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for GenreId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for GenreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for GenreId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_i64() {
            Some(value) => serializer.serialize_i64(value),
            None => serializer.serialize_str(&self.0),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawGenreId {
    Number(i64),
    Text(String),
}

impl<'de> Deserialize<'de> for GenreId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawGenreId::deserialize(deserializer)? {
            RawGenreId::Number(value) => Self::from(value),
            RawGenreId::Text(value) => Self(value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genre_id_decodes_from_number_or_string() {
        let numeric: GenreId = serde_json::from_str("7").expect("numeric id");
        let text: GenreId = serde_json::from_str("\"a\"").expect("text id");
        assert_eq!(numeric, GenreId::new("7"));
        assert_eq!(text, GenreId::new("a"));
    }

    #[test]
    fn genre_id_keeps_wire_representation() {
        assert_eq!(serde_json::to_string(&GenreId::from(3)).expect("json"), "3");
        assert_eq!(
            serde_json::to_string(&GenreId::new("a")).expect("json"),
            "\"a\""
        );
        assert_eq!(
            serde_json::to_string(&GenreId::new("007")).expect("json"),
            "\"007\""
        );
    }

    #[test]
    fn rejects_non_scalar_genre_id() {
        assert!(serde_json::from_str::<GenreId>("{\"id\":1}").is_err());
    }
}
