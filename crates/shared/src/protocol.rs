use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{GenreId, MovieId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    pub plot: String,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wikipedia_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "release_date"
    )]
    pub release_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre_id: Option<GenreId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: GenreId,
    pub name: String,
}

/// Release dates travel as `YYYY-MM-DD`. Full RFC 3339 timestamps are also
/// accepted on input; only their calendar date is kept.
pub mod release_date {
    use chrono::{DateTime, NaiveDate};
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => serializer.serialize_str(&date.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        let Some(raw) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        parse(&raw).map(Some).map_err(D::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<NaiveDate, String> {
        let raw = raw.trim();
        if let Ok(date) = NaiveDate::parse_from_str(raw, FORMAT) {
            return Ok(date);
        }
        DateTime::parse_from_rfc3339(raw)
            .map(|timestamp| timestamp.date_naive())
            .map_err(|_| format!("invalid release date '{raw}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_movie_with_optional_fields_missing() {
        let movie: Movie = serde_json::from_str(
            r#"{"id":1,"title":"Alien","plot":"In space.","imageUrl":"https://img/alien.jpg"}"#,
        )
        .expect("movie");
        assert_eq!(movie.id, MovieId(1));
        assert!(movie.wikipedia_url.is_none());
        assert!(movie.year.is_none());
        assert!(movie.release_date.is_none());
        assert!(movie.rating.is_none());
        assert!(movie.genre_id.is_none());
    }

    #[test]
    fn decodes_release_date_from_date_or_timestamp() {
        let movie: Movie = serde_json::from_str(
            r#"{"id":2,"title":"Heat","plot":"L.A.","imageUrl":"x","releaseDate":"1995-12-15T00:00:00+00:00","rating":8.3,"year":1995,"genreId":4}"#,
        )
        .expect("movie");
        assert_eq!(
            movie.release_date,
            NaiveDate::from_ymd_opt(1995, 12, 15)
        );
        assert_eq!(movie.rating, Some(8.3));
        assert_eq!(movie.genre_id, Some(GenreId::from(4)));

        let encoded = serde_json::to_value(&movie).expect("json");
        assert_eq!(encoded["releaseDate"], "1995-12-15");
        assert_eq!(encoded["imageUrl"], "x");
    }

    #[test]
    fn null_release_date_is_absent() {
        let movie: Movie = serde_json::from_str(
            r#"{"id":3,"title":"T","plot":"P","imageUrl":"x","releaseDate":null}"#,
        )
        .expect("movie");
        assert!(movie.release_date.is_none());
    }

    #[test]
    fn rejects_garbage_release_date() {
        let err = serde_json::from_str::<Movie>(
            r#"{"id":3,"title":"T","plot":"P","imageUrl":"x","releaseDate":"soon"}"#,
        )
        .expect_err("must fail");
        assert!(err.to_string().contains("invalid release date"));
    }
}
