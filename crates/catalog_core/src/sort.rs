//! Ordering of movie collections by recency or rating.
//!
//! Each sort key carries its own [`Direction`] toggle. The toggle names what the
//! *next* click does: while a key sits at [`Direction::Ascending`] a click orders
//! the collection highest-first, then the toggle flips to
//! [`Direction::Descending`] so the following click orders lowest-first.
//!
//! Movies missing the sorted field always go after every movie that has it, in
//! both directions. Movies comparing equal keep their relative order.

use std::{cmp::Ordering, fmt, str::FromStr};

use shared::protocol::Movie;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    /// Release date.
    Recency,
    Rating,
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recency => f.write_str("recency"),
            Self::Rating => f.write_str("rating"),
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "recency" | "recent" | "date" => Ok(Self::Recency),
            "rating" => Ok(Self::Rating),
            other => Err(format!("unknown sort key '{other}' (expected recency or rating)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

impl Direction {
    pub fn flipped(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    /// Order applied to present values when a click happens in this state.
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering.reverse(),
            Self::Descending => ordering,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortToggles {
    pub recency: Direction,
    pub rating: Direction,
}

impl SortToggles {
    pub fn get(&self, key: SortKey) -> Direction {
        match key {
            SortKey::Recency => self.recency,
            SortKey::Rating => self.rating,
        }
    }

    /// Copy of the toggles with only `key` flipped.
    pub fn flipped(mut self, key: SortKey) -> Self {
        match key {
            SortKey::Recency => self.recency = self.recency.flipped(),
            SortKey::Rating => self.rating = self.rating.flipped(),
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortOutcome {
    pub movies: Vec<Movie>,
    pub toggles: SortToggles,
}

pub struct SortEngine;

impl SortEngine {
    /// One sort click: reads the key's direction once, orders a copy of
    /// `movies`, and returns it with that key's toggle flipped.
    pub fn click(movies: &[Movie], key: SortKey, toggles: SortToggles) -> SortOutcome {
        let direction = toggles.get(key);
        SortOutcome {
            movies: sort_movies(movies, key, direction),
            toggles: toggles.flipped(key),
        }
    }
}

pub fn sort_movies(movies: &[Movie], key: SortKey, direction: Direction) -> Vec<Movie> {
    let mut sorted = movies.to_vec();
    sorted.sort_by(|a, b| compare(a, b, key, direction));
    sorted
}

fn compare(a: &Movie, b: &Movie, key: SortKey, direction: Direction) -> Ordering {
    match key {
        SortKey::Recency => {
            compare_present_first(a.release_date, b.release_date, direction, Ord::cmp)
        }
        SortKey::Rating => {
            compare_present_first(a.rating, b.rating, direction, |x: &f64, y: &f64| {
                x.total_cmp(y)
            })
        }
    }
}

fn compare_present_first<T>(
    a: Option<T>,
    b: Option<T>,
    direction: Direction,
    cmp: impl Fn(&T, &T) -> Ordering,
) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => direction.apply(cmp(&a, &b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
#[path = "tests/sort_tests.rs"]
mod tests;
