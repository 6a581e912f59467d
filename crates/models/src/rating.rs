use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// A course rating, always one of 1 through 5
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: i32 = 1;
    pub const MAX: i32 = 5;

    /// The allowed values, lowest first
    pub const CHOICES: [i32; 5] = [1, 2, 3, 4, 5];

    pub fn new(value: i32) -> Result<Self, InvalidRating> {
        Self::try_from(value)
    }

    pub fn value(self) -> i32 {
        i32::from(self.0)
    }
}

/// Error for a rating outside of 1..=5
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidRating(pub i32);

impl Display for InvalidRating {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "Select a valid choice. {} is not one of the available choices.",
            self.0
        )
    }
}

impl std::error::Error for InvalidRating {}

impl TryFrom<i32> for Rating {
    type Error = InvalidRating;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(InvalidRating(value))
        }
    }
}

impl From<Rating> for i32 {
    fn from(rating: Rating) -> Self {
        rating.value()
    }
}

impl Display for Rating {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

/// Mean of the given ratings, or `None` when there are none
pub fn average(ratings: &[i32]) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }

    let total: i64 = ratings.iter().map(|&r| i64::from(r)).sum();
    Some(total as f64 / ratings.len() as f64)
}
