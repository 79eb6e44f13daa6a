//! Review models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ProductId, ReviewId};

/// A customer review of a product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Review {
    pub id: ReviewId,
    pub product: Option<ProductId>,
    pub user_name: String,
    /// Star rating, 1 to 5.
    pub rating: u8,
    pub comment: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Review submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewReview {
    pub rating: u8,
    pub comment: String,
}

impl NewReview {
    pub fn new(rating: u8, comment: impl Into<String>) -> Self {
        Self {
            rating,
            comment: comment.into(),
        }
    }
}
