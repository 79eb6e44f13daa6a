//! Type-safe ID wrappers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! define_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Create a new ID.
            pub fn new(id: i64) -> Self {
                $name(id)
            }

            /// Get the raw integer.
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(n: i64) -> Self {
                $name(n)
            }
        }

        impl From<i32> for $name {
            fn from(n: i32) -> Self {
                $name(n.into())
            }
        }

        impl From<u32> for $name {
            fn from(n: u32) -> Self {
                $name(n.into())
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map($name)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(UserId, "A user account identifier.");
define_id!(ProductId, "A product identifier.");
define_id!(CategoryId, "A product category identifier.");
define_id!(ReviewId, "A product review identifier.");
define_id!(FavoriteId, "A favorites entry identifier.");
define_id!(CartItemId, "A cart line identifier.");
define_id!(OrderId, "An order identifier.");
