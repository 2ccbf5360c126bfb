//! Shop categories recognised by discovery.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of alcohol-selling place, derived from `OpenStreetMap` tags.
///
/// Serialized as `type` in API responses, matching the client's field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "thekawatch.shop_category", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ShopCategory {
    /// `shop=alcohol` (liquor store, "theka").
    #[default]
    Alcohol,
    /// `shop=beverages`.
    Beverages,
    /// `amenity=bar`.
    Bar,
}

/// Returned when parsing a category name that is not one of the fixed set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid shop category: {0}")]
pub struct UnknownCategory(pub String);

impl ShopCategory {
    /// All categories, in the order discovery queries them.
    pub const ALL: [Self; 3] = [Self::Alcohol, Self::Beverages, Self::Bar];

    /// Lowercase tag value, as stored and serialized.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Alcohol => "alcohol",
            Self::Beverages => "beverages",
            Self::Bar => "bar",
        }
    }

    /// Fallback display name for shops without a `name` tag, e.g. `"Bar Shop"`.
    #[must_use]
    pub const fn fallback_name(self) -> &'static str {
        match self {
            Self::Alcohol => "Alcohol Shop",
            Self::Beverages => "Beverages Shop",
            Self::Bar => "Bar Shop",
        }
    }

    /// Classify an element from its `shop` and `amenity` tag values.
    ///
    /// `amenity=bar` wins over `shop=beverages`; anything else is treated as a
    /// liquor store, since discovery only asks for these three tag pairs.
    #[must_use]
    pub fn from_tags(shop: Option<&str>, amenity: Option<&str>) -> Self {
        if amenity == Some("bar") {
            Self::Bar
        } else if shop == Some("beverages") {
            Self::Beverages
        } else {
            Self::Alcohol
        }
    }
}

impl std::fmt::Display for ShopCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ShopCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "alcohol" => Ok(Self::Alcohol),
            "beverages" => Ok(Self::Beverages),
            "bar" => Ok(Self::Bar),
            _ => Err(UnknownCategory(s.to_owned())),
        }
    }
}
