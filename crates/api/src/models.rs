//! Database row types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thekawatch_core::{Coordinates, ShopCategory, ShopId};

/// A stored shop.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Shop {
    pub osm_id: ShopId,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(rename = "type")]
    pub category: ShopCategory,
    pub address: String,
    pub last_seen: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Shop {
    #[must_use]
    pub const fn coordinates(&self) -> Coordinates {
        Coordinates {
            lat: self.lat,
            lon: self.lon,
        }
    }
}

/// Shop fields produced by discovery, before they are stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewShop {
    pub osm_id: ShopId,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(rename = "type")]
    pub category: ShopCategory,
    pub address: String,
}

impl NewShop {
    #[must_use]
    pub const fn coordinates(&self) -> Coordinates {
        Coordinates {
            lat: self.lat,
            lon: self.lon,
        }
    }
}

/// A crowd vote row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CrowdVote {
    pub shop_id: String,
    pub user_id: String,
    pub level: i16,
    pub created_at: DateTime<Utc>,
}

/// An open/closed vote row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StatusVote {
    pub shop_id: String,
    pub user_id: String,
    pub is_open: bool,
    pub created_at: DateTime<Utc>,
}
