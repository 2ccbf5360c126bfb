//! Overpass JSON response types and normalization into shops.

use std::collections::HashMap;

use serde::Deserialize;
use thekawatch_core::{ShopCategory, ShopId};

use crate::models::NewShop;

/// Top-level Overpass JSON response.
#[derive(Debug, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<Element>,
}

/// A node, way, or relation.
#[derive(Debug, Deserialize)]
pub struct Element {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: i64,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    /// Present on ways when the query uses `out center`.
    pub center: Option<Center>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Center {
    pub lat: f64,
    pub lon: f64,
}

impl Element {
    fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    const fn position(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lon, self.center) {
            (Some(lat), Some(lon), _) => Some((lat, lon)),
            (_, _, Some(c)) => Some((c.lat, c.lon)),
            _ => None,
        }
    }

    /// Convert into a shop, or `None` if the element has no usable position.
    #[must_use]
    pub fn into_shop(self) -> Option<NewShop> {
        let (lat, lon) = self.position()?;
        let category = ShopCategory::from_tags(self.tag("shop"), self.tag("amenity"));

        let name = self
            .tag("name")
            .or_else(|| self.tag("name:en"))
            .map_or_else(|| category.fallback_name().to_string(), str::to_string);

        let address = ["addr:street", "addr:housenumber", "addr:city"]
            .into_iter()
            .filter_map(|key| self.tag(key))
            .collect::<Vec<_>>()
            .join(", ");

        Some(NewShop {
            osm_id: ShopId::from_osm(&self.kind, self.id),
            name,
            lat,
            lon,
            category,
            address,
        })
    }
}

impl OverpassResponse {
    /// Normalize every element, dropping those without coordinates.
    #[must_use]
    pub fn into_shops(self) -> Vec<NewShop> {
        self.elements
            .into_iter()
            .filter_map(Element::into_shop)
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Vec<NewShop> {
        serde_json::from_str::<OverpassResponse>(json)
            .unwrap()
            .into_shops()
    }

    #[test]
    fn test_node_with_full_tags() {
        let shops = parse(
            r#"{"elements":[{"type":"node","id":101,"lat":28.6,"lon":77.2,
                "tags":{"shop":"alcohol","name":"Theka No. 1",
                        "addr:street":"MG Road","addr:housenumber":"12","addr:city":"Delhi"}}]}"#,
        );

        assert_eq!(shops.len(), 1);
        let shop = &shops[0];
        assert_eq!(shop.osm_id.as_str(), "node_101");
        assert_eq!(shop.name, "Theka No. 1");
        assert_eq!(shop.category, ShopCategory::Alcohol);
        assert_eq!(shop.address, "MG Road, 12, Delhi");
    }

    #[test]
    fn test_way_uses_center_and_fallbacks() {
        let shops = parse(
            r#"{"elements":[{"type":"way","id":7,"center":{"lat":12.9,"lon":77.6},
                "tags":{"amenity":"bar","name:en":"Toit","addr:city":"Bengaluru"}}]}"#,
        );

        let shop = &shops[0];
        assert_eq!(shop.osm_id.as_str(), "way_7");
        assert!((shop.lat - 12.9).abs() < f64::EPSILON);
        assert_eq!(shop.name, "Toit");
        assert_eq!(shop.category, ShopCategory::Bar);
        assert_eq!(shop.address, "Bengaluru");
    }

    #[test]
    fn test_unnamed_shop_gets_category_name() {
        let shops = parse(
            r#"{"elements":[{"type":"node","id":3,"lat":1.0,"lon":2.0,
                "tags":{"shop":"beverages"}}]}"#,
        );
        assert_eq!(shops[0].name, "Beverages Shop");
        assert_eq!(shops[0].address, "");
    }

    #[test]
    fn test_elements_without_position_are_dropped() {
        let shops = parse(
            r#"{"elements":[{"type":"way","id":9,"tags":{"shop":"alcohol"}},
                            {"type":"node","id":10,"lat":0.0,"lon":0.0}]}"#,
        );
        assert_eq!(shops.len(), 1);
        assert_eq!(shops[0].osm_id.as_str(), "node_10");
    }

    #[test]
    fn test_missing_elements_is_empty() {
        assert!(parse(r#"{"version":0.6}"#).is_empty());
    }
}
