//! Overpass QL query construction.

use std::fmt::Write;

use thekawatch_core::Coordinates;

/// Server-side timeout requested from Overpass, in seconds.
const QUERY_TIMEOUT_SECS: u32 = 25;

/// Tag filters selecting alcohol-selling places.
const TAG_FILTERS: [&str; 3] = [
    r#"["shop"="alcohol"]"#,
    r#"["shop"="beverages"]"#,
    r#"["amenity"="bar"]"#,
];

/// Element kinds searched. Ways (shop outlines) are reported by their centre.
const ELEMENT_KINDS: [&str; 2] = ["node", "way"];

/// Build a query for every matching node and way within `radius_m` metres.
#[must_use]
pub fn nearby_shops(center: Coordinates, radius_m: u32) -> String {
    let mut query = format!("[out:json][timeout:{QUERY_TIMEOUT_SECS}];\n(\n");

    for kind in ELEMENT_KINDS {
        for filter in TAG_FILTERS {
            // Writing to a String cannot fail
            let _ = writeln!(
                query,
                "  {kind}{filter}(around:{radius_m},{},{});",
                center.lat, center.lon
            );
        }
    }

    query.push_str(");\nout center;\n");
    query
}
