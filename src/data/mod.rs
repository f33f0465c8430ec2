use std::fs;
use std::path::Path;

use geojson::{GeoJson, Value};
use log::warn;

use crate::cluster::ClusterPoint;
use crate::error::{OverlayError, Result};
use crate::geo::GeoPoint;

/// Load cluster points from a GeoJSON file of Point features.
/// Recognized properties: `id`, `type` (marker kind); all other string
/// properties are carried into the point's property bag.
pub fn load_points(path: &Path) -> Result<Vec<ClusterPoint>> {
    let mut bytes = fs::read(path)?;
    let geojson: GeoJson = simd_json::serde::from_slice(&mut bytes)
        .map_err(|e| OverlayError::Parse(format!("{}: {e}", path.display())))?;

    let GeoJson::FeatureCollection(fc) = geojson else {
        return Err(OverlayError::Parse(format!(
            "{}: expected a FeatureCollection",
            path.display()
        )));
    };

    let mut points = Vec::new();
    for (i, feature) in fc.features.into_iter().enumerate() {
        let Some(geometry) = feature.geometry else {
            continue;
        };
        let Value::Point(coords) = geometry.value else {
            continue;
        };
        if coords.len() < 2 {
            warn!("skipping feature {i}: point with fewer than 2 coordinates");
            continue;
        }

        let props = feature.properties.as_ref();
        let id = props
            .and_then(|p| p.get("id"))
            .and_then(|v| v.as_str())
            .map(String::from)
            .unwrap_or_else(|| i.to_string());
        let kind = props
            .and_then(|p| p.get("type"))
            .and_then(|v| v.as_str())
            .unwrap_or("marker")
            .to_string();

        let position = GeoPoint::new(coords[0], coords[1]);
        position.validate()?;

        let mut point = ClusterPoint::new(id, position, kind);
        if let Some(props) = props {
            for (key, value) in props {
                if let Some(s) = value.as_str() {
                    point.properties.insert(key.clone(), s.to_string());
                }
            }
        }
        points.push(point);
    }

    Ok(points)
}

/// Built-in fixture markers for when no data file is available:
/// camera/sensor/station sites spread around 116.3°E 39.9°N.
pub fn fixture_points() -> Vec<ClusterPoint> {
    let fixtures: [(&str, &str, f64, f64); 12] = [
        ("1", "camera", 116.300, 39.900),
        ("2", "sensor", 116.310, 39.910),
        ("3", "station", 116.320, 39.890),
        ("4", "camera", 116.305, 39.905),
        ("5", "camera", 116.295, 39.895),
        ("6", "sensor", 116.330, 39.915),
        ("7", "station", 116.280, 39.885),
        ("8", "camera", 116.350, 39.930),
        ("9", "sensor", 116.260, 39.870),
        ("10", "camera", 116.400, 39.950),
        ("11", "station", 116.200, 39.850),
        ("12", "camera", 116.450, 40.000),
    ];

    fixtures
        .into_iter()
        .map(|(id, kind, lon, lat)| ClusterPoint::new(id, GeoPoint::new(lon, lat), kind))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_points_are_valid() {
        let points = fixture_points();
        assert!(!points.is_empty());
        for p in &points {
            p.position.validate().unwrap();
        }
    }

    #[test]
    fn test_load_points_from_geojson() {
        let dir = std::env::temp_dir();
        let path = dir.join("geo_overlay_points_test.json");
        fs::write(
            &path,
            r#"{
                "type": "FeatureCollection",
                "features": [
                    {
                        "type": "Feature",
                        "geometry": { "type": "Point", "coordinates": [116.3, 39.9] },
                        "properties": { "id": "cam-1", "type": "camera", "name": "gate" }
                    },
                    {
                        "type": "Feature",
                        "geometry": { "type": "LineString", "coordinates": [[0, 0], [1, 1]] },
                        "properties": {}
                    }
                ]
            }"#,
        )
        .unwrap();

        let points = load_points(&path).unwrap();
        fs::remove_file(&path).ok();

        // Non-point geometry is skipped
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].id, "cam-1");
        assert_eq!(points[0].kind, "camera");
        assert_eq!(points[0].properties.get("name").unwrap(), "gate");
    }
}
