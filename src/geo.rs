use crate::error::{OverlayError, Result};

/// A geographic coordinate in degrees, with height in meters.
/// Immutable once created.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
    pub height: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self {
            lon,
            lat,
            height: 0.0,
        }
    }

    pub fn with_height(lon: f64, lat: f64, height: f64) -> Self {
        Self { lon, lat, height }
    }

    /// Reject NaN/infinite coordinates and out-of-range lon/lat.
    /// Called at every ingestion boundary so malformed input never
    /// reaches managed state.
    pub fn validate(&self) -> Result<()> {
        if !self.lon.is_finite() || !self.lat.is_finite() || !self.height.is_finite() {
            return Err(OverlayError::Input(format!(
                "non-finite coordinate ({}, {}, {})",
                self.lon, self.lat, self.height
            )));
        }
        if !(-180.0..=180.0).contains(&self.lon) {
            return Err(OverlayError::Input(format!(
                "longitude {} out of range [-180, 180]",
                self.lon
            )));
        }
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(OverlayError::Input(format!(
                "latitude {} out of range [-90, 90]",
                self.lat
            )));
        }
        Ok(())
    }
}

/// A geographic bounding rectangle in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoBounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl GeoBounds {
    /// Compute the min/max rectangle of a point set, expanded by `padding`
    /// degrees on every side. Errors on an empty set; a single point still
    /// yields a non-degenerate rectangle because the padding is applied
    /// on each side.
    pub fn from_points(
        points: impl IntoIterator<Item = (f64, f64)>,
        padding: f64,
    ) -> Result<Self> {
        let mut west = f64::MAX;
        let mut south = f64::MAX;
        let mut east = f64::MIN;
        let mut north = f64::MIN;
        let mut seen = false;

        for (lon, lat) in points {
            seen = true;
            west = west.min(lon);
            east = east.max(lon);
            south = south.min(lat);
            north = north.max(lat);
        }

        if !seen {
            return Err(OverlayError::Input(
                "cannot compute bounds of an empty point set".into(),
            ));
        }

        Ok(Self {
            west: west - padding,
            south: south - padding,
            east: east + padding,
            north: north + padding,
        })
    }

    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.west && lon <= self.east && lat >= self.south && lat <= self.north
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_normal_point() {
        assert!(GeoPoint::new(116.3, 39.9).validate().is_ok());
        assert!(GeoPoint::new(-180.0, 90.0).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_nan() {
        assert!(GeoPoint::new(f64::NAN, 39.9).validate().is_err());
        assert!(GeoPoint::new(116.3, f64::NAN).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        assert!(GeoPoint::new(181.0, 0.0).validate().is_err());
        assert!(GeoPoint::new(0.0, -91.0).validate().is_err());
    }

    #[test]
    fn test_bounds_padding() {
        let b = GeoBounds::from_points([(0.0, 0.0), (1.0, 1.0)], 0.01).unwrap();
        assert_eq!(b.west, -0.01);
        assert_eq!(b.south, -0.01);
        assert_eq!(b.east, 1.01);
        assert_eq!(b.north, 1.01);
    }

    #[test]
    fn test_bounds_single_point_not_degenerate() {
        let b = GeoBounds::from_points([(10.0, 20.0)], 0.01).unwrap();
        assert!(b.width() > 0.0);
        assert!(b.height() > 0.0);
    }

    #[test]
    fn test_bounds_empty_is_error() {
        assert!(GeoBounds::from_points(std::iter::empty(), 0.01).is_err());
    }
}
