use std::f64::consts::PI;

use crate::geo::GeoPoint;

/// A projected viewport pixel coordinate. Derived per frame,
/// never persisted across view changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in pixel space.
    pub fn distance(&self, other: &ScreenPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Maps a geographic coordinate into the current viewport, or `None` when
/// the point is behind the horizon or outside the visible frustum.
///
/// A pure function of the implementor's view state: no side effects and
/// no caching across calls.
pub trait Projector {
    fn project(&self, point: &GeoPoint) -> Option<ScreenPoint>;
}

/// Flat Web-Mercator viewport with pan and zoom.
#[derive(Clone)]
pub struct Viewport {
    /// Center longitude (-180 to 180)
    pub center_lon: f64,
    /// Center latitude (-90 to 90)
    pub center_lat: f64,
    /// Zoom level (higher = more zoomed in)
    pub zoom: f64,
    /// Viewport pixel width
    pub width: usize,
    /// Viewport pixel height
    pub height: usize,
}

impl Viewport {
    pub fn new(center_lon: f64, center_lat: f64, zoom: f64, width: usize, height: usize) -> Self {
        Self {
            center_lon,
            center_lat,
            zoom,
            width,
            height,
        }
    }

    /// Create a world view (shows the entire world)
    pub fn world(width: usize, height: usize) -> Self {
        Self::new(0.0, 20.0, 1.0, width, height)
    }

    /// Pan the viewport by pixel delta
    pub fn pan(&mut self, dx: i32, dy: i32) {
        let scale = 360.0 / (self.zoom * self.width as f64);
        self.center_lon += dx as f64 * scale;
        self.center_lat -= dy as f64 * scale * 0.5; // Mercator distortion

        if self.center_lon > 180.0 {
            self.center_lon -= 360.0;
        } else if self.center_lon < -180.0 {
            self.center_lon += 360.0;
        }

        self.center_lat = self.center_lat.clamp(-85.0, 85.0);
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * 1.5).min(100.0);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / 1.5).max(0.5);
    }

    /// Normalized Mercator y for a latitude in radians.
    fn mercator_y(lat_rad: f64) -> f64 {
        (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0
    }

    /// Raw pixel coordinates without the frustum check.
    fn project_raw(&self, lon: f64, lat: f64) -> (f64, f64) {
        let x = (lon + 180.0) / 360.0;
        let y = Self::mercator_y(lat.to_radians());

        let center_x = (self.center_lon + 180.0) / 360.0;
        let center_y = Self::mercator_y(self.center_lat.to_radians());

        let scale = self.zoom * self.width as f64;

        let px = (x - center_x) * scale + self.width as f64 / 2.0;
        let py = (y - center_y) * scale + self.height as f64 / 2.0;
        (px, py)
    }

    /// Unproject pixel coordinates back to geographic (lon, lat)
    pub fn unproject(&self, px: f64, py: f64) -> (f64, f64) {
        let scale = self.zoom * self.width as f64;

        let center_x = (self.center_lon + 180.0) / 360.0;
        let center_y = Self::mercator_y(self.center_lat.to_radians());

        let x = (px - self.width as f64 / 2.0) / scale + center_x;
        let y = (py - self.height as f64 / 2.0) / scale + center_y;

        let lon = x * 360.0 - 180.0;
        let lat = (PI * (1.0 - 2.0 * y)).sinh().atan().to_degrees();

        (lon, lat)
    }

    /// Check if a pixel coordinate is within the viewport (small margin so
    /// markers straddling the edge still render).
    pub fn is_visible(&self, px: f64, py: f64) -> bool {
        px >= -10.0
            && px < self.width as f64 + 10.0
            && py >= -10.0
            && py < self.height as f64 + 10.0
    }
}

impl Projector for Viewport {
    fn project(&self, point: &GeoPoint) -> Option<ScreenPoint> {
        // Mercator y diverges at the poles
        if point.lat.abs() >= 89.9 {
            return None;
        }
        let (px, py) = self.project_raw(point.lon, point.lat);
        if self.is_visible(px, py) {
            Some(ScreenPoint::new(px, py))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_center() {
        let vp = Viewport::new(0.0, 0.0, 1.0, 100, 100);
        let sp = vp.project(&GeoPoint::new(0.0, 0.0)).unwrap();
        assert!((sp.x - 50.0).abs() < 1e-9);
        assert!((sp.y - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_project_off_frustum() {
        // Zoomed far in on the antimeridian: Greenwich is way off screen
        let vp = Viewport::new(179.0, 0.0, 50.0, 100, 100);
        assert!(vp.project(&GeoPoint::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn test_unproject_roundtrip() {
        let vp = Viewport::new(10.0, 45.0, 4.0, 200, 120);
        let sp = vp.project(&GeoPoint::new(10.5, 45.2)).unwrap();
        let (lon, lat) = vp.unproject(sp.x, sp.y);
        assert!((lon - 10.5).abs() < 1e-6);
        assert!((lat - 45.2).abs() < 1e-6);
    }

    #[test]
    fn test_pan() {
        let mut vp = Viewport::new(0.0, 0.0, 1.0, 100, 100);
        vp.pan(10, 0);
        assert!(vp.center_lon > 0.0);
    }
}
