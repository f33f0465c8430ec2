use glam::DVec3;

use crate::geo::GeoPoint;
use crate::map::projection::{Projector, ScreenPoint};

/// Globe viewport using orthographic projection of a rotating sphere.
/// Orientation stored as a rotation matrix (3 column vectors) for
/// efficient point transformation.
///
/// This is the view state behind the `Projector` seam: points on the far
/// hemisphere project to `None`, as do points outside the viewport.
#[derive(Clone)]
pub struct GlobeViewport {
    /// Forward direction (what points at the camera)
    forward: DVec3,
    /// Right direction
    right: DVec3,
    /// Up direction
    up: DVec3,
    /// Sphere radius in pixels (controls zoom)
    pub radius: f64,
    /// Viewport pixel width
    pub width: usize,
    /// Viewport pixel height
    pub height: usize,
}

impl GlobeViewport {
    /// Build a globe viewport centered on (lon, lat) with given radius.
    pub fn new(center_lon: f64, center_lat: f64, radius: f64, width: usize, height: usize) -> Self {
        let lon_rad = center_lon.to_radians();
        let lat_rad = center_lat.to_radians();

        // Forward = direction from origin to (lon, lat) on unit sphere
        let forward = DVec3::new(
            lat_rad.cos() * lon_rad.cos(),
            lat_rad.cos() * lon_rad.sin(),
            lat_rad.sin(),
        );

        // Up = derivative of forward w.r.t. latitude (points north on sphere)
        let raw_up = DVec3::new(
            -lat_rad.sin() * lon_rad.cos(),
            -lat_rad.sin() * lon_rad.sin(),
            lat_rad.cos(),
        );

        // Right = forward × up (points east)
        let right = forward.cross(raw_up).normalize();
        let up = right.cross(forward).normalize();

        Self {
            forward,
            right,
            up,
            radius,
            width,
            height,
        }
    }

    /// Extract the center lon/lat that the globe is looking at.
    fn center_lonlat(&self) -> (f64, f64) {
        let lat = self.forward.z.asin().to_degrees();
        let lon = self.forward.y.atan2(self.forward.x).to_degrees();
        (lon, lat)
    }

    /// Unproject screen pixels back to lon/lat.
    /// Returns `None` if the point is outside the sphere disk.
    pub fn unproject(&self, px: f64, py: f64) -> Option<(f64, f64)> {
        let sx = (px - self.width as f64 / 2.0) / self.radius;
        let sy = -(py - self.height as f64 / 2.0) / self.radius;

        let r2 = sx * sx + sy * sy;
        if r2 > 1.0 {
            return None;
        }

        // Reconstruct 3D point on the unit sphere
        let sz = (1.0 - r2).sqrt();
        let p = self.right * sx + self.up * sy + self.forward * sz;

        let lat = p.z.clamp(-1.0, 1.0).asin().to_degrees();
        let lon = p.y.atan2(p.x).to_degrees();

        Some((lon, lat))
    }

    /// Rotate the globe by a pixel drag delta.
    /// Positive dx = dragged left → globe center shifts east.
    pub fn rotate_drag(&mut self, dx: i32, dy: i32) {
        let angle_x = (dx as f64) / self.radius;
        let angle_y = -(dy as f64) / self.radius;

        // Rotate around up axis (horizontal drag → longitude change)
        if angle_x.abs() > 1e-10 {
            let (sin_a, cos_a) = angle_x.sin_cos();
            let new_forward = self.forward * cos_a + self.right * sin_a;
            let new_right = self.right * cos_a - self.forward * sin_a;
            self.forward = new_forward.normalize();
            self.right = new_right.normalize();
        }

        // Rotate around right axis (vertical drag → latitude change)
        if angle_y.abs() > 1e-10 {
            let (sin_a, cos_a) = angle_y.sin_cos();
            let new_forward = self.forward * cos_a + self.up * sin_a;
            let new_up = self.up * cos_a - self.forward * sin_a;
            self.forward = new_forward.normalize();
            self.up = new_up.normalize();
        }
    }

    /// Zoom in by scaling the sphere radius.
    pub fn zoom_in(&mut self) {
        self.radius = (self.radius * 1.5).min(self.width as f64 * 35.0);
    }

    /// Zoom out by scaling the sphere radius.
    pub fn zoom_out(&mut self) {
        self.radius = (self.radius / 1.5).max(self.width as f64 * 0.35);
    }

    /// Zoom level normalized so that a world-filling sphere is 1.0.
    pub fn effective_zoom(&self) -> f64 {
        self.radius / (self.width as f64 * 0.35)
    }

    /// Set viewport dimensions.
    pub fn set_size(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
    }

    pub fn center_lon(&self) -> f64 {
        self.center_lonlat().0
    }

    pub fn center_lat(&self) -> f64 {
        self.center_lonlat().1
    }

    /// Check if a pixel coordinate is within the viewport (small margin).
    pub fn is_visible(&self, px: f64, py: f64) -> bool {
        px >= -10.0
            && px < self.width as f64 + 10.0
            && py >= -10.0
            && py < self.height as f64 + 10.0
    }
}

impl Projector for GlobeViewport {
    fn project(&self, point: &GeoPoint) -> Option<ScreenPoint> {
        let p = lonlat_to_vec3(point.lon, point.lat);

        // Dot with forward: positive = front-facing, negative = behind horizon
        let depth = p.dot(self.forward);
        if depth < 0.0 {
            return None;
        }

        // Orthographic: project onto the right/up plane
        let sx = p.dot(self.right);
        let sy = p.dot(self.up);

        let px = self.width as f64 / 2.0 + sx * self.radius;
        let py = self.height as f64 / 2.0 - sy * self.radius;

        if self.is_visible(px, py) {
            Some(ScreenPoint::new(px, py))
        } else {
            None
        }
    }
}

/// Convert lon/lat (degrees) to a unit sphere vector.
#[inline(always)]
fn lonlat_to_vec3(lon: f64, lat: f64) -> DVec3 {
    let lon_rad = lon.to_radians();
    let lat_rad = lat.to_radians();
    DVec3::new(
        lat_rad.cos() * lon_rad.cos(),
        lat_rad.cos() * lon_rad.sin(),
        lat_rad.sin(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_projects_to_middle() {
        let globe = GlobeViewport::new(116.3, 39.9, 200.0, 400, 400);
        let sp = globe.project(&GeoPoint::new(116.3, 39.9)).unwrap();
        assert!((sp.x - 200.0).abs() < 1e-6);
        assert!((sp.y - 200.0).abs() < 1e-6);
    }

    #[test]
    fn test_backface_is_culled() {
        let globe = GlobeViewport::new(0.0, 0.0, 200.0, 400, 400);
        // The antipode is behind the visible hemisphere
        assert!(globe.project(&GeoPoint::new(180.0, 0.0)).is_none());
    }

    #[test]
    fn test_unproject_roundtrip() {
        let globe = GlobeViewport::new(30.0, 50.0, 180.0, 400, 400);
        let sp = globe.project(&GeoPoint::new(31.0, 50.5)).unwrap();
        let (lon, lat) = globe.unproject(sp.x, sp.y).unwrap();
        assert!((lon - 31.0).abs() < 1e-6);
        assert!((lat - 50.5).abs() < 1e-6);
    }

    #[test]
    fn test_rotate_drag_moves_center() {
        let mut globe = GlobeViewport::new(0.0, 0.0, 200.0, 400, 400);
        globe.rotate_drag(40, 0);
        assert!(globe.center_lon() > 0.0);
    }
}
