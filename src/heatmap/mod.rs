mod raster;
mod sample;

pub use sample::{generate_samples, generate_samples_with};

use log::debug;

use crate::error::{OverlayError, Result};
use crate::geo::GeoBounds;

use raster::Raster;

/// A weighted geographic sample. The value is an unbounded positive
/// weight; the renderer normalizes it against a caller-supplied or
/// computed min/max range.
#[derive(Clone, Copy, Debug)]
pub struct HeatSample {
    pub lon: f64,
    pub lat: f64,
    pub value: f64,
}

/// A rasterized density image plus the geographic rectangle it covers.
/// Produced per render invocation and superseded, never merged, by the
/// next one. The host drapes it over terrain as a textured overlay.
pub struct DensityField {
    pub width: usize,
    pub height: usize,
    /// Straight-alpha RGBA8, row-major, north at row 0.
    pub pixels: Vec<u8>,
    pub bounds: GeoBounds,
}

impl DensityField {
    /// Straight-alpha RGBA of the pixel at (x, y).
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let i = (y * self.width + x) * 4;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    /// Sample the field at a geographic coordinate, if inside its bounds.
    pub fn sample_geo(&self, lon: f64, lat: f64) -> Option<[u8; 4]> {
        if !self.bounds.contains(lon, lat) {
            return None;
        }
        let fx = (lon - self.bounds.west) / self.bounds.width();
        let fy = (self.bounds.north - lat) / self.bounds.height();
        let x = ((fx * self.width as f64) as usize).min(self.width - 1);
        let y = ((fy * self.height as f64) as usize).min(self.height - 1);
        Some(self.pixel(x, y))
    }
}

/// Degrees of padding added around the sample extent.
const BOUNDS_PADDING_DEG: f64 = 0.01;
/// Base splat radius in pixels; grows linearly with intensity.
const BASE_RADIUS_PX: f64 = 30.0;
const RADIUS_RANGE_PX: f64 = 60.0;
/// Half-width of the final smoothing blur.
const BLUR_RADIUS_PX: usize = 20;

/// Rasterizes weighted samples into a normalized density image for
/// heatmap draping. Stateless between calls: the output is a pure
/// function of samples, range, and bounds (modulo blur tolerance).
pub struct DensityFieldRenderer {
    resolution: usize,
}

impl DensityFieldRenderer {
    /// Renderer with the standard 1024×1024 raster.
    pub fn new() -> Self {
        Self { resolution: 1024 }
    }

    /// Renderer with a custom square raster resolution (tests, benches).
    pub fn with_resolution(resolution: usize) -> Self {
        Self { resolution }
    }

    /// Normalized intensity of a sample value against the range. A
    /// degenerate range (min == max) yields zero intensity, not a fault.
    fn intensity(value: f64, min: f64, max: f64) -> f64 {
        let span = max - min;
        if span <= 0.0 {
            return 0.0;
        }
        ((value - min) / span).clamp(0.0, 1.0)
    }

    fn splat_radius(intensity: f64) -> f64 {
        BASE_RADIUS_PX + RADIUS_RANGE_PX * intensity
    }

    /// Rasterize `samples` into a density field. Returns `Ok(None)` for an
    /// empty sample set. Uses the supplied min/max range, or computes the
    /// range from the samples when not given.
    pub fn render(
        &self,
        samples: &[HeatSample],
        min: Option<f64>,
        max: Option<f64>,
    ) -> Result<Option<DensityField>> {
        if samples.is_empty() {
            return Ok(None);
        }

        for s in samples {
            if !s.lon.is_finite() || !s.lat.is_finite() || !s.value.is_finite() {
                return Err(OverlayError::Input(format!(
                    "non-finite heat sample ({}, {}, {})",
                    s.lon, s.lat, s.value
                )));
            }
        }

        let bounds =
            GeoBounds::from_points(samples.iter().map(|s| (s.lon, s.lat)), BOUNDS_PADDING_DEG)?;

        let min = min.unwrap_or_else(|| samples.iter().map(|s| s.value).fold(f64::MAX, f64::min));
        let max = max.unwrap_or_else(|| samples.iter().map(|s| s.value).fold(f64::MIN, f64::max));

        let size = self.resolution;
        let mut raster = Raster::new(size, size);

        for s in samples {
            // Linear lon/lat to pixel mapping over the padded bounds,
            // vertical axis inverted so north maps to row 0.
            let px = (s.lon - bounds.west) / bounds.width() * size as f64;
            let py = size as f64 - (s.lat - bounds.south) / bounds.height() * size as f64;

            let intensity = Self::intensity(s.value, min, max);
            raster.paint_splat(px, py, Self::splat_radius(intensity), intensity);
        }

        raster.gaussian_blur(BLUR_RADIUS_PX);

        debug!(
            "rendered {} samples into {}x{} field over ({:.3}, {:.3})..({:.3}, {:.3})",
            samples.len(),
            size,
            size,
            bounds.west,
            bounds.south,
            bounds.east,
            bounds.north
        );

        Ok(Some(DensityField {
            width: size,
            height: size,
            pixels: raster.to_rgba8(),
            bounds,
        }))
    }
}

impl Default for DensityFieldRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(lon: f64, lat: f64, value: f64) -> HeatSample {
        HeatSample { lon, lat, value }
    }

    #[test]
    fn test_empty_input_is_none_not_error() {
        let renderer = DensityFieldRenderer::with_resolution(64);
        assert!(renderer.render(&[], None, None).unwrap().is_none());
    }

    #[test]
    fn test_degenerate_range_is_all_transparent() {
        // min == max never divides by zero; output is uniformly zero
        let renderer = DensityFieldRenderer::with_resolution(128);
        let samples = vec![sample(0.0, 0.0, 50.0), sample(0.5, 0.5, 50.0)];
        let field = renderer
            .render(&samples, Some(50.0), Some(50.0))
            .unwrap()
            .unwrap();
        assert!(field.pixels.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_computed_range_matches_supplied() {
        let renderer = DensityFieldRenderer::with_resolution(128);
        let samples = vec![sample(0.0, 0.0, 10.0), sample(0.3, 0.3, 90.0)];
        let auto = renderer.render(&samples, None, None).unwrap().unwrap();
        let explicit = renderer
            .render(&samples, Some(10.0), Some(90.0))
            .unwrap()
            .unwrap();
        assert_eq!(auto.pixels, explicit.pixels);
    }

    #[test]
    fn test_nan_sample_rejected() {
        let renderer = DensityFieldRenderer::with_resolution(64);
        let samples = vec![sample(f64::NAN, 0.0, 1.0)];
        assert!(matches!(
            renderer.render(&samples, None, None),
            Err(OverlayError::Input(_))
        ));
    }

    #[test]
    fn test_two_sample_scenario() {
        // Full-intensity sample at the origin, zero-intensity at (1, 1)
        let renderer = DensityFieldRenderer::with_resolution(256);
        let samples = vec![sample(0.0, 0.0, 100.0), sample(1.0, 1.0, 0.0)];
        let field = renderer
            .render(&samples, Some(0.0), Some(100.0))
            .unwrap()
            .unwrap();

        // Bounds = sample extent + 0.01 degree padding per side
        assert_eq!(
            field.bounds,
            GeoBounds {
                west: -0.01,
                south: -0.01,
                east: 1.01,
                north: 1.01,
            }
        );

        // Hot sample (bottom-left) shows up; cold sample (top-right)
        // contributes nothing at zero intensity
        let hot = field.sample_geo(0.0, 0.0).unwrap();
        assert!(hot[3] > 0);
        let cold = field.sample_geo(1.0, 1.0).unwrap();
        assert_eq!(cold[3], 0);

        // Intensity and radius follow the literal formulas
        assert_eq!(DensityFieldRenderer::intensity(100.0, 0.0, 100.0), 1.0);
        assert_eq!(DensityFieldRenderer::splat_radius(1.0), 90.0);
        assert_eq!(DensityFieldRenderer::intensity(0.0, 0.0, 100.0), 0.0);
        assert_eq!(DensityFieldRenderer::splat_radius(0.0), 30.0);
    }

    #[test]
    fn test_output_is_deterministic() {
        let renderer = DensityFieldRenderer::with_resolution(128);
        let samples = vec![sample(0.1, 0.1, 30.0), sample(0.2, 0.15, 70.0)];
        let a = renderer.render(&samples, None, None).unwrap().unwrap();
        let b = renderer.render(&samples, None, None).unwrap().unwrap();
        assert_eq!(a.pixels, b.pixels);
    }

    #[test]
    fn test_north_maps_to_row_zero() {
        let renderer = DensityFieldRenderer::with_resolution(256);
        // One hot sample at the north end of a tall extent
        let samples = vec![sample(0.0, 1.0, 100.0), sample(0.0, -1.0, 0.0)];
        let field = renderer
            .render(&samples, Some(0.0), Some(100.0))
            .unwrap()
            .unwrap();

        // Alpha mass should sit in the top rows, not the bottom ones
        let top: u32 = field.pixels[..field.width * 4 * 32]
            .iter()
            .skip(3)
            .step_by(4)
            .map(|&a| a as u32)
            .sum();
        let bottom: u32 = field.pixels[field.width * 4 * (field.height - 32)..]
            .iter()
            .skip(3)
            .step_by(4)
            .map(|&a| a as u32)
            .sum();
        assert!(top > bottom);
    }
}
