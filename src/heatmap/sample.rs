use rand::Rng;
use std::f64::consts::TAU;

use crate::geo::GeoPoint;

use super::HeatSample;

/// Rough degrees-per-kilometre factor used by the synthetic generator.
const KM_PER_DEGREE: f64 = 111.0;

/// Generate `count` synthetic weighted samples radially distributed around
/// `center`, for demos and tests.
///
/// Each sample picks a uniform angle in [0, 2π) and radius in [0, radius_km],
/// converted to a degree offset with a fixed 1/111 deg-per-km factor. The
/// value decays linearly with distance from the center (not Gaussian):
/// `round((1 - d_deg / r_deg) * 100)` with the distance measured in degree
/// space. Mixing a km-specified radius with degree-space distance is a
/// deliberate approximation kept from the system this models; callers who
/// need a consistent metric should measure in kilometres throughout.
pub fn generate_samples(center: GeoPoint, radius_km: f64, count: usize) -> Vec<HeatSample> {
    generate_samples_with(&mut rand::rng(), center, radius_km, count)
}

/// Same as [`generate_samples`] but with a caller-supplied RNG, so tests
/// can seed it.
pub fn generate_samples_with<R: Rng + ?Sized>(
    rng: &mut R,
    center: GeoPoint,
    radius_km: f64,
    count: usize,
) -> Vec<HeatSample> {
    let radius_deg = radius_km / KM_PER_DEGREE;
    let mut samples = Vec::with_capacity(count);

    for _ in 0..count {
        let angle = rng.random_range(0.0..TAU);
        let r_km = rng.random_range(0.0..=radius_km);
        let lon = center.lon + (r_km * angle.cos()) / KM_PER_DEGREE;
        let lat = center.lat + (r_km * angle.sin()) / KM_PER_DEGREE;

        let dist_deg = ((lon - center.lon).powi(2) + (lat - center.lat).powi(2)).sqrt();
        let value = ((1.0 - dist_deg / radius_deg) * 100.0).round();

        samples.push(HeatSample { lon, lat, value });
    }

    samples
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_samples_within_radius() {
        let center = GeoPoint::new(116.3, 39.9);
        let mut rng = StdRng::seed_from_u64(7);
        let samples = generate_samples_with(&mut rng, center, 2.0, 500);
        assert_eq!(samples.len(), 500);

        let radius_deg = 2.0 / KM_PER_DEGREE;
        for s in &samples {
            let d = ((s.lon - center.lon).powi(2) + (s.lat - center.lat).powi(2)).sqrt();
            assert!(d <= radius_deg + 1e-12);
            assert!((0.0..=100.0).contains(&s.value));
        }
    }

    #[test]
    fn test_monotonic_falloff() {
        // Of two samples, the one closer to center has value >= the farther
        let center = GeoPoint::new(0.0, 0.0);
        let mut rng = StdRng::seed_from_u64(42);
        let mut samples = generate_samples_with(&mut rng, center, 5.0, 200);
        samples.sort_by(|a, b| {
            let da = a.lon.hypot(a.lat);
            let db = b.lon.hypot(b.lat);
            da.partial_cmp(&db).unwrap()
        });
        for pair in samples.windows(2) {
            assert!(pair[0].value >= pair[1].value);
        }
    }
}
