use rayon::prelude::*;

/// Gradient stops for a heat splat: (offset, r, g, b, alpha factor).
/// The alpha factor is multiplied by the sample's normalized intensity,
/// the outermost stop is fully transparent blue.
const GRADIENT_STOPS: [(f64, f32, f32, f32, f32); 4] = [
    (0.0, 255.0, 0.0, 0.0, 0.8),
    (0.2, 255.0, 165.0, 0.0, 0.6),
    (0.4, 255.0, 255.0, 0.0, 0.4),
    (1.0, 0.0, 0.0, 255.0, 0.0),
];

/// Premultiplied-alpha RGBA accumulation buffer. Splats composite
/// additively ("lighter"), so overlapping samples accumulate instead of
/// overwriting each other; channels are clamped at export.
pub struct Raster {
    width: usize,
    height: usize,
    /// f32 RGBA, premultiplied, row-major
    data: Vec<f32>,
}

impl Raster {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width * height * 4],
        }
    }

    /// Interpolate the gradient color at normalized distance `t` in [0, 1],
    /// returning straight (non-premultiplied) RGBA with alpha scaled by
    /// `intensity`.
    fn gradient_at(t: f64, intensity: f32) -> (f32, f32, f32, f32) {
        let t = t.clamp(0.0, 1.0);
        let mut lo = GRADIENT_STOPS[0];
        let mut hi = GRADIENT_STOPS[GRADIENT_STOPS.len() - 1];
        for w in GRADIENT_STOPS.windows(2) {
            if t >= w[0].0 && t <= w[1].0 {
                lo = w[0];
                hi = w[1];
                break;
            }
        }
        let span = hi.0 - lo.0;
        let f = if span > 0.0 { ((t - lo.0) / span) as f32 } else { 0.0 };
        let r = lo.1 + (hi.1 - lo.1) * f;
        let g = lo.2 + (hi.2 - lo.2) * f;
        let b = lo.3 + (hi.3 - lo.3) * f;
        let a = (lo.4 + (hi.4 - lo.4) * f) * intensity;
        (r, g, b, a)
    }

    /// Paint a radial gradient splat centered at (cx, cy) with the given
    /// pixel radius, composited additively.
    pub fn paint_splat(&mut self, cx: f64, cy: f64, radius: f64, intensity: f64) {
        if radius <= 0.0 {
            return;
        }
        let intensity = intensity as f32;

        let x0 = ((cx - radius).floor().max(0.0)) as usize;
        let x1 = ((cx + radius).ceil().min(self.width as f64 - 1.0)) as usize;
        let y0 = ((cy - radius).floor().max(0.0)) as usize;
        let y1 = ((cy + radius).ceil().min(self.height as f64 - 1.0)) as usize;
        if x0 > x1 || y0 > y1 {
            return;
        }

        for y in y0..=y1 {
            let row = y * self.width * 4;
            for x in x0..=x1 {
                let dx = x as f64 - cx;
                let dy = y as f64 - cy;
                let dist = (dx * dx + dy * dy).sqrt();
                if dist > radius {
                    continue;
                }
                let (r, g, b, a) = Self::gradient_at(dist / radius, intensity);
                if a <= 0.0 {
                    continue;
                }
                let i = row + x * 4;
                // "lighter": add premultiplied components
                self.data[i] += r / 255.0 * a;
                self.data[i + 1] += g / 255.0 * a;
                self.data[i + 2] += b / 255.0 * a;
                self.data[i + 3] += a;
            }
        }
    }

    /// Separable Gaussian blur over all four channels. `radius` is the
    /// kernel half-width in pixels; sigma is half the radius, truncated at
    /// the kernel edge and renormalized.
    pub fn gaussian_blur(&mut self, radius: usize) {
        if radius == 0 {
            return;
        }
        let kernel = gaussian_kernel(radius);
        let w = self.width;
        let h = self.height;

        // Horizontal pass: src rows -> tmp rows
        let src = std::mem::take(&mut self.data);
        let mut tmp = vec![0.0f32; w * h * 4];
        tmp.par_chunks_mut(w * 4).enumerate().for_each(|(y, out_row)| {
            let in_row = &src[y * w * 4..(y + 1) * w * 4];
            for x in 0..w {
                let mut acc = [0.0f32; 4];
                for (k, &kv) in kernel.iter().enumerate() {
                    let sx = (x as isize + k as isize - radius as isize).clamp(0, w as isize - 1)
                        as usize;
                    for c in 0..4 {
                        acc[c] += in_row[sx * 4 + c] * kv;
                    }
                }
                out_row[x * 4..x * 4 + 4].copy_from_slice(&acc);
            }
        });

        // Vertical pass: tmp columns -> data rows
        let mut out = vec![0.0f32; w * h * 4];
        out.par_chunks_mut(w * 4).enumerate().for_each(|(y, out_row)| {
            for x in 0..w {
                let mut acc = [0.0f32; 4];
                for (k, &kv) in kernel.iter().enumerate() {
                    let sy = (y as isize + k as isize - radius as isize).clamp(0, h as isize - 1)
                        as usize;
                    for c in 0..4 {
                        acc[c] += tmp[(sy * w + x) * 4 + c] * kv;
                    }
                }
                out_row[x * 4..x * 4 + 4].copy_from_slice(&acc);
            }
        });

        self.data = out;
    }

    /// Export as straight-alpha RGBA8, clamping accumulated channels.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = vec![0u8; self.width * self.height * 4];
        for (px, chunk) in self.data.chunks_exact(4).enumerate() {
            let a = chunk[3].clamp(0.0, 1.0);
            let i = px * 4;
            if a > 0.0 {
                out[i] = ((chunk[0] / a).clamp(0.0, 1.0) * 255.0).round() as u8;
                out[i + 1] = ((chunk[1] / a).clamp(0.0, 1.0) * 255.0).round() as u8;
                out[i + 2] = ((chunk[2] / a).clamp(0.0, 1.0) * 255.0).round() as u8;
                out[i + 3] = (a * 255.0).round() as u8;
            }
        }
        out
    }

    #[cfg(test)]
    pub fn alpha_at(&self, x: usize, y: usize) -> f32 {
        self.data[(y * self.width + x) * 4 + 3]
    }
}

/// Normalized 1D Gaussian kernel with half-width `radius`, sigma = radius/2.
fn gaussian_kernel(radius: usize) -> Vec<f32> {
    let sigma = radius as f64 / 2.0;
    let denom = 2.0 * sigma * sigma;
    let mut kernel: Vec<f32> = (0..=2 * radius)
        .map(|i| {
            let d = i as f64 - radius as f64;
            (-d * d / denom).exp() as f32
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    for k in &mut kernel {
        *k /= sum;
    }
    kernel
}
