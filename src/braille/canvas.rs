/// Braille Unicode canvas for high-resolution terminal graphics.
/// Each character cell is a 2x4 dot grid (U+2800..U+28FF), so a canvas of
/// `width` x `height` characters gives `width*2` x `height*4` pixels.
pub struct BrailleCanvas {
    width: usize,  // characters
    height: usize, // characters
    cells: Vec<u8>,
}

/// Braille dot bit for an (x % 2, y % 4) offset within a cell:
/// ```text
/// (0,0) (1,0)   bits: 0x01 0x08
/// (0,1) (1,1)   bits: 0x02 0x10
/// (0,2) (1,2)   bits: 0x04 0x20
/// (0,3) (1,3)   bits: 0x40 0x80
/// ```
const DOT_BITS: [[u8; 2]; 4] = [[0x01, 0x08], [0x02, 0x10], [0x04, 0x20], [0x40, 0x80]];

impl BrailleCanvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![0; width * height],
        }
    }

    pub fn pixel_width(&self) -> usize {
        self.width * 2
    }

    pub fn pixel_height(&self) -> usize {
        self.height * 4
    }

    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    /// Set a pixel; coordinates outside the canvas are ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        let (cx, cy) = (x / 2, y / 4);
        if cx >= self.width || cy >= self.height {
            return;
        }
        self.cells[cy * self.width + cx] |= DOT_BITS[y % 4][x % 2];
    }

    /// Draw a filled circle (marker rendering).
    pub fn fill_circle(&mut self, cx: i32, cy: i32, radius: i32) {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= radius * radius {
                    self.set_pixel(cx + dx, cy + dy);
                }
            }
        }
    }

    /// Draw a circle outline (aggregate cluster rendering).
    pub fn stroke_circle(&mut self, cx: i32, cy: i32, radius: i32) {
        let steps = (radius.max(1) * 8) as usize;
        for i in 0..steps {
            let a = i as f64 / steps as f64 * std::f64::consts::TAU;
            let x = cx + (radius as f64 * a.cos()).round() as i32;
            let y = cy + (radius as f64 * a.sin()).round() as i32;
            self.set_pixel(x, y);
        }
    }

    /// Get a row of braille characters (for line-by-line rendering).
    pub fn row_to_string(&self, row: usize) -> String {
        if row >= self.height {
            return String::new();
        }
        self.cells[row * self.width..(row + 1) * self.width]
            .iter()
            .map(|&b| char::from_u32(0x2800 + b as u32).unwrap_or(' '))
            .collect()
    }

    /// All rows as an iterator of strings.
    pub fn rows(&self) -> impl Iterator<Item = String> + '_ {
        (0..self.height).map(|i| self.row_to_string(i))
    }

    #[cfg(test)]
    pub fn to_string(&self) -> String {
        self.rows().collect::<Vec<_>>().join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_pixel() {
        let mut canvas = BrailleCanvas::new(1, 1);
        canvas.set_pixel(0, 0);
        assert_eq!(canvas.to_string(), "⠁"); // U+2801
    }

    #[test]
    fn test_all_dots() {
        let mut canvas = BrailleCanvas::new(1, 1);
        for x in 0..2 {
            for y in 0..4 {
                canvas.set_pixel(x, y);
            }
        }
        assert_eq!(canvas.to_string(), "⣿"); // U+28FF
    }

    #[test]
    fn test_out_of_bounds_ignored() {
        let mut canvas = BrailleCanvas::new(2, 2);
        canvas.set_pixel(-1, 0);
        canvas.set_pixel(0, -5);
        canvas.set_pixel(100, 100);
        assert_eq!(canvas.to_string(), "⠀⠀\n⠀⠀");
    }

    #[test]
    fn test_clear() {
        let mut canvas = BrailleCanvas::new(2, 1);
        canvas.fill_circle(1, 1, 1);
        canvas.clear();
        assert_eq!(canvas.to_string(), "⠀⠀");
    }
}
