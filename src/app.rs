use anyhow::Result;
use log::warn;

use geo_overlay::cluster::{ClusterEngine, ClusterOptions, ClusterPoint, CollectingHost};
use geo_overlay::geo::GeoPoint;
use geo_overlay::heatmap::{self, DensityField, DensityFieldRenderer};
use geo_overlay::map::GlobeViewport;

/// Center of the built-in fixture area.
const DEMO_CENTER: (f64, f64) = (116.3, 39.9);
/// Heat sample generation: 2 km radius, 1000 samples.
const DEMO_HEAT_RADIUS_KM: f64 = 2.0;
const DEMO_HEAT_SAMPLES: usize = 1000;

/// Demo application state: a globe viewport feeding viewpoint changes
/// into the cluster engine, plus an on-demand heatmap overlay.
pub struct App {
    pub globe: GlobeViewport,
    pub engine: ClusterEngine<CollectingHost>,
    pub heatmap: Option<DensityField>,
    pub show_heatmap: bool,
    pub clustering_enabled: bool,
    pub should_quit: bool,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    renderer: DensityFieldRenderer,
}

impl App {
    pub fn new(width: usize, height: usize, points: Vec<ClusterPoint>) -> Result<Self> {
        let (pixel_width, pixel_height) = inner_pixels(width, height);
        // Start zoomed in on the fixture area so individual markers resolve
        let globe = GlobeViewport::new(
            DEMO_CENTER.0,
            DEMO_CENTER.1,
            pixel_width as f64 * 8.0,
            pixel_width,
            pixel_height,
        );

        let mut engine = ClusterEngine::new(CollectingHost::new(), ClusterOptions::default());
        engine.add_points(points, &globe)?;

        Ok(Self {
            globe,
            engine,
            heatmap: None,
            show_heatmap: false,
            clustering_enabled: true,
            should_quit: false,
            last_mouse: None,
            renderer: DensityFieldRenderer::new(),
        })
    }

    /// Viewpoint-change notification: recompute the cluster partition
    /// against the new view, synchronously.
    pub fn notify_view_changed(&mut self) {
        if let Err(e) = self.engine.recompute(&self.globe) {
            warn!("recompute failed: {e}");
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        let (pw, ph) = inner_pixels(width, height);
        self.globe.set_size(pw, ph);
        self.notify_view_changed();
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.globe.rotate_drag(dx, dy);
        self.notify_view_changed();
    }

    pub fn zoom_in(&mut self) {
        self.globe.zoom_in();
        self.notify_view_changed();
    }

    pub fn zoom_out(&mut self) {
        self.globe.zoom_out();
        self.notify_view_changed();
    }

    pub fn toggle_clustering(&mut self) {
        self.clustering_enabled = !self.clustering_enabled;
        self.engine.set_enabled(self.clustering_enabled);
        self.notify_view_changed();
    }

    /// Show/hide the heatmap overlay. The density field is rendered once
    /// on first show and reused; a new render supersedes it wholesale.
    pub fn toggle_heatmap(&mut self) {
        if self.show_heatmap {
            self.show_heatmap = false;
            return;
        }
        if self.heatmap.is_none() {
            let center = GeoPoint::new(DEMO_CENTER.0, DEMO_CENTER.1);
            let samples =
                heatmap::generate_samples(center, DEMO_HEAT_RADIUS_KM, DEMO_HEAT_SAMPLES);
            match self.renderer.render(&samples, Some(0.0), Some(100.0)) {
                Ok(field) => self.heatmap = field,
                Err(e) => {
                    warn!("heatmap render failed: {e}");
                    return;
                }
            }
        }
        self.show_heatmap = true;
    }

    /// Handle mouse drag: rotate the globe under the cursor.
    pub fn handle_drag(&mut self, x: u16, y: u16) {
        if let Some((last_x, last_y)) = self.last_mouse {
            let dx = last_x as i32 - x as i32;
            let dy = last_y as i32 - y as i32;
            // Terminal cells are 2x4 braille pixels
            self.pan(dx * 2, dy * 4);
        }
        self.last_mouse = Some((x, y));
    }

    pub fn end_drag(&mut self) {
        self.last_mouse = None;
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn zoom_level(&self) -> String {
        format!("{:.1}x", self.globe.effective_zoom())
    }

    pub fn center_coords(&self) -> String {
        let lat = self.globe.center_lat();
        let lon = self.globe.center_lon();
        format!(
            "{:.2}°{}, {:.2}°{}",
            lat.abs(),
            if lat >= 0.0 { "N" } else { "S" },
            lon.abs(),
            if lon >= 0.0 { "E" } else { "W" }
        )
    }
}

/// Braille pixel dimensions of the map area inside the border and above
/// the status bar.
fn inner_pixels(width: usize, height: usize) -> (usize, usize) {
    let inner_width = width.saturating_sub(2);
    let inner_height = height.saturating_sub(3);
    (inner_width * 2, inner_height * 4)
}
