mod host;

pub use host::{CollectingHost, LabelSpec, MarkerHost, MarkerSpec, SubscriptionToken};

use std::collections::HashMap;

use log::debug;

use crate::error::{OverlayError, Result};
use crate::geo::GeoPoint;
use crate::map::{Projector, ScreenPoint};

/// A managed point in the cluster engine. Lives in the engine's point set
/// until explicit removal or `clear()`.
#[derive(Clone, Debug)]
pub struct ClusterPoint {
    pub id: String,
    pub position: GeoPoint,
    pub kind: String,
    pub properties: HashMap<String, String>,
}

impl ClusterPoint {
    pub fn new(id: impl Into<String>, position: GeoPoint, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            position,
            kind: kind.into(),
            properties: HashMap::new(),
        }
    }
}

/// A screen-space cluster. Ephemeral: fully rebuilt on every recompute,
/// never mutated incrementally. Members are indices into the engine's
/// managed point set, in insertion order.
#[derive(Clone, Debug)]
pub struct Cluster {
    /// Mean of the members' screen positions.
    pub centroid: ScreenPoint,
    pub members: Vec<usize>,
}

/// Marker styling, matching the host's defaults for point billboards.
#[derive(Clone, Debug)]
pub struct MarkerStyle {
    pub color: String,
    pub size: u32,
    pub outline_color: String,
    pub outline_width: u32,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            color: "#409EFF".into(),
            size: 24,
            outline_color: "#FFFFFF".into(),
            outline_width: 2,
        }
    }
}

/// Cluster engine configuration.
#[derive(Clone, Debug)]
pub struct ClusterOptions {
    /// When false, every projectable point renders individually.
    pub enabled: bool,
    /// Maximum screen-space distance (pixels) for cluster membership.
    pub pixel_range: f64,
    /// Member count at or above which a cluster renders as one aggregate
    /// marker with a count label.
    pub minimum_cluster_size: usize,
    pub style: MarkerStyle,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            pixel_range: 50.0,
            minimum_cluster_size: 2,
            style: MarkerStyle::default(),
        }
    }
}

/// Screen-space point clustering engine.
///
/// Points are grouped with a greedy single pass: each point joins the
/// first existing cluster (in creation order) whose centroid is within
/// `pixel_range`, else founds a new cluster at its own screen coordinate.
/// First-fit, not nearest-fit, so the partition is order-dependent by
/// design. O(n·k) per recompute where k is the number of clusters formed;
/// fine for point counts in the low thousands.
///
/// The engine subscribes to viewpoint changes at construction and holds
/// the returned token so the unsubscribe at `destroy()` matches the
/// original registration.
pub struct ClusterEngine<H: MarkerHost> {
    host: H,
    options: ClusterOptions,
    points: Vec<ClusterPoint>,
    clusters: Vec<Cluster>,
    token: Option<SubscriptionToken>,
    destroyed: bool,
}

impl<H: MarkerHost> ClusterEngine<H> {
    pub fn new(mut host: H, options: ClusterOptions) -> Self {
        let token = host.subscribe();
        Self {
            host,
            options,
            points: Vec::new(),
            clusters: Vec::new(),
            token: Some(token),
            destroyed: false,
        }
    }

    fn check_alive(&self) -> Result<()> {
        if self.destroyed {
            return Err(OverlayError::Precondition(
                "cluster engine already destroyed".into(),
            ));
        }
        Ok(())
    }

    /// Append points to the managed set (no de-duplication by id) and run
    /// a full recompute. All positions are validated before any state
    /// mutates, so a bad batch leaves the engine untouched.
    pub fn add_points(&mut self, points: Vec<ClusterPoint>, view: &dyn Projector) -> Result<()> {
        self.check_alive()?;
        for p in &points {
            p.position.validate()?;
        }
        self.points.extend(points);
        self.recompute(view)
    }

    /// Empty the managed set and release all rendered output.
    pub fn clear(&mut self) {
        self.points.clear();
        self.clusters.clear();
        if !self.destroyed {
            self.host.remove_all();
        }
    }

    /// Rebuild the partition for the current view and replace the rendered
    /// marker/label set wholesale. Invoked on every viewpoint-change
    /// notification and after `add_points`.
    pub fn recompute(&mut self, view: &dyn Projector) -> Result<()> {
        self.check_alive()?;

        self.host.remove_all();
        self.clusters.clear();

        // Project every managed point; unprojectable ones are dropped for
        // this pass but stay in the set for future passes.
        let projected: Vec<Option<ScreenPoint>> = self
            .points
            .iter()
            .map(|p| view.project(&p.position))
            .collect();

        if !self.options.enabled {
            for (idx, sp) in projected.iter().enumerate() {
                if let Some(sp) = sp {
                    self.render_single(idx, *sp);
                }
            }
            return Ok(());
        }

        // Greedy first-fit in insertion order, scanning clusters in
        // creation order. The first qualifying cluster wins even when a
        // later one is closer. The centroid is the running mean of member
        // screen positions, so a cluster drifts toward its members as it
        // grows.
        let pixel_range = self.options.pixel_range;
        for (idx, sp) in projected.iter().enumerate() {
            let Some(sp) = sp else { continue };
            let found = self
                .clusters
                .iter_mut()
                .find(|c| c.centroid.distance(sp) <= pixel_range);
            match found {
                Some(cluster) => {
                    cluster.members.push(idx);
                    let n = cluster.members.len() as f64;
                    cluster.centroid.x += (sp.x - cluster.centroid.x) / n;
                    cluster.centroid.y += (sp.y - cluster.centroid.y) / n;
                }
                None => self.clusters.push(Cluster {
                    centroid: *sp,
                    members: vec![idx],
                }),
            }
        }

        for ci in 0..self.clusters.len() {
            let cluster = self.clusters[ci].clone();
            if cluster.members.len() >= self.options.minimum_cluster_size {
                self.render_aggregate(&cluster);
            } else {
                for &idx in &cluster.members {
                    // Members of a sub-threshold cluster keep their own
                    // screen position, not the centroid.
                    if let Some(sp) = projected[idx] {
                        self.render_single(idx, sp);
                    }
                }
            }
        }

        debug!(
            "recompute: {} points, {} projectable, {} clusters",
            self.points.len(),
            projected.iter().flatten().count(),
            self.clusters.len()
        );
        Ok(())
    }

    fn render_single(&mut self, idx: usize, sp: ScreenPoint) {
        let point = &self.points[idx];
        self.host.add_marker(MarkerSpec {
            position: sp,
            geo: point.position,
            count: 1,
            style: self.options.style.clone(),
        });
    }

    fn render_aggregate(&mut self, cluster: &Cluster) {
        let founder = &self.points[cluster.members[0]];
        self.host.add_marker(MarkerSpec {
            position: cluster.centroid,
            geo: founder.position,
            count: cluster.members.len(),
            style: self.options.style.clone(),
        });
        self.host.add_label(LabelSpec {
            position: cluster.centroid,
            text: cluster.members.len().to_string(),
        });
    }

    /// Unregister the viewpoint-change subscription and release rendered
    /// output. Further operations fail with a precondition error.
    pub fn destroy(&mut self) -> Result<()> {
        self.check_alive()?;
        if let Some(token) = self.token.take() {
            self.host.unsubscribe(token);
        }
        self.host.remove_all();
        self.destroyed = true;
        Ok(())
    }

    /// Toggle clustering; takes effect on the next recompute.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.options.enabled = enabled;
    }

    pub fn options(&self) -> &ClusterOptions {
        &self.options
    }

    /// The partition from the last recompute.
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    /// The managed point set.
    pub fn points(&self) -> &[ClusterPoint] {
        &self.points
    }

    pub fn host(&self) -> &H {
        &self.host
    }
}
