use crate::geo::GeoPoint;
use crate::map::ScreenPoint;

use super::MarkerStyle;

/// A marker to be drawn by the rendering host. `count == 1` means an
/// individual point; `count > 1` an aggregate cluster marker.
#[derive(Clone, Debug)]
pub struct MarkerSpec {
    pub position: ScreenPoint,
    pub geo: GeoPoint,
    pub count: usize,
    pub style: MarkerStyle,
}

/// A text label to be drawn by the rendering host (cluster member counts).
#[derive(Clone, Debug)]
pub struct LabelSpec {
    pub position: ScreenPoint,
    pub text: String,
}

/// Handle returned by `MarkerHost::subscribe`. The engine stores the one
/// handle it got at construction and passes that same handle back at
/// destroy time, so the unsubscribe always matches the original listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubscriptionToken(pub u64);

/// Rendering host seam. The cluster engine only ever talks to its host
/// through this trait, so the clustering logic runs headless in tests
/// with an in-memory host.
pub trait MarkerHost {
    fn add_marker(&mut self, spec: MarkerSpec);
    fn add_label(&mut self, spec: LabelSpec);
    /// Discard all previously rendered markers and labels (full replace,
    /// not incremental diff).
    fn remove_all(&mut self);

    /// Register interest in viewpoint changes.
    fn subscribe(&mut self) -> SubscriptionToken;
    fn unsubscribe(&mut self, token: SubscriptionToken);
}

/// In-memory host: collects marker/label specs for a frame. Used by the
/// terminal demo (drawn onto the braille canvas each frame) and by tests.
#[derive(Default)]
pub struct CollectingHost {
    pub markers: Vec<MarkerSpec>,
    pub labels: Vec<LabelSpec>,
    next_token: u64,
    subscriptions: Vec<SubscriptionToken>,
}

impl CollectingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokens currently subscribed (empty once the engine is destroyed).
    pub fn active_subscriptions(&self) -> &[SubscriptionToken] {
        &self.subscriptions
    }
}

impl MarkerHost for CollectingHost {
    fn add_marker(&mut self, spec: MarkerSpec) {
        self.markers.push(spec);
    }

    fn add_label(&mut self, spec: LabelSpec) {
        self.labels.push(spec);
    }

    fn remove_all(&mut self) {
        self.markers.clear();
        self.labels.clear();
    }

    fn subscribe(&mut self) -> SubscriptionToken {
        let token = SubscriptionToken(self.next_token);
        self.next_token += 1;
        self.subscriptions.push(token);
        token
    }

    fn unsubscribe(&mut self, token: SubscriptionToken) {
        self.subscriptions.retain(|t| *t != token);
    }
}
