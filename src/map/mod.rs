mod globe;
mod projection;

pub use globe::GlobeViewport;
pub use projection::{Projector, ScreenPoint, Viewport};
