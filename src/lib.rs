//! Screen-space point clustering and density heatmap overlays for globe
//! viewports.
//!
//! The two engines at the core:
//! - [`cluster::ClusterEngine`] partitions a managed geographic point set
//!   into on-screen clusters by pixel proximity, recomputed on every
//!   viewpoint change, and renders markers/labels through an injected
//!   [`cluster::MarkerHost`].
//! - [`heatmap::DensityFieldRenderer`] rasterizes weighted samples into a
//!   normalized, blurred RGBA density field for draping over terrain.
//!
//! Projection is abstracted behind [`map::Projector`]; both a flat
//! Web-Mercator [`map::Viewport`] and an orthographic [`map::GlobeViewport`]
//! are provided.

pub mod braille;
pub mod cluster;
pub mod data;
pub mod error;
pub mod geo;
pub mod heatmap;
pub mod map;

pub use error::{OverlayError, Result};
