//! Scroll-driven parallax: maps a scroll position within a container onto
//! per-layer transforms for a sky, sun, water and ground scene.
//!
//! The host supplies a scroll offset on every notification and applies the
//! returned descriptors; `display` holds a few ready-made appliers.

pub mod config;
pub mod display;
pub mod maths;
pub mod parallax;

pub use parallax::{Frame, Layer, ParallaxScene, ScrollState, Transform, TransformDescriptor};
