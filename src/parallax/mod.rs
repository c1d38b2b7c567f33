use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt};
use tracing::debug;

use crate::maths::Spectrum;

/// One independently transformable element of the scene.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Sky,
    Sun,
    Water,
    Ground,
}

impl Layer {
    // Back to front
    pub const ALL: [Layer; 4] = [Layer::Sky, Layer::Sun, Layer::Water, Layer::Ground];

    pub fn name(&self) -> &'static str {
        match self {
            Layer::Sky => "sky",
            Layer::Sun => "sun",
            Layer::Water => "water",
            Layer::Ground => "ground",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Transform {
    Translate { x: f64, y: f64 },
    Scale { x: f64, y: f64 },
    /// Degrees, clockwise in screen space, about the pivot `(cx, cy)`.
    Rotate { angle: f64, cx: f64, cy: f64 },
}

impl Transform {
    pub fn uniform_scale(factor: f64) -> Transform {
        Transform::Scale {
            x: factor,
            y: factor,
        }
    }
}

/// Formats as an SVG `transform` attribute value, eg. `rotate(15, 0, 400)`
impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Transform::Translate { x, y } => write!(f, "translate({}, {})", x, y),
            Transform::Scale { x, y } if x == y || (x.is_nan() && y.is_nan()) => {
                write!(f, "scale({})", x)
            }
            Transform::Scale { x, y } => write!(f, "scale({}, {})", x, y),
            Transform::Rotate { angle, cx, cy } => write!(f, "rotate({}, {}, {})", angle, cx, cy),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Deserialize, Serialize)]
pub struct TransformDescriptor {
    pub layer: Layer,
    pub transform: Transform,
}

impl TransformDescriptor {
    pub fn new(layer: Layer, transform: Transform) -> TransformDescriptor {
        TransformDescriptor { layer, transform }
    }
}

/// A single scroll notification: where the viewport is and how tall the container is.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScrollState {
    pub offset: f64,
    pub container_height: f64,
}

impl ScrollState {
    pub fn spectrum(&self) -> Spectrum {
        Spectrum::new(0_f64, self.container_height)
    }

    pub fn clamped_offset(&self) -> f64 {
        // Adding zero folds a -0.0 offset into 0.0
        self.spectrum().clamp(self.offset) + 0_f64
    }

    /// Fraction of the container scrolled through, 0..1 for sane heights.
    pub fn progress(&self) -> f64 {
        self.spectrum().invlerp(self.clamped_offset())
    }
}

/// How far each layer travels over a full scroll of the container.
#[derive(Debug, Copy, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Motion {
    /// Horizontal sky drift in scene units
    pub sky_shift: f64,
    /// Fraction of the sky's size lost at full progress
    pub sky_shrink: f64,
    /// Sun rotation in degrees
    pub sun_sweep: f64,
    pub sun_pivot: (f64, f64),
    /// Vertical water drop in scene units
    pub water_drop: f64,
    /// Extra ground scale at full progress
    pub ground_growth: f64,
}

impl Default for Motion {
    fn default() -> Motion {
        Motion {
            sky_shift: 250.0,
            sky_shrink: 1.0,
            sun_sweep: 30.0,
            sun_pivot: (0.0, 400.0),
            water_drop: 468.0,
            ground_growth: 2.0,
        }
    }
}

/// Read-once layout values plus the motion constants. Built at startup and
/// asked for descriptors on every scroll notification.
#[derive(Debug, Clone)]
pub struct ParallaxScene {
    container_height: f64,
    motion: Motion,
}

impl ParallaxScene {
    pub fn new(container_height: f64, motion: Motion) -> ParallaxScene {
        ParallaxScene {
            container_height,
            motion,
        }
    }

    pub fn container_height(&self) -> f64 {
        self.container_height
    }

    pub fn state(&self, offset: f64) -> ScrollState {
        ScrollState {
            offset,
            container_height: self.container_height,
        }
    }

    /// Descriptors for one scroll notification, in application order.
    ///
    /// Sky receives two descriptors. They are not composed: whoever applies
    /// them in order ends up with only the second (the scale).
    pub fn on_scroll(&self, offset: f64) -> Vec<TransformDescriptor> {
        let state = self.state(offset);
        let clamped = state.clamped_offset();
        let progress = state.progress();
        let motion = &self.motion;

        let sun_angle = state
            .spectrum()
            .map_to(&Spectrum::new(0_f64, motion.sun_sweep), clamped);

        debug!(offset, clamped, progress, "mapping scroll position");

        vec![
            TransformDescriptor::new(
                Layer::Sky,
                Transform::Translate {
                    x: progress * motion.sky_shift,
                    y: 0_f64,
                },
            ),
            TransformDescriptor::new(
                Layer::Sky,
                Transform::uniform_scale(1_f64 - progress * motion.sky_shrink),
            ),
            TransformDescriptor::new(
                Layer::Sun,
                Transform::Rotate {
                    angle: sun_angle,
                    cx: motion.sun_pivot.0,
                    cy: motion.sun_pivot.1,
                },
            ),
            TransformDescriptor::new(
                Layer::Water,
                Transform::Translate {
                    x: 0_f64,
                    y: progress * motion.water_drop,
                },
            ),
            TransformDescriptor::new(
                Layer::Ground,
                Transform::uniform_scale(1_f64 + progress * motion.ground_growth),
            ),
        ]
    }

    pub fn frame(&self, offset: f64) -> Frame {
        let state = self.state(offset);
        Frame::new(state, self.on_scroll(offset))
    }
}

/// The observable result of one notification: each layer holds whatever
/// descriptor was applied to it last.
#[derive(Debug, Clone)]
pub struct Frame {
    state: ScrollState,
    descriptors: Vec<TransformDescriptor>,
    applied: HashMap<Layer, Transform>,
}

impl Frame {
    pub fn new(state: ScrollState, descriptors: Vec<TransformDescriptor>) -> Frame {
        let mut applied = HashMap::new();
        for descriptor in descriptors.iter() {
            // Replaces, never composes
            applied.insert(descriptor.layer, descriptor.transform);
        }

        Frame {
            state,
            descriptors,
            applied,
        }
    }

    pub fn state(&self) -> &ScrollState {
        &self.state
    }

    pub fn descriptors(&self) -> &[TransformDescriptor] {
        &self.descriptors
    }

    pub fn transform(&self, layer: Layer) -> Option<&Transform> {
        self.applied.get(&layer)
    }
}

/// Evenly spaced offsets from the top of the container to the bottom, inclusive.
pub fn sweep(container_height: f64, frames: u32) -> Vec<f64> {
    let scroll = Spectrum::new(0_f64, container_height);
    match frames {
        0 => vec![],
        1 => vec![0_f64],
        n => (0..n)
            .map(|i| scroll.lerp(i as f64 / (n - 1) as f64))
            .collect(),
    }
}
