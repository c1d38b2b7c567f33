use crate::parallax::{Frame, Layer, Transform, TransformDescriptor};
use image::{Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use std::{
    error::Error,
    fmt::Write as _,
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::info;

const PIXEL_BLACK: Rgb<u8> = Rgb([0_u8, 0_u8, 0_u8]);

/// Layer outline in untransformed scene units.
#[derive(Debug, Copy, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum Shape {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
    },
}

impl Shape {
    pub fn contains(&self, px: f64, py: f64) -> bool {
        match *self {
            Shape::Rect {
                x,
                y,
                width,
                height,
            } => px >= x && px < x + width && py >= y && py < y + height,
            Shape::Circle { cx, cy, r } => {
                let dx = px - cx;
                let dy = py - cy;
                dx * dx + dy * dy <= r * r
            }
        }
    }

    fn to_svg(&self, fill: &str) -> String {
        match *self {
            Shape::Rect {
                x,
                y,
                width,
                height,
            } => format!(
                r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}"/>"#,
                x, y, width, height, fill
            ),
            Shape::Circle { cx, cy, r } => {
                format!(r#"<circle cx="{}" cy="{}" r="{}" fill="{}"/>"#, cx, cy, r, fill)
            }
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Deserialize, Serialize)]
pub struct LayerStyle {
    #[serde(flatten)]
    pub shape: Shape,
    pub color: [u8; 3],
}

impl LayerStyle {
    fn fill(&self) -> String {
        format!("rgb({},{},{})", self.color[0], self.color[1], self.color[2])
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SceneGeometry {
    pub width: u32,
    pub height: u32,
    pub sky: LayerStyle,
    pub sun: LayerStyle,
    pub water: LayerStyle,
    pub ground: LayerStyle,
}

impl SceneGeometry {
    pub fn style(&self, layer: Layer) -> &LayerStyle {
        match layer {
            Layer::Sky => &self.sky,
            Layer::Sun => &self.sun,
            Layer::Water => &self.water,
            Layer::Ground => &self.ground,
        }
    }
}

impl Default for SceneGeometry {
    fn default() -> SceneGeometry {
        SceneGeometry {
            width: 500,
            height: 400,
            sky: LayerStyle {
                shape: Shape::Rect {
                    x: 0.0,
                    y: 0.0,
                    width: 500.0,
                    height: 400.0,
                },
                color: [135, 206, 235],
            },
            sun: LayerStyle {
                shape: Shape::Circle {
                    cx: 400.0,
                    cy: 90.0,
                    r: 40.0,
                },
                color: [255, 204, 51],
            },
            water: LayerStyle {
                shape: Shape::Rect {
                    x: 0.0,
                    y: 250.0,
                    width: 500.0,
                    height: 150.0,
                },
                color: [30, 110, 200],
            },
            ground: LayerStyle {
                shape: Shape::Rect {
                    x: 0.0,
                    y: 330.0,
                    width: 500.0,
                    height: 70.0,
                },
                color: [70, 140, 60],
            },
        }
    }
}

/// 2D affine matrix in SVG order: x' = a*x + c*y + e, y' = b*x + d*y + f
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Affine {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    e: f64,
    f: f64,
}

impl Affine {
    pub const IDENTITY: Affine = Affine {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn from_transform(transform: &Transform) -> Affine {
        match *transform {
            Transform::Translate { x, y } => Affine {
                e: x,
                f: y,
                ..Affine::IDENTITY
            },
            Transform::Scale { x, y } => Affine {
                a: x,
                d: y,
                ..Affine::IDENTITY
            },
            Transform::Rotate { angle, cx, cy } => {
                let (sin, cos) = angle.to_radians().sin_cos();
                Affine {
                    a: cos,
                    b: sin,
                    c: -sin,
                    d: cos,
                    e: cx - cos * cx + sin * cy,
                    f: cy - sin * cx - cos * cy,
                }
            }
        }
    }

    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// None when the matrix collapses the plane (eg. scale 0) or holds non finite values
    pub fn invert(&self) -> Option<Affine> {
        let det = self.a * self.d - self.b * self.c;
        if det == 0.0 || !det.is_finite() {
            return None;
        }

        Some(Affine {
            a: self.d / det,
            b: -self.b / det,
            c: -self.c / det,
            d: self.a / det,
            e: (self.c * self.f - self.d * self.e) / det,
            f: (self.b * self.e - self.a * self.f) / det,
        })
    }
}

pub trait Painter {
    fn paint(&self, buffer: &mut RgbImage, transform: Option<&Transform>);
}

impl Painter for LayerStyle {
    fn paint(&self, buffer: &mut RgbImage, transform: Option<&Transform>) {
        let forward = transform.map_or(Affine::IDENTITY, Affine::from_transform);

        // Nothing of the layer is visible
        let inverse = match forward.invert() {
            Some(inverse) => inverse,
            None => return,
        };

        let pixel = Rgb(self.color);
        let (width, height) = buffer.dimensions();
        for row in 0..height {
            for col in 0..width {
                // Sample pixel centres, mapped back into the layer's own space
                let (x, y) = inverse.apply(col as f64 + 0.5, row as f64 + 0.5);
                if self.shape.contains(x, y) {
                    buffer.put_pixel(col, row, pixel);
                }
            }
        }
    }
}

/// Paints every layer back to front with the transform the frame left on it.
pub fn rasterize(geometry: &SceneGeometry, frame: &Frame) -> RgbImage {
    let mut img = RgbImage::from_pixel(geometry.width, geometry.height, PIXEL_BLACK);

    for layer in Layer::ALL.iter() {
        geometry.style(*layer).paint(&mut img, frame.transform(*layer));
    }

    img
}

pub fn svg_document(geometry: &SceneGeometry, frame: &Frame) -> String {
    let mut doc = String::new();

    // Writing into a String can't fail
    let _ = writeln!(
        doc,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="{w}" height="{h}">"#,
        w = geometry.width,
        h = geometry.height
    );

    for layer in Layer::ALL.iter() {
        let style = geometry.style(*layer);
        let shape = style.shape.to_svg(&style.fill());

        let _ = match frame.transform(*layer) {
            Some(transform) => writeln!(
                doc,
                r#"  <g class="{}" transform="{}">{}</g>"#,
                layer, transform, shape
            ),
            None => writeln!(doc, r#"  <g class="{}">{}</g>"#, layer, shape),
        };
    }

    doc.push_str("</svg>\n");
    doc
}

pub trait RenderDevice {
    fn render(&mut self, index: usize, frame: &Frame) -> Result<(), Box<dyn Error>>;
}

fn prepare_directory(directory: &Path) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(directory).map_err(|err| {
        simple_error::SimpleError::new(format!(
            "Could not create output directory {}: {}",
            directory.display(),
            err
        ))
    })?;

    Ok(())
}

fn frame_path(directory: &Path, index: usize, extension: &str) -> PathBuf {
    directory.join(format!("frame-{:03}.{}", index, extension))
}

/// Saves each frame as a PNG raster of the scene.
pub struct ImageWriter {
    directory: PathBuf,
    geometry: SceneGeometry,
}

impl ImageWriter {
    pub fn new(directory: PathBuf, geometry: SceneGeometry) -> Result<ImageWriter, Box<dyn Error>> {
        prepare_directory(&directory)?;

        Ok(ImageWriter {
            directory,
            geometry,
        })
    }
}

impl RenderDevice for ImageWriter {
    fn render(&mut self, index: usize, frame: &Frame) -> Result<(), Box<dyn Error>> {
        let out = frame_path(&self.directory, index, "png");
        let img = rasterize(&self.geometry, frame);

        img.save(&out)?;
        info!(path = %out.display(), offset = frame.state().offset, "wrote frame");

        Ok(())
    }
}

/// Saves each frame as an SVG document carrying the layer transforms.
pub struct SvgWriter {
    directory: PathBuf,
    geometry: SceneGeometry,
}

impl SvgWriter {
    pub fn new(directory: PathBuf, geometry: SceneGeometry) -> Result<SvgWriter, Box<dyn Error>> {
        prepare_directory(&directory)?;

        Ok(SvgWriter {
            directory,
            geometry,
        })
    }
}

impl RenderDevice for SvgWriter {
    fn render(&mut self, index: usize, frame: &Frame) -> Result<(), Box<dyn Error>> {
        let out = frame_path(&self.directory, index, "svg");

        fs::write(&out, svg_document(&self.geometry, frame)).map_err(|err| {
            simple_error::SimpleError::new(format!("{1} Filename {0}:", out.display(), err))
        })?;
        info!(path = %out.display(), offset = frame.state().offset, "wrote frame");

        Ok(())
    }
}

#[derive(Serialize)]
struct FrameRecord<'a> {
    frame: usize,
    offset: f64,
    progress: f64,
    descriptors: &'a [TransformDescriptor],
}

/// Streams one JSON object per frame, for hosts that apply descriptors themselves.
pub struct JsonWriter<W: Write> {
    out: W,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(out: W) -> JsonWriter<W> {
        JsonWriter { out }
    }
}

impl<W: Write> RenderDevice for JsonWriter<W> {
    fn render(&mut self, index: usize, frame: &Frame) -> Result<(), Box<dyn Error>> {
        let record = FrameRecord {
            frame: index,
            offset: frame.state().offset,
            progress: frame.state().progress(),
            descriptors: frame.descriptors(),
        };

        serde_json::to_writer(&mut self.out, &record)?;
        writeln!(self.out)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parallax::{Motion, ParallaxScene};

    const SKY: Rgb<u8> = Rgb([135, 206, 235]);
    const SUN: Rgb<u8> = Rgb([255, 204, 51]);
    const WATER: Rgb<u8> = Rgb([30, 110, 200]);
    const GROUND: Rgb<u8> = Rgb([70, 140, 60]);

    fn scene() -> ParallaxScene {
        ParallaxScene::new(1000.0, Motion::default())
    }

    fn close(a: (f64, f64), b: (f64, f64)) -> bool {
        (a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9
    }

    #[test]
    fn test_affine_rotate_about_pivot() {
        let rotate = Affine::from_transform(&Transform::Rotate {
            angle: 90.0,
            cx: 0.0,
            cy: 400.0,
        });

        // Pivot stays put
        assert!(close(rotate.apply(0.0, 400.0), (0.0, 400.0)));
        // Clockwise on screen: a point above the pivot swings to its right
        assert!(close(rotate.apply(0.0, 300.0), (100.0, 400.0)));
    }

    #[test]
    fn test_affine_invert() {
        let transforms = [
            Transform::Translate { x: 125.0, y: -3.0 },
            Transform::Scale { x: 2.0, y: 0.5 },
            Transform::Rotate {
                angle: 15.0,
                cx: 0.0,
                cy: 400.0,
            },
        ];

        for transform in transforms.iter() {
            let forward = Affine::from_transform(transform);
            let inverse = forward.invert().unwrap();
            let (x, y) = forward.apply(37.0, 81.0);

            assert!(close(inverse.apply(x, y), (37.0, 81.0)), "{}", transform);
        }
    }

    #[test]
    fn test_affine_singular() {
        let collapsed = Affine::from_transform(&Transform::uniform_scale(0.0));
        assert_eq!(collapsed.invert(), None);

        let nan = Affine::from_transform(&Transform::uniform_scale(f64::NAN));
        assert_eq!(nan.invert(), None);
    }

    #[test]
    fn test_shape_contains() {
        let rect = Shape::Rect {
            x: 0.0,
            y: 250.0,
            width: 500.0,
            height: 150.0,
        };
        assert!(rect.contains(0.0, 250.0));
        assert!(!rect.contains(0.0, 400.0));
        assert!(!rect.contains(-0.5, 300.0));

        let circle = Shape::Circle {
            cx: 10.0,
            cy: 10.0,
            r: 5.0,
        };
        assert!(circle.contains(13.0, 14.0));
        assert!(!circle.contains(14.0, 14.0));
    }

    #[test]
    fn test_rasterize_top_of_container() {
        let img = rasterize(&SceneGeometry::default(), &scene().frame(0.0));

        assert_eq!(img.dimensions(), (500, 400));
        assert_eq!(*img.get_pixel(10, 10), SKY);
        assert_eq!(*img.get_pixel(400, 90), SUN);
        assert_eq!(*img.get_pixel(10, 300), WATER);
        assert_eq!(*img.get_pixel(10, 380), GROUND);
    }

    #[test]
    fn test_rasterize_halfway() {
        let img = rasterize(&SceneGeometry::default(), &scene().frame(500.0));

        // Sky halved towards the origin
        assert_eq!(*img.get_pixel(10, 10), SKY);
        assert_eq!(*img.get_pixel(300, 10), PIXEL_BLACK);
        // Sun swung 15 degrees about (0, 400)
        assert_eq!(*img.get_pixel(466, 204), SUN);
        assert_eq!(*img.get_pixel(400, 90), PIXEL_BLACK);
        // Water and ground pushed out of view
        assert_eq!(*img.get_pixel(10, 300), PIXEL_BLACK);
        assert_eq!(*img.get_pixel(10, 380), PIXEL_BLACK);
    }

    #[test]
    fn test_rasterize_collapsed_sky() {
        let img = rasterize(&SceneGeometry::default(), &scene().frame(1000.0));

        assert_eq!(*img.get_pixel(0, 0), PIXEL_BLACK);
        assert_eq!(*img.get_pixel(250, 200), PIXEL_BLACK);
    }

    #[test]
    fn test_svg_document() {
        let doc = svg_document(&SceneGeometry::default(), &scene().frame(500.0));

        assert!(doc.starts_with("<svg "));
        assert!(doc.contains(r#"<g class="sky" transform="scale(0.5)">"#));
        assert!(!doc.contains("translate(125, 0)"));
        assert!(doc.contains(r#"<g class="sun" transform="rotate(15, 0, 400)">"#));
        assert!(doc.contains(r#"<g class="water" transform="translate(0, 234)">"#));
        assert!(doc.contains(r#"<g class="ground" transform="scale(2)">"#));
        assert!(doc.contains(r#"<circle cx="400" cy="90" r="40" fill="rgb(255,204,51)"/>"#));
        assert!(doc.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_json_writer() {
        let mut buffer: Vec<u8> = Vec::new();
        {
            let mut writer = JsonWriter::new(&mut buffer);
            writer.render(0, &scene().frame(0.0)).unwrap();
            writer.render(1, &scene().frame(500.0)).unwrap();
        }

        let out = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);

        let record: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(record["frame"], 1);
        assert_eq!(record["progress"], 0.5);
        assert_eq!(record["descriptors"].as_array().unwrap().len(), 5);
        assert_eq!(record["descriptors"][3]["layer"], "water");
        assert_eq!(record["descriptors"][3]["transform"]["y"], 234.0);
    }
}
