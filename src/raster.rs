//! SVG to PNG conversion at square target sizes.

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{Options, Tree};

use crate::error::RasterError;

/// How a document is sized into a `size × size` box.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Fit {
    /// Scale to fit within the box, keeping the aspect ratio. The longer
    /// side becomes exactly `size`.
    #[default]
    Inside,
    /// Like [`Fit::Inside`], centred on a transparent `size × size` canvas.
    Contain,
    /// Stretch to exactly `size × size`.
    Fill,
}

/// Renders SVG documents to PNG.
///
/// Holds the parsing options, including the system font database, so that
/// fonts are loaded once and shared by every conversion.
pub struct Rasterizer {
    options: Options<'static>,
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer {
    pub fn new() -> Self {
        let mut options = Options::default();
        options.fontdb_mut().load_system_fonts();
        Self { options }
    }

    /// Rasterizer without any fonts, text elements render empty.
    pub fn without_fonts() -> Self {
        Self {
            options: Options::default(),
        }
    }

    /// Renders `data` into an encoded PNG.
    pub fn rasterize(&self, data: &[u8], size: u32, fit: Fit) -> Result<Vec<u8>, RasterError> {
        let tree = Tree::from_data(data, &self.options)?;
        let (width, height) = (tree.size().width(), tree.size().height());

        if !(width > 0.0 && height > 0.0) {
            return Err(RasterError::ZeroSize(width, height));
        }

        let scale_x = size as f32 / width;
        let scale_y = size as f32 / height;

        let (canvas_w, canvas_h, transform) = match fit {
            Fit::Fill => (size, size, Transform::from_scale(scale_x, scale_y)),
            Fit::Inside => {
                let scale = scale_x.min(scale_y);
                let w = scaled(width, scale, size);
                let h = scaled(height, scale, size);
                (w, h, Transform::from_scale(scale, scale))
            }
            Fit::Contain => {
                let scale = scale_x.min(scale_y);
                let dx = (size as f32 - width * scale) / 2.0;
                let dy = (size as f32 - height * scale) / 2.0;
                let transform = Transform::from_scale(scale, scale).post_translate(dx, dy);
                (size, size, transform)
            }
        };

        let mut pixmap =
            Pixmap::new(canvas_w, canvas_h).ok_or(RasterError::Canvas(canvas_w, canvas_h))?;
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        encode(&pixmap)
    }
}

fn scaled(side: f32, scale: f32, size: u32) -> u32 {
    ((side * scale).round() as u32).clamp(1, size)
}

/// tiny-skia keeps premultiplied alpha, PNG expects straight alpha.
fn encode(pixmap: &Pixmap) -> Result<Vec<u8>, RasterError> {
    let mut rgba = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        let color = pixel.demultiply();
        rgba.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
    }

    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer).write_image(
        &rgba,
        pixmap.width(),
        pixmap.height(),
        ExtendedColorType::Rgba8,
    )?;

    Ok(buffer)
}
