use super::TransformError;
use image::codecs::webp::{WebPEncoder, WebPQuality};
use image::imageops::FilterType;
use image::{ColorType, DynamicImage, RgbaImage};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Images wider than this are downscaled; narrower ones are left alone
pub const MAX_WIDTH: u32 = 600;
pub const JPEG_QUALITY: u8 = 30;
pub const WEBP_QUALITY: u8 = 30;

/// Largest palette an indexed PNG can carry
const MAX_PALETTE_SIZE: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Webp,
}

impl ImageKind {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageKind::Jpeg),
            "png" => Some(ImageKind::Png),
            "webp" => Some(ImageKind::Webp),
            _ => None,
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => ".jpg",
            ImageKind::Png => ".png",
            ImageKind::Webp => ".webp",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Png => "image/png",
            ImageKind::Webp => "image/webp",
        }
    }
}

/// Decodes `input`, caps its width at [`MAX_WIDTH`] and re-encodes it as `kind`.
pub fn reencode_image(input: &Path, output: &Path, kind: ImageKind) -> Result<(), TransformError> {
    let img = image::io::Reader::open(input)?
        .with_guessed_format()?
        .decode()?;
    let img = downscale(img);

    let mut writer = BufWriter::new(File::create(output)?);
    match kind {
        ImageKind::Jpeg => encode_jpeg(&img, &mut writer)?,
        ImageKind::Png => encode_png(&img, &mut writer)?,
        ImageKind::Webp => encode_webp(&img, &mut writer)?,
    }
    writer.flush()?;
    Ok(())
}

/// Output size for a `width` x `height` image, keeping the aspect ratio.
pub fn target_dimensions(width: u32, height: u32) -> (u32, u32) {
    if width <= MAX_WIDTH {
        return (width, height);
    }
    let scaled = (height as f64 * MAX_WIDTH as f64 / width as f64).round();
    (MAX_WIDTH, (scaled as u32).max(1))
}

fn downscale(img: DynamicImage) -> DynamicImage {
    let (width, height) = (img.width(), img.height());
    let (target_w, target_h) = target_dimensions(width, height);
    if (target_w, target_h) == (width, height) {
        return img;
    }
    img.resize_exact(target_w, target_h, FilterType::Lanczos3)
}

fn encode_jpeg<W: Write>(img: &DynamicImage, writer: W) -> Result<(), TransformError> {
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    let (w, h) = match (u16::try_from(width), u16::try_from(height)) {
        (Ok(w), Ok(h)) => (w, h),
        _ => return Err(TransformError::Dimensions(width, height)),
    };

    let mut encoder = jpeg_encoder::Encoder::new(writer, JPEG_QUALITY);
    encoder.set_progressive(true);
    encoder.set_optimized_huffman_tables(true);
    encoder.encode(rgb.as_raw(), w, h, jpeg_encoder::ColorType::Rgb)?;
    Ok(())
}

/// Indexed pixels plus the palette they point into.
struct Palette {
    rgb: Vec<u8>,
    alpha: Option<Vec<u8>>,
    indices: Vec<u8>,
}

/// Returns `None` when the image uses more colours than a palette can hold.
fn build_palette(img: &RgbaImage) -> Option<Palette> {
    let mut lookup: HashMap<[u8; 4], u8> = HashMap::new();
    let mut colours: Vec<[u8; 4]> = Vec::new();
    let mut indices = Vec::with_capacity(img.len() / 4);

    for pixel in img.pixels() {
        let index = match lookup.get(&pixel.0) {
            Some(index) => *index,
            None => {
                if colours.len() == MAX_PALETTE_SIZE {
                    return None;
                }
                let index = colours.len() as u8;
                lookup.insert(pixel.0, index);
                colours.push(pixel.0);
                index
            }
        };
        indices.push(index);
    }

    let rgb = colours.iter().flat_map(|c| [c[0], c[1], c[2]]).collect();
    let alpha = colours
        .iter()
        .any(|c| c[3] != u8::MAX)
        .then(|| colours.iter().map(|c| c[3]).collect());

    Some(Palette {
        rgb,
        alpha,
        indices,
    })
}

fn encode_png<W: Write>(img: &DynamicImage, writer: W) -> Result<(), TransformError> {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut encoder = png::Encoder::new(writer, width, height);
    encoder.set_compression(png::Compression::Best);
    encoder.set_depth(png::BitDepth::Eight);

    let data = match build_palette(&rgba) {
        Some(palette) => {
            encoder.set_color(png::ColorType::Indexed);
            encoder.set_palette(palette.rgb);
            if let Some(alpha) = palette.alpha {
                encoder.set_trns(alpha);
            }
            palette.indices
        }
        None if rgba.pixels().all(|p| p.0[3] == u8::MAX) => {
            encoder.set_color(png::ColorType::Rgb);
            encoder.set_adaptive_filter(png::AdaptiveFilterType::Adaptive);
            DynamicImage::ImageRgba8(rgba).to_rgb8().into_raw()
        }
        None => {
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_adaptive_filter(png::AdaptiveFilterType::Adaptive);
            rgba.into_raw()
        }
    };

    let mut png_writer = encoder.write_header()?;
    png_writer.write_image_data(&data)?;
    png_writer.finish()?;
    Ok(())
}

fn encode_webp<W: Write>(img: &DynamicImage, writer: W) -> Result<(), TransformError> {
    // libwebp only takes 8-bit RGB(A)
    let (data, color) = if img.color().has_alpha() {
        (img.to_rgba8().into_raw(), ColorType::Rgba8)
    } else {
        (img.to_rgb8().into_raw(), ColorType::Rgb8)
    };

    let encoder = WebPEncoder::new_with_quality(writer, WebPQuality::lossy(WEBP_QUALITY));
    encoder.encode(&data, img.width(), img.height(), color)?;
    Ok(())
}
