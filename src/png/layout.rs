//! Turning the canonical samples into other pixel layouts.

use super::*;

/// The pixel layouts that image data can be projected into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelLayout {
  /// The canonical samples as stored, for any color type.
  Raw,
  /// Palette indices, one byte per pixel. Only for indexed images.
  Index,
  /// Three bytes per pixel.
  Rgb,
  /// Four bytes per pixel, with transparency folded into the alpha.
  Rgba,
}

/// Projects canonical samples into the requested layout.
///
/// * Greyscale is copied into all three color channels.
/// * Indexed pixels are looked up in the palette. Indices the palette doesn't
///   have come out black.
/// * For `Rgba`, color types without alpha get it from the transparency
///   chunk, or 255 if there isn't one. Color types with alpha keep their own.
/// * For `Rgb`, any alpha is dropped.
///
/// ## Failure
/// * [`UnsupportedOperation`](PngError::UnsupportedOperation) if `Index` is
///   asked for on an image that isn't indexed.
/// * [`OutOfRange`](PngError::OutOfRange) if `samples` isn't the size the
///   geometry says.
pub fn project(
  geometry: ImageGeometry, layout: PixelLayout, samples: &[u8], palette: Option<&PLTE>,
  transparency: Option<&tRNS>,
) -> PngResult<Vec<u8>> {
  if Some(samples.len()) != geometry.sample_count() {
    return Err(PngError::OutOfRange);
  }
  let channels = match layout {
    PixelLayout::Raw => return Ok(samples.to_vec()),
    PixelLayout::Index if geometry.color_type.is_indexed() => return Ok(samples.to_vec()),
    PixelLayout::Index => return Err(PngError::UnsupportedOperation),
    PixelLayout::Rgb => 3,
    PixelLayout::Rgba => 4,
  };
  let spp = geometry.samples_per_pixel();
  let mut out = Vec::with_capacity(samples.len() / spp * channels);
  for pixel in samples.chunks_exact(spp) {
    let rgba = pixel_to_rgba(geometry, pixel, palette, transparency);
    out.extend_from_slice(&rgba[..channels]);
  }
  Ok(out)
}

/// Expands one pixel's samples to RGBA.
#[must_use]
pub fn pixel_to_rgba(
  geometry: ImageGeometry, pixel: &[u8], palette: Option<&PLTE>, transparency: Option<&tRNS>,
) -> [u8; 4] {
  let key_alpha = || match transparency {
    Some(trns) if trns.is_transparent(geometry, pixel) => 0,
    _ => u8::MAX,
  };
  match (geometry.color_type, pixel) {
    (PngColorType::Y, [y, ..]) => [*y, *y, *y, key_alpha()],
    (PngColorType::RGB, [r, g, b, ..]) => [*r, *g, *b, key_alpha()],
    (PngColorType::Index, [i, ..]) => {
      let [r, g, b] = palette.and_then(|p| p.color_at(*i)).unwrap_or_default().to_array();
      let a = transparency.map_or(u8::MAX, |trns| trns.alpha_of(*i));
      [r, g, b, a]
    }
    (PngColorType::YA, [y, a, ..]) => [*y, *y, *y, *a],
    (PngColorType::RGBA, [r, g, b, a, ..]) => [*r, *g, *b, *a],
    _ => [0, 0, 0, u8::MAX],
  }
}
