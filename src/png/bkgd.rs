use super::*;

/// Background color.
///
/// Greyscale and RGB backgrounds are written as `u16` values, but this crate
/// keeps every sample as 8 bits, so wider values are clamped to 255 when
/// they're loaded or set. Images with alpha use the color part of their
/// pixel format: one value for greyscale + alpha, three for RGBA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(nonstandard_style)]
#[allow(missing_docs)]
pub enum bKGD {
  Greyscale { y: u8 },
  RGB { r: u8, g: u8, b: u8 },
  Index { i: u8 },
}
impl bKGD {
  /// Makes a background from one sample (greyscale, indexed) or three (RGB).
  ///
  /// ## Failure
  /// * [`OutOfRange`](PngError::OutOfRange) if the sample count doesn't
  ///   match the color type.
  pub fn new(geometry: ImageGeometry, samples: &[u16]) -> PngResult<Self> {
    let clamp = |v: u16| u8::try_from(v).unwrap_or(u8::MAX);
    Ok(match (geometry.color_type, samples) {
      (PngColorType::Index, [i]) => bKGD::Index { i: clamp(*i) },
      (PngColorType::Y | PngColorType::YA, [y]) => bKGD::Greyscale { y: clamp(*y) },
      (PngColorType::RGB | PngColorType::RGBA, [r, g, b]) => {
        bKGD::RGB { r: clamp(*r), g: clamp(*g), b: clamp(*b) }
      }
      _ => return Err(PngError::OutOfRange),
    })
  }

  /// Parses a `bKGD` payload: one byte for indexed images, otherwise one
  /// big-endian `u16` per color sample.
  ///
  /// ## Failure
  /// * [`InvalidFormat`](PngError::InvalidFormat) if the payload is the wrong
  ///   size for the color type.
  pub fn load(geometry: ImageGeometry, data: &[u8]) -> PngResult<Self> {
    let samples: Vec<u16> = match (geometry.color_type, data) {
      (PngColorType::Index, [i]) => alloc::vec![u16::from(*i)],
      (PngColorType::Index, _) => return Err(PngError::InvalidFormat),
      (_, data) if data.len() == 2 * geometry.color_type.color_channel_count() => {
        data.chunks_exact(2).map(|pair| u16::from_be_bytes([pair[0], pair[1]])).collect()
      }
      _ => return Err(PngError::InvalidFormat),
    };
    Self::new(geometry, &samples)
  }

  /// The background as 8-bit samples.
  #[inline]
  #[must_use]
  pub fn samples(&self) -> Vec<u8> {
    match *self {
      bKGD::Greyscale { y } => alloc::vec![y],
      bKGD::RGB { r, g, b } => alloc::vec![r, g, b],
      bKGD::Index { i } => alloc::vec![i],
    }
  }

  #[must_use]
  pub fn to_payload(&self) -> Vec<u8> {
    match *self {
      bKGD::Index { i } => alloc::vec![i],
      _ => self.samples().into_iter().flat_map(|s| u16::from(s).to_be_bytes()).collect(),
    }
  }

  #[inline]
  pub fn to_chunk(&self) -> PngResult<Vec<u8>> {
    frame_chunk(PngChunkTy::bKGD, &self.to_payload())
  }
}
