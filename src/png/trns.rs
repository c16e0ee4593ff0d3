use super::*;

/// Transparency
///
/// The shape depends on the PNG color type:
/// * indexed: one alpha byte per palette entry. There can be fewer alpha
///   entries than palette entries, and missing entries are fully opaque
///   (`0xFF`).
/// * greyscale: a single sample value that's fully transparent wherever it
///   appears.
/// * RGB: an `[r, g, b]` color key that works the same way.
///
/// Key values are in the image's own bit depth scale, the same as they're
/// written in the chunk. Images that have an alpha channel never use this
/// chunk.
///
/// Spec: [tRNS](https://www.w3.org/TR/png/#11tRNS)
#[derive(Clone, PartialEq, Eq, Hash)]
#[allow(nonstandard_style)]
pub enum tRNS {
  Indexed(Vec<u8>),
  GrayKey(u16),
  TrueColorKey([u16; 3]),
}
impl Debug for tRNS {
  #[inline]
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    match self {
      // currently prints no more than 8 alpha entries
      Self::Indexed(alphas) => f
        .debug_tuple("Indexed")
        .field(&&alphas[..alphas.len().min(8)])
        .field(&alphas.len())
        .finish(),
      Self::GrayKey(y) => f.debug_tuple("GrayKey").field(y).finish(),
      Self::TrueColorKey(rgb) => f.debug_tuple("TrueColorKey").field(rgb).finish(),
    }
  }
}
impl tRNS {
  /// An empty alpha table for an indexed image.
  #[inline]
  #[must_use]
  pub const fn new_indexed() -> Self {
    Self::Indexed(Vec::new())
  }

  /// A color key for a greyscale (one value) or RGB (three values) image.
  ///
  /// ## Failure
  /// * [`UnsupportedOperation`](PngError::UnsupportedOperation) for indexed
  ///   images and images with an alpha channel.
  /// * [`OutOfRange`](PngError::OutOfRange) if the wrong number of values is
  ///   given, or a value doesn't fit the bit depth.
  pub fn new_key(geometry: ImageGeometry, key: &[u16]) -> PngResult<Self> {
    let fits = key.iter().all(|&k| k <= geometry.max_sample_code());
    match (geometry.color_type, key) {
      (PngColorType::Y, [y]) if fits => Ok(Self::GrayKey(*y)),
      (PngColorType::RGB, [r, g, b]) if fits => Ok(Self::TrueColorKey([*r, *g, *b])),
      (PngColorType::Y | PngColorType::RGB, _) => Err(PngError::OutOfRange),
      _ => Err(PngError::UnsupportedOperation),
    }
  }

  /// Parses a `tRNS` payload, picking the shape by color type.
  ///
  /// ## Failure
  /// * [`UnsupportedOperation`](PngError::UnsupportedOperation) for color
  ///   types that have their own alpha channel.
  /// * [`InvalidFormat`](PngError::InvalidFormat) if the payload is the wrong
  ///   size for the color type.
  pub fn load(geometry: ImageGeometry, data: &[u8]) -> PngResult<Self> {
    Ok(match (geometry.color_type, data) {
      (PngColorType::Y, [y0, y1]) => Self::GrayKey(u16::from_be_bytes([*y0, *y1])),
      (PngColorType::RGB, [r0, r1, g0, g1, b0, b1]) => Self::TrueColorKey([
        u16::from_be_bytes([*r0, *r1]),
        u16::from_be_bytes([*g0, *g1]),
        u16::from_be_bytes([*b0, *b1]),
      ]),
      (PngColorType::Index, alphas) if alphas.len() <= geometry.max_colors() => {
        Self::Indexed(alphas.to_vec())
      }
      (PngColorType::YA | PngColorType::RGBA, _) => {
        return Err(PngError::UnsupportedOperation)
      }
      _ => return Err(PngError::InvalidFormat),
    })
  }

  /// Sets the alpha of one palette index.
  ///
  /// Setting an index past the end of the table fills the indices in between
  /// with 255.
  ///
  /// ## Failure
  /// * [`UnsupportedOperation`](PngError::UnsupportedOperation) if this is a
  ///   color key.
  /// * [`OutOfRange`](PngError::OutOfRange) if the index can't exist at this
  ///   bit depth.
  pub fn set_alpha_of(&mut self, geometry: ImageGeometry, index: u8, alpha: u8) -> PngResult<()> {
    let Self::Indexed(alphas) = self else {
      return Err(PngError::UnsupportedOperation);
    };
    let i = usize::from(index);
    if i >= geometry.max_colors() {
      return Err(PngError::OutOfRange);
    }
    if alphas.len() <= i {
      alphas.resize(i + 1, u8::MAX);
    }
    alphas[i] = alpha;
    Ok(())
  }

  /// Puts a palette index back to fully opaque.
  ///
  /// ## Failure
  /// * [`UnsupportedOperation`](PngError::UnsupportedOperation) if this is a
  ///   color key.
  /// * [`OutOfRange`](PngError::OutOfRange) if the index was never set.
  pub fn remove_alpha_of(&mut self, index: u8) -> PngResult<()> {
    let Self::Indexed(alphas) = self else {
      return Err(PngError::UnsupportedOperation);
    };
    let entry = alphas.get_mut(usize::from(index)).ok_or(PngError::OutOfRange)?;
    *entry = u8::MAX;
    Ok(())
  }

  /// The alpha of a palette index. Unset entries (and all color keys) are
  /// opaque.
  #[inline]
  #[must_use]
  pub fn alpha_of(&self, index: u8) -> u8 {
    match self {
      Self::Indexed(alphas) => alphas.get(usize::from(index)).copied().unwrap_or(u8::MAX),
      _ => u8::MAX,
    }
  }

  /// The alpha table expanded to exactly `palette_len` entries.
  #[must_use]
  pub fn alphas(&self, palette_len: usize) -> Vec<u8> {
    (0..=u8::MAX).take(palette_len).map(|i| self.alpha_of(i)).collect()
  }

  /// If a pixel's samples (as stored in the canonical sample buffer) should
  /// be fully transparent.
  ///
  /// Color keys are compared after translating them the same way the samples
  /// were translated. For indexed images this checks for an alpha of 0.
  #[must_use]
  pub fn is_transparent(&self, geometry: ImageGeometry, pixel: &[u8]) -> bool {
    let key_sample = |k: u16| -> Option<u8> {
      if k > geometry.max_sample_code() {
        None
      } else {
        u8::try_from(k).ok().map(|code| translate_code(geometry.bit_depth, code))
      }
    };
    match (self, pixel) {
      (Self::Indexed(_), [i, ..]) => self.alpha_of(*i) == 0,
      (Self::GrayKey(y), [v, ..]) => key_sample(*y) == Some(*v),
      (Self::TrueColorKey([r, g, b]), [pr, pg, pb, ..]) => {
        key_sample(*r) == Some(*pr) && key_sample(*g) == Some(*pg) && key_sample(*b) == Some(*pb)
      }
      _ => false,
    }
  }

  /// Payload bytes: the alpha table, or each key value as big-endian `u16`.
  #[must_use]
  pub fn to_payload(&self) -> Vec<u8> {
    match self {
      Self::Indexed(alphas) => alphas.clone(),
      Self::GrayKey(y) => y.to_be_bytes().to_vec(),
      Self::TrueColorKey(rgb) => rgb.iter().flat_map(|k| k.to_be_bytes()).collect(),
    }
  }

  #[inline]
  pub fn to_chunk(&self) -> PngResult<Vec<u8>> {
    frame_chunk(PngChunkTy::tRNS, &self.to_payload())
  }
}
