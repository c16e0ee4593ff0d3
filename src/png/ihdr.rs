use super::*;

/// The types of color that PNG supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum PngColorType {
  /// Greyscale
  Y = 0,
  /// Red, Green, Blue
  RGB = 2,
  /// Index into a palette.
  ///
  /// The palette will have RGB8 data. There may optionally be a transparency
  /// chunk.
  Index = 3,
  /// Greyscale + Alpha
  YA = 4,
  /// Red, Green, Blue, Alpha
  RGBA = 6,
}
impl PngColorType {
  /// The number of samples in each pixel of this type of color.
  #[inline]
  #[must_use]
  pub const fn channel_count(self) -> usize {
    match self {
      Self::Y => 1,
      Self::RGB => 3,
      Self::Index => 1,
      Self::YA => 2,
      Self::RGBA => 4,
    }
  }
  /// The number of non-alpha samples in each pixel.
  #[inline]
  #[must_use]
  pub const fn color_channel_count(self) -> usize {
    match self {
      Self::RGB | Self::RGBA => 3,
      Self::Y | Self::YA | Self::Index => 1,
    }
  }
  #[inline]
  #[must_use]
  pub const fn has_alpha(self) -> bool {
    matches!(self, Self::YA | Self::RGBA)
  }
  #[inline]
  #[must_use]
  pub const fn is_indexed(self) -> bool {
    matches!(self, Self::Index)
  }
  /// If the given bit depth is legal for this color type.
  #[inline]
  #[must_use]
  pub const fn allows_bit_depth(self, bit_depth: u8) -> bool {
    match self {
      Self::Y | Self::Index => matches!(bit_depth, 1 | 2 | 4 | 8),
      Self::RGB | Self::YA | Self::RGBA => bit_depth == 8,
    }
  }
}
impl TryFrom<u8> for PngColorType {
  type Error = PngError;
  #[inline]
  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Ok(match value {
      0 => PngColorType::Y,
      2 => PngColorType::RGB,
      3 => PngColorType::Index,
      4 => PngColorType::YA,
      6 => PngColorType::RGBA,
      _ => return Err(PngError::InvalidFormat),
    })
  }
}

/// The pixel geometry every other chunk works from.
///
/// This is built once the header is known and handed to each chunk by value,
/// so no chunk ever reads another chunk's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageGeometry {
  pub width: u32,
  pub height: u32,
  pub bit_depth: u8,
  pub color_type: PngColorType,
}
impl ImageGeometry {
  /// Samples per pixel.
  #[inline]
  #[must_use]
  pub const fn samples_per_pixel(&self) -> usize {
    self.color_type.channel_count()
  }
  /// Samples per row of the canonical (unpacked) buffer.
  ///
  /// The size methods that don't return `Option` assume a geometry that
  /// passed [`IHDR::validate`], which checks that none of them overflow.
  #[inline]
  #[must_use]
  pub const fn samples_per_row(&self) -> usize {
    self.width as usize * self.samples_per_pixel()
  }
  /// Total canonical samples, or `None` if that overflows.
  #[inline]
  #[must_use]
  pub const fn sample_count(&self) -> Option<usize> {
    match (self.width as usize).checked_mul(self.samples_per_pixel()) {
      Some(per_row) => per_row.checked_mul(self.height as usize),
      None => None,
    }
  }
  /// Bytes per row once packed, not counting the filter-type byte.
  #[inline]
  #[must_use]
  pub const fn row_byte_width(&self) -> usize {
    (self.samples_per_row() * self.bit_depth as usize).div_ceil(8)
  }
  /// Size of the decompressed image data (every packed row plus its
  /// filter-type byte), or `None` if that overflows.
  #[must_use]
  pub const fn filtered_len(&self) -> Option<usize> {
    let Some(per_row) = (self.width as usize).checked_mul(self.samples_per_pixel()) else {
      return None;
    };
    let Some(row_bits) = per_row.checked_mul(self.bit_depth as usize) else {
      return None;
    };
    (row_bits.div_ceil(8) + 1).checked_mul(self.height as usize)
  }
  /// The "left" distance for filtering, never less than 1.
  #[inline]
  #[must_use]
  pub const fn bytes_per_pixel(&self) -> usize {
    let bits = self.samples_per_pixel() * self.bit_depth as usize;
    if bits < 8 {
      1
    } else {
      bits / 8
    }
  }
  /// Largest palette this depth can address.
  #[inline]
  #[must_use]
  pub const fn max_colors(&self) -> usize {
    1 << self.bit_depth
  }
  /// The highest code a sample can hold before any translation.
  #[inline]
  #[must_use]
  pub const fn max_sample_code(&self) -> u16 {
    (1 << self.bit_depth) - 1
  }
  /// If samples get spread over `0..=255` when unpacked.
  ///
  /// Palette indices are never translated.
  #[inline]
  #[must_use]
  pub const fn translates_samples(&self) -> bool {
    !self.color_type.is_indexed()
  }
  /// Linear index of the first sample of pixel `(x, y)`.
  #[inline]
  #[must_use]
  pub const fn sample_index(&self, x: u32, y: u32) -> usize {
    y as usize * self.samples_per_row() + x as usize * self.samples_per_pixel()
  }
}

/// Image Header
///
/// The compression, filter, and interlace method bytes are kept as loaded but
/// never interpreted. New headers always use 0 for all three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IHDR {
  /// width in pixels
  pub width: u32,
  /// height in pixels
  pub height: u32,
  /// bits per sample
  pub bit_depth: u8,
  /// pixel color type
  pub color_type: PngColorType,
  pub compression_method: u8,
  pub filter_method: u8,
  pub interlace_method: u8,
}
impl IHDR {
  /// Size of the header's payload.
  pub const PAYLOAD_SIZE: usize = 13;

  /// Makes a validated header for a new image.
  pub fn new(
    width: u32, height: u32, bit_depth: u8, color_type: PngColorType,
  ) -> PngResult<Self> {
    let out = Self {
      width,
      height,
      bit_depth,
      color_type,
      compression_method: 0,
      filter_method: 0,
      interlace_method: 0,
    };
    out.validate()?;
    Ok(out)
  }

  /// Checks the header describes an image this crate can hold.
  ///
  /// ## Failure
  /// * Width or height is 0.
  /// * The bit depth is not 1, 2, 4, or 8 (16 bit images are unsupported).
  /// * The depth isn't legal for the color type.
  /// * The sample buffer size would overflow `usize`.
  pub fn validate(&self) -> PngResult<()> {
    if self.width == 0 || self.height == 0 {
      log::warn!("image dimensions {}x{} are empty", self.width, self.height);
      return Err(PngError::InvalidFormat);
    }
    if !matches!(self.bit_depth, 1 | 2 | 4 | 8) {
      log::warn!("unsupported bit depth {}", self.bit_depth);
      return Err(PngError::InvalidFormat);
    }
    if !self.color_type.allows_bit_depth(self.bit_depth) {
      log::warn!("bit depth {} is not allowed for {:?}", self.bit_depth, self.color_type);
      return Err(PngError::InvalidFormat);
    }
    let geometry = self.geometry();
    if geometry.sample_count().is_none() || geometry.filtered_len().is_none() {
      log::warn!("image of {}x{} {:?} is too large", self.width, self.height, self.color_type);
      return Err(PngError::InvalidFormat);
    }
    Ok(())
  }

  #[inline]
  #[must_use]
  pub const fn geometry(&self) -> ImageGeometry {
    ImageGeometry {
      width: self.width,
      height: self.height,
      bit_depth: self.bit_depth,
      color_type: self.color_type,
    }
  }

  /// The 13 payload bytes.
  #[must_use]
  pub fn to_payload(&self) -> [u8; Self::PAYLOAD_SIZE] {
    let [w0, w1, w2, w3] = self.width.to_be_bytes();
    let [h0, h1, h2, h3] = self.height.to_be_bytes();
    [
      w0,
      w1,
      w2,
      w3,
      h0,
      h1,
      h2,
      h3,
      self.bit_depth,
      self.color_type as u8,
      self.compression_method,
      self.filter_method,
      self.interlace_method,
    ]
  }

  /// The full framed chunk.
  pub fn to_chunk(&self) -> PngResult<Vec<u8>> {
    frame_chunk(PngChunkTy::IHDR, &self.to_payload())
  }
}
impl TryFrom<&[u8]> for IHDR {
  type Error = PngError;
  /// Parses and validates a header payload.
  fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
    match value {
      [w0, w1, w2, w3, h0, h1, h2, h3, bit_depth, color_type, compression_method, filter_method, interlace_method] =>
      {
        let out = Self {
          width: u32::from_be_bytes([*w0, *w1, *w2, *w3]),
          height: u32::from_be_bytes([*h0, *h1, *h2, *h3]),
          bit_depth: *bit_depth,
          color_type: PngColorType::try_from(*color_type)?,
          compression_method: *compression_method,
          filter_method: *filter_method,
          interlace_method: *interlace_method,
        };
        out.validate()?;
        Ok(out)
      }
      _ => Err(PngError::InvalidFormat),
    }
  }
}
