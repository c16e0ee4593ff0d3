use super::*;

/// Where to read or write in the sample buffer.
///
/// You can build one from a `usize` (a linear sample offset) or from a `(u32,
/// u32)` pair, which is the `(x, y)` of a pixel and points at that pixel's
/// first sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleAt {
  Offset(usize),
  Pixel { x: u32, y: u32 },
}
impl From<usize> for SampleAt {
  #[inline]
  #[must_use]
  fn from(offset: usize) -> Self {
    Self::Offset(offset)
  }
}
impl From<(u32, u32)> for SampleAt {
  #[inline]
  #[must_use]
  fn from((x, y): (u32, u32)) -> Self {
    Self::Pixel { x, y }
  }
}

/// Image Data
///
/// This owns the canonical samples of the image: one `u8` per sample, rows in
/// order, no filter bytes and no bit packing. Sub-byte greyscale samples are
/// stored translated to `0..=255`, palette indices are stored as-is.
///
/// On the wire the data is packed, given a filter byte per row, compressed,
/// and then framed as a single `IDAT` chunk.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct IDAT {
  geometry: ImageGeometry,
  samples: Vec<u8>,
}
impl Debug for IDAT {
  #[inline]
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    // currently prints no more than 12 samples
    f.debug_struct("IDAT")
      .field("geometry", &self.geometry)
      .field("samples", &(&self.samples[..self.samples.len().min(12)], self.samples.len()))
      .finish()
  }
}
impl IDAT {
  /// An all-zero image.
  ///
  /// ## Failure
  /// * [`InvalidFormat`](PngError::InvalidFormat) if the sample count
  ///   overflows.
  pub fn new(geometry: ImageGeometry) -> PngResult<Self> {
    let count = geometry.sample_count().ok_or(PngError::InvalidFormat)?;
    Ok(Self { geometry, samples: alloc::vec![0; count] })
  }

  /// Decompresses, defilters, and unpacks the image data.
  ///
  /// `compressed` is the zlib stream, which is all `IDAT` payloads joined
  /// together.
  ///
  /// ## Failure
  /// * [`InvalidFormat`](PngError::InvalidFormat) if decompression fails,
  ///   the data isn't exactly the size the geometry needs, a row has an illegal filter
  ///   type, or the geometry can't be unpacked.
  pub fn decode(
    geometry: ImageGeometry, compressed: &[u8], codec: &dyn ZlibCodec,
  ) -> PngResult<Self> {
    let row_byte_width = geometry.row_byte_width();
    let height = geometry.height as usize;
    let expected = geometry.filtered_len().ok_or(PngError::InvalidFormat)?;
    let mut filtered = codec.inflate(compressed, expected)?;
    if filtered.len() != expected {
      log::warn!("image data is {} bytes, expected {expected}", filtered.len());
      return Err(PngError::InvalidFormat);
    }
    defilter(&mut filtered, row_byte_width, geometry.bytes_per_pixel())?;
    let packed = remove_filter_fields(&filtered, row_byte_width, height)?;
    let samples_per_row = geometry.samples_per_row();
    let translate = geometry.translates_samples();
    let mut samples = Vec::with_capacity(geometry.sample_count().ok_or(PngError::InvalidFormat)?);
    for row in packed.chunks_exact(row_byte_width) {
      let mut unpacked = unpack(row, geometry.bit_depth, translate)?;
      unpacked.truncate(samples_per_row);
      samples.extend_from_slice(&unpacked);
    }
    log::trace!("decoded {} samples from {} compressed bytes", samples.len(), compressed.len());
    Ok(Self { geometry, samples })
  }

  /// Packs, filters (always with filter type 0), compresses, and frames the
  /// image data.
  ///
  /// The chunk length is whatever the codec produced.
  ///
  /// ## Failure
  /// * [`InvalidFormat`](PngError::InvalidFormat) if a sample can't be
  ///   stored at the image's bit depth.
  pub fn encode(&self, codec: &dyn ZlibCodec) -> PngResult<Vec<u8>> {
    let row_byte_width = self.geometry.row_byte_width();
    let translate = self.geometry.translates_samples();
    let mut packed = Vec::with_capacity(row_byte_width * self.geometry.height as usize);
    for row in self.samples.chunks_exact(self.geometry.samples_per_row()) {
      packed.extend(pack(row, self.geometry.bit_depth, translate)?);
    }
    let filtered = add_filter_fields(&packed, row_byte_width, self.geometry.height as usize);
    let compressed = codec.deflate(&filtered);
    frame_chunk(PngChunkTy::IDAT, &compressed)
  }

  #[inline]
  #[must_use]
  pub const fn geometry(&self) -> ImageGeometry {
    self.geometry
  }

  /// All samples, row-major.
  #[inline]
  #[must_use]
  pub fn samples(&self) -> &[u8] {
    &self.samples
  }

  fn offset_of(&self, at: SampleAt) -> PngResult<usize> {
    let offset = match at {
      SampleAt::Offset(offset) => offset,
      SampleAt::Pixel { x, y } => {
        if x >= self.geometry.width || y >= self.geometry.height {
          return Err(PngError::OutOfRange);
        }
        self.geometry.sample_index(x, y)
      }
    };
    if offset < self.samples.len() {
      Ok(offset)
    } else {
      Err(PngError::OutOfRange)
    }
  }

  /// Reads one sample.
  ///
  /// ## Failure
  /// * [`OutOfRange`](PngError::OutOfRange) if the location is outside the
  ///   image.
  #[inline]
  pub fn get_sample(&self, at: impl Into<SampleAt>) -> PngResult<u8> {
    self.offset_of(at.into()).map(|i| self.samples[i])
  }

  /// All samples of the pixel at `(x, y)`.
  pub fn get_pixel(&self, x: u32, y: u32) -> PngResult<&[u8]> {
    let i = self.offset_of(SampleAt::Pixel { x, y })?;
    Ok(&self.samples[i..i + self.geometry.samples_per_pixel()])
  }

  /// Writes one sample.
  ///
  /// ## Failure
  /// * [`OutOfRange`](PngError::OutOfRange) if the location is outside the
  ///   image.
  #[inline]
  pub fn set_sample(&mut self, at: impl Into<SampleAt>, value: u8) -> PngResult<()> {
    self.set_samples(at, &[value])
  }

  /// Writes a run of samples starting at a location.
  ///
  /// Nothing is written unless all of the values fit.
  ///
  /// ## Failure
  /// * [`OutOfRange`](PngError::OutOfRange) if any of the run is outside the
  ///   image.
  pub fn set_samples(&mut self, at: impl Into<SampleAt>, values: &[u8]) -> PngResult<()> {
    let start = self.offset_of(at.into())?;
    let end = start.checked_add(values.len()).ok_or(PngError::OutOfRange)?;
    let dst = self.samples.get_mut(start..end).ok_or(PngError::OutOfRange)?;
    dst.copy_from_slice(values);
    Ok(())
  }

  /// Writes every sample of the pixel at `(x, y)`.
  ///
  /// ## Failure
  /// * [`OutOfRange`](PngError::OutOfRange) if the pixel is outside the image
  ///   or `values` isn't exactly one pixel's worth of samples.
  pub fn set_pixel(&mut self, x: u32, y: u32, values: &[u8]) -> PngResult<()> {
    if values.len() != self.geometry.samples_per_pixel() {
      return Err(PngError::OutOfRange);
    }
    self.set_samples((x, y), values)
  }

  /// Writes the alpha sample of a pixel. Does nothing for color types without
  /// an alpha channel.
  ///
  /// ## Failure
  /// * [`OutOfRange`](PngError::OutOfRange) if the pixel is outside the image.
  pub fn set_alpha(&mut self, x: u32, y: u32, alpha: u8) -> PngResult<()> {
    let i = self.offset_of(SampleAt::Pixel { x, y })?;
    if self.geometry.color_type.has_alpha() {
      self.samples[i + self.geometry.samples_per_pixel() - 1] = alpha;
    }
    Ok(())
  }
}
