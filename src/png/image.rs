use super::*;

/// Everything needed to make a new, blank [`Png`].
pub struct PngOptions {
  pub width: u32,
  pub height: u32,
  pub bit_depth: u8,
  pub color_type: PngColorType,
  /// The zlib codec. An image can't be made without one.
  pub codec: Option<Box<dyn ZlibCodec>>,
}
impl Debug for PngOptions {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("PngOptions")
      .field("width", &self.width)
      .field("height", &self.height)
      .field("bit_depth", &self.bit_depth)
      .field("color_type", &self.color_type)
      .field("codec", &self.codec.is_some())
      .finish()
  }
}
impl PngOptions {
  /// Options with no codec set yet.
  #[inline]
  #[must_use]
  pub const fn new(width: u32, height: u32, bit_depth: u8, color_type: PngColorType) -> Self {
    Self { width, height, bit_depth, color_type, codec: None }
  }

  #[inline]
  #[must_use]
  pub fn with_codec(self, codec: impl ZlibCodec + 'static) -> Self {
    Self { codec: Some(Box::new(codec)), ..self }
  }
}

/// Locates the first `IDAT` after the header.
///
/// The chunk list is walked first, which can't be fooled by tag bytes inside
/// another chunk's payload. If the walk breaks down before reaching an `IDAT`,
/// the first literal tag match whose chunk fits is used instead. Either way
/// only one candidate is ever returned, so the caller checks one CRC.
fn find_first_idat(bytes: &[u8], after_header: usize) -> Option<PngChunkSpan<'_>> {
  PngChunkIter::starting_at(bytes, after_header)
    .take_while(|span| span.ty() != PngChunkTy::IEND)
    .find(|span| span.ty() == PngChunkTy::IDAT)
    .or_else(|| scan_chunk(bytes, PngChunkTy::IDAT, after_header))
}

/// A PNG image held in memory.
///
/// This is the header, the image data, and whichever of the palette,
/// transparency, and background chunks the image has. Making one from
/// options gives an image of all zero samples (plus an empty palette and
/// alpha table for indexed images). Decoding fills it from PNG bytes.
///
/// Every mutation either fully succeeds or leaves the image as it was.
pub struct Png {
  ihdr: IHDR,
  palette: Option<PLTE>,
  transparency: Option<tRNS>,
  background: Option<bKGD>,
  idat: IDAT,
  codec: Box<dyn ZlibCodec>,
}
impl Debug for Png {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("Png")
      .field("ihdr", &self.ihdr)
      .field("palette", &self.palette)
      .field("transparency", &self.transparency)
      .field("background", &self.background)
      .field("idat", &self.idat)
      .finish_non_exhaustive()
  }
}
impl Png {
  /// Makes a blank image.
  ///
  /// ## Failure
  /// * [`InvalidConfiguration`](PngError::InvalidConfiguration) if there's no
  ///   codec.
  /// * [`InvalidFormat`](PngError::InvalidFormat) if the header values aren't
  ///   a legal PNG, or aren't supported (16-bit depth).
  pub fn new(options: PngOptions) -> PngResult<Self> {
    let PngOptions { width, height, bit_depth, color_type, codec } = options;
    let codec = codec.ok_or(PngError::InvalidConfiguration)?;
    let ihdr = IHDR::new(width, height, bit_depth, color_type)?;
    let geometry = ihdr.geometry();
    let (palette, transparency) = if color_type.is_indexed() {
      (Some(PLTE::new(geometry)), Some(tRNS::new_indexed()))
    } else {
      (None, None)
    };
    Ok(Self { ihdr, palette, transparency, background: None, idat: IDAT::new(geometry)?, codec })
  }

  /// Parses PNG bytes.
  ///
  /// `IHDR`, `IDAT`, and `IEND` must all be present with correct CRCs. The
  /// first `IDAT` found is the only one tried, and a bad CRC on it fails the
  /// decode. A `PLTE`, `tRNS`, or `bKGD` chunk is only looked for between the
  /// header and the image data. A bad CRC on one of those just logs a
  /// warning, and a malformed `tRNS` or `bKGD` is skipped. Chunks of any
  /// other type are ignored.
  ///
  /// ## Failure
  /// * [`InvalidFormat`](PngError::InvalidFormat) for a bad signature, a
  ///   missing or corrupt critical chunk, an illegal header, or image data
  ///   that doesn't decompress or unfilter. No partial image is returned.
  pub fn decode(bytes: &[u8], codec: Box<dyn ZlibCodec>) -> PngResult<Self> {
    if !is_png_header_correct(bytes) {
      log::warn!("missing PNG signature");
      return Err(PngError::InvalidFormat);
    }
    let ihdr_span =
      scan_chunk(bytes, PngChunkTy::IHDR, PNG_SIGNATURE.len()).ok_or(PngError::InvalidFormat)?;
    if !ihdr_span.is_crc_correct() {
      log::warn!("header CRC mismatch");
      return Err(PngError::InvalidFormat);
    }
    let ihdr = IHDR::try_from(ihdr_span.data())?;
    let geometry = ihdr.geometry();
    log::trace!("decoding {ihdr:?}");

    let first_idat = find_first_idat(bytes, ihdr_span.end()).ok_or(PngError::InvalidFormat)?;
    if !first_idat.is_crc_correct() {
      log::warn!("IDAT at {} has a bad CRC", first_idat.start());
      return Err(PngError::InvalidFormat);
    }
    let mut compressed = first_idat.data().to_vec();
    let mut data_end = first_idat.end();
    for span in PngChunkIter::starting_at(bytes, data_end).take_while(|s| s.ty() == PngChunkTy::IDAT)
    {
      if !span.is_crc_correct() {
        log::warn!("IDAT at {} has a bad CRC", span.start());
        return Err(PngError::InvalidFormat);
      }
      compressed.extend_from_slice(span.data());
      data_end = span.end();
    }
    let iend_span = scan_end(bytes, data_end + 4).ok_or(PngError::InvalidFormat)?;
    IEND::check(&iend_span)?;

    let ancillary = &bytes[..first_idat.start()];
    let after_header = ihdr_span.end();
    let find = |ty: PngChunkTy| {
      let span = scan_chunk(ancillary, ty, after_header)?;
      if !span.is_crc_correct() {
        log::warn!("{ty:?} CRC mismatch, using it anyway");
      }
      Some(span)
    };
    let palette = match (find(PngChunkTy::PLTE), ihdr.color_type) {
      (Some(span), PngColorType::Index) => Some(PLTE::load(geometry, span.data())?),
      (None, PngColorType::Index) => {
        log::warn!("indexed image has no palette");
        Some(PLTE::new(geometry))
      }
      _ => None,
    };
    let transparency = match find(PngChunkTy::tRNS).map(|span| tRNS::load(geometry, span.data())) {
      Some(Ok(trns)) => Some(trns),
      Some(Err(e)) => {
        log::warn!("ignoring tRNS chunk: {e}");
        None
      }
      None => None,
    };
    let transparency = match transparency {
      None if ihdr.color_type.is_indexed() => Some(tRNS::new_indexed()),
      other => other,
    };
    let background = match find(PngChunkTy::bKGD).map(|span| bKGD::load(geometry, span.data())) {
      Some(Ok(bkgd)) => Some(bkgd),
      Some(Err(e)) => {
        log::warn!("ignoring bKGD chunk: {e}");
        None
      }
      None => None,
    };

    let idat = IDAT::decode(geometry, &compressed, codec.as_ref())?;
    Ok(Self { ihdr, palette, transparency, background, idat, codec })
  }

  /// Writes the image as PNG bytes.
  ///
  /// Chunks are written in the order given by [`chunks_used`](Self::chunks_used).
  /// This never changes the image.
  ///
  /// ## Failure
  /// * [`InvalidFormat`](PngError::InvalidFormat) if a sample can't be stored
  ///   at the image's bit depth.
  /// * [`InvalidFormat`](PngError::InvalidFormat) if an indexed image has no
  ///   palette colors, or has alpha set for an index past its last palette
  ///   entry. Other decoders reject either of those.
  pub fn encode(&self) -> PngResult<Vec<u8>> {
    self.check_indexed_chunks()?;
    let mut out = PNG_SIGNATURE.to_vec();
    out.extend(self.ihdr.to_chunk()?);
    if let Some(plte) = self.palette.as_ref().filter(|p| !p.is_empty()) {
      out.extend(plte.to_chunk()?);
    }
    if let Some(bkgd) = &self.background {
      out.extend(bkgd.to_chunk()?);
    }
    if let Some(trns) = self.transparency_to_write() {
      out.extend(trns.to_chunk()?);
    }
    out.extend(self.idat.encode(self.codec.as_ref())?);
    out.extend(IEND.to_chunk());
    Ok(out)
  }

  fn check_indexed_chunks(&self) -> PngResult<()> {
    let Some(palette) = &self.palette else {
      return Ok(());
    };
    let palette_len = palette.written_len();
    if palette_len == 0 {
      log::warn!("indexed image has an empty palette");
      return Err(PngError::InvalidFormat);
    }
    if let Some(tRNS::Indexed(alphas)) = &self.transparency {
      if alphas.len() > palette_len {
        log::warn!("{} alpha entries for a palette of {palette_len}", alphas.len());
        return Err(PngError::InvalidFormat);
      }
    }
    Ok(())
  }

  fn transparency_to_write(&self) -> Option<&tRNS> {
    self.transparency.as_ref().filter(|t| !t.to_payload().is_empty())
  }

  /// The chunk types [`encode`](Self::encode) writes, in order.
  #[must_use]
  pub fn chunks_used(&self) -> Vec<PngChunkTy> {
    let mut out = alloc::vec![PngChunkTy::IHDR];
    if self.palette.as_ref().is_some_and(|p| !p.is_empty()) {
      out.push(PngChunkTy::PLTE);
    }
    if self.background.is_some() {
      out.push(PngChunkTy::bKGD);
    }
    if self.transparency_to_write().is_some() {
      out.push(PngChunkTy::tRNS);
    }
    out.push(PngChunkTy::IDAT);
    out.push(PngChunkTy::IEND);
    out
  }

  /// The image header, all seven fields.
  #[inline]
  #[must_use]
  pub const fn metadata(&self) -> IHDR {
    self.ihdr
  }
  #[inline]
  #[must_use]
  pub const fn geometry(&self) -> ImageGeometry {
    self.ihdr.geometry()
  }
  #[inline]
  #[must_use]
  pub const fn width(&self) -> u32 {
    self.ihdr.width
  }
  #[inline]
  #[must_use]
  pub const fn height(&self) -> u32 {
    self.ihdr.height
  }
  #[inline]
  #[must_use]
  pub const fn bit_depth(&self) -> u8 {
    self.ihdr.bit_depth
  }
  #[inline]
  #[must_use]
  pub const fn color_type(&self) -> PngColorType {
    self.ihdr.color_type
  }

  /// The canonical samples, row-major.
  #[inline]
  #[must_use]
  pub fn samples(&self) -> &[u8] {
    self.idat.samples()
  }
  #[inline]
  pub fn get_sample(&self, at: impl Into<SampleAt>) -> PngResult<u8> {
    self.idat.get_sample(at)
  }
  #[inline]
  pub fn set_sample(&mut self, at: impl Into<SampleAt>, value: u8) -> PngResult<()> {
    self.idat.set_sample(at, value)
  }
  #[inline]
  pub fn set_samples(&mut self, at: impl Into<SampleAt>, values: &[u8]) -> PngResult<()> {
    self.idat.set_samples(at, values)
  }
  #[inline]
  pub fn get_pixel(&self, x: u32, y: u32) -> PngResult<&[u8]> {
    self.idat.get_pixel(x, y)
  }
  #[inline]
  pub fn set_pixel(&mut self, x: u32, y: u32, values: &[u8]) -> PngResult<()> {
    self.idat.set_pixel(x, y, values)
  }

  /// The alpha of a pixel, 0 (transparent) to 255 (opaque).
  ///
  /// This is the pixel's own alpha sample if it has one, otherwise it comes
  /// from the transparency chunk.
  pub fn get_opacity(&self, x: u32, y: u32) -> PngResult<u8> {
    let pixel = self.idat.get_pixel(x, y)?;
    let [_, _, _, a] =
      pixel_to_rgba(self.geometry(), pixel, self.palette.as_ref(), self.transparency.as_ref());
    Ok(a)
  }

  /// Sets the alpha of a pixel.
  ///
  /// For indexed images this sets the alpha of the pixel's palette index, so
  /// every pixel using that index changes.
  ///
  /// ## Failure
  /// * [`UnsupportedOperation`](PngError::UnsupportedOperation) for greyscale
  ///   and RGB images, which can only be transparent through a color key.
  /// * [`OutOfRange`](PngError::OutOfRange) if the pixel is outside the image.
  pub fn set_opacity(&mut self, x: u32, y: u32, alpha: u8) -> PngResult<()> {
    let geometry = self.geometry();
    match geometry.color_type {
      PngColorType::YA | PngColorType::RGBA => self.idat.set_alpha(x, y, alpha),
      PngColorType::Index => {
        let index = self.idat.get_sample((x, y))?;
        self.transparency.get_or_insert_with(tRNS::new_indexed).set_alpha_of(geometry, index, alpha)
      }
      PngColorType::Y | PngColorType::RGB => Err(PngError::UnsupportedOperation),
    }
  }

  /// The image in another pixel layout.
  #[inline]
  pub fn data(&self, layout: PixelLayout) -> PngResult<Vec<u8>> {
    project(
      self.geometry(),
      layout,
      self.idat.samples(),
      self.palette.as_ref(),
      self.transparency.as_ref(),
    )
  }

  /// The palette index of every pixel.
  ///
  /// ## Failure
  /// * [`UnsupportedOperation`](PngError::UnsupportedOperation) if the image
  ///   isn't indexed.
  pub fn palette_indices(&self) -> PngResult<&[u8]> {
    if self.color_type().is_indexed() {
      Ok(self.idat.samples())
    } else {
      Err(PngError::UnsupportedOperation)
    }
  }

  #[inline]
  #[must_use]
  pub fn palette(&self) -> Option<&PLTE> {
    self.palette.as_ref()
  }
  fn palette_mut(&mut self) -> PngResult<&mut PLTE> {
    self.palette.as_mut().ok_or(PngError::UnsupportedOperation)
  }
  /// See [`PLTE::add_color`]. Fails with `UnsupportedOperation` if the image
  /// has no palette.
  #[inline]
  pub fn add_palette_color(&mut self, color: RGB8) -> PngResult<u8> {
    self.palette_mut()?.add_color(color)
  }
  #[inline]
  pub fn set_palette_color_of(&mut self, index: u8, color: RGB8) -> PngResult<()> {
    self.palette_mut()?.set_color_of(index, color)
  }
  #[inline]
  pub fn replace_palette_color(&mut self, old: RGB8, new: RGB8) -> PngResult<()> {
    self.palette_mut()?.replace(old, new)
  }

  #[inline]
  #[must_use]
  pub fn transparency(&self) -> Option<&tRNS> {
    self.transparency.as_ref()
  }

  /// Sets the alpha of one palette index in an indexed image.
  ///
  /// ## Failure
  /// * [`UnsupportedOperation`](PngError::UnsupportedOperation) if the image
  ///   isn't indexed.
  /// * [`OutOfRange`](PngError::OutOfRange) if the index can't exist at this
  ///   bit depth.
  pub fn set_transparency_of(&mut self, index: u8, alpha: u8) -> PngResult<()> {
    if !self.color_type().is_indexed() {
      return Err(PngError::UnsupportedOperation);
    }
    let geometry = self.geometry();
    self.transparency.get_or_insert_with(tRNS::new_indexed).set_alpha_of(geometry, index, alpha)
  }

  /// Sets the color key of a greyscale (one value) or RGB (three values)
  /// image, replacing any key it had. See [`tRNS::new_key`].
  pub fn set_transparency_key(&mut self, key: &[u16]) -> PngResult<()> {
    self.transparency = Some(tRNS::new_key(self.geometry(), key)?);
    Ok(())
  }

  /// Drops all transparency. Indexed images go back to fully opaque.
  pub fn remove_transparency(&mut self) {
    self.transparency = if self.color_type().is_indexed() { Some(tRNS::new_indexed()) } else { None };
  }

  /// Puts one palette index back to fully opaque. See
  /// [`tRNS::remove_alpha_of`].
  pub fn remove_transparency_of(&mut self, index: u8) -> PngResult<()> {
    self.transparency.as_mut().ok_or(PngError::UnsupportedOperation)?.remove_alpha_of(index)
  }

  /// The alpha of every palette entry, in index order.
  ///
  /// ## Failure
  /// * [`UnsupportedOperation`](PngError::UnsupportedOperation) if the image
  ///   isn't indexed.
  pub fn palette_alphas(&self) -> PngResult<Vec<u8>> {
    let palette = self.palette.as_ref().ok_or(PngError::UnsupportedOperation)?;
    let len = palette.written_len();
    Ok(match &self.transparency {
      Some(trns) => trns.alphas(len),
      None => alloc::vec![u8::MAX; len],
    })
  }

  #[inline]
  #[must_use]
  pub const fn background(&self) -> Option<bKGD> {
    self.background
  }

  /// Sets the background from one sample (greyscale, indexed) or three
  /// (RGB). See [`bKGD::new`].
  pub fn set_background(&mut self, samples: &[u16]) -> PngResult<()> {
    self.background = Some(bKGD::new(self.geometry(), samples)?);
    Ok(())
  }
}
