use super::*;

/// Palette data
///
/// Palette entries are always RGB. If you want to have a paletted image with
/// transparency then the transparency info goes in a separate [`tRNS`] chunk.
///
/// Entries are kept by index. A palette that's built up with
/// [`add_color`](Self::add_color) stays dense, but a loaded palette or one
/// edited with [`set_color_of`](Self::set_color_of) can have gaps.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PLTE {
  entries: BTreeMap<u8, RGB8>,
  capacity: usize,
}
impl Debug for PLTE {
  #[inline]
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    // currently prints no more than 4 palette entries
    let first: Vec<(u8, RGB8)> = self.entries().take(4).collect();
    f.debug_struct("PLTE")
      .field("entries", &(first, self.len()))
      .field("capacity", &self.capacity)
      .finish()
  }
}
impl PLTE {
  /// An empty palette sized for the geometry's bit depth.
  #[inline]
  #[must_use]
  pub fn new(geometry: ImageGeometry) -> Self {
    Self { entries: BTreeMap::new(), capacity: geometry.max_colors() }
  }

  /// Parses a `PLTE` payload.
  ///
  /// ## Failure
  /// * The payload isn't a whole number of RGB triples.
  /// * The payload is empty or holds more colors than the bit depth allows.
  pub fn load(geometry: ImageGeometry, data: &[u8]) -> PngResult<Self> {
    let colors: &[RGB8] = bytemuck::try_cast_slice(data)?;
    let mut out = Self::new(geometry);
    if colors.is_empty() || colors.len() > out.capacity {
      log::warn!("palette of {} colors doesn't fit depth {}", colors.len(), geometry.bit_depth);
      return Err(PngError::InvalidFormat);
    }
    out.entries = (0..=u8::MAX).zip(colors.iter().copied()).collect();
    Ok(out)
  }

  /// The most colors this palette can hold.
  #[inline]
  #[must_use]
  pub const fn capacity(&self) -> usize {
    self.capacity
  }
  #[inline]
  #[must_use]
  pub fn len(&self) -> usize {
    self.entries.len()
  }
  #[inline]
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Adds a color, giving back its index.
  ///
  /// If the color is already in the palette the existing index is returned
  /// and nothing changes. Otherwise the color takes the lowest free index.
  ///
  /// ## Failure
  /// * [`CapacityExceeded`](PngError::CapacityExceeded) if the palette is
  ///   full.
  pub fn add_color(&mut self, color: RGB8) -> PngResult<u8> {
    if let Some(i) = self.index_of(color) {
      return Ok(i);
    }
    if self.len() >= self.capacity {
      return Err(PngError::CapacityExceeded);
    }
    let i = (0..=u8::MAX)
      .take(self.capacity)
      .find(|i| !self.entries.contains_key(i))
      .ok_or(PngError::CapacityExceeded)?;
    self.entries.insert(i, color);
    Ok(i)
  }

  /// Writes a color at an exact index, replacing whatever was there.
  ///
  /// ## Failure
  /// * [`OutOfRange`](PngError::OutOfRange) if the index is past the capacity.
  pub fn set_color_of(&mut self, index: u8, color: RGB8) -> PngResult<()> {
    if usize::from(index) >= self.capacity {
      return Err(PngError::OutOfRange);
    }
    self.entries.insert(index, color);
    Ok(())
  }

  #[inline]
  #[must_use]
  pub fn color_at(&self, index: u8) -> Option<RGB8> {
    self.entries.get(&index).copied()
  }

  /// The lowest index holding this color.
  #[inline]
  #[must_use]
  pub fn index_of(&self, color: RGB8) -> Option<u8> {
    self.entries.iter().find(|(_, c)| **c == color).map(|(i, _)| *i)
  }

  #[inline]
  #[must_use]
  pub fn contains_color(&self, color: RGB8) -> bool {
    self.index_of(color).is_some()
  }
  #[inline]
  #[must_use]
  pub fn contains_index(&self, index: u8) -> bool {
    self.entries.contains_key(&index)
  }

  /// Swaps the color at `old`'s index for `new`. Pixel indices don't change.
  ///
  /// ## Failure
  /// * [`OutOfRange`](PngError::OutOfRange) if `old` isn't in the palette.
  pub fn replace(&mut self, old: RGB8, new: RGB8) -> PngResult<()> {
    let i = self.index_of(old).ok_or(PngError::OutOfRange)?;
    self.entries.insert(i, new);
    Ok(())
  }

  /// All `(index, color)` pairs in index order.
  #[inline]
  pub fn entries(&self) -> impl Iterator<Item = (u8, RGB8)> + '_ {
    self.entries.iter().map(|(i, c)| (*i, *c))
  }

  /// Number of colors written to the chunk: the highest set index plus one.
  #[inline]
  #[must_use]
  pub fn written_len(&self) -> usize {
    self.entries.keys().next_back().map_or(0, |&i| usize::from(i) + 1)
  }

  /// Payload bytes, one RGB triple per index up to the highest one set.
  ///
  /// Gaps between set indices are written as black so every color stays at
  /// its index. Nothing is written past the highest set index.
  #[must_use]
  pub fn to_payload(&self) -> Vec<u8> {
    let mut colors = alloc::vec![RGB8::default(); self.written_len()];
    for (i, c) in self.entries() {
      colors[usize::from(i)] = c;
    }
    bytemuck::cast_slice(colors.as_slice()).to_vec()
  }

  #[inline]
  pub fn to_chunk(&self) -> PngResult<Vec<u8>> {
    frame_chunk(PngChunkTy::PLTE, &self.to_payload())
  }
}
