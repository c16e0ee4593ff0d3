//! The chunk container: signature, framing, and locating chunks in a buffer.
//!
//! Every chunk on the wire is
//! `length: u32 BE ‖ type: [u8; 4] ‖ payload: [u8; length] ‖ crc: u32 BE`,
//! where the CRC covers the type and the payload but not the length.

use super::*;

/// The first eight bytes of a PNG datastream should match these bytes.
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Bytes a chunk needs around its payload (length, type, and CRC fields).
pub const CHUNK_OVERHEAD: usize = 12;

/// Checks if the PNG's initial 8 bytes are correct.
#[inline]
#[must_use]
pub const fn is_png_header_correct(bytes: &[u8]) -> bool {
  matches!(bytes, [137, 80, 78, 71, 13, 10, 26, 10, ..])
}

/// The four byte ASCII tag that names a chunk's type.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct PngChunkTy(pub [u8; 4]);
#[allow(nonstandard_style)]
impl PngChunkTy {
  pub const IHDR: Self = Self(*b"IHDR");
  pub const PLTE: Self = Self(*b"PLTE");
  pub const IDAT: Self = Self(*b"IDAT");
  pub const IEND: Self = Self(*b"IEND");
  pub const tRNS: Self = Self(*b"tRNS");
  pub const bKGD: Self = Self(*b"bKGD");
}
impl Debug for PngChunkTy {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    for ch in self.0.iter().copied().map(char::from) {
      f.write_char(ch)?;
    }
    Ok(())
  }
}

/// Frames a payload as a complete chunk, length and CRC included.
///
/// ## Failure
/// * The payload is longer than the `2^31 - 1` bytes PNG allows.
pub fn frame_chunk(ty: PngChunkTy, payload: &[u8]) -> PngResult<Vec<u8>> {
  let length = u32::try_from(payload.len())?;
  if length > i32::MAX as u32 {
    return Err(PngError::InvalidFormat);
  }
  let mut out = Vec::with_capacity(CHUNK_OVERHEAD + payload.len());
  out.extend_from_slice(&length.to_be_bytes());
  out.extend_from_slice(&ty.0);
  out.extend_from_slice(payload);
  out.extend_from_slice(&chunk_crc(ty.0, payload).to_be_bytes());
  log::trace!("framed {ty:?} with {length} payload bytes");
  Ok(out)
}

/// A chunk found inside a larger byte buffer.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PngChunkSpan<'b> {
  start: usize,
  ty: PngChunkTy,
  data: &'b [u8],
  declared_crc: u32,
}
impl Debug for PngChunkSpan<'_> {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("PngChunkSpan")
      .field("start", &self.start)
      .field("ty", &self.ty)
      .field("data", &(&self.data[..self.data.len().min(12)], self.data.len()))
      .field("declared_crc", &self.declared_crc)
      .finish()
  }
}
impl<'b> PngChunkSpan<'b> {
  /// Reads the chunk whose length field begins at `start`.
  ///
  /// Gives `None` if the chunk doesn't fully fit inside `buffer`.
  #[must_use]
  pub fn read_at(buffer: &'b [u8], start: usize) -> Option<Self> {
    let rest = buffer.get(start..)?;
    let (len_bytes, rest) = try_split_off_byte_array::<4>(rest)?;
    let (ty, rest) = try_split_off_byte_array::<4>(rest)?;
    let len = u32::from_be_bytes(len_bytes) as usize;
    if rest.len() < len {
      return None;
    }
    let (data, rest) = rest.split_at(len);
    let (crc_bytes, _) = try_split_off_byte_array::<4>(rest)?;
    Some(Self { start, ty: PngChunkTy(ty), data, declared_crc: u32::from_be_bytes(crc_bytes) })
  }

  /// Offset of the chunk's length field within the buffer.
  #[inline]
  #[must_use]
  pub const fn start(&self) -> usize {
    self.start
  }
  /// Offset just past the chunk's CRC field.
  #[inline]
  #[must_use]
  pub const fn end(&self) -> usize {
    self.start + CHUNK_OVERHEAD + self.data.len()
  }
  #[inline]
  #[must_use]
  pub const fn ty(&self) -> PngChunkTy {
    self.ty
  }
  /// The payload bytes.
  #[inline]
  #[must_use]
  pub const fn data(&self) -> &'b [u8] {
    self.data
  }
  #[inline]
  #[must_use]
  pub const fn declared_crc(&self) -> u32 {
    self.declared_crc
  }
  #[inline]
  #[must_use]
  pub fn compute_actual_crc(&self) -> u32 {
    chunk_crc(self.ty.0, self.data)
  }
  #[inline]
  #[must_use]
  pub fn is_crc_correct(&self) -> bool {
    self.declared_crc == self.compute_actual_crc()
  }
}

/// Searches for the first chunk of type `ty` whose tag is at or after `from`.
///
/// This is a literal search for the four tag bytes. A match only counts if
/// there's room for a length field in front of it and the whole chunk it
/// describes fits in the buffer, otherwise the search moves on. The work done
/// is bounded by the buffer length.
#[must_use]
pub fn scan_chunk(buffer: &[u8], ty: PngChunkTy, from: usize) -> Option<PngChunkSpan<'_>> {
  let from = from.max(4);
  let haystack = buffer.get(from..)?;
  haystack
    .windows(4)
    .enumerate()
    .filter(|(_, w)| *w == ty.0.as_slice())
    .find_map(|(i, _)| PngChunkSpan::read_at(buffer, from + i - 4))
}

/// Finds the `IEND` chunk, searching backwards from the end of the buffer.
///
/// A well formed stream has `IEND` as its final 12 bytes, so that's checked
/// first. A forward search could hit the tag bytes inside compressed image
/// data, so this never searches forward. Only tags at or after `not_before`
/// are considered.
#[must_use]
pub fn scan_end(buffer: &[u8], not_before: usize) -> Option<PngChunkSpan<'_>> {
  let last_tag = buffer.len().checked_sub(8)?;
  let first_tag = not_before.max(4);
  if last_tag < first_tag {
    return None;
  }
  (first_tag..=last_tag)
    .rev()
    .filter(|&i| buffer[i..i + 4] == PngChunkTy::IEND.0)
    .find_map(|i| PngChunkSpan::read_at(buffer, i - 4).filter(|span| span.data().is_empty()))
}

/// Walks successive chunks, starting from a given offset.
///
/// Iteration stops at the first chunk that doesn't fully fit in the buffer.
#[derive(Debug, Clone)]
pub struct PngChunkIter<'b> {
  buffer: &'b [u8],
  position: usize,
}
impl<'b> PngChunkIter<'b> {
  /// Iterates the chunks of full PNG bytes, skipping the signature.
  #[inline]
  #[must_use]
  pub const fn new(bytes: &'b [u8]) -> Self {
    Self::starting_at(bytes, PNG_SIGNATURE.len())
  }
  /// Iterates chunks beginning with the one whose length field is at `position`.
  #[inline]
  #[must_use]
  pub const fn starting_at(buffer: &'b [u8], position: usize) -> Self {
    Self { buffer, position }
  }
}
impl<'b> Iterator for PngChunkIter<'b> {
  type Item = PngChunkSpan<'b>;
  #[inline]
  fn next(&mut self) -> Option<Self::Item> {
    let span = PngChunkSpan::read_at(self.buffer, self.position)?;
    self.position = span.end();
    Some(span)
  }
}

fn try_split_off_byte_array<const N: usize>(bytes: &[u8]) -> Option<([u8; N], &[u8])> {
  if bytes.len() >= N {
    let (head, tail) = bytes.split_at(N);
    let a: [u8; N] = head.try_into().ok()?;
    Some((a, tail))
  } else {
    None
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use alloc::vec;

  fn sample_stream() -> Vec<u8> {
    let mut v = PNG_SIGNATURE.to_vec();
    v.extend(frame_chunk(PngChunkTy::IHDR, &[0, 0, 0, 1, 0, 0, 0, 1, 8, 0, 0, 0, 0]).unwrap());
    v.extend(frame_chunk(PngChunkTy::IDAT, b"xxIENDxx").unwrap());
    v.extend(frame_chunk(PngChunkTy::IEND, &[]).unwrap());
    v
  }

  #[test]
  fn test_frame_iend() {
    let iend = frame_chunk(PngChunkTy::IEND, &[]).unwrap();
    assert_eq!(iend, [0, 0, 0, 0, b'I', b'E', b'N', b'D', 0xAE, 0x42, 0x60, 0x82]);
  }

  #[test]
  fn test_frame_length_counts_payload_only() {
    let c = frame_chunk(PngChunkTy::tRNS, &[1, 2, 3]).unwrap();
    assert_eq!(c.len(), 15);
    assert_eq!(&c[0..4], &[0, 0, 0, 3]);
    assert_eq!(&c[4..8], b"tRNS");
    assert_eq!(&c[11..], &chunk_crc(*b"tRNS", &[1, 2, 3]).to_be_bytes());
  }

  #[test]
  fn test_scan_finds_span_with_length_field() {
    let v = sample_stream();
    let ihdr = scan_chunk(&v, PngChunkTy::IHDR, 0).unwrap();
    assert_eq!(ihdr.start(), 8);
    assert_eq!(ihdr.data().len(), 13);
    assert!(ihdr.is_crc_correct());
    let idat = scan_chunk(&v, PngChunkTy::IDAT, ihdr.end()).unwrap();
    assert_eq!(idat.start(), ihdr.end());
    assert_eq!(idat.data(), b"xxIENDxx");
    assert!(scan_chunk(&v, PngChunkTy::PLTE, 0).is_none());
    assert!(scan_chunk(&v, PngChunkTy::IHDR, ihdr.end()).is_none());
  }

  #[test]
  fn test_scan_end_ignores_tag_inside_payload() {
    let v = sample_stream();
    let iend = scan_end(&v, 8).unwrap();
    assert_eq!(iend.end(), v.len());
    assert!(iend.is_crc_correct());
    // cut off the real IEND: the "IEND" inside the IDAT payload must not count
    // since its length field isn't zero.
    assert!(scan_end(&v[..v.len() - 12], 8).is_none());
  }

  #[test]
  fn test_scan_skips_truncated_candidates() {
    let mut v = vec![0, 0, 0, 200];
    v.extend_from_slice(b"IDAT");
    v.extend_from_slice(&[1, 2, 3]);
    assert!(scan_chunk(&v, PngChunkTy::IDAT, 0).is_none());
  }

  #[test]
  fn test_chunk_iter_walks_and_stops() {
    let v = sample_stream();
    let tys: Vec<PngChunkTy> = PngChunkIter::new(&v).map(|c| c.ty()).collect();
    assert_eq!(tys, [PngChunkTy::IHDR, PngChunkTy::IDAT, PngChunkTy::IEND]);
    // random garbage never panics the iterator
    for _ in PngChunkIter::new(&[0xFF; 40]) {}
    for _ in PngChunkIter::new(&[]) {}
  }
}
