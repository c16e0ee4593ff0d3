//! Module for pixel formats.
//!
//! The codec keeps its pixel data as loose `u8` samples, so the only packed
//! pixel type it needs is the 24-bit palette entry.

use bytemuck::{Pod, Zeroable};

/// An 8-bit-per-channel RGB color, as stored in a PNG palette.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Pod, Zeroable)]
#[repr(C)]
#[allow(missing_docs)]
pub struct RGB8 {
  pub r: u8,
  pub g: u8,
  pub b: u8,
}
impl RGB8 {
  /// Makes a color from its three channels.
  #[inline]
  #[must_use]
  pub const fn new(r: u8, g: u8, b: u8) -> Self {
    Self { r, g, b }
  }

  /// The channels as an array.
  #[inline]
  #[must_use]
  pub const fn to_array(self) -> [u8; 3] {
    [self.r, self.g, self.b]
  }
}
impl From<[u8; 3]> for RGB8 {
  #[inline]
  #[must_use]
  fn from([r, g, b]: [u8; 3]) -> Self {
    Self { r, g, b }
  }
}
impl From<RGB8> for [u8; 3] {
  #[inline]
  #[must_use]
  fn from(c: RGB8) -> Self {
    c.to_array()
  }
}
