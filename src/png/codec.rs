use super::*;

/// A zlib compressor and decompressor pair.
///
/// PNG image data is a single zlib stream (DEFLATE with the two byte header
/// and Adler-32 trailer). The codec is chosen by the caller when an image is
/// made and used for every encode and decode of that image.
pub trait ZlibCodec {
  /// Compresses bytes into a zlib stream.
  fn deflate(&self, bytes: &[u8]) -> Vec<u8>;

  /// Decompresses a zlib stream that should produce at most `limit` bytes.
  ///
  /// A stream with more output than `limit` is an error, and the codec should
  /// stop instead of allocating past the limit. Errors should be reported as
  /// [`InvalidFormat`](PngError::InvalidFormat).
  fn inflate(&self, bytes: &[u8], limit: usize) -> PngResult<Vec<u8>>;
}

/// [`ZlibCodec`] backed by the `miniz_oxide` crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg(feature = "miniz_oxide")]
#[cfg_attr(docs_rs, doc(cfg(feature = "miniz_oxide")))]
pub struct MinizCodec {
  /// Compression level, 0 (store only) to 10 (slowest).
  pub level: u8,
}
#[cfg(feature = "miniz_oxide")]
impl Default for MinizCodec {
  #[inline]
  #[must_use]
  fn default() -> Self {
    Self { level: 6 }
  }
}
#[cfg(feature = "miniz_oxide")]
impl ZlibCodec for MinizCodec {
  #[inline]
  fn deflate(&self, bytes: &[u8]) -> Vec<u8> {
    miniz_oxide::deflate::compress_to_vec_zlib(bytes, self.level)
  }
  #[inline]
  fn inflate(&self, bytes: &[u8], limit: usize) -> PngResult<Vec<u8>> {
    miniz_oxide::inflate::decompress_to_vec_zlib_with_limit(bytes, limit).map_err(|e| {
      log::warn!("zlib decompression failed: {:?}", e.status);
      PngError::InvalidFormat
    })
  }
}
