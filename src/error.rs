use core::num::TryFromIntError;

/// An error from the `pngine` crate.
///
/// Every fallible operation reports one of these kinds. Nothing is retried
/// internally, and an operation that fails leaves the image as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PngError {
  /// The bytes aren't a PNG we can read, or header values are illegal.
  ///
  /// This covers a bad signature, a missing `IHDR`/`IDAT`/`IEND` chunk, a
  /// checksum mismatch on a critical chunk, an illegal bit depth or color
  /// type, and samples that can't be stored at the image's bit depth.
  InvalidFormat,

  /// The palette already holds `2^depth` colors.
  CapacityExceeded,

  /// A pixel, sample, or palette index is beyond the end of its buffer.
  OutOfRange,

  /// The operation doesn't make sense for this image's color type.
  UnsupportedOperation,

  /// The image was constructed without a usable zlib codec.
  InvalidConfiguration,
}

/// Shorthand for results from this crate.
pub type PngResult<T> = Result<T, PngError>;

impl core::fmt::Display for PngError {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.write_str(match self {
      Self::InvalidFormat => "invalid PNG format",
      Self::CapacityExceeded => "palette capacity exceeded",
      Self::OutOfRange => "index out of range",
      Self::UnsupportedOperation => "operation unsupported for this color type",
      Self::InvalidConfiguration => "invalid codec configuration",
    })
  }
}
impl core::error::Error for PngError {}

impl From<TryFromIntError> for PngError {
  #[inline]
  fn from(_: TryFromIntError) -> Self {
    Self::InvalidFormat
  }
}
impl From<bytemuck::PodCastError> for PngError {
  #[inline]
  fn from(_: bytemuck::PodCastError) -> Self {
    Self::InvalidFormat
  }
}
impl From<core::array::TryFromSliceError> for PngError {
  #[inline]
  fn from(_: core::array::TryFromSliceError) -> Self {
    Self::InvalidFormat
  }
}
