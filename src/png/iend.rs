use super::*;

/// Image End. Always an empty chunk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct IEND;
impl IEND {
  /// The complete 12 bytes of a correct `IEND` chunk.
  pub const BYTES: [u8; 12] = [0, 0, 0, 0, b'I', b'E', b'N', b'D', 0xAE, 0x42, 0x60, 0x82];

  /// Checks a located `IEND` chunk: it must be empty and its CRC must match.
  pub fn check(span: &PngChunkSpan<'_>) -> PngResult<Self> {
    if span.ty() != PngChunkTy::IEND || !span.data().is_empty() || !span.is_crc_correct() {
      log::warn!("bad end chunk: {span:?}");
      return Err(PngError::InvalidFormat);
    }
    Ok(Self)
  }

  #[inline]
  #[must_use]
  pub fn to_chunk(self) -> Vec<u8> {
    Self::BYTES.to_vec()
  }
}

#[test]
fn test_iend_bytes_are_a_framed_empty_chunk() {
  assert_eq!(frame_chunk(PngChunkTy::IEND, &[]).unwrap(), IEND::BYTES);
  let span = PngChunkSpan::read_at(&IEND::BYTES, 0).unwrap();
  assert_eq!(IEND::check(&span), Ok(IEND));
  let mut bad = IEND::BYTES;
  bad[11] ^= 1;
  let span = PngChunkSpan::read_at(&bad, 0).unwrap();
  assert_eq!(IEND::check(&span), Err(PngError::InvalidFormat));
}
