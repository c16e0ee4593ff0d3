//! Moving samples between one-byte-per-sample buffers and bit-packed rows.
//!
//! PNG packs 1, 2, and 4 bit samples tightly into bytes, with the left-most
//! sample in the highest bits. When samples are "translated" each N-bit code
//! is spread over `0..=255` by bit replication, which gives exactly:
//! * depth 1: `0, 255`
//! * depth 2: `0, 85, 170, 255`
//! * depth 4: `0, 17, 34, ..., 255`
//!
//! Palette indices must never be translated, they're indices, not
//! intensities.

use alloc::vec::Vec;

use bitfrob::u8_replicate_bits;

use crate::{PngError, PngResult};

/// How many samples of the given depth fit in one byte.
///
/// Depth 8 (or anything unknown) gives 1.
#[inline]
#[must_use]
pub const fn samples_per_byte(depth: u8) -> usize {
  match depth {
    1 => 8,
    2 => 4,
    4 => 2,
    _ => 1,
  }
}

/// Spreads an N-bit `code` across the full `u8` range.
///
/// Depth 8 is a no-op.
#[inline]
#[must_use]
pub fn translate_code(depth: u8, code: u8) -> u8 {
  if depth >= 8 {
    code
  } else {
    u8_replicate_bits(u32::from(depth), code)
  }
}

/// The exact inverse of [`translate_code`].
///
/// Gives `None` when `value` isn't one of the depth's translated values. No
/// rounding is ever done.
#[inline]
#[must_use]
pub fn untranslate_value(depth: u8, value: u8) -> Option<u8> {
  if depth >= 8 {
    return Some(value);
  }
  let code = value >> (8 - depth);
  if u8_replicate_bits(u32::from(depth), code) == value {
    Some(code)
  } else {
    None
  }
}

/// Expands packed bytes into one sample per byte.
///
/// Every byte becomes `8 / depth` samples, so if the packed data had padding
/// bits at the end of a row the caller should truncate the output to the row's
/// real sample count.
///
/// ## Failure
/// * `depth` isn't 1, 2, 4, or 8.
pub fn unpack(packed: &[u8], depth: u8, translate: bool) -> PngResult<Vec<u8>> {
  let per_byte = match depth {
    1 | 2 | 4 => samples_per_byte(depth),
    8 => return Ok(packed.to_vec()),
    _ => return Err(PngError::InvalidFormat),
  };
  let mask: u8 = (1 << depth) - 1;
  let mut out = Vec::with_capacity(packed.len() * per_byte);
  for byte in packed.iter().copied() {
    for i in 1..=(per_byte as u8) {
      let code = (byte >> (8 - depth * i)) & mask;
      out.push(if translate { translate_code(depth, code) } else { code });
    }
  }
  Ok(out)
}

/// Packs one-sample-per-byte data down to the given depth.
///
/// If the sample count isn't a multiple of `8 / depth` the last byte is padded
/// with zero bits.
///
/// ## Failure
/// * `depth` isn't 1, 2, 4, or 8.
/// * With `translate`, a sample isn't exactly one of the depth's translated
///   values.
/// * Without `translate`, a sample doesn't fit in `depth` bits.
pub fn pack(samples: &[u8], depth: u8, translate: bool) -> PngResult<Vec<u8>> {
  let per_byte = match depth {
    1 | 2 | 4 => samples_per_byte(depth),
    8 => return Ok(samples.to_vec()),
    _ => return Err(PngError::InvalidFormat),
  };
  let max_code: u8 = (1 << depth) - 1;
  let mut out = Vec::with_capacity((samples.len() + per_byte - 1) / per_byte);
  for group in samples.chunks(per_byte) {
    let mut byte = 0_u8;
    for (i, sample) in group.iter().copied().enumerate() {
      let code = if translate {
        untranslate_value(depth, sample).ok_or(PngError::InvalidFormat)?
      } else if sample <= max_code {
        sample
      } else {
        return Err(PngError::InvalidFormat);
      };
      byte |= code << (8 - depth * (i as u8 + 1));
    }
    out.push(byte);
  }
  Ok(out)
}
