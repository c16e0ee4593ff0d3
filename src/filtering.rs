//! Scanline filtering.
//!
//! From the PNG spec:
//!
//! > Filters are applied to **bytes**, not to pixels, regardless of the bit
//! > depth or color type of the image.
//!
//! A "filterline" is one filter-type byte followed by `row_byte_width` bytes
//! of (possibly packed) pixel data. The encoder in this crate only ever writes
//! filter type 0, but any of the five types can show up in data from other
//! encoders.

use alloc::vec::Vec;

use crate::{PngError, PngResult};

/// Filter type 0: the row is stored as-is.
pub const FILTER_NONE: u8 = 0;
/// Filter type 1: delta from the byte one pixel to the left.
pub const FILTER_SUB: u8 = 1;
/// Filter type 2: delta from the byte directly above.
pub const FILTER_UP: u8 = 2;
/// Filter type 3: delta from the floored mean of left and above.
pub const FILTER_AVERAGE: u8 = 3;
/// Filter type 4: delta from the Paeth predictor of left, above, upper left.
pub const FILTER_PAETH: u8 = 4;

/// Reverses the filtering of every filterline in `buffer`, in place.
///
/// * `row_byte_width` is the number of data bytes per row, not counting the
///   filter-type byte.
/// * `bytes_per_pixel` is how far back the "left" byte is. Values below 1 are
///   treated as 1, which is what sub-byte pixel formats use.
///
/// Each row's filter-type byte is reset to 0 once the row is reconstructed, so
/// running this again over the same buffer is a no-op. Any partial row at the
/// end of the buffer is left alone.
///
/// ## Failure
/// * `row_byte_width` is 0.
/// * A row has a filter type above 4 (rows before it are already
///   reconstructed).
pub fn defilter(
  buffer: &mut [u8], row_byte_width: usize, bytes_per_pixel: usize,
) -> PngResult<()> {
  if row_byte_width == 0 {
    return Err(PngError::InvalidFormat);
  }
  let bpp = bytes_per_pixel.max(1);
  // "up" is zero for the first row. Afterwards this holds a copy of the row we
  // just finished, never a borrow of the live buffer.
  let mut previous: Vec<u8> = alloc::vec![0; row_byte_width];
  for (y, filterline) in buffer.chunks_exact_mut(row_byte_width + 1).enumerate() {
    let (filter_byte, row) = filterline.split_at_mut(1);
    match filter_byte[0] {
      FILTER_NONE => (),
      FILTER_SUB => {
        for i in bpp..row.len() {
          row[i] = reconstruct_sub(row[i], row[i - bpp]);
        }
      }
      FILTER_UP => {
        row.iter_mut().zip(previous.iter()).for_each(|(x, b)| *x = reconstruct_up(*x, *b));
      }
      FILTER_AVERAGE => {
        for i in 0..row.len() {
          let a = if i >= bpp { row[i - bpp] } else { 0 };
          row[i] = reconstruct_average(row[i], a, previous[i]);
        }
      }
      FILTER_PAETH => {
        for i in 0..row.len() {
          let (a, c) = if i >= bpp { (row[i - bpp], previous[i - bpp]) } else { (0, 0) };
          row[i] = reconstruct_paeth(row[i], a, previous[i], c);
        }
      }
      other => {
        log::warn!("row {y} has illegal filter type {other}");
        return Err(PngError::InvalidFormat);
      }
    }
    filter_byte[0] = FILTER_NONE;
    previous.copy_from_slice(row);
  }
  Ok(())
}

/// Filters a single row, the exact inverse of what [`defilter`] does to it.
///
/// `previous` is the unfiltered row above, or `None` for the first row. The
/// output doesn't include the filter-type byte.
///
/// ## Failure
/// * `filter_type` is above 4.
/// * `previous` is given but isn't the same length as `row`.
pub fn filter_row(
  filter_type: u8, row: &[u8], previous: Option<&[u8]>, bytes_per_pixel: usize,
) -> PngResult<Vec<u8>> {
  let bpp = bytes_per_pixel.max(1);
  let zeros: Vec<u8>;
  let up: &[u8] = match previous {
    Some(p) if p.len() == row.len() => p,
    Some(_) => return Err(PngError::InvalidFormat),
    None => {
      zeros = alloc::vec![0; row.len()];
      &zeros
    }
  };
  let left = |i: usize| if i >= bpp { row[i - bpp] } else { 0 };
  let up_left = |i: usize| if i >= bpp { up[i - bpp] } else { 0 };
  let out = match filter_type {
    FILTER_NONE => row.to_vec(),
    FILTER_SUB => (0..row.len()).map(|i| row[i].wrapping_sub(left(i))).collect(),
    FILTER_UP => (0..row.len()).map(|i| row[i].wrapping_sub(up[i])).collect(),
    FILTER_AVERAGE => (0..row.len())
      .map(|i| row[i].wrapping_sub(((u16::from(left(i)) + u16::from(up[i])) / 2) as u8))
      .collect(),
    FILTER_PAETH => (0..row.len())
      .map(|i| row[i].wrapping_sub(paeth_predictor(left(i), up[i], up_left(i))))
      .collect(),
    _ => return Err(PngError::InvalidFormat),
  };
  Ok(out)
}

/// Puts a filter-type byte of 0 in front of each of the `height` rows.
///
/// Rows missing from the end of `rows` are filled with zeros.
#[must_use]
pub fn add_filter_fields(rows: &[u8], row_byte_width: usize, height: usize) -> Vec<u8> {
  let mut out = Vec::with_capacity((row_byte_width + 1) * height);
  for y in 0..height {
    out.push(FILTER_NONE);
    let start = (y * row_byte_width).min(rows.len());
    let row = &rows[start..(start + row_byte_width).min(rows.len())];
    out.extend_from_slice(row);
    out.resize(out.len() + (row_byte_width - row.len()), 0);
  }
  out
}

/// Strips the leading filter-type byte off each of the `height` rows.
///
/// ## Failure
/// * `buffer` is shorter than `height` full filterlines.
pub fn remove_filter_fields(
  buffer: &[u8], row_byte_width: usize, height: usize,
) -> PngResult<Vec<u8>> {
  let filterline = row_byte_width + 1;
  if buffer.len() < filterline.saturating_mul(height) {
    return Err(PngError::InvalidFormat);
  }
  let mut out = Vec::with_capacity(row_byte_width * height);
  for line in buffer.chunks_exact(filterline).take(height) {
    out.extend_from_slice(&line[1..]);
  }
  Ok(out)
}

/// Reconstruct Filter Type 1
///
/// * `fx` filtered X
/// * `ra` reconstructed `a`, the byte `bytes_per_pixel` to the left
const fn reconstruct_sub(fx: u8, ra: u8) -> u8 {
  fx.wrapping_add(ra)
}

/// Reconstruct Filter Type 2
///
/// * `fx` filtered X
/// * `rb` reconstructed `b`: The byte corresponding to this byte within the
///   previous scanline.
const fn reconstruct_up(fx: u8, rb: u8) -> u8 {
  fx.wrapping_add(rb)
}

/// Reconstruct Filter Type 3
///
/// The mean is taken without overflow, then the add wraps.
const fn reconstruct_average(fx: u8, ra: u8, rb: u8) -> u8 {
  fx.wrapping_add(((ra as u16 + rb as u16) / 2) as u8)
}

/// Reconstruct Filter Type 4
const fn reconstruct_paeth(fx: u8, ra: u8, rb: u8, rc: u8) -> u8 {
  fx.wrapping_add(paeth_predictor(ra, rb, rc))
}

/// The Paeth filter function computes a simple linear function of the three
/// neighboring pixels (left `a`, above `b`, upper left `c`).
///
/// The output is the "predictor" of the neighboring pixel closest to the
/// computed value.
///
/// If any neighboring pixel isn't present because this is the top or left edge
/// of the image just substitute 0 in that postition.
#[must_use]
pub const fn paeth_predictor(a: u8, b: u8, c: u8) -> u8 {
  // Note: PNG spec says "The calculations within the PaethPredictor function
  // shall be performed exactly, without overflow.", and i32 is wide enough for
  // any u8 inputs.
  let a_ = a as i32;
  let b_ = b as i32;
  let c_ = c as i32;
  let p = a_ + b_ - c_;
  let pa = (p - a_).abs();
  let pb = (p - b_).abs();
  let pc = (p - c_).abs();
  // the order of these tests must not change.
  if pa <= pb && pa <= pc {
    a
  } else if pb <= pc {
    b
  } else {
    c
  }
}
