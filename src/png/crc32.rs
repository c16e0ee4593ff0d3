//! CRC-32/ISO-HDLC, the checksum every PNG chunk carries.

const CRC_TABLE: [u32; 256] = make_crc_table();

const fn make_crc_table() -> [u32; 256] {
  let mut out = [0; 256];
  let mut n = 0;
  while n < 256 {
    let mut c = n as u32;
    let mut k = 0;
    while k < 8 {
      if (c & 1) != 0 {
        c = 0xEDB8_8320_u32 ^ (c >> 1);
      } else {
        c >>= 1;
      }
      //
      k += 1;
    }
    out[n] = c;
    //
    n += 1;
  }
  out
}

fn update_crc(mut crc: u32, bytes: &[u8]) -> u32 {
  for byte in bytes.iter().copied() {
    let i = (crc ^ u32::from(byte)) as u8 as usize;
    crc = CRC_TABLE[i] ^ (crc >> 8);
  }
  crc
}

/// The CRC of a plain byte slice.
#[inline]
#[must_use]
pub fn crc32(bytes: &[u8]) -> u32 {
  update_crc(u32::MAX, bytes) ^ u32::MAX
}

/// The CRC of a chunk, which covers the type tag followed by the payload.
#[inline]
#[must_use]
pub fn chunk_crc(chunk_ty: [u8; 4], payload: &[u8]) -> u32 {
  update_crc(update_crc(u32::MAX, &chunk_ty), payload) ^ u32::MAX
}

#[test]
fn test_crc32_check_value() {
  assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
  assert_eq!(crc32(b""), 0);
}

#[test]
fn test_chunk_crc_matches_flat_crc() {
  assert_eq!(chunk_crc(*b"IEND", &[]), 0xAE42_6082);
  assert_eq!(chunk_crc(*b"tEXt", b"hello"), crc32(b"tEXthello"));
}
