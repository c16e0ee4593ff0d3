use pngine::{
  bit_depth_changes::translate_code,
  png::{
    MinizCodec, Png, PngChunkIter, PngColorType, PngOptions, ZlibCodec, IHDR, PNG_SIGNATURE,
  },
  PngError, RGB8,
};
use std::time::{Duration, Instant};

const FORMATS: &[(u8, PngColorType)] = &[
  (1, PngColorType::Y),
  (2, PngColorType::Y),
  (4, PngColorType::Y),
  (8, PngColorType::Y),
  (8, PngColorType::RGB),
  (1, PngColorType::Index),
  (2, PngColorType::Index),
  (4, PngColorType::Index),
  (8, PngColorType::Index),
  (8, PngColorType::YA),
  (8, PngColorType::RGBA),
];

fn codec() -> Box<dyn ZlibCodec> {
  Box::new(MinizCodec::default())
}

/// Random samples that are all storable at the given format.
fn rand_samples(count: usize, bit_depth: u8, color_type: PngColorType) -> Vec<u8> {
  let mask = ((1_u16 << bit_depth) - 1) as u8;
  super::rand_bytes(count)
    .into_iter()
    .map(|b| match color_type {
      PngColorType::Index => b & mask,
      _ => translate_code(bit_depth, b & mask),
    })
    .collect()
}

#[test]
fn test_round_trip_every_format() {
  for &(bit_depth, color_type) in FORMATS {
    for (width, height) in [(1, 1), (5, 3), (13, 7)] {
      let options =
        PngOptions::new(width, height, bit_depth, color_type).with_codec(MinizCodec::default());
      let mut png = Png::new(options).unwrap();
      if color_type == PngColorType::Index {
        for i in 0..(1_u16 << bit_depth) {
          png.add_palette_color(RGB8::new(i as u8, 0, 0)).unwrap();
        }
      }
      let count = png.samples().len();
      assert_eq!(count, (width * height) as usize * color_type.channel_count());

      let zeros = Png::decode(&png.encode().unwrap(), codec()).unwrap();
      assert_eq!(zeros.samples(), png.samples());
      assert_eq!(zeros.metadata(), png.metadata());

      let samples = rand_samples(count, bit_depth, color_type);
      png.set_samples(0_usize, &samples).unwrap();
      let back = Png::decode(&png.encode().unwrap(), codec()).unwrap();
      assert_eq!(back.samples(), samples, "{bit_depth} {color_type:?} {width}x{height}");
      assert_eq!(back.metadata(), png.metadata());
    }
  }
}

#[test]
fn test_PngChunkIter_no_panics() {
  // even totally random data should never panic the iterator!
  for _ in 0..10 {
    let v = super::rand_bytes(1024);
    for _ in PngChunkIter::new(&v) {
      //
    }
  }
}

#[test]
fn test_decode_garbage_is_an_error() {
  for _ in 0..10 {
    let v = super::rand_bytes(1024);
    assert!(Png::decode(&v, codec()).is_err());
    let mut signed = vec![137, 80, 78, 71, 13, 10, 26, 10];
    signed.extend(v);
    assert!(Png::decode(&signed, codec()).is_err());
  }
}

#[test]
fn test_decode_truncations_never_panic() {
  let options = PngOptions::new(9, 9, 8, PngColorType::RGB).with_codec(MinizCodec::default());
  let mut png = Png::new(options).unwrap();
  png.set_samples(0_usize, &super::rand_bytes(9 * 9 * 3)).unwrap();
  let bytes = png.encode().unwrap();
  for cut in 0..bytes.len() {
    assert!(Png::decode(&bytes[..cut], codec()).is_err(), "cut at {cut}");
  }
  assert!(Png::decode(&bytes, codec()).is_ok());
}

/// A header followed by `count` bare `IDAT` chunk headers, each claiming a
/// payload that runs to the end of the buffer.
fn fake_idat_headers(junk: &[u8], count: usize) -> Vec<u8> {
  let mut out = PNG_SIGNATURE.to_vec();
  out.extend(IHDR::new(1, 1, 8, PngColorType::Y).unwrap().to_chunk().unwrap());
  out.extend_from_slice(junk);
  let first = out.len();
  let total = first + 8 * count + 4;
  for n in 0..count {
    let len = (total - (first + 8 * n) - 12) as u32;
    out.extend(len.to_be_bytes());
    out.extend(*b"IDAT");
  }
  out.extend([0; 4]);
  assert_eq!(out.len(), total);
  out
}

#[test]
fn test_decode_fake_image_data_headers_is_linear() {
  // the first case is found by walking chunks, the second by the tag search
  for junk in [&[][..], &[0xFF; 8][..]] {
    let bytes = fake_idat_headers(junk, 1 << 17);
    let start = Instant::now();
    assert_eq!(Png::decode(&bytes, codec()).unwrap_err(), PngError::InvalidFormat);
    assert!(start.elapsed() < Duration::from_secs(5), "took {:?}", start.elapsed());
  }
}
