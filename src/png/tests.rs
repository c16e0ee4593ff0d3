use super::*;
use alloc::vec;

fn codec() -> Box<dyn ZlibCodec> {
  Box::new(MinizCodec::default())
}

fn blank(width: u32, height: u32, bit_depth: u8, color_type: PngColorType) -> Png {
  let options =
    PngOptions::new(width, height, bit_depth, color_type).with_codec(MinizCodec::default());
  Png::new(options).unwrap()
}

/// Inserts a whole chunk right after the first chunk of type `after`.
fn splice_after(bytes: &[u8], after: PngChunkTy, chunk: &[u8]) -> Vec<u8> {
  let at = PngChunkIter::new(bytes).find(|c| c.ty() == after).unwrap().end();
  let mut out = bytes[..at].to_vec();
  out.extend_from_slice(chunk);
  out.extend_from_slice(&bytes[at..]);
  out
}

#[test]
fn test_two_by_one_grayscale() {
  let mut png = blank(2, 1, 8, PngColorType::Y);
  png.set_samples(0_usize, &[10, 20]).unwrap();
  let bytes = png.encode().unwrap();
  assert_eq!(&bytes[..8], &PNG_SIGNATURE);
  assert_eq!(&bytes[8..16], &[0, 0, 0, 13, b'I', b'H', b'D', b'R']);
  assert_eq!(&bytes[16..29], &[0, 0, 0, 2, 0, 0, 0, 1, 8, 0, 0, 0, 0]);
  assert_eq!(&bytes[bytes.len() - 12..], &IEND::BYTES);
  let back = Png::decode(&bytes, codec()).unwrap();
  assert_eq!(back.samples(), &[10, 20]);
  assert_eq!(back.metadata(), png.metadata());
  assert_eq!(back.width(), 2);
  assert_eq!(back.height(), 1);
  assert_eq!(back.chunks_used(), [PngChunkTy::IHDR, PngChunkTy::IDAT, PngChunkTy::IEND]);
}

#[test]
fn test_encode_is_repeatable() {
  let mut png = blank(3, 3, 8, PngColorType::RGB);
  png.set_pixel(1, 1, &[1, 2, 3]).unwrap();
  let first = png.encode().unwrap();
  assert_eq!(png.encode().unwrap(), first);
  assert_eq!(png.get_pixel(1, 1), Ok(&[1_u8, 2, 3][..]));
}

#[test]
fn test_bad_signature() {
  let bytes = blank(1, 1, 8, PngColorType::Y).encode().unwrap();
  let mut bad = bytes.clone();
  bad[1] = b'p';
  assert_eq!(Png::decode(&bad, codec()).unwrap_err(), PngError::InvalidFormat);
  assert_eq!(Png::decode(&bytes[8..], codec()).unwrap_err(), PngError::InvalidFormat);
  assert_eq!(Png::decode(&[], codec()).unwrap_err(), PngError::InvalidFormat);
}

#[test]
fn test_missing_codec() {
  let options = PngOptions::new(1, 1, 8, PngColorType::Y);
  assert_eq!(Png::new(options).unwrap_err(), PngError::InvalidConfiguration);
}

#[test]
fn test_illegal_header_values() {
  for (depth, ty) in [(16, PngColorType::Y), (4, PngColorType::RGBA), (3, PngColorType::Index)] {
    let options = PngOptions::new(1, 1, depth, ty).with_codec(MinizCodec::default());
    assert_eq!(Png::new(options).unwrap_err(), PngError::InvalidFormat);
  }
}

#[test]
fn test_critical_crc_is_mandatory() {
  let mut png = blank(2, 2, 8, PngColorType::Y);
  png.set_background(&[9]).unwrap();
  let bytes = png.encode().unwrap();
  let spans: Vec<PngChunkSpan<'_>> = PngChunkIter::new(&bytes).collect();
  for span in spans {
    let mut bad = bytes.clone();
    bad[span.end() - 1] ^= 0xFF;
    let result = Png::decode(&bad, codec());
    if span.ty() == PngChunkTy::bKGD {
      assert_eq!(result.unwrap().background(), Some(bKGD::Greyscale { y: 9 }));
    } else {
      assert_eq!(result.unwrap_err(), PngError::InvalidFormat, "{:?}", span.ty());
    }
  }
}

#[test]
fn test_truncated_input() {
  let bytes = blank(4, 4, 8, PngColorType::RGBA).encode().unwrap();
  for cut in [bytes.len() - 1, bytes.len() - 12, 40, 20] {
    assert_eq!(Png::decode(&bytes[..cut], codec()).unwrap_err(), PngError::InvalidFormat);
  }
}

#[test]
fn test_palette_capacity() {
  let mut png = blank(2, 2, 1, PngColorType::Index);
  assert_eq!(png.add_palette_color(RGB8::new(0, 0, 0)), Ok(0));
  assert_eq!(png.add_palette_color(RGB8::new(9, 9, 9)), Ok(1));
  assert_eq!(png.add_palette_color(RGB8::new(0, 0, 0)), Ok(0));
  assert_eq!(png.add_palette_color(RGB8::new(1, 1, 1)), Err(PngError::CapacityExceeded));
  assert_eq!(png.palette().unwrap().len(), 2);
  let mut gray = blank(2, 2, 1, PngColorType::Y);
  assert_eq!(gray.add_palette_color(RGB8::new(0, 0, 0)), Err(PngError::UnsupportedOperation));
  assert_eq!(gray.palette_indices(), Err(PngError::UnsupportedOperation));
  assert_eq!(gray.set_transparency_of(0, 0), Err(PngError::UnsupportedOperation));
}

#[test]
fn test_transparency_shape() {
  let mut png = blank(2, 2, 2, PngColorType::Index);
  for v in 0..4 {
    png.add_palette_color(RGB8::new(v, v, v)).unwrap();
  }
  png.set_transparency_of(2, 10).unwrap();
  assert_eq!(png.palette_alphas().unwrap(), [255, 255, 10, 255]);
  let back = Png::decode(&png.encode().unwrap(), codec()).unwrap();
  assert_eq!(back.palette_alphas().unwrap(), [255, 255, 10, 255]);
  let mut back = back;
  back.remove_transparency_of(2).unwrap();
  assert_eq!(back.palette_alphas().unwrap(), [255, 255, 255, 255]);
  assert_eq!(back.remove_transparency_of(3), Err(PngError::OutOfRange));
}

#[test]
fn test_indexed_image_round_trip() {
  let mut png = blank(2, 2, 2, PngColorType::Index);
  let red = png.add_palette_color(RGB8::new(255, 0, 0)).unwrap();
  let green = png.add_palette_color(RGB8::new(0, 255, 0)).unwrap();
  let blue = png.add_palette_color(RGB8::new(0, 0, 255)).unwrap();
  png.set_samples(0_usize, &[red, green, blue, green]).unwrap();
  png.set_transparency_of(green, 128).unwrap();
  png.set_background(&[u16::from(blue)]).unwrap();
  let expected_chunks = [
    PngChunkTy::IHDR,
    PngChunkTy::PLTE,
    PngChunkTy::bKGD,
    PngChunkTy::tRNS,
    PngChunkTy::IDAT,
    PngChunkTy::IEND,
  ];
  assert_eq!(png.chunks_used(), expected_chunks);
  let bytes = png.encode().unwrap();
  let on_wire: Vec<PngChunkTy> = PngChunkIter::new(&bytes).map(|c| c.ty()).collect();
  assert_eq!(on_wire, expected_chunks);

  let back = Png::decode(&bytes, codec()).unwrap();
  assert_eq!(back.palette_indices().unwrap(), &[0, 1, 2, 1]);
  assert_eq!(back.palette(), png.palette());
  assert_eq!(back.transparency(), Some(&tRNS::Indexed(vec![255, 128])));
  assert_eq!(back.background(), Some(bKGD::Index { i: 2 }));
  assert_eq!(back.data(PixelLayout::Rgba).unwrap(), [
    255, 0, 0, 255, 0, 255, 0, 128, 0, 0, 255, 255, 0, 255, 0, 128
  ]);
  assert_eq!(back.data(PixelLayout::Rgb).unwrap(), [
    255, 0, 0, 0, 255, 0, 0, 0, 255, 0, 255, 0
  ]);
}

#[test]
fn test_replace_palette_color_keeps_indices() {
  let mut png = blank(1, 1, 8, PngColorType::Index);
  png.add_palette_color(RGB8::new(1, 2, 3)).unwrap();
  png.replace_palette_color(RGB8::new(1, 2, 3), RGB8::new(4, 5, 6)).unwrap();
  assert_eq!(png.data(PixelLayout::Rgb).unwrap(), [4, 5, 6]);
  png.set_palette_color_of(0, RGB8::new(7, 8, 9)).unwrap();
  assert_eq!(png.data(PixelLayout::Rgb).unwrap(), [7, 8, 9]);
  assert_eq!(
    png.replace_palette_color(RGB8::new(1, 2, 3), RGB8::new(0, 0, 0)),
    Err(PngError::OutOfRange)
  );
}

#[test]
fn test_opacity_by_color_type() {
  let mut ya = blank(2, 1, 8, PngColorType::YA);
  ya.set_opacity(1, 0, 77).unwrap();
  assert_eq!(ya.samples(), &[0, 0, 0, 77]);
  assert_eq!(ya.get_opacity(1, 0), Ok(77));
  assert_eq!(ya.set_opacity(2, 0, 1), Err(PngError::OutOfRange));

  let mut idx = blank(2, 1, 4, PngColorType::Index);
  idx.set_sample(1_usize, 5).unwrap();
  idx.set_opacity(1, 0, 0).unwrap();
  assert_eq!(idx.get_opacity(1, 0), Ok(0));
  assert_eq!(idx.get_opacity(0, 0), Ok(255));

  let mut rgb = blank(2, 1, 8, PngColorType::RGB);
  rgb.set_pixel(0, 0, &[4, 5, 6]).unwrap();
  rgb.set_transparency_key(&[4, 5, 6]).unwrap();
  assert_eq!(rgb.get_opacity(0, 0), Ok(0));
  assert_eq!(rgb.get_opacity(1, 0), Ok(255));
  assert_eq!(rgb.set_opacity(0, 0, 10), Err(PngError::UnsupportedOperation));
  rgb.remove_transparency();
  assert_eq!(rgb.get_opacity(0, 0), Ok(255));
  assert_eq!(rgb.chunks_used(), [PngChunkTy::IHDR, PngChunkTy::IDAT, PngChunkTy::IEND]);
}

#[test]
fn test_low_depth_gray_key_round_trip() {
  let mut png = blank(3, 1, 4, PngColorType::Y);
  png.set_samples(0_usize, &[51, 0, 255]).unwrap();
  assert_eq!(png.set_transparency_key(&[16]), Err(PngError::OutOfRange));
  assert_eq!(png.set_transparency_key(&[1, 2, 3]), Err(PngError::OutOfRange));
  png.set_transparency_key(&[3]).unwrap();
  let back = Png::decode(&png.encode().unwrap(), codec()).unwrap();
  assert_eq!(back.samples(), &[51, 0, 255]);
  assert_eq!(back.transparency(), Some(&tRNS::GrayKey(3)));
  assert_eq!(back.data(PixelLayout::Rgba).unwrap(), [
    51, 51, 51, 0, 0, 0, 0, 255, 255, 255, 255, 255
  ]);
}

#[test]
fn test_unstorable_sample_fails_encode() {
  let mut png = blank(1, 1, 2, PngColorType::Y);
  png.set_sample(0_usize, 100).unwrap();
  assert_eq!(png.encode().unwrap_err(), PngError::InvalidFormat);
  png.set_sample(0_usize, 170).unwrap();
  assert!(png.encode().is_ok());
}

#[test]
fn test_split_image_data() {
  let mut png = blank(8, 8, 8, PngColorType::RGB);
  for y in 0..8 {
    for x in 0..8 {
      png.set_pixel(x, y, &[x as u8, y as u8, 7]).unwrap();
    }
  }
  let bytes = png.encode().unwrap();
  let idat = scan_chunk(&bytes, PngChunkTy::IDAT, 8).unwrap();
  let (front, back) = idat.data().split_at(idat.data().len() / 2);
  let mut split = bytes[..idat.start()].to_vec();
  split.extend(frame_chunk(PngChunkTy::IDAT, front).unwrap());
  split.extend(frame_chunk(PngChunkTy::IDAT, back).unwrap());
  split.extend(IEND.to_chunk());
  let decoded = Png::decode(&split, codec()).unwrap();
  assert_eq!(decoded.samples(), png.samples());
}

#[test]
fn test_foreign_chunks_are_ignored() {
  let bytes = blank(2, 2, 8, PngColorType::RGBA).encode().unwrap();
  let text = frame_chunk(PngChunkTy(*b"tEXt"), b"Comment\0IDAT IEND").unwrap();
  let with_text = splice_after(&bytes, PngChunkTy::IHDR, &text);
  let decoded = Png::decode(&with_text, codec()).unwrap();
  assert_eq!(decoded.samples(), &[0; 16]);
  // a tRNS chunk doesn't belong in an image with an alpha channel
  let trns = frame_chunk(PngChunkTy::tRNS, &[0, 1]).unwrap();
  let with_trns = splice_after(&bytes, PngChunkTy::IHDR, &trns);
  let decoded = Png::decode(&with_trns, codec()).unwrap();
  assert_eq!(decoded.transparency(), None);
}

#[test]
fn test_oversized_image_data_fails() {
  let bytes = blank(1, 1, 8, PngColorType::Y).encode().unwrap();
  let idat = scan_chunk(&bytes, PngChunkTy::IDAT, 8).unwrap();
  let oversized = MinizCodec::default().deflate(&vec![0; 1 << 20]);
  let mut out = bytes[..idat.start()].to_vec();
  out.extend(frame_chunk(PngChunkTy::IDAT, &oversized).unwrap());
  out.extend(IEND.to_chunk());
  assert_eq!(Png::decode(&out, codec()).unwrap_err(), PngError::InvalidFormat);
}

#[test]
fn test_bad_image_data_crc_is_not_skipped() {
  let mut png = blank(2, 2, 8, PngColorType::Y);
  png.set_samples(0_usize, &[1, 2, 3, 4]).unwrap();
  let bytes = png.encode().unwrap();
  let idat = scan_chunk(&bytes, PngChunkTy::IDAT, 8).unwrap();
  // a second, valid IDAT behind a corrupt one is never looked for
  let mut out = bytes[..idat.end()].to_vec();
  out[idat.end() - 1] ^= 0xFF;
  out.extend_from_slice(&bytes[idat.start()..]);
  assert_eq!(Png::decode(&out, codec()).unwrap_err(), PngError::InvalidFormat);
}

#[test]
fn test_indexed_encode_needs_its_palette() {
  let mut png = blank(2, 1, 2, PngColorType::Index);
  assert_eq!(png.encode().unwrap_err(), PngError::InvalidFormat);
  png.add_palette_color(RGB8::new(1, 2, 3)).unwrap();
  assert!(png.encode().is_ok());
  png.set_transparency_of(2, 0).unwrap();
  assert_eq!(png.encode().unwrap_err(), PngError::InvalidFormat);
  png.set_palette_color_of(2, RGB8::new(4, 5, 6)).unwrap();
  let back = Png::decode(&png.encode().unwrap(), codec()).unwrap();
  assert_eq!(back.palette_alphas().unwrap(), [255, 255, 0]);
}
