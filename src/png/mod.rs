//! Holds all the tools for encoding and decoding PNG data.
//!
//! * [Portable Network Graphics Specification (Second Edition)][png-spec]
//!
//! [png-spec]: https://www.w3.org/TR/2003/REC-PNG-20031110/
//!
//! The format of a PNG is an 8 byte signature followed by "chunks". Each
//! chunk has a length, a four letter type, some payload bytes, and a CRC. This
//! module understands the four "critical" chunk types:
//! * **Header** ([`IHDR`]) - the image's dimensions and pixel format. Every
//!   other chunk needs this info, so it's decoded first and the result gets
//!   handed to the others as an [`ImageGeometry`].
//! * **Palette** ([`PLTE`]) - if an image uses indexed color it will have a
//!   palette of what index values map to what [`RGB8`] values.
//! * **Image Data** ([`IDAT`]) - the compressed pixels. On the way out the
//!   samples are packed, each row gets a filter byte, and the whole thing is
//!   compressed into a zlib stream. Decoding reverses all of that.
//! * **End** ([`IEND`]) - the last chunk, lets you know you had the full PNG
//!   and your data wasn't truncated accidentally.
//!
//! Plus two ancillary ones: transparency ([`tRNS`]) and background color
//! ([`bKGD`]). Any other chunk in the input is ignored.
//!
//! Most users will only need [`Png`], which holds all of the above. The
//! compression itself is done by whatever [`ZlibCodec`] you give it. With the
//! `miniz_oxide` feature (on by default) [`MinizCodec`] is available.
//!
//! ```
//! # #[cfg(feature = "miniz_oxide")]
//! # fn main() -> pngine::PngResult<()> {
//! use pngine::png::*;
//! let options = PngOptions::new(2, 1, 8, PngColorType::Y).with_codec(MinizCodec::default());
//! let mut png = Png::new(options)?;
//! png.set_samples(0_usize, &[10, 20])?;
//! let bytes = png.encode()?;
//! let back = Png::decode(&bytes, Box::new(MinizCodec::default()))?;
//! assert_eq!(back.samples(), &[10, 20]);
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "miniz_oxide"))]
//! # fn main() {}
//! ```
//!
//! ## Parsing Rules
//!
//! Chunks are found by searching for their type tag, not by walking the chunk
//! list, so junk between chunks is tolerated. The `IHDR`, `IDAT`, and `IEND`
//! chunks must be present and their CRCs must be correct. The other chunks only
//! have their CRC checked as a warning.

use alloc::{boxed::Box, collections::BTreeMap, vec::Vec};
use core::fmt::{Debug, Write};

use crate::{
  bit_depth_changes::{pack, translate_code, unpack},
  filtering::{add_filter_fields, defilter, remove_filter_fields},
  pixel_formats::RGB8,
  PngError, PngResult,
};

mod crc32;
pub use crc32::*;

mod chunk;
pub use chunk::*;

mod ihdr;
pub use ihdr::*;

mod plte;
pub use plte::*;

mod trns;
pub use trns::*;

mod bkgd;
pub use bkgd::*;

mod idat;
pub use idat::*;

mod iend;
pub use iend::*;

mod codec;
pub use codec::*;

mod layout;
pub use layout::*;

mod image;
pub use image::*;

#[cfg(all(test, feature = "miniz_oxide"))]
mod tests;
