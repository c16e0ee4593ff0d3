#![no_std]
#![cfg_attr(docs_rs, feature(doc_cfg))]

//! A crate for encoding and decoding PNG images in memory.
//!
//! The whole PNG is always a single byte slice, and the decoded image is
//! always a single buffer of one `u8` per sample. See the [`png`] module for
//! the details.
//!
//! Zlib compression isn't done by this crate directly. You give each image a
//! [`ZlibCodec`](png::ZlibCodec), and the `miniz_oxide` feature (on by
//! default) provides one.

extern crate alloc;

#[cfg(target_pointer_width = "16")]
compile_error!("this crate assumes 32-bit or bigger pointers!");

mod error;
pub use error::*;

pub mod pixel_formats;
pub use pixel_formats::*;

pub mod bit_depth_changes;

pub mod filtering;

pub mod png;
