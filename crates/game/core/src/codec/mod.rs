//! Ordered binary codec for action parameters.
//!
//! Every action describes its fields once, in a fixed order, against a
//! [`DataSerialiser`]. The same description drives encoding, decoding and
//! diagnostic rendering, so writer and reader can never disagree on layout.
//!
//! Layout rules:
//! - integers are fixed width, little-endian
//! - `bool` is a single byte, only `0` and `1` decode
//! - fixed arrays are their elements back to back
//! - no padding, no alignment, no length prefixes
//!
//! A short stream, an invalid value, or bytes left over after the last field
//! all surface as [`CodecError`]; nothing is silently truncated.

mod error;
mod field;
mod stream;

pub use error::CodecError;
pub use field::{ByteReader, Field};
pub use stream::DataSerialiser;
