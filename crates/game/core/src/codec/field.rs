//! Primitive field encodings.

use core::fmt;

use super::CodecError;

/// Cursor over a borrowed byte stream.
///
/// Reads never go past the end of the slice: a short read reports how many
/// bytes the field needed and how many were left.
#[derive(Clone, Debug)]
pub struct ByteReader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    /// Consumes exactly `needed` bytes for `field`.
    pub fn take(&mut self, needed: usize, field: &'static str) -> Result<&'a [u8], CodecError> {
        let remaining = self.remaining();
        if needed > remaining {
            return Err(CodecError::UnexpectedEof {
                field,
                needed,
                remaining,
            });
        }

        let start = self.position;
        self.position += needed;
        Ok(&self.bytes[start..self.position])
    }
}

/// A value with a fixed-width wire encoding.
///
/// Implementations must write exactly the bytes they read back; the
/// `Debug` bound is used by the logging serialiser.
pub trait Field: Sized + fmt::Debug {
    /// Appends the encoded value.
    fn write(&self, out: &mut Vec<u8>);

    /// Decodes a value, naming `field` in any error.
    fn read(input: &mut ByteReader<'_>, field: &'static str) -> Result<Self, CodecError>;
}

macro_rules! impl_le_field {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Field for $ty {
                fn write(&self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_le_bytes());
                }

                fn read(input: &mut ByteReader<'_>, field: &'static str) -> Result<Self, CodecError> {
                    let bytes = input.take(core::mem::size_of::<$ty>(), field)?;
                    let mut buf = [0u8; core::mem::size_of::<$ty>()];
                    buf.copy_from_slice(bytes);
                    Ok(<$ty>::from_le_bytes(buf))
                }
            }
        )*
    };
}

impl_le_field!(u8, u16, u32, u64, i8, i16, i32, i64);

impl Field for bool {
    fn write(&self, out: &mut Vec<u8>) {
        out.push(u8::from(*self));
    }

    fn read(input: &mut ByteReader<'_>, field: &'static str) -> Result<Self, CodecError> {
        match u8::read(input, field)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(CodecError::InvalidValue {
                field,
                value: u64::from(other),
            }),
        }
    }
}

impl<T, const N: usize> Field for [T; N]
where
    T: Field + Copy + Default,
{
    fn write(&self, out: &mut Vec<u8>) {
        for element in self {
            element.write(out);
        }
    }

    fn read(input: &mut ByteReader<'_>, field: &'static str) -> Result<Self, CodecError> {
        let mut values = [T::default(); N];
        for slot in values.iter_mut() {
            *slot = T::read(input, field)?;
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode<T: Field>(value: T) -> Vec<u8> {
        let mut out = Vec::new();
        value.write(&mut out);
        out
    }

    #[test]
    fn integers_are_little_endian_and_fixed_width() {
        assert_eq!(hex::encode(encode(0x1234u16)), "3412");
        assert_eq!(hex::encode(encode(-1i32)), "ffffffff");
        assert_eq!(hex::encode(encode(7u64)), "0700000000000000");
    }

    #[test]
    fn bool_rejects_values_other_than_zero_and_one() {
        let mut reader = ByteReader::new(&[2]);
        let err = bool::read(&mut reader, "is_large").unwrap_err();
        assert_eq!(
            err,
            CodecError::InvalidValue {
                field: "is_large",
                value: 2
            }
        );
    }

    #[test]
    fn short_read_reports_needed_and_remaining() {
        let mut reader = ByteReader::new(&[1, 2, 3]);
        let err = u32::read(&mut reader, "banner_index").unwrap_err();
        assert_eq!(
            err,
            CodecError::UnexpectedEof {
                field: "banner_index",
                needed: 4,
                remaining: 3
            }
        );
        // A failed read does not advance the cursor.
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn arrays_have_no_length_prefix() {
        let bytes = encode([1u8, 2, 3]);
        assert_eq!(bytes, vec![1, 2, 3]);

        let mut reader = ByteReader::new(&bytes);
        let decoded = <[u8; 3]>::read(&mut reader, "name").unwrap();
        assert_eq!(decoded, [1, 2, 3]);
        assert_eq!(reader.remaining(), 0);
    }
}
