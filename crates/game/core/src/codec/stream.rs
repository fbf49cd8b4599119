//! Bidirectional data serialiser.

use std::fmt::Write as _;

use super::{ByteReader, CodecError, Field};

enum Mode<'a> {
    Writing(Vec<u8>),
    Reading(ByteReader<'a>),
    Logging(String),
}

impl Mode<'_> {
    fn name(&self) -> &'static str {
        match self {
            Mode::Writing(_) => "writing",
            Mode::Reading(_) => "reading",
            Mode::Logging(_) => "logging",
        }
    }
}

/// Stream that an action describes its fields against.
///
/// A single `serialise` body calls [`tag`](Self::tag) once per field in
/// declaration order. In writing mode the value is appended, in reading mode
/// it is replaced by the decoded value, and in logging mode a `name=value`
/// pair is rendered for diagnostics.
///
/// # Examples
///
/// ```
/// use game_core::codec::DataSerialiser;
///
/// let mut index = 7i32;
/// let mut large = true;
///
/// let mut writer = DataSerialiser::writer();
/// writer.tag("banner_index", &mut index).unwrap();
/// writer.tag("is_large", &mut large).unwrap();
/// let bytes = writer.into_bytes().unwrap();
/// assert_eq!(bytes, vec![7, 0, 0, 0, 1]);
///
/// let (mut index, mut large) = (0i32, false);
/// let mut reader = DataSerialiser::reader(&bytes);
/// reader.tag("banner_index", &mut index).unwrap();
/// reader.tag("is_large", &mut large).unwrap();
/// reader.finish().unwrap();
/// assert_eq!((index, large), (7, true));
/// ```
pub struct DataSerialiser<'a> {
    mode: Mode<'a>,
}

impl<'a> DataSerialiser<'a> {
    /// Creates a serialiser that encodes into a fresh buffer.
    pub fn writer() -> Self {
        Self {
            mode: Mode::Writing(Vec::new()),
        }
    }

    /// Creates a serialiser that decodes from `bytes`.
    pub fn reader(bytes: &'a [u8]) -> Self {
        Self {
            mode: Mode::Reading(ByteReader::new(bytes)),
        }
    }

    /// Creates a serialiser that renders fields as text.
    pub fn logger() -> Self {
        Self {
            mode: Mode::Logging(String::new()),
        }
    }

    pub fn is_writing(&self) -> bool {
        matches!(self.mode, Mode::Writing(_))
    }

    pub fn is_reading(&self) -> bool {
        matches!(self.mode, Mode::Reading(_))
    }

    pub fn is_logging(&self) -> bool {
        matches!(self.mode, Mode::Logging(_))
    }

    /// Bytes written or consumed so far. Always zero when logging.
    pub fn position(&self) -> usize {
        match &self.mode {
            Mode::Writing(buf) => buf.len(),
            Mode::Reading(reader) => reader.position(),
            Mode::Logging(_) => 0,
        }
    }

    /// Serialises one named field in the current mode.
    pub fn tag<T: Field>(&mut self, name: &'static str, value: &mut T) -> Result<(), CodecError> {
        match &mut self.mode {
            Mode::Writing(buf) => value.write(buf),
            Mode::Reading(reader) => *value = T::read(reader, name)?,
            Mode::Logging(out) => {
                if !out.is_empty() {
                    out.push_str(", ");
                }
                let _ = write!(out, "{name}={value:?}");
            }
        }
        Ok(())
    }

    /// Returns the encoded bytes of a writing serialiser.
    pub fn into_bytes(self) -> Result<Vec<u8>, CodecError> {
        match self.mode {
            Mode::Writing(buf) => Ok(buf),
            other => Err(CodecError::WrongMode {
                expected: "writing",
                actual: other.name(),
            }),
        }
    }

    /// Returns the rendered text of a logging serialiser.
    pub fn into_log(self) -> Result<String, CodecError> {
        match self.mode {
            Mode::Logging(out) => Ok(out),
            other => Err(CodecError::WrongMode {
                expected: "logging",
                actual: other.name(),
            }),
        }
    }

    /// Completes a read, failing if any bytes were left unconsumed.
    ///
    /// Writing and logging serialisers always finish successfully.
    pub fn finish(self) -> Result<(), CodecError> {
        match self.mode {
            Mode::Reading(reader) if reader.remaining() > 0 => Err(CodecError::TrailingBytes {
                remaining: reader.remaining(),
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Sample {
        index: i32,
        colours: [u8; 2],
        flag: bool,
    }

    impl Sample {
        fn serialise(&mut self, stream: &mut DataSerialiser<'_>) -> Result<(), CodecError> {
            stream.tag("index", &mut self.index)?;
            stream.tag("colours", &mut self.colours)?;
            stream.tag("flag", &mut self.flag)
        }
    }

    fn encode(sample: &mut Sample) -> Vec<u8> {
        let mut writer = DataSerialiser::writer();
        sample.serialise(&mut writer).unwrap();
        writer.into_bytes().unwrap()
    }

    #[test]
    fn same_body_writes_and_reads() {
        let mut original = Sample {
            index: -3,
            colours: [5, 2],
            flag: true,
        };
        let bytes = encode(&mut original);
        assert_eq!(hex::encode(&bytes), "fdffffff050201");

        let mut decoded = Sample::default();
        let mut reader = DataSerialiser::reader(&bytes);
        decoded.serialise(&mut reader).unwrap();
        reader.finish().unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let mut bytes = encode(&mut Sample::default());
        bytes.push(0xAA);

        let mut reader = DataSerialiser::reader(&bytes);
        Sample::default().serialise(&mut reader).unwrap();
        assert_eq!(
            reader.finish(),
            Err(CodecError::TrailingBytes { remaining: 1 })
        );
    }

    #[test]
    fn truncated_stream_names_the_missing_field() {
        let bytes = encode(&mut Sample::default());

        let mut reader = DataSerialiser::reader(&bytes[..5]);
        let err = Sample::default().serialise(&mut reader).unwrap_err();
        assert!(matches!(
            err,
            CodecError::UnexpectedEof {
                field: "colours",
                ..
            }
        ));
    }

    #[test]
    fn logger_renders_fields_in_order() {
        let mut sample = Sample {
            index: 4,
            colours: [1, 9],
            flag: false,
        };
        let mut logger = DataSerialiser::logger();
        sample.serialise(&mut logger).unwrap();
        assert_eq!(
            logger.into_log().unwrap(),
            "index=4, colours=[1, 9], flag=false"
        );
    }

    #[test]
    fn into_bytes_requires_writing_mode() {
        let reader = DataSerialiser::reader(&[]);
        assert_eq!(
            reader.into_bytes(),
            Err(CodecError::WrongMode {
                expected: "writing",
                actual: "reading"
            })
        );
    }
}
