//! Incremental byte/text conversion for session I/O

mod ansi;

pub use ansi::strip_ansi;

use crate::result::ExpectError;
use encoding_rs::{CoderResult, Decoder, DecoderResult, Encoding};

/// Policy for bytes that do not decode (or text that does not encode) cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodecErrors {
    /// Substitute U+FFFD for malformed input. The session keeps going.
    #[default]
    Replace,
    /// Fail the read or send with a codec error.
    Strict,
}

/// Stateful byte-to-text converter for one session.
///
/// Incoming chunks arrive with arbitrary boundaries, so a multi-byte sequence
/// can be split across reads. The decoder carries that partial state between
/// calls; a split sequence produces its character once the rest arrives.
pub struct TextCodec {
    encoding: &'static Encoding,
    decoder: Decoder,
    errors: CodecErrors,
}

impl TextCodec {
    /// Resolve an encoding label (e.g. `"utf-8"`, `"latin1"`, `"shift_jis"`)
    /// and build a codec for it.
    ///
    /// # Errors
    ///
    /// Fails with `UnknownEncoding` if the label names no known encoding.
    pub fn new(label: &str, errors: CodecErrors) -> Result<Self, ExpectError> {
        let encoding = Encoding::for_label(label.as_bytes())
            .ok_or_else(|| ExpectError::UnknownEncoding(label.to_string()))?;

        Ok(Self {
            encoding,
            decoder: encoding.new_decoder(),
            errors,
        })
    }

    /// Canonical name of the session encoding.
    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }

    /// Decode one incoming chunk, carrying partial sequences forward.
    ///
    /// The stream is never finalized: a session has no natural "last chunk"
    /// until the transport closes, and a trailing partial sequence at EOF is
    /// simply never completed.
    pub fn decode(&mut self, bytes: &[u8]) -> Result<String, ExpectError> {
        match self.errors {
            CodecErrors::Replace => {
                let capacity = self
                    .decoder
                    .max_utf8_buffer_length(bytes.len())
                    .unwrap_or(bytes.len() * 4);
                let mut out = String::with_capacity(capacity);
                let (result, _read, _replaced) =
                    self.decoder.decode_to_string(bytes, &mut out, false);
                // Capacity was sized for the whole input.
                debug_assert!(matches!(result, CoderResult::InputEmpty));
                Ok(out)
            }
            CodecErrors::Strict => {
                let capacity = self
                    .decoder
                    .max_utf8_buffer_length_without_replacement(bytes.len())
                    .unwrap_or(bytes.len() * 4);
                let mut out = String::with_capacity(capacity);
                let (result, _read) =
                    self.decoder
                        .decode_to_string_without_replacement(bytes, &mut out, false);
                match result {
                    DecoderResult::InputEmpty | DecoderResult::OutputFull => Ok(out),
                    DecoderResult::Malformed(..) => Err(ExpectError::Decode {
                        encoding: self.encoding.name(),
                    }),
                }
            }
        }
    }

    /// Encode outgoing text in the session encoding.
    ///
    /// # Errors
    ///
    /// Under the strict policy, fails if the text contains characters the
    /// encoding cannot represent.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>, ExpectError> {
        let (bytes, _, had_unmappable) = self.encoding.encode(text);
        if had_unmappable && self.errors == CodecErrors::Strict {
            return Err(ExpectError::Encode {
                encoding: self.encoding.name(),
            });
        }
        Ok(bytes.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_round_trip() {
        let mut codec = TextCodec::new("utf-8", CodecErrors::Replace).unwrap();
        assert_eq!(codec.decode("héllo 世界".as_bytes()).unwrap(), "héllo 世界");
        assert_eq!(codec.encode("héllo").unwrap(), "héllo".as_bytes());
    }

    #[test]
    fn test_split_multibyte_sequence_is_carried_forward() {
        let mut codec = TextCodec::new("utf-8", CodecErrors::Replace).unwrap();
        let bytes = "世".as_bytes();

        // First two bytes of a three-byte sequence produce nothing yet.
        assert_eq!(codec.decode(&bytes[..2]).unwrap(), "");
        assert_eq!(codec.decode(&bytes[2..]).unwrap(), "世");
    }

    #[test]
    fn test_replace_policy_substitutes_malformed_input() {
        let mut codec = TextCodec::new("utf-8", CodecErrors::Replace).unwrap();
        assert_eq!(codec.decode(&[b'a', 0xFF, b'b']).unwrap(), "a\u{FFFD}b");
    }

    #[test]
    fn test_strict_policy_rejects_malformed_input() {
        let mut codec = TextCodec::new("utf-8", CodecErrors::Strict).unwrap();
        assert!(codec.decode(&[0xFF]).is_err());
    }

    #[test]
    fn test_latin1_label_resolves() {
        let mut codec = TextCodec::new("latin1", CodecErrors::Replace).unwrap();
        assert_eq!(codec.decode(&[0xE9]).unwrap(), "é");
    }

    #[test]
    fn test_unknown_label_is_rejected() {
        assert!(TextCodec::new("no-such-encoding", CodecErrors::Replace).is_err());
    }
}
