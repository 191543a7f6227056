/*!
 * Per-file byte encoding resolution.
 *
 * Help archives authored on legacy systems store pages in whatever code page the author
 * used (Shift_JIS, GBK, windows-1252, ...). Pages are decoded strictly: a file that is not
 * valid in its resolved encoding is reported instead of being silently mangled.
 */

use std::borrow::Cow;

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use log::{debug, trace};

use crate::errors::EncodingError;

/// A page decoded to text along with the encoding it was read in
#[derive(Debug, Clone)]
pub struct DecodedText {
    pub text: String,
    pub encoding: &'static Encoding,
}

/// Resolves the encoding of raw page bytes and decodes them
#[derive(Debug, Clone, Copy)]
pub struct EncodingResolver {
    /// Encoding to assume for files without a byte order mark
    forced: Option<&'static Encoding>,
}

impl Default for EncodingResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl EncodingResolver {
    /// Resolver that detects the encoding of every file
    pub fn new() -> Self {
        Self { forced: None }
    }

    /// Resolver that assumes the given encoding unless a byte order mark says otherwise
    pub fn with_source_encoding(label: Option<&str>) -> Result<Self, EncodingError> {
        let forced = match label {
            Some(label) if !label.trim().is_empty() => Some(resolve_label(label)?),
            _ => None,
        };
        Ok(Self { forced })
    }

    /// Determine the encoding of `bytes` and the length of its byte order mark, if any
    pub fn detect(&self, bytes: &[u8]) -> (&'static Encoding, usize) {
        if let Some((encoding, bom_length)) = Encoding::for_bom(bytes) {
            trace!("Byte order mark found: {}", encoding.name());
            return (encoding, bom_length);
        }

        if let Some(encoding) = self.forced {
            return (encoding, 0);
        }

        let mut detector = EncodingDetector::new();
        detector.feed(bytes, true);
        let encoding = detector.guess(None, true);
        debug!("Detected encoding: {}", encoding.name());
        (encoding, 0)
    }

    /// Decode `bytes` to text without replacing malformed sequences
    pub fn decode(&self, bytes: &[u8]) -> Result<DecodedText, EncodingError> {
        let (encoding, bom_length) = self.detect(bytes);
        let text = encoding
            .decode_without_bom_handling_and_without_replacement(&bytes[bom_length..])
            .ok_or_else(|| EncodingError::DecodeFailed {
                encoding: encoding.name().to_string(),
            })?;

        Ok(DecodedText {
            text: text.into_owned(),
            encoding,
        })
    }
}

/// Look up an encoding by its WHATWG label (`utf-8`, `shift_jis`, `gb2312`, ...)
pub fn resolve_label(label: &str) -> Result<&'static Encoding, EncodingError> {
    Encoding::for_label(label.trim().as_bytes())
        .filter(|encoding| *encoding != encoding_rs::REPLACEMENT)
        .ok_or_else(|| EncodingError::UnknownLabel(label.to_string()))
}

/// Encode text for output. Characters the encoding cannot represent become numeric
/// character references, which markup readers decode back.
pub fn encode<'a>(text: &'a str, encoding: &'static Encoding) -> Cow<'a, [u8]> {
    let (bytes, _, _) = encoding.output_encoding().encode(text);
    bytes
}

/// The default output encoding
pub fn default_output_encoding() -> &'static Encoding {
    UTF_8
}
