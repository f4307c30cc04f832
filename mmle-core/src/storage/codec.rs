//! Codec - Value Encoding Pipeline
//!
//! TigerStyle: encode/decode are total functions; decode never fails.
//!
//! Every value is JSON-serialized, then run through the bound codec
//! before it touches a substrate, and run back through it after
//! retrieval. The identity codec passes text through unchanged. The
//! compressed codecs deflate the text and re-encode it for the
//! transport: URL-safe base64 for the cookie surface (no `;`, `=` or
//! spaces may appear in a cookie value), standard base64 for the local
//! store. Garbage input to `decode` (anything not produced by `encode`)
//! comes back unchanged so the read path can fall back to treating it
//! as an opaque string.

use std::fmt;
use std::io::{Read, Write};
use std::sync::Arc;

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;

/// The optional injected compression collaborator.
///
/// Absence is not an error; the facade degrades to the identity codec.
/// Decompress methods return `None` for input the matching compress
/// method did not produce.
pub trait Compressor: Send + Sync {
    /// Compress to a URL-safe string (cookie transport).
    fn compress_to_url_safe(&self, text: &str) -> String;

    /// Inverse of [`Compressor::compress_to_url_safe`].
    fn decompress_from_url_safe(&self, text: &str) -> Option<String>;

    /// Compress to a plain text string (local-store transport).
    fn compress_to_text(&self, text: &str) -> String;

    /// Inverse of [`Compressor::compress_to_text`].
    fn decompress_from_text(&self, text: &str) -> Option<String>;
}

// =============================================================================
// DeflateCompressor
// =============================================================================

/// Deflate-based [`Compressor`] over base64 transports.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeflateCompressor;

fn deflate_bytes(text: &str) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder
        .write_all(text.as_bytes())
        .expect("in-memory deflate cannot fail");
    encoder.finish().expect("in-memory deflate cannot fail")
}

fn inflate_bytes(bytes: &[u8]) -> Option<String> {
    let mut decoder = ZlibDecoder::new(bytes);
    let mut text = String::new();
    decoder.read_to_string(&mut text).ok()?;
    Some(text)
}

impl Compressor for DeflateCompressor {
    fn compress_to_url_safe(&self, text: &str) -> String {
        URL_SAFE_NO_PAD.encode(deflate_bytes(text))
    }

    fn decompress_from_url_safe(&self, text: &str) -> Option<String> {
        let bytes = URL_SAFE_NO_PAD.decode(text).ok()?;
        inflate_bytes(&bytes)
    }

    fn compress_to_text(&self, text: &str) -> String {
        STANDARD.encode(deflate_bytes(text))
    }

    fn decompress_from_text(&self, text: &str) -> Option<String> {
        let bytes = STANDARD.decode(text).ok()?;
        inflate_bytes(&bytes)
    }
}

// =============================================================================
// Codec
// =============================================================================

/// A bound encode/decode pair, resolved once per initialization.
///
/// One instance is bound per backend type; which one is active follows
/// the backend selection.
#[derive(Clone)]
pub enum Codec {
    /// Pass-through.
    Identity,
    /// Compressed, URL-safe transport (cookie backend).
    CompressedUrlSafe(Arc<dyn Compressor>),
    /// Compressed, plain text transport (local-store backend).
    CompressedText(Arc<dyn Compressor>),
}

impl Codec {
    /// Transform serialized text for storage.
    #[must_use]
    pub fn encode(&self, text: &str) -> String {
        match self {
            Self::Identity => text.to_string(),
            Self::CompressedUrlSafe(compressor) => compressor.compress_to_url_safe(text),
            Self::CompressedText(compressor) => compressor.compress_to_text(text),
        }
    }

    /// Transform stored text back into serialized form.
    ///
    /// Input not produced by [`Codec::encode`] is returned unchanged.
    #[must_use]
    pub fn decode(&self, text: &str) -> String {
        match self {
            Self::Identity => text.to_string(),
            Self::CompressedUrlSafe(compressor) => compressor
                .decompress_from_url_safe(text)
                .unwrap_or_else(|| text.to_string()),
            Self::CompressedText(compressor) => compressor
                .decompress_from_text(text)
                .unwrap_or_else(|| text.to_string()),
        }
    }
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity => f.write_str("Codec::Identity"),
            Self::CompressedUrlSafe(_) => f.write_str("Codec::CompressedUrlSafe"),
            Self::CompressedText(_) => f.write_str("Codec::CompressedText"),
        }
    }
}
