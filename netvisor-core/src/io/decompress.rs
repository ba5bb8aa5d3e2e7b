//! Gzip detection and bounded inflation of uploads.

use std::io::Read;

use flate2::read::GzDecoder;

use crate::error::Error;

/// Detected compression format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// No compression
    None,
    /// Gzip (.gz)
    Gzip,
}

impl Compression {
    /// Detect compression format from magic bytes.
    pub fn detect(data: &[u8]) -> Self {
        match data {
            // Gzip: 1f 8b, deflate method 08
            [0x1f, 0x8b, 0x08, ..] => Compression::Gzip,
            _ => Compression::None,
        }
    }

    /// Check if this represents compressed data.
    pub fn is_compressed(&self) -> bool {
        !matches!(self, Compression::None)
    }
}

impl std::fmt::Display for Compression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Compression::None => write!(f, "none"),
            Compression::Gzip => write!(f, "gzip"),
        }
    }
}

/// Output of [`inflate_bounded`].
#[derive(Debug)]
pub struct Inflated {
    pub data: Vec<u8>,
    /// Output hit the limit; `data` is a prefix of the decompressed stream.
    pub limit_reached: bool,
}

/// Inflate a gzip stream, producing at most `limit` bytes.
///
/// A stream that breaks off after producing some output yields that prefix;
/// one that yields nothing at all is an error.
pub fn inflate_bounded(data: &[u8], limit: u64) -> Result<Inflated, Error> {
    // One extra byte tells "exactly at the limit" from "over the limit".
    let mut decoder = GzDecoder::new(data).take(limit.saturating_add(1));
    let mut out = Vec::new();

    if let Err(e) = decoder.read_to_end(&mut out) {
        if out.is_empty() {
            return Err(Error::Decompress {
                reason: e.to_string(),
            });
        }
        tracing::warn!(error = %e, produced = out.len(), "gzip stream ended early");
    }

    let limit_reached = out.len() as u64 > limit;
    if limit_reached {
        out.truncate(limit as usize);
    }

    Ok(Inflated {
        data: out,
        limit_reached,
    })
}
