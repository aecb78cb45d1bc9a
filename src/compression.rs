use brotli::enc::BrotliEncoderParams;
use clap::ValueEnum;
use flate2::write::GzEncoder;
use flate2::Compression as GzipCompression;
use std::fmt;
use std::io::Write;

use crate::error::{Result, ServeError};

const BROTLI_QUALITY: i32 = 6;
const BROTLI_WINDOW: i32 = 22;

/// Compression applied to every response body. Chosen once at startup.
#[derive(Debug, PartialEq, Eq, Copy, Clone, ValueEnum)]
pub enum CompressionMode {
    Gzip,
    Brotli,
}

impl CompressionMode {
    /// Value for the `Content-Encoding` header.
    pub fn encoding(&self) -> &'static str {
        match self {
            CompressionMode::Gzip => "gzip",
            CompressionMode::Brotli => "br",
        }
    }

    /// Compresses `content` into a fully finalized stream.
    pub fn compress(&self, content: &[u8]) -> Result<Vec<u8>> {
        match self {
            CompressionMode::Gzip => compress_gzip(content),
            CompressionMode::Brotli => compress_brotli(content),
        }
    }
}

impl fmt::Display for CompressionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressionMode::Gzip => f.write_str("gzip"),
            CompressionMode::Brotli => f.write_str("brotli"),
        }
    }
}

fn compress_gzip(content: &[u8]) -> Result<Vec<u8>> {
    log::debug!("Compressing {} bytes with gzip", content.len());
    let mut encoder = GzEncoder::new(Vec::new(), GzipCompression::default());
    encoder.write_all(content).map_err(ServeError::Compression)?;
    encoder.finish().map_err(ServeError::Compression)
}

fn compress_brotli(content: &[u8]) -> Result<Vec<u8>> {
    log::debug!("Compressing {} bytes with brotli", content.len());
    let mut params = BrotliEncoderParams::default();
    params.quality = BROTLI_QUALITY;
    params.lgwin = BROTLI_WINDOW;
    let mut input = content;
    let mut output = Vec::new();
    brotli::enc::BrotliCompress(&mut input, &mut output, &params).map_err(ServeError::Compression)?;
    Ok(output)
}
