//! Body encodings: gzip negotiation and base64 transport.

use base64::Engine;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;

/// Check whether an `Accept-Encoding` value allows gzip.
///
/// Tokens are matched case-insensitively; `gzip;q=0` is a refusal, and a
/// bare `*` with a non-zero weight counts as acceptance.
pub fn accepts_gzip(accept_encoding: &str) -> bool {
    accept_encoding.split(',').any(|item| {
        let mut parts = item.split(';');
        let token = parts.next().unwrap_or("").trim();
        if !token.eq_ignore_ascii_case("gzip") && token != "*" {
            return false;
        }
        let weight = parts
            .filter_map(|param| param.trim().strip_prefix("q="))
            .next()
            .and_then(|q| q.trim().parse::<f32>().ok())
            .unwrap_or(1.0);
        weight > 0.0
    })
}

/// Gzip `data` with the default compression level.
pub fn gzip(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

/// Base64 (standard alphabet, padded) for binary bodies.
pub fn encode_base64(data: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(data)
}
