//! Compression and text encoding for the `PlantUML` server URL scheme.
//!
//! The server receives diagram source as a path segment: raw-deflated bytes
//! packed into a base64-like encoding with a custom alphabet. The alphabet
//! orders digits first (`0-9`, `A-Z`, `a-z`, `-`, `_`), so it is *not*
//! interchangeable with standard base64.

use std::io::Write;

use flate2::Compression;
use flate2::write::DeflateEncoder;

/// The server's 64-symbol encoding alphabet, in index order.
const ALPHABET: &[u8; 64] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz-_";

/// Compress diagram source and encode it for the server URL.
///
/// The content is trimmed, deflated as a raw stream (no zlib header, no
/// checksum trailer; the server expects the bare deflate payload) and then
/// packed with [`encode_bytes`].
#[must_use]
pub fn compress_and_encode(content: &str) -> String {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    // Deflate into an in-memory buffer cannot fail
    encoder
        .write_all(content.trim().as_bytes())
        .expect("deflate write to Vec");
    let compressed = encoder.finish().expect("deflate finish to Vec");
    encode_bytes(&compressed)
}

/// Encode bytes into the server's base64-like text encoding.
///
/// Packs 3 input bytes into 4 output symbols of 6 bits each. A trailing
/// group of 1 or 2 bytes is zero-filled and still emits all 4 symbols;
/// unlike standard base64, no padding character is used.
///
/// Pure and total: identical input always yields identical output.
#[must_use]
pub fn encode_bytes(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len().div_ceil(3) * 4);
    for chunk in data.chunks(3) {
        let b1 = chunk[0];
        let b2 = chunk.get(1).copied().unwrap_or(0);
        let b3 = chunk.get(2).copied().unwrap_or(0);
        encode_group(&mut out, b1, b2, b3);
    }
    out
}

/// Append the 4 symbols encoding one 3-byte group.
fn encode_group(out: &mut String, b1: u8, b2: u8, b3: u8) {
    let symbols = [
        b1 >> 2,
        ((b1 & 0x3) << 4) | (b2 >> 4),
        ((b2 & 0xF) << 2) | (b3 >> 6),
        b3 & 0x3F,
    ];
    for s in symbols {
        out.push(ALPHABET[usize::from(s & 0x3F)] as char);
    }
}
