//! Whole-stream compression and decompression of byte streams.
//!
//! These drivers wire the three layers together: an order-0 adaptive model
//! over the 256 byte values, the arithmetic coder, and the finitely-odd
//! byte layer, with the wire constants fixed so that independently built
//! encoders and decoders interoperate.

use std::io::{Read, Write};

use crate::coder::{Decoder, Encoder};
use crate::error::Result;
use crate::fobits::{FoBitReader, FoBitWriter, DEFAULT_BLOCK_SIZE};
use crate::model::AdaptiveModel;

const NUM_SYMBOLS: usize = 256;

/// Compress `input` into `output`.
///
/// The output is a valid compressed stream for every input, including the
/// empty one (which compresses to an empty stream). Returns the number of
/// bytes consumed.
///
/// # Errors
///
/// Fails only on I/O errors from `input` or `output`.
pub fn compress<R: Read, W: Write>(input: R, output: W) -> Result<u64> {
    let mut model = AdaptiveModel::new(NUM_SYMBOLS);
    let mut encoder = Encoder::new(FoBitWriter::new(output, DEFAULT_BLOCK_SIZE));

    let mut consumed = 0u64;
    for byte in input.bytes() {
        let sym = byte? as usize;
        encoder.encode(&model, sym, true)?;
        model.update(sym);
        consumed += 1;
    }

    encoder.finish()?.finish()?;
    Ok(consumed)
}

/// Decompress `input` into `output`.
///
/// Every finite byte sequence decodes; there is no malformed input.
/// Returns the number of bytes produced.
///
/// # Errors
///
/// Fails only on I/O errors from `input` or `output`.
pub fn decompress<R: Read, W: Write>(input: R, mut output: W) -> Result<u64> {
    let mut model = AdaptiveModel::new(NUM_SYMBOLS);
    let mut decoder = Decoder::new(FoBitReader::new(input, DEFAULT_BLOCK_SIZE));

    let mut produced = 0u64;
    while let Some(sym) = decoder.decode(&model, true)? {
        output.write_all(&[sym as u8])?;
        model.update(sym);
        produced += 1;
    }

    output.flush()?;
    Ok(produced)
}

/// Compress a byte slice to a fresh vector.
pub fn compress_to_vec(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    compress(input, &mut out).expect("writing to a Vec cannot fail");
    out
}

/// Decompress a byte slice to a fresh vector.
pub fn decompress_to_vec(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    decompress(input, &mut out).expect("writing to a Vec cannot fail");
    out
}
