//! # Bijective Arithmetic Coding
//!
//! *An entropy codec in which every byte sequence is a valid compressed
//! stream.*
//!
//! ## Intuition First
//!
//! Ordinary compressors are injective but not surjective: most byte strings
//! are not the output of the compressor for any input, so a decompressor
//! handed arbitrary bytes must reject them, guess, or crash. A *bijective*
//! codec pairs up the set of finite byte sequences with itself, one-to-one
//! and onto. Compression and decompression become inverse permutations of
//! the same space: `decode(encode(s)) == s` and, less familiarly,
//! `encode(decode(t)) == t` for every `t`.
//!
//! What usually breaks the bijection is termination. A length prefix or an
//! end-of-stream symbol spends bits on a side channel, and the values that
//! side channel can never produce become unreachable outputs. This crate
//! removes the side channel: the arithmetic coder reserves a *free end*, a
//! single code value inside the current interval that means "the stream
//! stopped here", and keeps it valid as the interval narrows. Termination
//! costs asymptotically nothing and every output stays reachable.
//!
//! ## The Problem
//!
//! Arithmetic coding maps a symbol sequence to a subinterval of `[0, 1)`
//! and transmits a fraction inside it:
//!
//! ```text
//! [low, low + range)  →  narrowed by each symbol's probability mass
//! ```
//!
//! To make that a bijection on byte sequences three pieces are needed:
//!
//! 1. a one-to-one map between finite byte strings and *finitely odd* bit
//!    streams (infinite streams whose final 1 bit is at a finite position),
//! 2. a coder whose termination point is itself a finitely odd fraction
//!    reserved inside the interval (the free end),
//! 3. a probability model both sides can reproduce exactly.
//!
//! ## Historical Context
//!
//! ```text
//! 1976  Rissanen     Arithmetic coding reaches the entropy bound
//! 1987  Witten/Neal/Cleary   The practical incremental implementation
//! 1999  Timmermans   Free-end construction: bijective arithmetic coding
//! ```
//!
//! Interest in bijective coding came partly from cryptography (ciphertext
//! indistinguishability wants every string decodable) and partly from the
//! observation that any unreachable output is wasted code space.
//!
//! ## Implementation Notes
//!
//! The crate is layered bottom-up, each layer generic over the one below:
//!
//! - [`FoBitWriter`] / [`FoBitReader`] (`fobits`): the bijection between
//!   byte storage and finitely-odd streams, including the block
//!   reservation rule and the `0x80` end-marker collapse.
//! - [`Encoder`] / [`Decoder`] (`coder`): the 24-bit arithmetic coder with
//!   free-end bookkeeping and carry propagation.
//! - [`Model`] / [`AdaptiveModel`] (`model`): cumulative-frequency queries
//!   over a Fenwick-style heap with a recency-weighted sliding window.
//! - [`compress`] / [`decompress`] (`codec`): whole-stream drivers fixing
//!   the wire constants.
//!
//! The coder is single-threaded and deterministic: the same input always
//! produces bit-identical output.
//!
//! ## References
//!
//! - Witten, I. H., Neal, R. M., Cleary, J. G. (1987). "Arithmetic coding
//!   for data compression." Communications of the ACM 30(6).
//! - Timmermans, M. (1999). "Bijective arithmetic encoding with optimal end
//!   treatment."

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod coder;
pub mod error;
pub mod fobits;
pub mod model;

pub use codec::{compress, compress_to_vec, decompress, decompress_to_vec};
pub use coder::{Decoder, Encoder};
pub use error::Error;
pub use fobits::{FoBitReader, FoBitWriter, DEFAULT_BLOCK_SIZE, XOR_MASK};
pub use model::{AdaptiveModel, Model, MAXP1, WINDOW_SIZE};
