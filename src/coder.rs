//! The bijective arithmetic coder.
//!
//! ## Intuition first
//!
//! A conventional arithmetic coder narrows an interval of binary fractions
//! symbol by symbol and finally writes *some* number inside the interval,
//! together with an out-of-band length or an end-of-stream symbol. That
//! side channel is what stops it from being a bijection: many compressed
//! byte sequences decode to nothing at all.
//!
//! This coder transmits termination inside the code value itself. At every
//! symbol boundary where the stream could legitimately end, one number in
//! the current interval is reserved as the *free end*: the exact value the
//! encoder would emit if the stream stopped here. Free ends are chosen as
//! the most even binary fractions available (fewest significant bits), so
//! that stopping costs as little as possible, and successive reservations
//! walk through the interval in a canonical order. Because every finitely
//! odd bit sequence falls inside exactly one interval at exactly one depth,
//! the map from symbol sequences to code values is one-to-one and onto:
//! every byte sequence is a valid compressed stream.
//!
//! ## Mechanics
//!
//! The interval is `[low, low + range)` at 24 bits of working precision, a
//! 16-bit register plus 8 head bits. After each symbol the interval is
//! rescaled by the model's cumulative range and doubled until
//! `range > BIT16 / 2`; whenever 24 bits of `low` are resident the top 8
//! leave through the carry buffer. The free end doubles along with the
//! interval, its resolution mask `free_end_even` gaining one bit per
//! doubling and getting coarsened again whenever the candidate escapes the
//! interval.
//!
//! Carry propagation is the usual one for byte-at-a-time output: a byte
//! followed by a run of `0xFF` bytes cannot be written until the next head
//! byte shows whether the run overflows, so exactly one byte plus a run
//! length is always in flight.
//!
//! ## References
//!
//! - Witten, I. H., Neal, R. M., Cleary, J. G. (1987). "Arithmetic coding
//!   for data compression." CACM 30(6).
//! - Timmermans, M. (1999). Bijective arithmetic encoding, the scheme
//!   implemented here.

use std::io::{Read, Write};

use log::{debug, trace};

use crate::error::Result;
use crate::fobits::read_byte;
use crate::model::Model;

/// One past the top of the 16-bit coding register.
pub(crate) const BIT16: u32 = 0x1_0000;
/// Low 16 bits of the working register.
pub(crate) const MASK16: u32 = 0xFFFF;
/// Head bits threshold: when `low` holds this many bits, a byte leaves.
const FULL_BITS: u32 = 24;

/// Carry buffer for byte-at-a-time emission.
///
/// While a byte and its `0xFF` run are pending, a later carry can still
/// bump them; emission is deferred until the next byte resolves the
/// direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Carry {
    Empty,
    Pending { byte: u8, ff_run: u64 },
}

impl Carry {
    /// Feed the next head byte. `raw` is 9 bits: bit 8 set means the new
    /// byte arrived with a carry that must propagate into the pending run.
    fn push<W: Write>(&mut self, raw: u32, sink: &mut W) -> Result<()> {
        debug_assert!(raw < 0x200);
        *self = match *self {
            Carry::Empty => Carry::Pending {
                byte: raw as u8,
                ff_run: 0,
            },
            Carry::Pending { byte, ff_run } => {
                if raw >= 0x100 {
                    // The run overflows: pending byte gains one, the 0xFF
                    // run rolls over to zeros.
                    sink.write_all(&[byte.wrapping_add(1)])?;
                    for _ in 0..ff_run {
                        sink.write_all(&[0x00])?;
                    }
                    Carry::Pending {
                        byte: raw as u8,
                        ff_run: 0,
                    }
                } else if raw < 0xFF {
                    sink.write_all(&[byte])?;
                    for _ in 0..ff_run {
                        sink.write_all(&[0xFF])?;
                    }
                    Carry::Pending {
                        byte: raw as u8,
                        ff_run: 0,
                    }
                } else {
                    Carry::Pending {
                        byte,
                        ff_run: ff_run + 1,
                    }
                }
            }
        };
        Ok(())
    }

    fn is_pending(&self) -> bool {
        !matches!(self, Carry::Empty)
    }
}

/// Interval and free-end state shared by the encoder and decoder.
///
/// The decoder must retrace the encoder's interval arithmetic bit for bit,
/// so both sides drive this one implementation.
#[derive(Debug, Clone)]
struct Interval {
    /// Current interval is `[low, low + range)`.
    low: u32,
    range: u32,
    /// Bits of precision resident in `low`; 16 after every byte emission.
    interval_bits: u32,
    /// Low-order mask; free ends have all these bits clear.
    free_end_even: u32,
    /// Reserved terminator inside the interval, or 0 before the first
    /// reservation.
    next_free_end: u32,
}

impl Interval {
    fn new() -> Self {
        Self {
            low: 0,
            range: BIT16,
            interval_bits: 16,
            free_end_even: MASK16,
            next_free_end: 0,
        }
    }

    /// Reserve the next free end in canonical order: the first odd point at
    /// the current resolution, or the following one if a reservation
    /// already exists.
    fn reserve_free_end(&mut self) {
        self.next_free_end = if self.next_free_end == 0 {
            self.free_end_even + 1
        } else {
            self.next_free_end + ((self.free_end_even + 1) << 1)
        };
    }

    /// Smallest free-end candidate at or above `low` for the current mask.
    fn reseat_free_end(&mut self) {
        self.next_free_end =
            ((self.low + self.free_end_even) & !self.free_end_even) | (self.free_end_even + 1);
    }

    /// Coarsen the free-end resolution until the candidate fits the
    /// interval again. Terminates because `range > 0` and the mask
    /// strictly shrinks.
    fn cap_free_end(&mut self) {
        while self.next_free_end - self.low >= self.range {
            self.free_end_even >>= 1;
            self.reseat_free_end();
        }
    }

    /// Rescale the model's cumulative range onto the current interval and
    /// narrow. Returns the scaled offset of the new `low`.
    fn narrow(&mut self, lo: u32, hi: u32, prob_one: u32) -> u32 {
        debug_assert!(lo < hi && hi <= prob_one, "model returned an empty range");
        debug_assert!(prob_one <= crate::model::MAXP1);

        let new_l = lo * self.range / prob_one;
        let new_h = hi * self.range / prob_one;
        self.range = new_h - new_l;
        self.low += new_l;

        if self.next_free_end < self.low {
            self.reseat_free_end();
        }
        new_l
    }

    fn double(&mut self) {
        self.low += self.low;
        self.range += self.range;
        self.next_free_end += self.next_free_end;
        self.free_end_even += self.free_end_even + 1;
    }

    /// Detach the top 8 bits of `low` once 24 are resident. Returns the
    /// 9-bit head byte (bit 8 carries) to emit, if any.
    fn pop_head_byte(&mut self) -> Option<u32> {
        self.interval_bits += 1;
        if self.interval_bits < FULL_BITS {
            return None;
        }
        let top = self.low & !MASK16;
        self.low -= top;
        self.next_free_end -= top;
        self.free_end_even &= MASK16;
        self.interval_bits -= 8;
        Some(top >> 16)
    }

    fn needs_renorm(&self) -> bool {
        self.range <= BIT16 >> 1
    }

    #[cfg(debug_assertions)]
    fn check(&self) {
        debug_assert!(self.range > BIT16 >> 1, "interval not renormalised");
        if self.next_free_end != 0 {
            debug_assert!(
                self.low <= self.next_free_end
                    && self.next_free_end - self.low < self.range,
                "free end escaped the interval"
            );
            debug_assert_eq!(self.next_free_end & self.free_end_even, 0);
        }
    }

    #[cfg(not(debug_assertions))]
    fn check(&self) {}
}

/// Streaming encoder: symbols in, finitely-odd bytes out.
///
/// The byte sink is typically a [`crate::FoBitWriter`]; any [`Write`] works
/// for the raw coder-byte stream.
#[derive(Debug)]
pub struct Encoder<W: Write> {
    sink: W,
    interval: Interval,
    carry: Carry,
}

impl<W: Write> Encoder<W> {
    /// Create an encoder writing coder bytes to `sink`.
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            interval: Interval::new(),
            carry: Carry::Empty,
        }
    }

    /// Encode one symbol under `model`.
    ///
    /// `could_have_ended` marks positions where a terminator would be
    /// semantically valid; a free end is reserved there. For byte streams
    /// that is every symbol boundary.
    ///
    /// # Errors
    ///
    /// Fails only if the underlying sink fails.
    pub fn encode<M: Model>(
        &mut self,
        model: &M,
        symbol: usize,
        could_have_ended: bool,
    ) -> Result<()> {
        if could_have_ended {
            self.interval.reserve_free_end();
        }

        let (lo, hi) = model.sym_range(symbol);
        self.interval.narrow(lo, hi, model.prob_one());

        if self.interval.needs_renorm() {
            self.interval.double();
            self.interval.cap_free_end();
            loop {
                if let Some(head) = self.interval.pop_head_byte() {
                    self.carry.push(head, &mut self.sink)?;
                }
                if !self.interval.needs_renorm() {
                    break;
                }
                self.interval.double();
            }
        } else {
            self.interval.cap_free_end();
        }

        self.interval.check();
        Ok(())
    }

    /// Finish the stream by emitting the reserved free end, and return the
    /// sink.
    ///
    /// The free end's trailing zero bytes are withheld; they are the
    /// implicit tail of the finitely-odd output.
    ///
    /// # Errors
    ///
    /// Fails only if the underlying sink fails.
    pub fn finish(mut self) -> Result<W> {
        let mut tail = self.interval.next_free_end << (FULL_BITS - self.interval.interval_bits);
        trace!(
            "finishing stream, free end {:#x} at {} interval bits",
            tail,
            self.interval.interval_bits
        );

        while tail != 0 {
            self.carry.push(tail >> 16, &mut self.sink)?;
            tail = (tail & MASK16) << 8;
        }
        if self.carry.is_pending() {
            // Flush the held byte; the zero that replaces it is tail.
            self.carry.push(0, &mut self.sink)?;
        }
        Ok(self.sink)
    }
}

/// Streaming decoder: finitely-odd bytes in, symbols out.
///
/// The byte source is typically a [`crate::FoBitReader`]; reading past its
/// end yields the infinite zero tail.
#[derive(Debug)]
pub struct Decoder<R: Read> {
    source: R,
    interval: Interval,
    /// Code bits ahead of `low`, as a fixed-point offset; the live position
    /// is `low + (value >> value_shift)`.
    value: u32,
    value_shift: i32,
    /// Read-ahead pipeline: `follow_byte` is held back behind `follow_buf`
    /// pending zero bytes; negative once the source is exhausted.
    follow_byte: u8,
    follow_buf: i64,
}

impl<R: Read> Decoder<R> {
    /// Create a decoder reading coder bytes from `source`.
    pub fn new(source: R) -> Self {
        Self {
            source,
            interval: Interval::new(),
            value: 0,
            value_shift: -(FULL_BITS as i32),
            follow_byte: 0,
            follow_buf: 1,
        }
    }

    /// Decode one symbol under `model`, or `None` for end of stream.
    ///
    /// `can_end` marks positions where a terminator would be valid; end of
    /// stream is only ever reported at such a position, when the input is
    /// exhausted and the code value sits exactly on the reserved free end.
    ///
    /// # Errors
    ///
    /// Fails only if the underlying source fails.
    pub fn decode<M: Model>(&mut self, model: &M, can_end: bool) -> Result<Option<usize>> {
        self.refill()?;

        if can_end {
            if self.follow_buf < 0
                && ((self.interval.next_free_end - self.interval.low) << self.value_shift)
                    == self.value
            {
                debug!("stream terminator matched at free end");
                return Ok(None);
            }
            self.interval.reserve_free_end();
        }

        let prob_one = model.prob_one();
        let p = ((self.value >> self.value_shift) * prob_one + prob_one - 1) / self.interval.range;
        let (symbol, lo, hi) = model.symbol(p);

        let new_l = self.interval.narrow(lo, hi, prob_one);
        self.value -= new_l << self.value_shift;

        if self.interval.needs_renorm() {
            self.interval.double();
            self.value_shift -= 1;
            self.interval.cap_free_end();
            loop {
                self.interval.pop_head_byte();
                if !self.interval.needs_renorm() {
                    break;
                }
                self.interval.double();
                self.value_shift -= 1;
            }
        } else {
            self.interval.cap_free_end();
        }

        self.interval.check();
        Ok(Some(symbol))
    }

    /// Shift whole bytes into `value` until it leads `low` again.
    ///
    /// A zero byte from the source is not committed immediately: it may be
    /// the start of the infinite zero tail. The follow buffer releases it
    /// only once a later non-zero byte proves it was data; end of input
    /// instead parks `follow_buf` below zero for the end-of-stream test.
    fn refill(&mut self) -> Result<()> {
        while self.value_shift <= 0 {
            self.value <<= 8;
            self.value_shift += 8;

            self.follow_buf -= 1;
            if self.follow_buf == 0 {
                self.value |= u32::from(self.follow_byte);
                loop {
                    match read_byte(&mut self.source)? {
                        None => {
                            self.follow_buf = -1;
                            break;
                        }
                        Some(byte) => {
                            self.follow_buf += 1;
                            self.follow_byte = byte;
                            if byte != 0 {
                                break;
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AdaptiveModel;

    #[test]
    fn carry_flushes_on_small_byte() {
        let mut sink = Vec::new();
        let mut carry = Carry::Empty;
        carry.push(0x12, &mut sink).unwrap();
        assert!(sink.is_empty());
        carry.push(0x34, &mut sink).unwrap();
        assert_eq!(sink, vec![0x12]);
    }

    #[test]
    fn carry_run_extends_and_rolls_over() {
        let mut sink = Vec::new();
        let mut carry = Carry::Empty;
        carry.push(0x12, &mut sink).unwrap();
        carry.push(0xFF, &mut sink).unwrap();
        carry.push(0xFF, &mut sink).unwrap();
        assert!(sink.is_empty());
        // Carry arrives: the run of 0xFF becomes zeros and the held byte
        // gains one.
        carry.push(0x100 | 0x07, &mut sink).unwrap();
        assert_eq!(sink, vec![0x13, 0x00, 0x00]);
        assert_eq!(
            carry,
            Carry::Pending {
                byte: 0x07,
                ff_run: 0
            }
        );
    }

    #[test]
    fn carry_run_survives_without_carry() {
        let mut sink = Vec::new();
        let mut carry = Carry::Empty;
        carry.push(0x12, &mut sink).unwrap();
        carry.push(0xFF, &mut sink).unwrap();
        carry.push(0x00, &mut sink).unwrap();
        assert_eq!(sink, vec![0x12, 0xFF]);
    }

    #[test]
    fn empty_stream_encodes_to_nothing() {
        let encoder = Encoder::new(Vec::new());
        assert!(encoder.finish().unwrap().is_empty());
    }

    #[test]
    fn empty_stream_decodes_to_nothing() {
        let model = AdaptiveModel::new(256);
        let mut decoder = Decoder::new(&[][..]);
        assert_eq!(decoder.decode(&model, true).unwrap(), None);
    }

    #[test]
    fn coder_roundtrip_without_fo_layer() {
        // The coder-byte stream itself must round trip; the finitely-odd
        // layer is exercised separately.
        let input = b"the quick brown fox jumps over the lazy dog";

        let mut model = AdaptiveModel::new(256);
        let mut encoder = Encoder::new(Vec::new());
        for &b in input {
            encoder.encode(&model, b as usize, true).unwrap();
            model.update(b as usize);
        }
        let bytes = encoder.finish().unwrap();
        assert!(!bytes.is_empty());

        let mut model = AdaptiveModel::new(256);
        let mut decoder = Decoder::new(&bytes[..]);
        let mut output = Vec::new();
        while let Some(sym) = decoder.decode(&model, true).unwrap() {
            output.push(sym as u8);
            model.update(sym);
        }
        assert_eq!(output, input);
    }

    #[test]
    fn decode_is_total_on_coder_bytes() {
        // Any coder-byte stream decodes, and re-encoding the symbols
        // reproduces it up to the implicit zero tail.
        for stream in [&b"\x01"[..], b"ABC", b"\xff\xff\xff", b"\x80\x00\x01"] {
            let mut model = AdaptiveModel::new(256);
            let mut decoder = Decoder::new(stream);
            let mut symbols = Vec::new();
            while let Some(sym) = decoder.decode(&model, true).unwrap() {
                symbols.push(sym);
                model.update(sym);
            }

            let mut model = AdaptiveModel::new(256);
            let mut encoder = Encoder::new(Vec::new());
            for &sym in &symbols {
                encoder.encode(&model, sym, true).unwrap();
                model.update(sym);
            }
            let mut bytes = encoder.finish().unwrap();
            let mut expected = stream.to_vec();
            while bytes.last() == Some(&0) {
                bytes.pop();
            }
            while expected.last() == Some(&0) {
                expected.pop();
            }
            assert_eq!(bytes, expected, "stream {stream:02x?}");
        }
    }
}
