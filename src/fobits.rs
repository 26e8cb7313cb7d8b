//! Finitely-odd bit streams over byte transports.
//!
//! A *finitely odd* bit stream is conceptually infinite, but its rightmost
//! 1 bit sits at a finite position; everything after is zero. Equivalently,
//! it is a binary fraction in `[0, 1)` with a terminating expansion. The
//! arithmetic coder in this crate produces and consumes such streams, and
//! this module supplies the bijection between them and plain finite byte
//! sequences on disk.
//!
//! [`FoBitWriter`] accepts coder bytes and emits storage bytes; [`FoBitReader`]
//! is its exact inverse, and reading past the end of storage yields the
//! infinite zero tail. Every finite byte sequence is a valid input to the
//! reader, so there is no malformed-stream failure mode at this layer.
//!
//! Emitted bytes are XORed with [`XOR_MASK`]. The coder hands over long runs
//! of zero bytes for low-entropy regions, and the mask keeps the on-disk
//! zero tail (which encodes termination) distinct from those data zeros.
//!
//! Output is grouped into blocks of `block_size` bytes (1 on the wire by
//! default). A block whose first byte has no low-order bits set and whose
//! remaining bytes are all zero cannot absorb a stream ending; the
//! `reserve0` flag tracks that state. When the writer finishes on a reserved
//! block, a pending `0x80` marker is dropped, and the reader synthesizes it
//! back on end of input. This collapse is what makes the byte map bijective.

use std::io::{self, Read, Write};

/// Mask applied to every stored byte.
pub const XOR_MASK: u8 = 0x37;

/// Block size used for the interchange format.
pub const DEFAULT_BLOCK_SIZE: usize = 1;

/// Pull a single byte, treating end-of-stream as `None`.
///
/// Retries on [`io::ErrorKind::Interrupted`] like the standard library's
/// buffered readers do.
pub(crate) fn read_byte<R: Read>(source: &mut R) -> io::Result<Option<u8>> {
    let mut byte = [0u8; 1];
    loop {
        match source.read(&mut byte) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(byte[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

/// Writer half of the finitely-odd byte bijection.
///
/// Accepts the coder's byte stream through [`io::Write`] and emits masked
/// bytes to the underlying sink. The trailing zero run of the input is
/// withheld until [`FoBitWriter::finish`] decides how much of it the block
/// reservation rule requires.
#[derive(Debug)]
pub struct FoBitWriter<W: Write> {
    base: W,
    block_size: usize,
    block_left: usize,
    /// First byte of the pending segment; only meaningful when `seg_size > 0`.
    seg_first: u8,
    /// Pending segment length: `seg_first` plus `seg_size - 1` zero bytes.
    seg_size: u64,
    reserve0: bool,
}

impl<W: Write> FoBitWriter<W> {
    /// Create a writer over `base`. `block_size` is clamped to at least 1.
    pub fn new(base: W, block_size: usize) -> Self {
        Self {
            base,
            block_size: block_size.max(1),
            block_left: 0,
            seg_first: 0,
            seg_size: 0,
            reserve0: false,
        }
    }

    fn put(&mut self, byte: u8) -> io::Result<()> {
        if self.seg_size == 0 {
            self.seg_first = byte;
            self.seg_size = 1;
        } else if byte == 0 {
            self.seg_size += 1;
        } else {
            self.flush_segment()?;
            self.seg_first = byte;
            self.seg_size = 1;
        }
        Ok(())
    }

    /// Emit the pending segment: its first byte, then its zero run. Only
    /// called once a non-zero successor proves the zeros are data, not tail.
    fn flush_segment(&mut self) -> io::Result<()> {
        if self.block_left == 0 {
            self.reserve0 = if self.reserve0 {
                self.seg_first & 0x7F == 0
            } else {
                self.seg_first == 0
            };
            self.block_left = self.block_size - 1;
        } else {
            self.reserve0 = self.reserve0 && self.seg_first == 0;
            self.block_left -= 1;
        }
        self.base.write_all(&[self.seg_first ^ XOR_MASK])?;

        for _ in 1..self.seg_size {
            if self.block_left == 0 {
                self.reserve0 = true;
                self.block_left = self.block_size - 1;
            } else {
                self.block_left -= 1;
            }
            self.base.write_all(&[XOR_MASK])?;
        }
        self.seg_size = 0;
        Ok(())
    }

    /// Finalize the stream and return the underlying sink.
    ///
    /// Pads the in-flight block, emits the pending segment head if the
    /// reservation rule needs it, and drops a reserved `0x80` end marker.
    /// The zero run of the final segment is never written; it becomes the
    /// implicit tail of the stored stream.
    pub fn finish(mut self) -> io::Result<W> {
        let mut seg_first = if self.seg_size == 0 { 0 } else { self.seg_first };
        loop {
            while self.block_left > 0 {
                self.reserve0 = self.reserve0 && seg_first == 0;
                self.base.write_all(&[seg_first ^ XOR_MASK])?;
                seg_first = 0;
                self.block_left -= 1;
            }
            if self.reserve0 {
                debug_assert!(seg_first != 0, "reserved block with no pending end marker");
                if seg_first != 0x80 {
                    self.reserve0 = false;
                    self.block_left = self.block_size;
                    continue;
                }
            } else if seg_first != 0 {
                self.block_left = self.block_size;
                continue;
            }
            break;
        }
        self.base.flush()?;
        Ok(self.base)
    }

    /// Access the underlying sink without finalizing.
    pub fn get_ref(&self) -> &W {
        &self.base
    }
}

impl<W: Write> Write for FoBitWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for &byte in buf {
            self.put(byte)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.base.flush()
    }
}

/// Reader half of the finitely-odd byte bijection.
///
/// Yields the coder's byte stream through [`io::Read`]. After the underlying
/// source is exhausted the reader completes the in-flight block with zeros,
/// synthesizes the `0x80` end marker for a reserved block, then reports end
/// of stream; callers wanting the infinite zero tail extend it themselves.
#[derive(Debug)]
pub struct FoBitReader<R: Read> {
    base: R,
    block_size: usize,
    block_left: usize,
    in_done: bool,
    reserve0: bool,
}

impl<R: Read> FoBitReader<R> {
    /// Create a reader over `base`. `block_size` is clamped to at least 1.
    pub fn new(base: R, block_size: usize) -> Self {
        Self {
            base,
            block_size: block_size.max(1),
            block_left: 0,
            in_done: false,
            reserve0: false,
        }
    }

    fn next(&mut self) -> io::Result<Option<u8>> {
        let byte = if self.in_done {
            0
        } else {
            match read_byte(&mut self.base)? {
                Some(b) => b ^ XOR_MASK,
                None => {
                    self.in_done = true;
                    0
                }
            }
        };

        if self.block_left > 0 {
            self.reserve0 = self.reserve0 && byte == 0;
            self.block_left -= 1;
            Ok(Some(byte))
        } else if self.in_done {
            if self.reserve0 {
                self.reserve0 = false;
                Ok(Some(0x80))
            } else {
                Ok(None)
            }
        } else {
            self.reserve0 = if self.reserve0 {
                byte & 0x7F == 0
            } else {
                byte == 0
            };
            self.block_left = self.block_size - 1;
            Ok(Some(byte))
        }
    }
}

impl<R: Read> Read for FoBitReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.next()? {
                Some(byte) => {
                    buf[filled] = byte;
                    filled += 1;
                }
                None => break,
            }
        }
        Ok(filled)
    }
}
