//! Probability models for the arithmetic coder.
//!
//! A model maps symbols to sub-ranges of a cumulative frequency line
//! `[0, prob_one())` and back. The coder narrows its interval by these
//! ranges, so for the encoder and decoder to agree the model must answer
//! identically on both sides at every step; adaptive models therefore
//! update only through explicit [`AdaptiveModel::update`] calls driven by
//! the symbol stream itself.
//!
//! The supplied [`AdaptiveModel`] keeps cumulative counts in a complete
//! binary heap (a Fenwick-style layout with the leaves in the upper half of
//! the array), giving `O(log N)` range queries and point updates, and
//! estimates frequencies over a sliding window of the last 4096 symbols.
//! The window is split into four zones of 1024 slots weighted 6, 4, 3 and 2
//! from newest to oldest, a coarse triangular kernel that lets recent
//! context dominate without forgetting the rest of the window.

/// Upper bound on a model's total cumulative frequency.
///
/// Chosen so `range * prob_one()` stays within 32 bits in the coder's
/// narrowing arithmetic.
pub const MAXP1: u32 = 0x8000;

/// Number of symbols remembered by [`AdaptiveModel`].
pub const WINDOW_SIZE: usize = 4096;

const ZONE_SIZE: usize = WINDOW_SIZE / 4;

/// Cumulative probability queries used by the coder.
///
/// Implementations must be total for symbols in `[0, N)` and keep
/// `0 < prob_one() <= MAXP1` at all times; the coder treats violations as
/// bugs, not recoverable errors.
pub trait Model {
    /// Current total cumulative frequency.
    fn prob_one(&self) -> u32;

    /// Cumulative range `[low, high)` for `symbol`, with
    /// `0 <= low < high <= prob_one()`.
    fn sym_range(&self, symbol: usize) -> (u32, u32);

    /// The symbol whose range contains `p`, along with that range.
    /// `p` must satisfy `p < prob_one()`.
    fn symbol(&self, p: u32) -> (usize, u32, u32);
}

/// Recency-weighted adaptive model over a fixed symbol alphabet.
///
/// Every symbol keeps a permanent floor count of 1, so no range is ever
/// empty and the model stays total even for symbols never seen.
#[derive(Debug, Clone)]
pub struct AdaptiveModel {
    /// Heap of cumulative counts; `heap[1]` is the total, leaves start at
    /// `leaf_base`.
    heap: Vec<u32>,
    /// Smallest power of two >= the alphabet size.
    leaf_base: usize,
    /// Sliding window of recent symbols, `-1` marking empty slots.
    window: Vec<i32>,
    w0: usize,
    w1: usize,
    w2: usize,
    w3: usize,
}

impl AdaptiveModel {
    /// Create a model over `num_symbols` symbols, each starting with a
    /// count of 1.
    ///
    /// # Panics
    ///
    /// Panics if `num_symbols` is 0 or large enough that the initial floor
    /// counts alone would exceed [`MAXP1`].
    pub fn new(num_symbols: usize) -> Self {
        assert!(num_symbols > 0, "model needs at least one symbol");
        let leaf_base = num_symbols.next_power_of_two();
        assert!(
            num_symbols as u32 + (WINDOW_SIZE as u32 / 4) * (6 + 4 + 3 + 2) <= MAXP1,
            "alphabet too large for the cumulative frequency bound"
        );

        let mut model = Self {
            heap: vec![0; leaf_base * 2],
            leaf_base,
            window: vec![-1; WINDOW_SIZE],
            w0: 0,
            w1: ZONE_SIZE,
            w2: 2 * ZONE_SIZE,
            w3: 3 * ZONE_SIZE,
        };
        for sym in 0..num_symbols {
            model.add(sym, 1);
        }
        model
    }

    /// Record `symbol` as the newest in the window, shifting every zone by
    /// one slot. The weight transfer is 6 for a symbol entering, then -2,
    /// -1, -1 as it ages across zone boundaries and -2 when it finally
    /// leaves the window.
    pub fn update(&mut self, symbol: usize) {
        debug_assert!(symbol + self.leaf_base < self.heap.len());

        self.w1 = Self::step_back(self.w1);
        if self.window[self.w1] >= 0 {
            self.sub(self.window[self.w1] as usize, 2);
        }
        self.w2 = Self::step_back(self.w2);
        if self.window[self.w2] >= 0 {
            self.sub(self.window[self.w2] as usize, 1);
        }
        self.w3 = Self::step_back(self.w3);
        if self.window[self.w3] >= 0 {
            self.sub(self.window[self.w3] as usize, 1);
        }
        self.w0 = Self::step_back(self.w0);
        if self.window[self.w0] >= 0 {
            self.sub(self.window[self.w0] as usize, 2);
        }

        self.window[self.w0] = symbol as i32;
        self.add(symbol, 6);
    }

    /// Forget all windowed history, leaving only the floor counts.
    pub fn reset(&mut self) {
        let zones = [
            (self.w0, self.w1, 6),
            (self.w1, self.w2, 4),
            (self.w2, self.w3, 3),
            (self.w3, self.w0, 2),
        ];
        for (start, end, weight) in zones {
            let mut w = start;
            while w != end {
                let sym = self.window[w];
                if sym < 0 {
                    return;
                }
                self.sub(sym as usize, weight);
                self.window[w] = -1;
                w = if w == WINDOW_SIZE - 1 { 0 } else { w + 1 };
            }
        }
    }

    fn step_back(w: usize) -> usize {
        if w == 0 {
            WINDOW_SIZE - 1
        } else {
            w - 1
        }
    }

    fn add(&mut self, symbol: usize, n: u32) {
        let mut i = symbol + self.leaf_base;
        while i > 0 {
            self.heap[i] += n;
            i >>= 1;
        }
    }

    fn sub(&mut self, symbol: usize, n: u32) {
        let mut i = symbol + self.leaf_base;
        while i > 0 {
            self.heap[i] -= n;
            i >>= 1;
        }
    }
}

impl Model for AdaptiveModel {
    fn prob_one(&self) -> u32 {
        self.heap[1]
    }

    fn sym_range(&self, symbol: usize) -> (u32, u32) {
        let mut bit = self.leaf_base;
        let mut i = 1;
        let mut low = 0;
        while i < self.leaf_base {
            bit >>= 1;
            i += i;
            if symbol & bit != 0 {
                low += self.heap[i];
                i += 1;
            }
        }
        (low, low + self.heap[i])
    }

    fn symbol(&self, p: u32) -> (usize, u32, u32) {
        debug_assert!(p < self.prob_one(), "probability point out of range");
        let mut i = 1;
        let mut low = 0;
        while i < self.leaf_base {
            i += i;
            if p - low >= self.heap[i] {
                low += self.heap[i];
                i += 1;
            }
        }
        (i - self.leaf_base, low, low + self.heap[i])
    }
}
