#![no_main]
use biarith::{compress_to_vec, decompress_to_vec};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Forward: any input compresses and decompresses to itself.
    let compressed = compress_to_vec(data);
    assert_eq!(decompress_to_vec(&compressed), data);

    // Backward: the same bytes treated as a compressed stream decode, and
    // recompressing reproduces them exactly.
    let plain = decompress_to_vec(data);
    assert_eq!(compress_to_vec(&plain), data);
});
