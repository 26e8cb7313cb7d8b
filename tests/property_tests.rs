use biarith::{compress_to_vec, decompress_to_vec};
use proptest::prelude::*;

proptest! {
    #[test]
    fn test_forward_roundtrip(input in prop::collection::vec(any::<u8>(), 0..2000)) {
        let compressed = compress_to_vec(&input);
        prop_assert_eq!(decompress_to_vec(&compressed), input);
    }

    #[test]
    fn test_backward_roundtrip(stream in prop::collection::vec(any::<u8>(), 0..2000)) {
        // The bijection works in both directions: any byte sequence is a
        // valid compressed stream, and recompressing its expansion must
        // reproduce it exactly.
        let plain = decompress_to_vec(&stream);
        prop_assert_eq!(compress_to_vec(&plain), stream);
    }

    #[test]
    fn test_deterministic_output(input in prop::collection::vec(any::<u8>(), 0..500)) {
        prop_assert_eq!(compress_to_vec(&input), compress_to_vec(&input));
    }

    #[test]
    fn test_low_entropy_roundtrip(
        byte in any::<u8>(),
        len in 0usize..4096,
    ) {
        // Long constant runs drive the model to its most skewed state and
        // exercise the carry and renormalisation paths hard.
        let input = vec![byte; len];
        let compressed = compress_to_vec(&input);
        prop_assert!(compressed.len() <= input.len() + 2);
        prop_assert_eq!(decompress_to_vec(&compressed), input);
    }

    #[test]
    fn test_skewed_alphabet_roundtrip(
        input in prop::collection::vec(prop_oneof![
            40 => Just(0u8),
            10 => Just(0xFFu8),
            5 => Just(0x37u8),
            1 => any::<u8>(),
        ], 0..3000)
    ) {
        let compressed = compress_to_vec(&input);
        prop_assert_eq!(decompress_to_vec(&compressed), input);
    }
}
