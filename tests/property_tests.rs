//! Property-based tests for the window codec.
//!
//! These tests verify mathematical invariants that must hold for all inputs,
//! using proptest to generate random test cases.

use std::sync::OnceLock;

use enumz::{
    bits_required, multinomial_bits, rank, unrank, BigUint, BinomialCache, CodecConfig,
    PresenceCoding, PresenceSet, WindowCompressor, WindowDecompressor, WindowTransform,
};
use proptest::prelude::*;

/// Largest window used by these tests; one shared cache covers all of them.
const MAX_TEST_WINDOW: usize = 512;

fn cache() -> &'static BinomialCache {
    static CACHE: OnceLock<BinomialCache> = OnceLock::new();
    CACHE.get_or_init(|| BinomialCache::for_window(MAX_TEST_WINDOW))
}

/// Mostly zeros with roughly 30% random bytes.
fn sparse_window(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(
        (0u8..10, any::<u8>()).prop_map(|(roll, value)| if roll > 6 { value } else { 0 }),
        0..=max_len,
    )
}

/// Uniformly random bytes, close to the full alphabet for long windows.
fn dense_window(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(any::<u8>(), 0..=max_len)
}

/// Four-letter alphabet, like a genome.
fn nucleotide_window(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(
        proptest::sample::select(vec![b'A', b'C', b'G', b'T']),
        0..=max_len,
    )
}

fn coding() -> impl Strategy<Value = PresenceCoding> {
    prop_oneof![Just(PresenceCoding::Static), Just(PresenceCoding::Delta)]
}

fn presence_of(window: &[u8]) -> PresenceSet {
    window.iter().copied().collect()
}

fn round_trip(windows: &[Vec<u8>], config: &CodecConfig) -> Result<(), TestCaseError> {
    let mut compressor = WindowCompressor::new(cache(), config)?;
    let mut decompressor = WindowDecompressor::new(cache(), config)?;
    for window in windows {
        let compressed = compressor.process(window)?;
        let restored = decompressor.process(&compressed)?;
        prop_assert_eq!(&restored, window, "roundtrip must preserve data");
    }
    Ok(())
}

/// Multiplicative formula, independent of the cache.
fn exact_binomial(n: usize, k: usize) -> BigUint {
    if k > n {
        return BigUint::from(0u32);
    }
    let k = k.min(n - k);
    let mut acc = BigUint::from(1u32);
    for i in 0..k {
        acc = acc * BigUint::from(n - i) / BigUint::from(i + 1);
    }
    acc
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // =======================================================================
    // ROUNDTRIP INVARIANT: decompress(compress(x)) == x
    // =======================================================================

    #[test]
    fn roundtrip_sparse_windows(window in sparse_window(MAX_TEST_WINDOW), coding in coding()) {
        let config = CodecConfig::new(MAX_TEST_WINDOW).with_presence_coding(coding);
        round_trip(&[window], &config)?;
    }

    #[test]
    fn roundtrip_dense_windows(window in dense_window(MAX_TEST_WINDOW), coding in coding()) {
        let config = CodecConfig::new(MAX_TEST_WINDOW).with_presence_coding(coding);
        round_trip(&[window], &config)?;
    }

    #[test]
    fn roundtrip_nucleotide_windows(window in nucleotide_window(MAX_TEST_WINDOW)) {
        round_trip(&[window], &CodecConfig::new(MAX_TEST_WINDOW))?;
    }

    #[test]
    fn roundtrip_window_sequences(
        windows in proptest::collection::vec(sparse_window(96), 1..10),
        coding in coding(),
    ) {
        let config = CodecConfig::new(96).with_presence_coding(coding);
        round_trip(&windows, &config)?;
    }

    // =======================================================================
    // RANK / UNRANK: inverse bijection onto [0, C(n, k))
    // =======================================================================

    #[test]
    fn unrank_then_rank_is_identity(
        (n, k, seed) in (0usize..300).prop_flat_map(|n| {
            (Just(n), 0..=n, proptest::collection::vec(any::<u8>(), 0..48))
        })
    ) {
        let index = BigUint::from_bytes_be(&seed) % cache().get(n, k);
        let positions = unrank(cache(), &index, k, n)?;

        prop_assert_eq!(positions.len(), k);
        prop_assert!(positions.windows(2).all(|w| w[0] < w[1]), "must be ascending");
        prop_assert!(positions.iter().all(|&p| p < n), "must stay in the domain");
        prop_assert_eq!(rank(cache(), &positions), index);
    }

    #[test]
    fn rank_then_unrank_is_identity(
        (n, set) in (1usize..300).prop_flat_map(|n| {
            (Just(n), proptest::collection::btree_set(0..n, 0..=(n / 2).min(60)))
        })
    ) {
        let positions: Vec<usize> = set.into_iter().collect();
        let index = rank(cache(), &positions);

        prop_assert!(&index < cache().get(n, positions.len()));
        prop_assert_eq!(unrank(cache(), &index, positions.len(), n)?, positions);
    }

    #[test]
    fn binomial_matches_multiplicative_formula(n in 0usize..=MAX_TEST_WINDOW, k in 0usize..520) {
        prop_assert_eq!(cache().get(n, k), &exact_binomial(n, k));
    }

    // =======================================================================
    // DELTA PRESENCE: carry follows the true presence set of every window
    // =======================================================================

    #[test]
    fn delta_carry_tracks_each_window(windows in proptest::collection::vec(sparse_window(64), 1..12)) {
        let config = CodecConfig::new(64).with_presence_coding(PresenceCoding::Delta);
        let mut compressor = WindowCompressor::new(cache(), &config)?;
        let mut decompressor = WindowDecompressor::new(cache(), &config)?;

        for window in &windows {
            let truth = presence_of(window);
            let compressed = compressor.process(window)?;
            prop_assert_eq!(compressor.presence().carry(), &truth);

            let restored = decompressor.process(&compressed)?;
            prop_assert_eq!(decompressor.presence().carry(), &truth);
            prop_assert_eq!(presence_of(&restored), truth);
        }
    }

    // =======================================================================
    // SIZE BOUNDS
    // =======================================================================

    #[test]
    fn compressed_size_is_bounded(window in dense_window(MAX_TEST_WINDOW), coding in coding()) {
        let config = CodecConfig::new(MAX_TEST_WINDOW).with_presence_coding(coding);
        let mut compressor = WindowCompressor::new(cache(), &config)?;
        let compressed_bits = compressor.process(&window)?.len() * 8;

        let mut counts = [0u64; 256];
        for &byte in &window {
            counts[usize::from(byte)] += 1;
        }
        let present = counts.iter().filter(|&&c| c > 0).count();

        // Every index field is at least log2 C(remaining, k) bits wide.
        prop_assert!(compressed_bits as f64 + 1e-6 >= multinomial_bits(&counts));

        // Header: flag, length, presence (<= 9 + 257 bits), k width; then at
        // most one extra bit per index field plus its k field, plus padding.
        let length_bits = bits_required(MAX_TEST_WINDOW) as usize;
        let k_bits = bits_required(window.len()) as usize;
        let overhead = 1 + length_bits + 9 + 257 + k_bits + present * (1 + k_bits) + 7;
        prop_assert!(
            compressed_bits <= window.len() * 8 + overhead,
            "{} bits for a {}-byte window",
            compressed_bits,
            window.len()
        );
    }

    // =======================================================================
    // EDGE CASES
    // =======================================================================

    #[test]
    fn roundtrip_boundary_lengths(nominal in 1usize..=MAX_TEST_WINDOW, fill in any::<u8>(), coding in coding()) {
        let config = CodecConfig::new(nominal).with_presence_coding(coding);
        let windows: Vec<Vec<u8>> = [0, 1, 2, nominal]
            .into_iter()
            .filter(|&len| len <= nominal)
            .map(|len| (0..len).map(|i| fill.wrapping_add((i % 3) as u8)).collect())
            .collect();
        round_trip(&windows, &config)?;
    }

    #[test]
    fn single_value_windows_carry_no_payload(len in 1usize..=MAX_TEST_WINDOW, value in any::<u8>()) {
        let config = CodecConfig::new(MAX_TEST_WINDOW).with_presence_coding(PresenceCoding::Static);
        let mut compressor = WindowCompressor::new(cache(), &config)?;
        let compressed = compressor.process(&vec![value; len])?;

        // flag + length (short windows only) + 256 presence bits + k width.
        let length_bits = if len == MAX_TEST_WINDOW { 0 } else { bits_required(MAX_TEST_WINDOW) as usize };
        let header_bits = 1 + length_bits + 256 + bits_required(len) as usize;
        prop_assert_eq!(compressed.len(), header_bits.div_ceil(8));
    }

    // =======================================================================
    // DETERMINISM
    // =======================================================================

    #[test]
    fn compression_is_deterministic(window in sparse_window(MAX_TEST_WINDOW), coding in coding()) {
        let config = CodecConfig::new(MAX_TEST_WINDOW).with_presence_coding(coding);
        let first = WindowCompressor::new(cache(), &config)?.process(&window)?;
        let second = WindowCompressor::new(cache(), &config)?.process(&window)?;

        prop_assert_eq!(first, second, "compression must be deterministic");
    }
}

// =======================================================================
// KNOWN ANSWERS AND STATISTICAL TESTS (not proptest, but important)
// =======================================================================

#[test]
fn blocky_window_is_stable_across_runs() {
    let window: Vec<u8> = [13u8, 3, 230, 107]
        .iter()
        .flat_map(|&value| std::iter::repeat(value).take(32))
        .collect();
    let config = CodecConfig::new(128);

    let runs: Vec<Vec<u8>> = (0..5)
        .map(|_| {
            WindowCompressor::new(cache(), &config)
                .unwrap()
                .process(&window)
                .unwrap()
        })
        .collect();
    assert!(runs.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(runs[0].len(), 39);

    let mut decompressor = WindowDecompressor::new(cache(), &config).unwrap();
    assert_eq!(decompressor.process(&runs[0]).unwrap(), window);
}

#[test]
fn single_value_kilobyte_is_four_bytes() {
    let cache = BinomialCache::for_window(1024);
    let config = CodecConfig::new(1024);
    let mut compressor = WindowCompressor::new(&cache, &config).unwrap();
    assert_eq!(compressor.process(&[13u8; 1024]).unwrap(), vec![0x80, 0x41, 0xA0, 0x2C]);
}

#[test]
fn skewed_window_approaches_multinomial_bound() {
    // 90% 'a', the rest spread over a few values.
    let window: Vec<u8> = (0..MAX_TEST_WINDOW)
        .map(|i| match i % 20 {
            0 => b'b',
            7 => b'c',
            _ => b'a',
        })
        .collect();
    let mut counts = [0u64; 256];
    for &byte in &window {
        counts[usize::from(byte)] += 1;
    }
    let bound = multinomial_bits(&counts);

    let config = CodecConfig::new(MAX_TEST_WINDOW);
    let mut compressor = WindowCompressor::new(cache(), &config).unwrap();
    let compressed_bits = (compressor.process(&window).unwrap().len() * 8) as f64;

    println!("bound {bound:.1} bits, compressed {compressed_bits} bits");
    assert!(compressed_bits >= bound);
    // Header plus rounding stays under a hundred bits for three values.
    assert!(compressed_bits - bound < 100.0);
    assert!(compressed_bits < (window.len() * 8) as f64 / 4.0);
}
