//! Data generation utilities for testing.
//!
//! Every generator takes an explicit [`fastrand::Rng`], so a test that seeds its
//! generator with [`fastrand::Rng::with_seed`] is reproducible.

/// Generates `len` random bytes.
pub fn random_bytes(rng: &mut fastrand::Rng, len: usize) -> Vec<u8> {
    std::iter::repeat_with(|| rng.u8(..)).take(len).collect()
}

/// Generates `len` random bytes, each of which is zero with probability
/// `1 / zero_ratio`.
pub fn sparse_bytes(rng: &mut fastrand::Rng, len: usize, zero_ratio: u32) -> Vec<u8> {
    assert_ne!(zero_ratio, 0);
    std::iter::repeat_with(|| {
        if rng.u32(0..zero_ratio) == 0 {
            0
        } else {
            rng.u8(1..)
        }
    })
    .take(len)
    .collect()
}

/// Generates a random value of `width` bits (`1..=128`).
pub fn random_value(rng: &mut fastrand::Rng, width: usize) -> u128 {
    assert!((1..=128).contains(&width), "width {width} out of range");
    let value = rng.u128(..);
    if width == 128 {
        value
    } else {
        value & ((1u128 << width) - 1)
    }
}

/// Splits `total_bits` into random positive field widths of at most
/// `max_width` bits each.
pub fn random_layout(rng: &mut fastrand::Rng, total_bits: usize, max_width: usize) -> Vec<usize> {
    assert_ne!(total_bits, 0);
    assert_ne!(max_width, 0);
    let mut widths = Vec::new();
    let mut remaining = total_bits;
    while remaining > 0 {
        let width = rng.usize(1..=max_width.min(remaining));
        widths.push(width);
        remaining -= width;
    }
    widths
}
