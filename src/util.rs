use crate::errors::{KzgError, Result};

pub fn is_positive_power_of_two(what: &'static str, size: usize) -> Result<()> {
    if size > 0 && (size & (size - 1)) == 0 {
        Ok(())
    } else {
        Err(KzgError::NotPowerOfTwo { what, size })
    }
}

/// Integer log2 of a power of two.
pub fn log2_pow2(n: usize) -> u32 {
    debug_assert!(n.is_power_of_two());
    n.trailing_zeros()
}

/// Reverses the lowest `bits` bits of `index`.
#[inline]
pub fn reverse_bits(index: usize, bits: u32) -> usize {
    if bits == 0 {
        0
    } else {
        index.reverse_bits() >> (usize::BITS - bits)
    }
}

/// Permutes `values` in place so that `values[i]` ends up holding the element
/// formerly at `reverse_bits(i, log2(len))`. Applying it twice is the identity.
pub fn bit_reverse<T>(values: &mut [T]) -> Result<()> {
    let n = values.len();
    if n <= 1 {
        return Ok(());
    }
    is_positive_power_of_two("bit-reversed slice length", n)?;
    bit_reverse_unchecked(values);
    Ok(())
}

pub(crate) fn bit_reverse_unchecked<T>(values: &mut [T]) {
    let n = values.len();
    if n <= 1 {
        return;
    }
    let bits = log2_pow2(n);
    for i in 0..n {
        let j = reverse_bits(i, bits);
        if i < j {
            values.swap(i, j);
        }
    }
}
