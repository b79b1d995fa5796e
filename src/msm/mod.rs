//! Multi-scalar multiplication.
//!
//! - [`msm`]: variable-base Pippenger over Booth-encoded scalar digits,
//!   forked over contiguous chunks of the input.
//! - [`fixed_base`]: precomputed Booth tables for bases known ahead of time.
//! - [`batch_addition`]: affine summation with shared batch inversion.

pub mod batch_addition;
pub mod fixed_base;

use crate::errors::{KzgError, Result};
use ark_ec::CurveGroup;
use ark_ff::{PrimeField, Zero};
use rayon::prelude::*;
use tracing::trace;

/// Upper bound on the parallelism degree accepted by [`msm`].
pub const MAX_MSM_WORKERS: usize = 1024;

/// Computes `sum_i scalars[i] * bases[i]`.
///
/// `parallelism` is the number of contiguous chunks the input is split into;
/// zero or a negative value picks the rayon pool size.
pub fn msm<G: CurveGroup>(
    scalars: &[G::ScalarField],
    bases: &[G::Affine],
    parallelism: isize,
) -> Result<G> {
    if parallelism > MAX_MSM_WORKERS as isize {
        return Err(KzgError::TooManyWorkers {
            requested: parallelism,
            max: MAX_MSM_WORKERS,
        });
    }
    if scalars.len() != bases.len() {
        return Err(KzgError::LengthMismatch {
            expected: bases.len(),
            got: scalars.len(),
        });
    }
    if scalars.is_empty() {
        return Ok(G::zero());
    }

    let workers = if parallelism <= 0 {
        rayon::current_num_threads()
    } else {
        parallelism as usize
    };
    let chunk_size = scalars.len().div_ceil(workers);
    trace!(len = scalars.len(), workers, chunk_size, "msm");

    let result = scalars
        .par_chunks(chunk_size)
        .zip(bases.par_chunks(chunk_size))
        .map(|(s, b)| pippenger::<G>(s, b))
        .reduce(G::zero, |a, b| a + b);
    Ok(result)
}

fn window_size(len: usize) -> usize {
    if len < 32 {
        3
    } else {
        // roughly ln(len) + 2
        (len.ilog2() as usize * 69) / 100 + 2
    }
}

/// Number of `window`-bit Booth digits needed so that the top digit's sign
/// bit lies above the scalar's highest bit.
pub(crate) fn num_booth_windows<F: PrimeField>(window: usize) -> usize {
    F::MODULUS_BIT_SIZE as usize / window + 1
}

fn pippenger<G: CurveGroup>(scalars: &[G::ScalarField], bases: &[G::Affine]) -> G {
    let window = window_size(scalars.len());
    let num_windows = num_booth_windows::<G::ScalarField>(window);
    let bigints: Vec<_> = scalars.iter().map(|s| s.into_bigint()).collect();

    let window_sums: Vec<G> = (0..num_windows)
        .map(|w| {
            let mut buckets = vec![G::zero(); 1 << (window - 1)];
            for (bigint, base) in bigints.iter().zip(bases) {
                let digit = booth_digit(bigint.as_ref(), w, window);
                if digit > 0 {
                    buckets[(digit - 1) as usize] += *base;
                } else if digit < 0 {
                    buckets[(-digit - 1) as usize] -= *base;
                }
            }
            // sum_k (k + 1) * buckets[k]
            let mut running = G::zero();
            let mut sum = G::zero();
            for bucket in buckets.into_iter().rev() {
                running += bucket;
                sum += running;
            }
            sum
        })
        .collect();

    let mut acc = G::zero();
    for sum in window_sums.into_iter().rev() {
        for _ in 0..window {
            acc.double_in_place();
        }
        acc += sum;
    }
    acc
}

#[inline]
fn bit(limbs: &[u64], pos: usize) -> u64 {
    limbs.get(pos / 64).map_or(0, |limb| (limb >> (pos % 64)) & 1)
}

/// The `window_index`-th signed digit of the radix-2^w Booth recoding.
///
/// The digit reads the `w + 1` bits `b[iw-1 ..= iw+w-1]` (with `b[-1] = 0`),
/// overlapping its neighbour by one bit, and lies in `[-2^{w-1}, 2^{w-1}]`.
pub(crate) fn booth_digit(limbs: &[u64], window_index: usize, w: usize) -> i64 {
    let start = window_index * w;
    let mut slice = 0u64;
    for k in 0..=w {
        if start + k == 0 {
            continue;
        }
        slice |= bit(limbs, start + k - 1) << k;
    }
    let low = slice & ((1 << w) - 1);
    let magnitude = (low + (slice & 1)) >> 1;
    magnitude as i64 - (((slice >> w) & 1) << (w - 1)) as i64
}
