//! Multiplicative subgroups of roots of unity and the radix-2 transforms over them.
//!
//! All transforms run in place on a slice whose length must equal the domain
//! size. The forward transform is a decimation-in-time (Cooley-Tukey) pass over
//! bit-reversed input; the inverse is a decimation-in-frequency
//! (Gentleman-Sande) pass followed by a bit-reversal and a scaling by `n^{-1}`.
//! Both are iterative with explicit strides, so no intermediate buffers are
//! allocated.

use crate::errors::{KzgError, Result};
use crate::util::{bit_reverse_unchecked, is_positive_power_of_two, log2_pow2};
use ark_ff::{batch_inversion, FftField, Field};
use ark_poly::domain::DomainCoeff;
use rayon::prelude::*;
use std::iter::successors;
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Domain<F: FftField> {
    size: usize,
    log_size: u32,
    /// ω, of exact order `size`
    generator: F,
    generator_inv: F,
    size_inv: F,
    /// ω^0, ω^1, ..., ω^{n-1} in natural order
    roots: Vec<F>,
    /// fixed element outside every two-adic subgroup, used for coset transforms
    coset_shift: F,
    coset_shift_inv: F,
}

impl<F: FftField> Domain<F> {
    /// Builds the subgroup of size `size` from the field's primitive 2^s-th
    /// root of unity, squared s - log2(size) times.
    pub fn new(size: usize) -> Result<Self> {
        is_positive_power_of_two("domain size", size)?;
        let log_size = log2_pow2(size);
        if log_size > F::TWO_ADICITY {
            return Err(KzgError::DomainTooLarge {
                log_size,
                two_adicity: F::TWO_ADICITY,
            });
        }

        let generator = root_of_unity::<F>(log_size);
        // ω^{n-1} = ω^{-1}
        let generator_inv = generator.pow([size as u64 - 1]);
        let size_inv = F::from(size as u64)
            .inverse()
            .ok_or_else(|| KzgError::InvalidConfig("domain size is zero in the field".into()))?;
        let coset_shift = F::GENERATOR;
        let coset_shift_inv = coset_shift
            .inverse()
            .ok_or_else(|| KzgError::InvalidConfig("coset generator is zero".into()))?;

        let roots: Vec<F> = successors(Some(F::ONE), |prev| Some(*prev * generator))
            .take(size)
            .collect();

        debug!(size, log_size, "constructed evaluation domain");

        Ok(Domain {
            size,
            log_size,
            generator,
            generator_inv,
            size_inv,
            roots,
            coset_shift,
            coset_shift_inv,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn log_size(&self) -> u32 {
        self.log_size
    }

    pub fn generator(&self) -> F {
        self.generator
    }

    pub fn generator_inv(&self) -> F {
        self.generator_inv
    }

    pub fn size_inv(&self) -> F {
        self.size_inv
    }

    pub fn coset_shift(&self) -> F {
        self.coset_shift
    }

    /// The roots ω^i in natural order.
    pub fn roots(&self) -> &[F] {
        &self.roots
    }

    /// ω^i, with `i` taken modulo the domain size.
    pub fn element(&self, i: usize) -> F {
        self.roots[i % self.size]
    }

    /// Index `i` such that ω^i == point, if the point lies in the domain.
    pub fn find_root(&self, point: &F) -> Option<usize> {
        self.roots.iter().position(|root| root == point)
    }

    fn check_len(&self, len: usize) -> Result<()> {
        if len != self.size {
            return Err(KzgError::DomainMismatch {
                domain: self.size,
                got: len,
            });
        }
        Ok(())
    }

    #[inline]
    fn inverse_root(&self, i: usize) -> F {
        self.roots[(self.size - i) % self.size]
    }

    /// Coefficients to evaluations: values[i] becomes p(ω^i).
    pub fn fft<T: DomainCoeff<F>>(&self, values: &mut [T]) -> Result<()> {
        self.check_len(values.len())?;
        bit_reverse_unchecked(values);
        self.dit_layers(values);
        Ok(())
    }

    /// Evaluations to coefficients, inverse of [`Self::fft`].
    pub fn ifft<T: DomainCoeff<F>>(&self, values: &mut [T]) -> Result<()> {
        self.check_len(values.len())?;
        self.dif_inverse_layers(values);
        bit_reverse_unchecked(values);
        values.iter_mut().for_each(|v| *v *= self.size_inv);
        Ok(())
    }

    /// Evaluates on the shifted domain g·ω^i.
    pub fn coset_fft<T: DomainCoeff<F>>(&self, values: &mut [T]) -> Result<()> {
        self.check_len(values.len())?;
        scale_by_powers(values, self.coset_shift);
        self.fft(values)
    }

    /// Interpolates values given on the shifted domain g·ω^i.
    pub fn coset_ifft<T: DomainCoeff<F>>(&self, values: &mut [T]) -> Result<()> {
        self.ifft(values)?;
        scale_by_powers(values, self.coset_shift_inv);
        Ok(())
    }

    /// Parallel forward transform, meant for group elements where every
    /// butterfly is expensive.
    pub fn fft_g1<T: DomainCoeff<F>>(&self, values: &mut [T]) -> Result<()> {
        self.check_len(values.len())?;
        bit_reverse_unchecked(values);
        let n = values.len();
        let mut half = 1;
        while half < n {
            let stride = n / (2 * half);
            values.par_chunks_mut(2 * half).for_each(|chunk| {
                let (lo, hi) = chunk.split_at_mut(half);
                lo.par_iter_mut()
                    .zip(hi.par_iter_mut())
                    .enumerate()
                    .for_each(|(j, (a, b))| dit_butterfly(a, b, self.roots[j * stride]));
            });
            half <<= 1;
        }
        Ok(())
    }

    /// Parallel inverse transform over group elements.
    pub fn ifft_g1<T: DomainCoeff<F>>(&self, values: &mut [T]) -> Result<()> {
        self.check_len(values.len())?;
        let n = values.len();
        let mut half = n / 2;
        while half > 0 {
            let stride = n / (2 * half);
            values.par_chunks_mut(2 * half).for_each(|chunk| {
                let (lo, hi) = chunk.split_at_mut(half);
                lo.par_iter_mut()
                    .zip(hi.par_iter_mut())
                    .enumerate()
                    .for_each(|(j, (a, b))| dif_butterfly(a, b, self.inverse_root(j * stride)));
            });
            half >>= 1;
        }
        bit_reverse_unchecked(values);
        let size_inv = self.size_inv;
        values.par_iter_mut().for_each(|v| *v *= size_inv);
        Ok(())
    }

    fn dit_layers<T: DomainCoeff<F>>(&self, values: &mut [T]) {
        let n = values.len();
        let mut half = 1;
        while half < n {
            let stride = n / (2 * half);
            for chunk in values.chunks_mut(2 * half) {
                let (lo, hi) = chunk.split_at_mut(half);
                for (j, (a, b)) in lo.iter_mut().zip(hi.iter_mut()).enumerate() {
                    dit_butterfly(a, b, self.roots[j * stride]);
                }
            }
            half <<= 1;
        }
    }

    fn dif_inverse_layers<T: DomainCoeff<F>>(&self, values: &mut [T]) {
        let n = values.len();
        let mut half = n / 2;
        while half > 0 {
            let stride = n / (2 * half);
            for chunk in values.chunks_mut(2 * half) {
                let (lo, hi) = chunk.split_at_mut(half);
                for (j, (a, b)) in lo.iter_mut().zip(hi.iter_mut()).enumerate() {
                    dif_butterfly(a, b, self.inverse_root(j * stride));
                }
            }
            half >>= 1;
        }
    }

    /// Evaluates a polynomial given in evaluation form at an arbitrary point
    /// with the barycentric formula
    /// `p(z) = (z^n - 1)/n * sum_i p_i * ω^i / (z - ω^i)`.
    /// Points inside the domain are answered directly.
    pub fn evaluate_lagrange(&self, evaluations: &[F], point: F) -> Result<F> {
        self.check_len(evaluations.len())?;
        if let Some(i) = self.find_root(&point) {
            return Ok(evaluations[i]);
        }

        let mut denominators: Vec<F> = self.roots.iter().map(|root| point - root).collect();
        batch_inversion(&mut denominators);

        let sum: F = evaluations
            .iter()
            .zip(&self.roots)
            .zip(&denominators)
            .map(|((eval, root), inv)| *eval * root * inv)
            .sum();
        let factor = (point.pow([self.size as u64]) - F::ONE) * self.size_inv;
        Ok(sum * factor)
    }
}

/// Primitive 2^log_size-th root of unity; `log_size` must not exceed the
/// two-adicity.
fn root_of_unity<F: FftField>(log_size: u32) -> F {
    let mut root = F::TWO_ADIC_ROOT_OF_UNITY;
    for _ in log_size..F::TWO_ADICITY {
        root.square_in_place();
    }
    root
}

#[inline]
fn dit_butterfly<F: FftField, T: DomainCoeff<F>>(a: &mut T, b: &mut T, twiddle: F) {
    let mut t = *b;
    t *= twiddle;
    *b = *a - t;
    *a += t;
}

#[inline]
fn dif_butterfly<F: FftField, T: DomainCoeff<F>>(a: &mut T, b: &mut T, twiddle: F) {
    let sum = *a + *b;
    let mut diff = *a - *b;
    diff *= twiddle;
    *a = sum;
    *b = diff;
}

/// values[i] *= shift^i
fn scale_by_powers<F: FftField, T: DomainCoeff<F>>(values: &mut [T], shift: F) {
    let mut power = F::ONE;
    for v in values.iter_mut() {
        *v *= power;
        power *= shift;
    }
}
