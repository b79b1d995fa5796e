use super::batch_addition::multi_batch_add;
use super::{booth_digit, num_booth_windows};
use crate::errors::{KzgError, Result};
use ark_ec::short_weierstrass::{Affine, Projective, SWCurveConfig};
use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::{AdditiveGroup, PrimeField, Zero};
use rayon::prelude::*;
use tracing::debug;

pub const DEFAULT_FIXED_BASE_WINDOW: usize = 4;

/// Fixed-base MSM over a set of bases known in advance.
///
/// For every base `P` the table holds `1·P, 2·P, ..., 2^{w-1}·P`, which covers
/// every Booth digit magnitude; negative digits negate the looked-up point.
#[derive(Clone, Debug)]
pub struct FixedBaseMsm<P: SWCurveConfig> {
    window: usize,
    num_bases: usize,
    /// `table[j * 2^{w-1} + (k - 1)] = k * bases[j]`
    table: Vec<Affine<P>>,
}

impl<P: SWCurveConfig> FixedBaseMsm<P> {
    pub fn new(bases: &[Affine<P>], window: usize) -> Result<Self> {
        if !(2..=16).contains(&window) {
            return Err(KzgError::InvalidWindowSize(window));
        }
        let per_base = 1 << (window - 1);

        let multiples: Vec<Projective<P>> = bases
            .par_iter()
            .flat_map_iter(|base| {
                let base = base.into_group();
                std::iter::successors(Some(base), move |prev| Some(*prev + base)).take(per_base)
            })
            .collect();
        let table = Projective::normalize_batch(&multiples);

        debug!(num_bases = bases.len(), window, table_len = table.len(), "built fixed-base table");

        Ok(FixedBaseMsm {
            window,
            num_bases: bases.len(),
            table,
        })
    }

    pub fn num_bases(&self) -> usize {
        self.num_bases
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Computes `sum_j scalars[j] * bases[j]`.
    pub fn msm(&self, scalars: &[P::ScalarField]) -> Result<Projective<P>> {
        if scalars.len() != self.num_bases {
            return Err(KzgError::LengthMismatch {
                expected: self.num_bases,
                got: scalars.len(),
            });
        }
        let per_base = 1usize << (self.window - 1);
        let num_windows = num_booth_windows::<P::ScalarField>(self.window);
        let bigints: Vec<_> = scalars.iter().map(|s| s.into_bigint()).collect();

        // one set of looked-up multiples per window
        let window_points: Vec<Vec<Affine<P>>> = (0..num_windows)
            .map(|w| {
                bigints
                    .iter()
                    .enumerate()
                    .filter_map(|(j, bigint)| {
                        let digit = booth_digit(bigint.as_ref(), w, self.window);
                        let offset = (digit.unsigned_abs() as usize).checked_sub(1)?;
                        let entry = self.table[j * per_base + offset];
                        Some(if digit < 0 { -entry } else { entry })
                    })
                    .collect()
            })
            .collect();

        let window_sums = multi_batch_add(window_points);

        let mut acc = Projective::<P>::zero();
        for sum in window_sums.into_iter().rev() {
            for _ in 0..self.window {
                acc.double_in_place();
            }
            acc += sum;
        }
        Ok(acc)
    }
}
