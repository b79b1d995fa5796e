//! Sums of Toeplitz matrix-vector products where every matrix is made of
//! fixed SRS points and every vector of scalars.
//!
//! An `m x m` upper-triangular Toeplitz matrix is embedded into a `2m x 2m`
//! circulant matrix whose first column is `c`. The circulant product is the
//! cyclic convolution `c * v = IFFT(FFT(c) ⊙ FFT(v))`. Because the transform is
//! linear, the sum over all matrices can be taken before the inverse
//! transform, so each of the `2m` output coordinates is one MSM of size
//! "number of matrices" against fixed bases `FFT(c_r)[k]`. Those MSMs use
//! precomputed fixed-base tables.

use crate::domain::Domain;
use crate::errors::{KzgError, Result};
use crate::msm::fixed_base::FixedBaseMsm;
use ark_ec::short_weierstrass::{Affine, Projective, SWCurveConfig};
use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::Zero;
use ark_poly::domain::DomainCoeff;
use rayon::prelude::*;

/// Circulant first column for the Toeplitz matrix `T[s][j] = row[j - s - 1]`
/// for `j > s` and zero otherwise. `row` has `m - 1` entries.
///
/// The column has length `2m`: zeros in `0..=m`, then `c[2m - 1 - t] = row[t]`.
pub(crate) fn circulant_column<T: Copy + Zero>(row: &[T], m: usize) -> Vec<T> {
    let mut column = vec![T::zero(); 2 * m];
    for (t, entry) in row.iter().enumerate() {
        column[2 * m - 1 - t] = *entry;
    }
    column
}

#[derive(Clone, Debug)]
pub struct BatchToeplitz<P: SWCurveConfig> {
    /// size m of each Toeplitz matrix
    matrix_size: usize,
    num_matrices: usize,
    circulant_domain: Domain<P::ScalarField>,
    /// one table per circulant coordinate, over the transformed columns
    /// of every matrix at that coordinate
    tables: Vec<FixedBaseMsm<P>>,
}

impl<P: SWCurveConfig> BatchToeplitz<P>
where
    Projective<P>: DomainCoeff<P::ScalarField>,
{
    /// `rows[r]` defines matrix `r` as in [`circulant_column`].
    pub fn new(rows: &[Vec<Affine<P>>], matrix_size: usize, window: usize) -> Result<Self> {
        if let Some(bad) = rows.iter().find(|row| row.len() + 1 != matrix_size) {
            return Err(KzgError::LengthMismatch {
                expected: matrix_size.saturating_sub(1),
                got: bad.len(),
            });
        }
        let circulant_domain = Domain::new(2 * matrix_size)?;

        let transformed: Vec<Vec<Affine<P>>> = rows
            .par_iter()
            .map(|row| {
                let projective: Vec<Projective<P>> = row.iter().map(|p| p.into_group()).collect();
                let mut column = circulant_column(&projective, matrix_size);
                circulant_domain.fft_g1(&mut column)?;
                Ok(Projective::normalize_batch(&column))
            })
            .collect::<Result<_>>()?;

        let tables = (0..2 * matrix_size)
            .into_par_iter()
            .map(|k| {
                let bases: Vec<Affine<P>> = transformed.iter().map(|column| column[k]).collect();
                FixedBaseMsm::new(&bases, window)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(BatchToeplitz {
            matrix_size,
            num_matrices: rows.len(),
            circulant_domain,
            tables,
        })
    }

    /// Computes `sum_r T_r · vectors[r]`, each vector of length m.
    pub fn sum_matrix_vector_mul(
        &self,
        vectors: &[Vec<P::ScalarField>],
    ) -> Result<Vec<Projective<P>>> {
        if vectors.len() != self.num_matrices {
            return Err(KzgError::LengthMismatch {
                expected: self.num_matrices,
                got: vectors.len(),
            });
        }
        let m = self.matrix_size;

        let transformed: Vec<Vec<P::ScalarField>> = vectors
            .par_iter()
            .map(|vector| {
                if vector.len() != m {
                    return Err(KzgError::LengthMismatch {
                        expected: m,
                        got: vector.len(),
                    });
                }
                let mut padded = vector.clone();
                padded.resize(2 * m, P::ScalarField::zero());
                self.circulant_domain.fft(&mut padded)?;
                Ok(padded)
            })
            .collect::<Result<_>>()?;

        let mut products = self
            .tables
            .par_iter()
            .enumerate()
            .map(|(k, table)| {
                let scalars: Vec<P::ScalarField> = transformed.iter().map(|v| v[k]).collect();
                table.msm(&scalars)
            })
            .collect::<Result<Vec<_>>>()?;

        self.circulant_domain.ifft_g1(&mut products)?;
        products.truncate(m);
        Ok(products)
    }
}
