//! FK20: opening proofs for every cell of an extended evaluation domain in
//! one batched pass.
//!
//! Write `f(X) = sum_r X^r A_r(X^ℓ)` with `A_r(Y) = sum_j f_{jℓ+r} Y^j`. The
//! quotient of `f` by `X^ℓ - c` commits to `H(c) = sum_s c^s h_s` where
//!
//! ```text
//! h_s = sum_r sum_{j > s} f_{jℓ+r} [τ^{(j-1-s)ℓ + r}]
//! ```
//!
//! i.e. `h` is a sum of `ℓ` Toeplitz matrix-vector products over the SRS
//! strided by `ℓ`. Evaluating `H` over all `M/ℓ` values `c = η_k^ℓ` with one
//! G1 FFT yields every cell proof at once.
//!
//! Cells are taken in bit-reversed evaluation order: cell `k` holds the
//! evaluations at the coset `η_k ⟨ω_ℓ⟩` with `η_k = ω_M^{rev(k)}`, itself in
//! bit-reversed order.

mod toeplitz;
mod verify;

pub use toeplitz::BatchToeplitz;
pub use verify::CellVerifierKey;

use crate::domain::Domain;
use crate::errors::{KzgError, Result};
use crate::msm::fixed_base::DEFAULT_FIXED_BASE_WINDOW;
use crate::msm::msm;
use crate::poly::polynomial::GeneralDensePolynomial;
use crate::util::{bit_reverse, is_positive_power_of_two};
use ark_ec::short_weierstrass::{Affine, Projective, SWCurveConfig};
use ark_ec::CurveGroup;
use ark_ff::Zero;
use ark_poly::domain::DomainCoeff;
use tracing::{debug, trace};

#[derive(Clone, Debug)]
pub struct FK20<P: SWCurveConfig> {
    /// monomial powers [τ^0], ..., [τ^{N-1}]
    srs: Vec<Affine<P>>,
    /// ℓ, the number of evaluations per cell
    cell_size: usize,
    toeplitz: BatchToeplitz<P>,
    /// size M/ℓ, one point per cell
    proof_domain: Domain<P::ScalarField>,
    /// size M
    extended_domain: Domain<P::ScalarField>,
}

impl<P: SWCurveConfig> FK20<P>
where
    Projective<P>: DomainCoeff<P::ScalarField>,
{
    /// `srs` bounds the polynomial length N; `num_points_to_open` is the
    /// extended domain size M and `eval_set_size` the cell size ℓ.
    pub fn new(srs: &[Affine<P>], num_points_to_open: usize, eval_set_size: usize) -> Result<Self> {
        Self::with_window_size(srs, num_points_to_open, eval_set_size, DEFAULT_FIXED_BASE_WINDOW)
    }

    pub fn with_window_size(
        srs: &[Affine<P>],
        num_points_to_open: usize,
        eval_set_size: usize,
        window: usize,
    ) -> Result<Self> {
        is_positive_power_of_two("evaluation set size", eval_set_size)?;
        is_positive_power_of_two("SRS length", srs.len())?;
        is_positive_power_of_two("number of points to open", num_points_to_open)?;
        let poly_len = srs.len();
        if eval_set_size > poly_len {
            return Err(KzgError::InvalidConfig(format!(
                "evaluation set size {eval_set_size} exceeds polynomial length {poly_len}"
            )));
        }
        if poly_len > num_points_to_open {
            return Err(KzgError::InvalidConfig(format!(
                "cannot open {num_points_to_open} points of a polynomial of length {poly_len}"
            )));
        }

        let num_blocks = poly_len / eval_set_size;
        let rows: Vec<Vec<Affine<P>>> = (0..eval_set_size)
            .map(|r| {
                (0..num_blocks - 1)
                    .map(|t| srs[t * eval_set_size + r])
                    .collect()
            })
            .collect();
        let toeplitz = BatchToeplitz::new(&rows, num_blocks, window)?;
        let proof_domain = Domain::new(num_points_to_open / eval_set_size)?;
        let extended_domain = Domain::new(num_points_to_open)?;

        debug!(
            poly_len,
            num_points_to_open,
            eval_set_size,
            window,
            "built FK20 tables"
        );

        Ok(FK20 {
            srs: srs.to_vec(),
            cell_size: eval_set_size,
            toeplitz,
            proof_domain,
            extended_domain,
        })
    }

    pub fn poly_len(&self) -> usize {
        self.srs.len()
    }

    pub fn cell_size(&self) -> usize {
        self.cell_size
    }

    pub fn num_cells(&self) -> usize {
        self.proof_domain.size()
    }

    pub fn num_points_to_open(&self) -> usize {
        self.extended_domain.size()
    }

    fn check_poly(&self, poly: &[P::ScalarField]) -> Result<()> {
        if poly.len() > self.poly_len() {
            return Err(KzgError::InvalidPolynomialSize {
                size: poly.len(),
                max: self.poly_len(),
            });
        }
        Ok(())
    }

    /// Commits to `poly` (coefficient form) with the monomial SRS.
    pub fn commit(&self, poly: &[P::ScalarField]) -> Result<Affine<P>> {
        self.check_poly(poly)?;
        let com = msm::<Projective<P>>(poly, &self.srs[..poly.len()], 0)?;
        Ok(com.into_affine())
    }

    /// One proof per cell, in cell order.
    pub fn compute_multi_open_proof(&self, poly: &[P::ScalarField]) -> Result<Vec<Affine<P>>> {
        self.check_poly(poly)?;
        let ell = self.cell_size;
        let num_blocks = self.poly_len() / ell;

        let mut coeffs = poly.to_vec();
        coeffs.resize(self.poly_len(), P::ScalarField::zero());
        // vectors[r][j] = f_{jℓ+r}
        let vectors: Vec<Vec<P::ScalarField>> = (0..ell)
            .map(|r| (0..num_blocks).map(|j| coeffs[j * ell + r]).collect())
            .collect();

        let mut h = self.toeplitz.sum_matrix_vector_mul(&vectors)?;
        h.resize(self.proof_domain.size(), Projective::zero());
        self.proof_domain.fft_g1(&mut h)?;
        bit_reverse(&mut h)?;

        trace!(num_proofs = h.len(), "computed FK20 proofs");
        Ok(Projective::normalize_batch(&h))
    }

    /// Evaluations of `poly` over the extended domain, bit-reversed and
    /// split into cells.
    pub fn compute_evaluation_set(
        &self,
        poly: &[P::ScalarField],
    ) -> Result<Vec<Vec<P::ScalarField>>> {
        self.check_poly(poly)?;
        let mut evals =
            GeneralDensePolynomial::<P::ScalarField, P::ScalarField>::from_coeff_slice(poly)
                .batch_evaluate_rou(&self.extended_domain)?;
        bit_reverse(&mut evals)?;
        Ok(evals.chunks(self.cell_size).map(<[_]>::to_vec).collect())
    }
}
