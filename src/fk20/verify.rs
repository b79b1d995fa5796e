use crate::domain::Domain;
use crate::errors::{KzgError, Result};
use crate::kzg::srs::SRS;
use crate::msm::msm;
use crate::util::{bit_reverse, is_positive_power_of_two, log2_pow2, reverse_bits};
use ark_ec::pairing::Pairing;
use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::{Field, One, Zero};
use std::iter::successors;
use std::ops::{Mul, Neg};
use tracing::debug;

/// Checks single-cell proofs produced by [`super::FK20`].
///
/// A proof `π` for cell `k` holds iff
/// `e(C - [I(τ)], G2) = e(π, [τ^ℓ - η_k^ℓ]G2)` where `I` interpolates the cell
/// on its coset `η_k ⟨ω_ℓ⟩`.
#[derive(Clone, Debug)]
pub struct CellVerifierKey<E: Pairing> {
    /// [τ^0]G1, ..., [τ^{ℓ-1}]G1
    pub g1_powers: Vec<E::G1Affine>,
    pub g2: E::G2Affine,
    /// [τ^ℓ]G2
    pub tau_pow_cell_g2: E::G2Affine,
    cell_domain: Domain<E::ScalarField>,
    /// ω_M
    extended_generator: E::ScalarField,
    num_cells: usize,
}

impl<E: Pairing> CellVerifierKey<E> {
    pub fn new(srs: &SRS<E>, num_points_to_open: usize, cell_size: usize) -> Result<Self> {
        is_positive_power_of_two("evaluation set size", cell_size)?;
        is_positive_power_of_two("number of points to open", num_points_to_open)?;
        if cell_size > num_points_to_open {
            return Err(KzgError::InvalidConfig(format!(
                "cell size {cell_size} exceeds {num_points_to_open} points"
            )));
        }
        if srs.powers_of_g.len() < cell_size {
            return Err(KzgError::SrsTooSmall {
                required: cell_size,
                available: srs.powers_of_g.len(),
            });
        }
        let tau_pow_cell_g2 = *srs.powers_of_h.get(cell_size).ok_or(KzgError::SrsTooSmall {
            required: cell_size + 1,
            available: srs.powers_of_h.len(),
        })?;

        let cell_domain = Domain::new(cell_size)?;
        let extended_generator = Domain::<E::ScalarField>::new(num_points_to_open)?.generator();
        Ok(CellVerifierKey {
            g1_powers: srs.powers_of_g[..cell_size].to_vec(),
            g2: srs.powers_of_h[0],
            tau_pow_cell_g2,
            cell_domain,
            extended_generator,
            num_cells: num_points_to_open / cell_size,
        })
    }

    pub fn cell_size(&self) -> usize {
        self.cell_domain.size()
    }

    pub fn num_cells(&self) -> usize {
        self.num_cells
    }

    /// The coset shift η_k of cell `k`.
    fn coset_shift(&self, cell_index: usize) -> E::ScalarField {
        let exponent = reverse_bits(cell_index, log2_pow2(self.num_cells));
        self.extended_generator.pow([exponent as u64])
    }

    /// Coefficients of the polynomial of degree < ℓ matching `cell` on the
    /// coset of `cell_index`.
    fn interpolate(
        &self,
        cell_index: usize,
        cell: &[E::ScalarField],
    ) -> Result<Vec<E::ScalarField>> {
        // cell entries sit at η ω_ℓ^{rev(i)}
        let mut coeffs = cell.to_vec();
        bit_reverse(&mut coeffs)?;
        self.cell_domain.ifft(&mut coeffs)?;

        // g(X) interpolates over ⟨ω_ℓ⟩, so I(X) = g(X / η)
        let eta_inv = self
            .coset_shift(cell_index)
            .inverse()
            .ok_or_else(|| KzgError::InvalidConfig("coset shift is zero".into()))?;
        for (coeff, power) in coeffs
            .iter_mut()
            .zip(successors(Some(E::ScalarField::one()), |prev| Some(*prev * eta_inv)))
        {
            *coeff *= power;
        }
        Ok(coeffs)
    }

    pub fn verify_cell(
        &self,
        commitment: &E::G1Affine,
        cell_index: usize,
        cell: &[E::ScalarField],
        proof: &E::G1Affine,
    ) -> Result<()> {
        if cell_index >= self.num_cells {
            return Err(KzgError::InvalidBlockIndex {
                index: cell_index,
                num_blocks: self.num_cells,
            });
        }
        if cell.len() != self.cell_size() {
            return Err(KzgError::LengthMismatch {
                expected: self.cell_size(),
                got: cell.len(),
            });
        }

        let interpolant = self.interpolate(cell_index, cell)?;
        let interpolant_commitment = msm::<E::G1>(&interpolant, &self.g1_powers, 0)?;
        let eta_pow_cell = self.coset_shift(cell_index).pow([self.cell_size() as u64]);

        let lhs = (commitment.into_group() - interpolant_commitment).into_affine();
        let rhs = (self.tau_pow_cell_g2.into_group() - self.g2.mul(eta_pow_cell)).into_affine();
        let neg_g2 = self.g2.into_group().neg().into_affine();
        let product = E::multi_pairing([lhs, *proof], [neg_g2, rhs]);
        if !product.is_zero() {
            debug!(cell_index, "cell proof pairing check failed");
            return Err(KzgError::VerificationFailed);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constant_curve::{G1Affine, ScalarField, E, G1};
    use crate::fk20::FK20;
    use ark_std::{test_rng, UniformRand};

    type F = ScalarField;

    struct Fixture {
        key: CellVerifierKey<E>,
        commitment: G1Affine,
        cells: Vec<Vec<F>>,
        proofs: Vec<G1Affine>,
    }

    fn fixture(n: usize, m: usize, ell: usize) -> Fixture {
        let mut rng = test_rng();
        let srs: SRS<E> = SRS::setup(n, ell + 1, &mut rng);
        let fk = FK20::<G1>::new(&srs.powers_of_g, m, ell).unwrap();
        let poly: Vec<F> = (0..n).map(|_| F::rand(&mut rng)).collect();
        Fixture {
            key: CellVerifierKey::new(&srs, m, ell).unwrap(),
            commitment: fk.commit(&poly).unwrap(),
            cells: fk.compute_evaluation_set(&poly).unwrap(),
            proofs: fk.compute_multi_open_proof(&poly).unwrap(),
        }
    }

    #[test]
    fn test_every_cell_verifies() {
        let f = fixture(16, 64, 4);
        assert_eq!(f.key.num_cells(), 16);
        for (k, (cell, proof)) in f.cells.iter().zip(&f.proofs).enumerate() {
            assert!(f.key.verify_cell(&f.commitment, k, cell, proof).is_ok());
        }
    }

    #[test]
    fn test_tampered_cells_fail() {
        let f = fixture(8, 16, 2);

        let mut cell = f.cells[3].clone();
        cell[1] += F::from(1u64);
        assert!(matches!(
            f.key.verify_cell(&f.commitment, 3, &cell, &f.proofs[3]),
            Err(KzgError::VerificationFailed)
        ));
        // proof of another cell
        assert!(matches!(
            f.key.verify_cell(&f.commitment, 3, &f.cells[3], &f.proofs[4]),
            Err(KzgError::VerificationFailed)
        ));
        // right data, wrong position
        assert!(matches!(
            f.key.verify_cell(&f.commitment, 4, &f.cells[3], &f.proofs[3]),
            Err(KzgError::VerificationFailed)
        ));
    }

    #[test]
    fn test_malformed_inputs() {
        let f = fixture(8, 16, 2);
        assert!(matches!(
            f.key.verify_cell(&f.commitment, 8, &f.cells[0], &f.proofs[0]),
            Err(KzgError::InvalidBlockIndex { index: 8, num_blocks: 8 })
        ));
        assert!(matches!(
            f.key.verify_cell(&f.commitment, 0, &f.cells[0][..1], &f.proofs[0]),
            Err(KzgError::LengthMismatch { expected: 2, got: 1 })
        ));

        let srs: SRS<E> = SRS::setup(8, 2, &mut test_rng());
        assert!(matches!(
            CellVerifierKey::new(&srs, 16, 4),
            Err(KzgError::SrsTooSmall { required: 5, available: 2 })
        ));
    }
}
