//! KZG commitments to polynomials in evaluation (Lagrange) form.
//!
//! - [`srs`]: setup parameters, commit key and opening key
//! - [`aggregate`]: folding many same-point openings into one proof

pub mod aggregate;
pub mod srs;

use crate::domain::Domain;
use crate::errors::{KzgError, Result};
use crate::msm::msm;
use ark_ec::pairing::Pairing;
use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::{batch_inversion, FftField, Field, Zero};
use ark_std::UniformRand;
use itertools::izip;
use srs::{CommitKey, OpeningKey};
use std::iter::once;
use std::ops::Neg;
use tracing::debug;

#[derive(
    Default,
    Hash,
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq
)]
/// The commitment is a group element.
pub struct KZGCommitment<E: Pairing> {
    pub com: E::G1Affine,
}

/// A claim that the committed polynomial takes `claimed_value` at `input_point`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpeningProof<E: Pairing> {
    /// commitment to (f(X) - f(z)) / (X - z)
    pub quotient_commitment: E::G1Affine,
    pub input_point: E::ScalarField,
    pub claimed_value: E::ScalarField,
}

/// Commits to a polynomial in evaluation form.
pub fn commit<E: Pairing>(
    poly: &[E::ScalarField],
    commit_key: &CommitKey<E>,
) -> Result<KZGCommitment<E>> {
    if poly.is_empty() || poly.len() > commit_key.len() {
        return Err(KzgError::InvalidPolynomialSize {
            size: poly.len(),
            max: commit_key.len(),
        });
    }
    let com = msm::<E::G1>(poly, &commit_key.g1_lagrange[..poly.len()], 0)?;
    Ok(KZGCommitment {
        com: com.into_affine(),
    })
}

/// Opens `poly` (evaluations over `domain`) at `point`.
pub fn open<E: Pairing>(
    domain: &Domain<E::ScalarField>,
    poly: &[E::ScalarField],
    point: E::ScalarField,
    commit_key: &CommitKey<E>,
) -> Result<OpeningProof<E>> {
    if poly.len() != domain.size() {
        return Err(KzgError::DomainMismatch {
            domain: domain.size(),
            got: poly.len(),
        });
    }
    let (quotient, claimed_value) = compute_quotient(domain, poly, point);
    let quotient_commitment = commit(&quotient, commit_key)?.com;
    Ok(OpeningProof {
        quotient_commitment,
        input_point: point,
        claimed_value,
    })
}

/// Returns q = (f - f(z)) / (X - z) in evaluation form, together with f(z).
/// `poly` must have the domain's length.
fn compute_quotient<F: FftField>(domain: &Domain<F>, poly: &[F], point: F) -> (Vec<F>, F) {
    let roots = domain.roots();
    match domain.find_root(&point) {
        None => {
            // 1 / (ω^i - z), shared by the barycentric evaluation and the quotient
            let mut inverses: Vec<F> = roots.iter().map(|root| *root - point).collect();
            batch_inversion(&mut inverses);

            // f(z) = (z^n - 1)/n * sum_i f_i ω^i / (z - ω^i)
            let sum: F = izip!(poly, roots, &inverses)
                .map(|(f, root, inv)| *f * root * inv)
                .sum();
            let factor = (point.pow([domain.size() as u64]) - F::ONE) * domain.size_inv();
            let value = -(sum * factor);

            let quotient = poly
                .iter()
                .zip(&inverses)
                .map(|(f, inv)| (*f - value) * inv)
                .collect();
            (quotient, value)
        }
        Some(m) => {
            let value = poly[m];
            let root_m = roots[m];
            let mut inverses: Vec<F> = roots.iter().map(|root| *root - root_m).collect();
            inverses[m] = F::ONE;
            batch_inversion(&mut inverses);

            let mut quotient: Vec<F> = poly
                .iter()
                .zip(&inverses)
                .map(|(f, inv)| (*f - value) * inv)
                .collect();
            // q_m = -sum_{j != m} q_j ω^{j - m}
            let n = domain.size();
            quotient[m] = F::ZERO;
            let q_m: F = quotient
                .iter()
                .enumerate()
                .map(|(j, q)| *q * roots[(j + n - m) % n])
                .sum();
            quotient[m] = -q_m;
            (quotient, value)
        }
    }
}

/// Checks e(C - [y]G1, G2) == e(Q, [α]G2 - [z]G2).
pub fn verify<E: Pairing>(
    commitment: &KZGCommitment<E>,
    proof: &OpeningProof<E>,
    opening_key: &OpeningKey<E>,
) -> Result<()> {
    let commitment_minus_value = commitment.com.into_group() - opening_key.g1 * proof.claimed_value;
    let alpha_minus_point = opening_key.alpha_g2.into_group() - opening_key.g2 * proof.input_point;

    let check = E::multi_pairing(
        [commitment_minus_value.into_affine(), proof.quotient_commitment],
        [opening_key.g2.into_group().neg().into_affine(), alpha_minus_point.into_affine()],
    );
    if check.is_zero() {
        Ok(())
    } else {
        debug!("single opening pairing check failed");
        Err(KzgError::VerificationFailed)
    }
}

/// Verifies openings of different polynomials at different points with a
/// single pairing check, folding them with fresh random scalars.
pub fn batch_verify<E: Pairing>(
    commitments: &[KZGCommitment<E>],
    proofs: &[OpeningProof<E>],
    opening_key: &OpeningKey<E>,
) -> Result<()> {
    if commitments.len() != proofs.len() {
        return Err(KzgError::LengthMismatch {
            expected: proofs.len(),
            got: commitments.len(),
        });
    }
    match proofs.len() {
        0 => return Ok(()),
        1 => return verify(&commitments[0], &proofs[0], opening_key),
        _ => {}
    }

    let mut rng = rand::thread_rng();
    let folding: Vec<E::ScalarField> = once(E::ScalarField::ONE)
        .chain((1..proofs.len()).map(|_| E::ScalarField::rand(&mut rng)))
        .collect();

    let quotients: Vec<E::G1Affine> = proofs.iter().map(|p| p.quotient_commitment).collect();

    // sum_i r_i (C_i - [y_i]G1 + [z_i]Q_i)
    let mut bases: Vec<E::G1Affine> = commitments.iter().map(|c| c.com).collect();
    bases.extend_from_slice(&quotients);
    bases.push(opening_key.g1);

    let mut scalars = folding.clone();
    scalars.extend(folding.iter().zip(proofs).map(|(r, p)| *r * p.input_point));
    let folded_value: E::ScalarField = folding
        .iter()
        .zip(proofs)
        .map(|(r, p)| *r * p.claimed_value)
        .sum();
    scalars.push(-folded_value);

    let rhs = msm::<E::G1>(&scalars, &bases, 0)?;
    let lhs = msm::<E::G1>(&folding, &quotients, 0)?;

    // e(sum r_i Q_i, [α]G2) == e(rhs, G2)
    let check = E::multi_pairing(
        [lhs.into_affine(), (-rhs).into_affine()],
        [opening_key.alpha_g2, opening_key.g2],
    );
    if check.is_zero() {
        Ok(())
    } else {
        debug!(num_proofs = proofs.len(), "batched pairing check failed");
        Err(KzgError::VerificationFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constant_curve::{G1Affine, ScalarField, E};
    use crate::kzg::srs::SRS;
    use crate::poly::polynomial::GeneralDensePolynomial;
    use ark_std::rand::RngCore;
    use ark_std::test_rng;

    type F = ScalarField;

    /// τ is the first draw from `rng`; everything drawn afterwards is
    /// independent of it.
    fn setup<R: RngCore>(n: usize, rng: &mut R) -> (Domain<F>, CommitKey<E>, OpeningKey<E>, F) {
        let (tau, srs): (F, SRS<E>) = SRS::unsafe_setup(n, 2, rng);
        let domain = Domain::new(n).unwrap();
        let commit_key = srs.commit_key(&domain).unwrap();
        (domain, commit_key, srs.opening_key().unwrap(), tau)
    }

    fn random_poly(n: usize) -> Vec<F> {
        let mut rng = test_rng();
        (0..n).map(|_| F::rand(&mut rng)).collect()
    }

    #[test]
    fn test_quotient_matches_polynomial_division() {
        let n = 16;
        let mut rng = test_rng();
        let domain = Domain::<F>::new(n).unwrap();
        let coeffs = random_poly(n);
        let f = GeneralDensePolynomial::<F, F>::from_coeff_vec(coeffs.clone());
        let mut evals = coeffs;
        domain.fft(&mut evals).unwrap();

        for point in [F::rand(&mut rng), domain.element(0), domain.element(7)] {
            let (quotient, value) = compute_quotient(&domain, &evals, point);
            assert_eq!(value, f.evaluate(&point));
            // q(x) (x - z) == f(x) - f(z) at an unrelated x
            let x = F::rand(&mut rng);
            let q_x = domain.evaluate_lagrange(&quotient, x).unwrap();
            assert_eq!(q_x * (x - point), f.evaluate(&x) - value);
        }
    }

    #[test]
    fn test_open_verify_outside_domain() {
        let n = 32;
        let mut rng = test_rng();
        let (domain, ck, ok, tau) = setup(n, &mut rng);
        let poly = random_poly(n);
        let commitment = commit(&poly, &ck).unwrap();
        // at z = τ the pairing check accepts any quotient
        let point = F::rand(&mut rng);
        assert_ne!(point, tau);
        let proof = open(&domain, &poly, point, &ck).unwrap();
        assert!(verify(&commitment, &proof, &ok).is_ok());
    }

    #[test]
    fn test_open_verify_on_every_root() {
        let n = 8;
        let (domain, ck, ok, _) = setup(n, &mut test_rng());
        let poly = random_poly(n);
        let commitment = commit(&poly, &ck).unwrap();
        for i in 0..n {
            let proof = open(&domain, &poly, domain.element(i), &ck).unwrap();
            assert_eq!(proof.claimed_value, poly[i]);
            assert!(verify(&commitment, &proof, &ok).is_ok());
        }
    }

    #[test]
    fn test_tampered_proofs_fail() {
        let n = 16;
        let mut rng = test_rng();
        let (domain, ck, ok, tau) = setup(n, &mut rng);
        let poly = random_poly(n);
        let commitment = commit(&poly, &ck).unwrap();
        // at z = τ the pairing check accepts any quotient
        let point = F::rand(&mut rng);
        assert_ne!(point, tau);
        let proof = open(&domain, &poly, point, &ck).unwrap();

        let mut bad_value = proof;
        bad_value.claimed_value += F::ONE;
        assert!(matches!(
            verify(&commitment, &bad_value, &ok),
            Err(KzgError::VerificationFailed)
        ));

        let mut bad_point = proof;
        bad_point.input_point += F::ONE;
        assert!(matches!(
            verify(&commitment, &bad_point, &ok),
            Err(KzgError::VerificationFailed)
        ));

        let mut bad_quotient = proof;
        bad_quotient.quotient_commitment = G1Affine::rand(&mut rng);
        assert!(matches!(
            verify(&commitment, &bad_quotient, &ok),
            Err(KzgError::VerificationFailed)
        ));

        let other = commit(&random_poly(n).into_iter().rev().collect::<Vec<_>>(), &ck).unwrap();
        let err = verify(&other, &proof, &ok).unwrap_err();
        assert!(err.is_verification_failure());
    }

    #[test]
    fn test_commit_rejects_bad_sizes() {
        let (domain, ck, _, _) = setup(8, &mut test_rng());
        assert!(matches!(
            commit(&[], &ck),
            Err(KzgError::InvalidPolynomialSize { size: 0, max: 8 })
        ));
        assert!(matches!(
            commit(&random_poly(9), &ck),
            Err(KzgError::InvalidPolynomialSize { size: 9, max: 8 })
        ));
        assert!(matches!(
            open(&domain, &random_poly(4), F::ONE, &ck),
            Err(KzgError::DomainMismatch { domain: 8, got: 4 })
        ));
    }

    #[test]
    fn test_batch_verify() {
        let n = 16;
        let mut rng = test_rng();
        let (domain, ck, ok, _) = setup(n, &mut rng);

        let mut commitments = Vec::new();
        let mut proofs = Vec::new();
        for i in 0..5 {
            let poly: Vec<F> = (0..n).map(|_| F::rand(&mut rng)).collect();
            let point = if i == 2 { domain.element(3) } else { F::rand(&mut rng) };
            commitments.push(commit(&poly, &ck).unwrap());
            proofs.push(open(&domain, &poly, point, &ck).unwrap());
        }

        assert!(batch_verify(&commitments, &proofs, &ok).is_ok());
        assert!(batch_verify(&commitments[..1], &proofs[..1], &ok).is_ok());
        assert!(batch_verify::<E>(&[], &[], &ok).is_ok());

        let mut corrupted = commitments.clone();
        corrupted[3] = KZGCommitment { com: G1Affine::rand(&mut rng) };
        assert!(matches!(
            batch_verify(&corrupted, &proofs, &ok),
            Err(KzgError::VerificationFailed)
        ));

        assert!(matches!(
            batch_verify(&commitments[..4], &proofs, &ok),
            Err(KzgError::LengthMismatch { expected: 5, got: 4 })
        ));
    }
}
