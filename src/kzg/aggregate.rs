//! Folds openings of several polynomials at one transcript-derived point into
//! a single constant-size proof.
//!
//! Both sides feed every polynomial and commitment into a transcript and draw
//! a folding challenge `r` and an evaluation point `z` from one snapshot. The
//! folded polynomial `sum_i r^i p_i` is opened at `z`; the verifier folds the
//! commitments with the same powers of `r` and checks that single opening.

use super::srs::{CommitKey, OpeningKey};
use super::{commit, open, verify, KZGCommitment, OpeningProof};
use crate::domain::Domain;
use crate::errors::{KzgError, Result};
use crate::msm::msm;
use crate::transcript::Transcript;
use ark_ec::pairing::Pairing;
use ark_ec::CurveGroup;
use ark_ff::Field;
use rayon::prelude::*;
use std::iter::successors;
use tracing::trace;

pub const AGGREGATE_PROTOCOL_LABEL: &[u8] = b"blob-kzg/aggregate-open/v1";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchOpeningProof<E: Pairing> {
    /// commitment to the quotient of the folded polynomial
    pub quotient_commitment: E::G1Affine,
    /// one commitment per folded polynomial, in input order
    pub commitments: Vec<KZGCommitment<E>>,
}

fn check_polynomials<F: Field>(domain_size: usize, polys: &[Vec<F>]) -> Result<()> {
    if polys.is_empty() {
        return Err(KzgError::EmptyPolynomialSet);
    }
    let len = polys[0].len();
    if let Some(bad) = polys.iter().find(|p| p.len() != len) {
        return Err(KzgError::LengthMismatch {
            expected: len,
            got: bad.len(),
        });
    }
    if len != domain_size {
        return Err(KzgError::DomainMismatch {
            domain: domain_size,
            got: len,
        });
    }
    Ok(())
}

/// Returns the folding challenge and the evaluation point.
fn derive_challenges<E: Pairing>(
    polys: &[Vec<E::ScalarField>],
    commitments: &[KZGCommitment<E>],
) -> Result<(E::ScalarField, E::ScalarField)> {
    let mut transcript = Transcript::new(AGGREGATE_PROTOCOL_LABEL);
    transcript.append_polynomials(b"polynomials", polys)?;
    let points: Vec<E::G1Affine> = commitments.iter().map(|c| c.com).collect();
    transcript.append_points(b"commitments", &points)?;

    let [r, z]: [E::ScalarField; 2] = transcript
        .challenge_scalars::<E::ScalarField>(2)
        .try_into()
        .map_err(|drawn: Vec<_>| KzgError::LengthMismatch {
            expected: 2,
            got: drawn.len(),
        })?;
    Ok((r, z))
}

fn powers_of<F: Field>(base: F, count: usize) -> Vec<F> {
    successors(Some(F::ONE), |prev| Some(*prev * base))
        .take(count)
        .collect()
}

fn fold_polynomials<F: Field>(polys: &[Vec<F>], powers: &[F]) -> Vec<F> {
    let mut folded = vec![F::ZERO; polys[0].len()];
    for (poly, power) in polys.iter().zip(powers) {
        for (acc, coeff) in folded.iter_mut().zip(poly) {
            *acc += *coeff * power;
        }
    }
    folded
}

/// Commits to every polynomial and produces one proof for all of them.
pub fn aggregate_open<E: Pairing>(
    domain: &Domain<E::ScalarField>,
    polys: &[Vec<E::ScalarField>],
    commit_key: &CommitKey<E>,
) -> Result<BatchOpeningProof<E>> {
    check_polynomials(domain.size(), polys)?;

    let commitments = polys
        .par_iter()
        .map(|poly| commit(poly, commit_key))
        .collect::<Result<Vec<_>>>()?;

    let (r, z) = derive_challenges(polys, &commitments)?;
    let powers = powers_of(r, polys.len());
    let folded = fold_polynomials(polys, &powers);
    trace!(num_polys = polys.len(), "opening folded polynomial");

    let proof = open(domain, &folded, z, commit_key)?;
    Ok(BatchOpeningProof {
        quotient_commitment: proof.quotient_commitment,
        commitments,
    })
}

pub fn aggregate_verify<E: Pairing>(
    domain: &Domain<E::ScalarField>,
    polys: &[Vec<E::ScalarField>],
    proof: &BatchOpeningProof<E>,
    opening_key: &OpeningKey<E>,
) -> Result<()> {
    check_polynomials(domain.size(), polys)?;
    if proof.commitments.len() != polys.len() {
        return Err(KzgError::LengthMismatch {
            expected: polys.len(),
            got: proof.commitments.len(),
        });
    }

    let (r, z) = derive_challenges(polys, &proof.commitments)?;
    let powers = powers_of(r, polys.len());

    let points: Vec<E::G1Affine> = proof.commitments.iter().map(|c| c.com).collect();
    let folded_commitment = KZGCommitment {
        com: msm::<E::G1>(&powers, &points, 0)?.into_affine(),
    };
    let folded = fold_polynomials(polys, &powers);
    let claimed_value = domain.evaluate_lagrange(&folded, z)?;

    let opening = OpeningProof {
        quotient_commitment: proof.quotient_commitment,
        input_point: z,
        claimed_value,
    };
    verify(&folded_commitment, &opening, opening_key)
}
