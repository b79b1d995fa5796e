use crate::domain::Domain;
use crate::errors::{KzgError, Result};
use crate::util::bit_reverse;
use ark_ec::pairing::Pairing;
use ark_ec::{AffineRepr, CurveGroup};
use ark_poly::domain::DomainCoeff;
use ark_std::rand::RngCore as Rng;
use ark_std::UniformRand;
use std::iter::successors;
use std::ops::Mul;
use tracing::debug;

/// Powers of a secret τ in both source groups, in monomial order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SRS<E: Pairing> {
    /// vec![g^{tau^0}, g^{tau^1}, ..., g^{tau^{n-1}}]
    pub powers_of_g: Vec<E::G1Affine>,
    /// vec![h^{tau^0}, h^{tau^1}, ...]; at least two entries
    pub powers_of_h: Vec<E::G2Affine>,
}

/// G1 points committing to the Lagrange basis of a domain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitKey<E: Pairing> {
    pub g1_lagrange: Vec<E::G1Affine>,
}

/// The minimal data needed to pairing-check an opening.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpeningKey<E: Pairing> {
    pub g1: E::G1Affine,
    pub g2: E::G2Affine,
    /// [τ]G2
    pub alpha_g2: E::G2Affine,
}

impl<E: Pairing> SRS<E> {
    pub fn from_powers(
        powers_of_g: Vec<E::G1Affine>,
        powers_of_h: Vec<E::G2Affine>,
    ) -> Result<Self> {
        if powers_of_g.is_empty() {
            return Err(KzgError::SrsTooSmall {
                required: 1,
                available: 0,
            });
        }
        if powers_of_h.len() < 2 {
            return Err(KzgError::SrsTooSmall {
                required: 2,
                available: powers_of_h.len(),
            });
        }
        Ok(SRS {
            powers_of_g,
            powers_of_h,
        })
    }

    /// Samples a fresh τ and discards it.
    pub fn setup<R: Rng>(n_g1: usize, n_g2: usize, rng: &mut R) -> Self {
        Self::unsafe_setup(n_g1, n_g2, rng).1
    }

    /// it also returns secret power tau which is used for writing unit tests
    pub fn unsafe_setup<R: Rng>(n_g1: usize, n_g2: usize, rng: &mut R) -> (E::ScalarField, Self) {
        let tau = E::ScalarField::rand(rng);
        let powers_of_tau: Vec<E::ScalarField> =
            successors(Some(E::ScalarField::from(1u64)), |prev| Some(*prev * tau))
                .take(n_g1.max(n_g2.max(2)))
                .collect();

        let g = E::G1Affine::generator();
        let h = E::G2Affine::generator();
        let powers_of_g: Vec<E::G1> = powers_of_tau[..n_g1].iter().map(|t| g.mul(*t)).collect();
        let powers_of_h: Vec<E::G2> = powers_of_tau[..n_g2.max(2)]
            .iter()
            .map(|t| h.mul(*t))
            .collect();

        (
            tau,
            SRS {
                powers_of_g: E::G1::normalize_batch(&powers_of_g),
                powers_of_h: E::G2::normalize_batch(&powers_of_h),
            },
        )
    }

    pub fn opening_key(&self) -> Result<OpeningKey<E>> {
        match (self.powers_of_g.first(), self.powers_of_h.as_slice()) {
            (Some(g1), [g2, alpha_g2, ..]) => Ok(OpeningKey {
                g1: *g1,
                g2: *g2,
                alpha_g2: *alpha_g2,
            }),
            (None, _) => Err(KzgError::SrsTooSmall {
                required: 1,
                available: 0,
            }),
            (Some(_), h) => Err(KzgError::SrsTooSmall {
                required: 2,
                available: h.len(),
            }),
        }
    }
}

impl<E: Pairing> SRS<E>
where
    E::G1: DomainCoeff<E::ScalarField>,
{
    /// Converts the first `domain.size()` monomial powers to commitments to
    /// the Lagrange basis: [L_i(τ)]G1 = IFFT([τ^j]G1)_i.
    pub fn commit_key(&self, domain: &Domain<E::ScalarField>) -> Result<CommitKey<E>> {
        if self.powers_of_g.len() < domain.size() {
            return Err(KzgError::SrsTooSmall {
                required: domain.size(),
                available: self.powers_of_g.len(),
            });
        }
        let mut points: Vec<E::G1> = self.powers_of_g[..domain.size()]
            .iter()
            .map(|p| p.into_group())
            .collect();
        domain.ifft_g1(&mut points)?;

        debug!(size = domain.size(), "converted SRS to Lagrange form");
        Ok(CommitKey {
            g1_lagrange: E::G1::normalize_batch(&points),
        })
    }
}

impl<E: Pairing> CommitKey<E> {
    pub fn len(&self) -> usize {
        self.g1_lagrange.len()
    }

    pub fn is_empty(&self) -> bool {
        self.g1_lagrange.is_empty()
    }

    /// The same key with its points permuted into bit-reversed order, for
    /// committing to evaluations stored in bit-reversed order.
    pub fn bit_reversed(&self) -> Result<Self> {
        let mut g1_lagrange = self.g1_lagrange.clone();
        bit_reverse(&mut g1_lagrange)?;
        Ok(CommitKey { g1_lagrange })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::constant_curve::{G1Affine, G1Projective, ScalarField, E};
    use ark_poly::{EvaluationDomain, Radix2EvaluationDomain};
    use ark_std::test_rng;

    type F = ScalarField;

    #[test]
    fn test_setup_is_well_formed() {
        let mut rng = test_rng();
        let (tau, srs): (F, SRS<E>) = SRS::unsafe_setup(16, 3, &mut rng);

        assert_eq!((srs.powers_of_g[0], srs.powers_of_g.len()), (G1Affine::generator(), 16));
        for i in 0..15 {
            assert_eq!(srs.powers_of_g[i + 1], srs.powers_of_g[i].mul(tau).into_affine());
        }
        assert_eq!(srs.powers_of_h.len(), 3);
        assert_eq!(srs.opening_key().unwrap().alpha_g2, srs.powers_of_h[0].mul(tau).into_affine());
    }

    #[test]
    pub fn test_commit_key_is_lagrange_basis() {
        let n = 64usize;
        let mut rng = test_rng();
        let (tau, srs): (F, SRS<E>) = SRS::unsafe_setup(n, 2, &mut rng);

        let domain = Domain::<F>::new(n).unwrap();
        let commit_key = srs.commit_key(&domain).unwrap();

        // compute L_i(tau) directly and lift to G1
        let expected: Vec<G1Projective> = Radix2EvaluationDomain::<F>::new(n)
            .unwrap()
            .evaluate_all_lagrange_coefficients(tau)
            .iter()
            .map(|l_i_tau| G1Affine::generator().mul(l_i_tau))
            .collect();

        assert_eq!(commit_key.g1_lagrange, G1Projective::normalize_batch(&expected));
    }

    #[test]
    fn test_commit_key_rejects_small_srs() {
        let mut rng = test_rng();
        let srs: SRS<E> = SRS::setup(8, 2, &mut rng);
        let domain = Domain::<F>::new(16).unwrap();
        assert!(matches!(
            srs.commit_key(&domain),
            Err(KzgError::SrsTooSmall { required: 16, available: 8 })
        ));
        assert!(matches!(
            SRS::<E>::from_powers(srs.powers_of_g.clone(), srs.powers_of_h[..1].to_vec()),
            Err(KzgError::SrsTooSmall { required: 2, available: 1 })
        ));
    }

    #[test]
    fn test_bit_reversed_commit_key() {
        let mut rng = test_rng();
        let srs: SRS<E> = SRS::setup(8, 2, &mut rng);
        let domain = Domain::<F>::new(8).unwrap();
        let commit_key = srs.commit_key(&domain).unwrap();
        let reversed = commit_key.bit_reversed().unwrap();
        assert_eq!(reversed.g1_lagrange[1], commit_key.g1_lagrange[4]);
        assert_eq!(reversed.bit_reversed().unwrap(), commit_key);
    }
}
