use crate::domain::Domain;
use crate::errors::Result;
use crate::kzg::aggregate::{aggregate_open, aggregate_verify, BatchOpeningProof};
use crate::kzg::srs::{CommitKey, OpeningKey, SRS};
use crate::kzg::{self, KZGCommitment, OpeningProof};
use ark_ec::pairing::Pairing;
use ark_poly::domain::DomainCoeff;
use tracing::debug;

/// Everything needed to commit, open and verify over one domain.
///
/// Read-only once built; share it by reference across threads.
#[derive(Clone, Debug)]
pub struct KzgContext<E: Pairing> {
    pub domain: Domain<E::ScalarField>,
    pub commit_key: CommitKey<E>,
    pub opening_key: OpeningKey<E>,
}

impl<E: Pairing> KzgContext<E>
where
    E::G1: DomainCoeff<E::ScalarField>,
{
    pub fn from_srs(srs: &SRS<E>, domain_size: usize) -> Result<Self> {
        let domain = Domain::new(domain_size)?;
        let commit_key = srs.commit_key(&domain)?;
        let opening_key = srs.opening_key()?;
        debug!(domain_size, "built KZG context");
        Ok(KzgContext {
            domain,
            commit_key,
            opening_key,
        })
    }
}

impl<E: Pairing> KzgContext<E> {
    pub fn commit(&self, poly: &[E::ScalarField]) -> Result<KZGCommitment<E>> {
        kzg::commit(poly, &self.commit_key)
    }

    pub fn open(&self, poly: &[E::ScalarField], point: E::ScalarField) -> Result<OpeningProof<E>> {
        kzg::open(&self.domain, poly, point, &self.commit_key)
    }

    pub fn verify(&self, commitment: &KZGCommitment<E>, proof: &OpeningProof<E>) -> Result<()> {
        kzg::verify(commitment, proof, &self.opening_key)
    }

    pub fn batch_verify(
        &self,
        commitments: &[KZGCommitment<E>],
        proofs: &[OpeningProof<E>],
    ) -> Result<()> {
        kzg::batch_verify(commitments, proofs, &self.opening_key)
    }

    pub fn aggregate_open(&self, polys: &[Vec<E::ScalarField>]) -> Result<BatchOpeningProof<E>> {
        aggregate_open(&self.domain, polys, &self.commit_key)
    }

    pub fn aggregate_verify(
        &self,
        polys: &[Vec<E::ScalarField>],
        proof: &BatchOpeningProof<E>,
    ) -> Result<()> {
        aggregate_verify(&self.domain, polys, proof, &self.opening_key)
    }
}
