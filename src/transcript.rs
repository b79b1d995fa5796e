//! Fiat-Shamir transcript over SHA-256.
//!
//! A single running hash is seeded with a protocol label. Values are mixed in
//! under (possibly empty) tags using their canonical compressed encodings.
//! Every write starts with a kind byte and length-prefixes its variable-size
//! fields, so distinct call sequences never hash the same byte stream.
//!
//! Two challenge derivations are offered:
//! - [`Transcript::challenge_scalar`] finalizes the running hash, reduces the
//!   digest into the field and re-seeds the hash with that digest.
//! - [`Transcript::challenge_scalars`] finalizes once and derives the `i`-th
//!   challenge as `H(digest || i)`, re-seeding with the digest as well.
//!
//! A protocol picks one of them and uses only that one for a proof.

use crate::errors::Result;
use ark_ff::PrimeField;
use ark_serialize::CanonicalSerialize;
use sha2::{Digest, Sha256};

const KIND_LABEL: u8 = 0x00;
const KIND_APPEND: u8 = 0x01;
const KIND_PROTOCOL: u8 = 0x02;
const KIND_CHALLENGE: u8 = 0x03;

#[derive(Clone, Debug)]
pub struct Transcript {
    state: Sha256,
}

impl Transcript {
    pub fn new(label: &[u8]) -> Self {
        let mut transcript = Transcript {
            state: Sha256::new(),
        };
        transcript.state.update([KIND_LABEL]);
        transcript.update_framed(label);
        transcript
    }

    fn update_framed(&mut self, bytes: &[u8]) {
        self.state.update((bytes.len() as u64).to_le_bytes());
        self.state.update(bytes);
    }

    /// Mixes a sub-protocol separator into the state. Its kind byte differs
    /// from that of every `append_*` call.
    pub fn new_protocol(&mut self, label: &[u8]) {
        self.state.update([KIND_PROTOCOL]);
        self.update_framed(label);
    }

    /// Mixes `kind || len(tag) || tag || len(bytes) || bytes` into the state.
    pub fn append_bytes(&mut self, tag: &[u8], bytes: &[u8]) {
        self.state.update([KIND_APPEND]);
        self.update_framed(tag);
        self.update_framed(bytes);
    }

    fn append_count(&mut self, tag: &[u8], count: usize) {
        self.append_bytes(tag, &(count as u64).to_le_bytes());
    }

    fn append_serializable<T: CanonicalSerialize>(&mut self, tag: &[u8], value: &T) -> Result<()> {
        let mut bytes = Vec::with_capacity(value.compressed_size());
        value.serialize_compressed(&mut bytes)?;
        self.append_bytes(tag, &bytes);
        Ok(())
    }

    pub fn append_scalar<F: PrimeField>(&mut self, tag: &[u8], scalar: &F) -> Result<()> {
        self.append_serializable(tag, scalar)
    }

    pub fn append_scalars<F: PrimeField>(&mut self, tag: &[u8], scalars: &[F]) -> Result<()> {
        self.append_count(tag, scalars.len());
        for scalar in scalars {
            self.append_scalar(b"", scalar)?;
        }
        Ok(())
    }

    /// Appends a curve point (affine or projective) by its compressed encoding.
    pub fn append_point<G: CanonicalSerialize>(&mut self, tag: &[u8], point: &G) -> Result<()> {
        self.append_serializable(tag, point)
    }

    pub fn append_points<G: CanonicalSerialize>(&mut self, tag: &[u8], points: &[G]) -> Result<()> {
        self.append_count(tag, points.len());
        for point in points {
            self.append_point(b"", point)?;
        }
        Ok(())
    }

    /// Coefficients are counted, so trailing zeros change the transcript.
    pub fn append_polynomial<F: PrimeField>(&mut self, tag: &[u8], poly: &[F]) -> Result<()> {
        self.append_scalars(tag, poly)
    }

    pub fn append_polynomials<F: PrimeField>(
        &mut self,
        tag: &[u8],
        polys: &[Vec<F>],
    ) -> Result<()> {
        self.append_count(tag, polys.len());
        for poly in polys {
            self.append_polynomial(b"", poly)?;
        }
        Ok(())
    }

    fn finalize_and_reseed(&mut self) -> [u8; 32] {
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&self.state.finalize_reset());
        self.state.update([KIND_CHALLENGE]);
        self.state.update(digest);
        digest
    }

    /// Sequential derivation: every call advances the state.
    pub fn challenge_scalar<F: PrimeField>(&mut self) -> F {
        let digest = self.finalize_and_reseed();
        F::from_le_bytes_mod_order(&digest)
    }

    /// Derives `n` challenges from one snapshot of the state.
    pub fn challenge_scalars<F: PrimeField>(&mut self, n: usize) -> Vec<F> {
        let snapshot = self.finalize_and_reseed();
        (0..n as u64)
            .map(|i| {
                let mut hasher = Sha256::new();
                hasher.update(snapshot);
                hasher.update(i.to_le_bytes());
                F::from_le_bytes_mod_order(&hasher.finalize())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constant_curve::{G1Affine, ScalarField};
    use ark_std::{test_rng, UniformRand};
    use itertools::Itertools;

    type F = ScalarField;

    fn fill(transcript: &mut Transcript, scalars: &[F], point: &G1Affine) {
        transcript.new_protocol(b"sub-protocol");
        transcript.append_scalars(b"scalars", scalars).unwrap();
        transcript.append_point(b"point", point).unwrap();
        transcript
            .append_polynomials(b"polys", &[scalars.to_vec(), scalars[..2].to_vec()])
            .unwrap();
    }

    #[test]
    fn test_transcripts_agree() {
        let mut rng = test_rng();
        let scalars: Vec<F> = (0..5).map(|_| F::rand(&mut rng)).collect();
        let point = G1Affine::rand(&mut rng);

        let mut prover = Transcript::new(b"test");
        let mut verifier = Transcript::new(b"test");
        fill(&mut prover, &scalars, &point);
        fill(&mut verifier, &scalars, &point);

        assert_eq!(
            prover.challenge_scalars::<F>(3),
            verifier.challenge_scalars::<F>(3)
        );
        assert_eq!(prover.challenge_scalar::<F>(), verifier.challenge_scalar::<F>());
    }

    #[test]
    fn test_repeated_challenges_differ() {
        let mut transcript = Transcript::new(b"test");
        transcript.append_scalar(b"x", &F::from(7u64)).unwrap();

        let first = transcript.challenge_scalars::<F>(2);
        let second = transcript.challenge_scalars::<F>(2);
        assert_ne!(first, second);
        assert!(first.iter().chain(&second).all_unique());

        let a: F = transcript.challenge_scalar();
        let b: F = transcript.challenge_scalar();
        assert_ne!(a, b);
    }

    #[test]
    fn test_labels_and_tags_separate() {
        let challenge = |label: &[u8], tag: &[u8]| {
            let mut transcript = Transcript::new(label);
            transcript.append_scalar(tag, &F::from(1u64)).unwrap();
            transcript.challenge_scalar::<F>()
        };
        assert_ne!(challenge(b"a", b"x"), challenge(b"b", b"x"));
        assert_ne!(challenge(b"a", b"x"), challenge(b"a", b"y"));

        let mut with_protocol = Transcript::new(b"a");
        with_protocol.new_protocol(b"other");
        with_protocol.append_scalar(b"x", &F::from(1u64)).unwrap();
        assert_ne!(with_protocol.challenge_scalar::<F>(), challenge(b"a", b"x"));
    }

    #[test]
    fn test_label_and_tag_boundaries_are_framed() {
        let x = F::from(42u64);

        let mut joined = Transcript::new(b"ab");
        joined.append_scalar(b"", &x).unwrap();
        let mut split = Transcript::new(b"a");
        split.append_scalar(b"b", &x).unwrap();
        assert_ne!(joined.challenge_scalar::<F>(), split.challenge_scalar::<F>());

        let mut joined = Transcript::new(b"t");
        joined.append_bytes(b"xy", b"z");
        let mut split = Transcript::new(b"t");
        split.append_bytes(b"x", b"yz");
        assert_ne!(joined.challenge_scalar::<F>(), split.challenge_scalar::<F>());

        let mut listed = Transcript::new(b"t");
        listed.append_scalars(b"s", &[x, x]).unwrap();
        let mut single = Transcript::new(b"t");
        single.append_scalars(b"s", &[x]).unwrap();
        single.append_scalar(b"", &x).unwrap();
        assert_ne!(listed.challenge_scalar::<F>(), single.challenge_scalar::<F>());
    }

    #[test]
    fn test_protocol_separator_is_not_an_append() {
        let mut separated = Transcript::new(b"t");
        separated.new_protocol(b"sub");
        let mut appended = Transcript::new(b"t");
        appended.append_bytes(b"protocol", b"sub");
        assert_ne!(
            separated.challenge_scalars::<F>(2),
            appended.challenge_scalars::<F>(2)
        );
    }
}
