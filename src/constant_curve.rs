use ark_bls12_381::g1::Config as BLSConfig;
use ark_bls12_381::g1::G1Affine as g1;
use ark_bls12_381::g2::G2Affine as g2;
use ark_bls12_381::{Bls12_381, Fq, Fr};
use ark_ec::short_weierstrass::Projective;

pub type E = Bls12_381;

pub type ScalarField = Fr;

pub type BaseField = Fq;

pub type G1Affine = g1;

pub type G2Affine = g2;

pub type G1 = BLSConfig;

pub type G1Projective = Projective<G1>;
