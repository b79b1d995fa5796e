//! Affine point summation with one shared field inversion per round.
//!
//! Points are reduced pairwise in rounds. Every addition or doubling in a
//! round needs one inverse (of `x2 - x1` or `2y`); all of them are collected
//! first and inverted together with Montgomery's trick, so a round of `m`
//! pairs costs one inversion plus `O(m)` multiplications.

use ark_ec::short_weierstrass::{Affine, Projective, SWCurveConfig};
use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::{batch_inversion, Field, Zero};

/// Below this many points the inversion is not amortized and points are
/// summed sequentially in projective coordinates.
pub const BATCH_ADDITION_THRESHOLD: usize = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PairKind {
    /// left operand is the identity
    TakeRight,
    /// right operand is the identity
    TakeLeft,
    /// P + (-P), or doubling a point of order two
    Cancel,
    Double,
    Add,
}

#[inline]
fn classify<P: SWCurveConfig>(a: &Affine<P>, b: &Affine<P>) -> PairKind {
    if a.infinity {
        PairKind::TakeRight
    } else if b.infinity {
        PairKind::TakeLeft
    } else if a.x == b.x {
        if a.y == b.y && !a.y.is_zero() {
            PairKind::Double
        } else {
            PairKind::Cancel
        }
    } else {
        PairKind::Add
    }
}

#[inline]
fn denominator<P: SWCurveConfig>(
    a: &Affine<P>,
    b: &Affine<P>,
    kind: PairKind,
) -> Option<P::BaseField> {
    match kind {
        PairKind::Double => Some(a.y + a.y),
        PairKind::Add => Some(b.x - a.x),
        _ => None,
    }
}

#[inline]
fn complete<P: SWCurveConfig>(
    a: &Affine<P>,
    b: &Affine<P>,
    kind: PairKind,
    inverse: Option<&P::BaseField>,
) -> Affine<P> {
    match (kind, inverse) {
        (PairKind::TakeRight, _) => *b,
        (PairKind::TakeLeft, _) => *a,
        (PairKind::Cancel, _) => Affine::identity(),
        (PairKind::Double, Some(inv)) => {
            let x_sq = a.x.square();
            let lambda = (x_sq + x_sq + x_sq + P::COEFF_A) * inv;
            let x3 = lambda.square() - a.x - a.x;
            let y3 = lambda * (a.x - x3) - a.y;
            Affine::new_unchecked(x3, y3)
        }
        (PairKind::Add, Some(inv)) => {
            let lambda = (b.y - a.y) * inv;
            let x3 = lambda.square() - a.x - b.x;
            let y3 = lambda * (a.x - x3) - a.y;
            Affine::new_unchecked(x3, y3)
        }
        // denominators are pushed for exactly the Double/Add pairs, so the
        // inverse iterator cannot run dry; fall back to a projective sum anyway
        (_, None) => (a.into_group() + *b).into_affine(),
    }
}

/// Sums `points`.
pub fn batch_add<P: SWCurveConfig>(points: &[Affine<P>]) -> Affine<P> {
    if points.len() < BATCH_ADDITION_THRESHOLD {
        return naive_add(points);
    }
    multi_batch_add(vec![points.to_vec()])
        .pop()
        .unwrap_or_else(Affine::identity)
}

/// Sums every set independently, sharing one batch inversion per round
/// across all sets. Returns one point per input set (the identity for an
/// empty set).
pub fn multi_batch_add<P: SWCurveConfig>(mut sets: Vec<Vec<Affine<P>>>) -> Vec<Affine<P>> {
    let mut denominators: Vec<P::BaseField> = Vec::new();
    while sets.iter().any(|set| set.len() > 1) {
        denominators.clear();
        for set in &sets {
            for pair in set.chunks_exact(2) {
                let kind = classify(&pair[0], &pair[1]);
                if let Some(d) = denominator(&pair[0], &pair[1], kind) {
                    denominators.push(d);
                }
            }
        }

        batch_inversion(&mut denominators);

        let mut inverses = denominators.iter();
        for set in sets.iter_mut() {
            if set.len() <= 1 {
                continue;
            }
            let mut next = Vec::with_capacity(set.len().div_ceil(2));
            for pair in set.chunks(2) {
                match pair {
                    [a, b] => {
                        let kind = classify(a, b);
                        let inverse = match kind {
                            PairKind::Double | PairKind::Add => inverses.next(),
                            _ => None,
                        };
                        next.push(complete(a, b, kind, inverse));
                    }
                    [a] => next.push(*a),
                    _ => {}
                }
            }
            *set = next;
        }
    }

    sets.into_iter()
        .map(|set| set.first().copied().unwrap_or_else(Affine::identity))
        .collect()
}

fn naive_add<P: SWCurveConfig>(points: &[Affine<P>]) -> Affine<P> {
    points
        .iter()
        .fold(Projective::<P>::zero(), |acc, p| acc + *p)
        .into_affine()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constant_curve::{G1Affine, G1Projective};
    use ark_std::{test_rng, UniformRand};

    fn random_points(n: usize) -> Vec<G1Affine> {
        let mut rng = test_rng();
        let points: Vec<G1Projective> = (0..n).map(|_| G1Projective::rand(&mut rng)).collect();
        G1Projective::normalize_batch(&points)
    }

    #[test]
    fn test_batch_add_matches_naive() {
        for n in [0usize, 1, 2, 15, 16, 17, 64, 101] {
            let points = random_points(n);
            assert_eq!(batch_add(&points), naive_add(&points), "n = {}", n);
        }
    }

    #[test]
    fn test_batch_add_edge_cases() {
        let mut points = random_points(20);
        // doubling: the same point appears as a pair
        points[3] = points[2];
        // cancellation
        points[5] = -points[4];
        // identities
        points[8] = G1Affine::identity();
        points[11] = G1Affine::identity();
        assert_eq!(batch_add(&points), naive_add(&points));

        // everything cancels
        let mut cancelling = random_points(16);
        let negated: Vec<G1Affine> = cancelling.iter().map(|p| -*p).collect();
        cancelling.extend(negated.into_iter().rev());
        assert!(batch_add(&cancelling).infinity);
    }

    #[test]
    fn test_multi_batch_add() {
        let sets: Vec<Vec<G1Affine>> = [0usize, 1, 5, 33, 18]
            .iter()
            .map(|&n| random_points(n))
            .collect();
        let expected: Vec<G1Affine> = sets.iter().map(|s| naive_add(s)).collect();
        assert_eq!(multi_batch_add(sets), expected);
    }
}
