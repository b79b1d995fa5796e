use crate::domain::Domain;
use crate::errors::{KzgError, Result};
use ark_ff::{FftField, Field, Zero};
use ark_poly::domain::DomainCoeff;
use ark_std::rand::RngCore as Rng;
use ark_std::UniformRand;
use itertools::{
    EitherOrBoth::{Both, Left, Right},
    Itertools,
};
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Add, MulAssign};

/// A trait bound alias for the coefficient type of `GeneralDensePolynomial`.
/// Coefficients can be field elements or group elements (an SRS viewed as a
/// polynomial with curve-point coefficients).
pub trait GroupCoeff<F: Field>:
Clone + fmt::Debug + Copy + Add<Self, Output=Self> + MulAssign<F> + Zero + UniformRand + Sized
{}

impl<T, F: Field> GroupCoeff<F> for T
where
    T: Clone
    + fmt::Debug
    + Copy
    + Add<Self, Output=Self>
    + MulAssign<F>
    + Zero
    + UniformRand
    + Sized,
{}

/// Stores a polynomial in the coefficient (monomial) form.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct GeneralDensePolynomial<T: GroupCoeff<F>, F: Field> {
    /// The coefficient of `x^i` is stored at location `i` in `self.coeffs`.
    pub coeffs: Vec<T>,
    _phantom: PhantomData<F>,
}

impl<T, F> GeneralDensePolynomial<T, F>
where
    T: GroupCoeff<F>,
    F: Field,
{
    /// Constructs a new polynomial from a list of coefficients
    pub fn from_coeff_slice(coeffs: &[T]) -> Self {
        Self::from_coeff_vec(coeffs.to_vec())
    }

    /// Constructs a new polynomial from a list of coefficients, dropping
    /// leading zeros.
    pub fn from_coeff_vec(coeffs: Vec<T>) -> Self {
        let mut result = Self {
            coeffs,
            _phantom: PhantomData,
        };
        result.truncate_leading_zeros();
        result
    }

    /// Outputs a univariate polynomial of degree `d` where
    /// each coefficient is sampled uniformly at random.
    pub fn rand<R: Rng>(d: usize, rng: &mut R) -> Self {
        let random_coeffs = (0..=d).map(|_| T::rand(rng)).collect();
        Self::from_coeff_vec(random_coeffs)
    }

    /// Returns the total degree of the polynomial
    pub fn degree(&self) -> usize {
        if self.is_zero() {
            0
        } else {
            self.coeffs.len() - 1
        }
    }

    /// Evaluate `self` at a given `point`
    pub fn evaluate(&self, point: &F) -> T {
        if self.is_zero() {
            return T::zero();
        } else if point.is_zero() {
            return self.coeffs[0];
        }
        self.horner_evaluate(point)
    }
}

impl<T, F> GeneralDensePolynomial<T, F>
where
    T: GroupCoeff<F> + DomainCoeff<F>,
    F: FftField,
{
    /// Evaluates `self` at every root of `domain`: returns f(ω^0), ..., f(ω^{n-1}).
    pub fn batch_evaluate_rou(&self, domain: &Domain<F>) -> Result<Vec<T>> {
        if self.coeffs.len() > domain.size() {
            return Err(KzgError::InvalidPolynomialSize {
                size: self.coeffs.len(),
                max: domain.size(),
            });
        }
        let mut evals = self.coeffs.clone();
        evals.resize_with(domain.size(), Zero::zero);
        domain.fft(&mut evals)?;
        Ok(evals)
    }
}

impl<F: Field> GeneralDensePolynomial<F, F> {
    /// The monic polynomial `prod_i (X - roots[i])`.
    pub fn vanishing(roots: &[F]) -> Self {
        let mut coeffs = Vec::with_capacity(roots.len() + 1);
        coeffs.push(F::ONE);
        for root in roots {
            coeffs.push(F::ZERO);
            for i in (1..coeffs.len()).rev() {
                coeffs[i] = coeffs[i - 1] - *root * coeffs[i];
            }
            coeffs[0] = -(*root * coeffs[0]);
        }
        Self::from_coeff_vec(coeffs)
    }
}

impl<T, F> GeneralDensePolynomial<T, F>
where
    T: GroupCoeff<F>,
    F: Field,
{
    fn truncate_leading_zeros(&mut self) {
        while self.coeffs.last().map_or(false, |c| c.is_zero()) {
            self.coeffs.pop();
        }
    }

    // Horner's method for polynomial evaluation with cost O(n).
    fn horner_evaluate(&self, point: &F) -> T {
        self.coeffs
            .iter()
            .rfold(T::zero(), move |mut result, coeff| {
                result *= *point;
                result + *coeff
            })
    }
}

impl<T, F> Zero for GeneralDensePolynomial<T, F>
where
    T: GroupCoeff<F>,
    F: Field,
{
    /// returns the zero polynomial
    fn zero() -> Self {
        Self {
            coeffs: Vec::new(),
            _phantom: PhantomData,
        }
    }

    /// checks if the given polynomial is zero
    fn is_zero(&self) -> bool {
        self.coeffs.is_empty() || self.coeffs.iter().all(|coeff| coeff.is_zero())
    }
}

impl<T, F> Add<Self> for GeneralDensePolynomial<T, F>
where
    T: GroupCoeff<F>,
    F: Field,
{
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        if self.is_zero() {
            return rhs;
        } else if rhs.is_zero() {
            return self;
        }
        let coeffs = self
            .coeffs
            .into_iter()
            .zip_longest(rhs.coeffs)
            .map(|pair| match pair {
                Both(x, y) => x + y,
                Left(x) | Right(x) => x,
            })
            .collect();
        Self::from_coeff_vec(coeffs)
    }
}

impl<T, F> fmt::Debug for GeneralDensePolynomial<T, F>
where
    T: GroupCoeff<F>,
    F: Field,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> std::result::Result<(), fmt::Error> {
        for (i, coeff) in self.coeffs.iter().enumerate().filter(|(_, c)| !c.is_zero()) {
            if i == 0 {
                write!(f, "\n{:?}", coeff)?;
            } else if i == 1 {
                write!(f, " + \n{:?} * x", coeff)?;
            } else {
                write!(f, " + \n{:?} * x^{}", coeff, i)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::constant_curve::{G1Projective, ScalarField, E};
    use crate::kzg::srs::SRS;
    use ark_ec::{short_weierstrass::SWCurveConfig, AffineRepr, CurveGroup};
    use ark_poly::{univariate::DensePolynomial, DenseUVPolynomial, Polynomial};
    use ark_std::iter::successors;
    use ark_std::rand::Rng as _;
    use ark_std::test_rng;

    type Fr = ScalarField;

    #[test]
    fn test_poly_eval_single_point() {
        let mut rng = test_rng();
        for _ in 0..5 {
            let degree = rng.gen_range(5..40);
            let f = GeneralDensePolynomial::<Fr, Fr>::rand(degree, &mut rng);
            let g = GeneralDensePolynomial::<G1Projective, Fr>::rand(degree, &mut rng);
            let point = Fr::rand(&mut rng);

            let f_x = f.evaluate(&point);
            let expected_f_x: Fr =
                DensePolynomial::from_coefficients_slice(&f.coeffs).evaluate(&point);
            assert_eq!(f_x, expected_f_x);

            // g(X) = G0 + G1 * X + G2 * X^2 + ... is an MSM against [1, x, x^2, ...]
            let g_x = g.evaluate(&point);
            let scalars: Vec<Fr> = successors(Some(Fr::from(1u32)), |&prev| Some(prev * point))
                .take(g.degree() + 1)
                .collect();
            let expected_g_x =
                SWCurveConfig::msm(&CurveGroup::normalize_batch(&g.coeffs), &scalars).unwrap();
            assert_eq!(g_x, expected_g_x);
        }
    }

    #[test]
    fn test_poly_add() {
        let mut rng = test_rng();
        for _ in 0..5 {
            let degree = rng.gen_range(5..40);
            let f_1 = GeneralDensePolynomial::<Fr, Fr>::rand(degree, &mut rng);
            let mut f_2 = GeneralDensePolynomial::<Fr, Fr>::rand(degree, &mut rng);
            let expected_f_3 = DensePolynomial::from_coefficients_slice(&f_1.coeffs)
                + DensePolynomial::from_coefficients_slice(&f_2.coeffs);
            let f_3 = f_1.clone() + f_2.clone();
            assert_eq!(f_3.coeffs, expected_f_3.coeffs);

            f_2.coeffs[degree] = -f_1.coeffs[degree];
            let f_4 = f_1 + f_2;
            assert_eq!(f_4.degree(), degree - 1);
        }
    }

    #[test]
    fn test_vanishing() {
        let mut rng = test_rng();
        let roots: Vec<Fr> = (0..7).map(|_| Fr::rand(&mut rng)).collect();
        let z = GeneralDensePolynomial::vanishing(&roots);
        assert_eq!(z.degree(), roots.len());
        assert_eq!(z.coeffs.last(), Some(&Fr::from(1u32)));
        for root in &roots {
            assert!(z.evaluate(root).is_zero());
        }
        assert!(!z.evaluate(&Fr::rand(&mut rng)).is_zero());

        assert_eq!(GeneralDensePolynomial::<Fr, Fr>::vanishing(&[]).coeffs, vec![Fr::from(1u32)]);
    }

    #[test]
    fn test_batch_evaluate_rou() {
        let mut rng = test_rng();
        let srs: SRS<E> = SRS::setup(4, 2, &mut rng);

        let poly = GeneralDensePolynomial::<G1Projective, Fr>::from_coeff_vec(
            srs.powers_of_g.iter().map(|g| g.into_group()).collect(),
        );
        let subgroup = Domain::<Fr>::new(4).unwrap();

        let evals = poly.batch_evaluate_rou(&subgroup).unwrap();
        let expected: Vec<G1Projective> =
            (0..4).map(|i| poly.evaluate(&subgroup.element(i))).collect();
        assert_eq!(evals, expected);

        let too_small = Domain::<Fr>::new(2).unwrap();
        assert!(matches!(
            poly.batch_evaluate_rou(&too_small),
            Err(KzgError::InvalidPolynomialSize { size: 4, max: 2 })
        ));
    }
}
