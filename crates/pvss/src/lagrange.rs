//! Lagrange interpolation at zero
//!
//! For a set Q = {i_1, ..., i_k} of distinct non-zero indices the
//! coefficient of index i is
//!
//! λ_i = Π_{j ∈ Q, j ≠ i} j / (j - i)
//!
//! so that f(0) = Σ λ_i · f(i) for every polynomial f of degree < k.
//! All k denominators are inverted together with a single field inversion
//! (Montgomery's trick).

use crate::curve::PvssScalar;
use crate::error::{PvssError, Result};

/// Compute λ_i for each index, in input order.
pub fn lagrange_coefficients<S: PvssScalar>(indices: &[u32]) -> Result<Vec<S>> {
    if indices.is_empty() {
        return Err(PvssError::EmptyBatch);
    }
    if let Some(&zero) = indices.iter().find(|&&i| i == 0) {
        return Err(PvssError::InvalidIndex(zero));
    }
    let mut sorted = indices.to_vec();
    sorted.sort_unstable();
    if let Some(pair) = sorted.windows(2).find(|w| w[0] == w[1]) {
        return Err(PvssError::DuplicateIndex(pair[0]));
    }

    let xs: Vec<S> = indices.iter().map(|&i| S::from_u32(i)).collect();

    let mut numerators = Vec::with_capacity(xs.len());
    let mut denominators = Vec::with_capacity(xs.len());
    for (i, x_i) in xs.iter().enumerate() {
        let mut num = S::one();
        let mut den = S::one();
        for (j, x_j) in xs.iter().enumerate() {
            if i != j {
                num = num.mul(x_j);
                den = den.mul(&x_j.sub(x_i));
            }
        }
        numerators.push(num);
        denominators.push(den);
    }

    batch_invert(&mut denominators)?;

    Ok(numerators
        .iter()
        .zip(denominators.iter())
        .map(|(num, den_inv)| num.mul(den_inv))
        .collect())
}

/// Invert every element in place using one inversion.
pub(crate) fn batch_invert<S: PvssScalar>(values: &mut [S]) -> Result<()> {
    // prefix[i] = v_0 · ... · v_{i-1}
    let mut prefix = Vec::with_capacity(values.len());
    let mut acc = S::one();
    for v in values.iter() {
        prefix.push(acc.clone());
        acc = acc.mul(v);
    }

    let mut inv = acc.invert().ok_or(PvssError::ZeroScalar)?;
    for (v, before) in values.iter_mut().zip(prefix.iter()).rev() {
        let v_inv = inv.mul(before);
        inv = inv.mul(v);
        *v = v_inv;
    }
    Ok(())
}

#[cfg(all(test, feature = "ristretto255"))]
mod tests {
    use super::*;
    use curve25519_dalek::scalar::Scalar;

    #[test]
    fn test_lagrange_single() {
        let coeffs = lagrange_coefficients::<Scalar>(&[4]).unwrap();
        assert_eq!(coeffs, vec![Scalar::ONE]);
    }

    #[test]
    fn test_lagrange_two_points() {
        // Q = {1, 2}: λ_1 = 2, λ_2 = -1
        let coeffs = lagrange_coefficients::<Scalar>(&[1, 2]).unwrap();
        assert_eq!(coeffs[0], Scalar::from(2u32));
        assert_eq!(coeffs[1], -Scalar::ONE);
    }

    #[test]
    fn test_lagrange_interpolates_quadratic() {
        // f(x) = 1 + 2x + 3x², f(1) = 6, f(3) = 34, f(5) = 86
        let coeffs = lagrange_coefficients::<Scalar>(&[5, 1, 3]).unwrap();
        let f = [Scalar::from(86u32), Scalar::from(6u32), Scalar::from(34u32)];
        let at_zero: Scalar = coeffs.iter().zip(f.iter()).map(|(l, y)| l * y).sum();
        assert_eq!(at_zero, Scalar::ONE);
    }

    #[test]
    fn test_partition_of_unity() {
        for k in 1..=12u32 {
            let indices: Vec<u32> = (1..=k).map(|i| 3 * i + 1).collect();
            let coeffs = lagrange_coefficients::<Scalar>(&indices).unwrap();
            let sum: Scalar = coeffs.iter().sum();
            assert_eq!(sum, Scalar::ONE, "k = {}", k);
        }
    }

    #[test]
    fn test_lagrange_errors() {
        assert_eq!(
            lagrange_coefficients::<Scalar>(&[]),
            Err(PvssError::EmptyBatch)
        );
        assert_eq!(
            lagrange_coefficients::<Scalar>(&[2, 0, 1]),
            Err(PvssError::InvalidIndex(0))
        );
        assert_eq!(
            lagrange_coefficients::<Scalar>(&[3, 1, 3]),
            Err(PvssError::DuplicateIndex(3))
        );
    }

    #[test]
    fn test_batch_invert() {
        let mut values: Vec<Scalar> = (1..=6u32).map(Scalar::from).collect();
        let original = values.clone();
        batch_invert(&mut values).unwrap();
        for (v, inv) in original.iter().zip(values.iter()) {
            assert_eq!(v * inv, Scalar::ONE);
        }

        let mut with_zero = vec![Scalar::ONE, Scalar::ZERO];
        assert_eq!(batch_invert(&mut with_zero), Err(PvssError::ZeroScalar));
    }
}
