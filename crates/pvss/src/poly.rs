//! Shamir secret-sharing polynomials and their commitments
//!
//! The dealer samples a private polynomial f of degree t-1 with f(0) equal
//! to the secret, hands out evaluations f(i) for i = 1..=n and publishes a
//! commitment [a_0·B, ..., a_{t-1}·B] to the coefficients under some base B.
//! Anyone can then evaluate the commitment at i to obtain f(i)·B, and t
//! evaluations in the exponent interpolate back to f(0)·B.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::curve::{PvssPoint, PvssScalar};
use crate::error::{PvssError, Result};
use crate::lagrange::lagrange_coefficients;

/// Evaluation of a private polynomial at `index`
#[derive(Clone, PartialEq)]
pub struct PriShare<S: PvssScalar> {
    /// 1-based index
    pub index: u32,
    pub value: S,
}

impl<S: PvssScalar> PriShare<S> {
    pub fn new(index: u32, value: S) -> Self {
        Self { index, value }
    }
}

impl<S: PvssScalar> core::fmt::Debug for PriShare<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PriShare")
            .field("index", &self.index)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// Group-element share at `index` (commitment evaluation, encrypted or
/// decrypted share value)
#[derive(Clone, Debug, PartialEq)]
pub struct PubShare<P: PvssPoint> {
    /// 1-based index
    pub index: u32,
    pub value: P,
}

impl<P: PvssPoint> PubShare<P> {
    pub fn new(index: u32, value: P) -> Self {
        Self { index, value }
    }
}

/// Secret polynomial, lives only inside the dealer
pub struct PriPoly<S: PvssScalar> {
    /// [a_0 = secret, a_1, ..., a_{t-1}]
    coefficients: Vec<S>,
}

impl<S: PvssScalar> PriPoly<S> {
    /// Random polynomial of degree `threshold - 1` with constant term `secret`
    pub fn new<R: rand_core::RngCore + rand_core::CryptoRng>(
        threshold: u32,
        secret: S,
        rng: &mut R,
    ) -> Result<Self> {
        if threshold == 0 {
            return Err(PvssError::InvalidThreshold { t: 0, n: 0 });
        }

        let mut coefficients = Vec::with_capacity(threshold as usize);
        coefficients.push(secret);
        for _ in 1..threshold {
            coefficients.push(S::random(rng));
        }

        Ok(Self { coefficients })
    }

    #[inline]
    pub fn threshold(&self) -> u32 {
        self.coefficients.len() as u32
    }

    /// f(0)
    #[inline]
    pub fn secret(&self) -> &S {
        &self.coefficients[0]
    }

    /// f(index), Horner's method
    pub fn eval(&self, index: u32) -> PriShare<S> {
        let x = S::from_u32(index);
        let value = self
            .coefficients
            .iter()
            .rev()
            .fold(S::zero(), |acc, a| acc.mul(&x).add(a));
        PriShare::new(index, value)
    }

    /// f(1), ..., f(n)
    pub fn shares(&self, n: u32) -> Vec<PriShare<S>> {
        (1..=n).map(|i| self.eval(i)).collect()
    }

    /// Commit to every coefficient under `base`
    pub fn commit<P: PvssPoint<Scalar = S>>(&self, base: &P) -> PubPoly<P> {
        let commits = self
            .coefficients
            .iter()
            .map(|a| base.mul_scalar(a))
            .collect();
        PubPoly {
            base: base.clone(),
            commits,
        }
    }
}

impl<S: PvssScalar> Zeroize for PriPoly<S> {
    fn zeroize(&mut self) {
        for a in self.coefficients.iter_mut() {
            PvssScalar::zeroize(a);
        }
    }
}

impl<S: PvssScalar> Drop for PriPoly<S> {
    fn drop(&mut self) {
        Zeroize::zeroize(self);
    }
}

impl<S: PvssScalar> ZeroizeOnDrop for PriPoly<S> {}

// Prevent Debug from leaking the polynomial
impl<S: PvssScalar> core::fmt::Debug for PriPoly<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PriPoly")
            .field("threshold", &self.threshold())
            .field("coefficients", &"[REDACTED]")
            .finish()
    }
}

/// Public commitment polynomial [a_0·B, ..., a_{t-1}·B]
#[derive(Clone, Debug, PartialEq)]
pub struct PubPoly<P: PvssPoint> {
    pub(crate) base: P,
    pub(crate) commits: Vec<P>,
}

impl<P: PvssPoint> PubPoly<P> {
    /// Rebuild from a base and coefficient commitments
    pub fn new(base: P, commits: Vec<P>) -> Result<Self> {
        if commits.is_empty() {
            return Err(PvssError::InvalidThreshold { t: 0, n: 0 });
        }
        Ok(Self { base, commits })
    }

    #[inline]
    pub fn base(&self) -> &P {
        &self.base
    }

    #[inline]
    pub fn commits(&self) -> &[P] {
        &self.commits
    }

    /// Threshold (degree + 1) of the committed polynomial
    #[inline]
    pub fn threshold(&self) -> u32 {
        self.commits.len() as u32
    }

    /// Commitment to the secret, a_0·B
    #[inline]
    pub fn commit(&self) -> &P {
        &self.commits[0]
    }

    /// f(index)·B = Σ_k C_k · index^k, Horner's method
    pub fn eval(&self, index: u32) -> PubShare<P> {
        let x = P::Scalar::from_u32(index);
        let value = self
            .commits
            .iter()
            .rev()
            .fold(P::identity(), |acc, c| acc.mul_scalar(&x).add(c));
        PubShare::new(index, value)
    }

    /// Check a private share against the commitment: f(i)·B == eval(i)
    pub fn check(&self, share: &PriShare<P::Scalar>) -> bool {
        if share.index == 0 {
            return false;
        }
        self.base.mul_scalar(&share.value) == self.eval(share.index).value
    }
}

/// Validate indices against `1..=n`, then keep the first `t` by index.
fn select_shares<T: Clone>(
    shares: &[T],
    index_of: impl Fn(&T) -> u32,
    t: u32,
    n: u32,
) -> Result<(Vec<u32>, Vec<T>)> {
    if t == 0 || t > n {
        return Err(PvssError::InvalidThreshold { t, n });
    }

    let mut selected: Vec<T> = shares.to_vec();
    for s in &selected {
        let i = index_of(s);
        if i == 0 || i > n {
            return Err(PvssError::InvalidIndex(i));
        }
    }
    selected.sort_by_key(|s| index_of(s));
    if let Some(pair) = selected.windows(2).find(|w| index_of(&w[0]) == index_of(&w[1])) {
        return Err(PvssError::DuplicateIndex(index_of(&pair[0])));
    }

    if selected.len() < t as usize {
        return Err(PvssError::TooFewShares {
            got: selected.len(),
            need: t as usize,
        });
    }
    selected.truncate(t as usize);

    let indices = selected.iter().map(&index_of).collect();
    Ok((indices, selected))
}

/// Recover f(0) from at least `t` private shares
pub fn recover_secret<S: PvssScalar>(shares: &[PriShare<S>], t: u32, n: u32) -> Result<S> {
    let (indices, selected) = select_shares(shares, |s| s.index, t, n)?;
    let lambdas = lagrange_coefficients::<S>(&indices)?;
    Ok(selected
        .iter()
        .zip(lambdas.iter())
        .fold(S::zero(), |acc, (s, l)| acc.add(&l.mul(&s.value))))
}

/// Recover f(0)·B from at least `t` public shares f(i)·B
///
/// Any `t` shares with distinct valid indices give the same result; when
/// more are supplied the `t` lowest indices are used.
pub fn recover_commit<P: PvssPoint>(shares: &[PubShare<P>], t: u32, n: u32) -> Result<P> {
    let (indices, selected) = select_shares(shares, |s| s.index, t, n)?;
    let lambdas = lagrange_coefficients::<P::Scalar>(&indices)?;
    let points: Vec<P> = selected.into_iter().map(|s| s.value).collect();
    Ok(P::multiscalar_mul(&lambdas, &points))
}
