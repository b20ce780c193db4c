//! Publicly Verifiable Secret Sharing (PVSS)
//!
//! Schoenmakers-style PVSS over a prime-order group with generators G and H:
//!
//! 1. a dealer splits a secret s into n shares s_i = f(i) of a random
//!    degree t-1 polynomial with f(0) = s, publishes commitments to f under H
//!    and encrypts each share to its recipient's public key X_i as s_i·X_i
//! 2. anyone checks each encrypted share against the commitments with a
//!    dleq proof, without learning anything about s
//! 3. recipients decrypt with their private key to s_i·G and prove it
//! 4. any t verified decrypted shares interpolate to s·G
//!
//! Every step is backed by a non-interactive Chaum-Pedersen proof, so a
//! cheating dealer or recipient is caught by any observer.
//!
//! # Curve Backends
//!
//! - `ristretto255` (default)
//! - `pallas`
//! - `secp256k1`
//!
//! # Example
//!
//! ```ignore
//! use pvss::{issue, decrypt, recover, PvssParams};
//!
//! let params = PvssParams::<RistrettoPoint>::default();
//! let (shares, poly) = issue(&params, &public_keys, &secret, t, &mut rng)?;
//!
//! // recipient i
//! let dec = decrypt(&params, &public_keys[i], &poly, &private_key, &shares[i], &mut rng)?;
//!
//! // anyone, with at least t decrypted shares
//! let secret_point = recover(params.g(), &keys, &enc, &dec, t, n)?;
//! ```

#[cfg(not(any(feature = "ristretto255", feature = "pallas", feature = "secp256k1")))]
compile_error!("enable at least one curve backend: ristretto255, pallas or secp256k1");

use std::collections::BTreeSet;

use rand_core::{CryptoRng, RngCore};
use tracing::{debug, warn};

pub mod curve;
pub mod dleq;
pub mod encoding;
mod error;
mod lagrange;
pub mod poly;
mod transcript;
mod types;

pub use curve::{PvssPoint, PvssScalar};
pub use dleq::DleqProof;
pub use encoding::AnyPoint;
pub use error::{PvssError, Result};
pub use lagrange::lagrange_coefficients;
pub use poly::{recover_commit, recover_secret, PriPoly, PriShare, PubPoly, PubShare};
pub use types::*;

/// Map `f` over `0..n`, on the rayon pool when `parallel` is enabled.
/// Output order always follows the index.
pub(crate) fn map_indices<U, F>(n: usize, f: F) -> Vec<U>
where
    U: Send,
    F: Fn(usize) -> U + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        (0..n).into_par_iter().map(f).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        (0..n).map(f).collect()
    }
}

/// Deal `secret` to the holders of `public_keys` with threshold `t`
///
/// Returns one encrypted share per public key (share i goes to
/// `public_keys[i - 1]`) and the public commitment polynomial under H.
///
/// The polynomial is drawn from `rng`, so every call must see fresh entropy;
/// two dealings of the same secret are then unlinkable.
pub fn issue<P, R>(
    params: &PvssParams<P>,
    public_keys: &[P],
    secret: &P::Scalar,
    t: u32,
    rng: &mut R,
) -> Result<(Vec<EncryptedShare<P>>, PubPoly<P>)>
where
    P: PvssPoint,
    R: RngCore + CryptoRng,
{
    if public_keys.is_empty() {
        return Err(PvssError::EmptyBatch);
    }
    let n = u32::try_from(public_keys.len()).map_err(|_| PvssError::InvalidThreshold {
        t,
        n: u32::MAX,
    })?;
    if t == 0 || t > n {
        return Err(PvssError::InvalidThreshold { t, n });
    }

    let poly = PriPoly::new(t, secret.clone(), rng)?;
    let pub_poly = poly.commit(params.h());
    let values: Vec<P::Scalar> = poly.shares(n).into_iter().map(|s| s.value).collect();

    // statement i: log_H(s_i·H) == log_{X_i}(s_i·X_i)
    let hs = vec![params.h().clone(); public_keys.len()];
    let (proofs, _, encrypted) = DleqProof::new_batch(&hs, public_keys, &values, rng)?;

    let shares = proofs
        .into_iter()
        .zip(encrypted)
        .zip(1..=n)
        .map(|((proof, value), index)| {
            EncryptedShare::from_parts(PubShare::new(index, value), proof)
        })
        .collect();

    debug!(group = P::GROUP, n, t, "issued encrypted shares");
    Ok((shares, pub_poly))
}

/// Check an encrypted share against the dealer's commitments
///
/// The proof must show log_H(poly(i)) == log_X(share). Only the proof
/// equations are checked here, against the challenge carried in the proof;
/// the batch challenge the dealer used spans the whole dealing and is
/// recomputed by [`verify_dealing`].
///
/// Anyone can build proof values that satisfy these equations for an
/// arbitrary share, so this check alone is not sound against a malicious
/// dealer. Use [`verify_dealing`] when the whole dealing is at hand.
pub fn verify_encrypted<P: PvssPoint>(
    h: &P,
    public_key: &P,
    poly: &PubPoly<P>,
    share: &EncryptedShare<P>,
) -> Result<()> {
    if share.index() == 0 {
        return Err(PvssError::EncVerificationFailed);
    }
    let sh = poly.eval(share.index()).value;
    if share.proof().verify(h, public_key, &sh, share.value()) {
        Ok(())
    } else {
        Err(PvssError::EncVerificationFailed)
    }
}

/// Verify many encrypted shares, dropping the ones that fail
///
/// Returns the public keys and shares that passed, in their original order.
pub fn verify_encrypted_batch<P: PvssPoint>(
    h: &P,
    public_keys: &[P],
    polys: &[PubPoly<P>],
    shares: &[EncryptedShare<P>],
) -> Result<(Vec<P>, Vec<EncryptedShare<P>>)> {
    if public_keys.len() != polys.len() || polys.len() != shares.len() {
        return Err(PvssError::DifferentLengths);
    }

    let valid = map_indices(shares.len(), |i| {
        verify_encrypted(h, &public_keys[i], &polys[i], &shares[i]).is_ok()
    });

    let mut keys = Vec::with_capacity(shares.len());
    let mut good = Vec::with_capacity(shares.len());
    for (i, ok) in valid.into_iter().enumerate() {
        if ok {
            keys.push(public_keys[i].clone());
            good.push(shares[i].clone());
        } else {
            warn!(position = i, index = shares[i].index(), "dropping invalid encrypted share");
        }
    }

    debug!(total = shares.len(), valid = good.len(), "verified encrypted shares");
    Ok((keys, good))
}

/// Decrypt an encrypted share with the recipient's private key `x`
///
/// The encrypted share is verified first. The result V = x⁻¹·(s_i·X) =
/// s_i·G comes with a proof that log_G(X) == log_V(s_i·X).
pub fn decrypt<P, R>(
    params: &PvssParams<P>,
    public_key: &P,
    poly: &PubPoly<P>,
    x: &P::Scalar,
    share: &EncryptedShare<P>,
    rng: &mut R,
) -> Result<DecryptedShare<P>>
where
    P: PvssPoint,
    R: RngCore + CryptoRng,
{
    verify_encrypted(params.h(), public_key, poly, share)?;
    decrypt_verified(params, x, share, rng)
}

fn decrypt_verified<P, R>(
    params: &PvssParams<P>,
    x: &P::Scalar,
    share: &EncryptedShare<P>,
    rng: &mut R,
) -> Result<DecryptedShare<P>>
where
    P: PvssPoint,
    R: RngCore + CryptoRng,
{
    let x_inv = x.invert().ok_or(PvssError::ZeroScalar)?;
    let v = share.value().mul_scalar(&x_inv);
    let (proof, _, _) = DleqProof::new(params.g(), &v, x, rng)?;
    Ok(DecryptedShare::from_parts(PubShare::new(share.index(), v), proof))
}

/// Decrypt many encrypted shares addressed to the same private key
///
/// Entries whose encrypted share fails verification, or that cannot be
/// decrypted, are left out of all three outputs without saying which; use
/// [`decrypt`] per entry when the failing entry matters.
#[allow(clippy::type_complexity)]
pub fn decrypt_batch<P, R>(
    params: &PvssParams<P>,
    public_keys: &[P],
    polys: &[PubPoly<P>],
    x: &P::Scalar,
    shares: &[EncryptedShare<P>],
    rng: &mut R,
) -> Result<(Vec<P>, Vec<EncryptedShare<P>>, Vec<DecryptedShare<P>>)>
where
    P: PvssPoint,
    R: RngCore + CryptoRng,
{
    if public_keys.len() != polys.len() || polys.len() != shares.len() {
        return Err(PvssError::DifferentLengths);
    }

    let valid = map_indices(shares.len(), |i| {
        verify_encrypted(params.h(), &public_keys[i], &polys[i], &shares[i]).is_ok()
    });

    let mut keys = Vec::with_capacity(shares.len());
    let mut enc = Vec::with_capacity(shares.len());
    let mut dec = Vec::with_capacity(shares.len());
    for (i, ok) in valid.into_iter().enumerate() {
        if !ok {
            continue;
        }
        if let Ok(d) = decrypt_verified(params, x, &shares[i], rng) {
            keys.push(public_keys[i].clone());
            enc.push(shares[i].clone());
            dec.push(d);
        }
    }

    debug!(total = shares.len(), decrypted = dec.len(), "decrypted share batch");
    Ok((keys, enc, dec))
}

/// Check a decrypted share against the encrypted share it came from
///
/// The proof must show log_G(X) == log_V(s_i·X) under its own recomputed
/// challenge, and both shares must carry the same index.
pub fn verify_decrypted<P: PvssPoint>(
    g: &P,
    public_key: &P,
    enc_share: &EncryptedShare<P>,
    dec_share: &DecryptedShare<P>,
) -> Result<()> {
    if enc_share.index() != dec_share.index() {
        return Err(PvssError::DecVerificationFailed);
    }
    if dec_share
        .proof()
        .verify_standalone(g, dec_share.value(), public_key, enc_share.value())
    {
        Ok(())
    } else {
        Err(PvssError::DecVerificationFailed)
    }
}

/// Verify many decrypted shares, returning only the ones that pass
pub fn verify_decrypted_batch<P: PvssPoint>(
    g: &P,
    public_keys: &[P],
    enc_shares: &[EncryptedShare<P>],
    dec_shares: &[DecryptedShare<P>],
) -> Result<Vec<DecryptedShare<P>>> {
    if public_keys.len() != enc_shares.len() || enc_shares.len() != dec_shares.len() {
        return Err(PvssError::DifferentLengths);
    }

    let valid = map_indices(dec_shares.len(), |i| {
        verify_decrypted(g, &public_keys[i], &enc_shares[i], &dec_shares[i]).is_ok()
    });

    let mut good = Vec::with_capacity(dec_shares.len());
    for (i, ok) in valid.into_iter().enumerate() {
        if ok {
            good.push(dec_shares[i].clone());
        } else {
            warn!(position = i, index = dec_shares[i].index(), "dropping invalid decrypted share");
        }
    }

    debug!(total = dec_shares.len(), valid = good.len(), "verified decrypted shares");
    Ok(good)
}

/// Recover s·G from the decrypted shares of one dealing
///
/// Invalid decrypted shares are discarded first, then shares whose index
/// lies outside `1..=n` or repeats an earlier one; at least `t` must remain.
/// With more than `t` survivors the `t` lowest indices are interpolated,
/// which gives the same point as any other `t` of them.
pub fn recover<P: PvssPoint>(
    g: &P,
    public_keys: &[P],
    enc_shares: &[EncryptedShare<P>],
    dec_shares: &[DecryptedShare<P>],
    t: u32,
    n: u32,
) -> Result<P> {
    if t == 0 || t > n {
        return Err(PvssError::InvalidThreshold { t, n });
    }

    let valid = verify_decrypted_batch(g, public_keys, enc_shares, dec_shares)?;

    // the decryption proof does not bind the index, so a relabelled or
    // replayed share can pass it; keep the first share per index in 1..=n
    let mut seen = BTreeSet::new();
    let mut shares: Vec<PubShare<P>> = Vec::with_capacity(valid.len());
    for (position, dec) in valid.into_iter().enumerate() {
        let index = dec.index();
        if index == 0 || index > n {
            warn!(position, index, n, "dropping decrypted share with out-of-range index");
        } else if !seen.insert(index) {
            warn!(position, index, "dropping decrypted share with duplicate index");
        } else {
            shares.push(dec.into_parts().0);
        }
    }

    if shares.len() < t as usize {
        warn!(got = shares.len(), need = t, "not enough valid shares to recover");
        return Err(PvssError::TooFewShares {
            got: shares.len(),
            need: t as usize,
        });
    }

    let secret = recover_commit(&shares, t, n)?;
    debug!(group = P::GROUP, t, n, "recovered secret commitment");
    Ok(secret)
}

/// Verify a complete dealing, recomputing the dealer's shared challenge
///
/// Stricter than [`verify_encrypted_batch`]: the proofs must also be the
/// ones produced together for exactly these recipients and commitments.
/// Returns validity per share.
pub fn verify_dealing<P: PvssPoint>(
    params: &PvssParams<P>,
    public_keys: &[P],
    poly: &PubPoly<P>,
    shares: &[EncryptedShare<P>],
) -> Result<Vec<bool>> {
    if public_keys.len() != shares.len() {
        return Err(PvssError::DifferentLengths);
    }
    if shares.is_empty() {
        return Err(PvssError::EmptyBatch);
    }

    let hs = vec![params.h().clone(); shares.len()];
    let shs: Vec<P> = map_indices(shares.len(), |i| poly.eval(shares[i].index()).value);
    let sxs: Vec<P> = shares.iter().map(|s| s.value().clone()).collect();
    let proofs: Vec<DleqProof<P>> = shares.iter().map(|s| s.proof().clone()).collect();

    let mut results = DleqProof::verify_batch(&proofs, &hs, public_keys, &shs, &sxs)?;
    for (i, share) in shares.iter().enumerate() {
        // indices are 1..=n in dealing order
        if share.index() as usize != i + 1 {
            results[i] = false;
        }
    }

    let valid = results.iter().filter(|&&ok| ok).count();
    if valid < shares.len() {
        warn!(total = shares.len(), valid, "dealing contains invalid shares");
    }
    Ok(results)
}



#[cfg(all(test, feature = "secp256k1"))]
mod secp256k1_tests {
    use super::*;
    use k256::{ProjectivePoint, Scalar};
    use rand::rngs::OsRng;

    #[test]
    fn test_secp256k1_round_trip() {
        let mut rng = OsRng;
        let params = PvssParams::<ProjectivePoint>::default();
        let xs: Vec<Scalar> = (0..3).map(|_| <Scalar as PvssScalar>::random(&mut rng)).collect();
        let keys: Vec<ProjectivePoint> = xs.iter().map(|x| params.g().mul_scalar(x)).collect();
        let secret = <Scalar as PvssScalar>::random(&mut rng);

        let (enc, poly) = issue(&params, &keys, &secret, 2, &mut rng).unwrap();
        let dec: Vec<_> = (0..3)
            .map(|i| decrypt(&params, &keys[i], &poly, &xs[i], &enc[i], &mut rng).unwrap())
            .collect();

        let recovered = recover(params.g(), &keys, &enc, &dec, 2, 3).unwrap();
        assert_eq!(recovered, params.g().mul_scalar(&secret));
    }
}
