//! Discrete-log equality (Chaum-Pedersen) proofs
//!
//! Proves knowledge of x such that xG = x·G and xH = x·H without revealing x:
//!
//! ```text
//! prover:   v random, vG = v·G, vH = v·H, c = Hash(..), r = v - c·x
//! verifier: vG == r·G + c·xG  and  vH == r·H + c·xH
//! ```
//!
//! The batch variant proves n statements at once with one challenge derived
//! from every statement and commitment, so the whole batch shares a single
//! fiat-shamir transcript.

use rand_core::{CryptoRng, RngCore};

use crate::curve::{PvssPoint, PvssScalar};
use crate::error::{PvssError, Result};
use crate::map_indices;
use crate::transcript::Transcript;

const DLEQ_DOMAIN_SEP: &[u8] = b"pvss.dleq.v1";
const DLEQ_BATCH_DOMAIN_SEP: &[u8] = b"pvss.dleq-batch.v1";

/// A non-interactive dleq proof
#[derive(Clone, Debug, PartialEq)]
pub struct DleqProof<P: PvssPoint> {
    /// challenge
    pub c: P::Scalar,
    /// response r = v - c·x
    pub r: P::Scalar,
    /// commitment v·G
    pub vg: P,
    /// commitment v·H
    pub vh: P,
}

impl<P: PvssPoint> DleqProof<P> {
    /// Prove log_G(x·G) == log_H(x·H)
    ///
    /// Returns the proof together with x·G and x·H.
    pub fn new<R: RngCore + CryptoRng>(
        g: &P,
        h: &P,
        x: &P::Scalar,
        rng: &mut R,
    ) -> Result<(Self, P, P)> {
        if x.is_zero() {
            return Err(PvssError::ZeroScalar);
        }

        let xg = g.mul_scalar(x);
        let xh = h.mul_scalar(x);

        let v = P::Scalar::random(rng);
        let vg = g.mul_scalar(&v);
        let vh = h.mul_scalar(&v);

        let c: P::Scalar = single_challenge(g, h, &xg, &xh, &vg, &vh);
        let r = v.sub(&c.mul(x));

        Ok((Self { c, r, vg, vh }, xg, xh))
    }

    /// Prove n statements log_{G_i}(x_i·G_i) == log_{H_i}(x_i·H_i) with one
    /// shared challenge
    ///
    /// Returns the proofs together with every x_i·G_i and x_i·H_i.
    #[allow(clippy::type_complexity)]
    pub fn new_batch<R: RngCore + CryptoRng>(
        gs: &[P],
        hs: &[P],
        xs: &[P::Scalar],
        rng: &mut R,
    ) -> Result<(Vec<Self>, Vec<P>, Vec<P>)> {
        if gs.len() != hs.len() || hs.len() != xs.len() {
            return Err(PvssError::DifferentLengths);
        }
        if xs.is_empty() {
            return Err(PvssError::EmptyBatch);
        }
        let n = xs.len();

        // nonces drawn up front, the rng is not shared across workers
        let nonces: Vec<P::Scalar> = (0..n).map(|_| P::Scalar::random(rng)).collect();

        let points: Vec<(P, P, P, P)> = map_indices(n, |i| {
            (
                gs[i].mul_scalar(&xs[i]),
                hs[i].mul_scalar(&xs[i]),
                gs[i].mul_scalar(&nonces[i]),
                hs[i].mul_scalar(&nonces[i]),
            )
        });

        let mut xgs = Vec::with_capacity(n);
        let mut xhs = Vec::with_capacity(n);
        let mut vgs = Vec::with_capacity(n);
        let mut vhs = Vec::with_capacity(n);
        for (xg, xh, vg, vh) in points {
            xgs.push(xg);
            xhs.push(xh);
            vgs.push(vg);
            vhs.push(vh);
        }

        let c: P::Scalar = batch_challenge(gs, hs, &xgs, &xhs, &vgs, &vhs);

        let proofs = vgs
            .into_iter()
            .zip(vhs)
            .zip(nonces.iter().zip(xs.iter()))
            .map(|((vg, vh), (v, x))| Self {
                c: c.clone(),
                r: v.sub(&c.mul(x)),
                vg,
                vh,
            })
            .collect();

        Ok((proofs, xgs, xhs))
    }

    /// Check the proof equations against (G, H, xG, xH)
    ///
    /// This does not recompute the challenge, so it also accepts members of
    /// a batch whose challenge depends on the other statements.
    pub fn verify(&self, g: &P, h: &P, xg: &P, xh: &P) -> bool {
        let scalars = [self.r.clone(), self.c.clone()];
        let a = P::multiscalar_mul(&scalars, &[g.clone(), xg.clone()]);
        let b = P::multiscalar_mul(&scalars, &[h.clone(), xh.clone()]);
        self.vg == a && self.vh == b
    }

    /// Verify a proof made by [`DleqProof::new`], including its challenge
    pub fn verify_standalone(&self, g: &P, h: &P, xg: &P, xh: &P) -> bool {
        let c: P::Scalar = single_challenge(g, h, xg, xh, &self.vg, &self.vh);
        c == self.c && self.verify(g, h, xg, xh)
    }

    /// Verify a complete batch made by [`DleqProof::new_batch`]
    ///
    /// Recomputes the shared challenge and reports validity per statement.
    pub fn verify_batch(
        proofs: &[Self],
        gs: &[P],
        hs: &[P],
        xgs: &[P],
        xhs: &[P],
    ) -> Result<Vec<bool>> {
        let n = proofs.len();
        if gs.len() != n || hs.len() != n || xgs.len() != n || xhs.len() != n {
            return Err(PvssError::DifferentLengths);
        }
        if n == 0 {
            return Err(PvssError::EmptyBatch);
        }

        let vgs: Vec<P> = proofs.iter().map(|p| p.vg.clone()).collect();
        let vhs: Vec<P> = proofs.iter().map(|p| p.vh.clone()).collect();
        let c: P::Scalar = batch_challenge(gs, hs, xgs, xhs, &vgs, &vhs);

        Ok(map_indices(n, |i| {
            proofs[i].c == c && proofs[i].verify(&gs[i], &hs[i], &xgs[i], &xhs[i])
        }))
    }
}

fn single_challenge<P: PvssPoint>(g: &P, h: &P, xg: &P, xh: &P, vg: &P, vh: &P) -> P::Scalar {
    let mut t = Transcript::new(DLEQ_DOMAIN_SEP);
    t.append_message(b"group", P::GROUP.as_bytes());
    t.append_point(b"G", g);
    t.append_point(b"H", h);
    t.append_point(b"xG", xg);
    t.append_point(b"xH", xh);
    t.append_point(b"vG", vg);
    t.append_point(b"vH", vh);
    t.challenge_scalar(b"c")
}

fn batch_challenge<P: PvssPoint>(
    gs: &[P],
    hs: &[P],
    xgs: &[P],
    xhs: &[P],
    vgs: &[P],
    vhs: &[P],
) -> P::Scalar {
    let mut t = Transcript::new(DLEQ_BATCH_DOMAIN_SEP);
    t.append_message(b"group", P::GROUP.as_bytes());
    t.append_u64(b"n", gs.len() as u64);
    for i in 0..gs.len() {
        t.append_point(b"G", &gs[i]);
        t.append_point(b"H", &hs[i]);
        t.append_point(b"xG", &xgs[i]);
        t.append_point(b"xH", &xhs[i]);
        t.append_point(b"vG", &vgs[i]);
        t.append_point(b"vH", &vhs[i]);
    }
    t.challenge_scalar(b"c")
}
