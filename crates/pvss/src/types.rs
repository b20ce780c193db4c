//! Public parameters and publicly verifiable shares

use core::marker::PhantomData;

use crate::curve::PvssPoint;
use crate::dleq::DleqProof;
use crate::error::{PvssError, Result};
use crate::poly::PubShare;

/// Label hashed to the default second generator H
pub const DEFAULT_H_LABEL: &[u8] = b"pvss.commitment-base.v1";

/// Group parameters shared by dealer, recipients and verifiers
///
/// `g` is the standard generator under which key pairs live, `h` the base
/// the dealer commits its polynomial under. Nobody may know log_G(H).
#[derive(Clone, Debug, PartialEq)]
pub struct PvssParams<P: PvssPoint> {
    g: P,
    h: P,
}

impl<P: PvssPoint> PvssParams<P> {
    /// Use an explicit commitment base
    pub fn new(h: P) -> Result<Self> {
        let g = P::generator();
        if h == g || h == P::identity() {
            return Err(PvssError::InvalidCommitmentBase);
        }
        Ok(Self { g, h })
    }

    /// Derive H by hashing `label` to the group
    pub fn derive(label: &[u8]) -> Result<Self> {
        Self::new(P::hash_to_point(label))
    }

    #[inline]
    pub fn g(&self) -> &P {
        &self.g
    }

    #[inline]
    pub fn h(&self) -> &P {
        &self.h
    }
}

impl<P: PvssPoint> Default for PvssParams<P> {
    fn default() -> Self {
        // hash_to_point never lands on the generator or the identity
        // except with negligible probability
        let h = P::hash_to_point(DEFAULT_H_LABEL);
        Self {
            g: P::generator(),
            h,
        }
    }
}

/// Marker for what a [`PubVerShare`] proves
pub trait ShareFlavor: Clone + Copy + core::fmt::Debug + PartialEq + Send + Sync + 'static {
    /// wire tag
    const FLAG: u8;
    const NAME: &'static str;
}

/// Share encrypted to a recipient: S = s·X, proof of log_H(sH) == log_X(sX)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Encrypted;

/// Share decrypted by its recipient: V = s·G, proof of log_G(X) == log_V(sX)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Decrypted;

impl ShareFlavor for Encrypted {
    const FLAG: u8 = 0x01;
    const NAME: &'static str = "encrypted";
}

impl ShareFlavor for Decrypted {
    const FLAG: u8 = 0x02;
    const NAME: &'static str = "decrypted";
}

/// A group-element share together with the dleq proof that makes it
/// publicly verifiable
#[derive(Clone, Debug, PartialEq)]
pub struct PubVerShare<P: PvssPoint, F: ShareFlavor> {
    share: PubShare<P>,
    proof: DleqProof<P>,
    _flavor: PhantomData<F>,
}

pub type EncryptedShare<P> = PubVerShare<P, Encrypted>;
pub type DecryptedShare<P> = PubVerShare<P, Decrypted>;

impl<P: PvssPoint, F: ShareFlavor> PubVerShare<P, F> {
    /// Assemble a share from received parts; nothing is checked here
    pub fn from_parts(share: PubShare<P>, proof: DleqProof<P>) -> Self {
        Self {
            share,
            proof,
            _flavor: PhantomData,
        }
    }

    #[inline]
    pub fn index(&self) -> u32 {
        self.share.index
    }

    #[inline]
    pub fn value(&self) -> &P {
        &self.share.value
    }

    #[inline]
    pub fn share(&self) -> &PubShare<P> {
        &self.share
    }

    #[inline]
    pub fn proof(&self) -> &DleqProof<P> {
        &self.proof
    }

    pub fn into_parts(self) -> (PubShare<P>, DleqProof<P>) {
        (self.share, self.proof)
    }
}
