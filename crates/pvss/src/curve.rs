//! Group abstraction for PVSS
//!
//! The protocol only ever talks to these traits, so any prime-order group
//! with a fixed-size encoding can back it:
//! - ristretto255 (default)
//! - Pallas (Zcash Orchard compatible)
//! - secp256k1 (Bitcoin compatible)

use core::fmt::Debug;

use rand_core::{CryptoRng, RngCore};
use sha2::{Digest, Sha512};

use crate::error::{PvssError, Result};

/// Domain separator for hashing onto the group
const HASH_TO_POINT_DOMAIN: &[u8] = b"pvss.hash-to-point.v1";

/// Upper bound on random candidates tried when embedding data
const EMBED_ATTEMPTS: usize = 256;

/// Scalar field element
pub trait PvssScalar: Clone + Debug + Sized + PartialEq + Send + Sync {
    /// Encoded size in bytes
    const ENCODED_LEN: usize;

    fn zero() -> Self;

    fn one() -> Self;

    fn from_u32(v: u32) -> Self;

    fn add(&self, other: &Self) -> Self;

    fn sub(&self, other: &Self) -> Self;

    fn mul(&self, other: &Self) -> Self;

    fn neg(&self) -> Self;

    /// Multiplicative inverse, `None` for zero
    fn invert(&self) -> Option<Self>;

    /// `self / other`, `None` when `other` is zero
    fn div(&self, other: &Self) -> Option<Self> {
        other.invert().map(|inv| self.mul(&inv))
    }

    fn is_zero(&self) -> bool {
        *self == Self::zero()
    }

    /// Uniformly random scalar
    fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self;

    /// Reduce a 64-byte hash output modulo the group order
    fn from_bytes_wide(bytes: &[u8; 64]) -> Self;

    fn to_bytes(&self) -> Vec<u8>;

    /// Decode a canonical encoding of exactly `ENCODED_LEN` bytes
    fn from_bytes(bytes: &[u8]) -> Option<Self>;

    /// Overwrite with zero in a way the compiler cannot elide
    fn zeroize(&mut self);
}

/// Group element
pub trait PvssPoint: Clone + Debug + Sized + PartialEq + Send + Sync {
    type Scalar: PvssScalar;

    /// Tag written into serialized values
    const GROUP: &'static str;

    /// Encoded size in bytes (32 for ristretto/pallas, 33 for secp256k1)
    const ENCODED_LEN: usize;

    /// Position of the length byte when data is embedded in an encoding
    const EMBED_OFFSET: usize = 1;

    fn identity() -> Self;

    fn generator() -> Self;

    fn add(&self, other: &Self) -> Self;

    fn neg(&self) -> Self;

    fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    fn mul_scalar(&self, scalar: &Self::Scalar) -> Self;

    /// Σ s_i·P_i
    fn multiscalar_mul(scalars: &[Self::Scalar], points: &[Self]) -> Self {
        scalars
            .iter()
            .zip(points.iter())
            .fold(Self::identity(), |acc, (s, p)| acc.add(&p.mul_scalar(s)))
    }

    fn to_bytes(&self) -> Vec<u8>;

    /// Decode an encoding of exactly `ENCODED_LEN` bytes
    fn from_bytes(bytes: &[u8]) -> Option<Self>;

    /// Fix up format bytes of a candidate encoding before decoding
    /// (e.g. the sec1 prefix). Default leaves the buffer untouched.
    fn frame_candidate(_buf: &mut [u8]) {}

    /// Maximum number of bytes `embed` can carry
    fn embed_len() -> usize {
        // length byte, plus a trailing byte left random for sign/range bits
        Self::ENCODED_LEN - Self::EMBED_OFFSET - 2
    }

    /// Pick a point whose encoding carries `data`
    ///
    /// Layout: `[random.. | len | data | random..]`, resampled until the
    /// candidate decodes to a valid point.
    fn embed<R: RngCore + CryptoRng>(data: &[u8], rng: &mut R) -> Result<Self> {
        let max = Self::embed_len();
        if data.len() > max {
            return Err(PvssError::EmbedTooLong {
                len: data.len(),
                max,
            });
        }

        let mut buf = vec![0u8; Self::ENCODED_LEN];
        let start = Self::EMBED_OFFSET + 1;
        for _ in 0..EMBED_ATTEMPTS {
            rng.fill_bytes(&mut buf);
            buf[Self::EMBED_OFFSET] = data.len() as u8;
            buf[start..start + data.len()].copy_from_slice(data);
            Self::frame_candidate(&mut buf);
            if let Some(point) = Self::from_bytes(&buf) {
                return Ok(point);
            }
        }
        Err(PvssError::InvalidPoint)
    }

    /// Recover bytes embedded with `embed`
    fn extract(&self) -> Option<Vec<u8>> {
        let bytes = self.to_bytes();
        let len = *bytes.get(Self::EMBED_OFFSET)? as usize;
        if len > Self::embed_len() {
            return None;
        }
        let start = Self::EMBED_OFFSET + 1;
        Some(bytes[start..start + len].to_vec())
    }

    /// Hash a message onto the group (try-and-increment)
    ///
    /// Nobody learns the discrete log of the result with respect to the
    /// generator, which is what a commitment base needs.
    fn hash_to_point(msg: &[u8]) -> Self {
        let mut counter: u32 = 0;
        loop {
            let mut hasher = Sha512::new();
            hasher.update(HASH_TO_POINT_DOMAIN);
            hasher.update((msg.len() as u64).to_le_bytes());
            hasher.update(msg);
            hasher.update(counter.to_le_bytes());
            let hash = hasher.finalize();

            let mut candidate = hash[..Self::ENCODED_LEN].to_vec();
            Self::frame_candidate(&mut candidate);
            if let Some(point) = Self::from_bytes(&candidate) {
                if point != Self::identity() {
                    return point;
                }
            }
            counter = counter.wrapping_add(1);
        }
    }
}

// ============================================================================
// Ristretto255 implementation
// ============================================================================

#[cfg(feature = "ristretto255")]
pub mod ristretto {
    use super::*;
    use curve25519_dalek::{
        constants::RISTRETTO_BASEPOINT_POINT,
        ristretto::{CompressedRistretto, RistrettoPoint},
        scalar::Scalar,
        traits::{Identity, MultiscalarMul},
    };
    use zeroize::Zeroize;

    impl PvssScalar for Scalar {
        const ENCODED_LEN: usize = 32;

        fn zero() -> Self {
            Scalar::ZERO
        }

        fn one() -> Self {
            Scalar::ONE
        }

        fn from_u32(v: u32) -> Self {
            Scalar::from(v)
        }

        fn add(&self, other: &Self) -> Self {
            self + other
        }

        fn sub(&self, other: &Self) -> Self {
            self - other
        }

        fn mul(&self, other: &Self) -> Self {
            self * other
        }

        fn neg(&self) -> Self {
            -self
        }

        fn invert(&self) -> Option<Self> {
            if *self == Scalar::ZERO {
                None
            } else {
                Some(Scalar::invert(self))
            }
        }

        fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
            Scalar::random(rng)
        }

        fn from_bytes_wide(bytes: &[u8; 64]) -> Self {
            Scalar::from_bytes_mod_order_wide(bytes)
        }

        fn to_bytes(&self) -> Vec<u8> {
            Scalar::to_bytes(self).to_vec()
        }

        fn from_bytes(bytes: &[u8]) -> Option<Self> {
            let arr: [u8; 32] = bytes.try_into().ok()?;
            Option::from(Scalar::from_canonical_bytes(arr))
        }

        fn zeroize(&mut self) {
            Zeroize::zeroize(self)
        }
    }

    impl PvssPoint for RistrettoPoint {
        type Scalar = Scalar;

        const GROUP: &'static str = "ristretto255";

        const ENCODED_LEN: usize = 32;

        fn identity() -> Self {
            <RistrettoPoint as Identity>::identity()
        }

        fn generator() -> Self {
            RISTRETTO_BASEPOINT_POINT
        }

        fn add(&self, other: &Self) -> Self {
            self + other
        }

        fn neg(&self) -> Self {
            -self
        }

        fn sub(&self, other: &Self) -> Self {
            self - other
        }

        fn mul_scalar(&self, scalar: &Self::Scalar) -> Self {
            self * scalar
        }

        fn multiscalar_mul(scalars: &[Self::Scalar], points: &[Self]) -> Self {
            <RistrettoPoint as MultiscalarMul>::multiscalar_mul(scalars, points)
        }

        fn to_bytes(&self) -> Vec<u8> {
            self.compress().to_bytes().to_vec()
        }

        fn from_bytes(bytes: &[u8]) -> Option<Self> {
            if bytes.len() != 32 {
                return None;
            }
            CompressedRistretto::from_slice(bytes).ok()?.decompress()
        }
    }
}

// ============================================================================
// Pallas implementation (Zcash Orchard)
// ============================================================================

#[cfg(feature = "pallas")]
pub mod pallas {
    use super::*;
    use pasta_curves::{
        group::{
            ff::{Field, FromUniformBytes, PrimeField},
            Group, GroupEncoding,
        },
        pallas::{Point, Scalar},
    };

    impl PvssScalar for Scalar {
        const ENCODED_LEN: usize = 32;

        fn zero() -> Self {
            Scalar::ZERO
        }

        fn one() -> Self {
            Scalar::ONE
        }

        fn from_u32(v: u32) -> Self {
            Scalar::from(v as u64)
        }

        fn add(&self, other: &Self) -> Self {
            *self + *other
        }

        fn sub(&self, other: &Self) -> Self {
            *self - *other
        }

        fn mul(&self, other: &Self) -> Self {
            *self * *other
        }

        fn neg(&self) -> Self {
            -(*self)
        }

        fn invert(&self) -> Option<Self> {
            Option::from(Field::invert(self))
        }

        fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
            <Scalar as Field>::random(rng)
        }

        fn from_bytes_wide(bytes: &[u8; 64]) -> Self {
            <Scalar as FromUniformBytes<64>>::from_uniform_bytes(bytes)
        }

        fn to_bytes(&self) -> Vec<u8> {
            self.to_repr().to_vec()
        }

        fn from_bytes(bytes: &[u8]) -> Option<Self> {
            let arr: [u8; 32] = bytes.try_into().ok()?;
            Option::from(Scalar::from_repr(arr))
        }

        // pasta scalars have no Zeroize impl; same volatile write + fence
        // the zeroize crate uses
        fn zeroize(&mut self) {
            // SAFETY: `self` is a valid, aligned, exclusive reference and
            // Scalar is Copy with no drop glue
            unsafe { core::ptr::write_volatile(self, Scalar::ZERO) };
            core::sync::atomic::compiler_fence(core::sync::atomic::Ordering::SeqCst);
        }
    }

    impl PvssPoint for Point {
        type Scalar = Scalar;

        const GROUP: &'static str = "pallas";

        const ENCODED_LEN: usize = 32;

        fn identity() -> Self {
            <Point as Group>::identity()
        }

        fn generator() -> Self {
            <Point as Group>::generator()
        }

        fn add(&self, other: &Self) -> Self {
            *self + *other
        }

        fn neg(&self) -> Self {
            -(*self)
        }

        fn mul_scalar(&self, scalar: &Self::Scalar) -> Self {
            *self * *scalar
        }

        fn to_bytes(&self) -> Vec<u8> {
            GroupEncoding::to_bytes(self).to_vec()
        }

        fn from_bytes(bytes: &[u8]) -> Option<Self> {
            let arr: [u8; 32] = bytes.try_into().ok()?;
            Option::from(<Point as GroupEncoding>::from_bytes(&arr))
        }
    }
}

// ============================================================================
// secp256k1 implementation (Bitcoin)
// ============================================================================

#[cfg(feature = "secp256k1")]
pub mod secp256k1 {
    use super::*;
    use k256::{
        elliptic_curve::{
            bigint::U512,
            group::Curve,
            ops::Reduce,
            sec1::{FromEncodedPoint, ToEncodedPoint},
            Field, PrimeField,
        },
        AffinePoint, EncodedPoint, FieldBytes, ProjectivePoint, Scalar,
    };
    use zeroize::Zeroize;

    const COMPRESSED_LEN: usize = 33;

    impl PvssScalar for Scalar {
        const ENCODED_LEN: usize = 32;

        fn zero() -> Self {
            Scalar::ZERO
        }

        fn one() -> Self {
            Scalar::ONE
        }

        fn from_u32(v: u32) -> Self {
            Scalar::from(v as u64)
        }

        fn add(&self, other: &Self) -> Self {
            *self + *other
        }

        fn sub(&self, other: &Self) -> Self {
            *self - *other
        }

        fn mul(&self, other: &Self) -> Self {
            *self * *other
        }

        fn neg(&self) -> Self {
            -(*self)
        }

        fn invert(&self) -> Option<Self> {
            Option::from(<Scalar as Field>::invert(self))
        }

        fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
            <Scalar as Field>::random(rng)
        }

        fn from_bytes_wide(bytes: &[u8; 64]) -> Self {
            <Scalar as Reduce<U512>>::reduce(U512::from_be_slice(bytes))
        }

        fn to_bytes(&self) -> Vec<u8> {
            Scalar::to_bytes(self).to_vec()
        }

        fn from_bytes(bytes: &[u8]) -> Option<Self> {
            if bytes.len() != 32 {
                return None;
            }
            Option::from(Scalar::from_repr(FieldBytes::clone_from_slice(bytes)))
        }

        fn zeroize(&mut self) {
            Zeroize::zeroize(self)
        }
    }

    impl PvssPoint for ProjectivePoint {
        type Scalar = Scalar;

        const GROUP: &'static str = "secp256k1";

        const ENCODED_LEN: usize = COMPRESSED_LEN;

        fn identity() -> Self {
            Self::IDENTITY
        }

        fn generator() -> Self {
            Self::GENERATOR
        }

        fn add(&self, other: &Self) -> Self {
            *self + *other
        }

        fn neg(&self) -> Self {
            -(*self)
        }

        fn mul_scalar(&self, scalar: &Self::Scalar) -> Self {
            *self * *scalar
        }

        // sec1 encodes the identity as a single byte; pad it to the fixed
        // width with zeros
        fn to_bytes(&self) -> Vec<u8> {
            if *self == Self::IDENTITY {
                return vec![0u8; COMPRESSED_LEN];
            }
            Curve::to_affine(self)
                .to_encoded_point(true)
                .as_bytes()
                .to_vec()
        }

        fn from_bytes(bytes: &[u8]) -> Option<Self> {
            if bytes.len() != COMPRESSED_LEN {
                return None;
            }
            if bytes.iter().all(|b| *b == 0) {
                return Some(Self::IDENTITY);
            }
            let encoded = EncodedPoint::from_bytes(bytes).ok()?;
            let affine: Option<AffinePoint> =
                Option::from(AffinePoint::from_encoded_point(&encoded));
            affine.map(ProjectivePoint::from)
        }

        fn frame_candidate(buf: &mut [u8]) {
            buf[0] = 0x02 | (buf[0] & 1);
        }
    }
}
