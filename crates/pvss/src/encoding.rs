//! Self-describing binary encoding
//!
//! Every group element and scalar travels in an envelope naming its group:
//!
//! ```text
//! [tag_len: u8][tag: ascii][payload_len: u16 le][payload]
//! ```
//!
//! A decoder that does not know the tag fails with `UnknownGroup`; a known
//! tag of another group than the one requested fails with `GroupMismatch`.
//! Composite values (proofs, commitment polynomials, shares) are plain
//! concatenations of envelopes and little-endian integers.

use crate::curve::{PvssPoint, PvssScalar};
use crate::dleq::DleqProof;
use crate::error::{PvssError, Result};
use crate::poly::{PubPoly, PubShare};
use crate::types::{PubVerShare, ShareFlavor};

/// Upper bound on committed coefficients accepted when decoding
const MAX_COMMITS: u32 = 1 << 16;

/// Group tags compiled into this build
pub fn registered_groups() -> Vec<&'static str> {
    let mut groups = Vec::new();
    if cfg!(feature = "ristretto255") {
        groups.push("ristretto255");
    }
    if cfg!(feature = "pallas") {
        groups.push("pallas");
    }
    if cfg!(feature = "secp256k1") {
        groups.push("secp256k1");
    }
    groups
}

fn check_tag<P: PvssPoint>(tag: &str) -> Result<()> {
    if tag == P::GROUP {
        Ok(())
    } else if registered_groups().contains(&tag) {
        Err(PvssError::GroupMismatch {
            expected: P::GROUP,
            found: tag.into(),
        })
    } else {
        Err(PvssError::UnknownGroup(tag.into()))
    }
}

fn put_envelope(out: &mut Vec<u8>, tag: &str, payload: &[u8]) {
    debug_assert!(tag.len() <= u8::MAX as usize);
    debug_assert!(payload.len() <= u16::MAX as usize);
    out.push(tag.len() as u8);
    out.extend_from_slice(tag.as_bytes());
    out.extend_from_slice(&(payload.len() as u16).to_le_bytes());
    out.extend_from_slice(payload);
}

pub(crate) fn put_point<P: PvssPoint>(out: &mut Vec<u8>, point: &P) {
    put_envelope(out, P::GROUP, &point.to_bytes());
}

pub(crate) fn put_scalar<P: PvssPoint>(out: &mut Vec<u8>, scalar: &P::Scalar) {
    put_envelope(out, P::GROUP, &scalar.to_bytes());
}

/// Encode a single group element
pub fn encode_point<P: PvssPoint>(point: &P) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + P::GROUP.len() + P::ENCODED_LEN);
    put_point(&mut out, point);
    out
}

/// Decode a single group element of group `P`
pub fn decode_point<P: PvssPoint>(bytes: &[u8]) -> Result<P> {
    let mut reader = Reader::new(bytes);
    let point = reader.point::<P>()?;
    reader.finish()?;
    Ok(point)
}

/// Encode a scalar of the group `P`
pub fn encode_scalar<P: PvssPoint>(scalar: &P::Scalar) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + P::GROUP.len() + P::Scalar::ENCODED_LEN);
    put_scalar::<P>(&mut out, scalar);
    out
}

/// Decode a scalar of the group `P`
pub fn decode_scalar<P: PvssPoint>(bytes: &[u8]) -> Result<P::Scalar> {
    let mut reader = Reader::new(bytes);
    let scalar = reader.scalar::<P>()?;
    reader.finish()?;
    Ok(scalar)
}

/// Cursor over an encoded buffer
pub(crate) struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.buf.len())
            .ok_or(PvssError::InvalidEncoding("truncated input"))?;
        let out = &self.buf[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    pub(crate) fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub(crate) fn u32(&mut self) -> Result<u32> {
        let mut le = [0u8; 4];
        le.copy_from_slice(self.take(4)?);
        Ok(u32::from_le_bytes(le))
    }

    /// Read one envelope, returning its tag and payload
    pub(crate) fn envelope(&mut self) -> Result<(&'a str, &'a [u8])> {
        let tag_len = self.u8()? as usize;
        let tag = core::str::from_utf8(self.take(tag_len)?)
            .map_err(|_| PvssError::InvalidEncoding("group tag is not utf-8"))?;
        let mut len = [0u8; 2];
        len.copy_from_slice(self.take(2)?);
        let payload = self.take(u16::from_le_bytes(len) as usize)?;
        Ok((tag, payload))
    }

    pub(crate) fn point<P: PvssPoint>(&mut self) -> Result<P> {
        let (tag, payload) = self.envelope()?;
        check_tag::<P>(tag)?;
        if payload.len() != P::ENCODED_LEN {
            return Err(PvssError::InvalidEncoding("point length"));
        }
        P::from_bytes(payload).ok_or(PvssError::InvalidPoint)
    }

    pub(crate) fn scalar<P: PvssPoint>(&mut self) -> Result<P::Scalar> {
        let (tag, payload) = self.envelope()?;
        check_tag::<P>(tag)?;
        if payload.len() != P::Scalar::ENCODED_LEN {
            return Err(PvssError::InvalidEncoding("scalar length"));
        }
        P::Scalar::from_bytes(payload).ok_or(PvssError::InvalidScalar)
    }

    pub(crate) fn finish(self) -> Result<()> {
        if self.pos != self.buf.len() {
            return Err(PvssError::InvalidEncoding("trailing bytes"));
        }
        Ok(())
    }
}

/// A group element of any compiled-in group, chosen by its tag at decode
/// time
#[derive(Clone, Debug, PartialEq)]
pub enum AnyPoint {
    #[cfg(feature = "ristretto255")]
    Ristretto255(curve25519_dalek::ristretto::RistrettoPoint),
    #[cfg(feature = "pallas")]
    Pallas(pasta_curves::pallas::Point),
    #[cfg(feature = "secp256k1")]
    Secp256k1(k256::ProjectivePoint),
}

impl AnyPoint {
    /// Decode by dispatching on the envelope tag
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let (tag, _) = Reader::new(bytes).envelope()?;
        match tag {
            #[cfg(feature = "ristretto255")]
            "ristretto255" => decode_point(bytes).map(AnyPoint::Ristretto255),
            #[cfg(feature = "pallas")]
            "pallas" => decode_point(bytes).map(AnyPoint::Pallas),
            #[cfg(feature = "secp256k1")]
            "secp256k1" => decode_point(bytes).map(AnyPoint::Secp256k1),
            other => Err(PvssError::UnknownGroup(other.into())),
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        match self {
            #[cfg(feature = "ristretto255")]
            AnyPoint::Ristretto255(p) => encode_point(p),
            #[cfg(feature = "pallas")]
            AnyPoint::Pallas(p) => encode_point(p),
            #[cfg(feature = "secp256k1")]
            AnyPoint::Secp256k1(p) => encode_point(p),
        }
    }

    pub fn group(&self) -> &'static str {
        match self {
            #[cfg(feature = "ristretto255")]
            AnyPoint::Ristretto255(_) => "ristretto255",
            #[cfg(feature = "pallas")]
            AnyPoint::Pallas(_) => "pallas",
            #[cfg(feature = "secp256k1")]
            AnyPoint::Secp256k1(_) => "secp256k1",
        }
    }
}

impl<P: PvssPoint> DleqProof<P> {
    /// c || r || vG || vH
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write(&mut out);
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);
        let proof = Self::read(&mut reader)?;
        reader.finish()?;
        Ok(proof)
    }

    pub(crate) fn write(&self, out: &mut Vec<u8>) {
        put_scalar::<P>(out, &self.c);
        put_scalar::<P>(out, &self.r);
        put_point(out, &self.vg);
        put_point(out, &self.vh);
    }

    pub(crate) fn read(reader: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            c: reader.scalar::<P>()?,
            r: reader.scalar::<P>()?,
            vg: reader.point()?,
            vh: reader.point()?,
        })
    }
}

impl<P: PvssPoint> PubPoly<P> {
    /// base || count: u32 || commits
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        put_point(&mut out, &self.base);
        out.extend_from_slice(&(self.commits.len() as u32).to_le_bytes());
        for c in &self.commits {
            put_point(&mut out, c);
        }
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);
        let base = reader.point()?;
        let count = reader.u32()?;
        if count == 0 || count > MAX_COMMITS {
            return Err(PvssError::InvalidEncoding("commitment count"));
        }
        let commits = (0..count)
            .map(|_| reader.point())
            .collect::<Result<Vec<P>>>()?;
        reader.finish()?;
        PubPoly::new(base, commits)
    }
}

impl<P: PvssPoint, F: ShareFlavor> PubVerShare<P, F> {
    /// flavor: u8 || index: u32 || value || proof
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.push(F::FLAG);
        out.extend_from_slice(&self.index().to_le_bytes());
        put_point(&mut out, self.value());
        self.proof().write(&mut out);
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);
        if reader.u8()? != F::FLAG {
            return Err(PvssError::InvalidEncoding("share flavor"));
        }
        let index = reader.u32()?;
        let value = reader.point()?;
        let proof = DleqProof::read(&mut reader)?;
        reader.finish()?;
        Ok(Self::from_parts(PubShare::new(index, value), proof))
    }
}

#[cfg(feature = "serde")]
mod serde_impls {
    use super::*;
    use serde::de::{Error as DeError, SeqAccess, Visitor};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    struct BytesVisitor;

    impl<'de> Visitor<'de> for BytesVisitor {
        type Value = Vec<u8>;

        fn expecting(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
            f.write_str("pvss encoded bytes")
        }

        fn visit_bytes<E: DeError>(self, v: &[u8]) -> core::result::Result<Self::Value, E> {
            Ok(v.to_vec())
        }

        fn visit_byte_buf<E: DeError>(self, v: Vec<u8>) -> core::result::Result<Self::Value, E> {
            Ok(v)
        }

        fn visit_seq<A: SeqAccess<'de>>(
            self,
            mut seq: A,
        ) -> core::result::Result<Self::Value, A::Error> {
            let mut out = Vec::with_capacity(seq.size_hint().unwrap_or(0));
            while let Some(b) = seq.next_element::<u8>()? {
                out.push(b);
            }
            Ok(out)
        }
    }

    macro_rules! impl_serde_via_bytes {
        ($ty:ty, $($bounds:tt)*) => {
            impl<$($bounds)*> Serialize for $ty {
                fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
                    serializer.serialize_bytes(&self.to_bytes())
                }
            }

            impl<'de, $($bounds)*> Deserialize<'de> for $ty {
                fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
                    let bytes = deserializer.deserialize_bytes(BytesVisitor)?;
                    Self::from_bytes(&bytes).map_err(D::Error::custom)
                }
            }
        };
    }

    impl_serde_via_bytes!(DleqProof<P>, P: PvssPoint);
    impl_serde_via_bytes!(PubPoly<P>, P: PvssPoint);
    impl_serde_via_bytes!(PubVerShare<P, F>, P: PvssPoint, F: ShareFlavor);
}
