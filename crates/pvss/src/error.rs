//! PVSS error types

use thiserror::Error;

pub type Result<T> = core::result::Result<T, PvssError>;

/// Errors that can occur during PVSS operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PvssError {
    /// Parallel input sequences of a batch call differ in length
    #[error("inputs of different lengths")]
    DifferentLengths,

    #[error("verification of encrypted share failed")]
    EncVerificationFailed,

    #[error("verification of decrypted share failed")]
    DecVerificationFailed,

    /// Not enough valid decrypted shares survived verification
    #[error("not enough shares to recover secret: got {got}, need {need}")]
    TooFewShares { got: usize, need: usize },

    #[error("invalid threshold: t = {t}, n = {n} (need 1 <= t <= n)")]
    InvalidThreshold { t: u32, n: u32 },

    /// Batched primitive called with no statements
    #[error("empty batch")]
    EmptyBatch,

    /// Inversion of a zero scalar (e.g. zero private key)
    #[error("scalar is zero")]
    ZeroScalar,

    #[error("invalid share index: {0}")]
    InvalidIndex(u32),

    #[error("duplicate share index: {0}")]
    DuplicateIndex(u32),

    /// Commitment base equals the generator or the identity
    #[error("commitment base must be an independent generator")]
    InvalidCommitmentBase,

    /// Envelope tag names a group this build does not know
    #[error("unknown group: {0}")]
    UnknownGroup(String),

    #[error("group mismatch: expected {expected}, found {found}")]
    GroupMismatch {
        expected: &'static str,
        found: String,
    },

    #[error("invalid encoding: {0}")]
    InvalidEncoding(&'static str),

    #[error("invalid point encoding")]
    InvalidPoint,

    #[error("invalid scalar encoding")]
    InvalidScalar,

    #[error("embedded data too long: {len} bytes, max {max}")]
    EmbedTooLong { len: usize, max: usize },
}
