//! sha512-based fiat-shamir transcript
//!
//! running hash accumulates length-prefixed labeled messages; challenges are
//! squeezed from a clone of the state and folded back in.

use sha2::{Digest, Sha512};

use crate::curve::{PvssPoint, PvssScalar};

#[derive(Clone)]
pub struct Transcript {
    state: Sha512,
    /// counter for challenge derivation (same label never repeats output)
    challenge_counter: u64,
}

impl Transcript {
    /// create new transcript with domain separator
    pub fn new(domain_sep: &[u8]) -> Self {
        let mut state = Sha512::new();
        state.update(b"pvss-transcript-v1");
        state.update((domain_sep.len() as u32).to_le_bytes());
        state.update(domain_sep);
        Self {
            state,
            challenge_counter: 0,
        }
    }

    /// append labeled message
    pub fn append_message(&mut self, label: &[u8], message: &[u8]) {
        self.state.update((label.len() as u32).to_le_bytes());
        self.state.update(label);
        self.state.update((message.len() as u32).to_le_bytes());
        self.state.update(message);
    }

    pub fn append_u64(&mut self, label: &[u8], value: u64) {
        self.append_message(label, &value.to_le_bytes());
    }

    pub fn append_point<P: PvssPoint>(&mut self, label: &[u8], point: &P) {
        self.append_message(label, &point.to_bytes());
    }

    /// derive a scalar challenge from the current state
    pub fn challenge_scalar<S: PvssScalar>(&mut self, label: &[u8]) -> S {
        let mut challenge_state = self.state.clone();
        challenge_state.update(b"challenge");
        challenge_state.update((label.len() as u32).to_le_bytes());
        challenge_state.update(label);
        challenge_state.update(self.challenge_counter.to_le_bytes());
        self.challenge_counter += 1;

        let mut wide = [0u8; 64];
        wide.copy_from_slice(&challenge_state.finalize());

        self.state.update(b"challenge_out");
        self.state.update(wide);

        S::from_bytes_wide(&wide)
    }
}
