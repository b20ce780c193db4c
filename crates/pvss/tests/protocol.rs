//! End-to-end properties of a dealing: issue, verify, decrypt, recover

#![cfg(feature = "ristretto255")]

use curve25519_dalek::{ristretto::RistrettoPoint, scalar::Scalar};
use proptest::prelude::*;
use pvss::{
    decrypt, decrypt_batch, issue, recover, verify_decrypted, verify_decrypted_batch,
    verify_dealing, verify_encrypted, verify_encrypted_batch, DecryptedShare, DleqProof,
    EncryptedShare, PubPoly, PubShare, PvssError, PvssParams, PvssPoint,
};
use rand::rngs::OsRng;

type Point = RistrettoPoint;

struct Dealing {
    params: PvssParams<Point>,
    private_keys: Vec<Scalar>,
    public_keys: Vec<Point>,
    secret: Scalar,
    enc: Vec<EncryptedShare<Point>>,
    poly: PubPoly<Point>,
}

impl Dealing {
    fn new(n: usize, t: u32) -> Self {
        let mut rng = OsRng;
        let params = PvssParams::derive(b"pvss-protocol-tests").unwrap();
        let private_keys: Vec<Scalar> = (0..n).map(|_| Scalar::random(&mut rng)).collect();
        let public_keys: Vec<Point> = private_keys.iter().map(|x| params.g() * x).collect();
        let secret = Scalar::random(&mut rng);
        let (enc, poly) = issue(&params, &public_keys, &secret, t, &mut rng).unwrap();
        Self {
            params,
            private_keys,
            public_keys,
            secret,
            enc,
            poly,
        }
    }

    fn decrypt(&self, i: usize) -> DecryptedShare<Point> {
        decrypt(
            &self.params,
            &self.public_keys[i],
            &self.poly,
            &self.private_keys[i],
            &self.enc[i],
            &mut OsRng,
        )
        .unwrap()
    }

    fn decrypt_all(&self) -> Vec<DecryptedShare<Point>> {
        (0..self.enc.len()).map(|i| self.decrypt(i)).collect()
    }

    fn secret_point(&self) -> Point {
        self.params.g() * self.secret
    }

    fn polys(&self) -> Vec<PubPoly<Point>> {
        vec![self.poly.clone(); self.enc.len()]
    }

    /// recover from the positions in `picked`
    fn recover_from(&self, picked: &[usize], dec: &[DecryptedShare<Point>]) -> pvss::Result<Point> {
        let keys: Vec<Point> = picked.iter().map(|&i| self.public_keys[i]).collect();
        let enc: Vec<_> = picked.iter().map(|&i| self.enc[i].clone()).collect();
        let dec: Vec<_> = picked.iter().map(|&i| dec[i].clone()).collect();
        recover(
            self.params.g(),
            &keys,
            &enc,
            &dec,
            self.poly.threshold(),
            self.enc.len() as u32,
        )
    }
}

/// Replace the value of an encrypted share, keeping index and proof
fn corrupt(share: &EncryptedShare<Point>) -> EncryptedShare<Point> {
    let (s, proof) = share.clone().into_parts();
    EncryptedShare::from_parts(PubShare::new(s.index, s.value + Point::generator()), proof)
}

#[test]
fn round_trip_recovers_secret_point() {
    let d = Dealing::new(5, 3);
    let dec = d.decrypt_all();
    assert_eq!(d.recover_from(&[0, 1, 2, 3, 4], &dec).unwrap(), d.secret_point());
}

#[test]
fn any_threshold_subset_recovers_same_point() {
    let d = Dealing::new(6, 3);
    let dec = d.decrypt_all();
    let expected = d.secret_point();

    for picked in [[0, 1, 2], [3, 4, 5], [5, 0, 3], [4, 2, 1]] {
        assert_eq!(d.recover_from(&picked, &dec).unwrap(), expected, "{:?}", picked);
    }
    // more than t, any order
    assert_eq!(d.recover_from(&[5, 3, 1, 0], &dec).unwrap(), expected);
}

#[test]
fn fewer_than_threshold_shares_fail() {
    let d = Dealing::new(5, 3);
    let dec = d.decrypt_all();

    assert_eq!(
        d.recover_from(&[0, 4], &dec),
        Err(PvssError::TooFewShares { got: 2, need: 3 })
    );
    assert_eq!(
        d.recover_from(&[], &dec),
        Err(PvssError::TooFewShares { got: 0, need: 3 })
    );
}

#[test]
fn tampered_encrypted_share_detected() {
    let d = Dealing::new(4, 2);
    let mut enc = d.enc.clone();
    enc[1] = corrupt(&enc[1]);

    assert_eq!(
        verify_encrypted(d.params.h(), &d.public_keys[1], &d.poly, &enc[1]),
        Err(PvssError::EncVerificationFailed)
    );
    assert_eq!(
        decrypt(&d.params, &d.public_keys[1], &d.poly, &d.private_keys[1], &enc[1], &mut OsRng)
            .unwrap_err(),
        PvssError::EncVerificationFailed
    );

    let (keys, good) = verify_encrypted_batch(d.params.h(), &d.public_keys, &d.polys(), &enc).unwrap();
    assert_eq!(good.len(), 3);
    assert_eq!(
        good.iter().map(|s| s.index()).collect::<Vec<_>>(),
        vec![1, 3, 4]
    );
    assert_eq!(keys, vec![d.public_keys[0], d.public_keys[2], d.public_keys[3]]);
}

#[test]
fn share_checked_against_wrong_recipient_fails() {
    let d = Dealing::new(3, 2);
    assert_eq!(
        verify_encrypted(d.params.h(), &d.public_keys[0], &d.poly, &d.enc[1]),
        Err(PvssError::EncVerificationFailed)
    );
}

#[test]
fn wrong_private_key_detected() {
    let d = Dealing::new(4, 2);
    let wrong_key = Scalar::random(&mut OsRng);

    // the encrypted share itself is fine, so decryption goes through
    let forged = decrypt(&d.params, &d.public_keys[0], &d.poly, &wrong_key, &d.enc[0], &mut OsRng)
        .unwrap();
    assert_eq!(
        verify_decrypted(d.params.g(), &d.public_keys[0], &d.enc[0], &forged),
        Err(PvssError::DecVerificationFailed)
    );

    let mut dec = d.decrypt_all();
    dec[0] = forged;
    let survivors =
        verify_decrypted_batch(d.params.g(), &d.public_keys, &d.enc, &dec).unwrap();
    assert_eq!(
        survivors.iter().map(|s| s.index()).collect::<Vec<_>>(),
        vec![2, 3, 4]
    );

    // the bad share is discarded and recovery still reaches the secret
    assert_eq!(d.recover_from(&[0, 1, 2], &dec).unwrap(), d.secret_point());
    assert_eq!(
        d.recover_from(&[0, 3], &dec),
        Err(PvssError::TooFewShares { got: 1, need: 2 })
    );
}

/// Move an encrypted/decrypted pair to another index, keeping values and proofs
fn relabel(
    enc: &EncryptedShare<Point>,
    dec: &DecryptedShare<Point>,
    index: u32,
) -> (EncryptedShare<Point>, DecryptedShare<Point>) {
    let (e, e_proof) = enc.clone().into_parts();
    let (d, d_proof) = dec.clone().into_parts();
    (
        EncryptedShare::from_parts(PubShare::new(index, e.value), e_proof),
        DecryptedShare::from_parts(PubShare::new(index, d.value), d_proof),
    )
}

#[test]
fn relabelled_or_replayed_share_does_not_block_recovery() {
    let d = Dealing::new(5, 3);
    let dec = d.decrypt_all();

    // recipient 5 resubmits its own share under an index outside 1..=n
    let (enc9, dec9) = relabel(&d.enc[4], &dec[4], 9);
    verify_decrypted(d.params.g(), &d.public_keys[4], &enc9, &dec9).unwrap();

    let keys = vec![d.public_keys[0], d.public_keys[1], d.public_keys[2], d.public_keys[4]];
    let enc = vec![d.enc[0].clone(), d.enc[1].clone(), d.enc[2].clone(), enc9];
    let dec_in = vec![dec[0].clone(), dec[1].clone(), dec[2].clone(), dec9];
    assert_eq!(
        recover(d.params.g(), &keys, &enc, &dec_in, 3, 5).unwrap(),
        d.secret_point()
    );

    // share 1 replayed after the three good ones
    let keys = vec![d.public_keys[0], d.public_keys[1], d.public_keys[2], d.public_keys[0]];
    let enc = vec![d.enc[0].clone(), d.enc[1].clone(), d.enc[2].clone(), d.enc[0].clone()];
    let dec_in = vec![dec[0].clone(), dec[1].clone(), dec[2].clone(), dec[0].clone()];
    assert_eq!(
        recover(d.params.g(), &keys, &enc, &dec_in, 3, 5).unwrap(),
        d.secret_point()
    );

    // dropped entries do not count towards the threshold
    let picked = [0, 1, 0];
    let keys: Vec<Point> = picked.iter().map(|&i| d.public_keys[i]).collect();
    let enc: Vec<_> = picked.iter().map(|&i| d.enc[i].clone()).collect();
    let dec_in: Vec<_> = picked.iter().map(|&i| dec[i].clone()).collect();
    assert_eq!(
        recover(d.params.g(), &keys, &enc, &dec_in, 3, 5),
        Err(PvssError::TooFewShares { got: 2, need: 3 })
    );
}

#[test]
fn batch_partial_failure_keeps_order() {
    let d = Dealing::new(5, 3);
    let mut enc = d.enc.clone();
    enc[1] = corrupt(&enc[1]);
    enc[3] = corrupt(&enc[3]);

    let (keys, good) = verify_encrypted_batch(d.params.h(), &d.public_keys, &d.polys(), &enc).unwrap();
    assert_eq!(
        good.iter().map(|s| s.index()).collect::<Vec<_>>(),
        vec![1, 3, 5]
    );

    let dec: Vec<_> = good
        .iter()
        .zip(keys.iter())
        .map(|(share, key)| {
            let i = share.index() as usize - 1;
            decrypt(&d.params, key, &d.poly, &d.private_keys[i], share, &mut OsRng).unwrap()
        })
        .collect();
    let secret = recover(d.params.g(), &keys, &good, &dec, 3, 5).unwrap();
    assert_eq!(secret, d.secret_point());
}

#[test]
fn batch_length_mismatch() {
    let d = Dealing::new(5, 3);
    let polys = vec![d.poly.clone(); 4];

    assert_eq!(
        verify_encrypted_batch(d.params.h(), &d.public_keys, &polys, &d.enc).unwrap_err(),
        PvssError::DifferentLengths
    );

    let dec = d.decrypt_all();
    assert_eq!(
        verify_decrypted_batch(d.params.g(), &d.public_keys, &d.enc, &dec[..4]).unwrap_err(),
        PvssError::DifferentLengths
    );
    assert_eq!(
        recover(d.params.g(), &d.public_keys[..4], &d.enc, &dec, 3, 5).unwrap_err(),
        PvssError::DifferentLengths
    );
    assert_eq!(
        decrypt_batch(&d.params, &d.public_keys, &polys, &d.private_keys[0], &d.enc, &mut OsRng)
            .unwrap_err(),
        PvssError::DifferentLengths
    );
}

#[test]
fn repeated_dealings_are_independent() {
    let mut rng = OsRng;
    let d = Dealing::new(4, 2);
    let (enc2, poly2) = issue(&d.params, &d.public_keys, &d.secret, 2, &mut rng).unwrap();

    for (a, b) in d.enc.iter().zip(enc2.iter()) {
        assert_ne!(a.value(), b.value());
    }
    assert_ne!(d.poly.commits()[1], poly2.commits()[1]);
    // both commit to the same secret under H
    assert_eq!(d.poly.commit(), poly2.commit());

    let dec2: Vec<_> = enc2
        .iter()
        .enumerate()
        .map(|(i, s)| decrypt(&d.params, &d.public_keys[i], &poly2, &d.private_keys[i], s, &mut rng).unwrap())
        .collect();
    let from_second = recover(d.params.g(), &d.public_keys, &enc2, &dec2, 2, 4).unwrap();
    assert_eq!(from_second, d.secret_point());
}

#[test]
fn dealing_check_rejects_foreign_proof() {
    let d = Dealing::new(3, 2);
    assert_eq!(
        verify_dealing(&d.params, &d.public_keys, &d.poly, &d.enc).unwrap(),
        vec![true; 3]
    );

    // a standalone proof for the same statement satisfies the equations but
    // was not produced under the dealing's shared challenge
    let mut rng = OsRng;
    let x = d.private_keys[0];
    let (proof, xg, xh) =
        DleqProof::new(d.params.h(), &d.public_keys[2], &x, &mut rng).unwrap();
    assert!(proof.verify(d.params.h(), &d.public_keys[2], &xg, &xh));

    let mut enc = d.enc.clone();
    enc[2] = EncryptedShare::from_parts(PubShare::new(3, xh), proof);
    let results = verify_dealing(&d.params, &d.public_keys, &d.poly, &enc).unwrap();
    assert!(!results[2]);
}

#[test]
fn decrypt_batch_over_dealings() {
    let mut rng = OsRng;
    let params = PvssParams::<Point>::default();
    let x = Scalar::random(&mut rng);
    let key = params.g() * x;
    let others: Vec<Point> = (0..2).map(|_| params.g() * Scalar::random(&mut rng)).collect();
    let recipients = vec![others[0], key, others[1]];

    let mut keys = Vec::new();
    let mut polys = Vec::new();
    let mut shares = Vec::new();
    for _ in 0..4 {
        let (enc, poly) = issue(&params, &recipients, &Scalar::random(&mut rng), 2, &mut rng).unwrap();
        keys.push(key);
        polys.push(poly);
        shares.push(enc[1].clone());
    }
    shares[2] = corrupt(&shares[2]);

    let (k, e, d) = decrypt_batch(&params, &keys, &polys, &x, &shares, &mut rng).unwrap();
    assert_eq!(k.len(), 3);
    assert_eq!(e.len(), 3);
    assert_eq!(
        verify_decrypted_batch(params.g(), &k, &e, &d).unwrap().len(),
        3
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn prop_round_trip(
        (n, t) in (1usize..=7).prop_flat_map(|n| (Just(n), 1..=n as u32)),
        rotate in 0usize..7,
    ) {
        let d = Dealing::new(n, t);
        let dec = d.decrypt_all();

        // t consecutive positions starting anywhere
        let picked: Vec<usize> = (0..t as usize).map(|k| (k + rotate) % n).collect();
        prop_assert_eq!(d.recover_from(&picked, &dec).unwrap(), d.secret_point());

        if t > 1 {
            let short: Vec<usize> = picked[..t as usize - 1].to_vec();
            prop_assert_eq!(
                d.recover_from(&short, &dec),
                Err(PvssError::TooFewShares { got: t as usize - 1, need: t as usize })
            );
        }
    }

    #[test]
    fn prop_share_encoding_round_trip(n in 1usize..=5) {
        let d = Dealing::new(n, 1);
        for share in &d.enc {
            let decoded = EncryptedShare::<Point>::from_bytes(&share.to_bytes()).unwrap();
            prop_assert_eq!(&decoded, share);
        }
        let decoded = PubPoly::<Point>::from_bytes(&d.poly.to_bytes()).unwrap();
        prop_assert_eq!(decoded, d.poly.clone());
    }
}
