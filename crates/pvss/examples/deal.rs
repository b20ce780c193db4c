//! One full pvss round on ristretto255
//!
//! Run with: RUST_LOG=pvss=debug cargo run -p pvss --example deal -- -n 7 -t 4

use clap::Parser;
use curve25519_dalek::{ristretto::RistrettoPoint, scalar::Scalar};
use pvss::{
    decrypt, encoding, issue, recover, verify_dealing, verify_decrypted_batch, PvssParams,
};
use rand::rngs::OsRng;
use tracing::info;

#[derive(Parser)]
#[command(name = "deal")]
#[command(about = "deal a random secret to n recipients and recover it from t shares")]
struct Args {
    /// number of recipients
    #[arg(short, default_value = "5")]
    n: u32,

    /// shares needed to recover
    #[arg(short, default_value = "3")]
    t: u32,

    /// label hashed to the commitment base H
    #[arg(long, default_value = "pvss.deal-example")]
    label: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "deal=info,pvss=debug".into()),
        )
        .init();

    let args = Args::parse();
    let mut rng = OsRng;

    let params = PvssParams::<RistrettoPoint>::derive(args.label.as_bytes())?;
    info!("H = {}", hex::encode(encoding::encode_point(params.h())));

    // recipients
    let private_keys: Vec<Scalar> = (0..args.n).map(|_| Scalar::random(&mut rng)).collect();
    let public_keys: Vec<RistrettoPoint> = private_keys.iter().map(|x| params.g() * x).collect();

    // dealer
    let secret = Scalar::random(&mut rng);
    let (enc, poly) = issue(&params, &public_keys, &secret, args.t, &mut rng)?;
    info!(
        n = args.n,
        t = args.t,
        commitment = %hex::encode(encoding::encode_point(poly.commit())),
        "dealt secret"
    );

    let valid = verify_dealing(&params, &public_keys, &poly, &enc)?;
    info!(valid = valid.iter().filter(|&&ok| ok).count(), "dealing verified");

    // each recipient decrypts its own share
    let dec = enc
        .iter()
        .zip(private_keys.iter().zip(public_keys.iter()))
        .map(|(share, (x, key))| decrypt(&params, key, &poly, x, share, &mut rng))
        .collect::<pvss::Result<Vec<_>>>()?;
    for share in &dec {
        info!(index = share.index(), bytes = share.to_bytes().len(), "decrypted share");
    }

    let survivors = verify_decrypted_batch(params.g(), &public_keys, &enc, &dec)?;
    info!(survivors = survivors.len(), "decrypted shares verified");

    // recover from the last t shares only
    let from = (args.n - args.t) as usize;
    let recovered = recover(
        params.g(),
        &public_keys[from..],
        &enc[from..],
        &dec[from..],
        args.t,
        args.n,
    )?;

    let expected = params.g() * secret;
    info!(
        recovered = %hex::encode(encoding::encode_point(&recovered)),
        matches = recovered == expected,
        "recovered secret point"
    );
    Ok(())
}
