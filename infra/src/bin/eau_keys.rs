//! Signing key bootstrap
//!
//! Checks the configured token lifetimes, materializes the session signing
//! key pair in the configured key store and prints the public half, so
//! operators can provision a fresh bucket (or check an existing one) before
//! the first replica starts. The email token key is per process and is not
//! provisioned here.
//!
//! ```text
//! KEY_STORE_BACKEND=s3 KEY_STORE_BUCKET=my-keys eau-keys
//! ```

use anyhow::Context;
use eau_core::{EmailTokenServiceConfig, KeyStore, TokenServiceConfig};
use eau_infra::{initialize_key_store, telemetry};
use eau_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    telemetry::init_tracing(&config.logging)?;

    tracing::info!(
        event = "bootstrap_start",
        environment = %config.environment,
        backend = %config.auth.key_store.backend,
        "Bootstrapping signing keys"
    );

    TokenServiceConfig::from(&config.auth.session)
        .validate()
        .context("invalid session token lifetimes")?;
    EmailTokenServiceConfig::from(&config.auth.email)
        .token_life()
        .context("invalid email token lifetime")?;

    let key_store = initialize_key_store(&config.auth.key_store)
        .await
        .context("failed to build key store")?;

    let verification_key = key_store
        .verification_key()
        .await
        .context("signing key pair unavailable")?;

    tracing::info!(
        event = "bootstrap_complete",
        signing_key_path = %config.auth.key_store.signing_key_path,
        "Signing key pair ready"
    );
    print!("{}", verification_key.public_key_pem());

    Ok(())
}
