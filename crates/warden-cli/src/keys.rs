//! RSA key generation.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use rsa::RsaPrivateKey;
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::pkcs8::{EncodePublicKey, LineEnding};

/// Smallest modulus accepted for new keys.
pub const MIN_KEY_BITS: usize = 2048;

/// A key written to the key folder.
#[derive(Debug, Clone)]
pub struct GeneratedKey {
    pub kid: String,
    pub path: PathBuf,
    /// PKIX public key PEM derived from the new private key.
    pub public_pem: String,
}

/// Generates an RSA private key and writes it to `<output>/<kid>.pem` as
/// PKCS#1 PEM. The kid defaults to a fresh UUID v4.
///
/// Refuses to overwrite an existing file.
pub fn generate_key(
    output: impl AsRef<Path>,
    kid: Option<String>,
    bits: usize,
) -> Result<GeneratedKey> {
    if bits < MIN_KEY_BITS {
        bail!("key size {bits} is below the {MIN_KEY_BITS} bit minimum");
    }

    let kid = kid.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    if kid.is_empty() || kid.contains(['/', '\\']) || kid.starts_with('.') {
        bail!("invalid kid {kid:?}");
    }

    let output = output.as_ref();
    std::fs::create_dir_all(output)
        .with_context(|| format!("creating key folder {}", output.display()))?;

    let key = RsaPrivateKey::new(&mut rand::thread_rng(), bits).context("generating rsa key")?;
    let private_pem = key
        .to_pkcs1_pem(LineEnding::LF)
        .context("encoding private key")?;
    let public_pem = key
        .to_public_key()
        .to_public_key_pem(LineEnding::LF)
        .context("encoding public key")?;

    let path = output.join(format!("{kid}.pem"));
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .with_context(|| format!("creating private pem file {}", path.display()))?;
    file.write_all(private_pem.as_bytes())
        .with_context(|| format!("writing private pem file {}", path.display()))?;

    Ok(GeneratedKey {
        kid,
        path,
        public_pem,
    })
}
