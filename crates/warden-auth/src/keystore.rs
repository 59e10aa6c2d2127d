//! In-memory RSA key store.
//!
//! Keys are loaded once at startup from a directory tree of PEM files; the
//! file name without its `.pem` extension becomes the key id (`kid`). Each
//! entry keeps the private key PEM as read and the PKIX public key PEM
//! derived from it at load time.
//!
//! Rotation is additive: new keys are dropped into the folder and new tokens
//! are signed with the new `kid`, while older ids stay resolvable so tokens
//! signed under them verify until they expire.
//!
//! After loading, the store is shared behind an `Arc` and never mutated, so
//! concurrent lookups need no locking.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use warden_auth::{KeyLookup, KeyStore};
//!
//! let mut store = KeyStore::new();
//! store.load_rsa_keys("zarf/keys")?;
//! let store = Arc::new(store);
//!
//! let public_pem = store.public_key("54bb2165-71e1-41a6-af3e-7da4a0e1e2c1")?;
//! ```

use std::collections::HashMap;
use std::fmt;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use rsa::RsaPrivateKey;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::der::SecretDocument;
use rsa::pkcs8::{EncodePublicKey, LineEnding, ObjectIdentifier, PrivateKeyInfo};
use tracing::{debug, info};

use crate::error::KeyStoreError;

/// Largest key file the loader will read, in bytes.
pub const MAX_KEY_FILE_SIZE: u64 = 1024 * 1024;

/// Extension identifying private key files.
pub const KEY_FILE_EXTENSION: &str = "pem";

/// `rsaEncryption` algorithm identifier.
const RSA_ENCRYPTION_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");

/// Resolves key ids to PEM encoded key material.
pub trait KeyLookup: Send + Sync {
    fn private_key(&self, kid: &str) -> Result<&str, KeyStoreError>;
    fn public_key(&self, kid: &str) -> Result<&str, KeyStoreError>;
}

#[derive(Clone)]
struct KeyEntry {
    private_pem: String,
    public_pem: String,
}

/// Key material indexed by key id.
#[derive(Default)]
pub struct KeyStore {
    store: HashMap<String, KeyEntry>,
}

impl KeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every `*.pem` file under `root`, recursively.
    ///
    /// Files are processed in sorted path order; when two files map to the
    /// same key id the later one wins. The load is all-or-nothing: if any
    /// file fails, no key from this call is installed.
    ///
    /// Returns the number of keys installed.
    pub fn load_rsa_keys(&mut self, root: impl AsRef<Path>) -> Result<usize, KeyStoreError> {
        let root = root.as_ref();

        let mut files = Vec::new();
        collect_key_files(root, &mut files)?;
        files.sort();

        let mut staged = HashMap::with_capacity(files.len());
        for path in &files {
            let entry = path.display().to_string();
            let kid = kid_from_path(path);

            let private_pem = read_key_file(path, &entry)?;
            let public_pem = derive_public_pem(&entry, &private_pem)?;

            debug!(kid = %kid, file = %entry, "loaded rsa key");
            staged.insert(
                kid,
                KeyEntry {
                    private_pem,
                    public_pem,
                },
            );
        }

        let loaded = staged.len();
        self.store.extend(staged);

        info!(root = %root.display(), loaded, total = self.store.len(), "rsa keys loaded");
        Ok(loaded)
    }

    /// Adds a single private key under `kid`, validating it exactly like
    /// [`KeyStore::load_rsa_keys`] does for files.
    pub fn add_private_pem(
        &mut self,
        kid: impl Into<String>,
        private_pem: impl Into<String>,
    ) -> Result<(), KeyStoreError> {
        let kid = kid.into();
        let private_pem = private_pem.into();

        let public_pem = derive_public_pem(&kid, &private_pem)?;
        self.store.insert(
            kid,
            KeyEntry {
                private_pem,
                public_pem,
            },
        );
        Ok(())
    }

    /// Loaded key ids, sorted.
    pub fn kids(&self) -> Vec<&str> {
        let mut kids: Vec<&str> = self.store.keys().map(String::as_str).collect();
        kids.sort_unstable();
        kids
    }

    pub fn contains(&self, kid: &str) -> bool {
        self.store.contains_key(kid)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    fn entry(&self, kid: &str) -> Result<&KeyEntry, KeyStoreError> {
        self.store.get(kid).ok_or_else(|| KeyStoreError::KeyNotFound {
            kid: kid.to_string(),
        })
    }
}

impl KeyLookup for KeyStore {
    fn private_key(&self, kid: &str) -> Result<&str, KeyStoreError> {
        self.entry(kid).map(|e| e.private_pem.as_str())
    }

    fn public_key(&self, kid: &str) -> Result<&str, KeyStoreError> {
        self.entry(kid).map(|e| e.public_pem.as_str())
    }
}

// Key material stays out of debug output.
impl fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyStore")
            .field("kids", &self.kids())
            .finish()
    }
}

fn collect_key_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), KeyStoreError> {
    let source_err = |source| KeyStoreError::Source {
        entry: dir.display().to_string(),
        source,
    };

    for entry in fs::read_dir(dir).map_err(source_err)? {
        let entry = entry.map_err(source_err)?;
        let file_type = entry.file_type().map_err(source_err)?;
        let path = entry.path();

        if file_type.is_dir() {
            collect_key_files(&path, out)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some(KEY_FILE_EXTENSION) {
            out.push(path);
        }
    }

    Ok(())
}

fn kid_from_path(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    match name.strip_suffix(".pem") {
        Some(kid) => kid.to_string(),
        None => name,
    }
}

fn read_key_file(path: &Path, entry: &str) -> Result<String, KeyStoreError> {
    let read_err = |source| KeyStoreError::Read {
        entry: entry.to_string(),
        source,
    };

    let file = File::open(path).map_err(read_err)?;

    // One byte past the limit tells an exact-limit file from an oversized one.
    let mut buf = Vec::new();
    file.take(MAX_KEY_FILE_SIZE + 1)
        .read_to_end(&mut buf)
        .map_err(read_err)?;

    if buf.len() as u64 > MAX_KEY_FILE_SIZE {
        return Err(KeyStoreError::Oversized {
            entry: entry.to_string(),
            limit: MAX_KEY_FILE_SIZE,
        });
    }

    String::from_utf8(buf).map_err(|_| KeyStoreError::InvalidPem {
        entry: entry.to_string(),
    })
}

/// Parses a PKCS#1 or PKCS#8 RSA private key and returns its public half as
/// a PKIX (`BEGIN PUBLIC KEY`) PEM.
fn derive_public_pem(entry: &str, private_pem: &str) -> Result<String, KeyStoreError> {
    let (_label, document) =
        SecretDocument::from_pem(private_pem.trim()).map_err(|_| KeyStoreError::InvalidPem {
            entry: entry.to_string(),
        })?;
    let der = document.as_bytes();

    let key = match RsaPrivateKey::from_pkcs1_der(der) {
        Ok(key) => key,
        Err(_) => {
            let info = PrivateKeyInfo::try_from(der).map_err(|e| KeyStoreError::Parse {
                entry: entry.to_string(),
                reason: e.to_string(),
            })?;

            if info.algorithm.oid != RSA_ENCRYPTION_OID {
                return Err(KeyStoreError::NotRsa {
                    entry: entry.to_string(),
                });
            }

            RsaPrivateKey::try_from(info).map_err(|e| KeyStoreError::Parse {
                entry: entry.to_string(),
                reason: e.to_string(),
            })?
        }
    };

    key.to_public_key()
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| KeyStoreError::PublicKey {
            entry: entry.to_string(),
            reason: e.to_string(),
        })
}
