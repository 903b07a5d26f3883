//! Process-wide CSPRNG: AES-128 CTR-DRBG.
//!
//! The generator encrypts a 128-bit counter under a key derived by SHA-1
//! from the prior state plus at least 64 bytes of seed material, and
//! re-keys itself from the next generated block after every request, so a
//! captured state never reveals earlier output. State is process-wide
//! behind a mutex; [`configure`] re-seeds from a chosen source so tests can
//! inject a deterministic seed file.

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockEncrypt, KeyInit};
use aes::Aes128;
use asdcp_core::{Error, Result, Uuid};
use sha1::{Digest, Sha1};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::error;

const RNG_BLOCK_SIZE: usize = 16;
/// Seed bytes pulled per reseed: max(entropy available, 64).
const RNG_SEED_SIZE: usize = 64;
/// Bytes generated per re-key interval.
const MAX_SEQUENCE_LEN: usize = 0x0004_0000;

/// Where seed bytes come from.
#[derive(Clone, Debug, Default)]
pub enum SeedSource {
    /// The operating system's entropy device (urandom, CNG, etc.).
    #[default]
    OsRandom,
    /// A file of seed bytes; at least 64 bytes are read per reseed.
    FilePath(PathBuf),
}

impl SeedSource {
    fn read_seed(&self, buf: &mut [u8]) -> Result<()> {
        match self {
            SeedSource::OsRandom => getrandom::getrandom(buf).map_err(|e| {
                error!("OS entropy source unreachable: {e}");
                Error::SeedSource(e.to_string())
            }),
            SeedSource::FilePath(path) => {
                let mut file = std::fs::File::open(path).map_err(|e| {
                    error!("seed file {} unreachable: {e}", path.display());
                    Error::SeedSource(format!("{}: {e}", path.display()))
                })?;
                file.read_exact(buf)
                    .map_err(|e| Error::SeedSource(format!("{}: {e}", path.display())))
            }
        }
    }
}

struct RngState {
    cipher: Aes128,
    key: [u8; RNG_BLOCK_SIZE],
    counter: u128,
}

impl RngState {
    fn seeded(source: &SeedSource) -> Result<Self> {
        let mut seed = [0u8; RNG_SEED_SIZE];
        source.read_seed(&mut seed)?;

        let key = [0u8; RNG_BLOCK_SIZE];
        let mut state = RngState {
            cipher: Aes128::new(GenericArray::from_slice(&key)),
            key,
            counter: 1,
        };
        state.reseed(&seed);
        Ok(state)
    }

    /// key' = trunc16(SHA1(key ∥ counter ∥ seed))
    fn reseed(&mut self, seed: &[u8]) {
        let mut sha = Sha1::new();
        sha.update(self.key);
        sha.update(self.counter.to_be_bytes());
        sha.update(seed);
        let digest = sha.finalize();

        self.key.copy_from_slice(&digest[..RNG_BLOCK_SIZE]);
        self.cipher = Aes128::new(GenericArray::from_slice(&self.key));
    }

    fn next_block(&mut self) -> [u8; RNG_BLOCK_SIZE] {
        let mut block = self.counter.to_be_bytes();
        let ga = GenericArray::from_mut_slice(&mut block);
        self.cipher.encrypt_block(ga);
        self.counter = self.counter.wrapping_add(1);
        block
    }

    fn fill(&mut self, buf: &mut [u8]) {
        for chunk in buf.chunks_mut(RNG_BLOCK_SIZE) {
            let block = self.next_block();
            chunk.copy_from_slice(&block[..chunk.len()]);
        }

        // forward secrecy: the next counter block becomes the new key
        self.key = self.next_block();
        self.cipher = Aes128::new(GenericArray::from_slice(&self.key));
    }
}

static RNG: Mutex<Option<RngState>> = Mutex::new(None);

fn with_state<T>(f: impl FnOnce(&mut RngState) -> T) -> Result<T> {
    let mut guard = RNG.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if guard.is_none() {
        *guard = Some(RngState::seeded(&SeedSource::OsRandom)?);
    }
    match guard.as_mut() {
        Some(state) => Ok(f(state)),
        None => Err(Error::Init("random number generator")),
    }
}

/// Re-seed the process-wide generator from the given source. Tests use a
/// `FilePath` source for deterministic output.
pub fn configure(source: SeedSource) -> Result<()> {
    let state = RngState::seeded(&source)?;
    let mut guard = RNG.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = Some(state);
    Ok(())
}

/// Fill `buf` with random bytes from the process-wide generator.
pub fn fill_random(buf: &mut [u8]) -> Result<()> {
    with_state(|state| {
        for chunk in buf.chunks_mut(MAX_SEQUENCE_LEN) {
            state.fill(chunk);
        }
    })
}

/// A handle to the process-wide generator, for callers that hold an RNG as
/// a session member.
#[derive(Debug, Default)]
pub struct FortunaRng;

impl FortunaRng {
    pub fn new() -> Self {
        FortunaRng
    }

    pub fn fill_random(&mut self, buf: &mut [u8]) -> Result<()> {
        fill_random(buf)
    }
}

/// Generate a random v4 UUID (version nibble 4, RFC 4122 variant bits).
pub fn make_uuid() -> Result<Uuid> {
    let mut bytes = [0u8; 16];
    fill_random(&mut bytes)?;
    Ok(uuid::Builder::from_random_bytes(bytes).into_uuid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn output_differs_between_requests() {
        let mut a = [0u8; 64];
        let mut b = [0u8; 64];
        fill_random(&mut a).unwrap();
        fill_random(&mut b).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn uuid_shape_is_v4() {
        for _ in 0..64 {
            let id = make_uuid().unwrap();
            let bytes = id.as_bytes();
            assert_eq!(bytes[6] >> 4, 0x4, "version nibble");
            assert_eq!(bytes[8] >> 6, 0b10, "variant bits");
        }
    }

    #[test]
    fn file_seed_source_is_accepted() {
        let mut seed_file = tempfile::NamedTempFile::new().unwrap();
        seed_file.write_all(&[0xa5; 128]).unwrap();

        configure(SeedSource::FilePath(seed_file.path().to_path_buf())).unwrap();
        let mut buf = [0u8; 32];
        fill_random(&mut buf).unwrap();
        assert_ne!(buf, [0u8; 32]);

        // restore the default source for other tests
        configure(SeedSource::OsRandom).unwrap();
    }

    #[test]
    fn missing_seed_file_is_reported() {
        let result = configure(SeedSource::FilePath(PathBuf::from(
            "/nonexistent/seed/material",
        )));
        assert!(matches!(result, Err(Error::SeedSource(_))));
    }
}
