//! Cryptographic services for MXF essence wrapping.
//!
//! - [`CbcEncryptor`] / [`CbcDecryptor`] - AES-128 CBC block operations
//! - [`HmacContext`] - HMAC-SHA1 message integrity codes
//! - [`envelope`] - the encrypted-frame envelope (SMPTE 429-6 shape)
//! - [`prng`] - process-wide AES CTR-DRBG and UUID generation
//!
//! Frames are independently decryptable: every frame carries its own IV,
//! freshly drawn from the CSPRNG, so frame `n` never depends on frame
//! `n - 1`.

pub mod cipher;
pub mod envelope;
pub mod mic;
pub mod prng;

pub use cipher::{CbcDecryptor, CbcEncryptor, CBC_BLOCK_SIZE, KEY_LENGTH};
pub use envelope::{decrypt_frame, encrypt_frame, encrypted_length, EnvelopeParams};
pub use mic::HmacContext;
pub use prng::{configure, fill_random, make_uuid, FortunaRng, SeedSource};
