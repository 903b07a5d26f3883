//! HMAC-SHA1 message integrity codes for encrypted frames.

use asdcp_core::{Error, Result, MIC_LENGTH};
use hmac::{Hmac, Mac};
use sha1::{Digest, Sha1};

use crate::cipher::KEY_LENGTH;

type HmacSha1 = Hmac<Sha1>;

/// Fixed nonce mixed into the MIC key derivation (SMPTE 429-6 sec. 7.10).
const KEY_NONCE: [u8; KEY_LENGTH] = [
    0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff,
];

/// An HMAC-SHA1 context keyed from the essence encryption key.
///
/// The MIC key is `trunc16(SHA1(key ∥ key_nonce))`, so the integrity check
/// fails for any party holding a different essence key.
#[must_use]
pub struct HmacContext {
    mic_key: [u8; KEY_LENGTH],
    mac: HmacSha1,
}

impl HmacContext {
    pub fn new(key: &[u8; KEY_LENGTH]) -> Self {
        let mut sha = Sha1::new();
        sha.update(key);
        sha.update(KEY_NONCE);
        let digest = sha.finalize();

        let mut mic_key = [0u8; KEY_LENGTH];
        mic_key.copy_from_slice(&digest[..KEY_LENGTH]);

        let mac = HmacSha1::new_from_slice(&mic_key).expect("HMAC can take key of any size");
        HmacContext { mic_key, mac }
    }

    /// Discard any accumulated input and start a new MIC.
    pub fn reset(&mut self) {
        self.mac = HmacSha1::new_from_slice(&self.mic_key).expect("HMAC can take key of any size");
    }

    pub fn update(&mut self, data: &[u8]) {
        self.mac.update(data);
    }

    /// Produce the 20-byte MIC and reset for the next frame.
    pub fn finalize(&mut self) -> [u8; MIC_LENGTH] {
        let digest = self.mac.finalize_reset();
        let mut mic = [0u8; MIC_LENGTH];
        mic.copy_from_slice(&digest.into_bytes());
        mic
    }

    /// Compare the accumulated MIC against `expected`, in constant time.
    pub fn verify(&mut self, expected: &[u8]) -> Result<()> {
        let computed = self.finalize();
        let mut diff = 0u8;
        for (a, b) in computed.iter().zip(expected.iter()) {
            diff |= a ^ b;
        }
        if expected.len() != MIC_LENGTH || diff != 0 {
            return Err(Error::HmacFail);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_key_same_mic() {
        let key = [0x42; KEY_LENGTH];
        let mut a = HmacContext::new(&key);
        let mut b = HmacContext::new(&key);
        a.update(b"frame payload");
        b.update(b"frame payload");
        assert_eq!(a.finalize(), b.finalize());
    }

    #[test]
    fn different_key_fails_verify() {
        let mut signer = HmacContext::new(&[0x01; KEY_LENGTH]);
        signer.update(b"frame payload");
        let mic = signer.finalize();

        let mut verifier = HmacContext::new(&[0x02; KEY_LENGTH]);
        verifier.update(b"frame payload");
        assert!(matches!(verifier.verify(&mic), Err(Error::HmacFail)));
    }

    #[test]
    fn finalize_resets_for_next_frame() {
        let key = [0x42; KEY_LENGTH];
        let mut ctx = HmacContext::new(&key);
        ctx.update(b"frame one");
        let first = ctx.finalize();

        ctx.update(b"frame one");
        assert_eq!(ctx.finalize(), first);
    }
}
