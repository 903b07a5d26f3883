//! AES-128 CBC block operations.
//!
//! Chaining is done here at block level rather than through a mode wrapper:
//! the frame envelope encrypts discontiguous regions under one rolling IV,
//! and decryption must leave the IV positioned for the next call.

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::Aes128;
use asdcp_core::{Error, Result};

/// AES key length in bytes.
pub const KEY_LENGTH: usize = 16;

/// CBC block size in bytes.
pub const CBC_BLOCK_SIZE: usize = 16;

/// CBC encryption context: an AES-128 key schedule plus the rolling IV.
#[must_use]
pub struct CbcEncryptor {
    cipher: Aes128,
    ivec: [u8; CBC_BLOCK_SIZE],
}

impl CbcEncryptor {
    pub fn new(key: &[u8; KEY_LENGTH]) -> Self {
        CbcEncryptor {
            cipher: Aes128::new(GenericArray::from_slice(key)),
            ivec: [0; CBC_BLOCK_SIZE],
        }
    }

    /// Set the initialization vector. May be called any number of times for
    /// a given key; each frame uses a fresh IV.
    pub fn set_ivec(&mut self, ivec: &[u8; CBC_BLOCK_SIZE]) {
        self.ivec = *ivec;
    }

    pub fn ivec(&self) -> &[u8; CBC_BLOCK_SIZE] {
        &self.ivec
    }

    /// Encrypt whole blocks of `plaintext` into `ciphertext`. Both slices
    /// must be the same block-aligned length.
    pub fn encrypt(&mut self, plaintext: &[u8], ciphertext: &mut [u8]) -> Result<()> {
        if plaintext.len() % CBC_BLOCK_SIZE != 0 {
            return Err(Error::Param("CBC input is not block-aligned"));
        }
        if ciphertext.len() != plaintext.len() {
            return Err(Error::SmallBuf {
                need: plaintext.len(),
                have: ciphertext.len(),
            });
        }

        for (pt, ct) in plaintext
            .chunks_exact(CBC_BLOCK_SIZE)
            .zip(ciphertext.chunks_exact_mut(CBC_BLOCK_SIZE))
        {
            let mut block = [0u8; CBC_BLOCK_SIZE];
            for i in 0..CBC_BLOCK_SIZE {
                block[i] = pt[i] ^ self.ivec[i];
            }

            let ga = GenericArray::from_mut_slice(&mut block);
            self.cipher.encrypt_block(ga);

            self.ivec.copy_from_slice(&block);
            ct.copy_from_slice(&block);
        }
        Ok(())
    }
}

/// CBC decryption context.
#[must_use]
pub struct CbcDecryptor {
    cipher: Aes128,
    ivec: [u8; CBC_BLOCK_SIZE],
}

impl CbcDecryptor {
    pub fn new(key: &[u8; KEY_LENGTH]) -> Self {
        CbcDecryptor {
            cipher: Aes128::new(GenericArray::from_slice(key)),
            ivec: [0; CBC_BLOCK_SIZE],
        }
    }

    pub fn set_ivec(&mut self, ivec: &[u8; CBC_BLOCK_SIZE]) {
        self.ivec = *ivec;
    }

    /// Decrypt whole blocks of `ciphertext` into `plaintext`.
    pub fn decrypt(&mut self, ciphertext: &[u8], plaintext: &mut [u8]) -> Result<()> {
        if ciphertext.len() % CBC_BLOCK_SIZE != 0 {
            return Err(Error::Param("CBC input is not block-aligned"));
        }
        if plaintext.len() != ciphertext.len() {
            return Err(Error::SmallBuf {
                need: ciphertext.len(),
                have: plaintext.len(),
            });
        }

        for (ct, pt) in ciphertext
            .chunks_exact(CBC_BLOCK_SIZE)
            .zip(plaintext.chunks_exact_mut(CBC_BLOCK_SIZE))
        {
            let mut block = [0u8; CBC_BLOCK_SIZE];
            block.copy_from_slice(ct);

            let ga = GenericArray::from_mut_slice(&mut block);
            self.cipher.decrypt_block(ga);

            for i in 0..CBC_BLOCK_SIZE {
                pt[i] = block[i] ^ self.ivec[i];
            }

            self.ivec.copy_from_slice(ct);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cbc_round_trip() {
        let key = [0x2b; KEY_LENGTH];
        let iv = [0x07; CBC_BLOCK_SIZE];
        let plaintext: Vec<u8> = (0..64).collect();

        let mut enc = CbcEncryptor::new(&key);
        enc.set_ivec(&iv);
        let mut ciphertext = vec![0u8; plaintext.len()];
        enc.encrypt(&plaintext, &mut ciphertext).unwrap();
        assert_ne!(ciphertext, plaintext);

        let mut dec = CbcDecryptor::new(&key);
        dec.set_ivec(&iv);
        let mut decrypted = vec![0u8; ciphertext.len()];
        dec.decrypt(&ciphertext, &mut decrypted).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn chaining_carries_across_calls() {
        let key = [0x01; KEY_LENGTH];
        let iv = [0x00; CBC_BLOCK_SIZE];
        let plaintext: Vec<u8> = (0..48).rev().collect();

        let mut one_call = vec![0u8; 48];
        let mut enc = CbcEncryptor::new(&key);
        enc.set_ivec(&iv);
        enc.encrypt(&plaintext, &mut one_call).unwrap();

        let mut split = vec![0u8; 48];
        let mut enc = CbcEncryptor::new(&key);
        enc.set_ivec(&iv);
        enc.encrypt(&plaintext[..16], &mut split[..16]).unwrap();
        enc.encrypt(&plaintext[16..], &mut split[16..]).unwrap();

        assert_eq!(one_call, split);
    }

    #[test]
    fn unaligned_input_is_rejected() {
        let mut enc = CbcEncryptor::new(&[0; KEY_LENGTH]);
        let mut out = [0u8; 15];
        assert!(enc.encrypt(&[0u8; 15], &mut out).is_err());
    }
}
