//! The cryptographic frame envelope.
//!
//! An encrypted essence triplet's value region has this shape:
//!
//! ```text
//! [ContextID:16][PlaintextOffset:8][SourceKey:16][SourceLength:8]
//! [EssenceUL:16][IV:16][plaintext prefix][AES-CBC ciphertext][MIC:20?]
//! ```
//!
//! `PlaintextOffset` counts the leading frame bytes left in the clear (a
//! codestream header, up to SOD/SLH), `SourceLength` is the unpadded
//! plaintext length, and the MIC covers every byte that precedes it.

use asdcp_core::{Error, FrameBuffer, MemReader, Result, Ul, Uuid, MIC_LENGTH};

use crate::cipher::{CbcDecryptor, CbcEncryptor, CBC_BLOCK_SIZE};
use crate::mic::HmacContext;

/// Bytes occupied by the fixed envelope fields, through the end of the IV.
pub const ENVELOPE_HEADER_LENGTH: usize = 16 + 8 + 16 + 8 + 16 + 16;

/// Identity fields stamped into every envelope by a writer session.
#[derive(Clone, Copy, Debug)]
pub struct EnvelopeParams {
    /// HMAC namespace for the file (WriterInfo context ID).
    pub context_id: Uuid,
    /// Identifies which key encrypted the frame; the key itself is never
    /// stored.
    pub cipher_key_id: Uuid,
    /// The UL the essence triplet would have carried unencrypted.
    pub essence_ul: Ul,
    /// Fresh per-frame initialization vector.
    pub iv: [u8; CBC_BLOCK_SIZE],
}

fn padded_span(span: usize) -> usize {
    span + (CBC_BLOCK_SIZE - span % CBC_BLOCK_SIZE) % CBC_BLOCK_SIZE
}

/// Total envelope length for a frame of `source_length` bytes with the
/// given plaintext prefix.
pub fn encrypted_length(source_length: u64, plaintext_offset: u64, has_hmac: bool) -> u64 {
    let span = (source_length - plaintext_offset) as usize;
    let mic = if has_hmac { MIC_LENGTH as u64 } else { 0 };
    ENVELOPE_HEADER_LENGTH as u64 + plaintext_offset + padded_span(span) as u64 + mic
}

/// Wrap `frame` into an encrypted envelope in `out`.
///
/// The frame's `plaintext_offset` selects how many leading bytes stay in
/// the clear; the remainder is AES-CBC encrypted under a fresh IV, padded
/// to a block multiple only when unaligned (`SourceLength` governs the
/// decrypted length either way).
pub fn encrypt_frame(
    frame: &FrameBuffer,
    out: &mut FrameBuffer,
    params: &EnvelopeParams,
    encryptor: &mut CbcEncryptor,
    hmac: Option<&mut HmacContext>,
) -> Result<()> {
    let source_length = frame.len();
    let prefix_len = frame.plaintext_offset() as usize;
    if prefix_len > source_length {
        return Err(Error::Param("plaintext offset beyond frame length"));
    }

    let span = source_length - prefix_len;
    let padded = padded_span(span);
    let total = ENVELOPE_HEADER_LENGTH
        + prefix_len
        + padded
        + if hmac.is_some() { MIC_LENGTH } else { 0 };

    out.reserve(total);
    out.set_len(total)?;

    {
        let storage = out.data_mut();
        storage[..16].copy_from_slice(params.context_id.as_bytes());
        storage[16..24].copy_from_slice(&(prefix_len as u64).to_be_bytes());
        storage[24..40].copy_from_slice(params.cipher_key_id.as_bytes());
        storage[40..48].copy_from_slice(&(source_length as u64).to_be_bytes());
        storage[48..64].copy_from_slice(params.essence_ul.as_bytes());
        storage[64..80].copy_from_slice(&params.iv);

        let data = frame.data();
        storage[80..80 + prefix_len].copy_from_slice(&data[..prefix_len]);

        // PKCS7-style tail: pad bytes carry the pad count
        let mut padded_pt = Vec::with_capacity(padded);
        padded_pt.extend_from_slice(&data[prefix_len..]);
        padded_pt.resize(padded, (padded - span) as u8);

        encryptor.set_ivec(&params.iv);
        let ct_start = ENVELOPE_HEADER_LENGTH + prefix_len;
        encryptor.encrypt(&padded_pt, &mut storage[ct_start..ct_start + padded])?;
    }

    if let Some(hmac) = hmac {
        hmac.reset();
        let mic_offset = total - MIC_LENGTH;
        hmac.update(&out.data()[..mic_offset]);
        let mic = hmac.finalize();
        out.data_mut()[mic_offset..].copy_from_slice(&mic);
        out.set_mic(Some(mic));
    } else {
        out.set_mic(None);
    }

    out.set_frame_number(frame.frame_number());
    out.set_plaintext_offset(prefix_len as u32);
    out.set_source_length(source_length as u32);
    Ok(())
}

/// Unwrap an encrypted envelope value into `out`, verifying the MIC when an
/// HMAC context is supplied. Returns the essence UL recorded in the
/// envelope so the caller can match it against the expected container key.
pub fn decrypt_frame(
    value: &[u8],
    out: &mut FrameBuffer,
    decryptor: &mut CbcDecryptor,
    hmac: Option<&mut HmacContext>,
) -> Result<Ul> {
    if value.len() < ENVELOPE_HEADER_LENGTH {
        return Err(Error::Format("encrypted triplet too short".into()));
    }

    let mut reader = MemReader::new(value);
    let _context_id = reader.read_raw(16)?;
    let prefix_len = reader.read_u64()? as usize;
    let _cipher_key_id = reader.read_raw(16)?;
    let source_length = reader.read_u64()? as usize;
    let essence_ul = reader.read_ul()?;
    let mut iv = [0u8; CBC_BLOCK_SIZE];
    iv.copy_from_slice(reader.read_raw(CBC_BLOCK_SIZE)?);

    let mic_len = if hmac.is_some() { MIC_LENGTH } else { 0 };
    let body_len = value
        .len()
        .checked_sub(ENVELOPE_HEADER_LENGTH + prefix_len + mic_len)
        .ok_or_else(|| Error::Format("encrypted triplet truncated".into()))?;

    if body_len % CBC_BLOCK_SIZE != 0 {
        return Err(Error::CryptFail("ciphertext is not block-aligned"));
    }
    if source_length < prefix_len || source_length - prefix_len > body_len {
        return Err(Error::Format("envelope source length out of range".into()));
    }

    if let Some(hmac) = hmac {
        let mic_offset = value.len() - MIC_LENGTH;
        hmac.reset();
        hmac.update(&value[..mic_offset]);
        hmac.verify(&value[mic_offset..])?;
    }

    let prefix = &value[ENVELOPE_HEADER_LENGTH..ENVELOPE_HEADER_LENGTH + prefix_len];
    let ciphertext =
        &value[ENVELOPE_HEADER_LENGTH + prefix_len..ENVELOPE_HEADER_LENGTH + prefix_len + body_len];

    decryptor.set_ivec(&iv);
    let mut plaintext = vec![0u8; body_len];
    decryptor.decrypt(ciphertext, &mut plaintext)?;

    out.reserve(source_length);
    out.set_len(source_length)?;
    let storage = out.data_mut();
    storage[..prefix_len].copy_from_slice(prefix);
    storage[prefix_len..].copy_from_slice(&plaintext[..source_length - prefix_len]);

    out.set_plaintext_offset(prefix_len as u32);
    out.set_source_length(source_length as u32);
    out.set_mic(None);
    Ok(essence_ul)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ESSENCE_UL: Ul = Ul::new([
        0x06, 0x0e, 0x2b, 0x34, 0x01, 0x02, 0x01, 0x01, 0x0d, 0x01, 0x03, 0x01, 0x15, 0x01, 0x08,
        0x01,
    ]);

    fn params() -> EnvelopeParams {
        EnvelopeParams {
            context_id: Uuid::from_bytes([0x11; 16]),
            cipher_key_id: Uuid::from_bytes([0x22; 16]),
            essence_ul: ESSENCE_UL,
            iv: [0x33; CBC_BLOCK_SIZE],
        }
    }

    #[test]
    fn envelope_lengths() {
        // 100 bytes pad to 112; the fixed fields add 80
        assert_eq!(encrypted_length(100, 0, false), 192);
        assert_eq!(encrypted_length(100, 0, true), 212);
        // block-aligned spans gain no pad
        assert_eq!(encrypted_length(96, 0, false), 176);
    }

    #[test]
    fn zero_key_hundred_byte_frame() {
        let key = [0u8; 16];
        let mut frame = FrameBuffer::with_capacity(100);
        frame.set_data(&[0x41; 100]).unwrap();

        let mut out = FrameBuffer::new();
        let mut enc = CbcEncryptor::new(&key);
        encrypt_frame(&frame, &mut out, &params(), &mut enc, None).unwrap();
        assert_eq!(out.len(), 192);
        assert_eq!(out.source_length(), 100);
    }

    #[test]
    fn round_trip_with_hmac() {
        let key = [0x5a; 16];
        let mut frame = FrameBuffer::with_capacity(1000);
        frame
            .set_data(&(0u8..=255).cycle().take(1000).collect::<Vec<u8>>())
            .unwrap();
        frame.set_plaintext_offset(33);

        let mut wrapped = FrameBuffer::new();
        let mut enc = CbcEncryptor::new(&key);
        let mut signer = HmacContext::new(&key);
        encrypt_frame(&frame, &mut wrapped, &params(), &mut enc, Some(&mut signer)).unwrap();

        // clear prefix survives untouched
        assert_eq!(
            &wrapped.data()[ENVELOPE_HEADER_LENGTH..ENVELOPE_HEADER_LENGTH + 33],
            &frame.data()[..33]
        );

        let mut unwrapped = FrameBuffer::new();
        let mut dec = CbcDecryptor::new(&key);
        let mut verifier = HmacContext::new(&key);
        let ul = decrypt_frame(wrapped.data(), &mut unwrapped, &mut dec, Some(&mut verifier))
            .unwrap();
        assert_eq!(ul, ESSENCE_UL);
        assert_eq!(unwrapped.data(), frame.data());
        assert_eq!(unwrapped.plaintext_offset(), 33);
    }

    #[test]
    fn wrong_hmac_key_fails() {
        let key = [0x5a; 16];
        let mut frame = FrameBuffer::with_capacity(64);
        frame.set_data(&[0x41; 64]).unwrap();

        let mut wrapped = FrameBuffer::new();
        let mut enc = CbcEncryptor::new(&key);
        let mut signer = HmacContext::new(&key);
        encrypt_frame(&frame, &mut wrapped, &params(), &mut enc, Some(&mut signer)).unwrap();

        let mut unwrapped = FrameBuffer::new();
        let mut dec = CbcDecryptor::new(&key);
        let mut verifier = HmacContext::new(&[0x00; 16]);
        assert!(matches!(
            decrypt_frame(wrapped.data(), &mut unwrapped, &mut dec, Some(&mut verifier)),
            Err(Error::HmacFail)
        ));
    }
}
