//! Writer → reader round trips over real files, covering every essence
//! facade, the crypto envelope, and the on-disk invariants (index, RIP,
//! header-reserve rewrite).

use asdcp::{
    dcdata, jp2k, pcm, phdr, timed_text, CbcDecryptor, CbcEncryptor, Error, FrameBuffer,
    HmacContext, Options, Rational, WriterInfo,
};
use asdcp_core::klv;
use asdcp_essence::wav::{PcmParser, SimpleWavHeader, WAVE_FORMAT_PCM};
use asdcp_mxf::labels;
use std::io::Cursor;
use std::path::{Path, PathBuf};

const EDIT_RATE_24: Rational = Rational::new(24, 1);

/// Build a minimal well-formed JP2K codestream with `payload` entropy
/// bytes after SOD.
fn synthetic_jp2k(width: u32, height: u32, payload: &[u8]) -> Vec<u8> {
    let mut cs = vec![0xff, 0x4f]; // SOC

    cs.extend_from_slice(&[0xff, 0x51]); // SIZ
    cs.extend_from_slice(&47u16.to_be_bytes());
    cs.extend_from_slice(&0x0306u16.to_be_bytes());
    cs.extend_from_slice(&width.to_be_bytes());
    cs.extend_from_slice(&height.to_be_bytes());
    cs.extend_from_slice(&[0u8; 8]); // XOsiz, YOsiz
    cs.extend_from_slice(&width.to_be_bytes());
    cs.extend_from_slice(&height.to_be_bytes());
    cs.extend_from_slice(&[0u8; 8]); // XTOsiz, YTOsiz
    cs.extend_from_slice(&3u16.to_be_bytes());
    for _ in 0..3 {
        cs.extend_from_slice(&[0x0b, 0x01, 0x01]);
    }

    cs.extend_from_slice(&[0xff, 0x52]); // COD
    cs.extend_from_slice(&12u16.to_be_bytes());
    cs.extend_from_slice(&[0, 0, 0, 1, 5, 3, 3, 0, 0, 0x77]);

    cs.extend_from_slice(&[0xff, 0x5c]); // QCD
    cs.extend_from_slice(&7u16.to_be_bytes());
    cs.extend_from_slice(&[0x20, 0x90, 0x98, 0x98, 0xa0]);

    cs.extend_from_slice(&[0xff, 0x93]); // SOD
    cs.extend_from_slice(payload);
    cs
}

/// Build a minimal JPEG XS codestream.
fn synthetic_jxs(width: u16, height: u16, payload: &[u8]) -> Vec<u8> {
    let mut cs = vec![0xff, 0x10]; // SOC

    cs.extend_from_slice(&[0xff, 0x12]); // PIH
    cs.extend_from_slice(&26u16.to_be_bytes());
    cs.extend_from_slice(&1024u32.to_be_bytes());
    cs.extend_from_slice(&0x1500u16.to_be_bytes());
    cs.extend_from_slice(&0x2040u16.to_be_bytes());
    cs.extend_from_slice(&width.to_be_bytes());
    cs.extend_from_slice(&height.to_be_bytes());
    cs.extend_from_slice(&width.to_be_bytes());
    cs.extend_from_slice(&16u16.to_be_bytes());
    cs.extend_from_slice(&[3, 4, 8, 8, 0x08, 0x00, 0x51, 0x00]);

    cs.extend_from_slice(&[0xff, 0x13]); // CDT
    cs.extend_from_slice(&8u16.to_be_bytes());
    for _ in 0..3 {
        cs.extend_from_slice(&[0x0a, 0x11]);
    }

    cs.extend_from_slice(&[0xff, 0x20]); // SLH
    cs.extend_from_slice(&4u16.to_be_bytes());
    cs.extend_from_slice(&0u16.to_be_bytes());

    cs.extend_from_slice(payload);
    cs
}

/// Write a 2-channel, 24-bit, 48 kHz WAV of `sample_frames` samples and
/// return the raw PCM payload.
fn write_test_wav(path: &Path, sample_frames: u32) -> Vec<u8> {
    let data: Vec<u8> = (0..sample_frames * 6).map(|i| (i % 251) as u8).collect();
    let header = SimpleWavHeader {
        format: WAVE_FORMAT_PCM,
        channel_count: 2,
        sample_rate: 48_000,
        avg_bps: 288_000,
        block_align: 6,
        bits_per_sample: 24,
        data_len: data.len() as u32,
    };
    let mut file = std::fs::File::create(path).unwrap();
    header.write(&mut file).unwrap();
    std::io::Write::write_all(&mut file, &data).unwrap();
    data
}

/// Walk a whole file as a KLV stream, returning `(offset, key, length)`.
fn scan_klvs(bytes: &[u8]) -> Vec<(u64, asdcp_core::Ul, u64)> {
    let mut out = Vec::new();
    let mut pos = 0u64;
    while (pos as usize) < bytes.len() {
        let mut cursor = Cursor::new(&bytes[pos as usize..]);
        let header = klv::read_klv_header(&mut cursor).unwrap();
        out.push((pos, header.key, header.length));
        pos += header.size as u64 + header.length;
    }
    out
}

#[test]
fn pcm_round_trip_48k_24fps() {
    let dir = tempfile::tempdir().unwrap();
    let wav_path = dir.path().join("audio.wav");
    let mxf_path = dir.path().join("audio.mxf");
    // one second: 48000 samples, 24 frames of 12000 bytes
    let payload = write_test_wav(&wav_path, 48_000);

    let mut parser = PcmParser::open_read(&wav_path, EDIT_RATE_24).unwrap();
    let descriptor = *parser.audio_descriptor();
    assert_eq!(descriptor.audio_sampling_rate, Rational::new(48_000, 1));
    assert_eq!(descriptor.channel_count, 2);
    assert_eq!(descriptor.container_duration, 24);

    let mut writer =
        pcm::MxfWriter::open_write(&mxf_path, WriterInfo::default(), &descriptor, &Options::default())
            .unwrap();
    let mut frame = FrameBuffer::with_capacity(12_000);
    loop {
        match parser.read_frame(&mut frame) {
            Ok(()) => writer.write_frame(&frame, None, None).unwrap(),
            Err(Error::EndOfFile) => break,
            Err(e) => panic!("unexpected read failure: {e}"),
        }
    }
    assert_eq!(writer.duration(), 24);
    writer.finalize().unwrap();

    // the body carries exactly 24 essence triplets of 12000 bytes
    let bytes = std::fs::read(&mxf_path).unwrap();
    let klvs = scan_klvs(&bytes);
    let essence: Vec<_> = klvs
        .iter()
        .filter(|(_, key, _)| *key == labels::ESSENCE_ELEMENT_PCM)
        .collect();
    assert_eq!(essence.len(), 24);
    assert!(essence.iter().all(|(_, _, len)| *len == 12_000));

    // RIP integrity: the last four bytes locate the RIP pack
    let trailer = u32::from_be_bytes(bytes[bytes.len() - 4..].try_into().unwrap()) as usize;
    let rip_at = bytes.len() - trailer;
    let rip_header = klv::read_klv_header(&mut Cursor::new(&bytes[rip_at..])).unwrap();
    assert_eq!(rip_header.key, labels::RANDOM_INDEX_PACK);

    // read everything back byte-for-byte
    let mut reader = pcm::MxfReader::open_read(&mxf_path).unwrap();
    assert_eq!(reader.duration(), 24);
    let read_descriptor = reader.audio_descriptor().unwrap();
    assert_eq!(read_descriptor.audio_sampling_rate, Rational::new(48_000, 1));
    assert_eq!(read_descriptor.channel_count, 2);
    assert_eq!(read_descriptor.container_duration, 24);

    let mut recovered = Vec::new();
    for n in 0..reader.duration() {
        reader.read_frame(n, &mut frame, None, None).unwrap();
        assert_eq!(frame.len(), 12_000);
        assert_eq!(frame.frame_number(), n as u32);
        recovered.extend_from_slice(frame.data());
    }
    assert_eq!(recovered, payload);
    assert!(matches!(
        reader.read_frame(24, &mut frame, None, None),
        Err(Error::EndOfFile)
    ));
}

#[test]
fn index_points_at_essence_triplets() {
    let dir = tempfile::tempdir().unwrap();
    let mxf_path = dir.path().join("picture.mxf");

    let frames: Vec<Vec<u8>> = (0..5)
        .map(|n| synthetic_jp2k(640, 360, &vec![n as u8 + 1; 100 + n * 37]))
        .collect();

    let (descriptor, _) = asdcp_essence::jp2k::parse_codestream(&frames[0]).unwrap();
    let mut writer = jp2k::MxfWriter::open_write(
        &mxf_path,
        WriterInfo::default(),
        &descriptor,
        &Options::default(),
    )
    .unwrap();
    for data in &frames {
        let mut frame = FrameBuffer::with_capacity(data.len());
        frame.set_data(data).unwrap();
        writer.write_frame(&frame, None, None).unwrap();
    }
    writer.finalize().unwrap();

    let bytes = std::fs::read(&mxf_path).unwrap();
    let reader = asdcp_mxf::MxfFileReader::open_read(&mxf_path).unwrap();
    for n in 0..5u64 {
        let at = reader.frame_offset(n).unwrap() as usize;
        let header = klv::read_klv_header(&mut Cursor::new(&bytes[at..])).unwrap();
        assert_eq!(header.key, labels::ESSENCE_ELEMENT_JP2K);
        assert_eq!(header.length as usize, frames[n as usize].len());
    }
}

#[test]
fn jp2k_descriptor_and_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let mxf_path = dir.path().join("picture.mxf");

    let codestream = synthetic_jp2k(2048, 1080, &[0xab; 4096]);
    let (descriptor, plaintext_offset) =
        asdcp_essence::jp2k::parse_codestream(&codestream).unwrap();
    assert_eq!(descriptor.stored_width, 2048);
    assert_eq!(descriptor.stored_height, 1080);
    assert_eq!(descriptor.aspect_ratio, Rational::new(2048, 1080));
    assert_eq!(descriptor.csize, 3);
    assert_eq!(plaintext_offset, codestream.len() - 4096);

    let mut writer = jp2k::MxfWriter::open_write(
        &mxf_path,
        WriterInfo::default(),
        &descriptor,
        &Options::default(),
    )
    .unwrap();
    let mut frame = FrameBuffer::with_capacity(codestream.len());
    frame.set_data(&codestream).unwrap();
    for _ in 0..3 {
        writer.write_frame(&frame, None, None).unwrap();
    }
    writer.finalize().unwrap();

    let mut reader = jp2k::MxfReader::open_read(&mxf_path).unwrap();
    assert_eq!(reader.duration(), 3);
    let read_descriptor = reader.picture_descriptor().unwrap();
    assert_eq!(read_descriptor.stored_width, 2048);
    assert_eq!(read_descriptor.stored_height, 1080);
    assert_eq!(read_descriptor.container_duration, 3);
    assert_eq!(read_descriptor.coding_style, descriptor.coding_style);
    assert_eq!(read_descriptor.quant_default, descriptor.quant_default);
    assert_eq!(read_descriptor.components, descriptor.components);

    let mut out = FrameBuffer::with_capacity(codestream.len());
    for n in 0..3 {
        reader.read_frame(n, &mut out, None, None).unwrap();
        assert_eq!(out.data(), codestream.as_slice());
    }
}

#[test]
fn encrypted_jp2k_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let mxf_path = dir.path().join("encrypted.mxf");
    let key = [0x7e; 16];

    let codestream = synthetic_jp2k(1024, 540, &[0x42; 2000]);
    let (descriptor, plaintext_offset) =
        asdcp_essence::jp2k::parse_codestream(&codestream).unwrap();

    let info = WriterInfo {
        encrypted_essence: true,
        uses_hmac: true,
        ..WriterInfo::default()
    };

    let mut writer =
        jp2k::MxfWriter::open_write(&mxf_path, info, &descriptor, &Options::default()).unwrap();
    let mut encryptor = CbcEncryptor::new(&key);
    let mut signer = HmacContext::new(&key);
    let mut frame = FrameBuffer::with_capacity(codestream.len());
    frame.set_data(&codestream).unwrap();
    frame.set_plaintext_offset(plaintext_offset as u32);
    for _ in 0..4 {
        writer
            .write_frame(&frame, Some(&mut encryptor), Some(&mut signer))
            .unwrap();
    }
    writer.finalize().unwrap();

    // body triplets carry the encrypted key, not the element key
    let bytes = std::fs::read(&mxf_path).unwrap();
    let klvs = scan_klvs(&bytes);
    let encrypted_count = klvs
        .iter()
        .filter(|(_, key, _)| *key == labels::ENCRYPTED_TRIPLET)
        .count();
    assert_eq!(encrypted_count, 4);
    assert!(!klvs
        .iter()
        .any(|(_, key, _)| *key == labels::ESSENCE_ELEMENT_JP2K));

    let mut reader = jp2k::MxfReader::open_read(&mxf_path).unwrap();
    let info = reader.writer_info();
    assert!(info.encrypted_essence);
    assert!(!info.context_id.is_nil());
    assert!(!info.cryptographic_key_id.is_nil());

    let mut decryptor = CbcDecryptor::new(&key);
    let mut verifier = HmacContext::new(&key);
    let mut out = FrameBuffer::new();
    for n in 0..4 {
        reader
            .read_frame(n, &mut out, Some(&mut decryptor), Some(&mut verifier))
            .unwrap();
        assert_eq!(out.data(), codestream.as_slice());
        assert_eq!(out.plaintext_offset() as usize, plaintext_offset);
    }

    // the wrong HMAC key must fail verification
    let mut reader = jp2k::MxfReader::open_read(&mxf_path).unwrap();
    let mut decryptor = CbcDecryptor::new(&key);
    let mut wrong = HmacContext::new(&[0u8; 16]);
    assert!(matches!(
        reader.read_frame(0, &mut out, Some(&mut decryptor), Some(&mut wrong)),
        Err(Error::HmacFail)
    ));
}

#[test]
fn swapped_triplet_key_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mxf_path = dir.path().join("swapped.mxf");

    let codestream = synthetic_jp2k(640, 360, &[0x44; 200]);
    let (descriptor, _) = asdcp_essence::jp2k::parse_codestream(&codestream).unwrap();

    let mut writer = jp2k::MxfWriter::open_write(
        &mxf_path,
        WriterInfo::default(),
        &descriptor,
        &Options::default(),
    )
    .unwrap();
    let mut frame = FrameBuffer::with_capacity(codestream.len());
    frame.set_data(&codestream).unwrap();
    for _ in 0..2 {
        writer.write_frame(&frame, None, None).unwrap();
    }
    writer.finalize().unwrap();

    // replace frame 0's key with the PCM element key; the two keys share
    // the generic element prefix, so only full-key matching catches it
    let mut bytes = std::fs::read(&mxf_path).unwrap();
    let (at, _, _) = scan_klvs(&bytes)
        .into_iter()
        .find(|(_, key, _)| *key == labels::ESSENCE_ELEMENT_JP2K)
        .unwrap();
    let at = at as usize;
    bytes[at..at + 16].copy_from_slice(labels::ESSENCE_ELEMENT_PCM.as_bytes());
    std::fs::write(&mxf_path, &bytes).unwrap();

    let mut reader = jp2k::MxfReader::open_read(&mxf_path).unwrap();
    let mut out = FrameBuffer::with_capacity(codestream.len());
    assert!(matches!(
        reader.read_frame(0, &mut out, None, None),
        Err(Error::Format(_))
    ));
    // the untouched frame still reads
    reader.read_frame(1, &mut out, None, None).unwrap();
    assert_eq!(out.data(), codestream.as_slice());
}

#[test]
fn swapped_envelope_essence_key_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mxf_path = dir.path().join("swapped_envelope.mxf");
    let key = [0x31; 16];

    let codestream = synthetic_jp2k(640, 360, &[0x55; 200]);
    let (descriptor, _) = asdcp_essence::jp2k::parse_codestream(&codestream).unwrap();

    // no HMAC: the MIC would otherwise trip before the essence-key check
    let info = WriterInfo {
        encrypted_essence: true,
        ..WriterInfo::default()
    };
    let mut writer =
        jp2k::MxfWriter::open_write(&mxf_path, info, &descriptor, &Options::default()).unwrap();
    let mut encryptor = CbcEncryptor::new(&key);
    let mut frame = FrameBuffer::with_capacity(codestream.len());
    frame.set_data(&codestream).unwrap();
    writer
        .write_frame(&frame, Some(&mut encryptor), None)
        .unwrap();
    writer.finalize().unwrap();

    // the envelope's essence-key field sits 48 bytes into the value,
    // past the 25-byte triplet header
    let mut bytes = std::fs::read(&mxf_path).unwrap();
    let (at, _, _) = scan_klvs(&bytes)
        .into_iter()
        .find(|(_, key, _)| *key == labels::ENCRYPTED_TRIPLET)
        .unwrap();
    let field = at as usize + 25 + 48;
    bytes[field..field + 16].copy_from_slice(labels::ESSENCE_ELEMENT_PCM.as_bytes());
    std::fs::write(&mxf_path, &bytes).unwrap();

    // the decrypting path rejects the foreign essence key
    let mut reader = jp2k::MxfReader::open_read(&mxf_path).unwrap();
    let mut decryptor = CbcDecryptor::new(&key);
    let mut out = FrameBuffer::with_capacity(4096);
    assert!(matches!(
        reader.read_frame(0, &mut out, Some(&mut decryptor), None),
        Err(Error::Format(_))
    ));

    // so does the raw-envelope path
    let mut reader = jp2k::MxfReader::open_read(&mxf_path).unwrap();
    assert!(matches!(
        reader.read_frame(0, &mut out, None, None),
        Err(Error::Format(_))
    ));
}

#[test]
fn header_rewrite_is_confined_to_the_reserve() {
    let dir = tempfile::tempdir().unwrap();
    let mxf_path = dir.path().join("reserve.mxf");
    let snapshot_path = dir.path().join("reserve.snapshot");

    let codestream = synthetic_jp2k(640, 360, &[0x11; 500]);
    let (descriptor, _) = asdcp_essence::jp2k::parse_codestream(&codestream).unwrap();

    let options = Options::default();
    let mut writer = jp2k::MxfWriter::open_write(
        &mxf_path,
        WriterInfo::default(),
        &descriptor,
        &options,
    )
    .unwrap();
    let mut frame = FrameBuffer::with_capacity(codestream.len());
    frame.set_data(&codestream).unwrap();
    for _ in 0..2 {
        writer.write_frame(&frame, None, None).unwrap();
    }

    std::fs::copy(&mxf_path, &snapshot_path).unwrap();
    writer.finalize().unwrap();

    let before = std::fs::read(&snapshot_path).unwrap();
    let after = std::fs::read(&mxf_path).unwrap();

    // the reserved region starts after the partition pack KLV
    let pack = klv::read_klv_header(&mut Cursor::new(&before[..])).unwrap();
    let region_end = pack.size + pack.length as usize + options.header_reserve as usize;

    // every byte past the reserve is untouched by finalize
    assert_eq!(&before[region_end..], &after[region_end..before.len()]);

    // essence triplets sit at identical offsets in both images
    let first_essence_before = scan_klvs(&before)
        .into_iter()
        .find(|(_, key, _)| *key == labels::ESSENCE_ELEMENT_JP2K)
        .unwrap();
    let first_essence_after = scan_klvs(&after)
        .into_iter()
        .find(|(_, key, _)| *key == labels::ESSENCE_ELEMENT_JP2K)
        .unwrap();
    assert_eq!(first_essence_before.0, first_essence_after.0);
}

#[test]
fn writer_state_machine_rejections() {
    let dir = tempfile::tempdir().unwrap();
    let mxf_path = dir.path().join("state.mxf");

    let codestream = synthetic_jp2k(640, 360, &[0x33; 64]);
    let (descriptor, _) = asdcp_essence::jp2k::parse_codestream(&codestream).unwrap();
    let mut frame = FrameBuffer::with_capacity(codestream.len());
    frame.set_data(&codestream).unwrap();

    let mut writer = jp2k::MxfWriter::open_write(
        &mxf_path,
        WriterInfo::default(),
        &descriptor,
        &Options::default(),
    )
    .unwrap();
    writer.write_frame(&frame, None, None).unwrap();
    writer.finalize().unwrap();

    assert!(matches!(
        writer.write_frame(&frame, None, None),
        Err(Error::State(_))
    ));
    assert!(matches!(writer.finalize(), Err(Error::State(_))));
}

#[test]
fn timed_text_resource_ordering() {
    let dir = tempfile::tempdir().unwrap();
    let mxf_path = dir.path().join("subtitles.mxf");

    let document = b"<SubtitleReel><Text>hello</Text></SubtitleReel>";
    let font = [0xf0u8; 256];

    let descriptor = timed_text::TimedTextDescriptor {
        namespace_name: "http://www.smpte-ra.org/schemas/428-7/2010/DCST".to_string(),
        resource_list: vec![timed_text::TimedTextResource {
            asset_id: asdcp::make_uuid().unwrap(),
            mime_media_type: "application/x-font-opentype".to_string(),
        }],
        ..timed_text::TimedTextDescriptor::default()
    };

    let options = Options {
        edit_rate: Some(EDIT_RATE_24),
        ..Options::default()
    };

    let mut writer = timed_text::MxfWriter::open_write(
        &mxf_path,
        WriterInfo::default(),
        &descriptor,
        &options,
    )
    .unwrap();

    let mut font_frame = FrameBuffer::with_capacity(font.len());
    font_frame.set_data(&font).unwrap();

    // ancillary before the document is a state violation
    assert!(matches!(
        writer.write_ancillary_resource(&font_frame, None, None),
        Err(Error::State(_))
    ));

    let mut doc_frame = FrameBuffer::with_capacity(document.len());
    doc_frame.set_data(document).unwrap();
    writer
        .write_timed_text_resource(&doc_frame, None, None)
        .unwrap();

    // a second document is equally rejected
    assert!(matches!(
        writer.write_timed_text_resource(&doc_frame, None, None),
        Err(Error::State(_))
    ));

    writer
        .write_ancillary_resource(&font_frame, None, None)
        .unwrap();
    writer.finalize().unwrap();

    let mut reader = timed_text::MxfReader::open_read(&mxf_path).unwrap();
    let read_descriptor = reader.timed_text_descriptor().unwrap();
    assert_eq!(read_descriptor.resource_list.len(), 1);
    assert_eq!(
        read_descriptor.resource_list[0].mime_media_type,
        "application/x-font-opentype"
    );
    assert_eq!(
        read_descriptor.namespace_name,
        "http://www.smpte-ra.org/schemas/428-7/2010/DCST"
    );

    let mut out = FrameBuffer::with_capacity(4096);
    reader.read_timed_text_resource(&mut out, None, None).unwrap();
    assert_eq!(out.data(), document);
    reader.read_ancillary_resource(1, &mut out, None, None).unwrap();
    assert_eq!(out.data(), font);
}

#[test]
fn stereoscopic_phase_discipline_and_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let mxf_path = dir.path().join("stereo.mxf");

    let left = synthetic_jp2k(640, 360, &[0x01; 300]);
    let right = synthetic_jp2k(640, 360, &[0x02; 333]);
    let (descriptor, _) = asdcp_essence::jp2k::parse_codestream(&left).unwrap();

    let mut writer = jp2k::StereoMxfWriter::open_write(
        &mxf_path,
        WriterInfo::default(),
        &descriptor,
        &Options {
            stereo: true,
            ..Options::default()
        },
    )
    .unwrap();

    let mut left_frame = FrameBuffer::with_capacity(left.len());
    left_frame.set_data(&left).unwrap();
    let mut right_frame = FrameBuffer::with_capacity(right.len());
    right_frame.set_data(&right).unwrap();

    // right before left is out of phase
    assert!(matches!(
        writer.write_frame(&right_frame, jp2k::StereoscopicPhase::Right, None, None),
        Err(Error::State(_))
    ));

    for _ in 0..3 {
        writer
            .write_frame(&left_frame, jp2k::StereoscopicPhase::Left, None, None)
            .unwrap();
        writer
            .write_frame(&right_frame, jp2k::StereoscopicPhase::Right, None, None)
            .unwrap();
    }
    assert_eq!(writer.duration(), 3);
    writer.finalize().unwrap();

    let mut reader = jp2k::StereoMxfReader::open_read(&mxf_path).unwrap();
    assert_eq!(reader.duration(), 3);
    let mut out = FrameBuffer::with_capacity(left.len().max(right.len()));
    for n in 0..3 {
        reader
            .read_frame(n, jp2k::StereoscopicPhase::Left, &mut out, None, None)
            .unwrap();
        assert_eq!(out.data(), left.as_slice());
        reader
            .read_frame(n, jp2k::StereoscopicPhase::Right, &mut out, None, None)
            .unwrap();
        assert_eq!(out.data(), right.as_slice());
    }
}

#[test]
fn as02_jp2k_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let mxf_path = dir.path().join("imf_picture.mxf");

    let codestream = synthetic_jp2k(1920, 1080, &[0x5a; 1500]);
    let (descriptor, _) = asdcp_essence::jp2k::parse_codestream(&codestream).unwrap();

    let mut writer = asdcp::as_02::jp2k::MxfWriter::open_write(
        &mxf_path,
        WriterInfo::default(),
        &descriptor,
        &Options::default(),
    )
    .unwrap();
    let mut frame = FrameBuffer::with_capacity(codestream.len());
    frame.set_data(&codestream).unwrap();
    for _ in 0..6 {
        writer.write_frame(&frame, None, None).unwrap();
    }
    writer.finalize().unwrap();

    // the body rides its own partition
    let bytes = std::fs::read(&mxf_path).unwrap();
    let body_partitions = scan_klvs(&bytes)
        .into_iter()
        .filter(|(_, key, _)| {
            labels::is_partition_key(key) && key.byte(13) == labels::PARTITION_KIND_BODY
        })
        .count();
    assert_eq!(body_partitions, 1);

    let mut reader = asdcp::as_02::jp2k::MxfReader::open_read(&mxf_path).unwrap();
    assert_eq!(reader.duration(), 6);
    let mut out = FrameBuffer::with_capacity(codestream.len());
    for n in 0..6 {
        reader.read_frame(n, &mut out, None, None).unwrap();
        assert_eq!(out.data(), codestream.as_slice());
    }
}

#[test]
fn as02_pcm_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let wav_path = dir.path().join("audio.wav");
    let mxf_path = dir.path().join("imf_audio.mxf");
    let payload = write_test_wav(&wav_path, 6000); // 3 frames

    let mut parser = PcmParser::open_read(&wav_path, EDIT_RATE_24).unwrap();
    let descriptor = *parser.audio_descriptor();

    let mut writer = asdcp::as_02::pcm::MxfWriter::open_write(
        &mxf_path,
        WriterInfo::default(),
        &descriptor,
        &Options::default(),
    )
    .unwrap();
    let mut frame = FrameBuffer::with_capacity(12_000);
    while parser.read_frame(&mut frame).is_ok() {
        writer.write_frame(&frame, None, None).unwrap();
    }
    writer.finalize().unwrap();

    let mut reader = asdcp::as_02::pcm::MxfReader::open_read(&mxf_path).unwrap();
    assert_eq!(reader.duration(), 3);
    let mut recovered = Vec::new();
    for n in 0..3 {
        reader.read_frame(n, &mut frame, None, None).unwrap();
        recovered.extend_from_slice(frame.data());
    }
    assert_eq!(recovered, payload);
}

#[test]
fn as02_jxs_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let mxf_path = dir.path().join("imf_jxs.mxf");

    let codestream = synthetic_jxs(1920, 1080, &[0x66; 900]);
    let (descriptor, _) = asdcp_essence::jxs::parse_codestream(&codestream).unwrap();
    assert_eq!(descriptor.stored_width, 1920);

    let mut writer = asdcp::as_02::jxs::MxfWriter::open_write(
        &mxf_path,
        WriterInfo::default(),
        &descriptor,
        &Options::default(),
    )
    .unwrap();
    let mut frame = FrameBuffer::with_capacity(codestream.len());
    frame.set_data(&codestream).unwrap();
    for _ in 0..2 {
        writer.write_frame(&frame, None, None).unwrap();
    }
    writer.finalize().unwrap();

    let mut reader = asdcp::as_02::jxs::MxfReader::open_read(&mxf_path).unwrap();
    assert_eq!(reader.duration(), 2);
    let read_descriptor = reader.picture_descriptor().unwrap();
    assert_eq!(read_descriptor.wf, 1920);
    assert_eq!(read_descriptor.hf, 1080);
    assert_eq!(read_descriptor.hsl, 16);
    assert_eq!(read_descriptor.component_table, descriptor.component_table);

    let mut out = FrameBuffer::with_capacity(codestream.len());
    for n in 0..2 {
        reader.read_frame(n, &mut out, None, None).unwrap();
        assert_eq!(out.data(), codestream.as_slice());
    }
}

#[test]
fn dcdata_atmos_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let mxf_path = dir.path().join("atmos.mxf");

    let descriptor = dcdata::DCDataDescriptor::atmos(EDIT_RATE_24);
    let mut writer = dcdata::MxfWriter::open_write(
        &mxf_path,
        WriterInfo::default(),
        &descriptor,
        &Options::default(),
    )
    .unwrap();

    let blobs: Vec<Vec<u8>> = (0..4).map(|n| vec![n as u8; 64 + n * 11]).collect();
    for blob in &blobs {
        let mut frame = FrameBuffer::with_capacity(blob.len());
        frame.set_data(blob).unwrap();
        writer.write_frame(&frame, None, None).unwrap();
    }
    writer.finalize().unwrap();

    let mut reader = dcdata::MxfReader::open_read(&mxf_path).unwrap();
    assert_eq!(reader.duration(), 4);
    assert_eq!(
        reader.dcdata_descriptor().unwrap().data_essence_coding,
        labels::DCDATA_CODING_ATMOS
    );
    let mut out = FrameBuffer::with_capacity(256);
    for (n, blob) in blobs.iter().enumerate() {
        reader.read_frame(n as u64, &mut out, None, None).unwrap();
        assert_eq!(out.data(), blob.as_slice());
    }
}

#[test]
fn phdr_round_trip_with_master_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let mxf_path = dir.path().join("phdr.mxf");

    let codestream = synthetic_jp2k(640, 360, &[0x21; 400]);
    let (descriptor, _) = asdcp_essence::jp2k::parse_codestream(&codestream).unwrap();

    let mut writer = phdr::PhdrWriter::open_write(
        &mxf_path,
        WriterInfo::default(),
        &descriptor,
        &Options::default(),
    )
    .unwrap();

    let mut picture = FrameBuffer::with_capacity(codestream.len());
    picture.set_data(&codestream).unwrap();
    let metadata_blobs: Vec<Vec<u8>> = (0..3).map(|n| vec![0xd0 + n as u8; 48]).collect();
    for blob in &metadata_blobs {
        let mut metadata = FrameBuffer::with_capacity(blob.len());
        metadata.set_data(blob).unwrap();
        writer.write_frame(&picture, &metadata, None, None).unwrap();
    }
    writer.finalize("<PhdrMasterMetadata/>").unwrap();

    let mut reader = phdr::PhdrReader::open_read(&mxf_path).unwrap();
    assert_eq!(reader.duration(), 3);
    let mut out = FrameBuffer::with_capacity(1024);
    for (n, blob) in metadata_blobs.iter().enumerate() {
        reader.read_frame(n as u64, &mut out, None, None).unwrap();
        assert_eq!(out.data(), codestream.as_slice());
        reader.read_metadata(n as u64, &mut out).unwrap();
        assert_eq!(out.data(), blob.as_slice());
    }
    reader.read_master_metadata(&mut out).unwrap();
    assert_eq!(out.data(), b"<PhdrMasterMetadata/>");
}

#[test]
fn pcm_parser_list_interleaves_inputs() {
    let dir = tempfile::tempdir().unwrap();
    let left_path = dir.path().join("left.wav");
    let right_path = dir.path().join("right.wav");
    let left = write_test_wav(&left_path, 2000); // one frame each
    let right = write_test_wav(&right_path, 2000);

    let paths: Vec<PathBuf> = vec![left_path, right_path];
    let mut list = pcm::PcmParserList::open_read(&paths, EDIT_RATE_24).unwrap();
    assert_eq!(list.audio_descriptor().channel_count, 4);
    assert_eq!(list.frame_buffer_size(), 24_000);

    let mut frame = FrameBuffer::with_capacity(24_000);
    list.read_frame(&mut frame).unwrap();
    assert_eq!(frame.len(), 24_000);

    // sample 0 of the output holds sample 0 of each input, in order
    assert_eq!(&frame.data()[..6], &left[..6]);
    assert_eq!(&frame.data()[6..12], &right[..6]);
    assert_eq!(&frame.data()[12..18], &left[6..12]);

    // restartable
    list.reset().unwrap();
    let mut again = FrameBuffer::with_capacity(24_000);
    list.read_frame(&mut again).unwrap();
    assert_eq!(again.data(), frame.data());
}
