//! Property-based tests: essence parsers must never panic on arbitrary
//! input, and must fail cleanly rather than misalign.

use asdcp_essence::{jp2k, jxs, wav};
use proptest::prelude::*;
use std::io::Cursor;

proptest! {
    #[test]
    fn jp2k_parser_no_panic(data in prop::collection::vec(any::<u8>(), 0..2048)) {
        let _ = jp2k::parse_codestream(&data);
    }

    #[test]
    fn jp2k_parser_no_panic_with_soc(data in prop::collection::vec(any::<u8>(), 0..2048)) {
        let mut stream = vec![0xff, 0x4f];
        stream.extend_from_slice(&data);
        let _ = jp2k::parse_codestream(&stream);
    }

    #[test]
    fn jxs_parser_no_panic(data in prop::collection::vec(any::<u8>(), 0..2048)) {
        let _ = jxs::parse_codestream(&data);
    }

    #[test]
    fn jxs_parser_no_panic_with_soc(data in prop::collection::vec(any::<u8>(), 0..2048)) {
        let mut stream = vec![0xff, 0x10];
        stream.extend_from_slice(&data);
        let _ = jxs::parse_codestream(&stream);
    }

    #[test]
    fn wav_parser_no_panic(data in prop::collection::vec(any::<u8>(), 0..1024)) {
        let _ = wav::SimpleWavHeader::read(&mut Cursor::new(&data));
    }

    #[test]
    fn wav_parser_no_panic_with_riff(data in prop::collection::vec(any::<u8>(), 0..1024)) {
        let mut stream = b"RIFF\x00\x10\x00\x00WAVE".to_vec();
        stream.extend_from_slice(&data);
        let _ = wav::SimpleWavHeader::read(&mut Cursor::new(&stream));
    }
}
