#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    // Fuzz the KLV header and BER codecs with arbitrary data
    let _ = asdcp_core::klv::decode_ber(data);
    let mut cursor = Cursor::new(data);
    let _ = asdcp_core::klv::read_klv_header(&mut cursor);
});
