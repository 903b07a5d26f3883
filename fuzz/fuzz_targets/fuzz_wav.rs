#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    // Fuzz the RIFF/WAVE chunk parser with arbitrary data
    let mut cursor = Cursor::new(data);
    let _ = asdcp_essence::wav::SimpleWavHeader::read(&mut cursor);
});
