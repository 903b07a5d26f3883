#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Fuzz the JPEG 2000 marker walker with arbitrary data
    let _ = asdcp_essence::jp2k::parse_codestream(data);
});
