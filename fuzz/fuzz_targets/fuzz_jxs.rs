#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Fuzz the JPEG XS marker walker with arbitrary data
    let _ = asdcp_essence::jxs::parse_codestream(data);
});
