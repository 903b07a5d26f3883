//! Property-based tests for the KLV codec and memory cursors.

use asdcp_core::{klv, MemReader};
use proptest::prelude::*;

proptest! {
    /// Every length round-trips through its smallest BER form.
    #[test]
    fn ber_round_trip_smallest(value in any::<u64>()) {
        let encoded = klv::encode_ber(value, 0).unwrap();
        let (decoded, consumed) = klv::decode_ber(&encoded).unwrap();
        prop_assert_eq!(decoded, value);
        prop_assert_eq!(consumed, encoded.len());
        prop_assert_eq!(encoded.len(), klv::ber_size_for(value));
    }

    /// Every length round-trips through the fixed essence form.
    #[test]
    fn ber_round_trip_essence_form(value in any::<u64>()) {
        let encoded = klv::encode_ber(value, klv::MXF_BER_LENGTH).unwrap();
        prop_assert_eq!(encoded.len(), klv::MXF_BER_LENGTH);
        let (decoded, consumed) = klv::decode_ber(&encoded).unwrap();
        prop_assert_eq!(decoded, value);
        prop_assert_eq!(consumed, klv::MXF_BER_LENGTH);
    }

    /// BER decoding never panics on arbitrary input.
    #[test]
    fn ber_decode_no_panic(data in prop::collection::vec(any::<u8>(), 0..64)) {
        let _ = klv::decode_ber(&data);
    }

    /// KLV header parsing never panics on arbitrary input.
    #[test]
    fn klv_header_no_panic(data in prop::collection::vec(any::<u8>(), 0..64)) {
        let mut cursor = std::io::Cursor::new(data);
        let _ = klv::read_klv_header(&mut cursor);
    }

    /// The memory reader never reads past its buffer.
    #[test]
    fn mem_reader_no_panic(
        data in prop::collection::vec(any::<u8>(), 0..128),
        ops in prop::collection::vec(0u8..5, 1..16)
    ) {
        let mut reader = MemReader::new(&data);
        for op in ops {
            let _ = match op {
                0 => reader.read_u8().map(u64::from),
                1 => reader.read_u16().map(u64::from),
                2 => reader.read_u32().map(u64::from),
                3 => reader.read_u64(),
                _ => reader.read_ber(),
            };
        }
    }
}
