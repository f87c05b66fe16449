#![no_main]

use libfuzzer_sys::fuzz_target;
use x690::Mode;
use x690::string::{
    BmpCharSet, Ia5CharSet, NumericCharSet, PrintableCharSet,
    UniversalCharSet, Utf8CharSet,
};

fuzz_target!(|data: &[u8]| {
    for mode in [Mode::Ber, Mode::Cer, Mode::Der] {
        let Ok((elem, _)) = mode.decode_one(data) else {
            continue
        };

        if let Ok(bits) = elem.to_bit_string() {
            assert!(bits.unused() < 8);
            assert!(bits.octet_len() > 0 || bits.unused() == 0);
            assert!(!bits.bit(bits.bit_len()));
        }
        if let Ok(os) = elem.to_octet_string() {
            let _ = os.len();
        }
        let _ = elem.to_restricted_string::<Utf8CharSet>()
            .map(|s| s.to_string());
        let _ = elem.to_restricted_string::<Ia5CharSet>()
            .map(|s| s.to_string());
        let _ = elem.to_restricted_string::<NumericCharSet>()
            .map(|s| s.to_string());
        let _ = elem.to_restricted_string::<PrintableCharSet>()
            .map(|s| s.to_string());
        let _ = elem.to_restricted_string::<BmpCharSet>()
            .map(|s| s.to_string());
        let _ = elem.to_restricted_string::<UniversalCharSet>()
            .map(|s| s.to_string());
    }
});
