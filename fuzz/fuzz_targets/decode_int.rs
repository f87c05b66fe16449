#![no_main]

use libfuzzer_sys::fuzz_target;
use x690::Mode;

fuzz_target!(|data: &[u8]| {
    for mode in [Mode::Ber, Mode::Cer, Mode::Der] {
        let Ok((elem, _)) = mode.decode_one(data) else {
            continue
        };

        if let Ok(value) = elem.to_i8() {
            assert_eq!(elem.to_i128().unwrap(), i128::from(value));
        }
        let _ = elem.to_i16();
        let _ = elem.to_i32();
        let _ = elem.to_i64();
        let _ = elem.to_u8();
        let _ = elem.to_u16();
        let _ = elem.to_u32();
        let _ = elem.to_u64();
        let _ = elem.to_u128();

        if let Ok(value) = elem.to_integer() {
            // A decoded integer must re-encode to the same octets in the
            // restricted modes.
            if mode.is_restricted() {
                assert_eq!(value.as_slice(), elem.value().as_ref());
            }
        }
        if let Ok(value) = elem.to_unsigned() {
            assert!(!value.into_integer().is_negative());
        }
    }
});
