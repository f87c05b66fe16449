#![no_main]

use libfuzzer_sys::fuzz_target;
use x690::Mode;

fuzz_target!(|data: &[u8]| {
    for mode in [Mode::Ber, Mode::Cer, Mode::Der] {
        let Ok((elem, read)) = mode.decode_one(data) else {
            continue
        };
        assert!(read <= data.len());

        // In the restricted modes every accepted framing is canonical, so
        // re-encoding what we decoded must reproduce the consumed input.
        if mode.is_restricted() {
            assert_eq!(elem.to_bytes().as_ref(), &data[..read]);
        }

        if elem.is_constructed() {
            let _ = elem.children();
        }
        let _ = elem.to_bool();
        let _ = elem.to_null();
    }
});
