#![no_main]

use libfuzzer_sys::fuzz_target;
use x690::{Element, Mode, Tag};

fuzz_target!(|data: &[u8]| {
    for mode in [Mode::Ber, Mode::Cer, Mode::Der] {
        let Ok((elem, _)) = mode.decode_one(data) else {
            continue
        };
        let Ok(value) = elem.to_real() else {
            continue
        };

        // Whatever came out must survive a round trip through the
        // canonical encoder.
        let mut re = Element::new(Mode::Der, Tag::REAL);
        re.set_real(value);
        let back = re.to_real().unwrap();
        assert!(back == value || (back.is_nan() && value.is_nan()));
    }
});
