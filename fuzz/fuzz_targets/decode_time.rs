#![no_main]

use libfuzzer_sys::fuzz_target;
use x690::{Element, Mode, Tag};

fuzz_target!(|data: &[u8]| {
    for mode in [Mode::Ber, Mode::Cer, Mode::Der] {
        let Ok((elem, _)) = mode.decode_one(data) else {
            continue
        };

        if let Ok(value) = elem.to_utc_time() {
            let mut re = Element::new(mode, Tag::UTC_TIME);
            re.set_utc_time(value).unwrap();
            assert_eq!(re.value().as_ref(), elem.value().as_ref());
        }
        if let Ok(value) = elem.to_generalized_time() {
            let mut re = Element::new(mode, Tag::GENERALIZED_TIME);
            re.set_generalized_time(value).unwrap();
        }
    }
});
