#![no_main]

use libfuzzer_sys::fuzz_target;
use x690::{Mode, Oid};

pub const SHA256: Oid = Oid::from_static(
    &[96, 134, 72, 1, 101, 3, 4, 2, 1]
);

fuzz_target!(|data: &[u8]| {
    for mode in [Mode::Ber, Mode::Cer, Mode::Der] {
        let Ok((elem, _)) = mode.decode_one(data) else {
            continue
        };

        if let Ok(oid) = elem.to_oid() {
            // Formatting walks every component.
            let _ = oid.to_string();
            if oid == SHA256 {
                assert_eq!(oid.to_string(), "2.16.840.1.101.3.4.2.1");
            }
        }
        if let Ok(roid) = elem.to_relative_oid() {
            let _ = roid.to_string();
            let _ = roid.components().count();
        }
    }
});
