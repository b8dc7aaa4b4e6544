#![no_main]

use libfuzzer_sys::fuzz_target;
use p3data::ibw::{decode_header, decode_wave};
use p3data::shot::ChannelTrace;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must decode or fail with an error, never panic
    let _ = decode_header(data);

    if let Ok(wave) = decode_wave(data) {
        assert_eq!(wave.values.len(), wave.header.points);

        // Decoded waves may still violate trace invariants; that is an error too
        let _ = ChannelTrace::from_wave("fuzz", wave, None);
    }
});
