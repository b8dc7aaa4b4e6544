#![no_main]

use libfuzzer_sys::fuzz_target;
use p3data::calibration::{parse_das_conf, CalibrationTable};

fuzz_target!(|data: &[u8]| {
    let content = String::from_utf8_lossy(data);
    if let Ok(channels) = parse_das_conf(&content) {
        let table = CalibrationTable::from_das_channels(&channels);
        assert!(table.len() <= channels.len());
    }
});
