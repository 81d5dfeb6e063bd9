#![no_main]
use libfuzzer_sys::fuzz_target;
use results_plotter::record::{ParsedRecord, is_report_name, parse_file_name};

// Arbitrary file names: parsing must agree with the matcher and never panic.
fuzz_target!(|data: &[u8]| {
    let Ok(name) = std::str::from_utf8(data) else {
        return;
    };
    let parsed = parse_file_name(name);
    assert_eq!(parsed.is_ok(), is_report_name(name));
    if let Ok((kind, scenario, params)) = parsed {
        assert!(!kind.is_empty() && !scenario.is_empty() && !params.is_empty());
        if !name.contains('/') {
            let record = ParsedRecord::from_path(name).unwrap();
            assert!(record.require("type").is_ok());
        }
    }
});
