#![no_main]
use libfuzzer_sys::fuzz_target;
use results_plotter::filter::FieldFilter;

// Arbitrary --filter / --exclude values must parse or fail cleanly.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(filter) = s.parse::<FieldFilter>() {
            for field in filter.fields() {
                assert!(!field.is_empty());
                assert!(filter.values(field).is_some());
            }
        }
    }
});
