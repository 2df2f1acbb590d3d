#![no_main]
use dbc_rs::{mapping, ReaderOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(schema) = mapping::schema_from_yaml(text, &ReaderOptions::default()) {
        assert_eq!(
            schema.total_column_count(),
            schema.fields().iter().map(|f| f.column_count()).sum::<usize>()
        );
    }
});
