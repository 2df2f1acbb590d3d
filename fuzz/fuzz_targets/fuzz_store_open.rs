#![no_main]
use dbc_rs::{FieldDeclaration, RecordStore, Schema};
use libfuzzer_sys::fuzz_target;

// Arbitrary bytes must either be rejected or decode every record without panicking
fuzz_target!(|data: &[u8]| {
    let schema = match Schema::new(vec![
        FieldDeclaration::new("id", "uint"),
        FieldDeclaration::new("name", "string"),
        FieldDeclaration::new("flag", "uchar"),
        FieldDeclaration::new("pad", "uchar").param("count", 3),
        FieldDeclaration::new("title", "localized_string"),
    ]) {
        Ok(s) => s,
        Err(_) => return,
    };

    let store = match RecordStore::from_bytes(data.to_vec(), schema) {
        Ok(s) => s,
        Err(_) => return,
    };

    for record in store.iter() {
        let _ = record;
    }

    let mut cursor = store.cursor();
    cursor.seek(-1);
    assert!(!cursor.valid());
    assert!(cursor.current().is_err());
});
