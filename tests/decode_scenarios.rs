//! End-to-end decoding of complete files

mod common;

use common::{DbcBuilder, Row};
use dbc_rs::{
    DecodeErrorKind, FieldDeclaration, ReaderOptions, RecordStore, Schema, Value,
};
use proptest::prelude::*;
use std::sync::Arc;
use std::thread;

#[test]
fn test_foreign_key_columns_independent() {
    let schema =
        Schema::new(vec![FieldDeclaration::new("reagent", "foreign_key").param("count", 3)]).unwrap();
    assert_eq!(schema.total_column_count(), 3);

    let bytes = DbcBuilder::new(12)
        .pool(b"")
        .record(Row::new().i32(2589).i32(0).i32(-1).bytes())
        .build();
    let store = RecordStore::from_bytes(bytes, schema).unwrap();
    let record = store.record(0).unwrap();

    assert_eq!(record.len(), 3);
    assert_eq!(record.columns(), &["reagent_1", "reagent_2", "reagent_3"]);
    assert_eq!(record.get("reagent_1"), Some(&Value::Int(2589)));
    assert_eq!(record.get("reagent_2"), Some(&Value::Int(0)));
    assert_eq!(record.get("reagent_3"), Some(&Value::Int(-1)));
}

#[test]
fn test_mixed_widths() {
    let schema = Schema::new(vec![
        FieldDeclaration::new("id", "uint"),
        FieldDeclaration::new("race", "uchar"),
        FieldDeclaration::new("gender", "char"),
        FieldDeclaration::new("pad", "uchar").param("count", 2),
        FieldDeclaration::new("scale", "float"),
    ])
    .unwrap();
    assert_eq!(schema.total_record_size(), 12);

    let bytes = DbcBuilder::new(12)
        .field_count(6)
        .pool(b"")
        .record(Row::new().u32(1).u8(7).u8(0xFE).u8(1).u8(2).f32(1.25).bytes())
        .build();
    let record = RecordStore::from_bytes(bytes, schema).unwrap().record(0).unwrap();

    assert_eq!(record.get("race"), Some(&Value::UInt(7)));
    assert_eq!(record.get("gender"), Some(&Value::Int(-2)));
    assert_eq!(record.get("pad_1"), Some(&Value::UInt(1)));
    assert_eq!(record.get("pad_2"), Some(&Value::UInt(2)));
    assert_eq!(record.get("scale"), Some(&Value::Float(1.25)));
}

#[test]
fn test_localized_strings() {
    let options = ReaderOptions {
        locale_count: 8,
        ..ReaderOptions::default()
    };
    let schema = Schema::with_options(
        vec![
            FieldDeclaration::new("id", "uint"),
            FieldDeclaration::new("name", "localized_string"),
        ],
        &options,
    )
    .unwrap();
    assert_eq!(schema.total_record_size(), 40);
    assert_eq!(schema.total_column_count(), 10);

    let mut builder = DbcBuilder::new(40).field_count(10);
    let en = builder.string("Stormwind City");
    let de = builder.string("Sturmwind");
    let mut row = Row::new().u32(1519).u32(en).u32(0).u32(0).u32(de);
    for _ in 0..4 {
        row = row.u32(0);
    }
    builder.push_record(row.u32(0x00FF_01FE).bytes());

    let store = RecordStore::from_bytes(builder.build(), schema).unwrap();
    let record = store.record(0).unwrap();

    assert_eq!(record.get("name_1").and_then(Value::as_str), Some("Stormwind City"));
    assert_eq!(record.get("name_4").and_then(Value::as_str), Some("Sturmwind"));
    assert_eq!(record.get("name_8").and_then(Value::as_str), Some(""));
    assert_eq!(record.get("name_flags"), Some(&Value::UInt(0x00FF_01FE)));
}

#[test]
fn test_corrupt_rows_do_not_stop_scan() {
    let schema = Schema::new(vec![
        FieldDeclaration::new("id", "uint"),
        FieldDeclaration::new("name", "string"),
    ])
    .unwrap();

    let mut builder = DbcBuilder::new(8);
    let ok = builder.string("fine");
    for id in 0..10u32 {
        let offset = if id % 3 == 0 { 10_000 + id } else { ok };
        builder.push_record(Row::new().u32(id).u32(offset).bytes());
    }
    let store = RecordStore::from_bytes(builder.build(), schema).unwrap();

    let records: Vec<_> = store.iter().collect::<Result<_, _>>().unwrap();
    assert_eq!(records.len(), 10);

    let errors = store.errors();
    let bad: Vec<u32> = errors.iter().map(|e| e.record).collect();
    assert_eq!(bad, vec![0, 3, 6, 9]);
    assert!(errors.iter().all(|e| e.kind == DecodeErrorKind::BadStringOffset));
    assert!(errors.iter().all(|e| e.field == "name"));

    assert_eq!(records[3].get("name").and_then(Value::as_str), Some(""));
    assert_eq!(records[4].get("name").and_then(Value::as_str), Some("fine"));
}

#[test]
fn test_decoding_twice_is_identical() {
    let schema = Schema::new(vec![
        FieldDeclaration::new("id", "int"),
        FieldDeclaration::new("name", "string"),
    ])
    .unwrap();
    let mut builder = DbcBuilder::new(8);
    let name = builder.string("Booty Bay");
    builder.push_record(Row::new().i32(-7).u32(name).bytes());
    let store = RecordStore::from_bytes(builder.build(), schema).unwrap();

    let first = store.record(0).unwrap();
    let second = store.record(0).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_concurrent_readers_share_store() {
    let schema = Schema::new(vec![
        FieldDeclaration::new("id", "uint"),
        FieldDeclaration::new("name", "string"),
    ])
    .unwrap();

    let mut builder = DbcBuilder::new(8);
    let names: Vec<u32> = (0..16).map(|i| builder.string(&format!("zone-{}", i))).collect();
    for (id, offset) in names.iter().enumerate() {
        builder.push_record(Row::new().u32(id as u32).u32(*offset).bytes());
    }
    let store = Arc::new(RecordStore::from_bytes(builder.build(), schema).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let mut cursor = store.cursor();
                cursor.seek(t);
                let mut seen = 0;
                while cursor.valid() {
                    let record = cursor.current().unwrap();
                    let expected = format!("zone-{}", record.index());
                    assert_eq!(record.get("name").and_then(Value::as_str), Some(expected.as_str()));
                    seen += 1;
                    for _ in 0..4 {
                        cursor.next();
                    }
                }
                seen
            })
        })
        .collect();

    let total: i32 = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(total, 16);
    assert!(store.errors().is_empty());
}

proptest! {
    #[test]
    fn prop_decode_is_idempotent(
        rows in prop::collection::vec((any::<i32>(), any::<u8>(), 0u32..64), 1..20),
        pool in prop::collection::vec(any::<u8>(), 1..48)
    ) {
        let schema = Schema::new(vec![
            FieldDeclaration::new("id", "int"),
            FieldDeclaration::new("flag", "char"),
            FieldDeclaration::new("pad", "uchar").param("count", 3),
            FieldDeclaration::new("name", "string"),
        ])
        .unwrap();

        let mut builder = DbcBuilder::new(12).field_count(6).pool(&pool);
        for (id, flag, offset) in &rows {
            builder.push_record(Row::new().i32(*id).u8(*flag).u8(0).u8(0).u8(0).u32(*offset).bytes());
        }
        let store = RecordStore::from_bytes(builder.build(), schema).unwrap();

        for index in 0..store.record_count() {
            let (first, first_errors) = store.decode(index).unwrap();
            let (second, second_errors) = store.decode(index).unwrap();
            prop_assert_eq!(first, second);
            prop_assert_eq!(first_errors, second_errors);
        }
        prop_assert_eq!(store.record_count() as usize, rows.len());
    }
}
