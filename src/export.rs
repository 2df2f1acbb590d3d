//! Rendering decoded records to text formats
//!
//! Exporters walk a file with a [`RecordCursor`](crate::RecordCursor) and
//! write every record. Content problems hit along the way are returned in
//! the [`ExportSummary`] so the caller can report them.

use crate::config::ClientVersion;
use crate::decoder::DecodeError;
use crate::error::Result;
use crate::record::Record;
use crate::DbcFile;
use serde::ser::{Error as _, Serialize, SerializeMap, SerializeSeq, Serializer as _};
use serde_json::ser::Formatter;
use std::cell::RefCell;
use std::io::Write;
use tracing::info;

/// Outcome of one export
#[derive(Debug, Clone, Default)]
pub struct ExportSummary {
    pub records: u32,
    pub errors: Vec<DecodeError>,
}

/// Renders a decoded file to a writer
pub trait Exporter {
    /// Short format name ("xml", "json")
    fn format(&self) -> &'static str;

    fn export(&self, dbc: &DbcFile, out: &mut dyn Write) -> Result<ExportSummary>;
}

/// Decode every record through a cursor, handing each to `visit`
fn walk<F>(dbc: &DbcFile, mut visit: F) -> Result<ExportSummary>
where
    F: FnMut(&Record) -> Result<()>,
{
    let mut summary = ExportSummary::default();
    let mut cursor = dbc.cursor();
    cursor.rewind();

    while cursor.valid() {
        let (record, errors) = cursor.decode()?;
        visit(&record)?;
        summary.records += 1;
        summary.errors.extend(errors);
        cursor.next();
    }

    Ok(summary)
}

/// XML export
///
/// ```text
/// <?xml version="1.0" encoding="UTF-8"?>
/// <dbc name="AreaPOI" client-version="1.12.1" records="2" fields="20">
///   <record index="0">
///     <id>1</id>
///     ...
///   </record>
/// </dbc>
/// ```
#[derive(Debug, Clone, Default)]
pub struct XmlExporter {
    pub client_version: ClientVersion,
}

impl XmlExporter {
    pub fn new(client_version: ClientVersion) -> Self {
        XmlExporter { client_version }
    }
}

impl Exporter for XmlExporter {
    fn format(&self) -> &'static str {
        "xml"
    }

    fn export(&self, dbc: &DbcFile, out: &mut dyn Write) -> Result<ExportSummary> {
        let store = dbc.store();

        writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(
            out,
            r#"<dbc name="{}" client-version="{}" records="{}" fields="{}">"#,
            escape(dbc.name()),
            self.client_version,
            store.record_count(),
            store.field_count()
        )?;

        let summary = walk(dbc, |record| {
            writeln!(out, r#"  <record index="{}">"#, record.index())?;
            for (column, value) in record.iter() {
                writeln!(out, "    <{0}>{1}</{0}>", column, escape(&value.to_string()))?;
            }
            writeln!(out, "  </record>")?;
            Ok(())
        })?;

        writeln!(out, "</dbc>")?;
        out.flush()?;

        info!(
            name = dbc.name(),
            records = summary.records,
            errors = summary.errors.len(),
            "Exported XML"
        );
        Ok(summary)
    }
}

/// Escape text for XML content and attribute values
///
/// Control characters XML 1.0 cannot carry are replaced with U+FFFD.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '\t' | '\n' | '\r' => escaped.push(c),
            c if (c as u32) < 0x20 => escaped.push('\u{fffd}'),
            c => escaped.push(c),
        }
    }
    escaped
}

/// JSON export
///
/// `{"name": ..., "client_version": ..., "records": [{column: value, ...}, ...]}`
///
/// Records are serialized one at a time as the cursor reaches them, so
/// memory use does not grow with the file.
#[derive(Debug, Clone, Default)]
pub struct JsonExporter {
    pub client_version: ClientVersion,
    pub pretty: bool,
}

impl JsonExporter {
    fn write_document<W, F>(
        &self,
        dbc: &DbcFile,
        serializer: &mut serde_json::Serializer<W, F>,
    ) -> Result<ExportSummary>
    where
        W: Write,
        F: Formatter,
    {
        let records = RecordSeq {
            dbc,
            summary: RefCell::new(ExportSummary::default()),
        };

        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("name", dbc.name())?;
        map.serialize_entry("client_version", &self.client_version.to_string())?;
        map.serialize_entry("records", &records)?;
        SerializeMap::end(map)?;

        Ok(records.summary.into_inner())
    }
}

/// Streams every record of a file as a JSON array
struct RecordSeq<'a> {
    dbc: &'a DbcFile,
    summary: RefCell<ExportSummary>,
}

impl Serialize for RecordSeq<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut summary = self.summary.borrow_mut();
        let mut seq = serializer.serialize_seq(Some(self.dbc.store().record_count() as usize))?;

        let mut cursor = self.dbc.cursor();
        while cursor.valid() {
            let (record, errors) = cursor.decode().map_err(S::Error::custom)?;
            seq.serialize_element(&record)?;
            summary.records += 1;
            summary.errors.extend(errors);
            cursor.next();
        }

        seq.end()
    }
}

impl Exporter for JsonExporter {
    fn format(&self) -> &'static str {
        "json"
    }

    fn export(&self, dbc: &DbcFile, out: &mut dyn Write) -> Result<ExportSummary> {
        let summary = if self.pretty {
            self.write_document(dbc, &mut serde_json::Serializer::pretty(&mut *out))?
        } else {
            self.write_document(dbc, &mut serde_json::Serializer::new(&mut *out))?
        };
        writeln!(out)?;
        out.flush()?;

        info!(
            name = dbc.name(),
            records = summary.records,
            errors = summary.errors.len(),
            "Exported JSON"
        );
        Ok(summary)
    }
}
