//! Minimal .xlsx writer for tests: inline strings, numbers and
//! date-formatted serials, one worksheet per entry.
use crate::spreadsheet::cell::Value;
use crate::spreadsheet::reference::cell_position;
use chrono::NaiveDate;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// A worksheet: name plus rows. `None` rows are left out of the sheet
/// entirely, producing blank rows in the used range.
pub(crate) type SheetData<'a> = (&'a str, Vec<Option<Vec<Value>>>);

pub(crate) fn write_xlsx(path: &Path, sheets: &[SheetData]) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let mut entry = |name: &str, content: String| {
        zip.start_file(name, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    };

    let overrides: String = (1..=sheets.len())
        .map(|index| {
            format!(
                r#"<Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
                index
            )
        })
        .collect();
    entry(
        "[Content_Types].xml",
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>{}</Types>"#,
            overrides
        ),
    );
    entry(
        "_rels/.rels",
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="{}/officeDocument" Target="xl/workbook.xml"/></Relationships>"#,
            REL_NS
        ),
    );

    let sheet_list: String = sheets
        .iter()
        .enumerate()
        .map(|(index, (name, _))| {
            format!(
                r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                escape(name),
                index + 1,
                index + 1
            )
        })
        .collect();
    entry(
        "xl/workbook.xml",
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><workbook xmlns="{}" xmlns:r="{}"><sheets>{}</sheets></workbook>"#,
            MAIN_NS, REL_NS, sheet_list
        ),
    );

    let sheet_rels: String = (1..=sheets.len())
        .map(|index| {
            format!(
                r#"<Relationship Id="rId{}" Type="{}/worksheet" Target="worksheets/sheet{}.xml"/>"#,
                index, REL_NS, index
            )
        })
        .collect();
    entry(
        "xl/_rels/workbook.xml.rels",
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}<Relationship Id="rId{}" Type="{}/styles" Target="styles.xml"/></Relationships>"#,
            sheet_rels,
            sheets.len() + 1,
            REL_NS
        ),
    );

    // Style 1 uses the built-in short date format 14.
    entry(
        "xl/styles.xml",
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><styleSheet xmlns="{}"><fonts count="1"><font/></fonts><fills count="1"><fill/></fills><borders count="1"><border/></borders><cellStyleXfs count="1"><xf numFmtId="0"/></cellStyleXfs><cellXfs count="2"><xf numFmtId="0" xfId="0"/><xf numFmtId="14" xfId="0" applyNumberFormat="1"/></cellXfs></styleSheet>"#,
            MAIN_NS
        ),
    );

    for (index, (_, rows)) in sheets.iter().enumerate() {
        entry(
            &format!("xl/worksheets/sheet{}.xml", index + 1),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="{}"><sheetData>{}</sheetData></worksheet>"#,
                MAIN_NS,
                sheet_rows(rows)
            ),
        );
    }
    zip.finish().unwrap();
}

fn sheet_rows(rows: &[Option<Vec<Value>>]) -> String {
    let mut xml = String::new();
    for (row_index, row) in rows.iter().enumerate() {
        let Some(row) = row else {
            continue;
        };
        xml.push_str(&format!(r#"<row r="{}">"#, row_index + 1));
        for (column, value) in row.iter().enumerate() {
            let position = cell_position(row_index, column);
            let cell = match value {
                Value::Empty => continue,
                Value::Int(number) => format!(r#"<c r="{}"><v>{}</v></c>"#, position, number),
                Value::Float(number) => format!(r#"<c r="{}"><v>{}</v></c>"#, position, number),
                Value::Date(date) => format!(r#"<c r="{}" s="1"><v>{}</v></c>"#, position, serial(*date)),
                other => format!(
                    r#"<c r="{}" t="inlineStr"><is><t>{}</t></is></c>"#,
                    position,
                    escape(&other.to_string())
                ),
            };
            xml.push_str(&cell);
        }
        xml.push_str("</row>");
    }
    xml
}

/// Days since the 1900 date system's epoch.
fn serial(date: NaiveDate) -> i64 {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).unwrap();
    (date - epoch).num_days()
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
