//! Writes small but complete `.xlsx` packages for the integration tests.
#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;
use zip::ZipWriter;

/// Style indexes available in every fixture workbook (see `STYLES`).
pub const STYLE_DATE: usize = 1;
pub const STYLE_DATETIME: usize = 2;
pub const STYLE_TIME: usize = 3;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<numFmts count="1"><numFmt numFmtId="164" formatCode="yyyy\-mm\-dd\ hh:mm:ss"/></numFmts>
<cellXfs count="4">
<xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
<xf numFmtId="14" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/>
<xf numFmtId="164" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/>
<xf numFmtId="21" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/>
</cellXfs>
</styleSheet>"#;

const CHARTSHEET: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<chartsheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetViews><sheetView workbookViewId="0"/></sheetViews></chartsheet>"#;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
</Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

/// One worksheet cell.
#[derive(Clone, Debug)]
pub enum Cell {
    Empty,
    /// Number with the General format
    Number(String),
    /// Text stored in the shared string table
    Text(String),
    /// Text stored inline (`t="inlineStr"`)
    Inline(String),
    Bool(bool),
    Error(String),
    /// Number with a style index from `STYLES`
    Styled(String, usize),
    /// ISO 8601 value (`t="d"`)
    Iso(String),
    /// Raw index into the shared string table
    SharedIndex(usize),
}

pub fn num(value: impl ToString) -> Cell {
    Cell::Number(value.to_string())
}

pub fn text(value: &str) -> Cell {
    Cell::Text(value.to_owned())
}

/// How a declared sheet is linked from the workbook.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Link {
    Worksheet,
    Chartsheet,
    /// `r:id` points at no relationship
    Dangling,
}

struct SheetFixture {
    name: String,
    rows: Vec<Vec<Cell>>,
    write_part: bool,
    with_references: bool,
    link: Link,
}

/// Builder for a workbook fixture.
#[derive(Default)]
pub struct Workbook {
    sheets: Vec<SheetFixture>,
    shared_strings: Vec<String>,
    date1904: bool,
}

impl Workbook {
    pub fn new() -> Self {
        Workbook::default()
    }

    /// Adds a worksheet; the first row is usually the header.
    pub fn sheet(mut self, name: &str, rows: Vec<Vec<Cell>>) -> Self {
        self.sheets.push(SheetFixture {
            name: name.to_owned(),
            rows,
            write_part: true,
            with_references: true,
            link: Link::Worksheet,
        });
        self
    }

    /// Adds a worksheet whose cells carry no `r` attributes.
    pub fn sheet_without_references(mut self, name: &str, rows: Vec<Vec<Cell>>) -> Self {
        self.sheets.push(SheetFixture {
            name: name.to_owned(),
            rows,
            write_part: true,
            with_references: false,
            link: Link::Worksheet,
        });
        self
    }

    /// Declares a worksheet in the workbook but leaves its part out of the package.
    pub fn sheet_without_part(mut self, name: &str) -> Self {
        self.sheets.push(SheetFixture {
            name: name.to_owned(),
            rows: Vec::new(),
            write_part: false,
            with_references: true,
            link: Link::Worksheet,
        });
        self
    }

    /// Declares a chartsheet, which has a drawing instead of cells.
    pub fn chartsheet(mut self, name: &str) -> Self {
        self.sheets.push(SheetFixture {
            name: name.to_owned(),
            rows: Vec::new(),
            write_part: true,
            with_references: true,
            link: Link::Chartsheet,
        });
        self
    }

    /// Declares a sheet whose relationship id is not in the workbook relationships.
    pub fn sheet_with_dangling_link(mut self, name: &str) -> Self {
        self.sheets.push(SheetFixture {
            name: name.to_owned(),
            rows: Vec::new(),
            write_part: false,
            with_references: true,
            link: Link::Dangling,
        });
        self
    }

    /// Appends a raw `<si>` body to the shared string table, for `Cell::SharedIndex`.
    pub fn shared_string_xml(mut self, xml: &str) -> Self {
        self.shared_strings.push(xml.to_owned());
        self
    }

    pub fn date1904(mut self) -> Self {
        self.date1904 = true;
        self
    }

    pub fn write(&self, path: &Path) {
        let mut shared_strings = self.shared_strings.clone();
        let mut zip = ZipWriter::new(File::create(path).unwrap());
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let part = |zip: &mut ZipWriter<File>, name: &str, content: &str| {
            zip.start_file(name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        };

        part(&mut zip, "[Content_Types].xml", CONTENT_TYPES);
        part(&mut zip, "_rels/.rels", ROOT_RELS);
        part(&mut zip, "xl/workbook.xml", &self.workbook_xml());
        part(&mut zip, "xl/_rels/workbook.xml.rels", &self.relationships_xml());
        part(&mut zip, "xl/styles.xml", STYLES);
        for (index, sheet) in self.sheets.iter().enumerate() {
            match (sheet.write_part, sheet.link) {
                (true, Link::Worksheet) => {
                    let xml = worksheet_xml(sheet, &mut shared_strings);
                    part(&mut zip, &format!("xl/worksheets/sheet{}.xml", index + 1), &xml);
                }
                (true, Link::Chartsheet) => {
                    part(&mut zip, &format!("xl/chartsheets/sheet{}.xml", index + 1), CHARTSHEET);
                }
                _ => {}
            }
        }
        part(&mut zip, "xl/sharedStrings.xml", &shared_strings_xml(&shared_strings));
        zip.finish().unwrap();
    }

    fn workbook_xml(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
        );
        if self.date1904 {
            xml.push_str(r#"<workbookPr date1904="1"/>"#);
        } else {
            xml.push_str("<workbookPr/>");
        }
        xml.push_str("<sheets>");
        for (index, sheet) in self.sheets.iter().enumerate() {
            xml.push_str(&format!(
                r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                escape(&sheet.name),
                index + 1,
                index + 1
            ));
        }
        xml.push_str("</sheets></workbook>");
        xml
    }

    fn relationships_xml(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for (position, sheet) in self.sheets.iter().enumerate() {
            let index = position + 1;
            let folder = match sheet.link {
                Link::Worksheet => "worksheet",
                Link::Chartsheet => "chartsheet",
                Link::Dangling => continue,
            };
            xml.push_str(&format!(
                r#"<Relationship Id="rId{index}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/{folder}" Target="{folder}s/sheet{index}.xml"/>"#
            ));
        }
        let next = self.sheets.len() + 1;
        xml.push_str(&format!(
            r#"<Relationship Id="rId{next}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#
        ));
        xml.push_str("</Relationships>");
        xml
    }
}

fn worksheet_xml(sheet: &SheetFixture, shared_strings: &mut Vec<String>) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );
    for (row, cells) in sheet.rows.iter().enumerate() {
        if sheet.with_references {
            xml.push_str(&format!(r#"<row r="{}">"#, row + 1));
        } else {
            xml.push_str("<row>");
        }
        for (col, cell) in cells.iter().enumerate() {
            let reference = if sheet.with_references {
                format!(r#" r="{}{}""#, column_letters(col), row + 1)
            } else {
                String::new()
            };
            let body = match cell {
                Cell::Empty => continue,
                Cell::Number(value) => format!("<v>{value}</v>"),
                Cell::Text(value) => {
                    shared_strings.push(format!("<t>{}</t>", escape(value)));
                    format!(r#" t="s"><v>{}</v>"#, shared_strings.len() - 1)
                }
                Cell::Inline(value) => format!(r#" t="inlineStr"><is><t>{}</t></is>"#, escape(value)),
                Cell::Bool(value) => format!(r#" t="b"><v>{}</v>"#, u8::from(*value)),
                Cell::Error(value) => format!(r#" t="e"><v>{}</v>"#, escape(value)),
                Cell::Styled(value, style) => format!(r#" s="{style}"><v>{value}</v>"#),
                Cell::Iso(value) => format!(r#" t="d"><v>{value}</v>"#),
                Cell::SharedIndex(index) => format!(r#" t="s"><v>{index}</v>"#),
            };
            // Attribute-carrying bodies start with a space; plain numbers close the tag first
            if body.starts_with(' ') {
                xml.push_str(&format!("<c{reference}{body}</c>"));
            } else {
                xml.push_str(&format!("<c{reference}>{body}</c>"));
            }
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

fn shared_strings_xml(items: &[String]) -> String {
    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{0}" uniqueCount="{0}">"#,
        items.len()
    );
    for item in items {
        xml.push_str(&format!("<si>{item}</si>"));
    }
    xml.push_str("</sst>");
    xml
}

fn column_letters(col: usize) -> String {
    let mut column = col + 1;
    let mut letters = Vec::new();
    while column > 0 {
        column -= 1;
        letters.push(char::from(b'A' + (column % 26) as u8));
        column /= 26;
    }
    letters.iter().rev().collect()
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// A trace worksheet: header `Time, CA, P`, an optional units row, then
/// `rows` data rows with CA = 10 * row index.
pub fn trace_rows(rows: usize, units: Option<&str>) -> Vec<Vec<Cell>> {
    let mut sheet = vec![vec![text("Time"), text("CA"), text("P")]];
    if let Some(unit) = units {
        sheet.push(vec![text("s"), text(unit), text("bar")]);
    }
    for row in 0..rows {
        sheet.push(vec![num(row as f64 * 0.5 + 0.25), num(row * 10), num(1.5)]);
    }
    sheet
}

/// Writes garbage that is not a zip archive.
pub fn write_corrupt(path: &Path) {
    std::fs::write(path, b"this is not a workbook").unwrap();
}

/// Writes a file starting with the compound file signature, like an encrypted workbook.
pub fn write_compound(path: &Path) {
    let mut bytes = vec![0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
    bytes.resize(512, 0);
    std::fs::write(path, bytes).unwrap();
}
