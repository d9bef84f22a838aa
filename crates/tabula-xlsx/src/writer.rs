//! XLSX writer

use std::borrow::Cow;
use std::collections::HashSet;
use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;

use quick_xml::escape::escape;

use crate::address::cell_reference;
use crate::error::{XlsxError, XlsxResult};
use tabula_core::{CellValue, Sheet, Workbook};

/// Longest sheet name Excel accepts, in characters
pub const MAX_SHEET_NAME_LEN: usize = 31;

const INVALID_SHEET_NAME_CHARS: &[char] = &[':', '\\', '/', '?', '*', '[', ']'];

/// Style index of the bold header cells in `xl/styles.xml`
const HEADER_STYLE: u32 = 1;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
    <fonts count="2">
        <font><sz val="11"/><name val="Calibri"/></font>
        <font><b/><sz val="11"/><name val="Calibri"/></font>
    </fonts>
    <fills count="2">
        <fill><patternFill patternType="none"/></fill>
        <fill><patternFill patternType="gray125"/></fill>
    </fills>
    <borders count="1">
        <border><left/><right/><top/><bottom/><diagonal/></border>
    </borders>
    <cellStyleXfs count="1">
        <xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
    </cellStyleXfs>
    <cellXfs count="2">
        <xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
        <xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/>
    </cellXfs>
    <cellStyles count="1">
        <cellStyle name="Normal" xfId="0" builtinId="0"/>
    </cellStyles>
</styleSheet>"#;

/// XLSX file writer.
///
/// Each sheet becomes one worksheet, in workbook order. The first row holds
/// the column names in bold; data rows follow with one column per table
/// column. Empty cells are omitted.
pub struct XlsxWriter;

impl XlsxWriter {
    /// Write a workbook to a file path
    pub fn write_file<P: AsRef<Path>>(workbook: &Workbook, path: P) -> XlsxResult<()> {
        Self::validate(workbook)?;
        let file = File::create(path)?;
        Self::write(workbook, file)
    }

    /// Write a workbook to a writer
    pub fn write<W: Write + Seek>(workbook: &Workbook, writer: W) -> XlsxResult<()> {
        Self::validate(workbook)?;

        let mut zip = zip::ZipWriter::new(writer);

        // Write [Content_Types].xml
        Self::write_content_types(&mut zip, workbook)?;

        // Write _rels/.rels
        Self::write_root_rels(&mut zip)?;

        // Write xl/workbook.xml
        Self::write_workbook_xml(&mut zip, workbook)?;

        // Write xl/_rels/workbook.xml.rels
        Self::write_workbook_rels(&mut zip, workbook)?;

        // Write xl/styles.xml
        Self::write_styles_xml(&mut zip)?;

        for (i, sheet) in workbook.sheets().enumerate() {
            Self::write_worksheet(&mut zip, i, sheet)?;
        }

        zip.finish()?;
        log::debug!(
            "wrote workbook '{}' ({} sheets)",
            workbook.name(),
            workbook.sheet_count()
        );
        Ok(())
    }

    /// Check that the workbook can be saved: at least one sheet, and every
    /// sheet name acceptable to Excel and unique ignoring case.
    pub fn validate(workbook: &Workbook) -> XlsxResult<()> {
        if workbook.is_empty() {
            return Err(XlsxError::InvalidFormat(
                "a workbook needs at least one sheet".into(),
            ));
        }

        let mut seen = HashSet::new();
        for sheet in workbook.sheets() {
            let name = sheet.name();
            validate_sheet_name(name)?;
            if !seen.insert(name.to_lowercase()) {
                return Err(invalid_sheet_name(
                    name,
                    "another sheet has the same name ignoring case",
                ));
            }
        }
        Ok(())
    }

    fn write_content_types<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        workbook: &Workbook,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("[Content_Types].xml", options)?;

        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
    <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
        );

        for i in 0..workbook.sheet_count() {
            content.push_str(&format!(
                r#"
    <Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
                i + 1
            ));
        }

        content.push_str("\n</Types>");

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_root_rels<W: Write + Seek>(zip: &mut zip::ZipWriter<W>) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("_rels/.rels", options)?;

        let content = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_workbook_xml<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        workbook: &Workbook,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("xl/workbook.xml", options)?;

        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
    <sheets>"#,
        );

        for (i, sheet) in workbook.sheets().enumerate() {
            content.push_str(&format!(
                r#"
        <sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                escape(sheet.name()),
                i + 1,
                i + 1
            ));
        }

        content.push_str(
            r#"
    </sheets>
</workbook>"#,
        );

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_workbook_rels<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        workbook: &Workbook,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("xl/_rels/workbook.xml.rels", options)?;

        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );

        for i in 0..workbook.sheet_count() {
            content.push_str(&format!(
                r#"
    <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
                i + 1,
                i + 1
            ));
        }

        // Styles relationship
        content.push_str(&format!(
            r#"
    <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
            workbook.sheet_count() + 1
        ));

        content.push_str("\n</Relationships>");

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_styles_xml<W: Write + Seek>(zip: &mut zip::ZipWriter<W>) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("xl/styles.xml", options)?;
        zip.write_all(STYLES_XML.as_bytes())?;
        Ok(())
    }

    fn write_worksheet<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        index: usize,
        sheet: &Sheet,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file(format!("xl/worksheets/sheet{}.xml", index + 1), options)?;

        let table = sheet.table();
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
    <sheetData>"#,
        );

        if table.column_count() > 0 {
            content.push_str("\n        <row r=\"1\">");
            for (col, name) in table.columns().iter().enumerate() {
                let cell_ref = cell_reference(0, col as u32);
                content.push_str(&format!(
                    "\n            <c r=\"{}\" s=\"{}\" t=\"inlineStr\">{}</c>",
                    cell_ref,
                    HEADER_STYLE,
                    inline_string(name)
                ));
            }
            content.push_str("\n        </row>");
        }

        for (row, values) in table.rows().enumerate() {
            let row = row as u32 + 1;
            let cells: Vec<String> = values
                .iter()
                .enumerate()
                .filter_map(|(col, value)| cell_xml(&cell_reference(row, col as u32), value))
                .collect();

            if cells.is_empty() {
                continue;
            }

            content.push_str(&format!("\n        <row r=\"{}\">", row + 1));
            for cell in cells {
                content.push_str("\n            ");
                content.push_str(&cell);
            }
            content.push_str("\n        </row>");
        }

        content.push_str(
            r#"
    </sheetData>
</worksheet>"#,
        );

        zip.write_all(content.as_bytes())?;
        Ok(())
    }
}

fn validate_sheet_name(name: &str) -> XlsxResult<()> {
    if name.is_empty() {
        return Err(invalid_sheet_name(name, "sheet name cannot be empty"));
    }
    if name.chars().count() > MAX_SHEET_NAME_LEN {
        return Err(invalid_sheet_name(
            name,
            format!("sheet name too long (max {} characters)", MAX_SHEET_NAME_LEN),
        ));
    }
    if let Some(c) = name.chars().find(|c| INVALID_SHEET_NAME_CHARS.contains(c)) {
        return Err(invalid_sheet_name(
            name,
            format!("sheet name cannot contain '{}'", c),
        ));
    }
    Ok(())
}

fn invalid_sheet_name<S: Into<String>>(name: &str, reason: S) -> XlsxError {
    XlsxError::InvalidSheetName {
        name: name.to_string(),
        reason: reason.into(),
    }
}

/// `<c>` element for one value, or `None` for cells left out of the file
fn cell_xml(cell_ref: &str, value: &CellValue) -> Option<String> {
    match value {
        CellValue::Empty => None,
        CellValue::Integer(n) => Some(format!("<c r=\"{}\"><v>{}</v></c>", cell_ref, n)),
        // Debug keeps the fraction ("2.0") so the value reads back as a number
        CellValue::Number(n) if n.is_finite() => {
            Some(format!("<c r=\"{}\"><v>{:?}</v></c>", cell_ref, n))
        }
        CellValue::Number(_) => None,
        CellValue::Boolean(b) => Some(format!(
            "<c r=\"{}\" t=\"b\"><v>{}</v></c>",
            cell_ref,
            if *b { 1 } else { 0 }
        )),
        CellValue::String(s) if s.is_empty() => None,
        CellValue::String(s) => Some(format!(
            "<c r=\"{}\" t=\"inlineStr\">{}</c>",
            cell_ref,
            inline_string(s)
        )),
        CellValue::List(items) if items.is_empty() => None,
        CellValue::List(_) => Some(format!(
            "<c r=\"{}\" t=\"inlineStr\">{}</c>",
            cell_ref,
            inline_string(&value.to_string())
        )),
    }
}

/// `<is>` body of an inline string cell
fn inline_string(text: &str) -> String {
    let encoded = encode_control_chars(text);
    let preserve = text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace);
    format!(
        "<is><t{}>{}</t></is>",
        if preserve { " xml:space=\"preserve\"" } else { "" },
        escape(encoded.as_ref())
    )
}

/// Control characters other than tab and line breaks are not allowed in
/// XML 1.0; Excel stores them as `_xHHHH_`.
fn encode_control_chars(text: &str) -> Cow<'_, str> {
    if !text.chars().any(is_disallowed) {
        return Cow::Borrowed(text);
    }

    let mut result = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        if is_disallowed(c) {
            result.push_str(&format!("_x{:04X}_", c as u32));
        } else {
            result.push(c);
        }
    }
    Cow::Owned(result)
}

fn is_disallowed(c: char) -> bool {
    (c as u32) < 0x20 && !matches!(c, '\t' | '\n' | '\r')
}
