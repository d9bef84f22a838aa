//! XLSX reader

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::address::parse_cell_reference;
use crate::error::{XlsxError, XlsxResult};
use tabula_core::{CellValue, Sheet, Table};

/// Decode Excel's `_xHHHH_` escape sequences in strings.
///
/// Excel uses this format to encode special characters in XML:
/// - `_x000d_` = CR (carriage return)
/// - `_x000a_` = LF (line feed)
/// - `_x0009_` = Tab
/// - `_x005f_` = Underscore (escaped underscore)
fn decode_excel_escapes(s: &str) -> String {
    if !s.contains("_x") {
        return s.to_string();
    }

    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(start) = rest.find("_x") {
        result.push_str(&rest[..start]);
        let candidate = &rest[start..];

        let decoded = candidate
            .get(2..6)
            .filter(|hex| hex.chars().all(|c| c.is_ascii_hexdigit()))
            .filter(|_| candidate.get(6..7) == Some("_"))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .and_then(char::from_u32);

        match decoded {
            Some(c) => {
                result.push(c);
                rest = &candidate[7..];
            }
            None => {
                result.push_str("_x");
                rest = &candidate[2..];
            }
        }
    }

    result.push_str(rest);
    result
}

/// A worksheet listed in `xl/workbook.xml`
#[derive(Debug, Clone)]
struct SheetEntry {
    name: String,
    path: String,
}

/// A `<c>` element being read
#[derive(Debug)]
struct PendingCell {
    row: u32,
    col: u32,
    kind: Option<String>,
    text: String,
    has_value: bool,
}

impl PendingCell {
    fn start(e: &BytesStart, row: u32, next_col: &mut u32) -> XlsxResult<Self> {
        let mut reference = None;
        let mut kind = None;

        for attr in e.attributes().flatten() {
            match attr.key.as_ref() {
                b"r" => reference = attr.unescape_value().ok().map(|s| s.to_string()),
                b"t" => kind = attr.unescape_value().ok().map(|s| s.to_string()),
                _ => {}
            }
        }

        let (row, col) = match reference {
            Some(r) => parse_cell_reference(&r)
                .ok_or_else(|| XlsxError::Parse(format!("Invalid cell reference '{}'", r)))?,
            None => (row, *next_col),
        };
        *next_col = col + 1;

        Ok(Self {
            row,
            col,
            kind,
            text: String::new(),
            has_value: false,
        })
    }

    fn into_value(self, shared_strings: &[String]) -> XlsxResult<Option<CellValue>> {
        if !self.has_value {
            return Ok(None);
        }
        let text = self.text;

        let value = match self.kind.as_deref() {
            // Shared string
            Some("s") => {
                let idx: usize = text.trim().parse().map_err(|_| {
                    XlsxError::Parse(format!("Invalid shared string index: {}", text))
                })?;
                let s = shared_strings.get(idx).ok_or_else(|| {
                    XlsxError::Parse(format!("Shared string index {} out of bounds", idx))
                })?;
                CellValue::string(s.as_str())
            }

            // Boolean
            Some("b") => CellValue::Boolean(text == "1" || text.eq_ignore_ascii_case("true")),

            // Inline or formula string - decode Excel escape sequences
            Some("inlineStr") | Some("str") => CellValue::String(decode_excel_escapes(&text)),

            // Number (default type or explicit "n")
            None | Some("n") => number_value(&text),

            // Errors, ISO dates and unknown types stay as text
            Some(_) => CellValue::String(text),
        };

        Ok(match value {
            CellValue::String(s) if s.is_empty() => None,
            other => Some(other),
        })
    }
}

/// Numbers without a fraction or exponent are integers
fn number_value(text: &str) -> CellValue {
    let text = text.trim();
    if !text.contains(['.', 'e', 'E']) {
        if let Ok(n) = text.parse::<i64>() {
            return CellValue::Integer(n);
        }
    }
    match text.parse::<f64>() {
        Ok(n) => CellValue::Number(n),
        Err(_) => CellValue::string(text),
    }
}

/// XLSX file reader.
///
/// Opening reads the sheet list and the shared string table; worksheets are
/// parsed on demand, so unselected sheets cost nothing.
pub struct XlsxReader<R> {
    archive: zip::ZipArchive<R>,
    shared_strings: Vec<String>,
    sheets: Vec<SheetEntry>,
}

impl XlsxReader<BufReader<File>> {
    /// Open a workbook file
    pub fn open<P: AsRef<Path>>(path: P) -> XlsxResult<Self> {
        let file = File::open(path)?;
        Self::new(BufReader::new(file))
    }
}

impl<R: Read + Seek> XlsxReader<R> {
    /// Open a workbook from a reader
    pub fn new(reader: R) -> XlsxResult<Self> {
        let mut archive = zip::ZipArchive::new(reader)?;

        // Verify this is an XLSX file
        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        let shared_strings = Self::read_shared_strings(&mut archive)?;
        let sheet_info = Self::read_workbook_xml(&mut archive)?;
        let sheet_paths = Self::read_workbook_rels(&mut archive)?;

        let mut sheets = Vec::with_capacity(sheet_info.len());
        for (name, r_id) in sheet_info {
            match sheet_paths.get(&r_id) {
                Some(path) => sheets.push(SheetEntry {
                    name,
                    path: path.clone(),
                }),
                None => log::warn!("sheet '{}' has no worksheet part ({}), skipped", name, r_id),
            }
        }

        Ok(Self {
            archive,
            shared_strings,
            sheets,
        })
    }

    /// Number of worksheets
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Worksheet names in file order
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// Read one worksheet by 0-based position
    pub fn read_sheet(&mut self, index: usize) -> XlsxResult<Sheet> {
        let entry = self
            .sheets
            .get(index)
            .ok_or(XlsxError::SheetOutOfBounds(index, self.sheets.len()))?;

        let table = Self::read_worksheet(&mut self.archive, &entry.path, &self.shared_strings)?;
        log::debug!(
            "read sheet '{}' ({} rows x {} columns)",
            entry.name,
            table.row_count(),
            table.column_count()
        );
        Ok(Sheet::new(entry.name.clone(), table))
    }

    /// Read every worksheet in file order
    pub fn read_all(&mut self) -> XlsxResult<Vec<Sheet>> {
        (0..self.sheets.len()).map(|i| self.read_sheet(i)).collect()
    }

    /// Read the shared strings table
    fn read_shared_strings(archive: &mut zip::ZipArchive<R>) -> XlsxResult<Vec<String>> {
        let mut strings = Vec::new();

        let file = match archive.by_name("xl/sharedStrings.xml") {
            Ok(f) => f,
            Err(_) => return Ok(strings), // No shared strings is valid
        };

        let mut xml_reader = Reader::from_reader(BufReader::new(file));

        let mut buf = Vec::new();
        let mut current_string = String::new();
        let mut in_si = false;
        let mut in_t = false;
        let mut in_phonetic = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current_string.clear();
                    }
                    b"rPh" => in_phonetic = true,
                    b"t" if in_si && !in_phonetic => in_t = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) if e.name().as_ref() == b"si" => strings.push(String::new()),
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"si" => {
                        strings.push(decode_excel_escapes(&current_string));
                        current_string.clear();
                        in_si = false;
                    }
                    b"rPh" => in_phonetic = false,
                    b"t" => in_t = false,
                    _ => {}
                },
                Ok(Event::Text(e)) if in_t => {
                    current_string.push_str(&e.unescape()?);
                }
                Ok(Event::CData(e)) if in_t => {
                    current_string.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    /// Read workbook.xml to get sheet names and rIds
    fn read_workbook_xml(archive: &mut zip::ZipArchive<R>) -> XlsxResult<Vec<(String, String)>> {
        let file = archive
            .by_name("xl/workbook.xml")
            .map_err(|_| XlsxError::MissingPart("xl/workbook.xml".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut sheets = Vec::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == b"sheet" => {
                    let mut name = None;
                    let mut r_id = None;

                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"name" {
                            name = attr.unescape_value().ok().map(|s| s.to_string());
                        } else if attr.key.local_name().as_ref() == b"id" {
                            r_id = attr.unescape_value().ok().map(|s| s.to_string());
                        }
                    }

                    if let (Some(name), Some(r_id)) = (name, r_id) {
                        sheets.push((name, r_id));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(sheets)
    }

    /// Read workbook.xml.rels to get sheet file paths
    fn read_workbook_rels(archive: &mut zip::ZipArchive<R>) -> XlsxResult<HashMap<String, String>> {
        let file = archive
            .by_name("xl/_rels/workbook.xml.rels")
            .map_err(|_| XlsxError::MissingPart("xl/_rels/workbook.xml.rels".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut rels = HashMap::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let mut id = None;
                    let mut target = None;
                    let mut rel_type = None;

                    for attr in e.attributes().flatten() {
                        let value = attr.unescape_value().ok().map(|s| s.to_string());
                        match attr.key.as_ref() {
                            b"Id" => id = value,
                            b"Target" => target = value,
                            b"Type" => rel_type = value,
                            _ => {}
                        }
                    }

                    // Only include worksheet relationships
                    if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                        if rel_type.ends_with("/worksheet") {
                            // Target is relative to xl/ folder
                            let full_path = match target.strip_prefix('/') {
                                Some(absolute) => absolute.to_string(),
                                None => format!("xl/{}", target),
                            };
                            rels.insert(id, full_path);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Read a worksheet part into a table
    fn read_worksheet(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
        shared_strings: &[String],
    ) -> XlsxResult<Table> {
        let file = archive
            .by_name(path)
            .map_err(|_| XlsxError::MissingPart(path.to_string()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));

        let mut buf = Vec::new();
        let mut cells: BTreeMap<u32, Vec<(u32, CellValue)>> = BTreeMap::new();

        let mut last_row: Option<u32> = None;
        let mut next_col: u32 = 0;
        let mut cell: Option<PendingCell> = None;
        let mut in_value = false;
        let mut in_inline_str = false;
        let mut in_inline_text = false;
        let mut in_phonetic = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"row" => {
                        last_row = Some(Self::row_number(&e, last_row));
                        next_col = 0;
                    }
                    b"c" => {
                        let row = last_row.unwrap_or(0);
                        cell = Some(PendingCell::start(&e, row, &mut next_col)?);
                    }
                    b"v" => in_value = true,
                    b"is" => in_inline_str = true,
                    b"rPh" => in_phonetic = true,
                    b"t" if in_inline_str && !in_phonetic => in_inline_text = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) => match e.name().as_ref() {
                    b"row" => {
                        last_row = Some(Self::row_number(&e, last_row));
                        next_col = 0;
                    }
                    b"c" => {
                        // value-less cell, only advances the column
                        let row = last_row.unwrap_or(0);
                        PendingCell::start(&e, row, &mut next_col)?;
                    }
                    _ => {}
                },
                Ok(Event::Text(e)) if in_value || in_inline_text => {
                    if let Some(pending) = cell.as_mut() {
                        pending.text.push_str(&e.unescape()?);
                        pending.has_value = true;
                    }
                }
                Ok(Event::CData(e)) if in_value || in_inline_text => {
                    if let Some(pending) = cell.as_mut() {
                        pending.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                        pending.has_value = true;
                    }
                }
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"v" => {
                        if let Some(pending) = cell.as_mut() {
                            pending.has_value = true;
                        }
                        in_value = false;
                    }
                    b"is" => {
                        if let Some(pending) = cell.as_mut() {
                            pending.has_value = true;
                        }
                        in_inline_str = false;
                    }
                    b"t" => in_inline_text = false,
                    b"rPh" => in_phonetic = false,
                    b"c" => {
                        if let Some(pending) = cell.take() {
                            let (row, col) = (pending.row, pending.col);
                            if let Some(value) = pending.into_value(shared_strings)? {
                                cells.entry(row).or_default().push((col, value));
                            }
                        }
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Self::build_table(cells)
    }

    /// 0-based row number from `r`, or the row after the previous one
    fn row_number(e: &BytesStart, last_row: Option<u32>) -> u32 {
        e.attributes()
            .flatten()
            .find(|attr| attr.key.as_ref() == b"r")
            .and_then(|attr| attr.unescape_value().ok()?.parse::<u32>().ok())
            .and_then(|r| r.checked_sub(1))
            .unwrap_or_else(|| last_row.map_or(0, |r| r + 1))
    }

    /// First non-empty row is the header; later rows (blank ones included)
    /// are data.
    fn build_table(cells: BTreeMap<u32, Vec<(u32, CellValue)>>) -> XlsxResult<Table> {
        let width = cells
            .values()
            .flat_map(|row| row.iter().map(|(col, _)| *col as usize + 1))
            .max()
            .unwrap_or(0);

        let mut rows = cells.into_iter();
        let Some((header_row, header_cells)) = rows.next() else {
            return Ok(Table::default());
        };

        let mut columns = vec![String::new(); width];
        for (col, value) in header_cells {
            columns[col as usize] = value.to_string();
        }

        let mut data = Vec::new();
        let mut previous = header_row;
        for (row, row_cells) in rows {
            for _ in previous + 1..row {
                data.push(vec![CellValue::Empty; width]);
            }
            let mut values = vec![CellValue::Empty; width];
            for (col, value) in row_cells {
                values[col as usize] = value;
            }
            data.push(values);
            previous = row;
        }

        Ok(Table::from_rows(columns, data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::{Cursor, Write};

    #[test]
    fn test_decode_excel_escapes() {
        assert_eq!(decode_excel_escapes("hello_x000d_world"), "hello\rworld");
        assert_eq!(decode_excel_escapes("line1_x000d__x000a_line2"), "line1\r\nline2");
        assert_eq!(decode_excel_escapes("under_x005f_score"), "under_score");
        assert_eq!(decode_excel_escapes("_x000D_"), "\r");
        assert_eq!(decode_excel_escapes("plain text"), "plain text");
    }

    #[test]
    fn test_decode_excel_escapes_partial_sequence() {
        // Incomplete sequences should be left as-is
        assert_eq!(decode_excel_escapes("_x00"), "_x00");
        assert_eq!(decode_excel_escapes("_x000d"), "_x000d");
        assert_eq!(decode_excel_escapes("_x_x0041_"), "_xA");
    }

    #[test]
    fn test_number_values() {
        assert_eq!(number_value("42"), CellValue::Integer(42));
        assert_eq!(number_value("2.0"), CellValue::Number(2.0));
        assert_eq!(number_value("1E3"), CellValue::Number(1000.0));
    }

    /// Minimal package written by hand: shared strings with rich text and
    /// phonetic runs, a sparse row layout and cells without references.
    fn handmade_xlsx() -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            let options = zip::write::SimpleFileOptions::default();

            zip.start_file("[Content_Types].xml", options).unwrap();
            zip.write_all(br#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#).unwrap();

            zip.start_file("xl/workbook.xml", options).unwrap();
            zip.write_all(br#"<?xml version="1.0"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Prices" sheetId="1" r:id="rId1"/><sheet name="Ghost" sheetId="2" r:id="rId9"/><sheet name="Empty" sheetId="3" r:id="rId2"/></sheets></workbook>"#).unwrap();

            zip.start_file("xl/_rels/workbook.xml.rels", options).unwrap();
            zip.write_all(br#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="/xl/worksheets/sheet2.xml"/></Relationships>"#).unwrap();

            zip.start_file("xl/sharedStrings.xml", options).unwrap();
            zip.write_all(br#"<?xml version="1.0"?><sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><si><t>item</t></si><si><r><t>pri</t></r><r><t>ce</t></r><rPh><t>x</t></rPh></si><si><t xml:space="preserve"> caf&amp;e </t></si></sst>"#).unwrap();

            zip.start_file("xl/worksheets/sheet1.xml", options).unwrap();
            zip.write_all(br#"<?xml version="1.0"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>
<row r="2"><c r="A2" t="s"><v>0</v></c><c r="B2" t="s"><v>1</v></c><c r="C2" s="1"/></row>
<row r="3"><c r="A3" t="s"><v>2</v></c><c r="B3"><v>1.5</v></c></row>
<row r="5"><c t="inlineStr"><is><t>tea</t></is></c><c><v>3</v></c><c t="b"><v>1</v></c><c><f>B5*2</f><v>6</v></c></row>
</sheetData></worksheet>"#).unwrap();

            zip.start_file("xl/worksheets/sheet2.xml", options).unwrap();
            zip.write_all(br#"<?xml version="1.0"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData/></worksheet>"#).unwrap();

            zip.finish().unwrap();
        }
        buf
    }

    #[test]
    fn test_read_handmade_workbook() {
        let mut reader = XlsxReader::new(Cursor::new(handmade_xlsx())).unwrap();

        // the sheet without a worksheet part is dropped
        assert_eq!(reader.sheet_names(), vec!["Prices", "Empty"]);

        let sheet = reader.read_sheet(0).unwrap();
        let table = sheet.table();
        assert_eq!(sheet.name(), "Prices");
        assert_eq!(table.columns(), &["item", "price", "Unnamed: 2", "Unnamed: 3"]);
        assert_eq!(table.row_count(), 3);
        assert_eq!(
            table.row(0).unwrap(),
            &[
                CellValue::string(" caf&e "),
                CellValue::Number(1.5),
                CellValue::Empty,
                CellValue::Empty
            ]
        );
        // blank row 4 is kept
        assert!(table.row(1).unwrap().iter().all(CellValue::is_empty));
        assert_eq!(
            table.row(2).unwrap(),
            &[
                CellValue::string("tea"),
                CellValue::Integer(3),
                CellValue::Boolean(true),
                CellValue::Integer(6)
            ]
        );

        let empty = reader.read_sheet(1).unwrap();
        assert_eq!(empty.name(), "Empty");
        assert_eq!(empty.table().column_count(), 0);

        assert!(matches!(
            reader.read_sheet(2),
            Err(XlsxError::SheetOutOfBounds(2, 2))
        ));
    }

    #[test]
    fn test_not_an_xlsx() {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            zip.start_file("hello.txt", zip::write::SimpleFileOptions::default())
                .unwrap();
            zip.write_all(b"hi").unwrap();
            zip.finish().unwrap();
        }
        assert!(matches!(
            XlsxReader::new(Cursor::new(buf)),
            Err(XlsxError::InvalidFormat(_))
        ));
    }
}
