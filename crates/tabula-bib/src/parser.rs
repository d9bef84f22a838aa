//! BibTeX parser
//!
//! Accepts `@type{key, field = value, ...}` and `@type(...)` records. Values
//! are braced (`{...}`, nested braces kept verbatim), quoted (`"..."`), bare
//! numbers or `@string` macro names, joined with `#`. `@comment` and
//! `@preamble` blocks are skipped, as is any text outside a record.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::entry::BibEntry;
use crate::error::{BibError, BibResult};

/// Macros every BibTeX style defines
const MONTH_MACROS: [(&str, &str); 12] = [
    ("jan", "January"),
    ("feb", "February"),
    ("mar", "March"),
    ("apr", "April"),
    ("may", "May"),
    ("jun", "June"),
    ("jul", "July"),
    ("aug", "August"),
    ("sep", "September"),
    ("oct", "October"),
    ("nov", "November"),
    ("dec", "December"),
];

/// Parse a UTF-8 BibTeX file
pub fn parse_file<P: AsRef<Path>>(path: P) -> BibResult<Vec<BibEntry>> {
    let text = fs::read_to_string(path)?;
    parse_str(&text)
}

/// Parse BibTeX text into entries, in file order
pub fn parse_str(input: &str) -> BibResult<Vec<BibEntry>> {
    Parser::new(input).parse()
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    /// 1-based line of `pos`
    line: usize,
    macros: HashMap<String, String>,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
            line: 1,
            macros: MONTH_MACROS
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        }
    }

    fn parse(mut self) -> BibResult<Vec<BibEntry>> {
        let mut entries = Vec::new();

        while self.skip_to_record() {
            self.bump();
            self.skip_whitespace();
            let entry_type = self.identifier().to_lowercase();
            self.skip_whitespace();

            // a lone '@' in free text
            let close = match self.peek() {
                Some('{') if !entry_type.is_empty() => '}',
                Some('(') if !entry_type.is_empty() => ')',
                _ => continue,
            };
            let start_line = self.line();
            self.bump();

            match entry_type.as_str() {
                "comment" | "preamble" => self.skip_block(close, start_line, &entry_type)?,
                "string" => self.parse_macro(close)?,
                _ => entries.push(self.parse_entry(&entry_type, close, start_line)?),
            }
        }

        Ok(entries)
    }

    fn parse_entry(
        &mut self,
        entry_type: &str,
        close: char,
        start_line: usize,
    ) -> BibResult<BibEntry> {
        self.skip_whitespace();
        let key = self.take_while(|c| c != ',' && c != close && !c.is_whitespace());
        if key.is_empty() {
            return Err(self.error(format!("@{} entry without a citation key", entry_type)));
        }
        let mut entry = BibEntry::new(key, entry_type);

        loop {
            self.skip_whitespace();
            match self.bump() {
                Some(c) if c == close => break,
                Some(',') => {}
                Some(c) => {
                    return Err(self.error(format!(
                        "expected ',' or '{}' in entry '{}', found '{}'",
                        close,
                        entry.key(),
                        c
                    )))
                }
                None => {
                    return Err(BibError::Syntax {
                        line: start_line,
                        message: format!("entry '{}' is never closed", entry.key()),
                    })
                }
            }

            self.skip_whitespace();
            // trailing comma
            if self.peek() == Some(close) {
                self.bump();
                break;
            }

            let name = self.identifier();
            if name.is_empty() {
                return Err(self.error(format!(
                    "expected a field name in entry '{}'",
                    entry.key()
                )));
            }
            self.skip_whitespace();
            self.expect('=')?;
            let value = self.value()?;
            entry.set(name, value);
        }

        Ok(entry)
    }

    /// `@string{name = value}`
    fn parse_macro(&mut self, close: char) -> BibResult<()> {
        self.skip_whitespace();
        let name = self.identifier();
        if name.is_empty() {
            return Err(self.error("expected a macro name after @string"));
        }
        self.skip_whitespace();
        self.expect('=')?;
        let value = self.value()?;
        self.skip_whitespace();
        self.expect(close)?;

        self.macros.insert(name.to_lowercase(), value);
        Ok(())
    }

    /// One value: parts joined with `#`, whitespace runs collapsed
    fn value(&mut self) -> BibResult<String> {
        let mut text = String::new();

        loop {
            self.skip_whitespace();
            let line = self.line();
            match self.peek() {
                Some('{') => {
                    self.bump();
                    text.push_str(&self.delimited('}', line)?);
                }
                Some('"') => {
                    self.bump();
                    text.push_str(&self.delimited('"', line)?);
                }
                Some(c) if c.is_ascii_digit() => {
                    text.push_str(&self.take_while(|c| c.is_ascii_digit()));
                }
                Some(c) if is_identifier_char(c) => {
                    let name = self.identifier();
                    match self.macros.get(&name.to_lowercase()) {
                        Some(value) => text.push_str(value),
                        None => {
                            log::debug!(
                                "undefined macro '{}' on line {}, kept as text",
                                name,
                                line
                            );
                            text.push_str(&name);
                        }
                    }
                }
                Some(c) => return Err(self.error(format!("expected a value, found '{}'", c))),
                None => {
                    return Err(BibError::Syntax {
                        line,
                        message: "missing value at end of input".into(),
                    })
                }
            }

            self.skip_whitespace();
            if self.peek() == Some('#') {
                self.bump();
            } else {
                break;
            }
        }

        Ok(text.split_whitespace().collect::<Vec<_>>().join(" "))
    }

    /// Text up to `end` at brace depth zero; the opening delimiter is
    /// already consumed and inner braces are kept.
    fn delimited(&mut self, end: char, start_line: usize) -> BibResult<String> {
        let mut text = String::new();
        let mut depth = 0usize;

        loop {
            let c = self.bump().ok_or_else(|| BibError::Syntax {
                line: start_line,
                message: format!("unterminated value, expected '{}'", end),
            })?;

            if c == end && depth == 0 {
                return Ok(text);
            }
            match c {
                '{' => depth += 1,
                '}' => depth = depth.saturating_sub(1),
                _ => {}
            }
            text.push(c);
        }
    }

    /// Skip a brace-balanced block up to its closing delimiter
    fn skip_block(&mut self, close: char, start_line: usize, kind: &str) -> BibResult<()> {
        let mut depth = 0usize;
        while let Some(c) = self.bump() {
            match c {
                '{' => depth += 1,
                c if c == close && depth == 0 => return Ok(()),
                '}' => depth = depth.saturating_sub(1),
                _ => {}
            }
        }
        Err(BibError::Syntax {
            line: start_line,
            message: format!("@{} block is never closed", kind),
        })
    }

    fn expect(&mut self, expected: char) -> BibResult<()> {
        match self.peek() {
            Some(c) if c == expected => {
                self.bump();
                Ok(())
            }
            Some(c) => Err(self.error(format!("expected '{}', found '{}'", expected, c))),
            None => Err(self.error(format!("expected '{}', found end of input", expected))),
        }
    }

    /// Advance to the next '@'; false at end of input
    fn skip_to_record(&mut self) -> bool {
        while let Some(c) = self.peek() {
            if c == '@' {
                return true;
            }
            self.bump();
        }
        false
    }

    fn identifier(&mut self) -> String {
        self.take_while(is_identifier_char)
    }

    fn take_while<F: Fn(char) -> bool>(&mut self, keep: F) -> String {
        let start = self.pos;
        while self.peek().map_or(false, &keep) {
            self.bump();
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().map_or(false, char::is_whitespace) {
            self.bump();
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    /// 1-based line of the current position
    fn line(&self) -> usize {
        self.line
    }

    fn error<S: Into<String>>(&self, message: S) -> BibError {
        BibError::Syntax {
            line: self.line(),
            message: message.into(),
        }
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | ':' | '.' | '+' | '/')
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_two_entries() {
        let entries = parse_str(
            r#"
Exported by a reference manager.

@Article{Smith2020,
  Title   = {Deep {L}earning for Tables},
  author  = "Smith, J. and Doe, A.",
  year    = 2020,
  pages   = {134--154},
}

@book(Doe2019,
  title = {Short},
  month = may
)
"#,
        )
        .unwrap();

        assert_eq!(entries.len(), 2);
        let first = &entries[0];
        assert_eq!(first.key(), "Smith2020");
        assert_eq!(first.entry_type(), "article");
        assert_eq!(first.get("title"), "Deep {L}earning for Tables");
        assert_eq!(first.get("author"), "Smith, J. and Doe, A.");
        assert_eq!(first.get("year"), "2020");
        assert_eq!(first.get("pages"), "134--154");

        let second = &entries[1];
        assert_eq!(second.entry_type(), "book");
        assert_eq!(second.get("month"), "May");
    }

    #[test]
    fn test_string_macros_and_concatenation() {
        let entries = parse_str(
            r#"
@string{ jml = "Journal of {ML}" }
@STRING(vol = {12})
@article{k, journal = jml # ", " # vol, note = undefinedmacro}
"#,
        )
        .unwrap();

        assert_eq!(entries[0].get("journal"), "Journal of {ML}, 12");
        assert_eq!(entries[0].get("note"), "undefinedmacro");
    }

    #[test]
    fn test_comments_and_preamble_skipped() {
        let entries = parse_str(
            r#"
@comment{ this {is} ignored @article{not, title = {real}} }
@preamble{ "\newcommand{\noop}[1]{}" }
@misc{only}
"#,
        )
        .unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key(), "only");
        assert_eq!(entries[0].fields().count(), 0);
    }

    #[test]
    fn test_whitespace_collapsed() {
        let entries = parse_str("@misc{k, abstract = {Line one\n     line   two\t}}").unwrap();
        assert_eq!(entries[0].get("abstract"), "Line one line two");
    }

    #[test]
    fn test_quotes_inside_braces() {
        let entries = parse_str(r#"@misc{k, title = "A {"}quoted{"} word"}"#).unwrap();
        assert_eq!(entries[0].get("title"), r#"A {"}quoted{"} word"#);
    }

    #[test]
    fn test_unterminated_value_reports_line() {
        let err = parse_str("@article{a,\n  title = {Open\n\n").unwrap_err();
        match err {
            BibError::Syntax { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_missing_equals() {
        let err = parse_str("@article{a,\n title {x}}").unwrap_err();
        assert!(matches!(err, BibError::Syntax { line: 2, .. }), "{:?}", err);
    }

    #[test]
    fn test_missing_key() {
        assert!(matches!(
            parse_str("@article{, title = {x}}"),
            Err(BibError::Syntax { line: 1, .. })
        ));
    }

    #[test]
    fn test_unclosed_entry() {
        assert!(matches!(
            parse_str("\n@article{a, title = {x}"),
            Err(BibError::Syntax { line: 2, .. })
        ));
    }

    #[test]
    fn test_large_file_line_numbers() {
        let mut text = String::new();
        for i in 0..5000 {
            text.push_str(&format!(
                "@article{{k{},\n  title = {{Title {}}},\n  pages = {{1--2}}\n}}\n",
                i, i
            ));
        }
        assert_eq!(parse_str(&text).unwrap().len(), 5000);

        // 5000 entries of four lines each, then a missing comma on line 20003
        text.push_str("@misc{broken,\n  title = {x}\n  year = 1\n}\n");
        match parse_str(&text) {
            Err(BibError::Syntax { line, .. }) => assert_eq!(line, 20003),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_stray_at_sign_ignored() {
        let entries = parse_str("mail me @ home\n@misc{k}").unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_parse_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("refs.bib");
        fs::write(&path, "@misc{k, year = {1999}}").unwrap();
        assert_eq!(parse_file(&path).unwrap()[0].get("year"), "1999");
    }
}
