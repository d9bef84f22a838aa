//! Page counts for bibliography entries
//!
//! A [`PageCountResolver`] tries an ordered chain of strategies and takes the
//! first count produced. The default chain reads the `pages` field as a
//! `start--end` range, then falls back to counting the pages of the PDF named
//! in the `file` field. Nothing here fails the import: problems go to the
//! [`Reporter`] and the count stays empty.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::report::{ImportWarning, Reporter};

/// Which strategy produced a page count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageCountSource {
    /// Derived from the `pages` field
    PageRange,
    /// Counted in the attached PDF
    PdfFile,
}

impl fmt::Display for PageCountSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageCountSource::PageRange => f.write_str("page range"),
            PageCountSource::PdfFile => f.write_str("PDF file"),
        }
    }
}

/// A resolved count and where it came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCount {
    /// Signed: a reversed `pages` range such as `154--134` gives a negative count
    pub pages: i64,
    pub source: PageCountSource,
}

/// One way of finding the page count of an entry
pub trait PageCountStrategy {
    /// Tag for counts this strategy produces
    fn source(&self) -> PageCountSource;

    /// Page count from the entry's `pages` and `file` fields, or `None` to
    /// let the next strategy try
    fn page_count(&self, pages: &str, file: &str, reporter: &mut dyn Reporter) -> Option<i64>;
}

/// `start--end` in the `pages` field, counted as `end - start + 1`.
///
/// The bounds are not checked against each other, so `154--134` counts -19.
/// Only bounds that are not integers fall through to the next strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageRange;

impl PageCountStrategy for PageRange {
    fn source(&self) -> PageCountSource {
        PageCountSource::PageRange
    }

    fn page_count(&self, pages: &str, _file: &str, reporter: &mut dyn Reporter) -> Option<i64> {
        if !pages.contains("--") {
            return None;
        }

        let parts: Vec<&str> = pages.split("--").collect();
        let span = match parts.as_slice() {
            [start, end] => start
                .trim()
                .parse::<i64>()
                .ok()
                .zip(end.trim().parse::<i64>().ok())
                .and_then(|(start, end)| end.checked_sub(start)?.checked_add(1)),
            _ => None,
        };

        if span.is_none() {
            reporter.report(ImportWarning::InvalidPageRange {
                pages: pages.to_string(),
            });
        }
        span
    }
}

/// Pages of the PDF referenced by the `file` field.
///
/// Reference managers store attachments as `description:path:type`, so the
/// field is split on `:` and the first segment ending in `.pdf` is used.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfFile;

impl PdfFile {
    /// Path of the first `.pdf` segment of a `file` field, lexically normalized
    pub fn pdf_path(file: &str) -> Option<PathBuf> {
        file.split(':')
            .map(str::trim)
            .find(|segment| segment.to_lowercase().ends_with(".pdf"))
            .map(|segment| normalize_path(Path::new(segment)))
    }

    /// Number of pages of a PDF file
    pub fn count_pages(path: &Path) -> Result<i64, lopdf::Error> {
        let document = lopdf::Document::load(path)?;
        Ok(document.get_pages().len() as i64)
    }
}

impl PageCountStrategy for PdfFile {
    fn source(&self) -> PageCountSource {
        PageCountSource::PdfFile
    }

    fn page_count(&self, _pages: &str, file: &str, reporter: &mut dyn Reporter) -> Option<i64> {
        if !file.to_lowercase().contains(".pdf") {
            return None;
        }

        let Some(path) = Self::pdf_path(file) else {
            log::debug!("no PDF path in file field '{}'", file);
            return None;
        };

        if !path.exists() {
            reporter.report(ImportWarning::PdfNotFound { path });
            return None;
        }

        match Self::count_pages(&path) {
            Ok(count) => Some(count),
            Err(e) => {
                reporter.report(ImportWarning::PdfUnreadable {
                    path,
                    message: e.to_string(),
                });
                None
            }
        }
    }
}

/// Ordered chain of page count strategies
pub struct PageCountResolver {
    strategies: Vec<Box<dyn PageCountStrategy>>,
}

impl PageCountResolver {
    /// Resolver trying `strategies` in order
    pub fn new(strategies: Vec<Box<dyn PageCountStrategy>>) -> Self {
        Self { strategies }
    }

    /// Page count of an entry, or `None` when no strategy finds one
    pub fn resolve(&self, pages: &str, file: &str, reporter: &mut dyn Reporter) -> Option<i64> {
        self.resolve_with_source(pages, file, reporter)
            .map(|count| count.pages)
    }

    /// Like [`resolve`](Self::resolve), also naming the strategy that
    /// produced the count
    pub fn resolve_with_source(
        &self,
        pages: &str,
        file: &str,
        reporter: &mut dyn Reporter,
    ) -> Option<PageCount> {
        self.strategies.iter().find_map(|strategy| {
            strategy
                .page_count(pages, file, reporter)
                .map(|pages| PageCount {
                    pages,
                    source: strategy.source(),
                })
        })
    }
}

/// [`PageRange`] first, then [`PdfFile`]
impl Default for PageCountResolver {
    fn default() -> Self {
        Self::new(vec![Box::new(PageRange), Box::new(PdfFile)])
    }
}

impl fmt::Debug for PageCountResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.strategies.iter().map(|s| s.source()))
            .finish()
    }
}

/// Resolve `.` and `..` components and duplicate separators without
/// touching the filesystem.
///
/// `..` past the start of a relative path is kept; `..` at the root is
/// dropped.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut parts: Vec<Component> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        return PathBuf::from(".");
    }
    parts.iter().collect()
}
