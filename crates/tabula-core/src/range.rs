//! Printer-style range selection ("1-3,5,7-9")

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::error::{Error, Result};

/// An ordered set of unique 0-based positions parsed from a 1-based,
/// printer-style range string.
///
/// The grammar is a comma-separated list of tokens, each either a single
/// position `N` or an inclusive span `A-B`. Whitespace around tokens and
/// around the hyphen is ignored. Every token is validated before any position
/// is produced, so a malformed string never yields a partial selection.
///
/// Spans are stored as sorted, non-overlapping ranges, so a span as large as
/// `1-4000000000` costs no more than `1-3`. Positions are only enumerated by
/// [`iter`](Self::iter), [`to_vec`](Self::to_vec) and
/// [`resolve`](Self::resolve), the last bounded by the number of items
/// actually available.
///
/// ```rust
/// use tabula_core::RangeSpec;
///
/// let spec = RangeSpec::parse("1-3,5,7-9").unwrap();
/// assert_eq!(spec.to_vec(), vec![0, 1, 2, 4, 6, 7, 8]);
/// assert_eq!(spec.resolve(5), vec![0, 1, 2, 4]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RangeSpec {
    spans: Vec<RangeInclusive<usize>>,
}

impl RangeSpec {
    /// Parse a range string.
    ///
    /// Fails with [`Error::RangeParse`] on an empty string, an empty token,
    /// a non-integer or zero position, a missing bound, or a span whose start
    /// is after its end.
    pub fn parse(input: &str) -> Result<Self> {
        if input.trim().is_empty() {
            return Err(Error::range(input, "range is empty"));
        }

        let spans = input
            .split(',')
            .map(parse_token)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::from_spans(spans))
    }

    /// Select every position in `0..count`
    pub fn all(count: usize) -> Self {
        match count {
            0 => Self::default(),
            n => Self::from_spans(vec![0..=n - 1]),
        }
    }

    /// Sort and merge overlapping or adjacent spans
    fn from_spans(mut spans: Vec<RangeInclusive<usize>>) -> Self {
        spans.sort_by_key(|span| *span.start());

        let mut merged: Vec<RangeInclusive<usize>> = Vec::with_capacity(spans.len());
        for span in spans {
            if let Some(last) = merged.last_mut() {
                if *span.start() <= last.end().saturating_add(1) {
                    if span.end() > last.end() {
                        *last = *last.start()..=*span.end();
                    }
                    continue;
                }
            }
            merged.push(span);
        }
        Self { spans: merged }
    }

    /// Number of selected positions, saturating at `usize::MAX`
    pub fn len(&self) -> usize {
        self.spans
            .iter()
            .map(|span| (span.end() - span.start()).saturating_add(1))
            .fold(0, usize::saturating_add)
    }

    /// Check if nothing is selected
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Check if a 0-based position is selected
    pub fn contains(&self, index: usize) -> bool {
        self.spans.iter().any(|span| span.contains(&index))
    }

    /// Iterate over selected positions in ascending order
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.spans.iter().flat_map(|span| span.clone())
    }

    /// Selected positions in ascending order.
    ///
    /// Allocates one entry per position; use [`resolve`](Self::resolve) for
    /// ranges that come from user input.
    pub fn to_vec(&self) -> Vec<usize> {
        self.iter().collect()
    }

    /// Selected positions that exist among `available` items.
    /// Out-of-range positions are dropped, not reported.
    pub fn resolve(&self, available: usize) -> Vec<usize> {
        self.spans
            .iter()
            .take_while(|span| *span.start() < available)
            .flat_map(|span| *span.start()..=(*span.end()).min(available - 1))
            .collect()
    }
}

fn parse_token(token: &str) -> Result<RangeInclusive<usize>> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return Err(Error::range(token, "empty token"));
    }

    match trimmed.split_once('-') {
        None => {
            let index = parse_position(trimmed, token)?;
            Ok(index..=index)
        }
        Some((start, end)) => {
            if end.contains('-') {
                return Err(Error::range(token, "a span has exactly one '-'"));
            }
            let start = parse_position(start, token)?;
            let end = parse_position(end, token)?;
            if start > end {
                return Err(Error::range(token, "span start is after its end"));
            }
            Ok(start..=end)
        }
    }
}

/// Parse one 1-based position into a 0-based index
fn parse_position(part: &str, token: &str) -> Result<usize> {
    let part = part.trim();
    if part.is_empty() {
        return Err(Error::range(token, "missing span bound"));
    }
    let position: usize = part
        .parse()
        .map_err(|_| Error::range(token, format!("'{}' is not a positive integer", part)))?;
    if position == 0 {
        return Err(Error::range(token, "positions start at 1"));
    }
    Ok(position - 1)
}

impl FromStr for RangeSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl FromIterator<usize> for RangeSpec {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self::from_spans(iter.into_iter().map(|index| index..=index).collect())
    }
}

/// Formats back to 1-based printer syntax, collapsing runs into spans
impl fmt::Display for RangeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, span) in self.spans.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            let (start, end) = (*span.start() as u128 + 1, *span.end() as u128 + 1);
            if start == end {
                write!(f, "{}", start)?;
            } else {
                write!(f, "{}-{}", start, end)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_parse_mixed() {
        let spec = RangeSpec::parse("1-3,5,7-9").unwrap();
        assert_eq!(spec.to_vec(), vec![0, 1, 2, 4, 6, 7, 8]);
    }

    #[test]
    fn test_duplicates_collapse() {
        assert_eq!(RangeSpec::parse("2,2,2").unwrap().to_vec(), vec![1]);
        assert_eq!(RangeSpec::parse("3,1-4,2").unwrap().to_vec(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_whitespace_tolerated() {
        assert_eq!(RangeSpec::parse(" 1 - 2 , 4 ").unwrap().to_vec(), vec![0, 1, 3]);
    }

    #[test]
    fn test_malformed_tokens() {
        for input in ["3-1", "", "  ", "a", "1,,2", "1,", "0", "-3", "1-", "1-2-3", "1.5", "2-x"] {
            let err = RangeSpec::parse(input).unwrap_err();
            assert!(
                matches!(err, Error::RangeParse { .. }),
                "{:?} gave {:?}",
                input,
                err
            );
        }
    }

    #[test]
    fn test_error_names_token() {
        match RangeSpec::parse("1,3-1,5") {
            Err(Error::RangeParse { token, .. }) => assert_eq!(token, "3-1"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_resolve_skips_out_of_range() {
        let spec = RangeSpec::parse("1,3,10").unwrap();
        assert_eq!(spec.resolve(3), vec![0, 2]);
        assert!(spec.resolve(0).is_empty());
    }

    #[test]
    fn test_huge_spans_stay_compact() {
        let spec = RangeSpec::parse("1-18446744073709551615").unwrap();
        assert_eq!(spec.len(), usize::MAX);
        assert!(spec.contains(4_000_000_000));
        assert_eq!(spec.resolve(3), vec![0, 1, 2]);
        assert_eq!(spec.to_string(), "1-18446744073709551615");

        let spec = RangeSpec::parse("2, 1-4000000000, 3").unwrap();
        assert_eq!(spec.resolve(2), vec![0, 1]);
        assert_eq!(spec.iter().take(3).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_overlapping_spans_merge() {
        let spec = RangeSpec::parse("5-8,1-2,3,7-10,20").unwrap();
        assert_eq!(spec.to_string(), "1-3,5-10,20");
        assert_eq!(spec.len(), 10);
        assert_eq!(spec, RangeSpec::parse("1-3,5-10,20").unwrap());
        assert!(!spec.contains(3));
        assert_eq!(RangeSpec::all(3).to_vec(), vec![0, 1, 2]);
        assert!(RangeSpec::all(0).is_empty());
    }

    #[test]
    fn test_display_collapses_runs() {
        let spec = RangeSpec::parse("7,1-3,5,8-9").unwrap();
        assert_eq!(spec.to_string(), "1-3,5,7-9");
        assert_eq!(RangeSpec::default().to_string(), "");
    }

    proptest! {
        #[test]
        fn prop_singletons_parse_to_shifted_set(positions in prop::collection::vec(1usize..200, 1..20)) {
            let input = positions.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(",");
            let spec = RangeSpec::parse(&input).unwrap();
            let expected: BTreeSet<usize> = positions.iter().map(|p| p - 1).collect();
            prop_assert_eq!(spec.to_vec(), expected.into_iter().collect::<Vec<_>>());
        }

        #[test]
        fn prop_display_round_trips(indices in prop::collection::btree_set(0usize..100, 1..30)) {
            let spec: RangeSpec = indices.iter().copied().collect();
            let reparsed = RangeSpec::parse(&spec.to_string()).unwrap();
            prop_assert_eq!(reparsed, spec);
        }
    }
}
