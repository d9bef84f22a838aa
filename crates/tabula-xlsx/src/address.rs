//! A1-style cell references

/// Convert a 0-based column index to letters (0 = A, 25 = Z, 26 = AA)
pub(crate) fn column_to_letters(col: u32) -> String {
    let mut result = String::new();
    let mut n = col + 1; // 1-based for calculation

    while n > 0 {
        n -= 1;
        let c = ((n % 26) as u8 + b'A') as char;
        result.insert(0, c);
        n /= 26;
    }

    result
}

/// Format a 0-based (row, column) pair as an A1 reference
pub(crate) fn cell_reference(row: u32, col: u32) -> String {
    format!("{}{}", column_to_letters(col), row + 1)
}

/// Parse an A1 reference ("B12") into a 0-based (row, column) pair
pub(crate) fn parse_cell_reference(reference: &str) -> Option<(u32, u32)> {
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    if letters.is_empty() {
        return None;
    }

    let mut col: u32 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        col = col
            .checked_mul(26)?
            .checked_add(c.to_ascii_uppercase() as u32 - 'A' as u32 + 1)?;
    }

    let row: u32 = digits.parse().ok()?;
    if row == 0 {
        return None;
    }
    Some((row - 1, col - 1))
}
