//! LaTeX accent escapes to Unicode
//!
//! Bibliography databases commonly spell accented letters as TeX accent
//! commands (`\'e`, `\~n`, `\c{c}`, `\ss`). [`decode_latex`] replaces the
//! commands listed in [`ACCENTS`] with their Unicode letters and then drops
//! every remaining literal brace.

/// `(accent command, base letter, composed letter)`
pub const ACCENTS: &[(char, char, char)] = &[
    ('\'', 'a', 'á'),
    ('\'', 'e', 'é'),
    ('\'', 'i', 'í'),
    ('\'', 'o', 'ó'),
    ('\'', 'u', 'ú'),
    ('\'', 'y', 'ý'),
    ('\'', 'A', 'Á'),
    ('\'', 'E', 'É'),
    ('\'', 'I', 'Í'),
    ('\'', 'O', 'Ó'),
    ('\'', 'U', 'Ú'),
    ('\'', 'Y', 'Ý'),
    ('"', 'a', 'ä'),
    ('"', 'e', 'ë'),
    ('"', 'i', 'ï'),
    ('"', 'o', 'ö'),
    ('"', 'u', 'ü'),
    ('"', 'A', 'Ä'),
    ('"', 'E', 'Ë'),
    ('"', 'I', 'Ï'),
    ('"', 'O', 'Ö'),
    ('"', 'U', 'Ü'),
    ('`', 'a', 'à'),
    ('`', 'e', 'è'),
    ('`', 'i', 'ì'),
    ('`', 'o', 'ò'),
    ('`', 'u', 'ù'),
    ('`', 'A', 'À'),
    ('`', 'E', 'È'),
    ('`', 'I', 'Ì'),
    ('`', 'O', 'Ò'),
    ('`', 'U', 'Ù'),
    ('~', 'a', 'ã'),
    ('~', 'o', 'õ'),
    ('~', 'n', 'ñ'),
    ('~', 'A', 'Ã'),
    ('~', 'O', 'Õ'),
    ('~', 'N', 'Ñ'),
    ('c', 'c', 'ç'),
    ('c', 'C', 'Ç'),
];

/// Decode LaTeX accent escapes and strip literal braces.
///
/// The accented letter may be bare (`\'e`) or braced (`\'{e}`); a dotless
/// `\i` argument is accepted as `i`. Cedilla takes a braced or
/// space-separated argument (`\c{c}`, `\c c`). Unknown commands are kept
/// apart from their braces.
///
/// ```rust
/// use tabula_core::decode_latex;
///
/// assert_eq!(decode_latex(r"Jos\'e Pe\~na {Garc\'{\i}a}"), "José Peña García");
/// ```
pub fn decode_latex(text: &str) -> String {
    if !text.contains(['\\', '{', '}']) {
        return text.to_string();
    }

    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '\\' {
            if let Some((decoded, consumed)) = decode_command(&chars[i + 1..]) {
                out.push(decoded);
                i += 1 + consumed;
                continue;
            }
        }
        if c != '{' && c != '}' {
            out.push(c);
        }
        i += 1;
    }

    out
}

/// Decode the command following a backslash. Returns the letter and the
/// number of characters consumed after the backslash.
fn decode_command(rest: &[char]) -> Option<(char, usize)> {
    let (&command, tail) = rest.split_first()?;

    // \ss is a control word: it must not run into further letters
    if command == 's' && tail.first() == Some(&'s') {
        return match tail.get(1) {
            Some(next) if next.is_alphabetic() => None,
            _ => Some(('ß', 2)),
        };
    }

    if !ACCENTS.iter().any(|&(accent, _, _)| accent == command) {
        return None;
    }

    let (letter, used) = accent_argument(tail, command.is_alphabetic())?;
    ACCENTS
        .iter()
        .find(|&&(accent, base, _)| accent == command && base == letter)
        .map(|&(_, _, composed)| (composed, 1 + used))
}

/// Parse the argument of an accent command: `x`, `{x}`, `\i` or `{\i}`.
/// Letter-named commands (`\c`) need a brace or a space before a bare letter.
fn accent_argument(tail: &[char], control_word: bool) -> Option<(char, usize)> {
    match tail {
        ['{', '\\', 'i', '}', ..] => Some(('i', 4)),
        ['{', letter, '}', ..] if letter.is_alphabetic() => Some((*letter, 3)),
        ['\\', 'i', ..] if !control_word => Some(('i', 2)),
        [' ', letter, ..] if control_word && letter.is_alphabetic() => Some((*letter, 2)),
        [letter, ..] if !control_word && letter.is_alphabetic() => Some((*letter, 1)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acute_tilde_and_braces() {
        assert_eq!(decode_latex(r"{Caf\'e} Espa\~na"), "Café España");
    }

    #[test]
    fn test_braced_arguments() {
        assert_eq!(decode_latex(r#"\'{E}cole \"{u}ber"#), "École über");
        assert_eq!(decode_latex(r"Fran\c{c}ois"), "François");
        assert_eq!(decode_latex(r"gar\c con"), "garçon");
    }

    #[test]
    fn test_dotless_i() {
        assert_eq!(decode_latex(r"Mart\'{\i}n Mar\'\i{}a"), "Martín María");
    }

    #[test]
    fn test_eszett() {
        assert_eq!(decode_latex(r"Stra\ss{}e"), "Straße");
        assert_eq!(decode_latex(r"Stra\ss e"), "Straß e");
        // a longer control word is left alone
        assert_eq!(decode_latex(r"\ssx"), r"\ssx");
    }

    #[test]
    fn test_unknown_commands_keep_text() {
        assert_eq!(decode_latex(r"\emph{word}"), r"\emphword");
        assert_eq!(decode_latex(r"\'q"), r"\'q");
        assert_eq!(decode_latex("plain text"), "plain text");
    }

    #[test]
    fn test_every_table_entry_decodes() {
        for &(accent, base, composed) in ACCENTS {
            let source = if accent.is_alphabetic() {
                format!("\\{}{{{}}}", accent, base)
            } else {
                format!("\\{}{}", accent, base)
            };
            assert_eq!(decode_latex(&source), composed.to_string(), "{}", source);
        }
    }
}
