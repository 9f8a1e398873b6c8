//! ANSI escape sequence stripping

/// Strip ANSI escape sequences from decoded text.
///
/// Handles CSI sequences (colors, cursor movement), OSC sequences (window
/// titles, terminated by BEL or ST), and character-set selection. Sequences
/// split across read chunks are not reassembled; serial consoles emit them
/// atomically in practice.
pub fn strip_ansi(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\x1b' {
            out.push(c);
            continue;
        }

        match chars.peek() {
            Some('[') => {
                // CSI: parameters end at the first alphabetic final byte.
                chars.next();
                for c in chars.by_ref() {
                    if c.is_ascii_alphabetic() {
                        break;
                    }
                }
            }
            Some(']') => {
                // OSC: runs to BEL or ST (ESC \).
                chars.next();
                while let Some(c) = chars.next() {
                    if c == '\x07' {
                        break;
                    }
                    if c == '\x1b' {
                        if chars.peek() == Some(&'\\') {
                            chars.next();
                        }
                        break;
                    }
                }
            }
            Some('(') | Some(')') => {
                // Character set selection: designator follows the bracket.
                chars.next();
                chars.next();
            }
            _ => {
                chars.next();
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_csi() {
        assert_eq!(
            strip_ansi("Hello \x1b[31mred\x1b[0m world"),
            "Hello red world"
        );
    }

    #[test]
    fn test_strips_osc() {
        assert_eq!(strip_ansi("Hello \x1b]0;Title\x07 world"), "Hello  world");
    }

    #[test]
    fn test_strips_osc_with_st_terminator() {
        assert_eq!(strip_ansi("a\x1b]0;Title\x1b\\b"), "ab");
    }

    #[test]
    fn test_passes_plain_text_through() {
        assert_eq!(strip_ansi("login: "), "login: ");
    }

    #[test]
    fn test_strips_multiple_sequences() {
        assert_eq!(
            strip_ansi("\x1b[1mBold\x1b[0m and \x1b[4munderline\x1b[0m"),
            "Bold and underline"
        );
    }

    #[test]
    fn test_trailing_escape_does_not_panic() {
        assert_eq!(strip_ansi("abc\x1b"), "abc");
        assert_eq!(strip_ansi("abc\x1b["), "abc");
    }
}
