//! ANSI escape sequence detection.

/// Byte length of the escape sequence starting at `pos`, if there is one.
///
/// Recognizes CSI (`ESC [ ... final`) and OSC (`ESC ] ... BEL` or `ESC ] ... ESC \`). An
/// unterminated sequence is not an escape and is measured as text.
pub fn escape_len(input: &str, pos: usize) -> Option<usize> {
    let bytes = input.as_bytes();
    if pos + 1 >= bytes.len() || bytes[pos] != 0x1b {
        return None;
    }

    match bytes[pos + 1] {
        b'[' => {
            let mut idx = pos + 2;
            while idx < bytes.len() {
                if (0x40..=0x7e).contains(&bytes[idx]) {
                    return Some(idx + 1 - pos);
                }
                idx += 1;
            }
            None
        }
        b']' => {
            let mut idx = pos + 2;
            while idx < bytes.len() {
                if bytes[idx] == 0x07 {
                    return Some(idx + 1 - pos);
                }
                if bytes[idx] == 0x1b && bytes.get(idx + 1) == Some(&b'\\') {
                    return Some(idx + 2 - pos);
                }
                idx += 1;
            }
            None
        }
        _ => None,
    }
}

/// Remove every recognized escape sequence from `input`.
pub fn strip_ansi(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut idx = 0;
    while idx < input.len() {
        if let Some(len) = escape_len(input, idx) {
            idx += len;
            continue;
        }
        let Some(ch) = input[idx..].chars().next() else {
            break;
        };
        out.push(ch);
        idx += ch.len_utf8();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{escape_len, strip_ansi};

    #[test]
    fn csi_length_includes_final_byte() {
        assert_eq!(escape_len("\x1b[31mred", 0), Some(5));
        assert_eq!(escape_len("\x1b[2K", 0), Some(4));
    }

    #[test]
    fn osc_with_bel_or_st() {
        assert_eq!(escape_len("\x1b]8;;x\x07", 0), Some(7));
        assert_eq!(escape_len("\x1b]8;;x\x1b\\", 0), Some(8));
    }

    #[test]
    fn plain_text_is_not_escape() {
        assert_eq!(escape_len("abc", 0), None);
        assert_eq!(escape_len("\x1b[12", 0), None);
    }

    #[test]
    fn strip_removes_color_codes() {
        assert_eq!(strip_ansi("\x1b[32m✔\x1b[0m done"), "✔ done");
    }
}
