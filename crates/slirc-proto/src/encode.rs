//! Outbound line sanitation.
//!
//! Every line the client writes passes through [`sanitize_line`] before
//! it is encoded, so no caller can smuggle a CR/LF into the stream or
//! exceed the server's line budget.

/// Marker appended to a line that had to be cut.
pub const TRUNCATION_MARKER: &str = " <...>";

/// Replace control characters and enforce the length limit.
///
/// Every character below U+0020 becomes `[n]` with `n` its decimal code.
/// If the result is longer than `max_len` characters it is cut to
/// `max_len` and [`TRUNCATION_MARKER`] is appended.
///
/// ```
/// use slirc_proto::encode::sanitize_line;
///
/// assert_eq!(sanitize_line("a\r\nb", 300), "a[13][10]b");
/// assert_eq!(sanitize_line("abcdef", 3), "abc <...>");
/// ```
pub fn sanitize_line(line: &str, max_len: usize) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = 0usize;
    let mut truncated = false;

    for c in line.chars() {
        if (c as u32) < 0x20 {
            for r in format!("[{}]", c as u32).chars() {
                if chars == max_len {
                    truncated = true;
                    break;
                }
                out.push(r);
                chars += 1;
            }
        } else if chars == max_len {
            truncated = true;
        } else {
            out.push(c);
            chars += 1;
        }
        if truncated {
            break;
        }
    }

    if truncated {
        out.push_str(TRUNCATION_MARKER);
    }
    out
}
