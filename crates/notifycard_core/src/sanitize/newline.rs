//! Bare newline to line-break conversion.

/// Marker inserted for a bare line feed.
pub const LINE_BREAK: &str = "<br>";

/// Replaces each `\n` with `<br>` unless it touches a markup delimiter.
///
/// A line feed directly after `>` or directly before `<` is kept as-is since
/// it sits between tags. Neighbours are read from the original input, so runs
/// of line feeds are each converted.
pub fn normalize_newlines(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    for (index, &c) in chars.iter().enumerate() {
        if c != '\n' {
            out.push(c);
            continue;
        }
        let after_tag = index > 0 && chars[index - 1] == '>';
        let before_tag = chars.get(index + 1) == Some(&'<');
        if after_tag || before_tag {
            out.push(c);
        } else {
            out.push_str(LINE_BREAK);
        }
    }
    out
}
