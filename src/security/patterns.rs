//! Token patterns for the preflight scans.
//!
//! The scans run on raw text before any parser sees it, so they are
//! deliberately lexical: a token only counts when it starts at a token
//! boundary (line start, whitespace, or a flow indicator).

use regex::Regex;
use std::sync::LazyLock;

// --- Compiled regexes (one-time via LazyLock) ---

macro_rules! lazy_regex {
    ($name:ident, $pattern:expr) => {
        pub(crate) static $name: LazyLock<Regex> =
            LazyLock::new(|| Regex::new($pattern).unwrap());
    };
}

lazy_regex!(
    RE_ANCHOR,
    r"(?:^|[\s\[{,])(&[A-Za-z0-9_][A-Za-z0-9_.\-]*)"
);
lazy_regex!(
    RE_ALIAS,
    r"(?:^|[\s\[{,])(\*[A-Za-z0-9_][A-Za-z0-9_.\-]*)"
);
lazy_regex!(RE_DOUBLE_BANG_TAG, r"(?:^|[\s\[{,])(!![A-Za-z0-9_\-]*)");
lazy_regex!(RE_VERBATIM_TAG, r"(?:^|[\s\[{,])(!<[^>\s]*>?)");
lazy_regex!(
    RE_LOCAL_TAG,
    r"(?:^|[\s\[{,])!([A-Za-z][A-Za-z0-9_:.\-]*)"
);

/// Whether a quote at byte `i` of `line` opens a quoted scalar.
fn opens_quote(line: &[u8], i: usize) -> bool {
    i == 0 || matches!(line[i - 1], b' ' | b'\t' | b'[' | b'{' | b',' | b':' | b'-')
}

/// The code portion of one line: comments dropped, quoted scalars blanked.
///
/// A `#` only starts a comment at the beginning of a line or after
/// whitespace, matching YAML's own rule. Quotes only open a scalar at a
/// token boundary, so apostrophes inside plain words are kept. Quoted
/// scalars that continue onto the next line are not tracked.
pub(crate) fn code_portion(line: &str) -> String {
    let bytes = line.as_bytes();
    let mut out = String::with_capacity(line.len());
    let mut chars = line.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            '#' if i == 0 || matches!(bytes[i - 1], b' ' | b'\t') => break,
            '"' | '\'' if opens_quote(bytes, i) => {
                out.push(' ');
                while let Some((_, inner)) = chars.next() {
                    if c == '"' && inner == '\\' {
                        chars.next();
                    } else if inner == c {
                        // '' is an escaped quote inside single quotes
                        if c == '\'' && chars.peek().map(|&(_, n)| n) == Some('\'') {
                            chars.next();
                            continue;
                        }
                        break;
                    }
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }
    out
}

/// Iterate over the code portion of every line.
pub(crate) fn code_lines(content: &str) -> impl Iterator<Item = String> + '_ {
    content.lines().map(code_portion)
}

/// Collect the first capture group of `re` across all code lines,
/// de-duplicated and in first-seen order.
pub(crate) fn find_tokens(re: &Regex, content: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for line in code_lines(content) {
        for caps in re.captures_iter(&line) {
            if let Some(m) = caps.get(1) {
                let token = m.as_str().to_string();
                if !found.contains(&token) {
                    found.push(token);
                }
            }
        }
    }
    found
}
