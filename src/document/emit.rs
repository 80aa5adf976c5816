//! Block-style YAML emitter.
//!
//! Output is deterministic: two-space indentation, sequences indented under
//! their parent key, plain scalars whenever they read back as the same
//! string, JSON-style double quotes otherwise.

use super::value::Document;

/// Plain scalars that YAML 1.1 tools would read as something else.
const RESERVED_WORDS: [&str; 11] = [
    "null", "~", "true", "false", "yes", "no", "on", "off", "y", "n", "",
];

const INDICATORS: [char; 19] = [
    '-', '?', ':', ',', '[', ']', '{', '}', '#', '&', '*', '!', '|', '>', '\'', '"', '%', '@',
    '`',
];

fn looks_numeric(s: &str) -> bool {
    let lower = s.to_ascii_lowercase();
    s.parse::<f64>().is_ok()
        || lower.starts_with("0x")
        || lower.starts_with("0o")
        || lower.starts_with("0b")
        || matches!(lower.as_str(), ".inf" | "-.inf" | "+.inf" | ".nan")
}

/// Characters that may appear unescaped in emitted YAML.
///
/// The YAML printable set minus the line and byte-order marks that some
/// readers treat specially.
fn is_printable(c: char) -> bool {
    matches!(c,
        '\t' | '\n' | '\r'
        | '\u{20}'..='\u{7E}'
        | '\u{A0}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
        && !matches!(c, '\u{2028}' | '\u{2029}' | '\u{FEFF}')
}

/// Whether the YAML reader would give back exactly `s` for the plain scalar.
fn reads_back_as_string(s: &str) -> bool {
    matches!(
        serde_yaml::from_str::<serde_yaml::Value>(s),
        Ok(serde_yaml::Value::String(ref parsed)) if parsed == s
    )
}

/// Whether a string must be quoted to survive a round trip.
fn needs_quotes(s: &str) -> bool {
    if RESERVED_WORDS.contains(&s.to_ascii_lowercase().as_str()) || looks_numeric(s) {
        return true;
    }
    if s.starts_with(char::is_whitespace) || s.ends_with(char::is_whitespace) {
        return true;
    }
    if s.starts_with(INDICATORS) {
        return true;
    }
    if s.contains(": ") || s.contains(" #") || s.ends_with(':') {
        return true;
    }
    if s.chars().any(|c| c.is_control() || !is_printable(c)) {
        return true;
    }
    !reads_back_as_string(s)
}

/// Double-quoted scalar with every non-printable character escaped.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            c if c.is_control() || !is_printable(c) => {
                let code = u32::from(c);
                if code <= 0xFF {
                    out.push_str(&format!("\\x{:02X}", code));
                } else if code <= 0xFFFF {
                    out.push_str(&format!("\\u{:04X}", code));
                } else {
                    out.push_str(&format!("\\U{:08X}", code));
                }
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Render a value that fits on one line.
fn inline(doc: &Document) -> String {
    match doc {
        Document::Null => "null".to_string(),
        Document::Bool(b) => b.to_string(),
        Document::Number(n) => n.to_string(),
        Document::String(s) => scalar_string(s),
        Document::Sequence(_) => "[]".to_string(),
        Document::Mapping(_) => "{}".to_string(),
    }
}

fn is_block(doc: &Document) -> bool {
    match doc {
        Document::Sequence(items) => !items.is_empty(),
        Document::Mapping(m) => !m.is_empty(),
        _ => false,
    }
}

fn emit_block(doc: &Document, indent: usize, out: &mut String) {
    match doc {
        Document::Mapping(m) if !m.is_empty() => {
            let pad = " ".repeat(indent);
            for (key, value) in m.iter() {
                out.push_str(&pad);
                out.push_str(&scalar_string(key));
                out.push(':');
                if is_block(value) {
                    out.push('\n');
                    emit_block(value, indent + 2, out);
                } else {
                    out.push(' ');
                    out.push_str(&inline(value));
                    out.push('\n');
                }
            }
        }
        Document::Sequence(items) if !items.is_empty() => {
            let pad = " ".repeat(indent);
            for item in items {
                out.push_str(&pad);
                out.push_str("- ");
                if is_block(item) {
                    // Render one level deeper, then hang the first line off the dash
                    let mut nested = String::new();
                    emit_block(item, indent + 2, &mut nested);
                    out.push_str(&nested[indent + 2..]);
                } else {
                    out.push_str(&inline(item));
                    out.push('\n');
                }
            }
        }
        scalar => {
            out.push_str(&" ".repeat(indent));
            out.push_str(&inline(scalar));
            out.push('\n');
        }
    }
}

/// Serialize a document as block-style YAML.
pub fn to_yaml_string(doc: &Document) -> String {
    let mut out = String::new();
    emit_block(doc, 0, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reparse(text: &str) -> Document {
        Document::try_from(serde_yaml::from_str::<serde_yaml::Value>(text).unwrap()).unwrap()
    }

    #[test]
    fn sequences_indent_under_keys() {
        let doc = reparse("steps:\n- script: echo hi\n");
        assert_eq!(to_yaml_string(&doc), "steps:\n  - script: echo hi\n");
    }

    #[test]
    fn nested_mappings_and_sequences() {
        let src = "Resources:\n  B:\n    Type: AWS::S3::Bucket\n    Properties:\n      Tags:\n        - Key: a\n          Value: b\n";
        let doc = reparse(src);
        assert_eq!(to_yaml_string(&doc), src);
    }

    #[test]
    fn nested_sequence_hangs_off_dash() {
        let doc = reparse("a:\n  - - 1\n    - 2\n  - 3\n");
        let text = to_yaml_string(&doc);
        assert_eq!(text, "a:\n  - - 1\n    - 2\n  - 3\n");
        assert_eq!(reparse(&text), doc);
    }

    #[test]
    fn empty_collections_are_inline() {
        let doc = reparse("a: {}\nb: []\nc: null\n");
        assert_eq!(to_yaml_string(&doc), "a: {}\nb: []\nc: null\n");
    }

    #[test]
    fn ambiguous_strings_are_quoted() {
        let doc = reparse(
            "a: 'yes'\nb: '123'\nc: 'key: value'\nd: ''\ne: '!Ref x'\nf: \"two\\nlines\"\n",
        );
        let text = to_yaml_string(&doc);
        assert!(text.contains("a: \"yes\""));
        assert!(text.contains("b: \"123\""));
        assert!(text.contains("c: \"key: value\""));
        assert!(text.contains("d: \"\""));
        assert!(text.contains("e: \"!Ref x\""));
        assert!(text.contains("f: \"two\\nlines\""));
        assert_eq!(reparse(&text), doc);
    }

    #[test]
    fn plain_strings_stay_plain() {
        let doc = reparse("a: echo hi && exit 0\nb: AWS::S3::Bucket\n");
        assert_eq!(
            to_yaml_string(&doc),
            "a: echo hi && exit 0\nb: AWS::S3::Bucket\n"
        );
    }

    #[test]
    fn binary_literal_strings_are_quoted() {
        let doc = reparse("name: \"0b101\"\n");
        let text = to_yaml_string(&doc);
        assert_eq!(text, "name: \"0b101\"\n");
        assert_eq!(reparse(&text), doc);
    }

    #[test]
    fn strings_the_reader_would_retype_are_quoted() {
        for s in ["0b1", "1e3", "0o17", "-.inf", "NULL", "True", "2024-01-01"] {
            let doc = Document::from(s);
            let text = to_yaml_string(&doc);
            assert_eq!(reparse(&text), doc, "{} emitted as {}", s, text);
        }
    }

    #[test]
    fn non_printable_characters_are_escaped() {
        let doc = Document::from("echo \u{7f} \u{85} \u{2028} \u{1} ok");
        let text = to_yaml_string(&doc);
        assert_eq!(text, "\"echo \\x7F \\x85 \\u2028 \\x01 ok\"\n");
        assert_eq!(reparse(&text), doc);
    }

    #[test]
    fn unicode_text_stays_plain() {
        let doc = reparse("greeting: héllo wörld ✓\n");
        assert_eq!(to_yaml_string(&doc), "greeting: héllo wörld ✓\n");
    }

    #[test]
    fn scalar_root() {
        assert_eq!(to_yaml_string(&Document::from("hello")), "hello\n");
        assert_eq!(to_yaml_string(&Document::Null), "null\n");
    }
}
