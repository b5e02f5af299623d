//! rendering of transaction results
//!
//! JSON payloads are re-indented token by token: member order, duplicate keys,
//! string escapes and number spelling come out exactly as the chaincode wrote them.

use serde::de::IgnoredAny;
use serde::Deserialize;

const INDENT: &str = "  ";

/// pretty JSON (2-space indent) when the payload is JSON, raw text otherwise.
/// empty payloads render as nothing.
pub fn format_result(data: &[u8]) -> Option<String> {
    if data.is_empty() {
        return None;
    }
    let text = String::from_utf8_lossy(data);
    if is_json(data) {
        Some(indent(&text))
    } else {
        Some(text.into_owned())
    }
}

/// a single complete JSON value, optionally surrounded by whitespace
fn is_json(data: &[u8]) -> bool {
    // skipping a value does not recurse, so nesting depth is not limited
    let mut de = serde_json::Deserializer::from_slice(data);
    IgnoredAny::deserialize(&mut de).and_then(|_| de.end()).is_ok()
}

/// `json` must already be valid
fn indent(json: &str) -> String {
    let mut out = String::with_capacity(json.len() * 2);
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut chars = json.chars().peekable();

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            ' ' | '\t' | '\n' | '\r' => {}
            '"' => {
                in_string = true;
                out.push(c);
            }
            '{' | '[' => {
                out.push(c);
                while matches!(chars.peek(), Some(' ' | '\t' | '\n' | '\r')) {
                    chars.next();
                }
                // empty containers stay on one line
                match chars.peek() {
                    Some(&close @ ('}' | ']')) => {
                        chars.next();
                        out.push(close);
                    }
                    _ => {
                        depth += 1;
                        newline(&mut out, depth);
                    }
                }
            }
            '}' | ']' => {
                depth = depth.saturating_sub(1);
                newline(&mut out, depth);
                out.push(c);
            }
            ',' => {
                out.push(c);
                newline(&mut out, depth);
            }
            ':' => out.push_str(": "),
            _ => out.push(c),
        }
    }
    out
}

fn newline(out: &mut String, depth: usize) {
    out.push('\n');
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}
