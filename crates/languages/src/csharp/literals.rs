//! Decoding of C# literal tokens

use entity_lengths_core::syntax::Literal;

/// Parses an integer literal token: decimal, `0x` hex or `0b` binary, with
/// `_` separators and `u`/`l` suffixes
pub(crate) fn parse_integer(text: &str) -> Option<i64> {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    let digits = cleaned.trim_end_matches(['u', 'U', 'l', 'L']);
    let (radix, digits) = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        (16, hex)
    } else if let Some(binary) = digits
        .strip_prefix("0b")
        .or_else(|| digits.strip_prefix("0B"))
    {
        (2, binary)
    } else {
        (10, digits)
    };
    if digits.is_empty() {
        return None;
    }
    i64::from_str_radix(digits, radix).ok()
}

/// Decodes a regular `"..."` string literal, processing escape sequences
pub(crate) fn decode_regular_string(text: &str) -> Option<String> {
    let inner = text.strip_prefix('"')?.strip_suffix('"')?;
    let mut decoded = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            decoded.push(c);
            continue;
        }
        match chars.next()? {
            'n' => decoded.push('\n'),
            't' => decoded.push('\t'),
            'r' => decoded.push('\r'),
            '0' => decoded.push('\0'),
            'a' => decoded.push('\u{07}'),
            'b' => decoded.push('\u{08}'),
            'f' => decoded.push('\u{0C}'),
            'v' => decoded.push('\u{0B}'),
            'u' => decoded.push(hex_char(&mut chars, 4)?),
            'U' => decoded.push(hex_char(&mut chars, 8)?),
            'x' => {
                let mut value = 0u32;
                let mut consumed = 0;
                let mut lookahead = chars.clone();
                while consumed < 4 {
                    match lookahead.next().and_then(|d| d.to_digit(16)) {
                        Some(digit) => {
                            value = value * 16 + digit;
                            consumed += 1;
                            chars.next();
                        }
                        None => break,
                    }
                }
                if consumed == 0 {
                    return None;
                }
                decoded.push(char::from_u32(value)?);
            }
            other => decoded.push(other),
        }
    }
    Some(decoded)
}

fn hex_char(chars: &mut std::str::Chars<'_>, count: usize) -> Option<char> {
    let mut value = 0u32;
    for _ in 0..count {
        value = value * 16 + chars.next()?.to_digit(16)?;
    }
    char::from_u32(value)
}

/// Decodes a verbatim `@"..."` string literal, where `""` stands for `"`
pub(crate) fn decode_verbatim_string(text: &str) -> Option<String> {
    let inner = text
        .strip_prefix("@\"")
        .or_else(|| text.strip_prefix("\"@"))?
        .strip_suffix('"')?;
    Some(inner.replace("\"\"", "\""))
}

/// Decodes a raw `"""..."""` string literal
///
/// Multi-line raw strings drop the opening and closing line breaks and the
/// indentation of the closing delimiter.
pub(crate) fn decode_raw_string(text: &str) -> Option<String> {
    let quotes = text.chars().take_while(|c| *c == '"').count();
    if quotes < 3 || text.len() < quotes * 2 {
        return None;
    }
    let inner = &text[quotes..text.len() - quotes];
    if !inner.contains('\n') {
        return Some(inner.to_string());
    }
    let inner = inner
        .strip_prefix("\r\n")
        .or_else(|| inner.strip_prefix('\n'))
        .unwrap_or(inner);
    let (body, indentation) = match inner.rfind('\n') {
        Some(position) => {
            let last_line = &inner[position + 1..];
            if last_line.trim().is_empty() {
                (inner[..position].trim_end_matches('\r'), last_line)
            } else {
                (inner, "")
            }
        }
        None => (inner, ""),
    };
    let lines: Vec<&str> = body
        .lines()
        .map(|line| line.strip_prefix(indentation).unwrap_or(line))
        .collect();
    Some(lines.join("\n"))
}

/// Decodes a literal node by its tree-sitter kind
pub(crate) fn decode_literal(kind: &str, text: &str) -> Option<Literal> {
    let literal = match kind {
        "integer_literal" => parse_integer(text)
            .map(Literal::Integer)
            .unwrap_or_else(|| Literal::Other(text.to_string())),
        "string_literal" => decode_regular_string(text)
            .map(Literal::String)
            .unwrap_or_else(|| Literal::Other(text.to_string())),
        "verbatim_string_literal" => decode_verbatim_string(text)
            .map(Literal::String)
            .unwrap_or_else(|| Literal::Other(text.to_string())),
        "raw_string_literal" => decode_raw_string(text)
            .map(Literal::String)
            .unwrap_or_else(|| Literal::Other(text.to_string())),
        "boolean_literal" => Literal::Boolean(text == "true"),
        "null_literal" => Literal::Null,
        "real_literal" | "character_literal" | "interpolated_string_expression" => {
            Literal::Other(text.to_string())
        }
        _ => return None,
    };
    Some(literal)
}
