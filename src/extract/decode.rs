//! String repair applied to recovered payload fragments.
//!
//! Producers queue payloads with inconsistent escaping: JSON string escapes,
//! `\uXXXX` sequences, and HTML/XML entities all show up in the wild, often
//! together. Decoding runs in a fixed order (JSON escapes first, then the
//! entity set) and each pass scans left to right without re-reading its own
//! output, so a decoded character can never be misread as the start of
//! another escape.

/// Full repair pass for a recovered fragment. Idempotent on text that carries
/// no escape sequences.
#[must_use]
pub fn decode_fragment(input: &str) -> String {
    decode_entities(&unescape_json(input))
}

/// Reverses JSON string escaping, including `\uXXXX` escapes, in one
/// left-to-right pass. Unknown or truncated sequences are kept verbatim.
#[must_use]
pub(crate) fn unescape_json(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] != '\\' || i + 1 == chars.len() {
            out.push(chars[i]);
            i += 1;
            continue;
        }
        match chars[i + 1] {
            '\\' => {
                out.push('\\');
                i += 2;
            }
            '"' => {
                out.push('"');
                i += 2;
            }
            '\'' => {
                out.push('\'');
                i += 2;
            }
            '/' => {
                out.push('/');
                i += 2;
            }
            'n' => {
                out.push('\n');
                i += 2;
            }
            'r' => {
                out.push('\r');
                i += 2;
            }
            't' => {
                out.push('\t');
                i += 2;
            }
            'b' => {
                out.push('\u{0008}');
                i += 2;
            }
            'f' => {
                out.push('\u{000C}');
                i += 2;
            }
            'u' => match decode_unicode_escape(&chars, i) {
                Some((ch, consumed)) => {
                    out.push(ch);
                    i += consumed;
                }
                None => {
                    out.push('\\');
                    i += 1;
                }
            },
            other => {
                out.push('\\');
                out.push(other);
                i += 2;
            }
        }
    }
    out
}

/// Decodes the `\uXXXX` escape starting at `start` (pointing at the
/// backslash). UTF-16 surrogate pairs are combined into one code point.
/// Returns the character and the number of source chars consumed, or `None`
/// when the sequence is not a decodable escape.
fn decode_unicode_escape(chars: &[char], start: usize) -> Option<(char, usize)> {
    let hi = parse_hex4(chars, start + 2)?;
    if (0xD800..=0xDBFF).contains(&hi) {
        // High surrogate: only valid with a trailing \uXXXX low surrogate.
        if chars.get(start + 6) == Some(&'\\')
            && chars.get(start + 7) == Some(&'u')
            && let Some(lo) = parse_hex4(chars, start + 8)
            && (0xDC00..=0xDFFF).contains(&lo)
        {
            let cp = 0x10000 + ((hi - 0xD800) << 10) + (lo - 0xDC00);
            return char::from_u32(cp).map(|c| (c, 12));
        }
        return None;
    }
    char::from_u32(hi).map(|c| (c, 6))
}

fn parse_hex4(chars: &[char], start: usize) -> Option<u32> {
    if start + 4 > chars.len() {
        return None;
    }
    chars[start..start + 4].iter().try_fold(0u32, |acc, c| c.to_digit(16).map(|d| acc * 16 + d))
}

/// The fixed entity set recognized in stored payloads.
const ENTITIES: &[(&str, &str)] = &[
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&amp;", "&"),
    ("&quot;", "\""),
    ("&apos;", "'"),
    ("&#39;", "'"),
    ("&#34;", "\""),
    ("&#xA;", "\n"),
    ("&#xD;", "\r"),
];

/// Decodes the fixed HTML/XML entity set in one left-to-right pass. An
/// ampersand that starts no known entity is kept as-is.
#[must_use]
pub(crate) fn decode_entities(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match ENTITIES.iter().find(|(entity, _)| rest.starts_with(entity)) {
            Some((entity, literal)) => {
                out.push_str(literal);
                rest = &rest[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Forward transform used when raw, undecoded payload text is emitted for
/// diagnostic display. The single pass guarantees the ampersands introduced
/// by the substitutions are never escaped a second time.
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unescape_json_basic_escapes() {
        assert_eq!(unescape_json(r#"a\"b\'c\\d\/e"#), "a\"b'c\\d/e");
        assert_eq!(unescape_json(r"line1\nline2\r\n\ttabbed"), "line1\nline2\r\n\ttabbed");
        assert_eq!(unescape_json(r"\b\f"), "\u{0008}\u{000C}");
    }

    #[test]
    fn unescape_json_does_not_rescan_output() {
        // An escaped backslash followed by 'n' is a backslash and a letter,
        // not a newline.
        assert_eq!(unescape_json(r"a\\nb"), r"a\nb");
    }

    #[test]
    fn unescape_json_unknown_escape_kept_verbatim() {
        assert_eq!(unescape_json(r"a\qb"), r"a\qb");
        assert_eq!(unescape_json("trailing\\"), "trailing\\");
    }

    #[test]
    fn unescape_json_unicode_escapes() {
        assert_eq!(unescape_json(r"A\u00e9"), "A\u{e9}");
        assert_eq!(unescape_json(r"A\u00E9"), "A\u{e9}");
        // Surrogate pair for U+1F600.
        assert_eq!(unescape_json(r"\uD83D\uDE00"), "\u{1F600}");
    }

    #[test]
    fn unescape_json_invalid_unicode_kept_verbatim() {
        assert_eq!(unescape_json(r"\u00ZZ"), r"\u00ZZ");
        assert_eq!(unescape_json(r"\u00"), r"\u00");
        // Lone high surrogate.
        assert_eq!(unescape_json(r"\uD83Dx"), r"\uD83Dx");
    }

    #[test]
    fn decode_entities_fixed_set() {
        assert_eq!(decode_entities("&lt;b&gt;Hi&lt;/b&gt;"), "<b>Hi</b>");
        assert_eq!(decode_entities("a &amp; b"), "a & b");
        assert_eq!(decode_entities("&quot;q&quot; &apos;a&apos; &#39;s&#39; &#34;d&#34;"), "\"q\" 'a' 's' \"d\"");
        assert_eq!(decode_entities("x&#xA;y&#xD;z"), "x\ny\rz");
    }

    #[test]
    fn decode_entities_unknown_entity_kept() {
        assert_eq!(decode_entities("a &nbsp; b & c"), "a &nbsp; b & c");
    }

    #[test]
    fn decode_entities_does_not_rescan_output() {
        // `&amp;lt;` decodes to the literal text `&lt;`, not to `<`.
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
    }

    #[test]
    fn decode_fragment_idempotent_on_clean_text() {
        let clean = "Hello & <welcome>, back\\slash and 100% plain";
        let once = decode_fragment(clean);
        assert_eq!(decode_fragment(&once), once);
    }

    #[test]
    fn decode_fragment_json_escapes_before_entities() {
        assert_eq!(decode_fragment(r"&lt;tag&gt;"), "<tag>");
    }

    #[test]
    fn escape_html_forward_mapping() {
        assert_eq!(escape_html(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn escape_html_never_double_escapes() {
        assert_eq!(escape_html("&amp;"), "&amp;amp;");
    }
}
