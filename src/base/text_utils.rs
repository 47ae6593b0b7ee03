//! Text helpers shared by the tokenizer and the incremental reparser.

use super::TextSize;

/// Byte offset of the first character at which `old` and `new` differ.
///
/// If one text is a prefix of the other, the length of the shorter one is
/// returned. The result always lies on a character boundary of both texts.
///
/// # Example
/// ```
/// use msbuild::base::{TextSize, first_differing_offset};
///
/// assert_eq!(first_differing_offset("<a><b/></a>", "<a><c/></a>"), TextSize::new(4));
/// assert_eq!(first_differing_offset("<a>", "<a>"), TextSize::new(3));
/// ```
pub fn first_differing_offset(old: &str, new: &str) -> TextSize {
    let mut offset = 0usize;
    for (a, b) in old.chars().zip(new.chars()) {
        if a != b {
            break;
        }
        offset += a.len_utf8();
    }
    TextSize::new(offset as u32)
}

/// Check if a character may start an XML name.
///
/// Uses Unicode identifier rules as an approximation of the XML `NameStartChar`
/// production, plus `_` and `:`.
#[inline]
pub fn is_name_start_char(c: char) -> bool {
    c == '_' || c == ':' || unicode_ident::is_xid_start(c)
}

/// Check if a character may continue an XML name.
#[inline]
pub fn is_name_char(c: char) -> bool {
    c == '-' || c == '.' || c == ':' || unicode_ident::is_xid_continue(c)
}

/// XML whitespace (`S` production).
#[inline]
pub fn is_xml_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}
