/// Returns `true` if `c` may appear in an XML 1.0 document.
///
/// XML 1.0 allows tab, LF, CR and everything from U+0020 upwards except the
/// surrogate block (which `char` already excludes) and U+FFFE/U+FFFF.
pub fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r') || (c >= '\u{20}' && c != '\u{FFFE}' && c != '\u{FFFF}')
}

/// Finds the first character in `s` that XML 1.0 cannot carry.
///
/// Escaping does not help for these: `&#0;` is just as invalid as a raw NUL,
/// so text containing them cannot be written into a feed at all.
///
/// # Examples
///
/// ```
/// use feedsmith::util::find_invalid_xml_char;
///
/// assert_eq!(find_invalid_xml_char("plain text\n"), None);
/// assert_eq!(find_invalid_xml_char("bell\u{7}"), Some('\u{7}'));
/// ```
pub fn find_invalid_xml_char(s: &str) -> Option<char> {
    // Fast path: everything above the C0 range except two BMP noncharacters is valid
    if s.bytes().all(|b| b >= 0x20 || b == 0x09 || b == 0x0a || b == 0x0d)
        && !s.contains(['\u{FFFE}', '\u{FFFF}'])
    {
        return None;
    }
    s.chars().find(|&c| !is_xml_char(c))
}
