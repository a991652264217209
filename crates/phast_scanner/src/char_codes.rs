//! Character classification helpers used by the scanner.

use unicode_xid::UnicodeXID;

pub const OPEN_TAG: &[u8] = b"<?php";
pub const CLOSE_TAG: &[u8] = b"?>";

#[inline]
pub fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

#[inline]
pub fn is_digit(b: u8) -> bool {
    b.is_ascii_digit()
}

#[inline]
pub fn is_hex_digit(b: u8) -> bool {
    b.is_ascii_hexdigit()
}

#[inline]
pub fn is_octal_digit(b: u8) -> bool {
    matches!(b, b'0'..=b'7')
}

/// Identifier start: `_`, ASCII letters, or any non-ASCII XID_Start character.
#[inline]
pub fn is_identifier_start(ch: char) -> bool {
    ch == '_' || ch.is_ascii_alphabetic() || (!ch.is_ascii() && UnicodeXID::is_xid_start(ch))
}

#[inline]
pub fn is_identifier_part(ch: char) -> bool {
    ch == '_' || ch.is_ascii_alphanumeric() || (!ch.is_ascii() && UnicodeXID::is_xid_continue(ch))
}
