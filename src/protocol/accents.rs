//! Accented letter transliteration
//!
//! The terminal has no precomposed accented glyphs. An accented letter is sent
//! as `0x19`, a diacritic selector, then the bare ASCII letter.

use super::SS2;

pub const GRAVE: u8 = 0x41;
pub const ACUTE: u8 = 0x42;
pub const CIRCUMFLEX: u8 = 0x43;
pub const DIAERESIS: u8 = 0x48;
pub const CEDILLA: u8 = 0x4B;

/// (letter, diacritic, base)
const TABLE: [(char, u8, u8); 9] = [
    ('à', GRAVE, b'a'),
    ('â', CIRCUMFLEX, b'a'),
    ('é', ACUTE, b'e'),
    ('è', GRAVE, b'e'),
    ('ê', CIRCUMFLEX, b'e'),
    ('ç', CEDILLA, b'c'),
    ('ô', CIRCUMFLEX, b'o'),
    ('û', CIRCUMFLEX, b'u'),
    ('ü', DIAERESIS, b'u'),
];

/// Escape sequence for an accented letter, if it is in the supported set.
pub fn lookup(ch: char) -> Option<[u8; 3]> {
    TABLE
        .iter()
        .find(|(c, _, _)| *c == ch)
        .map(|&(_, diacritic, base)| [SS2, diacritic, base])
}

/// Reverse mapping used when rendering received output locally.
pub fn compose(diacritic: u8, base: u8) -> Option<char> {
    TABLE
        .iter()
        .find(|&&(_, d, b)| d == diacritic && b == base)
        .map(|&(c, _, _)| c)
}

/// Append the wire form of `ch` to `out`.
///
/// Latin-1 characters outside the table go out as their single byte;
/// anything above U+00FF cannot be sent and becomes `?`.
pub fn encode_char(ch: char, out: &mut Vec<u8>) {
    if let Some(seq) = lookup(ch) {
        out.extend_from_slice(&seq);
    } else if (ch as u32) <= 0xFF {
        out.push(ch as u32 as u8);
    } else {
        out.push(b'?');
    }
}
