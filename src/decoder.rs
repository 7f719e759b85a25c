//! Provider token decoder.
//!
//! Source URLs on the metadata endpoint are published as `--` followed by
//! two-character codes, each standing for one character of a URL path. The
//! table below is the upstream substitution alphabet and must stay
//! byte-for-byte identical to it.
//!
//! Codes missing from the table are dropped rather than failing the whole
//! token. This keeps older tokens decodable, but a dropped code silently
//! shortens the path, so callers must tolerate truncated output.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

/// Prefix every published token carries.
pub const TOKEN_PREFIX: &str = "--";

const ALPHABET: [(&str, char); 84] = [
    ("79", 'A'), ("7a", 'B'), ("7b", 'C'), ("7c", 'D'), ("7d", 'E'), ("7e", 'F'),
    ("7f", 'G'), ("70", 'H'), ("71", 'I'), ("72", 'J'), ("73", 'K'), ("74", 'L'),
    ("75", 'M'), ("76", 'N'), ("77", 'O'), ("68", 'P'), ("69", 'Q'), ("6a", 'R'),
    ("6b", 'S'), ("6c", 'T'), ("6d", 'U'), ("6e", 'V'), ("6f", 'W'), ("60", 'X'),
    ("61", 'Y'), ("62", 'Z'), ("59", 'a'), ("5a", 'b'), ("5b", 'c'), ("5c", 'd'),
    ("5d", 'e'), ("5e", 'f'), ("5f", 'g'), ("50", 'h'), ("51", 'i'), ("52", 'j'),
    ("53", 'k'), ("54", 'l'), ("55", 'm'), ("56", 'n'), ("57", 'o'), ("48", 'p'),
    ("49", 'q'), ("4a", 'r'), ("4b", 's'), ("4c", 't'), ("4d", 'u'), ("4e", 'v'),
    ("4f", 'w'), ("40", 'x'), ("41", 'y'), ("42", 'z'), ("08", '0'), ("09", '1'),
    ("0a", '2'), ("0b", '3'), ("0c", '4'), ("0d", '5'), ("0e", '6'), ("0f", '7'),
    ("00", '8'), ("01", '9'), ("15", '-'), ("16", '.'), ("67", '_'), ("46", '~'),
    ("02", ':'), ("17", '/'), ("07", '?'), ("1b", '#'), ("63", '['), ("65", ']'),
    ("78", '@'), ("19", '!'), ("1c", '$'), ("1e", '&'), ("10", '('), ("11", ')'),
    ("12", '*'), ("13", '+'), ("14", ','), ("03", ';'), ("05", '='), ("1d", '%'),
];

static TABLE: LazyLock<HashMap<&'static str, char>> =
    LazyLock::new(|| ALPHABET.iter().copied().collect());

// `/clock` as a whole path segment: end of string, query or fragment follows.
static CLOCK_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/clock([?#]|$)").expect("valid clock regex"));

/// Look up a single two-character code.
pub fn lookup(pair: &str) -> Option<char> {
    TABLE.get(pair).copied()
}

/// Encode a plain path into a token (with prefix).
///
/// Returns `None` if `plain` contains a character outside the alphabet.
pub fn encode(plain: &str) -> Option<String> {
    let mut token = String::with_capacity(TOKEN_PREFIX.len() + plain.len() * 2);
    token.push_str(TOKEN_PREFIX);
    for c in plain.chars() {
        let (code, _) = ALPHABET.iter().find(|(_, ch)| *ch == c)?;
        token.push_str(code);
    }
    Some(token)
}

/// Decode an obfuscated provider token into a URL path.
///
/// Returns an empty string for an empty token or one whose length (after
/// the `--` prefix) is odd.
pub fn decode(token: &str) -> String {
    let body = token.strip_prefix(TOKEN_PREFIX).unwrap_or(token);
    if body.len() % 2 != 0 {
        debug!(len = body.len(), "odd token length, refusing to decode");
        return String::new();
    }

    let mut out = String::with_capacity(body.len() / 2);
    for chunk in body.as_bytes().chunks(2) {
        let decoded = std::str::from_utf8(chunk).ok().and_then(lookup);
        match decoded {
            Some(c) => out.push(c),
            None => debug!(pair = %String::from_utf8_lossy(chunk), "skipping unknown code"),
        }
    }

    CLOCK_SEGMENT.replace_all(&out, "/clock.json$1").into_owned()
}
