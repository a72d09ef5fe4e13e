/// Characters after which a `/` starts a regex literal instead of a division.
pub const REGEX_PRECEDING_CHARS: &[u8] = b"[{(,;:?=|&!^~>%*/";

/// Keywords after which a `/` starts a regex literal.
pub const REGEX_PRECEDING_WORDS: &[&str] = &[
    "case",
    "default",
    "do",
    "else",
    "in",
    "instanceof",
    "prefix",
    "return",
    "typeof",
    "void",
    "yield",
];

/// Names that never resolve through the evaluation context.
pub const RESERVED_NAMES: &[&str] = &[
    "typeof",
    "true",
    "false",
    "null",
    "undefined",
    "in",
    "instanceof",
    "isFinite",
    "isNaN",
    "void",
    "NaN",
    "new",
    "Date",
    "RegExp",
    "Math",
];

/// Names passed through untouched: the context itself and the global scope.
pub const SPECIAL_NAMES: &[&str] = &["this", "global", "window"];

/// Marker character standing in for a hidden string or regex literal.
pub const LITERAL_MARKER: char = '\u{2057}';

pub const SYMBOLS_3: &[([char; 3], &str)] = &[
    (['=', '=', '='], "==="),
    (['!', '=', '='], "!=="),
    (['.', '.', '.'], "..."),
];

pub const SYMBOLS_2: &[([char; 2], &str)] = &[
    (['=', '='], "=="),
    (['!', '='], "!="),
    (['<', '='], "<="),
    (['>', '='], ">="),
    (['&', '&'], "&&"),
    (['|', '|'], "||"),
    (['?', '?'], "??"),
    (['?', '.'], "?."),
    (['=', '>'], "=>"),
    (['+', '+'], "++"),
    (['-', '-'], "--"),
];

pub const SYMBOLS_1: &[char] = &[
    '+', '-', '*', '/', '%', '<', '>', '!', '~', '?', ':', '.', ',', '(', ')', '[', ']', '{',
    '}', '&', '|', '^', '=', ';',
];

pub fn is_reserved_name(name: &str) -> bool {
    RESERVED_NAMES.contains(&name)
}

pub fn is_special_name(name: &str) -> bool {
    SPECIAL_NAMES.contains(&name)
}

pub fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || ch == '$'
}

pub fn is_ident_continue(ch: char) -> bool {
    is_ident_start(ch) || ch.is_ascii_digit()
}
