//! Field preparation for the report: transcript normalisation, truncation,
//! right-to-left detection and WinAnsi encoding for the standard faces.

use std::sync::OnceLock;

use regex::Regex;

pub const TRUNCATION_MARKER: &str = "... (truncated)";

const RTL_RANGES: &[(u32, u32)] = &[
    (0x0600, 0x06FF),
    (0x0750, 0x077F),
    (0x08A0, 0x08FF),
    (0xFB50, 0xFDFF),
    (0xFE70, 0xFEFF),
];

pub fn is_rtl_char(c: char) -> bool {
    let code = c as u32;
    RTL_RANGES
        .iter()
        .any(|&(lo, hi)| (lo..=hi).contains(&code))
}

/// True when any character falls in an Arabic-script block.
pub fn contains_rtl(text: &str) -> bool {
    text.chars().any(is_rtl_char)
}

/// ASCII replacements for the status symbols used in feedback reviews.
pub fn ascii_stand_in(c: char) -> Option<&'static str> {
    match c {
        '✅' | '✓' | '✔' => Some("[+]"),
        '❌' | '✗' | '✘' => Some("[x]"),
        '⚠' => Some("[!]"),
        _ => None,
    }
}

/// Drops invisible joiners and direction marks; turns control whitespace into spaces.
pub fn clean_char(c: char) -> Option<char> {
    match c {
        '\u{FE0F}' | '\u{200D}' | '\u{200E}' | '\u{200F}' => None,
        '\t' | '\n' | '\r' => Some(' '),
        c => Some(c),
    }
}

/// Cuts `text` to at most `max_chars` characters, appending the marker when cut.
pub fn truncate_field(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}{TRUNCATION_MARKER}", &text[..byte_idx]),
        None => text.to_string(),
    }
}

fn turn_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(assistant|user):\s*").expect("turn pattern is valid"))
}

/// Rewrites `assistant:` / `user:` turns as `Question:` / `Answer:`, one per line.
pub fn format_transcript(transcript: &str) -> String {
    let replaced = turn_regex().replace_all(transcript, |caps: &regex::Captures| {
        if caps[1].eq_ignore_ascii_case("assistant") {
            "\nQuestion: "
        } else {
            "\nAnswer: "
        }
    });
    replaced
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Encodes text for a standard Type1 font with `WinAnsiEncoding`.
///
/// Control characters become spaces, a few status symbols get ASCII
/// stand-ins, and anything else outside the code page becomes `?`.
pub fn to_win_ansi(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars().filter_map(clean_char) {
        if let Some(stand_in) = ascii_stand_in(c) {
            out.extend_from_slice(stand_in.as_bytes());
            continue;
        }
        match c {
            ' '..='~' => out.push(c as u8),
            '\u{00A0}'..='\u{00FF}' => out.push(c as u32 as u8),
            _ => out.push(cp1252_extra(c).unwrap_or(b'?')),
        }
    }
    out
}

fn cp1252_extra(c: char) -> Option<u8> {
    let byte = match c {
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '•' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => return None,
    };
    Some(byte)
}
