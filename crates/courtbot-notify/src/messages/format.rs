//! Text helpers shared by the catalog templates.

use chrono::{DateTime, Datelike, TimeZone};

/// Whitespace as SMS templates and court records use it: Unicode
/// `White_Space` plus the byte-order mark, minus NEL (U+0085).
fn is_space(c: char) -> bool {
    c == '\u{FEFF}' || (c.is_whitespace() && c != '\u{85}')
}

/// Collapse every run of two or more whitespace characters into one space.
///
/// Templates are written across indented lines; this keeps the rendered
/// SMS short. A single whitespace character is left untouched.
pub fn normalize_spaces(msg: &str) -> String {
    let mut out = String::with_capacity(msg.len());
    let mut chars = msg.chars().peekable();
    while let Some(c) = chars.next() {
        if !is_space(c) {
            out.push(c);
            continue;
        }
        if chars.peek().is_some_and(|&next| is_space(next)) {
            while chars.peek().is_some_and(|&next| is_space(next)) {
                chars.next();
            }
            out.push(' ');
        } else {
            out.push(c);
        }
    }
    out
}

/// Turn `FIRST LAST` into `First Last`.
///
/// A word starts at an ASCII letter, digit, or underscore and runs to the
/// next whitespace; its first character is upper-cased and the rest
/// lower-cased as a whole. Punctuation in front of a word is left alone.
pub fn cleanup_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut rest = name.trim_matches(is_space);
    while let Some(c) = rest.chars().next() {
        if c.is_ascii_alphanumeric() || c == '_' {
            let end = rest.find(is_space).unwrap_or(rest.len());
            let (word, after) = rest.split_at(end);
            let (first, tail) = word.split_at(c.len_utf8());
            out.push_str(&first.to_ascii_uppercase());
            // Lower-casing the whole tail keeps context rules like final sigma.
            out.push_str(&tail.to_lowercase());
            rest = after;
        } else {
            out.push(c);
            rest = rest.split_at(c.len_utf8()).1;
        }
    }
    out
}

/// `Mon, Oct 19th`
pub fn long_date<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let day = date.day();
    format!("{}{}{}", date.format("%a, %b "), day, ordinal_suffix(day))
}

/// `9:05 AM`
pub fn clock_time<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.format("%-I:%M %p").to_string()
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}
