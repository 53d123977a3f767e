// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Terminal output helpers: ANSI colors gated on TTY detection, and a
//! couple of layout utilities for the table views.

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";
pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Wrap `text` in a color when stdout is a terminal.
pub fn styled(color: &str, text: &str) -> String {
    if atty::is(atty::Stream::Stdout) {
        format!("{}{}{}", color, text, RESET)
    } else {
        text.to_string()
    }
}

pub fn pad_right(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - len))
    }
}

pub fn pad_left(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len >= width {
        s.to_string()
    } else {
        format!("{}{}", " ".repeat(width - len), s)
    }
}

/// "12.3 KB" style byte counts for the inspect view.
pub fn format_size(bytes: usize) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}

/// Section-ID names for the inspect view.
pub fn section_name(id: u8) -> &'static str {
    use spelt::binary::header::*;
    match id {
        SN_REGION => "REGION",
        SN_CHARFLAGS => "CHARFLAGS",
        SN_MIDWORD => "MIDWORD",
        SN_PREFCOND => "PREFCOND",
        SN_REP => "REP",
        SN_SAL => "SAL",
        SN_SOFO => "SOFO",
        SN_MAP => "MAP",
        SN_COMPOUND => "COMPOUND",
        SN_SYLLABLE => "SYLLABLE",
        SN_NOBREAK => "NOBREAK",
        SN_SUGFILE => "SUGFILE",
        SN_REPSAL => "REPSAL",
        SN_WORDS => "WORDS",
        SN_NOSPLITSUGS => "NOSPLITSUGS",
        SN_INFO => "INFO",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes() {
        assert_eq!(format_size(12), "12 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn padding() {
        assert_eq!(pad_right("ab", 4), "ab  ");
        assert_eq!(pad_left("ab", 4), "  ab");
        assert_eq!(pad_right("abcdef", 4), "abcdef");
    }
}
