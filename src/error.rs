// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Error taxonomy for dictionary loading and affix compilation.
//!
//! The split matters for callers: `Trunc`/`Format`/`Version` mean the file is
//! unusable, `Io` means the filesystem said no, `Rule` means one `.aff` line
//! was bad (usually recoverable), and `Resource` means a size limit tripped.
//! Lookup and suggestion never return errors; a structurally broken trie is
//! reported as a bad word instead (see `matcher`).

use std::error::Error;
use std::fmt;
use std::io;

/// Everything that can go wrong while loading a dictionary.
#[derive(Debug)]
pub enum SpellError {
    /// Unexpected end of file inside a section or tree.
    Trunc { path: String, what: &'static str },
    /// Structurally invalid file: bad magic, bad length, required-unknown
    /// section, inconsistent counts, duplicate sorted entries.
    Format { path: String, detail: String },
    /// File version is too old or too new for this reader.
    Version { path: String, version: u8 },
    /// Underlying file I/O failure.
    Io { path: String, source: io::Error },
    /// A size limit was exceeded; the load is abandoned but the engine
    /// keeps running with previously loaded languages.
    Resource { path: String, detail: String },
    /// Malformed `.aff` directive that could not be skipped.
    Rule { line: usize, detail: String },
}

impl SpellError {
    pub(crate) fn format(path: &str, detail: impl Into<String>) -> Self {
        SpellError::Format {
            path: path.to_string(),
            detail: detail.into(),
        }
    }

    pub(crate) fn trunc(path: &str, what: &'static str) -> Self {
        SpellError::Trunc {
            path: path.to_string(),
            what,
        }
    }

    /// The message a host should show the user; a load failure never
    /// panics, it only produces this string and the engine keeps running
    /// with the languages it already has.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SpellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpellError::Trunc { path, what } => {
                write!(f, "{}: truncated file while reading {}", path, what)
            }
            SpellError::Format { path, detail } => {
                write!(f, "{}: not a valid spell file ({})", path, detail)
            }
            SpellError::Version { path, version } => {
                write!(f, "{}: unsupported spell file version {}", path, version)
            }
            SpellError::Io { path, source } => write!(f, "{}: {}", path, source),
            SpellError::Resource { path, detail } => {
                write!(f, "{}: resource limit exceeded ({})", path, detail)
            }
            SpellError::Rule { line, detail } => {
                write!(f, "affix file line {}: {}", line, detail)
            }
        }
    }
}

impl Error for SpellError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SpellError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Attach a path to a raw I/O error, folding EOF into `Trunc`.
pub(crate) fn io_at(path: &str, what: &'static str, e: io::Error) -> SpellError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        SpellError::trunc(path, what)
    } else {
        SpellError::Io {
            path: path.to_string(),
            source: e,
        }
    }
}

pub type Result<T> = std::result::Result<T, SpellError>;
