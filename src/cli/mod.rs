// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! CLI definitions for the spelt command-line interface.
//!
//! Five subcommands: `check` classifies words against a dictionary,
//! `suggest` proposes replacements, `dump` lists the dictionary words,
//! `inspect` prints the binary section map of a `.spl` file, and
//! `soundfold` shows the phonetic key of a word.

pub mod display;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "spelt",
    about = "Vim-compatible spell checker and .spl dictionary tool",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check words against a dictionary
    Check {
        /// Path to the .spl dictionary
        file: String,

        /// Words to check; reads lines from stdin when empty
        words: Vec<String>,

        /// Treat entries as whole lines and report every bad word
        #[arg(long)]
        lines: bool,

        /// Output JSON instead of the table
        #[arg(long)]
        json: bool,
    },

    /// Suggest replacements for a word
    Suggest {
        /// Path to the .spl dictionary
        file: String,

        /// The misspelled word
        word: String,

        /// Maximum number of suggestions
        #[arg(short, long, default_value = "15")]
        limit: usize,

        /// Suggestion strategy: best, fast or double
        #[arg(short, long, default_value = "best")]
        mode: String,

        /// Companion .sug file for sound-a-like suggestions
        #[arg(long)]
        sug: Option<String>,

        /// Output JSON instead of the table
        #[arg(long)]
        json: bool,
    },

    /// List all words in a dictionary
    Dump {
        /// Path to the .spl dictionary
        file: String,

        /// Only words starting with this prefix
        #[arg(short, long)]
        pattern: Option<String>,

        /// Include flag details per word
        #[arg(long)]
        flags: bool,
    },

    /// Show the binary structure of a .spl file
    Inspect {
        /// Path to the .spl file
        file: String,
    },

    /// Print the phonetic key of words (needs SAL or SOFO)
    Soundfold {
        /// Path to the .spl dictionary
        file: String,

        /// Words to fold
        words: Vec<String>,
    },
}
