// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Weighted edit distance between a bad word and a candidate.

mod levenshtein;

pub use levenshtein::{edit_score, edit_score_limit};
