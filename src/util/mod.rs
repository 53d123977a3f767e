// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Small shared helpers: per-language character tables and case handling.

pub mod chars;

pub use chars::{CharTable, CaseFolder};
