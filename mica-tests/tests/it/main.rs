// Copyright 2025 Neil Henderson, Blue Tarp Media.
//
//! Integration tests for the Mica compiler backend: whole programs go through
//! [libmica::compile] and the tests verify the diagnostics or the emitted module.

mod invalid_programs;
mod utils;
mod valid_programs;
