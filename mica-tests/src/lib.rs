// Copyright 2025 Neil Henderson, Blue Tarp Media.
//
//! Integration tests for the Mica compiler backend live in `tests/it`; this crate has
//! no library code of its own.
