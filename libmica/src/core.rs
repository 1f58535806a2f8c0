// Copyright 2025-2026 Neil Henderson
//
//! The `core` module provides foundational types and functions used by both compiler passes.

mod internal_error;
mod register;

pub use register::RegisterDescriptor;
