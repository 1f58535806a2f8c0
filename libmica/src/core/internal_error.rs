// Copyright 2025 Neil Henderson, Blue Tarp Media.
//
//! The `internal_error` module defines the macro used to report Internal Compiler Errors (ICE).

/// Generates an internal compiler error.
#[macro_export]
macro_rules! ICE {
    ($($arg:tt)*) => {
        std::panic!("Mica ICE: {}", format_args!($($arg)*))
    }
}
