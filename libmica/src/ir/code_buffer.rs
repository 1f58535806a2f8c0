// Copyright 2025 Neil Henderson, Blue Tarp Media.
//
//! The `code_buffer` module defines the [CodeBuffer]: the generator's output string
//! plus the counters and the string-literal pool behind it.

use std::collections::HashMap;

/// Accumulates the IR module text.
///
/// The buffer has two sections: the global section (string-literal constants) and the
/// code section (everything else, in emission order). [CodeBuffer::finish] joins them,
/// globals first. Register and label counters are module-wide, so every `%tN` and
/// every label stem is unique across the whole output.
#[derive(Debug, Default)]
pub struct CodeBuffer {
    globals: String,
    code: String,
    next_register: usize,
    next_label: usize,
    interned: HashMap<String, InternedString>,
}

/// A pooled string literal: its global identifier and its array size in bytes,
/// NUL terminator included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternedString {
    pub identifier: String,
    pub size: usize,
}

impl CodeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a fresh virtual register name (`%t0`, `%t1`, ...).
    pub fn fresh_register(&mut self) -> String {
        let register = format!("%t{}", self.next_register);
        self.next_register += 1;
        register
    }

    /// Returns a fresh label stem (`stem_0`, `stem_1`, ...). Related block labels are
    /// derived from one stem with dotted suffixes (`if_3.then`, `if_3.end`), so one
    /// draw names a whole construct.
    pub fn fresh_label(&mut self, stem: &str) -> String {
        let label = format!("{stem}_{}", self.next_label);
        self.next_label += 1;
        label
    }

    /// Appends one indented instruction line to the code section.
    pub fn emit(&mut self, instruction: impl AsRef<str>) {
        self.code.push('\t');
        self.code.push_str(instruction.as_ref());
        self.code.push('\n');
    }

    /// Appends one unindented line (prototypes, braces, declarations).
    pub fn emit_line(&mut self, line: impl AsRef<str>) {
        self.code.push_str(line.as_ref());
        self.code.push('\n');
    }

    /// Starts a basic block: emits `label:` at column zero.
    pub fn emit_block_label(&mut self, label: &str) {
        self.code.push_str(label);
        self.code.push_str(":\n");
    }

    /// Appends a blank separator line.
    pub fn emit_blank(&mut self) {
        self.code.push('\n');
    }

    /// Interns a string literal, returning its global identifier and array size.
    /// Identical literals share one global.
    pub fn intern_string(&mut self, value: &str) -> InternedString {
        if let Some(existing) = self.interned.get(value) {
            return existing.clone();
        }

        let identifier = format!("@.str{}", self.interned.len());
        let size = value.len() + 1;
        self.globals.push_str(&format!(
            "{identifier} = constant [{size} x i8] c\"{}\\00\"\n",
            escape_string(value)
        ));

        let interned = InternedString { identifier, size };
        self.interned.insert(value.to_string(), interned.clone());
        interned
    }

    /// Joins the global and code sections into the final module text.
    pub fn finish(self) -> String {
        if self.globals.is_empty() {
            self.code
        } else {
            format!("{}\n{}", self.globals, self.code)
        }
    }
}

/// Escapes a string for an IR `c"..."` constant: printable ASCII passes through,
/// everything else (quotes and backslashes included) becomes `\XX` hex.
fn escape_string(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'"' | b'\\' => escaped.push_str(&format!("\\{byte:02X}")),
            0x20..=0x7e => escaped.push(byte as char),
            _ => escaped.push_str(&format!("\\{byte:02X}")),
        }
    }
    escaped
}
