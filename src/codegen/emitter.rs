//! Emission buffer
//!
//! Run-scoped accumulator for generated declarations and diagnostics.
//! Appends are order-preserving and do no I/O; [`Emitter::finish`]
//! consumes the buffer, so it can only be finalized once.

use crate::diagnostics::Diagnostics;

const INDENT: &str = "  ";

#[derive(Debug, Default)]
pub struct Emitter {
    code: String,
    depth: usize,
    diagnostics: Diagnostics,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one line at the current indentation
    pub fn line(&mut self, text: impl AsRef<str>) -> &mut Self {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..self.depth {
                self.code.push_str(INDENT);
            }
            self.code.push_str(text);
        }
        self.code.push('\n');
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.line("")
    }

    /// Append `header {` and indent what follows
    pub fn open(&mut self, header: impl AsRef<str>) -> &mut Self {
        let header = header.as_ref();
        if header.is_empty() {
            self.line("{");
        } else {
            self.line(format!("{} {{", header));
        }
        self.indent()
    }

    pub fn indent(&mut self) -> &mut Self {
        self.depth += 1;
        self
    }

    pub fn dedent(&mut self) -> &mut Self {
        self.depth = self.depth.saturating_sub(1);
        self
    }

    /// Dedent and append the closing brace followed by `suffix`
    pub fn close(&mut self, suffix: &str) -> &mut Self {
        self.dedent();
        self.line(format!("}}{}", suffix))
    }

    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    /// Finalize into the artifact text, echoing every diagnostic as a
    /// trailing comment.
    pub fn finish(mut self) -> (String, Diagnostics) {
        if !self.diagnostics.is_empty() {
            self.depth = 0;
            self.blank();
            self.line("// Errors:");
            let messages = self.diagnostics.messages();
            for message in messages {
                self.line(format!("// {}", message));
            }
        }
        (self.code, self.diagnostics)
    }
}
