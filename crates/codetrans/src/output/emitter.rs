//! Indentation-aware text sink shared by the writers.

/// Accumulates output, indenting each line at its first character.
#[derive(Debug, Clone)]
pub struct CodeEmitter {
    output: String,
    unit: String,
    depth: usize,
    line_start: bool,
}

impl CodeEmitter {
    pub fn new(unit: impl Into<String>) -> Self {
        Self {
            output: String::new(),
            unit: unit.into(),
            depth: 0,
            line_start: true,
        }
    }

    pub fn append(&mut self, text: &str) {
        for ch in text.chars() {
            if ch == '\n' {
                self.output.push('\n');
                self.line_start = true;
                continue;
            }
            if self.line_start {
                for _ in 0..self.depth {
                    self.output.push_str(&self.unit);
                }
                self.line_start = false;
            }
            self.output.push(ch);
        }
    }

    pub fn indent(&mut self) {
        self.depth += 1;
    }

    pub fn unindent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn is_empty(&self) -> bool {
        self.output.is_empty()
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    /// Hand out the accumulated text and reset for the next unit.
    pub fn take(&mut self) -> String {
        self.depth = 0;
        self.line_start = true;
        std::mem::take(&mut self.output)
    }
}

impl Default for CodeEmitter {
    fn default() -> Self {
        Self::new("  ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indents_at_line_start_only() {
        let mut e = CodeEmitter::new("  ");
        e.append("a {\n");
        e.indent();
        e.append("b;\n\nc;");
        e.append(" d\n");
        e.unindent();
        e.append("}");
        assert_eq!(e.take(), "a {\n  b;\n\n  c; d\n}");
        assert!(e.is_empty());
    }

    #[test]
    fn unindent_saturates() {
        let mut e = CodeEmitter::new("\t");
        e.unindent();
        e.append("x");
        assert_eq!(e.output(), "x");
    }
}
