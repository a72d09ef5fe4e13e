use serde::Serialize;

/// Byte range inside a normalized expression fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: String,
    pub message: String,
    /// Normalized expression text the span points into.
    pub source: String,
    pub span: Span,
}

impl Diagnostic {
    pub fn new(code: &str, message: impl Into<String>, source: &str, span: Span) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            source: source.to_string(),
            span,
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "error[{}] {} at {}..{} in `{}`",
            self.code, self.message, self.span.start, self.span.end, self.source
        )
    }
}

/// Renders a diagnostic with a caret line under the offending range.
pub fn render_diagnostic(diagnostic: &Diagnostic) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "error[{}] {}\n",
        diagnostic.code, diagnostic.message
    ));
    output.push_str(&format!("  | {}\n", diagnostic.source));
    let start = char_column(&diagnostic.source, diagnostic.span.start);
    let end = char_column(&diagnostic.source, diagnostic.span.end).max(start + 1);
    output.push_str("  | ");
    output.push_str(&" ".repeat(start));
    output.push_str(&"^".repeat(end - start));
    output.trim_end().to_string()
}

fn char_column(source: &str, byte_offset: usize) -> usize {
    let mut column = 0usize;
    for (index, _) in source.char_indices() {
        if index >= byte_offset {
            break;
        }
        column += 1;
    }
    column
}

#[cfg(test)]
mod tests;
