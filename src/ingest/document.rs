//! Per-line search documents.

use serde::{Deserialize, Serialize};

use super::extractor::extract_function_name;

/// One indexed source line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeLine {
    /// Source location of the repository (not its short name).
    pub repository: String,

    /// Path of the file as it was walked.
    pub file_path: String,

    /// Line number, 1-based.
    pub line: u64,

    /// Raw line text without its line terminator.
    pub content: String,

    /// Enclosing function name, empty when none was detected.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub function: String,
}

impl CodeLine {
    /// Assemble the document for one line, detecting its function name.
    #[must_use]
    pub fn build(
        repository: impl Into<String>,
        file_path: impl Into<String>,
        line: u64,
        content: impl Into<String>,
    ) -> Self {
        let content = content.into();
        let function = extract_function_name(&content).to_string();
        Self {
            repository: repository.into(),
            file_path: file_path.into(),
            line,
            content,
            function,
        }
    }

    /// Whether a function name was detected.
    #[must_use]
    pub fn has_function(&self) -> bool {
        !self.function.is_empty()
    }
}
