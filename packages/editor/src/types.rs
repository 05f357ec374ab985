//! Wire types shared with the editing UI (camelCase JSON)

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditKind {
    /// Replace the class list
    Style,
    /// Replace the literal text of an element
    Content,
    /// Replace any named attribute literal
    Attribute,
}

impl fmt::Display for EditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditKind::Style => write!(f, "style"),
            EditKind::Content => write!(f, "content"),
            EditKind::Attribute => write!(f, "attribute"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRequest {
    /// Absolute, or relative to the root directory
    pub file_path: String,
    /// 1-based
    pub line: usize,
    /// 0-based, in characters
    pub column: usize,
    pub new_value: String,
    pub kind: EditKind,
    /// Value the UI believed was there; advisory only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_value: Option<String>,
    /// Required for `attribute` edits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_name: Option<String>,
}

impl EditRequest {
    pub fn new(
        file_path: impl Into<String>,
        line: usize,
        column: usize,
        kind: EditKind,
        new_value: impl Into<String>,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            line,
            column,
            new_value: new_value.into(),
            kind,
            original_value: None,
            attribute_name: None,
        }
    }

    pub fn style(file_path: impl Into<String>, line: usize, column: usize, classes: impl Into<String>) -> Self {
        Self::new(file_path, line, column, EditKind::Style, classes)
    }

    pub fn content(file_path: impl Into<String>, line: usize, column: usize, text: impl Into<String>) -> Self {
        Self::new(file_path, line, column, EditKind::Content, text)
    }

    pub fn attribute(
        file_path: impl Into<String>,
        line: usize,
        column: usize,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        let mut request = Self::new(file_path, line, column, EditKind::Attribute, value);
        request.attribute_name = Some(name.into());
        request
    }

    pub fn with_original_value(mut self, value: impl Into<String>) -> Self {
        self.original_value = Some(value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditResult {
    pub success: bool,
    pub message: String,
    pub file_path: String,
    pub kind: EditKind,
}

impl EditResult {
    pub fn succeeded(request: &EditRequest, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            file_path: request.file_path.clone(),
            kind: request.kind,
        }
    }

    pub fn failed(request: &EditRequest, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            file_path: request.file_path.clone(),
            kind: request.kind,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    pub results: Vec<EditResult>,
    pub summary: BatchSummary,
}

impl BatchResult {
    pub fn from_results(results: Vec<EditResult>) -> Self {
        let success = results.iter().filter(|r| r.success).count();
        let summary = BatchSummary {
            total: results.len(),
            success,
            failed: results.len() - success,
        };
        Self { results, summary }
    }

    pub fn all_succeeded(&self) -> bool {
        self.summary.failed == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_format() {
        let json = r#"{
            "filePath": "src/App.tsx",
            "line": 12,
            "column": 4,
            "newValue": "p-4 text-lg",
            "kind": "style",
            "originalValue": "p-2"
        }"#;
        let request: EditRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.kind, EditKind::Style);
        assert_eq!(request.original_value.as_deref(), Some("p-2"));
        assert_eq!(request.attribute_name, None);

        let back = serde_json::to_value(&request).unwrap();
        assert_eq!(back["filePath"], "src/App.tsx");
        assert!(back.get("attributeName").is_none());
    }

    #[test]
    fn test_summary_counts() {
        let request = EditRequest::content("a.jsx", 1, 0, "x");
        let result = BatchResult::from_results(vec![
            EditResult::succeeded(&request, "ok"),
            EditResult::failed(&request, "no"),
            EditResult::succeeded(&request, "ok"),
        ]);

        assert_eq!(
            result.summary,
            BatchSummary {
                total: 3,
                success: 2,
                failed: 1
            }
        );
        assert!(!result.all_succeeded());
    }
}
