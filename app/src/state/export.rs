//! Export status shown next to the export button

use std::path::PathBuf;

/// Button label while idle
pub const IDLE_LABEL: &str = "Export PDF";

/// Button label while an export is pending
pub const BUSY_LABEL: &str = "Generating PDF...";

/// How the last export ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportStatus {
    Saved(PathBuf),
    Failed(String),
}

impl ExportStatus {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// One-line message for the status line
    pub fn message(&self) -> String {
        match self {
            Self::Saved(path) => format!("Saved to {}", path.display()),
            Self::Failed(reason) => format!("Export failed: {}", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let saved = ExportStatus::Saved(PathBuf::from("/home/me/Downloads/markdown-converted.pdf"));
        assert_eq!(
            saved.message(),
            "Saved to /home/me/Downloads/markdown-converted.pdf"
        );
        assert!(!saved.is_error());

        let failed = ExportStatus::Failed("IO error: denied".to_string());
        assert_eq!(failed.message(), "Export failed: IO error: denied");
        assert!(failed.is_error());
    }
}
