//! Upload metadata for externally-stored documents
//!
//! Receipts, forwarding letters, and justification files live in object
//! storage outside this system; domain records keep only a reference.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::identifiers::DocumentId;

/// A reference to one uploaded document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub id: DocumentId,
    /// Original file name as uploaded
    pub file_name: String,
    /// What the document is (receipt, forwarding letter, ...)
    pub label: String,
    /// Identity string of the uploading actor
    pub uploaded_by: String,
    pub uploaded_at: DateTime<Utc>,
}

impl DocumentRef {
    /// Creates a document reference, rejecting blank names
    pub fn new(
        file_name: impl Into<String>,
        label: impl Into<String>,
        uploaded_by: impl Into<String>,
    ) -> Result<Self, CoreError> {
        let file_name = file_name.into();
        let label = label.into();
        if file_name.trim().is_empty() {
            return Err(CoreError::validation("Document file name cannot be blank"));
        }
        if label.trim().is_empty() {
            return Err(CoreError::validation("Document label cannot be blank"));
        }
        Ok(Self {
            id: DocumentId::new(),
            file_name,
            label,
            uploaded_by: uploaded_by.into(),
            uploaded_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_ref_creation() {
        let doc = DocumentRef::new("receipt-march.pdf", "receipt", "nhis-admin-1").unwrap();

        assert_eq!(doc.file_name, "receipt-march.pdf");
        assert_eq!(doc.label, "receipt");
        assert_eq!(doc.uploaded_by, "nhis-admin-1");
    }

    #[test]
    fn test_blank_file_name_rejected() {
        let result = DocumentRef::new("   ", "receipt", "nhis-admin-1");
        assert!(result.is_err());
    }

    #[test]
    fn test_blank_label_rejected() {
        let result = DocumentRef::new("receipt.pdf", "", "nhis-admin-1");
        assert!(result.is_err());
    }
}
