use std::fmt;

use serde::{Deserialize, Serialize};

/// A single file's modification within a commit or pull-request diff.
///
/// Pull-request changes are deserialized from the Gitea file-diff
/// response, so parsing is lenient: unknown fields are ignored and
/// absent fields default. Push changes are derived locally from the
/// payload's per-commit path lists.
///
/// # Examples
///
/// ```
/// use magpie_core::{Change, ChangeStatus};
///
/// let change: Change =
///     serde_json::from_str(r#"{"new_path":"src/lib.rs","status":"added"}"#).unwrap();
/// assert_eq!(change.status, ChangeStatus::Added);
/// assert!(change.old_path.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Change {
    /// Path before the change.
    pub old_path: String,
    /// Path after the change. Filtering keys off this field.
    pub new_path: String,
    /// What happened to the file.
    pub status: ChangeStatus,
}

/// Modification status of a changed file.
///
/// # Examples
///
/// ```
/// use magpie_core::ChangeStatus;
///
/// let status = ChangeStatus::Deleted;
/// assert_eq!(serde_json::to_string(&status).unwrap(), "\"deleted\"");
/// assert_eq!(format!("{status}"), "deleted");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    /// New file.
    Added,
    /// Existing file modified in place.
    #[default]
    Modified,
    /// File removed.
    Deleted,
}

impl fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeStatus::Added => write!(f, "added"),
            ChangeStatus::Modified => write!(f, "modified"),
            ChangeStatus::Deleted => write!(f, "deleted"),
        }
    }
}
