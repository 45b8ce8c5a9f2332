use magpie_core::{Change, ReviewConfig};

/// Keep only changes whose `new_path` ends with one of the configured
/// suffixes.
///
/// An empty suffix list means no filtering: the input comes back
/// unchanged. Matching is a plain case-sensitive suffix comparison, no
/// glob semantics. Order is preserved.
///
/// # Examples
///
/// ```
/// use magpie_core::{Change, ReviewConfig};
/// use magpie_review::filter::filter_changes;
///
/// let changes = vec![
///     Change { new_path: "a.py".into(), ..Default::default() },
///     Change { new_path: "b.go".into(), ..Default::default() },
/// ];
/// let config = ReviewConfig { supported_extensions: vec![".py".into()] };
///
/// let kept = filter_changes(changes, &config);
/// assert_eq!(kept.len(), 1);
/// assert_eq!(kept[0].new_path, "a.py");
/// ```
pub fn filter_changes(changes: Vec<Change>, config: &ReviewConfig) -> Vec<Change> {
    if config.supported_extensions.is_empty() {
        return changes;
    }
    changes
        .into_iter()
        .filter(|change| {
            config
                .supported_extensions
                .iter()
                .any(|ext| change.new_path.ends_with(ext.as_str()))
        })
        .collect()
}
