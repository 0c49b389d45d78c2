//! Extension-name normalization and the loaded-name test.

use crate::config::{BUILTIN_BLOCK_PREFIX, METADATA_FILE_SUFFIX};

/// Strip the final file extension from a name.
///
/// Only a dot in the last path segment counts; a name without one is
/// returned unchanged.
pub fn strip_file_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if idx > 0 && !name[idx..].contains('/') => &name[..idx],
        _ => name,
    }
}

/// Metadata filename an extension would appear under when loaded.
pub fn metadata_key(name: &str) -> String {
    format!("{name}{METADATA_FILE_SUFFIX}")
}

/// Whether an extension with the given normalized name is active.
///
/// Best-effort: the extension counts as loaded when some metadata entry
/// contains its metadata filename as a substring. Names that are prefixes
/// of other extension names can therefore match spuriously.
pub fn is_loaded(name: &str, metadatas: &[String]) -> bool {
    let key = metadata_key(name);
    metadatas.iter().any(|entry| entry.contains(&key))
}

/// Whether a block id denotes a user-supplied block rather than one
/// shipped with the engine.
pub fn is_custom_block(block_id: &str) -> bool {
    !block_id.starts_with(BUILTIN_BLOCK_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_file_extension() {
        assert_eq!(strip_file_extension("Math_AB_Extension.zip"), "Math_AB_Extension");
        assert_eq!(strip_file_extension("archive.tar.gz"), "archive.tar");
        assert_eq!(strip_file_extension("NoExtension"), "NoExtension");
        assert_eq!(strip_file_extension(".hidden"), ".hidden");
        assert_eq!(strip_file_extension("dir.d/file"), "dir.d/file");
    }

    #[test]
    fn test_is_loaded_substring_semantics() {
        let metadatas = vec![
            "Math_AB_Extension.json".to_string(),
            "wrapped/Flow_Extension.json.bak".to_string(),
        ];
        assert!(is_loaded("Math_AB_Extension", &metadatas));
        // Matches inside a longer entry as well.
        assert!(is_loaded("Flow_Extension", &metadatas));
        assert!(!is_loaded("Other_Extension", &metadatas));
    }

    #[test]
    fn test_is_loaded_prefix_false_positive() {
        // Fragility of the substring test: a name whose metadata filename
        // appears inside a longer entry matches that entry too.
        let metadatas = vec!["Math_AB_Extension_Extra.json".to_string()];
        assert!(!is_loaded("Math_AB_Extension", &metadatas));
        let metadatas = vec!["Prefixed_Math_AB_Extension.json".to_string()];
        assert!(is_loaded("Math_AB_Extension", &metadatas));
    }

    #[test]
    fn test_is_custom_block() {
        assert!(!is_custom_block("apama.analyticsbuilder.blocks.Threshold"));
        assert!(is_custom_block("custom.MovingAverage"));
    }
}
