use crate::error::{Result, SyncError};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use srcsync_api::TypeRef;
use std::collections::BTreeMap;
use std::path::Path;

/// Key of the return template used for reference types without their own entry.
pub const REFERENCE_FALLBACK: &str = "*";

/// What happens to interface synchronization actions computed for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    Disabled,
    #[default]
    Confirm,
    Automatic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SyncSettings {
    /// Global switch for interface synchronization.
    pub enabled: bool,
    /// Mode for files without an explicit mode.
    pub default_mode: SyncMode,
    /// Default return statement keyed by return type; `*` covers reference types.
    pub return_templates: BTreeMap<String, String>,
    /// Delay between the last document edit and the reparse it triggers.
    pub debounce_ms: u64,
    /// Number of parse results kept per open file.
    pub parse_cache_capacity: usize,
}

impl Default for SyncSettings {
    fn default() -> Self {
        let mut return_templates = BTreeMap::new();
        for (ty, stmt) in [
            ("void", ""),
            ("boolean", "return false;"),
            ("byte", "return 0;"),
            ("short", "return 0;"),
            ("int", "return 0;"),
            ("char", "return 0;"),
            ("long", "return 0L;"),
            ("float", "return 0.0f;"),
            ("double", "return 0.0;"),
            (REFERENCE_FALLBACK, "return null;"),
        ] {
            return_templates.insert(ty.to_string(), stmt.to_string());
        }
        Self {
            enabled: true,
            default_mode: SyncMode::default(),
            return_templates,
            debounce_ms: 500,
            parse_cache_capacity: 4,
        }
    }
}

impl SyncSettings {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text)
            .map_err(|e| SyncError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn json_schema() -> serde_json::Value {
        let schema = schemars::schema_for!(SyncSettings);
        serde_json::to_value(schema).unwrap_or_default()
    }

    /// The statement a synthesized method body should contain for `return_type`.
    pub fn return_statement(&self, return_type: &TypeRef) -> String {
        let key = return_type.to_source();
        if let Some(stmt) = self.return_templates.get(&key) {
            return stmt.clone();
        }
        if return_type.is_void() {
            return String::new();
        }
        if return_type.is_primitive() {
            return "return 0;".to_string();
        }
        self.return_templates
            .get(REFERENCE_FALLBACK)
            .cloned()
            .unwrap_or_else(|| "return null;".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_return_statements() {
        let settings = SyncSettings::default();
        assert_eq!(settings.return_statement(&TypeRef::void()), "");
        assert_eq!(settings.return_statement(&TypeRef::raw("int")), "return 0;");
        assert_eq!(settings.return_statement(&TypeRef::raw("long")), "return 0L;");
        assert_eq!(
            settings.return_statement(&TypeRef::raw("String")),
            "return null;"
        );
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "default_mode": "automatic", "return_templates": {{ "String": "return \"\";" }} }}"#
        )
        .unwrap();

        let settings = SyncSettings::load(file.path()).unwrap();
        assert_eq!(settings.default_mode, SyncMode::Automatic);
        assert!(settings.enabled);
        assert_eq!(settings.debounce_ms, 500);
        assert_eq!(
            settings.return_statement(&TypeRef::raw("String")),
            "return \"\";"
        );
        // An explicit map replaces the defaults entirely; the fallbacks still apply.
        assert_eq!(settings.return_statement(&TypeRef::raw("Object")), "return null;");
    }

    #[test]
    fn test_load_rejects_bad_mode() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "default_mode": "sometimes" }}"#).unwrap();
        assert!(matches!(
            SyncSettings::load(file.path()),
            Err(SyncError::Config(_))
        ));
    }

    #[test]
    fn test_schema_mentions_fields() {
        let schema = SyncSettings::json_schema().to_string();
        assert!(schema.contains("debounce_ms"));
        assert!(schema.contains("return_templates"));
    }
}
