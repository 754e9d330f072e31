use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub fields: Option<FieldsConfig>,
    pub ocr: Option<OcrConfig>,
}

/// Overrides for the heading and marker lists of the field table.
///
/// Each list replaces the built-in list when present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldsConfig {
    pub office_hours_markers: Option<Vec<String>>,
    pub weight_markers: Option<Vec<String>>,
    pub scale_markers: Option<Vec<String>>,
    pub grading_headings: Option<Vec<String>>,
    pub grading_boundaries: Option<Vec<String>>,
    pub scale_headings: Option<Vec<String>>,
    pub late_headings: Option<Vec<String>>,
    pub late_keywords: Option<Vec<String>>,
    pub grade_line_pattern: Option<String>,
    pub email_pattern: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Tesseract language codes (e.g. "eng", "eng+fra").
    pub language: Option<String>,
    /// Rasterization resolution in dots per inch.
    pub dpi: Option<u32>,
}

/// Platform config directory path: `<config_dir>/syllabus/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("syllabus").join("config.toml"))
}

/// Load config by cascading CWD `.syllabus.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".syllabus.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparseable config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let base_fields = base.fields.unwrap_or_default();
    let overlay_fields = overlay.fields.unwrap_or_default();
    let base_ocr = base.ocr.unwrap_or_default();
    let overlay_ocr = overlay.ocr.unwrap_or_default();

    ConfigFile {
        fields: Some(FieldsConfig {
            office_hours_markers: overlay_fields
                .office_hours_markers
                .or(base_fields.office_hours_markers),
            weight_markers: overlay_fields.weight_markers.or(base_fields.weight_markers),
            scale_markers: overlay_fields.scale_markers.or(base_fields.scale_markers),
            grading_headings: overlay_fields
                .grading_headings
                .or(base_fields.grading_headings),
            grading_boundaries: overlay_fields
                .grading_boundaries
                .or(base_fields.grading_boundaries),
            scale_headings: overlay_fields.scale_headings.or(base_fields.scale_headings),
            late_headings: overlay_fields.late_headings.or(base_fields.late_headings),
            late_keywords: overlay_fields.late_keywords.or(base_fields.late_keywords),
            grade_line_pattern: overlay_fields
                .grade_line_pattern
                .or(base_fields.grade_line_pattern),
            email_pattern: overlay_fields.email_pattern.or(base_fields.email_pattern),
        }),
        ocr: Some(OcrConfig {
            language: overlay_ocr.language.or(base_ocr.language),
            dpi: overlay_ocr.dpi.or(base_ocr.dpi),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_config() {
        let config: ConfigFile = toml::from_str(
            r#"
            [fields]
            office_hours_markers = ["Office Hours:", "Student Hours:"]

            [ocr]
            dpi = 300
            "#,
        )
        .unwrap();

        let fields = config.fields.unwrap();
        assert_eq!(
            fields.office_hours_markers.unwrap(),
            vec!["Office Hours:".to_string(), "Student Hours:".to_string()]
        );
        assert!(fields.late_keywords.is_none());
        assert_eq!(config.ocr.unwrap().dpi, Some(300));
    }

    #[test]
    fn test_merge_overlay_wins() {
        let base = ConfigFile {
            fields: Some(FieldsConfig {
                late_keywords: Some(vec!["late".into()]),
                email_pattern: Some(r"\S+@\S+".into()),
                ..Default::default()
            }),
            ocr: Some(OcrConfig {
                language: Some("eng".into()),
                dpi: Some(150),
            }),
        };
        let overlay = ConfigFile {
            fields: Some(FieldsConfig {
                late_keywords: Some(vec!["tardy".into()]),
                ..Default::default()
            }),
            ocr: Some(OcrConfig {
                language: None,
                dpi: Some(300),
            }),
        };

        let merged = merge(base, overlay);
        let fields = merged.fields.unwrap();
        assert_eq!(fields.late_keywords, Some(vec!["tardy".to_string()]));
        assert_eq!(fields.email_pattern.as_deref(), Some(r"\S+@\S+"));
        let ocr = merged.ocr.unwrap();
        assert_eq!(ocr.language.as_deref(), Some("eng"));
        assert_eq!(ocr.dpi, Some(300));
    }

    #[test]
    fn test_load_from_path_missing_or_invalid() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_from_path(&dir.path().join("absent.toml")).is_none());

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "[fields\nnot toml").unwrap();
        assert!(load_from_path(&bad).is_none());

        let good = dir.path().join("good.toml");
        std::fs::write(&good, "[ocr]\nlanguage = \"deu\"\n").unwrap();
        let config = load_from_path(&good).unwrap();
        assert_eq!(config.ocr.unwrap().language.as_deref(), Some("deu"));
    }
}
