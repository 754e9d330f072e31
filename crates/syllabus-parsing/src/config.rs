use regex::Regex;

use syllabus_core::config_file::FieldsConfig;

use crate::ParsingError;

/// Controls how a list of headings/markers is overridden from its defaults.
#[derive(Debug, Clone, Default)]
pub enum ListOverride<T> {
    /// Use the built-in defaults.
    #[default]
    Default,
    /// Completely replace the defaults with these values.
    Replace(Vec<T>),
    /// Append these values to the defaults.
    Extend(Vec<T>),
}

impl<T: Clone> ListOverride<T> {
    /// Resolve this override against the given defaults.
    pub fn resolve(&self, defaults: &[T]) -> Vec<T> {
        match self {
            ListOverride::Default => defaults.to_vec(),
            ListOverride::Replace(v) => v.clone(),
            ListOverride::Extend(v) => {
                let mut result = defaults.to_vec();
                result.extend(v.iter().cloned());
                result
            }
        }
    }

    fn push(&mut self, value: T) {
        match self {
            ListOverride::Extend(v) => v.push(value),
            _ => *self = ListOverride::Extend(vec![value]),
        }
    }
}

/// Configuration for the field table.
///
/// Regex fields are `Option<Regex>`; `None` means "use the built-in default".
/// Use [`ParsingConfigBuilder`] to construct with string patterns.
#[derive(Debug, Clone, Default)]
pub struct ParsingConfig {
    // ── office hours ──
    pub(crate) office_hours_markers: ListOverride<String>,

    // ── grading weights ──
    pub(crate) weight_markers: ListOverride<String>,
    pub(crate) grading_headings: ListOverride<String>,
    pub(crate) grading_boundaries: ListOverride<String>,

    // ── grading scale ──
    pub(crate) scale_markers: ListOverride<String>,
    pub(crate) scale_headings: ListOverride<String>,
    /// Line shape of a letter-grade cutoff row.
    pub(crate) grade_line_re: Option<Regex>,

    // ── late policy ──
    pub(crate) late_headings: ListOverride<String>,
    pub(crate) late_keywords: ListOverride<String>,

    // ── contact ──
    pub(crate) email_re: Option<Regex>,
}

/// Builder for [`ParsingConfig`].
///
/// Accepts string patterns that are compiled to `Regex` in [`build()`](Self::build).
/// Fails fast if any pattern is invalid.
#[derive(Debug, Clone, Default)]
pub struct ParsingConfigBuilder {
    office_hours_markers: ListOverride<String>,
    weight_markers: ListOverride<String>,
    grading_headings: ListOverride<String>,
    grading_boundaries: ListOverride<String>,
    scale_markers: ListOverride<String>,
    scale_headings: ListOverride<String>,
    grade_line_re: Option<String>,
    late_headings: ListOverride<String>,
    late_keywords: ListOverride<String>,
    email_re: Option<String>,
}

impl ParsingConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a builder from the `[fields]` section of a config file.
    /// Every list present in the file replaces the built-in list.
    pub fn from_fields_config(fields: &FieldsConfig) -> Self {
        let replace = |list: &Option<Vec<String>>| match list {
            Some(v) => ListOverride::Replace(v.clone()),
            None => ListOverride::Default,
        };

        Self {
            office_hours_markers: replace(&fields.office_hours_markers),
            weight_markers: replace(&fields.weight_markers),
            grading_headings: replace(&fields.grading_headings),
            grading_boundaries: replace(&fields.grading_boundaries),
            scale_markers: replace(&fields.scale_markers),
            scale_headings: replace(&fields.scale_headings),
            grade_line_re: fields.grade_line_pattern.clone(),
            late_headings: replace(&fields.late_headings),
            late_keywords: replace(&fields.late_keywords),
            email_re: fields.email_pattern.clone(),
        }
    }

    // ── Office hours ──

    pub fn set_office_hours_markers(mut self, markers: Vec<String>) -> Self {
        self.office_hours_markers = ListOverride::Replace(markers);
        self
    }

    pub fn add_office_hours_marker(mut self, marker: String) -> Self {
        self.office_hours_markers.push(marker);
        self
    }

    // ── Grading weights ──

    pub fn set_weight_markers(mut self, markers: Vec<String>) -> Self {
        self.weight_markers = ListOverride::Replace(markers);
        self
    }

    pub fn add_weight_marker(mut self, marker: String) -> Self {
        self.weight_markers.push(marker);
        self
    }

    pub fn set_grading_headings(mut self, headings: Vec<String>) -> Self {
        self.grading_headings = ListOverride::Replace(headings);
        self
    }

    pub fn set_grading_boundaries(mut self, boundaries: Vec<String>) -> Self {
        self.grading_boundaries = ListOverride::Replace(boundaries);
        self
    }

    pub fn add_grading_boundary(mut self, boundary: String) -> Self {
        self.grading_boundaries.push(boundary);
        self
    }

    // ── Grading scale ──

    pub fn set_scale_markers(mut self, markers: Vec<String>) -> Self {
        self.scale_markers = ListOverride::Replace(markers);
        self
    }

    pub fn set_scale_headings(mut self, headings: Vec<String>) -> Self {
        self.scale_headings = ListOverride::Replace(headings);
        self
    }

    pub fn grade_line_regex(mut self, pattern: &str) -> Self {
        self.grade_line_re = Some(pattern.to_string());
        self
    }

    // ── Late policy ──

    pub fn set_late_headings(mut self, headings: Vec<String>) -> Self {
        self.late_headings = ListOverride::Replace(headings);
        self
    }

    pub fn add_late_heading(mut self, heading: String) -> Self {
        self.late_headings.push(heading);
        self
    }

    pub fn set_late_keywords(mut self, keywords: Vec<String>) -> Self {
        self.late_keywords = ListOverride::Replace(keywords);
        self
    }

    pub fn add_late_keyword(mut self, keyword: String) -> Self {
        self.late_keywords.push(keyword);
        self
    }

    // ── Contact ──

    pub fn email_regex(mut self, pattern: &str) -> Self {
        self.email_re = Some(pattern.to_string());
        self
    }

    /// Compile all string patterns into regexes and produce a [`ParsingConfig`].
    pub fn build(self) -> Result<ParsingConfig, ParsingError> {
        let compile = |field: &'static str,
                       opt: Option<String>|
         -> Result<Option<Regex>, ParsingError> {
            opt.map(|p| Regex::new(&p))
                .transpose()
                .map_err(|source| ParsingError::InvalidPattern { field, source })
        };

        Ok(ParsingConfig {
            office_hours_markers: self.office_hours_markers,
            weight_markers: self.weight_markers,
            grading_headings: self.grading_headings,
            grading_boundaries: self.grading_boundaries,
            scale_markers: self.scale_markers,
            scale_headings: self.scale_headings,
            grade_line_re: compile("grade_line_pattern", self.grade_line_re)?,
            late_headings: self.late_headings,
            late_keywords: self.late_keywords,
            email_re: compile("email_pattern", self.email_re)?,
        })
    }
}
