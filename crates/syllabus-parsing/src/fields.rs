//! Static field tables for each syllabus document variant.

use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ParsingError;
use crate::config::ParsingConfig;
use crate::section::{FieldRule, FieldSpec, LineFilter};

pub const OFFICE_HOURS: &str = "office_hours";
pub const GRADING_WEIGHTS: &str = "grading_weights";
pub const GRADING_SCALE: &str = "grading_scale";
pub const LATE_POLICY: &str = "late_policy";
pub const EMAIL: &str = "email";

pub(crate) const DEFAULT_OFFICE_HOURS_MARKERS: &[&str] = &["Office Hours:", "TA Info:"];

pub(crate) const DEFAULT_WEIGHT_MARKERS: &[&str] =
    &["Weight", "Grade Breakdown", "Grading Breakdown"];
pub(crate) const DEFAULT_GRADING_HEADINGS: &[&str] = &["Grading Policy", "Grading", "Evaluation"];
pub(crate) const DEFAULT_GRADING_BOUNDARIES: &[&str] =
    &["Grading Scale", "Late", "Attendance", "Course Schedule"];

pub(crate) const DEFAULT_SCALE_MARKERS: &[&str] = &["Grade Letter", "Letter Grade", "Grading Scale"];
pub(crate) const DEFAULT_SCALE_HEADINGS: &[&str] = &["Grades", "Grade Cutoffs"];

pub(crate) const DEFAULT_LATE_HEADINGS: &[&str] =
    &["Late Work", "Late Policy", "Homework", "Assignments"];
pub(crate) const DEFAULT_LATE_KEYWORDS: &[&str] = &["late", "penalty"];

/// Single capital A–F, optional `+`/`-`, whitespace, then a number: `A 94`, `B+ 87`.
static GRADE_LINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*[A-F][+-]?\s+\d").unwrap());

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());

/// Which field table a document is read with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentVariant {
    /// Office hours, grading weights, grading scale, late policy.
    #[default]
    Standard,
    /// Standard fields plus the instructor's email address.
    Contact,
}

impl FromStr for DocumentVariant {
    type Err = ParsingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(DocumentVariant::Standard),
            "contact" => Ok(DocumentVariant::Contact),
            other => Err(ParsingError::UnknownVariant(other.to_string())),
        }
    }
}

/// One named field and the rule that locates it.
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: String,
    pub rule: FieldRule,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, rule: FieldRule) -> Self {
        Self {
            name: name.into(),
            rule,
        }
    }
}

/// Ordered set of fields extracted from a document. Built once, never
/// mutated while extracting.
#[derive(Debug, Clone, Default)]
pub struct FieldTable {
    fields: Vec<FieldDef>,
}

impl FieldTable {
    pub fn new(fields: Vec<FieldDef>) -> Self {
        Self { fields }
    }

    /// Build the table for `variant` with default headings and markers.
    pub fn for_variant(variant: DocumentVariant) -> Self {
        Self::with_config(variant, &ParsingConfig::default())
    }

    /// Build the table for `variant`, applying config overrides.
    pub fn with_config(variant: DocumentVariant, config: &ParsingConfig) -> Self {
        let mut fields = vec![
            FieldDef::new(OFFICE_HOURS, office_hours_rule(config)),
            FieldDef::new(GRADING_WEIGHTS, grading_weights_rule(config)),
            FieldDef::new(GRADING_SCALE, grading_scale_rule(config)),
            FieldDef::new(LATE_POLICY, late_policy_rule(config)),
        ];
        if variant == DocumentVariant::Contact {
            fields.push(FieldDef::new(EMAIL, email_rule(config)));
        }
        Self { fields }
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}

fn defaults(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn office_hours_rule(config: &ParsingConfig) -> FieldRule {
    FieldRule::MarkerLine {
        markers: config
            .office_hours_markers
            .resolve(&defaults(DEFAULT_OFFICE_HOURS_MARKERS)),
    }
}

fn percent_filter() -> LineFilter {
    LineFilter::contains_any(vec!["%".to_string()], false)
}

fn grade_line_filter(config: &ParsingConfig) -> LineFilter {
    let re = config
        .grade_line_re
        .clone()
        .unwrap_or_else(|| GRADE_LINE_RE.clone());
    LineFilter::Matches(re)
}

fn grading_weights_rule(config: &ParsingConfig) -> FieldRule {
    let fallback = FieldRule::LineFilter {
        rule: Box::new(FieldRule::BoundaryBounded(
            FieldSpec::new(
                config
                    .grading_headings
                    .resolve(&defaults(DEFAULT_GRADING_HEADINGS)),
            )
            .with_boundaries(
                config
                    .grading_boundaries
                    .resolve(&defaults(DEFAULT_GRADING_BOUNDARIES)),
            ),
        )),
        filter: percent_filter(),
    };

    FieldRule::MarkerTable {
        markers: config
            .weight_markers
            .resolve(&defaults(DEFAULT_WEIGHT_MARKERS)),
        filter: percent_filter(),
        fallback: Some(Box::new(fallback)),
    }
}

fn grading_scale_rule(config: &ParsingConfig) -> FieldRule {
    let fallback = FieldRule::LineFilter {
        rule: Box::new(FieldRule::GenericHeading(FieldSpec::new(
            config
                .scale_headings
                .resolve(&defaults(DEFAULT_SCALE_HEADINGS)),
        ))),
        filter: grade_line_filter(config),
    };

    FieldRule::MarkerTable {
        markers: config
            .scale_markers
            .resolve(&defaults(DEFAULT_SCALE_MARKERS)),
        filter: grade_line_filter(config),
        fallback: Some(Box::new(fallback)),
    }
}

fn late_policy_rule(config: &ParsingConfig) -> FieldRule {
    FieldRule::LineFilter {
        rule: Box::new(FieldRule::GenericHeading(FieldSpec::new(
            config
                .late_headings
                .resolve(&defaults(DEFAULT_LATE_HEADINGS)),
        ))),
        filter: LineFilter::contains_any(
            config
                .late_keywords
                .resolve(&defaults(DEFAULT_LATE_KEYWORDS)),
            true,
        ),
    }
}

fn email_rule(config: &ParsingConfig) -> FieldRule {
    FieldRule::Pattern(config.email_re.clone().unwrap_or_else(|| EMAIL_RE.clone()))
}
