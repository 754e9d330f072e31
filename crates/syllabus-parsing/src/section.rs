//! Marker/boundary section extraction.
//!
//! Every field is described by a [`FieldRule`] and resolved by the single
//! evaluator [`evaluate`]. Heading-based rules try each candidate heading
//! in order and accept the first one whose captured span is non-empty.

use once_cell::sync::Lazy;
use regex::Regex;

use syllabus_core::{ExtractionResult, FieldValue};

use crate::fields::FieldTable;

/// A blank line: two line feeds with only horizontal whitespace or `\r`
/// between them. Covers both `\n\n` and `\r\n\r\n`.
static BLANK_LINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t\r]*\n").unwrap());

/// Keeps or discards individual lines of a captured span.
#[derive(Debug, Clone)]
pub enum LineFilter {
    /// Keep lines containing any of `needles`.
    ContainsAny {
        needles: Vec<String>,
        case_insensitive: bool,
    },
    /// Keep lines matching the pattern.
    Matches(Regex),
}

impl LineFilter {
    /// Empty needles are dropped; they would match every line.
    pub fn contains_any(needles: Vec<String>, case_insensitive: bool) -> Self {
        let needles = needles
            .into_iter()
            .filter(|n| !n.is_empty())
            .map(|n| if case_insensitive { n.to_lowercase() } else { n })
            .collect();
        LineFilter::ContainsAny {
            needles,
            case_insensitive,
        }
    }

    pub fn keeps(&self, line: &str) -> bool {
        match self {
            LineFilter::ContainsAny {
                needles,
                case_insensitive,
            } => {
                if *case_insensitive {
                    let lower = line.to_lowercase();
                    needles.iter().any(|n| lower.contains(n.as_str()))
                } else {
                    needles.iter().any(|n| line.contains(n.as_str()))
                }
            }
            LineFilter::Matches(re) => re.is_match(line),
        }
    }

    /// Keep matching lines in original order, trimmed, joined with `\n`.
    pub fn apply(&self, span: &str) -> String {
        span.lines()
            .filter(|line| self.keeps(line))
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Declarative heading rule for one field.
#[derive(Debug, Clone, Default)]
pub struct FieldSpec {
    /// Tried in order; the first accepted match wins.
    pub headings: Vec<String>,
    /// The span ends at the earliest of these found after the heading.
    pub boundaries: Vec<String>,
    pub post_filter: Option<LineFilter>,
}

impl FieldSpec {
    pub fn new<S: Into<String>>(headings: impl IntoIterator<Item = S>) -> Self {
        Self {
            headings: headings.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_boundaries<S: Into<String>>(
        mut self,
        boundaries: impl IntoIterator<Item = S>,
    ) -> Self {
        self.boundaries = boundaries.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_post_filter(mut self, filter: LineFilter) -> Self {
        self.post_filter = Some(filter);
        self
    }
}

/// How a field is located in the text.
#[derive(Debug, Clone)]
pub enum FieldRule {
    /// Heading → next blank line or end of text.
    GenericHeading(FieldSpec),
    /// Heading → first boundary string; blank line or end of text if none occurs.
    BoundaryBounded(FieldSpec),
    /// Table rows following a marker line, restricted to lines passing
    /// `filter`. `fallback` runs only if no marker yields a row.
    MarkerTable {
        markers: Vec<String>,
        filter: LineFilter,
        fallback: Option<Box<FieldRule>>,
    },
    /// Inner rule narrowed line by line, per candidate heading.
    LineFilter {
        rule: Box<FieldRule>,
        filter: LineFilter,
    },
    /// Rest of the line after the first present marker.
    MarkerLine { markers: Vec<String> },
    /// First match anywhere in the text, independent of headings.
    Pattern(Regex),
}

/// A successful field resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    pub value: String,
    /// The heading, marker, or pattern that produced the value.
    pub via: String,
}

/// Resolve every field of `table` against `text`.
///
/// Fields that cannot be located resolve to [`FieldValue::NotFound`];
/// this never fails.
pub fn extract(text: &str, table: &FieldTable) -> ExtractionResult {
    let mut result = ExtractionResult::new();
    for field in table.fields() {
        let capture = evaluate(&field.rule, text);
        match &capture {
            Some(c) => tracing::debug!(field = %field.name, via = %c.via, "field found"),
            None => tracing::debug!(field = %field.name, "field not found"),
        }
        result.push(field.name.clone(), capture.map(|c| c.value).into());
    }
    result
}

/// Evaluate a single rule. `None` means every candidate was exhausted.
pub fn evaluate(rule: &FieldRule, text: &str) -> Option<Capture> {
    match rule {
        FieldRule::GenericHeading(spec) => first_heading_match(spec, false, None, text),
        FieldRule::BoundaryBounded(spec) => first_heading_match(spec, true, None, text),
        FieldRule::LineFilter { rule, filter } => match rule.as_ref() {
            FieldRule::GenericHeading(spec) => first_heading_match(spec, false, Some(filter), text),
            FieldRule::BoundaryBounded(spec) => {
                first_heading_match(spec, true, Some(filter), text)
            }
            other => evaluate(other, text).and_then(|c| {
                let value = filter.apply(&c.value);
                (!value.is_empty()).then_some(Capture { value, via: c.via })
            }),
        },
        FieldRule::MarkerTable {
            markers,
            filter,
            fallback,
        } => markers
            .iter()
            .find_map(|marker| scan_marker_table(text, marker, filter))
            .or_else(|| fallback.as_deref().and_then(|f| evaluate(f, text))),
        FieldRule::MarkerLine { markers } => markers
            .iter()
            .find_map(|marker| rest_of_line_after(text, marker)),
        FieldRule::Pattern(re) => re.find(text).map(|m| Capture {
            value: m.as_str().to_string(),
            via: re.as_str().to_string(),
        }),
    }
}

fn first_heading_match(
    spec: &FieldSpec,
    use_boundaries: bool,
    extra_filter: Option<&LineFilter>,
    text: &str,
) -> Option<Capture> {
    let boundaries: &[String] = if use_boundaries {
        &spec.boundaries
    } else {
        &[]
    };

    spec.headings.iter().find_map(|heading| {
        let mut value = capture_span(text, heading, boundaries)?;
        if let Some(filter) = &spec.post_filter {
            value = filter.apply(&value);
        }
        if let Some(filter) = extra_filter {
            value = filter.apply(&value);
        }
        (!value.is_empty()).then(|| Capture {
            value,
            via: heading.clone(),
        })
    })
}

/// Text after the first occurrence of `heading`, up to the earliest boundary
/// (or the next blank line / end of text when no boundary occurs), trimmed.
pub(crate) fn capture_span(text: &str, heading: &str, boundaries: &[String]) -> Option<String> {
    if heading.is_empty() {
        return None;
    }
    let start = text.find(heading)? + heading.len();
    let rest = &text[start..];

    let end = boundaries
        .iter()
        .filter(|b| !b.is_empty())
        .filter_map(|b| rest.find(b.as_str()))
        .min()
        .unwrap_or_else(|| blank_line_or_end(rest));

    Some(rest[..end].trim().to_string())
}

fn blank_line_or_end(text: &str) -> usize {
    BLANK_LINE_RE.find(text).map_or(text.len(), |m| m.start())
}

/// Rows of the table introduced by `marker`.
///
/// Scanning starts on the line after the marker. Blank lines directly
/// after the marker are skipped; past those, non-matching lines are skipped
/// and the next blank line ends the table, kept rows or not.
fn scan_marker_table(text: &str, marker: &str, filter: &LineFilter) -> Option<Capture> {
    if marker.is_empty() {
        return None;
    }
    let start = text.find(marker)? + marker.len();
    let after_marker = &text[start..];
    let body = match after_marker.find('\n') {
        Some(nl) => &after_marker[nl + 1..],
        None => "",
    };

    let mut rows = Vec::new();
    let mut in_table = false;
    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() {
            if in_table {
                break;
            }
            continue;
        }
        in_table = true;
        if filter.keeps(line) {
            rows.push(line);
        }
    }

    (!rows.is_empty()).then(|| Capture {
        value: rows.join("\n"),
        via: marker.to_string(),
    })
}

/// Text after `marker` up to the end of its line, trimmed.
fn rest_of_line_after(text: &str, marker: &str) -> Option<Capture> {
    if marker.is_empty() {
        return None;
    }
    let start = text.find(marker)? + marker.len();
    let rest = &text[start..];
    let end = rest.find(['\r', '\n']).unwrap_or(rest.len());
    let value = rest[..end].trim();

    (!value.is_empty()).then(|| Capture {
        value: value.to_string(),
        via: marker.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grade_line_filter() -> LineFilter {
        LineFilter::Matches(Regex::new(r"^\s*[A-F][+-]?\s+\d").unwrap())
    }

    #[test]
    fn test_capture_to_blank_line() {
        let text = "Attendance\nRequired for labs.\nTwo absences allowed.\n\nSchedule\nWeek 1";
        let span = capture_span(text, "Attendance", &[]).unwrap();
        assert_eq!(span, "Required for labs.\nTwo absences allowed.");
    }

    #[test]
    fn test_capture_to_crlf_blank_line() {
        let text = "Materials\r\nTextbook, 3rd ed.\r\n\r\nGrading\r\nExams";
        assert_eq!(
            capture_span(text, "Materials", &[]).unwrap(),
            "Textbook, 3rd ed."
        );
    }

    #[test]
    fn test_capture_to_end_of_text() {
        let text = "Contact\nRoom 204, Science Hall";
        assert_eq!(
            capture_span(text, "Contact", &[]).unwrap(),
            "Room 204, Science Hall"
        );
    }

    #[test]
    fn test_capture_stops_at_earliest_boundary() {
        let text = "Grading Homework 40% Exams 60% Late Work ... Attendance ...";
        let boundaries = vec!["Attendance".to_string(), "Late Work".to_string()];
        assert_eq!(
            capture_span(text, "Grading", &boundaries).unwrap(),
            "Homework 40% Exams 60%"
        );
    }

    #[test]
    fn test_boundary_missing_falls_back_to_blank_line() {
        let text = "Grading\nHomework 40%\nExams 60%\n\nUnrelated trailing section";
        let boundaries = vec!["Course Schedule".to_string()];
        assert_eq!(
            capture_span(text, "Grading", &boundaries).unwrap(),
            "Homework 40%\nExams 60%"
        );
    }

    #[test]
    fn test_boundary_before_heading_ignored() {
        let text = "Late Work intro\nGrading\nQuizzes 10%\n\nLate Work\n";
        let boundaries = vec!["Late Work".to_string()];
        assert_eq!(
            capture_span(text, "Grading", &boundaries).unwrap(),
            "Quizzes 10%"
        );
    }

    #[test]
    fn test_heading_fallback_chain() {
        let spec = FieldSpec::new(["Course Materials", "Textbook"]);
        let rule = FieldRule::GenericHeading(spec);
        let capture = evaluate(&rule, "Textbook\nIntro to Algorithms").unwrap();
        assert_eq!(capture.value, "Intro to Algorithms");
        assert_eq!(capture.via, "Textbook");
    }

    #[test]
    fn test_empty_span_moves_to_next_heading() {
        // First heading is present but captures nothing before the blank line
        let spec = FieldSpec::new(["Prerequisites", "Requirements"]);
        let rule = FieldRule::GenericHeading(spec);
        let text = "Prerequisites\n\nRequirements\nCS 101";
        assert_eq!(evaluate(&rule, text).unwrap().value, "CS 101");
    }

    #[test]
    fn test_all_headings_exhausted() {
        let rule = FieldRule::GenericHeading(FieldSpec::new(["Textbook"]));
        assert!(evaluate(&rule, "No matching section here").is_none());
    }

    #[test]
    fn test_post_filter_applied_per_candidate() {
        let filter = LineFilter::contains_any(vec!["late".into(), "penalty".into()], true);
        let spec = FieldSpec::new(["Homework", "Assignments"]).with_post_filter(filter);
        let rule = FieldRule::GenericHeading(spec);
        let text = "Homework\nWeekly problem sets.\n\nAssignments\nSubmit online.\nLate submissions lose 10% per day.";
        let capture = evaluate(&rule, text).unwrap();
        assert_eq!(capture.value, "Late submissions lose 10% per day.");
        assert_eq!(capture.via, "Assignments");
    }

    #[test]
    fn test_line_filter_rule_narrows_section() {
        let rule = FieldRule::LineFilter {
            rule: Box::new(FieldRule::GenericHeading(FieldSpec::new(["Homework"]))),
            filter: LineFilter::contains_any(vec!["late".into(), "penalty".into()], true),
        };
        let text = "Homework\nDue Fridays.\nLATE work is not accepted.\nA 5% PENALTY applies to resubmissions.\n\nExams";
        assert_eq!(
            evaluate(&rule, text).unwrap().value,
            "LATE work is not accepted.\nA 5% PENALTY applies to resubmissions."
        );
    }

    #[test]
    fn test_marker_table_keeps_only_grade_lines() {
        let rule = FieldRule::MarkerTable {
            markers: vec!["Grade Letter".into()],
            filter: grade_line_filter(),
            fallback: None,
        };
        let text = "Grade Letter  Minimum\nA 94\nrandom prose\nB+ 87\n\nOther";
        assert_eq!(evaluate(&rule, text).unwrap().value, "A 94\nB+ 87");
    }

    #[test]
    fn test_marker_table_skips_leading_blank_lines() {
        let rule = FieldRule::MarkerTable {
            markers: vec!["Weight".into()],
            filter: LineFilter::contains_any(vec!["%".into()], false),
            fallback: None,
        };
        let text = "Component Weight\n\nHomework 30%\nMidterm 30%\nFinal 40%\n\nTotal 100%";
        assert_eq!(
            evaluate(&rule, text).unwrap().value,
            "Homework 30%\nMidterm 30%\nFinal 40%"
        );
    }

    #[test]
    fn test_marker_table_precedes_fallback() {
        let fallback = FieldRule::GenericHeading(FieldSpec::new(["Grading"]));
        let rule = FieldRule::MarkerTable {
            markers: vec!["Weight".into()],
            filter: LineFilter::contains_any(vec!["%".into()], false),
            fallback: Some(Box::new(fallback)),
        };
        let text = "Grading\nSee table below.\n\nItem Weight\nLabs 50%\nExam 50%";
        assert_eq!(evaluate(&rule, text).unwrap().value, "Labs 50%\nExam 50%");
    }

    #[test]
    fn test_marker_table_falls_back_when_no_rows() {
        let fallback = FieldRule::GenericHeading(FieldSpec::new(["Grading"]));
        let rule = FieldRule::MarkerTable {
            markers: vec!["Weight".into()],
            filter: LineFilter::contains_any(vec!["%".into()], false),
            fallback: Some(Box::new(fallback)),
        };
        let text = "Grading\nParticipation counts.\n\nWeight\nno numbers here";
        let capture = evaluate(&rule, text).unwrap();
        assert_eq!(capture.value, "Participation counts.");
        assert_eq!(capture.via, "Grading");
    }

    #[test]
    fn test_marker_table_ends_at_blank_line_without_rows() {
        let rule = FieldRule::MarkerTable {
            markers: vec!["Weight".into()],
            filter: LineFilter::contains_any(vec!["%".into()], false),
            fallback: None,
        };
        let text = "Weight Room hours
Open daily.

Late Work
Late work loses 10% per day.";
        assert!(evaluate(&rule, text).is_none());
    }

    #[test]
    fn test_line_filter_over_marker_table() {
        let table = FieldRule::MarkerTable {
            markers: vec!["Weight".into()],
            filter: LineFilter::contains_any(vec!["%".into()], false),
            fallback: None,
        };
        let rule = FieldRule::LineFilter {
            rule: Box::new(table),
            filter: LineFilter::contains_any(vec!["exam".into()], true),
        };
        let text = "Category Weight
Homework 40%
Midterm Exam 25%
Final Exam 35%

Notes";
        let capture = evaluate(&rule, text).unwrap();
        assert_eq!(capture.value, "Midterm Exam 25%
Final Exam 35%");
        assert_eq!(capture.via, "Weight");
    }

    #[test]
    fn test_line_filter_over_pattern_rejects_filtered_out_match() {
        let rule = FieldRule::LineFilter {
            rule: Box::new(FieldRule::Pattern(Regex::new(r"\S+@\S+").unwrap())),
            filter: LineFilter::contains_any(vec![".edu".into()], false),
        };
        assert!(evaluate(&rule, "Contact: help@example.com").is_none());
        assert_eq!(
            evaluate(&rule, "Contact: ta@univ.edu").unwrap().value,
            "ta@univ.edu"
        );
    }

    #[test]
    fn test_contains_any_drops_empty_needles() {
        let filter = LineFilter::contains_any(vec!["".into(), "Late".into()], true);
        assert_eq!(
            filter.apply("Due Fridays.\nLATE work loses 10%.\nBring a pencil."),
            "LATE work loses 10%."
        );

        let only_empty = LineFilter::contains_any(vec!["".into()], false);
        assert!(!only_empty.keeps("anything at all"));
        assert_eq!(only_empty.apply("one\ntwo"), "");
    }

    #[test]
    fn test_marker_line_secondary_marker() {
        let rule = FieldRule::MarkerLine {
            markers: vec!["Office Hours:".into(), "TA Info:".into()],
        };
        let text = "Instructor: Dr. Smith\nTA Info: Tue 2-4pm\nRoom 12";
        assert_eq!(evaluate(&rule, text).unwrap().value, "Tue 2-4pm");
    }

    #[test]
    fn test_marker_line_primary_wins() {
        let rule = FieldRule::MarkerLine {
            markers: vec!["Office Hours:".into(), "TA Info:".into()],
        };
        let text = "TA Info: Tue 2-4pm\r\nOffice Hours: Mon 10-11am\r\nEmail below";
        assert_eq!(evaluate(&rule, text).unwrap().value, "Mon 10-11am");
    }

    #[test]
    fn test_pattern_first_match() {
        let rule = FieldRule::Pattern(
            Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap(),
        );
        let text = "Contact: jdoe@univ.edu or ta.help@univ.edu";
        assert_eq!(evaluate(&rule, text).unwrap().value, "jdoe@univ.edu");
    }

    #[test]
    fn test_line_filter_apply_preserves_order() {
        let filter = grade_line_filter();
        assert_eq!(filter.apply("A 94\nrandom prose\nB+ 87"), "A 94\nB+ 87");
        assert_eq!(filter.apply("Attendance 10\nAB 90"), "");
    }
}
