//! Human-readable and machine-readable renderings of findings
//!
//! Pure functions over a slice of [`ValidationStageError`]; nothing here
//! performs I/O.

use serde_json::{json, Value};

use crate::validation::{has_errors, render_path, Severity, StageType, ValidationStageError};

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

fn location(finding: &ValidationStageError) -> String {
    if finding.path.is_empty() {
        String::new()
    } else {
        format!(" at '{}'", render_path(&finding.path))
    }
}

fn count(findings: &[ValidationStageError], severity: Severity) -> usize {
    findings.iter().filter(|f| f.severity == severity).count()
}

/// One paragraph per finding, with bullet-listed suggestions
pub fn format_errors(findings: &[ValidationStageError]) -> String {
    if findings.is_empty() {
        return "No errors".to_string();
    }

    findings
        .iter()
        .enumerate()
        .map(|(index, finding)| {
            let mut entry = format!(
                "{} {}{}: {}",
                finding.severity.label(),
                index + 1,
                location(finding),
                finding.message
            );

            if !finding.suggestions.is_empty() {
                entry.push_str("\nSuggestions:");
                for suggestion in &finding.suggestions {
                    entry.push_str(&format!("\n - {}", suggestion));
                }
            }

            if let Some(url) = &finding.documentation_url {
                entry.push_str(&format!("\nDocumentation: {}", url));
            }

            entry
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

// =============================================================================
// Detailed Report
// =============================================================================

fn count_summary(findings: &[ValidationStageError]) -> String {
    let mut summary = format!("Found {}:", plural(findings.len(), "issue"));

    let errors = count(findings, Severity::Error);
    let warnings = count(findings, Severity::Warning);
    let infos = count(findings, Severity::Info);

    if errors > 0 {
        summary.push_str(&format!("\n- {}", plural(errors, "error")));
    }
    if warnings > 0 {
        summary.push_str(&format!("\n- {}", plural(warnings, "warning")));
    }
    if infos > 0 {
        summary.push_str(&format!("\n- {}", plural(infos, "info message")));
    }

    summary
}

fn report_entry(finding: &ValidationStageError, index: usize) -> String {
    let mut entry = format!(
        "{} {}{}: {}\n",
        finding.severity.label(),
        index + 1,
        location(finding),
        finding.message
    );

    if let Some(value) = &finding.invalid_value {
        entry.push_str(&format!("Value: {}\n", value));
    }

    if !finding.suggestions.is_empty() {
        entry.push_str("Suggestions:\n");
        for suggestion in &finding.suggestions {
            entry.push_str(&format!("- {}\n", suggestion));
        }
    }

    if let Some(url) = &finding.documentation_url {
        entry.push_str(&format!("Documentation: {}\n", url));
    }

    for line in &finding.context {
        entry.push_str(&format!("Context: {}\n", line));
    }

    entry
}

fn stage_section(stage: StageType, findings: &[&ValidationStageError]) -> String {
    if findings.is_empty() {
        return String::new();
    }

    let title = stage.as_str().to_uppercase();
    let mut section = format!("{} Stage Errors\n{}\n\n", title, "-".repeat(title.len() + 13));

    for (index, finding) in findings.iter().enumerate() {
        section.push_str(&report_entry(finding, index));
        section.push('\n');
    }

    section
}

const COMMON_FIXES: &str = "Common Fixes\n------------\n\n\
1. Check that all required properties are defined\n\
2. Ensure property types match the schema requirements\n\
3. Validate nested component specifications\n\
4. Check for typos in property names\n";

/// Findings grouped by stage, with a count summary and generic tips
pub fn detailed_report(findings: &[ValidationStageError]) -> String {
    if findings.is_empty() {
        return "No errors found".to_string();
    }

    let mut report = String::from("Validation Error Report\n=====================\n\n");
    report.push_str(&count_summary(findings));
    report.push_str("\n\n");

    for stage in StageType::ALL {
        let in_stage: Vec<_> = findings.iter().filter(|f| f.stage == stage).collect();
        report.push_str(&stage_section(stage, &in_stage));
    }

    report.push_str(COMMON_FIXES);
    report
}

/// Counts plus serialized findings
pub fn summary_json(findings: &[ValidationStageError]) -> Value {
    json!({
        "valid": !has_errors(findings),
        "total": findings.len(),
        "errors": count(findings, Severity::Error),
        "warnings": count(findings, Severity::Warning),
        "info": count(findings, Severity::Info),
        "findings": findings,
    })
}
