//! Rendering of execution results.

use std::fmt::Write as _;

use anyhow::Result;
use quaytool_core::{DelegateKind, PrototypeList, RobotList};
use quaytool_reconcile::{BatchReport, Execution, ImageListing, Outcome};
use serde_json::Value;

/// Output format for command results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Prints an execution result to stdout.
pub fn print_execution(execution: &Execution, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", execution_text(execution)?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(execution)?),
    }
    Ok(())
}

/// Prints a batch report to stdout.
pub fn print_report(report: &BatchReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", report_text(report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
    }
    Ok(())
}

fn execution_text(execution: &Execution) -> Result<String> {
    let text = match execution {
        Execution::Report(report) => report_text(report),
        Execution::Robots(robots) => robots_text(robots),
        Execution::Prototypes(prototypes) => prototypes_text(prototypes),
        Execution::Images(images) => images_text(images)?,
        Execution::Document(document) => document_text(document)?,
    };
    Ok(text)
}

fn status_icon(outcome: &Outcome) -> &'static str {
    match outcome {
        Outcome::Applied { .. } => "✓",
        Outcome::AlreadyExists => "=",
        Outcome::Unchanged { .. } => "~",
        Outcome::Skipped { .. } => "-",
        Outcome::Failed { .. } => "✗",
    }
}

pub(crate) fn report_text(report: &BatchReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} (run {})", report.action, report.run_id);

    if report.is_empty() {
        out.push_str("  Nothing to do.\n");
        return out;
    }

    for item in &report.items {
        let icon = status_icon(&item.outcome);
        let _ = match &item.outcome {
            Outcome::Applied { .. } => writeln!(out, "  {icon} {}", item.target),
            Outcome::AlreadyExists => writeln!(out, "  {icon} {} (already exists)", item.target),
            Outcome::Unchanged { reason } => writeln!(out, "  {icon} {} ({reason})", item.target),
            Outcome::Skipped { reason } => writeln!(out, "  {icon} {} ({reason})", item.target),
            Outcome::Failed { message } => writeln!(out, "  {icon} {}: {message}", item.target),
        };
        if let Outcome::Applied {
            detail: Some(detail),
        } = &item.outcome
        {
            if let Ok(pretty) = serde_json::to_string_pretty(detail) {
                for line in pretty.lines() {
                    let _ = writeln!(out, "      {line}");
                }
            }
        }
    }

    let _ = writeln!(
        out,
        "Total: {} ({} applied, {} already present, {} unchanged, {} skipped, {} failed)",
        report.len(),
        report.applied,
        report.already_present,
        report.unchanged,
        report.skipped,
        report.failed
    );

    let skipped = report.skipped_targets();
    if !skipped.is_empty() {
        let names: Vec<_> = skipped.into_iter().collect();
        let _ = writeln!(out, "Skipped: {}", names.join(", "));
    }
    out
}

fn robots_text(robots: &RobotList) -> String {
    if robots.robots.is_empty() {
        return "No robots found.\n".to_string();
    }
    let mut out = String::new();
    for robot in &robots.robots {
        let _ = writeln!(out, "{}", robot.name);
        if let Some(Value::String(token)) = robot.details.get("token") {
            let _ = writeln!(out, "  Token: {token}");
        }
    }
    out
}

fn prototypes_text(prototypes: &PrototypeList) -> String {
    if prototypes.prototypes.is_empty() {
        return "No default permissions found.\n".to_string();
    }
    let mut out = String::new();
    for prototype in &prototypes.prototypes {
        let kind = match prototype.delegate.kind {
            DelegateKind::User => "user",
            DelegateKind::Team => "team",
        };
        let _ = writeln!(
            out,
            "{} -> {kind} {}",
            prototype.role, prototype.delegate.name
        );
    }
    out
}

fn images_text(images: &[ImageListing]) -> Result<String> {
    let mut out = String::new();
    for listing in images {
        let _ = writeln!(out, "{}:", listing.repository);
        let _ = writeln!(out, "{}", serde_json::to_string_pretty(&listing.images)?);
    }
    Ok(out)
}

fn document_text(document: &Value) -> Result<String> {
    Ok(format!("{}\n", serde_json::to_string_pretty(document)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quaytool_core::{Delegate, Prototype};
    use quaytool_reconcile::Action;
    use serde_json::json;

    #[test]
    fn test_report_text_lists_items_and_totals() {
        let mut report = BatchReport::with_run_id(Action::ExpireTag, "run-1");
        report.record("acme/a", Outcome::applied());
        report.record("acme/b", Outcome::skipped("tag not found"));
        report.record("acme/c", Outcome::failed("HTTP 500"));

        let text = report_text(&report);
        assert!(text.starts_with("expire-tag (run run-1)\n"));
        assert!(text.contains("  ✓ acme/a\n"));
        assert!(text.contains("  - acme/b (tag not found)\n"));
        assert!(text.contains("  ✗ acme/c: HTTP 500\n"));
        assert!(text.contains(
            "Total: 3 (1 applied, 0 already present, 0 unchanged, 1 skipped, 1 failed)"
        ));
        assert!(text.contains("Skipped: acme/b\n"));
    }

    #[test]
    fn test_unchanged_items_stay_off_the_skipped_line() {
        let mut report = BatchReport::with_run_id(Action::ExpireTag, "run-5");
        report.record("acme/a", Outcome::unchanged("negative expiration, nothing written"));

        let text = report_text(&report);
        assert!(text.contains("  ~ acme/a (negative expiration, nothing written)\n"));
        assert!(!text.contains("Skipped:"));
    }

    #[test]
    fn test_report_text_shows_detail() {
        let mut report = BatchReport::with_run_id(Action::CreateRobot, "run-2");
        report.record(
            "acme+ci",
            Outcome::Applied {
                detail: Some(json!({"token": "abc"})),
            },
        );

        let text = report_text(&report);
        assert!(text.contains("\"token\": \"abc\""));
    }

    #[test]
    fn test_empty_report() {
        let report = BatchReport::with_run_id(Action::SetVisibility, "run-3");
        assert!(report_text(&report).contains("Nothing to do."));
    }

    #[test]
    fn test_prototypes_text() {
        let prototypes = PrototypeList {
            prototypes: vec![Prototype::write(Delegate::team("devs"))],
        };
        assert_eq!(prototypes_text(&prototypes), "write -> team devs\n");
    }

    #[test]
    fn test_execution_json_is_untagged() {
        let report = BatchReport::with_run_id(Action::CreateTeam, "run-4");
        let value = serde_json::to_value(Execution::Report(report)).unwrap();
        assert_eq!(value["run_id"], "run-4");
        assert_eq!(value["action"], "create-team");
    }
}
