use colored::Colorize;
use declarative::{ChangeResult, Diagnostics, ExecuteSummary, Outcome, Severity};

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a section header
pub fn section(title: &str) {
    println!();
    println!("{}", title.cyan().bold());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Print a step indicator
pub fn step(num: usize, total: usize, msg: &str) {
    println!("{} {}", format!("[{num}/{total}]").blue().bold(), msg);
}

// ============================================================================
// Outcomes
// ============================================================================

/// Short colored label for an outcome
pub fn outcome_label(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Created => "created".green().to_string(),
        Outcome::Read => "read".normal().to_string(),
        Outcome::Updated => "updated".yellow().to_string(),
        Outcome::Replaced => "replaced".yellow().bold().to_string(),
        Outcome::Deleted => "deleted".red().to_string(),
        Outcome::Imported => "imported".green().to_string(),
        Outcome::Gone => "gone".dimmed().to_string(),
        Outcome::Failed { .. } => "failed".red().bold().to_string(),
        Outcome::Skipped { reason } => format!("skipped ({reason})").dimmed().to_string(),
    }
}

pub fn diagnostics(diags: &Diagnostics) {
    for diag in diags.iter() {
        match diag.severity {
            Severity::Error => error(&diag.to_string()),
            Severity::Warning => warn(&diag.to_string()),
        }
    }
}

/// Print one change result with its state, sensitive values already masked
pub fn change_result(result: &ChangeResult) {
    match &result.outcome {
        Outcome::Failed { .. } => error(&format!("{} {}", result.label, outcome_label(&result.outcome))),
        outcome => success(&format!("{} {}", result.label, outcome_label(outcome))),
    }

    if let Some(state) = &result.state {
        kv("id", &state.id);
        for (key, value) in &state.attributes {
            let shown = value.as_str().map_or_else(|| value.to_string(), ToString::to_string);
            kv(key, &shown);
        }
    }
    diagnostics(&result.diagnostics);
}

pub fn summary(summary: &ExecuteSummary) {
    section("Summary");
    println!(
        "  {} created, {} updated, {} replaced, {} deleted",
        summary.created.to_string().green(),
        summary.updated.to_string().yellow(),
        summary.replaced.to_string().yellow(),
        summary.deleted.to_string().red()
    );
    if summary.read + summary.gone + summary.skipped > 0 {
        dim(&format!(
            "{} read, {} gone, {} skipped",
            summary.read, summary.gone, summary.skipped
        ));
    }
    if summary.failed > 0 {
        error(&format!("{} failed", summary.failed));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_label_mentions_reason() {
        colored::control::set_override(false);
        let label = outcome_label(&Outcome::Skipped {
            reason: "Dry run".to_string(),
        });
        assert_eq!(label, "skipped (Dry run)");
        assert_eq!(outcome_label(&Outcome::Gone), "gone");
    }
}
