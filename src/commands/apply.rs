//! `apply`: run a plan of independent changes against one stack.

use anyhow::{Result, bail};
use colored::Colorize;
use declarative::{ExecuteOptions, Outcome, Plan, ProgressCallback, execute};
use serde_json::json;

use super::{connect, print_json, read_json};
use crate::Context;
use crate::cli::ApplyArgs;
use crate::resource;
use crate::ui;

/// Prints one line per finished change.
struct ApplyProgress {
    quiet: bool,
    total: usize,
    done: usize,
}

impl ProgressCallback for ApplyProgress {
    fn on_batch_start(&mut self, count: usize) {
        self.total = count;
        if !self.quiet {
            ui::info(&format!("Applying {count} change(s)"));
        }
    }

    fn on_change_complete(&mut self, label: &str, outcome: &Outcome) {
        self.done += 1;
        if !self.quiet || !outcome.is_success() {
            ui::step(self.done, self.total, &format!("{label} {}", ui::outcome_label(outcome)));
        }
    }

    fn on_batch_complete(&mut self) {}
}

pub fn run(ctx: &Context, args: ApplyArgs) -> Result<()> {
    let plan: Plan = read_json(&args.plan)?;
    let plan = plan.filter_by_target(args.target.as_deref());

    if !ctx.json {
        ui::header("Applying Plan");
    }

    if plan.is_empty() {
        if !ctx.json {
            ui::info("Nothing to do");
        }
        return Ok(());
    }

    if args.dry_run {
        return preview(ctx, &plan);
    }

    let provider = resource::provider();
    for change in &plan.changes {
        provider.resource(&change.resource_type)?;
    }

    let acs = connect(&ctx.provider)?;
    let opts = ExecuteOptions {
        dry_run: false,
        jobs: usize::from(args.jobs.max(1)),
    };
    let mut progress = ApplyProgress {
        quiet: ctx.quiet || ctx.json,
        total: 0,
        done: 0,
    };
    let report = execute(&provider, &acs, &plan, &opts, &mut progress)?;

    if ctx.json {
        print_json(&json!({"results": report.results, "summary": report.summary}))?;
    } else {
        for result in report.results.iter().filter(|r| !r.diagnostics.is_empty()) {
            ui::section(&result.label);
            ui::diagnostics(&result.diagnostics);
        }
        ui::summary(&report.summary);
    }

    if !report.summary.is_success() {
        bail!("{} change(s) failed", report.summary.failed);
    }
    if !ctx.json {
        println!();
        ui::success("Apply complete!");
    }
    Ok(())
}

/// List what `apply` would do without connecting.
fn preview(ctx: &Context, plan: &Plan) -> Result<()> {
    if ctx.json {
        return print_json(plan);
    }

    ui::warn("Dry run - no changes will be made");
    println!();
    for change in &plan.changes {
        println!("  {} {}", change.action.to_string().cyan(), change.label());
    }
    Ok(())
}
