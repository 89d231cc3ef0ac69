//! Single-resource lifecycle commands: create, read, update, delete, import.

use anyhow::{Result, bail};
use declarative::{Attributes, Change, ChangeResult, Outcome, Provider, State};
use std::path::Path;

use super::{connect, print_json, read_json, write_json};
use crate::Context;
use crate::cli::{CreateArgs, StateArgs, UpdateArgs};
use crate::context::AcsContext;
use crate::resource;
use crate::ui;

pub fn create(ctx: &Context, args: CreateArgs) -> Result<()> {
    let config: Attributes = read_json(&args.config)?;
    run(ctx, &Change::create(args.type_name, config), args.out.as_deref())
}

pub fn read(ctx: &Context, args: StateArgs) -> Result<()> {
    let prior: State = read_json(&args.state)?;
    run(ctx, &Change::read(args.type_name, prior), args.out.as_deref())
}

pub fn update(ctx: &Context, args: UpdateArgs) -> Result<()> {
    let prior: State = read_json(&args.state)?;
    let config: Attributes = read_json(&args.config)?;
    run(ctx, &Change::update(args.type_name, prior, config), args.out.as_deref())
}

pub fn delete(ctx: &Context, args: StateArgs) -> Result<()> {
    let prior: State = read_json(&args.state)?;
    run(ctx, &Change::delete(args.type_name, prior), args.out.as_deref())
}

pub fn import(ctx: &Context, type_name: String, id: String, out: Option<&Path>) -> Result<()> {
    run(ctx, &Change::import(type_name, id), out)
}

fn run(ctx: &Context, change: &Change, out: Option<&Path>) -> Result<()> {
    let provider = resource::provider();
    // Fail on an unknown type before touching the network.
    provider.resource(&change.resource_type)?;

    let acs = connect(&ctx.provider)?;
    let result = provider.apply(&acs, change);

    // The state file keeps real values; only what is printed is masked.
    if let Some(path) = out {
        match &result.state {
            Some(state) => write_json(path, state)?,
            None if result.outcome.is_success() => write_json(path, &serde_json::Value::Null)?,
            None => {}
        }
    }

    let shown = masked(&provider, result);
    if ctx.json {
        print_json(&shown)?;
    } else if !ctx.quiet || !shown.outcome.is_success() {
        ui::change_result(&shown);
    }

    if let Outcome::Failed { error } = &shown.outcome {
        bail!("{} failed: {error}", shown.label);
    }
    Ok(())
}

/// The result with sensitive attribute values masked.
fn masked(provider: &Provider<AcsContext>, mut result: ChangeResult) -> ChangeResult {
    let Some(type_name) = result.label.split('.').next() else {
        return result;
    };
    if let (Ok(resource), Some(state)) = (provider.resource(type_name), result.state.as_mut()) {
        state.attributes = resource.schema().redact(&state.attributes);
    }
    result
}
