//! Execution engine - applies a plan's changes in parallel

use crate::context::ProgressCallback;
use crate::planner::Plan;
use crate::provider::Provider;
use crate::types::{ChangeResult, ExecuteOptions, ExecuteSummary, Outcome};
use anyhow::Result;
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Results of executing a plan, in plan order.
#[derive(Debug, Clone, Default)]
pub struct ExecuteReport {
    pub results: Vec<ChangeResult>,
    pub summary: ExecuteSummary,
}

/// Execute a plan against a provider
///
/// Changes run on a pool of `opts.jobs` threads; each change runs its whole
/// lifecycle on one thread. Changes with the same label run one after the
/// other, in plan order.
pub fn execute<M, P>(
    provider: &Provider<M>,
    meta: &M,
    plan: &Plan,
    opts: &ExecuteOptions,
    progress: &mut P,
) -> Result<ExecuteReport>
where
    M: Sync,
    P: ProgressCallback,
{
    if plan.is_empty() {
        return Ok(ExecuteReport::default());
    }

    progress.on_batch_start(plan.len());

    let results = if opts.dry_run {
        plan.changes
            .iter()
            .map(|change| ChangeResult {
                label: change.label(),
                outcome: Outcome::Skipped {
                    reason: "Dry run".into(),
                },
                state: change.prior.clone(),
                diagnostics: Default::default(),
            })
            .collect()
    } else if opts.jobs <= 1 || plan.len() == 1 {
        plan.changes
            .iter()
            .map(|change| provider.apply(meta, change))
            .collect()
    } else {
        execute_parallel(provider, meta, plan, opts.jobs)?
    };

    let mut summary = ExecuteSummary::default();
    for result in &results {
        summary.add(&result.outcome);
        progress.on_change_complete(&result.label, &result.outcome);
    }
    progress.on_batch_complete();

    Ok(ExecuteReport { results, summary })
}

/// Execute changes in parallel using rayon
///
/// Changes sharing a label (same type and name) form one group that runs in
/// plan order on a single worker, so at most one lifecycle per remote object
/// is in flight.
fn execute_parallel<M: Sync>(
    provider: &Provider<M>,
    meta: &M,
    plan: &Plan,
    jobs: usize,
) -> Result<Vec<ChangeResult>> {
    let results: Mutex<Vec<(usize, ChangeResult)>> = Mutex::new(Vec::with_capacity(plan.len()));

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to create thread pool: {}", e))?;

    pool.install(|| {
        group_by_label(plan).par_iter().for_each(|group| {
            for &i in group {
                let result = provider.apply(meta, &plan.changes[i]);
                results
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push((i, result));
            }
        });
    });

    let mut results = results.into_inner().unwrap_or_else(PoisonError::into_inner);
    results.sort_by_key(|(i, _)| *i);
    Ok(results.into_iter().map(|(_, r)| r).collect())
}

/// Plan indices grouped by change label, groups in order of first appearance.
fn group_by_label(plan: &Plan) -> Vec<Vec<usize>> {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for (i, change) in plan.changes.iter().enumerate() {
        let slot = *slots.entry(change.label()).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(i);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::NoProgress;
    use crate::data::{Attributes, ResourceData};
    use crate::diagnostics::{Diagnostic, Diagnostics};
    use crate::resource::Resource;
    use crate::schema::{AttrType, Attribute, Schema};
    use crate::types::Change;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts creates; names starting with "bad" fail.
    struct Counter;

    impl Resource<AtomicUsize> for Counter {
        fn type_name(&self) -> &'static str {
            "scp_counters"
        }

        fn schema(&self) -> Schema {
            Schema::new("scp_counters", "counters")
                .attribute(Attribute::required("name", AttrType::String))
        }

        fn create(&self, meta: &AtomicUsize, data: &mut ResourceData) -> Diagnostics {
            meta.fetch_add(1, Ordering::SeqCst);
            let name = data.get_str("name").unwrap_or_default().to_string();
            if name.starts_with("bad") {
                return Diagnostic::error(format!("cannot create {name}")).into();
            }
            data.set_id(name);
            Diagnostics::new()
        }

        fn read(&self, _: &AtomicUsize, _: &mut ResourceData) -> Diagnostics {
            Diagnostics::new()
        }

        fn update(&self, _: &AtomicUsize, _: &mut ResourceData) -> Diagnostics {
            Diagnostics::new()
        }

        fn delete(&self, _: &AtomicUsize, _: &mut ResourceData) -> Diagnostics {
            Diagnostics::new()
        }
    }

    fn plan(names: &[&str]) -> Plan {
        let mut plan = Plan::new();
        for name in names {
            let config: Attributes = json!({ "name": name }).as_object().cloned().unwrap();
            plan.push(Change::create("scp_counters", config));
        }
        plan
    }

    #[test]
    fn test_execute_empty_plan() {
        let provider = Provider::new().register(Counter);
        let report = execute(
            &provider,
            &AtomicUsize::new(0),
            &Plan::new(),
            &ExecuteOptions::default(),
            &mut NoProgress,
        )
        .unwrap();

        assert_eq!(report.summary.total(), 0);
    }

    #[test]
    fn test_execute_parallel_keeps_plan_order() {
        let provider = Provider::new().register(Counter);
        let meta = AtomicUsize::new(0);
        let names = ["a", "b", "bad1", "c", "d", "bad2"];
        let report = execute(
            &provider,
            &meta,
            &plan(&names),
            &ExecuteOptions::default(),
            &mut NoProgress,
        )
        .unwrap();

        assert_eq!(meta.load(Ordering::SeqCst), 6);
        assert_eq!(report.summary.created, 4);
        assert_eq!(report.summary.failed, 2);
        let labels: Vec<_> = report.results.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "scp_counters.a",
                "scp_counters.b",
                "scp_counters.bad1",
                "scp_counters.c",
                "scp_counters.d",
                "scp_counters.bad2"
            ]
        );
    }

    /// Tracks how many creates are in flight per name.
    #[derive(Default)]
    struct Inflight {
        current: Mutex<HashMap<String, usize>>,
        peak: Mutex<HashMap<String, usize>>,
    }

    struct Slow;

    impl Resource<Inflight> for Slow {
        fn type_name(&self) -> &'static str {
            "scp_slow"
        }

        fn schema(&self) -> Schema {
            Schema::new("scp_slow", "slow things")
                .attribute(Attribute::required("name", AttrType::String))
        }

        fn create(&self, meta: &Inflight, data: &mut ResourceData) -> Diagnostics {
            let name = data.get_str("name").unwrap_or_default().to_string();
            {
                let mut current = meta.current.lock().unwrap();
                let now = current.entry(name.clone()).or_default();
                *now += 1;
                let mut peak = meta.peak.lock().unwrap();
                let max = peak.entry(name.clone()).or_default();
                *max = (*max).max(*now);
            }
            std::thread::sleep(std::time::Duration::from_millis(30));
            *meta.current.lock().unwrap().get_mut(&name).unwrap() -= 1;
            data.set_id(name);
            Diagnostics::new()
        }

        fn read(&self, _: &Inflight, _: &mut ResourceData) -> Diagnostics {
            Diagnostics::new()
        }

        fn update(&self, _: &Inflight, _: &mut ResourceData) -> Diagnostics {
            Diagnostics::new()
        }

        fn delete(&self, _: &Inflight, _: &mut ResourceData) -> Diagnostics {
            Diagnostics::new()
        }
    }

    #[test]
    fn test_same_label_never_overlaps() {
        let provider = Provider::new().register(Slow);
        let meta = Inflight::default();
        let mut plan = Plan::new();
        for name in ["same", "other", "same", "same"] {
            let config: Attributes = json!({ "name": name }).as_object().cloned().unwrap();
            plan.push(Change::create("scp_slow", config));
        }

        let report = execute(&provider, &meta, &plan, &ExecuteOptions::default(), &mut NoProgress).unwrap();

        assert_eq!(report.summary.created, 4);
        let peak = meta.peak.lock().unwrap();
        assert_eq!(peak["same"], 1);
        assert_eq!(peak["other"], 1);
    }

    #[test]
    fn test_group_by_label_keeps_plan_order() {
        let groups = group_by_label(&plan(&["a", "b", "a", "c", "b"]));
        assert_eq!(groups, vec![vec![0, 2], vec![1, 4], vec![3]]);
    }

    #[test]
    fn test_dry_run_makes_no_calls() {
        let provider = Provider::new().register(Counter);
        let meta = AtomicUsize::new(0);
        let opts = ExecuteOptions {
            dry_run: true,
            ..Default::default()
        };
        let report = execute(&provider, &meta, &plan(&["a", "b"]), &opts, &mut NoProgress).unwrap();

        assert_eq!(meta.load(Ordering::SeqCst), 0);
        assert_eq!(report.summary.skipped, 2);
    }
}
