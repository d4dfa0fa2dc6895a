//! Unit tests for the hot-swap engine

use crate::support::{bump, component, counter, inverse, runtime_with_refresh};
use core_types::{JsError, Value};
use module_runtime::{
    factory, DefineOutcome, Factory, FullRefreshReason, HotSwapPhase, HotUpdate,
    HotUpdateOutcome, ModuleDefinition, ModuleRuntime, RuntimeConfig,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

fn leaf(value: i32, runs: &Rc<Cell<usize>>) -> Factory {
    let runs = Rc::clone(runs);
    factory(move |scope| {
        bump(&runs);
        scope.exports().set("value", Value::Smi(value));
        Ok(())
    })
}

/// A module that requires `dependency`, copies its `value` and optionally
/// accepts hot updates.
fn importer(dependency: u32, accepts: bool, runs: &Rc<Cell<usize>>) -> Factory {
    let runs = Rc::clone(runs);
    factory(move |scope| {
        bump(&runs);
        if accepts {
            if let Some(hot) = scope.hot() {
                hot.accept();
            }
        }
        let dep = scope.require(dependency)?;
        scope.exports().set("value", dep.get("value"));
        Ok(())
    })
}

fn update(id: u32, factory: Factory, edges: &[(u32, &[u32])]) -> HotUpdate {
    HotUpdate::new(id, factory, Default::default(), inverse(edges))
}

const CHAIN: &[(u32, &[u32])] = &[(1, &[2]), (2, &[3]), (3, &[])];

#[test]
fn production_ignores_updates() {
    let runtime = ModuleRuntime::production();
    let runs = counter();
    runtime.define(ModuleDefinition::new(1, leaf(1, &runs)));
    runtime.require(1).unwrap();

    assert_eq!(
        runtime.hot_update(update(1, leaf(2, &runs), CHAIN)),
        HotUpdateOutcome::Ignored
    );
    assert_eq!(
        runtime.define(ModuleDefinition::new(1, leaf(2, &runs)).inverse_dependencies(inverse(CHAIN))),
        DefineOutcome::AlreadyDefined
    );
    assert_eq!(runtime.require(1).unwrap().get("value"), Value::Smi(1));
}

#[test]
fn update_of_unknown_module_defines_it() {
    let runtime = ModuleRuntime::development();
    let runs = counter();

    assert_eq!(
        runtime.hot_update(update(1, leaf(5, &runs), CHAIN)),
        HotUpdateOutcome::Deferred
    );
    assert_eq!(runs.get(), 0);
    assert_eq!(runtime.require(1).unwrap().get("value"), Value::Smi(5));
}

#[test]
fn update_of_module_that_never_ran_replaces_its_factory() {
    let runtime = ModuleRuntime::development();
    let runs = counter();
    runtime.define(ModuleDefinition::new(1, leaf(1, &runs)));

    let outcome = runtime.define(
        ModuleDefinition::new(1, leaf(2, &runs)).inverse_dependencies(inverse(CHAIN)),
    );

    assert_eq!(outcome, DefineOutcome::HotUpdate(HotUpdateOutcome::Deferred));
    assert_eq!(runs.get(), 0);
    assert_eq!(runtime.require(1).unwrap().get("value"), Value::Smi(2));
}

#[test]
fn update_replays_up_to_the_accepting_module() {
    let runtime = ModuleRuntime::development();
    let (leaf_runs, mid_runs, root_runs) = (counter(), counter(), counter());
    runtime.define(ModuleDefinition::new(1, leaf(1, &leaf_runs)));
    runtime.define(ModuleDefinition::new(2, importer(1, true, &mid_runs)));
    runtime.define(ModuleDefinition::new(3, importer(2, false, &root_runs)));
    let root_exports = runtime.require(3).unwrap();

    let outcome = runtime.hot_update(update(1, leaf(2, &leaf_runs), CHAIN));

    assert_eq!(outcome, HotUpdateOutcome::Applied { replayed: vec![1, 2] });
    assert_eq!((leaf_runs.get(), mid_runs.get(), root_runs.get()), (2, 2, 1));
    assert_eq!(runtime.require(2).unwrap().get("value"), Value::Smi(2));
    assert_eq!(runtime.require(3).unwrap(), root_exports);
    assert_eq!(runtime.hot_swap_phase(), HotSwapPhase::Stable);
}

#[test]
fn self_accepting_module_replays_alone() {
    let runtime = ModuleRuntime::development();
    runtime.define(ModuleDefinition::new(
        1,
        factory(|scope| {
            scope.hot().unwrap().accept();
            scope.exports().set("value", Value::Smi(1));
            Ok(())
        }),
    ));
    runtime.require(1).unwrap();

    let outcome = runtime.hot_update(update(
        1,
        factory(|scope| {
            scope.hot().unwrap().accept();
            scope.exports().set("value", Value::Smi(2));
            Ok(())
        }),
        &[(1, &[])],
    ));

    assert_eq!(outcome, HotUpdateOutcome::Applied { replayed: vec![1] });
    assert_eq!(runtime.require(1).unwrap().get("value"), Value::Smi(2));
}

#[test]
fn replay_assigns_a_fresh_exports_object() {
    let runtime = ModuleRuntime::development();
    let runs = counter();
    runtime.define(ModuleDefinition::new(1, leaf(1, &runs)));
    runtime.define(ModuleDefinition::new(2, importer(1, true, &runs)));
    runtime.require(2).unwrap();
    let before = runtime.require(1).unwrap();

    runtime.hot_update(update(1, leaf(2, &runs), CHAIN));

    assert_ne!(runtime.require(1).unwrap(), before);
    assert_eq!(before.get("value"), Value::Smi(1));
}

#[test]
fn missing_root_boundary_falls_back_to_full_refresh() {
    let (runtime, refresh) = runtime_with_refresh();
    let (leaf_runs, mid_runs, root_runs) = (counter(), counter(), counter());
    runtime.define(ModuleDefinition::new(1, leaf(1, &leaf_runs)).verbose_name("src/leaf.js"));
    runtime.define(ModuleDefinition::new(2, importer(1, false, &mid_runs)).verbose_name("src/mid.js"));
    runtime.define(ModuleDefinition::new(3, importer(2, false, &root_runs)).verbose_name("src/root.js"));
    runtime.require(3).unwrap();
    let leaf_exports = runtime.require(1).unwrap();

    let outcome = runtime.hot_update(update(1, leaf(2, &leaf_runs), CHAIN));

    assert_eq!(
        outcome,
        HotUpdateOutcome::FullRefresh {
            reason: FullRefreshReason::NoRootBoundary
        }
    );
    let requests = refresh.full_refreshes.borrow();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].message(),
        "Fast Refresh - No root boundary <src/leaf.js> <src/root.js>"
    );
    assert_eq!((leaf_runs.get(), mid_runs.get(), root_runs.get()), (1, 1, 1));
    assert_eq!(runtime.require(1).unwrap(), leaf_exports);
    assert!(!runtime.has_pending_commit());
}

#[test]
fn cycle_in_inverse_graph_falls_back_to_full_refresh() {
    let (runtime, refresh) = runtime_with_refresh();
    let runs = counter();
    runtime.define(ModuleDefinition::new(1, leaf(1, &runs)));
    runtime.define(ModuleDefinition::new(2, importer(1, false, &runs)));
    runtime.require(2).unwrap();
    runtime.require(1).unwrap();

    let outcome = runtime.hot_update(update(1, leaf(2, &runs), &[(1, &[2]), (2, &[1])]));

    assert_eq!(
        outcome,
        HotUpdateOutcome::FullRefresh {
            reason: FullRefreshReason::DependencyCycle
        }
    );
    assert_eq!(refresh.full_refresh_reasons(), vec!["Dependency cycle"]);
}

#[test]
fn failing_replay_restores_previous_exports() {
    let runtime = ModuleRuntime::development();
    let (leaf_runs, root_runs) = (counter(), counter());
    runtime.define(ModuleDefinition::new(1, leaf(1, &leaf_runs)));
    runtime.define(ModuleDefinition::new(
        2,
        factory(|scope| {
            scope.hot().unwrap().accept();
            let leaf = scope.require(1)?;
            if leaf.get("value") == Value::Smi(0) {
                return Err(JsError::error("value must not be zero").into());
            }
            scope.exports().set("value", leaf.get("value"));
            Ok(())
        }),
    ));
    runtime.define(ModuleDefinition::new(3, importer(2, false, &root_runs)));
    let root_exports = runtime.require(3).unwrap();
    let mid_exports = runtime.require(2).unwrap();

    let outcome = runtime.hot_update(update(1, leaf(0, &leaf_runs), CHAIN));

    assert_eq!(outcome, HotUpdateOutcome::Failed { module: 2 });
    let mid = runtime.inspect(2).unwrap();
    assert_eq!(mid.exports, mid_exports);
    assert!(mid.is_initialized);
    assert!(!mid.has_error());
    assert_eq!(runtime.require(3).unwrap(), root_exports);
    assert_eq!(root_runs.get(), 1);
    assert!(!runtime.has_pending_commit());
}

#[test]
fn dispose_and_accept_callbacks_run_around_replay() {
    let runtime = ModuleRuntime::development();
    let log = Rc::new(RefCell::new(Vec::<String>::new()));

    let module = |version: i32, log: Rc<RefCell<Vec<String>>>| {
        factory(move |scope| {
            let hot = scope.hot().unwrap();
            let on_accept = Rc::clone(&log);
            hot.accept_with(move || {
                on_accept.borrow_mut().push(format!("accept v{version}"));
                Ok(())
            });
            let on_dispose = Rc::clone(&log);
            hot.dispose(move || {
                on_dispose.borrow_mut().push(format!("dispose v{version}"));
                Err(JsError::error("dispose failures are swallowed"))
            });
            Ok(())
        })
    };
    runtime.define(ModuleDefinition::new(1, module(1, Rc::clone(&log))));
    runtime.require(1).unwrap();

    let outcome = runtime.hot_update(update(1, module(2, Rc::clone(&log)), &[(1, &[])]));

    assert_eq!(outcome, HotUpdateOutcome::Applied { replayed: vec![1] });
    assert_eq!(*log.borrow(), vec!["dispose v1", "accept v2"]);
}

#[test]
fn import_default_is_recomputed_after_replay() {
    let runtime = ModuleRuntime::development();
    let versioned = |version: &'static str| {
        factory(move |scope| {
            scope.hot().unwrap().accept();
            scope.exports().set("__esModule", Value::Boolean(true));
            scope.exports().set("default", Value::from(version));
            Ok(())
        })
    };
    runtime.define(ModuleDefinition::new(1, versioned("v1")));
    assert_eq!(runtime.import_default(1).unwrap(), Value::from("v1"));
    assert_eq!(runtime.import_default(1).unwrap(), Value::from("v1"));

    runtime.hot_update(update(1, versioned("v2"), &[(1, &[])]));

    assert_eq!(runtime.import_default(1).unwrap(), Value::from("v2"));
}

fn component_module(names: &'static [&'static str], runs: &Rc<Cell<usize>>) -> Factory {
    let runs = Rc::clone(runs);
    factory(move |scope| {
        bump(&runs);
        for name in names {
            scope.exports().set(*name, component(name));
        }
        Ok(())
    })
}

#[test]
fn refresh_boundary_accepts_and_commit_is_debounced() {
    let (runtime, refresh) = runtime_with_refresh();
    let (leaf_runs, screen_runs, app_runs) = (counter(), counter(), counter());
    runtime.define(ModuleDefinition::new(1, leaf(1, &leaf_runs)));
    runtime.define(ModuleDefinition::new(
        2,
        factory({
            let runs = Rc::clone(&screen_runs);
            move |scope| {
                bump(&runs);
                scope.require(1)?;
                scope.exports().set("Screen", component("Screen"));
                Ok(())
            }
        }),
    ));
    runtime.define(ModuleDefinition::new(3, importer(2, false, &app_runs)));
    runtime.require(3).unwrap();

    let outcome = runtime.hot_update(update(1, leaf(2, &leaf_runs), CHAIN));

    assert_eq!(outcome, HotUpdateOutcome::Applied { replayed: vec![1, 2] });
    assert_eq!(app_runs.get(), 1);
    assert!(runtime.has_pending_commit());

    let event_loop = runtime.event_loop();
    event_loop.advance_by(29).unwrap();
    assert_eq!(refresh.react_refreshes.get(), 0);
    event_loop.advance_by(1).unwrap();
    assert_eq!(refresh.react_refreshes.get(), 1);
    assert!(!runtime.has_pending_commit());
}

#[test]
fn later_update_supersedes_pending_commit() {
    let (runtime, refresh) = runtime_with_refresh();
    let runs = counter();
    runtime.define(ModuleDefinition::new(1, component_module(&["App"], &runs)));
    runtime.require(1).unwrap();
    let event_loop = runtime.event_loop();

    runtime.hot_update(update(1, component_module(&["App"], &runs), &[(1, &[])]));
    event_loop.advance_by(20).unwrap();
    runtime.hot_update(update(1, component_module(&["App"], &runs), &[(1, &[])]));
    event_loop.advance_by(20).unwrap();
    assert_eq!(refresh.react_refreshes.get(), 0);

    event_loop.run_until_idle().unwrap();
    assert_eq!(refresh.react_refreshes.get(), 1);
    assert_eq!(event_loop.now(), 50);
}

#[test]
fn boundary_with_new_export_invalidates_into_boundary_parent() {
    let (runtime, refresh) = runtime_with_refresh();
    let (button_runs, screen_runs) = (counter(), counter());
    runtime.define(ModuleDefinition::new(1, component_module(&["Button"], &button_runs)));
    runtime.define(ModuleDefinition::new(
        2,
        factory({
            let runs = Rc::clone(&screen_runs);
            move |scope| {
                bump(&runs);
                scope.require(1)?;
                scope.exports().set("Screen", component("Screen"));
                Ok(())
            }
        }),
    ));
    runtime.require(2).unwrap();

    let outcome = runtime.hot_update(update(
        1,
        component_module(&["Button", "Icon"], &button_runs),
        &[(1, &[2]), (2, &[])],
    ));

    assert_eq!(outcome, HotUpdateOutcome::Applied { replayed: vec![1, 2] });
    assert_eq!(screen_runs.get(), 2);
    assert!(refresh.full_refreshes.borrow().is_empty());
}

#[test]
fn boundary_with_new_export_and_plain_parent_needs_full_refresh() {
    let (runtime, refresh) = runtime_with_refresh();
    let (button_runs, app_runs) = (counter(), counter());
    runtime.define(ModuleDefinition::new(1, component_module(&["Button"], &button_runs)));
    runtime.define(ModuleDefinition::new(2, importer(1, false, &app_runs)));
    runtime.require(2).unwrap();

    let outcome = runtime.hot_update(update(
        1,
        component_module(&["Button", "Icon"], &button_runs),
        &[(1, &[2]), (2, &[])],
    ));

    assert_eq!(
        outcome,
        HotUpdateOutcome::FullRefresh {
            reason: FullRefreshReason::InvalidatedBoundary
        }
    );
    assert_eq!(refresh.full_refresh_reasons(), vec!["Invalidated boundary"]);
    assert_eq!(app_runs.get(), 1);
}

#[test]
fn module_that_stops_being_a_boundary_needs_full_refresh() {
    let (runtime, refresh) = runtime_with_refresh();
    let runs = counter();
    runtime.define(ModuleDefinition::new(1, component_module(&["Widget"], &runs)));
    runtime.require(1).unwrap();

    let outcome = runtime.hot_update(update(1, leaf(3, &runs), &[(1, &[])]));

    assert_eq!(
        outcome,
        HotUpdateOutcome::FullRefresh {
            reason: FullRefreshReason::NoLongerABoundary
        }
    );
    assert_eq!(refresh.full_refresh_reasons(), vec!["No longer a boundary"]);
}

#[test]
fn unchanged_boundary_signature_needs_no_parents() {
    let (runtime, refresh) = runtime_with_refresh();
    let runs = counter();
    runtime.define(ModuleDefinition::new(1, component_module(&["Widget"], &runs)));
    runtime.require(1).unwrap();

    let outcome = runtime.hot_update(update(1, component_module(&["Widget"], &runs), &[(1, &[])]));

    assert_eq!(outcome, HotUpdateOutcome::Applied { replayed: vec![1] });
    assert!(refresh.full_refreshes.borrow().is_empty());
}

#[test]
fn exports_are_registered_with_the_refresh_layer() {
    let refresh = Rc::new(crate::support::RecordingRefresh::default());
    let config = RuntimeConfig {
        global_prefix: "app".to_string(),
        ..RuntimeConfig::default()
    };
    let runtime = ModuleRuntime::builder()
        .config(config)
        .refresh_host(refresh.clone())
        .build()
        .unwrap();
    runtime.define(ModuleDefinition::new(
        7,
        factory(|scope| {
            let local = component("Local");
            scope.register_component(&local, "Local");
            scope.exports().set("Card", component("Card"));
            Ok(())
        }),
    ));

    runtime.require(7).unwrap();

    assert_eq!(
        refresh.registered_ids(),
        vec!["app 7 Local", "app 7 %exports% Card"]
    );
}

#[test]
fn clear_cancels_pending_commit() {
    let (runtime, refresh) = runtime_with_refresh();
    let runs = counter();
    runtime.define(ModuleDefinition::new(1, component_module(&["App"], &runs)));
    runtime.require(1).unwrap();
    runtime.hot_update(update(1, component_module(&["App"], &runs), &[(1, &[])]));
    assert!(runtime.has_pending_commit());

    runtime.clear();

    assert!(!runtime.has_pending_commit());
    runtime.event_loop().run_until_idle().unwrap();
    assert_eq!(refresh.react_refreshes.get(), 0);
}
