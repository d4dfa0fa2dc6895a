//! Unit tests for transport manifests

use crate::support::{bump, counter};
use core_types::Value;
use module_runtime::{factory, HotUpdateOutcome, ModuleDefinition, ModuleRuntime, UpdateManifest};
use std::rc::Rc;

#[test]
fn manifest_accepts_dependency_map_with_paths() {
    let manifest = UpdateManifest::from_json(
        r#"{
            "id": 2,
            "dependencyMap": {"ids": [1], "paths": ["./leaf"]},
            "inverseDependencies": {"2": [3], "3": []}
        }"#,
    )
    .unwrap();

    assert_eq!(manifest.dependency_map.ids, vec![1]);
    assert_eq!(manifest.dependency_map.path(0), Some("./leaf"));
    assert_eq!(manifest.inverse_dependencies.parents(2), &[3]);
}

#[test]
fn manifest_drives_a_hot_update() {
    let runtime = ModuleRuntime::development();
    let runs = counter();
    let r = Rc::clone(&runs);
    runtime.define(ModuleDefinition::new(
        1,
        factory(move |scope| {
            bump(&r);
            scope.hot().unwrap().accept();
            scope.exports().set("version", Value::Smi(1));
            Ok(())
        }),
    ));
    runtime.require(1).unwrap();

    let manifest =
        UpdateManifest::from_json(r#"{"id": 1, "dependencyMap": [], "inverseDependencies": {"1": []}}"#)
            .unwrap();
    let outcome = runtime.hot_update(manifest.into_update(factory(|scope| {
        scope.hot().unwrap().accept();
        scope.exports().set("version", Value::Smi(2));
        Ok(())
    })));

    assert_eq!(outcome, HotUpdateOutcome::Applied { replayed: vec![1] });
    assert_eq!(runtime.require(1).unwrap().get("version"), Value::Smi(2));
    assert_eq!(runs.get(), 1);
}
