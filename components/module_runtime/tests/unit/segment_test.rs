//! Unit tests for lazily defined segments

use crate::support::{bump, counter};
use core_types::Value;
use module_runtime::{
    factory, pack_module_id, LoadError, ModuleDefinition, ModuleRuntime, NativeSegmentLoader,
    SegmentError, SegmentId, MAIN_SEGMENT,
};
use std::cell::RefCell;
use std::rc::Rc;

fn define_constant(runtime: &ModuleRuntime, id: u32, value: i32) {
    runtime.define(ModuleDefinition::new(
        id,
        factory(move |scope| {
            scope.exports().set("value", Value::Smi(value));
            Ok(())
        }),
    ));
}

#[test]
fn segment_definer_runs_once() {
    let runtime = ModuleRuntime::development();
    let calls = counter();
    let c = Rc::clone(&calls);
    let id = pack_module_id(1, 0);
    runtime
        .register_segment(
            1,
            move |runtime: &ModuleRuntime, requested| {
                bump(&c);
                define_constant(runtime, requested, 9);
            },
            Some(&[id]),
        )
        .unwrap();

    assert!(!runtime.is_defined(id));
    assert_eq!(runtime.require(id).unwrap().get("value"), Value::Smi(9));
    assert_eq!(runtime.require(id).unwrap().get("value"), Value::Smi(9));
    assert_eq!(calls.get(), 1);
}

#[test]
fn ownership_is_forgotten_after_the_definer_runs() {
    let runtime = ModuleRuntime::development();
    let id = pack_module_id(2, 5);
    runtime
        .register_segment(2, |runtime: &ModuleRuntime, id| define_constant(runtime, id, 1), Some(&[id]))
        .unwrap();

    assert_eq!(runtime.segment_owner(id), Some(2));
    runtime.require(id).unwrap();
    assert_eq!(runtime.segment_owner(id), None);
}

#[test]
fn main_segment_must_not_list_modules() {
    let runtime = ModuleRuntime::development();
    assert_eq!(
        runtime.register_segment(MAIN_SEGMENT, |_: &ModuleRuntime, _| {}, Some(&[1])),
        Err(SegmentError::UnexpectedModuleIds)
    );
}

#[test]
fn other_segments_must_list_modules() {
    let runtime = ModuleRuntime::development();
    assert_eq!(
        runtime.register_segment(3, |_: &ModuleRuntime, _| {}, None),
        Err(SegmentError::MissingModuleIds { segment_id: 3 })
    );
}

#[test]
fn defined_modules_are_not_claimed() {
    let runtime = ModuleRuntime::development();
    define_constant(&runtime, 7, 7);
    runtime
        .register_segment(1, |_: &ModuleRuntime, _| {}, Some(&[7, 8]))
        .unwrap();

    assert_eq!(runtime.segment_owner(7), None);
    assert_eq!(runtime.segment_owner(8), Some(1));
}

#[test]
fn unowned_modules_fall_back_to_main_segment() {
    let runtime = ModuleRuntime::development();
    let requested = Rc::new(RefCell::new(vec![]));
    let r = Rc::clone(&requested);
    runtime
        .register_segment(
            MAIN_SEGMENT,
            move |runtime: &ModuleRuntime, id| {
                r.borrow_mut().push(id);
                define_constant(runtime, id, 0);
            },
            None,
        )
        .unwrap();

    runtime.require(42).unwrap();
    assert_eq!(*requested.borrow(), vec![42]);
}

#[test]
fn definer_that_does_not_define_yields_not_found() {
    let runtime = ModuleRuntime::development();
    let id = pack_module_id(1, 1);
    runtime
        .register_segment(1, |_: &ModuleRuntime, _| {}, Some(&[id]))
        .unwrap();

    assert_eq!(
        runtime.require(id).unwrap_err(),
        LoadError::ModuleNotFound { id }
    );
}

#[derive(Default)]
struct NativeLoader {
    calls: RefCell<Vec<(u16, SegmentId)>>,
}

impl NativeSegmentLoader for NativeLoader {
    fn native_require(&self, runtime: &ModuleRuntime, local_id: u16, segment_id: SegmentId) {
        self.calls.borrow_mut().push((local_id, segment_id));
        define_constant(runtime, pack_module_id(segment_id, local_id), 3);
    }
}

#[test]
fn native_loader_receives_unpacked_ids() {
    let loader = Rc::new(NativeLoader::default());
    let runtime = ModuleRuntime::builder()
        .native_segment_loader(loader.clone())
        .build()
        .unwrap();

    let id = pack_module_id(4, 12);
    assert_eq!(runtime.require(id).unwrap().get("value"), Value::Smi(3));
    assert_eq!(*loader.calls.borrow(), vec![(12, 4)]);
}

#[test]
fn segment_definer_takes_precedence_over_native_loader() {
    let loader = Rc::new(NativeLoader::default());
    let runtime = ModuleRuntime::builder()
        .native_segment_loader(loader.clone())
        .build()
        .unwrap();
    let id = pack_module_id(1, 1);
    runtime
        .register_segment(1, |runtime: &ModuleRuntime, id| define_constant(runtime, id, 1), Some(&[id]))
        .unwrap();

    runtime.require(id).unwrap();
    assert!(loader.calls.borrow().is_empty());
}
