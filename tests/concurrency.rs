//! Concurrent access to the class metadata cache.

use objscope::{prelude::*, Result};
use std::{
    sync::{Arc, Barrier},
    thread,
};

const THREADS: usize = 16;

fn deep_runtime(depth: usize) -> Result<Arc<TableRuntime>> {
    let runtime = Arc::new(TableRuntime::new());
    runtime.register(
        ClassBuilder::new("Level0")
            .field(FieldDef::new("_root", "@"))
            .method(MethodDef::new("root", "@")),
    )?;

    for level in 1..depth {
        let mut builder = ClassBuilder::new(format!("Level{level}"))
            .superclass(format!("Level{}", level - 1))
            .method(MethodDef::new(format!("method{level}"), "v").argument("i"))
            .property(PropertyDef::from_attributes(
                format!("value{level}"),
                &format!("Tq,N,V_value{level}"),
            ));
        for field in 0..8 {
            builder = builder.field(FieldDef::new(format!("_f{level}_{field}"), "d"));
        }
        runtime.register(builder)?;
    }

    Ok(runtime)
}

#[test]
fn test_concurrent_first_access_builds_one_record() -> Result<()> {
    let runtime = deep_runtime(12)?;
    let cache = Arc::new(ClassCache::new(runtime));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let cache = cache.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                cache.lookup_name("Level11")
            })
        })
        .collect();

    let records: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap().unwrap())
        .collect();

    for record in &records {
        assert!(Arc::ptr_eq(record, &records[0]));
        // fully populated, never a partial record
        assert_eq!(record.fields().len(), 8);
        assert_eq!(record.methods().len(), 1);
        assert_eq!(record.properties().len(), 1);
        assert_eq!(record.hierarchy().count(), 12);
    }
    assert_eq!(cache.len(), 12);

    Ok(())
}

#[test]
fn test_concurrent_lookups_across_the_hierarchy() -> Result<()> {
    let runtime = deep_runtime(8)?;
    let cache = Arc::new(ClassCache::new(runtime));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let cache = cache.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                let name = format!("Level{}", i % 8);
                cache.lookup_name(&name).map(|info| info.name.clone())
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), Some(format!("Level{}", i % 8)));
    }

    // every chain links the cached superclass records
    for level in 1..8 {
        let info = cache.lookup_name(&format!("Level{level}")).unwrap();
        let parent = cache.lookup_name(&format!("Level{}", level - 1)).unwrap();
        assert!(Arc::ptr_eq(info.super_info.as_ref().unwrap(), &parent));
    }

    Ok(())
}

#[test]
fn test_concurrent_refresh_and_lookup() -> Result<()> {
    let runtime = deep_runtime(4)?;
    let cache = Arc::new(ClassCache::new(runtime.clone()));
    let class = runtime.lookup_class("Level3").unwrap();
    let initial = cache.try_lookup(class)?;

    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let cache = cache.clone();
            let runtime = runtime.clone();
            let barrier = barrier.clone();
            thread::spawn(move || -> Result<()> {
                barrier.wait();
                if i % 4 == 0 {
                    runtime.add_method(class, MethodDef::new(format!("added{i}"), "v"))?;
                    let current = cache.try_lookup(class)?;
                    cache.mark_stale(&current);
                }
                let info = cache.try_lookup(class)?;
                assert_eq!(info.name, "Level3");
                assert_eq!(info.fields().len(), 8);
                Ok(())
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap()?;
    }

    let last = cache.try_lookup(class)?;
    assert!(initial.needs_update());
    assert_eq!(last.methods().len(), 1 + THREADS / 4);

    Ok(())
}

#[test]
fn test_preload_in_parallel() -> Result<()> {
    let runtime = deep_runtime(10)?;
    let cache = ClassCache::new(runtime);

    let names: Vec<String> = (0..10).map(|level| format!("Level{level}")).collect();
    let mut names: Vec<&str> = names.iter().map(String::as_str).collect();
    names.push("Missing");

    assert_eq!(cache.preload(&names), 10);
    assert_eq!(cache.len(), 10);

    Ok(())
}

/// A member-less runtime whose class names and superclass links are given as functions
struct Links {
    name: fn(u64) -> Option<String>,
    superclass: fn(u64) -> Option<u64>,
}

impl ObjectRuntime for Links {
    fn class_name(&self, class: ClassHandle) -> Option<String> {
        (self.name)(class.value())
    }
    fn superclass(&self, class: ClassHandle) -> Option<ClassHandle> {
        (self.superclass)(class.value()).map(ClassHandle::new)
    }
    fn is_meta_class(&self, _: ClassHandle) -> bool {
        false
    }
    fn meta_class(&self, _: ClassHandle) -> Option<ClassHandle> {
        None
    }
    fn lookup_class(&self, name: &str) -> Option<ClassHandle> {
        (1..16)
            .find(|value| (self.name)(*value).as_deref() == Some(name))
            .map(ClassHandle::new)
    }
    fn fields(&self, _: ClassHandle) -> Vec<FieldHandle> {
        Vec::new()
    }
    fn methods(&self, _: ClassHandle) -> Vec<MethodHandle> {
        Vec::new()
    }
    fn properties(&self, _: ClassHandle) -> Vec<PropertyHandle> {
        Vec::new()
    }
    fn field_name(&self, _: FieldHandle) -> Option<String> {
        None
    }
    fn field_offset(&self, _: FieldHandle) -> isize {
        0
    }
    fn field_type_encoding(&self, _: FieldHandle) -> Option<String> {
        None
    }
    fn method_selector(&self, _: MethodHandle) -> Selector {
        Selector::NULL
    }
    fn selector_name(&self, _: Selector) -> Option<String> {
        None
    }
    fn method_implementation(&self, _: MethodHandle) -> Imp {
        Imp::NULL
    }
    fn method_type_encoding(&self, _: MethodHandle) -> Option<String> {
        None
    }
    fn method_return_type(&self, _: MethodHandle) -> Option<String> {
        None
    }
    fn method_argument_count(&self, _: MethodHandle) -> usize {
        0
    }
    fn method_argument_type(&self, _: MethodHandle, _: usize) -> Option<String> {
        None
    }
    fn property_name(&self, _: PropertyHandle) -> Option<String> {
        None
    }
    fn property_attributes(&self, _: PropertyHandle) -> Vec<PropertyAttribute> {
        Vec::new()
    }
}

#[test]
fn test_cyclic_hierarchy_hits_the_depth_limit() {
    let cycle = Links {
        name: |value| Some(format!("Cycle{value}")),
        // 1 -> 2 -> 1
        superclass: |value| Some(3 - value),
    };

    let cache = ClassCache::with_config(Arc::new(cycle), CacheConfig::default().with_max_depth(8));
    assert!(matches!(
        cache.try_lookup_name("Cycle1"),
        Err(Error::RecursionLimit(8))
    ));
    assert!(cache.is_empty());
}

#[test]
fn test_unnamed_superclass_is_left_out() -> Result<()> {
    let links = Links {
        name: |value| (value == 1).then(|| "Child".to_string()),
        superclass: |value| (value == 1).then_some(2),
    };
    let cache = ClassCache::new(Arc::new(links));

    let child = cache.try_lookup_name("Child")?;
    assert_eq!(child.name, "Child");
    assert_eq!(child.superclass, Some(ClassHandle::new(2)));
    assert!(child.super_info.is_none());
    assert_eq!(child.hierarchy().count(), 1);

    // cached like any other record
    assert!(Arc::ptr_eq(&child, &cache.try_lookup_name("Child")?));
    assert_eq!(cache.len(), 1);

    Ok(())
}
