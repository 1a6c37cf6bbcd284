//! Integration tests for class metadata lookup and refresh.
//!
//! These tests describe a small UIKit-like hierarchy with the table runtime and check what
//! the cache reports for it, before and after the classes change.

use objscope::{prelude::*, Result};
use std::sync::Arc;

fn sample_runtime() -> Result<Arc<TableRuntime>> {
    let runtime = Arc::new(TableRuntime::new());

    runtime.register(
        ClassBuilder::new("NSObject")
            .field(FieldDef::new("isa", "#").at_offset(0))
            .method(MethodDef::new("init", "@"))
            .method(MethodDef::new("description", "@"))
            .class_method(MethodDef::new("alloc", "@")),
    )?;
    runtime.register(ClassBuilder::new("NSString").superclass("NSObject"))?;
    runtime.register(
        ClassBuilder::new("UIView")
            .superclass("NSObject")
            .field(FieldDef::new("_frame", "{CGRect={CGPoint=dd}{CGSize=dd}}"))
            .field(FieldDef::new("_tag", "q"))
            .method(MethodDef::new("setTag:", "v").argument("q"))
            .method(MethodDef::new("tag", "q"))
            .property(PropertyDef::from_attributes("tag", "Tq,N,V_tag"))
            .property(PropertyDef::from_attributes(
                "hidden",
                "TB,N,GisHidden,V_hidden",
            )),
    )?;
    runtime.register(
        ClassBuilder::new("UILabel")
            .superclass("UIView")
            .field(FieldDef::new("_text", "@\"NSString\""))
            .method(MethodDef::new("description", "@"))
            .property(PropertyDef::from_attributes(
                "text",
                "T@\"NSString\",C,N,V_text",
            ))
            .property(PropertyDef::from_attributes(
                "delegate",
                "T@\"NSObject\"<UILabelDelegate><NSCopying>,W,N,V_delegate",
            )),
    )?;

    Ok(runtime)
}

#[test]
fn test_describes_class_members() -> Result<()> {
    let runtime = sample_runtime()?;
    let cache = ClassCache::new(runtime.clone());

    let view = cache.try_lookup_name("UIView")?;
    assert_eq!(view.name, "UIView");
    assert!(!view.is_meta);
    assert_eq!(view.superclass, runtime.lookup_class("NSObject"));

    assert_eq!(view.fields()["_frame"].encoding.kind, TypeKind::Struct);
    assert_eq!(view.fields()["_tag"].offset, 16);

    let set_tag = &view.methods()["setTag:"];
    assert_eq!(set_tag.return_type().kind, TypeKind::Void);
    assert_eq!(set_tag.argument_count(), 3);
    assert_eq!(set_tag.argument_type(2).map(|t| t.kind), Some(TypeKind::Int64));

    let hidden = &view.properties()["hidden"];
    assert_eq!(hidden.encoding.kind, TypeKind::Bool);
    assert_eq!(hidden.getter.as_deref(), Some("isHidden"));
    assert_eq!(hidden.setter.as_deref(), Some("setHidden"));
    assert_eq!(hidden.ivar_name.as_deref(), Some("_hidden"));

    Ok(())
}

#[test]
fn test_resolves_declared_property_types() -> Result<()> {
    let runtime = sample_runtime()?;
    let cache = ClassCache::new(runtime.clone());
    let label = cache.try_lookup_name("UILabel")?;

    let text = &label.properties()["text"];
    assert!(text.is_copy());
    assert_eq!(text.class_name.as_deref(), Some("NSString"));
    assert_eq!(text.class, runtime.lookup_class("NSString"));
    assert!(text.protocols.is_empty());

    let delegate = &label.properties()["delegate"];
    assert!(delegate.is_weak());
    assert_eq!(delegate.class, runtime.lookup_class("NSObject"));
    assert_eq!(delegate.protocols, vec!["UILabelDelegate", "NSCopying"]);

    Ok(())
}

#[test]
fn test_superclass_chain() -> Result<()> {
    let runtime = sample_runtime()?;
    let cache = ClassCache::new(runtime);

    let label = cache.try_lookup_name("UILabel")?;
    let chain: Vec<_> = label.hierarchy().map(|info| info.name.clone()).collect();
    assert_eq!(chain, vec!["UILabel", "UIView", "NSObject"]);

    // the superclass records are the cached ones
    let view = cache.try_lookup_name("UIView")?;
    assert!(Arc::ptr_eq(label.super_info.as_ref().unwrap(), &view));

    // nearest declaration wins
    let description = label.find_method("description").unwrap();
    assert_eq!(description.handle, label.methods()["description"].handle);
    assert!(label.find_method("init").is_some());
    assert!(label.find_property("tag").is_some());
    assert!(label.find_field("isa").is_some());

    Ok(())
}

#[test]
fn test_lookup_is_idempotent() -> Result<()> {
    let runtime = sample_runtime()?;
    let cache = ClassCache::new(runtime.clone());
    let handle = runtime.lookup_class("UILabel").unwrap();

    let first = cache.try_lookup(handle)?;
    let second = cache.try_lookup(handle)?;
    let by_name = cache.try_lookup_name("UILabel")?;

    assert!(Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&first, &by_name));
    assert!(!first.needs_update());
    assert!(cache.contains(handle));

    Ok(())
}

#[test]
fn test_instance_and_meta_partitions() -> Result<()> {
    let runtime = sample_runtime()?;
    let cache = ClassCache::new(runtime.clone());

    let object = runtime.lookup_class("NSObject").unwrap();
    let meta = runtime.meta_class(object).unwrap();

    let class_info = cache.try_lookup(object)?;
    let meta_info = cache.try_lookup(meta)?;

    assert!(!class_info.is_meta);
    assert!(meta_info.is_meta);
    assert_eq!(class_info.meta_class, Some(meta));
    assert_eq!(meta_info.meta_class, None);
    assert!(class_info.methods().contains_key("init"));
    assert!(!class_info.methods().contains_key("alloc"));
    assert!(meta_info.methods().contains_key("alloc"));

    // the root meta-class inherits from the root class
    let root_of_meta = meta_info.super_info.as_ref().unwrap();
    assert!(Arc::ptr_eq(root_of_meta, &class_info));

    Ok(())
}

#[test]
fn test_added_members_appear_after_mark_stale() -> Result<()> {
    let runtime = sample_runtime()?;
    let cache = ClassCache::new(runtime.clone());
    let view = runtime.lookup_class("UIView").unwrap();

    let before = cache.try_lookup(view)?;
    runtime.add_method(view, MethodDef::new("layoutSubviews", "v"))?;
    runtime.add_property(view, PropertyDef::from_attributes("alpha", "Td,N,V_alpha"))?;

    // not visible until the record is marked
    let unchanged = cache.try_lookup(view)?;
    assert!(Arc::ptr_eq(&before, &unchanged));
    assert!(!unchanged.methods().contains_key("layoutSubviews"));

    cache.mark_stale(&before);
    assert!(before.needs_update());

    let after = cache.try_lookup(view)?;
    assert!(!Arc::ptr_eq(&before, &after));
    assert!(!after.needs_update());
    assert!(after.methods().contains_key("layoutSubviews"));
    assert_eq!(after.properties()["alpha"].encoding.kind, TypeKind::Double);

    // the old snapshot is untouched
    assert!(!before.methods().contains_key("layoutSubviews"));

    Ok(())
}

#[test]
fn test_removed_members_disappear_after_refresh() -> Result<()> {
    let runtime = sample_runtime()?;
    let cache = ClassCache::new(runtime.clone());
    let view = runtime.lookup_class("UIView").unwrap();

    let before = cache.try_lookup(view)?;
    assert!(runtime.remove_method(view, "tag")?);
    assert!(runtime.remove_property(view, "hidden")?);

    let after = cache.refresh(&before)?;
    assert!(!after.methods().contains_key("tag"));
    assert!(after.methods().contains_key("setTag:"));
    assert!(!after.properties().contains_key("hidden"));

    let current = cache.try_lookup(view)?;
    assert!(Arc::ptr_eq(&after, &current));

    Ok(())
}

#[test]
fn test_stale_superclass_is_seen_by_subclasses() -> Result<()> {
    let runtime = sample_runtime()?;
    let cache = ClassCache::new(runtime.clone());
    let view = runtime.lookup_class("UIView").unwrap();

    let label = cache.try_lookup_name("UILabel")?;
    runtime.add_method(view, MethodDef::new("removeFromSuperview", "v"))?;
    cache.mark_stale(label.super_info.as_ref().unwrap());

    let label = cache.try_lookup_name("UILabel")?;
    assert!(label.find_method("removeFromSuperview").is_some());

    Ok(())
}

#[test]
fn test_missing_classes() {
    let runtime = sample_runtime().unwrap();
    let cache = ClassCache::new(runtime);

    assert!(cache.lookup_name("UIButton").is_none());
    assert!(matches!(
        cache.try_lookup_name("UIButton"),
        Err(Error::ClassNotFound(name)) if name == "UIButton"
    ));
    assert!(cache.lookup(ClassHandle::NULL).is_none());
    assert!(cache.is_empty());
}

#[test]
fn test_lp64_configuration() -> Result<()> {
    let runtime = Arc::new(TableRuntime::new());
    runtime.register(
        ClassBuilder::new("Counter")
            .field(FieldDef::new("_value", "l"))
            .method(MethodDef::new("value", "L")),
    )?;

    let default = ClassCache::new(runtime.clone());
    let lp64 = ClassCache::with_config(runtime, CacheConfig::lp64());

    let counter = default.try_lookup_name("Counter")?;
    assert_eq!(counter.fields()["_value"].encoding.kind, TypeKind::Int32);
    assert_eq!(counter.methods()["value"].return_type().kind, TypeKind::UInt32);

    let counter = lp64.try_lookup_name("Counter")?;
    assert_eq!(counter.fields()["_value"].encoding.kind, TypeKind::Int64);
    assert_eq!(counter.methods()["value"].return_type().kind, TypeKind::UInt64);

    Ok(())
}
