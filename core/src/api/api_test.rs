use std::sync::Arc;

use super::*;
use crate::compiler::RuntimeError;
use crate::expr::Expr;
use crate::mapping::ConfigError;
use crate::types::{MemberSpec, Ty, TypeManager};
use crate::values::Value;
use pretty_assertions::assert_eq;

struct People {
    person: Ty,
    employee: Ty,
    contact: Ty,
}

fn people(m: &TypeManager) -> People {
    let person = m
        .class("Person")
        .unwrap()
        .property("Name", &m.string())
        .property("Age", &m.i32())
        .property("Secret", &m.string())
        .build()
        .unwrap();
    let employee = m
        .class("Employee")
        .unwrap()
        .base(&person)
        .property("Salary", &m.f64())
        .build()
        .unwrap();
    let contact = m
        .class("Contact")
        .unwrap()
        .property("Name", &m.string())
        .property("Age", &m.string())
        .property("Secret", &m.string())
        .property("Label", &m.string())
        .build()
        .unwrap();
    People {
        person,
        employee,
        contact,
    }
}

fn ada(ty: &Ty) -> Value {
    let value = Value::construct(ty);
    let object = value.as_object().unwrap();
    object.set("Name", Value::from("Ada"));
    object.set("Age", Value::from(36));
    object.set("Secret", Value::from("hunter2"));
    value
}

#[test]
fn test_auto_bind_converts_members() {
    crate::test_utils::init_test_logging();
    let m = TypeManager::new();
    let p = people(&m);

    let mut builder = MapperBuilder::new(&m, &p.person, &p.contact);
    builder.auto_bind();
    assert_eq!(builder.bindings().len(), 3);
    let mapper = builder.build().unwrap();

    let contact = mapper.map(&ada(&p.person)).unwrap();
    assert_eq!(contact.get("Name"), Some(Value::from("Ada")));
    assert_eq!(contact.get("Age"), Some(Value::from("36")));
    assert_eq!(contact.get("Label"), Some(Value::Null));
}

#[test]
fn test_ignore_skips_source_member() {
    let m = TypeManager::new();
    let p = people(&m);

    let mut builder = MapperBuilder::new(&m, &p.person, &p.contact);
    builder.ignore("Secret").unwrap().auto_bind();
    let mapper = builder.build().unwrap();

    let contact = mapper.map(&ada(&p.person)).unwrap();
    assert_eq!(contact.get("Name"), Some(Value::from("Ada")));
    assert_eq!(contact.get("Secret"), Some(Value::Null));
}

#[test]
fn test_explicit_binding_overrides_auto_binding() {
    let m = TypeManager::new();
    let p = people(&m);

    let mut builder = MapperBuilder::new(&m, &p.person, &p.contact);
    builder.auto_bind();
    let label = builder.target().field("Label").unwrap();
    let name = builder.source().field("Name").unwrap();
    builder.bind(label, name).unwrap();
    builder.bind_path("Name", "Secret").unwrap();
    let mapper = builder.build().unwrap();

    let contact = mapper.map(&ada(&p.person)).unwrap();
    assert_eq!(contact.get("Label"), Some(Value::from("Ada")));
    assert_eq!(contact.get("Name"), Some(Value::from("hunter2")));
}

#[test]
fn test_bind_value_with_host_function() {
    let m = TypeManager::new();
    let p = people(&m);

    let mut builder = MapperBuilder::new(&m, &p.person, &p.contact);
    let name = builder.source().field("Name").unwrap();
    let shout = Expr::host_call("shout", vec![name], &m.string(), |args| {
        match args[0].as_str() {
            Some(text) => Value::from(text.to_uppercase()),
            None => Value::Null,
        }
    });
    builder.bind_value("Label", shout).unwrap();
    let mapper = builder.build().unwrap();

    let contact = mapper.map(&ada(&p.person)).unwrap();
    assert_eq!(contact.get("Label"), Some(Value::from("ADA")));
    assert_eq!(contact.get("Name"), Some(Value::Null));
}

#[test]
fn test_auto_bind_with_custom_predicate() {
    let m = TypeManager::new();
    let p = people(&m);

    let mut builder = MapperBuilder::new(&m, &p.person, &p.contact);
    builder.auto_bind_with(|source, target| {
        source.name() == target.name() && source.ty() == target.ty() && source.name() != "Secret"
    });
    assert_eq!(builder.bindings().len(), 1);
    let contact = builder.build().unwrap().map(&ada(&p.person)).unwrap();
    assert_eq!(contact.get("Name"), Some(Value::from("Ada")));
    assert_eq!(contact.get("Age"), Some(Value::Null));
}

#[test]
fn test_binding_errors() {
    let m = TypeManager::new();
    let p = people(&m);
    let mut builder = MapperBuilder::new(&m, &p.person, &p.contact);

    let target_name = builder.target().field("Name").unwrap();
    assert_eq!(
        builder.bind(target_name.clone(), target_name).err(),
        Some(ConfigError::ForeignVariable {
            expr: "dst.Name".to_string()
        })
    );

    let source_name = builder.source().field("Name").unwrap();
    assert_eq!(
        builder.bind(source_name.clone(), source_name).err(),
        Some(ConfigError::NotMemberChain {
            expr: "src.Name".to_string(),
            side: "target",
        })
    );

    assert_eq!(
        builder.bind_path("Nmae", "Name").err(),
        Some(ConfigError::UnknownMember {
            ty: "Contact".to_string(),
            name: "Nmae".to_string(),
            path: "Nmae".to_string(),
            offset: 0,
        })
    );
    assert!(builder.bindings().is_empty());
}

#[test]
fn test_write_only_source_member() {
    let m = TypeManager::new();
    let p = people(&m);
    let drop_box = m
        .class("DropBox")
        .unwrap()
        .member(MemberSpec::property("Name", &m.string()).write_only())
        .build()
        .unwrap();

    let mut builder = MapperBuilder::new(&m, &drop_box, &p.contact);
    assert_eq!(
        builder.bind_path("Name", "Name").err(),
        Some(ConfigError::WriteOnlyMember {
            path: "DropBox.Name".to_string()
        })
    );
    builder.auto_bind();
    assert!(builder.bindings().is_empty());
}

#[test]
fn test_conversion_shortcut() {
    let m = TypeManager::new();
    let p = people(&m);
    let employee = ada(&p.employee);

    // Upcast: the input itself comes back.
    let shortcut = MapperBuilder::new(&m, &p.employee, &p.person).build().unwrap();
    let same = shortcut.map(&employee).unwrap();
    assert!(same.as_object().unwrap().ptr_eq(employee.as_object().unwrap()));

    let options = MapperOptions {
        conversion_shortcut: false,
        ..MapperOptions::default()
    };
    let mut builder = MapperBuilder::new(&m, &p.employee, &p.person).with_options(options);
    builder.auto_bind();
    let copy = builder.build().unwrap().map(&employee).unwrap();
    assert!(!copy.as_object().unwrap().ptr_eq(employee.as_object().unwrap()));
    assert_eq!(copy.get("Name"), Some(Value::from("Ada")));
    assert_eq!(copy.runtime_type(), Some(p.person.clone()));
}

#[test]
fn test_removed_rule_is_not_used() {
    let m = TypeManager::new();
    let p = people(&m);

    let mut builder = MapperBuilder::new(&m, &p.person, &p.contact);
    assert!(builder.converters_mut().remove("ToString"));
    builder.bind_path("Age", "Age").unwrap();
    assert_eq!(
        builder.build().err(),
        Some(Error::Config(ConfigError::UnsupportedConversion {
            from: "i32".to_string(),
            to: "string".to_string(),
            path: "Age".to_string(),
        }))
    );
}

#[test]
fn test_input_mismatch() {
    let m = TypeManager::new();
    let p = people(&m);
    let mut builder = MapperBuilder::new(&m, &p.employee, &p.contact);
    builder.auto_bind();
    let mapper = builder.build().unwrap();

    assert_eq!(
        mapper.map(&ada(&p.person)),
        Err(RuntimeError::InputMismatch {
            expected: "Employee".to_string(),
            found: "Person".to_string(),
        })
    );
    assert_eq!(
        mapper.map(&Value::Null).map(|contact| contact.get("Name")),
        Ok(Some(Value::Null))
    );
}

#[test]
fn test_mapper_display_shows_program() {
    let m = TypeManager::new();
    let p = people(&m);
    let mut builder = MapperBuilder::new(&m, &p.person, &p.contact);
    builder.bind_path("Label", "Name").unwrap();
    let mapper = builder.build().unwrap();

    let text = mapper.to_string();
    assert!(text.contains("out = new Contact()"), "{}", text);
    assert!(text.contains("out.Label = x.Name"), "{}", text);
    assert_eq!(text, mapper.program().to_string());
}

#[test]
fn test_registry_caches_default_mapper() {
    let m = Arc::new(TypeManager::new());
    let p = people(&m);
    let registry = MapperRegistry::new(m.clone());
    assert!(registry.is_empty());

    let first = registry.default_mapper(&p.person, &p.contact).unwrap();
    let second = registry.default_mapper(&p.person, &p.contact).unwrap();
    assert!(first.ptr_eq(&second));
    assert_eq!(registry.len(), 1);

    let other = registry.default_mapper(&p.employee, &p.contact).unwrap();
    assert!(!other.ptr_eq(&first));
    assert_eq!(registry.len(), 2);
}

#[test]
fn test_registry_concurrent_requests_share_one_mapper() {
    let m = Arc::new(TypeManager::new());
    let p = people(&m);
    let registry = MapperRegistry::new(m.clone());

    let mappers: Vec<Mapper> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| registry.default_mapper(&p.person, &p.contact).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(mappers.iter().all(|mapper| mapper.ptr_eq(&mappers[0])));
}

#[test]
fn test_registry_does_not_cache_failures() {
    let m = Arc::new(TypeManager::new());
    let p = people(&m);
    let handle = m
        .class("Handle")
        .unwrap()
        .property("Name", &m.string())
        .without_default_constructor()
        .build()
        .unwrap();
    let registry = MapperRegistry::new(m.clone());

    let expected = Err(Error::Config(ConfigError::NotConstructible {
        ty: "Handle".to_string(),
    }));
    assert_eq!(registry.default_mapper(&p.person, &handle).map(|_| ()), expected);
    assert_eq!(registry.default_mapper(&p.person, &handle).map(|_| ()), expected);
}

#[test]
fn test_root_bound_to_source_leaves_input_untouched() {
    let m = TypeManager::new();
    let p = people(&m);
    let input = ada(&p.person);

    let mut builder = MapperBuilder::new(&m, &p.person, &p.person);
    let (dst, src) = (builder.target(), builder.source());
    builder.bind(dst, src).unwrap();
    let same = builder.build().unwrap().map(&input).unwrap();
    assert!(same.as_object().unwrap().ptr_eq(input.as_object().unwrap()));

    builder
        .bind_value("Name", Expr::constant(Value::from("X"), &m.string()))
        .unwrap();
    assert_eq!(
        builder.build().map(|_| ()),
        Err(Error::Config(ConfigError::AliasedRoot {
            expr: "src".to_string()
        }))
    );
    assert_eq!(input.get("Name"), Some(Value::from("Ada")));
}
