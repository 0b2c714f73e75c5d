mod cases;

use std::sync::Arc;

use cases::object;
use pretty_assertions::assert_eq;
use remap::{ConfigError, ConverterChain, Error, MapperRegistry, TypeManager, Value};

fn registry() -> (MapperRegistry, remap::Ty, remap::Ty) {
    let types = Arc::new(TypeManager::new());
    let source = types
        .class("Reading")
        .unwrap()
        .property("Sensor", &types.string())
        .property("Celsius", &types.f64())
        .build()
        .unwrap();
    let target = types
        .class("ReadingView")
        .unwrap()
        .property("Sensor", &types.string())
        .property("Celsius", &types.string())
        .build()
        .unwrap();
    (MapperRegistry::new(types), source, target)
}

#[test]
fn default_mapper_is_built_once_under_contention() {
    let (registry, source, target) = registry();

    let mappers = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..16)
            .map(|_| scope.spawn(|| registry.default_mapper(&source, &target).unwrap()))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect::<Vec<_>>()
    });

    assert_eq!(registry.len(), 1);
    assert!(mappers.iter().all(|mapper| mapper.ptr_eq(&mappers[0])));
}

#[test]
fn compiled_mapper_runs_concurrently() {
    let (registry, source, target) = registry();
    let mapper = registry.default_mapper(&source, &target).unwrap();

    std::thread::scope(|scope| {
        for i in 0..8 {
            let mapper = mapper.clone();
            let source = source.clone();
            scope.spawn(move || {
                let reading = object(
                    &source,
                    &[
                        ("Sensor", Value::from(format!("s{}", i))),
                        ("Celsius", Value::from(i as f64 + 0.5)),
                    ],
                );
                let view = mapper.map(&reading).unwrap();
                assert_eq!(view.get("Sensor"), Some(Value::from(format!("s{}", i))));
                assert_eq!(view.get("Celsius"), Some(Value::from(format!("{}.5", i))));
            });
        }
    });
}

#[test]
fn registry_converters_apply_to_default_mappers() {
    let (registry, source, target) = registry();
    let mut chain = ConverterChain::new();
    assert!(chain.remove("ToString"));
    let registry = MapperRegistry::new(registry.types().clone()).with_converters(chain);

    // Without ToString nothing matches `Celsius`; it keeps its default.
    let mapper = registry.default_mapper(&source, &target).unwrap();
    let view = mapper
        .map(&object(&source, &[("Celsius", Value::from(1.0))]))
        .unwrap();
    assert_eq!(view.get("Celsius"), Some(Value::Null));

    let mut builder = registry.builder(&source, &target);
    builder.bind_path("Celsius", "Celsius").unwrap();
    assert_eq!(
        builder.build().err(),
        Some(Error::Config(ConfigError::UnsupportedConversion {
            from: "f64".to_string(),
            to: "string".to_string(),
            path: "Celsius".to_string(),
        }))
    );
}
