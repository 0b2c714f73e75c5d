#![allow(dead_code)]

use once_cell::sync::Lazy;
use remap::{Ty, TypeManager, Value};

/// Types shared by the integration tests.
pub struct Catalog {
    pub types: TypeManager,
    pub order: Ty,
    pub order_summary: Ty,
    pub point: Ty,
    pub inner: Ty,
    pub layer: Ty,
    pub wrapper: Ty,
    pub flat: Ty,
    pub holder: Ty,
    pub report: Ty,
    pub canvas: Ty,
    pub sprite: Ty,
    pub animal: Ty,
    pub dog: Ty,
}

pub static CATALOG: Lazy<Catalog> = Lazy::new(|| {
    let types = TypeManager::new();
    let s = types.string();
    let i = types.i32();

    let order = types
        .class("Order")
        .unwrap()
        .property("Name", &s)
        .property("Count", &i)
        .build()
        .unwrap();
    let order_summary = types
        .class("OrderSummary")
        .unwrap()
        .property("Name", &s)
        .property("Count", &s)
        .property("Note", &s)
        .property("Priority", &i)
        .build()
        .unwrap();

    let point = types
        .structure("Point")
        .unwrap()
        .field("X", &i)
        .field("Y", &i)
        .build()
        .unwrap();
    let canvas = types
        .class("Canvas")
        .unwrap()
        .property("X", &i)
        .build()
        .unwrap();
    let sprite = types
        .class("Sprite")
        .unwrap()
        .property("Name", &s)
        .property("Position", &point)
        .build()
        .unwrap();

    // A.B.C on the source side, T2.Inner.Value on the target side.
    let inner = types
        .class("Inner")
        .unwrap()
        .property("Value", &s)
        .property("Label", &s)
        .build()
        .unwrap();
    let layer = types
        .class("Layer")
        .unwrap()
        .property("C", &s)
        .build()
        .unwrap();
    let wrapper = types
        .class("Wrapper")
        .unwrap()
        .property("B", &layer)
        .build()
        .unwrap();
    let flat = types
        .class("Flat")
        .unwrap()
        .property("A", &wrapper)
        .build()
        .unwrap();
    let holder = types
        .class("Holder")
        .unwrap()
        .property("Inner", &inner)
        .property("Size", &i)
        .build()
        .unwrap();
    let report = types
        .class("Report")
        .unwrap()
        .property("T1", &s)
        .property("T2", &holder)
        .build()
        .unwrap();

    let animal = types
        .class("Animal")
        .unwrap()
        .property("Name", &s)
        .build()
        .unwrap();
    let dog = types
        .class("Dog")
        .unwrap()
        .base(&animal)
        .property("Breed", &s)
        .build()
        .unwrap();

    Catalog {
        types,
        order,
        order_summary,
        point,
        inner,
        layer,
        wrapper,
        flat,
        holder,
        report,
        canvas,
        sprite,
        animal,
        dog,
    }
});

/// A new instance of the class `ty` with the given members set.
pub fn object(ty: &Ty, fields: &[(&str, Value)]) -> Value {
    let value = Value::construct(ty);
    let object = value.as_object().unwrap();
    for (name, field) in fields {
        assert!(object.set(name, field.clone()), "no member {}", name);
    }
    value
}
