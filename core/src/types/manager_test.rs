use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_interning_primitives() {
    let manager = TypeManager::new();

    assert_eq!(manager.i32(), manager.i32());
    assert_eq!(manager.string(), Ty::string());
    assert!(manager.i32() != manager.i64());
}

#[test]
fn test_interning_constructed() {
    let manager = TypeManager::new();

    let ints = manager.list(&manager.i32());
    assert_eq!(ints, manager.list(&manager.i32()));
    assert!(ints != manager.ilist(&manager.i32()));
    assert!(ints != manager.list(&manager.i64()));

    let maybe = manager.nullable(&manager.i32());
    assert_eq!(maybe, manager.nullable(&manager.i32()));
    assert_eq!(maybe.nullable_underlying(), Some(&manager.i32()));
}

#[test]
fn test_nullable_collapses() {
    let manager = TypeManager::new();

    let maybe = manager.nullable(&manager.i32());
    assert_eq!(manager.nullable(&maybe), maybe);
    assert_eq!(manager.nullable(&manager.string()), manager.string());
}

#[test]
fn test_display() {
    let manager = TypeManager::new();
    let point = manager
        .structure("Point")
        .unwrap()
        .field("X", &manager.i32())
        .build()
        .unwrap();

    assert_eq!(manager.nullable(&point).to_string(), "Point?");
    assert_eq!(manager.array(&manager.i32()).to_string(), "i32[]");
    assert_eq!(
        manager.enumerable(&manager.list(&manager.string())).to_string(),
        "IEnumerable<List<string>>"
    );
    assert_eq!(manager.iset(&point).to_string(), "ISet<Point>");
}

#[test]
fn test_members_inherit_base_slots() {
    let manager = TypeManager::new();
    let animal = manager
        .class("Animal")
        .unwrap()
        .property("Name", &manager.string())
        .build()
        .unwrap();
    let dog = manager
        .class("Dog")
        .unwrap()
        .base(&animal)
        .property("Breed", &manager.string())
        .build()
        .unwrap();

    let names: Vec<_> = dog.members().iter().map(|m| m.name().to_string()).collect();
    assert_eq!(names, vec!["Name", "Breed"]);
    assert_eq!(dog.find_member("Name"), animal.find_member("Name"));
    assert!(animal.is_assignable_from(&dog));
    assert!(!dog.is_assignable_from(&animal));
}

#[test]
fn test_forward_declaration() {
    let manager = TypeManager::new();
    let node = manager.declare_class("Node").unwrap();
    let built = manager
        .class("Node")
        .unwrap()
        .property("Next", &node)
        .build()
        .unwrap();

    assert_eq!(built, node);
    assert_eq!(node.find_member("Next").unwrap().ty(), &node);
    assert_eq!(manager.lookup("Node"), Some(node));
}

#[test]
fn test_definition_is_set_once() {
    let manager = TypeManager::new();
    let node = manager.declare_class("Node").unwrap();
    assert!(!node.object_def().unwrap().is_defined());

    let first = manager.class("Node").unwrap().property("Name", &manager.string());
    let second = manager.class("Node").unwrap().property("Id", &manager.i32());
    first.build().unwrap();
    assert_eq!(
        second.build(),
        Err(TypeError::Redefined {
            name: "Node".to_string()
        })
    );
    assert!(node.object_def().unwrap().is_defined());
    assert!(node.find_member("Name").is_some());
    assert!(node.find_member("Id").is_none());
}

#[test]
fn test_declaration_errors() {
    let manager = TypeManager::new();
    manager.class("Thing").unwrap().build().unwrap();

    assert!(matches!(
        manager.class("Thing"),
        Err(TypeError::Redefined { .. })
    ));
    assert!(matches!(
        manager.structure("Thing"),
        Err(TypeError::KindMismatch { .. })
    ));

    let duplicate = manager
        .class("Twice")
        .unwrap()
        .field("A", &manager.i32())
        .field("A", &manager.i64())
        .build();
    assert_eq!(
        duplicate,
        Err(TypeError::DuplicateMember {
            owner: "Twice".to_string(),
            member: "A".to_string(),
        })
    );

    let bad_enum = manager.enumeration("Bad", &manager.string()).build();
    assert!(matches!(bad_enum, Err(TypeError::InvalidUnderlying { .. })));
}

#[test]
fn test_struct_cannot_have_base() {
    let manager = TypeManager::new();
    let base = manager.class("Base").unwrap().build().unwrap();
    let result = manager.structure("Derived").unwrap().base(&base).build();

    assert!(matches!(result, Err(TypeError::InvalidBase { .. })));
}

#[test]
fn test_value_and_reference_types() {
    let manager = TypeManager::new();
    let color = manager
        .enumeration("Color", &manager.i32())
        .variant("Red", 0)
        .build()
        .unwrap();

    assert!(manager.i32().is_value_type());
    assert!(color.is_value_type());
    assert!(manager.nullable(&color).is_value_type());
    assert!(manager.string().is_reference_type());
    assert!(manager.list(&manager.i32()).is_reference_type());
    assert!(manager.list(&manager.i32()).is_class());
    assert!(!manager.enumerable(&manager.i32()).is_class());
}

#[test]
fn test_assignability() {
    let manager = TypeManager::new();
    let named = manager.interface("INamed").unwrap().build().unwrap();
    let person = manager
        .class("Person")
        .unwrap()
        .implements(&named)
        .build()
        .unwrap();
    let int = manager.i32();

    assert!(manager.object().is_assignable_from(&int));
    assert!(Ty::value_type().is_assignable_from(&int));
    assert!(manager.nullable(&int).is_assignable_from(&int));
    assert!(!int.is_assignable_from(&manager.nullable(&int)));
    assert!(named.is_assignable_from(&person));

    // Sequence variance.
    let people = manager.list(&person);
    assert!(manager.enumerable(&named).is_assignable_from(&people));
    assert!(manager.ilist(&person).is_assignable_from(&people));
    assert!(!manager.ilist(&named).is_assignable_from(&people));
    assert!(
        !manager
            .enumerable(&manager.object())
            .is_assignable_from(&manager.list(&int))
    );
    assert!(
        manager
            .enumerable(&manager.char())
            .is_assignable_from(&manager.string())
    );
}
