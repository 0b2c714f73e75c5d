use super::*;
use crate::expr::{Callee, ConvertOp, Local};
use crate::types::TypeManager;
use crate::values::ConversionError;
use pretty_assertions::assert_eq;

struct Shapes {
    point: Ty,
    shape: Ty,
}

fn shapes(m: &TypeManager) -> Shapes {
    let point = m
        .structure("Point")
        .unwrap()
        .field("X", &m.i32())
        .field("Y", &m.i32())
        .build()
        .unwrap();
    let shape = m
        .class("Shape")
        .unwrap()
        .property("Name", &m.string())
        .property("Origin", &point)
        .build()
        .unwrap();
    Shapes { point, shape }
}

fn input(ty: &Ty) -> Expr {
    Expr::param(Var(0), "x", ty)
}

fn local(index: u32, name: &str, ty: &Ty) -> Local {
    Local {
        var: Var(index),
        name: name.into(),
        ty: ty.clone(),
    }
}

fn run(expr: &Expr, value: Value) -> Result<Value, RuntimeError> {
    Program::compile(expr, Var(0)).unwrap().run(value)
}

#[test]
fn test_struct_local_is_updated_in_place() {
    crate::test_utils::init_test_logging();
    let m = TypeManager::new();
    let s = shapes(&m);
    let p = local(1, "p", &s.point);

    let expr = Expr::block(
        vec![p.clone()],
        vec![
            Expr::assign(Expr::local(&p), Expr::construct(&s.point)),
            Expr::assign(
                Expr::local(&p).field("X").unwrap(),
                Expr::constant(Value::I32(5), &m.i32()),
            ),
            Expr::local(&p),
        ],
        &s.point,
    );

    let result = run(&expr, Value::Null).unwrap();
    assert_eq!(result.get("X"), Some(Value::I32(5)));
    assert_eq!(result.get("Y"), Some(Value::I32(0)));
}

#[test]
fn test_struct_member_of_object_is_written_through() {
    let m = TypeManager::new();
    let s = shapes(&m);
    let x = input(&s.shape);

    let expr = Expr::assign(
        x.clone().field("Origin").unwrap().field("Y").unwrap(),
        Expr::constant(Value::I32(7), &m.i32()),
    );

    let shape = Value::construct(&s.shape);
    run(&expr, shape.clone()).unwrap();
    let origin = shape.get("Origin").unwrap();
    assert_eq!(origin.get("Y"), Some(Value::I32(7)));
    assert_eq!(origin.get("X"), Some(Value::I32(0)));
}

#[test]
fn test_null_reads_and_writes() {
    let m = TypeManager::new();
    let s = shapes(&m);
    let x = input(&s.shape);

    let read = x.clone().field("Origin").unwrap().field("X").unwrap();
    assert_eq!(run(&read, Value::Null), Ok(Value::I32(0)));

    let write = Expr::assign(
        x.field("Name").unwrap(),
        Expr::constant(Value::from("a"), &m.string()),
    );
    assert_eq!(run(&write, Value::Null), Ok(Value::from("a")));
}

#[test]
fn test_collect_checks_items() {
    let m = TypeManager::new();
    let objects = m.list(&m.object());
    let ints = m.array(&m.i32());
    let expr = input(&objects).collect_seq(&ints, Some(m.i32()));

    let good = Value::seq(&objects, vec![Value::I32(1), Value::I32(2)]);
    let result = run(&expr, good).unwrap();
    assert_eq!(result.as_seq().map(|seq| seq.items()), Some(vec![Value::I32(1), Value::I32(2)]));
    assert_eq!(result.as_seq().map(|seq| seq.ty().clone()), Some(ints.clone()));

    let bad = Value::seq(&objects, vec![Value::I32(1), Value::from("two")]);
    assert_eq!(
        run(&expr, bad),
        Err(RuntimeError::Conversion(ConversionError::InvalidCast {
            from: "string".to_string(),
            to: "i32".to_string(),
        }))
    );
    assert_eq!(run(&expr, Value::Null), Ok(Value::Null));
}

#[test]
fn test_enum_parse_and_numeric_cast() {
    let m = TypeManager::new();
    let color = m
        .enumeration("Color", &m.u8())
        .variant("Red", 1)
        .variant("Green", 2)
        .build()
        .unwrap();

    let parse = Expr::call(Callee::ParseEnum, vec![input(&m.string())], &color);
    assert_eq!(run(&parse, Value::from("green")), Ok(Value::enumeration(&color, 2)));
    assert_eq!(run(&parse, Value::from("purple")), Ok(Value::enumeration(&color, 0)));
    assert_eq!(run(&parse, Value::Null), Ok(Value::enumeration(&color, 0)));

    let to_bits = input(&color).convert(ConvertOp::Numeric, &m.u8());
    assert_eq!(run(&to_bits, Value::enumeration(&color, 2)), Ok(Value::U8(2)));
    let from_bits = input(&m.u8()).convert(ConvertOp::Numeric, &color);
    assert_eq!(run(&from_bits, Value::U8(1)).ok(), Value::variant(&color, "Red"));
}

#[test]
fn test_temporary_struct_is_not_addressable() {
    let m = TypeManager::new();
    let s = shapes(&m);
    let point = s.point.clone();
    let make = Expr::host_call("make", Vec::new(), &s.point, move |_| Value::zero(&point));

    let expr = Expr::assign(
        make.field("X").unwrap(),
        Expr::constant(Value::I32(1), &m.i32()),
    );
    assert_eq!(
        Program::compile(&expr, Var(0)).err(),
        Some(CompileError::NotAddressable {
            expr: "make().X".to_string()
        })
    );
}

#[test]
fn test_type_as_and_coalesce() {
    let m = TypeManager::new();
    let int = m.i32();
    let unbox = input(&m.object())
        .type_as(&m.nullable(&int))
        .coalesce(Expr::default(&int));

    assert_eq!(run(&unbox, Value::I32(4)), Ok(Value::I32(4)));
    assert_eq!(run(&unbox, Value::from("4")), Ok(Value::I32(0)));
    assert_eq!(run(&unbox, Value::Null), Ok(Value::I32(0)));
}
