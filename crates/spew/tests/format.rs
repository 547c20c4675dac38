//! End-to-end tests of the compact renderer and the façade.

use spew::model::cell_addr;
use spew::{Config, Method, Value};

fn cfg() -> Config {
    Config::default()
}

#[test]
fn test_flag_combinations() {
    let cell = Value::int(5).into_cell();
    let v = Value::record("Holder")
        .field("p", Value::ptr(&cell))
        .field("n", Value::nil_ptr("i64"))
        .build();
    let cfg = cfg();
    let f = cfg.formatter(&v);
    let addr = format!("{:#x}", cell_addr(&cell));

    assert_eq!(format!("{f}"), "{<*>5 <nil>}");
    assert_eq!(format!("{f:+}"), format!("{{p:<*>({addr})5 n:<nil>}}"));
    assert_eq!(format!("{f:#}"), "(Holder){p:(*i64)5 n:(*i64)<nil>}");
    assert_eq!(
        format!("{f:+#}"),
        format!("(Holder){{p:(*i64)({addr})5 n:(*i64)<nil>}}")
    );
}

#[test]
fn test_two_cycle_compact() {
    let a = Value::record("A")
        .field("b", Value::nil_ptr("B"))
        .build()
        .into_cell();
    let b = Value::record("B").field("a", Value::ptr(&a)).build().into_cell();
    a.borrow_mut().set_field("b", Value::ptr(&b));
    let top = Value::ptr(&a);

    let out = cfg().formatter(&top).to_string();
    assert_eq!(out, "<*>{<*>{<*><shown>}}");
    assert_eq!(out.matches("<shown>").count(), 1);
}

#[test]
fn test_methods_in_compact_output() {
    let temp = Value::f64(21.5).named("Celsius").with_string_method(Method::new(|v| {
        format!("{v}C")
    }));
    let failing = Value::from("raw").with_error_method(Method::new(|_| "disk full".into()));
    let v = Value::seq("dyn Display", vec![Value::boxed(temp), Value::boxed(failing)]);
    assert_eq!(cfg().formatter(&v).to_string(), "[21.5C disk full]");

    let no_methods = Config::builder().disable_methods(true).build();
    assert_eq!(no_methods.formatter(&v).to_string(), "[21.5 raw]");
}

#[test]
fn test_map_compact_sorted() {
    let v = Value::map(
        "String",
        "i64",
        vec![
            ("b".into(), Value::int(2)),
            ("a".into(), Value::int(1)),
            ("c".into(), Value::int(3)),
        ],
    );
    let sorted = Config::builder().sort_keys(true).build();
    assert_eq!(sorted.formatter(&v).to_string(), "map[a:1 b:2 c:3]");
    assert_eq!(
        format!("{:#}", sorted.formatter(&v)),
        "(HashMap<String, i64>)map[a:1 b:2 c:3]"
    );
}

#[test]
fn test_floats_and_complex() {
    let v = Value::seq(
        "f64",
        vec![
            Value::f64(1e6),
            Value::f64(0.25),
            Value::f64(f64::NAN),
            Value::complex128(1.0, -2.0),
        ],
    );
    assert_eq!(cfg().formatter(&v).to_string(), "[1e+06 0.25 NaN (1-2i)]");
}

#[test]
fn test_sprint_and_fprint() {
    let a = Value::int(1);
    let s = Value::from("-");
    let b = Value::seq("i64", vec![Value::int(2)]);
    let cfg = cfg();
    assert_eq!(cfg.sprint(&[&a, &s, &b]), "1-[2]");
    assert_eq!(cfg.sprint(&[&a, &b]), "1 [2]");

    let mut sink = Vec::new();
    let n = cfg.fprint(&mut sink, &[&a, &b]).unwrap();
    assert_eq!(n, 5);
    assert_eq!(String::from_utf8(sink).unwrap(), "1 [2]");
}

#[test]
fn test_debug_verb_forwards_to_value() {
    let v = Value::record("Point").field("x", 1i64).field("y", 2i64).build();
    assert_eq!(format!("{:?}", cfg().formatter(&v)), "Point{x: 1, y: 2}");
    assert_eq!(format!("{:>6x}", cfg().formatter(&Value::uint(255))), "    ff");
}

#[test]
fn test_unexported_field_methods() {
    let hidden = Value::int(3).with_string_method(Method::new(|_| "three".into()));
    let v = Value::record("Wrapper").private_field("inner", hidden).build();
    let expected = if spew::unsafe_introspection_available() {
        "{three}"
    } else {
        "{3}"
    };
    assert_eq!(cfg().formatter(&v).to_string(), expected);
}
