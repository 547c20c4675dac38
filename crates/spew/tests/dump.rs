//! End-to-end tests of the verbose renderer.

use spew::model::{cell_addr, Receiver};
use spew::{Config, IntWidth, MapBuilder, Method, Value};

fn plain() -> Config {
    Config::builder().disable_pointer_addresses(true).build()
}

/// Builds `a -> b -> a` through record fields.
fn two_cycle() -> Value {
    let a = Value::record("A")
        .field("b", Value::nil_ptr("B"))
        .build()
        .into_cell();
    let b = Value::record("B").field("a", Value::ptr(&a)).build().into_cell();
    a.borrow_mut().set_field("b", Value::ptr(&b));
    Value::ptr(&a)
}

#[test]
fn test_cycle_reported_exactly_once() {
    let out = plain().sdump(&[&two_cycle()]);
    assert_eq!(out.matches("<already shown>").count(), 1, "{out}");
    assert_eq!(
        out,
        "(*A)({\n b: (*B)({\n  a: (*A)(<already shown>)\n })\n})\n"
    );
}

#[test]
fn test_shared_target_is_not_a_cycle() {
    let shared = Value::int(9).into_cell();
    let v = Value::record("Pair")
        .field("left", Value::ptr(&shared))
        .field("right", Value::ptr(&shared))
        .build();
    let out = plain().sdump(&[&v]);
    assert_eq!(out, "(Pair) {\n left: (*i64)(9),\n right: (*i64)(9)\n}\n");
}

#[test]
fn test_pointer_chain_lists_every_hop() {
    let target = Value::from("deep").into_cell();
    let mid = Value::ptr(&target).into_cell();
    let top = Value::ptr(&mid);
    let out = Config::default().sdump(&[&top]);
    assert_eq!(
        out,
        format!(
            "(**String)({:#x}->{:#x})((len=4) \"deep\")\n",
            cell_addr(&mid),
            cell_addr(&target)
        )
    );
}

#[test]
fn test_max_depth_one() {
    let cfg = Config::builder().max_depth(1).build();
    let v = Value::seq(
        "Vec<i64>",
        vec![Value::seq("i64", vec![Value::int(1)]), Value::seq("i64", vec![])],
    );
    assert_eq!(
        cfg.sdump(&[&v]),
        "(Vec<Vec<i64>>) (len=2 cap=2) {\n (Vec<i64>) (len=1 cap=1) {\n  <max depth reached>\n },\n (Vec<i64>) {\n  <max depth reached>\n }\n}\n"
    );
}

#[test]
fn test_panicking_method_inside_sequence() {
    let bad = Value::record("Bad")
        .field("n", 1i64)
        .build()
        .with_string_method(Method::new(|_| panic!("no description")));
    let fine = Value::record("Bad").field("n", 2i64).build();
    let v = Value::seq("Bad", vec![bad, fine]);
    assert_eq!(
        Config::default().sdump(&[&v]),
        "(Vec<Bad>) (len=2 cap=2) {\n (Bad) (PANIC=no description){\n  n: (i64) 1\n },\n (Bad) {\n  n: (i64) 2\n }\n}\n"
    );
}

#[test]
fn test_continue_on_method() {
    let v = Value::int(42).with_string_method(Method::new(|_| "answer".into()));
    let cfg = Config::builder().continue_on_method(true).build();
    assert_eq!(cfg.sdump(&[&v]), "(i64) (answer) 42\n");
}

#[test]
fn test_pointer_receiver_through_indirection() {
    let cfg = Config::builder()
        .disable_pointer_methods(true)
        .disable_pointer_addresses(true)
        .build();
    let describe = || Method::pointer(|v| format!("<{}>", v.ty()));
    assert_eq!(describe().receiver(), Receiver::Pointer);

    // Not addressable at the top level.
    let v = Value::int(1).named("Id").with_string_method(describe());
    assert_eq!(cfg.sdump(&[&v]), "(Id) 1\n");

    // Addressable once reached through an indirection.
    let cell = v.clone().into_cell();
    assert_eq!(cfg.sdump(&[&Value::ptr(&cell)]), "(*Id)(<Id>)\n");

    // Slice elements are addressable; map values are not.
    let slice = Value::seq("Id", vec![v.clone()]);
    assert_eq!(cfg.sdump(&[&slice]), "(Vec<Id>) (len=1 cap=1) {\n (Id) <Id>\n}\n");
    let map = MapBuilder::new("i64", "Id").entry(1i64, v).build();
    assert_eq!(
        cfg.sdump(&[&map]),
        "(HashMap<i64, Id>) (len=1) {\n (i64) 1: (Id) 1\n}\n"
    );
}

#[test]
fn test_nil_versus_empty() {
    let cfg = Config::default();
    let out = cfg.sdump(&[
        &Value::nil_bytes(),
        &Value::bytes(Vec::new()),
        &Value::nil_map("String", "i64"),
        &Value::map("String", "i64", vec![]),
        &Value::nil(),
    ]);
    assert_eq!(
        out,
        "(Vec<u8>) <nil>\n\
         (Vec<u8>) {\n}\n\
         (HashMap<String, i64>) <nil>\n\
         (HashMap<String, i64>) {\n}\n\
         (dyn Any) <nil>\n"
    );
}

#[test]
fn test_byte_slice_hex_dump_is_indented() {
    let v = Value::record("Packet")
        .field("payload", Value::bytes((0u8..18).collect::<Vec<_>>()))
        .build();
    let out = Config::default().sdump(&[&v]);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "(Packet) {");
    assert_eq!(lines[1], " payload: (Vec<u8>) (len=18 cap=18) {");
    assert!(lines[2].starts_with("  00000000  00 01 02"), "{}", lines[2]);
    assert!(lines[3].starts_with("  00000010  10 11"), "{}", lines[3]);
    assert_eq!(lines[4], " }");
    assert_eq!(lines[5], "}");
}

#[test]
fn test_u8_sequence_is_hex_dumped() {
    let v = Value::seq(
        "u8",
        vec![Value::uint_of(0x41, IntWidth::W8), Value::uint_of(0x42, IntWidth::W8)],
    );
    let out = Config::default().sdump(&[&v]);
    assert!(out.contains("00000000  41 42"), "{out}");
    assert!(out.contains("|AB|"), "{out}");
}

#[test]
fn test_channel_and_addresses() {
    let cfg = Config::default();
    let ch = Value::chan("i64", 0x1000, 2).with_capacity(8);
    assert_eq!(cfg.sdump(&[&ch]), "(Receiver<i64>) (len=2 cap=8) 0x1000\n");
    assert_eq!(cfg.sdump(&[&Value::uintptr(0)]), "(uintptr) <nil>\n");
    assert_eq!(cfg.sdump(&[&Value::raw_ptr(0xbeef)]), "(*const ()) 0xbeef\n");
}

#[test]
fn test_opaque_uses_display() {
    let v = Value::opaque("Ipv4Addr", std::net::Ipv4Addr::new(10, 0, 0, 1));
    assert_eq!(Config::default().sdump(&[&v]), "(Ipv4Addr) 10.0.0.1\n");
}

#[test]
fn test_mutably_borrowed_cell_renders_invalid() {
    let cell = Value::int(1).into_cell();
    let ptr = Value::ptr(&cell);
    let _guard = cell.borrow_mut();
    assert_eq!(plain().sdump(&[&ptr]), "(*i64)(<invalid>)\n");
}

#[test]
fn test_custom_indent() {
    let cfg = Config::builder().indent("\t").build();
    let v = Value::record("P").field("x", 1i64).build();
    assert_eq!(cfg.sdump(&[&v]), "(P) {\n\tx: (i64) 1\n}\n");
}
