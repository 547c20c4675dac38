//! The shared default configuration drives the free functions.
//!
//! Kept in its own test binary because it mutates process-wide state.

use spew::{Config, Value};

#[test]
fn test_free_functions_follow_default_config() {
    let v = Value::record("P").field("x", 1i64).build();
    assert_eq!(spew::sdump(&[&v]), "(P) {\n x: (i64) 1\n}\n");
    assert_eq!(spew::formatter(&v).to_string(), "{1}");

    let previous = spew::set_default_config(Config::builder().indent("..").build());
    assert_eq!(previous, Config::default());
    assert_eq!(spew::sdump(&[&v]), "(P) {\n..x: (i64) 1\n}\n");

    spew::update_default_config(|cfg| cfg.max_depth = 1);
    let nested = Value::record("Outer").field("p", v.clone()).build();
    assert_eq!(
        spew::sdump(&[&nested]),
        "(Outer) {\n..p: (P) {\n....<max depth reached>\n..}\n}\n"
    );
    assert_eq!(spew::default_config().max_depth, 1);

    // A formatter keeps the snapshot it was created with.
    let f = spew::formatter(&nested);
    spew::set_default_config(Config::default());
    assert_eq!(f.to_string(), "{{<max>}}");
    assert_eq!(spew::sprint(&[&nested]), "{{1}}");

    let mut sink = Vec::new();
    spew::fdump(&mut sink, &[&Value::nil()]).unwrap();
    assert_eq!(sink, b"(dyn Any) <nil>\n");

    let mut sink = Vec::new();
    assert_eq!(spew::fprint(&mut sink, &[&Value::int(4)]).unwrap(), 1);
}
