//! Dumps a circular doubly linked list in both output modes.
//!
//! Usage: `cargo run --example linked_list [LEN]`

use spew::{Config, Method, Value};

fn main() {
    let len: usize = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(3);

    let nodes: Vec<_> = (0..len.max(1))
        .map(|i| {
            Value::record("Node")
                .field("id", i as u64)
                .field("label", Value::string(format!("node-{i}")).with_string_method(Method::new(
                    move |_| format!("#{i}"),
                )))
                .field("next", Value::nil_ptr("Node"))
                .private_field("prev", Value::nil_ptr("Node"))
                .build()
                .into_cell()
        })
        .collect();

    for (i, node) in nodes.iter().enumerate() {
        let next = &nodes[(i + 1) % nodes.len()];
        let prev = &nodes[(i + nodes.len() - 1) % nodes.len()];
        let mut node = node.borrow_mut();
        node.set_field("next", Value::ptr(next));
        node.set_field("prev", Value::ptr(prev));
    }

    let head = Value::ptr(&nodes[0]);

    println!("=== dump ===");
    spew::dump(&[&head]);

    println!("\n=== dump (no addresses, no methods) ===");
    let cfg = Config::builder()
        .disable_pointer_addresses(true)
        .disable_methods(true)
        .build();
    print!("{}", cfg.sdump(&[&head]));

    println!("\n=== compact ===");
    println!("{}", spew::formatter(&head));
    println!("{:+#}", cfg.formatter(&head));
}
