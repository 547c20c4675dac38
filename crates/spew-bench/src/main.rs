//! Throughput benchmark for the verbose and compact renderers.
//!
//! Loads city records from JSON (or generates a synthetic set), turns them
//! into a cyclic value graph in which every country points at its capital
//! and every city points back at its country, then times rendering.

use std::collections::HashMap;
use std::fs;
use std::thread;
use std::time::{Duration, Instant};

use serde::Deserialize;
use spew::{Cell, Config, Kind, MapBuilder, Method, Value};
use tracing::info;
use tracing_subscriber::EnvFilter;

// =============================================================================
// JSON DATA STRUCTURES
// =============================================================================

#[derive(Debug, Deserialize)]
struct City {
    id: u32,
    name: String,
    country_id: u32,
    country_code: String,
    country_name: String,
    latitude: String,
    longitude: String,
    population: Option<i64>,
    timezone: Option<String>,
    translations: Option<HashMap<String, String>>,
}

fn synthetic_json(count: usize) -> String {
    let cities: Vec<serde_json::Value> = (0..count)
        .map(|i| {
            let country = i % 50;
            serde_json::json!({
                "id": i,
                "name": format!("City {i}"),
                "country_id": country,
                "country_code": format!("C{country:02}"),
                "country_name": format!("Country {country}"),
                "latitude": format!("{:.4}", (i % 180) as f64 - 90.0),
                "longitude": format!("{:.4}", (i % 360) as f64 - 180.0),
                "population": if i % 3 == 0 { serde_json::Value::Null } else { (i * 1000).into() },
                "timezone": "UTC",
                "translations": { "de": format!("Stadt {i}"), "fr": format!("Ville {i}") },
            })
        })
        .collect();
    serde_json::Value::Array(cities).to_string()
}

// =============================================================================
// CONVERSION TO A VALUE GRAPH
// =============================================================================

fn city_value(city: &City, country: &Cell) -> Value {
    let mut builder = Value::record("City")
        .field("id", city.id)
        .field("name", city.name.as_str())
        .field("country", Value::ptr(country));

    if let (Ok(lat), Ok(lon)) = (city.latitude.parse::<f64>(), city.longitude.parse::<f64>()) {
        let location = Value::array("f64", vec![Value::f64(lat), Value::f64(lon)])
            .named("LatLon")
            .with_string_method(Method::new(move |_| format!("{lat:.2},{lon:.2}")));
        builder = builder.field("location", location);
    }

    builder = match city.population {
        Some(pop) => builder.field("population", Value::boxed(Value::int(pop))),
        None => builder.field("population", Value::nil()),
    };
    builder = builder.private_field(
        "timezone",
        city.timezone.as_deref().map_or_else(Value::nil, |tz| Value::boxed(tz.into())),
    );

    if let Some(translations) = &city.translations {
        let map = MapBuilder::new("String", "String")
            .entries(translations.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .build();
        builder = builder.field("translations", map);
    }

    builder.build()
}

/// Builds the graph and returns the list of city pointers.
fn convert(cities: &[City]) -> Value {
    let mut countries: HashMap<u32, Cell> = HashMap::new();
    let mut items = Vec::with_capacity(cities.len());

    for city in cities {
        let country = countries
            .entry(city.country_id)
            .or_insert_with(|| {
                Value::record("Country")
                    .field("code", city.country_code.as_str())
                    .field("name", city.country_name.as_str())
                    .field("capital", Value::nil_ptr("City"))
                    .build()
                    .into_cell()
            })
            .clone();

        let city_cell = city_value(city, &country).into_cell();
        let ptr = Value::ptr(&city_cell);

        // The first city seen becomes the capital, closing a cycle.
        let mut country_value = country.borrow_mut();
        let has_capital = matches!(
            country_value.kind(),
            Kind::Record(fields)
                if fields.iter().any(|f| &*f.name == "capital" && !is_nil_ptr(&f.value))
        );
        if !has_capital {
            country_value.set_field("capital", ptr.clone());
        }
        drop(country_value);

        items.push(ptr);
    }

    Value::seq("*City", items)
}

fn is_nil_ptr(v: &Value) -> bool {
    matches!(v.kind(), Kind::Ptr(p) if p.is_nil())
}

// =============================================================================
// TIMING
// =============================================================================

fn report(label: &str, bytes: usize, elapsed: Duration) {
    info!(
        label,
        bytes,
        elapsed_ms = elapsed.as_secs_f64() * 1000.0,
        "rendered"
    );
    println!(
        "{label}: {bytes} bytes in {elapsed:?} ({:.2} MB/s)",
        (bytes as f64 / 1_000_000.0) / elapsed.as_secs_f64()
    );
}

fn bench_verbose(label: &str, cfg: &Config, graph: &Value) -> String {
    let start = Instant::now();
    let out = cfg.sdump(&[graph]);
    report(label, out.len(), start.elapsed());
    out
}

fn bench_compact(label: &str, cfg: &Config, graph: &Value) -> String {
    let start = Instant::now();
    let out = format!("{:+#}", cfg.formatter(graph));
    report(label, out.len(), start.elapsed());
    out
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let json_data = match std::env::args().nth(1) {
        Some(path) => {
            println!("Loading cities from: {path}");
            fs::read_to_string(&path).expect("Failed to read cities JSON")
        }
        None => {
            println!("No input given, generating 20000 synthetic cities");
            synthetic_json(20_000)
        }
    };

    let parse_start = Instant::now();
    let cities: Vec<City> = serde_json::from_str(&json_data).expect("Failed to parse JSON");
    println!("Loaded {} cities in {:?}", cities.len(), parse_start.elapsed());

    let convert_start = Instant::now();
    let graph = convert(&cities);
    println!("Built value graph in {:?}", convert_start.elapsed());

    let default = Config::default();
    let sorted = Config::builder()
        .sort_keys(true)
        .disable_pointer_addresses(true)
        .build();
    let shallow = Config::builder().max_depth(2).build();

    println!();
    bench_verbose("verbose", &default, &graph);
    let first = bench_verbose("verbose (sorted, no addresses)", &sorted, &graph);
    bench_verbose("verbose (max depth 2)", &shallow, &graph);
    bench_compact("compact {:+#}", &default, &graph);

    // Sorted output without addresses must not depend on the run.
    let second = sorted.sdump(&[&graph]);
    assert_eq!(first, second, "sorted verbose output is not deterministic");
    println!("Sorted output deterministic: OK");

    // Value graphs are not Send, so each thread converts its own copy.
    let threads = thread::available_parallelism().map_or(4, |n| n.get().min(8));
    println!("\nRendering from {threads} threads");
    let start = Instant::now();
    let total: usize = thread::scope(|s| {
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let cities = &cities;
                let sorted = &sorted;
                s.spawn(move || {
                    let graph = convert(cities);
                    sorted.sdump(&[&graph]).len()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("render thread panicked"))
            .sum()
    });
    report("parallel verbose (incl. conversion)", total, start.elapsed());
}
