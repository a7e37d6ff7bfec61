//! Basic usage of every backend through the shared contract.

use echt::{BackendKind, Config, Name, Operation, Removal, Reply, Request, Value};
use echt_harness::SharedBackend;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    for kind in BackendKind::ALL {
        example_backend(kind);
    }
    example_shared();
}

fn name(uri: &str) -> Name {
    uri.parse().expect("valid name")
}

fn example_backend(kind: BackendKind) {
    println!("=== {} ({}) ===\n", kind, kind.description());

    let mut backend = kind.build(&Config {
        backend: kind,
        ..Config::default()
    });

    backend.add(&name("/org/dept"), &[Value::from("/AS1")]);
    backend.add(&name("/org/dept/host"), &[Value::from("/AS2"), Value::from("/AS3")]);

    println!("/org/dept = {:?}", backend.get(&name("/org/dept")));
    println!("/org/dept/host = {:?}", backend.get(&name("/org/dept/host")));
    println!("/org = {:?}", backend.get(&name("/org")));

    match backend.longest_prefix_match(&name("/org/dept/host/extra")) {
        Some(hit) => println!("LPM /org/dept/host/extra -> {} {:?}", hit.prefix, hit.values),
        None => println!("LPM /org/dept/host/extra -> not found"),
    }
    println!(
        "LPM /org/other -> {:?}",
        backend.longest_prefix_match(&name("/org/other"))
    );

    match backend.remove(&name("/org/dept/host"), Removal::Values(&[Value::from("/AS9")])) {
        Ok(rest) => println!("Removed, left with {rest:?}"),
        Err(err) => println!("Remove refused: {err}"),
    }

    let stats = backend.stats();
    println!(
        "Entries: {}, nodes: {}, components: {}, size: {} bytes\n",
        backend.len(),
        stats.total_nodes,
        stats.total_components,
        backend.approximate_size()
    );
}

fn example_shared() {
    println!("=== SharedBackend (lock-serialized) ===\n");

    let shared = SharedBackend::from_config(&Config::default());
    let requests = [
        Request::add(name("/om/edu/squ"), vec![Value::from("/AS1"), Value::from("/AS2")]),
        Request::lpm(name("/om/edu/squ/www")),
        Request::new(name("/om/edu"), Operation::IsEntry),
        Request::get(name("/om")),
    ];

    for request in requests {
        let label = format!("{:?} {}", request.operation, request.name);
        match shared.dispatch(request) {
            Ok(Reply::Values { name, values }) => println!("{label} -> {name} {values:?}"),
            Ok(Reply::Entry(is_entry)) => println!("{label} -> entry: {is_entry}"),
            Ok(Reply::NotFound) => println!("{label} -> not found"),
            Err(err) => println!("{label} -> error: {err}"),
        }
    }
}
