//! Sharing one loader between threads

use std::sync::Arc;
use std::thread;

use graphql_sugar::{ArgLoader, Args, Describe};
use serde_json::json;

#[derive(Describe, Default)]
struct Query {
    #[sugar(arg = "n,required")]
    n: i64,
}

#[test]
fn test_shared_loader() {
    let loader = Arc::new(ArgLoader::new().unwrap());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let loader = loader.clone();
            thread::spawn(move || {
                let mut args = Args::new();
                args.insert("n".to_string(), json!(i));
                let mut query = Query::default();
                loader.load_args(&args, &mut query).map(|()| query.n)
            })
        })
        .collect();

    let mut results: Vec<i64> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap().unwrap())
        .collect();
    results.sort();
    assert_eq!(results, (0..8).collect::<Vec<_>>());
}
