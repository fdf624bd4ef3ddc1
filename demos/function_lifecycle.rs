//! Function Lifecycle Demo
//!
//! Run with: `RUST_LOG=debug cargo run --example function_lifecycle`
//!
//! Uploads a code archive, publishes versions, shifts traffic with a weighted
//! alias and tears everything down again.

use anyhow::Context;
use lambda_model::artifact::{create_archive, CacheConfig};
use lambda_model::function::{AliasRequest, Function, VersionConfig, VersionState};
use lambda_model::limits::AccountSettings;
use lambda_model::store::MemoryObjectStore;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{Cursor, Write};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use zip::write::FileOptions;
use zip::ZipWriter;

fn handler_archive(body: &str) -> anyhow::Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer.start_file("index.py", FileOptions::default())?;
    writer.write_all(body.as_bytes())?;
    Ok(writer.finish()?.into_inner())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== Function Lifecycle Demo ===\n");

    let cache_dir = tempfile::tempdir()?;
    let store = Arc::new(MemoryObjectStore::new());
    let cache = CacheConfig::builder().base_dir(cache_dir.path()).build();
    let settings = AccountSettings::default();

    // 1. Upload two code revisions
    let v1_code = create_archive(
        store.clone(),
        &cache,
        &settings,
        "awslambda-us-east-1-tasks",
        handler_archive("def handler(e, c): return 'v1'\n")?,
    )?;
    let v2_code = create_archive(
        store.clone(),
        &cache,
        &settings,
        "awslambda-us-east-1-tasks",
        handler_archive("def handler(e, c): return 'v2'\n")?,
    )?;
    println!("1. Uploaded archives {} and {}", v1_code.id(), v2_code.id());

    // 2. Create the function and publish both revisions
    let config = VersionConfig::builder(Arc::clone(&v1_code))
        .runtime("python3.9")
        .handler("index.handler")
        .build()?;
    let function = Function::new("greeter", "us-east-1", "000000000000", config.clone());
    function.publish_version(config.clone())?;
    function.publish_version(config.to_builder().code(Arc::clone(&v2_code)).build()?)?;
    for qualifier in ["1", "2"] {
        function.set_version_state(qualifier, VersionState::active())?;
    }
    println!("2. Published versions 1 and 2 of {}", function.unqualified_arn());

    // 3. Canary: 30% of "live" goes to version 2
    let alias = function.upsert_alias("live", AliasRequest::new("1").weighted("2", 0.3))?;
    let mut rng = StdRng::seed_from_u64(2024);
    let to_v2 = (0..1_000)
        .filter(|_| matches!(function.resolve_alias("live", &mut rng).as_deref(), Ok("2")))
        .count();
    println!("3. Canary routed {to_v2}/1000 invocations to version 2");

    // 4. Materialize the code both versions need, concurrently
    let (a, b) = tokio::join!(
        Arc::clone(&v1_code).materialize_for_execution_async(),
        Arc::clone(&v2_code).materialize_for_execution_async()
    );
    println!("4. Code at {} and {}", a?.display(), b?.display());

    // 5. Promote version 2 and retire version 1
    function.upsert_alias(
        "live",
        AliasRequest::new("2").if_revision(alias.revision_id()),
    )?;
    function.update_latest(function.version("2").context("version 2 missing")?.config().clone())?;
    function.destroy_version("1")?;
    println!(
        "5. Promoted version 2; version 1 artifact materialized: {}",
        v1_code.is_materialized()
    );

    // 6. Tear down
    function.destroy();
    println!("6. Function destroyed; objects left in store: {}", store.len());

    println!("\nDemo completed successfully!");
    Ok(())
}
