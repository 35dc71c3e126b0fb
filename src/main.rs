use log::info;
use std::path::PathBuf;

use retry_engine::{BoxError, ExhaustionPolicy, Executor, FileRead, PolicyConfig};

const POLICY_ENV: &str = "RETRY_ENGINE_POLICY";

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    env_logger::init();

    let path = match std::env::args().nth(1) {
        Some(path) => PathBuf::from(path),
        None => {
            eprintln!("usage: retry-engine <file>");
            std::process::exit(2);
        }
    };

    // Step 1: Load the policy, falling back to a 10s deadline polled every 100ms.
    let config = match std::env::var(POLICY_ENV) {
        Ok(json) => PolicyConfig::from_json(&json)?,
        Err(_) => PolicyConfig::default(),
    };
    let policy = ExhaustionPolicy::try_from(config)?;
    info!("Waiting for '{}' with {:?}", path.display(), policy);

    // Step 2: Build the executor around a file read.
    let executor = Executor::<PathBuf, String>::builder()
        .with_operation(FileRead)
        .with_policy(policy)
        .build()?;

    // Step 3: Poll until the file has content or the policy gives up.
    let content = executor.run(&path).await?;
    print!("{}", content);

    Ok(())
}
