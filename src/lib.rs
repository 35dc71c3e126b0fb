//! # Retry Engine
//!
//! An asynchronous executor that drives an unreliable operation until it
//! succeeds or an exhaustion policy gives up.
//!
//! ## Features
//!
//! - Count policies: one initial attempt plus a fixed number of retries
//! - Deadline policies: fixed-interval polling until a deadline passes
//! - Transient, not-ready and fatal failures reported separately
//! - Cooperative cancellation at attempt boundaries and during waits
//! - Injected clock and timer, so tests never wait for real time
//! - Policies loadable from JSON configuration
//!
//! ## Example
//!
//! ```rust
//! use retry_engine::{operation_fn, CountPolicy, Executor, OperationError};
//!
//! #[tokio::main]
//! async fn main() {
//!     let executor = Executor::<String, String>::builder()
//!         .with_operation(operation_fn(|url: String| async move {
//!             if url.is_empty() {
//!                 Err(OperationError::fatal("empty url"))
//!             } else {
//!                 Ok(format!("<body>{}</body>", url))
//!             }
//!         }))
//!         .with_policy(CountPolicy::default().with_max_retries(3))
//!         .build()
//!         .expect("valid configuration");
//!
//!     match executor.run(&"www.google.com".to_string()).await {
//!         Ok(body) => println!("Fetched {}", body),
//!         Err(failure) => eprintln!("Fetch failed: {}", failure),
//!     }
//! }
//! ```
//!
//! ## License
//!
//! Licensed under the MIT license. See the [LICENSE](LICENSE) file for details.

pub mod engine;
pub mod error;
pub mod operation;
pub mod policy;
pub mod time;

pub use engine::{Executor, ExecutorBuilder, ExecutorState};
pub use error::{BoxError, ExecutorError, Failure, OperationError, Outcome};
pub use operation::{operation_fn, FileRead, Operation};
pub use policy::{CountPolicy, DeadlinePolicy, ExhaustionPolicy, PolicyConfig};
pub use time::{Clock, ManualClock, ManualTimer, SystemClock, Timer, TokioTimer};
