//! Sagekit Core
//!
//! Generic lifecycle client for resources managed by a remote control plane:
//! - `ResourceClient<K>`: create, get, refresh, update, stop, delete
//! - Blocking `wait` with fixed or growing poll delays and an optional timeout
//! - Lazy, cursor-following `ResourcePager` over list operations
//! - Throttling retries as a transport decorator
//! - TOML client configuration
//! - An in-memory training-job control plane for local runs and tests

pub mod batch;
pub mod client;
pub mod clock;
pub mod config;
pub mod error;
pub mod pager;
pub mod resource;
pub mod retry;
pub mod sim;
pub mod wait;

pub use batch::{delete_all, BatchDeleteReport};
pub use client::ResourceClient;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ClientConfig, ConfigError, ConfigResult, ListConfig, RetryConfig, WaitConfig};
pub use error::{ErrorKind, LifecycleError, LifecycleResult};
pub use pager::ResourcePager;
pub use resource::Resource;
pub use retry::{RetryPolicy, RetryingControlPlane};
pub use sim::{InMemoryControlPlane, ScriptStep};
pub use wait::{WaitOptions, WaitOutcome};
