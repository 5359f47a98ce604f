//! Bootstrap sequence
//!
//! Turns a static workspace into a running entry program:
//! - select and pin the base runtime
//! - copy the workspace into its execution root
//! - create an isolated dependency environment inside it
//! - install the dependency manifest into that environment
//! - launch the entry program with the environment active
//!
//! Every stage is fatal on error and nothing is retried.

pub mod preflight;
pub mod sequence;
pub mod stage;
pub mod stamp;
pub mod toolchain;
pub mod workspace;

pub use sequence::{Bootstrap, BootstrapReport, StageRecord};
pub use stage::Stage;
pub use stamp::ProvisionStamp;
pub use toolchain::{Environment, PythonToolchain, Toolchain};
pub use workspace::CopyStats;
