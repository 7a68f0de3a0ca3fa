pub mod assertions;
pub mod mocks;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use assertions::{drain, last_log, rankings, session_end, submit_statuses};
#[allow(unused_imports)]
pub use mocks::{FailingScoreStore, MockClient, MockSocket};
#[allow(unused_imports)]
pub use setup::{TestSetup, TestSetupBuilder};
