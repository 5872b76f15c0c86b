pub mod aggregate;
pub mod config;
pub mod extract;
pub mod model;
pub mod output;
pub mod probe;
pub mod session;
pub mod store;

pub use config::Config;
pub use model::{ParamSet, ProbeState, ScanReport};
pub use probe::{HttpProber, ReflectionChecker};
pub use session::PageSession;
pub use store::SiteStore;
