mod http;
mod local;
mod traits;

pub use http::{Download, HttpService};
pub use local::LocalCaseStore;
pub use traits::{CaseStore, ServiceError};
