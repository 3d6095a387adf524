//! HTTP handlers。

pub mod admins;
pub mod auth;
pub mod catalog;
pub mod metrics;
pub mod msk;
pub mod regions;
pub mod requests;
pub mod service_reports;
pub mod stats;
pub mod users;

pub use admins::*;
pub use auth::*;
pub use catalog::*;
pub use metrics::*;
pub use msk::*;
pub use regions::*;
pub use requests::*;
pub use service_reports::*;
pub use stats::*;
pub use users::*;
