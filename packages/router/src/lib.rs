#![doc = include_str!("../README.md")]
#![deny(missing_docs)]

pub mod chart;
pub mod error;
pub mod guard;
pub mod helpers;
pub mod navigation;
pub mod resolve;
pub mod route_definition;
pub mod state;

mod router_cfg;

mod service;
pub use service::Router;

/// A collection of useful items most applications might need.
pub mod prelude {
    pub use crate::chart::*;
    pub use crate::error::*;
    pub use crate::guard::{AfterGuard, BeforeGuard, GuardCompletion, GuardVerdict, PropsSlot};
    pub use crate::navigation::*;
    pub use crate::resolve::*;
    pub use crate::route_definition::*;
    pub use crate::router_cfg::RouterConfig;
    pub use crate::service::Router;
    pub use crate::state::*;
    pub use waypoint_history::{History, Location, MemoryHistory};
}

#[doc(hidden)]
pub mod exports {
    pub use serde_json;
    pub use urlencoding;
}
