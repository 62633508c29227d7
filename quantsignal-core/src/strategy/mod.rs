//! Strategy registry and parameter schemas.

pub mod params;
pub mod registry;

pub use params::{ParamSpec, ParamType, ParamValue, ResolvedParams, StrategyParams};
pub use registry::{find, find_kind, list, StrategyDescriptor, StrategyId, StrategyKind};
