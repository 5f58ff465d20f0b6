//! 基础设施层：适配器、缓存、HTTP、指标

pub mod adapters;
pub mod cache;
pub mod http;
pub mod metrics;
