//! 应用层：管线编排与端口定义

pub mod pipeline;
pub mod ports;
