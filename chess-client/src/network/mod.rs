//! 网络连接模块

mod connection;

pub use connection::*;
