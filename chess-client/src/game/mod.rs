//! 游戏会话模块
//!
//! 会话独占连接与棋盘，驱动轮询循环并把解码后的消息分发给视图
//! 协作方。

mod session;

pub use session::*;
