//! 国际象棋网络客户端
//!
//! 客户端协议引擎：握手推断本方阵营，之后在固定节拍上做非阻塞
//! 轮询，把服务端的行协议解码成棋盘更新、错误、状态和终局事件
//! 分发给视图协作方。渲染与登录界面不在本 crate 内，它们通过
//! [`GameHandler`](game::GameHandler) 与 [`SessionHandle`](game::SessionHandle)
//! 与引擎交互。

pub mod game;
pub mod network;
