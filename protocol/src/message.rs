//! 消息类型定义

use serde::{Deserialize, Serialize};

use crate::moves::Move;

/// 服务端发送给客户端的消息
///
/// 线上格式是换行结尾的文本行，由 [`MessageParser`](crate::MessageParser)
/// 从行序列分类得到。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServerMessage {
    /// 完整棋盘（8 行，每行 8 个字符，row 0 = 第 8 横排）
    Board { rows: Vec<String> },
    /// 可恢复错误，会话继续
    Error { text: String },
    /// 终局通知，会话结束
    GameOver { text: String },
    /// 状态文本（例如 "Game #1 started"）
    Status { text: String },
    /// 未识别的行，保留用于诊断
    Unknown { line: String },
}

/// 客户端发送给服务端的消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientMessage {
    /// 走棋
    Move { mv: Move },
}

impl ClientMessage {
    /// 编码为一行线上文本（含换行符）
    pub fn to_line(&self) -> String {
        match self {
            ClientMessage::Move { mv } => format!("{}\n", mv.encode()),
        }
    }
}
