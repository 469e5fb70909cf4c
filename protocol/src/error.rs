//! 错误类型定义

use thiserror::Error;

/// 连接建立阶段的错误
///
/// 只会在握手完成之前出现，属于可恢复错误，调用方可以重试。
#[derive(Error, Debug)]
pub enum ConnectError {
    /// 地址中的端口无效
    #[error("Invalid port in address: {0}")]
    InvalidPort(String),

    /// 连接或握手超时
    #[error("Connection timed out")]
    Timeout,

    /// 服务端拒绝连接
    #[error("Connection refused")]
    Refused,

    /// 其他意外错误
    #[error("Unexpected connection error: {0}")]
    Unexpected(String),
}

/// 走法格式错误
///
/// 纯语法校验，合法性由服务端裁定。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    /// 坐标超出棋盘范围
    #[error("Coordinate out of range: ({row}, {col})")]
    OutOfRange { row: u8, col: u8 },

    /// 走法字符串格式不正确
    #[error("Invalid move string: {0:?}")]
    BadFormat(String),
}

/// 棋盘载荷格式错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// 行数不是 8
    #[error("Expected {expected} board rows, got {got}")]
    BadRowCount { expected: usize, got: usize },

    /// 某一行长度不是 8
    #[error("Board row {index} has length {len}, expected {expected}")]
    BadRowLength {
        index: usize,
        len: usize,
        expected: usize,
    },

    /// 非法的棋子字符
    #[error("Invalid piece character {ch:?} at row {row}, column {col}")]
    BadPieceChar { ch: char, row: usize, col: usize },
}

/// 会话阶段的错误
#[derive(Error, Debug)]
pub enum ClientError {
    /// 对端关闭或套接字出错，会话不可恢复
    #[error("Connection lost")]
    ConnectionLost,

    /// 走法格式错误
    #[error(transparent)]
    Move(#[from] MoveError),

    /// 棋盘载荷错误
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// 会话操作结果类型
pub type Result<T> = std::result::Result<T, ClientError>;
