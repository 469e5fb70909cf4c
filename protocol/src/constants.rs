//! 协议常量定义

use std::time::Duration;

/// 棋盘边长（行数 = 列数）
pub const BOARD_SIZE: usize = 8;

/// 棋盘格子总数
pub const BOARD_CELLS: usize = BOARD_SIZE * BOARD_SIZE;

/// 服务端默认端口
pub const DEFAULT_PORT: u16 = 4567;

/// 连接与握手超时（秒）
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// 轮询间隔（毫秒）
pub const POLL_INTERVAL_MS: u64 = 300;

/// 握手完成后首次轮询的延迟（毫秒）
pub const INITIAL_POLL_DELAY_MS: u64 = 200;

/// 单次非阻塞读取的缓冲区大小
pub const READ_BUF_SIZE: usize = 1024;

/// 连接超时 Duration
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(CONNECT_TIMEOUT_SECS);

/// 轮询间隔 Duration
pub const POLL_INTERVAL: Duration = Duration::from_millis(POLL_INTERVAL_MS);

/// 首次轮询延迟 Duration
pub const INITIAL_POLL_DELAY: Duration = Duration::from_millis(INITIAL_POLL_DELAY_MS);
