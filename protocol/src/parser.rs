//! 服务端消息分类
//!
//! 协议没有显式的消息长度：一次读取可能携带多条消息，棋盘这种
//! 多行载荷也可能被读取边界截断。解析器因此是有状态的，未收集
//! 完的棋盘行会保留到下一批行继续拼装。
//!
//! 畸形的棋盘载荷按协议约定静默丢弃、会话继续，但通过计数器和
//! warn 日志保持可观测。

use crate::constants::BOARD_SIZE;
use crate::message::ServerMessage;
use crate::piece::Piece;

/// 棋盘消息的行前缀
const BOARD_PREFIX: &str = "board ";

/// 服务端消息解析器
///
/// 每次 [`feed`](MessageParser::feed) 消费一个轮询周期产出的全部
/// 完整行，按到达顺序返回分类后的消息。
pub struct MessageParser {
    /// 收集中的棋盘行（跨周期保留）
    pending: Option<Vec<String>>,
    /// 被丢弃的畸形棋盘载荷数量
    dropped_boards: u64,
}

impl MessageParser {
    /// 创建新解析器
    pub fn new() -> Self {
        Self {
            pending: None,
            dropped_boards: 0,
        }
    }

    /// 已丢弃的畸形棋盘载荷数量
    pub fn dropped_boards(&self) -> u64 {
        self.dropped_boards
    }

    /// 消费一批行，返回分类后的消息序列
    ///
    /// 终局消息会短路：它后面的行（以及收集中的棋盘）都被丢弃，
    /// 调用方应当结束会话。
    pub fn feed<I>(&mut self, lines: I) -> Vec<ServerMessage>
    where
        I: IntoIterator<Item = String>,
    {
        let mut out = Vec::new();

        for line in lines {
            // 收集中的棋盘优先：合格的行继续拼装，第一个不合格的
            // 行终止本次收集，该行本身再按常规规则分类
            if let Some(mut rows) = self.pending.take() {
                let candidate = line.trim();
                if is_board_row(candidate) {
                    rows.push(candidate.to_string());
                    if rows.len() == BOARD_SIZE {
                        out.push(ServerMessage::Board { rows });
                    } else {
                        self.pending = Some(rows);
                    }
                    continue;
                }

                self.dropped_boards += 1;
                tracing::warn!(line = %line, "dropping malformed board payload");
            }

            if let Some(rest) = line.strip_prefix(BOARD_PREFIX) {
                // 前缀之后的剩余部分就是 row 0，其内容由
                // Board::replace 做最终校验
                self.pending = Some(vec![rest.to_string()]);
            } else if let Some(rest) = line.strip_prefix("e ") {
                out.push(ServerMessage::Error {
                    text: rest.to_string(),
                });
            } else if let Some(rest) = line.strip_prefix("x ") {
                out.push(ServerMessage::GameOver {
                    text: rest.to_string(),
                });
                self.pending = None;
                break;
            } else if line.contains("Game #") && !line.starts_with("board") {
                out.push(ServerMessage::Status { text: line });
            } else {
                tracing::debug!(line = %line, "unrecognized server line");
                out.push(ServerMessage::Unknown { line });
            }
        }

        out
    }
}

impl Default for MessageParser {
    fn default() -> Self {
        Self::new()
    }
}

/// 检查一行是否是合格的棋盘行：恰好 8 个字符且全部来自
/// 13 字符的棋盘字母表
fn is_board_row(line: &str) -> bool {
    line.len() == BOARD_SIZE && line.chars().all(Piece::is_cell_char)
}
