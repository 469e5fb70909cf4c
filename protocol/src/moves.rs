//! 走法编码与校验
//!
//! 线上格式是 4 个字符的代数坐标（例如 `e2e4`）。客户端只做
//! 语法校验，走法是否合规由服务端裁定，非法走法会以错误消息
//! 的形式返回。

use serde::{Deserialize, Serialize};

use crate::error::MoveError;
use crate::piece::Square;

/// 走法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// 起始格
    pub from: Square,
    /// 目标格
    pub to: Square,
}

impl Move {
    /// 创建新走法
    pub fn new(from: Square, to: Square) -> Self {
        Self { from, to }
    }

    /// 从裸坐标创建走法，坐标越界时返回错误
    pub fn from_coords(
        from_row: u8,
        from_col: u8,
        to_row: u8,
        to_col: u8,
    ) -> Result<Self, MoveError> {
        let from = Square::new(from_row, from_col).ok_or(MoveError::OutOfRange {
            row: from_row,
            col: from_col,
        })?;
        let to = Square::new(to_row, to_col).ok_or(MoveError::OutOfRange {
            row: to_row,
            col: to_col,
        })?;
        Ok(Self { from, to })
    }

    /// 编码为线上格式
    pub fn encode(&self) -> String {
        format!("{}{}", self.from, self.to)
    }

    /// 从线上格式解析
    pub fn parse(s: &str) -> Result<Self, MoveError> {
        if !Self::is_valid_format(s) {
            return Err(MoveError::BadFormat(s.to_string()));
        }
        // is_valid_format 已保证两段坐标都合法
        let from = Square::from_algebraic(&s[0..2]).expect("validated");
        let to = Square::from_algebraic(&s[2..4]).expect("validated");
        Ok(Self { from, to })
    }

    /// 校验走法字符串格式
    ///
    /// 仅当长度为 4 且匹配 `[a-h][1-8][a-h][1-8]` 时为真。
    pub fn is_valid_format(s: &str) -> bool {
        let b = s.as_bytes();
        b.len() == 4
            && (b'a'..=b'h').contains(&b[0])
            && (b'1'..=b'8').contains(&b[1])
            && (b'a'..=b'h').contains(&b[2])
            && (b'1'..=b'8').contains(&b[3])
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}
