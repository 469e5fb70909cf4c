//! 棋盘状态

use serde::{Deserialize, Serialize};

use crate::constants::{BOARD_CELLS, BOARD_SIZE};
use crate::error::ProtocolError;
use crate::piece::{Color, Piece, PieceKind, Square, EMPTY_CHAR};

/// 棋盘
///
/// 8x8 棋盘，索引为 row * 8 + col，使用 Vec 以支持 serde。
/// 存储始终是服务端规范朝向（row 0 = 第 8 横排），与本方阵营无关。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    squares: Vec<Option<Piece>>,
}

impl Board {
    /// 创建空棋盘
    pub fn empty() -> Self {
        Self {
            squares: vec![None; BOARD_CELLS],
        }
    }

    /// 创建初始棋盘
    ///
    /// 服务端在开局时也会下发一份完整棋盘，这里的初始布局
    /// 只用于第一条棋盘消息到达之前的本地展示。
    pub fn initial() -> Self {
        let mut board = Self::empty();

        let back_rank = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];

        // 黑方（上方，row 0 起）
        for (col, kind) in back_rank.iter().enumerate() {
            board.set(
                Square::new_unchecked(0, col as u8),
                Some(Piece::new(*kind, Color::Black)),
            );
            board.set(
                Square::new_unchecked(1, col as u8),
                Some(Piece::new(PieceKind::Pawn, Color::Black)),
            );
        }

        // 白方（下方，row 7 起）
        for (col, kind) in back_rank.iter().enumerate() {
            board.set(
                Square::new_unchecked(7, col as u8),
                Some(Piece::new(*kind, Color::White)),
            );
            board.set(
                Square::new_unchecked(6, col as u8),
                Some(Piece::new(PieceKind::Pawn, Color::White)),
            );
        }

        board
    }

    /// 获取指定格子的棋子
    pub fn get(&self, sq: Square) -> Option<Piece> {
        if sq.is_valid() {
            self.squares[sq.to_index()]
        } else {
            None
        }
    }

    /// 设置指定格子的棋子
    pub fn set(&mut self, sq: Square, piece: Option<Piece>) {
        if sq.is_valid() {
            self.squares[sq.to_index()] = piece;
        }
    }

    /// 用服务端下发的 8 行文本整体替换棋盘
    ///
    /// 先校验全部 64 个字符，全部合法才替换；任何一个字符非法都
    /// 返回错误并保持原棋盘不变。解析器在上游已经过滤过畸形载荷，
    /// 这里是第二道防线。
    pub fn replace(&mut self, rows: &[String]) -> Result<(), ProtocolError> {
        if rows.len() != BOARD_SIZE {
            return Err(ProtocolError::BadRowCount {
                expected: BOARD_SIZE,
                got: rows.len(),
            });
        }

        let mut squares = Vec::with_capacity(BOARD_CELLS);
        for (row, text) in rows.iter().enumerate() {
            if text.chars().count() != BOARD_SIZE {
                return Err(ProtocolError::BadRowLength {
                    index: row,
                    len: text.chars().count(),
                    expected: BOARD_SIZE,
                });
            }
            for (col, ch) in text.chars().enumerate() {
                if ch == EMPTY_CHAR {
                    squares.push(None);
                } else if let Some(piece) = Piece::from_char(ch) {
                    squares.push(Some(piece));
                } else {
                    return Err(ProtocolError::BadPieceChar { ch, row, col });
                }
            }
        }

        self.squares = squares;
        Ok(())
    }

    /// 导出为 8 行文本（与 `replace` 的输入格式一致）
    pub fn to_rows(&self) -> Vec<String> {
        (0..BOARD_SIZE)
            .map(|row| {
                (0..BOARD_SIZE)
                    .map(|col| {
                        self.squares[row * BOARD_SIZE + col]
                            .map(|p| p.to_char())
                            .unwrap_or(EMPTY_CHAR)
                    })
                    .collect()
            })
            .collect()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::initial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn initial_rows() -> Vec<String> {
        [
            "rnbqkbnr", "pppppppp", "........", "........",
            "........", "........", "PPPPPPPP", "RNBQKBNR",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    #[test]
    fn test_initial_board() {
        let board = Board::initial();

        // 黑方底线在 row 0
        let king = board.get(Square::new_unchecked(0, 4));
        assert_eq!(king, Some(Piece::new(PieceKind::King, Color::Black)));

        // 白方底线在 row 7
        let king = board.get(Square::new_unchecked(7, 4));
        assert_eq!(king, Some(Piece::new(PieceKind::King, Color::White)));

        let pawn = board.get(Square::new_unchecked(6, 0));
        assert_eq!(pawn, Some(Piece::new(PieceKind::Pawn, Color::White)));

        assert_eq!(board.get(Square::new_unchecked(4, 4)), None);

        // 初始布局与标准开局文本一致
        assert_eq!(board.to_rows(), initial_rows());
    }

    #[test]
    fn test_replace_roundtrip() {
        let rows: Vec<String> = [
            "rnbqkbnr", "pppppppp", "........", "........",
            "....P...", "........", "PPPP.PPP", "RNBQKBNR",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let mut board = Board::empty();
        board.replace(&rows).unwrap();
        assert_eq!(board.to_rows(), rows);

        // e4（row 4, col 4）上是白兵
        assert_eq!(
            board.get(Square::new_unchecked(4, 4)),
            Some(Piece::new(PieceKind::Pawn, Color::White))
        );
    }

    #[test]
    fn test_replace_rejects_bad_char() {
        let mut board = Board::initial();
        let before = board.to_rows();

        let mut rows = initial_rows();
        rows[3] = "...z....".to_string();

        let err = board.replace(&rows).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::BadPieceChar {
                ch: 'z',
                row: 3,
                col: 3
            }
        );
        // 原棋盘保持不变
        assert_eq!(board.to_rows(), before);
    }

    #[test]
    fn test_replace_rejects_bad_shape() {
        let mut board = Board::empty();

        let short: Vec<String> = initial_rows().into_iter().take(7).collect();
        assert!(matches!(
            board.replace(&short),
            Err(ProtocolError::BadRowCount { got: 7, .. })
        ));

        let mut rows = initial_rows();
        rows[0] = "rnbqkbn".to_string();
        assert!(matches!(
            board.replace(&rows),
            Err(ProtocolError::BadRowLength { index: 0, len: 7, .. })
        ));
    }
}
