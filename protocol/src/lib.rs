//! 国际象棋客户端共享协议库
//!
//! 包含:
//! - 棋子、棋盘、坐标等核心数据结构
//! - 走法编码和格式校验
//! - 消息类型定义 (ClientMessage, ServerMessage)
//! - 行流重组与消息分类 (LineBuffer, MessageParser)
//! - 传输层抽象 (Connector, Connection traits)

mod board;
mod constants;
mod error;
mod message;
mod moves;
mod parser;
mod piece;
mod transport;

pub use board::Board;
pub use constants::*;
pub use error::{ClientError, ConnectError, MoveError, ProtocolError, Result};
pub use message::{ClientMessage, ServerMessage};
pub use moves::Move;
pub use parser::MessageParser;
pub use piece::{Color, Piece, PieceKind, Square, EMPTY_CHAR};
pub use transport::{Connection, Connector, LineBuffer, TcpConnection, TcpConnector};
