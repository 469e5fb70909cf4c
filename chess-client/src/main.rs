//! 控制台入口
//!
//! 引擎的最小视图协作方：棋盘按本方视角打印到标准输出，走法从
//! 标准输入读取（形如 `e2e4`，`quit` 退出）。

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chess_client::game::{GameHandler, Session};
use chess_client::network;
use protocol::{Board, Color, Move, DEFAULT_PORT};

/// 控制台事件处理器
struct ConsoleHandler {
    color: Color,
}

impl ConsoleHandler {
    /// 展示层的朝向翻转：黑方把行列都倒过来，存储本身始终是
    /// 服务端规范朝向
    fn print_board(&self, board: &Board) {
        let mut rows = board.to_rows();
        if self.color == Color::Black {
            rows.reverse();
            for row in rows.iter_mut() {
                *row = row.chars().rev().collect();
            }
        }
        println!();
        for (i, row) in rows.iter().enumerate() {
            let rank = match self.color {
                Color::White => 8 - i,
                Color::Black => i + 1,
            };
            println!("{rank} {row}");
        }
        match self.color {
            Color::White => println!("  abcdefgh"),
            Color::Black => println!("  hgfedcba"),
        }
    }
}

impl GameHandler for ConsoleHandler {
    fn on_board_update(&mut self, board: &Board) {
        self.print_board(board);
    }

    fn on_error(&mut self, text: &str) {
        tracing::error!("server error: {text}");
    }

    fn on_game_over(&mut self, text: &str) {
        println!("对局结束: {text}");
    }

    fn on_status_change(&mut self, text: &str) {
        println!("{text}");
    }

    fn on_connection_lost(&mut self) {
        tracing::error!("lost connection to server");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("chess_client=debug".parse()?),
        )
        .init();

    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| format!("127.0.0.1:{DEFAULT_PORT}"));

    info!("国际象棋客户端启动，连接 {addr} ...");
    let (conn, color) = network::connect(&addr).await?;
    info!("以 {color} 方加入对局");

    let session = Session::new(conn, color);
    let handle = session.handle();

    // 标准输入读走法，投递给会话
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let input = line.trim();
            if input.is_empty() {
                continue;
            }
            if input == "quit" {
                handle.close();
                break;
            }
            match Move::parse(input) {
                Ok(mv) => {
                    // 会话已结束时直接退出
                    if handle.send_move(mv).is_err() {
                        break;
                    }
                }
                Err(e) => tracing::error!("{e}"),
            }
        }
    });

    let mut handler = ConsoleHandler { color };
    session.run(&mut handler).await;
    Ok(())
}
