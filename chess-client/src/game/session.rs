//! 游戏会话
//!
//! 单任务协作模型：一个会话独占连接、棋盘与消息解析器，轮询
//! 循环在固定节拍上执行"写出排队的走法、读一次、分发"，下一次
//! 触发只在当前周期完成后排期，循环体不会重入。
//!
//! 走子是发完即忘的：从句柄进入发送队列，由下一个周期写出，
//! 客户端不等待确认。合法性由服务端裁定，非法走法以错误消息
//! 的形式返回。

use tokio::sync::mpsc;
use tokio::time::{interval, sleep};

use protocol::{
    Board, ClientError, ClientMessage, Color, Connection, MessageParser, Move, ServerMessage,
    INITIAL_POLL_DELAY, POLL_INTERVAL,
};

/// 视图协作方实现的事件回调
///
/// 会话在轮询周期内按消息到达顺序逐条分发。
pub trait GameHandler: Send {
    /// 棋盘被整体替换
    fn on_board_update(&mut self, board: &Board);
    /// 服务端报告可恢复错误，会话继续
    fn on_error(&mut self, text: &str);
    /// 终局通知，会话随之结束
    fn on_game_over(&mut self, text: &str);
    /// 状态文本更新
    fn on_status_change(&mut self, text: &str);
    /// 连接丢失，会话随之结束
    fn on_connection_lost(&mut self);
}

/// 会话内部指令
enum Command {
    Send(ClientMessage),
    Close,
}

/// 会话句柄
///
/// 可克隆，供视图协作方从会话外部投递用户意图。会话结束后的
/// 所有操作都以 `ConnectionLost` 快速失败。
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl SessionHandle {
    /// 发送走法
    pub fn send_move(&self, mv: Move) -> Result<(), ClientError> {
        self.tx
            .send(Command::Send(ClientMessage::Move { mv }))
            .map_err(|_| ClientError::ConnectionLost)
    }

    /// 从裸坐标发送走法
    ///
    /// 坐标越界时同步返回错误，走法不会被发送。
    pub fn send_move_coords(
        &self,
        from_row: u8,
        from_col: u8,
        to_row: u8,
        to_col: u8,
    ) -> Result<(), ClientError> {
        let mv = Move::from_coords(from_row, from_col, to_row, to_col)?;
        self.send_move(mv)
    }

    /// 主动结束会话
    pub fn close(&self) {
        let _ = self.tx.send(Command::Close);
    }
}

/// 游戏会话
pub struct Session<C: Connection> {
    conn: C,
    color: Color,
    board: Board,
    parser: MessageParser,
    commands: mpsc::UnboundedReceiver<Command>,
    handle: SessionHandle,
}

impl<C: Connection> Session<C> {
    /// 在握手完成的连接上创建会话
    ///
    /// 棋盘先摆好标准开局，服务端的第一条棋盘消息会整体替换它。
    pub fn new(conn: C, color: Color) -> Self {
        let (tx, commands) = mpsc::unbounded_channel();
        Self {
            conn,
            color,
            board: Board::initial(),
            parser: MessageParser::new(),
            commands,
            handle: SessionHandle { tx },
        }
    }

    /// 获取会话句柄
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// 本方阵营
    pub fn color(&self) -> Color {
        self.color
    }

    /// 当前棋盘（服务端规范朝向）
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// 已丢弃的畸形棋盘载荷数量
    pub fn dropped_boards(&self) -> u64 {
        self.parser.dropped_boards()
    }

    /// 运行会话直到终局、连接丢失或主动关闭
    pub async fn run<H: GameHandler>(mut self, handler: &mut H) {
        sleep(INITIAL_POLL_DELAY).await;
        let mut ticker = interval(POLL_INTERVAL);
        loop {
            ticker.tick().await;
            if !self.poll_cycle(handler).await {
                break;
            }
        }
        // 无论从哪条路径退出，套接字只在这里关闭一次
        let _ = self.conn.close().await;
        tracing::info!("session closed");
    }

    /// 执行一个轮询周期，返回会话是否继续
    pub async fn poll_cycle<H: GameHandler>(&mut self, handler: &mut H) -> bool {
        // 先写后读：把排队的用户意图冲出去
        while let Ok(cmd) = self.commands.try_recv() {
            match cmd {
                Command::Send(msg) => {
                    let line = msg.to_line();
                    tracing::debug!(line = %line.trim_end(), "sending");
                    if self.conn.send_line(&line).await.is_err() {
                        handler.on_connection_lost();
                        return false;
                    }
                }
                Command::Close => {
                    tracing::info!("session closed by user");
                    return false;
                }
            }
        }

        let lines = match self.conn.poll_lines() {
            Ok(lines) => lines,
            Err(_) => {
                handler.on_connection_lost();
                return false;
            }
        };

        for msg in self.parser.feed(lines) {
            match msg {
                ServerMessage::Board { rows } => match self.board.replace(&rows) {
                    Ok(()) => handler.on_board_update(&self.board),
                    // 解析器已经过滤过一轮，这里只兜底记录
                    Err(e) => tracing::warn!(error = %e, "rejecting board payload"),
                },
                ServerMessage::Error { text } => handler.on_error(&text),
                ServerMessage::GameOver { text } => {
                    handler.on_game_over(&text);
                    return false;
                }
                ServerMessage::Status { text } => handler.on_status_change(&text),
                ServerMessage::Unknown { line } => {
                    tracing::debug!(line = %line, "ignoring unrecognized line");
                }
            }
        }

        true
    }
}
