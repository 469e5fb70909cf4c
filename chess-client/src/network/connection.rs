//! 网络连接建立与握手
//!
//! 握手是整个系统中仅有的阻塞交互：连接成功后等待服务端的问候
//! 语推断本方阵营，需要等待对手时再多等一行开局通知。两次读取
//! 都受连接超时约束，此后会话切换到非阻塞轮询。

use protocol::{
    Color, ConnectError, Connection, Connector, TcpConnection, TcpConnector, CONNECT_TIMEOUT,
};

/// 连接服务端并完成握手
///
/// 返回已就绪的连接和本方阵营。问候语之后粘连到达的字节保留在
/// 连接的行缓冲里，由轮询循环继续消费。
pub async fn connect(addr: &str) -> Result<(TcpConnection, Color), ConnectError> {
    let connector = TcpConnector::default();
    let mut conn = connector.connect(addr).await?;
    tracing::info!(addr = %addr, "connected, waiting for greeting");

    let greeting = conn.read_line(CONNECT_TIMEOUT).await?;
    tracing::debug!(line = %greeting, "greeting received");

    let color = if greeting.contains("White") {
        Color::White
    } else if greeting.contains("Black") || greeting.contains("Waiting for opponent") {
        // 对手还没入场，开局通知到达后会话才开始
        tracing::info!("waiting for opponent");
        let start = conn.read_line(CONNECT_TIMEOUT).await?;
        tracing::debug!(line = %start, "start-of-game line received");
        Color::Black
    } else {
        // 问候语没有提到任何阵营，按黑方处理并继续
        tracing::warn!(line = %greeting, "greeting names no color, assuming Black");
        Color::Black
    };

    tracing::info!(%color, "handshake complete");
    Ok((conn, color))
}
