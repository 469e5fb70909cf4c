//! 传输层
//!
//! 提供 Connector/Connection traits 使上层协议与具体传输实现解耦。
//! 线上格式是换行结尾的文本行：[`LineBuffer`] 负责把字节流重组成
//! 完整行，读取边界落在行中间时把残余字节留到下一次。
//!
//! 握手阶段使用带超时的等待式读取，是系统中仅有的阻塞点；此后
//! 的所有读取都通过 `try_read` 完成，每个轮询周期只读一次，没有
//! 数据不算错误。

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::time::{timeout, timeout_at, Instant};

use crate::constants::{CONNECT_TIMEOUT, READ_BUF_SIZE};
use crate::error::{ClientError, ConnectError};

// ============================================================================
// 行缓冲
// ============================================================================

/// 行缓冲器
///
/// 按到达顺序产出完整行（去掉换行符，容忍一个行尾 `\r`），
/// 不完整的行尾保留在缓冲中。
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: Vec<u8>,
}

impl LineBuffer {
    /// 创建空缓冲
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// 追加收到的字节
    pub fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// 取出下一个完整行，没有则返回 None
    pub fn next_line(&mut self) -> Option<String> {
        let pos = self.buf.iter().position(|&b| b == b'\n')?;
        let mut line: Vec<u8> = self.buf.drain(..=pos).collect();
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Some(String::from_utf8_lossy(&line).into_owned())
    }

    /// 取出当前所有完整行
    pub fn take_lines(&mut self) -> Vec<String> {
        std::iter::from_fn(|| self.next_line()).collect()
    }

    /// 缓冲中是否还有未凑齐的残余字节
    pub fn has_partial(&self) -> bool {
        !self.buf.is_empty()
    }
}

// ============================================================================
// 连接抽象
// ============================================================================

/// 连接抽象 trait（核心抽象，用于会话层）
#[async_trait]
pub trait Connection: Send {
    /// 等待下一个完整行，整体受 `limit` 超时约束
    ///
    /// 仅供握手阶段使用，握手之后只允许 [`poll_lines`](Connection::poll_lines)。
    async fn read_line(&mut self, limit: Duration) -> Result<String, ConnectError>;

    /// 执行一次非阻塞读取，返回本次凑齐的完整行
    ///
    /// 没有数据可读返回空序列，不算错误；对端关闭或套接字出错
    /// 返回 [`ClientError::ConnectionLost`]。
    fn poll_lines(&mut self) -> Result<Vec<String>, ClientError>;

    /// 发送一行（调用方负责带上换行符）
    async fn send_line(&mut self, line: &str) -> Result<(), ClientError>;

    /// 关闭连接
    async fn close(&mut self) -> Result<(), ClientError>;

    /// 获取远端地址
    fn peer_addr(&self) -> Option<String>;
}

/// 连接器 trait（客户端使用）
#[async_trait]
pub trait Connector: Send + Sync {
    type Conn: Connection;

    /// 建立连接
    async fn connect(&self, addr: &str) -> Result<Self::Conn, ConnectError>;
}

// ============================================================================
// TCP 实现
// ============================================================================

/// TCP 连接器
pub struct TcpConnector {
    /// 连接与握手读取共用的超时
    pub timeout: Duration,
}

impl Default for TcpConnector {
    fn default() -> Self {
        Self {
            timeout: CONNECT_TIMEOUT,
        }
    }
}

#[async_trait]
impl Connector for TcpConnector {
    type Conn = TcpConnection;

    async fn connect(&self, addr: &str) -> Result<Self::Conn, ConnectError> {
        // 端口单独校验，给出比底层 IO 错误更准确的提示
        if let Some((_, port)) = addr.rsplit_once(':') {
            if port.parse::<u16>().is_err() {
                return Err(ConnectError::InvalidPort(port.to_string()));
            }
        }

        let stream = timeout(self.timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| ConnectError::Timeout)?
            .map_err(classify_io_error)?;

        stream.set_nodelay(true).map_err(classify_io_error)?;

        let peer_addr = stream.peer_addr().ok().map(|a| a.to_string());
        let (reader, writer) = stream.into_split();

        Ok(TcpConnection {
            reader,
            writer,
            buffer: LineBuffer::new(),
            peer_addr,
        })
    }
}

fn classify_io_error(e: io::Error) -> ConnectError {
    if e.kind() == io::ErrorKind::ConnectionRefused {
        ConnectError::Refused
    } else {
        ConnectError::Unexpected(e.to_string())
    }
}

/// TCP 连接
///
/// 握手时读进缓冲但尚未消费的字节会留给后续轮询，粘连在问候语
/// 之后的消息不会丢失。
#[derive(Debug)]
pub struct TcpConnection {
    reader: OwnedReadHalf,
    writer: OwnedWriteHalf,
    buffer: LineBuffer,
    peer_addr: Option<String>,
}

#[async_trait]
impl Connection for TcpConnection {
    async fn read_line(&mut self, limit: Duration) -> Result<String, ConnectError> {
        if let Some(line) = self.buffer.next_line() {
            return Ok(line);
        }

        let deadline = Instant::now() + limit;
        let mut buf = [0u8; READ_BUF_SIZE];
        loop {
            let n = timeout_at(deadline, self.reader.read(&mut buf))
                .await
                .map_err(|_| ConnectError::Timeout)?
                .map_err(|e| ConnectError::Unexpected(e.to_string()))?;
            if n == 0 {
                return Err(ConnectError::Unexpected(
                    "server closed the connection".to_string(),
                ));
            }
            self.buffer.push(&buf[..n]);
            if let Some(line) = self.buffer.next_line() {
                return Ok(line);
            }
        }
    }

    fn poll_lines(&mut self) -> Result<Vec<String>, ClientError> {
        let mut buf = [0u8; READ_BUF_SIZE];
        match self.reader.try_read(&mut buf) {
            // 读到 0 字节表示对端关闭
            Ok(0) => return Err(ClientError::ConnectionLost),
            Ok(n) => self.buffer.push(&buf[..n]),
            // 没有数据可读，不是错误；握手遗留的完整行照常返回
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
            Err(e) => {
                tracing::warn!(error = %e, "socket read failed");
                return Err(ClientError::ConnectionLost);
            }
        }
        Ok(self.buffer.take_lines())
    }

    async fn send_line(&mut self, line: &str) -> Result<(), ClientError> {
        self.writer
            .write_all(line.as_bytes())
            .await
            .map_err(|_| ClientError::ConnectionLost)?;
        self.writer
            .flush()
            .await
            .map_err(|_| ClientError::ConnectionLost)
    }

    async fn close(&mut self) -> Result<(), ClientError> {
        // 关闭写端即可，读端随连接一起释放
        let _ = self.writer.shutdown().await;
        Ok(())
    }

    fn peer_addr(&self) -> Option<String> {
        self.peer_addr.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[test]
    fn test_line_buffer_reassembles_split_line() {
        let mut buf = LineBuffer::new();

        // 一个逻辑行的字节分两次到达
        buf.push(b"board rnb");
        assert_eq!(buf.next_line(), None);
        assert!(buf.has_partial());

        buf.push(b"qkbnr\npppp");
        assert_eq!(buf.next_line(), Some("board rnbqkbnr".to_string()));
        assert_eq!(buf.next_line(), None);

        buf.push(b"pppp\n");
        assert_eq!(buf.next_line(), Some("pppppppp".to_string()));
        assert!(!buf.has_partial());
    }

    #[test]
    fn test_line_buffer_coalesced_lines() {
        let mut buf = LineBuffer::new();
        buf.push(b"e wrong turn\nx Checkmate\ntail");
        assert_eq!(
            buf.take_lines(),
            vec!["e wrong turn".to_string(), "x Checkmate".to_string()]
        );
        assert!(buf.has_partial());
    }

    #[test]
    fn test_line_buffer_crlf() {
        let mut buf = LineBuffer::new();
        buf.push(b"Game #1\r\n");
        assert_eq!(buf.next_line(), Some("Game #1".to_string()));
    }

    #[tokio::test]
    async fn test_invalid_port() {
        let connector = TcpConnector::default();
        let err = connector.connect("localhost:notaport").await.unwrap_err();
        assert!(matches!(err, ConnectError::InvalidPort(p) if p == "notaport"));
    }

    #[tokio::test]
    async fn test_connect_refused() {
        // 绑定再立刻释放，拿到一个大概率无人监听的端口
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let connector = TcpConnector::default();
        let err = connector.connect(&addr).await.unwrap_err();
        assert!(matches!(err, ConnectError::Refused));
    }

    #[tokio::test]
    async fn test_poll_and_send() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let server = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            sock.write_all(b"Game #1\ne wrong").await.unwrap();
            sock.write_all(b" turn\n").await.unwrap();

            // 读走客户端发来的走法
            let mut buf = [0u8; 16];
            let n = sock.read(&mut buf).await.unwrap();
            assert_eq!(&buf[..n], b"e2e4\n");
            // 返回 sock 保持连接存活到断言完成
            sock
        });

        let connector = TcpConnector::default();
        let mut conn = connector.connect(&addr).await.unwrap();
        assert!(conn.peer_addr().is_some());

        // 等数据到达后，一次轮询取出全部完整行，残余留在缓冲
        tokio::time::sleep(Duration::from_millis(100)).await;
        let lines = conn.poll_lines().unwrap();
        assert_eq!(
            lines,
            vec!["Game #1".to_string(), "e wrong turn".to_string()]
        );

        // 没有新数据时轮询返回空，不是错误
        assert!(conn.poll_lines().unwrap().is_empty());

        conn.send_line("e2e4\n").await.unwrap();
        let sock = server.await.unwrap();

        // 对端关闭后轮询报告连接丢失
        drop(sock);
        tokio::time::sleep(Duration::from_millis(100)).await;
        let err = conn.poll_lines().unwrap_err();
        assert!(matches!(err, ClientError::ConnectionLost));
    }

    #[tokio::test]
    async fn test_read_line_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let server = tokio::spawn(async move {
            // 接受连接但什么都不发
            let (sock, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_millis(500)).await;
            drop(sock);
        });

        let connector = TcpConnector::default();
        let mut conn = connector.connect(&addr).await.unwrap();
        let err = conn.read_line(Duration::from_millis(100)).await.unwrap_err();
        assert!(matches!(err, ConnectError::Timeout));

        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_read_line_keeps_coalesced_tail() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let server = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            // 问候语和后续消息粘在同一次发送里
            sock.write_all(b"You are White\nGame #7\n").await.unwrap();
            tokio::time::sleep(Duration::from_millis(200)).await;
            sock
        });

        let connector = TcpConnector::default();
        let mut conn = connector.connect(&addr).await.unwrap();

        let greeting = conn.read_line(Duration::from_secs(1)).await.unwrap();
        assert_eq!(greeting, "You are White");

        // 粘连的第二行留在缓冲中，轮询直接取到
        let lines = conn.poll_lines().unwrap();
        assert_eq!(lines, vec!["Game #7".to_string()]);

        drop(conn);
        server.await.unwrap();
    }
}
