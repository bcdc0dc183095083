//! Minimal masking WebSocket client over a raw TCP stream.

use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use wsecho::protocol::OpCode;
use wsecho::protocol::header::read_header;

use super::frames::{Received, client_frame};

pub struct TestClient {
    stream: TcpStream,
    pub id: usize,
}

impl TestClient {
    pub async fn connect_with_id(addr: SocketAddr, id: usize) -> std::io::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        Ok(Self { stream, id })
    }

    pub async fn send_raw(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.stream.write_all(bytes).await
    }

    pub async fn send_frame(
        &mut self,
        fin: bool,
        opcode: OpCode,
        payload: &[u8],
    ) -> std::io::Result<()> {
        self.send_raw(&client_frame(fin, opcode, payload)).await
    }

    pub async fn send_text(&mut self, text: &str) -> std::io::Result<()> {
        self.send_frame(true, OpCode::Text, text.as_bytes()).await
    }

    /// Next frame from the server, `None` once the server closed the stream.
    pub async fn recv_frame(&mut self) -> Option<Received> {
        let header = read_header(&mut self.stream).await.ok()?;
        let mut payload = vec![0; header.payload_len as usize];
        self.stream.read_exact(&mut payload).await.ok()?;
        Some(Received {
            fin: header.fin,
            opcode: header.opcode,
            masked: header.is_masked(),
            payload,
        })
    }

    pub async fn recv_text(&mut self) -> Option<String> {
        let frame = self.recv_frame().await?;
        assert_eq!(frame.opcode, OpCode::Text);
        String::from_utf8(frame.payload).ok()
    }

    /// Send close 1000 and wait for the echoed close. Returns its code.
    pub async fn close(mut self) -> Option<u16> {
        self.send_raw(&super::frames::close_frame(1000, b"")).await.ok()?;
        let reply = self.recv_frame().await?;
        reply.close_code()
    }
}
