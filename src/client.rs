use std::io::ErrorKind;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::TcpStream,
};

use crate::error::Result;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Sends single requests to a server, one connection per request.
#[derive(Debug, Clone)]
pub struct Client {
    addr: SocketAddr,
    timeout: Duration,
}

impl Client {
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Give up on a request that takes longer than this.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Send `command;payload` (or just `command` if `payload` is empty).
    pub async fn send(&self, command: &str, payload: &str) -> Result<String> {
        if payload.is_empty() {
            self.request(command).await
        } else {
            self.request(&format!("{command};{payload}")).await
        }
    }

    /// Send a raw request line and return the reply line without its newline.
    pub async fn request(&self, line: &str) -> Result<String> {
        match tokio::time::timeout(self.timeout, self.exchange(line)).await {
            Ok(reply) => reply,
            Err(_) => Err(std::io::Error::new(
                ErrorKind::TimedOut,
                format!("no reply from {} within {:?}", self.addr, self.timeout),
            )
            .into()),
        }
    }

    async fn exchange(&self, line: &str) -> Result<String> {
        let mut stream = TcpStream::connect(self.addr).await?;
        stream.write_all(line.as_bytes()).await?;
        stream.write_all(b"\n").await?;

        let mut reply = String::new();
        BufReader::new(stream).read_line(&mut reply).await?;
        let len = reply.trim_end_matches(['\r', '\n']).len();
        reply.truncate(len);
        Ok(reply)
    }
}
