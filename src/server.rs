use std::net::SocketAddr;

use tokio::{
    io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
};

use crate::{
    api::{self, split_request, Reply},
    error::{Error, Result},
    logging::{log_reply, log_request, RequestId},
    Backend,
};

/// Longest request line we are prepared to read, newline included.
const MAX_REQUEST_BYTES: usize = 64 * 1024;

/// The connection server: one request line per connection, one reply line
/// back, then the connection is closed.
pub struct Server {
    listener: TcpListener,
    backend: Backend,
}

impl Server {
    /// Bind to the configured address.
    pub async fn bind(backend: Backend) -> Result<Self> {
        let listener = TcpListener::bind(backend.config().socket_addr()).await?;
        Ok(Self { listener, backend })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections forever. A failing connection never stops the loop.
    pub async fn run(self) {
        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    let backend = self.backend.clone();
                    tokio::spawn(async move {
                        if let Err(err) = serve(backend, stream, peer).await {
                            warn!("Connection from {peer} failed: {err}");
                        }
                    });
                }
                Err(err) => error!("Failed to accept connection: {err}"),
            }
        }
    }
}

async fn serve(backend: Backend, mut stream: TcpStream, peer: SocketAddr) -> Result<()> {
    let (reader, mut writer) = stream.split();
    let mut buf = Vec::new();
    // One byte past the limit tells an overlong line from one that just fits.
    BufReader::new(reader.take(MAX_REQUEST_BYTES as u64 + 1))
        .read_until(b'\n', &mut buf)
        .await?;

    let id = RequestId::next();
    let reply = match request_line(&buf) {
        Ok(line) => {
            let (command, _) = split_request(line);
            log_request(id, peer, command);
            let reply = api::dispatch(&backend, line).await;
            log_reply(id, command, &reply);
            reply
        }
        Err(err) => {
            log_request(id, peer, "-");
            let reply = Reply::from(err);
            log_reply(id, "-", &reply);
            reply
        }
    };

    writer.write_all(reply.as_str().as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.shutdown().await?;
    Ok(())
}

/// Decode a raw request line. Every connection gets a reply, so a line we
/// cannot read is an error reply rather than a dropped connection.
fn request_line(buf: &[u8]) -> Result<&str> {
    if buf.len() > MAX_REQUEST_BYTES {
        return Err(Error::RequestTooLong);
    }
    std::str::from_utf8(buf).map_err(|_| Error::BadFormat)
}
