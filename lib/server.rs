use crate::session::{Handler, Identity, Message, Peer, Store};
use std::{io, net::SocketAddr, sync::Arc};
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::sync::mpsc::Receiver;
use tracing::{debug, error, info, instrument};

mod config;

pub use config::*;

/// Serves game sessions over TCP, one JSON frame per line.
#[derive(Debug)]
pub struct Server<S, I> {
    listener: TcpListener,
    handler: Arc<Handler<S, I>>,
}

impl<S: Store + 'static, I: Identity + 'static> Server<S, I> {
    /// Listens on the given address.
    #[instrument(level = "debug", skip(handler), err)]
    pub async fn bind<A>(address: A, handler: Handler<S, I>) -> io::Result<Self>
    where
        A: ToSocketAddrs + std::fmt::Debug,
    {
        Ok(Server {
            listener: TcpListener::bind(address).await?,
            handler: Arc::new(handler),
        })
    }

    /// The address the server is listening on.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn handler(&self) -> &Arc<Handler<S, I>> {
        &self.handler
    }

    /// Accepts connections until accepting fails.
    pub async fn run(self) -> io::Result<()> {
        info!(address = %self.local_addr()?, "listening");

        loop {
            let (socket, address) = self.listener.accept().await?;
            info!(%address, "accepted connection");

            let handler = self.handler.clone();
            tokio::spawn(async move {
                if let Err(e) = serve(handler, socket).await {
                    error!(%address, "{}", e);
                }
            });
        }
    }
}

/// Services a single connection until it's closed.
#[instrument(level = "debug", skip(handler, socket), err)]
async fn serve<S: Store + 'static, I: Identity + 'static>(
    handler: Arc<Handler<S, I>>,
    socket: TcpStream,
) -> io::Result<()> {
    let (reader, writer) = socket.into_split();
    let (peer, rx) = Peer::new();
    let forwarder = tokio::spawn(forward(rx, writer));

    let mut lines = BufReader::new(reader).lines();
    let result = async {
        while let Some(line) = lines.next_line().await? {
            if !line.trim().is_empty() {
                handler.receive(&peer, &line).await;
            }
        }

        io::Result::Ok(())
    }
    .await;

    handler.disconnect(&peer);
    drop(peer);

    match forwarder.await {
        Ok(r) => r?,
        Err(e) => error!("{}", e),
    }

    debug!("connection closed");
    result
}

/// Writes queued messages to the connection, one per line.
async fn forward<W: AsyncWrite + Unpin>(
    mut rx: Receiver<Message>,
    mut writer: W,
) -> io::Result<()> {
    while let Some(msg) = rx.recv().await {
        let line = serde_json::to_string(&msg)?;
        writer.write_all(line.as_bytes()).await?;
        writer.write_u8(b'\n').await?;
        writer.flush().await?;
    }

    Ok(())
}
