use std::future::Future;
use std::io;

use agora_engine::Engine;
use log::{error, info, warn};
use tokio::net::TcpListener;
#[cfg(unix)]
use tokio::net::UnixListener;
use tokio::task::JoinHandle;

use crate::config::ListenAddr;
use crate::error::{Result, RunnerError};

enum Listener {
    Tcp(TcpListener),
    #[cfg(unix)]
    Unix(UnixListener, std::path::PathBuf),
}

/// Accepts client connections and hands each one to the engine
pub struct Server {
    listener: Listener,
    addr: ListenAddr,
}

impl Server {
    /// Bind the listening socket
    ///
    /// A stale Unix socket file left by an earlier run is removed first.
    pub async fn bind(addr: &ListenAddr) -> Result<Self> {
        let listener = match addr {
            ListenAddr::Tcp(host) => Listener::Tcp(TcpListener::bind(host).await?),
            #[cfg(unix)]
            ListenAddr::Unix(path) => {
                match std::fs::remove_file(path) {
                    Ok(()) => warn!("Removed stale socket {}", path.display()),
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => return Err(e.into()),
                }
                Listener::Unix(UnixListener::bind(path)?, path.clone())
            }
            #[cfg(not(unix))]
            ListenAddr::Unix(_) => return Err(RunnerError::Unsupported(addr.to_string())),
        };

        // Report the real port when binding to port 0
        let addr = match &listener {
            Listener::Tcp(l) => ListenAddr::Tcp(l.local_addr()?.to_string()),
            #[cfg(unix)]
            Listener::Unix(..) => addr.clone(),
        };
        info!("Listening on {}", addr);

        Ok(Self { listener, addr })
    }

    pub fn local_addr(&self) -> &ListenAddr {
        &self.addr
    }

    /// Serve until `shutdown` resolves, then drain the engine
    ///
    /// Returns the number of connections accepted.
    pub async fn run<F>(self, engine: Engine, shutdown: F) -> Result<u64>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut connections = 0u64;

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested after {} connections", connections);
                    break;
                }
                accepted = self.accept(&engine) => match accepted {
                    Ok((peer, reader)) => {
                        connections += 1;
                        info!("Accepted connection {} from {}", connections, peer);
                        tokio::spawn(report(peer, reader));
                    }
                    Err(e) => error!("Accept failed: {}", e),
                },
            }
        }

        self.close();
        engine.shutdown().await?;
        Ok(connections)
    }

    async fn accept(
        &self,
        engine: &Engine,
    ) -> io::Result<(String, JoinHandle<agora_engine::Result<u64>>)> {
        match &self.listener {
            Listener::Tcp(listener) => {
                let (stream, peer) = listener.accept().await?;
                Ok((peer.to_string(), engine.accept(stream)))
            }
            #[cfg(unix)]
            Listener::Unix(listener, path) => {
                let (stream, _) = listener.accept().await?;
                Ok((path.display().to_string(), engine.accept(stream)))
            }
        }
    }

    fn close(self) {
        match self.listener {
            Listener::Tcp(_) => {}
            #[cfg(unix)]
            Listener::Unix(listener, path) => {
                drop(listener);
                if let Err(e) = std::fs::remove_file(&path) {
                    warn!("Failed to remove socket {}: {}", path.display(), e);
                }
            }
        }
    }
}

async fn report(peer: String, reader: JoinHandle<agora_engine::Result<u64>>) {
    match reader.await {
        Ok(Ok(count)) => info!("Connection from {} finished after {} requests", peer, count),
        Ok(Err(e)) => warn!("Connection from {} dropped: {}", peer, e),
        Err(e) => error!("Reader task for {} failed: {}", peer, e),
    }
}
