use agora_engine::{encode_record, parse_command};
use log::info;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::config::ListenAddr;
use crate::error::{Result, RunnerError};

/// Translate text commands into binary records on `writer`
///
/// Stops at the first malformed line. Returns the number of records sent.
pub async fn send_commands<R, W>(reader: R, writer: &mut W) -> Result<u64>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut line_no = 0;
    let mut sent = 0u64;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let parsed = parse_command(&line)
            .and_then(|request| request.map(|r| encode_record(&r)).transpose())
            .map_err(|source| RunnerError::Replay {
                line: line_no,
                source,
            })?;
        if let Some(record) = parsed {
            writer.write_all(&record).await?;
            sent += 1;
        }
    }

    writer.flush().await?;
    Ok(sent)
}

/// Connect to a running server and stream text commands to it
pub async fn send_to<R>(addr: &ListenAddr, reader: R) -> Result<u64>
where
    R: AsyncBufRead + Unpin,
{
    let sent = match addr {
        ListenAddr::Tcp(host) => {
            let mut stream = tokio::net::TcpStream::connect(host).await?;
            let sent = send_commands(reader, &mut stream).await?;
            stream.shutdown().await?;
            sent
        }
        #[cfg(unix)]
        ListenAddr::Unix(path) => {
            let mut stream = tokio::net::UnixStream::connect(path).await?;
            let sent = send_commands(reader, &mut stream).await?;
            stream.shutdown().await?;
            sent
        }
        #[cfg(not(unix))]
        ListenAddr::Unix(_) => return Err(RunnerError::Unsupported(addr.to_string())),
    };

    info!("Sent {} records to {}", sent, addr);
    Ok(sent)
}
