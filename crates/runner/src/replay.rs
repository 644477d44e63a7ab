use agora_engine::{Engine, parse_command};
use log::{debug, info};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::error::{Result, RunnerError};

/// Feed a text command stream through the engine
///
/// Stops at the first malformed line; everything before it has already been
/// submitted. Returns the number of requests submitted.
pub async fn replay<R>(engine: &Engine, reader: R) -> Result<u64>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut line_no = 0;
    let mut submitted = 0u64;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let request = parse_command(&line).map_err(|source| RunnerError::Replay {
            line: line_no,
            source,
        })?;
        if let Some(request) = request {
            debug!("Replaying line {}: {}", line_no, line.trim());
            engine.submit(request).await?;
            submitted += 1;
        }
    }

    info!("Replayed {} requests from {} lines", submitted, line_no);
    Ok(submitted)
}
