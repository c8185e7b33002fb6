use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use diagnostics::{log_debug, log_info};
use memfs::FS;

/// Serve JSON tool calls, one per input line, until end of input.
///
/// Each call produces exactly one JSON outcome line; command failures are
/// reported in the outcome and never end the session. Blank lines are
/// skipped. Returns the number of commands handled.
pub async fn session_command<R, W>(fs: &FS, input: R, output: &mut W) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut handled = 0;
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let outcome = fs.execute_json(line).await;
        log_debug!("Session command {n} ok: {ok}", n: handled, ok: outcome.ok);

        let mut reply = serde_json::to_string(&outcome)?;
        reply.push('\n');
        output.write_all(reply.as_bytes()).await?;
        output.flush().await?;
        handled += 1;
    }
    log_info!("Session ended after {handled} commands", handled: handled);
    Ok(handled)
}
