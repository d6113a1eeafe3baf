use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

use crate::controller::Session;

/// Read taps from stdin, one `<line-number> <offset>` per line
pub async fn stdin_loop(session: Arc<Session>, cancel: CancellationToken) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let input = tokio::select! {
            line = lines.next_line() => line?,
            _ = cancel.cancelled() => return Ok(()),
        };
        let Some(input) = input else {
            break;
        };
        if input.trim().is_empty() {
            continue;
        }

        match parse_tap(&input) {
            Some((line_number, offset)) => {
                if session.tap(line_number, offset).await.is_none() {
                    tracing::warn!("No line {}", line_number);
                }
            }
            None => tracing::warn!("Expected '<line-number> <offset>', got '{}'", input),
        }
    }

    tracing::info!("stdin closed, taps disabled");
    cancel.cancelled().await;
    Ok(())
}

pub fn parse_tap(input: &str) -> Option<(usize, usize)> {
    let mut parts = input.split_whitespace();
    let line_number = parts.next()?.parse().ok()?;
    let offset = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((line_number, offset))
}
