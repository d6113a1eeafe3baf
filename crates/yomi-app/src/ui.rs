use kanal::AsyncReceiver;
use yomi_types::{AppEvent, ResolveEvent};

/// Headless consumer: prints numbered lines and definition updates to stdout
pub async fn ui_loop(app_rx: AsyncReceiver<AppEvent>) -> anyhow::Result<()> {
    let mut line_number = 0usize;

    loop {
        let event = app_rx.recv().await?;
        match event {
            AppEvent::Connection(state) => tracing::info!("Connection {}", state),
            AppEvent::Line(text) => {
                println!("[{line_number}] {text}");
                line_number += 1;
            }
            AppEvent::Definition { request_id, event } => match event {
                ResolveEvent::Interim(found) => {
                    tracing::debug!("{} interim: {}", request_id, found.word);
                }
                ResolveEvent::Final(found) => {
                    println!(
                        "  {} ({}..{})",
                        found.entry.display_text(),
                        found.start,
                        found.start + found.len()
                    );
                }
                ResolveEvent::NotFound => println!("  no definition"),
            },
        }
    }
}
