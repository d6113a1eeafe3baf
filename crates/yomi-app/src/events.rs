use std::sync::Arc;

use kanal::{AsyncReceiver, AsyncSender};
use tokio_util::sync::CancellationToken;
use yomi_core::WorkerPool;
use yomi_core::preprocess::{Preprocessor, preprocessor};
use yomi_lang_japanese::DefinitionResolver;
use yomi_types::{AppEvent, StreamEvent};

use crate::state::AppState;

/// Forward stream events to the app bus, recording each line and warming the
/// cache with it. Drains what is already queued once cancelled.
pub async fn event_pump(
    state: Arc<AppState>,
    stream_rx: AsyncReceiver<StreamEvent>,
    app_tx: AsyncSender<AppEvent>,
    resolver: Arc<DefinitionResolver>,
    preload_pool: Arc<WorkerPool>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let preprocessor = preprocessor(state.config.stream.normalize_lines);
    let pump = Pump {
        state,
        app_tx,
        resolver,
        preload_pool,
        preprocessor,
        cancel: cancel.clone(),
    };

    tracing::info!("Event pump started");
    loop {
        let event = tokio::select! {
            event = stream_rx.recv() => event?,
            _ = cancel.cancelled() => break,
        };
        pump.handle(event).await?;
    }

    while let Ok(Some(event)) = stream_rx.try_recv() {
        pump.handle(event).await?;
    }
    tracing::info!("Event pump stopped");

    Ok(())
}

struct Pump {
    state: Arc<AppState>,
    app_tx: AsyncSender<AppEvent>,
    resolver: Arc<DefinitionResolver>,
    preload_pool: Arc<WorkerPool>,
    preprocessor: Box<dyn Preprocessor>,
    cancel: CancellationToken,
}

impl Pump {
    async fn handle(&self, event: StreamEvent) -> anyhow::Result<()> {
        match event {
            StreamEvent::State(state) => {
                tracing::debug!("Connection {}", state);
                self.publish(AppEvent::Connection(state)).await?;
            }
            StreamEvent::Line(raw) => {
                let line = self.preprocessor.process(&raw);
                let number = self.state.push_line(line.clone()).await;
                tracing::debug!("Line {}: {}", number, line);

                if !self.preload_pool.is_cancelled() {
                    let resolver = self.resolver.clone();
                    let text = line.clone();
                    self.preload_pool.spawn("preload", async move {
                        resolver.preload(&text).await;
                    });
                }

                self.publish(AppEvent::Line(line)).await?;
            }
        }
        Ok(())
    }

    /// Once cancelled, events are delivered only if there is room
    async fn publish(&self, event: AppEvent) -> anyhow::Result<()> {
        if self.cancel.is_cancelled() {
            self.app_tx.try_send(event)?;
            return Ok(());
        }

        tokio::select! {
            result = self.app_tx.send(event.clone()) => result?,
            _ = self.cancel.cancelled() => {
                self.app_tx.try_send(event)?;
            }
        }
        Ok(())
    }
}
