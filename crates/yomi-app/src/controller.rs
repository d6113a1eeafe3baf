use std::sync::Arc;
use std::time::Duration;

use kanal::{AsyncReceiver, AsyncSender};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;
use yomi_config::Config;
use yomi_core::{Lookup, ResultCache, WorkerPool};
use yomi_io::ConnectionManager;
use yomi_lang_japanese::{DefinitionResolver, TieredLookup};
use yomi_types::{AppEvent, ResolveEvent, ResolveRequest, StreamEvent};

use crate::events::event_pump;
use crate::state::AppState;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

/// Centralized channel management
pub struct ChannelSet {
    pub stream: (AsyncSender<StreamEvent>, AsyncReceiver<StreamEvent>),
    pub app: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
}

impl ChannelSet {
    pub fn new() -> Self {
        Self {
            stream: kanal::bounded_async(256),
            app: kanal::bounded_async(256),
        }
    }
}

/// One reading session: the line stream, the shared cache and the resolver.
///
/// Everything is built once here and shared by `Arc`; there is no global
/// state.
pub struct Session {
    state: Arc<AppState>,
    resolver: Arc<DefinitionResolver>,
    pool: Arc<WorkerPool>,
    preload_pool: Arc<WorkerPool>,
    connection: Mutex<ConnectionManager>,
    channels: ChannelSet,
    cancel: CancellationToken,
    pump: Mutex<Option<JoinHandle<anyhow::Result<()>>>>,
}

impl Session {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let lookup = TieredLookup::from_config(&config.lookup)?;
        Ok(Self::with_lookup(config, Arc::new(lookup)))
    }

    pub fn with_lookup(config: Config, lookup: Arc<dyn Lookup>) -> Self {
        let channels = ChannelSet::new();
        let cancel = CancellationToken::new();

        let cache = Arc::new(ResultCache::new());
        let resolver = Arc::new(DefinitionResolver::new(cache, lookup, &config.resolver));
        // Taps never queue behind cache warming
        let pool = Arc::new(WorkerPool::new(config.resolver.workers, cancel.clone()));
        let preload_pool = Arc::new(WorkerPool::new(
            config.resolver.preload_workers,
            cancel.clone(),
        ));
        let connection = ConnectionManager::new(config.stream.clone(), channels.stream.0.clone());

        Self {
            state: Arc::new(AppState::new(config)),
            resolver,
            pool,
            preload_pool,
            connection: Mutex::new(connection),
            channels,
            cancel,
            pump: Mutex::new(None),
        }
    }

    /// Consumer side of the event bus
    pub fn events(&self) -> AsyncReceiver<AppEvent> {
        self.channels.app.1.clone()
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    pub fn resolver(&self) -> &Arc<DefinitionResolver> {
        &self.resolver
    }

    /// Start the event pump and connect to the configured host
    pub async fn start(&self) -> anyhow::Result<()> {
        {
            let mut pump = self.pump.lock().await;
            if pump.is_none() {
                *pump = Some(tokio::spawn(event_pump(
                    self.state.clone(),
                    self.channels.stream.1.clone(),
                    self.channels.app.0.clone(),
                    self.resolver.clone(),
                    self.preload_pool.clone(),
                    self.cancel.clone(),
                )));
            }
        }

        let stream = &self.state.config.stream;
        self.connection.lock().await.start(&stream.host, stream.port)?;
        Ok(())
    }

    /// Resolve a tap in the background. Publications arrive on the event bus
    /// as `AppEvent::Definition` tagged with the returned id.
    pub fn resolve(&self, request: ResolveRequest) -> Uuid {
        let id = request.id;
        let resolver = self.resolver.clone();
        let app_tx = self.channels.app.0.clone();

        tracing::debug!(
            "Resolve {} at {} in '{}'",
            id,
            request.clicked_index,
            request.full_text
        );

        self.pool.spawn("resolve", async move {
            let (tx, rx) = kanal::unbounded_async();

            let resolve = async move {
                resolver
                    .resolve_at(&request.full_text, request.clicked_index, &tx)
                    .await
            };
            let forward = async {
                while let Ok(event) = rx.recv().await {
                    let done = matches!(event, ResolveEvent::Final(_) | ResolveEvent::NotFound);
                    let event = AppEvent::Definition {
                        request_id: id,
                        event,
                    };
                    if app_tx.send(event).await.is_err() || done {
                        break;
                    }
                }
            };

            let (found, ()) = tokio::join!(resolve, forward);
            match found {
                Some(found) => tracing::info!("{} -> {}", found.word, found.entry.display_text()),
                None => tracing::info!("No definition for request {}", id),
            }
        });

        id
    }

    /// Resolve `offset` (in chars) of a previously received line
    pub async fn tap(&self, line_number: usize, offset: usize) -> Option<Uuid> {
        let line = self.state.line(line_number).await?;
        Some(self.resolve(ResolveRequest::new(line, offset)))
    }

    /// Stop the stream, cancel outstanding resolutions and preloads, and wait
    /// (bounded) for them
    pub async fn close(&self) {
        self.connection.lock().await.stop().await;
        self.cancel.cancel();

        if let Some(pump) = self.pump.lock().await.take() {
            match tokio::time::timeout(SHUTDOWN_TIMEOUT, pump).await {
                Ok(Ok(Ok(()))) => {}
                Ok(Ok(Err(e))) => tracing::error!("Event pump failed: {e}"),
                Ok(Err(e)) => tracing::error!("Event pump panicked: {e}"),
                Err(_) => tracing::warn!("Event pump did not stop within {:?}", SHUTDOWN_TIMEOUT),
            }
        }

        for (name, pool) in [("resolve", &self.pool), ("preload", &self.preload_pool)] {
            if !pool.shutdown(SHUTDOWN_TIMEOUT).await {
                tracing::warn!("{} {} tasks still running after shutdown", pool.active(), name);
            }
        }

        let stats = self.resolver.stats();
        tracing::info!(
            "Session closed: {} cache hits, {} fetches ({} found, {} misses, {} failures)",
            stats.cache_hits,
            stats.fetches,
            stats.found,
            stats.misses,
            stats.failures
        );
    }
}
