use tokio::sync::RwLock;
use yomi_config::Config;

pub struct AppState {
    pub config: Config,
    lines: RwLock<Vec<String>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            lines: RwLock::new(Vec::new()),
        }
    }

    /// Store a received line and return its number (0-based, wire order)
    pub async fn push_line(&self, line: String) -> usize {
        let mut lines = self.lines.write().await;
        lines.push(line);
        lines.len() - 1
    }

    pub async fn line(&self, number: usize) -> Option<String> {
        self.lines.read().await.get(number).cloned()
    }

    pub async fn line_count(&self) -> usize {
        self.lines.read().await.len()
    }
}
