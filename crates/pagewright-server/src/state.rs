use crate::notify::Notifier;
use github_publisher::Publisher;
use pagewright_core::workspace::WorkspaceStore;
use pagewright_core::Config;
use pagewright_gen::Generator;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared application state passed to all route handlers.
///
/// Every component is constructed once from the explicit `Config`; nothing
/// reads ambient configuration afterwards.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub generator: Arc<Generator>,
    pub workspace: Arc<WorkspaceStore>,
    pub publisher: Arc<Publisher>,
    pub notifier: Arc<Notifier>,
    task_locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            generator: Arc::new(Generator::from_config(&config)),
            workspace: Arc::new(WorkspaceStore::new(config.workspace_dir.clone())),
            publisher: Arc::new(Publisher::from_config(&config)),
            notifier: Arc::new(Notifier::from_config(&config)),
            config: Arc::new(config),
            task_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Per-task serialization point: two runs for the same task id must not
    /// interleave workspace writes or remote-repository mutations. Neither
    /// the filesystem nor the remote host guarantees this, so the
    /// orchestrator holds this lock for the whole run.
    pub async fn task_lock(&self, task_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.task_locks.lock().await;
        locks
            .entry(task_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
