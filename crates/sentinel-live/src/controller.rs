//! Task that owns a [`ViewState`] and keeps it in sync with a store.
//!
//! Every change notification spawns a full refetch. Refetches are neither
//! coalesced nor cancelled while the view is live; whichever resolves last
//! is what stays on screen. The store subscription is released when the
//! task ends, and in-flight fetches are aborted with it.

use std::sync::Arc;

use sentinel_core::{FeedbackRecord, FilterSpec};
use sentinel_store::{RecordStore, StoreError, Subscription};
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

use crate::state::ViewState;

#[derive(Debug, Error)]
pub enum LiveError {
    #[error("view controller has stopped")]
    Stopped,
    #[error("view controller task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// User actions on the view.
#[derive(Debug, Clone)]
pub enum Command {
    SetFilter(FilterSpec),
    ClearFilter,
    Select(Option<String>),
    DismissNotice,
    /// Refetch now, as if the store had signalled a change.
    Refresh,
    Shutdown,
}

/// Handle to a running view controller.
///
/// Dropping the handle stops the controller and releases its subscription.
pub struct ViewController {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<ViewState>,
    task: JoinHandle<()>,
}

impl ViewController {
    /// Subscribe to `store` and start the initial load.
    ///
    /// The subscription is taken before the first fetch so no change made
    /// during the load is missed.
    pub fn spawn<S>(store: Arc<S>) -> Self
    where
        S: RecordStore + ?Sized + 'static,
    {
        let (commands, receiver) = mpsc::channel(32);
        let (publish, snapshots) = watch::channel(ViewState::new());
        let subscription = store.subscribe();

        let runner = ControllerRunner {
            store,
            state: ViewState::new(),
            receiver,
            publish,
            fetches: JoinSet::new(),
        };
        let task = tokio::spawn(runner.run(subscription));

        Self {
            commands,
            snapshots,
            task,
        }
    }

    /// Latest published state.
    pub fn snapshot(&self) -> ViewState {
        self.snapshots.borrow().clone()
    }

    /// Receiver that observes every published state.
    pub fn watch(&self) -> watch::Receiver<ViewState> {
        self.snapshots.clone()
    }

    pub async fn send(&self, command: Command) -> Result<(), LiveError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| LiveError::Stopped)
    }

    pub async fn set_filter(&self, filter: FilterSpec) -> Result<(), LiveError> {
        self.send(Command::SetFilter(filter)).await
    }

    pub async fn clear_filter(&self) -> Result<(), LiveError> {
        self.send(Command::ClearFilter).await
    }

    pub async fn select(&self, id: Option<String>) -> Result<(), LiveError> {
        self.send(Command::Select(id)).await
    }

    pub async fn refresh(&self) -> Result<(), LiveError> {
        self.send(Command::Refresh).await
    }

    /// Stop the controller and wait for it to release its resources.
    pub async fn shutdown(self) -> Result<(), LiveError> {
        // Already stopped is fine; the task result below is what matters.
        let _ = self.commands.send(Command::Shutdown).await;
        self.task.await?;
        Ok(())
    }
}

type FetchResult = Result<Vec<FeedbackRecord>, StoreError>;

struct ControllerRunner<S: ?Sized> {
    store: Arc<S>,
    state: ViewState,
    receiver: mpsc::Receiver<Command>,
    publish: watch::Sender<ViewState>,
    fetches: JoinSet<FetchResult>,
}

impl<S> ControllerRunner<S>
where
    S: RecordStore + ?Sized + 'static,
{
    async fn run(mut self, subscription: Subscription) {
        let mut subscription = Some(subscription);
        info!("view controller started");
        self.spawn_fetch();

        loop {
            tokio::select! {
                command = self.receiver.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle(command),
                },
                Some(joined) = self.fetches.join_next(), if !self.fetches.is_empty() => {
                    let result = match joined {
                        Ok(fetched) => fetched.map_err(|e| e.to_string()),
                        Err(e) => Err(format!("fetch task failed: {e}")),
                    };
                    self.state.apply_fetch(result);
                    if self.state.is_terminal() && subscription.take().is_some() {
                        debug!("view in error state, released subscription");
                    }
                    self.publish();
                },
                change = next_change(&mut subscription), if subscription.is_some() => match change {
                    Some(event) => {
                        debug!(inserted = event.inserted, "store changed, refetching");
                        self.spawn_fetch();
                    }
                    None => {
                        warn!("store change feed closed");
                        subscription = None;
                    }
                },
            }
        }

        drop(subscription);
        self.fetches.abort_all();
        info!("view controller stopped");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::SetFilter(filter) => self.state.set_filter(filter),
            Command::ClearFilter => self.state.clear_filter(),
            Command::Select(id) => self.state.select(id),
            Command::DismissNotice => self.state.dismiss_notice(),
            Command::Refresh => {
                if !self.state.is_terminal() {
                    self.spawn_fetch();
                }
            }
            Command::Shutdown => {}
        }
        self.publish();
    }

    fn spawn_fetch(&mut self) {
        let store = Arc::clone(&self.store);
        self.fetches.spawn(async move { store.select_all().await });
    }

    fn publish(&self) {
        self.publish.send_replace(self.state.clone());
    }
}

async fn next_change(
    subscription: &mut Option<Subscription>,
) -> Option<sentinel_store::ChangeEvent> {
    match subscription {
        Some(sub) => sub.changed().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{NoticeLevel, Phase};
    use async_trait::async_trait;
    use chrono::Utc;
    use sentinel_core::{NewFeedback, Selection, Source, Urgency};
    use sentinel_store::{ChangeEvent, ChangeFeed, MemoryStore};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::oneshot;

    fn record(id: &str, urgency: Urgency) -> FeedbackRecord {
        NewFeedback {
            source: Source::Chat,
            author: "agent".into(),
            text: format!("record {id}"),
            timestamp: Utc::now(),
            sentiment: None,
            sentiment_score: None,
            urgency: Some(urgency),
            keywords: vec![],
            rating: None,
            suggested_response: None,
        }
        .into_record(id)
    }

    /// Store whose fetches resolve when the test says so, in the order the
    /// fetches were issued.
    #[derive(Default)]
    struct ScriptedStore {
        feed: ChangeFeed,
        pending: Mutex<VecDeque<oneshot::Receiver<FetchResult>>>,
        calls: AtomicUsize,
    }

    impl ScriptedStore {
        fn script(&self) -> oneshot::Sender<FetchResult> {
            let (tx, rx) = oneshot::channel();
            self.pending.lock().unwrap().push_back(rx);
            tx
        }

        fn notify(&self) {
            self.feed.publish(ChangeEvent { inserted: 1 });
        }
    }

    #[async_trait]
    impl RecordStore for ScriptedStore {
        async fn select_all(&self) -> Result<Vec<FeedbackRecord>, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.pending.lock().unwrap().pop_front();
            match next {
                Some(rx) => rx
                    .await
                    .unwrap_or_else(|_| Err(StoreError::Other("script dropped".into()))),
                None => Ok(Vec::new()),
            }
        }

        async fn insert(
            &self,
            _items: Vec<NewFeedback>,
        ) -> Result<Vec<FeedbackRecord>, StoreError> {
            Err(StoreError::Other("read only".into()))
        }

        fn subscribe(&self) -> Subscription {
            self.feed.subscribe()
        }
    }

    async fn wait_until(
        rx: &mut watch::Receiver<ViewState>,
        pred: impl FnMut(&ViewState) -> bool,
    ) -> ViewState {
        tokio::time::timeout(Duration::from_secs(5), rx.wait_for(pred))
            .await
            .expect("timed out waiting for view state")
            .expect("controller stopped")
            .clone()
    }

    async fn wait_for_calls(store: &ScriptedStore, n: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while store.calls.load(Ordering::SeqCst) < n {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("timed out waiting for fetch");
    }

    #[tokio::test]
    async fn loads_and_refreshes_on_change() {
        let store = Arc::new(MemoryStore::new());
        let controller = ViewController::spawn(store.clone());
        let mut rx = controller.watch();

        let state = wait_until(&mut rx, |s| s.phase == Phase::Ready).await;
        assert!(state.records.is_empty());

        let item = NewFeedback::classified(
            Source::Forum,
            "tech_enthusiast",
            "crash on start",
            Utc::now(),
            sentinel_core::Classification {
                sentiment: sentinel_core::Sentiment::Negative,
                sentiment_score: 0.2,
                urgency: Urgency::High,
                keywords: vec!["crash".into()],
                suggested_response: "sorry".into(),
            },
        );
        store.insert(vec![item]).await.unwrap();

        let state = wait_until(&mut rx, |s| s.records.len() == 1).await;
        assert_eq!(state.stats.urgent_count, 1);
        assert!(state.trends[0].is_alerting);

        controller.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn initial_failure_is_terminal_and_releases_subscription() {
        let store = Arc::new(ScriptedStore::default());
        store
            .script()
            .send(Err(StoreError::Other("offline".into())))
            .unwrap();

        let controller = ViewController::spawn(store.clone());
        let mut rx = controller.watch();
        let state = wait_until(&mut rx, |s| s.is_terminal()).await;
        assert_eq!(state.phase, Phase::Error("offline".into()));

        // Released before the error state was published.
        assert_eq!(store.feed.subscriber_count(), 0);

        store.notify();
        controller.refresh().await.unwrap();
        tokio::task::yield_now().await;
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
        assert!(controller.snapshot().is_terminal());

        controller.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn failed_refresh_keeps_loaded_records() {
        let store = Arc::new(ScriptedStore::default());
        store
            .script()
            .send(Ok(vec![record("a", Urgency::Low)]))
            .unwrap();
        let controller = ViewController::spawn(store.clone());
        let mut rx = controller.watch();
        wait_until(&mut rx, |s| s.is_ready()).await;

        store
            .script()
            .send(Err(StoreError::Other("timeout".into())))
            .unwrap();
        store.notify();

        let state = wait_until(&mut rx, |s| {
            s.notice.as_ref().map(|n| n.level) == Some(NoticeLevel::Error)
        })
        .await;
        assert_eq!(state.phase, Phase::Ready);
        assert_eq!(state.records.len(), 1);

        controller.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn last_resolving_fetch_wins() {
        let store = Arc::new(ScriptedStore::default());
        store.script().send(Ok(vec![])).unwrap();
        let controller = ViewController::spawn(store.clone());
        let mut rx = controller.watch();
        wait_until(&mut rx, |s| s.is_ready()).await;

        let older = store.script();
        let newer = store.script();
        store.notify();
        store.notify();
        wait_for_calls(&store, 3).await;

        // Newer fetch resolves first, the older one last.
        newer.send(Ok(vec![record("new", Urgency::High)])).unwrap();
        wait_until(&mut rx, |s| s.records.first().map(|r| r.id.as_str()) == Some("new")).await;

        older
            .send(Ok(vec![record("old", Urgency::Low), record("old2", Urgency::Low)]))
            .unwrap();
        let state = wait_until(&mut rx, |s| s.records.len() == 2).await;
        assert_eq!(state.records[0].id, "old");

        controller.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn filter_commands_update_visible() {
        let store = Arc::new(ScriptedStore::default());
        store
            .script()
            .send(Ok(vec![
                record("a", Urgency::Low),
                record("b", Urgency::High),
                record("c", Urgency::Medium),
            ]))
            .unwrap();
        let controller = ViewController::spawn(store.clone());
        let mut rx = controller.watch();
        let state = wait_until(&mut rx, |s| s.is_ready()).await;
        let ids: Vec<&str> = state.visible.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);

        controller
            .set_filter(FilterSpec {
                urgency: Selection::Only(Urgency::Medium),
                ..FilterSpec::default()
            })
            .await
            .unwrap();
        let state = wait_until(&mut rx, |s| s.visible.len() == 1).await;
        assert_eq!(state.visible[0].id, "c");
        assert_eq!(state.stats.total_count, 3);

        controller.select(Some("b".into())).await.unwrap();
        let state = wait_until(&mut rx, |s| s.selected.is_some()).await;
        assert_eq!(state.selected_record().map(|r| r.id.as_str()), Some("b"));

        controller.clear_filter().await.unwrap();
        wait_until(&mut rx, |s| s.visible.len() == 3).await;

        controller.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn shutdown_releases_subscription() {
        let store = Arc::new(ScriptedStore::default());
        let controller = ViewController::spawn(store.clone());
        assert_eq!(store.feed.subscriber_count(), 1);

        controller.shutdown().await.unwrap();
        assert_eq!(store.feed.subscriber_count(), 0);

        // Notifications after teardown reach nobody.
        let calls = store.calls.load(Ordering::SeqCst);
        store.notify();
        tokio::task::yield_now().await;
        assert_eq!(store.calls.load(Ordering::SeqCst), calls);
    }
}
