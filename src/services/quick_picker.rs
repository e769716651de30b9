//! Quick picker session.
//!
//! The quick picker is the hotkey popup: the user types, results are ranked
//! after a short debounce, and the selected prompt is copied to the clipboard.
//!
//! # Lifecycle
//!
//! ```text
//! Idle --activate--> Loading --collections loaded--> Ready --close--> Idle
//! ```
//!
//! Every activation reloads the store from disk, because the main window may
//! have changed the collections since the picker was last shown. Callers
//! invoke [`QuickPicker::activate`] when the window gains focus or becomes
//! visible.
//!
//! # Timers
//!
//! Two timers run as Tokio tasks: the debounce before re-ranking and the delay
//! between a successful copy and closing. Each keystroke aborts the pending
//! debounce. [`QuickPicker::shutdown`], also run on drop, aborts both.

use crate::config::{EmptyQueryMode, QuickPickerConfig};
use crate::models::{Prompt, WindowPosition};
use crate::services::search::{self, RankedPrompt};
use crate::services::{PromptStore, SettingsService};
use crate::{Error, Result};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use tokio::task::JoinHandle;

/// System clipboard.
pub trait Clipboard: Send + Sync {
    /// Replaces the clipboard text.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Clipboard`] if the write is rejected.
    fn write_text(&self, text: &str) -> Result<()>;
}

/// The popup window hosting the picker.
pub trait PickerWindow: Send + Sync {
    /// Hides the window.
    ///
    /// # Errors
    ///
    /// Returns an error if the window cannot be hidden.
    fn hide(&self) -> Result<()>;

    /// Current outer position, if known.
    fn outer_position(&self) -> Option<WindowPosition>;
}

/// Session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Not shown.
    #[default]
    Idle,
    /// Reloading collections.
    Loading,
    /// Accepting input.
    Ready,
}

/// Keys the picker reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Move selection up.
    Up,
    /// Move selection down.
    Down,
    /// Copy the selection.
    Enter,
    /// Close the picker.
    Escape,
    /// Anything else.
    Other,
}

/// Result of a copy attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    /// The text was copied and the picker will close.
    Copied {
        /// Copied prompt.
        prompt_id: String,
        /// Text placed on the clipboard.
        text: String,
    },
    /// The primary copy failed; the raw content was copied instead and the
    /// picker stays open.
    Fallback {
        /// Copied prompt.
        prompt_id: String,
        /// Raw content placed on the clipboard.
        text: String,
    },
    /// Nothing could be copied; the picker stays open.
    Failed,
}

/// Result of a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The selection moved to this index.
    Moved(usize),
    /// The selection was activated.
    Activated(CopyOutcome),
    /// The picker closed.
    Closed,
    /// The key did nothing.
    Ignored,
}

#[derive(Debug, Default)]
struct PickerState {
    phase: Phase,
    query: String,
    results: Vec<RankedPrompt>,
    selected: usize,
    copied: bool,
}

/// State shared with timer tasks.
struct Shared {
    state: Mutex<PickerState>,
    store: Arc<PromptStore>,
    window: Arc<dyn PickerWindow>,
    settings: OnceLock<Arc<SettingsService>>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, PickerState> {
        // State is plain data; a poisoned lock still holds a usable value.
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn refresh_results(&self, config: &QuickPickerConfig) {
        let query = self.lock().query.clone();
        let prompts = match self.store.get_all_prompts() {
            Ok(prompts) => prompts,
            Err(e) => {
                tracing::warn!(error = %e, "Quick picker could not read prompts");
                Vec::new()
            },
        };
        let results = compute_results(&prompts, &query, config);

        let mut state = self.lock();
        // A newer keystroke may have landed while ranking.
        if state.query == query {
            tracing::debug!(query = %query, results = results.len(), "Ranked quick picker results");
            state.results = results;
            state.selected = 0;
        }
    }

    fn close(&self) {
        {
            let mut state = self.lock();
            if state.phase == Phase::Idle {
                return;
            }
            state.phase = Phase::Idle;
            state.copied = false;
        }

        if let (Some(settings), Some(position)) = (self.settings.get(), self.window.outer_position()) {
            if let Err(e) = settings.save_quick_picker_position(position.x, position.y) {
                tracing::warn!(error = %e, "Failed to save quick picker position");
            }
        }
        if let Err(e) = self.window.hide() {
            tracing::warn!(error = %e, "Failed to hide quick picker");
        }
    }
}

fn compute_results(prompts: &[Prompt], query: &str, config: &QuickPickerConfig) -> Vec<RankedPrompt> {
    if !query.trim().is_empty() {
        return search::rank_prompts(prompts, query);
    }
    match config.empty_query {
        EmptyQueryMode::None => Vec::new(),
        EmptyQueryMode::MostUsed => search::most_used(prompts, config.most_used_limit)
            .into_iter()
            .map(|prompt| RankedPrompt { prompt, score: 0 })
            .collect(),
    }
}

/// A quick picker session.
///
/// Methods that start timers must be called from within a Tokio runtime.
pub struct QuickPicker {
    shared: Arc<Shared>,
    clipboard: Arc<dyn Clipboard>,
    config: QuickPickerConfig,
    debounce: Option<JoinHandle<()>>,
    close_timer: Option<JoinHandle<()>>,
}

impl QuickPicker {
    /// Creates an idle picker.
    #[must_use]
    pub fn new(
        store: Arc<PromptStore>,
        clipboard: Arc<dyn Clipboard>,
        window: Arc<dyn PickerWindow>,
        config: QuickPickerConfig,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(PickerState::default()),
                store,
                window,
                settings: OnceLock::new(),
            }),
            clipboard,
            config,
            debounce: None,
            close_timer: None,
        }
    }

    /// Saves the window position through `settings` on every close.
    ///
    /// Only the first settings service is kept.
    #[must_use]
    pub fn with_settings(self, settings: Arc<SettingsService>) -> Self {
        if self.shared.settings.set(settings).is_err() {
            tracing::warn!("Quick picker settings already set, ignoring replacement");
        }
        self
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.shared.lock().phase
    }

    /// Current query.
    #[must_use]
    pub fn query(&self) -> String {
        self.shared.lock().query.clone()
    }

    /// Current results.
    #[must_use]
    pub fn results(&self) -> Vec<RankedPrompt> {
        self.shared.lock().results.clone()
    }

    /// Index of the selected result.
    #[must_use]
    pub fn selected(&self) -> usize {
        self.shared.lock().selected
    }

    /// Whether the "copied" feedback is showing.
    #[must_use]
    pub fn is_copied(&self) -> bool {
        self.shared.lock().copied
    }

    /// Starts a fresh session: reloads the store and resets input state.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reloaded; the picker returns
    /// to [`Phase::Idle`].
    pub fn activate(&mut self) -> Result<()> {
        {
            let mut state = self.shared.lock();
            *state = PickerState {
                phase: Phase::Loading,
                ..PickerState::default()
            };
        }
        metrics::counter!("promptdock_quick_picker_activations_total").increment(1);

        if let Err(e) = self.shared.store.reload() {
            self.shared.lock().phase = Phase::Idle;
            return Err(e);
        }

        self.shared.refresh_results(&self.config);
        self.shared.lock().phase = Phase::Ready;
        tracing::debug!("Quick picker ready");
        Ok(())
    }

    /// Replaces the query and schedules a re-rank after the debounce delay.
    ///
    /// A pending re-rank from an earlier keystroke is cancelled.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.shared.lock().query = query.into();

        if let Some(pending) = self.debounce.take() {
            pending.abort();
        }

        let shared = Arc::clone(&self.shared);
        let config = self.config.clone();
        self.debounce = Some(tokio::spawn(async move {
            tokio::time::sleep(config.debounce()).await;
            shared.refresh_results(&config);
        }));
    }

    /// Waits for a pending re-rank to finish.
    ///
    /// Returns immediately when no keystroke is pending.
    pub async fn settle(&mut self) {
        if let Some(pending) = self.debounce.take() {
            if let Err(e) = pending.await {
                tracing::debug!(error = %e, "Debounce task did not complete");
            }
        }
    }

    /// Waits for a scheduled close to fire.
    pub async fn wait_closed(&mut self) {
        if let Some(pending) = self.close_timer.take() {
            if let Err(e) = pending.await {
                tracing::debug!(error = %e, "Close task did not complete");
            }
        }
    }

    /// Handles a key press.
    pub fn handle_key(&mut self, key: Key) -> KeyOutcome {
        if key == Key::Escape {
            self.close();
            return KeyOutcome::Closed;
        }

        let count = self.shared.lock().results.len();
        if count == 0 {
            return KeyOutcome::Ignored;
        }

        match key {
            Key::Up => {
                let mut state = self.shared.lock();
                state.selected = state.selected.saturating_sub(1);
                KeyOutcome::Moved(state.selected)
            },
            Key::Down => {
                let mut state = self.shared.lock();
                state.selected = (state.selected + 1).min(count - 1);
                KeyOutcome::Moved(state.selected)
            },
            Key::Enter => {
                let index = self.shared.lock().selected;
                KeyOutcome::Activated(self.copy_at(index))
            },
            Key::Escape | Key::Other => KeyOutcome::Ignored,
        }
    }

    /// Copies the result at `index`.
    ///
    /// On success the "copied" flag is set and the picker closes after the
    /// close delay. If recording the copy or writing the clipboard fails, or
    /// the prompt no longer exists, the raw content is written instead and the
    /// picker stays open.
    pub fn copy_at(&mut self, index: usize) -> CopyOutcome {
        let Some(prompt) = self
            .shared
            .lock()
            .results
            .get(index)
            .map(|r| r.prompt.clone())
        else {
            return CopyOutcome::Failed;
        };

        let primary = self
            .shared
            .store
            .copy_prompt_content::<std::hash::RandomState>(&prompt.id, None)
            .and_then(|text| {
                text.ok_or_else(|| Error::NotFound(format!("prompt {}", prompt.id)))
            })
            .and_then(|text| self.clipboard.write_text(&text).map(|()| text));

        match primary {
            Ok(text) => {
                self.shared.lock().copied = true;
                self.schedule_close();
                tracing::info!(prompt_id = %prompt.id, "Quick picker copied prompt");
                CopyOutcome::Copied {
                    prompt_id: prompt.id,
                    text,
                }
            },
            Err(e) => {
                tracing::warn!(prompt_id = %prompt.id, error = %e, "Copy failed, falling back to raw content");
                let raw = prompt.content().to_string();
                match self.clipboard.write_text(&raw) {
                    Ok(()) => CopyOutcome::Fallback {
                        prompt_id: prompt.id,
                        text: raw,
                    },
                    Err(e) => {
                        tracing::warn!(prompt_id = %prompt.id, error = %e, "Fallback copy failed");
                        self.shared.lock().copied = false;
                        CopyOutcome::Failed
                    },
                }
            },
        }
    }

    fn schedule_close(&mut self) {
        if let Some(pending) = self.close_timer.take() {
            pending.abort();
        }
        let shared = Arc::clone(&self.shared);
        let delay = self.config.close_delay();
        self.close_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            shared.close();
        }));
    }

    /// Closes the picker now, cancelling pending timers.
    pub fn close(&mut self) {
        self.abort_timers();
        self.shared.close();
    }

    /// Aborts every pending timer without closing the window.
    pub fn shutdown(&mut self) {
        self.abort_timers();
    }

    fn abort_timers(&mut self) {
        if let Some(handle) = self.debounce.take() {
            handle.abort();
        }
        if let Some(handle) = self.close_timer.take() {
            handle.abort();
        }
    }
}

impl Drop for QuickPicker {
    fn drop(&mut self) {
        self.abort_timers();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewPrompt;
    use crate::storage::{Collection, MemoryGateway, PersistenceGateway};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct FakeClipboard {
        texts: Mutex<Vec<String>>,
        fail_all: AtomicBool,
    }

    impl Clipboard for FakeClipboard {
        fn write_text(&self, text: &str) -> Result<()> {
            if self.fail_all.load(Ordering::SeqCst) {
                return Err(Error::Clipboard("denied".to_string()));
            }
            self.texts.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeWindow {
        hides: AtomicUsize,
    }

    impl PickerWindow for FakeWindow {
        fn hide(&self) -> Result<()> {
            self.hides.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn outer_position(&self) -> Option<WindowPosition> {
            Some(WindowPosition { x: 5, y: 7 })
        }
    }

    struct Harness {
        gateway: Arc<MemoryGateway>,
        store: Arc<PromptStore>,
        clipboard: Arc<FakeClipboard>,
        window: Arc<FakeWindow>,
        picker: QuickPicker,
    }

    fn harness(config: QuickPickerConfig) -> Harness {
        let gateway = Arc::new(MemoryGateway::new());
        let store = Arc::new(PromptStore::new(gateway.clone()));
        store
            .create_prompt(NewPrompt::new("Bar Foo", "first {x}"))
            .unwrap();
        store.create_prompt(NewPrompt::new("Foo Bar", "second")).unwrap();
        store.create_prompt(NewPrompt::new("Other", "about bar")).unwrap();

        let clipboard = Arc::new(FakeClipboard::default());
        let window = Arc::new(FakeWindow::default());
        let settings = Arc::new(SettingsService::new(gateway.clone()));
        let picker = QuickPicker::new(store.clone(), clipboard.clone(), window.clone(), config)
            .with_settings(settings);

        Harness {
            gateway,
            store,
            clipboard,
            window,
            picker,
        }
    }

    async fn settle(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_activation_reloads_and_readies() {
        let mut h = harness(QuickPickerConfig::default());
        let loads = h.gateway.prompt_loads();

        h.picker.activate().unwrap();
        assert_eq!(h.picker.phase(), Phase::Ready);
        assert_eq!(h.gateway.prompt_loads(), loads + 1);
        assert!(h.picker.results().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_ranks_only_last_query() {
        let mut h = harness(QuickPickerConfig::default());
        h.picker.activate().unwrap();

        h.picker.set_query("fo");
        settle(100).await;
        assert!(h.picker.results().is_empty());

        h.picker.set_query("bar");
        settle(100).await;
        assert!(h.picker.results().is_empty());

        settle(60).await;
        let titles: Vec<String> = h.picker.results().into_iter().map(|r| r.prompt.title).collect();
        assert_eq!(titles, ["Bar Foo", "Foo Bar", "Other"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_selection_is_clamped() {
        let mut h = harness(QuickPickerConfig::default());
        h.picker.activate().unwrap();
        assert_eq!(h.picker.handle_key(Key::Down), KeyOutcome::Ignored);

        h.picker.set_query("bar");
        settle(200).await;

        assert_eq!(h.picker.handle_key(Key::Up), KeyOutcome::Moved(0));
        assert_eq!(h.picker.handle_key(Key::Down), KeyOutcome::Moved(1));
        assert_eq!(h.picker.handle_key(Key::Down), KeyOutcome::Moved(2));
        assert_eq!(h.picker.handle_key(Key::Down), KeyOutcome::Moved(2));
        assert_eq!(h.picker.handle_key(Key::Other), KeyOutcome::Ignored);
    }

    #[tokio::test(start_paused = true)]
    async fn test_enter_copies_then_closes_after_delay() {
        let mut h = harness(QuickPickerConfig::default());
        h.picker.activate().unwrap();
        h.picker.set_query("bar");
        settle(200).await;

        let outcome = h.picker.handle_key(Key::Enter);
        let KeyOutcome::Activated(CopyOutcome::Copied { prompt_id, text }) = outcome else {
            panic!("unexpected outcome: {outcome:?}");
        };
        assert_eq!(text, "first {x}");
        assert!(h.picker.is_copied());
        assert_eq!(h.store.get_prompt(&prompt_id).unwrap().unwrap().usage_count, 1);
        assert_eq!(h.clipboard.texts.lock().unwrap().as_slice(), ["first {x}"]);

        settle(250).await;
        assert_eq!(h.picker.phase(), Phase::Ready);

        settle(100).await;
        assert_eq!(h.picker.phase(), Phase::Idle);
        assert_eq!(h.window.hides.load(Ordering::SeqCst), 1);
        assert_eq!(
            h.gateway.load_settings().unwrap().unwrap().quick_picker.position,
            Some(WindowPosition { x: 5, y: 7 })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_and_wait_closed() {
        let mut h = harness(QuickPickerConfig::default());
        h.picker.activate().unwrap();
        h.picker.settle().await;

        h.picker.set_query("other");
        h.picker.settle().await;
        assert_eq!(h.picker.results().len(), 1);

        assert!(matches!(h.picker.copy_at(0), CopyOutcome::Copied { .. }));
        h.picker.wait_closed().await;
        assert_eq!(h.picker.phase(), Phase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_failure_falls_back_to_raw_copy() {
        let mut h = harness(QuickPickerConfig::default());
        h.picker.activate().unwrap();
        h.picker.set_query("other");
        settle(200).await;

        h.gateway.fail_writes(Collection::Prompts, true);
        let outcome = h.picker.copy_at(0);
        assert!(matches!(outcome, CopyOutcome::Fallback { ref text, .. } if text == "about bar"));

        settle(1000).await;
        assert_eq!(h.picker.phase(), Phase::Ready);
        assert_eq!(h.window.hides.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_prompt_deleted_after_activation_falls_back() {
        let mut h = harness(QuickPickerConfig::default());
        h.picker.activate().unwrap();
        h.picker.set_query("other");
        h.picker.settle().await;
        let id = h.picker.results()[0].prompt.id.clone();

        assert!(h.store.delete_prompt(&id).unwrap());
        let outcome = h.picker.copy_at(0);
        assert!(matches!(outcome, CopyOutcome::Fallback { ref text, .. } if text == "about bar"));
        assert!(!h.picker.is_copied());

        settle(1000).await;
        assert_eq!(h.picker.phase(), Phase::Ready);
        assert_eq!(h.window.hides.load(Ordering::SeqCst), 0);
        assert!(h.store.get_prompt(&id).unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_settings_attached_while_timer_pending() {
        let gateway = Arc::new(MemoryGateway::new());
        let store = Arc::new(PromptStore::new(gateway.clone()));
        store.create_prompt(NewPrompt::new("Bar", "b")).unwrap();
        let window = Arc::new(FakeWindow::default());
        let mut picker = QuickPicker::new(
            store,
            Arc::new(FakeClipboard::default()),
            window.clone(),
            QuickPickerConfig::default(),
        );
        picker.activate().unwrap();
        picker.set_query("bar");

        let mut picker = picker.with_settings(Arc::new(SettingsService::new(gateway.clone())));
        picker.close();

        assert_eq!(window.hides.load(Ordering::SeqCst), 1);
        assert_eq!(
            gateway.load_settings().unwrap().unwrap().quick_picker.position,
            Some(WindowPosition { x: 5, y: 7 })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_clipboard_failure_stays_open() {
        let mut h = harness(QuickPickerConfig::default());
        h.picker.activate().unwrap();
        h.picker.set_query("other");
        settle(200).await;

        h.clipboard.fail_all.store(true, Ordering::SeqCst);
        assert_eq!(h.picker.copy_at(0), CopyOutcome::Failed);
        assert!(!h.picker.is_copied());

        settle(1000).await;
        assert_eq!(h.picker.phase(), Phase::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn test_escape_closes_and_cancels_timers() {
        let mut h = harness(QuickPickerConfig::default());
        h.picker.activate().unwrap();
        h.picker.set_query("bar");

        assert_eq!(h.picker.handle_key(Key::Escape), KeyOutcome::Closed);
        assert_eq!(h.picker.phase(), Phase::Idle);

        settle(500).await;
        assert!(h.picker.results().is_empty());
        assert_eq!(h.window.hides.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_aborts_close_timer() {
        let mut h = harness(QuickPickerConfig::default());
        h.picker.activate().unwrap();
        h.picker.set_query("bar");
        settle(200).await;
        h.picker.handle_key(Key::Enter);

        let window = h.window.clone();
        drop(h);
        settle(1000).await;
        assert_eq!(window.hides.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_most_used_mode_lists_on_empty_query() {
        let config = QuickPickerConfig {
            empty_query: EmptyQueryMode::MostUsed,
            ..QuickPickerConfig::default()
        };
        let mut h = harness(config);
        let other = h
            .store
            .get_all_prompts()
            .unwrap()
            .into_iter()
            .find(|p| p.title == "Other")
            .unwrap();
        h.store
            .copy_prompt_content::<std::hash::RandomState>(&other.id, None)
            .unwrap();

        h.picker.activate().unwrap();
        let results = h.picker.results();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].prompt.title, "Other");
    }
}
