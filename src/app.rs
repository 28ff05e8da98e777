//! Application state: the headline list, its load phase, and selection.
//!
//! `App` is the presenter.  It never does I/O itself; the main loop asks it
//! for a sequence number before spawning a fetch ([`App::begin_fetch`]) and
//! feeds finished fetches back through [`App::apply_fetch`].
//!
//! Two tags keep late results from clobbering newer ones:
//!
//! * every fetch carries a sequence number, and a result is applied only if
//!   its number is higher than any result applied before it;
//! * every row assignment carries a generation, and a thumbnail result is
//!   applied only if the row still holds the same assignment.

use ratatui::widgets::ListState;
use tracing::{debug, info, warn};

use crate::error::FetchOutcome;
use crate::source::{Article, Thumbnail};
use crate::viewer::{DetailViewer, ShareTarget};

/// Where the presenter is in its load cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Loaded,
    LoadFailed,
}

/// Image state for one list row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowSlot {
    /// Identifies the article currently assigned to this row.
    pub generation: u64,
    pub thumbnail: Thumbnail,
}

/// A thumbnail load the main loop should start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailRequest {
    pub row: usize,
    pub generation: u64,
    pub image_url: Option<String>,
}

/// What [`App::apply_fetch`] did with a result.
#[derive(Debug, PartialEq, Eq)]
pub enum FetchApplied {
    /// A newer result had already been applied; this one was dropped.
    Stale,
    /// The list was replaced.  Start these thumbnail loads.
    Replaced(Vec<ThumbnailRequest>),
    /// The fetch failed; the list is unchanged.
    Failed,
}

pub struct App {
    /// Payload of the most recent applied successful fetch, in server order.
    pub articles: Vec<Article>,
    /// One slot per entry in `articles`.
    pub thumbnails: Vec<RowSlot>,
    /// List selection state for scrolling.
    pub list_state: ListState,
    pub phase: Phase,
    /// Last status message.
    pub status: String,
    /// Dismissible error popup text.
    pub error: Option<String>,
    /// Whether the user has requested to quit.
    pub quit: bool,
    issued_seq: u64,
    applied_seq: u64,
    next_generation: u64,
}

impl App {
    pub fn new() -> Self {
        Self {
            articles: Vec::new(),
            thumbnails: Vec::new(),
            list_state: ListState::default(),
            phase: Phase::Idle,
            status: "Starting…".into(),
            error: None,
            quit: false,
            issued_seq: 0,
            applied_seq: 0,
            next_generation: 0,
        }
    }

    // -- fetch lifecycle -----------------------------------------------------

    /// Enter `Loading` and return the sequence number for the new fetch.
    pub fn begin_fetch(&mut self) -> u64 {
        self.issued_seq += 1;
        self.phase = Phase::Loading;
        self.status = "Refreshing…".into();
        debug!(seq = self.issued_seq, "fetch issued");
        self.issued_seq
    }

    /// True while a fetch newer than the last applied one is outstanding.
    pub fn is_refreshing(&self) -> bool {
        self.issued_seq > self.applied_seq
    }

    /// Apply the result of fetch `seq`.
    pub fn apply_fetch(&mut self, seq: u64, outcome: FetchOutcome) -> FetchApplied {
        if seq <= self.applied_seq {
            info!(seq, applied = self.applied_seq, "discarding superseded fetch result");
            return FetchApplied::Stale;
        }
        self.applied_seq = seq;

        match outcome {
            Ok(articles) => {
                info!(seq, count = articles.len(), "headlines replaced");
                self.status = format!("Loaded {} headlines", articles.len());
                self.phase = Phase::Loaded;
                self.articles = articles;
                self.clamp_selection();
                FetchApplied::Replaced(self.reassign_rows())
            }
            Err(e) => {
                warn!(seq, kind = e.kind(), error = %e, "fetch failed");
                self.status = format!("Refresh failed ({})", e.kind());
                self.phase = Phase::LoadFailed;
                self.error = Some(format!("Failed to refresh news: {e}"));
                FetchApplied::Failed
            }
        }
    }

    /// Give every row a fresh generation and reset its image to pending.
    fn reassign_rows(&mut self) -> Vec<ThumbnailRequest> {
        self.thumbnails
            .resize_with(self.articles.len(), RowSlot::default);

        let mut requests = Vec::with_capacity(self.articles.len());
        for (row, (slot, article)) in self
            .thumbnails
            .iter_mut()
            .zip(&self.articles)
            .enumerate()
        {
            self.next_generation += 1;
            slot.generation = self.next_generation;
            slot.thumbnail = Thumbnail::Pending;
            requests.push(ThumbnailRequest {
                row,
                generation: slot.generation,
                image_url: article.image_url.clone(),
            });
        }
        requests
    }

    /// Store a finished thumbnail if the row still shows the same article.
    pub fn apply_thumbnail(&mut self, row: usize, generation: u64, thumbnail: Thumbnail) -> bool {
        match self.thumbnails.get_mut(row) {
            Some(slot) if slot.generation == generation => {
                slot.thumbnail = thumbnail;
                true
            }
            _ => {
                debug!(row, generation, "discarding stale thumbnail");
                false
            }
        }
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    // -- selection and collaborators -----------------------------------------

    /// URL of the article currently at position `index`.
    pub fn url_at(&self, index: usize) -> Option<&str> {
        self.articles.get(index).map(|a| a.url.as_str())
    }

    pub fn selected_article(&self) -> Option<&Article> {
        self.list_state.selected().and_then(|i| self.articles.get(i))
    }

    pub fn selected_url(&self) -> Option<&str> {
        self.list_state.selected().and_then(|i| self.url_at(i))
    }

    /// Hand the selected article's URL to the detail viewer.
    pub fn open_selected(&mut self, viewer: &dyn DetailViewer) {
        let Some(url) = self.selected_url().map(String::from) else {
            return;
        };
        if url::Url::parse(&url).is_err() {
            self.status = "Article has no valid link".into();
            return;
        }
        self.status = match viewer.render(&url) {
            Ok(()) => format!("Opened {url}"),
            Err(e) => {
                warn!(error = %e, "viewer failed");
                format!("Could not open article: {e}")
            }
        };
    }

    /// Hand the selected article's URL to the share target.
    pub fn share_selected(&mut self, share: &dyn ShareTarget) {
        let Some(url) = self.selected_url().map(String::from) else {
            return;
        };
        self.status = match share.share(&url) {
            Ok(()) => "Link copied to clipboard".into(),
            Err(e) => {
                warn!(error = %e, "share failed");
                format!("Could not share article: {e}")
            }
        };
    }

    // -- navigation ----------------------------------------------------------

    /// Keep the selection in range after the list changed size.
    fn clamp_selection(&mut self) {
        if self.articles.is_empty() {
            self.list_state.select(None);
            return;
        }
        let last = self.articles.len() - 1;
        let i = self.list_state.selected().map_or(0, |i| i.min(last));
        self.list_state.select(Some(i));
    }

    pub fn select_next(&mut self) {
        if self.articles.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(self.articles.len() - 1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        if self.articles.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_first(&mut self) {
        if !self.articles.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        if !self.articles.is_empty() {
            self.list_state.select(Some(self.articles.len() - 1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::source::make_article;
    use crate::viewer::tests::{Broken, Recorder};

    fn two_articles() -> Vec<Article> {
        vec![make_article("A", "http://a"), make_article("B", "http://b")]
    }

    fn loaded_app(articles: Vec<Article>) -> App {
        let mut app = App::new();
        let seq = app.begin_fetch();
        app.apply_fetch(seq, Ok(articles));
        app
    }

    // -- construction --------------------------------------------------------

    #[test]
    fn new_app_starts_idle_and_empty() {
        let app = App::new();
        assert!(app.articles.is_empty());
        assert_eq!(app.phase, Phase::Idle);
        assert!(!app.is_refreshing());
        assert!(app.list_state.selected().is_none());
    }

    // -- fetch lifecycle -----------------------------------------------------

    #[test]
    fn begin_fetch_enters_loading_with_increasing_seq() {
        let mut app = App::new();
        assert_eq!(app.begin_fetch(), 1);
        assert_eq!(app.begin_fetch(), 2);
        assert_eq!(app.phase, Phase::Loading);
        assert!(app.is_refreshing());
    }

    #[test]
    fn success_replaces_list() {
        let app = loaded_app(two_articles());

        assert_eq!(app.phase, Phase::Loaded);
        assert_eq!(app.articles.len(), 2);
        assert_eq!(app.articles[0].title, "A");
        assert_eq!(app.url_at(1), Some("http://b"));
        assert!(!app.is_refreshing());
        assert_eq!(app.list_state.selected(), Some(0));
    }

    #[test]
    fn empty_success_is_not_a_failure() {
        let mut app = loaded_app(two_articles());
        let seq = app.begin_fetch();
        let applied = app.apply_fetch(seq, Ok(vec![]));

        assert_eq!(applied, FetchApplied::Replaced(vec![]));
        assert_eq!(app.phase, Phase::Loaded);
        assert!(app.articles.is_empty());
        assert!(app.error.is_none());
        assert!(app.list_state.selected().is_none());
    }

    #[test]
    fn failure_keeps_previous_list() {
        let mut app = loaded_app(two_articles());
        let before = app.articles.clone();

        let seq = app.begin_fetch();
        let applied = app.apply_fetch(seq, Err(FetchError::EmptyBody));

        assert_eq!(applied, FetchApplied::Failed);
        assert_eq!(app.phase, Phase::LoadFailed);
        assert_eq!(app.articles, before);
        assert!(!app.is_refreshing());
        let msg = app.error.as_deref().unwrap();
        assert!(msg.starts_with("Failed to refresh news:"), "got {msg}");
    }

    #[test]
    fn decode_failure_leaves_length_unchanged() {
        let mut app = loaded_app(two_articles());
        let seq = app.begin_fetch();
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        app.apply_fetch(seq, Err(FetchError::Decode(err)));
        assert_eq!(app.articles.len(), 2);
    }

    #[test]
    fn older_result_after_newer_is_discarded() {
        let mut app = App::new();
        let first = app.begin_fetch();
        let second = app.begin_fetch();

        app.apply_fetch(second, Ok(vec![make_article("new", "http://new")]));
        let applied = app.apply_fetch(first, Ok(two_articles()));

        assert_eq!(applied, FetchApplied::Stale);
        assert_eq!(app.articles.len(), 1);
        assert_eq!(app.articles[0].title, "new");
    }

    #[test]
    fn older_result_before_newer_is_applied_then_replaced() {
        let mut app = App::new();
        let first = app.begin_fetch();
        let second = app.begin_fetch();

        app.apply_fetch(first, Ok(two_articles()));
        assert_eq!(app.articles.len(), 2);
        assert!(app.is_refreshing(), "newer fetch still outstanding");

        app.apply_fetch(second, Ok(vec![make_article("new", "http://new")]));
        assert_eq!(app.articles.len(), 1);
        assert!(!app.is_refreshing());
    }

    #[test]
    fn stale_failure_does_not_show_popup() {
        let mut app = App::new();
        let first = app.begin_fetch();
        let second = app.begin_fetch();

        app.apply_fetch(second, Ok(two_articles()));
        app.apply_fetch(first, Err(FetchError::EmptyBody));

        assert!(app.error.is_none());
        assert_eq!(app.phase, Phase::Loaded);
    }

    #[test]
    fn dismiss_error_clears_popup() {
        let mut app = App::new();
        let seq = app.begin_fetch();
        app.apply_fetch(seq, Err(FetchError::EmptyBody));
        app.dismiss_error();
        assert!(app.error.is_none());
    }

    // -- thumbnails ----------------------------------------------------------

    #[test]
    fn replacement_requests_one_thumbnail_per_row() {
        let mut articles = two_articles();
        articles[0].image_url = Some("http://a/img.png".into());

        let mut app = App::new();
        let seq = app.begin_fetch();
        let FetchApplied::Replaced(requests) = app.apply_fetch(seq, Ok(articles)) else {
            panic!("expected replacement");
        };

        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].row, 0);
        assert_eq!(requests[0].image_url.as_deref(), Some("http://a/img.png"));
        assert!(requests[1].image_url.is_none());
        assert_ne!(requests[0].generation, requests[1].generation);
        assert!(app.thumbnails.iter().all(|s| s.thumbnail == Thumbnail::Pending));
    }

    #[test]
    fn matching_generation_thumbnail_is_applied() {
        let mut app = loaded_app(two_articles());
        let generation = app.thumbnails[1].generation;

        assert!(app.apply_thumbnail(1, generation, Thumbnail::Placeholder));
        assert_eq!(app.thumbnails[1].thumbnail, Thumbnail::Placeholder);
    }

    #[test]
    fn thumbnail_for_replaced_row_is_discarded() {
        let mut app = loaded_app(two_articles());
        let old_generation = app.thumbnails[0].generation;

        let seq = app.begin_fetch();
        app.apply_fetch(seq, Ok(vec![make_article("C", "http://c")]));

        let ready = Thumbnail::Ready {
            content_type: None,
            size: 10,
        };
        assert!(!app.apply_thumbnail(0, old_generation, ready));
        assert_eq!(app.thumbnails[0].thumbnail, Thumbnail::Pending);
    }

    #[test]
    fn generations_never_repeat_after_shrink_and_regrow() {
        let mut app = loaded_app(two_articles());
        let first_generation = app.thumbnails[0].generation;

        let seq = app.begin_fetch();
        app.apply_fetch(seq, Ok(vec![]));
        let seq = app.begin_fetch();
        app.apply_fetch(seq, Ok(two_articles()));

        assert!(!app.apply_thumbnail(0, first_generation, Thumbnail::Placeholder));
    }

    #[test]
    fn thumbnail_for_missing_row_is_discarded() {
        let mut app = loaded_app(two_articles());
        assert!(!app.apply_thumbnail(5, 1, Thumbnail::Placeholder));
    }

    // -- selection and collaborators -----------------------------------------

    #[test]
    fn selected_row_resolves_to_current_article_after_replacement() {
        let mut app = loaded_app(two_articles());
        app.select_last();
        assert_eq!(app.selected_url(), Some("http://b"));

        let seq = app.begin_fetch();
        app.apply_fetch(
            seq,
            Ok(vec![make_article("X", "http://x"), make_article("Y", "http://y")]),
        );
        assert_eq!(app.selected_url(), Some("http://y"));
        assert_eq!(app.url_at(0), Some("http://x"));
    }

    #[test]
    fn selection_clamped_when_list_shrinks() {
        let mut app = loaded_app(two_articles());
        app.select_last();

        let seq = app.begin_fetch();
        app.apply_fetch(seq, Ok(vec![make_article("only", "http://only")]));
        assert_eq!(app.list_state.selected(), Some(0));
    }

    #[test]
    fn open_selected_passes_url_to_viewer() {
        let mut app = loaded_app(two_articles());
        app.select_next();
        let viewer = Recorder::default();

        app.open_selected(&viewer);

        assert_eq!(*viewer.urls.borrow(), vec!["http://b".to_string()]);
        assert!(app.status.contains("http://b"));
    }

    #[test]
    fn open_selected_skips_invalid_url() {
        let mut app = loaded_app(vec![make_article("bad", "not a link")]);
        let viewer = Recorder::default();

        app.open_selected(&viewer);

        assert!(viewer.urls.borrow().is_empty());
        assert_eq!(app.status, "Article has no valid link");
    }

    #[test]
    fn open_selected_reports_viewer_failure() {
        let mut app = loaded_app(two_articles());
        app.open_selected(&Broken);
        assert!(app.status.starts_with("Could not open article"));
    }

    #[test]
    fn share_selected_passes_url_to_share_target() {
        let mut app = loaded_app(two_articles());
        let share = Recorder::default();

        app.share_selected(&share);

        assert_eq!(*share.urls.borrow(), vec!["http://a".to_string()]);
    }

    #[test]
    fn collaborators_untouched_with_empty_list() {
        let mut app = App::new();
        let recorder = Recorder::default();
        app.open_selected(&recorder);
        app.share_selected(&recorder);
        assert!(recorder.urls.borrow().is_empty());
    }

    // -- navigation ----------------------------------------------------------

    #[test]
    fn select_next_on_empty_is_noop() {
        let mut app = App::new();
        app.select_next();
        assert!(app.list_state.selected().is_none());
    }

    #[test]
    fn select_previous_on_empty_is_noop() {
        let mut app = App::new();
        app.select_previous();
        assert!(app.list_state.selected().is_none());
    }

    #[test]
    fn select_next_clamps_at_last_item() {
        let mut app = loaded_app(two_articles());
        app.select_next();
        app.select_next();
        assert_eq!(app.list_state.selected(), Some(1));
    }

    #[test]
    fn select_previous_clamps_at_zero() {
        let mut app = loaded_app(two_articles());
        app.select_previous();
        assert_eq!(app.list_state.selected(), Some(0));
    }

    #[test]
    fn select_first_and_last_jump() {
        let mut app = loaded_app(two_articles());
        app.select_last();
        assert_eq!(app.list_state.selected(), Some(1));
        app.select_first();
        assert_eq!(app.list_state.selected(), Some(0));
    }
}
