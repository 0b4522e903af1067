use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::api::BoardClient;
use crate::error::BoardError;
use crate::identity::Identity;
use crate::models::Post;

mod messages;
mod state;
mod tasks;

pub use messages::AppMessage;
pub use state::{BoardView, SyncState, ViewId};
pub use tasks::{CancelToken, TaskHandle};

/// UI-thread owner of every open view.
///
/// Network calls run on one short-lived worker thread each; their results come
/// back through the channel and are applied by [`BoardApp::process_messages`],
/// so the post lists are only ever mutated from the thread that owns the app.
pub struct BoardApp {
    client: BoardClient,
    tx: Sender<AppMessage>,
    rx: Receiver<AppMessage>,
    front_page: BoardView,
    thread: Option<BoardView>,
    notices: VecDeque<String>,
    // Shared by loads and submits across views, so a closed view's late result
    // never matches work started after it was reopened.
    last_generation: u64,
}

impl BoardApp {
    pub fn new(client: BoardClient) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            client,
            tx,
            rx,
            front_page: BoardView::front_page(),
            thread: None,
            notices: VecDeque::new(),
            last_generation: 0,
        }
    }

    pub fn client(&self) -> &BoardClient {
        &self.client
    }

    pub fn identity(&self) -> &Identity {
        self.client.identity()
    }

    pub fn front_page(&self) -> &BoardView {
        &self.front_page
    }

    pub fn thread(&self) -> Option<&BoardView> {
        self.thread.as_ref()
    }

    pub fn view(&self, view: ViewId) -> Option<&BoardView> {
        match view {
            ViewId::FrontPage => Some(&self.front_page),
            ViewId::Thread(_) => self.thread.as_ref().filter(|board| board.id == view),
        }
    }

    pub fn view_mut(&mut self, view: ViewId) -> Option<&mut BoardView> {
        match view {
            ViewId::FrontPage => Some(&mut self.front_page),
            ViewId::Thread(_) => self.thread.as_mut().filter(|board| board.id == view),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.front_page.is_busy() || self.thread.as_ref().is_some_and(BoardView::is_busy)
    }

    /// User-facing messages queued since the last call.
    pub fn take_notices(&mut self) -> Vec<String> {
        self.notices.drain(..).collect()
    }

    pub fn refresh_front_page(&mut self) {
        self.refresh(ViewId::FrontPage);
    }

    pub fn refresh_thread(&mut self) {
        if let Some(view) = self.thread.as_ref().map(BoardView::id) {
            self.refresh(view);
        }
    }

    /// Clears the view right away and starts loading it again.
    pub fn refresh(&mut self, view: ViewId) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        self.last_generation += 1;
        let generation = self.last_generation;
        let Some(board) = self.view_mut(view) else {
            warn!("cannot refresh {view}: it is not open");
            return;
        };
        board.begin_refresh(generation);
        debug!("refreshing {view} (generation {generation})");
        board.load_task = Some(tasks::load_posts(client, tx, view, generation));
    }

    /// Opens the reply list of `post`, replacing any thread already open.
    pub fn open_thread(&mut self, post: Post) {
        self.close_thread();
        let view = ViewId::Thread(post.id);
        self.thread = Some(BoardView::thread(post));
        self.refresh(view);
    }

    pub fn close_thread(&mut self) {
        if let Some(mut board) = self.thread.take() {
            board.cancel_tasks();
        }
    }

    pub fn submit_top_level(&mut self, content: &str) {
        self.submit(ViewId::FrontPage, content);
    }

    /// Replies to the open thread's original post.
    pub fn submit_reply(&mut self, content: &str) {
        match self.thread.as_ref().map(BoardView::id) {
            Some(view) => self.submit(view, content),
            None => self.fail(
                ViewId::FrontPage,
                BoardError::Validation("no thread is open".to_string()),
            ),
        }
    }

    /// Sends `content` from `view`; on success the view reloads itself.
    pub fn submit(&mut self, view: ViewId, content: &str) {
        if content.trim().is_empty() {
            self.fail(
                view,
                BoardError::Validation("post content cannot be empty".to_string()),
            );
            return;
        }
        let client = self.client.clone();
        let tx = self.tx.clone();
        self.last_generation += 1;
        let generation = self.last_generation;
        let Some(board) = self.view_mut(view) else {
            warn!("cannot submit to {view}: it is not open");
            return;
        };
        if board.submit_task.is_some() {
            self.fail(
                view,
                BoardError::Validation("a post is already being submitted".to_string()),
            );
            return;
        }
        board.last_error = None;
        board.submit_generation = generation;
        board.submit_task = Some(tasks::submit_post(
            client,
            tx,
            view,
            generation,
            content.to_string(),
        ));
    }

    /// Applies every result that has already arrived, without blocking.
    pub fn process_messages(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(message) = self.rx.try_recv() {
            self.handle_message(message);
            handled += 1;
        }
        handled
    }

    /// Blocks up to `timeout` for the next result, then drains the rest.
    pub fn wait_for_messages(&mut self, timeout: Duration) -> usize {
        match self.rx.recv_timeout(timeout) {
            Ok(message) => {
                self.handle_message(message);
                1 + self.process_messages()
            }
            Err(RecvTimeoutError::Timeout) => 0,
            Err(RecvTimeoutError::Disconnected) => {
                warn!("message channel disconnected");
                0
            }
        }
    }

    /// Processes results until no view is busy. Returns `false` on timeout.
    pub fn wait_until_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.is_busy() {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            self.wait_for_messages(deadline - now);
        }
        true
    }

    fn fail(&mut self, view: ViewId, err: BoardError) {
        warn!("{view}: {err}");
        self.notices.push_back(err.user_message());
        if let Some(board) = self.view_mut(view) {
            board.last_error = Some(err);
        }
    }
}

impl Drop for BoardApp {
    fn drop(&mut self) {
        self.front_page.cancel_tasks();
        self.close_thread();
    }
}
