use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, error};

use crate::api::BoardClient;

use super::messages::AppMessage;
use super::state::ViewId;

/// The board ignores `offset`, so the front page is always requested from the top.
const FRONT_PAGE_OFFSET: i64 = 0;

/// Shared flag telling a worker its result is no longer wanted.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A running background request.
#[derive(Debug)]
pub struct TaskHandle {
    token: CancelToken,
    join: JoinHandle<()>,
}

impl TaskHandle {
    /// Flags the worker; it still runs to completion but sends nothing.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

fn spawn<F>(work: F) -> TaskHandle
where
    F: FnOnce(CancelToken) + Send + 'static,
{
    let token = CancelToken::new();
    let worker_token = token.clone();
    let join = thread::spawn(move || work(worker_token));
    TaskHandle { token, join }
}

pub fn load_posts(
    client: BoardClient,
    tx: Sender<AppMessage>,
    view: ViewId,
    generation: u64,
) -> TaskHandle {
    spawn(move |token| {
        let result = match view {
            ViewId::FrontPage => client.fetch_front_page(FRONT_PAGE_OFFSET),
            ViewId::Thread(post_id) => client.fetch_replies(post_id),
        };
        if token.is_cancelled() {
            debug!("discarding superseded load of {view}");
            return;
        }
        let message = AppMessage::PostsLoaded {
            view,
            generation,
            result,
        };
        if tx.send(message).is_err() {
            error!("failed to send PostsLoaded message");
        }
    })
}

pub fn submit_post(
    client: BoardClient,
    tx: Sender<AppMessage>,
    view: ViewId,
    generation: u64,
    content: String,
) -> TaskHandle {
    spawn(move |token| {
        let result = client.submit_post(&content, view.reply_target());
        if token.is_cancelled() {
            debug!("{view} closed before its submission finished");
            return;
        }
        let message = AppMessage::PostSubmitted {
            view,
            generation,
            result,
        };
        if tx.send(message).is_err() {
            error!("failed to send PostSubmitted message");
        }
    })
}
