use log::{debug, info, warn};

use crate::error::BoardError;
use crate::models::Post;

use super::state::ViewId;
use super::BoardApp;

/// Results sent from worker threads back to the UI thread.
#[derive(Debug)]
pub enum AppMessage {
    PostsLoaded {
        view: ViewId,
        generation: u64,
        result: Result<Vec<Post>, BoardError>,
    },
    PostSubmitted {
        view: ViewId,
        generation: u64,
        result: Result<i64, BoardError>,
    },
}

impl BoardApp {
    pub(super) fn handle_message(&mut self, message: AppMessage) {
        match message {
            AppMessage::PostsLoaded {
                view,
                generation,
                result,
            } => self.handle_posts_loaded(view, generation, result),
            AppMessage::PostSubmitted {
                view,
                generation,
                result,
            } => self.handle_post_submitted(view, generation, result),
        }
    }

    fn handle_posts_loaded(
        &mut self,
        view: ViewId,
        generation: u64,
        result: Result<Vec<Post>, BoardError>,
    ) {
        let Some(board) = self.view_mut(view) else {
            debug!("dropping posts for closed {view}");
            return;
        };
        if !board.is_current(generation) {
            debug!("dropping superseded load of {view} (generation {generation})");
            return;
        }
        board.load_task = None;
        match result {
            Ok(posts) => {
                info!("loaded {} posts into {view}", posts.len());
                board.posts.extend(posts);
            }
            Err(err) => {
                warn!("loading {view} failed: {err}");
                let notice = err.user_message();
                board.last_error = Some(err);
                self.notices.push_back(notice);
            }
        }
    }

    fn handle_post_submitted(
        &mut self,
        view: ViewId,
        generation: u64,
        result: Result<i64, BoardError>,
    ) {
        let Some(board) = self.view_mut(view) else {
            debug!("dropping submission result for closed {view}");
            return;
        };
        if !board.is_current_submit(generation) {
            debug!("dropping submission result from an earlier {view} (generation {generation})");
            return;
        }
        board.submit_task = None;
        match result {
            Ok(rowid) => {
                info!("created post #{rowid} from {view}");
                self.refresh(view);
            }
            Err(err) => {
                warn!("submitting to {view} failed: {err}");
                let notice = err.user_message();
                board.last_error = Some(err);
                self.notices.push_back(notice);
            }
        }
    }
}
