use std::fmt;

use log::debug;

use crate::error::BoardError;
use crate::models::{Post, TOP_LEVEL};
use crate::presenter::PostList;

use super::tasks::TaskHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewId {
    FrontPage,
    /// Replies to the post with this row id.
    Thread(i64),
}

impl ViewId {
    /// `reply` value for posts submitted from this view.
    pub fn reply_target(self) -> i64 {
        match self {
            ViewId::FrontPage => TOP_LEVEL,
            ViewId::Thread(id) => id,
        }
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewId::FrontPage => write!(f, "front page"),
            ViewId::Thread(id) => write!(f, "thread #{id}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    #[default]
    Idle,
    Loading,
    Submitting,
}

/// One open list screen: its posts plus whatever work is in flight for it.
#[derive(Debug)]
pub struct BoardView {
    pub(super) id: ViewId,
    pub(super) original_post: Option<Post>,
    pub(super) posts: PostList,
    pub(super) generation: u64,
    pub(super) load_task: Option<TaskHandle>,
    pub(super) submit_task: Option<TaskHandle>,
    pub(super) submit_generation: u64,
    pub(super) last_error: Option<BoardError>,
}

impl BoardView {
    pub(super) fn front_page() -> Self {
        Self::with_id(ViewId::FrontPage, None)
    }

    pub(super) fn thread(post: Post) -> Self {
        Self::with_id(ViewId::Thread(post.id), Some(post))
    }

    fn with_id(id: ViewId, original_post: Option<Post>) -> Self {
        Self {
            id,
            original_post,
            posts: PostList::new(),
            generation: 0,
            load_task: None,
            submit_task: None,
            submit_generation: 0,
            last_error: None,
        }
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    /// The post whose replies a thread view lists.
    pub fn original_post(&self) -> Option<&Post> {
        self.original_post.as_ref()
    }

    pub fn posts(&self) -> &PostList {
        &self.posts
    }

    pub fn posts_mut(&mut self) -> &mut PostList {
        &mut self.posts
    }

    pub fn state(&self) -> SyncState {
        if self.submit_task.is_some() {
            SyncState::Submitting
        } else if self.load_task.is_some() {
            SyncState::Loading
        } else {
            SyncState::Idle
        }
    }

    pub fn is_busy(&self) -> bool {
        self.state() != SyncState::Idle
    }

    pub fn last_error(&self) -> Option<&BoardError> {
        self.last_error.as_ref()
    }

    /// Tag of the most recent refresh, or 0 before the first one.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Supersedes any running load and empties the list.
    pub(super) fn begin_refresh(&mut self, generation: u64) {
        if let Some(task) = self.load_task.take() {
            if !task.is_finished() {
                debug!("superseding in-flight load of {}", self.id);
            }
            task.cancel();
        }
        self.posts.clear();
        self.last_error = None;
        self.generation = generation;
    }

    pub(super) fn is_current(&self, generation: u64) -> bool {
        self.load_task.is_some() && self.generation == generation
    }

    pub(super) fn is_current_submit(&self, generation: u64) -> bool {
        self.submit_task.is_some() && self.submit_generation == generation
    }

    pub(super) fn cancel_tasks(&mut self) {
        for task in [self.load_task.take(), self.submit_task.take()]
            .into_iter()
            .flatten()
        {
            task.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_targets() {
        assert_eq!(ViewId::FrontPage.reply_target(), -1);
        assert_eq!(ViewId::Thread(5).reply_target(), 5);
    }

    #[test]
    fn view_names() {
        assert_eq!(ViewId::FrontPage.to_string(), "front page");
        assert_eq!(ViewId::Thread(7).to_string(), "thread #7");
    }

    #[test]
    fn new_view_is_idle_and_empty() {
        let view = BoardView::front_page();
        assert_eq!(view.state(), SyncState::Idle);
        assert!(view.posts().is_empty());
        assert_eq!(view.generation(), 0);
        assert!(!view.is_current(0));
    }
}
