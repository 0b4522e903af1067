use std::slice;

use crate::models::Post;

/// What a list view has to redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListChange {
    /// Items were added at the end; `len` is the new size.
    Grew { len: usize },
    /// The whole list was replaced.
    Reset,
}

/// Ordered, append-only posts backing one view.
///
/// Lives on the UI thread only; workers hand their batches over through
/// [`crate::app::AppMessage`] instead of touching it.
#[derive(Debug, Default)]
pub struct PostList {
    posts: Vec<Post>,
    changes: Vec<ListChange>,
}

impl PostList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, post: Post) {
        self.posts.push(post);
        self.changes.push(ListChange::Grew {
            len: self.posts.len(),
        });
    }

    /// Appends a whole batch and reports it once.
    pub fn extend(&mut self, batch: impl IntoIterator<Item = Post>) {
        let before = self.posts.len();
        self.posts.extend(batch);
        if self.posts.len() != before {
            self.changes.push(ListChange::Grew {
                len: self.posts.len(),
            });
        }
    }

    pub fn clear(&mut self) {
        self.posts.clear();
        self.changes.push(ListChange::Reset);
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Post> {
        self.posts.get(index)
    }

    pub fn iter(&self) -> slice::Iter<'_, Post> {
        self.posts.iter()
    }

    pub fn ids(&self) -> Vec<i64> {
        self.posts.iter().map(|post| post.id).collect()
    }

    pub fn drain_changes(&mut self) -> Vec<ListChange> {
        std::mem::take(&mut self.changes)
    }
}

impl<'a> IntoIterator for &'a PostList {
    type Item = &'a Post;
    type IntoIter = slice::Iter<'a, Post>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
