use std::io::{self, Write};

use messageboard_frontend::{BoardView, Post, SyncState};

/// `#id [hash] content`, with continuation lines indented under the content.
pub fn format_post(post: &Post) -> String {
    let prefix = format!("#{} [{}] ", post.id, post.hash);
    let indent = " ".repeat(prefix.chars().count());
    let mut out = prefix;
    for (i, line) in post.content.lines().enumerate() {
        if i > 0 {
            out.push('\n');
            out.push_str(&indent);
        }
        out.push_str(line);
    }
    out
}

pub fn render_view(view: &BoardView, out: &mut impl Write) -> io::Result<()> {
    if let Some(op) = view.original_post() {
        writeln!(out, "=== {} ===", format_post(op))?;
    }
    match view.state() {
        SyncState::Loading => writeln!(out, "(loading {}...)", view.id())?,
        SyncState::Submitting => writeln!(out, "(submitting...)")?,
        SyncState::Idle => {}
    }
    if view.posts().is_empty() {
        writeln!(out, "No posts.")?;
    }
    for post in view.posts() {
        writeln!(out, "{}", format_post(post))?;
    }
    Ok(())
}

pub fn render_posts(posts: &[Post], out: &mut impl Write) -> io::Result<()> {
    if posts.is_empty() {
        writeln!(out, "No posts.")?;
    }
    for post in posts {
        writeln!(out, "{}", format_post(post))?;
    }
    Ok(())
}
