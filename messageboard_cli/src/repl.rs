use std::io::{self, BufRead, Write};
use std::time::Duration;

use anyhow::Result;
use messageboard_frontend::{BoardApp, ViewId};
use tracing::warn;

use crate::render::render_view;

/// Runs the interactive session on stdin/stdout until `quit` or end of input.
pub fn run_repl(app: BoardApp, wait: Duration) -> Result<()> {
    let stdin = io::stdin();
    let mut session = Session::new(app, io::stdout(), wait);
    session.run(stdin.lock())
}

pub struct Session<W: Write> {
    app: BoardApp,
    out: W,
    wait: Duration,
}

#[derive(Debug, PartialEq, Eq)]
pub enum LoopAction {
    Continue,
    Exit,
}

impl<W: Write> Session<W> {
    pub fn new(app: BoardApp, out: W, wait: Duration) -> Self {
        Self { app, out, wait }
    }

    pub fn run(&mut self, mut input: impl BufRead) -> Result<()> {
        writeln!(self.out, "Magnificent Messageboard. Type 'help' for a list of commands.")?;
        self.app.refresh_front_page();
        self.settle()?;

        let mut line = String::new();
        loop {
            write!(self.out, "board> ")?;
            self.out.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                writeln!(self.out, "Exiting")?;
                break;
            }
            match self.handle_line(&line) {
                Ok(LoopAction::Continue) => {}
                Ok(LoopAction::Exit) => break,
                Err(err) => writeln!(self.out, "Error: {err:#}")?,
            }
        }
        Ok(())
    }

    /// Runs one input line. `post` and `reply` send the rest of the line exactly
    /// as typed; every other command is split with shell quoting rules.
    pub fn handle_line(&mut self, line: &str) -> Result<LoopAction> {
        let line = line.trim_end_matches(['\n', '\r']).trim_start();
        let (command, rest) = line
            .split_once(char::is_whitespace)
            .unwrap_or((line, ""));
        match command {
            "" => return Ok(LoopAction::Continue),
            "post" | "reply" => {
                let content = rest.trim_start();
                if content.is_empty() {
                    writeln!(self.out, "Usage: {command} MESSAGE")?;
                } else {
                    if command == "post" {
                        self.app.submit_top_level(content);
                    } else {
                        self.app.submit_reply(content);
                    }
                    self.settle()?;
                }
                return Ok(LoopAction::Continue);
            }
            _ => {}
        }
        match shell_words::split(line) {
            Ok(tokens) => self.handle_command(&tokens),
            Err(err) => {
                writeln!(self.out, "Unable to parse command: {err}")?;
                Ok(LoopAction::Continue)
            }
        }
    }

    fn handle_command(&mut self, tokens: &[String]) -> Result<LoopAction> {
        let Some(command) = tokens.first() else {
            return Ok(LoopAction::Continue);
        };
        match command.as_str() {
            "help" => self.print_help()?,
            "whoami" => writeln!(self.out, "{}", self.app.identity().tripcode())?,
            "list" | "ls" => self.render_current()?,
            "refresh" => {
                match self.app.thread().map(|view| view.id()) {
                    Some(view) => self.app.refresh(view),
                    None => self.app.refresh_front_page(),
                }
                self.settle()?;
            }
            "open" => {
                let Some(id) = tokens.get(1).and_then(|raw| raw.parse::<i64>().ok()) else {
                    writeln!(self.out, "Usage: open <post id>")?;
                    return Ok(LoopAction::Continue);
                };
                let found = self
                    .app
                    .front_page()
                    .posts()
                    .iter()
                    .find(|post| post.id == id)
                    .cloned();
                match found {
                    Some(post) => {
                        self.app.open_thread(post);
                        self.settle()?;
                    }
                    None => writeln!(self.out, "No post #{id} on the front page")?,
                }
            }
            "back" | "front" => {
                self.app.close_thread();
                self.render_current()?;
            }
            "quit" | "exit" => return Ok(LoopAction::Exit),
            other => {
                writeln!(
                    self.out,
                    "Unknown command '{other}'. Type 'help' for a list of commands."
                )?;
            }
        }
        Ok(LoopAction::Continue)
    }

    /// Waits for in-flight work, prints any notices and redraws the current view if it changed.
    fn settle(&mut self) -> Result<()> {
        if !self.app.wait_until_idle(self.wait) {
            warn!("gave up waiting for the board after {:?}", self.wait);
            writeln!(self.out, "Still waiting for the board; try 'list' later.")?;
        }
        for notice in self.app.take_notices() {
            writeln!(self.out, "{notice}")?;
        }
        let current = self.current_view();
        let mut changed = false;
        for view in [Some(ViewId::FrontPage), self.app.thread().map(|view| view.id())]
            .into_iter()
            .flatten()
        {
            if let Some(board) = self.app.view_mut(view) {
                let drained = !board.posts_mut().drain_changes().is_empty();
                changed |= drained && view == current;
            }
        }
        if changed {
            self.render_current()?;
        }
        Ok(())
    }

    fn current_view(&self) -> ViewId {
        self.app
            .thread()
            .map(|view| view.id())
            .unwrap_or(ViewId::FrontPage)
    }

    fn render_current(&mut self) -> Result<()> {
        let current = self.current_view();
        if let Some(view) = self.app.view(current) {
            render_view(view, &mut self.out)?;
        }
        Ok(())
    }

    fn print_help(&mut self) -> Result<()> {
        writeln!(self.out, "Available commands:")?;
        writeln!(self.out, "  help             Show this help message")?;
        writeln!(self.out, "  list             Show the current view again")?;
        writeln!(self.out, "  refresh          Reload the current view")?;
        writeln!(self.out, "  open <id>        Show a front page post and its replies")?;
        writeln!(self.out, "  back             Return to the front page")?;
        writeln!(self.out, "  post MESSAGE     Start a new thread, sending MESSAGE as typed")?;
        writeln!(self.out, "  reply MESSAGE    Reply to the open thread, sending MESSAGE as typed")?;
        writeln!(self.out, "  whoami           Print your tripcode")?;
        writeln!(self.out, "  quit             Leave")?;
        Ok(())
    }
}
