//! Glue between prompt lines, the controllers and the worker channel.
//!
//! [`App`] turns a parsed [`Command`] into controller calls, forwards the
//! resulting requests to the worker, and renders what changed as text.

use std::path::Path;

use anyhow::{Context, Result};
use sockguard_core::ImageFile;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::add_form::AddSockForm;
use crate::command::{parse_command, Command, HELP};
use crate::controller::SockListController;
use crate::modal::ModalKind;
use crate::notify::NotificationService;
use crate::view::{self, RenderStrategy};
use crate::worker::{Request, Response};

/// What the front-end should do after handling a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Print this text and keep reading
    Continue(String),
    /// Exit
    Quit,
}

/// Front-end state.
pub struct App {
    list: SockListController,
    form: AddSockForm,
    strategy: Box<dyn RenderStrategy>,
    requests: mpsc::UnboundedSender<Request>,
    seen_list_toasts: u64,
    seen_form_toasts: u64,
}

impl App {
    pub fn new(
        page_size: usize,
        notifications: NotificationService,
        strategy: Box<dyn RenderStrategy>,
        requests: mpsc::UnboundedSender<Request>,
    ) -> Self {
        Self {
            list: SockListController::new(page_size, notifications.clone()),
            form: AddSockForm::new(notifications),
            strategy,
            requests,
            seen_list_toasts: 0,
            seen_form_toasts: 0,
        }
    }

    pub fn list(&self) -> &SockListController {
        &self.list
    }

    pub fn form(&self) -> &AddSockForm {
        &self.form
    }

    /// Issue the initial page load.
    pub fn start(&mut self) -> Result<()> {
        if let Some(request) = self.list.init() {
            self.send(request)?;
        }
        Ok(())
    }

    fn send(&self, request: Request) -> Result<()> {
        self.requests
            .send(request)
            .context("API worker is no longer running")
    }

    fn send_opt(&self, request: Option<Request>) -> Result<()> {
        match request {
            Some(request) => self.send(request),
            None => Ok(()),
        }
    }

    /// Handle one prompt line.
    pub async fn handle_line(&mut self, line: &str) -> Result<Outcome> {
        if line.trim().is_empty() {
            return Ok(Outcome::Continue(String::new()));
        }

        let command = match parse_command(line) {
            Ok(command) => command,
            Err(e) => return Ok(Outcome::Continue(format!("{e}\n"))),
        };
        debug!("Command: {:?}", command);

        let mut out = String::new();
        match command {
            Command::Quit => return Ok(Outcome::Quit),
            Command::Help => out.push_str(HELP),
            Command::Search(query) => match self.list.search(&query) {
                Some(request) => self.send(request)?,
                None => out.push_str("Already showing that search.\n"),
            },
            Command::Clear => {
                let request = self.list.clear_search();
                self.send(request)?;
            }
            Command::Priority(priority) => {
                let request = self.list.set_priority(priority);
                self.send(request)?;
            }
            Command::Refresh => {
                let request = self.list.reload();
                self.send(request)?;
            }
            Command::More => match self.list.load_more() {
                Some(request) => self.send(request)?,
                None => out.push_str("Still loading…\n"),
            },
            Command::Toggle(row) => match self.row_id(row) {
                Some(id) => {
                    let request = self.list.toggle_clean(&id);
                    self.send_opt(request)?;
                }
                None => out.push_str(&no_row(row)),
            },
            Command::Delete(row) => match self.row_id(row) {
                Some(id) => {
                    self.list.request_delete(&id);
                    self.push_modal(&mut out);
                }
                None => out.push_str(&no_row(row)),
            },
            Command::Confirm => match self.list.confirm_delete() {
                Some(request) => self.send(request)?,
                None => out.push_str("Nothing to confirm.\n"),
            },
            Command::Cancel => {
                self.list.cancel_delete();
                out.push_str("Cancelled.\n");
            }
            Command::History(row) => match self.row_id(row) {
                Some(id) => {
                    let request = self.list.show_wash_history(&id);
                    self.send(request)?;
                }
                None => out.push_str(&no_row(row)),
            },
            Command::Stats => {
                let request = self.list.show_stats();
                self.send(request)?;
            }
            Command::Close => {
                if self.list.close_modal(None).is_none() {
                    out.push_str("Nothing to close.\n");
                }
                self.push_modal(&mut out);
            }
            Command::Add(pairs) => self.add(pairs, &mut out).await?,
            Command::Form => out.push_str(&view::render_form(&self.form)),
            Command::Again => {
                self.form.add_another();
                out.push_str(&view::render_form(&self.form));
            }
        }

        self.push_toasts(&mut out);
        Ok(Outcome::Continue(out))
    }

    async fn add(&mut self, pairs: Vec<(String, String)>, out: &mut String) -> Result<()> {
        // Every other field needs a color, whatever order the pairs came in.
        let (color, rest): (Vec<_>, Vec<_>) = pairs
            .into_iter()
            .partition(|(key, _)| key.trim().eq_ignore_ascii_case("color"));
        for (key, value) in color.into_iter().chain(rest) {
            let applied = if key == "photo" {
                match read_photo(Path::new(&value)).await {
                    Ok(file) => self.form.attach_photo(file),
                    Err(e) => {
                        warn!("Could not read photo {}: {:#}", value, e);
                        out.push_str(&format!("{e:#}\n"));
                        continue;
                    }
                }
            } else {
                self.form.set(&key, &value)
            };

            if let Err(e) = applied {
                out.push_str(&format!("{e}\n"));
            }
        }

        if let Ok(request) = self.form.submit() {
            self.send(request)?;
            out.push_str("Saving…\n");
        }
        Ok(())
    }

    /// Fold a worker response in and render what changed.
    pub fn handle_response(&mut self, response: Response) -> String {
        let mut out = String::new();
        match response {
            Response::SockAdded(result) => {
                self.form.apply(result);
                out.push_str(&view::render_form(&self.form));
            }
            Response::WashHistory { .. } | Response::Stats(_) => {
                self.list.apply(response);
                self.push_modal(&mut out);
            }
            Response::Deleted { .. } => {
                self.list.apply(response);
                self.push_list(&mut out);
                self.push_modal(&mut out);
            }
            other => {
                self.list.apply(other);
                self.push_list(&mut out);
            }
        }
        self.push_toasts(&mut out);
        out
    }

    /// Full redraw of the list and any open modal.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.push_list(&mut out);
        self.push_modal(&mut out);
        out
    }

    fn row_id(&self, row: usize) -> Option<sockguard_core::SockId> {
        self.list.sock_at(row.checked_sub(1)?).map(|s| s.id.clone())
    }

    fn push_list(&self, out: &mut String) {
        out.push_str(&view::render_list(&self.list, self.strategy.as_ref()));
        out.push_str(&view::status_line(&self.list));
        out.push('\n');
    }

    fn push_modal(&self, out: &mut String) {
        if let Some(modal) = self.list.modals().top() {
            out.push_str(&view::render_modal(modal));
        }
        if self.list.modals().is_open(ModalKind::ConfirmDelete)
            && !matches!(self.list.modals().top().map(|m| m.kind()), Some(ModalKind::ConfirmDelete))
        {
            out.push_str("A delete is waiting for :yes or :no.\n");
        }
    }

    fn push_toasts(&mut self, out: &mut String) {
        let list = self.list.notifications();
        if list.shown() != self.seen_list_toasts {
            self.seen_list_toasts = list.shown();
            if let Some(toast) = list.current() {
                out.push_str(&view::render_toast(toast));
                out.push('\n');
            }
        }

        let form = self.form.notifications();
        if form.shown() != self.seen_form_toasts {
            self.seen_form_toasts = form.shown();
            if let Some(toast) = form.current() {
                out.push_str(&view::render_toast(toast));
                out.push('\n');
            }
        }
    }
}

fn no_row(row: usize) -> String {
    format!("No sock at row {row}.\n")
}

async fn read_photo(path: &Path) -> Result<ImageFile> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read photo: {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "photo".to_string());
    Ok(ImageFile::from_named_bytes(file_name, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::WideTable;

    fn app() -> (App, mpsc::UnboundedReceiver<Request>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let app = App::new(10, NotificationService::default(), Box::new(WideTable), tx);
        (app, rx)
    }

    #[tokio::test]
    async fn test_quit_and_help() {
        let (mut app, _rx) = app();
        assert_eq!(app.handle_line(":quit").await.unwrap(), Outcome::Quit);
        match app.handle_line(":help").await.unwrap() {
            Outcome::Continue(text) => assert!(text.contains(":toggle <row>")),
            Outcome::Quit => panic!("help should not quit"),
        }
    }

    #[tokio::test]
    async fn test_parse_error_is_printed() {
        let (mut app, mut rx) = app();
        match app.handle_line(":toggle zero").await.unwrap() {
            Outcome::Continue(text) => assert!(text.contains("row number")),
            Outcome::Quit => panic!("unexpected quit"),
        }
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_search_sends_page_request() {
        let (mut app, mut rx) = app();
        app.start().unwrap();
        assert!(matches!(rx.try_recv().unwrap(), Request::LoadPage(p) if p.offset == 0));

        app.handle_line("синий").await.unwrap();
        match rx.try_recv().unwrap() {
            Request::LoadPage(page) => assert_eq!(page.query, "синий"),
            other => panic!("unexpected request: {other:?}"),
        }

        match app.handle_line(":search синий").await.unwrap() {
            Outcome::Continue(text) => assert!(text.contains("Already showing")),
            Outcome::Quit => panic!("unexpected quit"),
        }
    }

    #[tokio::test]
    async fn test_unknown_row() {
        let (mut app, mut rx) = app();
        match app.handle_line(":toggle 4").await.unwrap() {
            Outcome::Continue(text) => assert_eq!(text, "No sock at row 4.\n"),
            Outcome::Quit => panic!("unexpected quit"),
        }
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_add_accepts_color_after_other_fields() {
        let (mut app, mut rx) = app();
        let line = ":add style=Спортивные pattern=Однотонные material=Хлопок size=L brand=Nike color=Черный";
        match app.handle_line(line).await.unwrap() {
            Outcome::Continue(text) => {
                assert!(!text.contains("Pick a color first"));
                assert!(text.contains("Saving"));
            }
            Outcome::Quit => panic!("unexpected quit"),
        }
        match rx.try_recv().unwrap() {
            Request::AddSock(sock) => {
                assert_eq!(sock.color, "Черный");
                assert_eq!(sock.style, "Спортивные");
                assert_eq!(sock.brand, "Nike");
            }
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_add_with_missing_photo_file() {
        let (mut app, mut rx) = app();
        let line = r#":add color=Черный style=Спортивные pattern=Однотонные material=Хлопок size=L brand=Nike photo=/nonexistent/sock.png"#;
        match app.handle_line(line).await.unwrap() {
            Outcome::Continue(text) => {
                assert!(text.contains("Failed to read photo"));
                assert!(text.contains("Saving"));
            }
            Outcome::Quit => panic!("unexpected quit"),
        }
        match rx.try_recv().unwrap() {
            Request::AddSock(sock) => {
                assert_eq!(sock.size, "L");
                assert!(sock.photo.is_none());
            }
            other => panic!("unexpected request: {other:?}"),
        }
    }
}
