use std::io;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use dbpeek_core::{
    models::connection::{ConnectionSpec, Dialect},
    Viewer,
};
use log::{error, info};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::config::AppConfig;

use super::screens;

/// Process-wide application context: the terminal and the open windows.
///
/// The last window in `windows` receives input; the loop ends when none
/// are left.
pub struct App {
    pub windows: Vec<Window>,
}

pub enum Window {
    ConnectionForm(ConnectionForm),
    Viewer(ViewerScreen),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Dialect,
    Hostname,
    Username,
    Password,
    Database,
}

impl FormField {
    pub const ALL: [FormField; 5] = [
        FormField::Dialect,
        FormField::Hostname,
        FormField::Username,
        FormField::Password,
        FormField::Database,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Dialect => "Dialect",
            FormField::Hostname => "Hostname",
            FormField::Username => "Username",
            FormField::Password => "Password",
            FormField::Database => "Database",
        }
    }

    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|f| *f == self).unwrap_or_default();
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        let i = Self::ALL.iter().position(|f| *f == self).unwrap_or_default();
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionForm {
    pub dialect: Dialect,
    pub hostname: String,
    pub username: String,
    pub password: String,
    pub database: String,
    pub current_field: FormField,
    pub error: Option<String>,
}

impl ConnectionForm {
    pub fn new(default_database: &str) -> Self {
        Self {
            dialect: Dialect::default(),
            hostname: String::new(),
            username: String::new(),
            password: String::new(),
            database: default_database.to_string(),
            current_field: FormField::Dialect,
            error: None,
        }
    }

    pub fn spec(&self) -> ConnectionSpec {
        ConnectionSpec {
            dialect: self.dialect,
            host: self.hostname.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            database: self.database.clone(),
        }
    }

    pub fn current_text_mut(&mut self) -> Option<&mut String> {
        match self.current_field {
            FormField::Dialect => None,
            FormField::Hostname => Some(&mut self.hostname),
            FormField::Username => Some(&mut self.username),
            FormField::Password => Some(&mut self.password),
            FormField::Database => Some(&mut self.database),
        }
    }
}

pub enum FormAction {
    None,
    Submit(ConnectionSpec),
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedWidget {
    TablesList,
    FilterColumn,
    FilterOperator,
    FilterValue,
    Grid,
}

impl FocusedWidget {
    pub fn is_filter_bar(&self) -> bool {
        matches!(
            self,
            FocusedWidget::FilterColumn | FocusedWidget::FilterOperator | FocusedWidget::FilterValue
        )
    }
}

pub struct ViewerScreen {
    pub viewer: Viewer,
    pub current_focus: FocusedWidget,
    /// Cursor in the table list.
    pub selected_table: usize,
    /// Highlighted grid row.
    pub selected_row: usize,
    pub error: Option<String>,
    pub status: Option<String>,
}

impl ViewerScreen {
    pub fn new(viewer: Viewer) -> Self {
        Self {
            viewer,
            current_focus: FocusedWidget::TablesList,
            selected_table: 0,
            selected_row: 0,
            error: None,
            status: None,
        }
    }

    pub async fn close(self) {
        self.viewer.close().await;
    }
}

pub enum ViewerAction {
    None,
    Close,
}

impl App {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            windows: vec![Window::ConnectionForm(ConnectionForm::new(
                &config.default_database,
            ))],
        }
    }

    pub async fn run(&mut self) -> Result<(), io::Error> {
        let _guard = TerminalGuard;
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.ui_loop(&mut terminal).await;

        terminal.show_cursor()?;

        result
    }

    async fn ui_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> io::Result<()> {
        while let Some(window) = self.windows.last() {
            terminal.draw(|f| screens::render_window(f, window))?;

            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key).await;
                }
            }
        }
        info!("Last window closed");
        Ok(())
    }

    /// Routes `key` to the active window and applies what it asks for.
    pub async fn handle_key(&mut self, key: KeyEvent) {
        let Some(window) = self.windows.pop() else {
            return;
        };

        match window {
            Window::ConnectionForm(mut form) => match form.handle_key(key) {
                FormAction::None => self.windows.push(Window::ConnectionForm(form)),
                FormAction::Cancel => info!("Connection form cancelled"),
                FormAction::Submit(spec) => match Viewer::open(&spec).await {
                    Ok(viewer) => self.windows.push(Window::Viewer(ViewerScreen::new(viewer))),
                    Err(err) => {
                        error!("Cannot open {}: {}", spec.redacted(), err);
                        form.error = Some(err.to_string());
                        self.windows.push(Window::ConnectionForm(form));
                    }
                },
            },
            Window::Viewer(mut screen) => match screen.handle_key(key).await {
                ViewerAction::None => self.windows.push(Window::Viewer(screen)),
                ViewerAction::Close => screen.close().await,
            },
        }
    }
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen, DisableMouseCapture);
    }
}
