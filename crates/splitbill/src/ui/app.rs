//! Application loop for the TUI.

use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use crossterm::event::{
    self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::{Frame, Terminal};
use time::OffsetDateTime;
use time::macros::format_description;

use crate::app::bill_lines::ParsedBill;
use crate::app::form::BillForm;
use crate::app::report::{ReportOptions, ReportRenderer};
use crate::infra::config::{Config, Keybindings};
use crate::ui::components::people_list::{PeopleList, PeopleListState};
use crate::ui::components::person_dialog::{DialogField, PersonDialog, PersonDialogState};
use crate::ui::components::results::Results;

const TICK_RATE: Duration = Duration::from_millis(120);

/// Primary entry point for running the interactive TUI.
pub struct UiApp {
    config: Config,
    keys: KeyMap,
    form: BillForm,
    people: PeopleListState,
    people_list: PeopleList,
    dialog: Option<PersonDialogState>,
    dialog_component: PersonDialog,
    results: Results,
    renderer: ReportRenderer,
    status: Option<StatusMessage>,
    focus: FocusTarget,
    should_quit: bool,
}

impl UiApp {
    /// Build the app state from loaded configuration.
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self {
            keys: KeyMap::from_config(&config.keybindings),
            form: BillForm::with_tax_rate(config.defaults.tax_rate()),
            people: PeopleListState::default(),
            people_list: PeopleList,
            dialog: None,
            dialog_component: PersonDialog,
            results: Results,
            renderer: ReportRenderer::new()?,
            status: None,
            focus: FocusTarget::People,
            should_quit: false,
            config,
        })
    }

    /// Launch the terminal UI and enter the event loop.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode().context("failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)
            .context("failed to enter alternate screen")?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to initialize terminal")?;
        terminal.hide_cursor().ok();

        let event_loop_result = self.event_loop(&mut terminal);

        disable_raw_mode().ok();
        let _ = execute!(
            terminal.backend_mut(),
            DisableBracketedPaste,
            LeaveAlternateScreen
        );
        let _ = terminal.show_cursor();

        event_loop_result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|frame| self.render(frame))?;
            self.tick();

            if self.should_quit {
                break;
            }

            if event::poll(TICK_RATE)? {
                let ev = event::read()?;
                self.handle_event(ev)?;
            }
        }
        Ok(())
    }

    fn render(&mut self, frame: &mut Frame<'_>) {
        let size = frame.size();
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(2)])
            .split(size);

        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(layout[0]);

        let left_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),
                Constraint::Length(3),
                Constraint::Length(4),
            ])
            .split(main_chunks[0]);

        self.people_list.render(
            frame,
            left_chunks[0],
            self.form.people(),
            &self.people,
            self.focus == FocusTarget::People,
        );
        self.render_tax_input(frame, left_chunks[1]);
        self.render_hints(frame, left_chunks[2]);

        self.results.render(
            frame,
            main_chunks[1],
            self.form.calculation(),
            !self.form.is_empty(),
            self.keys.calculate,
        );

        self.render_status(frame, layout[1]);

        if let Some(dialog) = &self.dialog {
            self.dialog_component.render(frame, size, dialog);
        }
    }

    fn render_tax_input(&self, frame: &mut Frame<'_>, area: Rect) {
        let focused = self.focus == FocusTarget::TaxInput;
        let border = if !self.form.tax_input_is_valid() {
            Color::Red
        } else if focused {
            Color::Cyan
        } else {
            Color::DarkGray
        };
        let block = Block::default()
            .title("Tax (percent)")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border));

        let mut text = self.form.tax_input().to_string();
        if focused {
            text.push('▏');
        }
        let line = if text.is_empty() {
            Line::styled("0", Style::default().fg(Color::DarkGray))
        } else {
            Line::raw(text)
        };
        frame.render_widget(Paragraph::new(line).block(block), area);
    }

    fn render_hints(&self, frame: &mut Frame<'_>, area: Rect) {
        let key = |label: String| Span::styled(label, Style::default().fg(Color::Cyan));
        let hints = Paragraph::new(Line::from(vec![
            key(self.keys.add.to_string()),
            Span::raw(" add · "),
            key(format!("{}/↵", self.keys.edit)),
            Span::raw(" edit · "),
            key("t".into()),
            Span::raw(" tax · "),
            key(self.keys.calculate.to_string()),
            Span::raw(" calculate · "),
            key(self.keys.copy.to_string()),
            Span::raw(" copy · "),
            key("x".into()),
            Span::raw(" export · "),
            key("q".into()),
            Span::raw(" quit"),
        ]))
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::Gray));
        frame.render_widget(hints, area);
    }

    fn render_status(&self, frame: &mut Frame<'_>, area: Rect) {
        let message = self.status.as_ref().map(|status| {
            let style = match status.level {
                StatusLevel::Info => Style::default().fg(Color::Gray),
                StatusLevel::Success => Style::default().fg(Color::Green),
                StatusLevel::Warning => Style::default().fg(Color::Yellow),
                StatusLevel::Error => Style::default().fg(Color::Red),
            };
            Line::styled(status.text.clone(), style)
        });

        let block = Block::default().borders(Borders::TOP);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let line = message.unwrap_or_else(|| {
            Line::styled(
                format!("Ready · press {} to add a person", self.keys.add),
                Style::default().fg(Color::DarkGray),
            )
        });
        frame.render_widget(Paragraph::new(line), inner);
    }

    fn tick(&mut self) {
        if let Some(status) = &self.status
            && status.is_expired()
        {
            self.status = None;
        }
    }

    fn handle_event(&mut self, event: Event) -> Result<()> {
        match event {
            Event::Key(key) => self.handle_key_event(key)?,
            Event::Resize(..) => {}
            Event::Mouse(_) => {}
            Event::FocusGained | Event::FocusLost => {}
            Event::Paste(text) => self.handle_paste(&text),
        }
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        if self.dialog.is_some() {
            self.handle_dialog_key(key);
            return Ok(());
        }

        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q'))
        {
            self.should_quit = true;
            return Ok(());
        }

        match self.focus {
            FocusTarget::People => self.handle_people_key(key),
            FocusTarget::TaxInput => {
                self.handle_tax_key(key);
                Ok(())
            }
        }
    }

    fn handle_people_key(&mut self, key: KeyEvent) -> Result<()> {
        if let KeyCode::Char(ch) = key.code {
            if ch == self.keys.add {
                self.open_new_dialog();
                return Ok(());
            }
            if ch == self.keys.edit {
                self.open_edit_dialog();
                return Ok(());
            }
            if ch == self.keys.calculate {
                self.calculate();
                return Ok(());
            }
            if ch == self.keys.copy {
                self.share_report(None, true);
                return Ok(());
            }
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Enter => self.open_edit_dialog(),
            KeyCode::Char('j') | KeyCode::Down => {
                self.people.select_next(self.form.len());
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.people.select_previous(self.form.len());
            }
            KeyCode::Char('t') | KeyCode::Tab => {
                self.focus = FocusTarget::TaxInput;
            }
            KeyCode::Char('x') => {
                let path = self.default_export_path()?;
                self.share_report(Some(path), false);
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_tax_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Tab | KeyCode::BackTab => {
                self.focus = FocusTarget::People;
            }
            KeyCode::Enter => {
                self.focus = FocusTarget::People;
                self.calculate();
            }
            KeyCode::Backspace => self.form.pop_tax_char(),
            KeyCode::Char(ch) => {
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                {
                    self.form.push_tax_char(ch);
                }
            }
            _ => {}
        }
    }

    fn handle_dialog_key(&mut self, key: KeyEvent) {
        let Some(dialog) = self.dialog.as_mut() else {
            return;
        };

        match key.code {
            KeyCode::Esc => {
                self.dialog = None;
            }
            KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.save_dialog();
            }
            KeyCode::Tab | KeyCode::BackTab => dialog.toggle_field(),
            KeyCode::Enter => match dialog.field() {
                DialogField::Name => dialog.focus(DialogField::BillLines),
                DialogField::BillLines => dialog.insert_newline(),
            },
            KeyCode::Backspace => dialog.pop_char(),
            KeyCode::Char(ch) => {
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                {
                    dialog.push_char(ch);
                }
            }
            _ => {}
        }
    }

    fn handle_paste(&mut self, text: &str) {
        if let Some(dialog) = self.dialog.as_mut() {
            let mut chars = text.chars().peekable();
            while let Some(ch) = chars.next() {
                match ch {
                    '\r' if chars.peek() == Some(&'\n') => {}
                    '\r' | '\n' => dialog.insert_newline(),
                    other => dialog.push_char(other),
                }
            }
        } else if self.focus == FocusTarget::TaxInput {
            self.form
                .set_tax_input(format!("{}{}", self.form.tax_input(), text.trim()));
        }
    }

    fn open_new_dialog(&mut self) {
        self.dialog = Some(PersonDialogState::new(self.form.new_draft()));
    }

    fn open_edit_dialog(&mut self) {
        let Some(index) = self.people.selected() else {
            return;
        };
        match self.form.edit_draft(index) {
            Ok(draft) => self.dialog = Some(PersonDialogState::new(draft)),
            Err(err) => tracing::debug!(error = %err, "edit ignored"),
        }
    }

    /// Upsert the open draft. On a failed presence check the dialog simply stays open.
    fn save_dialog(&mut self) {
        let Some(dialog) = self.dialog.as_ref() else {
            return;
        };
        match self.form.save(dialog.draft()) {
            Ok(saved) => {
                self.dialog = None;
                self.people.select(saved.index);
                let name = self
                    .form
                    .people()
                    .get(saved.index)
                    .map(|person| person.name.clone())
                    .unwrap_or_default();
                let verb = if saved.appended { "Added" } else { "Updated" };
                if saved.parsed.has_rejections() {
                    self.set_status(
                        StatusLevel::Warning,
                        format!("{verb} {name} · {}", describe_rejections(&saved.parsed)),
                    );
                } else {
                    self.set_status(StatusLevel::Success, format!("{verb} {name}"));
                }
            }
            Err(err) => tracing::debug!(error = %err, "save ignored"),
        }
    }

    fn calculate(&mut self) {
        let tax_valid = self.form.tax_input_is_valid();
        match self.form.calculate() {
            Some(result) => {
                let count = result.per_person.len();
                if tax_valid {
                    self.set_status(
                        StatusLevel::Success,
                        format!("Split calculated for {count} people"),
                    );
                } else {
                    self.set_status(StatusLevel::Warning, "Tax is not a number, using 0%");
                }
            }
            None => self.set_status(StatusLevel::Info, "No people added"),
        }
    }

    fn share_report(&mut self, target: Option<PathBuf>, copy: bool) {
        let Some(result) = self.form.calculation() else {
            self.set_status(StatusLevel::Error, "Calculate the split first");
            return;
        };

        let mut options = ReportOptions::from_config(&self.config);
        options.output_path = target;
        options.copy_to_clipboard = copy;

        match self.renderer.export(result, &options) {
            Ok(outcome) => {
                let text = match (outcome.output_path, outcome.copied_via) {
                    (Some(path), _) => format!("Report written to {}", path.display()),
                    (None, Some(via)) => format!("Report copied via {via}"),
                    (None, None) => "Report rendered".to_string(),
                };
                self.set_status(StatusLevel::Success, text);
            }
            Err(err) => {
                tracing::warn!(error = %err, "report export failed");
                self.set_status(StatusLevel::Error, format!("{err:#}"));
            }
        }
    }

    fn default_export_path(&self) -> Result<PathBuf> {
        let timestamp = OffsetDateTime::now_utc()
            .format(format_description!(
                "[year][month][day]-[hour][minute][second]"
            ))
            .map_err(|err| anyhow!("failed to format export timestamp: {err}"))?;
        let format = ReportOptions::from_config(&self.config).format;
        Ok(PathBuf::from(format!(
            "split-bill-{timestamp}.{}",
            format.extension()
        )))
    }

    fn set_status<S: Into<String>>(&mut self, level: StatusLevel, message: S) {
        self.status = Some(StatusMessage::new(level, message.into()));
    }
}

fn describe_rejections(parsed: &ParsedBill) -> String {
    let lines: Vec<String> = parsed
        .rejected
        .iter()
        .map(|line| format!("line {} '{}'", line.line_no, line.text))
        .collect();
    format!("counted as 0: {}", lines.join(", "))
}

/// Single-character bindings resolved from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct KeyMap {
    add: char,
    edit: char,
    calculate: char,
    copy: char,
}

impl KeyMap {
    fn from_config(bindings: &Keybindings) -> Self {
        Self {
            add: binding_char(&bindings.add, 'a'),
            edit: binding_char(&bindings.edit, 'e'),
            calculate: binding_char(&bindings.calculate, 'c'),
            copy: binding_char(&bindings.copy, 'y'),
        }
    }
}

fn binding_char(binding: &str, fallback: char) -> char {
    let mut chars = binding.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => ch,
        _ => {
            tracing::warn!(binding, fallback = %fallback, "only single-key bindings are supported");
            fallback
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FocusTarget {
    People,
    TaxInput,
}

#[derive(Debug)]
struct StatusMessage {
    level: StatusLevel,
    text: String,
    expires_at: Instant,
}

impl StatusMessage {
    fn new(level: StatusLevel, text: String) -> Self {
        Self {
            level,
            text,
            expires_at: Instant::now() + Duration::from_secs(4),
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusLevel {
    Info,
    Success,
    Warning,
    Error,
}
