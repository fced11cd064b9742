//! Add/edit dialog for a single person.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::app::bill_lines::parse_bill_lines;
use crate::app::currency::format_currency;
use crate::app::form::PersonDraft;

const CURSOR: &str = "▏";

/// Input field with keyboard focus inside the dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialogField {
    #[default]
    Name,
    BillLines,
}

/// Interactive state backing an open dialog. Dropping it discards the buffers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonDialogState {
    draft: PersonDraft,
    field: DialogField,
}

impl PersonDialogState {
    pub fn new(draft: PersonDraft) -> Self {
        Self {
            draft,
            field: DialogField::Name,
        }
    }

    pub fn draft(&self) -> &PersonDraft {
        &self.draft
    }

    pub fn field(&self) -> DialogField {
        self.field
    }

    pub fn is_editing(&self) -> bool {
        self.draft.target.is_editing()
    }

    /// Move focus to the other field.
    pub fn toggle_field(&mut self) {
        self.field = match self.field {
            DialogField::Name => DialogField::BillLines,
            DialogField::BillLines => DialogField::Name,
        };
    }

    pub fn focus(&mut self, field: DialogField) {
        self.field = field;
    }

    pub fn push_char(&mut self, ch: char) {
        self.active_buffer().push(ch);
    }

    pub fn pop_char(&mut self) {
        self.active_buffer().pop();
    }

    /// Start a new bill line. Ignored while the name field is active.
    pub fn insert_newline(&mut self) {
        if self.field == DialogField::BillLines {
            self.draft.bill_lines.push('\n');
        }
    }

    fn active_buffer(&mut self) -> &mut String {
        match self.field {
            DialogField::Name => &mut self.draft.name,
            DialogField::BillLines => &mut self.draft.bill_lines,
        }
    }
}

/// Visual component that renders the dialog overlay.
#[derive(Debug, Default)]
pub struct PersonDialog;

impl PersonDialog {
    pub fn render(&self, frame: &mut Frame<'_>, area: Rect, state: &PersonDialogState) {
        let width = area.width.saturating_sub(4).min(60);
        let height = area.height.saturating_sub(2).min(18);
        let popup = Rect {
            x: area.x + (area.width - width) / 2,
            y: area.y + (area.height - height) / 2,
            width,
            height,
        };

        frame.render_widget(Clear, popup);

        let title = if state.is_editing() {
            "Edit person"
        } else {
            "Add person"
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(popup);
        frame.render_widget(block, popup);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(inner);

        let draft = state.draft();
        let name_active = state.field() == DialogField::Name;
        let name = Paragraph::new(with_cursor(&draft.name, name_active))
            .block(field_block("Name".to_string(), name_active));
        frame.render_widget(name, layout[0]);

        let parsed = parse_bill_lines(&draft.bill_lines);
        let mut bill_title = format!("Bill lines · {}", format_currency(parsed.total));
        if parsed.has_rejections() {
            bill_title.push_str(&format!(" · {} ignored", parsed.rejected.len()));
        }
        let bills_active = !name_active;
        let bills = Paragraph::new(bill_lines_text(&draft.bill_lines, bills_active))
            .block(field_block(bill_title, bills_active));
        frame.render_widget(bills, layout[1]);

        let hints = Paragraph::new(Line::from(vec![
            Span::styled("tab", Style::default().fg(Color::Cyan)),
            Span::raw(" switch · "),
            Span::styled("ctrl+s", Style::default().fg(Color::Cyan)),
            Span::raw(" save · "),
            Span::styled("esc", Style::default().fg(Color::Cyan)),
            Span::raw(" close"),
        ]))
        .style(Style::default().fg(Color::Gray));
        frame.render_widget(hints, layout[2]);
    }
}

fn field_block(title: String, active: bool) -> Block<'static> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if active {
            Color::Yellow
        } else {
            Color::DarkGray
        }))
}

fn with_cursor(text: &str, active: bool) -> String {
    if active {
        format!("{text}{CURSOR}")
    } else {
        text.to_owned()
    }
}

fn bill_lines_text(text: &str, active: bool) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = text
        .split('\n')
        .map(|line| Line::raw(line.to_owned()))
        .collect();
    if active && let Some(last) = lines.last_mut() {
        last.spans.push(Span::raw(CURSOR));
    }
    lines
}
