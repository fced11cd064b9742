//! List of people added to the split.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};

use crate::app::currency::format_currency;
use crate::domain::model::Person;

/// Cursor over the people list.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PeopleListState {
    selected: Option<usize>,
}

impl PeopleListState {
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn select(&mut self, index: usize) {
        self.selected = Some(index);
    }

    /// Move down, stopping at the last entry.
    pub fn select_next(&mut self, len: usize) {
        if len == 0 {
            self.selected = None;
            return;
        }
        self.selected = Some(match self.selected {
            Some(idx) => (idx + 1).min(len - 1),
            None => 0,
        });
    }

    /// Move up, stopping at the first entry.
    pub fn select_previous(&mut self, len: usize) {
        if len == 0 {
            self.selected = None;
            return;
        }
        self.selected = Some(match self.selected {
            Some(idx) => idx.saturating_sub(1),
            None => 0,
        });
    }
}

/// Renders people with their formatted subtotal.
#[derive(Debug, Default)]
pub struct PeopleList;

impl PeopleList {
    pub fn render(
        &self,
        frame: &mut Frame<'_>,
        area: Rect,
        people: &[Person],
        state: &PeopleListState,
        focused: bool,
    ) {
        let block = Block::default()
            .title(format!("People ({})", people.len()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(if focused {
                Color::Cyan
            } else {
                Color::DarkGray
            }));

        if people.is_empty() {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            let placeholder = Paragraph::new("No people added")
                .style(Style::default().fg(Color::Yellow))
                .wrap(Wrap { trim: true });
            frame.render_widget(placeholder, inner);
            return;
        }

        let row_width = block.inner(area).width.saturating_sub(2) as usize;
        let items: Vec<ListItem<'static>> = people
            .iter()
            .map(|person| person_row(person, row_width))
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut list_state = ListState::default().with_selected(state.selected());
        frame.render_stateful_widget(list, area, &mut list_state);
    }
}

fn person_row(person: &Person, width: usize) -> ListItem<'static> {
    let amount = format_currency(person.bill_total);
    let used = person.name.chars().count() + amount.chars().count();
    let gap = width.saturating_sub(used).max(1);
    ListItem::new(Line::from(vec![
        Span::raw(person.name.clone()),
        Span::raw(" ".repeat(gap)),
        Span::styled(amount, Style::default().add_modifier(Modifier::BOLD)),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;

    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn rendered_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn selection_is_clamped_to_list() {
        let mut state = PeopleListState::default();
        state.select_previous(3);
        assert_eq!(state.selected(), Some(0));
        state.select_next(3);
        state.select_next(3);
        state.select_next(3);
        assert_eq!(state.selected(), Some(2));
        state.select_next(0);
        assert_eq!(state.selected(), None);
    }

    #[test]
    fn renders_placeholder_when_empty() {
        let mut terminal = Terminal::new(TestBackend::new(30, 4)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.size();
                PeopleList.render(frame, area, &[], &PeopleListState::default(), true);
            })
            .unwrap();
        assert!(rendered_text(&terminal).contains("No people added"));
    }

    #[test]
    fn renders_people_with_subtotals() {
        let people = vec![Person {
            name: "Alice".into(),
            bill_lines: "1000\n234.5".into(),
            bill_total: 1234.5,
        }];
        let mut state = PeopleListState::default();
        state.select(0);

        let mut terminal = Terminal::new(TestBackend::new(40, 4)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.size();
                PeopleList.render(frame, area, &people, &state, false);
            })
            .unwrap();

        let text = rendered_text(&terminal);
        assert!(text.contains("Alice"));
        assert!(text.contains("1,234.50"));
    }
}
