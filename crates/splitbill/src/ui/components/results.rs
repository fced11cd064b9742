//! Calculation results and grand totals.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};

use crate::app::currency::format_currency;
use crate::domain::model::{CalculationResult, PersonResult, Totals};

/// Shows the last submitted calculation. Nothing is rendered as totals until a submit happens.
#[derive(Debug, Default)]
pub struct Results;

impl Results {
    pub fn render(
        &self,
        frame: &mut Frame<'_>,
        area: Rect,
        calculation: Option<&CalculationResult>,
        has_people: bool,
        calculate_key: char,
    ) {
        let block = Block::default().title("Results").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        match calculation {
            Some(result) => self.render_result(frame, inner, result),
            None => {
                let text = if has_people {
                    format!("Press {calculate_key} to calculate")
                } else {
                    "No people added".to_string()
                };
                let placeholder = Paragraph::new(text)
                    .wrap(Wrap { trim: true })
                    .style(Style::default().fg(Color::DarkGray));
                frame.render_widget(placeholder, inner);
            }
        }
    }

    fn render_result(&self, frame: &mut Frame<'_>, area: Rect, result: &CalculationResult) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(2),
            ])
            .split(area);

        let header = Paragraph::new(Line::from(vec![
            Span::styled("Tax", Style::default().fg(Color::Gray)),
            Span::raw(format!(": {}%", result.tax_rate)),
        ]));
        frame.render_widget(header, layout[0]);

        let width = area.width as usize;
        let items: Vec<ListItem<'static>> = result
            .per_person
            .iter()
            .map(|person| person_item(person, width))
            .collect();
        frame.render_widget(List::new(items), layout[1]);

        let totals = Paragraph::new(total_lines(&result.totals, width));
        frame.render_widget(totals, layout[2]);
    }
}

fn person_item(person: &PersonResult, width: usize) -> ListItem<'static> {
    let subtotal = format_currency(person.bill_total);
    let with_tax = format!("With tax : {}", format_currency(person.bill_with_tax));
    ListItem::new(vec![
        Line::from(vec![
            Span::raw(person.name.clone()),
            Span::raw(padding(width, &person.name, &subtotal)),
            Span::raw(subtotal),
        ]),
        Line::from(vec![
            Span::raw(padding(width, "", &with_tax)),
            Span::styled(with_tax, Style::default().add_modifier(Modifier::BOLD)),
        ]),
    ])
}

fn total_lines(totals: &Totals, width: usize) -> Vec<Line<'static>> {
    let bill = format_currency(totals.bill);
    let with_tax = format_currency(totals.with_tax);
    let emphasis = Style::default().fg(Color::Green).add_modifier(Modifier::BOLD);
    vec![
        Line::from(vec![
            Span::raw("Total"),
            Span::raw(padding(width, "Total", &bill)),
            Span::styled(bill, emphasis),
        ]),
        Line::from(vec![
            Span::raw("Total with tax"),
            Span::raw(padding(width, "Total with tax", &with_tax)),
            Span::styled(with_tax, emphasis),
        ]),
    ]
}

fn padding(width: usize, left: &str, right: &str) -> String {
    let used = left.chars().count() + right.chars().count();
    " ".repeat(width.saturating_sub(used).max(1))
}
