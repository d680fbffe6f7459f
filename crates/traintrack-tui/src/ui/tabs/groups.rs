use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::app::{App, Focus};
use crate::ui::styles;
use crate::utils::format::fit;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    render_group_list(frame, app, chunks[0]);
    render_group_detail(frame, app, chunks[1]);
}

fn render_group_list(frame: &mut Frame, app: &App, area: Rect) {
    let groups = app.store.groups();

    let items: Vec<ListItem> = groups
        .iter()
        .enumerate()
        .map(|(i, group)| {
            let line = Line::from(vec![
                Span::styled("■ ", Style::default().fg(styles::group_color(&group.color))),
                Span::raw(fit(&group.name, 20)),
                Span::styled(group.display_member_count(), styles::muted_style()),
            ]);

            let style = if i == app.group_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            ListItem::new(line).style(style)
        })
        .collect();

    let focused = matches!(app.focus, Focus::List);
    let block = Block::default()
        .title(format!(" Groups ({}) ", groups.len()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    let mut state = ListState::default();
    if !groups.is_empty() {
        state.select(Some(app.group_selection));
    }

    frame.render_stateful_widget(List::new(items).block(block), area, &mut state);
}

fn render_group_detail(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::Detail);

    let (title, content) = match app.selected_group() {
        Some(group) => {
            let members = app.store.members_of(group);
            let slots = app.store.schedules_of(group);
            let mut lines = vec![
                Line::from(vec![
                    Span::styled("Color: ", styles::highlight_style()),
                    Span::styled(
                        group.color.as_str(),
                        Style::default().fg(styles::group_color(&group.color)),
                    ),
                ]),
                Line::from(""),
                Line::from(Span::styled(
                    format!("Training ({})", slots.len()),
                    styles::title_style(),
                )),
            ];

            for slot in &slots {
                lines.push(Line::from(format!(
                    "  {:<10} {:>5}  {}",
                    slot.day, slot.time, slot.duration
                )));
            }
            if slots.is_empty() {
                lines.push(Line::from(Span::styled(
                    "  No training scheduled",
                    styles::muted_style(),
                )));
            }

            lines.push(Line::from(""));
            // Server count next to the locally visible members
            lines.push(Line::from(Span::styled(
                format!("Members ({} listed, {} on record)", members.len(), group.count),
                styles::title_style(),
            )));

            for (i, athlete) in members.iter().enumerate() {
                let style = if i == app.member_selection && focused {
                    styles::selected_style()
                } else {
                    styles::list_item_style()
                };
                lines.push(Line::from(vec![
                    Span::styled(format!("  {}", fit(&athlete.name, 22)), style),
                    Span::styled(
                        format!(" {:<8}", athlete.status.label()),
                        styles::status_style(athlete.status),
                    ),
                    Span::styled(format!(" {}", athlete.attendance), styles::muted_style()),
                ]));
            }
            if members.is_empty() {
                lines.push(Line::from(Span::styled(
                    "  No athletes in this group",
                    styles::muted_style(),
                )));
            }

            (format!(" {} ", group.name), lines)
        }
        None => (
            " No Group Selected ".to_string(),
            vec![Line::from(Span::styled(
                "Select a group from the list",
                styles::muted_style(),
            ))],
        ),
    };

    let block = Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    frame.render_widget(Paragraph::new(content).block(block), area);
}
