use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use traintrack_core::store::EntityKey;

use crate::app::{App, Focus};
use crate::ui::styles;
use crate::utils::format::fit;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    render_schedule_list(frame, app, chunks[0]);
    render_slot_detail(frame, app, chunks[1]);
}

fn render_schedule_list(frame: &mut Frame, app: &App, area: Rect) {
    let schedules = app.sorted_schedules();

    let mut previous_day: Option<&str> = None;
    let items: Vec<ListItem> = schedules
        .iter()
        .enumerate()
        .map(|(i, slot)| {
            // Print the day only on the first slot of each day
            let day = if previous_day == Some(slot.day.as_str()) {
                String::new()
            } else {
                slot.day.clone()
            };
            previous_day = Some(slot.day.as_str());

            let color = app
                .store
                .snapshot()
                .and_then(|s| s.group_named(&slot.group))
                .map(|g| styles::group_color(&g.color))
                .unwrap_or(styles::MUTED);

            let line = Line::from(vec![
                Span::styled(fit(&day, 11), styles::highlight_style()),
                Span::raw(format!("{:>5}  ", slot.time)),
                Span::styled(fit(&slot.group, 16), Style::default().fg(color)),
                Span::styled(slot.duration.clone(), styles::muted_style()),
            ]);

            let style = if i == app.schedule_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            ListItem::new(line).style(style)
        })
        .collect();

    let focused = matches!(app.focus, Focus::List);
    let block = Block::default()
        .title(format!(" Weekly Schedule ({}) ", schedules.len()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    let mut state = ListState::default();
    if !schedules.is_empty() {
        state.select(Some(app.schedule_selection));
    }

    frame.render_stateful_widget(List::new(items).block(block), area, &mut state);
}

fn render_slot_detail(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::Detail);

    let content = match app.selected_schedule() {
        Some(slot) => {
            let sync = app.store.sync_state(EntityKey::Schedule(slot.id));
            let group = app.store.snapshot().and_then(|s| s.group_named(&slot.group));
            let mut lines = vec![
                Line::from(vec![
                    Span::styled("Group:    ", styles::highlight_style()),
                    Span::raw(slot.group.as_str()),
                ]),
                Line::from(vec![
                    Span::styled("Day:      ", styles::highlight_style()),
                    Span::raw(slot.day.as_str()),
                ]),
                Line::from(vec![
                    Span::styled("Time:     ", styles::highlight_style()),
                    Span::raw(slot.time.as_str()),
                ]),
                Line::from(vec![
                    Span::styled("Duration: ", styles::highlight_style()),
                    Span::raw(slot.duration.as_str()),
                ]),
                Line::from(vec![
                    Span::styled("Sync:     ", styles::highlight_style()),
                    Span::styled(sync.label(), styles::sync_style(&sync)),
                ]),
                Line::from(""),
            ];
            match group {
                Some(group) => lines.push(Line::from(Span::styled(
                    group.display_member_count(),
                    styles::muted_style(),
                ))),
                None => lines.push(Line::from(Span::styled(
                    "Group not found",
                    styles::error_style(),
                ))),
            }
            lines
        }
        None => vec![Line::from(Span::styled(
            "No training scheduled. Press [n] to add an entry.",
            styles::muted_style(),
        ))],
    };

    let block = Block::default()
        .title(" Details ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    frame.render_widget(Paragraph::new(content).block(block), area);
}
