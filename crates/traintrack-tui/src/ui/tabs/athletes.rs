use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use traintrack_core::models::Athlete;
use traintrack_core::store::EntityKey;

use crate::app::{App, Focus};
use crate::ui::styles;
use crate::utils::format::{attendance_bar, fit};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_athlete_list(frame, app, chunks[0]);
    render_athlete_detail(frame, app, chunks[1]);
}

fn render_athlete_list(frame: &mut Frame, app: &App, area: Rect) {
    let athletes = app.visible_athletes();
    let today = app.store.today_label();

    let items: Vec<ListItem> = athletes
        .iter()
        .enumerate()
        .map(|(i, athlete)| {
            let mark = if athlete.checked { "[x]" } else { "[ ]" };
            let visit_style = if athlete.visited_today(today) {
                styles::success_style()
            } else {
                styles::muted_style()
            };

            let line = Line::from(vec![
                Span::styled(format!("{} ", mark), styles::highlight_style()),
                Span::raw(fit(&athlete.name, 22)),
                Span::styled(fit(&athlete.group, 12), styles::muted_style()),
                Span::raw(format!("{:>5} ", athlete.attendance.to_string())),
                Span::styled(athlete.last_visit.clone(), visit_style),
            ]);

            let style = if i == app.athlete_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            ListItem::new(line).style(style)
        })
        .collect();

    let title = if app.search_query.is_empty() {
        format!(" Athletes ({}) ", athletes.len())
    } else {
        format!(
            " Athletes ({} of {}) ",
            athletes.len(),
            app.store.athletes().len()
        )
    };

    let focused = matches!(app.focus, Focus::List);
    let block = Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    let mut state = ListState::default();
    if !athletes.is_empty() {
        state.select(Some(app.athlete_selection));
    }

    frame.render_stateful_widget(List::new(items).block(block), area, &mut state);
}

fn detail_lines<'a>(app: &App, athlete: &'a Athlete) -> Vec<Line<'a>> {
    let sync = app.store.sync_state(EntityKey::Athlete(athlete.id));
    let label = |text: &'static str| Span::styled(format!("{:<12}", text), styles::highlight_style());

    let mut lines = vec![
        Line::from(vec![
            Span::styled(format!(" {} ", athlete.initials()), styles::title_style()),
            Span::raw(athlete.name.as_str()),
        ]),
        Line::from(""),
        Line::from(vec![label("Group"), Span::raw(athlete.group.as_str())]),
        Line::from(vec![
            label("Status"),
            Span::styled(athlete.status.label(), styles::status_style(athlete.status)),
        ]),
        Line::from(vec![
            label("Attendance"),
            Span::raw(format!(
                "{} {}",
                attendance_bar(athlete.attendance.percent(), 20),
                athlete.attendance
            )),
        ]),
        Line::from(vec![label("Last visit"), Span::raw(athlete.last_visit.as_str())]),
        Line::from(vec![
            label("Check-in"),
            if athlete.checked {
                Span::styled("checked in", styles::success_style())
            } else {
                Span::styled("not checked in", styles::muted_style())
            },
        ]),
        Line::from(vec![
            label("Sync"),
            Span::styled(sync.label(), styles::sync_style(&sync)),
        ]),
    ];

    let group_known = app
        .store
        .snapshot()
        .is_some_and(|s| s.has_group(&athlete.group));
    if !group_known {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Group \"{}\" no longer exists", athlete.group),
            styles::error_style(),
        )));
    }
    lines
}

fn render_athlete_detail(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::Detail);

    let (title, content) = match app.selected_athlete() {
        Some(athlete) => (format!(" #{} ", athlete.id), detail_lines(app, athlete)),
        None => (
            " No Athlete Selected ".to_string(),
            vec![Line::from(Span::styled(
                "Select an athlete from the list",
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
