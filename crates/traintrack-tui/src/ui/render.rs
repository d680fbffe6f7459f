use chrono::Local;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use traintrack_core::store::LoadState;

use crate::app::{App, AppState, Tab};
use crate::form::FieldKind;

use super::styles;
use super::tabs::{athletes, groups, schedule};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Render overlays
    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame, app),
        AppState::EditingForm => render_form_overlay(frame, app),
        AppState::ConfirmingDelete => render_delete_overlay(frame, app),
        AppState::ConfirmingQuit => render_quit_overlay(frame),
        _ => {}
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  TrainTrack";
    let stats = app.store.stats();
    let stats_text = format!(
        "Total {}  |  Today {}  |  Avg {}%   [?] Help",
        stats.total, stats.today, stats.average
    );

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            (area.width as usize).saturating_sub(title.len() + stats_text.len() + 2),
        )),
        Span::styled(stats_text, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for (i, tab) in Tab::ALL.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        let label = format!("[{}] {}", i + 1, tab.title());
        if *tab == app.current_tab {
            spans.push(Span::styled(label, styles::tab_style(true)));
        } else {
            spans.push(Span::styled(label, styles::muted_style()));
        }
    }

    // Search query on the right while it filters the athlete list
    if app.state == AppState::Searching || !app.search_query.is_empty() {
        let cursor = if app.state == AppState::Searching { "▌" } else { "" };
        let search = format!("Search: {}{}", app.search_query, cursor);
        let used: usize = spans.iter().map(|s| s.content.chars().count()).sum();
        let padding = (area.width as usize).saturating_sub(used + search.chars().count() + 2);
        spans.push(Span::raw(" ".repeat(padding)));
        spans.push(Span::styled(search, styles::search_style()));
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.current_tab {
        Tab::Athletes => athletes::render(frame, app, area),
        Tab::Groups => groups::render(frame, app, area),
        Tab::Schedule => schedule::render(frame, app, area),
    }
}

fn status_text(app: &App) -> String {
    if let Some(ref msg) = app.status_message {
        return msg.clone();
    }
    let mut text = match app.store.load_state() {
        LoadState::Loaded { at } => {
            format!("Updated {}", at.with_timezone(&Local).format("%H:%M"))
        }
        LoadState::Loading => "Loading...".to_string(),
        LoadState::Failed(_) | LoadState::Idle => match app.cache_age {
            Some(ref age) if app.cache_stale => format!("Offline copy from {} (stale)", age),
            Some(ref age) => format!("Offline copy from {}", age),
            None => "No data yet".to_string(),
        },
    };

    let unsaved = app.store.ledger().failed_count();
    if unsaved > 0 {
        text.push_str(&format!(" | {} unsaved", unsaved));
    }
    text
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = match app.current_tab {
        Tab::Athletes => "[space] check in | [n]ew | [e]dit | [u]pdate | [q]uit",
        Tab::Groups => "[e]dit | [n]ew slot | [u]pdate | [q]uit",
        Tab::Schedule => "[n]ew | [d]elete | [u]pdate | [q]uit",
    };

    let left_text = format!(" {} ", status_text(app));
    let right_text = format!(" {} ", shortcuts);
    let left_style = if app
        .status_message
        .as_deref()
        .is_some_and(|m| m.starts_with("Action failed"))
    {
        styles::error_style()
    } else {
        styles::muted_style()
    };

    let width = area.width as usize;
    let padding_len = width
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.chars().count());
    let status_line = Line::from(vec![
        Span::styled(left_text, left_style),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn help_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style()),
        Span::styled(desc, styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame, app: &App) {
    let area = centered_rect_fixed(52, 26, frame.area());
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_text = vec![
        Line::from(Span::styled("  TrainTrack", styles::title_style())),
        Line::from(Span::styled(
            format!("  version {}  {}", version, app.store.remote().base_url()),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        help_line("1-3", "Switch tabs"),
        help_line("←/→", "Prev/next tab"),
        help_line("Tab", "Switch focus (list ↔ detail)"),
        help_line("↑/↓", "Navigate list"),
        help_line("Esc", "Clear search / go back"),
        Line::from(""),
        Line::from(Span::styled(" Actions", styles::highlight_style())),
        help_line("/", "Search athletes"),
        help_line("space, c", "Check athlete in / out"),
        help_line("n", "New athlete / schedule entry"),
        help_line("e", "Edit athlete / group"),
        help_line("d", "Delete schedule entry"),
        help_line("u", "Reload data from the server"),
        help_line("q", "Quit"),
        Line::from(""),
        Line::from(Span::styled(" Forms", styles::highlight_style())),
        help_line("Tab, ↑/↓", "Next / previous field"),
        help_line("←/→", "Change selection"),
        help_line("Enter", "Save"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

fn render_form_overlay(frame: &mut Frame, app: &App) {
    let Some(ref form) = app.form else {
        return;
    };

    let height = form.fields.len() as u16 + if form.error.is_some() { 8 } else { 6 };
    let area = centered_rect_fixed(56, height, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![Line::from("")];
    for (i, field) in form.fields.iter().enumerate() {
        let focused = i == form.focus;
        let value_style = if focused {
            styles::selected_style()
        } else {
            styles::list_item_style()
        };
        let value = match field.kind {
            FieldKind::Text => {
                let cursor = if focused { "▌" } else { "" };
                format!("{:<28}", format!("{}{}", field.value, cursor))
            }
            FieldKind::Choice(_) => format!("{:<28}", format!("◀ {} ▶", field.value)),
        };
        lines.push(Line::from(vec![
            Span::styled(format!("  {:>9}: [", field.label), styles::muted_style()),
            Span::styled(value, value_style),
            Span::styled("]", styles::muted_style()),
        ]));
    }

    if let Some(ref error) = form.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {}", error),
            styles::error_style(),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("  [Enter]", styles::help_key_style()),
        Span::styled(" save  ", styles::muted_style()),
        Span::styled("[Tab]", styles::help_key_style()),
        Span::styled(" next field  ", styles::muted_style()),
        Span::styled("[Esc]", styles::help_key_style()),
        Span::styled(" cancel", styles::muted_style()),
    ]));

    let block = Block::default()
        .title(format!(" {} ", form.title()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_delete_overlay(frame: &mut Frame, app: &App) {
    let area = centered_rect_fixed(46, 8, frame.area());
    frame.render_widget(Clear, area);

    let target = app
        .pending_delete
        .and_then(|id| app.store.schedule(id))
        .map(|s| format!("{} on {} at {}", s.group, s.day, s.time))
        .unwrap_or_else(|| "this entry".to_string());

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Delete schedule entry?",
            styles::highlight_style(),
        )),
        Line::from(Span::raw(format!("   {}", target))),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to delete, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 7, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use traintrack_core::cache::CacheManager;
    use traintrack_core::models::Schedule;
    use traintrack_core::store::Snapshot;
    use traintrack_core::{ApiClient, Config};

    fn offline_app(dir: &tempfile::TempDir) -> App {
        let api = ApiClient::new("http://127.0.0.1:9/api", None).unwrap();
        let cache = CacheManager::new(dir.path().to_path_buf()).unwrap();
        App::from_parts(Config::default(), api, cache)
    }

    #[test]
    fn test_status_text_marks_stale_cache() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = offline_app(&dir);
        assert_eq!(status_text(&app), "No data yet");

        app.cache_age = Some("2h ago".into());
        assert_eq!(status_text(&app), "Offline copy from 2h ago");
        app.cache_stale = true;
        assert_eq!(status_text(&app), "Offline copy from 2h ago (stale)");

        app.status_message = Some("Saved group Boxers".into());
        assert_eq!(status_text(&app), "Saved group Boxers");
    }

    #[tokio::test]
    async fn test_status_text_counts_failed_changes() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = offline_app(&dir);
        let snapshot = Snapshot {
            schedules: vec![Schedule {
                id: 7,
                group: "Boxers".into(),
                day: "Monday".into(),
                time: "18:00".into(),
                duration: "90 min".into(),
            }],
            ..Snapshot::default()
        };
        let ticket = app.store.begin_load();
        app.store.finish_load(ticket, Ok(snapshot)).unwrap();
        assert!(!status_text(&app).contains("unsaved"));

        // Nothing listens on the API port, so the request fails
        assert!(app.store.delete_schedule(7).await.is_err());
        assert!(status_text(&app).ends_with(" | 1 unsaved"));
        assert_eq!(app.store.schedules().len(), 1);
    }

    #[test]
    fn test_centered_rect_fixed() {
        let outer = Rect::new(0, 0, 100, 40);
        assert_eq!(centered_rect_fixed(46, 10, outer), Rect::new(27, 15, 46, 10));

        let small = Rect::new(0, 0, 20, 5);
        assert_eq!(centered_rect_fixed(46, 10, small), Rect::new(0, 0, 20, 5));
    }
}
