use ratatui::style::{Color, Modifier, Style};
use traintrack_core::models::AthleteStatus;
use traintrack_core::store::SyncState;

// Color palette
pub const PRIMARY: Color = Color::Rgb(64, 128, 192);
pub const SECONDARY: Color = Color::Rgb(96, 160, 96);
pub const ACCENT: Color = Color::Rgb(192, 160, 64);
pub const ERROR: Color = Color::Rgb(192, 64, 64);
pub const MUTED: Color = Color::Rgb(128, 128, 128);
pub const HIGHLIGHT: Color = Color::Rgb(48, 48, 64);

// Styles
pub fn title_style() -> Style {
    Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)
}

pub fn selected_style() -> Style {
    Style::default().bg(HIGHLIGHT).add_modifier(Modifier::BOLD)
}

pub fn list_item_style() -> Style {
    Style::default().fg(Color::White)
}

pub fn muted_style() -> Style {
    Style::default().fg(MUTED)
}

pub fn highlight_style() -> Style {
    Style::default().fg(ACCENT)
}

pub fn success_style() -> Style {
    Style::default().fg(SECONDARY)
}

pub fn error_style() -> Style {
    Style::default().fg(ERROR)
}

pub fn tab_style(selected: bool) -> Style {
    if selected {
        Style::default()
            .fg(PRIMARY)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    } else {
        Style::default().fg(Color::White)
    }
}

pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(PRIMARY)
    } else {
        Style::default().fg(MUTED)
    }
}

pub fn search_style() -> Style {
    Style::default().fg(ACCENT)
}

pub fn status_bar_style() -> Style {
    Style::default().bg(Color::Rgb(32, 32, 40)).fg(Color::White)
}

pub fn help_key_style() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

pub fn help_desc_style() -> Style {
    Style::default().fg(Color::White)
}

/// Map a group color tag (`bg-primary`, ...) onto the palette.
pub fn group_color(tag: &str) -> Color {
    match tag.trim_start_matches("bg-") {
        "primary" => PRIMARY,
        "secondary" => SECONDARY,
        "accent" => ACCENT,
        "error" | "danger" => ERROR,
        _ => MUTED,
    }
}

pub fn status_style(status: AthleteStatus) -> Style {
    match status {
        AthleteStatus::Active => success_style(),
        AthleteStatus::Injured => error_style(),
        AthleteStatus::Rest => highlight_style(),
    }
}

pub fn sync_style(state: &SyncState) -> Style {
    match state {
        SyncState::Clean => muted_style(),
        SyncState::Pending => highlight_style(),
        SyncState::Reconciled => success_style(),
        SyncState::Failed(_) => error_style(),
    }
}
