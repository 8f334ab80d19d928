use ratatui::style::{Color, Modifier, Style};

pub(crate) const BASE_STYLE: Style = Style::new().fg(Color::White).bg(Color::Black);

pub(crate) const MONTH_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);

pub(crate) const WEEKDAY_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);

/// Days of the neighbouring months
pub(crate) const ADJACENT_STYLE: Style = BASE_STYLE.fg(Color::Gray);

/// Days outside the enabled range
pub(crate) const DISABLED_STYLE: Style = BASE_STYLE.fg(Color::DarkGray);

pub(crate) const TODAY_STYLE: Style = Style::new().add_modifier(Modifier::BOLD);

// Selection styles are patched over the day styles
pub(crate) const SELECTION_STYLE: Style = Style::new().fg(Color::Black).bg(Color::LightCyan);

pub(crate) const FADING_SELECTION_STYLE: Style = Style::new().bg(Color::Blue);

pub(crate) const HOVER_STYLE: Style = Style::new().bg(Color::DarkGray);

pub(crate) const STATUS_STYLE: Style = BASE_STYLE.add_modifier(Modifier::ITALIC);

pub(crate) mod jumpto {
    use super::*;

    pub(crate) const UNFILLED_CELL_STYLE: Style = BASE_STYLE.fg(Color::DarkGray);

    pub(crate) const READY_ENTER_STYLE: Style = BASE_STYLE.add_modifier(Modifier::UNDERLINED);
}
