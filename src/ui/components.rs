//! Shared UI components (status bar, notification toast, small dialogs).
//!
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use std::time::Instant;

use crate::app::keymap::KeyAction;
use crate::app::{AppState, CatalogStatus, InputMode, ModalState};
use crate::notify::Severity;

/// Render the bottom status bar with mode, query and catalog state.
pub fn render_status_bar(f: &mut Frame, area: Rect, app: &AppState) {
    let mode = match app.input_mode {
        InputMode::Normal => "NORMAL",
        InputMode::Search => "SEARCH",
        InputMode::Modal => "MODAL",
    };
    let catalog = match app.catalog_status {
        CatalogStatus::Loading => "loading",
        CatalogStatus::Ready => "ready",
        CatalogStatus::Failed => "failed (r: retry)",
    };
    let busy = if app.loading || app.action_loading {
        "  working..."
    } else {
        ""
    };
    let msg = format!(
        "mode: {mode}  page:{}/{}  users:{}  courses:{} [{catalog}]{busy}",
        app.query.page,
        app.total_pages,
        app.users.len(),
        app.courses.len(),
    );
    let p = Paragraph::new(msg)
        .style(Style::default().fg(app.theme.status_fg).bg(app.theme.status_bg));
    f.render_widget(p, area);
}

/// Draw the current notification, if any, in the top-right corner.
pub fn render_notification(f: &mut Frame, area: Rect, app: &AppState, now: Instant) {
    let Some(n) = app.notification.current(now) else {
        return;
    };
    let (icon, color) = match n.severity {
        Severity::Success => ("✔", app.theme.success),
        Severity::Error => ("✖", app.theme.error),
    };
    let text = format!("{} {}", icon, n.message);
    let width = (text.chars().count() as u16 + 4)
        .min(area.width.saturating_sub(2))
        .max(10);
    let top = if area.height > 3 { 1 } else { 0 };
    let rect = Rect {
        x: area.x + area.width.saturating_sub(width + 1),
        y: area.y + top,
        width,
        height: 3,
    }
    .intersection(area);
    if rect.is_empty() {
        return;
    }
    let p = Paragraph::new(text)
        .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

/// Compute a rectangle centered within `area` with a maximum size.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Yes/No prompt guarding an enrollment removal.
pub fn render_confirm_remove(f: &mut Frame, area: Rect, app: &AppState, state: &ModalState) {
    if let ModalState::ConfirmRemove { course_name, selected, .. } = state {
        let rect = centered_rect(54, 7, area);
        let yes = if *selected == 0 { "[Yes]" } else { " Yes " };
        let no = if *selected == 1 { "[No]" } else { " No  " };
        let body = format!(
            "Remove enrollment for \"{}\"?\n\n  {}    {}",
            course_name, yes, no
        );
        let p = Paragraph::new(body).wrap(Wrap { trim: false }).block(
            Block::default()
                .title("Confirm removal")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        );
        f.render_widget(Clear, rect);
        f.render_widget(p, rect);
    }
}

/// Help dialog listing the active keybindings.
pub fn render_help_modal(f: &mut Frame, area: Rect, app: &AppState) {
    let width = 64u16.min(area.width.saturating_sub(4)).max(40);
    let height = 22u16.min(area.height.saturating_sub(2)).max(10);
    let rect = centered_rect(width, height, area);

    let entries = [
        ("Search", KeyAction::StartSearch),
        ("New user", KeyAction::NewUser),
        ("Enroll focused user", KeyAction::Enroll),
        ("Remove enrollment", KeyAction::RemoveEnrollment),
        ("Enroll / remove", KeyAction::EnterAction),
        ("Switch pane", KeyAction::ToggleFocus),
        ("Move up", KeyAction::MoveUp),
        ("Move down", KeyAction::MoveDown),
        ("Previous page", KeyAction::PrevPage),
        ("Next page", KeyAction::NextPage),
        ("Reload", KeyAction::Refresh),
        ("Help", KeyAction::OpenHelp),
        ("Quit", KeyAction::Quit),
    ];
    let label_w = entries.iter().map(|(l, _)| l.len()).max().unwrap_or(0);

    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled(
            "Keybindings",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
    ];
    for (label, action) in entries {
        let keys = app.keymap.keys_for(action).join(", ");
        lines.push(Line::from(vec![
            Span::raw(format!("  {:>width$} │ ", label, width = label_w)),
            Span::styled(keys, Style::default().add_modifier(Modifier::ITALIC)),
        ]));
    }
    lines.push(Line::raw(""));
    lines.push(Line::raw(
        "In forms: Tab/Shift+Tab move, Enter confirms, Esc cancels.",
    ));

    let p = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title("Help")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}
