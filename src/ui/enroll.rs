use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph};

use crate::app::{AppState, CatalogStatus, EnrollField};

/// Enroll dialog: eligible courses for the bound user, validity and submit.
pub fn render_enroll_modal(
    f: &mut Frame,
    area: Rect,
    app: &AppState,
    field: EnrollField,
    highlighted: usize,
) {
    let width = area.width.saturating_sub(10).clamp(40, 70);
    let height = area.height.saturating_sub(6).clamp(10, 22);
    let rect = crate::ui::components::centered_rect(width, height, area);
    let who = app
        .selected_user
        .as_ref()
        .map(|u| u.display_name().to_string())
        .unwrap_or_default();

    let block = Block::default()
        .title(format!("Enroll {}", who))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border));
    let inner = block.inner(rect);
    f.render_widget(Clear, rect);
    f.render_widget(block, rect);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(4)])
        .split(inner);

    let eligible = app.eligible_courses();
    let chosen = app.enroll_draft.course_id.as_deref();
    let visible = parts[0].height.saturating_sub(2) as usize;
    let offset = if visible > 0 && highlighted >= visible { highlighted + 1 - visible } else { 0 };
    let items: Vec<ListItem> = if eligible.is_empty() {
        let msg = match app.catalog_status {
            CatalogStatus::Loading => "Loading courses...",
            _ => "No courses available for this user",
        };
        vec![ListItem::new(Line::styled(msg, Style::default().fg(app.theme.muted)))]
    } else {
        eligible
            .iter()
            .enumerate()
            .skip(offset)
            .take(visible.max(1))
            .map(|(i, c)| {
                let marker = if i == highlighted && field == EnrollField::Course {
                    "▶"
                } else {
                    " "
                };
                let check = if chosen == Some(c.id.as_str()) { "(x)" } else { "( )" };
                let price = c.price.map(|p| format!("  ₹{}", p)).unwrap_or_default();
                let item = ListItem::new(format!("{} {} {}{}", marker, check, c.name, price));
                if chosen == Some(c.id.as_str()) {
                    item.style(
                        Style::default()
                            .fg(app.theme.highlight_fg)
                            .add_modifier(Modifier::BOLD),
                    )
                } else {
                    item
                }
            })
            .collect()
    };
    let course_title = if field == EnrollField::Course {
        "▶ Select Course *"
    } else {
        "  Select Course *"
    };
    let list = List::new(items).block(
        Block::default()
            .title(course_title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(list, parts[0]);

    let mark = |which: EnrollField| if which == field { "▶" } else { " " };
    let submit = if app.action_loading { "[Enrolling...]" } else { "[Enroll User]" };
    let lines = vec![
        Line::raw(format!(
            "{} Validity (Months): {}",
            mark(EnrollField::Validity),
            app.enroll_draft.validity_input
        )),
        Line::raw(format!("{} {}", mark(EnrollField::Submit), submit)),
        Line::styled(
            "Space/Enter: choose course  Tab: next  Esc: cancel",
            Style::default().fg(app.theme.muted),
        ),
    ];
    f.render_widget(Paragraph::new(lines), parts[1]);
}
