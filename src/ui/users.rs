use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, List, ListItem, Paragraph, Row, Table};

use crate::app::{AppState, CreateField, UsersFocus};
use crate::model::{User, non_blank};
use crate::search::page_label;

fn or_dash(s: Option<&str>) -> String {
    non_blank(s).unwrap_or("—").to_string()
}

/// Names of the user's active enrollments; bare ids show as "Course".
fn enrolled_names(user: &User) -> Vec<String> {
    user.active_enrollments()
        .map(|c| c.name().unwrap_or("Course").to_string())
        .collect()
}

fn pane_border(app: &AppState, focused: bool) -> ratatui::style::Color {
    if focused {
        app.theme.title
    } else {
        app.theme.border
    }
}

pub fn render_users_table(f: &mut Frame, area: Rect, app: &mut AppState) {
    let focused = app.users_focus == UsersFocus::Roster;
    let block = Block::default()
        .title(format!("Users ({})", app.users.len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(pane_border(app, focused)));

    let placeholder = if app.loading {
        Some("Loading users...")
    } else if app.users.is_empty() {
        Some("No users found")
    } else {
        None
    };
    if let Some(text) = placeholder {
        let p = Paragraph::new(text)
            .style(Style::default().fg(app.theme.muted))
            .block(block);
        f.render_widget(p, area);
        return;
    }

    let body_height = area.height.saturating_sub(3) as usize;
    if body_height > 0 {
        app.rows_per_page = body_height;
    }
    let start = (app.selected_user_index / app.rows_per_page) * app.rows_per_page;
    let end = (start + app.rows_per_page).min(app.users.len());

    let rows = app.users[start..end].iter().enumerate().map(|(i, u)| {
        let style = if start + i == app.selected_user_index {
            Style::default()
                .fg(app.theme.highlight_fg)
                .bg(app.theme.highlight_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text)
        };
        let courses = enrolled_names(u);
        Row::new(vec![
            Cell::from(u.display_name().to_string()),
            Cell::from(or_dash(u.email.as_deref())),
            Cell::from(or_dash(u.phone_number.as_deref())),
            Cell::from(u.selected_category.map(|c| c.label()).unwrap_or("—")),
            Cell::from(if courses.is_empty() {
                "—".to_string()
            } else {
                courses.join(", ")
            }),
        ])
        .style(style)
    });

    let widths = [
        Constraint::Percentage(20),
        Constraint::Percentage(26),
        Constraint::Length(13),
        Constraint::Length(8),
        Constraint::Percentage(40),
    ];
    let header = Row::new(vec!["Name", "Email", "Phone", "Category", "Enrolled Courses"])
        .style(Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD));

    let table = Table::new(rows, widths).header(header).block(block).column_spacing(1);
    f.render_widget(table, area);
}

pub fn render_user_details(f: &mut Frame, area: Rect, app: &AppState) {
    let text = match app.focused_user() {
        Some(u) => format!(
            "Name: {}\nEmail: {}\nPhone: {}\nGender: {}\nCity: {}\n\
             Category: {}\nTarget exam: {}\nId: {}",
            u.display_name(),
            or_dash(u.email.as_deref()),
            or_dash(u.phone_number.as_deref()),
            or_dash(u.gender.as_deref()),
            or_dash(u.city.as_deref()),
            u.selected_category.map(|c| c.label()).unwrap_or("—"),
            or_dash(u.selected_exam.as_deref()),
            u.id,
        ),
        None => String::new(),
    };
    let p = Paragraph::new(text).style(Style::default().fg(app.theme.text)).block(
        Block::default()
            .title("Details")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(p, area);
}

pub fn render_user_enrollments(f: &mut Frame, area: Rect, app: &AppState) {
    let focused = app.users_focus == UsersFocus::Enrollments;
    let names = app.focused_user().map(enrolled_names).unwrap_or_default();
    let items: Vec<ListItem> = if names.is_empty() {
        vec![ListItem::new(Span::styled(
            "No active enrollments",
            Style::default().fg(app.theme.muted),
        ))]
    } else {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                if focused && i == app.selected_enrollment_index {
                    ListItem::new(format!("▶ {}", name)).style(
                        Style::default().fg(app.theme.highlight_fg).add_modifier(Modifier::BOLD),
                    )
                } else {
                    ListItem::new(format!("  {}", name))
                }
            })
            .collect()
    };
    let title = if focused { "Enrollments (Del: remove)" } else { "Enrollments" };
    let list = List::new(items).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(pane_border(app, focused))),
    );
    f.render_widget(list, area);
}

/// Pagination controls, shown only when there is more than one page.
pub fn render_pagination(f: &mut Frame, area: Rect, app: &AppState) {
    if app.total_pages <= 1 {
        return;
    }
    let enabled = Style::default().fg(app.theme.text);
    let disabled = Style::default().fg(app.theme.muted);
    let prev = if app.query.page > 1 { enabled } else { disabled };
    let next = if app.query.page < app.total_pages {
        enabled
    } else {
        disabled
    };
    let label = page_label(app.query.page, app.total_pages);
    let line = Line::from(vec![
        Span::styled("◀ Prev  ", prev),
        Span::styled(label, Style::default().fg(app.theme.title)),
        Span::styled("  Next ▶", next),
    ]);
    f.render_widget(Paragraph::new(line).centered(), area);
}

pub fn render_create_user_modal(f: &mut Frame, area: Rect, app: &AppState, field: CreateField) {
    let rect = crate::ui::components::centered_rect(60, 14, area);
    let d = &app.new_user;
    let gender = if d.gender.is_empty() {
        "Select Gender"
    } else {
        d.gender.as_str()
    };
    let submit = if app.action_loading {
        "[Creating...]"
    } else {
        "[Create User]"
    };
    let rows: [(CreateField, &str, String); 8] = [
        (CreateField::Name, "Name *", d.name.clone()),
        (CreateField::Email, "Email", d.email.clone()),
        (CreateField::Phone, "Phone Number", d.phone_number.clone()),
        (CreateField::Gender, "Gender", format!("< {} >", gender)),
        (CreateField::City, "City", d.city.clone()),
        (CreateField::Category, "Category", format!("< {} >", d.selected_category.label())),
        (CreateField::Exam, "Target Exam", d.selected_exam.clone()),
        (CreateField::Submit, "", submit.to_string()),
    ];
    let mut lines: Vec<Line> = rows
        .into_iter()
        .map(|(which, label, value)| {
            let marker = if which == field { "▶" } else { " " };
            let text = if label.is_empty() {
                format!("{} {}", marker, value)
            } else {
                format!("{} {:<13} {}", marker, label, value)
            };
            if which == field {
                Line::styled(text, Style::default().fg(app.theme.highlight_fg))
            } else {
                Line::raw(text)
            }
        })
        .collect();
    lines.push(Line::raw(""));
    lines.push(Line::styled(
        "* Name and at least one of email or phone is required",
        Style::default().fg(app.theme.muted),
    ));
    lines.push(Line::styled(
        "Tab: next field  Space: cycle choice  Esc: cancel",
        Style::default().fg(app.theme.muted),
    ));
    let p = Paragraph::new(lines).block(
        Block::default()
            .title("Create New User")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}
