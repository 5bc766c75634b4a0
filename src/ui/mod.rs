pub mod components;
pub mod enroll;
pub mod users;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Paragraph};
use std::time::Instant;

use crate::app::{AppState, InputMode, ModalState};

pub fn render(f: &mut Frame, app: &mut AppState) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f.area());
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(root[1]);
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(10), Constraint::Min(4)])
        .split(body[1]);

    render_header(f, root[0], app);

    users::render_users_table(f, body[0], app);
    users::render_user_details(f, right[0], app);
    users::render_user_enrollments(f, right[1], app);
    users::render_pagination(f, root[2], app);
    components::render_status_bar(f, root[3], app);

    if app.modal.is_some() {
        render_modal(f, f.area(), app);
    }

    components::render_notification(f, f.area(), app, Instant::now());
}

fn render_header(f: &mut Frame, area: Rect, app: &AppState) {
    let search = match app.input_mode {
        InputMode::Search => format!("Search by name, email or phone: {}_", app.search_input),
        _ if app.query.term.is_empty() => {
            "/: search  n: new user  e: enroll  ?: help  q: quit".to_string()
        }
        _ => format!("Search: \"{}\"  (/ to edit, Esc in search to clear)", app.query.term),
    };
    let p = Paragraph::new(search)
        .block(
            Block::default()
                .title("User Management: create users and manage course enrollments")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .style(Style::default().fg(app.theme.header_fg).bg(app.theme.header_bg));
    f.render_widget(p, area);
}

fn render_modal(f: &mut Frame, area: Rect, app: &mut AppState) {
    if let Some(state) = app.modal.clone() {
        match state {
            ModalState::CreateUser { field } => {
                users::render_create_user_modal(f, area, app, field)
            }
            ModalState::Enroll { field, highlighted } => {
                enroll::render_enroll_modal(f, area, app, field, highlighted)
            }
            ModalState::ConfirmRemove { .. } => {
                components::render_confirm_remove(f, area, app, &state)
            }
            ModalState::Help => components::render_help_modal(f, area, app),
        }
    }
}
