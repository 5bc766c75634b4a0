use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::Backend;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::app::keymap::KeyAction;
use crate::app::{
    ApiEvent, AppState, CatalogStatus, CreateField, Dispatcher, EnrollField, InputMode, ModalState,
    PendingAction, UsersFocus,
};
use crate::ui;

/// What the event loop should do after a key press.
#[derive(Debug, PartialEq)]
pub enum Flow {
    Continue(Vec<PendingAction>),
    Quit,
}

impl Flow {
    fn none() -> Self {
        Flow::Continue(Vec::new())
    }

    fn maybe(action: Option<PendingAction>) -> Self {
        Flow::Continue(action.into_iter().collect())
    }
}

pub fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut AppState,
    dispatcher: &Dispatcher,
    events: &mut UnboundedReceiver<ApiEvent>,
) -> Result<()> {
    dispatcher.dispatch_all(app.on_mount());

    loop {
        while let Ok(ev) = events.try_recv() {
            let follow_up = app.apply_event(ev, Instant::now());
            dispatcher.dispatch_all(follow_up);
        }
        app.notification.expire(Instant::now());

        terminal.draw(|f| {
            ui::render(f, app);
        })?;

        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            match handle_key(app, key, Instant::now()) {
                Flow::Quit => break,
                Flow::Continue(actions) => dispatcher.dispatch_all(actions),
            }
        }
    }

    tracing::info!("console closed");
    Ok(())
}

/// Route a key press according to the current input mode.
pub fn handle_key(app: &mut AppState, key: KeyEvent, now: Instant) -> Flow {
    match app.input_mode {
        InputMode::Normal => handle_normal_key(app, key, now),
        InputMode::Search => handle_search_key(app, key.code),
        InputMode::Modal => handle_modal_key(app, key, now),
    }
}

fn handle_normal_key(app: &mut AppState, key: KeyEvent, now: Instant) -> Flow {
    let Some(action) = app.keymap.resolve(&key) else {
        return Flow::none();
    };
    match action {
        KeyAction::Quit => Flow::Quit,
        KeyAction::StartSearch => {
            app.search_input = app.query.term.clone();
            app.input_mode = InputMode::Search;
            Flow::none()
        }
        KeyAction::NewUser => {
            app.open_create_user();
            Flow::none()
        }
        KeyAction::Enroll => {
            app.open_enroll(now);
            Flow::none()
        }
        KeyAction::RemoveEnrollment => {
            app.request_remove_enrollment();
            Flow::none()
        }
        KeyAction::EnterAction => {
            match app.users_focus {
                UsersFocus::Roster => app.open_enroll(now),
                UsersFocus::Enrollments => app.request_remove_enrollment(),
            }
            Flow::none()
        }
        KeyAction::ToggleFocus => {
            app.users_focus = match app.users_focus {
                UsersFocus::Roster => UsersFocus::Enrollments,
                UsersFocus::Enrollments => UsersFocus::Roster,
            };
            app.clamp_enrollment_index();
            Flow::none()
        }
        KeyAction::MoveUp => {
            match app.users_focus {
                UsersFocus::Roster => {
                    if app.selected_user_index > 0 {
                        app.selected_user_index -= 1;
                        app.selected_enrollment_index = 0;
                    }
                }
                UsersFocus::Enrollments => {
                    app.selected_enrollment_index = app.selected_enrollment_index.saturating_sub(1);
                }
            }
            Flow::none()
        }
        KeyAction::MoveDown => {
            match app.users_focus {
                UsersFocus::Roster => {
                    if app.selected_user_index + 1 < app.users.len() {
                        app.selected_user_index += 1;
                        app.selected_enrollment_index = 0;
                    }
                }
                UsersFocus::Enrollments => {
                    app.selected_enrollment_index += 1;
                    app.clamp_enrollment_index();
                }
            }
            Flow::none()
        }
        KeyAction::NextPage => Flow::maybe(app.next_page()),
        KeyAction::PrevPage => Flow::maybe(app.prev_page()),
        KeyAction::Refresh => {
            let mut actions = vec![app.reload_roster()];
            if app.catalog_status == CatalogStatus::Failed {
                actions.push(app.reload_catalog());
            }
            Flow::Continue(actions)
        }
        KeyAction::OpenHelp => {
            app.open_help();
            Flow::none()
        }
        KeyAction::Ignore => Flow::none(),
    }
}

/// Every edit of the search prompt is a new term, so each keystroke may refetch.
fn handle_search_key(app: &mut AppState, code: KeyCode) -> Flow {
    match code {
        KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
            Flow::none()
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.search_input.clear();
            Flow::maybe(app.set_search_term(""))
        }
        KeyCode::Backspace => {
            app.search_input.pop();
            let term = app.search_input.clone();
            Flow::maybe(app.set_search_term(&term))
        }
        KeyCode::Char(c) => {
            app.search_input.push(c);
            let term = app.search_input.clone();
            Flow::maybe(app.set_search_term(&term))
        }
        _ => Flow::none(),
    }
}

fn handle_modal_key(app: &mut AppState, key: KeyEvent, now: Instant) -> Flow {
    let Some(modal) = app.modal.clone() else {
        app.input_mode = InputMode::Normal;
        return Flow::none();
    };
    match modal {
        ModalState::CreateUser { field } => handle_create_key(app, field, key, now),
        ModalState::Enroll { field, highlighted } => {
            handle_enroll_key(app, field, highlighted, key, now)
        }
        ModalState::ConfirmRemove { selected, .. } => match key.code {
            KeyCode::Esc | KeyCode::Char('n') => Flow::maybe(app.confirm_remove(false)),
            KeyCode::Char('y') => Flow::maybe(app.confirm_remove(true)),
            KeyCode::Left | KeyCode::Right | KeyCode::Tab => {
                if let Some(ModalState::ConfirmRemove { selected, .. }) = &mut app.modal {
                    *selected = if *selected == 0 { 1 } else { 0 };
                }
                Flow::none()
            }
            KeyCode::Enter => Flow::maybe(app.confirm_remove(selected == 0)),
            _ => Flow::none(),
        },
        ModalState::Help => {
            if matches!(
                key.code,
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('?') | KeyCode::Char('q')
            ) {
                app.cancel_modal();
            }
            Flow::none()
        }
    }
}

fn handle_create_key(app: &mut AppState, field: CreateField, key: KeyEvent, now: Instant) -> Flow {
    let set_field = |app: &mut AppState, f: CreateField| {
        app.modal = Some(ModalState::CreateUser { field: f });
    };
    match key.code {
        KeyCode::Esc => app.cancel_modal(),
        KeyCode::Tab | KeyCode::Down => set_field(app, field.next()),
        KeyCode::BackTab | KeyCode::Up => set_field(app, field.prev()),
        KeyCode::Enter => {
            if field == CreateField::Submit || key.modifiers.contains(KeyModifiers::CONTROL) {
                return Flow::maybe(app.submit_create_user(now));
            }
            set_field(app, field.next());
        }
        KeyCode::Left | KeyCode::Right | KeyCode::Char(' ')
            if matches!(field, CreateField::Gender | CreateField::Category) =>
        {
            match field {
                CreateField::Gender => app.new_user.cycle_gender(),
                _ => app.new_user.selected_category = app.new_user.selected_category.cycle(),
            }
        }
        KeyCode::Backspace => {
            if let Some(text) = create_text_field(app, field) {
                text.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some(text) = create_text_field(app, field) {
                text.push(c);
            }
        }
        _ => {}
    }
    Flow::none()
}

fn create_text_field(app: &mut AppState, field: CreateField) -> Option<&mut String> {
    let d = &mut app.new_user;
    match field {
        CreateField::Name => Some(&mut d.name),
        CreateField::Email => Some(&mut d.email),
        CreateField::Phone => Some(&mut d.phone_number),
        CreateField::City => Some(&mut d.city),
        CreateField::Exam => Some(&mut d.selected_exam),
        CreateField::Gender | CreateField::Category | CreateField::Submit => None,
    }
}

fn handle_enroll_key(
    app: &mut AppState,
    field: EnrollField,
    highlighted: usize,
    key: KeyEvent,
    now: Instant,
) -> Flow {
    let total = app.eligible_courses().len();
    let set = |app: &mut AppState, field: EnrollField, highlighted: usize| {
        app.modal = Some(ModalState::Enroll { field, highlighted });
    };
    match (field, key.code) {
        (_, KeyCode::Esc) => app.cancel_modal(),
        (_, KeyCode::Tab) => set(app, field.next(), highlighted),
        (_, KeyCode::BackTab) => set(app, field.prev(), highlighted),
        (EnrollField::Course, KeyCode::Up | KeyCode::Char('k')) => {
            set(app, field, highlighted.saturating_sub(1));
        }
        (EnrollField::Course, KeyCode::Down | KeyCode::Char('j')) => {
            let next = if highlighted + 1 < total { highlighted + 1 } else { highlighted };
            set(app, field, next);
        }
        (EnrollField::Course, KeyCode::Char(' ')) => app.choose_course(highlighted),
        (EnrollField::Course, KeyCode::Enter) => {
            app.choose_course(highlighted);
            set(app, EnrollField::Validity, highlighted);
        }
        (EnrollField::Validity, KeyCode::Backspace) => {
            app.enroll_draft.validity_input.pop();
        }
        (EnrollField::Validity, KeyCode::Char(c)) => app.enroll_draft.validity_input.push(c),
        (EnrollField::Validity | EnrollField::Submit, KeyCode::Enter) => {
            return Flow::maybe(app.submit_enroll(now));
        }
        _ => {}
    }
    Flow::none()
}
