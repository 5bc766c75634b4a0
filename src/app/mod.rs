//! Console state and the operations that drive it.
//!
//! Operations never perform I/O. Anything that needs the backend is returned
//! as a [`PendingAction`] for the dispatcher to send, and responses come back
//! through [`AppState::apply_event`]. A validation failure therefore shows up
//! as "no action returned".
//!
pub mod dispatch;
pub mod keymap;
pub mod update;

use ratatui::style::Color;
use std::time::Instant;

use crate::api::ApiError;
use crate::enrollment;
use crate::model::{Course, EnrollDraft, EnrollRequest, NewUserDraft, User, UserPage};
use crate::notify::NotificationSlot;
use crate::search::SearchQuery;

pub use dispatch::{ApiEvent, Dispatcher};
use keymap::Keymap;

/// Which pane is focused on the main screen.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UsersFocus {
    Roster,
    Enrollments,
}

/// Current input mode for key handling.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    Modal,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CatalogStatus {
    Loading,
    Ready,
    Failed,
}

/// Color palette for theming the TUI.
#[derive(Clone, Copy, Debug)]
pub struct Theme {
    pub text: Color,
    pub muted: Color,
    pub title: Color,
    pub border: Color,
    pub header_bg: Color,
    pub header_fg: Color,
    pub status_bg: Color,
    pub status_fg: Color,
    pub highlight_fg: Color,
    pub highlight_bg: Color,
    pub success: Color,
    pub error: Color,
}

impl Theme {
    /// Catppuccin Mocha theme defaults.
    pub fn mocha() -> Self {
        // Palette reference: https://github.com/catppuccin/catppuccin
        Self {
            text: Color::Rgb(0xcd, 0xd6, 0xf4),         // text
            muted: Color::Rgb(0x7f, 0x84, 0x9c),        // overlay1
            title: Color::Rgb(0xcb, 0xa6, 0xf7),        // mauve
            border: Color::Rgb(0x58, 0x5b, 0x70),       // surface2
            header_bg: Color::Rgb(0x31, 0x32, 0x44),    // surface0
            header_fg: Color::Rgb(0xb4, 0xbe, 0xfe),    // lavender
            status_bg: Color::Rgb(0x45, 0x47, 0x5a),    // surface1
            status_fg: Color::Rgb(0xcd, 0xd6, 0xf4),    // text
            highlight_fg: Color::Rgb(0xf9, 0xe2, 0xaf), // yellow
            highlight_bg: Color::Rgb(0x45, 0x47, 0x5a), // surface1
            success: Color::Rgb(0xa6, 0xe3, 0xa1),      // green
            error: Color::Rgb(0xf3, 0x8b, 0xa8),        // red
        }
    }

    /// Load theme from a simple key=value file. Unknown or missing keys fall back to `mocha`.
    pub fn from_file(path: &str) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        let mut theme = Self::mocha();

        for raw_line in contents.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.splitn(2, '=');
            let key = parts.next().map(|s| s.trim()).unwrap_or("");
            let val = parts.next().map(|s| s.trim()).unwrap_or("");
            if key.is_empty() || val.is_empty() {
                continue;
            }
            if let Some(color) = Self::parse_color(val) {
                match key {
                    "text" => theme.text = color,
                    "muted" => theme.muted = color,
                    "title" => theme.title = color,
                    "border" => theme.border = color,
                    "header_bg" => theme.header_bg = color,
                    "header_fg" => theme.header_fg = color,
                    "status_bg" => theme.status_bg = color,
                    "status_fg" => theme.status_fg = color,
                    "highlight_fg" => theme.highlight_fg = color,
                    "highlight_bg" => theme.highlight_bg = color,
                    "success" => theme.success = color,
                    "error" => theme.error = color,
                    _ => {}
                }
            }
        }

        Some(theme)
    }

    /// Parse a color from hex ("#RRGGBB" or "RRGGBB") or "reset".
    fn parse_color(s: &str) -> Option<Color> {
        let lower = s.trim().to_ascii_lowercase();
        if lower == "reset" {
            return Some(Color::Reset);
        }
        let hex = lower.strip_prefix('#').unwrap_or(lower.as_str());
        if hex.len() == 6
            && let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            )
        {
            return Some(Color::Rgb(r, g, b));
        }
        None
    }

    /// Persist the theme to a config file in key=value format.
    pub fn write_file(&self, path: &str) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# roster-admin theme configuration\n");
        buf.push_str("# Colors: hex as #RRGGBB or RRGGBB, or 'reset'\n\n");

        fn color_to_str(c: Color) -> String {
            match c {
                Color::Rgb(r, g, b) => format!("#{:02X}{:02X}{:02X}", r, g, b),
                // Only mocha's RGB values and reset are ever written
                _ => "reset".to_string(),
            }
        }

        let mut kv = |k: &str, v: Color| {
            let _ = writeln!(&mut buf, "{} = {}", k, color_to_str(v));
        };

        kv("text", self.text);
        kv("muted", self.muted);
        kv("title", self.title);
        kv("border", self.border);
        kv("header_bg", self.header_bg);
        kv("header_fg", self.header_fg);
        kv("status_bg", self.status_bg);
        kv("status_fg", self.status_fg);
        kv("highlight_fg", self.highlight_fg);
        kv("highlight_bg", self.highlight_bg);
        kv("success", self.success);
        kv("error", self.error);

        std::fs::write(path, buf)
    }

    /// Load the theme from `path`, or write the default there and return it.
    pub fn load_or_init(path: &str) -> Self {
        if std::path::Path::new(path).exists() {
            return Self::from_file(path).unwrap_or_else(Self::mocha);
        }
        if let Some(existing) = crate::config::config_file_read_path("theme.conf") {
            return Self::from_file(&existing).unwrap_or_else(Self::mocha);
        }
        let t = Self::mocha();
        let _ = t.write_file(path);
        t
    }
}

/// Fields of the create-user form, in tab order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CreateField {
    Name,
    Email,
    Phone,
    Gender,
    City,
    Category,
    Exam,
    Submit,
}

impl CreateField {
    pub const ALL: [CreateField; 8] = [
        CreateField::Name,
        CreateField::Email,
        CreateField::Phone,
        CreateField::Gender,
        CreateField::City,
        CreateField::Category,
        CreateField::Exam,
        CreateField::Submit,
    ];

    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let i = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EnrollField {
    Course,
    Validity,
    Submit,
}

impl EnrollField {
    pub fn next(self) -> Self {
        match self {
            EnrollField::Course => EnrollField::Validity,
            EnrollField::Validity => EnrollField::Submit,
            EnrollField::Submit => EnrollField::Course,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            EnrollField::Course => EnrollField::Submit,
            EnrollField::Validity => EnrollField::Course,
            EnrollField::Submit => EnrollField::Validity,
        }
    }
}

/// Modal dialogs. Form drafts live on [`AppState`] so a cancelled create
/// form keeps its input for the next attempt.
#[derive(Clone, Debug, PartialEq)]
pub enum ModalState {
    CreateUser {
        field: CreateField,
    },
    Enroll {
        field: EnrollField,
        /// Highlighted row in the eligible-course list.
        highlighted: usize,
    },
    ConfirmRemove {
        user_id: String,
        course_id: String,
        course_name: String,
        /// 0 = Yes, 1 = No
        selected: usize,
    },
    Help,
}

/// Requests the console wants sent to the backend.
#[derive(Clone, Debug, PartialEq)]
pub enum PendingAction {
    LoadRoster { seq: u64, query: SearchQuery },
    LoadCatalog,
    CreateUser { draft: NewUserDraft },
    EnrollUser { request: EnrollRequest },
    RemoveEnrollment { user_id: String, course_id: String },
}

pub struct AppState {
    pub users: Vec<User>,
    pub total_pages: u32,
    pub query: SearchQuery,
    pub search_input: String,
    pub courses: Vec<Course>,
    pub catalog_status: CatalogStatus,
    pub selected_user_index: usize,
    pub selected_enrollment_index: usize,
    pub users_focus: UsersFocus,
    pub rows_per_page: usize,
    pub input_mode: InputMode,
    pub modal: Option<ModalState>,
    pub new_user: NewUserDraft,
    pub enroll_draft: EnrollDraft,
    /// User the enroll modal is bound to; set only while that modal is open.
    pub selected_user: Option<User>,
    pub notification: NotificationSlot,
    pub loading: bool,
    pub action_loading: bool,
    /// Sequence number of the most recently issued roster request.
    pub roster_seq: u64,
    pub theme: Theme,
    pub keymap: Keymap,
}

impl AppState {
    pub fn new(theme: Theme, keymap: Keymap) -> Self {
        Self {
            users: Vec::new(),
            total_pages: 1,
            query: SearchQuery::default(),
            search_input: String::new(),
            courses: Vec::new(),
            catalog_status: CatalogStatus::Loading,
            selected_user_index: 0,
            selected_enrollment_index: 0,
            users_focus: UsersFocus::Roster,
            rows_per_page: 10,
            input_mode: InputMode::Normal,
            modal: None,
            new_user: NewUserDraft::default(),
            enroll_draft: EnrollDraft::default(),
            selected_user: None,
            notification: NotificationSlot::default(),
            loading: false,
            action_loading: false,
            roster_seq: 0,
            theme,
            keymap,
        }
    }

    /// Build state with theme and keybindings read from (or written to) the config dir.
    pub fn from_config_files() -> Self {
        let theme_path = crate::config::config_file_write_path("theme.conf");
        let keys_path = crate::config::config_file_write_path("keybinds.conf");
        Self::new(Theme::load_or_init(&theme_path), Keymap::load_or_init(&keys_path))
    }

    /// Initial requests: first roster page and the course catalog.
    pub fn on_mount(&mut self) -> Vec<PendingAction> {
        vec![self.reload_roster(), self.reload_catalog()]
    }

    /// Request the roster for the current query. Supersedes any request in flight.
    pub fn reload_roster(&mut self) -> PendingAction {
        self.roster_seq += 1;
        self.loading = true;
        PendingAction::LoadRoster { seq: self.roster_seq, query: self.query.clone() }
    }

    pub fn reload_catalog(&mut self) -> PendingAction {
        self.catalog_status = CatalogStatus::Loading;
        PendingAction::LoadCatalog
    }

    /// Apply a new search term; a change resets to page 1 and refetches.
    pub fn set_search_term(&mut self, term: &str) -> Option<PendingAction> {
        if self.query.set_term(term) {
            self.selected_user_index = 0;
            Some(self.reload_roster())
        } else {
            None
        }
    }

    pub fn next_page(&mut self) -> Option<PendingAction> {
        if self.query.next_page(self.total_pages) {
            self.selected_user_index = 0;
            Some(self.reload_roster())
        } else {
            None
        }
    }

    pub fn prev_page(&mut self) -> Option<PendingAction> {
        if self.query.prev_page() {
            self.selected_user_index = 0;
            Some(self.reload_roster())
        } else {
            None
        }
    }

    pub fn focused_user(&self) -> Option<&User> {
        self.users.get(self.selected_user_index)
    }

    pub fn open_create_user(&mut self) {
        self.modal = Some(ModalState::CreateUser { field: CreateField::Name });
        self.input_mode = InputMode::Modal;
    }

    /// Validate the create form and, if it passes, request creation.
    pub fn submit_create_user(&mut self, now: Instant) -> Option<PendingAction> {
        if self.action_loading {
            return None;
        }
        if !self.new_user.has_name() {
            self.notification.error("Name is required", now);
            return None;
        }
        self.action_loading = true;
        Some(PendingAction::CreateUser { draft: self.new_user.clone() })
    }

    /// Open the enroll modal for the focused user with a fresh draft.
    ///
    /// Refused while the catalog is in a failed state; the operator has to
    /// reload it first.
    pub fn open_enroll(&mut self, now: Instant) {
        if self.catalog_status == CatalogStatus::Failed {
            self.notification.error("Course catalog unavailable. Press r to reload", now);
            return;
        }
        let Some(user) = self.focused_user().cloned() else {
            return;
        };
        self.selected_user = Some(user);
        self.enroll_draft = EnrollDraft::default();
        self.modal = Some(ModalState::Enroll { field: EnrollField::Course, highlighted: 0 });
        self.input_mode = InputMode::Modal;
    }

    /// Courses the enroll-modal user can still be enrolled into.
    pub fn eligible_courses(&self) -> Vec<&Course> {
        enrollment::eligible_courses(self.selected_user.as_ref(), &self.courses)
    }

    /// Mark the `index`-th eligible course as the one to enroll into.
    pub fn choose_course(&mut self, index: usize) {
        let chosen = self.eligible_courses().get(index).map(|c| c.id.clone());
        if chosen.is_some() {
            self.enroll_draft.course_id = chosen;
        }
    }

    pub fn submit_enroll(&mut self, now: Instant) -> Option<PendingAction> {
        if self.action_loading {
            return None;
        }
        let (Some(user), Some(course_id)) =
            (self.selected_user.as_ref(), self.enroll_draft.course_id.as_ref())
        else {
            self.notification.error("Please select a course", now);
            return None;
        };
        let request = EnrollRequest {
            user_id: user.id.clone(),
            course_id: course_id.clone(),
            validity_months: enrollment::parse_validity_months(&self.enroll_draft.validity_input),
        };
        self.action_loading = true;
        Some(PendingAction::EnrollUser { request })
    }

    /// Ask for confirmation before removing the highlighted active enrollment.
    pub fn request_remove_enrollment(&mut self) {
        let Some(user) = self.focused_user() else {
            return;
        };
        let Some(course) = user.active_enrollments().nth(self.selected_enrollment_index) else {
            return;
        };
        self.modal = Some(ModalState::ConfirmRemove {
            user_id: user.id.clone(),
            course_id: course.id().to_string(),
            course_name: course.name().unwrap_or("this course").to_string(),
            selected: 1,
        });
        self.input_mode = InputMode::Modal;
    }

    /// Resolve the removal prompt. Only an explicit confirmation produces a request.
    pub fn confirm_remove(&mut self, confirmed: bool) -> Option<PendingAction> {
        let Some(ModalState::ConfirmRemove { user_id, course_id, .. }) = self.modal.clone() else {
            return None;
        };
        self.close_modal();
        if !confirmed {
            return None;
        }
        Some(PendingAction::RemoveEnrollment { user_id, course_id })
    }

    pub fn open_help(&mut self) {
        self.modal = Some(ModalState::Help);
        self.input_mode = InputMode::Modal;
    }

    /// Dismiss whatever modal is open. The create draft survives; the enroll
    /// binding does not.
    pub fn cancel_modal(&mut self) {
        if matches!(self.modal, Some(ModalState::Enroll { .. })) {
            self.selected_user = None;
            self.enroll_draft = EnrollDraft::default();
        }
        self.close_modal();
    }

    fn close_modal(&mut self) {
        self.modal = None;
        self.input_mode = InputMode::Normal;
    }

    /// Fold a backend response into state; returns follow-up requests.
    pub fn apply_event(&mut self, event: ApiEvent, now: Instant) -> Vec<PendingAction> {
        match event {
            ApiEvent::RosterLoaded { seq, result } => {
                if seq != self.roster_seq {
                    tracing::debug!(
                        seq,
                        latest = self.roster_seq,
                        "dropping stale roster response"
                    );
                    return Vec::new();
                }
                self.loading = false;
                match result {
                    Ok(page) => self.replace_roster(page),
                    Err(e) => {
                        tracing::warn!(error = %e, "roster load failed");
                        self.notification.error("Failed to load users", now);
                    }
                }
                Vec::new()
            }
            ApiEvent::CatalogLoaded(result) => {
                match result {
                    Ok(courses) => {
                        tracing::info!(count = courses.len(), "course catalog loaded");
                        self.courses = courses;
                        self.catalog_status = CatalogStatus::Ready;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "course catalog load failed");
                        self.catalog_status = CatalogStatus::Failed;
                        self.notification.error("Failed to load courses", now);
                    }
                }
                Vec::new()
            }
            ApiEvent::UserCreated(result) => {
                self.action_loading = false;
                match result {
                    Ok(_) => {
                        self.notification.success("User created successfully!", now);
                        if matches!(self.modal, Some(ModalState::CreateUser { .. })) {
                            self.close_modal();
                        }
                        self.new_user = NewUserDraft::default();
                        vec![self.reload_roster()]
                    }
                    Err(e) => {
                        self.notification.error(e.message_or("Failed to create user"), now);
                        Vec::new()
                    }
                }
            }
            ApiEvent::UserEnrolled(result) => {
                self.action_loading = false;
                match result {
                    Ok(message) => {
                        let message = message
                            .filter(|m| !m.trim().is_empty())
                            .unwrap_or_else(|| "User enrolled successfully".to_string());
                        self.notification.success(message, now);
                        if matches!(self.modal, Some(ModalState::Enroll { .. })) {
                            self.close_modal();
                        }
                        self.enroll_draft = EnrollDraft::default();
                        self.selected_user = None;
                        vec![self.reload_roster()]
                    }
                    Err(e) => {
                        self.notification.error(e.message_or("Failed to enroll user"), now);
                        Vec::new()
                    }
                }
            }
            ApiEvent::EnrollmentRemoved(result) => match result {
                Ok(()) => {
                    self.notification.success("Enrollment removed", now);
                    vec![self.reload_roster()]
                }
                Err(e) => {
                    tracing::warn!(error = %e, "enrollment removal failed");
                    self.notification.error("Failed to remove enrollment", now);
                    Vec::new()
                }
            },
        }
    }

    fn replace_roster(&mut self, page: UserPage) {
        tracing::debug!(count = page.users.len(), total_pages = page.total_pages, "roster loaded");
        self.users = page.users;
        self.total_pages = page.total_pages.max(1);
        self.selected_user_index = self.selected_user_index.min(self.users.len().saturating_sub(1));
        self.clamp_enrollment_index();
    }

    /// Keep the enrollment cursor inside the focused user's active enrollments.
    pub fn clamp_enrollment_index(&mut self) {
        let count = self.focused_user().map(|u| u.active_enrollments().count()).unwrap_or(0);
        self.selected_enrollment_index =
            self.selected_enrollment_index.min(count.saturating_sub(1));
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Theme::mocha(), Keymap::default())
    }
}

/// Error type carried in responses; re-exported for callers matching on events.
pub type ApiResult<T> = Result<T, ApiError>;

/// Re-export the application event loop entry function.
pub use update::run_app as run;
