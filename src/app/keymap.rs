//! Keybinding configuration: parse `keybinds.conf`, provide defaults, and map keys to actions.
//!
//! Only the main screen goes through the keymap. Modal dialogs and the search
//! prompt use fixed keys (Esc, Enter, Tab, typing) handled in `update`.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

/// Semantic keyboard actions available on the main screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyAction {
    Quit,
    /// Focus the search prompt.
    StartSearch,
    /// Open the create-user form.
    NewUser,
    /// Open the enroll form for the focused user.
    Enroll,
    /// Ask to remove the highlighted enrollment.
    RemoveEnrollment,
    /// Switch focus between the roster and the enrollments pane.
    ToggleFocus,
    /// Enroll from the roster, remove from the enrollments pane.
    EnterAction,
    MoveUp,
    MoveDown,
    NextPage,
    PrevPage,
    /// Reload the roster, and the catalog if it failed to load.
    Refresh,
    OpenHelp,
    Ignore,
}

#[derive(Clone, Debug)]
pub struct Keymap {
    bindings: HashMap<(KeyModifiers, KeyCode), KeyAction>,
}

impl Keymap {
    pub fn new_defaults() -> Self {
        use KeyCode::*;
        use KeyModifiers as M;
        let mut bindings = HashMap::new();
        bindings.insert((M::NONE, Char('q')), KeyAction::Quit);
        bindings.insert((M::CONTROL, Char('c')), KeyAction::Quit);
        bindings.insert((M::NONE, Esc), KeyAction::Ignore);
        bindings.insert((M::NONE, Char('/')), KeyAction::StartSearch);
        bindings.insert((M::NONE, Char('n')), KeyAction::NewUser);
        bindings.insert((M::NONE, Char('e')), KeyAction::Enroll);
        bindings.insert((M::NONE, Delete), KeyAction::RemoveEnrollment);
        bindings.insert((M::NONE, Char('x')), KeyAction::RemoveEnrollment);
        bindings.insert((M::NONE, Tab), KeyAction::ToggleFocus);
        bindings.insert((M::NONE, BackTab), KeyAction::ToggleFocus);
        bindings.insert((M::SHIFT, BackTab), KeyAction::ToggleFocus);
        bindings.insert((M::NONE, Enter), KeyAction::EnterAction);
        bindings.insert((M::NONE, Up), KeyAction::MoveUp);
        bindings.insert((M::NONE, Down), KeyAction::MoveDown);
        bindings.insert((M::NONE, Char('k')), KeyAction::MoveUp);
        bindings.insert((M::NONE, Char('j')), KeyAction::MoveDown);
        bindings.insert((M::NONE, Left), KeyAction::PrevPage);
        bindings.insert((M::NONE, Right), KeyAction::NextPage);
        bindings.insert((M::NONE, Char('h')), KeyAction::PrevPage);
        bindings.insert((M::NONE, Char('l')), KeyAction::NextPage);
        bindings.insert((M::NONE, PageUp), KeyAction::PrevPage);
        bindings.insert((M::NONE, PageDown), KeyAction::NextPage);
        bindings.insert((M::NONE, Char('r')), KeyAction::Refresh);
        bindings.insert((M::NONE, Char('?')), KeyAction::OpenHelp);
        // Some terminals report '?' with SHIFT
        bindings.insert((M::SHIFT, Char('?')), KeyAction::OpenHelp);
        Self { bindings }
    }

    /// Load from `path`, else from the config dir, else write defaults to `path`.
    pub fn load_or_init(path: &str) -> Self {
        if std::path::Path::new(path).exists() {
            return Self::from_file(path).unwrap_or_default();
        }
        if let Some(existing) = crate::config::config_file_read_path("keybinds.conf") {
            return Self::from_file(&existing).unwrap_or_default();
        }
        let km = Self::default();
        let _ = km.write_file(path);
        km
    }

    /// Load a keymap from a configuration file of `<Action> = <KeySpec>` lines.
    ///
    /// Starts from the defaults; each line adds or overrides one binding.
    pub fn from_file(path: &str) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        Some(Self::from_config_str(&contents))
    }

    pub fn from_config_str(contents: &str) -> Self {
        let mut map = Self::default();
        for raw in contents.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.splitn(2, '=');
            let lhs = parts.next().map(|s| s.trim()).unwrap_or("");
            let rhs = parts.next().map(|s| s.trim()).unwrap_or("");
            if let (Some(action), Some(key)) = (parse_action(lhs), parse_key(rhs)) {
                map.bindings.insert(key, action);
            }
        }
        map
    }

    pub fn write_file(&self, path: &str) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# roster-admin keybindings\n");
        buf.push_str("# Format: <Action> = <KeySpec>\n");
        buf.push_str(
            "# KeySpec examples: q, Ctrl+c, Enter, Esc, Tab, BackTab, Up, Down, Left, Right, \
             PageUp, PageDown, Delete, /\n\n",
        );

        let mut dump: Vec<(String, KeyAction)> = self
            .bindings
            .iter()
            .filter(|((mods, _), _)| !mods.contains(KeyModifiers::SHIFT))
            .map(|((mods, code), action)| (Self::format_key(*mods, *code), *action))
            .collect();
        dump.sort_by(|a, b| format_action(a.1).cmp(format_action(b.1)).then(a.0.cmp(&b.0)));
        for (key, action) in dump {
            let _ = writeln!(&mut buf, "{} = {}", format_action(action), key);
        }

        std::fs::write(path, buf)
    }

    pub fn resolve(&self, key: &KeyEvent) -> Option<KeyAction> {
        self.bindings.get(&(key.modifiers, key.code)).copied()
    }

    /// Keys bound to `action`, formatted for display and sorted.
    pub fn keys_for(&self, action: KeyAction) -> Vec<String> {
        let mut keys: Vec<String> = self
            .bindings
            .iter()
            .filter(|(_, a)| **a == action)
            .filter(|((mods, _), _)| !mods.contains(KeyModifiers::SHIFT))
            .map(|((mods, code), _)| Self::format_key(*mods, *code))
            .collect();
        keys.sort();
        keys
    }

    /// Format a key (modifiers + code) into a spec like "Ctrl+c" or "BackTab".
    pub fn format_key(mods: KeyModifiers, code: KeyCode) -> String {
        use KeyCode::*;
        let base = match code {
            Enter => "Enter".to_string(),
            Delete => "Delete".to_string(),
            Esc => "Esc".to_string(),
            Tab => "Tab".to_string(),
            BackTab => "BackTab".to_string(),
            Up => "Up".to_string(),
            Down => "Down".to_string(),
            Left => "Left".to_string(),
            Right => "Right".to_string(),
            PageUp => "PageUp".to_string(),
            PageDown => "PageDown".to_string(),
            Char(c) => c.to_string(),
            _ => format!("{:?}", code),
        };
        if mods.contains(KeyModifiers::CONTROL) {
            format!("Ctrl+{}", base)
        } else {
            base
        }
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::new_defaults()
    }
}

fn parse_key(spec: &str) -> Option<(KeyModifiers, KeyCode)> {
    use KeyCode::*;
    let s = spec.trim();
    let (mods, rest) = match s.strip_prefix("Ctrl+") {
        Some(after) => (KeyModifiers::CONTROL, after),
        None => (KeyModifiers::NONE, s),
    };
    let code = match rest {
        "Enter" => Enter,
        "Delete" => Delete,
        "Esc" | "Escape" => Esc,
        "Tab" => Tab,
        "BackTab" => BackTab,
        "Up" => Up,
        "Down" => Down,
        "Left" => Left,
        "Right" => Right,
        "PageUp" => PageUp,
        "PageDown" => PageDown,
        _ => {
            let mut chars = rest.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Char(c),
                _ => return None,
            }
        }
    };
    Some((mods, code))
}

fn parse_action(s: &str) -> Option<KeyAction> {
    match s.trim() {
        "Quit" => Some(KeyAction::Quit),
        "StartSearch" => Some(KeyAction::StartSearch),
        "NewUser" => Some(KeyAction::NewUser),
        "Enroll" => Some(KeyAction::Enroll),
        "RemoveEnrollment" => Some(KeyAction::RemoveEnrollment),
        "ToggleFocus" => Some(KeyAction::ToggleFocus),
        "EnterAction" => Some(KeyAction::EnterAction),
        "MoveUp" => Some(KeyAction::MoveUp),
        "MoveDown" => Some(KeyAction::MoveDown),
        "NextPage" => Some(KeyAction::NextPage),
        "PrevPage" => Some(KeyAction::PrevPage),
        "Refresh" => Some(KeyAction::Refresh),
        "OpenHelp" => Some(KeyAction::OpenHelp),
        "Ignore" => Some(KeyAction::Ignore),
        _ => None,
    }
}

pub fn format_action(a: KeyAction) -> &'static str {
    match a {
        KeyAction::Quit => "Quit",
        KeyAction::StartSearch => "StartSearch",
        KeyAction::NewUser => "NewUser",
        KeyAction::Enroll => "Enroll",
        KeyAction::RemoveEnrollment => "RemoveEnrollment",
        KeyAction::ToggleFocus => "ToggleFocus",
        KeyAction::EnterAction => "EnterAction",
        KeyAction::MoveUp => "MoveUp",
        KeyAction::MoveDown => "MoveDown",
        KeyAction::NextPage => "NextPage",
        KeyAction::PrevPage => "PrevPage",
        KeyAction::Refresh => "Refresh",
        KeyAction::OpenHelp => "OpenHelp",
        KeyAction::Ignore => "Ignore",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(mods: KeyModifiers, code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, mods)
    }

    #[test]
    fn defaults_resolve_core_keys() {
        let km = Keymap::default();
        assert_eq!(
            km.resolve(&key(KeyModifiers::NONE, KeyCode::Char('/'))),
            Some(KeyAction::StartSearch)
        );
        assert_eq!(km.resolve(&key(KeyModifiers::NONE, KeyCode::Right)), Some(KeyAction::NextPage));
        assert_eq!(
            km.resolve(&key(KeyModifiers::CONTROL, KeyCode::Char('c'))),
            Some(KeyAction::Quit)
        );
        assert_eq!(km.resolve(&key(KeyModifiers::NONE, KeyCode::F(5))), None);
    }

    #[test]
    fn config_overrides_and_adds() {
        let km = Keymap::from_config_str(
            "# custom\nEnroll = Ctrl+e\nQuit = Q\nNotAnAction = z\nRefresh = F5key\n",
        );
        assert_eq!(
            km.resolve(&key(KeyModifiers::CONTROL, KeyCode::Char('e'))),
            Some(KeyAction::Enroll)
        );
        assert_eq!(km.resolve(&key(KeyModifiers::NONE, KeyCode::Char('Q'))), Some(KeyAction::Quit));
        // defaults remain
        assert_eq!(
            km.resolve(&key(KeyModifiers::NONE, KeyCode::Char('e'))),
            Some(KeyAction::Enroll)
        );
        assert_eq!(km.resolve(&key(KeyModifiers::NONE, KeyCode::Char('z'))), None);
    }

    #[test]
    fn keys_for_lists_display_specs() {
        let km = Keymap::default();
        assert_eq!(km.keys_for(KeyAction::Quit), vec!["Ctrl+c".to_string(), "q".to_string()]);
    }
}
