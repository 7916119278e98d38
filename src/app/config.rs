use gtk::gdk;
use gtk4 as gtk;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Copy,
    Save,
    Upload,
    Undo,
    CropTopLeft,
    CropBottomRight,
    DrawCircle,
    DrawArrow,
    DrawText,
    Cancel,
    ShowShortcuts,
    Quit,
}

impl Action {
    pub fn label(&self) -> &str {
        match self {
            Action::Copy => "Copy to Clipboard",
            Action::Save => "Save to File",
            Action::Upload => "Upload and Copy Link",
            Action::Undo => "Undo Last Drawing",
            Action::CropTopLeft => "Crop Top-Left Corner",
            Action::CropBottomRight => "Crop Bottom-Right Corner",
            Action::DrawCircle => "Draw Circle",
            Action::DrawArrow => "Draw Arrow",
            Action::DrawText => "Draw Text",
            Action::Cancel => "Cancel Current Operation",
            Action::ShowShortcuts => "Keyboard Shortcuts",
            Action::Quit => "Quit",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Shortcut {
    pub key: gdk::Key,
    pub modifiers: gdk::ModifierType,
}

impl Shortcut {
    fn new(key: gdk::Key, modifiers: gdk::ModifierType) -> Self {
        Self { key, modifiers }
    }
}

#[derive(Debug, Clone)]
pub struct ShortcutConfig {
    bindings: HashMap<Action, Vec<Shortcut>>,
}

impl Default for ShortcutConfig {
    fn default() -> Self {
        let ctrl = gdk::ModifierType::CONTROL_MASK;
        let alt = gdk::ModifierType::ALT_MASK;
        let none = gdk::ModifierType::empty();

        let mut bindings = HashMap::new();

        // Output
        bindings.insert(Action::Copy, vec![Shortcut::new(gdk::Key::c, ctrl)]);
        bindings.insert(Action::Save, vec![Shortcut::new(gdk::Key::s, ctrl)]);
        bindings.insert(Action::Upload, vec![Shortcut::new(gdk::Key::g, ctrl)]);
        bindings.insert(Action::Undo, vec![Shortcut::new(gdk::Key::z, ctrl)]);

        // Operations
        bindings.insert(Action::CropTopLeft, vec![Shortcut::new(gdk::Key::j, alt)]);
        bindings.insert(
            Action::CropBottomRight,
            vec![Shortcut::new(gdk::Key::k, alt)],
        );
        bindings.insert(Action::DrawCircle, vec![Shortcut::new(gdk::Key::c, alt)]);
        bindings.insert(Action::DrawArrow, vec![Shortcut::new(gdk::Key::a, alt)]);
        bindings.insert(Action::DrawText, vec![Shortcut::new(gdk::Key::t, alt)]);
        bindings.insert(Action::Cancel, vec![Shortcut::new(gdk::Key::Escape, none)]);

        // Application
        bindings.insert(
            Action::ShowShortcuts,
            vec![
                Shortcut::new(gdk::Key::question, ctrl | gdk::ModifierType::SHIFT_MASK),
                Shortcut::new(gdk::Key::slash, ctrl),
            ],
        );
        bindings.insert(Action::Quit, vec![Shortcut::new(gdk::Key::q, ctrl)]);

        Self { bindings }
    }
}

impl ShortcutConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_action(&self, key: gdk::Key, modifiers: gdk::ModifierType) -> Option<Action> {
        // Filter out irrelevant modifiers like NumLock/CapsLock/ScrollLock
        let mask = gdk::ModifierType::CONTROL_MASK
            | gdk::ModifierType::SHIFT_MASK
            | gdk::ModifierType::ALT_MASK
            | gdk::ModifierType::SUPER_MASK
            | gdk::ModifierType::META_MASK;

        let clean_mods = modifiers & mask;
        // Caps Lock turns Alt+j into Alt+J
        let key = key.to_lower();

        self.bindings.iter().find_map(|(action, shortcuts)| {
            shortcuts
                .iter()
                .any(|sc| sc.key == key && sc.modifiers == clean_mods)
                .then_some(*action)
        })
    }

    /// Accelerator text for the first binding of `action`.
    pub fn get_shortcut_label(&self, action: Action) -> String {
        self.bindings
            .get(&action)
            .and_then(|shortcuts| shortcuts.first())
            .map(|sc| gtk::accelerator_name(sc.key, sc.modifiers).to_string())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bindings() {
        let config = ShortcutConfig::new();
        let ctrl = gdk::ModifierType::CONTROL_MASK;
        let alt = gdk::ModifierType::ALT_MASK;
        assert_eq!(config.get_action(gdk::Key::c, ctrl), Some(Action::Copy));
        assert_eq!(config.get_action(gdk::Key::c, alt), Some(Action::DrawCircle));
        assert_eq!(config.get_action(gdk::Key::g, ctrl), Some(Action::Upload));
        assert_eq!(config.get_action(gdk::Key::j, alt), Some(Action::CropTopLeft));
        assert_eq!(
            config.get_action(gdk::Key::Escape, gdk::ModifierType::empty()),
            Some(Action::Cancel)
        );
        assert_eq!(config.get_action(gdk::Key::c, gdk::ModifierType::empty()), None);
    }

    #[test]
    fn test_lock_modifiers_are_ignored() {
        let config = ShortcutConfig::new();
        let mods = gdk::ModifierType::ALT_MASK | gdk::ModifierType::LOCK_MASK;
        assert_eq!(config.get_action(gdk::Key::K, mods), Some(Action::CropBottomRight));
    }

    #[test]
    fn test_shortcuts_page_has_two_bindings() {
        let config = ShortcutConfig::new();
        let ctrl = gdk::ModifierType::CONTROL_MASK;
        assert_eq!(
            config.get_action(gdk::Key::slash, ctrl),
            Some(Action::ShowShortcuts)
        );
        assert_eq!(
            config.get_action(gdk::Key::question, ctrl | gdk::ModifierType::SHIFT_MASK),
            Some(Action::ShowShortcuts)
        );
    }
}
