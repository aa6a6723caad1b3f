#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutKey {
    Character(char),
    Enter,
    Escape,
    Delete,
    Backspace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShortcutModifiers {
    pub ctrl: bool,
    pub shift: bool,
}

impl ShortcutModifiers {
    pub const fn new(ctrl: bool, shift: bool) -> Self {
        Self { ctrl, shift }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputContext {
    pub has_image: bool,
    pub stroke_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    Undo,
    Redo,
    DrawMode,
    EraseMode,
    BrushGrow,
    BrushShrink,
    Clear,
    Export,
}

fn resolve_command_shortcut(
    key: ShortcutKey,
    modifiers: ShortcutModifiers,
) -> Option<ShortcutAction> {
    match (key, modifiers.shift) {
        (ShortcutKey::Character('z'), false) => Some(ShortcutAction::Undo),
        (ShortcutKey::Character('z'), true) | (ShortcutKey::Character('y'), false) => {
            Some(ShortcutAction::Redo)
        }
        (ShortcutKey::Character('s'), _) => Some(ShortcutAction::Export),
        _ => None,
    }
}

fn resolve_brush_shortcut(key: ShortcutKey) -> Option<ShortcutAction> {
    match key {
        ShortcutKey::Character('b') => Some(ShortcutAction::DrawMode),
        ShortcutKey::Character('e') => Some(ShortcutAction::EraseMode),
        ShortcutKey::Character('[') => Some(ShortcutAction::BrushShrink),
        ShortcutKey::Character(']') => Some(ShortcutAction::BrushGrow),
        ShortcutKey::Delete | ShortcutKey::Backspace => Some(ShortcutAction::Clear),
        _ => None,
    }
}

pub fn resolve_shortcut(
    key: ShortcutKey,
    modifiers: ShortcutModifiers,
    context: InputContext,
) -> Option<ShortcutAction> {
    if context.stroke_active || !context.has_image {
        return None;
    }

    let key = match key {
        ShortcutKey::Character(c) => ShortcutKey::Character(c.to_ascii_lowercase()),
        other => other,
    };

    if modifiers.ctrl {
        return resolve_command_shortcut(key, modifiers);
    }

    if modifiers.shift {
        return None;
    }

    resolve_brush_shortcut(key)
}
