/// Viewer shortcuts. Pure so it can be tested on the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    ReloadModel,
    ToggleInteraction,
    ToggleAnimation,
}

#[inline]
pub fn action_for_key(key: &str) -> Option<KeyAction> {
    match key {
        "r" | "R" => Some(KeyAction::ReloadModel),
        "m" | "M" => Some(KeyAction::ToggleInteraction),
        " " => Some(KeyAction::ToggleAnimation),
        _ => None,
    }
}
