use glam::Vec2;

/// Per-frame input snapshot consumed by the camera.
///
/// The windowing layer polls OS state once per frame and fills this in;
/// the camera never sees raw events.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputState {
    pub move_forward: bool,
    pub move_backward: bool,
    pub strafe_left: bool,
    pub strafe_right: bool,
    /// Relative mouse motion since the previous frame, in pixels.
    pub mouse_delta: Vec2,
    pub left_button: bool,
    pub right_button: bool,
}

impl InputState {
    /// True when exactly the left button is held (drag-translate along Z
    /// plus look rotation).
    pub fn left_drag(&self) -> bool {
        self.left_button && !self.right_button
    }

    /// True when exactly the right button is held (drag-translate along Y
    /// plus look rotation).
    pub fn right_drag(&self) -> bool {
        self.right_button && !self.left_button
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_buttons_is_neither_drag() {
        let input = InputState {
            left_button: true,
            right_button: true,
            ..InputState::default()
        };
        assert!(!input.left_drag());
        assert!(!input.right_drag());
    }

    #[test]
    fn single_button_drags() {
        let left = InputState {
            left_button: true,
            ..InputState::default()
        };
        assert!(left.left_drag());
        let right = InputState {
            right_button: true,
            ..InputState::default()
        };
        assert!(right.right_drag());
    }
}
