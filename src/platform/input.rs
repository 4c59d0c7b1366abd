//! Raw device input to intents
//!
//! Pure mapping functions; the browser glue feeds them DOM event data.

use std::collections::HashMap;

use crate::sim::{GamePhase, Intent};

/// Minimum travel (px) before a touch counts as a swipe
pub const SWIPE_THRESHOLD: f32 = 50.0;
/// A touch that has not become a swipe after this long is a tap (ms)
pub const TAP_DELAY_MS: i32 = 100;
/// Mouse ducks release themselves after this long (ms)
pub const MOUSE_DUCK_RELEASE_MS: i32 = 200;

/// Keys whose browser default (scrolling) must be suppressed
pub fn is_game_key(code: &str) -> bool {
    matches!(code, "Space" | "ArrowUp" | "ArrowDown" | "KeyW" | "KeyS")
}

/// Intent for a key press in the current phase
pub fn key_down(code: &str, phase: GamePhase) -> Option<Intent> {
    match code {
        "Space" | "ArrowUp" | "KeyW" if phase == GamePhase::Playing => Some(Intent::Jump),
        "ArrowDown" | "KeyS" if phase == GamePhase::Playing => Some(Intent::DuckStart),
        "Enter" => match phase {
            GamePhase::Start => Some(Intent::Start),
            GamePhase::GameOver => Some(Intent::Restart),
            _ => None,
        },
        "Escape" if matches!(phase, GamePhase::Playing | GamePhase::Paused) => {
            Some(Intent::PauseToggle)
        }
        "KeyM" => Some(Intent::MuteToggle),
        _ => None,
    }
}

/// Intent for a key release
pub fn key_up(code: &str) -> Option<Intent> {
    match code {
        "ArrowDown" | "KeyS" => Some(Intent::DuckEnd),
        _ => None,
    }
}

/// Mouse press on the canvas: upper half jumps, lower half ducks.
/// The caller releases a mouse duck after [`MOUSE_DUCK_RELEASE_MS`].
pub fn click_intent(click_y: f32, canvas_height: f32) -> Intent {
    if click_y < canvas_height * 0.5 {
        Intent::Jump
    } else {
        Intent::DuckStart
    }
}

#[derive(Debug, Clone, Copy)]
struct Track {
    start_x: f32,
    start_y: f32,
    swipe: bool,
    tap_fired: bool,
}

/// Classifies touches into taps and vertical swipes
#[derive(Debug, Default)]
pub struct TouchTracker {
    touches: HashMap<i32, Track>,
}

impl TouchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, id: i32, x: f32, y: f32) {
        self.touches.insert(
            id,
            Track {
                start_x: x,
                start_y: y,
                swipe: false,
                tap_fired: false,
            },
        );
    }

    /// Touch moved. Returns an intent the first time it becomes a vertical swipe.
    pub fn moved(&mut self, id: i32, x: f32, y: f32) -> Option<Intent> {
        let track = self.touches.get_mut(&id)?;
        if track.swipe || track.tap_fired {
            return None;
        }
        let dx = x - track.start_x;
        let dy = y - track.start_y;
        if (dx * dx + dy * dy).sqrt() <= SWIPE_THRESHOLD {
            return None;
        }
        track.swipe = true;
        if dy.abs() > dx.abs() {
            Some(if dy > 0.0 {
                Intent::DuckStart
            } else {
                Intent::Jump
            })
        } else {
            None
        }
    }

    /// Tap delay elapsed for `id`. Jumps unless the touch turned into a swipe.
    pub fn tap_due(&mut self, id: i32) -> Option<Intent> {
        let track = self.touches.get_mut(&id)?;
        if track.swipe || track.tap_fired {
            return None;
        }
        track.tap_fired = true;
        Some(Intent::Jump)
    }

    /// Touch released. A downward swipe ends the duck; a quick tap that
    /// ended before its delay still jumps.
    pub fn end(&mut self, id: i32, x: f32, y: f32) -> Option<Intent> {
        let track = self.touches.remove(&id)?;
        let dx = x - track.start_x;
        let dy = y - track.start_y;
        if track.swipe {
            (dy > 0.0 && dy.abs() > dx.abs()).then_some(Intent::DuckEnd)
        } else if !track.tap_fired {
            Some(Intent::Jump)
        } else {
            None
        }
    }

    pub fn active(&self) -> usize {
        self.touches.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_keys_only_while_playing() {
        assert_eq!(key_down("Space", GamePhase::Playing), Some(Intent::Jump));
        assert_eq!(key_down("KeyW", GamePhase::Playing), Some(Intent::Jump));
        assert_eq!(key_down("ArrowDown", GamePhase::Playing), Some(Intent::DuckStart));
        assert_eq!(key_down("Space", GamePhase::Start), None);
        assert_eq!(key_down("KeyS", GamePhase::Paused), None);
        assert_eq!(key_up("KeyS"), Some(Intent::DuckEnd));
        assert_eq!(key_up("Space"), None);
    }

    #[test]
    fn test_enter_depends_on_phase() {
        assert_eq!(key_down("Enter", GamePhase::Start), Some(Intent::Start));
        assert_eq!(key_down("Enter", GamePhase::GameOver), Some(Intent::Restart));
        assert_eq!(key_down("Enter", GamePhase::Playing), None);
    }

    #[test]
    fn test_escape_and_mute() {
        assert_eq!(key_down("Escape", GamePhase::Playing), Some(Intent::PauseToggle));
        assert_eq!(key_down("Escape", GamePhase::Paused), Some(Intent::PauseToggle));
        assert_eq!(key_down("Escape", GamePhase::GameOver), None);
        assert_eq!(key_down("KeyM", GamePhase::Start), Some(Intent::MuteToggle));
    }

    #[test]
    fn test_game_keys() {
        assert!(is_game_key("Space"));
        assert!(!is_game_key("Enter"));
    }

    #[test]
    fn test_click_halves() {
        assert_eq!(click_intent(100.0, 800.0), Intent::Jump);
        assert_eq!(click_intent(400.0, 800.0), Intent::DuckStart);
    }

    #[test]
    fn test_tap_jumps_once() {
        let mut t = TouchTracker::new();
        t.start(1, 100.0, 100.0);
        assert_eq!(t.tap_due(1), Some(Intent::Jump));
        assert_eq!(t.tap_due(1), None);
        assert_eq!(t.end(1, 100.0, 100.0), None);
        assert_eq!(t.active(), 0);
    }

    #[test]
    fn test_quick_tap_jumps_on_release() {
        let mut t = TouchTracker::new();
        t.start(1, 100.0, 100.0);
        assert_eq!(t.end(1, 102.0, 101.0), Some(Intent::Jump));
        assert_eq!(t.tap_due(1), None);
    }

    #[test]
    fn test_swipe_down_ducks_until_release() {
        let mut t = TouchTracker::new();
        t.start(7, 100.0, 100.0);
        assert_eq!(t.moved(7, 105.0, 130.0), None);
        assert_eq!(t.moved(7, 105.0, 170.0), Some(Intent::DuckStart));
        assert_eq!(t.moved(7, 105.0, 200.0), None);
        assert_eq!(t.tap_due(7), None);
        assert_eq!(t.end(7, 105.0, 200.0), Some(Intent::DuckEnd));
    }

    #[test]
    fn test_swipe_up_jumps() {
        let mut t = TouchTracker::new();
        t.start(2, 100.0, 300.0);
        assert_eq!(t.moved(2, 90.0, 200.0), Some(Intent::Jump));
        assert_eq!(t.end(2, 90.0, 200.0), None);
    }

    #[test]
    fn test_horizontal_swipe_does_nothing() {
        let mut t = TouchTracker::new();
        t.start(3, 100.0, 100.0);
        assert_eq!(t.moved(3, 200.0, 110.0), None);
        assert_eq!(t.tap_due(3), None);
        assert_eq!(t.end(3, 200.0, 110.0), None);
    }
}
