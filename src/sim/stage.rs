//! Stages: obstacle sets, colour themes and music per themed level
//!
//! Stage numbers run 1..=5 and wrap. Everything stage-specific is looked up
//! from the [`THEMES`] table rather than branched on at the call site.

use serde::{Deserialize, Serialize};

use super::obstacle::ObstacleKind;
use crate::consts::STAGE_COUNT;

/// RGBA colour in 0..1
pub type Color = [f32; 4];

/// Convert a 0xRRGGBB literal into an opaque colour
pub const fn rgb(hex: u32) -> Color {
    [
        ((hex >> 16) & 0xFF) as f32 / 255.0,
        ((hex >> 8) & 0xFF) as f32 / 255.0,
        (hex & 0xFF) as f32 / 255.0,
        1.0,
    ]
}

/// Oscillator shape for stage music
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
    Sawtooth,
    Square,
}

/// A single melody note
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    /// Frequency (Hz)
    pub freq: f32,
    /// Duration (seconds)
    pub duration: f32,
}

/// A looping background melody
#[derive(Debug, Clone, Copy)]
pub struct Melody {
    pub notes: &'static [Note],
    pub waveform: Waveform,
    /// Time between loop starts (seconds)
    pub loop_secs: f32,
}

impl Melody {
    /// Sum of note durations (seconds)
    pub fn length(&self) -> f32 {
        self.notes.iter().map(|n| n.duration).sum()
    }
}

/// Obstacle colouring for a stage
#[derive(Debug, Clone, Copy)]
pub struct ObstaclePalette {
    pub primary: Color,
    pub secondary: Color,
    pub accent: Color,
    pub highlight: Color,
}

/// Everything that changes when the stage changes
#[derive(Debug, Clone, Copy)]
pub struct StageTheme {
    pub name: &'static str,
    /// Sky gradient, top then bottom
    pub sky: [Color; 2],
    pub ground: Color,
    pub accents: [Color; 3],
    pub obstacles: ObstaclePalette,
    pub obstacle_kinds: &'static [ObstacleKind],
    pub melody: Melody,
}

const fn note(freq: f32, duration: f32) -> Note {
    Note { freq, duration }
}

/// Theme table, indexed by `stage - 1`
pub static THEMES: [StageTheme; STAGE_COUNT as usize] = [
    StageTheme {
        name: "Sunny Desert",
        sky: [rgb(0x87CEEB), rgb(0xF0E68C)],
        ground: rgb(0xF4A460),
        accents: [rgb(0xFFD700), rgb(0xFF6347), rgb(0x32CD32)],
        obstacles: ObstaclePalette {
            primary: rgb(0x8B4513),
            secondary: rgb(0xD2691E),
            accent: rgb(0x228B22),
            highlight: rgb(0xFFD700),
        },
        obstacle_kinds: &[ObstacleKind::Cactus, ObstacleKind::Rock],
        melody: Melody {
            notes: &[
                note(261.63, 0.5),
                note(293.66, 0.5),
                note(329.63, 0.5),
                note(293.66, 0.5),
            ],
            waveform: Waveform::Sine,
            loop_secs: 2.0,
        },
    },
    StageTheme {
        name: "Jungle Trail",
        sky: [rgb(0x228B22), rgb(0x90EE90)],
        ground: rgb(0x8B4513),
        accents: [rgb(0x006400), rgb(0xFF6347), rgb(0xFFD700)],
        obstacles: ObstaclePalette {
            primary: rgb(0x006400),
            secondary: rgb(0x8B4513),
            accent: rgb(0x32CD32),
            highlight: rgb(0xFF6347),
        },
        obstacle_kinds: &[ObstacleKind::Log, ObstacleKind::Vine, ObstacleKind::Tree],
        melody: Melody {
            notes: &[
                note(220.00, 0.4),
                note(246.94, 0.4),
                note(220.00, 0.4),
                note(196.00, 0.4),
            ],
            waveform: Waveform::Triangle,
            loop_secs: 1.8,
        },
    },
    StageTheme {
        name: "Moonlit Night",
        sky: [rgb(0x191970), rgb(0x4B0082)],
        ground: rgb(0x2F4F4F),
        accents: [rgb(0x9370DB), rgb(0x00CED1), rgb(0xFFD700)],
        obstacles: ObstaclePalette {
            primary: rgb(0x4B0082),
            secondary: rgb(0x9370DB),
            accent: rgb(0x00CED1),
            highlight: rgb(0xFFD700),
        },
        obstacle_kinds: &[ObstacleKind::Crystal, ObstacleKind::Shadow, ObstacleKind::Bat],
        melody: Melody {
            notes: &[
                note(174.61, 0.8),
                note(196.00, 0.8),
                note(220.00, 0.8),
                note(196.00, 0.8),
            ],
            waveform: Waveform::Triangle,
            loop_secs: 3.2,
        },
    },
    StageTheme {
        name: "Snowy Mountains",
        sky: [rgb(0xB0E0E6), rgb(0xE0E0E0)],
        ground: rgb(0xFFFFFF),
        accents: [rgb(0x4682B4), rgb(0x87CEEB), rgb(0xC0C0C0)],
        obstacles: ObstaclePalette {
            primary: rgb(0xB0E0E6),
            secondary: rgb(0x87CEEB),
            accent: rgb(0x4682B4),
            highlight: rgb(0xFFFFFF),
        },
        obstacle_kinds: &[ObstacleKind::Icicle, ObstacleKind::Snowball, ObstacleKind::Ice],
        melody: Melody {
            notes: &[
                note(329.63, 0.6),
                note(369.99, 0.6),
                note(392.00, 0.6),
                note(369.99, 0.6),
            ],
            waveform: Waveform::Sine,
            loop_secs: 2.4,
        },
    },
    StageTheme {
        name: "Lava Volcano",
        sky: [rgb(0x8B0000), rgb(0xFF4500)],
        ground: rgb(0x2F4F4F),
        accents: [rgb(0xDC143C), rgb(0xFF6347), rgb(0xFFD700)],
        obstacles: ObstaclePalette {
            primary: rgb(0xDC143C),
            secondary: rgb(0xFF4500),
            accent: rgb(0xFF6347),
            highlight: rgb(0xFFD700),
        },
        obstacle_kinds: &[ObstacleKind::Fireball, ObstacleKind::Lava, ObstacleKind::Volcano],
        melody: Melody {
            notes: &[
                note(146.83, 0.3),
                note(164.81, 0.3),
                note(196.00, 0.3),
                note(164.81, 0.3),
            ],
            waveform: Waveform::Sawtooth,
            loop_secs: 1.2,
        },
    },
];

/// A stage number, always within 1..=5
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8")]
pub struct Stage(u8);

impl From<u8> for Stage {
    fn from(number: u8) -> Self {
        Self::new(number)
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::FIRST
    }
}

impl Stage {
    pub const FIRST: Stage = Stage(1);

    /// Build a stage from a raw number. Unknown numbers fall back to stage 1.
    pub fn new(number: u8) -> Self {
        if (1..=STAGE_COUNT).contains(&number) {
            Stage(number)
        } else {
            log::warn!("Unknown stage {}, falling back to stage 1", number);
            Self::FIRST
        }
    }

    pub fn number(self) -> u8 {
        self.0
    }

    /// Next stage, and whether the cycle wrapped from 5 back to 1
    pub fn advance(self) -> (Stage, bool) {
        if self.0 >= STAGE_COUNT {
            (Self::FIRST, true)
        } else {
            (Stage(self.0 + 1), false)
        }
    }

    pub fn theme(self) -> &'static StageTheme {
        &THEMES[(self.0 - 1) as usize]
    }

    pub fn name(self) -> &'static str {
        self.theme().name
    }

    /// Obstacle kinds that can spawn in this stage
    pub fn obstacle_kinds(self) -> &'static [ObstacleKind] {
        self.theme().obstacle_kinds
    }

    /// HUD label, e.g. "3 - Moonlit Night"
    pub fn label(self) -> String {
        format!("{} - {}", self.0, self.name())
    }
}
