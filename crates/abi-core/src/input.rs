//! Per-frame keyboard state.
//!
//! The frame loop feeds raw key events into an [`InputTracker`] and freezes
//! it once per animation tick into an [`InputSnapshot`]. Every face feature
//! reads that same snapshot, so all features act on identical input.

use std::time::{Duration, Instant};

/// Keys the face reacts to.
///
/// Variant order is the priority order used when several selector keys are
/// held at once: the earliest held variant wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaceKey {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
    EyeNeutral = 4,
    EyeSad = 5,
    EyeAngry = 6,
    EyeBored = 7,
    MouthOpen = 8,
    MouthClosed = 9,
    MouthOpenSmile = 10,
    MouthClosedSmile = 11,
    MouthClosedSad = 12,
    MouthOpenSad = 13,
}

impl FaceKey {
    pub const COUNT: usize = 14;

    pub const ALL: [FaceKey; Self::COUNT] = [
        FaceKey::Up,
        FaceKey::Down,
        FaceKey::Left,
        FaceKey::Right,
        FaceKey::EyeNeutral,
        FaceKey::EyeSad,
        FaceKey::EyeAngry,
        FaceKey::EyeBored,
        FaceKey::MouthOpen,
        FaceKey::MouthClosed,
        FaceKey::MouthOpenSmile,
        FaceKey::MouthClosedSmile,
        FaceKey::MouthClosedSad,
        FaceKey::MouthOpenSad,
    ];

    /// Eye selectors in priority order.
    pub const EYE_SELECTORS: [FaceKey; 4] = [
        FaceKey::EyeNeutral,
        FaceKey::EyeSad,
        FaceKey::EyeAngry,
        FaceKey::EyeBored,
    ];

    /// Mouth selectors in priority order.
    pub const MOUTH_SELECTORS: [FaceKey; 6] = [
        FaceKey::MouthOpen,
        FaceKey::MouthClosed,
        FaceKey::MouthOpenSmile,
        FaceKey::MouthClosedSmile,
        FaceKey::MouthClosedSad,
        FaceKey::MouthOpenSad,
    ];

    /// Map a typed character to a face key.
    ///
    /// Movement uses the arrow keys, which the frame loop maps itself.
    pub fn from_char(c: char) -> Option<Self> {
        let key = match c.to_ascii_lowercase() {
            'n' => FaceKey::EyeNeutral,
            's' => FaceKey::EyeSad,
            'a' => FaceKey::EyeAngry,
            'b' => FaceKey::EyeBored,
            'o' => FaceKey::MouthOpen,
            'c' => FaceKey::MouthClosed,
            'm' => FaceKey::MouthOpenSmile,
            'k' => FaceKey::MouthClosedSmile,
            'j' => FaceKey::MouthClosedSad,
            'l' => FaceKey::MouthOpenSad,
            _ => return None,
        };
        Some(key)
    }
}

/// Immutable view of which face keys were held during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    held: [bool; FaceKey::COUNT],
}

impl InputSnapshot {
    /// Snapshot with exactly the given keys held.
    pub fn with_keys(keys: &[FaceKey]) -> Self {
        let mut snapshot = Self::default();
        for &key in keys {
            snapshot.held[key as usize] = true;
        }
        snapshot
    }

    pub fn is_held(&self, key: FaceKey) -> bool {
        self.held[key as usize]
    }

    /// First held key among `candidates`, in the order given.
    pub fn first_held(&self, candidates: &[FaceKey]) -> Option<FaceKey> {
        candidates.iter().copied().find(|&k| self.is_held(k))
    }

    /// The eye selector that wins this tick, if any is held.
    pub fn expression_request(&self) -> Option<FaceKey> {
        self.first_held(&FaceKey::EYE_SELECTORS)
    }

    /// The mouth selector that wins this tick, if any is held.
    pub fn mien_request(&self) -> Option<FaceKey> {
        self.first_held(&FaceKey::MOUTH_SELECTORS)
    }

    /// Movement offset for one tick, in screen units.
    ///
    /// Opposite directions cancel out.
    pub fn movement(&self, step: i32) -> (i32, i32) {
        let axis = |neg: FaceKey, pos: FaceKey| {
            (self.is_held(pos) as i32 - self.is_held(neg) as i32) * step
        };
        (
            axis(FaceKey::Left, FaceKey::Right),
            axis(FaceKey::Up, FaceKey::Down),
        )
    }

    pub fn is_empty(&self) -> bool {
        !self.held.iter().any(|&h| h)
    }
}

/// Turns a stream of press/release events into "held" state.
///
/// Terminals rarely report key releases, so a key also counts as released
/// once its events stop. After the first press the keyboard stays silent
/// until auto-repeat kicks in, so that gap is covered by `repeat_delay`;
/// once repeats flow, `hold` is enough.
pub struct InputTracker {
    last_seen: [Option<Instant>; FaceKey::COUNT],
    repeating: [bool; FaceKey::COUNT],
    hold: Duration,
    repeat_delay: Duration,
}

impl InputTracker {
    pub fn new(hold: Duration, repeat_delay: Duration) -> Self {
        Self {
            last_seen: [None; FaceKey::COUNT],
            repeating: [false; FaceKey::COUNT],
            hold,
            repeat_delay,
        }
    }

    /// Record the initial press of `key`.
    pub fn press(&mut self, key: FaceKey, now: Instant) {
        self.last_seen[key as usize] = Some(now);
        self.repeating[key as usize] = false;
    }

    /// Record an auto-repeat of `key`.
    pub fn repeat(&mut self, key: FaceKey, now: Instant) {
        self.last_seen[key as usize] = Some(now);
        self.repeating[key as usize] = true;
    }

    /// Record an explicit release of `key`.
    pub fn release(&mut self, key: FaceKey) {
        self.last_seen[key as usize] = None;
        self.repeating[key as usize] = false;
    }

    /// Freeze the tracker into a snapshot as of `now`.
    pub fn snapshot(&self, now: Instant) -> InputSnapshot {
        let mut held = [false; FaceKey::COUNT];
        for (i, slot) in held.iter_mut().enumerate() {
            let window = if self.repeating[i] {
                self.hold
            } else {
                self.repeat_delay.max(self.hold)
            };
            *slot = self.last_seen[i]
                .and_then(|t| now.checked_duration_since(t))
                .is_some_and(|age| age <= window);
        }
        InputSnapshot { held }
    }
}
