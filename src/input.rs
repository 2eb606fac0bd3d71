//! Held-key timing with DAS (Delayed Auto Shift) and ARR (Auto Repeat Rate)
//!
//! Counts frames rather than wall-clock time, so repeats land on exactly
//! the same frames every run.

/// Actions that auto-repeat while their key is held
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatKey {
    Left,
    Right,
    Down,
}

impl RepeatKey {
    pub fn all() -> [RepeatKey; 3] {
        [RepeatKey::Left, RepeatKey::Right, RepeatKey::Down]
    }

    fn index(&self) -> usize {
        match self {
            RepeatKey::Left => 0,
            RepeatKey::Right => 1,
            RepeatKey::Down => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct KeyPressState {
    das: u32,
    arr: u32,
}

/// Per-key DAS/ARR counters for the repeatable actions
#[derive(Debug, Clone)]
pub struct KeyRepeat {
    held: [Option<KeyPressState>; 3],
    das_frames: u32,
    arr_frames: u32,
}

impl KeyRepeat {
    pub fn new(das_frames: u32, arr_frames: u32) -> Self {
        Self {
            held: [None; 3],
            das_frames,
            arr_frames,
        }
    }

    /// Start (or restart) timing a key from zero
    pub fn press(&mut self, key: RepeatKey) {
        self.held[key.index()] = Some(KeyPressState::default());
    }

    /// Forget a key's counters entirely
    pub fn release(&mut self, key: RepeatKey) {
        self.held[key.index()] = None;
    }

    pub fn is_held(&self, key: RepeatKey) -> bool {
        self.held[key.index()].is_some()
    }

    /// Clear all held keys
    pub fn clear(&mut self) {
        self.held = [None; 3];
    }

    /// Advance one frame and return the keys whose action repeats this frame
    pub fn update(&mut self) -> Vec<RepeatKey> {
        let (das, arr) = (self.das_frames, self.arr_frames);
        RepeatKey::all()
            .into_iter()
            .filter(|key| match &mut self.held[key.index()] {
                Some(state) => process_das_arr(state, das, arr),
                None => false,
            })
            .collect()
    }
}

/// Process DAS/ARR logic for a key state, returns true if should trigger action
fn process_das_arr(state: &mut KeyPressState, das: u32, arr: u32) -> bool {
    state.das += 1;
    if state.das <= das {
        return false;
    }
    state.arr += 1;
    if state.arr >= arr {
        state.arr = 0;
        return true;
    }
    false
}
