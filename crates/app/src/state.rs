//! State machine for Lil Snippy

use capture::Rect;
use std::path::PathBuf;
use std::time::Instant;

/// Application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// Idle state - ready to snip
    Idle,
    /// Overlay shown, user is dragging a region
    Selecting,
    /// Overlay cleared, worker is grabbing the screen
    Capturing,
    /// Main window back, worker is running OCR
    Recognizing,
}

impl AppState {
    /// Get display text for current state
    pub fn display_text(&self) -> &'static str {
        match self {
            AppState::Idle => "Ready",
            AppState::Selecting => "Select a region...",
            AppState::Capturing => "Capturing...",
            AppState::Recognizing => "Reading text...",
        }
    }

    /// Check if snip button should be enabled
    pub fn can_snip(&self) -> bool {
        matches!(self, AppState::Idle)
    }

    /// The window is currently the full-screen overlay
    pub fn is_overlay(&self) -> bool {
        matches!(self, AppState::Selecting | AppState::Capturing)
    }
}

/// One capture in flight
#[derive(Debug, Clone)]
pub struct SnipSession {
    /// Request id, echoed back by the worker
    pub id: u64,
    /// Region to capture (screen coordinates)
    pub region: Rect,
    /// Persisted snip, once captured
    pub path: Option<PathBuf>,
    pub started: Instant,
}

impl SnipSession {
    pub fn new(id: u64, region: Rect) -> Self {
        Self {
            id,
            region,
            path: None,
            started: Instant::now(),
        }
    }
}

/// State machine transitions
pub struct StateMachine {
    state: AppState,
    session: Option<SnipSession>,
    next_id: u64,
}

impl StateMachine {
    /// Create a new state machine
    pub fn new() -> Self {
        Self {
            state: AppState::Idle,
            session: None,
            next_id: 1,
        }
    }

    /// Get current state
    pub fn state(&self) -> AppState {
        self.state
    }

    /// Get current session
    pub fn session(&self) -> Option<&SnipSession> {
        self.session.as_ref()
    }

    /// Transition to selecting state
    pub fn start_selecting(&mut self) -> bool {
        if self.state.can_snip() {
            self.state = AppState::Selecting;
            true
        } else {
            false
        }
    }

    /// Cancel selection and return to idle
    pub fn cancel_selecting(&mut self) -> bool {
        if matches!(self.state, AppState::Selecting) {
            self.state = AppState::Idle;
            true
        } else {
            false
        }
    }

    /// Selection finished; returns the new session to hand to the worker
    pub fn start_capturing(&mut self, region: Rect) -> Option<&SnipSession> {
        if !matches!(self.state, AppState::Selecting) {
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.state = AppState::Capturing;
        self.session = Some(SnipSession::new(id, region));
        self.session.as_ref()
    }

    /// Worker saved the snip and moved on to OCR
    pub fn capture_finished(&mut self, id: u64, path: PathBuf) -> bool {
        if !matches!(self.state, AppState::Capturing) || !self.is_current(id) {
            return false;
        }
        if let Some(session) = self.session.as_mut() {
            session.path = Some(path);
        }
        self.state = AppState::Recognizing;
        true
    }

    /// Worker is done with `id`, successfully or not. Returns the finished session.
    pub fn finish(&mut self, id: u64) -> Option<SnipSession> {
        if !self.is_current(id) {
            return None;
        }
        self.state = AppState::Idle;
        self.session.take()
    }

    /// Reset to idle
    pub fn reset(&mut self) {
        self.state = AppState::Idle;
        self.session = None;
    }

    fn is_current(&self, id: u64) -> bool {
        self.session.as_ref().map_or(false, |s| s.id == id)
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}
