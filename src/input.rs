//! Input sources feeding the effects.
//!
//! Raw browser events are translated into [`InputEvent`]s by the wasm glue
//! and folded into an [`InputState`]. Folding only stores the latest sample;
//! effects read it back on their next tick.

use glam::Vec2;

/// DOM event an effect or gate listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    MouseMove,
    MouseLeave,
    TouchStart,
    TouchMove,
    TouchEnd,
    Wheel,
    KeyDown,
    Resize,
    DeviceOrientation,
}

impl EventKind {
    pub fn name(self) -> &'static str {
        match self {
            EventKind::MouseMove => "mousemove",
            EventKind::MouseLeave => "mouseleave",
            EventKind::TouchStart => "touchstart",
            EventKind::TouchMove => "touchmove",
            EventKind::TouchEnd => "touchend",
            EventKind::Wheel => "wheel",
            EventKind::KeyDown => "keydown",
            EventKind::Resize => "resize",
            EventKind::DeviceOrientation => "deviceorientation",
        }
    }
}

/// Where a listener is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Window,
    Document,
    /// The canvas or section the effect is mounted on.
    Element,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Binding {
    pub target: Target,
    pub kind: EventKind,
    /// Passive listeners can never cancel the browser's default action.
    pub passive: bool,
}

impl Binding {
    pub const fn new(target: Target, kind: EventKind) -> Self {
        Self { target, kind, passive: true }
    }

    /// A listener allowed to cancel the default action (native scrolling)
    /// while its owner asks for it.
    pub const fn blocking(self) -> Self {
        Self { passive: false, ..self }
    }
}

/// Outcome of the device-orientation capability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrientationPermission {
    Granted,
    Denied,
    Unsupported,
}

/// Which source drives the interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Tilt,
    Pointer,
    Static,
}

impl InputMode {
    /// Only an explicit grant enables tilt; everything else degrades.
    pub fn resolve(permission: OrientationPermission, pointer_available: bool) -> Self {
        match permission {
            OrientationPermission::Granted => InputMode::Tilt,
            _ if pointer_available => InputMode::Pointer,
            _ => InputMode::Static,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerMove { x: f32, y: f32 },
    PointerLeave,
    TouchMove { x: f32, y: f32 },
    TouchEnd,
    /// Device tilt in degrees: `gamma` left/right, `beta` front/back.
    Orientation { gamma: f32, beta: f32 },
    Resize { width: f32, height: f32 },
    Permission(OrientationPermission),
}

/// Interaction vector for the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputVector {
    /// No active interaction.
    None,
    /// A screen-space interaction point (pointer or finger).
    Point(Vec2),
    /// Device tilt `(gamma, beta)` in degrees.
    Tilt(Vec2),
}

/// Frames to wait for a first orientation sample before giving up on tilt.
pub const DEFAULT_TILT_GRACE_FRAMES: u32 = 120;

#[derive(Debug, Clone)]
pub struct InputState {
    pointer: Option<Vec2>,
    touch: Option<Vec2>,
    touch_delta: Vec2,
    tilt: Option<Vec2>,
    mode: InputMode,
    pointer_available: bool,
    frames_waiting: u32,
    tilt_grace_frames: u32,
}

impl Default for InputState {
    fn default() -> Self {
        Self::new(true)
    }
}

impl InputState {
    pub fn new(pointer_available: bool) -> Self {
        Self {
            pointer: None,
            touch: None,
            touch_delta: Vec2::ZERO,
            tilt: None,
            mode: if pointer_available { InputMode::Pointer } else { InputMode::Static },
            pointer_available,
            frames_waiting: 0,
            tilt_grace_frames: DEFAULT_TILT_GRACE_FRAMES,
        }
    }

    pub fn with_tilt_grace(mut self, frames: u32) -> Self {
        self.tilt_grace_frames = frames;
        self
    }

    /// Store the latest sample. Nothing is recomputed here.
    pub fn apply(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::PointerMove { x, y } => self.pointer = Some(Vec2::new(x, y)),
            InputEvent::PointerLeave => self.pointer = None,
            InputEvent::TouchMove { x, y } => {
                let next = Vec2::new(x, y);
                self.touch_delta = self.touch.map_or(Vec2::ZERO, |prev| next - prev);
                self.touch = Some(next);
            }
            InputEvent::TouchEnd => {
                self.touch = None;
                self.touch_delta = Vec2::ZERO;
            }
            InputEvent::Orientation { gamma, beta } => {
                if gamma.is_finite() && beta.is_finite() {
                    self.tilt = Some(Vec2::new(gamma, beta));
                }
            }
            InputEvent::Permission(permission) => {
                let mode = InputMode::resolve(permission, self.pointer_available);
                if mode != self.mode {
                    log::info!("input mode {:?} -> {:?} ({:?})", self.mode, mode, permission);
                }
                self.mode = mode;
                self.frames_waiting = 0;
            }
            InputEvent::Resize { .. } => {}
        }
    }

    /// Per-frame bookkeeping: drop tilt if no sample ever arrived.
    pub fn tick(&mut self) {
        if self.mode != InputMode::Tilt || self.tilt.is_some() {
            return;
        }
        self.frames_waiting += 1;
        if self.frames_waiting >= self.tilt_grace_frames {
            let fallback = InputMode::resolve(OrientationPermission::Unsupported, self.pointer_available);
            log::warn!("no orientation samples after {} frames, falling back to {:?}", self.frames_waiting, fallback);
            self.mode = fallback;
        }
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn pointer(&self) -> Option<Vec2> {
        self.pointer
    }

    pub fn touch(&self) -> Option<Vec2> {
        self.touch
    }

    pub fn touch_delta(&self) -> Vec2 {
        self.touch_delta
    }

    pub fn tilt(&self) -> Option<Vec2> {
        self.tilt
    }

    /// A finger wins over the mouse when both are present.
    pub fn point(&self) -> Option<Vec2> {
        self.touch.or(self.pointer)
    }

    /// Tilt mode reports nothing until the first sample arrives.
    pub fn vector(&self) -> InputVector {
        match self.mode {
            InputMode::Tilt => self.tilt.map_or(InputVector::None, InputVector::Tilt),
            InputMode::Pointer | InputMode::Static => {
                self.point().map_or(InputVector::None, InputVector::Point)
            }
        }
    }
}
