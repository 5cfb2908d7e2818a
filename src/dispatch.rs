use serde::Serialize;

use crate::types::{
    GestureEvent, GestureKind, Mode, PoseLabel, PushPullDirection, RotateDirection, SwipeDirection,
};

/// Output of the engine, consumed by whatever performs the key presses and
/// mouse moves. Cursor coordinates are in `[0, 1]` screen-relative units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionRequest {
    TogglePlayPause,
    NextTrack,
    PreviousTrack,
    VolumeUp { step: f32 },
    VolumeDown { step: f32 },
    PlaybackSpeedUp,

    CursorMove { x: f32, y: f32 },
    LeftClick,
    RightClick,
    /// Positive scrolls up.
    Scroll { amount: f32 },
    DragStart,
    DragEnd,

    SnapLeft,
    SnapRight,
    Maximize,
    Minimize,
    CloseWindow,
    SwitchWindow,
    ShowDesktop,
    TaskView,

    NextSlide,
    PreviousSlide,
    BlackScreen,
    WhiteScreen,
    FirstSlide,
    LastSlide,
    StartSlideshow,
    EndSlideshow,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Binding {
    pub gesture: GestureKind,
    pub action: ActionRequest,
}

const fn bind(gesture: GestureKind, action: ActionRequest) -> Binding {
    Binding { gesture, action }
}

const fn pose(label: PoseLabel) -> GestureKind {
    GestureKind::PoseHeld(label)
}

const fn swipe(direction: SwipeDirection) -> GestureKind {
    GestureKind::Swipe(direction)
}

const ROTATE_VOLUME_STEP: f32 = 0.05;
const SWIPE_VOLUME_STEP: f32 = 0.10;

const MEDIA_BINDINGS: &[Binding] = &[
    bind(pose(PoseLabel::Fist), ActionRequest::TogglePlayPause),
    bind(pose(PoseLabel::OpenHand), ActionRequest::TogglePlayPause),
    bind(pose(PoseLabel::PeaceSign), ActionRequest::TogglePlayPause),
    bind(pose(PoseLabel::ThumbsUp), ActionRequest::PlaybackSpeedUp),
    bind(
        GestureKind::Rotate(RotateDirection::Left),
        ActionRequest::VolumeDown {
            step: ROTATE_VOLUME_STEP,
        },
    ),
    bind(
        GestureKind::Rotate(RotateDirection::Right),
        ActionRequest::VolumeUp {
            step: ROTATE_VOLUME_STEP,
        },
    ),
    bind(swipe(SwipeDirection::Left), ActionRequest::PreviousTrack),
    bind(swipe(SwipeDirection::Right), ActionRequest::NextTrack),
    bind(
        swipe(SwipeDirection::Up),
        ActionRequest::VolumeUp {
            step: SWIPE_VOLUME_STEP,
        },
    ),
    bind(
        swipe(SwipeDirection::Down),
        ActionRequest::VolumeDown {
            step: SWIPE_VOLUME_STEP,
        },
    ),
];

// cursor and scroll come from the pointer channel, not from this table
const MOUSE_BINDINGS: &[Binding] = &[
    bind(pose(PoseLabel::Pinch), ActionRequest::LeftClick),
    bind(pose(PoseLabel::PeaceSign), ActionRequest::RightClick),
    bind(pose(PoseLabel::ThumbsUp), ActionRequest::DragStart),
];

const WINDOW_BINDINGS: &[Binding] = &[
    bind(swipe(SwipeDirection::Left), ActionRequest::SnapLeft),
    bind(swipe(SwipeDirection::Right), ActionRequest::SnapRight),
    bind(swipe(SwipeDirection::Up), ActionRequest::Maximize),
    bind(swipe(SwipeDirection::Down), ActionRequest::Minimize),
    bind(pose(PoseLabel::Fist), ActionRequest::CloseWindow),
    bind(pose(PoseLabel::PeaceSign), ActionRequest::SwitchWindow),
    bind(pose(PoseLabel::OpenHand), ActionRequest::ShowDesktop),
    bind(pose(PoseLabel::ThumbsUp), ActionRequest::TaskView),
];

const PRESENTATION_BINDINGS: &[Binding] = &[
    bind(swipe(SwipeDirection::Right), ActionRequest::NextSlide),
    bind(pose(PoseLabel::Pointing), ActionRequest::NextSlide),
    bind(swipe(SwipeDirection::Left), ActionRequest::PreviousSlide),
    bind(pose(PoseLabel::Fist), ActionRequest::BlackScreen),
    bind(pose(PoseLabel::OpenHand), ActionRequest::WhiteScreen),
    bind(pose(PoseLabel::PeaceSign), ActionRequest::FirstSlide),
    bind(pose(PoseLabel::ThumbsUp), ActionRequest::LastSlide),
    bind(
        GestureKind::PushPull(PushPullDirection::Push),
        ActionRequest::StartSlideshow,
    ),
    bind(
        GestureKind::PushPull(PushPullDirection::Pull),
        ActionRequest::EndSlideshow,
    ),
];

pub fn bindings(mode: Mode) -> &'static [Binding] {
    match mode {
        Mode::MediaControl => MEDIA_BINDINGS,
        Mode::MouseControl => MOUSE_BINDINGS,
        Mode::WindowManagement => WINDOW_BINDINGS,
        Mode::Presentation => PRESENTATION_BINDINGS,
    }
}

/// Looks up the discrete action bound to a confirmed gesture. Unbound pairs are a no-op.
pub fn dispatch(mode: Mode, event: &GestureEvent) -> Option<ActionRequest> {
    bindings(mode)
        .iter()
        .find(|binding| binding.gesture == event.kind)
        .map(|binding| binding.action)
}
