//! Fire-and-forget presentation hooks.
//!
//! The simulation narrates what happened through this trait; it never
//! reads anything back. Rendering, audio, and HUD layers implement it,
//! and headless runs (tests, replays) use [`NullPresenter`].

use crate::geom::Vec2;

/// Visual effect kinds the simulation can request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisualKind {
    HitSpark,
    KillBurst,
    FrozenShatter,
    AoeBlast,
    BossRing,
    ShieldBreak,
    LevelUpFlash,
    HasteOrb,
}

/// Sound cues.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SoundId {
    Shot,
    Hit,
    Kill,
    Explosion,
    BossWarning,
    LevelUp,
    ShieldBreak,
    PickUp,
    GameOver,
}

/// Presentation collaborator surface.
///
/// Implementations must not fail; the simulation ignores their effects
/// entirely.
pub trait Presenter {
    fn spawn_visual(&mut self, kind: VisualKind, at: Vec2);
    fn play_sound(&mut self, sound: SoundId);
    /// Shake the camera at `intensity` for `duration_ms`.
    fn shake_camera(&mut self, intensity: f32, duration_ms: u64);
    fn update_score(&mut self, score: u64);
    fn update_wave(&mut self, wave: u32);
    fn update_buff_timer(&mut self, remaining_ms: Option<u64>);
    fn show_toast(&mut self, text: &str);
}

/// Presenter that drops everything; for tests and headless simulation.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn spawn_visual(&mut self, _kind: VisualKind, _at: Vec2) {}
    fn play_sound(&mut self, _sound: SoundId) {}
    fn shake_camera(&mut self, _intensity: f32, _duration_ms: u64) {}
    fn update_score(&mut self, _score: u64) {}
    fn update_wave(&mut self, _wave: u32) {}
    fn update_buff_timer(&mut self, _remaining_ms: Option<u64>) {}
    fn show_toast(&mut self, _text: &str) {}
}
