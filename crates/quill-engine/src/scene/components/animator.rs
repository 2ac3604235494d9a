use std::collections::HashMap;

use crate::assets::SpriteId;

/// An ordered frame list played back at a fixed rate.
#[derive(Debug, Clone)]
pub struct Animation {
    frames: Vec<SpriteId>,
    fps: f32,
}

impl Default for Animation {
    fn default() -> Self {
        Self {
            frames: Vec::new(),
            fps: 1.0,
        }
    }
}

impl Animation {
    pub fn add_frame(&mut self, frame: SpriteId) {
        self.frames.push(frame);
    }

    pub fn add_frames(&mut self, frames: impl IntoIterator<Item = SpriteId>) {
        self.frames.extend(frames);
    }

    /// Frame at `index`, clamped into range. `None` only when empty.
    pub fn frame(&self, index: usize) -> Option<SpriteId> {
        if self.frames.is_empty() {
            return None;
        }
        Some(self.frames[index.min(self.frames.len() - 1)])
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn set_fps(&mut self, fps: f32) {
        self.fps = fps;
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

/// Plays named [`Animation`]s and hands the current frame to the entity's
/// sibling `Image`.
///
/// Frame advance is a pure function of accumulated dt: every elapsed
/// `1 / fps` steps one frame forward, wrapping at the end of the list.
#[derive(Debug, Clone, Default)]
pub struct Animator {
    animations: HashMap<String, Animation>,
    current: Option<String>,
    frame: usize,
    accumulator: f32,
    paused: bool,
}

impl Animator {
    /// Registers an empty animation under `name` and returns it for
    /// configuration. An existing animation of that name is returned as-is.
    pub fn add_animation(&mut self, name: impl Into<String>) -> &mut Animation {
        self.animations.entry(name.into()).or_default()
    }

    pub fn animation(&self, name: &str) -> Option<&Animation> {
        self.animations.get(name)
    }

    pub fn animation_mut(&mut self, name: &str) -> Option<&mut Animation> {
        self.animations.get_mut(name)
    }

    pub fn remove_animation(&mut self, name: &str) {
        self.animations.remove(name);
        if self.current.as_deref() == Some(name) {
            self.current = None;
        }
    }

    /// Switches to `name` and unpauses. Unknown names are a logged no-op.
    pub fn play(&mut self, name: &str) {
        if !self.animations.contains_key(name) {
            log::warn!("animator: unknown animation {name:?}");
            return;
        }
        if self.current.as_deref() != Some(name) {
            self.current = Some(name.to_owned());
        }
        self.paused = false;
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn unpause(&mut self) {
        self.paused = false;
    }

    pub fn reset(&mut self) {
        self.frame = 0;
    }

    #[inline]
    pub fn current_frame(&self) -> usize {
        self.frame
    }

    /// Advances playback by `dt`; returns the new frame's sprite when the
    /// frame changed this update.
    pub(crate) fn update(&mut self, dt: f32) -> Option<SpriteId> {
        if self.paused {
            return None;
        }
        let animation = self.animations.get(self.current.as_deref()?)?;
        if animation.is_empty() || animation.fps() <= 0.0 {
            return None;
        }

        self.accumulator += dt;
        let quantum = 1.0 / animation.fps();
        let mut changed = false;
        while self.accumulator >= quantum {
            self.accumulator -= quantum;
            self.frame += 1;
            if self.frame >= animation.len() {
                self.frame = 0;
            }
            changed = true;
        }

        if changed { animation.frame(self.frame) } else { None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn animator_with(frames: &[SpriteId], fps: f32) -> Animator {
        let mut a = Animator::default();
        let anim = a.add_animation("walk");
        anim.add_frames(frames.iter().copied());
        anim.set_fps(fps);
        a.play("walk");
        a
    }

    fn ids(n: usize) -> Vec<SpriteId> {
        (0..n).map(SpriteId).collect()
    }

    #[test]
    fn frames_advance_on_the_fps_quantum() {
        let frames = ids(4);
        let mut a = animator_with(&frames, 10.0);

        assert_eq!(a.update(0.05), None);
        assert_eq!(a.update(0.05), Some(frames[1]));
        assert_eq!(a.current_frame(), 1);
    }

    #[test]
    fn playback_wraps_to_frame_zero() {
        let frames = ids(3);
        let mut a = animator_with(&frames, 1.0);

        a.update(1.0);
        a.update(1.0);
        assert_eq!(a.current_frame(), 2);
        assert_eq!(a.update(1.0), Some(frames[0]));
    }

    #[test]
    fn large_dt_steps_multiple_frames_at_once() {
        let frames = ids(10);
        let mut a = animator_with(&frames, 10.0);

        assert_eq!(a.update(0.35), Some(frames[3]));
    }

    #[test]
    fn paused_animator_holds_its_frame() {
        let frames = ids(2);
        let mut a = animator_with(&frames, 10.0);

        a.pause();
        assert_eq!(a.update(5.0), None);
        assert_eq!(a.current_frame(), 0);
    }

    #[test]
    fn playing_an_unknown_name_keeps_the_current_animation() {
        let frames = ids(2);
        let mut a = animator_with(&frames, 10.0);

        a.play("missing");
        assert!(a.update(0.1).is_some());
    }
}
