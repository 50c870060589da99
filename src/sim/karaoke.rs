//! Rhythm mini-game: tap when falling notes cross the hit line

use serde::{Deserialize, Serialize};

use super::event::{Cue, GameEvent, Progress};
use super::input::FrameInput;
use super::scene::Viewport;
use crate::tuning::KaraokeTuning;

/// A note falling down the lane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub y: f32,
    pub speed: f32,
    pub radius: f32,
    pub alive: bool,
}

/// How close to the line a hit landed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitQuality {
    Perfect,
    Good,
}

fn fall_speed(viewport: Viewport, tuning: &KaraokeTuning) -> f32 {
    tuning.min_fall_speed.max(viewport.height * tuning.fall_speed_frac)
}

#[derive(Debug, Clone)]
pub struct Karaoke {
    pub lane_x: f32,
    pub line_y: f32,
    pub notes: Vec<Note>,
    pub spawned: u32,
    pub hits: u32,
    pub misses: u32,
    spawn_timer: f32,
    fall_speed: f32,
    /// Viewport the lane, line and notes are laid out for
    viewport: Viewport,
    done: bool,
    tuning: KaraokeTuning,
}

impl Karaoke {
    /// Lay out a fresh round for `viewport`; the first note spawns immediately
    pub fn new(viewport: Viewport, tuning: &KaraokeTuning) -> Self {
        let mut karaoke = Self {
            lane_x: viewport.width * 0.5,
            line_y: viewport.height * tuning.line_y_frac,
            notes: Vec::with_capacity(tuning.total_notes as usize),
            spawned: 0,
            hits: 0,
            misses: 0,
            spawn_timer: 0.0,
            fall_speed: fall_speed(viewport, tuning),
            viewport,
            done: false,
            tuning: tuning.clone(),
        };
        karaoke.spawn_note();
        karaoke
    }

    pub fn hits_to_win(&self) -> u32 {
        self.tuning.hits_to_win
    }

    pub fn perfect_tolerance(&self) -> f32 {
        self.tuning.perfect_tolerance
    }

    pub fn is_complete(&self) -> bool {
        self.done
    }

    /// Re-derive the lane and hit line for a resized viewport
    ///
    /// Notes keep their relative height on the screen, so a note that was
    /// about to cross the line still is.
    fn fit(&mut self, viewport: Viewport) {
        if viewport == self.viewport {
            return;
        }
        let scale = viewport.height / self.viewport.height;
        self.lane_x = viewport.width * 0.5;
        self.line_y = viewport.height * self.tuning.line_y_frac;
        self.fall_speed = fall_speed(viewport, &self.tuning);
        for note in &mut self.notes {
            note.y *= scale;
            note.speed = self.fall_speed;
        }
        self.viewport = viewport;
    }

    fn spawn_note(&mut self) {
        if self.spawned >= self.tuning.total_notes {
            return;
        }
        self.notes.push(Note {
            y: self.tuning.spawn_y,
            speed: self.fall_speed,
            radius: self.tuning.note_radius,
            alive: true,
        });
        self.spawned += 1;
    }

    /// Live note closest to the hit line, with its distance
    pub fn nearest_live_note(&self) -> Option<(usize, f32)> {
        self.notes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.alive)
            .map(|(i, n)| (i, (n.y - self.line_y).abs()))
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
    }

    /// Resolve one tap against the note nearest the line
    ///
    /// At most one note is consumed per tap. A tap with no note inside the
    /// hit window counts as a miss.
    pub fn try_hit(&mut self, events: &mut Vec<GameEvent>) -> Option<HitQuality> {
        match self.nearest_live_note() {
            Some((index, dist)) if dist <= self.tuning.hit_tolerance => {
                self.notes[index].alive = false;
                self.hits += 1;
                events.push(GameEvent::Points(self.tuning.points_per_hit));

                let quality = if dist <= self.tuning.perfect_tolerance {
                    events.push(GameEvent::Cue(Cue::Perfect));
                    events.push(GameEvent::Message("Perfect!"));
                    HitQuality::Perfect
                } else {
                    events.push(GameEvent::Cue(Cue::Good));
                    events.push(GameEvent::Message("Good!"));
                    HitQuality::Good
                };
                Some(quality)
            }
            _ => {
                self.misses += 1;
                events.push(GameEvent::Cue(Cue::Miss));
                events.push(GameEvent::Message("Miss!"));
                None
            }
        }
    }

    pub fn update(
        &mut self,
        dt: f32,
        viewport: Viewport,
        input: &FrameInput,
        events: &mut Vec<GameEvent>,
    ) -> Progress {
        if self.done {
            return Progress::Continue;
        }
        self.fit(viewport);

        self.spawn_timer += dt;
        while self.spawn_timer >= self.tuning.spawn_every {
            self.spawn_timer -= self.tuning.spawn_every;
            self.spawn_note();
        }

        let late_line = self.line_y + self.tuning.late_tolerance;
        for note in self.notes.iter_mut().filter(|n| n.alive) {
            note.y += note.speed * dt;
            if note.y > late_line {
                note.alive = false;
                self.misses += 1;
                events.push(GameEvent::Cue(Cue::Miss));
                events.push(GameEvent::Message("Too late!"));
            }
        }

        if input.tap {
            self.try_hit(events);
        }
        self.notes.retain(|n| n.alive);

        if self.hits >= self.tuning.hits_to_win {
            self.done = true;
            events.push(GameEvent::Cue(Cue::SceneClear));
            events.push(GameEvent::Message("Karaoke cleared!"));
            return Progress::Complete;
        }

        Progress::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(800.0, 600.0)
    }

    fn round_with_line(line_y: f32) -> Karaoke {
        let mut karaoke = Karaoke::new(viewport(), &KaraokeTuning::default());
        karaoke.line_y = line_y;
        karaoke.notes.clear();
        karaoke
    }

    fn note_at(y: f32) -> Note {
        Note {
            y,
            speed: 0.0,
            radius: 16.0,
            alive: true,
        }
    }

    #[test]
    fn test_layout_from_viewport() {
        let karaoke = Karaoke::new(viewport(), &KaraokeTuning::default());
        assert_eq!(karaoke.lane_x, 400.0);
        assert!((karaoke.line_y - 480.0).abs() < 1e-3);
        assert_eq!(karaoke.spawned, 1);
        // max(260, 600 * 0.65)
        assert!((karaoke.notes[0].speed - 390.0).abs() < 1e-3);
    }

    #[test]
    fn test_perfect_hit_scores_ten() {
        let mut karaoke = round_with_line(400.0);
        karaoke.notes.push(note_at(405.0));
        let mut events = Vec::new();
        assert_eq!(karaoke.try_hit(&mut events), Some(HitQuality::Perfect));
        assert_eq!(karaoke.hits, 1);
        assert!(events.contains(&GameEvent::Points(10)));
        assert!(events.contains(&GameEvent::Message("Perfect!")));
    }

    #[test]
    fn test_hit_window_boundary() {
        let mut events = Vec::new();

        let mut karaoke = round_with_line(500.0);
        karaoke.notes.push(note_at(470.0));
        assert_eq!(karaoke.try_hit(&mut events), Some(HitQuality::Good));

        let mut karaoke = round_with_line(500.0);
        karaoke.notes.push(note_at(469.0));
        assert_eq!(karaoke.try_hit(&mut events), None);
        assert_eq!(karaoke.misses, 1);

        let mut karaoke = round_with_line(500.0);
        karaoke.notes.push(note_at(531.0));
        assert_eq!(karaoke.try_hit(&mut events), None);
        assert!(karaoke.notes[0].alive);
    }

    #[test]
    fn test_tap_resolves_nearest_not_oldest() {
        let mut karaoke = round_with_line(400.0);
        karaoke.notes.push(note_at(380.0)); // older, 20 away
        karaoke.notes.push(note_at(395.0)); // newer, 5 away
        let mut events = Vec::new();
        assert_eq!(karaoke.try_hit(&mut events), Some(HitQuality::Perfect));
        assert!(karaoke.notes[0].alive);
        assert!(!karaoke.notes[1].alive);
    }

    #[test]
    fn test_empty_tap_is_miss() {
        let mut karaoke = round_with_line(400.0);
        let mut events = Vec::new();
        assert_eq!(karaoke.try_hit(&mut events), None);
        assert_eq!(karaoke.misses, 1);
        assert!(events.contains(&GameEvent::Message("Miss!")));
    }

    #[test]
    fn test_late_note_counts_as_miss() {
        let mut karaoke = round_with_line(400.0);
        karaoke.notes.push(Note {
            y: 465.0,
            speed: 100.0,
            radius: 16.0,
            alive: true,
        });
        let mut events = Vec::new();
        karaoke.update(0.1, viewport(), &FrameInput::default(), &mut events);
        assert_eq!(karaoke.misses, 1);
        assert!(events.contains(&GameEvent::Message("Too late!")));
    }

    #[test]
    fn test_spawns_on_accumulated_interval() {
        let mut karaoke = Karaoke::new(viewport(), &KaraokeTuning::default());
        let mut events = Vec::new();
        // 0.7s in 0.1s slices spawns exactly one more note
        for _ in 0..7 {
            karaoke.update(0.1, viewport(), &FrameInput::default(), &mut events);
        }
        assert_eq!(karaoke.spawned, 2);
        // A single long frame catches up on every due spawn
        karaoke.update(1.5, viewport(), &FrameInput::default(), &mut events);
        assert_eq!(karaoke.spawned, 4);
    }

    #[test]
    fn test_spawn_stops_at_total() {
        let mut karaoke = Karaoke::new(viewport(), &KaraokeTuning::default());
        let mut events = Vec::new();
        for _ in 0..100 {
            karaoke.update(0.5, viewport(), &FrameInput::default(), &mut events);
        }
        assert_eq!(karaoke.spawned, 14);
    }

    #[test]
    fn test_completion_fires_once() {
        let mut karaoke = round_with_line(400.0);
        karaoke.hits = 7;
        karaoke.notes.push(note_at(400.0));
        let tap = FrameInput {
            tap: true,
            ..Default::default()
        };
        let mut events = Vec::new();
        assert_eq!(karaoke.update(0.0, viewport(), &tap, &mut events), Progress::Complete);
        assert!(karaoke.is_complete());
        assert_eq!(karaoke.update(0.016, viewport(), &tap, &mut events), Progress::Continue);
        assert_eq!(karaoke.hits, 8);
    }

    #[test]
    fn test_resize_moves_line_and_notes() {
        let large = Viewport::new(1200.0, 800.0);
        let small = Viewport::new(600.0, 400.0);
        let mut karaoke = Karaoke::new(large, &KaraokeTuning::default());
        karaoke.notes[0].y = 600.0;
        let mut events = Vec::new();

        karaoke.update(0.0, small, &FrameInput::default(), &mut events);
        assert_eq!(karaoke.lane_x, 300.0);
        assert!((karaoke.line_y - 320.0).abs() < 1e-3);
        assert!((karaoke.notes[0].y - 300.0).abs() < 1e-3);
        // max(260, 400 * 0.65)
        assert!((karaoke.notes[0].speed - 260.0).abs() < 1e-3);
    }

    #[test]
    fn test_shrunk_round_can_still_be_cleared() {
        let large = Viewport::new(1200.0, 800.0);
        let small = Viewport::new(600.0, 400.0);
        let mut karaoke = Karaoke::new(large, &KaraokeTuning::default());
        let mut events = Vec::new();

        let mut complete = false;
        for _ in 0..(15 * 60) {
            let tap = karaoke
                .nearest_live_note()
                .is_some_and(|(_, dist)| dist <= karaoke.perfect_tolerance());
            let input = FrameInput {
                tap,
                ..Default::default()
            };
            if karaoke.update(1.0 / 60.0, small, &input, &mut events) == Progress::Complete {
                complete = true;
                break;
            }
        }
        assert!(complete);
        assert!(karaoke.line_y < small.height);
    }
}
