//! Timelines
//!
//! A timeline sequences tweens on a shared playhead. Each child is placed
//! with a [`Position`], resolved when the child is added:
//!
//! | position | start time |
//! |----------|------------|
//! | `""`     | end of the timeline |
//! | `"+=x"` / `"-=x"` | end of the timeline plus/minus `x` seconds |
//! | `"<x"`   | start of the previous child plus `x` seconds |
//! | `">x"`   | end of the previous child plus `x` seconds |
//! | `"x"`    | absolute time `x` seconds |
//!
//! The child's own delay is added on top of the resolved position.

use std::str::FromStr;
use std::sync::Arc;

use folio_core::{ElementId, ElementTree};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, multispace0},
    combinator::{all_consuming, map, opt},
    error::{Error as NomError, ParseError as NomParseError},
    number::complete::float,
    sequence::{delimited, preceded},
    Finish, IResult,
};
use smallvec::SmallVec;
use thiserror::Error;

use crate::tween::{Callback, TweenCore, TweenSpec};

/// Placement of a child within a timeline (all offsets in milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Position {
    /// Append at the current end
    #[default]
    End,
    /// Offset from the current end
    FromEnd(f32),
    /// Offset from the previous child's start
    FromPrevStart(f32),
    /// Offset from the previous child's end
    FromPrevEnd(f32),
    /// Absolute time
    At(f32),
}

/// Errors from parsing a position parameter
#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid timeline position: {0:?}")]
pub struct PositionParseError(pub String);

/// Parse an optional offset in seconds, returned in milliseconds
fn parse_seconds<'a, E: NomParseError<&'a str>>(input: &'a str) -> IResult<&'a str, f32, E> {
    map(opt(preceded(multispace0, float)), |secs| secs.unwrap_or(0.0) * 1000.0)(input)
}

fn parse_position<'a, E: NomParseError<&'a str>>(input: &'a str) -> IResult<&'a str, Position, E> {
    alt((
        map(preceded(tag("+="), parse_seconds), Position::FromEnd),
        map(preceded(tag("-="), parse_seconds), |ms| Position::FromEnd(-ms)),
        map(preceded(char('<'), parse_seconds), Position::FromPrevStart),
        map(preceded(char('>'), parse_seconds), Position::FromPrevEnd),
        map(float, |secs| Position::At(secs * 1000.0)),
    ))(input)
}

impl FromStr for Position {
    type Err = PositionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        if input.is_empty() {
            return Ok(Position::End);
        }
        all_consuming(delimited(multispace0, parse_position::<NomError<&str>>, multispace0))(input)
            .finish()
            .map(|(_, position)| position)
            .map_err(|_| PositionParseError(input.to_string()))
    }
}

struct TimelineEntry {
    start: f32,
    tween: TweenCore,
}

impl TimelineEntry {
    fn end(&self) -> f32 {
        self.start + self.tween.total_ms()
    }
}

/// An ordered sequence of tweens sharing one playhead
#[derive(Default)]
pub struct Timeline {
    entries: Vec<TimelineEntry>,
    paused: bool,
    time: f32,
    on_start: Option<Callback>,
    on_complete: Option<Callback>,
    on_reverse_complete: Option<Callback>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the timeline paused (it will not play on registration)
    pub fn paused(mut self, paused: bool) -> Self {
        self.paused = paused;
        self
    }

    /// Add a child at `position`
    pub fn then(mut self, spec: TweenSpec, position: Position) -> Self {
        self.push(spec, position);
        self
    }

    /// Add a child at `position`, returning its resolved start time
    pub fn push(&mut self, spec: TweenSpec, position: Position) -> f32 {
        let end = self.duration_ms();
        let (prev_start, prev_end) = self
            .entries
            .last()
            .map(|e| (e.start, e.end()))
            .unwrap_or((0.0, 0.0));

        let at = match position {
            Position::End => end,
            Position::FromEnd(offset) => end + offset,
            Position::FromPrevStart(offset) => prev_start + offset,
            Position::FromPrevEnd(offset) => prev_end + offset,
            Position::At(at) => at,
        };
        let start = at.max(0.0) + spec.delay_ms;

        self.entries.push(TimelineEntry {
            start,
            tween: TweenCore::new(spec),
        });
        start
    }

    pub fn on_start<F: Fn() + Send + Sync + 'static>(mut self, f: F) -> Self {
        self.on_start = Some(Arc::new(f));
        self
    }

    pub fn on_complete<F: Fn() + Send + Sync + 'static>(mut self, f: F) -> Self {
        self.on_complete = Some(Arc::new(f));
        self
    }

    pub fn on_reverse_complete<F: Fn() + Send + Sync + 'static>(mut self, f: F) -> Self {
        self.on_reverse_complete = Some(Arc::new(f));
        self
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// End time of the last-ending child
    pub fn duration_ms(&self) -> f32 {
        self.entries
            .iter()
            .map(TimelineEntry::end)
            .fold(0.0, f32::max)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolved start time of each child, in insertion order
    pub fn starts(&self) -> Vec<f32> {
        self.entries.iter().map(|e| e.start).collect()
    }

    /// All elements animated by any child
    pub fn targets(&self) -> SmallVec<[ElementId; 8]> {
        let mut targets: SmallVec<[ElementId; 8]> = SmallVec::new();
        for entry in &self.entries {
            for target in entry.tween.targets() {
                if !targets.contains(target) {
                    targets.push(*target);
                }
            }
        }
        targets
    }

    pub(crate) fn time(&self) -> f32 {
        self.time
    }

    pub(crate) fn render_initial(&mut self, tree: &mut ElementTree) {
        // Later children are rendered first so the earliest from-state wins
        for entry in self.entries.iter_mut().rev() {
            entry.tween.render_initial(tree);
        }
    }

    pub(crate) fn render(&mut self, time: f32, tree: &mut ElementTree, events: &mut Vec<Callback>) {
        let duration = self.duration_ms();
        let time = time.clamp(0.0, duration);
        let prev = self.time;
        if time == prev {
            return;
        }

        if prev == 0.0 && time > 0.0 {
            events.extend(self.on_start.clone());
        }
        self.time = time;

        if time > prev {
            for entry in self.entries.iter_mut() {
                entry.tween.render(time - entry.start, tree, events);
            }
        } else {
            for entry in self.entries.iter_mut().rev() {
                entry.tween.render(time - entry.start, tree, events);
            }
        }

        if time >= duration && prev < duration {
            events.extend(self.on_complete.clone());
        }
        if time == 0.0 && prev > 0.0 {
            events.extend(self.on_reverse_complete.clone());
        }
    }
}
