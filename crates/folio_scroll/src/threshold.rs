//! Viewport-relative thresholds and toggle-action policies
//!
//! A threshold such as `"top 80%"` pairs an edge of the trigger element
//! with a line in the viewport; the trigger boundary is the scroll offset
//! at which the two meet.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, multispace0, multispace1},
    combinator::{all_consuming, map, opt, value},
    error::{Error as NomError, ParseError as NomParseError},
    number::complete::float,
    sequence::{delimited, preceded, separated_pair, terminated, tuple},
    Finish, IResult,
};

use crate::error::ScrollError;

/// Run `parser` over all of `input`, ignoring surrounding whitespace
fn parse_complete<'a, O>(
    input: &'a str,
    parser: impl FnMut(&'a str) -> IResult<&'a str, O, NomError<&'a str>>,
) -> Result<O, ScrollError> {
    all_consuming(delimited(multispace0, parser, multispace0))(input)
        .finish()
        .map(|(_, out)| out)
        .map_err(|_| ScrollError::ThresholdParse(input.to_string()))
}

/// Parse `top`, `center`, `bottom`, `80%` or `120px`
fn parse_edge<'a, E: NomParseError<&'a str>>(input: &'a str) -> IResult<&'a str, Edge, E> {
    alt((
        value(Edge::Top, tag("top")),
        value(Edge::Center, tag("center")),
        value(Edge::Bottom, tag("bottom")),
        map(terminated(float, char('%')), |pct| Edge::Fraction(pct / 100.0)),
        map(terminated(float, opt(tag("px"))), Edge::Pixels),
    ))(input)
}

/// Parse `<element edge> <viewport edge>`
fn parse_threshold<'a, E: NomParseError<&'a str>>(input: &'a str) -> IResult<&'a str, Threshold, E> {
    map(
        separated_pair(parse_edge, multispace1, parse_edge),
        |(element, viewport)| Threshold::new(element, viewport),
    )(input)
}

/// Parse `+=1800` (optionally `px`) or a threshold
fn parse_end_threshold<'a, E: NomParseError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, EndThreshold, E> {
    alt((
        map(
            preceded(
                tuple((tag("+="), multispace0)),
                terminated(float, opt(tag("px"))),
            ),
            EndThreshold::Distance,
        ),
        map(parse_threshold, EndThreshold::At),
    ))(input)
}

fn parse_toggle_action<'a, E: NomParseError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, ToggleAction, E> {
    alt((
        value(ToggleAction::Play, tag("play")),
        value(ToggleAction::Pause, tag("pause")),
        value(ToggleAction::Resume, tag("resume")),
        value(ToggleAction::Reverse, tag("reverse")),
        value(ToggleAction::Restart, tag("restart")),
        value(ToggleAction::Reset, tag("reset")),
        value(ToggleAction::Complete, tag("complete")),
        value(ToggleAction::None, tag("none")),
    ))(input)
}

/// Parse four whitespace-separated actions
fn parse_toggle_actions<'a, E: NomParseError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, ToggleActions, E> {
    map(
        tuple((
            parse_toggle_action,
            preceded(multispace1, parse_toggle_action),
            preceded(multispace1, parse_toggle_action),
            preceded(multispace1, parse_toggle_action),
        )),
        |(on_enter, on_leave, on_enter_back, on_leave_back)| ToggleActions {
            on_enter,
            on_leave,
            on_enter_back,
            on_leave_back,
        },
    )(input)
}

/// A position along an element's or the viewport's height
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Edge {
    Top,
    Center,
    Bottom,
    /// Fraction of the height (0.8 for `80%`)
    Fraction(f32),
    /// Fixed pixel offset from the top
    Pixels(f32),
}

impl Edge {
    /// Offset of this edge from the top of a box of the given height
    pub fn resolve(&self, height: f32) -> f32 {
        match *self {
            Edge::Top => 0.0,
            Edge::Center => height / 2.0,
            Edge::Bottom => height,
            Edge::Fraction(f) => height * f,
            Edge::Pixels(px) => px,
        }
    }
}

impl FromStr for Edge {
    type Err = ScrollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_complete(s, parse_edge)
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edge::Top => write!(f, "top"),
            Edge::Center => write!(f, "center"),
            Edge::Bottom => write!(f, "bottom"),
            Edge::Fraction(v) => write!(f, "{}%", v * 100.0),
            Edge::Pixels(px) => write!(f, "{}px", px),
        }
    }
}

/// Meeting point of an element edge and a viewport line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold {
    pub element: Edge,
    pub viewport: Edge,
}

impl Threshold {
    pub const fn new(element: Edge, viewport: Edge) -> Self {
        Self { element, viewport }
    }

    /// `"top top"`
    pub const fn top_top() -> Self {
        Self::new(Edge::Top, Edge::Top)
    }

    /// Scroll offset at which the element edge reaches the viewport line
    pub fn scroll_offset(&self, element_top: f32, element_height: f32, viewport_height: f32) -> f32 {
        element_top + self.element.resolve(element_height) - self.viewport.resolve(viewport_height)
    }
}

impl FromStr for Threshold {
    type Err = ScrollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_complete(s, parse_threshold)
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.element, self.viewport)
    }
}

/// Scroll length computed at refresh time
pub type DistanceFn = Arc<dyn Fn() -> f32 + Send + Sync>;

/// Where a trigger's active range ends
#[derive(Clone)]
pub enum EndThreshold {
    /// An element/viewport meeting point, like the start
    At(Threshold),
    /// A fixed scroll length after the start (`"+=1800"`)
    Distance(f32),
    /// A scroll length re-evaluated on every refresh
    Computed(DistanceFn),
}

impl fmt::Debug for EndThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndThreshold::At(t) => write!(f, "At({})", t),
            EndThreshold::Distance(d) => write!(f, "Distance({})", d),
            EndThreshold::Computed(_) => write!(f, "Computed(..)"),
        }
    }
}

impl From<Threshold> for EndThreshold {
    fn from(t: Threshold) -> Self {
        EndThreshold::At(t)
    }
}

impl FromStr for EndThreshold {
    type Err = ScrollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_complete(s, parse_end_threshold)
    }
}

/// Action applied to a trigger's animation on a boundary crossing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToggleAction {
    Play,
    Pause,
    Resume,
    Reverse,
    Restart,
    Reset,
    Complete,
    #[default]
    None,
}

impl FromStr for ToggleAction {
    type Err = ScrollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_complete(s, parse_toggle_action)
    }
}

/// Actions for the four crossings, in `onEnter onLeave onEnterBack onLeaveBack` order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleActions {
    pub on_enter: ToggleAction,
    pub on_leave: ToggleAction,
    pub on_enter_back: ToggleAction,
    pub on_leave_back: ToggleAction,
}

impl ToggleActions {
    /// `"play none none reverse"`: play on the way down, rewind on the way back up
    pub const fn play_reverse() -> Self {
        Self {
            on_enter: ToggleAction::Play,
            on_leave: ToggleAction::None,
            on_enter_back: ToggleAction::None,
            on_leave_back: ToggleAction::Reverse,
        }
    }
}

impl Default for ToggleActions {
    /// `"play none none none"`
    fn default() -> Self {
        Self {
            on_enter: ToggleAction::Play,
            on_leave: ToggleAction::None,
            on_enter_back: ToggleAction::None,
            on_leave_back: ToggleAction::None,
        }
    }
}

impl FromStr for ToggleActions {
    type Err = ScrollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_complete(s, parse_toggle_actions)
    }
}

/// How scroll progress drives a trigger's animation
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Scrub {
    /// Toggle actions only
    #[default]
    Off,
    /// Progress follows scroll exactly
    Immediate,
    /// Progress catches up over roughly this many seconds
    Smoothed(f32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_parse() {
        let t: Threshold = "top 80%".parse().unwrap();
        assert_eq!(t.element, Edge::Top);
        assert_eq!(t.viewport, Edge::Fraction(0.8));

        let t: Threshold = "bottom bottom".parse().unwrap();
        assert_eq!(t, Threshold::new(Edge::Bottom, Edge::Bottom));

        assert!("top".parse::<Threshold>().is_err());
        assert!("top 80% extra".parse::<Threshold>().is_err());
        assert!("middle top".parse::<Threshold>().is_err());
    }

    #[test]
    fn test_threshold_scroll_offset() {
        // An 800px section at y=2000 in a 1000px viewport
        let start: Threshold = "top 80%".parse().unwrap();
        assert_eq!(start.scroll_offset(2000.0, 800.0, 1000.0), 1200.0);

        let end: Threshold = "bottom 20%".parse().unwrap();
        assert_eq!(end.scroll_offset(2000.0, 800.0, 1000.0), 2600.0);
    }

    #[test]
    fn test_end_threshold_parse() {
        assert!(matches!(
            "+=1800".parse::<EndThreshold>(),
            Ok(EndThreshold::Distance(d)) if d == 1800.0
        ));
        assert!(matches!(
            "bottom 20%".parse::<EndThreshold>(),
            Ok(EndThreshold::At(_))
        ));
        assert!(matches!(
            " += 600px ".parse::<EndThreshold>(),
            Ok(EndThreshold::Distance(d)) if d == 600.0
        ));
        assert!("+=far".parse::<EndThreshold>().is_err());
        assert!("+=1800 extra".parse::<EndThreshold>().is_err());
    }

    #[test]
    fn test_edge_parse() {
        assert_eq!("center".parse::<Edge>(), Ok(Edge::Center));
        assert_eq!("120px".parse::<Edge>(), Ok(Edge::Pixels(120.0)));
        assert_eq!("120".parse::<Edge>(), Ok(Edge::Pixels(120.0)));
        assert_eq!("50%".parse::<Edge>(), Ok(Edge::Fraction(0.5)));
        assert!("topx".parse::<Edge>().is_err());
        assert!("50%%".parse::<Edge>().is_err());
    }

    #[test]
    fn test_toggle_actions_parse() {
        let actions: ToggleActions = "play none none reverse".parse().unwrap();
        assert_eq!(actions, ToggleActions::play_reverse());
        assert!("play none".parse::<ToggleActions>().is_err());
        assert!("play none none rewind".parse::<ToggleActions>().is_err());
        assert!("play none none reverse none".parse::<ToggleActions>().is_err());
        assert!("playnone none none".parse::<ToggleActions>().is_err());
    }
}
