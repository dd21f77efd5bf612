//! Easing functions
//!
//! Curves map normalized progress (0..1) to eased progress. They can be
//! parsed from the usual string names (`"power2.out"`, `"back.out(1.7)"`,
//! `"elastic.out(1, 0.5)"`, `"none"`).

use std::f32::consts::{PI, TAU};
use std::fmt;
use std::str::FromStr;

use nom::{
    character::complete::{alpha1, alphanumeric1, char, multispace0},
    combinator::{all_consuming, opt},
    error::{Error as NomError, ParseError as NomParseError},
    multi::separated_list0,
    number::complete::float,
    sequence::{delimited, pair, preceded, tuple},
    Finish, IResult,
};
use thiserror::Error;

/// Overshoot used by `back` curves when none is given
pub const DEFAULT_BACK_OVERSHOOT: f32 = 1.70158;

/// Easing curve
///
/// `Power*(n)` follows the power0..power4 naming: `n` is one less than the
/// polynomial exponent, so `PowerOut(2)` is a cubic ease-out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Easing {
    Linear,
    PowerIn(u8),
    PowerOut(u8),
    PowerInOut(u8),
    BackIn(f32),
    BackOut(f32),
    ElasticOut { amplitude: f32, period: f32 },
    SineInOut,
}

impl Default for Easing {
    fn default() -> Self {
        Easing::PowerOut(1)
    }
}

impl Easing {
    /// Apply the easing to progress `t`, clamped to 0..1
    ///
    /// The endpoints are exact: `apply(0.0) == 0.0` and `apply(1.0) == 1.0`.
    pub fn apply(&self, t: f32) -> f32 {
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        match *self {
            Easing::Linear => t,
            Easing::PowerIn(n) => t.powi(n as i32 + 1),
            Easing::PowerOut(n) => 1.0 - (1.0 - t).powi(n as i32 + 1),
            Easing::PowerInOut(n) => {
                let exp = n as i32 + 1;
                if t < 0.5 {
                    (2.0 * t).powi(exp) / 2.0
                } else {
                    1.0 - (2.0 * (1.0 - t)).powi(exp) / 2.0
                }
            }
            Easing::BackIn(s) => t * t * ((s + 1.0) * t - s),
            Easing::BackOut(s) => {
                let u = t - 1.0;
                u * u * ((s + 1.0) * u + s) + 1.0
            }
            Easing::ElasticOut { amplitude, period } => {
                let amplitude = amplitude.max(1.0);
                let p2 = period.max(f32::EPSILON) / TAU;
                let p3 = p2 * (1.0 / amplitude).asin();
                amplitude * 2f32.powf(-10.0 * t) * ((t - p3) / p2).sin() + 1.0
            }
            Easing::SineInOut => -((PI * t).cos() - 1.0) / 2.0,
        }
    }
}

/// Errors from parsing an easing name
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EasingParseError {
    #[error("unknown easing: {0}")]
    Unknown(String),

    #[error("invalid easing parameters in {0}")]
    Parameters(String),
}

/// Parse `family` or `family.variant`
fn parse_easing_name<'a, E: NomParseError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, (&'a str, Option<&'a str>), E> {
    pair(alphanumeric1, opt(preceded(char('.'), alpha1)))(input)
}

/// Parse a parenthesised, comma-separated parameter list: `(1, 0.5)`
fn parse_easing_params<'a, E: NomParseError<&'a str>>(input: &'a str) -> IResult<&'a str, Vec<f32>, E> {
    delimited(
        pair(char('('), multispace0),
        separated_list0(tuple((multispace0, char(','), multispace0)), float),
        pair(multispace0, char(')')),
    )(input)
}

fn easing_from_parts(family: &str, variant: &str, params: &[f32]) -> Option<Easing> {
    let easing = match (family, variant) {
        ("none" | "linear" | "power0", _) => Easing::Linear,
        ("power1", "in") => Easing::PowerIn(1),
        ("power2", "in") => Easing::PowerIn(2),
        ("power3", "in") => Easing::PowerIn(3),
        ("power4", "in") => Easing::PowerIn(4),
        ("power1", "out") => Easing::PowerOut(1),
        ("power2", "out") => Easing::PowerOut(2),
        ("power3", "out") => Easing::PowerOut(3),
        ("power4", "out") => Easing::PowerOut(4),
        ("power1", "inOut") => Easing::PowerInOut(1),
        ("power2", "inOut") => Easing::PowerInOut(2),
        ("power3", "inOut") => Easing::PowerInOut(3),
        ("power4", "inOut") => Easing::PowerInOut(4),
        ("back", "in") => Easing::BackIn(params.first().copied().unwrap_or(DEFAULT_BACK_OVERSHOOT)),
        ("back", "out") => Easing::BackOut(params.first().copied().unwrap_or(DEFAULT_BACK_OVERSHOOT)),
        ("elastic", "out") => Easing::ElasticOut {
            amplitude: params.first().copied().unwrap_or(1.0),
            period: params.get(1).copied().unwrap_or(0.3),
        },
        ("sine", "inOut") => Easing::SineInOut,
        _ => return None,
    };
    Some(easing)
}

impl FromStr for Easing {
    type Err = EasingParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let (rest, (family, variant)) = parse_easing_name::<NomError<&str>>(input)
            .finish()
            .map_err(|_| EasingParseError::Unknown(input.to_string()))?;

        let params = if rest.is_empty() {
            Vec::new()
        } else {
            all_consuming(parse_easing_params::<NomError<&str>>)(rest)
                .finish()
                .map(|(_, params)| params)
                .map_err(|_| EasingParseError::Parameters(input.to_string()))?
        };

        easing_from_parts(family, variant.unwrap_or("out"), &params)
            .ok_or_else(|| EasingParseError::Unknown(input.to_string()))
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Easing::Linear => write!(f, "none"),
            Easing::PowerIn(n) => write!(f, "power{}.in", n),
            Easing::PowerOut(n) => write!(f, "power{}.out", n),
            Easing::PowerInOut(n) => write!(f, "power{}.inOut", n),
            Easing::BackIn(s) => write!(f, "back.in({})", s),
            Easing::BackOut(s) => write!(f, "back.out({})", s),
            Easing::ElasticOut { amplitude, period } => {
                write!(f, "elastic.out({}, {})", amplitude, period)
            }
            Easing::SineInOut => write!(f, "sine.inOut"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 8] = [
        Easing::Linear,
        Easing::PowerIn(2),
        Easing::PowerOut(3),
        Easing::PowerInOut(2),
        Easing::BackIn(1.7),
        Easing::BackOut(1.7),
        Easing::ElasticOut {
            amplitude: 1.0,
            period: 0.5,
        },
        Easing::SineInOut,
    ];

    #[test]
    fn test_easing_endpoints() {
        for easing in ALL {
            assert_eq!(easing.apply(0.0), 0.0, "{easing}");
            assert_eq!(easing.apply(1.0), 1.0, "{easing}");
            assert_eq!(easing.apply(-1.0), 0.0, "{easing}");
            assert_eq!(easing.apply(2.0), 1.0, "{easing}");
        }
    }

    #[test]
    fn test_easing_shapes() {
        assert_eq!(Easing::Linear.apply(0.5), 0.5);
        assert!(Easing::PowerOut(2).apply(0.5) > 0.5);
        assert!(Easing::PowerIn(2).apply(0.5) < 0.5);
        assert!((Easing::PowerInOut(2).apply(0.5) - 0.5).abs() < 1e-6);
        // back.out overshoots before settling
        assert!(Easing::BackOut(1.7).apply(0.7) > 1.0);
    }

    #[test]
    fn test_easing_parse() {
        assert_eq!("none".parse::<Easing>(), Ok(Easing::Linear));
        assert_eq!("power2.out".parse::<Easing>(), Ok(Easing::PowerOut(2)));
        assert_eq!("power3.inOut".parse::<Easing>(), Ok(Easing::PowerInOut(3)));
        assert_eq!("power1".parse::<Easing>(), Ok(Easing::PowerOut(1)));
        assert_eq!("back.out(1.7)".parse::<Easing>(), Ok(Easing::BackOut(1.7)));
        assert_eq!(
            "elastic.out(1, 0.5)".parse::<Easing>(),
            Ok(Easing::ElasticOut {
                amplitude: 1.0,
                period: 0.5
            })
        );
        assert_eq!("sine.inOut".parse::<Easing>(), Ok(Easing::SineInOut));
    }

    #[test]
    fn test_easing_parse_errors() {
        assert!(matches!(
            "bounce.out".parse::<Easing>(),
            Err(EasingParseError::Unknown(_))
        ));
        assert!(matches!(
            "back.out(x)".parse::<Easing>(),
            Err(EasingParseError::Parameters(_))
        ));
        assert!(matches!(
            "power2.sideways".parse::<Easing>(),
            Err(EasingParseError::Unknown(_))
        ));
        assert!(matches!(
            "back.out(1.7)junk".parse::<Easing>(),
            Err(EasingParseError::Parameters(_))
        ));
        assert!(matches!(
            "elastic.out(1, 0.5".parse::<Easing>(),
            Err(EasingParseError::Parameters(_))
        ));
        assert!(matches!(
            "power5.out".parse::<Easing>(),
            Err(EasingParseError::Unknown(_))
        ));
    }

    #[test]
    fn test_easing_display_parses_back() {
        for easing in [Easing::PowerInOut(3), Easing::BackOut(1.7), Easing::Linear] {
            assert_eq!(easing.to_string().parse::<Easing>(), Ok(easing));
        }
    }
}
