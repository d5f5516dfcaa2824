//! Headings
//!
//! Symbolic movement intents. Raw heading strings are parsed once into a
//! [`Heading`] and then matched exhaustively by the tick.

use std::fmt;
use std::str::FromStr;

use crate::components::identity::{is_identity_style, normalize_identity};
use crate::components::point::Axis;
use crate::error::SpectrumError;

/// Direction of an axis heading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sign {
    Plus,
    Minus,
}

/// A parsed heading.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Heading {
    /// Stay put
    Affix,
    /// Reserved, currently a no-op
    Home,
    /// Move toward the Keeper
    Origin,
    /// No heading of its own; follow the population default
    Drift,
    /// Move toward another identity
    TowardIdentity(String),
    /// Step along an axis; `Minus` steps the opposite axis up
    AxisMove { axis: Axis, sign: Sign },
}

impl Sign {
    /// The axis that increases when stepping `axis` in this direction.
    pub fn rising(self, axis: Axis) -> Axis {
        match self {
            Sign::Plus => axis,
            Sign::Minus => axis.opposite(),
        }
    }
}

impl Heading {
    /// Parses a heading, accepting any id `is_identity` recognizes as a
    /// movement target.
    ///
    /// Reserved tokens and axis names always win; identity ids are only
    /// considered for strings the grammar rejects.
    pub fn parse_with(
        raw: &str,
        is_identity: impl FnOnce(&str) -> Result<bool, SpectrumError>,
    ) -> Result<Heading, SpectrumError> {
        match raw.parse::<Heading>() {
            Err(SpectrumError::InvalidHeading(_)) => {
                let candidate = normalize_identity(raw);
                if !candidate.is_empty() && is_identity(candidate)? {
                    Ok(Heading::TowardIdentity(candidate.to_string()))
                } else {
                    Err(SpectrumError::InvalidHeading(raw.to_string()))
                }
            }
            parsed => parsed,
        }
    }

    /// Whether this heading may become the population default.
    ///
    /// Drift, affix and identity targets never do, so one popular
    /// "follow X" cannot silently become everyone's heading.
    pub fn counts_toward_default(&self) -> bool {
        !matches!(
            self,
            Heading::Drift | Heading::Affix | Heading::TowardIdentity(_)
        )
    }
}

impl FromStr for Heading {
    type Err = SpectrumError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if is_identity_style(trimmed) {
            let identity = normalize_identity(trimmed);
            if identity.is_empty() {
                return Err(SpectrumError::InvalidHeading(raw.to_string()));
            }
            return Ok(Heading::TowardIdentity(identity.to_string()));
        }

        let token = trimmed.to_lowercase();
        match token.as_str() {
            "" | "drift" => return Ok(Heading::Drift),
            "affix" => return Ok(Heading::Affix),
            "home" => return Ok(Heading::Home),
            "origin" => return Ok(Heading::Origin),
            _ => {}
        }

        let (name, sign) = if let Some(name) = token.strip_suffix('+') {
            (name, Sign::Plus)
        } else if let Some(name) = token.strip_suffix('-') {
            (name, Sign::Minus)
        } else {
            (token.as_str(), Sign::Plus)
        };

        name.parse::<Axis>()
            .map(|axis| Heading::AxisMove { axis, sign })
            .map_err(|_| SpectrumError::InvalidHeading(raw.to_string()))
    }
}

impl fmt::Display for Heading {
    /// Canonical form; parsing it yields the same heading.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Heading::Affix => f.write_str("affix"),
            Heading::Home => f.write_str("home"),
            Heading::Origin => f.write_str("origin"),
            Heading::Drift => f.write_str("drift"),
            Heading::TowardIdentity(identity) => f.write_str(identity),
            Heading::AxisMove { axis, sign } => {
                let suffix = match sign {
                    Sign::Plus => '+',
                    Sign::Minus => '-',
                };
                write!(f, "{}{}", axis, suffix)
            }
        }
    }
}
