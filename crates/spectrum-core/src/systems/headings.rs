//! Heading Resolution
//!
//! The population default heading, and what each identity actually does
//! this tick.

use std::collections::BTreeMap;

use crate::components::heading::Heading;
use crate::components::point::Axis;

/// The most common eligible heading among the stored ones.
///
/// Absent, unparseable, drift, affix and identity headings are ignored.
/// Ties go to the lexicographically smallest canonical form.
pub fn default_heading<'a>(stored: impl IntoIterator<Item = &'a str>) -> Option<Heading> {
    let mut counts: BTreeMap<String, (usize, Heading)> = BTreeMap::new();
    for raw in stored {
        let Ok(heading) = raw.parse::<Heading>() else {
            continue;
        };
        if !heading.counts_toward_default() {
            continue;
        }
        counts
            .entry(heading.to_string())
            .or_insert((0, heading))
            .0 += 1;
    }

    // BTreeMap iterates in canonical order, so the first maximum wins ties.
    let mut best: Option<(usize, Heading)> = None;
    for (count, heading) in counts.into_values() {
        if best.as_ref().map_or(true, |(top, _)| count > *top) {
            best = Some((count, heading));
        }
    }
    best.map(|(_, heading)| heading)
}

/// What an identity does this tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectiveHeading {
    /// Move toward an identity; `origin` targets the Keeper
    Toward { target: String, heading: String },
    /// Raise one axis
    Step { axis: Axis, heading: String },
    /// Affix or home
    Hold,
    /// No own heading and no default
    Drifting,
    /// The stored heading does not parse
    Invalid(String),
}

impl EffectiveHeading {
    fn from_heading(heading: Heading, keeper: &str) -> Self {
        let canonical = heading.to_string();
        match heading {
            Heading::Affix | Heading::Home => EffectiveHeading::Hold,
            Heading::Drift => EffectiveHeading::Drifting,
            Heading::Origin => EffectiveHeading::Toward {
                target: keeper.to_string(),
                heading: canonical,
            },
            Heading::TowardIdentity(target) => EffectiveHeading::Toward {
                target,
                heading: canonical,
            },
            Heading::AxisMove { axis, sign } => EffectiveHeading::Step {
                axis: sign.rising(axis),
                heading: canonical,
            },
        }
    }
}

/// Resolves an identity's stored heading against the tick's default.
///
/// Stored strings outside the heading grammar follow an identity when
/// `is_identity` knows them.
pub fn resolve(
    own: Option<&str>,
    default: Option<&Heading>,
    keeper: &str,
    is_identity: impl Fn(&str) -> bool,
) -> EffectiveHeading {
    let parsed = match own {
        None => Ok(Heading::Drift),
        Some(raw) => Heading::parse_with(raw, |id| Ok(is_identity(id))),
    };
    match parsed {
        Ok(Heading::Drift) => match default {
            Some(heading) => EffectiveHeading::from_heading(heading.clone(), keeper),
            None => EffectiveHeading::Drifting,
        },
        Ok(heading) => EffectiveHeading::from_heading(heading, keeper),
        Err(_) => EffectiveHeading::Invalid(own.unwrap_or_default().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::heading::Sign;

    #[test]
    fn test_default_is_most_common() {
        let stored = ["entropy+", "origin", "entropy+", "affix", "affix", "affix"];
        assert_eq!(
            default_heading(stored),
            Some(Heading::AxisMove {
                axis: Axis::Entropy,
                sign: Sign::Plus
            })
        );
    }

    #[test]
    fn test_default_ignores_ineligible() {
        let stored = ["drift", "affix", "a@b.c", "a@b.c", "nonsense"];
        assert_eq!(default_heading(stored), None);
    }

    #[test]
    fn test_default_counts_canonical_forms() {
        let stored = ["Entropy", "entropy+", "origin"];
        assert_eq!(default_heading(stored).unwrap().to_string(), "entropy+");
    }

    #[test]
    fn test_default_tie_breaks_lexicographically() {
        let stored = ["skeptic+", "origin", "liberty-", "skeptic+", "origin", "liberty-"];
        assert_eq!(default_heading(stored).unwrap().to_string(), "liberty-");
    }

    #[test]
    fn test_resolve() {
        const KEEPER: &str = "keeper@spectrum.local";
        let default = Heading::Origin;
        let nobody = |_: &str| false;
        let to_keeper = EffectiveHeading::Toward {
            target: KEEPER.into(),
            heading: "origin".into(),
        };
        assert_eq!(resolve(None, Some(&default), KEEPER, nobody), to_keeper);
        assert_eq!(resolve(Some("drift"), Some(&default), KEEPER, nobody), to_keeper);
        assert_eq!(resolve(None, None, KEEPER, nobody), EffectiveHeading::Drifting);
        assert_eq!(
            resolve(Some("affix"), Some(&default), KEEPER, nobody),
            EffectiveHeading::Hold
        );
        assert_eq!(resolve(Some("home"), None, KEEPER, nobody), EffectiveHeading::Hold);
        assert_eq!(
            resolve(Some("upward"), Some(&default), KEEPER, nobody),
            EffectiveHeading::Invalid("upward".into())
        );
    }

    #[test]
    fn test_resolve_axis_step() {
        assert_eq!(
            resolve(Some("entropy-"), None, "k@x.y", |_| false),
            EffectiveHeading::Step {
                axis: Axis::Oblivion,
                heading: "entropy-".into()
            }
        );
    }

    #[test]
    fn test_resolve_directory_id_without_at() {
        let known = |id: &str| id == "did:plc:bob";
        assert_eq!(
            resolve(Some("did:plc:bob"), None, "k@x.y", known),
            EffectiveHeading::Toward {
                target: "did:plc:bob".into(),
                heading: "did:plc:bob".into()
            }
        );
        assert_eq!(
            resolve(Some("did:plc:zed"), None, "k@x.y", known),
            EffectiveHeading::Invalid("did:plc:zed".into())
        );
    }
}
