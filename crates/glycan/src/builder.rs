//! Text formats shared with the external structure builder
//!
//! The builder is run by the surrounding application, but what it reads (one line of dihedral angles per selected
//! definition) and what it reports back (`FINAL linkage: ... : ...` lines) are derived from, and fed back into, the
//! data handled by this crate.

use std::{fmt, sync::LazyLock};

use log::warn;
use regex::Regex;

use crate::DihedralDefinition;

/// A point picked on a PMF plot, in plot pixels
pub type Pixel = (f64, f64);

// NOTE: Plots are 300px square with a 3px margin on each side, and their axes run from 180 down to -180 degrees
const PLOT_START: f64 = 3.0;
const PLOT_END: f64 = 297.0;
const AXIS_START: f64 = 180.0;
const AXIS_SPAN: f64 = 360.0;

const BUILD_SUCCEEDED: &str = "PDB file Built";
const FINAL_LINKAGE: &str = "FINAL linkage:";

/// Converts a pixel coordinate on a plot axis into an angle in degrees, or `None` if it falls in the margins
#[must_use]
pub fn pixel_to_angle(pixel: f64) -> Option<f64> {
    (PLOT_START..=PLOT_END)
        .contains(&pixel)
        .then(|| AXIS_START - (pixel - PLOT_START) * AXIS_SPAN / (PLOT_END - PLOT_START))
}

/// The (phi, psi) angle pair for a point picked on a plot. The x-axis is drawn mirrored, so phi is negated
#[must_use]
pub fn pixel_to_angles((x, y): Pixel) -> Option<(f64, f64)> {
    Some((-pixel_to_angle(x)?, pixel_to_angle(y)?))
}

/// Writes the builder's dihedral input: one `linkage,angles,phi psi,...` line per selected definition
///
/// `candidates` and `points` are both indexed by connection, and every definition selected for a connection is given
/// all of the points picked on that connection's plot. Points outside of the plotted area are skipped.
#[must_use]
pub fn dihedral_input(candidates: &[Vec<&DihedralDefinition>], points: &[Vec<Pixel>]) -> String {
    let mut input = String::new();
    for (index, definitions) in candidates.iter().enumerate() {
        let angles: Vec<_> = points
            .get(index)
            .into_iter()
            .flatten()
            .filter_map(|&pixel| {
                let angles = pixel_to_angles(pixel);
                if angles.is_none() {
                    warn!("skipping point {pixel:?} on plot {index}, which is outside the plot");
                }
                angles
            })
            .map(|(phi, psi)| format!("{phi:.1} {psi:.1}"))
            .collect();

        for definition in definitions {
            let fields = [definition.linkage(), definition.angles()]
                .into_iter()
                .chain(angles.iter().map(String::as_str));
            input.extend(itertools::intersperse(fields, ","));
            input.push('\n');
        }
    }
    input
}

/// Whether the builder's report announces that a structure was written
#[must_use]
pub fn build_succeeded(report: &str) -> bool {
    report.contains(BUILD_SUCCEEDED)
}

/// The final angles the builder settled on for one linkage
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct FinalLinkage {
    pub linkage: String,
    pub angles: String,
}

impl fmt::Display for FinalLinkage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Linkage: {}, Angles: {}", self.linkage, self.angles)
    }
}

/// Collects every `FINAL linkage: <linkage> : <angles>` line from the builder's report, with atom numbering tags (like
/// `#12`) removed
#[must_use]
pub fn final_linkages(report: &str) -> Vec<FinalLinkage> {
    static ATOM_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#\d+").unwrap());

    report
        .lines()
        .filter_map(|line| line.split_once(FINAL_LINKAGE))
        .filter_map(|(_, details)| details.trim().split_once(':'))
        .map(|(linkage, angles)| {
            let untag = |s: &str| ATOM_TAG_RE.replace_all(s.trim(), "").into_owned();
            FinalLinkage {
                linkage: untag(linkage),
                angles: untag(angles),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    #[test]
    fn test_pixel_to_angle() {
        assert_eq!(pixel_to_angle(3.0), Some(180.0));
        assert_eq!(pixel_to_angle(150.0), Some(0.0));
        assert_eq!(pixel_to_angle(297.0), Some(-180.0));
        // Margins
        assert_eq!(pixel_to_angle(2.9), None);
        assert_eq!(pixel_to_angle(297.5), None);
        assert_eq!(pixel_to_angle(-10.0), None);
    }

    #[test]
    fn test_pixel_to_angles() {
        assert_eq!(pixel_to_angles((3.0, 297.0)), Some((-180.0, -180.0)));
        assert_eq!(pixel_to_angles((150.0, 3.0)), Some((-0.0, 180.0)));
        assert_eq!(pixel_to_angles((0.0, 150.0)), None);
        assert_eq!(pixel_to_angles((150.0, 300.0)), None);
    }

    #[test]
    fn test_dihedral_input() {
        let phi_psi = DihedralDefinition::new("aDGal 1 3 bDGalf", "phi psi");
        let omega = DihedralDefinition::new("bDGalf 1 6 aDMan", "omega");
        let candidates = [vec![&phi_psi], vec![&omega], vec![]];
        let points = [vec![(3.0, 297.0), (1.0, 1.0)], vec![], vec![(150.0, 150.0)]];
        assert_eq!(
            dihedral_input(&candidates, &points),
            indoc! {"
                aDGal 1 3 bDGalf,phi psi,-180.0 -180.0
                bDGalf 1 6 aDMan,omega
            "}
        );
        // Connections without any points still get a line per definition
        assert_eq!(
            dihedral_input(&candidates[..1], &[]),
            "aDGal 1 3 bDGalf,phi psi\n"
        );
    }

    #[test]
    fn test_build_succeeded() {
        assert!(build_succeeded("Reading input\nPDB file Built\n"));
        assert!(!build_succeeded("Reading input\nERROR: clash detected\n"));
    }

    #[test]
    fn test_final_linkages() {
        let report = indoc! {"
            Reading input
            Trial linkage: aDGal 1 3 bDGalf : 60.0 120.0
            FINAL linkage: aDGal#1 1 3 bDGalf#2 : -71.2 102.9
            FINAL linkage: bDGalf#2 1 2 aDMan#3: 55.0 -10.4
            FINAL linkage: malformed
            PDB file Built
        "};
        let linkages = final_linkages(report);
        assert_eq!(
            linkages,
            [
                FinalLinkage {
                    linkage: "aDGal 1 3 bDGalf".to_owned(),
                    angles: "-71.2 102.9".to_owned(),
                },
                FinalLinkage {
                    linkage: "bDGalf 1 2 aDMan".to_owned(),
                    angles: "55.0 -10.4".to_owned(),
                },
            ]
        );
        assert_eq!(
            linkages[0].to_string(),
            "Linkage: aDGal 1 3 bDGalf, Angles: -71.2 102.9"
        );
        assert!(final_linkages("").is_empty());
    }
}
