//! A permissive scanner for CASPER-style glycan sequences
//!
//! Residues and linkages are picked out of the sequence independently: linkages are every `digit "->" digit` span,
//! and residues are the text written between a `)` and the next `(`. Anything that doesn't start one of those spans is
//! skipped a character at a time, so unbalanced brackets silently end the scan rather than raising an error.

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, take_until},
    character::complete::{anychar, char, satisfy},
    combinator::{map, value},
    multi::many0,
    sequence::{delimited, separated_pair},
};

use crate::{Linkage, Position, Residue, Sequence, Topology, errors::MalformedSequence};

/// Marks the start of a repeating unit, like `->4)bDGlcp(1->4)bDGlcp(1->`
const CYCLIC_MARKER: char = '-';

// NOTE: Offsets (in characters) of the ring positions that close a repeating unit. The donor is read from the end of
// the sequence and the acceptor from the start
const CLOSING_DONOR_FROM_END: usize = 3;
const CLOSING_ACCEPTOR: usize = 2;

/// Parses a glycan sequence into its residues and linkages
///
/// # Errors
///
/// Fails if the sequence is empty (after trimming whitespace), or if it is a repeating unit whose ring-closing
/// positions can't be found.
pub fn parse(sequence: impl AsRef<str>) -> Result<Sequence, MalformedSequence> {
    let sequence = sequence.as_ref().trim();
    if sequence.is_empty() {
        return Err(MalformedSequence::Empty);
    }

    let topology = if sequence.starts_with(CYCLIC_MARKER) {
        Topology::Cyclic
    } else {
        Topology::Linear
    };

    // NOTE: A linear sequence usually doesn't start or end with a linkage, so its first and last residues would have
    // no `)` or `(` to delimit them without this wrapping
    let residues = match topology {
        Topology::Linear => scan_residues(&format!("){sequence}(")),
        Topology::Cyclic => scan_residues(sequence),
    };

    let mut linkages = scan_linkages(sequence);
    if topology == Topology::Cyclic {
        linkages.push(ring_closure(sequence)?);
    }

    Ok(Sequence::new(residues, linkages, topology))
}

// Scanners ============================================================================================================

// NOTE: Both scanners fall back to `anychar`, so they can only stop at the end of their input. The `unwrap_or_default`
// is there to satisfy the types, not to hide a real failure
fn scan_residues(i: &str) -> Vec<Residue> {
    residues(i)
        .map(|(_, found)| found.into_iter().map(Residue::from).collect())
        .unwrap_or_default()
}

fn scan_linkages(i: &str) -> Vec<Linkage> {
    linkages(i).map(|(_, found)| found).unwrap_or_default()
}

fn ring_closure(sequence: &str) -> Result<Linkage, MalformedSequence> {
    let chars: Vec<_> = sequence.char_indices().collect();
    let donor_index = chars.len().checked_sub(CLOSING_DONOR_FROM_END);
    let position_at = |index: Option<usize>| {
        let &(offset, c) = index.and_then(|index| chars.get(index)).ok_or_else(|| {
            MalformedSequence::ring_closure(sequence, sequence.len()..sequence.len())
        })?;
        c.to_digit(10)
            .and_then(|d| Position::try_from(d).ok())
            .ok_or_else(|| MalformedSequence::ring_closure(sequence, offset..offset + c.len_utf8()))
    };

    let donor = position_at(donor_index)?;
    let acceptor = position_at(Some(CLOSING_ACCEPTOR))?;
    Ok(Linkage::new(donor, acceptor))
}

// Parsers =============================================================================================================

/// Residues = { Residue | any character } ;
fn residues(i: &str) -> IResult<&str, Vec<&str>> {
    let parser = many0(alt((map(residue, Some), value(None, anychar))));
    map(parser, |found: Vec<Option<&str>>| found.into_iter().flatten().collect())(i)
}

/// Residue = ")" , { any character - "(" } , "(" ;
fn residue(i: &str) -> IResult<&str, &str> {
    delimited(char(')'), take_until("("), char('('))(i)
}

/// Linkages = { Linkage | any character } ;
fn linkages(i: &str) -> IResult<&str, Vec<Linkage>> {
    let parser = many0(alt((map(linkage, Some), value(None, anychar))));
    map(parser, |found: Vec<Option<Linkage>>| found.into_iter().flatten().collect())(i)
}

/// Linkage = Position , "->" , Position ;
fn linkage(i: &str) -> IResult<&str, Linkage> {
    let parser = separated_pair(position, tag("->"), position);
    map(parser, |(donor, acceptor): (Position, Position)| {
        Linkage::new(donor, acceptor)
    })(i)
}

/// Position = digit ;
fn position(i: &str) -> IResult<&str, Position> {
    map(satisfy(|c| c.is_ascii_digit()), |c: char| c as Position - b'0')(i)
}

#[cfg(test)]
mod tests {
    use insta::assert_debug_snapshot;

    use super::*;

    fn strings<T: ToString>(items: &[T]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_position() {
        // Valid Positions
        for (c, p) in ('0'..='9').zip(0..) {
            assert_eq!(position(&c.to_string()), Ok(("", p)));
        }
        // Invalid Positions
        assert!(position("a").is_err());
        assert!(position("-").is_err());
        assert!(position("").is_err());
        // Only one digit is consumed
        assert_eq!(position("13"), Ok(("3", 1)));
    }

    #[test]
    fn test_linkage() {
        // Valid Linkages
        assert_eq!(linkage("1->3"), Ok(("", Linkage::new(1, 3))));
        assert_eq!(linkage("2->6)aDMan"), Ok((")aDMan", Linkage::new(2, 6))));
        // Invalid Linkages
        assert!(linkage("1-3").is_err());
        assert!(linkage("1->").is_err());
        assert!(linkage("->4").is_err());
        assert!(linkage("a->3").is_err());
        assert!(linkage("13->4").is_err());
    }

    #[test]
    fn test_residue() {
        // Valid Residues
        assert_eq!(residue(")aDGal("), Ok(("", "aDGal")));
        assert_eq!(residue(")bDGalf(1->2)"), Ok(("1->2)", "bDGalf")));
        assert_eq!(residue(")("), Ok(("", "")));
        // Everything up to the next opening bracket is taken, closing brackets included
        assert_eq!(residue(")a)b("), Ok(("", "a)b")));
        // Invalid Residues
        assert!(residue("aDGal(").is_err());
        assert!(residue(")aDGal").is_err());
    }

    #[test]
    fn test_linkages() {
        assert_eq!(linkages(""), Ok(("", Vec::new())));
        assert_eq!(
            linkages("aDGal(1->3)bDGalf(1->2)aDMan"),
            Ok(("", vec![Linkage::new(1, 3), Linkage::new(1, 2)]))
        );
        // Spans never overlap, and half-written linkages are ignored
        assert_eq!(
            linkages("->4)bDGlcp(1->4)bDGlcp(1->"),
            Ok(("", vec![Linkage::new(1, 4)]))
        );
    }

    #[test]
    fn linear_sequence() {
        let sequence = parse("aDGal(1->3)bDGalf(1->2)aDMan").unwrap();
        assert_eq!(sequence.topology(), Topology::Linear);
        assert_debug_snapshot!(strings(sequence.residues()), @r#"
        [
            "aDGal",
            "bDGalf",
            "aDMan",
        ]
        "#);
        assert_debug_snapshot!(strings(sequence.linkages()), @r#"
        [
            "1->3",
            "1->2",
        ]
        "#);
        assert_eq!(
            strings(&sequence.connections()),
            ["aDGal13bDGalf", "bDGalf12aDMan"]
        );
    }

    #[test]
    fn linear_linkage_count() {
        for (input, residue_count) in [
            ("aDMan", 1),
            ("aLFuc(1->3)bDGalNAc", 2),
            ("aDGal(1->3)bDGalf(1->2)aDMan", 3),
            ("bDGlcp(1->4)bDGlcp(1->4)bDGlcp(1->4)bDGlcp", 4),
        ] {
            let sequence = parse(input).unwrap();
            assert_eq!(sequence.residues().len(), residue_count, "{input}");
            assert_eq!(sequence.linkages().len(), residue_count - 1, "{input}");
        }
    }

    #[test]
    fn surrounding_whitespace() {
        let padded = parse("  aLFuc(1->3)bDGalNAc\n").unwrap();
        assert_eq!(padded, parse("aLFuc(1->3)bDGalNAc").unwrap());
    }

    #[test]
    fn empty_sequence() {
        assert_eq!(parse(""), Err(MalformedSequence::Empty));
        assert_eq!(parse(" \t "), Err(MalformedSequence::Empty));
    }

    #[test]
    fn residues_without_brackets() {
        let sequence = parse("aDGal").unwrap();
        assert_eq!(strings(sequence.residues()), ["aDGal"]);
        assert!(sequence.linkages().is_empty());
        assert!(sequence.connections().is_empty());
    }

    #[test]
    fn unbalanced_brackets() {
        // The unmatched `(` ends the final residue early, and the dangling `)` span is skipped
        let sequence = parse("aDGal(1->3)bDGalf(1->2").unwrap();
        assert_eq!(strings(sequence.residues()), ["aDGal", "bDGalf"]);
        assert_eq!(strings(sequence.linkages()), ["1->3", "1->2"]);
        assert_eq!(strings(&sequence.connections()), ["aDGal13bDGalf"]);
    }

    #[test]
    fn cyclic_sequence() {
        let sequence = parse("->4)bDGlcp(1->4)aDGlcp(1->3)bDGal(1->").unwrap();
        assert_eq!(sequence.topology(), Topology::Cyclic);
        assert_eq!(strings(sequence.residues()), ["bDGlcp", "aDGlcp", "bDGal"]);
        // The ring-closing linkage is appended after the written ones
        assert_eq!(strings(sequence.linkages()), ["1->4", "1->3", "1->4"]);
        let residues = sequence.residues();
        let closing = sequence.connections().pop().unwrap();
        assert_eq!(
            closing.to_string(),
            format!("{}14{}", residues[residues.len() - 1], residues[0])
        );
    }

    #[test]
    fn ring_closure_errors() {
        assert!(matches!(
            parse("-"),
            Err(MalformedSequence::RingClosure { .. })
        ));
        let Err(MalformedSequence::RingClosure { at, .. }) = parse("-4)bDGlcp(1->4)bDGlcp(1->")
        else {
            panic!("expected a ring closure error");
        };
        // Points at the `)` where the acceptor position should have been
        assert_eq!(at.offset(), 2);
        assert_eq!(at.len(), 1);
    }
}
