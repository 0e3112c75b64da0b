//! Builds the connection keys that address PMF datasets, and collapses them into an ordered set

use std::{iter, ops::Deref};

use itertools::Itertools;

use crate::{Connection, ConnectionSet, Linkage, Residue, Topology};

/// Pairs each linkage with the residues on either side of it, producing one `Connection` per linkage
///
/// For a `Cyclic` topology the final linkage closes the ring, so it pairs the last residue with the first. Any surplus
/// residues or linkages are ignored: the shorter of the two bounds the output.
#[must_use]
pub fn build(residues: &[Residue], linkages: &[Linkage], topology: Topology) -> Vec<Connection> {
    let pairs = match topology {
        Topology::Linear => residues.len().saturating_sub(1),
        Topology::Cyclic => residues.len(),
    };
    let acceptors = residues.iter().cycle().skip(1);

    iter::zip(residues, acceptors)
        .take(pairs)
        .zip(linkages)
        .map(|((donor, acceptor), &linkage)| Connection::new(donor, linkage, acceptor))
        .collect()
}

impl Connection {
    #[must_use]
    pub fn new(donor: &Residue, linkage: Linkage, acceptor: &Residue) -> Self {
        Self(format!("{donor}{}{acceptor}", linkage.positions()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Connection {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Connection {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<Connection> for String {
    fn from(value: Connection) -> Self {
        value.0
    }
}

impl AsRef<str> for Connection {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl ConnectionSet {
    /// The index of a connection, which is also the index its plot and saved points are tagged with
    #[must_use]
    pub fn position(&self, connection: &Connection) -> Option<usize> {
        self.0.iter().position(|c| c == connection)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Connection] {
        &self.0
    }
}

impl Deref for ConnectionSet {
    type Target = [Connection];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

// NOTE: `unique()` keeps the first occurrence of each connection and drops the rest, so the set's order is the order
// of first appearance
impl FromIterator<Connection> for ConnectionSet {
    fn from_iter<T: IntoIterator<Item = Connection>>(iter: T) -> Self {
        Self(iter.into_iter().unique().collect())
    }
}

impl IntoIterator for ConnectionSet {
    type Item = Connection;
    type IntoIter = std::vec::IntoIter<Connection>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ConnectionSet {
    type Item = &'a Connection;
    type IntoIter = std::slice::Iter<'a, Connection>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_debug_snapshot;

    use super::*;

    fn residues(abbrs: &[&str]) -> Vec<Residue> {
        abbrs.iter().copied().map(Residue::from).collect()
    }

    fn keys(connections: &[Connection]) -> Vec<&str> {
        connections.iter().map(Connection::as_str).collect()
    }

    #[test]
    fn linear_connections() {
        let residues = residues(&["aDGal", "bDGalf", "aDMan"]);
        let linkages = [Linkage::new(1, 3), Linkage::new(1, 2)];
        let connections = build(&residues, &linkages, Topology::Linear);
        assert_eq!(keys(&connections), ["aDGal13bDGalf", "bDGalf12aDMan"]);
    }

    #[test]
    fn cyclic_connections() {
        let residues = residues(&["bDGlcp", "aDGlcp", "bDGal"]);
        let linkages = [Linkage::new(1, 4), Linkage::new(1, 3), Linkage::new(1, 4)];
        let connections = build(&residues, &linkages, Topology::Cyclic);
        assert_debug_snapshot!(keys(&connections), @r#"
        [
            "bDGlcp14aDGlcp",
            "aDGlcp13bDGal",
            "bDGal14bDGlcp",
        ]
        "#);
    }

    #[test]
    fn mismatched_lengths() {
        let residues = residues(&["aDGal", "bDGalf", "aDMan"]);
        // Too few linkages
        let connections = build(&residues, &[Linkage::new(1, 3)], Topology::Linear);
        assert_eq!(keys(&connections), ["aDGal13bDGalf"]);
        // Too many linkages
        let linkages = [Linkage::new(1, 3), Linkage::new(1, 2), Linkage::new(1, 6)];
        let connections = build(&residues, &linkages, Topology::Linear);
        assert_eq!(keys(&connections), ["aDGal13bDGalf", "bDGalf12aDMan"]);
        // Nothing to pair
        assert!(build(&[], &linkages, Topology::Cyclic).is_empty());
        assert!(build(&residues[..1], &linkages, Topology::Linear).is_empty());
    }

    #[test]
    fn connections_are_values() {
        let gal = Residue::from("aDGal");
        let galf = Residue::from("bDGalf");
        let built = Connection::new(&gal, Linkage::new(1, 3), &galf);
        assert_eq!(built, Connection::from("aDGal13bDGalf"));
        assert_ne!(built, Connection::new(&gal, Linkage::new(1, 4), &galf));
        assert_ne!(built, Connection::new(&galf, Linkage::new(1, 3), &gal));
        assert_eq!(String::from(built), "aDGal13bDGalf");
    }

    #[test]
    fn first_occurrence_order() {
        let set: ConnectionSet = ["b", "a", "b", "c", "a", "d"]
            .into_iter()
            .map(Connection::from)
            .collect();
        assert_eq!(keys(&set), ["b", "a", "c", "d"]);
        assert_eq!(set.len(), 4);
        assert_eq!(set.position(&Connection::from("c")), Some(2));
        assert_eq!(set.position(&Connection::from("e")), None);
    }

    #[test]
    fn repeated_residues() {
        let sequence = crate::parse("bDGlcp(1->4)bDGlcp(1->4)bDGlcp(1->6)aDMan").unwrap();
        assert_eq!(sequence.connections().len(), 3);
        assert_eq!(
            keys(&sequence.connection_set()),
            ["bDGlcp14bDGlcp", "bDGlcp16aDMan"]
        );
    }
}
