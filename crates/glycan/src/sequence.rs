use std::str::FromStr;

use crate::{
    Connection, ConnectionSet, Linkage, Position, Residue, Sequence, Topology, connection,
    errors::MalformedSequence, parser,
};

impl Residue {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Residue {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Residue {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl AsRef<str> for Residue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Linkage {
    #[must_use]
    pub const fn new(donor: Position, acceptor: Position) -> Self {
        Self { donor, acceptor }
    }

    #[must_use]
    pub const fn donor(&self) -> Position {
        self.donor
    }

    #[must_use]
    pub const fn acceptor(&self) -> Position {
        self.acceptor
    }

    /// The linkage with its arrow removed, as it appears inside a `Connection` (`1->3` becomes `13`)
    #[must_use]
    pub fn positions(&self) -> String {
        format!("{}{}", self.donor, self.acceptor)
    }
}

impl Sequence {
    pub(crate) const fn new(
        residues: Vec<Residue>,
        linkages: Vec<Linkage>,
        topology: Topology,
    ) -> Self {
        Self {
            residues,
            linkages,
            topology,
        }
    }

    #[must_use]
    pub fn residues(&self) -> &[Residue] {
        &self.residues
    }

    /// Linkages in the order they were written. For cyclic sequences, the ring-closing linkage comes last
    #[must_use]
    pub fn linkages(&self) -> &[Linkage] {
        &self.linkages
    }

    #[must_use]
    pub const fn topology(&self) -> Topology {
        self.topology
    }

    #[must_use]
    pub const fn is_cyclic(&self) -> bool {
        matches!(self.topology, Topology::Cyclic)
    }

    /// Every connection in sequence order, duplicates included
    #[must_use]
    pub fn connections(&self) -> Vec<Connection> {
        connection::build(&self.residues, &self.linkages, self.topology)
    }

    #[must_use]
    pub fn connection_set(&self) -> ConnectionSet {
        self.connections().into_iter().collect()
    }
}

impl FromStr for Sequence {
    type Err = MalformedSequence;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parser::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linkage_display() {
        let linkage = Linkage::new(1, 3);
        assert_eq!(linkage.to_string(), "1->3");
        assert_eq!(linkage.positions(), "13");
        assert_eq!(linkage.donor(), 1);
        assert_eq!(linkage.acceptor(), 3);
    }

    #[test]
    fn residue_conversions() {
        let residue = Residue::from("aDGal");
        assert_eq!(residue, Residue::from("aDGal".to_owned()));
        assert_eq!(residue.as_str(), "aDGal");
        assert_eq!(residue.to_string(), "aDGal");
    }

    #[test]
    fn from_str() {
        let sequence: Sequence = "aDGal(1->3)bDGalf".parse().unwrap();
        assert_eq!(sequence.topology(), Topology::Linear);
        assert!(!sequence.is_cyclic());
        assert_eq!(
            sequence.connections(),
            vec![Connection::from("aDGal13bDGalf")]
        );

        assert_eq!("".parse::<Sequence>(), Err(MalformedSequence::Empty));
    }

    #[test]
    fn cyclic_connection_set() {
        let sequence: Sequence = "->4)bDGlcp(1->4)bDGlcp(1->".parse().unwrap();
        assert!(sequence.is_cyclic());
        // Both the chain linkage and the ring-closing linkage are 1->4 between the same residues
        assert_eq!(sequence.connections().len(), 2);
        assert_eq!(
            sequence.connection_set().as_slice(),
            [Connection::from("bDGlcp14bDGlcp")]
        );
    }
}
