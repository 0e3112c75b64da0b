use std::{io, path::PathBuf};

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

#[derive(Debug, Diagnostic, Clone, Eq, PartialEq, Error)]
pub enum MalformedSequence {
    #[diagnostic(help("try a sequence like aDGal(1->3)bDGalf(1->2)aDMan"))]
    #[error("expected a glycan sequence, but the input was empty")]
    Empty,

    // NOTE: The closing linkage of a repeating unit is read from fixed offsets, so this error has to point at the
    // exact character that should have been a ring position
    #[diagnostic(help(
        "repeating units should open with the acceptor position, like \"->4)\", and close with the donor \
        position, like \"(1->\""
    ))]
    #[error("could not find the ring-closing linkage of the repeating unit")]
    RingClosure {
        #[source_code]
        sequence: String,
        #[label("expected a ring position digit here")]
        at: SourceSpan,
    },
}

impl MalformedSequence {
    pub(crate) fn ring_closure(sequence: &str, at: impl Into<SourceSpan>) -> Self {
        let sequence = sequence.to_owned();
        let at = at.into();

        Self::RingClosure { sequence, at }
    }
}

#[derive(Debug, Diagnostic, Error)]
pub enum DihedralTableError {
    #[diagnostic(help("check that the dihedral definition file exists and is readable"))]
    #[error("failed to read the dihedral table at {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
