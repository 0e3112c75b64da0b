use std::{io, path::PathBuf};

use glycan::{DihedralTableError, MalformedSequence};
use miette::Diagnostic;
use pmf_store::StoreError;
use thiserror::Error;

pub type Result<T, E = GlycoplotError> = std::result::Result<T, E>;

#[derive(Debug, Diagnostic, Error)]
pub enum GlycoplotError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Sequence(#[from] MalformedSequence),

    #[error(transparent)]
    #[diagnostic(transparent)]
    DihedralTable(#[from] DihedralTableError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error("no configuration named {0:?} has been saved")]
    #[diagnostic(help("use `:configs` to list the saved configurations"))]
    UnknownConfiguration(String),

    #[error("there is no connection numbered {index} (the molecule has {count})")]
    UnknownConnection { index: usize, count: usize },

    #[error("no molecule has been entered yet")]
    #[diagnostic(help("type a sequence, like `aDGal(1->3)bDGalf(1->2)aDMan`, first"))]
    NoMolecule,

    #[error("unknown command {0:?}")]
    #[diagnostic(help("type `:help` to list the available commands"))]
    UnknownCommand(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("failed to read {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to start the plot worker")]
    Worker(#[source] io::Error),
}

#[derive(Debug, Diagnostic, Error)]
pub enum SettingsError {
    #[error("failed to read the settings file at {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("the settings file at {path:?} is invalid")]
    #[diagnostic(help("every setting is optional, so deleting a broken line restores its default"))]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
