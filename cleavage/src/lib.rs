//! Protease cleavage-site statistics and replicate comparisons for Mascot
//! peptide and protein exports.
//!
//! The library's API is built around a small pipeline.
//!
//! An [`Export`] is loaded from disk and every peptide record is folded into
//! a [`ClassificationState`], which assigns each unique peptide a
//! [`Terminal`] category and credits the residue at each of its cleavage
//! sites. A finished state is summarized into [`CleavageStats`].
//!
//! ```rust,ignore
//! # use cleavage::*;
//! let export = Export::open("./data/rep1.csv", Schema::peptides()).unwrap();
//! let stats = CleavageStats::load::<ModifiedPeptide>(&export, "-").unwrap();
//! println!("{} cleavages", stats.total_cleavages);
//! ```
//!
//! Key sets from two or three exports can be compared with a [`Comparison`],
//! and trypsin / Tryp-N digests of the same sample are reconciled on trimmed
//! core sequences by a [`DigestComparison`].
//!
//! ```rust,ignore
//! # use cleavage::*;
//! let a = Export::open("./data/rep1.csv", Schema::proteins()).unwrap();
//! let b = Export::open("./data/rep2.csv", Schema::proteins()).unwrap();
//!
//! let cmp = Comparison::new(vec![
//!     (a.name(), load_keys::<Accession>(&a).unwrap()),
//!     (b.name(), load_keys::<Accession>(&b).unwrap()),
//! ])
//! .unwrap();
//! assert!(cmp.sanity(0).pass());
//! ```
//!
//! Everything the pipeline produces is rendered by the [`report`] module.
use log::{debug, info};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::hash::Hash;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use mascot::{Export, Record, Schema};

mod classify;
mod digest;
mod peptide;
mod protein;
pub mod report;
mod residue;
mod stats;
mod venn;

pub use classify::{classify, ClassificationState, Terminal, Unassignable};
pub use digest::{Digest, DigestComparison, DigestEntry, Protease};
pub use peptide::{Identity, Key, ModifiedPeptide, Sequence};
pub use protein::Accession;
pub use report::{Failure, Report};
pub use residue::{Residue, ResidueMap};
pub use stats::{percentage, CleavageStats, Specificity};
pub use venn::{load_keys, Comparison, Sanity};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Export(#[from] mascot::Error),

    #[error("{}: {reason}", .path.display())]
    EmptyDataset { path: PathBuf, reason: String },

    #[error("comparison needs 2 or 3 inputs, got {0}")]
    Comparison(usize),

    #[error("could not write report {}", .path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
