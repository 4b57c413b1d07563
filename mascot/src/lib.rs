//! Reader for comma-separated search result exports written by MASCOT.
//!
//! Exports begin with free-form preamble sections. The data table starts
//! after a line beginning with a known header marker (`prot_hit` for
//! peptide exports, `Family` for protein family summaries) and the
//! column-name row that follows it. Fields are extracted strictly by
//! position, as described by a [`Schema`].
//!
//! ```rust,ignore
//! # use mascot::*;
//! let export = Export::open("./CSV/Trypsin.csv", Schema::peptides())?;
//! for record in export.records() {
//!     let record = record?;
//!     println!("{}.{}.{}", record.previous, record.sequence, record.next);
//! }
//! ```

use std::borrow::Cow;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use log::debug;

mod error;
mod parser;

pub use error::Error;
pub use parser::{clean_line, Records};

pub type Result<T> = std::result::Result<T, Error>;

/// Field separator of the export
pub const DELIMITER: char = ',';
/// Character substituted for delimiters found inside quoted fields
pub const PLACEHOLDER: char = ':';
pub const QUOTE: char = '"';
/// Modification value stored for rows with an empty modification column.
/// Identity comparisons rely on this exact string.
pub const NO_MODIFICATION: &str = "None";

/// Positional layout of an export's data rows. Column indices are zero-based;
/// a `None` column is not extracted and is left empty in each [`Record`].
#[derive(Clone, Debug, PartialEq)]
pub struct Schema {
    /// Data starts after the first line beginning with this string
    pub marker: String,
    /// Rows to discard after the marker line (the column-name row)
    pub skip_after_marker: usize,
    pub previous: Option<usize>,
    pub sequence: Option<usize>,
    pub next: Option<usize>,
    pub modification: Option<usize>,
    pub accession: Option<usize>,
}

impl Schema {
    /// Peptide-level export: `pep_res_before`, `pep_seq`, `pep_res_after`
    /// and `pep_var_mod` in columns 23 to 26
    pub fn peptides() -> Schema {
        Schema {
            marker: String::from("prot_hit"),
            skip_after_marker: 1,
            previous: Some(22),
            sequence: Some(23),
            next: Some(24),
            modification: Some(25),
            accession: None,
        }
    }

    /// Peptide export read for sequences only. Rows need just enough
    /// fields to reach the sequence column.
    pub fn sequences() -> Schema {
        Schema {
            previous: None,
            next: None,
            modification: None,
            ..Schema::peptides()
        }
    }

    /// Protein family summary export, accession in column 4
    pub fn proteins() -> Schema {
        Schema {
            marker: String::from("Family"),
            skip_after_marker: 1,
            previous: None,
            sequence: None,
            next: None,
            modification: None,
            accession: Some(3),
        }
    }

    /// Minimum number of fields a data row must have
    pub fn width(&self) -> usize {
        [
            self.previous,
            self.sequence,
            self.next,
            self.modification,
            self.accession,
        ]
        .iter()
        .flatten()
        .max()
        .map(|idx| idx + 1)
        .unwrap_or(0)
    }

    /// Pull the configured columns out of an already quote-normalized row
    fn extract(&self, line: usize, fields: &[&str]) -> std::result::Result<Record, String> {
        let width = self.width();
        if fields.len() < width {
            return Err(format!(
                "expected at least {} fields, found {}",
                width,
                fields.len()
            ));
        }

        let get = |idx: Option<usize>| idx.map(|i| fields[i]).unwrap_or_default();
        let modification = get(self.modification).trim_matches(QUOTE);

        Ok(Record {
            line,
            previous: get(self.previous).into(),
            sequence: get(self.sequence).into(),
            next: get(self.next).into(),
            modification: if modification.is_empty() {
                NO_MODIFICATION.into()
            } else {
                modification.into()
            },
            accession: get(self.accession).trim_matches(QUOTE).into(),
        })
    }
}

impl Default for Schema {
    fn default() -> Schema {
        Schema::peptides()
    }
}

/// One parsed data row
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Record {
    /// 1-based line number in the source file
    pub line: usize,
    pub previous: String,
    pub sequence: String,
    pub next: String,
    /// Quote-stripped modification string, [`NO_MODIFICATION`] if empty
    pub modification: String,
    pub accession: String,
}

/// A MASCOT export held in memory
pub struct Export {
    pub path: PathBuf,
    pub schema: Schema,
    buffer: Vec<u8>,
}

impl Export {
    /// Read an export into memory. Parsing happens lazily in [`Export::records`].
    pub fn open<P: AsRef<Path>>(path: P, schema: Schema) -> Result<Export> {
        let path = path.as_ref();
        let mut buffer = Vec::new();
        fs::File::open(path)
            .and_then(|mut file| file.read_to_end(&mut buffer))
            .map_err(|source| Error::FileAccess {
                path: path.to_path_buf(),
                source,
            })?;
        debug!("read {} bytes from {}", buffer.len(), path.display());

        Ok(Export {
            path: path.to_path_buf(),
            schema,
            buffer,
        })
    }

    /// Wrap bytes that are already in memory
    pub fn from_bytes<P: Into<PathBuf>>(path: P, schema: Schema, buffer: Vec<u8>) -> Export {
        Export {
            path: path.into(),
            schema,
            buffer,
        }
    }

    pub fn records(&self) -> Records<'_> {
        Records::new(self)
    }

    /// File name without its directory, as used in report headings
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}
