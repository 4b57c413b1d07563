//! Terminal classification of unique peptides and per-residue cleavage tallies
use super::*;

/// Position of a peptide relative to the termini of its source protein
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Terminal {
    /// Real residues on both sides
    Internal,
    /// Starts at the protein N-terminus
    NTerminal,
    /// Ends at the protein C-terminus
    CTerminal,
    /// Spans the whole protein
    BothTermini,
}

impl Terminal {
    pub fn classify(previous: &str, next: &str, marker: &str) -> Terminal {
        match (previous == marker, next == marker) {
            (false, false) => Terminal::Internal,
            (true, false) => Terminal::NTerminal,
            (false, true) => Terminal::CTerminal,
            (true, true) => Terminal::BothTermini,
        }
    }

    /// Number of cleavage events a peptide in this category contributes
    pub fn cleavages(self) -> usize {
        match self {
            Terminal::Internal => 2,
            Terminal::NTerminal | Terminal::CTerminal => 1,
            Terminal::BothTermini => 0,
        }
    }
}

/// A record whose cleavage sites could not be attributed to a standard residue
#[derive(Clone, Debug, PartialEq)]
pub struct Unassignable {
    pub line: usize,
    pub reason: String,
}

/// Classification state for a single input file.
///
/// INVARIANT: `internal`, `n_terminal`, `c_terminal` and `both_termini` are
/// disjoint and their union is `unique`. Each identity in `internal` appears
/// in exactly two `cleavages` lists (possibly the same list twice), each one
/// in `n_terminal` or `c_terminal` in exactly one.
#[derive(Clone, Debug)]
pub struct ClassificationState<I: Identity> {
    marker: String,
    occurrences: usize,
    unique: HashSet<I>,
    pub internal: BTreeSet<I>,
    pub n_terminal: BTreeSet<I>,
    pub c_terminal: BTreeSet<I>,
    pub both_termini: BTreeSet<I>,
    /// Identities credited with a cleavage at each residue
    pub cleavages: ResidueMap<Vec<I>>,
}

impl<I: Identity> ClassificationState<I> {
    /// `marker` is the flanking value that denotes a protein terminus
    pub fn new<S: Into<String>>(marker: S) -> Self {
        ClassificationState {
            marker: marker.into(),
            occurrences: 0,
            unique: HashSet::new(),
            internal: BTreeSet::new(),
            n_terminal: BTreeSet::new(),
            c_terminal: BTreeSet::new(),
            both_termini: BTreeSet::new(),
            cleavages: ResidueMap::default(),
        }
    }

    /// Fold a record into the state.
    ///
    /// Only the first occurrence of an identity is classified and tallied;
    /// later occurrences just bump the occurrence count and return `None`.
    /// The state is left untouched when an error is returned.
    pub fn add(&mut self, record: &Record) -> Result<Option<Terminal>, Unassignable> {
        let identity = I::from_record(record);
        if self.unique.contains(&identity) {
            self.occurrences += 1;
            return Ok(None);
        }

        let terminal = Terminal::classify(&record.previous, &record.next, &self.marker);

        // P1' is the peptide's own first residue, the other site is the
        // residue after the peptide
        let leading = match terminal {
            Terminal::Internal | Terminal::CTerminal => Some(Self::leading(record, &identity)?),
            _ => None,
        };
        let following = match terminal {
            Terminal::Internal | Terminal::NTerminal => Some(Self::following(record)?),
            _ => None,
        };

        for residue in leading.into_iter().chain(following) {
            self.cleavages[residue].push(identity.clone());
        }

        match terminal {
            Terminal::Internal => self.internal.insert(identity.clone()),
            Terminal::NTerminal => self.n_terminal.insert(identity.clone()),
            Terminal::CTerminal => self.c_terminal.insert(identity.clone()),
            Terminal::BothTermini => self.both_termini.insert(identity.clone()),
        };
        self.unique.insert(identity);
        self.occurrences += 1;
        Ok(Some(terminal))
    }

    fn leading(record: &Record, identity: &I) -> Result<Residue, Unassignable> {
        let c = identity.sequence().chars().next().ok_or_else(|| Unassignable {
            line: record.line,
            reason: String::from("empty peptide sequence"),
        })?;
        Residue::from_char(c).ok_or_else(|| Unassignable {
            line: record.line,
            reason: format!("peptide {} starts with non-standard residue `{}`", identity.sequence(), c),
        })
    }

    fn following(record: &Record) -> Result<Residue, Unassignable> {
        Residue::from_field(&record.next).ok_or_else(|| Unassignable {
            line: record.line,
            reason: format!("next residue `{}` is not a standard amino acid", record.next),
        })
    }

    /// Records folded in, duplicates included
    pub fn occurrences(&self) -> usize {
        self.occurrences
    }

    pub fn unique(&self) -> &HashSet<I> {
        &self.unique
    }

    /// Number of cleavage events credited to `residue`
    pub fn tally(&self, residue: Residue) -> usize {
        self.cleavages[residue].len()
    }

    pub fn total_cleavages(&self) -> usize {
        self.internal.len() * Terminal::Internal.cleavages()
            + self.n_terminal.len() * Terminal::NTerminal.cleavages()
            + self.c_terminal.len() * Terminal::CTerminal.cleavages()
    }
}

/// Classify every record of an export
pub fn classify<I: Identity>(export: &Export, marker: &str) -> Result<ClassificationState<I>, Error> {
    let mut state = ClassificationState::new(marker);
    for record in export.records() {
        let record = record?;
        state
            .add(&record)
            .map_err(|e| mascot::Error::malformed(&export.path, e.line, e.reason))?;
    }
    debug!(
        "{}: {} rows, {} unique peptides",
        export.path.display(),
        state.occurrences(),
        state.unique().len()
    );
    Ok(state)
}
