use super::*;

/// Anything that can be derived from a [`Record`] and compared across files
pub trait Key: Clone + Eq + Hash + Ord {
    fn from_record(record: &Record) -> Self;

    /// Tab-separated column names used when listing keys in a report
    fn header() -> &'static str;

    /// Tab-separated values matching [`Key::header`]
    fn columns(&self) -> String;
}

/// A peptide identity: a [`Key`] that carries the peptide sequence whose
/// leading residue is credited with a cleavage
pub trait Identity: Key {
    fn sequence(&self) -> &str;
}

/// Peptides are distinct if either sequence or modification string differ.
/// The modification string is compared verbatim.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModifiedPeptide {
    pub sequence: String,
    pub modification: String,
}

impl ModifiedPeptide {
    pub fn new<S: Into<String>, M: Into<String>>(sequence: S, modification: M) -> Self {
        ModifiedPeptide {
            sequence: sequence.into(),
            modification: modification.into(),
        }
    }
}

impl Key for ModifiedPeptide {
    fn from_record(record: &Record) -> Self {
        ModifiedPeptide::new(record.sequence.as_str(), record.modification.as_str())
    }

    fn header() -> &'static str {
        "peptide\tmodifications"
    }

    fn columns(&self) -> String {
        format!("{}\t{}", self.sequence, self.modification)
    }
}

impl Identity for ModifiedPeptide {
    fn sequence(&self) -> &str {
        &self.sequence
    }
}

/// Peptide identity by sequence alone, modifications ignored
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Sequence(pub String);

impl Key for Sequence {
    fn from_record(record: &Record) -> Self {
        Sequence(record.sequence.clone())
    }

    fn header() -> &'static str {
        "peptide"
    }

    fn columns(&self) -> String {
        self.0.clone()
    }
}

impl Identity for Sequence {
    fn sequence(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn record(seq: &str, modification: &str) -> Record {
        Record {
            sequence: seq.into(),
            modification: modification.into(),
            ..Record::default()
        }
    }

    #[test]
    fn modification_distinguishes_peptides() {
        let a = ModifiedPeptide::from_record(&record("PEPTMIDE", "None"));
        let b = ModifiedPeptide::from_record(&record("PEPTMIDE", "Oxidation (M)"));
        assert_ne!(a, b);
        assert_eq!(a.sequence(), b.sequence());
        assert_eq!(b.columns(), "PEPTMIDE\tOxidation (M)");

        // formatting differences are not normalized
        let c = ModifiedPeptide::from_record(&record("PEPTMIDE", "Oxidation(M)"));
        assert_ne!(b, c);
    }

    #[test]
    fn sequence_ignores_modification() {
        let a = Sequence::from_record(&record("PEPTMIDE", "None"));
        let b = Sequence::from_record(&record("PEPTMIDE", "Oxidation (M)"));
        assert_eq!(a, b);
        assert_eq!(a.columns(), "PEPTMIDE");
    }
}
