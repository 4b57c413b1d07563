use super::*;

/// Protein identity by accession, used for protein-level comparisons
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Accession(pub String);

impl Key for Accession {
    fn from_record(record: &Record) -> Self {
        Accession(record.accession.clone())
    }

    fn header() -> &'static str {
        "protein_id"
    }

    fn columns(&self) -> String {
        self.0.clone()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn accession_key() {
        let record = Record {
            accession: "ALBU_HUMAN".into(),
            sequence: "LVNEVTEFAK".into(),
            ..Record::default()
        };
        let key = Accession::from_record(&record);
        assert_eq!(key, Accession("ALBU_HUMAN".into()));
        assert_eq!(key.columns(), "ALBU_HUMAN");
    }
}
