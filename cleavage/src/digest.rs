//! Reconciling trypsin and Tryp-N digests of the same sample.
//!
//! Trypsin cuts after K/R and Tryp-N before them, so the same stretch of
//! protein shows up as `...K` in one digest and `K...` in the other. Both are
//! reduced to a common core by trimming the protease-specific K/R before the
//! two peptide lists are compared.
use super::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Protease {
    /// Peptides end in K/R unless at the protein C-terminus
    Trypsin,
    /// Peptides begin with K/R unless at the protein N-terminus
    TrypN,
}

#[inline]
fn is_kr(c: char) -> bool {
    c == 'K' || c == 'R'
}

fn swap_kr(c: char) -> char {
    if c == 'K' {
        'R'
    } else {
        'K'
    }
}

impl Protease {
    pub fn name(self) -> &'static str {
        match self {
            Protease::Trypsin => "Trypsin",
            Protease::TrypN => "TrypN",
        }
    }

    /// Remove the K/R left behind by this protease, if there is one
    pub fn trim(self, peptide: &str) -> &str {
        match self {
            Protease::Trypsin => peptide.strip_suffix(is_kr).unwrap_or(peptide),
            Protease::TrypN => peptide.strip_prefix(is_kr).unwrap_or(peptide),
        }
    }

    /// The peptide with K and R swapped at the trimmed end. Both trim to
    /// the same core and cannot be told apart after trimming.
    pub fn sibling(self, peptide: &str) -> Option<String> {
        match self {
            Protease::Trypsin => {
                let last = peptide.chars().last().filter(|&c| is_kr(c))?;
                let core = &peptide[..peptide.len() - last.len_utf8()];
                Some(format!("{}{}", core, swap_kr(last)))
            }
            Protease::TrypN => {
                let first = peptide.chars().next().filter(|&c| is_kr(c))?;
                Some(format!("{}{}", swap_kr(first), &peptide[first.len_utf8()..]))
            }
        }
    }
}

/// Unique peptide sequences of one digest, modifications ignored
#[derive(Clone, Debug)]
pub struct Digest {
    pub protease: Protease,
    pub name: String,
    pub unique: BTreeSet<String>,
    /// Peptides whose K/R sibling is also present
    pub ambiguous: BTreeSet<String>,
}

impl Digest {
    pub fn new<N, I>(protease: Protease, name: N, peptides: I) -> Digest
    where
        N: Into<String>,
        I: IntoIterator<Item = String>,
    {
        let unique = peptides.into_iter().collect::<BTreeSet<String>>();
        let ambiguous = unique
            .iter()
            .filter(|p| {
                protease
                    .sibling(p)
                    .map(|s| unique.contains(&s))
                    .unwrap_or(false)
            })
            .cloned()
            .collect();
        Digest {
            protease,
            name: name.into(),
            unique,
            ambiguous,
        }
    }

    pub fn load(export: &Export, protease: Protease) -> Result<Digest, Error> {
        let peptides = load_keys::<Sequence>(export)?;
        let digest = Digest::new(
            protease,
            export.name(),
            peptides.into_iter().map(|Sequence(s)| s),
        );
        if !digest.ambiguous.is_empty() {
            info!(
                "{}: {} {} peptides differ only by the trimmed K/R",
                digest.name,
                digest.ambiguous.len(),
                protease.name()
            );
        }
        Ok(digest)
    }

    /// Trimmed core sequences, the join key between digests
    pub fn keys(&self) -> BTreeSet<String> {
        self.unique
            .iter()
            .map(|p| self.protease.trim(p).to_string())
            .collect()
    }

    /// Estimated number of indistinguishable pairs. Each pair is in the
    /// ambiguous set twice, once from each member.
    pub fn indistinguishable_pairs(&self) -> f64 {
        self.ambiguous.len() as f64 / 2.0
    }
}

/// Untrimmed sequences from each digest that share one core sequence
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DigestEntry {
    pub trypsin: Vec<String>,
    pub trypn: Vec<String>,
}

/// Venn comparison of a trypsin digest against a Tryp-N digest on trimmed
/// core sequences
pub struct DigestComparison {
    pub trypsin: Digest,
    pub trypn: Digest,
    pub comparison: Comparison<String>,
    pub mapping: BTreeMap<String, DigestEntry>,
}

impl DigestComparison {
    pub fn new(trypsin: Digest, trypn: Digest) -> Result<DigestComparison, Error> {
        let mut mapping: BTreeMap<String, DigestEntry> = BTreeMap::new();
        for peptide in &trypsin.unique {
            mapping
                .entry(trypsin.protease.trim(peptide).to_string())
                .or_default()
                .trypsin
                .push(peptide.clone());
        }
        for peptide in &trypn.unique {
            mapping
                .entry(trypn.protease.trim(peptide).to_string())
                .or_default()
                .trypn
                .push(peptide.clone());
        }

        let comparison = Comparison::new(vec![
            (trypsin.protease.name().to_string(), trypsin.keys()),
            (trypn.protease.name().to_string(), trypn.keys()),
        ])?;

        Ok(DigestComparison {
            trypsin,
            trypn,
            comparison,
            mapping,
        })
    }

    pub fn trypsin_only(&self) -> usize {
        self.comparison.exclusive(0).len()
    }

    pub fn trypn_only(&self) -> usize {
        self.comparison.exclusive(1).len()
    }

    pub fn both(&self) -> usize {
        self.comparison.intersection(0, 1).len()
    }

    pub fn sanity(&self) -> [Sanity; 2] {
        [
            self.comparison
                .sanity_adjusted(0, self.trypsin.unique.len(), self.trypsin.ambiguous.len()),
            self.comparison
                .sanity_adjusted(1, self.trypn.unique.len(), self.trypn.ambiguous.len()),
        ]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn digest(protease: Protease, peptides: &[&str]) -> Digest {
        Digest::new(protease, "test.csv", peptides.iter().map(|p| p.to_string()))
    }

    #[test]
    fn trim() {
        assert_eq!(Protease::Trypsin.trim("ABCDEK"), "ABCDE");
        assert_eq!(Protease::Trypsin.trim("ABCDER"), "ABCDE");
        assert_eq!(Protease::Trypsin.trim("KABCDE"), "KABCDE");
        assert_eq!(Protease::TrypN.trim("KABCDE"), "ABCDE");
        assert_eq!(Protease::TrypN.trim("ABCDEK"), "ABCDEK");
        assert_eq!(Protease::Trypsin.trim(""), "");
    }

    #[test]
    fn sibling() {
        assert_eq!(Protease::Trypsin.sibling("ABCDEK").as_deref(), Some("ABCDER"));
        assert_eq!(Protease::Trypsin.sibling("ABCDER").as_deref(), Some("ABCDEK"));
        assert_eq!(Protease::TrypN.sibling("RABCDE").as_deref(), Some("KABCDE"));
        assert_eq!(Protease::Trypsin.sibling("ABCDE"), None);
        assert_eq!(Protease::TrypN.sibling(""), None);
    }

    #[test]
    fn ambiguity() {
        let d = digest(Protease::Trypsin, &["ABCDEK", "ABCDER"]);
        assert_eq!(d.ambiguous.len(), 2);
        assert_eq!(d.indistinguishable_pairs(), 1.0);
        assert_eq!(d.keys().len(), 1);

        let d = digest(Protease::Trypsin, &["ABCDEK"]);
        assert!(d.ambiguous.is_empty());

        let d = digest(Protease::TrypN, &["KLEELELDEQQ", "RLEELELDEQQ", "KLEELELDEQQR"]);
        assert_eq!(d.ambiguous.len(), 2);
        assert!(!d.ambiguous.contains("KLEELELDEQQR"));
    }

    #[test]
    fn comparison() {
        let trypsin = digest(Protease::Trypsin, &["AAAK", "CCCR", "CCCK", "DDD", "EEEK"]);
        let trypn = digest(Protease::TrypN, &["KAAA", "RCCC", "KFFF", "DDD"]);
        let c = DigestComparison::new(trypsin, trypn).unwrap();

        assert_eq!(c.both(), 3);
        assert_eq!(c.trypsin_only(), 1);
        assert_eq!(c.trypn_only(), 1);
        assert_eq!(c.mapping.len(), c.trypsin_only() + c.trypn_only() + c.both());
        assert_eq!(
            c.mapping["CCC"],
            DigestEntry {
                trypsin: vec!["CCCK".into(), "CCCR".into()],
                trypn: vec!["RCCC".into()],
            }
        );
        assert!(c.mapping["EEE"].trypn.is_empty());

        let [a, b] = c.sanity();
        assert!(a.pass());
        assert!(b.pass());
        assert_eq!(a.total, 5);
        assert_eq!(a.ambiguous, 2);
    }

    #[test]
    fn unpaired_collapse_fails_sanity() {
        // a C-terminal peptide and a tryptic one share a core without being
        // K/R siblings, which the pair heuristic does not cover
        let trypsin = digest(Protease::Trypsin, &["ABCDE", "ABCDEK"]);
        let trypn = digest(Protease::TrypN, &["KABCDE"]);
        let c = DigestComparison::new(trypsin, trypn).unwrap();
        let [a, _] = c.sanity();
        assert!(!a.pass());
    }
}
