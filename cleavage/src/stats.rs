use super::*;

/// Share of cleavage events at lysine, arginine, and everything else
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Specificity {
    pub k: f64,
    pub r: f64,
    pub other: f64,
}

impl Specificity {
    pub fn kr(&self) -> f64 {
        self.k + self.r
    }
}

/// Per-file cleavage statistics derived from a finished [`ClassificationState`]
#[derive(Clone, Debug, PartialEq)]
pub struct CleavageStats {
    /// File name, used as the row label of most reports
    pub name: String,
    pub occurrences: usize,
    pub unique: usize,
    pub total_cleavages: usize,
    pub internal: usize,
    pub n_terminal: usize,
    pub c_terminal: usize,
    pub both_termini: usize,
    pub counts: ResidueMap<usize>,
    /// `100 * count / total_cleavages` for each residue
    pub percent: ResidueMap<f64>,
}

impl CleavageStats {
    /// Fails with [`Error::EmptyDataset`] when no peptide contributed a
    /// cleavage event, since percentages are undefined.
    pub fn new<I: Identity, P: AsRef<Path>>(
        path: P,
        state: &ClassificationState<I>,
    ) -> Result<CleavageStats, Error> {
        let total = state.total_cleavages();
        if total == 0 {
            return Err(Error::EmptyDataset {
                path: path.as_ref().to_path_buf(),
                reason: format!(
                    "no cleavage events among {} unique peptides",
                    state.unique().len()
                ),
            });
        }

        let counts = state.cleavages.map(Vec::len);
        let percent = counts.map(|&c| percentage(c, total));

        Ok(CleavageStats {
            name: file_name(path.as_ref()),
            occurrences: state.occurrences(),
            unique: state.unique().len(),
            total_cleavages: total,
            internal: state.internal.len(),
            n_terminal: state.n_terminal.len(),
            c_terminal: state.c_terminal.len(),
            both_termini: state.both_termini.len(),
            counts,
            percent,
        })
    }

    /// Read, classify and summarize one export
    pub fn load<I: Identity>(export: &Export, marker: &str) -> Result<CleavageStats, Error> {
        let state = classify::<I>(export, marker)?;
        CleavageStats::new(&export.path, &state)
    }

    /// Short name used as a matrix column: the file name up to its first `.`
    pub fn short_name(&self) -> &str {
        self.name.split('.').next().unwrap_or_default()
    }

    pub fn specificity(&self) -> Specificity {
        let mut spec = Specificity::default();
        for (residue, &pct) in self.percent.iter() {
            match residue {
                Residue::K => spec.k = pct,
                Residue::R => spec.r = pct,
                _ => spec.other += pct,
            }
        }
        spec
    }
}

#[inline]
pub fn percentage(count: usize, total: usize) -> f64 {
    count as f64 / total as f64 * 100.0
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
