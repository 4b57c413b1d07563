//! Plain-text and tab-delimited report rendering.
//!
//! Every report is rendered completely into memory first. [`Report::write`]
//! then stores each file through a temporary file in the output directory
//! that is only renamed into place once fully written, so a failed run never
//! leaves a truncated report behind.
use super::*;
use std::fs;
use std::io::{self, prelude::*};
use tempfile::NamedTempFile;

const RULE: &str = "==============================================";
const SHORT_RULE: &str = "================================";

/// An input file that could not be processed, listed in the run's reports
#[derive(Clone, Debug, PartialEq)]
pub struct Failure {
    pub name: String,
    pub message: String,
}

impl Failure {
    pub fn new<P: AsRef<Path>, E: std::fmt::Display>(path: P, error: E) -> Failure {
        Failure {
            name: stats::file_name(path.as_ref()),
            message: error.to_string(),
        }
    }
}

/// A set of rendered report files, keyed by file name
#[derive(Clone, Debug, Default)]
pub struct Report {
    files: Vec<(String, Vec<u8>)>,
}

impl Report {
    pub fn new() -> Report {
        Report::default()
    }

    pub fn add<S, F>(&mut self, name: S, render: F) -> io::Result<()>
    where
        S: Into<String>,
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buf = Vec::new();
        render(&mut buf)?;
        self.files.push((name.into(), buf));
        Ok(())
    }

    /// Write every file into `dir`, creating it if needed
    pub fn write<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<PathBuf>, Error> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|source| Error::Report {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut written = Vec::with_capacity(self.files.len());
        for (name, buf) in &self.files {
            let path = dir.join(name);
            write_atomic(&path, buf)?;
            debug!("wrote {}", path.display());
            written.push(path);
        }
        Ok(written)
    }
}

/// Write `contents` to a temporary file next to `path`, then rename it over `path`
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), Error> {
    let report_error = |source| Error::Report {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(report_error)?;
    tmp.write_all(contents).map_err(report_error)?;
    tmp.flush().map_err(report_error)?;
    tmp.persist(path).map_err(|e| report_error(e.error))?;
    Ok(())
}

/// Format a float the way the downstream R scripts expect, always with a
/// decimal point (`50.0`, not `50`)
pub fn decimal(x: f64) -> String {
    let s = x.to_string();
    if x.is_finite() && !s.contains('.') {
        format!("{}.0", s)
    } else {
        s
    }
}

/// `['A', 'B']`, or `[None]` for an empty list
fn bracketed(items: &[String]) -> String {
    if items.is_empty() {
        return String::from("[None]");
    }
    format!(
        "[{}]",
        items
            .iter()
            .map(|s| format!("'{}'", s))
            .collect::<Vec<_>>()
            .join(", ")
    )
}

fn verdict(sanity: &Sanity, noun: &str) -> String {
    if sanity.pass() {
        format!("All {} {} accounted for. PASS.", sanity.label, noun)
    } else {
        format!("Some {} {} not accounted for. FAIL.", sanity.label, noun)
    }
}

// -- Cleavage frequencies -------------------------------------------------

/// Per-residue percentages and summary counts for every file
pub fn write_cleavage_log<W: Write>(
    w: &mut W,
    stats: &[CleavageStats],
    failures: &[Failure],
) -> io::Result<()> {
    writeln!(w, "Filename.csv")?;
    writeln!(w, "P1'_residue\tPercent_cleavages")?;
    for s in stats {
        writeln!(w, "{}", RULE)?;
        writeln!(w, "{}", s.name)?;
        for (residue, &pct) in s.percent.iter() {
            writeln!(w, "{}\t{}", residue, decimal(pct))?;
        }
        writeln!(w, "{}\tTOTAL UNIQUE PEPTIDES:\t{}", s.name, s.unique)?;
        writeln!(w, "{}\tTOTAL CLEAVAGES:\t{}", s.name, s.total_cleavages)?;
        writeln!(w, "{}\tN-TERMINAL PEPTIDES:\t{}", s.name, s.n_terminal)?;
        writeln!(w, "{}\tINTERNAL PEPTIDES:\t{}", s.name, s.internal)?;
        writeln!(w, "{}\tC-TERMINAL PEPTIDES:\t{}", s.name, s.c_terminal)?;
        writeln!(w, "{}\tBOTH-TERMINI PEPTIDES:\t{}", s.name, s.both_termini)?;
        writeln!(w, "{}", RULE)?;
    }
    for f in failures {
        writeln!(w, "{}", RULE)?;
        writeln!(w, "{}\tFAILED:\t{}", f.name, f.message)?;
        writeln!(w, "{}", RULE)?;
    }
    Ok(())
}

/// K, R and other-residue percentages, one row per file
pub fn write_specificity<W: Write>(w: &mut W, stats: &[CleavageStats]) -> io::Result<()> {
    writeln!(w, "Filename.csv\tK\tR\tOther")?;
    for s in stats {
        let spec = s.specificity();
        writeln!(
            w,
            "{}\t{}\t{}\t{}",
            s.name,
            decimal(spec.k),
            decimal(spec.r),
            decimal(spec.other)
        )?;
    }
    Ok(())
}

/// Combined K+R percentage next to the unique peptide count
pub fn write_kr_unique<W: Write>(w: &mut W, stats: &[CleavageStats]) -> io::Result<()> {
    writeln!(w, "Filename.csv\tKR_percent\tunique_peptides")?;
    for s in stats {
        writeln!(w, "{}\t{}\t{}", s.name, decimal(s.specificity().kr()), s.unique)?;
    }
    Ok(())
}

/// Residues as rows, files as columns, for sequence logo plotting
pub fn write_matrix<W: Write>(w: &mut W, stats: &[CleavageStats]) -> io::Result<()> {
    for s in stats {
        write!(w, "\t{}", s.short_name())?;
    }
    writeln!(w)?;
    for residue in Residue::ALL.iter() {
        write!(w, "{}", residue)?;
        for s in stats {
            write!(w, "\t{}", decimal(s.percent[*residue]))?;
        }
        writeln!(w)?;
    }
    Ok(())
}

pub fn cleavage_report(
    prefix: &str,
    stats: &[CleavageStats],
    failures: &[Failure],
) -> io::Result<Report> {
    let mut report = Report::new();
    report.add(format!("{}_cleavages.log", prefix), |w| {
        write_cleavage_log(w, stats, failures)
    })?;
    report.add(format!("{}_summary.log", prefix), |w| {
        write_specificity(w, stats)
    })?;
    report.add(format!("{}_summary2.log", prefix), |w| {
        write_kr_unique(w, stats)
    })?;
    report.add(format!("{}_table.log", prefix), |w| write_matrix(w, stats))?;
    Ok(report)
}

// -- Set comparisons ------------------------------------------------------

/// Region sizes in the order the R Venn scripts take them
pub fn write_venn_vector<W: Write, K: Ord + Clone>(
    w: &mut W,
    cmp: &Comparison<K>,
) -> io::Result<()> {
    if cmp.len() == 3 {
        writeln!(
            w,
            "A = {} , B =  {} , C =  {} , \"A&B\" = {} , \"A&C\" = {} , \"B&C\" = {} , \"A&B&C\" = {}",
            cmp.exclusive(0).len(),
            cmp.exclusive(1).len(),
            cmp.exclusive(2).len(),
            cmp.only_pair(0, 1),
            cmp.only_pair(0, 2),
            cmp.only_pair(1, 2),
            cmp.triple().len()
        )
    } else {
        writeln!(
            w,
            "A = {} , B =  {} , \"A&B\" = {}",
            cmp.exclusive(0).len(),
            cmp.exclusive(1).len(),
            cmp.only_pair(0, 1)
        )
    }
}

fn write_failures<W: Write>(w: &mut W, failures: &[Failure]) -> io::Result<()> {
    if failures.is_empty() {
        return Ok(());
    }
    writeln!(w, "\nSKIPPED:")?;
    for f in failures {
        writeln!(w, "{}: {}", f.name, f.message)?;
    }
    Ok(())
}

/// Replicate overlap summary for three inputs
fn write_three_way<W: Write, K: Ord + Clone>(
    w: &mut W,
    cmp: &Comparison<K>,
    noun: &str,
) -> io::Result<()> {
    writeln!(w, "INPUTS:")?;
    for (i, label) in cmp.labels().iter().enumerate() {
        writeln!(w, "Replicate {}: {}", i + 1, label)?;
    }

    writeln!(w, "\nTOTALS:")?;
    for i in 0..3 {
        writeln!(
            w,
            "Number of {} in replicate {} (total): {}",
            noun,
            i + 1,
            cmp.set(i).len()
        )?;
    }

    writeln!(w, "\nPRESENT IN TWO REPLICATES:")?;
    for (i, j) in cmp.pairs() {
        writeln!(
            w,
            "Number of {} shared in replicates {} and {}: {}",
            noun,
            i + 1,
            j + 1,
            cmp.intersection(i, j).len()
        )?;
    }

    writeln!(w, "\nPRESENT IN THREE REPLICATES:")?;
    writeln!(
        w,
        "Number of {} shared in replicates 1, 2, and 3: {}",
        noun,
        cmp.triple().len()
    )?;

    writeln!(w, "\nPRESENT ONLY IN ONE REPLICATE:")?;
    for i in 0..3 {
        writeln!(
            w,
            "Number of {} unique to replicate {}: {}",
            noun,
            i + 1,
            cmp.exclusive(i).len()
        )?;
    }

    writeln!(w, "\nPRESENT ONLY IN TWO REPLICATES:")?;
    for (i, j) in cmp.pairs() {
        writeln!(
            w,
            "Number of {} in ONLY replicates {} and {}: {}",
            noun,
            i + 1,
            j + 1,
            cmp.only_pair(i, j)
        )?;
    }

    writeln!(w, "\nSANITY CHECK")?;
    for i in 0..3 {
        writeln!(w, "{}", verdict(&cmp.sanity(i), noun))?;
    }
    Ok(())
}

/// Two-input overlap summary
fn write_two_way<W: Write, K: Ord + Clone>(
    w: &mut W,
    cmp: &Comparison<K>,
    noun: &str,
) -> io::Result<()> {
    let labels = cmp.labels();
    writeln!(w, "{} comparison", noun)?;
    writeln!(w, "{}", SHORT_RULE)?;
    writeln!(w, "INPUT FILE SUMMARY")?;
    for i in 0..2 {
        writeln!(w, "Number of {} {}: {}", labels[i], noun, cmp.set(i).len())?;
    }

    writeln!(w, "{}", SHORT_RULE)?;
    writeln!(w, "OUTPUT STATISTICS")?;
    for i in 0..2 {
        writeln!(
            w,
            "Number of {} unique to {}: {}",
            noun,
            labels[i],
            cmp.exclusive(i).len()
        )?;
    }
    writeln!(w, "Number of overlapping {}: {}", noun, cmp.intersection(0, 1).len())?;

    writeln!(w, "{}", SHORT_RULE)?;
    writeln!(w, "SANITY CHECK")?;
    for i in 0..2 {
        writeln!(w, "{}", verdict(&cmp.sanity(i), noun))?;
    }
    Ok(())
}

/// Overlap summary, Venn vector and skipped inputs for a comparison
pub fn write_comparison<W: Write, K: Ord + Clone>(
    w: &mut W,
    cmp: &Comparison<K>,
    noun: &str,
    failures: &[Failure],
) -> io::Result<()> {
    if cmp.len() == 3 {
        write_three_way(w, cmp, noun)?;
    } else {
        write_two_way(w, cmp, noun)?;
    }
    writeln!(w, "\nVENN VECTOR:")?;
    write_venn_vector(w, cmp)?;
    write_failures(w, failures)
}

/// Every key with a 1/0 presence flag per input, sorted by key
pub fn write_presence<W: Write, K: Key>(w: &mut W, cmp: &Comparison<K>) -> io::Result<()> {
    writeln!(w, "{}\t{}", K::header(), cmp.labels().join("\t"))?;
    for (key, flags) in cmp.entries() {
        let flags = flags
            .iter()
            .map(|&present| if present { "1" } else { "0" })
            .collect::<Vec<_>>()
            .join("\t");
        writeln!(w, "{}\t{}", key.columns(), flags)?;
    }
    Ok(())
}

pub fn comparison_report<K: Key>(
    prefix: &str,
    cmp: &Comparison<K>,
    noun: &str,
    failures: &[Failure],
) -> io::Result<Report> {
    let mut report = Report::new();
    report.add(format!("{}_comparison.log", prefix), |w| {
        write_comparison(w, cmp, noun, failures)
    })?;
    report.add(format!("{}_presence.log", prefix), |w| {
        write_presence(w, cmp)
    })?;
    Ok(report)
}

// -- Protease digests -----------------------------------------------------

/// Core sequence followed by the trypsin and Tryp-N peptides that trim to it
pub fn write_digest_mapping<W: Write>(w: &mut W, dc: &DigestComparison) -> io::Result<()> {
    for (core, entry) in &dc.mapping {
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}",
            core,
            Protease::Trypsin.name(),
            bracketed(&entry.trypsin),
            Protease::TrypN.name(),
            bracketed(&entry.trypn)
        )?;
    }
    Ok(())
}

pub fn write_digest_summary<W: Write>(w: &mut W, dc: &DigestComparison) -> io::Result<()> {
    writeln!(w, "Trypsin / TrypN peptide comparison, modifications ignored")?;
    writeln!(w, "Trypsin input: {}", dc.trypsin.name)?;
    writeln!(w, "TrypN input: {}", dc.trypn.name)?;

    writeln!(w, "{}", SHORT_RULE)?;
    writeln!(w, "INPUT FILE SUMMARY")?;
    writeln!(w, "Number of Tryptic peptides: {}", dc.trypsin.unique.len())?;
    writeln!(w, "Number of TrypN peptides: {}", dc.trypn.unique.len())?;

    writeln!(w, "{}", SHORT_RULE)?;
    writeln!(w, "OUTPUT STATISTICS")?;
    writeln!(
        w,
        "Number of peptides unique to the Trypsin digest: {}",
        dc.trypsin_only()
    )?;
    writeln!(
        w,
        "Number of peptides unique to the TrypN digest: {}",
        dc.trypn_only()
    )?;
    writeln!(w, "Number of overlapping peptides: {}", dc.both())?;
    writeln!(
        w,
        "Number of undistinguishable peptides in Trypsin and TrypN files: {} {}",
        decimal(dc.trypsin.indistinguishable_pairs()),
        decimal(dc.trypn.indistinguishable_pairs())
    )?;

    writeln!(w, "{}", SHORT_RULE)?;
    writeln!(w, "SANITY CHECK")?;
    for sanity in dc.sanity().iter() {
        writeln!(w, "{}", verdict(sanity, "peptides"))?;
    }
    Ok(())
}

pub fn digest_report(prefix: &str, dc: &DigestComparison) -> io::Result<Report> {
    let mut report = Report::new();
    report.add(format!("{}_comparison_no_mods.log", prefix), |w| {
        write_digest_mapping(w, dc)
    })?;
    report.add(format!("{}_comparison_summary_no_mods.log", prefix), |w| {
        write_digest_summary(w, dc)
    })?;
    Ok(report)
}

#[cfg(test)]
mod test {
    use super::*;

    macro_rules! set {
        ($($k:expr),*) => {
            vec![$($k),*].into_iter().map(|s: &str| Accession(s.into())).collect::<BTreeSet<Accession>>()
        };
    }

    fn render<F: FnOnce(&mut Vec<u8>) -> io::Result<()>>(f: F) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn stats() -> CleavageStats {
        let mut state: ClassificationState<ModifiedPeptide> = ClassificationState::new("-");
        for (prev, seq, next) in &[("A", "PEPTIDE", "K"), ("-", "MPEPTIDE", "K")] {
            state
                .add(&Record {
                    previous: prev.to_string(),
                    sequence: seq.to_string(),
                    next: next.to_string(),
                    modification: "None".into(),
                    ..Record::default()
                })
                .unwrap();
        }
        CleavageStats::new("rep1.csv", &state).unwrap()
    }

    #[test]
    fn decimals() {
        assert_eq!(decimal(0.0), "0.0");
        assert_eq!(decimal(50.0), "50.0");
        assert_eq!(decimal(200.0 / 3.0), "66.66666666666667");
        assert_eq!(decimal(1.5), "1.5");
    }

    #[test]
    fn bracketed_lists() {
        assert_eq!(bracketed(&[]), "[None]");
        assert_eq!(
            bracketed(&["ABCK".to_string(), "ABCR".to_string()]),
            "['ABCK', 'ABCR']"
        );
    }

    #[test]
    fn cleavage_log() {
        let s = stats();
        let failures = vec![Failure {
            name: "rep2.csv".into(),
            message: "boom".into(),
        }];
        let text = render(|w| write_cleavage_log(w, &[s], &failures));
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "Filename.csv");
        assert_eq!(lines[2], RULE);
        assert_eq!(lines[3], "rep1.csv");
        assert_eq!(lines[4], "A\t0.0");
        let k = format!("K\t{}", decimal(percentage(2, 3)));
        let p = format!("P\t{}", decimal(percentage(1, 3)));
        assert!(lines.contains(&k.as_str()));
        assert!(lines.contains(&p.as_str()));
        assert!(lines.contains(&"rep1.csv\tTOTAL CLEAVAGES:\t3"));
        assert!(lines.contains(&"rep1.csv\tTOTAL UNIQUE PEPTIDES:\t2"));
        assert!(lines.contains(&"rep2.csv\tFAILED:\tboom"));
    }

    #[test]
    fn matrix_layout() {
        let text = render(|w| write_matrix(w, &[stats(), stats()]));
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 21);
        assert_eq!(lines[0], "\trep1\trep1");
        assert_eq!(lines[1], "A\t0.0\t0.0");
        assert!(lines.iter().all(|l| l.split('\t').count() == 3));
    }

    #[test]
    fn specificity_rows() {
        let k = decimal(percentage(2, 3));
        let other = decimal(percentage(1, 3));
        let text = render(|w| write_specificity(w, &[stats()]));
        assert_eq!(
            text,
            format!("Filename.csv\tK\tR\tOther\nrep1.csv\t{}\t0.0\t{}\n", k, other)
        );
        let text = render(|w| write_kr_unique(w, &[stats()]));
        assert_eq!(
            text,
            format!("Filename.csv\tKR_percent\tunique_peptides\nrep1.csv\t{}\t2\n", k)
        );
    }

    #[test]
    fn three_way_summary() {
        let cmp = Comparison::new(vec![
            ("r1.csv".to_string(), set!["a", "b", "c"]),
            ("r2.csv".to_string(), set!["b", "c", "d"]),
            ("r3.csv".to_string(), set!["c", "e"]),
        ])
        .unwrap();
        let text = render(|w| write_comparison(w, &cmp, "proteins", &[]));
        assert!(text.contains("Number of proteins in replicate 1 (total): 3"));
        assert!(text.contains("Number of proteins shared in replicates 1 and 2: 2"));
        assert!(text.contains("Number of proteins shared in replicates 1, 2, and 3: 1"));
        assert!(text.contains("Number of proteins in ONLY replicates 1 and 2: 1"));
        assert!(text.contains("All r3.csv proteins accounted for. PASS."));
        assert!(text.contains(
            "A = 1 , B =  1 , C =  1 , \"A&B\" = 1 , \"A&C\" = 0 , \"B&C\" = 0 , \"A&B&C\" = 1"
        ));
        assert!(!text.contains("SKIPPED"));
    }

    #[test]
    fn two_way_presence() {
        let cmp = Comparison::new(vec![
            ("Trypsin".to_string(), set!["P1", "P2"]),
            ("Tryp-N".to_string(), set!["P2", "P3"]),
        ])
        .unwrap();
        let text = render(|w| write_presence(w, &cmp));
        assert_eq!(
            text,
            "protein_id\tTrypsin\tTryp-N\nP1\t1\t0\nP2\t1\t1\nP3\t0\t1\n"
        );
        let text = render(|w| write_comparison(w, &cmp, "proteins", &[]));
        assert!(text.contains("Number of proteins unique to Trypsin: 1"));
        assert!(text.contains("Number of overlapping proteins: 1"));
        assert!(text.contains("All Tryp-N proteins accounted for. PASS."));
        assert!(text.contains("A = 1 , B =  1 , \"A&B\" = 1"));
    }

    #[test]
    fn digest_outputs() {
        let trypsin = Digest::new(
            Protease::Trypsin,
            "Trypsin.csv",
            vec!["ABCDEK".to_string(), "ABCDER".to_string(), "GGGK".to_string()],
        );
        let trypn = Digest::new(Protease::TrypN, "TrypN.csv", vec!["KABCDE".to_string()]);
        let dc = DigestComparison::new(trypsin, trypn).unwrap();

        let text = render(|w| write_digest_mapping(w, &dc));
        assert_eq!(
            text,
            "ABCDE\tTrypsin\t['ABCDEK', 'ABCDER']\tTrypN\t['KABCDE']\nGGG\tTrypsin\t['GGGK']\tTrypN\t[None]\n"
        );

        let text = render(|w| write_digest_summary(w, &dc));
        assert!(text.contains("Number of Tryptic peptides: 3"));
        assert!(text.contains("Number of overlapping peptides: 1"));
        assert!(text.contains("Trypsin and TrypN files: 1.0 0.0"));
        assert!(text.contains("All Trypsin peptides accounted for. PASS."));
        assert!(text.contains("All TrypN peptides accounted for. PASS."));
    }

    #[test]
    fn digest_summary_reports_failed_sanity() {
        let trypsin = Digest::new(
            Protease::Trypsin,
            "Trypsin.csv",
            vec!["ABCDE".to_string(), "ABCDEK".to_string()],
        );
        let trypn = Digest::new(Protease::TrypN, "TrypN.csv", vec!["KABCDE".to_string()]);
        let dc = DigestComparison::new(trypsin, trypn).unwrap();

        let text = render(|w| write_digest_summary(w, &dc));
        assert!(text.contains("Some Trypsin peptides not accounted for. FAIL."));
        assert!(text.contains("All TrypN peptides accounted for. PASS."));
    }

    #[test]
    fn atomic_write() {
        let dir = tempfile::tempdir().unwrap();
        let mut report = Report::new();
        report
            .add("x_table.log", |w| w.write_all(b"hello\n"))
            .unwrap();
        let written = report.write(dir.path().join("out")).unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(fs::read_to_string(&written[0]).unwrap(), "hello\n");

        // only the persisted report is left in the directory
        let entries = fs::read_dir(dir.path().join("out")).unwrap().count();
        assert_eq!(entries, 1);
    }
}
