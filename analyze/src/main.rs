// std imports
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

// 3rd party imports
use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use log::{error, info, warn, LevelFilter};
use rayon::prelude::*;

// internal imports
use cleavage::report::{self, Failure};
use cleavage::{
    Accession, CleavageStats, Comparison, Digest, DigestComparison, Export, Key,
    ModifiedPeptide, Protease, Sanity, Schema, Sequence,
};

/// Overrides for the positional layout of an export
#[derive(Debug, Default, Args)]
struct Layout {
    /// Data rows start after the first line beginning with this string
    #[arg(long)]
    marker: Option<String>,
    /// Rows to skip after the marker line
    #[arg(long)]
    skip_after_marker: Option<usize>,
    /// Zero-based column of the residue before the peptide
    #[arg(long)]
    previous_col: Option<usize>,
    /// Zero-based column of the peptide sequence
    #[arg(long)]
    sequence_col: Option<usize>,
    /// Zero-based column of the residue after the peptide
    #[arg(long)]
    next_col: Option<usize>,
    /// Zero-based column of the variable modification string
    #[arg(long)]
    modification_col: Option<usize>,
    /// Zero-based column of the protein accession
    #[arg(long)]
    accession_col: Option<usize>,
}

impl Layout {
    fn apply(&self, mut schema: Schema) -> Schema {
        if let Some(marker) = &self.marker {
            schema.marker = marker.clone();
        }
        if let Some(n) = self.skip_after_marker {
            schema.skip_after_marker = n;
        }
        let columns = [
            (&mut schema.previous, self.previous_col),
            (&mut schema.sequence, self.sequence_col),
            (&mut schema.next, self.next_col),
            (&mut schema.modification, self.modification_col),
            (&mut schema.accession, self.accession_col),
        ];
        for (slot, value) in columns {
            if value.is_some() {
                *slot = value;
            }
        }
        schema
    }
}

#[derive(Debug, Args)]
struct Output {
    /// Directory the report files are written to
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
    /// File name prefix of the reports
    #[arg(long)]
    prefix: Option<String>,
}

impl Output {
    fn prefix<'a>(&'a self, default: &'a str) -> &'a str {
        self.prefix.as_deref().unwrap_or(default)
    }

    fn write(&self, report: &report::Report) -> Result<()> {
        for path in report.write(&self.out_dir)? {
            info!("wrote {}", path.display());
        }
        Ok(())
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Per-residue cleavage frequencies of one or more peptide exports
    Cleavages {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Flanking residue value that marks a protein terminus
        #[arg(long, default_value = "-")]
        terminus: String,
        /// Treat differently modified forms of a sequence as one peptide
        #[arg(long, default_value_t = false, action = clap::ArgAction::SetTrue)]
        ignore_modifications: bool,
        #[command(flatten)]
        layout: Layout,
        #[command(flatten)]
        output: Output,
    },
    /// Overlap of unique peptides between two or three replicates
    ComparePeptides {
        #[arg(required = true, num_args = 2..=3)]
        files: Vec<PathBuf>,
        /// Comma separated labels, one per file; defaults to the file names
        #[arg(long, value_delimiter = ',')]
        labels: Vec<String>,
        #[arg(long, default_value_t = false, action = clap::ArgAction::SetTrue)]
        ignore_modifications: bool,
        #[command(flatten)]
        layout: Layout,
        #[command(flatten)]
        output: Output,
    },
    /// Overlap of identified proteins between two or three replicates
    CompareProteins {
        #[arg(required = true, num_args = 2..=3)]
        files: Vec<PathBuf>,
        #[arg(long, value_delimiter = ',')]
        labels: Vec<String>,
        #[command(flatten)]
        layout: Layout,
        #[command(flatten)]
        output: Output,
    },
    /// Reconcile a trypsin and a Tryp-N digest of the same sample
    CompareDigests {
        #[arg(long)]
        trypsin: PathBuf,
        #[arg(long)]
        trypn: PathBuf,
        #[command(flatten)]
        layout: Layout,
        #[command(flatten)]
        output: Output,
    },
}

#[derive(Debug, Parser)]
#[command(name = "analyze")]
struct Cli {
    /// Verbosity level
    /// 0 - Error
    /// 1 - Warn
    /// 2 - Info
    /// 3 - Debug
    /// > 3 - Trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

/// Open and process every file in parallel, keeping input order. Loaded
/// values are paired with the index of their file in `files`.
fn load_all<T, F>(
    files: &[PathBuf],
    schema: &Schema,
    f: F,
) -> (Vec<(usize, T)>, Vec<Failure>)
where
    T: Send,
    F: Fn(&Export) -> Result<T, cleavage::Error> + Sync,
{
    let results = files
        .par_iter()
        .map(|path| {
            let result = Export::open(path, schema.clone())
                .map_err(cleavage::Error::from)
                .and_then(|export| f(&export));
            (path.clone(), result)
        })
        .collect::<Vec<_>>();

    let mut loaded = Vec::new();
    let mut failures = Vec::new();
    for (idx, (path, result)) in results.into_iter().enumerate() {
        match result {
            Ok(value) => loaded.push((idx, value)),
            Err(e) => {
                error!("{}", e);
                failures.push(Failure::new(&path, e));
            }
        }
    }
    (loaded, failures)
}

fn warn_on_sanity(checks: &[Sanity]) {
    for s in checks.iter().filter(|s| !s.pass()) {
        warn!(
            "{}: {} unique items, {} accounted for ({} ambiguous)",
            s.label, s.total, s.accounted, s.ambiguous
        );
    }
}

fn finish(failures: &[Failure], total: usize) -> Result<()> {
    if !failures.is_empty() {
        bail!("{} of {} input files could not be processed", failures.len(), total);
    }
    Ok(())
}

fn cleavages(
    files: &[PathBuf],
    schema: &Schema,
    terminus: &str,
    ignore_modifications: bool,
    output: &Output,
) -> Result<()> {
    let (loaded, failures) = load_all(files, schema, |export| {
        if ignore_modifications {
            CleavageStats::load::<Sequence>(export, terminus)
        } else {
            CleavageStats::load::<ModifiedPeptide>(export, terminus)
        }
    });
    if loaded.is_empty() {
        bail!("none of the {} input files could be processed", files.len());
    }

    let stats = loaded.into_iter().map(|(_, s)| s).collect::<Vec<_>>();
    for s in &stats {
        info!(
            "{}: {} unique peptides, {} cleavages",
            s.name, s.unique, s.total_cleavages
        );
    }
    let report = report::cleavage_report(output.prefix("cleavage"), &stats, &failures)?;
    output.write(&report)?;
    finish(&failures, files.len())
}

/// Label each loaded value with `labels[idx]`, or its file name when no
/// labels were given
fn label_inputs<T>(files: &[PathBuf], labels: &[String], loaded: Vec<(usize, T)>) -> Vec<(String, T)> {
    loaded
        .into_iter()
        .map(|(idx, value)| {
            let label = labels
                .get(idx)
                .cloned()
                .unwrap_or_else(|| file_label(&files[idx]));
            (label, value)
        })
        .collect()
}

/// Load the key sets of every readable input and compare them. Unreadable
/// inputs are returned as failures as long as two inputs remain.
fn build_comparison<K: Key + Send>(
    files: &[PathBuf],
    labels: &[String],
    schema: &Schema,
) -> Result<(Comparison<K>, Vec<Failure>)> {
    if !labels.is_empty() && labels.len() != files.len() {
        bail!("got {} labels for {} files", labels.len(), files.len());
    }

    let (loaded, failures) = load_all(files, schema, cleavage::load_keys::<K>);
    if loaded.len() < 2 {
        bail!("a comparison needs at least two readable inputs");
    }
    let cmp = Comparison::new(label_inputs(files, labels, loaded))?;
    Ok((cmp, failures))
}

fn compare<K: Key + Send>(
    files: &[PathBuf],
    labels: &[String],
    schema: &Schema,
    noun: &str,
    output: &Output,
    default_prefix: &str,
) -> Result<()> {
    let (cmp, failures) = build_comparison::<K>(files, labels, schema)?;

    let checks = (0..cmp.len()).map(|i| cmp.sanity(i)).collect::<Vec<_>>();
    warn_on_sanity(&checks);
    report::write_venn_vector(&mut io::stdout().lock(), &cmp)?;

    let report = report::comparison_report(output.prefix(default_prefix), &cmp, noun, &failures)?;
    output.write(&report)?;
    finish(&failures, files.len())
}

fn compare_digests(trypsin: &Path, trypn: &Path, schema: &Schema, output: &Output) -> Result<()> {
    let load = |path: &Path, protease: Protease| -> Result<Digest, cleavage::Error> {
        let export = Export::open(path, schema.clone())?;
        Digest::load(&export, protease)
    };
    let (a, b) = rayon::join(
        || load(trypsin, Protease::Trypsin),
        || load(trypn, Protease::TrypN),
    );
    let dc = DigestComparison::new(a?, b?)?;

    warn_on_sanity(&dc.sanity());
    report::write_venn_vector(&mut io::stdout().lock(), &dc.comparison)?;

    let report = report::digest_report(output.prefix("peptide"), &dc)?;
    output.write(&report)
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let verbosity = match args.verbose {
        0 => LevelFilter::Error,
        1 => LevelFilter::Warn,
        2 => LevelFilter::Info,
        3 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(verbosity)
        .parse_default_env()
        .init();

    let start = Instant::now();
    let result = match args.command {
        Commands::Cleavages {
            files,
            terminus,
            ignore_modifications,
            layout,
            output,
        } => {
            let schema = layout.apply(Schema::peptides());
            cleavages(&files, &schema, &terminus, ignore_modifications, &output)
        }
        Commands::ComparePeptides {
            files,
            labels,
            ignore_modifications,
            layout,
            output,
        } => {
            let schema = layout.apply(Schema::peptides());
            if ignore_modifications {
                compare::<Sequence>(&files, &labels, &schema, "peptides", &output, "peptide")
            } else {
                compare::<ModifiedPeptide>(&files, &labels, &schema, "peptides", &output, "peptide")
            }
        }
        Commands::CompareProteins {
            files,
            labels,
            layout,
            output,
        } => {
            let schema = layout.apply(Schema::proteins());
            compare::<Accession>(&files, &labels, &schema, "proteins", &output, "protein")
        }
        Commands::CompareDigests {
            trypsin,
            trypn,
            layout,
            output,
        } => {
            let schema = layout.apply(Schema::sequences());
            compare_digests(&trypsin, &trypn, &schema, &output)
        }
    };
    info!("finished in {:.2?}", start.elapsed());
    result
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    fn peptide_row(prev: &str, seq: &str, next: &str) -> String {
        format!("{}{},{},{},\n", "1,".repeat(22), prev, seq, next)
    }

    fn write_export(dir: &Path, name: &str, rows: &[String]) -> PathBuf {
        let path = dir.join(name);
        let mut text = String::from("Header\nprot_hit_num,prot_acc\ncolumns\n");
        for row in rows {
            text.push_str(row);
        }
        fs::write(&path, text).unwrap();
        path
    }

    /// Three replicates, the middle one with a truncated row
    fn replicates(dir: &Path) -> Vec<PathBuf> {
        vec![
            write_export(
                dir,
                "r1.csv",
                &[peptide_row("K", "AAAK", "G"), peptide_row("K", "CCCK", "G")],
            ),
            write_export(dir, "bad.csv", &["1,2,3\n".to_string()]),
            write_export(
                dir,
                "r3.csv",
                &[peptide_row("K", "CCCK", "G"), peptide_row("K", "DDDK", "G")],
            ),
        ]
    }

    fn labels() -> Vec<String> {
        vec!["a".into(), "b".into(), "c".into()]
    }

    #[test]
    fn layout_overrides() {
        let layout = Layout {
            marker: Some("pep_seq".into()),
            sequence_col: Some(3),
            skip_after_marker: Some(0),
            ..Layout::default()
        };
        let schema = layout.apply(Schema::peptides());
        assert_eq!(schema.marker, "pep_seq");
        assert_eq!(schema.sequence, Some(3));
        assert_eq!(schema.skip_after_marker, 0);
        assert_eq!(schema.previous, Some(22));
        assert_eq!(schema.modification, Some(25));

        assert_eq!(Layout::default().apply(Schema::proteins()), Schema::proteins());
    }

    #[test]
    fn labels_follow_surviving_inputs() {
        let files = vec![PathBuf::from("x/one.csv"), PathBuf::from("two.csv"), PathBuf::from("three.csv")];
        let loaded = vec![(0, 'a'), (2, 'c')];
        assert_eq!(
            label_inputs(&files, &labels(), loaded.clone()),
            vec![("a".to_string(), 'a'), ("c".to_string(), 'c')]
        );
        assert_eq!(
            label_inputs(&files, &[], loaded),
            vec![("one.csv".to_string(), 'a'), ("three.csv".to_string(), 'c')]
        );
    }

    #[test]
    fn comparison_skips_unreadable_input() {
        let dir = tempfile::tempdir().unwrap();
        let files = replicates(dir.path());

        let (cmp, failures) =
            build_comparison::<Sequence>(&files, &labels(), &Schema::peptides()).unwrap();
        assert_eq!(cmp.len(), 2);
        assert_eq!(cmp.labels(), &["a".to_string(), "c".to_string()]);
        assert_eq!(cmp.intersection(0, 1).len(), 1);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].name, "bad.csv");
        assert!(failures[0].message.contains("expected at least 26 fields"));

        let output = Output {
            out_dir: dir.path().join("out"),
            prefix: None,
        };
        let result = compare::<ModifiedPeptide>(
            &files,
            &labels(),
            &Schema::peptides(),
            "peptides",
            &output,
            "peptide",
        );
        assert!(result.is_err());

        let log = fs::read_to_string(output.out_dir.join("peptide_comparison.log")).unwrap();
        assert!(log.contains("Number of a peptides: 2"));
        assert!(log.contains("Number of c peptides: 2"));
        assert!(log.contains("\nSKIPPED:\nbad.csv: "));
        let presence = fs::read_to_string(output.out_dir.join("peptide_presence.log")).unwrap();
        assert!(presence.starts_with("peptide\tmodifications\ta\tc\n"));
    }

    #[test]
    fn comparison_needs_two_readable_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let files = replicates(dir.path());
        assert!(build_comparison::<Sequence>(&files[..2], &[], &Schema::peptides()).is_err());
        assert!(build_comparison::<Sequence>(&files, &labels()[..2], &Schema::peptides()).is_err());
    }

    #[test]
    fn digests_read_short_rows() {
        let dir = tempfile::tempdir().unwrap();
        let short = |seq: &str| format!("{}{}\n", "1,".repeat(23), seq);
        let trypsin = write_export(dir.path(), "trypsin.csv", &[short("ABCDEK")]);
        let trypn = write_export(dir.path(), "trypn.csv", &[short("KABCDE")]);

        let output = Output {
            out_dir: dir.path().join("out"),
            prefix: Some("run".into()),
        };
        let schema = Layout::default().apply(Schema::sequences());
        compare_digests(&trypsin, &trypn, &schema, &output).unwrap();

        let mapping = fs::read_to_string(output.out_dir.join("run_comparison_no_mods.log")).unwrap();
        assert_eq!(mapping, "ABCDE\tTrypsin\t['ABCDEK']\tTrypN\t['KABCDE']\n");
    }
}
