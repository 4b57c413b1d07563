//! Venn-style overlap of two or three key sets
use super::*;

/// Result of checking that every unique item of one input lands in exactly
/// one Venn region
#[derive(Clone, Debug, PartialEq)]
pub struct Sanity {
    pub label: String,
    /// Unique items in the input
    pub total: usize,
    /// Items that share a key with a sibling; each pair counts as one item
    pub ambiguous: usize,
    /// Sum of the sizes of all regions that include this input
    pub accounted: usize,
}

impl Sanity {
    /// `total - ambiguous / 2 == accounted`, compared without halving
    pub fn pass(&self) -> bool {
        2 * self.total == 2 * self.accounted + self.ambiguous
    }
}

/// Two or three labelled sets of keys
#[derive(Clone, Debug)]
pub struct Comparison<K> {
    labels: Vec<String>,
    sets: Vec<BTreeSet<K>>,
}

impl<K: Ord + Clone> Comparison<K> {
    pub fn new(inputs: Vec<(String, BTreeSet<K>)>) -> Result<Comparison<K>, Error> {
        if !(2..=3).contains(&inputs.len()) {
            return Err(Error::Comparison(inputs.len()));
        }
        let (labels, sets) = inputs.into_iter().unzip();
        Ok(Comparison { labels, sets })
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn set(&self, i: usize) -> &BTreeSet<K> {
        &self.sets[i]
    }

    pub fn intersection(&self, i: usize, j: usize) -> BTreeSet<K> {
        self.sets[i].intersection(&self.sets[j]).cloned().collect()
    }

    /// Keys present in all three sets; empty for a two-way comparison
    pub fn triple(&self) -> BTreeSet<K> {
        if self.sets.len() < 3 {
            return BTreeSet::new();
        }
        self.sets[0]
            .iter()
            .filter(|k| self.sets[1].contains(k) && self.sets[2].contains(k))
            .cloned()
            .collect()
    }

    /// Keys of set `i` that appear in no other set
    pub fn exclusive(&self, i: usize) -> BTreeSet<K> {
        self.sets[i]
            .iter()
            .filter(|k| {
                self.sets
                    .iter()
                    .enumerate()
                    .all(|(j, other)| j == i || !other.contains(k))
            })
            .cloned()
            .collect()
    }

    /// Keys present in exactly sets `i` and `j`
    pub fn only_pair(&self, i: usize, j: usize) -> usize {
        self.intersection(i, j).len() - self.triple().len()
    }

    /// Pairs of set indices in report order: (0,1), (0,2), (1,2)
    pub fn pairs(&self) -> Vec<(usize, usize)> {
        let n = self.sets.len();
        (0..n)
            .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
            .collect()
    }

    /// Sizes of every region that includes set `i`
    pub fn accounted(&self, i: usize) -> usize {
        let pairs = self
            .pairs()
            .into_iter()
            .filter(|&(a, b)| a == i || b == i)
            .map(|(a, b)| self.only_pair(a, b))
            .sum::<usize>();
        self.exclusive(i).len() + pairs + self.triple().len()
    }

    pub fn sanity(&self, i: usize) -> Sanity {
        self.sanity_adjusted(i, self.sets[i].len(), 0)
    }

    /// Sanity check against an externally counted `total`, e.g. untrimmed
    /// sequences, of which `ambiguous` collapse pairwise onto one key
    pub fn sanity_adjusted(&self, i: usize, total: usize, ambiguous: usize) -> Sanity {
        Sanity {
            label: self.labels[i].clone(),
            total,
            ambiguous,
            accounted: self.accounted(i),
        }
    }

    /// Every key with its per-set presence flags, sorted by key
    pub fn entries(&self) -> BTreeMap<K, Vec<bool>> {
        let mut map: BTreeMap<K, Vec<bool>> = BTreeMap::new();
        let n = self.sets.len();
        for (idx, set) in self.sets.iter().enumerate() {
            for key in set {
                map.entry(key.clone()).or_insert_with(|| vec![false; n])[idx] = true;
            }
        }
        map
    }
}

/// Collect the distinct keys of an export. An export with no data rows is
/// an [`Error::EmptyDataset`].
pub fn load_keys<K: Key>(export: &Export) -> Result<BTreeSet<K>, Error> {
    let mut keys = BTreeSet::new();
    let mut rows = 0;
    for record in export.records() {
        keys.insert(K::from_record(&record?));
        rows += 1;
    }
    if keys.is_empty() {
        return Err(Error::EmptyDataset {
            path: export.path.clone(),
            reason: String::from("no data rows after the header marker"),
        });
    }
    debug!(
        "{}: {} rows, {} distinct keys",
        export.path.display(),
        rows,
        keys.len()
    );
    Ok(keys)
}
