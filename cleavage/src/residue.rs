use std::fmt;
use std::ops::{Index, IndexMut};

/// The twenty standard amino acids, in alphabetical order of their
/// one-letter code
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Residue {
    A,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    K,
    L,
    M,
    N,
    P,
    Q,
    R,
    S,
    T,
    V,
    W,
    Y,
}

impl Residue {
    pub const ALL: [Residue; 20] = [
        Residue::A,
        Residue::C,
        Residue::D,
        Residue::E,
        Residue::F,
        Residue::G,
        Residue::H,
        Residue::I,
        Residue::K,
        Residue::L,
        Residue::M,
        Residue::N,
        Residue::P,
        Residue::Q,
        Residue::R,
        Residue::S,
        Residue::T,
        Residue::V,
        Residue::W,
        Residue::Y,
    ];

    pub fn from_char(c: char) -> Option<Residue> {
        use Residue::*;
        Some(match c {
            'A' => A,
            'C' => C,
            'D' => D,
            'E' => E,
            'F' => F,
            'G' => G,
            'H' => H,
            'I' => I,
            'K' => K,
            'L' => L,
            'M' => M,
            'N' => N,
            'P' => P,
            'Q' => Q,
            'R' => R,
            'S' => S,
            'T' => T,
            'V' => V,
            'W' => W,
            'Y' => Y,
            _ => return None,
        })
    }

    /// Parse a flanking residue field, which must hold exactly one code
    pub fn from_field(field: &str) -> Option<Residue> {
        let mut chars = field.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Residue::from_char(c),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        // Variant names are the one-letter codes
        match self {
            Residue::A => 'A',
            Residue::C => 'C',
            Residue::D => 'D',
            Residue::E => 'E',
            Residue::F => 'F',
            Residue::G => 'G',
            Residue::H => 'H',
            Residue::I => 'I',
            Residue::K => 'K',
            Residue::L => 'L',
            Residue::M => 'M',
            Residue::N => 'N',
            Residue::P => 'P',
            Residue::Q => 'Q',
            Residue::R => 'R',
            Residue::S => 'S',
            Residue::T => 'T',
            Residue::V => 'V',
            Residue::W => 'W',
            Residue::Y => 'Y',
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Residue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Fixed-size table with one slot per [`Residue`]
#[derive(Clone, Debug, PartialEq)]
pub struct ResidueMap<T> {
    inner: [T; 20],
}

impl<T: Default> Default for ResidueMap<T> {
    fn default() -> Self {
        ResidueMap {
            inner: std::array::from_fn(|_| T::default()),
        }
    }
}

impl<T> ResidueMap<T> {
    /// Iterate over all slots in alphabetical residue order
    pub fn iter(&self) -> impl Iterator<Item = (Residue, &T)> {
        Residue::ALL.iter().copied().zip(self.inner.iter())
    }

    pub fn map<U, F: FnMut(&T) -> U>(&self, mut f: F) -> ResidueMap<U> {
        ResidueMap {
            inner: std::array::from_fn(|idx| f(&self.inner[idx])),
        }
    }
}

impl<T> Index<Residue> for ResidueMap<T> {
    type Output = T;

    fn index(&self, residue: Residue) -> &T {
        &self.inner[residue.index()]
    }
}

impl<T> IndexMut<Residue> for ResidueMap<T> {
    fn index_mut(&mut self, residue: Residue) -> &mut T {
        &mut self.inner[residue.index()]
    }
}
