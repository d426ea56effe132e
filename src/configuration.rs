/// Sort algorithm used to rank the score matrix.
///
/// Only the stability of the algorithm is observable: stable kinds keep tied
/// scores in a deterministic order, unstable kinds leave it unspecified.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortKind {
    #[default]
    Quicksort,
    Heapsort,
    Mergesort,
    Stable,
}

impl SortKind {
    pub fn is_stable(&self) -> bool {
        matches!(self, SortKind::Mergesort | SortKind::Stable)
    }
}

pub struct Configuration {
    pub sort_kind: SortKind,
    pub omit_self_comparisons: bool,
}

impl Configuration {
    pub fn new(sort_kind: SortKind, omit_self_comparisons: bool) -> Self {
        Self {
            sort_kind,
            omit_self_comparisons,
        }
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new(SortKind::Quicksort, true)
    }
}
