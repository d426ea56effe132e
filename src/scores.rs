use std::fmt;

use ndarray::Array2;

use crate::{
    configuration::{Configuration, SortKind},
    error::Error,
    similarity_function::SimilarityFunction,
};

/// Pairwise scores between a set of queries and a set of references.
///
/// The score matrix has one row per reference and one column per query, so
/// `scores()[[i, j]]` holds the similarity of query `j` against reference `i`.
///
/// ```rust
/// use specscores::{configuration::SortKind, scores::Scores};
///
/// let similarity = |query: &u32, reference: &u32| if query == reference { 1.0 } else { 0.5 };
/// let mut scores = Scores::new(vec![1, 2], vec![1, 3], similarity);
/// scores.calculate().unwrap();
///
/// let top = scores.top(1, SortKind::Stable, true);
/// assert_eq!(top.scores, vec![0.5]);
/// ```
///
pub struct Scores<S, F> {
    queries: Vec<S>,
    references: Vec<S>,
    similarity_function: F,
    scores: Array2<f64>,
}

/// Score cells in rank order, highest score first.
///
/// The three vectors are parallel: position `k` holds the query, reference and score of rank `k`.
#[derive(Debug, PartialEq)]
pub struct Ranking<'a, S> {
    pub queries: Vec<&'a S>,
    pub references: Vec<&'a S>,
    pub scores: Vec<f64>,
}

impl<'a, S> Ranking<'a, S> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            queries: Vec::with_capacity(capacity),
            references: Vec::with_capacity(capacity),
            scores: Vec::with_capacity(capacity),
        }
    }

    fn push(&mut self, query: &'a S, reference: &'a S, score: f64) {
        self.queries.push(query);
        self.references.push(reference);
        self.scores.push(score);
    }

    fn truncate(&mut self, len: usize) {
        self.queries.truncate(len);
        self.references.truncate(len);
        self.scores.truncate(len);
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Iterates `(query, reference, score)` in rank order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a S, &'a S, f64)> + '_ {
        self.queries
            .iter()
            .zip(self.references.iter())
            .zip(self.scores.iter())
            .map(|((query, reference), score)| (*query, *reference, *score))
    }
}

impl<'a, S> FromIterator<(&'a S, &'a S, f64)> for Ranking<'a, S> {
    fn from_iter<I: IntoIterator<Item = (&'a S, &'a S, f64)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut ranking = Ranking::with_capacity(iter.size_hint().0);
        for (query, reference, score) in iter {
            ranking.push(query, reference, score);
        }
        ranking
    }
}

impl<S, F> Scores<S, F>
where
    F: SimilarityFunction<S>,
{
    /// Creates a new Scores instance with a zero-filled matrix. Its values are meaningless until
    /// [`Scores::calculate`] ran.
    ///
    /// # Arguments
    /// * `queries` - Spectra to compare against every reference.
    /// * `references` - Spectra every query is compared against.
    /// * `similarity_function` - Scoring strategy, called as `(query, reference)`.
    ///
    pub fn new<Q, R>(queries: Q, references: R, similarity_function: F) -> Self
    where
        Q: IntoIterator<Item = S>,
        R: IntoIterator<Item = S>,
    {
        let queries: Vec<S> = queries.into_iter().collect();
        let references: Vec<S> = references.into_iter().collect();
        let scores = Array2::zeros((references.len(), queries.len()));

        Self {
            queries,
            references,
            similarity_function,
            scores,
        }
    }

    /// Same as [`Scores::new`] for nested collections, which are flattened in order.
    pub fn from_nested<Q, R>(queries: Q, references: R, similarity_function: F) -> Self
    where
        Q: IntoIterator,
        Q::Item: IntoIterator<Item = S>,
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
    {
        Self::new(
            queries.into_iter().flatten(),
            references.into_iter().flatten(),
            similarity_function,
        )
    }

    /// Creates a new Scores instance from an already filled score matrix.
    ///
    /// # Arguments
    /// * `queries` - Spectra to compare against every reference.
    /// * `references` - Spectra every query is compared against.
    /// * `similarity_function` - Scoring strategy, called as `(query, reference)`.
    /// * `scores` - Matrix of shape (number of references, number of queries).
    ///
    pub fn with_scores<Q, R>(
        queries: Q,
        references: R,
        similarity_function: F,
        scores: Array2<f64>,
    ) -> Result<Self, Error>
    where
        Q: IntoIterator<Item = S>,
        R: IntoIterator<Item = S>,
    {
        let mut instance = Self::new(queries, references, similarity_function);

        let expected = (instance.references.len(), instance.queries.len());
        if scores.dim() != expected {
            return Err(Error::ShapeMismatch {
                expected,
                found: scores.dim(),
            });
        }

        instance.scores = scores;
        Ok(instance)
    }

    /// Scores every query against every reference.
    ///
    /// Stops at the first failing similarity call and returns its error, cells after it keep
    /// their previous values.
    ///
    pub fn calculate(&mut self) -> Result<&mut Self, Error> {
        for (i_ref, reference) in self.references.iter().enumerate() {
            for (i_query, query) in self.queries.iter().enumerate() {
                self.scores[[i_ref, i_query]] = self.similarity_function.pair(query, reference)?;
            }
        }
        Ok(self)
    }
}

impl<S, F> Scores<S, F> {
    pub fn queries(&self) -> &[S] {
        &self.queries
    }

    pub fn references(&self) -> &[S] {
        &self.references
    }

    pub fn similarity_function(&self) -> &F {
        &self.similarity_function
    }

    pub fn scores(&self) -> &Array2<f64> {
        &self.scores
    }

    /// Ranks all cells of the score matrix, highest score first.
    ///
    /// Cells are sorted ascending with the algorithm chosen by `kind` and the result is reversed,
    /// so with a stable `kind` tied scores come out in descending row-major cell order.
    /// NaN scores of either sign rank above everything else, `-0.0` and `0.0` tie.
    ///
    /// # Arguments
    /// * `kind` - Sort algorithm, decides the order of ties.
    ///
    pub fn sort(&self, kind: SortKind) -> Ranking<'_, S> {
        let n_queries = self.queries.len();
        let flat_scores: Vec<f64> = self.scores.iter().copied().collect();

        let mut order: Vec<usize> = (0..flat_scores.len()).collect();
        let ascending = |a: &usize, b: &usize| {
            let (a, b) = (flat_scores[*a], flat_scores[*b]);
            a.partial_cmp(&b)
                .unwrap_or_else(|| a.is_nan().cmp(&b.is_nan()))
        };
        if kind.is_stable() {
            order.sort_by(ascending);
        } else {
            order.sort_unstable_by(ascending);
        }
        order.reverse();

        let mut ranking = Ranking::with_capacity(order.len());
        for flat_index in order {
            let (row, column) = (flat_index / n_queries, flat_index % n_queries);
            ranking.push(
                &self.queries[column],
                &self.references[row],
                flat_scores[flat_index],
            );
        }
        ranking
    }

    /// Returns the `n` best ranked `(query, reference, score)` triples.
    ///
    /// # Arguments
    /// * `n` - Maximum number of triples, fewer are returned if fewer are available.
    /// * `kind` - Sort algorithm, see [`Scores::sort`].
    /// * `omit_self_comparisons` - Skip triples whose query equals its reference.
    ///
    pub fn top(&self, n: usize, kind: SortKind, omit_self_comparisons: bool) -> Ranking<'_, S>
    where
        S: PartialEq,
    {
        let mut ranking = self.sort(kind);

        if omit_self_comparisons {
            return ranking
                .iter()
                .filter(|(query, reference, _)| query != reference)
                .take(n)
                .collect();
        }

        ranking.truncate(n);
        ranking
    }

    /// [`Scores::top`] with sort kind and self-comparison handling taken from `config`.
    pub fn top_with(&self, n: usize, config: &Configuration) -> Ranking<'_, S>
    where
        S: PartialEq,
    {
        self.top(n, config.sort_kind, config.omit_self_comparisons)
    }
}

impl<S, F> fmt::Display for Scores<S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.scores)
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;
    use rayon::prelude::*;

    use super::*;
    use crate::{
        similarity_function::TryFn,
        spectrum::{Spectrum, SpectrumBuilder},
    };

    fn spectrum(mz: f64) -> Spectrum {
        SpectrumBuilder::new()
            .with_mz(vec![mz])
            .with_intensities(vec![1.0])
            .build()
            .unwrap()
    }

    fn equal_or_half(query: &Spectrum, reference: &Spectrum) -> f64 {
        if query == reference {
            1.0
        } else {
            0.5
        }
    }

    /// Queries [A, B], references [A, C].
    fn abac_scores() -> Scores<Spectrum, fn(&Spectrum, &Spectrum) -> f64> {
        let (a, b, c) = (spectrum(100.0), spectrum(200.0), spectrum(300.0));
        let mut scores = Scores::new(
            vec![a.clone(), b],
            vec![a, c],
            equal_or_half as fn(&Spectrum, &Spectrum) -> f64,
        );
        scores.calculate().unwrap();
        scores
    }

    /// Deterministic spread of scores with plenty of ties.
    fn modulo_similarity(query: &usize, reference: &usize) -> f64 {
        ((query * 7 + reference * 13) % 5) as f64
    }

    #[test]
    fn test_calculate_matrix() {
        let scores = abac_scores();
        assert_eq!(scores.scores(), &array![[1.0, 0.5], [0.5, 0.5]]);
    }

    #[test]
    fn test_calculate_shape_and_values() {
        for (n_queries, n_references) in [(0_usize, 0_usize), (0, 3), (4, 0), (1, 1), (3, 5)] {
            let mut scores = Scores::new(0..n_queries, 0..n_references, modulo_similarity);
            scores.calculate().unwrap();
            assert_eq!(scores.scores().dim(), (n_references, n_queries));

            for (i_ref, reference) in scores.references().iter().enumerate() {
                for (i_query, query) in scores.queries().iter().enumerate() {
                    assert_eq!(
                        scores.scores()[[i_ref, i_query]],
                        modulo_similarity(query, reference)
                    );
                }
            }
        }
    }

    #[test]
    fn test_calculate_chaining() {
        let mut scores = Scores::new(vec![1_usize, 2], vec![3_usize], modulo_similarity);
        let ranked = scores.calculate().unwrap().sort(SortKind::Quicksort).len();
        assert_eq!(ranked, 2);
    }

    #[test]
    fn test_from_nested_flattens_in_order() {
        let scores = Scores::from_nested(
            vec![vec![1_usize, 2], vec![], vec![3]],
            vec![vec![4_usize], vec![5]],
            modulo_similarity,
        );
        assert_eq!(scores.queries(), &[1, 2, 3]);
        assert_eq!(scores.references(), &[4, 5]);
        assert_eq!(scores.scores().dim(), (2, 3));
    }

    #[test]
    fn test_with_scores_shape_mismatch() {
        let result = Scores::with_scores(
            vec![1_usize, 2],
            vec![3_usize],
            modulo_similarity,
            Array2::zeros((2, 1)),
        );
        match result {
            Err(Error::ShapeMismatch { expected, found }) => {
                assert_eq!(expected, (1, 2));
                assert_eq!(found, (2, 1));
            }
            _ => panic!("expected a shape mismatch"),
        }
    }

    #[test]
    fn test_with_scores_ranks_given_matrix() {
        let scores = Scores::with_scores(
            vec![1_usize, 2],
            vec![3_usize],
            modulo_similarity,
            array![[0.25, 0.75]],
        )
        .unwrap();
        let ranking = scores.sort(SortKind::Stable);
        assert_eq!(ranking.queries, vec![&2, &1]);
        assert_eq!(ranking.scores, vec![0.75, 0.25]);
    }

    #[test]
    fn test_calculate_propagates_similarity_error() {
        let failing = TryFn(|query: &usize, reference: &usize| {
            if *reference == 1 && *query == 0 {
                Err(format!("cannot score {query} against {reference}"))
            } else {
                Ok(1.0)
            }
        });
        let mut scores = Scores::new(0..2_usize, 0..2_usize, failing);

        match scores.calculate() {
            Err(Error::Similarity(err)) => assert_eq!(err.to_string(), "cannot score 0 against 1"),
            Err(err) => panic!("unexpected error: {err}"),
            Ok(_) => panic!("expected the similarity error"),
        }
        // First reference row was scored before the failure
        assert_eq!(scores.scores()[[0, 0]], 1.0);
        assert_eq!(scores.scores()[[0, 1]], 1.0);
        assert_eq!(scores.scores()[[1, 1]], 0.0);
    }

    #[test]
    fn test_sort_ranks_self_comparison_first() {
        let scores = abac_scores();
        let ranking = scores.sort(SortKind::Quicksort);

        assert_eq!(ranking.len(), 4);
        assert_eq!(ranking.scores, vec![1.0, 0.5, 0.5, 0.5]);
        assert_eq!(ranking.queries[0], &scores.queries()[0]);
        assert_eq!(ranking.references[0], &scores.references()[0]);
    }

    #[test]
    fn test_stable_sort_tie_order() {
        let scores = abac_scores();
        let ranking = scores.sort(SortKind::Stable);
        let (queries, references) = (scores.queries(), scores.references());

        // Ties come out in descending row-major cell order: (1, 1), (1, 0), (0, 1)
        assert_eq!(
            ranking.queries,
            vec![&queries[0], &queries[1], &queries[0], &queries[1]]
        );
        assert_eq!(
            ranking.references,
            vec![&references[0], &references[1], &references[1], &references[0]]
        );
        assert_eq!(ranking, scores.sort(SortKind::Mergesort));
    }

    #[test]
    fn test_sort_is_non_increasing() {
        let mut scores = Scores::new(0..9_usize, 0..7_usize, modulo_similarity);
        scores.calculate().unwrap();

        for kind in [
            SortKind::Quicksort,
            SortKind::Heapsort,
            SortKind::Mergesort,
            SortKind::Stable,
        ] {
            let ranking = scores.sort(kind);
            assert_eq!(ranking.len(), 63);
            assert!(ranking.scores.windows(2).all(|pair| pair[0] >= pair[1]));
            for (query, reference, score) in ranking.iter() {
                assert_eq!(score, modulo_similarity(query, reference));
            }
        }
    }

    #[test]
    fn test_sort_nan_ranks_first() {
        let scores = Scores::with_scores(
            vec![1_usize, 2, 3],
            vec![4_usize],
            modulo_similarity,
            array![[0.5, f64::NAN, 1.0]],
        )
        .unwrap();
        let ranking = scores.sort(SortKind::Stable);
        assert!(ranking.scores[0].is_nan());
        assert_eq!(&ranking.scores[1..], &[1.0, 0.5]);
    }

    #[test]
    fn test_sort_negative_nan_ranks_first() {
        for kind in [SortKind::Quicksort, SortKind::Stable] {
            let scores = Scores::with_scores(
                vec![1_usize, 2, 3, 4],
                vec![5_usize],
                modulo_similarity,
                array![[0.5, -f64::NAN, 1.0, f64::NAN]],
            )
            .unwrap();
            let ranking = scores.sort(kind);
            assert!(ranking.scores[0].is_nan());
            assert!(ranking.scores[1].is_nan());
            assert_eq!(&ranking.scores[2..], &[1.0, 0.5]);
        }
    }

    #[test]
    fn test_stable_sort_signed_zeros_tie() {
        let scores = Scores::with_scores(
            vec![1_usize, 2],
            vec![3_usize],
            modulo_similarity,
            array![[0.0, -0.0]],
        )
        .unwrap();

        // Tied cells come out in descending cell order
        let ranking = scores.sort(SortKind::Stable);
        assert_eq!(ranking.queries, vec![&2, &1]);
    }

    #[test]
    fn test_empty_inputs() {
        let mut scores = Scores::new(Vec::<usize>::new(), 0..3_usize, modulo_similarity);
        scores.calculate().unwrap();
        assert_eq!(scores.scores().dim(), (3, 0));
        assert!(scores.sort(SortKind::Quicksort).is_empty());
        assert!(scores.top(5, SortKind::Quicksort, true).is_empty());
        assert!(scores.top(5, SortKind::Quicksort, false).is_empty());
    }

    #[test]
    fn test_top_omits_self_comparisons() {
        let scores = abac_scores();
        let top = scores.top(1, SortKind::Quicksort, true);

        assert_eq!(top.len(), 1);
        assert_eq!(top.scores, vec![0.5]);
        assert_ne!(top.queries[0], top.references[0]);
    }

    #[test]
    fn test_top_stable_first_non_self_comparison() {
        let scores = abac_scores();
        let top = scores.top(1, SortKind::Stable, true);

        // Cell (1, 1): query B against reference C
        assert_eq!(top.queries, vec![&scores.queries()[1]]);
        assert_eq!(top.references, vec![&scores.references()[1]]);
    }

    #[test]
    fn test_top_never_returns_self_comparisons() {
        let mut scores = Scores::new(0..6_usize, 2..8_usize, modulo_similarity);
        scores.calculate().unwrap();

        for n in 0..40 {
            let top = scores.top(n, SortKind::Quicksort, true);
            assert_eq!(top.len(), n.min(36 - 4));
            assert!(top.iter().all(|(query, reference, _)| query != reference));
        }
    }

    #[test]
    fn test_top_without_omission_is_prefix_of_sort() {
        let mut scores = Scores::new(0..4_usize, 0..3_usize, modulo_similarity);
        scores.calculate().unwrap();
        let sorted = scores.sort(SortKind::Stable);

        for n in [0, 1, 5, 12, 20] {
            let top = scores.top(n, SortKind::Stable, false);
            let expected: Ranking<'_, usize> = sorted.iter().take(n).collect();
            assert_eq!(top, expected);
        }
    }

    #[test]
    fn test_top_zero() {
        let scores = abac_scores();
        assert!(scores.top(0, SortKind::Quicksort, true).is_empty());
        assert!(scores.top(0, SortKind::Quicksort, false).is_empty());
    }

    #[test]
    fn test_top_with_configuration() {
        let scores = abac_scores();
        let top = scores.top_with(10, &Configuration::default());
        assert_eq!(top.len(), 3);

        let config = Configuration::new(SortKind::Stable, false);
        assert_eq!(scores.top_with(10, &config), scores.sort(SortKind::Stable));
    }

    #[test]
    fn test_concurrent_ranking() {
        let mut scores = Scores::new(0..20_usize, 0..20_usize, modulo_similarity);
        scores.calculate().unwrap();
        let expected = scores.top(50, SortKind::Stable, true);

        let rankings: Vec<Ranking<'_, usize>> = (0..16)
            .into_par_iter()
            .map(|_| scores.top(50, SortKind::Stable, true))
            .collect();
        assert!(rankings.iter().all(|ranking| *ranking == expected));
    }

    #[test]
    fn test_display_prints_matrix() {
        let scores = abac_scores();
        assert_eq!(scores.to_string(), scores.scores().to_string());
    }
}
