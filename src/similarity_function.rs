use crate::error::Error;

/// Scoring strategy comparing a query with a reference.
///
/// Plain closures `Fn(&S, &S) -> f64` implement this trait directly, fallible closures
/// can be wrapped in [`TryFn`].
///
pub trait SimilarityFunction<S> {
    /// Scores `query` against `reference`.
    fn pair(&self, query: &S, reference: &S) -> Result<f64, Error>;
}

impl<S, F> SimilarityFunction<S> for F
where
    F: Fn(&S, &S) -> f64,
{
    fn pair(&self, query: &S, reference: &S) -> Result<f64, Error> {
        Ok(self(query, reference))
    }
}

/// Adapter for closures which may fail. The closure's error is boxed into [`Error::Similarity`].
pub struct TryFn<F>(pub F);

impl<S, F, E> SimilarityFunction<S> for TryFn<F>
where
    F: Fn(&S, &S) -> Result<f64, E>,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    fn pair(&self, query: &S, reference: &S) -> Result<f64, Error> {
        (self.0)(query, reference).map_err(|err| Error::Similarity(err.into()))
    }
}
