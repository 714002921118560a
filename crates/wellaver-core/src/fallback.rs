//! Sequential fallback: try candidates in order, stop at the first success.

use std::fmt;
use std::future::Future;

/// Every candidate failed. Errors are kept in attempt order.
#[derive(Debug)]
pub struct FallbackError<E> {
    pub errors: Vec<E>,
}

impl<E: fmt::Display> fmt::Display for FallbackError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            return write!(f, "no candidates to try");
        }
        write!(f, "all {} candidates failed", self.errors.len())?;
        for (i, e) in self.errors.iter().enumerate() {
            write!(f, "; #{i}: {e}")?;
        }
        Ok(())
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for FallbackError<E> {}

/// Await `attempt` for each candidate until one succeeds. Returns the index of
/// the winning candidate with its value. Later candidates are never tried.
pub async fn first_ok<C, T, E, F, Fut>(
    candidates: impl IntoIterator<Item = C>,
    mut attempt: F,
) -> Result<(usize, T), FallbackError<E>>
where
    F: FnMut(C) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    let mut errors = Vec::new();
    for (i, c) in candidates.into_iter().enumerate() {
        match attempt(c).await {
            Ok(v) => return Ok((i, v)),
            Err(e) => {
                log::warn!("[fallback] candidate #{} failed: {}", i, e);
                errors.push(e);
            }
        }
    }
    Err(FallbackError { errors })
}

/// Blocking variant of [`first_ok`].
pub fn first_ok_sync<C, T, E, F>(
    candidates: impl IntoIterator<Item = C>,
    mut attempt: F,
) -> Result<(usize, T), FallbackError<E>>
where
    F: FnMut(C) -> Result<T, E>,
    E: fmt::Display,
{
    let mut errors = Vec::new();
    for (i, c) in candidates.into_iter().enumerate() {
        match attempt(c) {
            Ok(v) => return Ok((i, v)),
            Err(e) => {
                log::warn!("[fallback] candidate #{} failed: {}", i, e);
                errors.push(e);
            }
        }
    }
    Err(FallbackError { errors })
}
