/// Yields only the finite observations of the wrapped iterator.
///
/// Created by [`ObservationIterator::finite`](crate::iter::ObservationIterator::finite).
#[derive(Clone, Debug)]
pub struct Finite<I> {
    iter: I,
}

impl<I> Finite<I> {
    pub(crate) fn new(iter: I) -> Self {
        Self { iter }
    }
}

impl<I: Iterator<Item = f64>> Iterator for Finite<I> {
    type Item = f64;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.by_ref().find(|value| value.is_finite())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.iter.size_hint().1)
    }
}
