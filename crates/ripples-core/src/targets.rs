use smallvec::SmallVec;

use crate::Element;

pub type Targets<T> = SmallVec<[T; 4]>;

/// One value or a sequence of values, normalized to a list.
///
/// Lets [`Store::ripple`](crate::Store::ripple) take `Slice::Todos` as well as
/// `[Slice::Todos, Slice::Filter]`, and `&el` as well as `vec![a, b]`.
pub trait IntoTargets<T> {
    fn into_targets(self) -> Targets<T>;
}

impl<T> IntoTargets<T> for T {
    fn into_targets(self) -> Targets<T> {
        smallvec::smallvec![self]
    }
}

impl<T> IntoTargets<T> for Vec<T> {
    fn into_targets(self) -> Targets<T> {
        self.into_iter().collect()
    }
}

impl<T: Clone> IntoTargets<T> for &[T] {
    fn into_targets(self) -> Targets<T> {
        self.iter().cloned().collect()
    }
}

impl<T, const N: usize> IntoTargets<T> for [T; N] {
    fn into_targets(self) -> Targets<T> {
        self.into_iter().collect()
    }
}

impl IntoTargets<Element> for &Element {
    fn into_targets(self) -> Targets<Element> {
        smallvec::smallvec![self.clone()]
    }
}

impl<const N: usize> IntoTargets<Element> for [&Element; N] {
    fn into_targets(self) -> Targets<Element> {
        self.into_iter().cloned().collect()
    }
}
