//! One-to-one comparison of simple values.

/// Returns the action built by `make` if `old` and `new` differ.
///
/// ```
/// use catsync_diff::build_update_action;
///
/// let action = build_update_action(&"old name", &"new name", || "changeName");
/// assert_eq!(action, Some("changeName"));
/// assert_eq!(build_update_action(&1, &1, || "noop"), None);
/// ```
pub fn build_update_action<T, A>(old: &T, new: &T, make: impl FnOnce() -> A) -> Option<A>
where
    T: PartialEq + ?Sized,
{
    (old != new).then(make)
}
