/// Splits `items` into consecutive chunks of `size` items, preserving order.
///
/// The last chunk may be smaller. A `size` of 0 is treated as 1.
///
/// ```
/// use catsync_batch::chunk;
///
/// assert_eq!(chunk((1..=5).collect(), 2), vec![vec![1, 2], vec![3, 4], vec![5]]);
/// assert!(chunk(Vec::<u8>::new(), 3).is_empty());
/// ```
pub fn chunk<T>(items: Vec<T>, size: usize) -> Vec<Vec<T>> {
    let size = size.max(1);
    let mut chunks = Vec::with_capacity(items.len().div_ceil(size));
    let mut current = Vec::with_capacity(size.min(items.len()));
    for item in items {
        current.push(item);
        if current.len() == size {
            chunks.push(std::mem::replace(&mut current, Vec::with_capacity(size)));
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
