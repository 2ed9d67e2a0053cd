//! Order-preserving fan-out over scoped worker threads.

use std::thread;

/// Apply `f` to every item on up to `workers` threads.
///
/// Items are split into contiguous chunks, one per worker. Results come back
/// in input order regardless of which thread finished first. `f` receives the
/// item's position in `items`.
pub fn fan_out<T, R, F>(items: &[T], workers: usize, f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(usize, &T) -> R + Sync,
{
    let workers = workers.clamp(1, items.len().max(1));
    if workers == 1 {
        return items.iter().enumerate().map(|(i, t)| f(i, t)).collect();
    }

    let chunk_size = items.len().div_ceil(workers);
    let f = &f;
    thread::scope(|scope| {
        let handles: Vec<_> = items
            .chunks(chunk_size)
            .enumerate()
            .map(|(n, chunk)| {
                scope.spawn(move || {
                    chunk
                        .iter()
                        .enumerate()
                        .map(|(i, t)| f(n * chunk_size + i, t))
                        .collect::<Vec<R>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_preserved() {
        let items: Vec<u32> = (0..1000).collect();
        for workers in [0, 1, 3, 16, 5000] {
            let out = fan_out(&items, workers, |i, x| (i, x * 2));
            assert_eq!(out.len(), 1000);
            assert!(out.iter().enumerate().all(|(n, (i, x))| n == *i && *x == n as u32 * 2));
        }
    }

    #[test]
    fn test_empty_input() {
        let items: Vec<u8> = Vec::new();
        assert!(fan_out(&items, 4, |_, x| *x).is_empty());
    }
}
