use isofem::dense::DenseMatrix;
use isofem::pool::{with_thread_local_pool, BufferPool, MatrixPool, PoolConfig, PoolStats};
use isofem::Error;
use util::assert_panics;

#[test]
fn zero_length_requests_are_not_pooled() {
    let mut pool = MatrixPool::new();
    let buffer = pool.allocate(0);
    assert!(buffer.is_empty());
    pool.free(buffer);
    assert_eq!(pool.stats(), PoolStats::default());
    assert_eq!(pool.available(0), 0);
}

#[test]
fn rented_buffers_are_zeroed() {
    let mut pool = MatrixPool::new();
    let mut buffer = pool.allocate(6);
    buffer.fill(3.0);
    pool.free(buffer);

    let buffer = pool.allocate(6);
    assert_eq!(buffer, vec![0.0; 6]);
    assert_eq!(pool.stats().recycled, 1);
}

#[test]
fn round_trip_reuses_storage_up_to_depth() {
    let mut pool = BufferPool::<f64>::with_config(PoolConfig { max_depth: 4 });

    let buffers: Vec<_> = (0..4).map(|_| pool.allocate(9)).collect();
    assert_eq!(pool.stats().fresh_allocations, 4);
    for buffer in buffers {
        pool.free(buffer);
    }
    assert_eq!(pool.available(9), 4);

    let buffers: Vec<_> = (0..4).map(|_| pool.allocate(9)).collect();
    let stats = pool.stats();
    assert_eq!(stats.rents, 8);
    assert_eq!(stats.fresh_allocations, 4);
    assert_eq!(stats.recycled, 4);
    for buffer in buffers {
        pool.free(buffer);
    }
}

#[test]
fn returns_beyond_depth_are_dropped() {
    let mut pool = BufferPool::<f64>::with_config(PoolConfig { max_depth: 2 });
    let buffers: Vec<_> = (0..5).map(|_| pool.allocate(3)).collect();
    for buffer in buffers {
        pool.free(buffer);
    }

    let stats = pool.stats();
    assert_eq!(stats.returned, 2);
    assert_eq!(stats.discarded, 3);
    assert_eq!(pool.available(3), 2);

    // Only the retained buffers are recycled
    let _buffers: Vec<_> = (0..5).map(|_| pool.allocate(3)).collect();
    let stats = pool.stats();
    assert_eq!(stats.recycled, 2);
    assert_eq!(stats.fresh_allocations, 8);
}

#[test]
fn free_lists_are_keyed_by_length() {
    let mut pool = MatrixPool::new();
    let a = pool.allocate(4);
    let b = pool.allocate(16);
    pool.free(a);
    pool.free(b);
    assert_eq!(pool.available(4), 1);
    assert_eq!(pool.available(16), 1);

    let c = pool.allocate(8);
    assert_eq!(c.len(), 8);
    assert_eq!(pool.stats().recycled, 0);

    pool.clear();
    assert_eq!(pool.available(4), 0);
    assert_eq!(pool.available(16), 0);
}

#[test]
fn matrices_return_to_their_own_pool() {
    let mut pool = MatrixPool::new();
    let matrix = DenseMatrix::from_pool(&mut pool, 3, 4);
    assert!(matrix.is_pooled());
    matrix.return_to_pool(&mut pool).unwrap();
    assert_eq!(pool.available(12), 1);

    let again = DenseMatrix::from_pool(&mut pool, 4, 3);
    assert_eq!(pool.stats().recycled, 1);
    again.return_to_pool(&mut pool).unwrap();
}

#[test]
fn returning_to_a_foreign_pool_is_misuse() {
    let mut owner = MatrixPool::new();
    let mut other = MatrixPool::new();
    assert_ne!(owner.id(), other.id());

    let matrix = DenseMatrix::from_pool(&mut owner, 2, 2);
    let err = matrix.return_to_pool(&mut other).unwrap_err();
    assert!(matches!(err, Error::PoolMisuse(_)));
    assert_eq!(other.available(4), 0);
}

#[test]
fn unpooled_and_detached_matrices_return_as_no_op() {
    let mut pool = MatrixPool::new();
    DenseMatrix::zeros(2, 2).return_to_pool(&mut pool).unwrap();

    let detached = DenseMatrix::from_pool(&mut pool, 2, 2).detach();
    assert!(!detached.is_pooled());
    detached.return_to_pool(&mut pool).unwrap();
    assert_eq!(pool.available(4), 0);
}

#[test]
fn clones_are_unpooled() {
    let mut pool = MatrixPool::new();
    let matrix = DenseMatrix::from_pool(&mut pool, 2, 3);
    let copy = matrix.clone();
    assert!(!copy.is_pooled());
    assert_eq!(copy, matrix);

    let pooled_copy = matrix.clone_pooled(&mut pool);
    assert!(pooled_copy.is_pooled());
    matrix.return_to_pool(&mut pool).unwrap();
    pooled_copy.return_to_pool(&mut pool).unwrap();
    assert_eq!(pool.available(6), 2);
}

#[test]
fn thread_local_pool_persists_between_calls() {
    let id = with_thread_local_pool(|pool| {
        let matrix = DenseMatrix::from_pool(pool, 5, 5);
        matrix.return_to_pool(pool).unwrap();
        pool.id()
    });
    with_thread_local_pool(|pool| {
        assert_eq!(pool.id(), id);
        assert!(pool.available(25) >= 1);
    });

    let other_thread_id = std::thread::spawn(|| with_thread_local_pool(|pool| pool.id()))
        .join()
        .unwrap();
    assert_ne!(other_thread_id, id);
}

#[test]
fn nested_thread_local_pool_access_panics() {
    std::thread::spawn(|| {
        assert_panics!(with_thread_local_pool(|_| with_thread_local_pool(|pool| pool.id())));
        // The borrow is released during unwinding
        with_thread_local_pool(|pool| {
            let matrix = DenseMatrix::from_pool(pool, 2, 2);
            matrix.return_to_pool(pool).unwrap();
        });
    })
    .join()
    .unwrap();
}

#[test]
fn pool_config_deserialization() {
    let config: PoolConfig = serde_json::from_str(r#"{ "max_depth": 7 }"#).unwrap();
    assert_eq!(config, PoolConfig { max_depth: 7 });

    let config: PoolConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config, PoolConfig::default());
    assert_eq!(config.max_depth, 20);
}
