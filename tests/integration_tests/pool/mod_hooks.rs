use crate::integration_tests::_support::{Connection, Marker, Scratch, pool_with_capacity};
use poolkeeper::{ArgValue, CtorArgs, KeeperError};

#[test]
fn recycle_receives_constructor_arguments() {
    let p = pool_with_capacity(4);
    assert!(p.release(Box::new(Connection::new("old", 1))));
    let args: CtorArgs = [ArgValue::from("db.internal"), ArgValue::from(5432)].into_iter().collect();
    let c = p.acquire_as::<Connection>("Connection", Some(&args)).unwrap();
    assert_eq!(c.host, "db.internal");
    assert_eq!(c.port, 5432);
}

#[test]
fn empty_signature_selects_zero_argument_recycle() {
    let p = pool_with_capacity(4);
    assert!(p.release(Box::new(Connection::new("kept", 9))));
    let args = CtorArgs::with_signature::<String>(vec![ArgValue::from("ignored")], vec![]);
    let c = p.acquire_as::<Connection>("Connection", Some(&args)).unwrap();
    assert_eq!(c.host, "kept");
    assert_eq!(c.recycled, 1);
}

#[test]
fn signature_mismatch_fails_recycle_and_drops_instance() {
    let p = pool_with_capacity(4);
    assert!(p.release(Box::new(Connection::new("h", 1))));
    let args = CtorArgs::with_signature(vec![ArgValue::from(1)], vec!["string"]);
    let err = p.acquire("Connection", Some(&args)).err().unwrap();
    assert!(matches!(err, KeeperError::Recycle { .. }));
    assert_eq!(p.size("Connection"), 0);
    assert_eq!(p.metrics_snapshot().recycle_failures, 1);
}

#[test]
fn failing_recycle_drops_instance_and_next_acquire_constructs() {
    let p = pool_with_capacity(4);
    let mut c = Connection::new("h", 1);
    c.fail_recycle = true;
    let bad_id = c.id;
    assert!(p.release(Box::new(c)));
    let err = p.acquire("Connection", None).err().unwrap();
    assert!(err.to_string().contains("recycle refused"));
    let fresh = p.acquire_as::<Connection>("Connection", None).unwrap();
    assert_ne!(fresh.id, bad_id);
    assert_eq!(p.metrics_snapshot().constructed, 1);
}

#[test]
fn failing_dispose_rejects_release() {
    let p = pool_with_capacity(4);
    let mut c = Connection::new("h", 1);
    c.fail_dispose = true;
    assert!(!p.release(Box::new(c)));
    assert_eq!(p.size("Connection"), 0);
    assert!(!p.has_pool("Connection"));
    assert_eq!(p.metrics_snapshot().rejected_dispose, 1);
}

#[test]
fn array_constructor_hook_gets_raw_values() {
    let p = pool_with_capacity(4);
    let mut s = Scratch::default();
    s.data = vec![99, 98];
    assert!(p.release(Box::new(s)));
    let args: CtorArgs = [1i64, 2, 3].into_iter().collect();
    let s = p.acquire_as::<Scratch>("Scratch", Some(&args)).unwrap();
    assert_eq!(s.data, vec![1, 2, 3]);
    assert_eq!(s.last_arg_count, Some(3));

    assert!(p.release(s));
    let s = p.acquire_as::<Scratch>("Scratch", None).unwrap();
    assert!(s.data.is_empty());
    assert_eq!(s.last_arg_count, Some(0));
}

#[test]
fn plain_instance_ignores_mismatched_signature() {
    let p = pool_with_capacity(4);
    assert!(p.release(Box::new(Marker(42))));
    let args = CtorArgs::with_signature(vec![ArgValue::from(1)], vec!["java.lang.Integer"]);
    let m = p.acquire_as::<Marker>("Marker", Some(&args)).unwrap();
    assert_eq!(m.0, 42);
    assert_eq!(p.size("Marker"), 0);
    assert_eq!(p.metrics_snapshot().recycle_failures, 0);
}

#[test]
fn array_constructor_skips_signature_resolution() {
    let p = pool_with_capacity(4);
    let mut s = Scratch::default();
    s.data = vec![7];
    assert!(p.release(Box::new(s)));
    let args = CtorArgs::with_signature(vec![ArgValue::from(5)], vec!["string", "int"]);
    let s = p.acquire_as::<Scratch>("Scratch", Some(&args)).unwrap();
    assert_eq!(s.data, vec![5]);
    assert_eq!(s.last_arg_count, Some(1));
    assert_eq!(p.metrics_snapshot().recycled, 1);
}
