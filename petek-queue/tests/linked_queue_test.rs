use petek_queue::linked_queue::LinkedQueue;
use std::sync::Arc;
use std::thread;

#[test]
fn test_linked_queue_simple() {
    let q = LinkedQueue::new();
    q.push(1);
    q.push(2);
    assert_eq!(q.pop(), Some(1));
    assert_eq!(q.pop(), Some(2));
    assert_eq!(q.pop(), None);
}

#[test]
fn test_is_empty_transitions() {
    let q = LinkedQueue::new();
    assert!(q.is_empty());
    q.push(1);
    assert!(!q.is_empty());
    q.pop();
    assert!(q.is_empty());
}

#[test]
#[cfg_attr(miri, ignore)]
fn test_linked_queue_concurrent() {
    let q = Arc::new(LinkedQueue::new());
    let mut handles = vec![];

    // Producers
    for i in 0..4 {
        let q = q.clone();
        handles.push(thread::spawn(move || {
            for j in 0..1000 {
                q.push(i * 1000 + j);
            }
        }));
    }

    // Consumers
    for _ in 0..4 {
        let q = q.clone();
        handles.push(thread::spawn(move || {
            for _ in 0..1000 {
                while q.pop().is_none() {
                    thread::yield_now();
                }
            }
        }));
    }

    for h in handles {
        h.join().unwrap();
    }

    assert!(q.pop().is_none());
    assert!(q.is_empty());
}
