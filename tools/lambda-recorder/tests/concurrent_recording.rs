use lambda_recorder::LambdaRecorder;
use std::collections::HashMap;
use std::sync::{Arc, Barrier};
use std::thread;

const PRODUCERS: usize = 8;
const CALLS_PER_PRODUCER: usize = 250;

#[test]
fn concurrent_producers_lose_no_calls_and_keep_per_thread_order() {
    let recorder: LambdaRecorder<(usize, usize)> =
        LambdaRecorder::named("produce", |_: (usize, usize)| {});
    let barrier = Arc::new(Barrier::new(PRODUCERS));

    let handles = (0..PRODUCERS)
        .map(|producer| {
            let produce = recorder.as_fn();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for n in 0..CALLS_PER_PRODUCER {
                    produce((producer, n));
                }
            })
        })
        .collect::<Vec<_>>();
    for handle in handles {
        handle.join().expect("producer thread");
    }

    let invocations = recorder.invocations();
    assert_eq!(invocations.len(), PRODUCERS * CALLS_PER_PRODUCER);
    recorder.assert_called_exactly(PRODUCERS * CALLS_PER_PRODUCER);

    let mut last_seen: HashMap<u64, u64> = HashMap::new();
    for (position, invocation) in invocations.iter().enumerate() {
        assert_eq!(invocation.index(), position);
        let producer = invocation.arguments()[0].as_u64().expect("producer id");
        let n = invocation.arguments()[1].as_u64().expect("call number");
        let expected = last_seen.get(&producer).map_or(0, |prev| prev + 1);
        assert_eq!(n, expected, "producer {producer} out of order at {position}");
        last_seen.insert(producer, n);
    }
    assert_eq!(last_seen.len(), PRODUCERS);
}

#[test]
fn block_runs_outside_the_log_lock() {
    // A block that reads the recorder it belongs to would deadlock if the
    // log were still locked while it runs.
    let recorder: Arc<std::sync::OnceLock<LambdaRecorder<(u8,), usize>>> =
        Arc::new(std::sync::OnceLock::new());
    let inner = Arc::clone(&recorder);
    let counting = LambdaRecorder::new(move |_: (u8,)| {
        inner.get().map_or(0, LambdaRecorder::call_count)
    });
    assert!(recorder.set(counting.clone()).is_ok());

    assert_eq!(counting.invoke((1,)), 1);
    assert_eq!(counting.invoke((2,)), 2);
}
