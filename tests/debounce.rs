use jobsift::infrastructure::Debouncer;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

fn recorder() -> (Arc<Mutex<Vec<&'static str>>>, impl Fn(&'static str) + Send + Sync + 'static) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    (seen, move |value| sink.lock().unwrap().push(value))
}

#[tokio::test(start_paused = true)]
async fn burst_emits_only_the_final_value() {
    let (seen, emit) = recorder();
    let mut debouncer = Debouncer::new(Duration::from_millis(300), emit);

    for value in ["r", "ru", "rus", "rust"] {
        debouncer.push(value);
        sleep(Duration::from_millis(100)).await;
    }
    assert!(seen.lock().unwrap().is_empty());
    assert!(debouncer.is_pending());

    sleep(Duration::from_millis(300)).await;
    assert_eq!(*seen.lock().unwrap(), vec!["rust"]);
    assert!(!debouncer.is_pending());
}

#[tokio::test(start_paused = true)]
async fn alternating_values_never_leak_intermediates() {
    let (seen, emit) = recorder();
    let mut debouncer = Debouncer::new(Duration::from_millis(200), emit);

    for value in ["a", "b", "a", "b", "a", "b"] {
        debouncer.push(value);
        sleep(Duration::from_millis(50)).await;
    }
    sleep(Duration::from_millis(500)).await;
    assert_eq!(*seen.lock().unwrap(), vec!["b"]);
}

#[tokio::test(start_paused = true)]
async fn values_separated_by_quiet_periods_are_all_emitted() {
    let (seen, emit) = recorder();
    let mut debouncer = Debouncer::new(Duration::from_millis(100), emit);

    debouncer.push("first");
    sleep(Duration::from_millis(150)).await;
    debouncer.push("second");
    sleep(Duration::from_millis(150)).await;

    assert_eq!(*seen.lock().unwrap(), vec!["first", "second"]);
}

#[tokio::test(start_paused = true)]
async fn zero_delay_is_synchronous_passthrough() {
    let (seen, emit) = recorder();
    let mut debouncer = Debouncer::new(Duration::ZERO, emit);
    assert!(debouncer.is_passthrough());

    debouncer.push("a");
    debouncer.push("b");
    assert_eq!(*seen.lock().unwrap(), vec!["a", "b"]);
    assert!(!debouncer.is_pending());
}

#[tokio::test(start_paused = true)]
async fn dropping_cancels_the_pending_emission() {
    let (seen, emit) = recorder();
    let mut debouncer = Debouncer::new(Duration::from_millis(100), emit);
    debouncer.push("late");
    drop(debouncer);

    sleep(Duration::from_secs(1)).await;
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn cancel_drops_the_pending_value() {
    let (seen, emit) = recorder();
    let mut debouncer = Debouncer::new(Duration::from_millis(100), emit);
    debouncer.push("never");
    debouncer.cancel();
    assert!(!debouncer.is_pending());

    sleep(Duration::from_secs(1)).await;
    assert!(seen.lock().unwrap().is_empty());
}
