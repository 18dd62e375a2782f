use hookable::{ChannelRegistry, EventChannel, EventHook};
use pretty_assertions::assert_eq;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use super::{recorded, recorder};

const HOLD: Duration = Duration::from_millis(100);

#[test]
fn test_register_during_trigger_waits_for_next_trigger() {
    let channel = EventChannel::<(u32,)>::new("LateJoin");
    let log = recorder();
    let registered = Arc::new(AtomicBool::new(false));
    let (in_trigger_tx, in_trigger_rx) = mpsc::channel();
    let in_trigger_tx = Mutex::new(in_trigger_tx);

    let slow_log = log.clone();
    let slow_registered = registered.clone();
    let _slow = channel.register(
        move |(round,)| {
            if *round == 1 {
                in_trigger_tx.lock().unwrap().send(()).unwrap();
                thread::sleep(HOLD);
                let seen = slow_registered.load(Ordering::SeqCst);
                slow_log
                    .lock()
                    .unwrap()
                    .push(format!("slow:{round}:registered={seen}"));
            } else {
                slow_log.lock().unwrap().push(format!("slow:{round}"));
            }
        },
        "slow",
    );

    let trigger_channel = channel.clone();
    let trigger = thread::spawn(move || trigger_channel.trigger(&(1,)));

    in_trigger_rx.recv().unwrap();
    let late_channel = channel.clone();
    let late_log = log.clone();
    let late_registered = registered.clone();
    let late = thread::spawn(move || {
        let hook = late_channel.register(
            move |(round,)| late_log.lock().unwrap().push(format!("late:{round}")),
            "late",
        );
        late_registered.store(true, Ordering::SeqCst);
        hook
    });

    trigger.join().unwrap();
    let _late = late.join().unwrap();
    channel.trigger(&(2,));

    assert_eq!(
        recorded(&log),
        vec!["slow:1:registered=false", "slow:2", "late:2"]
    );
}

#[test]
fn test_drop_waits_for_in_flight_delivery() {
    let channel = EventChannel::<()>::new("InFlight");
    let log = recorder();
    let (started_tx, started_rx) = mpsc::channel();
    let started_tx = Mutex::new(started_tx);

    let listener_log = log.clone();
    let hook = channel.register(
        move |_| {
            started_tx.lock().unwrap().send(()).unwrap();
            thread::sleep(HOLD);
            listener_log.lock().unwrap().push("listener finished".to_string());
        },
        "slow",
    );

    let trigger_channel = channel.clone();
    let trigger = thread::spawn(move || trigger_channel.trigger(&()));

    started_rx.recv().unwrap();
    drop(hook);
    log.lock().unwrap().push("hook dropped".to_string());

    trigger.join().unwrap();
    channel.trigger(&());

    assert_eq!(recorded(&log), vec!["listener finished", "hook dropped"]);
    assert!(channel.is_empty());
}

#[test]
fn test_triggers_on_one_channel_never_interleave() {
    let channel = EventChannel::<(usize,)>::new("Serialized");
    let active = Arc::new(AtomicUsize::new(0));
    let max_active = Arc::new(AtomicUsize::new(0));

    let hooks: Vec<EventHook> = (0..3)
        .map(|n| {
            let active = active.clone();
            let max_active = max_active.clone();
            channel.register(
                move |_| {
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    max_active.fetch_max(now, Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(2));
                    active.fetch_sub(1, Ordering::SeqCst);
                },
                format!("listener-{n}"),
            )
        })
        .collect();

    let triggers: Vec<_> = (0..8)
        .map(|i| {
            let channel = channel.clone();
            thread::spawn(move || channel.trigger(&(i,)))
        })
        .collect();
    for trigger in triggers {
        trigger.join().unwrap();
    }

    assert_eq!(max_active.load(Ordering::SeqCst), 1);
    drop(hooks);
}

#[test]
fn test_busy_channel_does_not_block_other_channels() {
    let registry = Arc::new(ChannelRegistry::new());
    let busy = registry.channel::<()>("Busy");
    let (started_tx, started_rx) = mpsc::channel();
    let started_tx = Mutex::new(started_tx);
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let release_rx = Mutex::new(release_rx);

    let _blocker = busy.register(
        move |_| {
            started_tx.lock().unwrap().send(()).unwrap();
            release_rx.lock().unwrap().recv().unwrap();
        },
        "blocker",
    );

    let busy_trigger = {
        let busy = busy.clone();
        thread::spawn(move || busy.trigger(&()))
    };
    started_rx.recv().unwrap();

    // "Busy" is locked by the blocked listener; "Free" is unaffected.
    let free = registry.channel::<()>("Free");
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let _free_hook = free.register(
        move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        },
        "free",
    );
    free.trigger(&());
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    release_tx.send(()).unwrap();
    busy_trigger.join().unwrap();
}

#[test]
fn test_parallel_registration_keeps_every_listener() {
    let channel = EventChannel::<()>::new("Crowd");
    let per_thread = 50;

    let workers: Vec<_> = (0..4)
        .map(|worker| {
            let channel = channel.clone();
            thread::spawn(move || {
                (0..per_thread)
                    .map(|n| channel.register(|_| {}, format!("{worker}-{n}")))
                    .collect::<Vec<_>>()
            })
        })
        .collect();
    let hooks: Vec<EventHook> = workers
        .into_iter()
        .flat_map(|worker| worker.join().unwrap())
        .collect();

    assert_eq!(channel.listener_count(), 4 * per_thread);
    let ids: HashSet<_> = hooks.iter().map(|hook| hook.id()).collect();
    assert_eq!(ids.len(), hooks.len());

    drop(hooks);
    assert!(channel.is_empty());
}
