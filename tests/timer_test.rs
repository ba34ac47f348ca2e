use std::{cell::RefCell, rc::Rc};

use flow_cube::gui::{Root, TimerManager};
use instant::{Duration, Instant};

fn recorder() -> (Rc<RefCell<Vec<&'static str>>>, impl Fn(&'static str) -> Box<dyn FnMut()>) {
    let fired = Rc::new(RefCell::new(Vec::new()));
    let log = fired.clone();
    let make = move |name: &'static str| {
        let log = log.clone();
        Box::new(move || log.borrow_mut().push(name)) as Box<dyn FnMut()>
    };
    (fired, make)
}

#[test]
fn timeout_fires_once() {
    let (fired, make) = recorder();
    let mut timers = TimerManager::new();
    let start = Instant::now();
    timers.set_timeout(Duration::from_millis(10), make("once"));

    assert_eq!(timers.process_timers_at(start), 0);
    assert_eq!(timers.process_timers_at(start + Duration::from_millis(50)), 1);
    assert_eq!(timers.process_timers_at(start + Duration::from_millis(100)), 0);

    assert_eq!(*fired.borrow(), vec!["once"]);
    assert!(timers.is_empty());
}

#[test]
fn interval_repeats_until_cleared() {
    let (fired, make) = recorder();
    let mut timers = TimerManager::new();
    let start = Instant::now();
    let id = timers.set_interval(Duration::from_millis(10), make("tick"));

    for step in 1..=3 {
        timers.process_timers_at(start + Duration::from_millis(15 * step));
    }
    assert_eq!(fired.borrow().len(), 3);

    assert!(timers.clear_timeout(id));
    assert!(!timers.clear_timeout(id));
    timers.process_timers_at(start + Duration::from_secs(1));
    assert_eq!(fired.borrow().len(), 3);
}

#[test]
fn interval_fires_at_most_once_per_call() {
    let (fired, make) = recorder();
    let mut timers = TimerManager::new();
    let start = Instant::now();
    timers.set_interval(Duration::from_millis(10), make("tick"));

    assert_eq!(timers.process_timers_at(start + Duration::from_secs(1)), 1);
    assert_eq!(timers.process_timers_at(start + Duration::from_secs(1)), 0);
    assert_eq!(fired.borrow().len(), 1);
    assert_eq!(timers.len(), 1);
}

#[test]
fn cleared_timeout_never_fires() {
    let (fired, make) = recorder();
    let mut timers = TimerManager::new();
    let start = Instant::now();
    let id = timers.set_timeout(Duration::from_millis(5), make("cleared"));

    assert!(timers.clear_timeout(id));
    timers.process_timers_at(start + Duration::from_secs(1));

    assert!(fired.borrow().is_empty());
}

#[test]
fn due_timers_fire_in_deadline_order() {
    let (fired, make) = recorder();
    let mut timers = TimerManager::new();
    let start = Instant::now();
    timers.set_timeout(Duration::from_millis(30), make("third"));
    timers.set_timeout(Duration::from_millis(10), make("first"));
    timers.set_interval(Duration::from_millis(20), make("second"));

    assert_eq!(timers.process_timers_at(start + Duration::from_millis(100)), 3);

    assert_eq!(*fired.borrow(), vec!["first", "second", "third"]);
    assert_eq!(timers.len(), 1);
}

#[test]
fn root_processes_its_timers() {
    let (fired, make) = recorder();
    let mut root = Root::new(1200.0, 900.0);
    root.timers.set_timeout(Duration::ZERO, make("now"));

    assert_eq!(root.process_timers(), 1);
    assert_eq!(*fired.borrow(), vec!["now"]);
}
