/*!
Scripted platform double for exercising the loop-affine core.

Tests drive it directly: set the frontmost app and its windows, fire
accessibility and activation callbacks, and pump timers by hand. A
journal of attach/detach events supports ordering assertions
(subscriptions must fully detach before their successors attach).
*/

#![allow(missing_docs)]

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::a11y::AxNotification;
use crate::platform::traits::{ElementHandle, Platform, ProcessObserver};
use crate::types::{Bounds, ProcessId, ShellWindow, VeilError, VeilResult};

// ---------------------------------------------------------------------------
// Elements

struct FakeElementState {
  pid: ProcessId,
  label: String,
  focused_window: Option<FakeElement>,
  fullscreen_attribute: Option<bool>,
  frame: Option<Bounds>,
}

/// Scripted element handle. Clones share state.
#[derive(Clone)]
pub(crate) struct FakeElement {
  state: Rc<RefCell<FakeElementState>>,
}

impl FakeElement {
  pub(crate) fn new(pid: i32, label: &str) -> Self {
    Self {
      state: Rc::new(RefCell::new(FakeElementState {
        pid: ProcessId(pid),
        label: label.to_string(),
        focused_window: None,
        fullscreen_attribute: None,
        frame: None,
      })),
    }
  }

  pub(crate) fn label(&self) -> String {
    self.state.borrow().label.clone()
  }

  pub(crate) fn set_focused_window(&self, window: Option<FakeElement>) {
    self.state.borrow_mut().focused_window = window;
  }

  pub(crate) fn set_fullscreen_attribute(&self, value: Option<bool>) {
    self.state.borrow_mut().fullscreen_attribute = value;
  }

  pub(crate) fn set_frame(&self, frame: Option<Bounds>) {
    self.state.borrow_mut().frame = frame;
  }
}

impl ElementHandle for FakeElement {
  fn pid(&self) -> ProcessId {
    self.state.borrow().pid
  }

  fn focused_window(&self) -> Option<Self> {
    self.state.borrow().focused_window.clone()
  }

  fn fullscreen_attribute(&self) -> Option<bool> {
    self.state.borrow().fullscreen_attribute
  }

  fn frame(&self) -> Option<Bounds> {
    self.state.borrow().frame
  }

  fn same_element(&self, other: &Self) -> bool {
    Rc::ptr_eq(&self.state, &other.state)
  }
}

// ---------------------------------------------------------------------------
// Timers

enum FakeTask {
  Once(Option<Box<dyn FnOnce()>>),
  Repeating(Option<Box<dyn FnMut()>>),
}

pub(crate) struct FakeTimerSlot {
  interval: Duration,
  repeating: bool,
  cancelled: bool,
  task: FakeTask,
}

/// Timer handle; marks its slot cancelled on drop.
pub(crate) struct FakeTimer {
  slot: Rc<RefCell<FakeTimerSlot>>,
}

impl Drop for FakeTimer {
  fn drop(&mut self) {
    self.slot.borrow_mut().cancelled = true;
  }
}

// ---------------------------------------------------------------------------
// Platform

type AxCallback = Rc<dyn Fn(AxNotification)>;

/// Which callback registry a subscription cleans up on drop.
enum CallbackSlot {
  Activation(u64),
  ScreenChange(u64),
}

#[derive(Default)]
struct FakeState {
  trusted: bool,
  frontmost: Option<FakeElement>,
  screen_frame: Option<Bounds>,
  shell_windows: Option<Vec<ShellWindow>>,
  fail_observer_create: bool,
  ax_callbacks: HashMap<i32, AxCallback>,
  // BTreeMaps keep delivery in registration order.
  activation: BTreeMap<u64, Rc<dyn Fn()>>,
  screen_change: BTreeMap<u64, Rc<dyn Fn()>>,
  next_callback_id: u64,
  timers: Vec<Rc<RefCell<FakeTimerSlot>>>,
  events: Vec<String>,
  live_subscriptions: Vec<String>,
}

/// The scripted platform. Tests share one instance via `Rc`.
pub(crate) struct FakePlatform {
  state: Rc<RefCell<FakeState>>,
  epoch: Instant,
  offset: RefCell<Duration>,
}

impl FakePlatform {
  pub(crate) fn new() -> Self {
    Self {
      state: Rc::new(RefCell::new(FakeState::default())),
      epoch: Instant::now(),
      offset: RefCell::new(Duration::ZERO),
    }
  }

  pub(crate) fn set_trusted(&self, trusted: bool) {
    self.state.borrow_mut().trusted = trusted;
  }

  pub(crate) fn set_frontmost(&self, app: Option<FakeElement>) {
    self.state.borrow_mut().frontmost = app;
  }

  pub(crate) fn set_screen_frame(&self, frame: Option<Bounds>) {
    self.state.borrow_mut().screen_frame = frame;
  }

  pub(crate) fn set_shell_windows(&self, windows: Option<Vec<ShellWindow>>) {
    self.state.borrow_mut().shell_windows = windows;
  }

  pub(crate) fn set_fail_observer_create(&self, fail: bool) {
    self.state.borrow_mut().fail_observer_create = fail;
  }

  /// Advance the scripted clock.
  pub(crate) fn advance(&self, delta: Duration) {
    *self.offset.borrow_mut() += delta;
  }

  /// Deliver an app-activation notification to every subscriber.
  pub(crate) fn fire_activation(&self) {
    let callbacks: Vec<Rc<dyn Fn()>> = self.state.borrow().activation.values().cloned().collect();
    for callback in callbacks {
      callback();
    }
  }

  /// Deliver a screen-parameters-changed notification to every
  /// subscriber.
  pub(crate) fn fire_screen_change(&self) {
    let callbacks: Vec<Rc<dyn Fn()>> =
      self.state.borrow().screen_change.values().cloned().collect();
    for callback in callbacks {
      callback();
    }
  }

  /// Deliver an accessibility notification to the observer for `pid`.
  pub(crate) fn fire_ax(&self, pid: i32, notification: AxNotification) {
    let callback = self.state.borrow().ax_callbacks.get(&pid).cloned();
    if let Some(callback) = callback {
      callback(notification);
    }
  }

  /// Whether an observer callback is registered for `pid`.
  pub(crate) fn has_observer(&self, pid: i32) -> bool {
    self.state.borrow().ax_callbacks.contains_key(&pid)
  }

  /// Run every pending one-shot timer. Returns how many fired.
  pub(crate) fn run_pending_oneshots(&self) -> usize {
    let slots: Vec<Rc<RefCell<FakeTimerSlot>>> = self
      .state
      .borrow()
      .timers
      .iter()
      .filter(|slot| {
        let slot = slot.borrow();
        !slot.cancelled && !slot.repeating
      })
      .cloned()
      .collect();

    let mut fired = 0;
    for slot in slots {
      let task = match &mut slot.borrow_mut().task {
        FakeTask::Once(task) => task.take(),
        FakeTask::Repeating(_) => None,
      };
      if let Some(task) = task {
        task();
        fired += 1;
      }
    }
    self.prune_timers();
    fired
  }

  /// Tick every live repeating timer once. Returns how many fired.
  pub(crate) fn tick_repeating(&self) -> usize {
    let slots: Vec<Rc<RefCell<FakeTimerSlot>>> = self
      .state
      .borrow()
      .timers
      .iter()
      .filter(|slot| {
        let slot = slot.borrow();
        !slot.cancelled && slot.repeating
      })
      .cloned()
      .collect();

    let mut fired = 0;
    for slot in slots {
      let task = match &mut slot.borrow_mut().task {
        FakeTask::Repeating(task) => task.take(),
        FakeTask::Once(_) => None,
      };
      if let Some(mut task) = task {
        task();
        fired += 1;
        // The tick may have dropped its own timer handle; only restore
        // the task if the slot is still live.
        if !slot.borrow().cancelled {
          if let FakeTask::Repeating(stored) = &mut slot.borrow_mut().task {
            *stored = Some(task);
          }
        }
      }
    }
    self.prune_timers();
    fired
  }

  /// Count of pending (unfired, uncancelled) one-shot timers.
  pub(crate) fn pending_oneshots(&self) -> usize {
    self
      .state
      .borrow()
      .timers
      .iter()
      .filter(|slot| {
        let slot = slot.borrow();
        !slot.cancelled && !slot.repeating && matches!(&slot.task, FakeTask::Once(Some(_)))
      })
      .count()
  }

  /// Intervals of live repeating timers.
  pub(crate) fn repeating_intervals(&self) -> Vec<Duration> {
    self
      .state
      .borrow()
      .timers
      .iter()
      .filter(|slot| {
        let slot = slot.borrow();
        !slot.cancelled && slot.repeating
      })
      .map(|slot| slot.borrow().interval)
      .collect()
  }

  /// Attach/detach journal since the last `clear_events`.
  pub(crate) fn events(&self) -> Vec<String> {
    self.state.borrow().events.clone()
  }

  pub(crate) fn clear_events(&self) {
    self.state.borrow_mut().events.clear();
  }

  /// Descriptions of currently attached subscriptions.
  pub(crate) fn live_subscriptions(&self) -> Vec<String> {
    self.state.borrow().live_subscriptions.clone()
  }

  fn prune_timers(&self) {
    self.state.borrow_mut().timers.retain(|slot| {
      let slot = slot.borrow();
      if slot.cancelled {
        return false;
      }
      match &slot.task {
        FakeTask::Once(task) => task.is_some(),
        FakeTask::Repeating(_) => true,
      }
    });
  }
}

// ---------------------------------------------------------------------------
// Subscriptions and observers

/// Subscription handle; journals its detach on drop.
pub(crate) struct FakeSubscription {
  state: Rc<RefCell<FakeState>>,
  description: String,
  callback_slot: Option<CallbackSlot>,
}

impl Drop for FakeSubscription {
  fn drop(&mut self) {
    let mut state = self.state.borrow_mut();
    state.events.push(format!("detach {}", self.description));
    state
      .live_subscriptions
      .retain(|desc| desc != &self.description);
    match self.callback_slot {
      Some(CallbackSlot::Activation(id)) => {
        state.activation.remove(&id);
      }
      Some(CallbackSlot::ScreenChange(id)) => {
        state.screen_change.remove(&id);
      }
      None => {}
    }
  }
}

pub(crate) struct FakeObserver {
  state: Rc<RefCell<FakeState>>,
  pid: ProcessId,
}

impl ProcessObserver for FakeObserver {
  type Handle = FakeElement;
  type Subscription = FakeSubscription;

  fn subscribe(
    &self,
    element: &FakeElement,
    notification: AxNotification,
  ) -> VeilResult<FakeSubscription> {
    let description = format!("{}:{notification:?}", element.label());
    let mut state = self.state.borrow_mut();
    state.events.push(format!("attach {description}"));
    state.live_subscriptions.push(description.clone());
    Ok(FakeSubscription {
      state: Rc::clone(&self.state),
      description,
      callback_slot: None,
    })
  }
}

impl Drop for FakeObserver {
  fn drop(&mut self) {
    let mut state = self.state.borrow_mut();
    state.events.push(format!("observer dropped {}", self.pid));
    state.ax_callbacks.remove(&self.pid.0);
  }
}

impl Platform for FakePlatform {
  type Handle = FakeElement;
  type Observer = FakeObserver;
  type Subscription = FakeSubscription;
  type Timer = FakeTimer;

  fn is_trusted(&self) -> bool {
    self.state.borrow().trusted
  }

  fn frontmost_app(&self) -> Option<FakeElement> {
    self.state.borrow().frontmost.clone()
  }

  fn main_screen_frame(&self) -> Option<Bounds> {
    self.state.borrow().screen_frame
  }

  fn shell_windows(&self) -> Option<Vec<ShellWindow>> {
    self.state.borrow().shell_windows.clone()
  }

  fn create_observer(
    &self,
    pid: ProcessId,
    on_event: Rc<dyn Fn(AxNotification)>,
  ) -> VeilResult<FakeObserver> {
    let mut state = self.state.borrow_mut();
    if state.fail_observer_create {
      return Err(VeilError::ObserverError("scripted failure".to_string()));
    }
    state.events.push(format!("observer created {pid}"));
    state.ax_callbacks.insert(pid.0, on_event);
    Ok(FakeObserver {
      state: Rc::clone(&self.state),
      pid,
    })
  }

  fn observe_activation(&self, on_activate: Rc<dyn Fn()>) -> Option<FakeSubscription> {
    let mut state = self.state.borrow_mut();
    let id = state.next_callback_id;
    state.next_callback_id += 1;
    state.activation.insert(id, on_activate);
    let description = format!("activation#{id}");
    state.events.push(format!("attach {description}"));
    state.live_subscriptions.push(description.clone());
    Some(FakeSubscription {
      state: Rc::clone(&self.state),
      description,
      callback_slot: Some(CallbackSlot::Activation(id)),
    })
  }

  fn observe_screen_changes(&self, on_change: Rc<dyn Fn()>) -> Option<FakeSubscription> {
    let mut state = self.state.borrow_mut();
    let id = state.next_callback_id;
    state.next_callback_id += 1;
    state.screen_change.insert(id, on_change);
    let description = format!("screen-changes#{id}");
    state.events.push(format!("attach {description}"));
    state.live_subscriptions.push(description.clone());
    Some(FakeSubscription {
      state: Rc::clone(&self.state),
      description,
      callback_slot: Some(CallbackSlot::ScreenChange(id)),
    })
  }

  fn schedule_once(&self, delay: Duration, task: Box<dyn FnOnce()>) -> FakeTimer {
    let slot = Rc::new(RefCell::new(FakeTimerSlot {
      interval: delay,
      repeating: false,
      cancelled: false,
      task: FakeTask::Once(Some(task)),
    }));
    self.state.borrow_mut().timers.push(Rc::clone(&slot));
    FakeTimer { slot }
  }

  fn schedule_repeating(&self, interval: Duration, tick: Box<dyn FnMut()>) -> FakeTimer {
    let slot = Rc::new(RefCell::new(FakeTimerSlot {
      interval,
      repeating: true,
      cancelled: false,
      task: FakeTask::Repeating(Some(tick)),
    }));
    self.state.borrow_mut().timers.push(Rc::clone(&slot));
    FakeTimer { slot }
  }

  fn now(&self) -> Instant {
    self.epoch + *self.offset.borrow()
  }
}
