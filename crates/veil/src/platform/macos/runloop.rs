/*!
`CFRunLoopTimer` wrappers for deferred and repeating work.

The timer owns its task through the CF context's release callback, so
the closure is freed only when CF is done with the timer - including
the case where the handle is dropped from inside its own callback
(self-cancellation on a poll tick), which CF defers safely.
*/

#![allow(unsafe_code)]

use objc2_core_foundation::{
  kCFRunLoopDefaultMode, CFAbsoluteTimeGetCurrent, CFRetained, CFRunLoop, CFRunLoopTimer,
  CFRunLoopTimerContext,
};
use std::ffi::c_void;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

enum TimerTask {
  Once(Option<Box<dyn FnOnce()>>),
  Repeating(Box<dyn FnMut()>),
}

/// Timer handle; invalidates on drop.
pub struct RunLoopTimer {
  timer: Option<CFRetained<CFRunLoopTimer>>,
}

impl RunLoopTimer {
  /// Fire once after `delay` on the main run loop.
  pub(super) fn once(delay: Duration, task: Box<dyn FnOnce()>) -> Self {
    Self::schedule(delay, 0.0, TimerTask::Once(Some(task)))
  }

  /// Fire every `interval` on the main run loop.
  pub(super) fn repeating(interval: Duration, tick: Box<dyn FnMut()>) -> Self {
    Self::schedule(interval, interval.as_secs_f64(), TimerTask::Repeating(tick))
  }

  fn schedule(delay: Duration, interval: f64, task: TimerTask) -> Self {
    let info = Box::into_raw(Box::new(task));
    let mut context = CFRunLoopTimerContext {
      version: 0,
      info: info.cast::<c_void>(),
      retain: None,
      release: Some(release_task),
      copyDescription: None,
    };

    let fire_date = CFAbsoluteTimeGetCurrent() + delay.as_secs_f64();
    let timer = unsafe {
      CFRunLoopTimer::new(
        None,
        fire_date,
        interval,
        0,
        0,
        Some(timer_fired),
        &mut context,
      )
    };

    let Some(timer) = timer else {
      // Timer creation failed; reclaim the task instead of leaking it.
      unsafe { drop(Box::from_raw(info)) };
      log::warn!("CFRunLoopTimer creation failed");
      return Self { timer: None };
    };

    unsafe {
      if let Some(main_run_loop) = CFRunLoop::main() {
        main_run_loop.add_timer(Some(&timer), kCFRunLoopDefaultMode);
      }
    }

    Self { timer: Some(timer) }
  }
}

impl Drop for RunLoopTimer {
  fn drop(&mut self) {
    if let Some(timer) = self.timer.take() {
      timer.invalidate();
    }
  }
}

impl std::fmt::Debug for RunLoopTimer {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("RunLoopTimer").finish_non_exhaustive()
  }
}

unsafe extern "C-unwind" fn timer_fired(_timer: *mut CFRunLoopTimer, info: *mut c_void) {
  let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
    if info.is_null() {
      return;
    }
    let task = &mut *info.cast::<TimerTask>();
    match task {
      TimerTask::Once(task) => {
        if let Some(task) = task.take() {
          task();
        }
      }
      TimerTask::Repeating(tick) => tick(),
    }
  }));

  if result.is_err() {
    log::warn!("Timer callback panicked");
  }
}

unsafe extern "C-unwind" fn release_task(info: *const c_void) {
  if !info.is_null() {
    drop(Box::from_raw(info.cast_mut().cast::<TimerTask>()));
  }
}
