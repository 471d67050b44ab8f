use std::io;
use std::time::{Duration, Instant};

use crossterm::event::Event;

use crate::drivers::InputDriver;

pub enum ControlFlow {
    Continue,
    Quit,
}

/// Drives a layout host from one thread.
///
/// The loop owns the input driver and is the only place that polls it. Each
/// iteration hands the handler either an input event or `None` when the poll
/// interval passed quietly, together with the time elapsed since the loop
/// started. Hosts feed that time to `LayoutManager::advance_time` so hold
/// timers, resize debouncing and frame-throttled events fire.
pub struct EventLoop<D> {
    driver: D,
    poll_interval: Duration,
}

impl<D: InputDriver> EventLoop<D> {
    pub fn new(driver: D, poll_interval: Duration) -> Self {
        Self {
            driver,
            poll_interval,
        }
    }

    pub fn driver(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Run until the handler returns `ControlFlow::Quit`.
    pub fn run<F>(&mut self, mut handler: F) -> io::Result<()>
    where
        F: FnMut(&mut D, Option<Event>, Duration) -> io::Result<ControlFlow>,
    {
        let started = Instant::now();
        loop {
            if let ControlFlow::Quit = handler(&mut self.driver, None, started.elapsed())? {
                break;
            }

            if self.driver.poll(self.poll_interval)? {
                // Drain bursts (pointer drags in particular) before the next
                // idle tick so drawing does not fall behind input.
                loop {
                    let event = self.driver.read()?;
                    if let ControlFlow::Quit = handler(&mut self.driver, Some(event), started.elapsed())? {
                        return Ok(());
                    }
                    if !self.driver.poll(Duration::from_millis(0))? {
                        break;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    struct Scripted(VecDeque<Event>);

    impl InputDriver for Scripted {
        fn poll(&mut self, _timeout: Duration) -> io::Result<bool> {
            Ok(!self.0.is_empty())
        }

        fn read(&mut self) -> io::Result<Event> {
            self.0
                .pop_front()
                .ok_or_else(|| io::Error::other("script exhausted"))
        }
    }

    #[test]
    fn bursts_are_drained_between_idle_ticks() {
        let key = |c| Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        let script = Scripted(VecDeque::from([key('a'), key('b'), key('q')]));
        let mut event_loop = EventLoop::new(script, Duration::from_millis(1));
        let mut seen = Vec::new();
        event_loop
            .run(|_, event, _| {
                match event {
                    None => seen.push('-'),
                    Some(Event::Key(k)) if k.code == KeyCode::Char('q') => return Ok(ControlFlow::Quit),
                    Some(Event::Key(k)) => {
                        if let KeyCode::Char(c) = k.code {
                            seen.push(c);
                        }
                    }
                    Some(_) => {}
                }
                Ok(ControlFlow::Continue)
            })
            .unwrap();
        assert_eq!(seen, vec!['-', 'a', 'b']);
    }

    #[test]
    fn elapsed_time_never_goes_backwards() {
        let mut event_loop = EventLoop::new(Scripted(VecDeque::new()), Duration::from_millis(1));
        let mut last = Duration::ZERO;
        let mut ticks = 0;
        event_loop
            .run(|_, _, elapsed| {
                assert!(elapsed >= last);
                last = elapsed;
                ticks += 1;
                Ok(if ticks == 3 {
                    ControlFlow::Quit
                } else {
                    ControlFlow::Continue
                })
            })
            .unwrap();
        assert_eq!(ticks, 3);
    }
}
