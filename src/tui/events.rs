use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CEvent, KeyEvent};
use log::{debug, info};

use crate::shake::{AccelSample, Accelerometer};

#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    Tick,
    Sample(AccelSample),
}

/// Milliseconds on the clock shared by sensor samples and simulated jolts.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    started: Instant,
}

impl Clock {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }
}

/// Feeds key presses, ticks and accelerometer samples into one channel from
/// a single background thread. Dropping the handler stops and joins it.
pub struct EventHandler {
    rx: mpsc::Receiver<Event>,
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl EventHandler {
    pub fn new(
        tick_rate_ms: u64,
        sample_interval_ms: u64,
        mut sensor: Box<dyn Accelerometer>,
        clock: Clock,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let tick_rate = Duration::from_millis(tick_rate_ms);
        let sample_rate = Duration::from_millis(sample_interval_ms.max(1));

        let thread_stop = Arc::clone(&stop);
        let thread = thread::spawn(move || {
            let mut last_tick = Instant::now();
            let mut last_sample = Instant::now();
            let mut sensing = true;

            while !thread_stop.load(Ordering::Relaxed) {
                let until_tick = tick_rate.saturating_sub(last_tick.elapsed());
                let timeout = if sensing {
                    until_tick.min(sample_rate.saturating_sub(last_sample.elapsed()))
                } else {
                    until_tick
                };

                if event::poll(timeout).unwrap_or(false) {
                    match event::read() {
                        Ok(CEvent::Key(key)) => {
                            if tx.send(Event::Key(key)).is_err() {
                                break;
                            }
                        }
                        Ok(_) => {}
                        Err(_) => break,
                    }
                }

                if sensing && last_sample.elapsed() >= sample_rate {
                    last_sample = Instant::now();
                    match sensor.read() {
                        Some((x, y, z)) => {
                            let sample = AccelSample::new(x, y, z, clock.now_ms());
                            if tx.send(Event::Sample(sample)).is_err() {
                                break;
                            }
                        }
                        None => {
                            info!("Accelerometer stream ended");
                            sensing = false;
                        }
                    }
                }

                if last_tick.elapsed() >= tick_rate {
                    if tx.send(Event::Tick).is_err() {
                        break;
                    }
                    last_tick = Instant::now();
                }
            }
            debug!("Event thread stopped");
        });

        Self {
            rx,
            stop,
            thread: Some(thread),
        }
    }

    pub fn next(&self) -> Result<Event, mpsc::RecvError> {
        self.rx.recv()
    }
}

impl Drop for EventHandler {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
