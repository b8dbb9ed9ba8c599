//! Stop requests from outside the simulation

use std::io::{self, BufRead, BufReader};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

/// Polled once per tick; must never block
pub trait StopSignal {
    fn should_stop(&mut self) -> bool;
}

/// Runs until the tick budget is spent
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverStop;

impl StopSignal for NeverStop {
    fn should_stop(&mut self) -> bool {
        false
    }
}

/// Stops once a line arrives on a reader (stdin by default: any key + Enter)
///
/// The reader is drained on a background thread. End of input without a line
/// does not count, so a closed or redirected stdin never ends a run.
#[derive(Debug, Clone)]
pub struct KeyPressStop {
    pressed: Arc<AtomicBool>,
}

impl KeyPressStop {
    pub fn stdin() -> Self {
        Self::watch(BufReader::new(io::stdin()))
    }

    pub fn watch<R: BufRead + Send + 'static>(mut reader: R) -> Self {
        let pressed = Arc::new(AtomicBool::new(false));
        let flag = pressed.clone();
        thread::spawn(move || {
            let mut line = String::new();
            match reader.read_line(&mut line) {
                Ok(n) if n > 0 => {
                    log::info!("Key press received, stopping after this tick");
                    flag.store(true, Ordering::SeqCst);
                }
                Ok(_) => log::debug!("Input closed; key press stop disabled"),
                Err(e) => log::warn!("Could not read input: {}", e),
            }
        });
        Self { pressed }
    }
}

impl StopSignal for KeyPressStop {
    fn should_stop(&mut self) -> bool {
        self.pressed.load(Ordering::SeqCst)
    }
}

impl<S: StopSignal + ?Sized> StopSignal for Box<S> {
    fn should_stop(&mut self) -> bool {
        (**self).should_stop()
    }
}
