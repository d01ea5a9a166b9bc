//! Relays a subprocess's diagnostic output into the log.
//!
//! The controller usually runs as a child process; whatever it prints on
//! stderr is forwarded line by line so it shows up next to the listener's
//! own log output.

use std::io::{BufRead, BufReader, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{error, info};

/// Background thread forwarding lines from a stream to `tracing`.
///
/// Stops at end of stream or when [`stop`](Self::stop) is called; a line
/// already being read is finished first.
pub struct LogRelay {
    handle: Option<JoinHandle<usize>>,
    stop_flag: Arc<AtomicBool>,
}

impl LogRelay {
    /// Start relaying `stream` on a new thread.
    pub fn spawn<R>(stream: R) -> Self
    where
        R: Read + Send + 'static,
    {
        let stop_flag = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop_flag);

        let handle = thread::spawn(move || relay_lines(stream, &thread_stop));

        Self {
            handle: Some(handle),
            stop_flag,
        }
    }

    /// Ask the relay to stop after the current line.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }

    /// Wait for the relay to finish; returns how many lines were forwarded.
    pub fn join(mut self) -> usize {
        self.handle
            .take()
            .and_then(|handle| handle.join().ok())
            .unwrap_or(0)
    }
}

impl Drop for LogRelay {
    fn drop(&mut self) {
        self.stop();
    }
}

fn relay_lines<R: Read>(stream: R, stop_flag: &AtomicBool) -> usize {
    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    let mut relayed = 0;

    // Checked before each read; a line once read is always logged.
    while !stop_flag.load(Ordering::SeqCst) {
        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {
                info!("[subprocess] {}", line.trim_end_matches(&['\r', '\n'][..]));
                relayed += 1;
            }
            Err(e) => {
                if !stop_flag.load(Ordering::SeqCst) {
                    error!("Error reading from subprocess stderr: {}", e);
                }
                break;
            }
        }
    }

    info!("Subprocess stderr reader thread finished.");
    relayed
}
