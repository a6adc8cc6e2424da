use log::debug;
use std::io;
use std::thread::{self, JoinHandle};

/// Where long-running workers (event loop, monitor) get their threads.
pub trait Scheduler {
    fn spawn<F>(&self, name: &str, f: F) -> io::Result<JoinHandle<()>>
    where
        F: FnOnce() + Send + 'static;
}

pub struct ThreadScheduler;

impl ThreadScheduler {
    pub fn new() -> Self {
        ThreadScheduler
    }
}

impl Default for ThreadScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for ThreadScheduler {
    fn spawn<F>(&self, name: &str, f: F) -> io::Result<JoinHandle<()>>
    where
        F: FnOnce() + Send + 'static,
    {
        debug!("Spawning thread '{}'", name);
        thread::Builder::new().name(name.to_string()).spawn(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_thread_scheduler_spawn() {
        let scheduler = ThreadScheduler::new();
        let flag = Arc::new(Mutex::new(false));
        let flag_clone = flag.clone();

        let handle = scheduler
            .spawn("test-worker", move || {
                let mut flag = flag_clone.lock().unwrap();
                *flag = true;
            })
            .unwrap();

        handle.join().unwrap();
        assert!(*flag.lock().unwrap());
    }

    #[test]
    fn test_thread_is_named() {
        let scheduler = ThreadScheduler::new();
        let name = Arc::new(Mutex::new(None));
        let name_clone = name.clone();

        scheduler
            .spawn("retune-loop", move || {
                *name_clone.lock().unwrap() = thread::current().name().map(str::to_string);
            })
            .unwrap()
            .join()
            .unwrap();

        assert_eq!(name.lock().unwrap().as_deref(), Some("retune-loop"));
    }
}
