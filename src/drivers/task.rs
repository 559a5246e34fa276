//! Named worker threads with an explicit stack size.
//!
//! Every long-lived context in the process (bus I/O, scheduler tick,
//! blink worker) is started through [`spawn_named`] so thread names show
//! up in logs and `/proc/<pid>/task/*/comm`.

use std::io;
use std::thread::{Builder, JoinHandle};

use log::info;

/// Smallest stack handed to the OS, regardless of configuration.
const MIN_STACK_KB: usize = 16;

/// Spawn `f` on a thread called `name` with at least `stack_kb` KiB of stack.
///
/// A configured size below [`MIN_STACK_KB`] is raised to it.  Thread
/// creation failure is returned to the caller.
pub fn spawn_named<F>(name: &str, stack_kb: usize, f: F) -> io::Result<JoinHandle<()>>
where
    F: FnOnce() + Send + 'static,
{
    let stack_kb = stack_kb.max(MIN_STACK_KB);
    info!("Spawning '{}' (stack={}KB)", name, stack_kb);

    Builder::new()
        .name(name.into())
        .stack_size(stack_kb * 1024)
        .spawn(f)
}
