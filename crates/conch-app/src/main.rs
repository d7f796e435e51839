//! Interactive terminal host for the conch console.
//!
//! Reads lines from stdin on a reader thread, feeds them through the
//! bridge, and ticks the console on the main thread, printing any new log
//! entries each tick. `quit` (or EOF) exits.

use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;

use anyhow::Result;
use conch_console::{
    Console, ConsoleConfig, FileLogger, Handler, LogKind, ProcessPool,
};

const CONFIG_PATH: &str = "conch.toml";

const BOOT_SCRIPT: &str = "\
# conch startup
register greet 1 1 \"Greets someone by name\"
print conch console ready, type help for commands
";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = if Path::new(CONFIG_PATH).exists() {
        ConsoleConfig::load(Path::new(CONFIG_PATH))?
    } else {
        ConsoleConfig::default()
    };
    log::info!(
        "starting conch (buffer capacity {}, tick {:?})",
        config.buffer_capacity,
        config.tick()
    );

    let mut console = Console::new(&config);
    let quit = Arc::new(AtomicBool::new(false));
    register_host_commands(&mut console, &config, &quit);

    console.shell.add_procedure("greet", |args, env| {
        env.buffer
            .log(LogKind::Message, format!("hello, {}!", args[0].as_str()));
        Ok(())
    });

    if let Some(dir) = &config.script_dir {
        let loaded = console.library.load_dir(dir, &config.script_ext)?;
        log::info!("loaded {loaded} scripts from {}", dir.display());
    }

    console.run_boot(BOOT_SCRIPT);

    let file_logger = match &config.log_file {
        Some(path) => Some(Arc::new(FileLogger::create(
            path,
            config.log_flush_threshold,
        )?)),
        None => None,
    };

    spawn_stdin_reader(&console);

    let mut seen: u64 = 0;
    while !quit.load(Ordering::Relaxed) {
        console.tick(Instant::now());
        seen = print_new_entries(&console, seen, file_logger.as_deref());
        thread::sleep(config.tick());
    }

    if let Some(logger) = &file_logger {
        logger.flush()?;
    }
    log::info!("conch shutting down");
    Ok(())
}

/// Host-side commands that need application state: `quit`, and `exec` for
/// launching external programs through the bounded process pool.
fn register_host_commands(console: &mut Console, config: &ConsoleConfig, quit: &Arc<AtomicBool>) {
    let flag = Arc::clone(quit);
    console.shell.register(conch_console::CommandSpec::new(
        "quit",
        0,
        Some(0),
        "Exit the application",
        Handler::func(move |_, _| {
            flag.store(true, Ordering::Relaxed);
            Ok(())
        }),
    ));

    let pool = Arc::new(ProcessPool::new(config.max_processes));
    console.shell.register(conch_console::CommandSpec::new(
        "exec",
        1,
        None,
        "Run an external program; output streams back into the console",
        Handler::func(move |args, env| {
            let program = args[0].as_str().to_string();
            let rest = args[1..].iter().map(|a| a.as_str().to_string()).collect();
            pool.launch(program, rest, env.bridge.clone());
            Ok(())
        }),
    ));
}

/// Forward stdin lines through the bridge; an EOF becomes a `quit`.
fn spawn_stdin_reader(console: &Console) {
    let handle = console.handle();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => handle.command(line),
                Err(error) => {
                    log::warn!("stdin read failed: {error}");
                    break;
                }
            }
        }
        handle.command("quit");
    });
}

/// Print (and file-log) entries appended since the last call. Returns the
/// new seen count.
fn print_new_entries(console: &Console, seen: u64, file_logger: Option<&FileLogger>) -> u64 {
    let total = console.buffer.total_appended();
    if total < seen {
        // The buffer was reset (`clear --reset`); start over.
        return print_new_entries(console, 0, file_logger);
    }
    let fresh = (total - seen) as usize;
    let live = console.buffer.live_len();
    for entry in console.buffer.live_entries().skip(live.saturating_sub(fresh)) {
        let line = entry.format_line();
        println!("{line}");
        if let Some(logger) = file_logger {
            logger.log(&line);
        }
    }
    total
}
