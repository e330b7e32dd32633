//! neosite terminal entry point.
//!
//! A line-oriented host for the shell session: reads commands from stdin,
//! prints scrollback to stdout, and drives takeover tasks (editor, ping,
//! process monitor) inline. Runs against the remote API when a base URL is
//! configured, otherwise against the in-memory simulation.

mod config;
mod vfs_setup;

use std::io::{self, BufRead, Write};
use std::rc::Rc;
use std::time::Duration;

use anyhow::Result;

use neosite_api::{HttpApi, MemoryApi};
use neosite_platform::{Clock, MemoryKv, SettingsStore, SystemClock};
use neosite_terminal::{
    CommandRegistry, Services, ShellSession, Takeover, register_builtins,
};

use config::AppConfig;

enum Backend {
    Http(HttpApi),
    Memory(MemoryApi),
}

impl Backend {
    fn services<'a>(&'a self, clock: &'a dyn Clock, settings: &'a SettingsStore) -> Services<'a> {
        match self {
            Backend::Http(api) => Services {
                clock: Some(clock),
                settings: Some(settings),
                notes: Some(api),
                auth: Some(api),
                inbox: Some(api),
                admin: Some(api),
                weather: Some(api),
                probe: Some(api),
            },
            Backend::Memory(api) => Services {
                clock: Some(clock),
                settings: Some(settings),
                notes: Some(api),
                auth: Some(api),
                inbox: Some(api),
                admin: Some(api),
                weather: Some(api),
                probe: Some(api),
            },
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::load()?;
    let clock = Rc::new(SystemClock);

    let backend = match &config.api.base_url {
        Some(url) => {
            log::info!("using remote API at {url}");
            Backend::Http(HttpApi::new(url, config.api.timeout_secs))
        },
        None => {
            log::info!("no API configured, running offline");
            let kv = Rc::new(MemoryKv::new(Rc::clone(&clock) as Rc<dyn Clock>));
            let api = MemoryApi::new(
                &config.auth.password,
                Rc::clone(&clock) as Rc<dyn Clock>,
                kv,
            )
            .with_limits(neosite_api::RateLimits {
                login_limit: config.limits.login_limit,
                login_window_secs: config.limits.login_window_secs,
                note_limit: config.limits.note_limit,
                note_window_secs: config.limits.note_window_secs,
            });
            api.seed_note("welcome.txt", "first!", "trinity");
            api.seed_message("trinity", Some("t@zion.io"), "knock, knock", 3_600);
            Backend::Memory(api)
        },
    };

    let settings = SettingsStore::default();
    settings.subscribe(|s| {
        log::info!(
            "settings changed: maintenance={} alerts={}",
            s.maintenance_banner,
            s.alerts_enabled
        );
    });

    let mut tree = vfs_setup::seed_tree();
    {
        let services = backend.services(clock.as_ref(), &settings);
        if let Some(notes) = services.notes {
            vfs_setup::sync_visitor_notes(&mut tree, notes);
        }
    }

    let mut registry = CommandRegistry::new();
    register_builtins(&mut registry);
    let mut session = ShellSession::new(Rc::new(registry), tree);

    println!("Wake up...");
    println!("Type 'help' for commands, 'exit' to leave.\n");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut printed = 0usize;

    loop {
        print!("{}$ ", session.prompt());
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        if line.trim() == "exit" || line.trim() == "quit" {
            break;
        }

        let services = backend.services(clock.as_ref(), &settings);
        session.submit(&line, &services);
        printed = print_new_entries(&session, printed);

        if let Some(takeover) = session.take_takeover() {
            drive_takeover(&mut session, takeover, &services, &mut lines)?;
            session.finish_takeover();
            printed = print_new_entries(&session, printed);
        }
    }

    println!("\nDisconnected.");
    Ok(())
}

fn print_new_entries(session: &ShellSession, printed: usize) -> usize {
    for entry in &session.entries()[printed.min(session.entries().len())..] {
        if !entry.response.is_empty() {
            println!("{}", entry.response);
        }
    }
    session.entries().len()
}

fn drive_takeover(
    session: &mut ShellSession,
    takeover: Takeover,
    services: &Services<'_>,
    lines: &mut impl Iterator<Item = io::Result<String>>,
) -> Result<()> {
    match takeover {
        Takeover::Ping(mut task) => {
            let Some(probe) = services.probe else {
                return Ok(());
            };
            // A line-oriented host cannot poll the keyboard, so unbounded
            // pings are capped at four probes here; richer hosts run until
            // the user interrupts.
            let mut remaining = task.count().unwrap_or(4);
            while let Some(line) = task.tick(probe) {
                println!("{line}");
                session.append_output(&line);
                remaining = remaining.saturating_sub(1);
                if remaining == 0 && !task.is_finished() {
                    let line = task.interrupt();
                    println!("{line}");
                    session.append_output(&line);
                    break;
                }
                std::thread::sleep(Duration::from_millis(300));
            }
            let summary = task.summary();
            println!("{summary}");
            session.append_output(&summary);
        },
        Takeover::Monitor(mut task) => {
            while !task.is_finished() {
                println!("{}", task.frame());
                let Some(line) = lines.next() else {
                    task.interrupt();
                    break;
                };
                let line = line?;
                for key in line.chars().take(1) {
                    task.key(key);
                }
            }
        },
        Takeover::Editor(mut editor) => {
            let target = editor.filename().unwrap_or("(unnamed)").to_string();
            println!("-- nano: {target} --");
            println!("(enter text; a line with a single '.' saves, ':q' abandons)");
            if !editor.buffer().is_empty() {
                println!("{}", editor.buffer());
            }
            let mut buffer = Vec::new();
            let mut abandoned = false;
            for line in lines.by_ref() {
                let line = line?;
                if line == "." {
                    break;
                }
                if line == ":q" {
                    abandoned = true;
                    break;
                }
                buffer.push(line);
            }
            if abandoned {
                session.append_output("nano: buffer discarded");
                return Ok(());
            }
            if editor.filename().is_none() {
                print!("File name: ");
                io::stdout().flush()?;
                match lines.next() {
                    Some(line) => {
                        let name = line?;
                        if name.trim().is_empty() {
                            session.append_output("nano: no file name, buffer discarded");
                            return Ok(());
                        }
                        editor.set_filename(name.trim());
                    },
                    None => return Ok(()),
                }
            }
            editor.set_buffer(&buffer.join("\n"));
            session.save_editor(&editor, services);
        },
    }
    Ok(())
}
