//! CLI entrypoint for luagate
//!
//! A demo driver that walks the whole boundary: inline chunks, script
//! files, host functions called from Lua, Lua functions called from the
//! host, record marshaling in both directions, live host objects, and the
//! namespace lock with a privileged suspend/restore window.

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use luagate_application::{
    MethodReceiver, ScriptEnginePort, ScriptError, discover_scripts, load_scripts,
};
use luagate_domain::{ItemRecord, ScriptValue, TableRecord, Vec2};
use luagate_infrastructure::{LuaSession, SharedItem, SharedVec2};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
use config::ConfigLoader;

/// CLI arguments for luagate.
#[derive(Parser, Debug)]
#[command(name = "luagate")]
#[command(version, about = "Lua embedding demo - typed records and a lockable global namespace")]
struct Cli {
    /// Directory containing the demo scripts
    #[arg(short, long, value_name = "DIR")]
    scripts_dir: Option<PathBuf>,

    /// Leave the global namespace unlocked for the guarded phase
    #[arg(long)]
    unlocked: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    no_config: bool,
}

/// Console receiver the scripts call as `console_out(...)`.
struct ConsolePrinter;

impl MethodReceiver for ConsolePrinter {
    fn dispatch(
        &self,
        method: &str,
        args: Vec<ScriptValue>,
    ) -> Result<Vec<ScriptValue>, ScriptError> {
        match method {
            "print_yellow" => {
                let Some(ScriptValue::String(line)) = args.into_iter().next() else {
                    return Err(ScriptError::BadArgument {
                        index: 1,
                        expected: "string",
                    });
                };
                println!("{}", line.yellow());
                Ok(Vec::new())
            }
            other => Err(ScriptError::UnknownMethod {
                method: other.to_string(),
            }),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("failed to load configuration")?
    };
    if !config.output.color {
        colored::control::set_override(false);
    }

    let scripts_dir = cli.scripts_dir.unwrap_or(config.scripts.dir);
    let locked = config.scripts.locked && !cli.unlocked;

    info!("starting luagate session");
    let session = LuaSession::new()?;

    // === Inline chunks and plain globals ===
    session.exec("test_num = 25")?;
    let test_num = session
        .get_global("test_num")?
        .as_number()
        .context("test_num is not a number")?;
    println!("test_num = {}\n", test_num);

    // === A script file that computes a whole-number global ===
    // A load failure here is non-fatal; the rest of the demo still runs.
    match session.load_script(&scripts_dir.join("simple_script.lua")) {
        Ok(()) => {
            // Whole numbers survive the double round trip exactly.
            let n_test = session
                .get_global("n_test_int")?
                .as_number()
                .context("n_test_int is not a number")? as i64;
            println!("n_test_int = {}\n", n_test);
        }
        Err(err) => warn!(error = %err, "simple_script.lua skipped"),
    }

    // === Host function registered into script space ===
    let printer = std::sync::Arc::new(ConsolePrinter);
    session.register_function("console_out", printer, "print_yellow")?;

    if let Err(err) = session.load_script(&scripts_dir.join("register_function.lua")) {
        warn!(error = %err, "register_function.lua skipped");
    }

    // === Script function called from the host ===
    if let Some(handle) = session.get_global("print_from_lua")?.as_function() {
        let results = session.call_function(
            handle,
            vec![ScriptValue::from(
                "A message from the host to Lua and back again",
            )],
        )?;
        let echoed = matches!(results.first(), Some(ScriptValue::Bool(true)));
        println!("print_from_lua returned {}\n", echoed);
    }

    // === Typed records across the boundary ===
    let item = ItemRecord::new(5, 0.0, "string_member").with_attrs(HashMap::from([
        ("key1".to_string(), "value1".to_string()),
        ("key2".to_string(), "value2".to_string()),
    ]));
    session.set_global("item", ScriptValue::Table(item.to_table()))?;

    // A live host object next to the plain table, to show the difference:
    // scripts mutate the shared record, not a copy.
    let live_item = SharedItem::new(ItemRecord::new(0, 0.0, "before"));
    let live_handle = session.create_host_object(live_item.clone())?;
    session.set_global("item_live", ScriptValue::HostObject(live_handle))?;

    if let Err(err) = session.load_script(&scripts_dir.join("access_records.lua")) {
        warn!(error = %err, "access_records.lua skipped");
    }

    println!(
        "item_live.label is now \"{}\"",
        live_item
            .0
            .lock()
            .map_err(|e| anyhow::anyhow!("live item lock poisoned: {}", e))?
            .label
    );

    // The script assembled a brand-new record table.
    let item3 = ItemRecord::from_table(
        session
            .get_global("item3")?
            .as_table()
            .context("item3 is not a table")?,
    )?;
    println!("item3 = {}", item3);

    // And a function returning a list of record tables.
    let handle = session
        .get_global("get_item_records")?
        .as_function()
        .context("get_item_records is not a function")?;
    let results = session.call_function(handle, Vec::new())?;
    let list = results
        .first()
        .and_then(|value| value.as_table())
        .context("get_item_records did not return a table")?;
    for value in list.values() {
        let record = ItemRecord::from_table(
            value.as_table().context("record entry is not a table")?,
        )?;
        println!("  {}", record);
    }
    println!();

    // === The guarded phase ===
    session.add_package_path(&scripts_dir)?;
    // Scripts can check this flag; it must exist before the lock is armed.
    session.exec(if locked {
        "debug_mode = true"
    } else {
        "debug_mode = false"
    })?;

    if locked {
        session.lock_globals(&config.scripts.allow_globals)?;

        // Installing a live host object is a privileged write.
        session.suspend_lock()?;
        let vec_host = session.create_host_object(SharedVec2::new(Vec2::new(0.0, 0.0)))?;
        session.set_global("vec2_host", ScriptValue::HostObject(vec_host))?;
        session.restore_lock()?;
    } else {
        let vec_host = session.create_host_object(SharedVec2::new(Vec2::new(0.0, 0.0)))?;
        session.set_global("vec2_host", ScriptValue::HostObject(vec_host))?;
    }

    if let Err(err) = session.load_script(&scripts_dir.join("use_vectors.lua")) {
        warn!(error = %err, "use_vectors.lua skipped");
    }

    let out_vec = Vec2::from_table(
        session
            .get_global("out_vec")?
            .as_table()
            .context("out_vec is not a table")?,
    )?;
    println!("out_vec = {}\n", out_vec);

    if locked {
        // A disallowed write aborts only the offending statement.
        match session.exec("rogue_global = 1") {
            Err(err) => println!("namespace lock held: {}", err),
            Ok(()) => warn!("expected the namespace lock to reject rogue_global"),
        }
    }

    // === Extra scripts: sorted load, failures skipped ===
    let extra_dir = scripts_dir.join("extra");
    if extra_dir.is_dir() {
        let paths = discover_scripts(&extra_dir)
            .with_context(|| format!("failed to list {}", extra_dir.display()))?;
        let summary = load_scripts(&session, &paths);
        println!(
            "extra scripts: {} loaded, {} skipped",
            summary.loaded,
            summary.failed.len()
        );
    }

    Ok(())
}
