use clap::Subcommand;
use estudio_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one value, e.g. `estudio config get timer.work_minutes`
    Get {
        /// Dotted key: timer.work_minutes, timer.short_break_minutes,
        /// timer.long_break_minutes, timer.sessions_until_long_break,
        /// timer.sound_enabled, ui.clock_style, ui.show_cycle_progress
        key: String,
    },
    /// Change one value, e.g. `estudio config set timer.sessions_until_long_break 3`
    ///
    /// Durations and the cycle length must be at least 1.
    Set {
        /// Dotted key, as for `get`
        key: String,
        /// New value; must match the current type (number, true/false, compact/padded)
        value: String,
    },
    /// Print the whole file as JSON
    List,
    /// Restore 25/5/15 minutes, a 4-session cycle and the compact clock
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown key: {key}").into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            tracing::info!(%key, %value, "config updated");
            println!("ok");
        }
        ConfigAction::List => {
            let config = Config::load()?;
            let json = serde_json::to_string_pretty(&config)?;
            println!("{json}");
        }
        ConfigAction::Reset => {
            let config = Config::default();
            config.save()?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}
