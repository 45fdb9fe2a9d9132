use std::future::Future;
use std::io::Write;
use std::sync::Arc;

use clap::{Args, Subcommand};
use estudio_core::storage::UiConfig;
use estudio_core::view;
use estudio_core::{Config, Event, TimerConfig, TimerEngine, TimerHandle, TimerMode, TimerState};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::bell::TerminalBell;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run the countdown in this terminal
    Run {
        #[command(flatten)]
        overrides: TimerOverrides,
        /// Stop after this many phase transitions
        #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
        phases: u32,
        /// Start the next phase without waiting for Enter
        #[arg(long)]
        auto_resume: bool,
        /// Print every event as a JSON line instead of the live clock
        #[arg(long)]
        json: bool,
    },
    /// Print the upcoming phases for the configured schedule
    Plan {
        #[command(flatten)]
        overrides: TimerOverrides,
        /// Number of phases to list
        #[arg(long, default_value = "8")]
        phases: usize,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

/// One-off overrides on top of the saved `[timer]` section.
#[derive(Args, Debug, Default)]
pub struct TimerOverrides {
    /// Focus minutes
    #[arg(long)]
    work: Option<u32>,
    /// Short break minutes
    #[arg(long)]
    short: Option<u32>,
    /// Long break minutes
    #[arg(long)]
    long: Option<u32>,
    /// Focus sessions before a long break
    #[arg(long)]
    cycle: Option<u32>,
    /// Disable the audio cue
    #[arg(long)]
    mute: bool,
}

impl TimerOverrides {
    fn apply(&self, mut cfg: TimerConfig) -> TimerConfig {
        if let Some(v) = self.work {
            cfg.work_minutes = v;
        }
        if let Some(v) = self.short {
            cfg.short_break_minutes = v;
        }
        if let Some(v) = self.long {
            cfg.long_break_minutes = v;
        }
        if let Some(v) = self.cycle {
            cfg.sessions_until_long_break = v;
        }
        if self.mute {
            cfg.sound_enabled = false;
        }
        cfg
    }
}

#[derive(Debug, Serialize)]
struct PlannedPhase {
    index: usize,
    mode: TimerMode,
    minutes: u32,
    sessions_in_current_cycle: u32,
}

fn plan(cfg: TimerConfig, phases: usize) -> Result<Vec<PlannedPhase>, Box<dyn std::error::Error>> {
    let mut engine = TimerEngine::new(cfg)?;
    let mut out = Vec::with_capacity(phases);
    for index in 1..=phases {
        let state = engine.state();
        out.push(PlannedPhase {
            index,
            mode: state.mode,
            minutes: engine.config().minutes_for(state.mode),
            sessions_in_current_cycle: state.sessions_in_current_cycle,
        });
        engine.skip_phase();
    }
    Ok(out)
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    match action {
        TimerAction::Run {
            overrides,
            phases,
            auto_resume,
            json,
        } => {
            let timer_cfg = overrides.apply(config.timer.clone());
            let opts = SessionOptions {
                phases,
                auto_resume,
                json,
            };
            let timer = TimerHandle::new(timer_cfg, Arc::new(TerminalBell))?;
            let rt = tokio::runtime::Runtime::new()?;
            let end = rt.block_on(async {
                let resume = if auto_resume {
                    mpsc::unbounded_channel().1
                } else {
                    stdin_lines()
                };
                let mut out = std::io::stdout();
                run_session(
                    &timer,
                    &config.ui,
                    &opts,
                    resume,
                    tokio::signal::ctrl_c(),
                    &mut out,
                )
                .await
            })?;
            tracing::debug!(?end, "timer run ended");
        }
        TimerAction::Plan {
            overrides,
            phases,
            json,
        } => {
            let timer_cfg = overrides.apply(config.timer.clone());
            let planned = plan(timer_cfg.clone(), phases)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&planned)?);
            } else {
                for p in &planned {
                    let marker = if p.mode == TimerMode::LongBreak { "*" } else { " " };
                    println!(
                        "{:>3}.{marker} {:<12} {}",
                        p.index,
                        p.mode.label(),
                        view::format_padded(u64::from(p.minutes) * 60)
                    );
                }
            }
        }
    }
    Ok(())
}

struct SessionOptions {
    phases: u32,
    auto_resume: bool,
    json: bool,
}

/// How a `timer run` session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    /// The requested number of phase transitions happened.
    Finished,
    /// Ctrl-C, during the countdown or at the prompt.
    Interrupted,
    /// stdin was closed while waiting for Enter.
    InputClosed,
}

/// Forward every line typed on stdin as a resume request.
///
/// Runs on a plain thread so a pending read never holds up runtime shutdown.
/// The channel closes at EOF.
fn stdin_lines() -> mpsc::UnboundedReceiver<()> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            if line.is_err() || tx.send(()).is_err() {
                break;
            }
        }
    });
    rx
}

/// Drive `timer` until `opts.phases` transitions happened, `interrupt`
/// resolves, or the resume channel closes at the prompt.
///
/// `interrupt` is polled for the whole session, including while waiting
/// for Enter between phases.
async fn run_session<I, W>(
    timer: &TimerHandle,
    ui: &UiConfig,
    opts: &SessionOptions,
    mut resume: mpsc::UnboundedReceiver<()>,
    interrupt: I,
    out: &mut W,
) -> Result<SessionEnd, Box<dyn std::error::Error>>
where
    I: Future<Output = std::io::Result<()>>,
    W: Write,
{
    let timer_cfg = timer.config().await;
    let (tx, mut rx) = mpsc::unbounded_channel::<(Event, TimerState)>();
    let observer = timer
        .subscribe(move |event, state| {
            // The receiver only goes away once we are shutting down.
            let _ = tx.send((event.clone(), state.clone()));
        })
        .await;

    tracing::info!(
        config = ?timer_cfg,
        phases = opts.phases,
        auto_resume = opts.auto_resume,
        "session started"
    );
    tokio::pin!(interrupt);
    timer.start().await;

    let mut remaining = opts.phases;
    let end = loop {
        let (event, state) = tokio::select! {
            next = rx.recv() => match next {
                Some(pair) => pair,
                None => break SessionEnd::Finished,
            },
            res = &mut interrupt => {
                res?;
                break SessionEnd::Interrupted;
            }
        };

        if opts.json {
            writeln!(out, "{}", serde_json::to_string(&event)?)?;
        } else {
            render(out, &event, &state, &timer_cfg, ui)?;
        }

        if let Event::PhaseCompleted { .. } = event {
            remaining = remaining.saturating_sub(1);
            if remaining == 0 {
                break SessionEnd::Finished;
            }
            if !opts.auto_resume {
                if !opts.json {
                    writeln!(out, "Press Enter to start the next phase.")?;
                    out.flush()?;
                }
                tokio::select! {
                    line = resume.recv() => {
                        if line.is_none() {
                            break SessionEnd::InputClosed;
                        }
                    }
                    res = &mut interrupt => {
                        res?;
                        break SessionEnd::Interrupted;
                    }
                }
            }
            timer.start().await;
        }
    };

    if end == SessionEnd::Interrupted {
        timer.pause().await;
        if !opts.json {
            writeln!(out)?;
        }
    }
    timer.unsubscribe(observer).await;

    let state = timer.state();
    tracing::info!(
        completed_work_sessions = state.completed_work_sessions,
        ?end,
        "session finished"
    );
    Ok(end)
}

fn render<W: Write>(
    out: &mut W,
    event: &Event,
    state: &TimerState,
    cfg: &TimerConfig,
    ui: &UiConfig,
) -> std::io::Result<()> {
    match event {
        Event::PhaseCompleted {
            from,
            to,
            completed_work_sessions,
            ..
        } => {
            writeln!(out)?;
            writeln!(
                out,
                "{} finished -> {} ({completed_work_sessions} sessions today)",
                from.label(),
                to.label()
            )?;
        }
        _ => {
            let mut line = view::status_line(state, ui.clock_style);
            if ui.show_cycle_progress {
                line.push_str("  ");
                line.push_str(&view::cycle_dots(state, cfg));
            }
            write!(out, "\r{line}")?;
        }
    }
    out.flush()
}
