mod schedule;

use clap::{Args, Parser, Subcommand};
use lift_core::*;
use schedule::{Due, Schedule};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "lift")]
#[command(about = "Interval timer for warm-up, workout and cool-down sessions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Use a specific config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Only log warnings and errors
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a plan file to get started
    Init {
        /// Where to write the plan
        #[arg(default_value = "plan.toml")]
        path: PathBuf,

        /// Write a blank template instead of the sample plan
        #[arg(long)]
        blank: bool,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the steps a plan expands to
    Preview {
        #[command(flatten)]
        source: PlanSource,
    },

    /// Run a session
    Run {
        #[command(flatten)]
        source: PlanSource,

        /// Tick period in milliseconds (0 runs without waiting)
        #[arg(long)]
        tick_ms: Option<u64>,

        /// Delay between a step completing and the next one starting
        #[arg(long)]
        grace_ms: Option<u64>,

        /// Finish early after this many ticks
        #[arg(long, conflicts_with = "stop_after")]
        finish_after: Option<u64>,

        /// Abandon the session after this many ticks
        #[arg(long)]
        stop_after: Option<u64>,
    },
}

#[derive(Args)]
struct PlanSource {
    /// Plan file (TOML, or JSON with a .json extension)
    plan: Option<PathBuf>,

    /// Use the built-in sample plan
    #[arg(long, conflicts_with = "plan")]
    sample: bool,

    /// Override the plan's number of sets
    #[arg(long)]
    sets: Option<u32>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    lift_core::logging::init_for_cli(cli.quiet);

    let config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Init { path, blank, force } => cmd_init(path, blank, force, &config),
        Commands::Preview { source } => cmd_preview(&source),
        Commands::Run {
            source,
            tick_ms,
            grace_ms,
            finish_after,
            stop_after,
        } => {
            let mut timer_config = config.timer.clone();
            if let Some(ms) = tick_ms {
                timer_config.tick_ms = ms;
            }
            if let Some(ms) = grace_ms {
                timer_config.grace_ms = ms;
            }
            let limit = match (finish_after, stop_after) {
                (Some(ticks), _) => Some(TickLimit::FinishEarly(ticks)),
                (None, Some(ticks)) => Some(TickLimit::Stop(ticks)),
                (None, None) => None,
            };
            cmd_run(&source, timer_config, limit, &config.display)
        }
    }
}

fn load_plan(source: &PlanSource) -> Result<Plan> {
    let mut plan = match (&source.plan, source.sample) {
        (_, true) => sample_plan().clone(),
        (Some(path), false) => Plan::load_from(path)?,
        (None, false) => {
            return Err(Error::Other(
                "No plan given. Pass a plan file or use --sample.".into(),
            ))
        }
    };

    if let Some(sets) = source.sets {
        if sets == 0 {
            return Err(Error::PlanValidation("--sets must be at least 1".into()));
        }
        tracing::debug!("Overriding sets: {} -> {}", plan.sets, sets);
        plan.sets = sets;
    }

    Ok(plan)
}

fn cmd_init(path: PathBuf, blank: bool, force: bool, config: &Config) -> Result<()> {
    if path.exists() && !force {
        return Err(Error::Other(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    let plan = if blank {
        template_plan("My workout", &config.plan)
    } else {
        sample_plan().clone()
    };
    plan.save_to(&path)?;

    println!("✓ Wrote plan '{}' to {}", plan.name, path.display());
    Ok(())
}

fn cmd_preview(source: &PlanSource) -> Result<()> {
    let plan = load_plan(source)?;
    let queue = build_queue(&plan);

    println!("{}", plan.display_name(1));
    println!();

    if queue.is_empty() {
        println!("{}", EMPTY_GUIDANCE);
        return Ok(());
    }

    for (i, step) in queue.iter().enumerate() {
        let clock = format_clock(u64::from(step.duration()));
        match step {
            Step::Exercise { name, phase, .. } => {
                println!("  {:>3}. [{}] {} {}", i + 1, phase, name, clock);
            }
            Step::Rest { next_name, .. } => {
                println!(
                    "  {:>3}.   Rest {} → {}",
                    i + 1,
                    clock,
                    next_name.as_deref().unwrap_or("—")
                );
            }
        }
    }

    println!();
    println!(
        "{} steps, {} exercises, total {}",
        queue.len(),
        queue.exercise_count(),
        format_clock(queue.total_seconds())
    );
    Ok(())
}

const EMPTY_GUIDANCE: &str = "No exercises found. Add exercises to the plan first.";

#[derive(Clone, Copy)]
enum TickLimit {
    FinishEarly(u64),
    Stop(u64),
}

fn cmd_run(
    source: &PlanSource,
    timer_config: TimerConfig,
    limit: Option<TickLimit>,
    display: &DisplayConfig,
) -> Result<()> {
    let plan = load_plan(source)?;
    let queue = build_queue(&plan);
    let renderer = Renderer::new(&queue, display.theme);
    let mut timer = SessionTimer::new(&plan, queue, timer_config, renderer);

    tracing::debug!(
        "Running '{}': tick {}ms, grace {}ms",
        plan.name,
        timer.config().tick_ms,
        timer.config().grace_ms
    );

    println!("{}", plan.display_name(1));
    timer.start();
    if timer.state() == TimerState::Empty {
        return Ok(());
    }
    timer.resume();

    drive(&mut timer, limit);

    if timer.state() == TimerState::Stopped {
        println!(
            "Session stopped after {}. Nothing recorded.",
            format_clock(timer.elapsed_seconds())
        );
    }
    Ok(())
}

/// Host loop: delivers ticks and the timer's deferred advance on time
///
/// Leaving this function drops both deadlines.
fn drive(timer: &mut SessionTimer<Renderer>, limit: Option<TickLimit>) {
    let period = Duration::from_millis(timer.config().tick_ms);
    let mut schedule = Schedule::new(period, Instant::now());
    let mut ticks = 0u64;

    loop {
        if timer.is_finished() || timer.state() == TimerState::Stopped {
            break;
        }

        match limit {
            Some(TickLimit::FinishEarly(n)) if ticks >= n => {
                timer.finish_early();
                break;
            }
            Some(TickLimit::Stop(n)) if ticks >= n => {
                timer.stop();
                break;
            }
            _ => {}
        }

        match schedule.next() {
            Due::Advance { ticket, at } => {
                if !schedule.is_simulated() {
                    sleep_until(at);
                }
                timer.complete_pending(ticket);
                schedule.restart(Instant::now());
            }
            Due::Tick(at) => {
                if !schedule.is_simulated() {
                    sleep_until(at);
                }
                schedule.ticked();
                timer.tick();
                ticks += 1;
                schedule.track(timer.pending_advance(), Instant::now());
            }
        }
    }
}

fn sleep_until(deadline: Instant) {
    let now = Instant::now();
    if deadline > now {
        std::thread::sleep(deadline - now);
    }
}

/// Terminal rendering of session events
struct Renderer {
    /// 1-based exercise number for each queue index
    exercise_numbers: Vec<usize>,
    exercise_total: usize,
    palette: Palette,
}

struct Palette {
    accent: &'static str,
    warn: &'static str,
    reset: &'static str,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        if !std::io::stdout().is_terminal() {
            return Self {
                accent: "",
                warn: "",
                reset: "",
            };
        }
        match theme {
            Theme::Dark => Self {
                accent: "\x1b[96m",
                warn: "\x1b[91m",
                reset: "\x1b[0m",
            },
            Theme::Light => Self {
                accent: "\x1b[34m",
                warn: "\x1b[31m",
                reset: "\x1b[0m",
            },
        }
    }
}

impl Renderer {
    fn new(queue: &Queue, theme: Theme) -> Self {
        let mut seen = 0;
        let exercise_numbers = queue
            .iter()
            .map(|step| {
                if step.is_exercise() {
                    seen += 1;
                }
                seen
            })
            .collect();

        Self {
            exercise_numbers,
            exercise_total: queue.exercise_count(),
            palette: Palette::for_theme(theme),
        }
    }
}

impl SessionObserver for Renderer {
    fn on_warning(&mut self, seconds_remaining: u32) {
        println!("    {}{}…{}", self.palette.warn, seconds_remaining, self.palette.reset);
    }

    fn on_step_complete(&mut self, _index: usize, step: &Step) {
        println!("  ✓ {} done", step.name());
    }

    fn on_phase_changed(&mut self, index: usize, step: &Step) {
        let clock = format_clock(u64::from(step.duration()));
        match step {
            Step::Exercise { name, phase, .. } => {
                let number = self.exercise_numbers.get(index).copied().unwrap_or(0);
                println!(
                    "{}[{}]{} Exercise {}/{}: {} ({})",
                    self.palette.accent,
                    phase,
                    self.palette.reset,
                    number,
                    self.exercise_total,
                    name,
                    clock
                );
            }
            Step::Rest { next_name, .. } => {
                println!(
                    "  Rest ({}) - next: {}",
                    clock,
                    next_name.as_deref().unwrap_or("—")
                );
            }
        }
    }

    fn on_finished(&mut self, summary: &SessionSummary) {
        println!();
        println!("{}Done!{}", self.palette.accent, self.palette.reset);
        println!("  Total time: {}", format_clock(summary.elapsed_seconds));
        println!(
            "  {}/{} exercises completed ({:.0}%)",
            summary.exercises_completed,
            summary.exercises_total,
            summary.completion_percent()
        );
        if summary.finished_early {
            println!("  Finished early");
        }
        println!(
            "  {}",
            summary
                .finished_at
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M")
        );
    }

    fn on_empty(&mut self) {
        println!("{}", EMPTY_GUIDANCE);
    }
}
