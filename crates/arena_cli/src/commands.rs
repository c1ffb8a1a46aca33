//! Subcommands and their handlers.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use arena_core::engine::commentary::format_clock;
use arena_core::engine::{summarize_many, BatchSummary};
use arena_core::live::MemoryResultSink;
use arena_core::models::fixtures::demo_pair;
use arena_core::{
    EngineConfig, LiveConfig, MatchEngine, MatchFeed, MatchKind, MatchOptions, MatchRegistry,
    MatchResult, MatchSnapshot, Team, ViewerId,
};
use clap::{Args, Subcommand, ValueEnum};
use schemars::schema_for;
use tracing::info;

#[derive(Subcommand)]
pub enum Commands {
    /// Simulate one match to completion
    Simulate {
        #[command(flatten)]
        setup: MatchSetup,

        /// Print the full result as JSON instead of the commentary
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Simulate many seeds of the same fixture and summarize them
    Batch {
        #[command(flatten)]
        setup: MatchSetup,

        /// Number of matches
        #[arg(long, default_value_t = 100)]
        count: usize,
    },

    /// Host matches in the live registry and follow one of them
    Live {
        #[command(flatten)]
        setup: MatchSetup,

        /// Concurrent matches to host
        #[arg(long, default_value_t = 1)]
        matches: usize,

        /// Wall-clock milliseconds per tick
        #[arg(long, default_value_t = 20)]
        tick_ms: u64,

        /// Pause the followed match for this many seconds once it is running
        #[arg(long)]
        pause_secs: Option<u64>,
    },

    /// Print the JSON schema of a wire type
    Schema {
        #[arg(value_enum)]
        target: SchemaTarget,
    },
}

#[derive(Args)]
pub struct MatchSetup {
    /// Home team JSON (demo roster when omitted)
    #[arg(long)]
    home: Option<PathBuf>,

    /// Away team JSON (demo roster when omitted)
    #[arg(long)]
    away: Option<PathBuf>,

    /// Play a league match instead of an exhibition
    #[arg(long, default_value = "false")]
    league: bool,

    /// Seed (random when omitted; batches use seed, seed + 1, ...)
    #[arg(long)]
    seed: Option<u64>,

    /// Engine config YAML
    #[arg(long, conflicts_with = "profile")]
    config: Option<PathBuf>,

    /// Engine preset: standard, arcade or grind
    #[arg(long)]
    profile: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SchemaTarget {
    Team,
    Snapshot,
    Feed,
    Result,
    LiveConfig,
}

impl MatchSetup {
    fn kind(&self) -> MatchKind {
        MatchKind::from_exhibition_flag(!self.league)
    }

    fn engine_config(&self) -> Result<EngineConfig> {
        if let Some(path) = &self.config {
            return EngineConfig::from_path(path).with_context(|| format!("loading config {}", path.display()));
        }
        match &self.profile {
            Some(name) => match EngineConfig::from_profile(name) {
                Some(config) => Ok(config),
                None => bail!("unknown profile '{name}' (expected standard, arcade or grind)"),
            },
            None => Ok(EngineConfig::from_env_or_default()),
        }
    }

    fn teams(&self) -> Result<(Team, Team)> {
        let (demo_home, demo_away) = demo_pair();
        let home = match &self.home {
            Some(path) => load_team(path)?,
            None => demo_home,
        };
        let away = match &self.away {
            Some(path) => load_team(path)?,
            None => demo_away,
        };
        Ok((home, away))
    }
}

fn load_team(path: &Path) -> Result<Team> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing team {}", path.display()))
}

pub async fn handle_command(command: Commands) -> Result<()> {
    match command {
        Commands::Simulate { setup, json } => simulate(&setup, json),
        Commands::Batch { setup, count } => batch(&setup, count),
        Commands::Live { setup, matches, tick_ms, pause_secs } => live(&setup, matches, tick_ms, pause_secs).await,
        Commands::Schema { target } => schema(target),
    }
}

fn simulate(setup: &MatchSetup, json: bool) -> Result<()> {
    let (home, away) = setup.teams()?;
    let mut engine = MatchEngine::new("cli", home, away, setup.kind(), setup.engine_config()?, setup.seed)?;
    info!(seed = engine.seed(), "simulating");
    let result = engine.run_to_completion();

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }
    for event in &result.events {
        println!("[{}] {} {}", format_clock(event.clock_secs), event.pacing.tier.banner(), event.commentary);
    }
    print_result(&result, engine.seed());
    Ok(())
}

fn batch(setup: &MatchSetup, count: usize) -> Result<()> {
    if count == 0 {
        bail!("--count must be at least 1");
    }
    let (home, away) = setup.teams()?;
    let config = setup.engine_config()?;
    let base_seed = setup.seed.unwrap_or(0);
    let summary = summarize_many(&home, &away, setup.kind(), &config, base_seed, count)?;
    print_summary(&home, &away, &summary);
    Ok(())
}

async fn live(setup: &MatchSetup, matches: usize, tick_ms: u64, pause_secs: Option<u64>) -> Result<()> {
    if matches == 0 {
        bail!("--matches must be at least 1");
    }
    let live_config = LiveConfig { tick_interval_ms: tick_ms, ..LiveConfig::default() };
    let registry = MatchRegistry::with_sink(live_config, setup.engine_config()?, Arc::new(MemoryResultSink::new()));

    let mut ids = Vec::with_capacity(matches);
    for index in 0..matches {
        let (home, away) = setup.teams()?;
        let options = MatchOptions {
            kind: setup.kind(),
            seed: setup.seed.map(|s| s.wrapping_add(index as u64)),
            ..MatchOptions::default()
        };
        ids.push(registry.create_match_with(home, away, options)?);
    }

    let followed = ids[0].clone();
    let mut subscription = registry.subscribe(&followed, ViewerId::from("cli")).await?;
    print_snapshot_header(&subscription.snapshot);
    for id in &ids {
        registry.start_match(id).await?;
    }

    let mut paused_once = pause_secs.is_none();
    while let Some(item) = subscription.feed.recv().await {
        match item {
            MatchFeed::Event(event) => {
                println!("[{}] {}", format_clock(event.clock_secs), event.commentary);
                if !paused_once && event.sequence >= 5 {
                    paused_once = true;
                    let secs = pause_secs.unwrap_or(0);
                    registry.pause_match(&followed).await?;
                    println!("-- paused for {secs}s --");
                    tokio::time::sleep(Duration::from_secs(secs)).await;
                    registry.resume_match(&followed).await?;
                }
            }
            MatchFeed::Snapshot(snapshot) => {
                println!("-- resync at #{} ({}) --", snapshot.last_sequence, format_clock(snapshot.clock_secs));
            }
            MatchFeed::Final(snapshot) => {
                let (home, away) = snapshot.score();
                println!("-- final: {} {home} - {away} {} --", snapshot.home.name, snapshot.away.name);
                break;
            }
        }
    }

    // wait for the other matches before leaving
    while registry.active_count() > 0 {
        tokio::time::sleep(Duration::from_millis(tick_ms.max(1) * 10)).await;
    }
    for id in &ids {
        if let Some(result) = registry.result(id)? {
            println!("{id}: {}", result.summary_line());
        }
    }
    Ok(())
}

fn schema(target: SchemaTarget) -> Result<()> {
    let schema = match target {
        SchemaTarget::Team => schema_for!(Team),
        SchemaTarget::Snapshot => schema_for!(MatchSnapshot),
        SchemaTarget::Feed => schema_for!(MatchFeed),
        SchemaTarget::Result => schema_for!(MatchResult),
        SchemaTarget::LiveConfig => schema_for!(LiveConfig),
    };
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

fn print_snapshot_header(snapshot: &MatchSnapshot) {
    println!("{} vs {} ({:?}, {})", snapshot.home.name, snapshot.away.name, snapshot.kind, snapshot.match_id);
}

fn print_result(result: &MatchResult, seed: u64) {
    println!();
    println!("{}", result.summary_line());
    println!("seed: {seed}, events: {}", result.events.len());
    for (rank, mvp) in result.mvp_candidates.iter().enumerate() {
        println!("  MVP #{}: {} ({:?}) impact {:.1}", rank + 1, mvp.name, mvp.side, mvp.impact);
    }
}

fn print_summary(home: &Team, away: &Team, summary: &BatchSummary) {
    println!("{} vs {} over {} matches", home.name, away.name, summary.matches);
    println!(
        "  wins: home {} / away {} / draws {} (home win rate {:.1}%)",
        summary.home_wins,
        summary.away_wins,
        summary.draws,
        summary.home_win_rate() * 100.0
    );
    println!("  avg score: {:.2} - {:.2}", summary.avg_home_score, summary.avg_away_score);
    println!(
        "  avg events {:.1}, turnovers {:.2}, injuries {:.2}, long gains {:.1}%",
        summary.avg_events,
        summary.avg_turnovers,
        summary.avg_injuries,
        summary.long_gain_rate * 100.0
    );
}
