mod api;
mod chat;
mod models;
mod ranking;
mod search;
mod tui;

use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use std::io::{BufRead, Write};

use api::{HttpChatClient, HttpMatchClient};
use chat::{ChatSession, Role, QUICK_SUGGESTIONS};
use models::{TopK, Weights, PRESET_JOBS};
use ranking::{Band, FilterState, ResultsView, SortKey, SortOrder, SortSpec};
use search::SearchController;

#[derive(Parser)]
#[command(name = "scout")]
#[command(about = "Talent matching client - describe a role, get ranked candidates")]
struct Cli {
    /// Matching service origin (overrides SCOUT_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct QueryArgs {
    /// Free-text job description
    description: Option<String>,

    /// Use a sample job description instead (1-3, see `scout presets`)
    #[arg(long)]
    preset: Option<usize>,

    /// Number of recommendations to request
    #[arg(short, long, value_enum, default_value = "10")]
    top_k: TopK,

    /// Send per-criterion scoring weights with the request
    #[arg(short, long)]
    weighted: bool,

    /// Bio weight (0-1, only with --weighted)
    #[arg(long, default_value_t = 0.5)]
    weight_bio: f64,

    /// Skills weight (0-1, only with --weighted)
    #[arg(long, default_value_t = 0.2)]
    weight_skills: f64,

    /// Software weight (0-1, only with --weighted)
    #[arg(long, default_value_t = 0.2)]
    weight_software: f64,

    /// Location weight (0-1, only with --weighted)
    #[arg(long, default_value_t = 0.1)]
    weight_location: f64,
}

#[derive(Args)]
struct ViewArgs {
    /// Filter by location substring
    #[arg(long)]
    location: Option<String>,

    /// Minimum normalized score (0-1)
    #[arg(long, default_value_t = 0.0)]
    min_score: f64,

    /// Maximum monthly/hourly rate
    #[arg(long)]
    max_rate: Option<f64>,

    /// Filter by job type substring
    #[arg(long)]
    job_type: Option<String>,

    /// Drop candidates with no rate from a max-rate filter
    #[arg(long)]
    exclude_rateless: bool,

    /// Sort key
    #[arg(long, value_enum, default_value = "score")]
    sort: SortKey,

    /// Sort direction
    #[arg(long, value_enum, default_value = "desc")]
    order: SortOrder,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for candidates and print the ranked results
    Search {
        #[command(flatten)]
        query: QueryArgs,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// Search, then browse the results interactively
    Browse {
        #[command(flatten)]
        query: QueryArgs,
    },

    /// Talk to the AI talent assistant
    Chat,

    /// List the sample job descriptions
    Presets,
}

fn resolve_description(query: &QueryArgs) -> Result<String> {
    if let Some(description) = &query.description {
        return Ok(description.clone());
    }
    if let Some(preset) = query.preset {
        return PRESET_JOBS
            .get(preset.wrapping_sub(1))
            .map(|job| job.description.to_string())
            .ok_or_else(|| anyhow!("Unknown preset {}. Available: 1-{}", preset, PRESET_JOBS.len()));
    }
    Err(anyhow!(
        "Provide a job description or pick a sample with --preset 1-{}",
        PRESET_JOBS.len()
    ))
}

fn build_controller(query: &QueryArgs) -> Result<SearchController> {
    let mut controller = SearchController::new();
    controller.description = resolve_description(query)?;
    controller.top_k = query.top_k;
    controller.use_weighted = query.weighted;
    controller.weights = Weights {
        bio: query.weight_bio,
        skills: query.weight_skills,
        software: query.weight_software,
        location: query.weight_location,
    };
    Ok(controller)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let base_url = cli.api_url.clone().unwrap_or_else(api::api_base_url);

    match cli.command {
        Commands::Search { query, view } => {
            let controller = run_search(&query, &base_url)?;
            print_results(&controller, &view);
        }

        Commands::Browse { query } => {
            let controller = run_search(&query, &base_url)?;
            let service = HttpMatchClient::new(base_url);
            tui::run_browse(controller, &service)?;
        }

        Commands::Chat => run_chat(&base_url)?,

        Commands::Presets => {
            for (i, job) in PRESET_JOBS.iter().enumerate() {
                println!("{}. {}", i + 1, job.title);
                for line in textwrap::fill(job.description, 76).lines() {
                    println!("   {}", line);
                }
                println!();
            }
        }
    }

    Ok(())
}

fn run_search(query: &QueryArgs, base_url: &str) -> Result<SearchController> {
    let mut controller = build_controller(query)?;
    let service = HttpMatchClient::new(base_url);
    println!("Searching for talent matches...");
    controller.submit(&service);
    if let Some(notice) = controller.notice() {
        println!("{}", notice.text);
    }
    Ok(controller)
}

fn print_results(controller: &SearchController, view_args: &ViewArgs) {
    if let Some(summary) = ranking::summarize(controller.results()) {
        println!(
            "\nMatches: {}  Avg score: {:.1}%  Excellent: {}  Good: {}  Fair: {}  Poor: {}",
            summary.total_matches,
            summary.average_score * 100.0,
            summary.excellent,
            summary.good,
            summary.fair,
            summary.poor
        );
    }

    let filter = FilterState {
        location: view_args.location.clone().unwrap_or_default(),
        min_score: view_args.min_score,
        max_rate: view_args.max_rate,
        job_type: view_args.job_type.clone().unwrap_or_default(),
        exclude_rateless: view_args.exclude_rateless,
    };
    let sort = SortSpec {
        key: view_args.sort,
        order: view_args.order,
    };

    match ranking::build_view(controller.results(), &filter, sort) {
        ResultsView::NoRecommendations => {
            println!("\nNo recommendations yet.");
        }
        ResultsView::NoFilterMatches => {
            println!("\nNo results match your current filters.");
        }
        ResultsView::Ranked(rows) => {
            println!(
                "\n{:<5} {:<24} {:>7} {:<10} {:<20} {:>8} {:<20}",
                "RANK", "NAME", "SCORE", "BAND", "RATE", "VIEWS", "LOCATION"
            );
            println!("{}", "-".repeat(100));
            for row in &rows {
                let score = ranking::effective_score(row.candidate);
                println!(
                    "{:<5} {:<24} {:>6.1}% {:<10} {:<20} {:>8} {:<20}",
                    row.rank,
                    truncate(&row.candidate.full_name(), 22),
                    score * 100.0,
                    Band::classify(score).label(),
                    row.candidate.display_rate(),
                    row.candidate.views_count(),
                    truncate(&row.candidate.display_location(), 18)
                );
            }
        }
    }
}

fn run_chat(base_url: &str) -> Result<()> {
    let service = HttpChatClient::new(base_url);
    let mut session = ChatSession::new();

    println!("AI Talent Assistant. /1-/6 insert a suggestion, /quit exits.");
    print_new_messages(&mut session);

    let stdin = std::io::stdin();
    loop {
        if session.input().is_empty() {
            print!("> ");
        } else {
            print!("[{}]> ", truncate(session.input(), 40));
        }
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();

        match line {
            "/quit" | "/exit" => break,
            "" => {
                // Empty line sends whatever a suggestion left in the buffer;
                // with an empty buffer it is a guarded no-op.
                session.submit(&service);
            }
            cmd if cmd.starts_with('/') => {
                match cmd[1..].parse::<usize>() {
                    Ok(n) if (1..=QUICK_SUGGESTIONS.len()).contains(&n) => {
                        session.apply_suggestion(n - 1);
                        println!("(press Enter to send: {})", session.input());
                    }
                    _ => println!("Unknown command. /1-/6 insert a suggestion, /quit exits."),
                }
                continue;
            }
            text => {
                session.set_input(text);
                session.submit(&service);
            }
        }
        print_new_messages(&mut session);
    }

    Ok(())
}

/// Print exactly the turns appended since the last call; the append count
/// comes from the session's scroll-to-latest requests.
fn print_new_messages(session: &mut ChatSession) {
    let appended = session.drain_scroll_requests();
    let messages = session.messages();
    let start = messages.len().saturating_sub(appended);
    for message in &messages[start..] {
        match message.role {
            Role::User => println!("you: {}", message.body),
            Role::Assistant => {
                println!("assistant: {}", textwrap::fill(&message.body, 76));
                if !message.candidates.is_empty() {
                    println!("  Top candidates:");
                    for candidate in message.candidates.iter().take(3) {
                        let score = candidate.score.unwrap_or(0.0).clamp(0.0, 1.0);
                        println!(
                            "    #{} {} - {:.1}% match, {} ({})",
                            candidate.rank.unwrap_or_default(),
                            candidate.name.as_deref().unwrap_or("Unknown"),
                            score * 100.0,
                            candidate.location.as_deref().unwrap_or("?"),
                            candidate.skills.as_deref().unwrap_or("-")
                        );
                    }
                }
            }
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
