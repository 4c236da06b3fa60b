mod ai;
mod domain;
mod energy;
mod error;
mod server;
mod session;
mod store;
mod summary;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use tokio::sync::RwLock;

use crate::ai::GeminiClient;
use crate::domain::MealType;
use crate::server::{AppData, AppState};
use crate::session::MockAuth;
use crate::store::Storage;
use crate::summary::DailySummary;

/// Single-user diet tracking service with AI-assisted food logging.
#[derive(Parser, Debug)]
#[command(name = "dietlog")]
#[command(about = "Personal diet tracking with calorie budgets and an AI food assistant")]
#[command(version)]
struct Args {
    /// Path to the storage file.
    /// Can also be set via DIETLOG_FILE environment variable.
    #[arg(value_name = "FILE", env = "DIETLOG_FILE", default_value = "dietlog.json")]
    file: PathBuf,

    /// Port number for the web server.
    /// Can also be set via DIETLOG_PORT environment variable.
    #[arg(value_name = "PORT", env = "DIETLOG_PORT", default_value = "8080")]
    port: u16,

    /// API key for the generative AI service. AI-assisted features degrade
    /// to safe fallbacks when unset.
    #[arg(long, env = "GEMINI_API_KEY")]
    gemini_api_key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    // Parse command line arguments
    let args = Args::parse();

    // Load persisted state
    println!("Loading diet log from: {}", args.file.display());
    let storage = Storage::open(&args.file);
    let data = AppData::load(storage);
    print_summary(&data);

    if args.gemini_api_key.is_none() {
        log::warn!("GEMINI_API_KEY not set, AI-assisted features will use fallbacks");
    }

    // Build application state
    let state = Arc::new(AppState {
        data: RwLock::new(data),
        ai: Arc::new(GeminiClient::new(args.gemini_api_key)),
        auth: Arc::new(MockAuth::default()),
    });

    // Determine static directory (relative to executable or cwd)
    let static_dir = find_static_dir();
    println!();
    println!("Static files: {}", static_dir.display());

    // Start server
    server::run_server(state, args.port, static_dir).await?;

    Ok(())
}

/// Prints a startup summary of the stored data.
fn print_summary(data: &AppData) {
    let today = Local::now().date_naive();
    let records = data.records.all();

    println!();
    println!("=== Diet Log Summary ===");
    println!();
    println!(
        "Profile: {}, {} y, {:.0} cm, {:.1} kg",
        data.profile.gender.display_name(),
        data.profile.age,
        data.profile.height_cm,
        data.profile.weight_kg
    );
    println!(
        "Activity: {}   Goal: {}",
        data.profile.activity_level.display_name(),
        data.profile.goal.display_name()
    );
    println!("Total records: {}", records.len());

    // Per-meal stats for today
    for meal in MealType::all() {
        let entries: Vec<_> = records
            .iter()
            .filter(|r| r.meal_type == *meal && r.local_date() == today)
            .collect();
        if !entries.is_empty() {
            let kcal: u32 = entries.iter().map(|r| r.calories).sum();
            println!(
                "{:10} {:3} entries  {:5} kcal",
                meal.display_name(),
                entries.len(),
                kcal
            );
        }
    }

    let summary = DailySummary::for_day(&data.profile, records, today);
    println!();
    println!(
        "Today: {} / {} kcal ({:.0}% of goal)",
        summary.intake, summary.daily_goal, summary.percentage
    );
}

/// Finds the static directory for serving frontend files.
fn find_static_dir() -> PathBuf {
    // Try relative to current working directory
    let cwd_static = PathBuf::from("static");
    if cwd_static.is_dir() {
        return cwd_static;
    }

    // Try relative to executable
    if let Ok(exe_path) = std::env::current_exe()
        && let Some(exe_dir) = exe_path.parent()
    {
        let exe_static = exe_dir.join("static");
        if exe_static.is_dir() {
            return exe_static;
        }
    }

    // Default to cwd/static
    cwd_static
}
