//! EduHub CLI - pathway progression from the terminal.

mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use eduhub_core::{Course, CourseId, CourseState, ProgressEvent, UserId, UserSession};
use eduhub_progress::{PathwayOverview, PathwayReport, PathwayService};
use eduhub_storage::{Catalog, JsonStorage};
use serde::Serialize;
use tracing::info;

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "eduhub")]
#[command(about = "Course pathway progression", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Data directory
    #[arg(short, long, default_value = ".eduhub")]
    data_dir: std::path::PathBuf,

    /// Log level when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print JSON output
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Import catalog courses from a JSON array
    Import {
        /// Path to the JSON file
        file: std::path::PathBuf,
    },
    /// List pathways
    Pathways,
    /// Show a pathway
    Show {
        /// Pathway name
        pathway: String,
        /// View as this user
        #[arg(long)]
        user: Option<UserId>,
    },
    /// Check prerequisites and estimate remaining effort
    Check {
        /// Pathway name
        pathway: String,
        /// Check for this user
        #[arg(long)]
        user: Option<UserId>,
    },
    /// Enroll a user in a course
    Enroll {
        /// Course ID
        course: CourseId,
        /// User ID
        #[arg(long)]
        user: UserId,
    },
    /// Report progress on a course
    Report {
        /// Course ID
        course: CourseId,
        /// User ID
        #[arg(long)]
        user: UserId,
        /// New completion percentage
        #[arg(long, conflicts_with = "complete")]
        percentage: Option<u8>,
        /// New current week
        #[arg(long, requires = "percentage")]
        week: Option<u32>,
        /// Mark the course completed
        #[arg(long)]
        complete: bool,
        /// Points awarded on completion
        #[arg(long, default_value = "0")]
        points: u32,
    },
    /// Show a user's enrolled courses
    Dashboard {
        /// User ID
        #[arg(long)]
        user: UserId,
    },
}

impl Cli {
    fn config(&self) -> AppConfig {
        AppConfig {
            data_dir: self.data_dir.clone(),
            log_level: self.log_level.clone(),
            json: self.json,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.config();
    config.init_logging();

    let storage = JsonStorage::new(&config.data_dir)
        .await
        .with_context(|| format!("opening data directory {}", config.data_dir.display()))?;
    let mut service = PathwayService::new(storage);

    match cli.command {
        Commands::Import { file } => {
            let raw = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("reading {}", file.display()))?;
            let courses: Vec<Course> = serde_json::from_str(&raw).context("parsing course list")?;
            for course in &courses {
                service.storage_mut().save_course(course).await?;
            }
            info!(count = courses.len(), "imported courses");
            println!("Imported {} courses", courses.len());
        }
        Commands::Pathways => {
            let names = service.storage().list_pathways().await?;
            if config.json {
                print_json(&names)?;
            } else {
                println!("Pathways ({})", names.len());
                for name in names {
                    println!("  {}", name);
                }
            }
        }
        Commands::Show { pathway, user } => {
            let session = user.map(session_for);
            let overview = service.overview(session.as_ref(), &pathway).await?;
            if config.json {
                print_json(&overview)?;
            } else {
                print_overview(&overview);
            }
        }
        Commands::Check { pathway, user } => {
            let session = user.map(session_for);
            let report = service.analyze(session.as_ref(), &pathway).await?;
            if config.json {
                print_json(&report)?;
            } else {
                print_report(&report);
            }
        }
        Commands::Enroll { course, user } => {
            let progress = service.enroll(&session_for(user), &course).await?;
            if config.json {
                print_json(&progress)?;
            } else {
                println!("Enrolled {} in {}", progress.user_id, progress.course_id);
            }
        }
        Commands::Report { course, user, percentage, week, complete, points } => {
            let event = if complete {
                ProgressEvent::Completed { at: chrono::Utc::now(), points_earned: points }
            } else if let Some(percentage) = percentage {
                ProgressEvent::Advanced { percentage, current_week: week }
            } else {
                ProgressEvent::Started
            };
            let progress = service.report(&session_for(user), &course, event).await?;
            if config.json {
                print_json(&progress)?;
            } else {
                println!(
                    "{} | {} | {}%",
                    progress.course_id,
                    progress.status.as_str(),
                    progress.completion_percentage
                );
            }
        }
        Commands::Dashboard { user } => {
            let entries = service.dashboard(&session_for(user)).await?;
            if config.json {
                print_json(&entries)?;
            } else {
                println!("Enrolled courses ({})", entries.len());
                for entry in entries {
                    println!(
                        "  {} | {} | {}% | {} pts - {}",
                        entry.course_id,
                        format_state(entry.state),
                        entry.completion_percentage,
                        entry.points_earned,
                        entry.title.as_deref().unwrap_or("(removed from catalog)"),
                    );
                }
            }
        }
    }

    Ok(())
}

/// The CLI acts on behalf of whichever user is named on the command line.
fn session_for(user: UserId) -> UserSession {
    let name = user.to_string();
    UserSession::student(user, name)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_overview(overview: &PathwayOverview) {
    println!("{} ({} stages)", overview.name, overview.total_stages);
    for course in &overview.courses {
        println!(
            "  [{}] {} | {} | {}",
            course.order.map(|o| o.to_string()).unwrap_or_default(),
            course.stage_title.as_deref().unwrap_or(&course.title),
            format_state(course.state),
            course.button_label,
        );
        if let Some(message) = &course.unlock_message {
            println!("      {}", message);
        }
    }
    let stats = &overview.stats;
    println!(
        "Completed: {}  Active: {}  Locked: {}  Progress: {}%",
        stats.completed_courses, stats.active_courses, stats.locked_courses, stats.overall_progress
    );
}

fn print_report(report: &PathwayReport) {
    println!("{}", report.name);

    let prereqs = &report.prerequisites;
    for (course, missing) in &prereqs.unresolved {
        println!("  ! {} requires {} (not in pathway)", course, missing);
    }
    for cycle in &prereqs.cycles {
        let chain: Vec<_> = cycle.iter().map(|id| id.to_string()).collect();
        println!("  ! prerequisite cycle: {}", chain.join(" -> "));
    }
    for blocked in &prereqs.blocked {
        let waiting: Vec<_> = blocked.waiting_on.iter().map(|id| id.to_string()).collect();
        println!("  {} waits on {}", blocked.course_id, waiting.join(", "));
    }
    for suggestion in &prereqs.suggestions {
        println!("  -> {}", suggestion.description);
    }

    let estimate = &report.estimate;
    println!(
        "Points: {}  Weeks remaining: {}/{}",
        estimate.points_earned, estimate.estimated_weeks_remaining, estimate.estimated_weeks_total
    );
    if let Some(next) = &estimate.next_stage {
        println!("Next stage: {}", next);
    }
}

fn format_state(state: CourseState) -> &'static str {
    match state {
        CourseState::Locked => "LOCKED",
        CourseState::NotStarted => "NOT STARTED",
        CourseState::InProgress => "IN PROGRESS",
        CourseState::Completed => "COMPLETED",
    }
}
