use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{Local, Utc};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use employee_portal::{BackendClient, ChangeTable, ShiftEventProcessor};
use portal_core::config::{check_environment, PortalConfig};
use portal_core::db::Database;
use portal_core::i18n::{dictionary, initialize_missing_translation_monitoring, translate};
use portal_core::models::{
    ImportedCalendar, Language, NotificationDefaults, RealtimePayload, SectionLabels,
};
use portal_core::notifications::{count_unread, group_by_recency, summary_translation_key};
use portal_core::realtime::ShiftNotificationCopy;
use portal_core::shifts::{build_maps_search_url, phase_of};
use portal_core::time::{relative_time_label, RelativeTimeLabels};

const NO_VARS: &[(&str, &str)] = &[];

#[derive(Parser)]
#[command(name = "portal")]
#[command(about = "Shifts and notifications from the employee portal backend")]
struct Cli {
    /// Output language (en, de). Defaults to the employee's stored choice
    #[arg(long, global = true, value_parser = parse_language)]
    lang: Option<Language>,

    /// Local cache database
    #[arg(long, global = true, env = "PORTAL_DB_PATH")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct EmployeeArgs {
    /// Employee id
    #[arg(long, env = "PORTAL_EMPLOYEE_ID")]
    employee: String,

    /// Session token of the signed-in employee
    #[arg(long, env = "PORTAL_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check backend and database environment variables
    CheckConfig {
        /// Load variables from this file first
        #[arg(long)]
        env_file: Option<PathBuf>,

        /// Host every URL variable must reference (defaults to the SUPABASE_URL host)
        #[arg(long)]
        expected_host: Option<String>,
    },
    /// Probe the notifications table
    Health,
    /// List the shifts visible to an employee
    Shifts {
        #[command(flatten)]
        employee: EmployeeArgs,

        #[arg(long)]
        json: bool,
    },
    /// List notifications grouped by day
    Notifications {
        #[command(flatten)]
        employee: EmployeeArgs,

        /// Read the local cache only
        #[arg(long)]
        offline: bool,

        #[arg(long)]
        json: bool,
    },
    /// Mark notifications as read
    MarkRead {
        #[command(flatten)]
        employee: EmployeeArgs,

        #[arg(long, conflicts_with = "all", required_unless_present = "all")]
        id: Option<String>,

        #[arg(long)]
        all: bool,
    },
    /// Feed change events (one JSON payload per line) through the notification processor
    Replay {
        #[command(flatten)]
        employee: EmployeeArgs,

        /// Table the events were emitted for (shift_assignments, shifts)
        #[arg(long, default_value = "shift_assignments", value_parser = parse_table)]
        table: ChangeTable,

        /// Read events from this file instead of stdin
        file: Option<PathBuf>,
    },
    /// Show or set the preferred language
    Language {
        #[arg(long, env = "PORTAL_EMPLOYEE_ID")]
        employee: String,

        #[arg(value_parser = parse_language)]
        set: Option<Language>,
    },
    /// Show or change the calendars used for shift sync
    Calendars {
        #[arg(long, env = "PORTAL_EMPLOYEE_ID")]
        employee: String,

        #[command(subcommand)]
        action: Option<CalendarAction>,
    },
}

#[derive(Subcommand)]
enum CalendarAction {
    /// Add a calendar to the selection, or remove it if already selected
    Toggle {
        #[arg(long)]
        id: String,

        #[arg(long)]
        title: String,

        #[arg(long)]
        source: Option<String>,
    },
}

fn parse_language(value: &str) -> Result<Language, String> {
    Language::from_str(&value.trim().to_lowercase())
        .ok_or_else(|| format!("unsupported language '{value}' (expected en or de)"))
}

fn parse_table(value: &str) -> Result<ChangeTable, String> {
    ChangeTable::from_str(value)
        .ok_or_else(|| format!("unsupported table '{value}' (expected shift_assignments or shifts)"))
}

fn open_database(path: Option<&Path>) -> anyhow::Result<Database> {
    let db = match path {
        Some(path) => Database::open(path)?,
        None => Database::open_default()?,
    };
    db.migrate()?;
    Ok(db)
}

fn backend_client(config: &PortalConfig, employee: &EmployeeArgs) -> anyhow::Result<BackendClient> {
    let client = BackendClient::new(config)?;
    Ok(match &employee.access_token {
        Some(token) => client.with_access_token(token.clone()),
        None => client,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "employee_portal=info,portal_core=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    initialize_missing_translation_monitoring();

    let cli = Cli::parse();

    match cli.command {
        Commands::CheckConfig {
            env_file,
            expected_host,
        } => {
            if let Some(path) = env_file {
                dotenvy::from_path(&path)
                    .with_context(|| format!("loading {}", path.display()))?;
            }
            let report = check_environment(|key| std::env::var(key).ok(), expected_host.as_deref());
            println!("{}", report.render());
            if !report.passed() {
                std::process::exit(report.exit_code());
            }
        }
        Commands::Health => {
            let config = PortalConfig::from_env()?;
            let client = BackendClient::new(&config)?;
            let status = client.check_notifications_table().await;
            println!("{}", serde_json::to_string_pretty(&status)?);
            if !status.ok {
                std::process::exit(1);
            }
        }
        Commands::Shifts { employee, json } => {
            let config = PortalConfig::from_env()?;
            let db_path = cli.db.or_else(|| config.db_path.clone());
            let db = open_database(db_path.as_deref())?;
            let language = match cli.lang {
                Some(language) => language,
                None => db.load_language(Some(employee.employee.as_str()), config.language)?,
            };

            let client = backend_client(&config, &employee)?;
            let shifts = client.shifts_for_employee(&employee.employee).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&shifts)?);
                return Ok(());
            }
            if shifts.is_empty() {
                println!("{}", translate(language, "shiftsEmpty", NO_VARS));
                return Ok(());
            }

            let words = dictionary(language);
            let now = Utc::now();
            for shift in &shifts {
                let phase = phase_of(shift, now)
                    .map(|phase| words.get(phase.label_key()).to_string())
                    .unwrap_or_default();
                let confirmation = shift
                    .confirmation_status
                    .map(|status| words.get(status.label_key()).to_string())
                    .unwrap_or_default();
                println!(
                    "{}  {} -> {}  [{}] {} {}",
                    shift.title,
                    shift.start,
                    shift.end,
                    phase,
                    words.get(shift.status.label_key()),
                    confirmation
                );
                let address = shift.object_address.as_deref().unwrap_or(&shift.location);
                match build_maps_search_url(Some(address)) {
                    Some(url) => println!("    {}  {}", shift.location, url),
                    None => println!("    {}", shift.location),
                }
            }
        }
        Commands::Notifications {
            employee,
            offline,
            json,
        } => {
            let config = PortalConfig::from_env()?;
            let db_path = cli.db.or_else(|| config.db_path.clone());
            let db = open_database(db_path.as_deref())?;
            let language = match cli.lang {
                Some(language) => language,
                None => db.load_language(Some(employee.employee.as_str()), config.language)?,
            };
            let words = dictionary(language);

            let notifications = if offline {
                db.cached_notifications(&employee.employee)?
            } else {
                let client = backend_client(&config, &employee)?;
                let defaults = NotificationDefaults::from_dictionary(words);
                match client.notifications(&employee.employee, &defaults).await {
                    Ok(list) => {
                        db.cache_notifications(&employee.employee, &list)?;
                        list
                    }
                    Err(err) => {
                        tracing::warn!("Could not load notifications ({}); showing cached copy", err);
                        db.cached_notifications(&employee.employee)?
                    }
                }
            };

            let sections = group_by_recency(
                &notifications,
                &SectionLabels::from_dictionary(words),
                &Local::now(),
            );
            if json {
                println!("{}", serde_json::to_string_pretty(&sections)?);
                return Ok(());
            }

            let unread = count_unread(&notifications);
            println!(
                "{} ({})",
                words.get("notificationsPanelTitle"),
                translate(language, summary_translation_key(unread), &[("count", unread)])
            );
            if notifications.is_empty() {
                println!("{}", words.get("notificationsEmpty"));
            }

            let labels = RelativeTimeLabels::from_dictionary(words);
            let now = Utc::now();
            for section in &sections {
                println!();
                println!("{}", section.title);
                for item in &section.items {
                    println!(
                        "  {} {} - {} ({}, {})",
                        if item.read { " " } else { "*" },
                        item.title,
                        item.detail,
                        words.get(item.category.label_key()),
                        relative_time_label(&item.created_at, &labels, now)
                    );
                    if let Some(target) = &item.target_path {
                        println!("      {}", target);
                    }
                }
            }
        }
        Commands::MarkRead { employee, id, all } => {
            let config = PortalConfig::from_env()?;
            let db_path = cli.db.or_else(|| config.db_path.clone());
            let db = open_database(db_path.as_deref())?;
            let client = backend_client(&config, &employee)?;

            if all {
                client.mark_all_notifications_read(&employee.employee).await?;
                let changed = db.mark_all_cached_read(&employee.employee)?;
                tracing::info!("Marked all notifications read ({} cached)", changed);
            } else if let Some(id) = id {
                client.mark_notification_read(&employee.employee, &id).await?;
                db.mark_cached_read(&employee.employee, &id)?;
                tracing::info!("Marked notification {} read", id);
            }
        }
        Commands::Replay {
            employee,
            table,
            file,
        } => {
            let config = PortalConfig::from_env()?;
            let language = cli.lang.unwrap_or(config.language);
            let client = backend_client(&config, &employee)?;
            let copy = ShiftNotificationCopy::from_dictionary(dictionary(language));
            let mut processor = ShiftEventProcessor::new(client, employee.employee.clone(), copy);

            let reader: Box<dyn BufRead> = match &file {
                Some(path) => Box::new(BufReader::new(
                    std::fs::File::open(path)
                        .with_context(|| format!("opening {}", path.display()))?,
                )),
                None => Box::new(BufReader::new(std::io::stdin())),
            };

            tracing::info!("Replaying {} events for {}", table.as_str(), employee.employee);
            for (index, line) in reader.lines().enumerate() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let payload: RealtimePayload = match serde_json::from_str(&line) {
                    Ok(payload) => payload,
                    Err(err) => {
                        tracing::warn!("Skipping line {}: {}", index + 1, err);
                        continue;
                    }
                };
                let outcome = processor.handle(table, &payload).await;
                println!("{}", serde_json::to_string(&outcome)?);
            }
        }
        Commands::Language { employee, set } => {
            let db = open_database(cli.db.as_deref())?;
            let language = match set {
                Some(language) => {
                    db.store_language(&employee, language)?;
                    language
                }
                None => db.load_language(Some(employee.as_str()), Language::default())?,
            };
            println!(
                "{} ({})",
                language.as_str(),
                dictionary(language).get(language.label_key())
            );
        }
        Commands::Calendars { employee, action } => {
            let db = open_database(cli.db.as_deref())?;
            let language = match cli.lang {
                Some(language) => language,
                None => db.load_language(Some(employee.as_str()), Language::default())?,
            };

            let selection = match action {
                Some(CalendarAction::Toggle { id, title, source }) => db.toggle_calendar(
                    &employee,
                    ImportedCalendar {
                        id,
                        title,
                        source_name: source,
                    },
                )?,
                None => db.calendar_selection(&employee)?,
            };

            if selection.is_empty() {
                println!("{}", translate(language, "calendarNoneSelected", NO_VARS));
            } else {
                println!(
                    "{}",
                    translate(language, "calendarSelectedCount", &[("count", selection.len())])
                );
                for calendar in &selection {
                    println!(
                        "  {}\t{}\t{}",
                        calendar.id,
                        calendar.title,
                        calendar.source_name.as_deref().unwrap_or("")
                    );
                }
            }
        }
    }

    Ok(())
}
