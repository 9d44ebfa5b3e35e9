//! services/mobile_client/src/bin/coach.rs
//!
//! Terminal front end for the coaching client.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use client_lib::{
    adapters::{FileTokenStore, ReqwestTransport, SystemClock},
    config::ClientConfig,
    error::ClientError,
    interaction::{
        activities, auth, dashboard, goals, ClientEvent, ClientState, EventSink, FlowError,
        TurnError,
    },
};
use coach_core::domain::{
    ActivityDraft, ActivityRecord, ActivityUpdate, Credentials, EnergyLevel, SignupDetails,
};
use coach_core::mutability::EditAvailability;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "coach", about = "Personal coaching client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and remember the session.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account.
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored session.
    Logout,
    /// Check whether the stored session is still accepted.
    Status,
    /// Show profile, streak and recent activities.
    Dashboard,
    /// List the activity types the service offers.
    Types,
    /// Log an activity for today.
    Log {
        #[arg(long)]
        name: String,
        #[arg(long)]
        duration: u32,
        #[arg(long, default_value = "")]
        notes: String,
        #[arg(long, default_value_t = 3)]
        energy: u8,
    },
    /// Edit an activity logged within the last 24 hours.
    Edit {
        id: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        duration: u32,
        #[arg(long, default_value = "")]
        notes: String,
        #[arg(long, default_value_t = 3)]
        energy: u8,
    },
    /// Delete an activity logged within the last 24 hours.
    Delete { id: i64 },
    /// Set the primary goal and comma separated focus areas.
    Goals {
        #[arg(long)]
        primary: String,
        #[arg(long, default_value = "")]
        focus: String,
    },
    /// Talk to the coach. One line per message, empty input to quit.
    Chat,
}

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let cli = Cli::parse();
    let config = Arc::new(ClientConfig::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    info!(api = %config.api_base_url, "Configuration loaded.");

    // --- 2. Initialize Adapters ---
    let transport = Arc::new(ReqwestTransport::new(config.api_base_url.clone())?);
    let store = Arc::new(FileTokenStore::new(config.token_path.clone()));
    let (events, rx) = EventSink::channel();
    let state = ClientState::new(config, transport, store, Arc::new(SystemClock), events).await?;

    // --- 3. Surface Background Events ---
    let printer = tokio::spawn(print_events(rx));

    // --- 4. Run the Command ---
    let result = run(&state, cli.command).await;
    printer.abort();
    result
}

async fn run(state: &ClientState, command: Command) -> Result<(), ClientError> {
    match command {
        Command::Login { email, password } => {
            auth::login(state, &Credentials { email, password }).await?;
            println!("Signed in.");
        }
        Command::Signup {
            name,
            email,
            password,
        } => {
            auth::signup(
                state,
                &SignupDetails {
                    name,
                    email,
                    password,
                },
            )
            .await?;
            println!("Account created. Please log in.");
        }
        Command::Logout => {
            auth::logout(state).await?;
            println!("Signed out.");
        }
        Command::Status => match auth::check_session(state).await? {
            auth::SessionStatus::SignedIn => println!("Signed in."),
            auth::SessionStatus::SignedOut => println!("Not signed in."),
        },
        Command::Dashboard => print_dashboard(state).await?,
        Command::Types => {
            for kind in activities::activity_types(state).await? {
                match kind.category {
                    Some(category) => println!("{:>4}  {} ({})", kind.id, kind.name, category),
                    None => println!("{:>4}  {}", kind.id, kind.name),
                }
            }
        }
        Command::Log {
            name,
            duration,
            notes,
            energy,
        } => {
            let draft = ActivityDraft {
                name,
                duration_minutes: duration,
                notes,
                energy_level: energy_level(energy)?,
            };
            activities::log_activity(state, &draft).await?;
            println!("Activity logged.");
        }
        Command::Edit {
            id,
            name,
            duration,
            notes,
            energy,
        } => {
            let record = find_record(state, id).await?;
            let update = ActivityUpdate {
                name,
                duration_minutes: duration,
                notes,
                energy_level: energy_level(energy)?,
            };
            activities::update_activity(state, &record, &update).await?;
            println!("Activity updated.");
        }
        Command::Delete { id } => {
            let record = find_record(state, id).await?;
            activities::delete_activity(state, &record).await?;
            println!("Activity deleted.");
        }
        Command::Goals { primary, focus } => {
            let saved = goals::update_goals(state, &primary, &focus).await?;
            println!("Primary goal: {}", saved.primary_goal);
            if !saved.focus_areas.is_empty() {
                println!("Focus areas: {}", saved.focus_areas.join(", "));
            }
        }
        Command::Chat => chat(state).await?,
    }
    Ok(())
}

fn energy_level(raw: u8) -> Result<EnergyLevel, FlowError> {
    EnergyLevel::new(raw).map_err(|e| FlowError::Invalid(e.to_string()))
}

async fn find_record(state: &ClientState, id: i64) -> Result<ActivityRecord, FlowError> {
    dashboard::fetch_dashboard(state)
        .await?
        .activities
        .into_iter()
        .find(|record| record.id == id)
        .ok_or_else(|| FlowError::Invalid(format!("No recent activity with id {}.", id)))
}

async fn print_dashboard(state: &ClientState) -> Result<(), FlowError> {
    let snapshot = dashboard::fetch_dashboard(state).await?;
    if let Some(name) = &snapshot.profile.name {
        println!("Hello, {}.", name);
    }
    println!("Primary goal: {}", snapshot.profile.primary_goal);
    println!("Streak: {} days, goals: {}", snapshot.streak, snapshot.goals_count);

    for record in &snapshot.activities {
        let availability = activities::availability(state, record);
        println!("{}", activity_line(record, &availability));
    }
    Ok(())
}

/// One dashboard row. Locked records carry the edit-window explanation
/// on a second line instead of an edit hint.
fn activity_line(record: &ActivityRecord, availability: &EditAvailability) -> String {
    let minutes = record
        .duration_minutes
        .map(|m| format!("{} min", m))
        .unwrap_or_else(|| "-".to_string());
    let row = format!(
        "{:>6}  {}  {}  {}",
        record.id,
        record.created_at.format("%Y-%m-%d %H:%M"),
        record.name,
        minutes
    );
    match availability {
        EditAvailability::Editable { until } => {
            format!("{}  (editable until {})", row, until.format("%Y-%m-%d %H:%M"))
        }
        EditAvailability::Expired { explanation } => format!("{}
        {}", row, explanation),
    }
}

async fn chat(state: &ClientState) -> Result<(), ClientError> {
    let session = state.conversation();
    let mut progress = session.progress();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Ask your coach anything. Empty line to quit.");
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            break;
        }

        let turn = session.submit_turn(&line);
        tokio::pin!(turn);
        let report = loop {
            tokio::select! {
                report = &mut turn => break report,
                Ok(()) = progress.changed() => {
                    if let Some(label) = session.progress_label() {
                        eprintln!("  {}", label);
                    }
                }
            }
        };

        match report {
            Ok(report) => println!("coach> {}", report.reply.content()),
            Err(TurnError::EmptyInput) => continue,
            Err(e) => {
                println!("{}", e);
                break;
            }
        }
    }

    session.close();
    Ok(())
}

async fn print_events(mut rx: mpsc::UnboundedReceiver<ClientEvent>) {
    while let Some(event) = rx.recv().await {
        match event {
            ClientEvent::ServiceStarting { message, .. } => eprintln!("{}", message),
            ClientEvent::SessionExpired => {
                eprintln!("Your session has expired. Run `coach login` to sign in again.")
            }
            ClientEvent::TurnStarted { .. } | ClientEvent::TurnResolved { .. } => {}
        }
    }
}
