use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use deliveet_client::error::ClientError;
use deliveet_client::models::shipment::{ShipmentDraft, ShipmentStatus};
use deliveet_client::models::user::{RegisterRequest, Role};
use deliveet_client::state::AppState;
use serde::Serialize;
use tokio_stream::StreamExt;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(
    name = "deliveet",
    about = "Book shipments and run deliveries against the Deliveet API",
    version
)]
struct Cli {
    /// Print collected client metrics after the command finishes
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and persist the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and sign in with it
    Register(RegisterArgs),
    /// Forget the persisted session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List your shipments
    Shipments {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Show one shipment
    Shipment { id: Uuid },
    /// Book a shipment from a JSON draft
    CreateShipment {
        #[arg(long)]
        file: PathBuf,
    },
    /// Cancel and remove a shipment
    DeleteShipment { id: Uuid },
    /// List deliveries assigned to you
    Deliveries {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Move a delivery to a new status
    DeliveryStatus { id: Uuid, status: ShipmentStatus },
    /// Show the wallet balance
    Wallet,
    /// Forward a device push token to the backend
    PushRegister { token: String },
    /// Follow live updates for a shipment's delivery
    Track { shipment_id: Uuid, delivery_id: Uuid },
    /// Stream pushed notifications for the signed-in user
    Notifications,
}

#[derive(Args, Debug)]
struct RegisterArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    phone: String,
    #[arg(long, default_value = "customer")]
    role: Role,
}

pub(crate) async fn run(state: &AppState) -> Result<(), ClientError> {
    let cli = Cli::parse();
    let result = execute(state, cli.command).await;

    if cli.metrics {
        match state.metrics.encode() {
            Ok(body) => print!("{body}"),
            Err(err) => tracing::warn!(error = %err, "failed to encode metrics"),
        }
    }

    result
}

async fn execute(state: &AppState, command: Command) -> Result<(), ClientError> {
    match command {
        Command::Login { email, password } => {
            if let Err(err) = state.session.login(&email, &password).await {
                return Err(report(state.session.snapshot().error, err));
            }
            print_json(&state.session.snapshot().user)
        }
        Command::Register(args) => {
            let request = RegisterRequest {
                email: args.email,
                password2: args.password.clone(),
                password: args.password,
                first_name: args.first_name,
                last_name: args.last_name,
                phone_number: args.phone,
                role: args.role,
            };
            if let Err(err) = state.session.register(&request).await {
                return Err(report(state.session.snapshot().error, err));
            }
            print_json(&state.session.snapshot().user)
        }
        Command::Logout => {
            state.session.logout();
            println!("logged out");
            Ok(())
        }
        Command::Whoami => {
            require(state, None)?;
            state.session.refresh_user().await?;
            print_json(&state.session.snapshot().user)
        }
        Command::Shipments { page } => {
            require(state, None)?;
            state.shipments.fetch_shipments(page).await;
            let snapshot = state.shipments.snapshot();
            match snapshot.error {
                Some(message) => fetch_failed(message),
                None => print_json(&snapshot.shipments),
            }
        }
        Command::Shipment { id } => {
            require(state, None)?;
            state.shipments.fetch_shipment(id).await;
            let snapshot = state.shipments.snapshot();
            match snapshot.error {
                Some(message) => fetch_failed(message),
                None => print_json(&snapshot.current_shipment),
            }
        }
        Command::CreateShipment { file } => {
            require(state, Some(Role::Customer))?;
            let raw = std::fs::read(&file).map_err(|err| {
                ClientError::BadRequest(format!("cannot read {}: {err}", file.display()))
            })?;
            let draft: ShipmentDraft = serde_json::from_slice(&raw)
                .map_err(|err| ClientError::BadRequest(format!("invalid shipment draft: {err}")))?;

            match state.shipments.create_shipment(&draft).await {
                Ok(shipment) => print_json(&shipment),
                Err(err) => Err(report(state.shipments.snapshot().error, err)),
            }
        }
        Command::DeleteShipment { id } => {
            require(state, Some(Role::Customer))?;
            match state.shipments.delete_shipment(id).await {
                Ok(()) => {
                    println!("deleted {id}");
                    Ok(())
                }
                Err(err) => Err(report(state.shipments.snapshot().error, err)),
            }
        }
        Command::Deliveries { page } => {
            require(state, Some(Role::Courier))?;
            state.deliveries.fetch_deliveries(page).await;
            let snapshot = state.deliveries.snapshot();
            match snapshot.error {
                Some(message) => fetch_failed(message),
                None => print_json(&snapshot.deliveries),
            }
        }
        Command::DeliveryStatus { id, status } => {
            require(state, Some(Role::Courier))?;
            match state.deliveries.update_delivery_status(id, status).await {
                Ok(applied) => {
                    println!("{id} is now {applied}");
                    Ok(())
                }
                Err(err) => Err(report(state.deliveries.snapshot().error, err)),
            }
        }
        Command::Wallet => {
            require(state, None)?;
            state.wallet.fetch_balance().await;
            let snapshot = state.wallet.snapshot();
            match snapshot.error {
                Some(message) => fetch_failed(message),
                None => print_json(&snapshot.balance),
            }
        }
        Command::PushRegister { token } => {
            require(state, None)?;
            state.api.register_push_token(&token).await?;
            println!("push token registered");
            Ok(())
        }
        Command::Track {
            shipment_id,
            delivery_id,
        } => {
            require(state, None)?;
            state.deliveries.fetch_delivery(delivery_id).await;
            let printer = spawn_event_printer(state);
            let result = state.tracker.track_shipment(shipment_id, delivery_id).await;
            printer.abort();
            result
        }
        Command::Notifications => {
            require(state, None)?;
            let user_id = state
                .session
                .snapshot()
                .user
                .map(|user| user.id)
                .ok_or_else(|| ClientError::BadRequest("no user in session".to_string()))?;
            let printer = spawn_event_printer(state);
            let result = state.tracker.listen_notifications(user_id).await;
            printer.abort();
            result
        }
    }
}

fn require(state: &AppState, role: Option<Role>) -> Result<(), ClientError> {
    state.session.require(role).inspect_err(|err| {
        if matches!(err, ClientError::Unauthenticated) {
            eprintln!("run `deliveet login` first");
        }
    })
}

fn spawn_event_printer(state: &AppState) -> tokio::task::JoinHandle<()> {
    let mut events = Box::pin(state.events());
    tokio::spawn(async move {
        while let Some(event) = events.next().await {
            if let Ok(line) = serde_json::to_string(&event) {
                println!("{line}");
            }
        }
    })
}

fn report(message: Option<String>, err: ClientError) -> ClientError {
    if let Some(message) = message {
        eprintln!("error: {message}");
    }
    err
}

fn fetch_failed(message: String) -> Result<(), ClientError> {
    Err(ClientError::BadRequest(message))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), ClientError> {
    let body = serde_json::to_string_pretty(value)
        .map_err(|err| ClientError::Decode(format!("failed to render output: {err}")))?;
    println!("{body}");
    Ok(())
}
