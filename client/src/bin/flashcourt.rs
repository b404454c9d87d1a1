//! Command-line front end for the flash court reservation service.
//!
//! Results are printed to stdout as JSON. Failure notices and diagnostics go
//! to stderr through tracing; raise verbosity with `RUST_LOG`.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result, eyre};
use flashcourt::api::{ReservationQuery, SessionQuery, SlotQuery};
use flashcourt::config::ClientSettings;
use flashcourt::domain::models::{Credentials, EntityId, ReservationStatus, ReserveRequest};
use flashcourt::domain::ports::{ErrorNotifier, NoOpErrorNotifier, TokenStore};
use flashcourt::outbound::{FileTokenStore, ReqwestTransport, TracingErrorNotifier};
use flashcourt::workflow::{PollPolicy, ReservationOutcome, ReservationWorkflow};
use flashcourt::{ApiClient, ApiGateway, SessionGate};
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use serde::Serialize;
use serde_json::json;
use tokio::runtime::Builder;
use tracing_subscriber::EnvFilter;

/// `flashcourt` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "flashcourt",
    about = "Browse, reserve and pay for flash court slots",
    version
)]
struct CliArgs {
    /// Server root; overrides `FLASHCOURT_BASE_URL`.
    #[arg(long = "base-url", value_name = "url", global = true)]
    base_url: Option<String>,
    /// Token directory; overrides `FLASHCOURT_TOKEN_DIR`.
    #[arg(long = "token-dir", value_name = "dir", global = true)]
    token_dir: Option<String>,
    /// Suppress failure notices on stderr.
    #[arg(long, short = 'q', global = true)]
    quiet: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create an account and sign in.
    Register(CredentialArgs),
    /// Sign in and store the token.
    Login(CredentialArgs),
    /// Forget the stored token.
    Logout,
    /// Show the signed-in account.
    Whoami,
    /// List flash sessions.
    Sessions,
    /// List slots of a session.
    Slots {
        /// Session to list.
        #[arg(long = "session-id")]
        session_id: EntityId,
        /// Restrict to a court; repeatable.
        #[arg(long = "court")]
        court_ids: Vec<EntityId>,
        /// Earliest slot date.
        #[arg(long = "from")]
        date_lower_bound: Option<String>,
        /// Latest slot date.
        #[arg(long = "to")]
        date_upper_bound: Option<String>,
    },
    /// List reservations.
    Reservations {
        /// Restrict to a session.
        #[arg(long = "session-id")]
        session_id: Option<EntityId>,
        /// Restrict to a status; repeatable.
        #[arg(long = "status")]
        statuses: Vec<ReservationStatus>,
    },
    /// Submit a reservation and wait for the outcome.
    Reserve {
        /// Slot to reserve.
        #[arg(long = "slot-id")]
        slot_id: EntityId,
        /// Session of the slot.
        #[arg(long = "session-id")]
        session_id: EntityId,
        /// Wait before the first poll, in milliseconds.
        #[arg(long = "interval-ms", default_value_t = 500)]
        interval_ms: u64,
        /// Polls before giving up.
        #[arg(long = "max-polls", default_value_t = 30)]
        max_polls: u32,
        /// Overall budget in seconds.
        #[arg(long = "deadline-secs", default_value_t = 60)]
        deadline_secs: u64,
    },
    /// Poll a reservation trace once.
    ReserveResult {
        /// Trace returned by `reserve`.
        trace: String,
    },
    /// Cancel a reservation.
    Cancel {
        /// Reservation id.
        reservation_id: EntityId,
    },
    /// Create a WeChat payment order.
    Pay {
        /// Reservation id.
        reservation_id: EntityId,
    },
    /// Mark an order paid on servers using the mock provider.
    MockPay {
        /// Merchant order number.
        out_trade_no: String,
    },
    /// Refund a paid reservation.
    Refund {
        /// Reservation id.
        reservation_id: EntityId,
    },
    /// Show the payment state of a reservation.
    PayStatus {
        /// Reservation id.
        reservation_id: EntityId,
    },
}

#[derive(Debug, clap::Args)]
struct CredentialArgs {
    /// Student number.
    #[arg(long = "student-id")]
    student_id: String,
    /// Password.
    #[arg(long = "password")]
    password: String,
}

impl CredentialArgs {
    fn into_credentials(self) -> Credentials {
        Credentials::new(self.student_id, self.password.as_str())
    }
}

struct Client {
    api: ApiClient,
    gate: SessionGate,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();
    let args = CliArgs::parse();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build Tokio runtime")?;
    runtime.block_on(run(args))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // A subscriber may already be installed when embedded; keep that one.
    let _init_result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn load_settings(args: &CliArgs) -> Result<ClientSettings> {
    let mut settings = ClientSettings::load_from_iter([OsString::from("flashcourt")])
        .map_err(|error| eyre!("failed to load configuration: {error}"))?;
    if let Some(base_url) = &args.base_url {
        settings.base_url = Some(base_url.clone());
    }
    if let Some(token_dir) = &args.token_dir {
        settings.token_dir = Some(token_dir.clone());
    }
    Ok(settings)
}

fn connect(settings: &ClientSettings, quiet: bool) -> Result<Client> {
    let store: Arc<dyn TokenStore> = Arc::new(
        FileTokenStore::open(&settings.token_dir(), settings.token_key())
            .wrap_err("failed to open token store")?,
    );
    let transport = ReqwestTransport::new(settings.base_url()?, settings.timeout())
        .wrap_err("failed to build HTTP client")?;
    let notifier: Arc<dyn ErrorNotifier> = if quiet {
        Arc::new(NoOpErrorNotifier)
    } else {
        Arc::new(TracingErrorNotifier)
    };
    let gateway = ApiGateway::new(Arc::new(transport), store.clone(), notifier);
    Ok(Client {
        api: ApiClient::new(Arc::new(gateway)),
        gate: SessionGate::new(store),
    })
}

async fn run(args: CliArgs) -> Result<()> {
    let settings = load_settings(&args)?;
    let client = connect(&settings, args.quiet)?;
    let api = &client.api;

    match args.command {
        Command::Register(credentials) => {
            let token = api
                .auth()
                .register(&credentials.into_credentials())
                .await?;
            client.gate.save_token(token)?;
            print_session(&client.gate)
        }
        Command::Login(credentials) => {
            let token = api.auth().login(&credentials.into_credentials()).await?;
            client.gate.save_token(token)?;
            print_session(&client.gate)
        }
        Command::Logout => {
            client.gate.logout()?;
            print_session(&client.gate)
        }
        Command::Whoami => {
            if !client.gate.restore_token().is_authenticated() {
                return Err(eyre!("not signed in; run `flashcourt login` first"));
            }
            print_json(&api.user().me().await?)
        }
        Command::Sessions => print_json(&api.browse().sessions(&SessionQuery::default()).await?),
        Command::Slots {
            session_id,
            court_ids,
            date_lower_bound,
            date_upper_bound,
        } => {
            let query = SlotQuery {
                court_ids,
                date_lower_bound,
                date_upper_bound,
                ..SlotQuery::for_session(session_id)
            };
            print_json(&api.browse().slots(&query).await?)
        }
        Command::Reservations {
            session_id,
            statuses,
        } => {
            let query = ReservationQuery {
                session_id,
                statuses,
                ..ReservationQuery::default()
            };
            print_json(&api.browse().reservations(&query).await?)
        }
        Command::Reserve {
            slot_id,
            session_id,
            interval_ms,
            max_polls,
            deadline_secs,
        } => {
            let policy = PollPolicy {
                initial_interval: Duration::from_millis(interval_ms),
                max_polls,
                deadline: Some(Duration::from_secs(deadline_secs)),
                ..PollPolicy::default()
            };
            let workflow = ReservationWorkflow::new(api.clone(), Arc::new(DefaultClock), policy);
            let outcome = workflow
                .reserve(&ReserveRequest {
                    slot_id,
                    session_id,
                })
                .await?;
            print_json(&outcome_json(&outcome))
        }
        Command::ReserveResult { trace } => {
            print_json(&api.reserve().reserve_result(&trace).await?)
        }
        Command::Cancel { reservation_id } => {
            api.reserve().cancel_reservation(reservation_id).await?;
            print_json(&json!({"reservationId": reservation_id, "cancelled": true}))
        }
        Command::Pay { reservation_id } => {
            print_json(&api.pay().create_wechat_pay(reservation_id).await?)
        }
        Command::MockPay { out_trade_no } => {
            api.pay().mock_wechat_pay_success(&out_trade_no).await?;
            print_json(&json!({"outTradeNo": out_trade_no, "paid": true}))
        }
        Command::Refund { reservation_id } => {
            api.pay().refund(reservation_id).await?;
            print_json(&json!({"reservationId": reservation_id, "refunded": true}))
        }
        Command::PayStatus { reservation_id } => {
            print_json(&api.pay().pay_result(reservation_id).await?)
        }
    }
}

fn outcome_json(outcome: &ReservationOutcome) -> serde_json::Value {
    match outcome {
        ReservationOutcome::Granted(handle) => json!({
            "traceId": handle.trace(),
            "status": "SUCCESS",
            "reservationId": handle.reservation_id(),
            "reservationStatus": handle.status(),
        }),
        ReservationOutcome::Rejected { trace } => json!({
            "traceId": trace,
            "status": "FAILED",
        }),
    }
}

fn print_session(gate: &SessionGate) -> Result<()> {
    let snapshot = gate.restore_token();
    print_json(&json!({
        "authenticated": snapshot.is_authenticated(),
        "role": snapshot.role.as_str(),
    }))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value).wrap_err("failed to encode output")?;
    writeln!(stdout).wrap_err("failed to write output")?;
    Ok(())
}
