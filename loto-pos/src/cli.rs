//! `flor-pos` 命令行
//!
//! Each command loads the stored session, runs one flow against the backend
//! and prints the resulting view.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use loto_client::{HttpClient, PosApi, Session, SessionStore};
use shared::models::Role;
use shared::money::format_amount;

use loto_pos::clock::ClockTicker;
use loto_pos::config::{Config, parse_timezone};
use loto_pos::reports::{SalesReport, WeekSelection, pdf, ticket, today_in};
use loto_pos::tables::{
    CheckoutKind, PendingInvoiceStore, ProductCatalog, TableDetail, TableDirectory,
};
use loto_pos::{Checkout, InvoiceLedger, PosError, PosResult, ReportMode, UserAdmin};

/// Flor de Loto POS - restaurant front end
#[derive(Parser, Debug)]
#[command(name = "flor-pos")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Backend API base URL
    #[arg(long, env = "FLOR_API_URL")]
    pub api_url: Option<String>,

    /// Directory for the session file and exported PDFs
    #[arg(long, env = "FLOR_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Business timezone (IANA name)
    #[arg(long, env = "FLOR_TIMEZONE")]
    pub timezone: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and store the session
    Login {
        email: String,
        #[arg(long, env = "FLOR_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// List tables with occupancy counters
    #[command(alias = "ls")]
    Tables,

    /// Open a temporary table for walk-ins
    OpenTemp,

    /// Work on one table
    Table {
        /// Table number
        number: u32,
        #[command(subcommand)]
        action: Option<TableAction>,
    },

    /// List products, optionally of one category
    Products { category: Option<String> },

    /// Sales report (admin)
    Report {
        /// diario | semanal | mensual
        #[arg(default_value = "diario")]
        mode: ReportMode,
        /// First day of a weekly report (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Last day of a weekly report (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,
        /// Also export the report as PDF
        #[arg(long)]
        pdf: bool,
    },

    /// Invoices issued on one day (admin)
    Invoices {
        /// Defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Export the 80 mm ticket of an invoice (admin)
    Ticket {
        /// Invoice number
        number: u64,
        /// Day the invoice was issued, defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// User administration (admin)
    #[command(subcommand)]
    Users(UserAction),

    /// Header view: clock and table counters
    Dashboard {
        /// Keep printing the clock every minute until Ctrl+C
        #[arg(long)]
        watch: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum TableAction {
    /// Lines and total
    Show,
    /// Add one unit of a product (id or name)
    Add { product: String },
    /// One more unit on a line
    Inc { line: String },
    /// One unit less; at zero the line is removed
    Dec { line: String },
    /// Remove a line
    Remove { line: String },
    /// Set (or clear, with no text) a line comment
    Comment { line: String, text: Option<String> },
    /// Generate the invoice and mark the table paid
    Pay,
}

#[derive(Subcommand, Debug)]
pub enum UserAction {
    /// List users
    #[command(alias = "ls")]
    List,
    /// Create a user
    Create {
        name: String,
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "camarero")]
        role: Role,
    },
    /// Update a user; the password is only changed when given
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        role: Option<Role>,
    },
    /// Deactivate a user
    Delete { id: String },
}

impl Cli {
    /// Command line flags override the environment
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(url) = &self.api_url {
            config.api_url = url.clone();
        }
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(tz) = self.timezone.as_deref().and_then(parse_timezone) {
            config.timezone = tz;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        config
    }
}

struct App {
    config: Config,
    store: SessionStore,
}

impl App {
    fn require_session(&self) -> Result<Session> {
        let session = self
            .store
            .load()
            .context("Failed to read the stored session")?
            .ok_or(PosError::NotLoggedIn)?;
        Ok(session)
    }

    fn api(&self, session: &Session) -> Result<Arc<dyn PosApi>> {
        let client = HttpClient::new(&self.config.client_config())
            .context("Failed to build the HTTP client")?
            .with_session(session);
        Ok(Arc::new(client))
    }

    fn admin_api(&self) -> Result<Arc<dyn PosApi>> {
        let session = self.require_session()?;
        if !session.is_admin() {
            return Err(PosError::AdminRequired.into());
        }
        self.api(&session)
    }

    fn staff_api(&self) -> Result<Arc<dyn PosApi>> {
        let session = self.require_session()?;
        self.api(&session)
    }

    fn today(&self) -> NaiveDate {
        today_in(self.config.timezone)
    }
}

pub async fn run(cli: Cli, config: Config) -> Result<()> {
    let app = App {
        store: SessionStore::new(&config.data_dir),
        config,
    };

    let result = dispatch(&app, cli.command).await;
    if let Err(e) = &result
        && e.downcast_ref::<PosError>().is_some_and(PosError::requires_login)
    {
        tracing::warn!("Session rejected by the backend, clearing it");
        app.store.clear().context("Failed to clear the session")?;
        anyhow::bail!("Session expired, run `flor-pos login` again");
    }
    result
}

async fn dispatch(app: &App, command: Commands) -> Result<()> {
    match command {
        Commands::Login { email, password } => login(app, &email, &password).await,
        Commands::Logout => {
            app.store.clear().context("Failed to clear the session")?;
            println!("Logged out");
            Ok(())
        }
        Commands::Whoami => {
            let session = app.require_session()?;
            println!(
                "{} <{}> ({})",
                session.user.name,
                session.user.email,
                session.user.role.label()
            );
            Ok(())
        }
        Commands::Tables => {
            let mut directory = TableDirectory::new(app.staff_api()?);
            abort_on_auth(directory.refresh().await)?;
            print_directory(&directory);
            Ok(())
        }
        Commands::OpenTemp => {
            let mut directory = TableDirectory::new(app.staff_api()?);
            // the new number comes from the listing, it must be current
            directory.refresh().await?;
            let table = directory.open_temporary().await?;
            println!("Opened temporary table {}", table.number);
            Ok(())
        }
        Commands::Table { number, action } => {
            table_command(app, number, action.unwrap_or(TableAction::Show)).await
        }
        Commands::Products { category } => {
            let catalog = ProductCatalog::load(app.staff_api()?.as_ref()).await;
            if let Some(err) = catalog.last_error() {
                println!("{err}");
            }
            println!("Categories: {}", catalog.categories().join(", "));
            let category = category.unwrap_or_else(|| loto_pos::tables::ALL_CATEGORIES.into());
            for product in catalog.filter(&category) {
                println!(
                    "{:>6}  {:<30} ${:>12}  {}",
                    product.id,
                    product.name,
                    format_amount(product.price),
                    product.category.as_deref().unwrap_or("-")
                );
            }
            Ok(())
        }
        Commands::Report {
            mode,
            start,
            end,
            pdf,
        } => report_command(app, mode, WeekSelection { start, end }, pdf).await,
        Commands::Invoices { date } => {
            let api = app.admin_api()?;
            let date = date.unwrap_or_else(|| app.today());
            let ledger = InvoiceLedger::load(api.as_ref(), date, app.config.timezone).await;
            if let Some(err) = &ledger.error {
                println!("{err}");
            }
            for invoice in &ledger.invoices {
                let issued = invoice.created_at.with_timezone(&app.config.timezone);
                println!(
                    "#{:<6} {}  mesa {:<4} ${:>12}",
                    invoice.number,
                    issued.format("%H:%M"),
                    invoice
                        .table_number()
                        .map(|n| n.to_string())
                        .unwrap_or_else(|| "-".into()),
                    format_amount(invoice.total)
                );
            }
            println!(
                "{}: {} invoices, ${}",
                date.format("%d/%m/%Y"),
                ledger.count(),
                format_amount(ledger.income())
            );
            Ok(())
        }
        Commands::Ticket { number, date } => {
            let api = app.admin_api()?;
            let date = date.unwrap_or_else(|| app.today());
            let ledger = InvoiceLedger::load(api.as_ref(), date, app.config.timezone).await;
            let invoice = ledger.find_by_number(number).ok_or_else(|| {
                PosError::InvalidInput(format!("no invoice #{number} on {date}"))
            })?;
            let path = ticket::export_ticket(
                api.as_ref(),
                invoice,
                app.config.timezone,
                &app.config.export_dir(),
            )
            .await?;
            println!("Ticket written to {}", path.display());
            Ok(())
        }
        Commands::Users(action) => users_command(app, action).await,
        Commands::Dashboard { watch } => dashboard(app, watch).await,
    }
}

async fn login(app: &App, email: &str, password: &str) -> Result<()> {
    let client = HttpClient::new(&app.config.client_config())
        .context("Failed to build the HTTP client")?;
    let login = client.login(email, password).await.map_err(PosError::from)?;
    let session = Session::from_login(login);
    app.store.save(&session).context("Failed to store the session")?;
    println!("Welcome, {} ({})", session.user.name, session.user.role.label());
    Ok(())
}

fn print_directory(directory: &TableDirectory) {
    if let Some(err) = directory.last_error() {
        println!("{err}");
    }
    for table in directory.tables() {
        println!(
            "Mesa {:<4} {:<8}{}",
            table.number,
            table.state,
            if table.temporary { " (temporal)" } else { "" }
        );
    }
    println!(
        "Ocupadas: {}  Libres: {}",
        directory.occupied_count(),
        directory.free_count()
    );
}

fn print_detail(detail: &TableDetail) {
    let table = detail.table();
    println!("Mesa {} - {}", table.number, table.state);
    if let Some(err) = detail.last_error() {
        println!("{err}");
    }
    for (index, line) in detail.lines().iter().enumerate() {
        println!(
            "{:>3}. {:<30} {:>3} x ${:>10} = ${:>12}",
            index + 1,
            line.product.name,
            line.quantity,
            format_amount(line.product.price),
            format_amount(line.subtotal)
        );
        let comment = detail.comment_draft(&line.id);
        if !comment.is_empty() {
            println!("     \"{comment}\"");
        }
    }
    println!("Total: ${}", format_amount(detail.total()));
}

/// Line reference: 1-based position as printed by `show`, or the line id
fn resolve_line(detail: &TableDetail, reference: &str) -> Result<String> {
    if let Ok(position) = reference.parse::<usize>()
        && let Some(line) = position.checked_sub(1).and_then(|i| detail.lines().get(i))
    {
        return Ok(line.id.clone());
    }
    detail
        .line(reference)
        .map(|line| line.id.clone())
        .ok_or_else(|| PosError::LineNotFound(reference.to_string()).into())
}

/// A listing that failed still prints, empty and with its message; only a
/// rejected session aborts the command
fn abort_on_auth(result: PosResult<()>) -> Result<()> {
    match result {
        Err(e) if e.requires_login() => Err(e.into()),
        _ => Ok(()),
    }
}

async fn table_command(app: &App, number: u32, action: TableAction) -> Result<()> {
    let api = app.staff_api()?;
    let mut directory = TableDirectory::new(api.clone());
    let table = directory.locate(number).await?;
    let checkout = Checkout::new(app.config.pay_retry_attempts)
        .with_store(PendingInvoiceStore::new(&app.config.data_dir));
    let mut detail = TableDetail::open(api.clone(), table, checkout).await;

    match action {
        TableAction::Show => {}
        TableAction::Add { product } => {
            let catalog = ProductCatalog::load(api.as_ref()).await;
            let product = catalog
                .find(&product)
                .cloned()
                .ok_or_else(|| PosError::InvalidInput(format!("unknown product {product}")))?;
            detail.add_item(&product).await?;
        }
        TableAction::Inc { line } => {
            let id = resolve_line(&detail, &line)?;
            detail.increment(&id).await?;
        }
        TableAction::Dec { line } => {
            let id = resolve_line(&detail, &line)?;
            detail.decrement(&id).await?;
        }
        TableAction::Remove { line } => {
            let id = resolve_line(&detail, &line)?;
            detail.remove_item(&id).await?;
        }
        TableAction::Comment { line, text } => {
            let id = resolve_line(&detail, &line)?;
            match text {
                Some(text) => detail.update_comment(&id, text).await?,
                None => detail.clear_comment(&id).await?,
            }
            if let Some(status) = detail.comment_status(&id) {
                println!("Comment: {}", status.label());
            }
        }
        TableAction::Pay => {
            let outcome = detail.pay().await?;
            match outcome.invoice {
                Some(invoice) => println!(
                    "Invoice #{} issued, total ${}",
                    invoice.number,
                    format_amount(invoice.total)
                ),
                None => println!("Invoice issued"),
            }
            match outcome.kind {
                CheckoutKind::PaidTemporary => {
                    directory.remove_paid(&outcome.table_id).await;
                    println!("Temporary table {number} closed");
                }
                CheckoutKind::Freed => println!("Table {number} is free again"),
            }
        }
    }

    if let Some(updated) = detail.take_update() {
        directory.apply_update(updated);
    }
    if !detail.is_closed() {
        print_detail(&detail);
    }
    Ok(())
}

async fn report_command(app: &App, mode: ReportMode, week: WeekSelection, export: bool) -> Result<()> {
    let api = app.admin_api()?;
    let report = SalesReport::load(api.as_ref(), mode, week, app.today(), app.config.timezone).await;

    println!("Reporte de Ventas ({})", mode.label());
    for line in report.period_lines() {
        println!("{line}");
    }
    if let Some(err) = &report.error {
        println!("{err}");
    }
    if report.range.is_none() {
        println!("Select both --start and --end (start on or before end)");
        return Ok(());
    }
    for row in report.rows() {
        println!(
            "{:<8} {}  {}  mesa {:<4} ${:>12}",
            row.number, row.date, row.time, row.table, row.total
        );
    }
    let summary = &report.summary;
    println!(
        "Total ventas: ${}  Facturas: {}  Ticket promedio: ${}",
        format_amount(summary.total),
        summary.count,
        format_amount(summary.average)
    );

    if export {
        let path = pdf::export_report(&report, &app.config.export_dir())
            .context("Failed to export the report")?;
        println!("Report written to {}", path.display());
    }
    Ok(())
}

async fn users_command(app: &App, action: UserAction) -> Result<()> {
    let mut admin = UserAdmin::new(app.admin_api()?);
    admin.load().await;

    match action {
        UserAction::List => {}
        UserAction::Create {
            name,
            email,
            password,
            role,
        } => {
            admin.start_create();
            let form = admin.form_mut();
            form.name = name;
            form.email = email;
            form.password = password;
            form.role = role;
            admin.create().await?;
            println!("User created");
        }
        UserAction::Update {
            id,
            name,
            email,
            password,
            role,
        } => {
            admin.select(&id)?;
            let form = admin.form_mut();
            if let Some(name) = name {
                form.name = name;
            }
            if let Some(email) = email {
                form.email = email;
            }
            if let Some(password) = password {
                form.password = password;
            }
            if let Some(role) = role {
                form.role = role;
            }
            admin.update().await?;
            println!("User updated");
        }
        UserAction::Delete { id } => {
            admin.select(&id)?;
            admin.delete().await?;
            println!("User deactivated");
        }
    }

    if let Some(err) = admin.last_error() {
        println!("{err}");
    }
    for user in admin.users() {
        println!(
            "{:>6}  {:<24} {:<30} {:<14} {}",
            user.id,
            user.name,
            user.email,
            user.role.label(),
            if user.active { "activo" } else { "inactivo" }
        );
    }
    Ok(())
}

async fn dashboard(app: &App, watch: bool) -> Result<()> {
    let session = app.require_session()?;
    let mut directory = TableDirectory::new(app.api(&session)?);
    abort_on_auth(directory.refresh().await)?;

    let clock = ClockTicker::start(app.config.timezone);
    println!("{}  |  {}", clock.current(), session.user.name);
    print_directory(&directory);

    if !watch {
        return Ok(());
    }

    let mut display = clock.subscribe();
    loop {
        tokio::select! {
            changed = display.changed() => {
                if changed.is_err() {
                    break;
                }
                let now = display.borrow_and_update().clone();
                println!("{now}");
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}
