//! Canteen CLI

use std::{
    io::{self, Write},
    num::NonZeroU32,
    path::PathBuf,
};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::info;

use canteen::{
    fixtures::{menu::load_menu, policy::load_policy, script::ScriptFixture},
    menu::MenuItemId,
    observability::{self, LogFormat},
    receipt::{write_cart, write_menu, write_order, write_orders},
    script::replay,
    session::Session,
};

#[derive(Debug, Parser)]
#[command(name = "canteen", about = "Cafeteria ordering", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` overrides it
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Log format (compact, json)
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show the menu
    Menu(MenuArgs),

    /// Price a cart without placing an order
    Quote(QuoteArgs),

    /// Replay a session script
    Run(RunArgs),
}

#[derive(Debug, Args)]
struct SourceArgs {
    /// Menu YAML file; the bundled cafeteria menu when omitted
    #[arg(long)]
    menu: Option<PathBuf>,

    /// Pricing policy YAML file; the standard policy when omitted
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct MenuArgs {
    /// Menu YAML file; the bundled cafeteria menu when omitted
    #[arg(long)]
    menu: Option<PathBuf>,

    /// Include unavailable items
    #[arg(long)]
    all: bool,
}

#[derive(Debug, Args)]
struct QuoteArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Item to add, as `ID` or `IDxQTY` (e.g. `3x2`); repeatable
    #[arg(long = "item", required = true, value_parser = parse_item)]
    items: Vec<(MenuItemId, NonZeroU32)>,
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Session script YAML file
    script: PathBuf,

    #[command(flatten)]
    source: SourceArgs,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    observability::init(&cli.log_level, cli.log_format)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Menu(args) => show_menu(&mut out, &args),
        Commands::Quote(args) => quote(&mut out, &args),
        Commands::Run(args) => run_script(&mut out, &args),
    }
}

fn open_session(source: &SourceArgs) -> anyhow::Result<Session> {
    let catalog = load_menu(source.menu.as_deref()).context("failed to load menu")?;
    let policy = load_policy(source.config.as_deref()).context("failed to load pricing policy")?;

    Session::with_policy(catalog, policy).context("menu and pricing policy disagree")
}

fn show_menu(out: &mut impl Write, args: &MenuArgs) -> anyhow::Result<()> {
    let catalog = load_menu(args.menu.as_deref()).context("failed to load menu")?;

    if args.all {
        write_menu(out, catalog.iter())?;
    } else {
        write_menu(out, catalog.list_available())?;
    }

    Ok(())
}

fn quote(out: &mut impl Write, args: &QuoteArgs) -> anyhow::Result<()> {
    let mut session = open_session(&args.source)?;

    for &(item_id, quantity) in &args.items {
        session
            .add_to_cart(item_id, quantity)
            .with_context(|| format!("cannot add item {item_id}"))?;
    }

    let summary = session.summary()?;

    write_cart(out, session.cart().lines(), &summary)?;

    Ok(())
}

fn run_script(out: &mut impl Write, args: &RunArgs) -> anyhow::Result<()> {
    let mut session = open_session(&args.source)?;
    let script = ScriptFixture::from_path(&args.script)
        .with_context(|| format!("failed to load script {}", args.script.display()))?;

    let outcomes = replay(&mut session, &script.steps);
    let rejected = outcomes.iter().filter(|outcome| !outcome.is_ok()).count();

    for outcome in &outcomes {
        match &outcome.result {
            Ok(message) => writeln!(out, "{:>3}  ok  {message}", outcome.step)?,
            Err(error) => writeln!(out, "{:>3}  !!  {error}", outcome.step)?,
        }
    }

    info!(steps = outcomes.len(), rejected, "script finished");

    for order in session.orders().list() {
        write_order(&mut *out, order)?;
    }

    if !session.orders().is_empty() {
        write_orders(&mut *out, session.orders().list())?;
    }

    if !session.cart().is_empty() {
        writeln!(out, "\nLeft in cart:")?;
        write_cart(&mut *out, session.cart().lines(), &session.summary()?)?;
    }

    Ok(())
}

/// Parse `ID` or `IDxQTY`.
fn parse_item(value: &str) -> Result<(MenuItemId, NonZeroU32), String> {
    let (id, quantity) = value.split_once(['x', 'X']).unwrap_or((value, "1"));

    let id = id
        .trim()
        .parse::<u32>()
        .map_err(|err| format!("invalid item id '{id}': {err}"))?;

    let quantity = quantity
        .trim()
        .parse::<u32>()
        .map_err(|err| format!("invalid quantity '{quantity}': {err}"))?;

    let quantity = NonZeroU32::new(quantity).ok_or("Quantity must be at least 1")?;

    Ok((MenuItemId(id), quantity))
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_item_reads_id_and_quantity() -> TestResult {
        assert_eq!(parse_item("3")?, (MenuItemId(3), NonZeroU32::MIN));
        assert_eq!(
            parse_item("3x4")?.1,
            NonZeroU32::new(4).ok_or("four is non-zero")?
        );

        Ok(())
    }

    #[test]
    fn parse_item_rejects_zero_and_garbage() {
        assert_eq!(parse_item("3x0"), Err("Quantity must be at least 1".to_string()));
        assert!(parse_item("coffee").is_err());
        assert!(parse_item("3x-1").is_err());
    }
}
