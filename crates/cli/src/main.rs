//! Command-line lookup of pair author identities.
//!
//! Reads the authors file (`~/.git-authors` by default) and prints the
//! resolved `Name <email>` for one or more sets of initials, lists every
//! configured author, or checks that every author resolves.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use console::Style;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use duet_core::{ConfigStore, Pair};

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// Resolve pair initials to git author identities.
#[derive(Parser, Debug)]
#[command(
    name = "git-duet-whois",
    version,
    about = "Resolve pair initials to git author identities"
)]
struct Cli {
    /// Path to the YAML authors file.
    #[arg(
        short,
        long,
        global = true,
        env = "GIT_DUET_AUTHORS_FILE",
        default_value = "~/.git-authors"
    )]
    authors_file: String,

    /// External command run as `<cmd> <initials> <name> <username>` to look
    /// up an email address.
    #[arg(long, global = true, env = "GIT_DUET_EMAIL_LOOKUP")]
    email_lookup: Option<String>,

    /// Log lookup decisions to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print `Name <email>` for each set of initials.
    Whois {
        /// Initials as configured in the authors file.
        #[arg(required = true)]
        initials: Vec<String>,

        /// Print the resolved records as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List every configured author.
    List,

    /// Check that the authors file parses and every author resolves.
    Validate,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let path = expand_tilde(&cli.authors_file);
    debug!(path = %path.display(), "using authors file");

    let store = ConfigStore::load(&path, cli.email_lookup.as_deref())
        .with_context(|| format!("failed to load authors file {}", path.display()))?;

    match cli.command {
        Commands::Whois { initials, json } => cmd_whois(&store, &initials, json),
        Commands::List => cmd_list(&store),
        Commands::Validate => cmd_validate(&store, &path),
    }
}

// ---------------------------------------------------------------------------
// Subcommand implementations
// ---------------------------------------------------------------------------

fn cmd_whois(store: &ConfigStore, initials: &[String], json: bool) -> Result<()> {
    let pairs = initials
        .iter()
        .map(|i| {
            store
                .resolve_by_initials(i)
                .with_context(|| format!("failed to resolve '{}'", i))
        })
        .collect::<Result<Vec<Pair>>>()?;

    if json {
        let out = serde_json::to_string_pretty(&pairs).context("failed to encode JSON")?;
        println!("{}", out);
        return Ok(());
    }

    for pair in &pairs {
        println!("{}", pair);
    }
    Ok(())
}

fn cmd_list(store: &ConfigStore) -> Result<()> {
    let pairs = store.resolve_all().context("failed to resolve authors")?;

    if pairs.is_empty() {
        println!("No authors configured.");
        return Ok(());
    }

    println!();
    println!("{}", heading(&format!("Authors ({})", pairs.len())));
    println!();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Initials", "Name", "Username", "Email"]);

    for pair in &pairs {
        let username = if pair.username.is_empty() { "—" } else { pair.username.as_str() };
        table.add_row(vec![
            Cell::new(&pair.initials),
            Cell::new(&pair.name),
            Cell::new(username),
            Cell::new(&pair.email),
        ]);
    }

    println!("{}", table);
    println!();
    Ok(())
}

fn cmd_validate(store: &ConfigStore, path: &std::path::Path) -> Result<()> {
    println!("Validating authors file: {}", path.display());
    println!();
    println!("  {}", status_line(true, "YAML structure is valid"));

    let email = store.email_config();
    println!(
        "  {}",
        note(&format!(
            "email domain: {}",
            if email.domain.is_empty() { "NOT SET" } else { email.domain.as_str() }
        ))
    );
    if store.has_email_lookup() {
        println!("  {}", note("external email lookup: enabled"));
    }

    let mut failures = 0usize;
    for initials in store.initials() {
        match store.resolve_by_initials(initials) {
            Ok(pair) => println!("  {}", status_line(true, &format!("{}: {}", initials, pair))),
            Err(e) => {
                failures += 1;
                println!("  {}", status_line(false, &format!("{}: {}", initials, e)));
            }
        }
    }

    println!();
    if failures > 0 {
        anyhow::bail!("{} author(s) failed to resolve", failures);
    }
    println!("Authors file is valid.");
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// One `validate` result: a green check for an author that resolved, a red
/// cross for one that did not.
fn status_line(resolved: bool, text: &str) -> String {
    let (mark, style) = if resolved {
        ("✓", Style::new().green())
    } else {
        ("✗", Style::new().red())
    };
    format!("{} {}", style.apply_to(mark), text)
}

fn heading(title: &str) -> String {
    Style::new().bold().apply_to(title).to_string()
}

/// Secondary detail about the loaded authors file.
fn note(text: &str) -> String {
    Style::new().dim().apply_to(text).to_string()
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
