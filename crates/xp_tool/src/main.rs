//! XP Tool - inspect the level curve and manage progression stores
//!
//! Usage:
//!   xp_tool table
//!   xp_tool info --xp 157
//!   xp_tool init --store progression.dat --user alice
//!   xp_tool award --store progression.dat --user alice --action module_complete
//!   xp_tool grant --store progression.dat --user alice --amount 250 --reason "beta tester"
//!   xp_tool status --store progression.dat --user alice
//!   xp_tool history --store progression.dat --user alice --limit 10

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use xp_tool::{
    award, default_store_path, describe_outcome, grant, init_user, open_engine, render_history,
    render_info, render_status, render_table, resolve_config,
};

#[derive(Parser)]
#[command(name = "xp_tool")]
#[command(about = "XP and level progression tool")]
struct Cli {
    /// Progression config (JSON); falls back to XP_CONFIG_PATH, then defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the level roadmap
    Table,

    /// Show level details for a cumulative XP amount
    Info {
        #[arg(long)]
        xp: u64,
    },

    /// Create a user profile at level 1 with zero XP
    Init {
        #[arg(long, default_value_os_t = default_store_path())]
        store: PathBuf,

        /// Generated when omitted
        #[arg(long)]
        user: Option<String>,
    },

    /// Award the fixed reward of an action
    Award {
        #[arg(long, default_value_os_t = default_store_path())]
        store: PathBuf,

        #[arg(long)]
        user: String,

        /// module_complete, daily_choice, quiz_success, streak_7, invite_friend
        #[arg(long)]
        action: String,
    },

    /// Grant an arbitrary XP amount
    Grant {
        #[arg(long, default_value_os_t = default_store_path())]
        store: PathBuf,

        #[arg(long)]
        user: String,

        #[arg(long, allow_negative_numbers = true)]
        amount: i64,

        #[arg(long, default_value = "manual grant")]
        reason: String,
    },

    /// Show a user's current level details
    Status {
        #[arg(long, default_value_os_t = default_store_path())]
        store: PathBuf,

        #[arg(long)]
        user: String,
    },

    /// Show a user's most recent XP events
    History {
        #[arg(long, default_value_os_t = default_store_path())]
        store: PathBuf,

        #[arg(long)]
        user: String,

        #[arg(long, default_value = "10")]
        limit: usize,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Table => {
            print!("{}", render_table(&config)?);
        }

        Commands::Info { xp } => {
            println!("{}", render_info(&config, xp)?);
        }

        Commands::Init { store, user } => {
            let (user_id, created) = init_user(&store, user)?;
            if created {
                println!("✅ Created profile {} in {}", user_id, store.display());
            } else {
                println!("Profile {} already exists in {}", user_id, store.display());
            }
        }

        Commands::Award { store, user, action } => {
            let engine = open_engine(&store, config)?;
            let outcome = award(&engine, &user, &action)?;
            println!("✅ {}: {}", user, describe_outcome(&outcome));
        }

        Commands::Grant { store, user, amount, reason } => {
            let engine = open_engine(&store, config)?;
            let outcome = grant(&engine, &user, amount, &reason)?;
            println!("✅ {}: {}", user, describe_outcome(&outcome));
        }

        Commands::Status { store, user } => {
            let engine = open_engine(&store, config)?;
            println!("{}", render_status(&engine, &user)?);
        }

        Commands::History { store, user, limit } => {
            let engine = open_engine(&store, config)?;
            print!("{}", render_history(&engine, &user, limit)?);
        }
    }

    Ok(())
}
