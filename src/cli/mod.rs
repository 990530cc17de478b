use clap::{Parser, Subcommand};

pub mod config;
pub mod init;
pub mod proposal;
pub mod query;
pub mod render;
pub mod session;
pub mod version;

use session::{Paths, Session};

#[derive(Parser)]
#[command(name = "cosign")]
#[command(author = "Cosign Project")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "m-of-n threshold authorization for shared funds", long_about = None)]
pub struct Cli {
    /// Path to config file (default: adjacent to the state file)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Path to the state file (default: ~/.local/share/cosign/state.cbor)
    #[arg(long, global = true)]
    pub state: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set the group members and approval threshold
    Init {
        /// Member identifier (repeat for each member)
        #[arg(long = "member", required = true)]
        members: Vec<String>,

        /// Approvals required to execute a proposal
        #[arg(long)]
        threshold: u32,
    },

    /// Propose a transfer (counts as the proposer's approval)
    Propose {
        /// Identifier of the proposing member
        #[arg(long = "as")]
        caller: String,

        /// Recipient identifier
        #[arg(long)]
        to: String,

        /// Asset: NATIVE or a token contract identifier
        #[arg(long, default_value = "NATIVE")]
        asset: String,

        /// Decimal amount, e.g. 12.5
        #[arg(long)]
        amount: String,

        /// Free-text description
        #[arg(long, default_value = "")]
        description: String,
    },

    /// Approve a pending proposal
    Approve {
        /// Identifier of the approving member
        #[arg(long = "as")]
        caller: String,

        /// Proposal number
        id: u64,
    },

    /// Execute a proposal that has reached the threshold
    Execute {
        /// Identifier of the executing member
        #[arg(long = "as")]
        caller: String,

        /// Proposal number
        id: u64,

        /// Skip confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// List proposals, newest first
    List {
        /// all, pending, ready or executed
        #[arg(long, default_value = "all")]
        filter: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show one proposal
    Show {
        /// Proposal number
        id: u64,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show group membership and proposal counts
    Status {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print the operator configuration (writes the default file if missing)
    Config {
        /// Set the log level and save the config file
        #[arg(long)]
        log_level: Option<String>,
    },

    /// Display version information
    Version,
}

pub async fn execute(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Commands::Version = cli.command {
        version::execute();
        return Ok(());
    }

    let paths = Paths::resolve(cli.config.as_deref(), cli.state.as_deref());
    let config = session::load_config(&paths, cli.state.is_some())?;
    session::init_logging(&config.logging.level);

    if let Commands::Config { log_level } = &cli.command {
        let mut config = config;
        if let Some(level) = log_level {
            config.logging.level = level.trim().to_string();
            config.save(&paths.config)?;
        }
        println!("# {}", paths.config.display());
        print!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    let session = Session::open(&config.store.state_path).await?;

    match cli.command {
        Commands::Init { members, threshold } => init::execute(&session, members, threshold).await,
        Commands::Propose {
            caller,
            to,
            asset,
            amount,
            description,
        } => proposal::propose(&session, &caller, &to, &asset, &amount, &description).await,
        Commands::Approve { caller, id } => proposal::approve(&session, &caller, id).await,
        Commands::Execute { caller, id, yes } => {
            proposal::execute(&session, &caller, id, yes).await
        }
        Commands::List { filter, json } => query::list(&session, &filter, json),
        Commands::Show { id, json } => query::show(&session, id, json),
        Commands::Status { json } => query::status(&session, json),
        Commands::Config { .. } | Commands::Version => Ok(()),
    }
}
