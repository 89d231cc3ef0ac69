use crate::config::ProviderConfig;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "terraform-provider-scp")]
#[command(version)]
#[command(about = "Manage Splunk Cloud Platform stacks through the Admin Config Service", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(flatten)]
    pub provider: ProviderArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print resource schemas as JSON
    Schema {
        /// Only this resource type (e.g. scp_indexes)
        type_name: Option<String>,
    },

    /// Create a resource from a configuration file
    Create(CreateArgs),

    /// Refresh a resource from its recorded state
    Read(StateArgs),

    /// Update a resource to match a configuration file
    Update(UpdateArgs),

    /// Delete the resource recorded in a state file
    Delete(StateArgs),

    /// Read an existing remote object into state
    Import {
        /// Resource type (e.g. scp_roles)
        type_name: String,

        /// Remote id: the object name, or the feature for allowlists
        id: String,

        /// Write the resulting state to this file
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Apply a plan of changes in parallel
    Apply(ApplyArgs),
}

// ============================================================================
// Provider Arguments
// ============================================================================

/// Connection settings. Unset flags fall back to the provider config file,
/// then to the environment.
#[derive(Args, Debug, Default, Clone)]
pub struct ProviderArgs {
    /// JSON file with server, stack and credentials
    #[arg(long, global = true, env = "SCP_PROVIDER_CONFIG")]
    pub provider_config: Option<PathBuf>,

    /// ACS server URL (env: ACS_SERVER)
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Stack name (env: SPLUNK_STACK)
    #[arg(long, global = true)]
    pub stack: Option<String>,

    /// Bearer token (env: STACK_TOKEN)
    #[arg(long, global = true)]
    pub auth_token: Option<String>,

    /// Username used to mint a token (env: STACK_USERNAME)
    #[arg(long, global = true)]
    pub username: Option<String>,

    /// Password used to mint a token (env: STACK_PASSWORD)
    #[arg(long, global = true)]
    pub password: Option<String>,

    /// Deadline for each create, read, update or delete
    #[arg(long, global = true, default_value_t = 20)]
    pub timeout_minutes: u64,
}

impl ProviderArgs {
    pub fn flags(&self) -> ProviderConfig {
        ProviderConfig {
            server: self.server.clone(),
            stack: self.stack.clone(),
            auth_token: self.auth_token.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

// ============================================================================
// Lifecycle Arguments
// ============================================================================

#[derive(Args)]
pub struct CreateArgs {
    /// Resource type (e.g. scp_indexes)
    pub type_name: String,

    /// JSON object with the desired attributes
    #[arg(short, long)]
    pub config: PathBuf,

    /// Write the resulting state to this file
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

#[derive(Args)]
pub struct StateArgs {
    /// Resource type (e.g. scp_indexes)
    pub type_name: String,

    /// JSON state file with `id` and `attributes`
    #[arg(short, long)]
    pub state: PathBuf,

    /// Write the resulting state to this file
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

#[derive(Args)]
pub struct UpdateArgs {
    /// Resource type (e.g. scp_indexes)
    pub type_name: String,

    /// JSON state file with `id` and `attributes`
    #[arg(short, long)]
    pub state: PathBuf,

    /// JSON object with the desired attributes
    #[arg(short, long)]
    pub config: PathBuf,

    /// Write the resulting state to this file
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

// ============================================================================
// Apply Arguments
// ============================================================================

#[derive(Args)]
pub struct ApplyArgs {
    /// JSON plan file: {"changes": [...]}
    pub plan: PathBuf,

    /// Only apply changes matching: type or type.name
    #[arg(short, long)]
    pub target: Option<String>,

    /// Show what would happen without making changes
    #[arg(long)]
    pub dry_run: bool,

    /// Number of parallel jobs
    #[arg(short, long, default_value = "4")]
    pub jobs: u8,
}
