//! Command line definitions

use crate::output::OutputFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tca_client::waiter::DEFAULT_MAX_ATTEMPTS;

/// tcactl - drive VMware Telco Cloud Automation from the command line
#[derive(Parser, Debug)]
#[command(name = "tcactl")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub output: OutputFormat,

    /// Write raw response bodies to stderr
    #[arg(long, global = true)]
    pub trace: bool,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Endpoint and credentials; each falls back to its TCA_* environment variable
#[derive(Args, Debug, Default, Clone)]
pub struct ConnectionArgs {
    /// TCA base URL (TCA_URL)
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// User name (TCA_USERNAME)
    #[arg(long, global = true)]
    pub username: Option<String>,

    /// Password (TCA_PASSWORD)
    #[arg(long, global = true)]
    pub password: Option<String>,

    /// Accept self-signed certificates (TCA_INSECURE)
    #[arg(long, global = true)]
    pub insecure: bool,
}

/// Block until the submitted work finishes
#[derive(Args, Debug, Clone)]
pub struct WaitArgs {
    /// Wait for the operation to complete
    #[arg(long)]
    pub wait: bool,

    /// Polls before giving up, ten seconds apart
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Cloud providers registered as VIMs
    #[command(subcommand)]
    Vim(VimCommand),
    /// Kubernetes management and workload clusters
    #[command(subcommand)]
    Cluster(ClusterCommand),
    /// Node pools of a cluster
    #[command(subcommand)]
    Pool(PoolCommand),
    /// Cluster templates
    #[command(subcommand)]
    Template(TemplateCommand),
    /// CNF catalog
    #[command(subcommand)]
    Catalog(CatalogCommand),
    /// Partner-system extensions
    #[command(subcommand)]
    Extension(ExtensionCommand),
    /// Helm repositories
    #[command(subcommand)]
    Repo(RepoCommand),
    /// CNF instances
    #[command(subcommand)]
    Instance(InstanceCommand),
    /// Spec documents
    #[command(subcommand)]
    Spec(SpecCommand),
}

#[derive(Subcommand, Debug)]
pub enum VimCommand {
    List,
    Get { name: String },
    /// Register a cloud provider from a spec file
    Register { file: PathBuf },
    Delete { name: String },
}

#[derive(Subcommand, Debug)]
pub enum ClusterCommand {
    List,
    Get {
        name: String,
    },
    /// Create a cluster from a spec file
    Create {
        file: PathBuf,
        #[command(flatten)]
        wait: WaitArgs,
    },
    Delete {
        name: String,
        #[command(flatten)]
        wait: WaitArgs,
    },
    /// Print the cluster's kubeconfig
    Kubeconfig {
        name: String,
    },
    /// Change the cluster password
    Password {
        name: String,
        #[arg(long)]
        existing: String,
        #[arg(long)]
        new: String,
    },
    /// List the cluster's tasks
    Tasks {
        name: String,
    },
    /// Retry a failed task
    Retry {
        task: String,
        #[command(flatten)]
        wait: WaitArgs,
    },
    /// Abort a running task
    Abort {
        task: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum PoolCommand {
    List {
        cluster: String,
    },
    Get {
        cluster: String,
        name: String,
    },
    /// Add a node pool from a spec file
    Create {
        cluster: String,
        file: PathBuf,
        /// Validate only; nothing is submitted
        #[arg(long)]
        dry_run: bool,
        #[command(flatten)]
        wait: WaitArgs,
    },
    Update {
        cluster: String,
        name: String,
        file: PathBuf,
        #[command(flatten)]
        wait: WaitArgs,
    },
    Delete {
        cluster: String,
        name: String,
        #[command(flatten)]
        wait: WaitArgs,
    },
}

#[derive(Subcommand, Debug)]
pub enum TemplateCommand {
    List,
    Get { name: String },
    Create { file: PathBuf },
    Update { name: String, file: PathBuf },
    Delete { name: String },
}

#[derive(Subcommand, Debug)]
pub enum CatalogCommand {
    List,
    Get { name: String },
    /// VDUs of a catalog entry
    Vdus { name: String },
}

#[derive(Subcommand, Debug)]
pub enum ExtensionCommand {
    List,
    Get { name: String },
    Register { file: PathBuf },
    Delete { name: String },
}

#[derive(Subcommand, Debug)]
pub enum RepoCommand {
    /// Repositories linked to a VIM
    List {
        #[arg(long)]
        vim: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum InstanceCommand {
    List {
        /// Use the extended listing
        #[arg(long)]
        extended: bool,
    },
    Get {
        name: String,
    },
    /// Create an instance from a spec file and instantiate it
    Create {
        file: PathBuf,
        /// Only create the instance record
        #[arg(long)]
        no_instantiate: bool,
        #[command(flatten)]
        wait: WaitArgs,
    },
    /// Instantiate an existing instance using a spec file's placement
    Instantiate {
        name: String,
        file: PathBuf,
        #[command(flatten)]
        wait: WaitArgs,
    },
    Terminate {
        name: String,
        /// Forceful instead of graceful termination
        #[arg(long)]
        force: bool,
        /// Graceful termination timeout in seconds
        #[arg(long)]
        timeout: Option<u32>,
        #[command(flatten)]
        wait: WaitArgs,
    },
    Rollback {
        name: String,
        #[command(flatten)]
        wait: WaitArgs,
    },
    /// Force the instance back to NOT_INSTANTIATED
    Reset {
        name: String,
    },
    /// Reconfigure with parameters read from a JSON or YAML file
    Reconfigure {
        name: String,
        file: PathBuf,
    },
    Retry {
        name: String,
    },
    Delete {
        name: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum SpecCommand {
    /// Check a spec document, against the live inventory unless --offline
    Validate {
        file: PathBuf,
        /// Target cluster, for node pool specs
        #[arg(long)]
        cluster: Option<String>,
        /// Structural checks only; no server is contacted
        #[arg(long)]
        offline: bool,
    },
}
