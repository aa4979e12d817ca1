//! dbp - Debian build workspaces in Docker
//!
//! This is the main CLI entry point for dbp.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use dbp::container::{
    ensure_docker_cli, ContainerManager, Dispatcher, DockerRuntime, SystemDocker,
};
use dbp::package::{parse_gbp_options, PackageBuilder};
use dbp::workspace::{HostContext, Workspace, WorkspaceOptions, EXTRA_SOURCES_DEFAULT};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// dbp - Debian package builds in a persistent container
#[derive(Parser)]
#[command(name = "dbp")]
#[command(author = "Evoker Industries")]
#[command(version)]
#[command(about = "Build Debian packages inside a persistent Docker workspace", long_about = None)]
struct Cli {
    /// Use a custom container name
    #[arg(long, global = true)]
    cname: Option<String>,

    /// Build unstripped, unoptimized packages
    #[arg(long, global = true)]
    debug: bool,

    /// Debian distribution
    #[arg(short, long, env = "DIST", global = true)]
    dist: Option<String>,

    /// Extra apt sources ("DEFAULT" reads extra_sources.list files)
    #[arg(short, long, env = "EXTRA_SOURCES", default_value = EXTRA_SOURCES_DEFAULT, global = true)]
    extra_sources: String,

    /// Use a specific image
    #[arg(short, long, global = true)]
    image: Option<String>,

    /// Workspace path (defaults to the current directory or its parent)
    #[arg(short, long, global = true)]
    path: Option<String>,

    /// Downstream release
    #[arg(short, long, global = true)]
    release: Option<String>,

    /// Remove any existing workspace container first
    #[arg(long, global = true)]
    rm_first: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build packages in the workspace container
    Build {
        /// Workspace-relative package directories (defaults to the current one)
        packages: Vec<String>,
        /// Parallel build jobs
        #[arg(short, long)]
        jobs: Option<u32>,
        /// Additional git-buildpackage options
        #[arg(short, long, default_value = "", allow_hyphen_values = true)]
        gbp: String,
    },

    /// Pull the workspace image
    Pull,

    /// Start a persistent workspace container
    Run {
        /// Pull the image even if it is present
        #[arg(long)]
        pull: bool,
    },

    /// Remove the workspace container
    Rm,

    /// Open a shell in the workspace container
    Shell {
        /// Run a single command instead of an interactive shell
        #[arg(short, long)]
        command: Option<String>,
    },

    /// Print the resolved workspace
    Config,
}

impl Cli {
    fn workspace_options(&self) -> WorkspaceOptions {
        let jobs = match &self.command {
            Commands::Build { jobs, .. } => *jobs,
            _ => None,
        };
        WorkspaceOptions {
            debug: self.debug,
            path: self.path.clone().unwrap_or_default(),
            container_name: self.cname.clone().unwrap_or_default(),
            image: self.image.clone().unwrap_or_default(),
            distribution: self.dist.clone().unwrap_or_default(),
            release: self.release.clone().unwrap_or_default(),
            extra_sources: self.extra_sources.clone(),
            jobs,
        }
    }
}

fn log_filter(verbose: u8) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        })
    })
}

fn require_docker_cli() -> anyhow::Result<()> {
    let docker = ensure_docker_cli()?;
    debug!("Using docker client at {}", docker.display());
    Ok(())
}

/// Connect to the Docker daemon, removing the workspace container first
/// when `--rm-first` was given
async fn connect(
    workspace: &Workspace,
    rm_first: bool,
) -> anyhow::Result<ContainerManager<'_, DockerRuntime>> {
    let manager = ContainerManager::new(workspace, DockerRuntime::connect()?);
    if rm_first {
        manager.remove().await?;
    }
    Ok(manager)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose))
        .with_writer(std::io::stderr)
        .init();

    let host = HostContext::detect().context("Failed to inspect host environment")?;
    let workspace = Workspace::resolve(&cli.workspace_options(), &host)
        .context("Failed to create workspace")?;

    match cli.command {
        Commands::Config => {
            println!("{}", workspace.to_json()?);
        }

        Commands::Build { packages, gbp, .. } => {
            let gbp_options = parse_gbp_options(&gbp)?;
            require_docker_cli()?;
            let manager = connect(&workspace, cli.rm_first).await?;
            let dispatcher = Dispatcher::new(&workspace, SystemDocker);
            manager
                .with_container(false, || {
                    PackageBuilder::new(&dispatcher, host.cwd.clone())
                        .gbp_options(gbp_options)
                        .build_all(&packages)
                })
                .await?;
        }

        Commands::Pull => {
            let manager = connect(&workspace, cli.rm_first).await?;
            manager.pull_image().await?;
        }

        Commands::Run { pull } => {
            let manager = connect(&workspace, cli.rm_first).await?;
            manager.ensure_running(pull).await?;
        }

        Commands::Rm => {
            let manager = connect(&workspace, false).await?;
            manager.remove().await?;
        }

        Commands::Shell { command } => {
            let mut args = vec!["bash".to_string(), "-l".to_string()];
            if let Some(command) = command {
                args.push("-c".to_string());
                args.push(command);
            }

            require_docker_cli()?;
            let manager = connect(&workspace, cli.rm_first).await?;
            let dispatcher = Dispatcher::new(&workspace, SystemDocker);
            let success = manager
                .with_container(false, || Ok(dispatcher.exec(&args, "")))
                .await?;
            if !success {
                bail!("command exited with non-zero return code");
            }
        }
    }

    Ok(())
}
