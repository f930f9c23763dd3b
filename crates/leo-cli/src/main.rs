mod commands;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "leo", about = "Resolve, patch, and prepare Istio proxy builds")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve refs to commits
    Resolve {
        #[command(subcommand)]
        action: ResolveAction,
    },
    /// Inspect and prepare istio-proxy builds
    Proxy {
        #[command(subcommand)]
        action: ProxyAction,
    },
    /// Select and apply patches
    Patch {
        #[command(subcommand)]
        action: PatchAction,
    },
    /// Search Istio releases
    Release {
        #[command(subcommand)]
        action: ReleaseAction,
    },
    /// Inspect Istio sources
    Istio {
        #[command(subcommand)]
        action: IstioAction,
    },
}

#[derive(Subcommand)]
enum ResolveAction {
    /// Print the commit SHA of OWNER/REPO@REF (branch, tag, version, or SHA)
    Commit {
        /// Repository and ref, e.g. istio/istio@1.20.3
        target: String,
    },
    /// Print the Istio commit pinning the same Envoy minor as OWNER/REPO@REF
    Workspace {
        /// Envoy repository and ref, e.g. envoyproxy/envoy@release/v1.28
        envoy: String,
    },
}

#[derive(Subcommand)]
enum ProxyAction {
    /// Print the resolved Istio → istio-proxy → Envoy chain
    Info {
        #[command(flatten)]
        build: BuildArgs,
    },
    /// Print the path of a build artifact
    Output {
        #[command(flatten)]
        build: BuildArgs,
        /// Artifact: istio-proxy, envoy, or envoy-contrib
        #[arg(long, default_value = "istio-proxy")]
        target: String,
        /// Architecture in the file name (default: host)
        #[arg(long)]
        arch: Option<String>,
    },
    /// Download, patch, and stamp an istio-proxy source tree
    Prepare {
        #[command(flatten)]
        build: BuildArgs,
        /// Patch source, file://DIR or github://OWNER/REPO[@REF]
        #[arg(long)]
        patch_source: Option<String>,
    },
}

#[derive(Args)]
struct BuildArgs {
    /// Istio ref, e.g. istio@1.20.3 or istio/istio@master
    istio: String,
    /// Use this istio-proxy instead of the one pinned by Istio (OWNER/REPO@REF)
    #[arg(long)]
    proxy: Option<String>,
    /// Use this Envoy instead of the one pinned by istio-proxy (OWNER/REPO@REF)
    #[arg(long)]
    envoy: Option<String>,
    /// FIPS build
    #[arg(long)]
    fips: bool,
}

#[derive(Subcommand)]
enum PatchAction {
    /// Print the patch selected for a component version
    Show {
        #[command(flatten)]
        query: PatchArgs,
    },
    /// Apply the patch selected for a component version
    Apply {
        #[command(flatten)]
        query: PatchArgs,
        /// Directory to patch
        dst: String,
    },
    /// Apply every PREFIX-* patch in a directory, in name order
    ApplyDir {
        /// Directory relative to the patch source
        dir: String,
        /// File name prefix
        prefix: String,
        /// Directory to patch
        dst: String,
        /// Patch source, file://DIR or github://OWNER/REPO[@REF]
        #[arg(long)]
        source: Option<String>,
    },
}

#[derive(Args)]
struct PatchArgs {
    /// Component, e.g. envoy
    component: String,
    /// Component version, e.g. 1.29.3
    version: String,
    /// Variant suffix, e.g. -fips
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    suffix: String,
    /// Patch source, file://DIR or github://OWNER/REPO[@REF]
    #[arg(long)]
    source: Option<String>,
}

#[derive(Subcommand)]
enum ReleaseAction {
    /// Print the next stable Istio release after VERSION
    Next {
        /// Current version, e.g. 1.20.3
        version: String,
        /// Release line to move along
        #[arg(long, value_enum, default_value_t = Level::Patch)]
        level: Level,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Level {
    Minor,
    Patch,
}

#[derive(Subcommand)]
enum IstioAction {
    /// Print the base image declared by Istio at a ref
    BaseImage {
        /// Istio ref, e.g. istio@1.20.3
        istio: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    tokio::select! {
        result = run(cli.command) => result,
        signal = tokio::signal::ctrl_c() => {
            signal?;
            anyhow::bail!("interrupted")
        }
    }
}

async fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Resolve { action } => match action {
            ResolveAction::Commit { target } => commands::resolve_commit(&target).await?,
            ResolveAction::Workspace { envoy } => commands::resolve_workspace(&envoy).await?,
        },
        Commands::Proxy { action } => match action {
            ProxyAction::Info { build } => commands::proxy_info(&build.into()).await?,
            ProxyAction::Output {
                build,
                target,
                arch,
            } => commands::proxy_output(&build.into(), &target, arch.as_deref()).await?,
            ProxyAction::Prepare {
                build,
                patch_source,
            } => commands::proxy_prepare(&build.into(), patch_source.as_deref()).await?,
        },
        Commands::Patch { action } => match action {
            PatchAction::Show { query } => {
                commands::patch_show(&query.to_request(), query.source.as_deref()).await?
            }
            PatchAction::Apply { query, dst } => {
                commands::patch_apply(&query.to_request(), query.source.as_deref(), &dst).await?
            }
            PatchAction::ApplyDir {
                dir,
                prefix,
                dst,
                source,
            } => commands::patch_apply_dir(&dir, &prefix, &dst, source.as_deref()).await?,
        },
        Commands::Release { action } => match action {
            ReleaseAction::Next { version, level } => {
                let minor = matches!(level, Level::Minor);
                commands::release_next(&version, minor).await?
            }
        },
        Commands::Istio { action } => match action {
            IstioAction::BaseImage { istio } => commands::base_image(&istio).await?,
        },
    }

    Ok(())
}

impl From<BuildArgs> for commands::BuildRequest {
    fn from(args: BuildArgs) -> Self {
        Self {
            istio: args.istio,
            proxy: args.proxy,
            envoy: args.envoy,
            fips: args.fips,
        }
    }
}

impl PatchArgs {
    fn to_request(&self) -> leo_build::PatchQuery {
        leo_build::PatchQuery::new(&self.component, &self.version).with_suffix(&self.suffix)
    }
}
