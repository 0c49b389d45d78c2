//! Command-line interface for the Streamsight extension manager.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};

use streamsight_core::api::{ConfirmationGate, Notifier};
use streamsight_core::config::{env_vars, EngineIdStrategy, PlatformConfig};
use streamsight_core::error::Error;
use streamsight_core::model::ExtensionRecord;
use streamsight_directory::{ExtensionDirectory, MonitorFeed, PlatformServices};
use streamsight_platform::{PlatformClient, PollingPushChannel, SampleCatalog};

/// Streamsight - Manage analytics extensions on the platform.
#[derive(Parser, Debug)]
#[command(name = "streamsight")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Action to perform.
    #[command(subcommand)]
    command: Command,

    /// Answer yes to every confirmation prompt.
    #[arg(short = 'y', long, global = true)]
    yes: bool,

    /// Resolve the engine id through the inventory instead of the
    /// companion microservice.
    #[arg(long, global = true)]
    inventory_lookup: bool,

    /// Verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Command {
    /// List uploaded extensions with their loaded state.
    List,
    /// List all blocks of the currently loaded extensions.
    Blocks,
    /// Show the block manifest of a single extension.
    Detail {
        /// Extension name (without the package file extension).
        name: String,
    },
    /// Upload an extension archive.
    Upload {
        /// Path to the .zip archive.
        path: PathBuf,
    },
    /// Download an extension archive.
    Download {
        /// Extension name or managed-object id.
        name: String,
        /// Output file (defaults to <name>.zip).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Delete an extension archive.
    Delete {
        /// Extension name or managed-object id.
        name: String,
    },
    /// Restart the engine so it picks up extension changes.
    Restart,
    /// Show the engine diagnostic status document.
    Status,
    /// Follow the engine availability until interrupted.
    Watch,
    /// List the most recent alarms raised by the engine.
    Alarms {
        /// Restrict to a status, e.g. ACTIVE.
        #[arg(long)]
        status: Option<String>,
        /// Number of pages to print.
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// List the most recent events emitted by the engine.
    Events {
        /// Number of pages to print.
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// List community sample blocks.
    Samples {
        /// Print the source of the named sample instead of listing.
        #[arg(long)]
        fetch: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // JSON logging for container environments, compact for terminals.
    let json_logging = std::env::var(env_vars::LOG_JSON)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(false);

    let default_filter = if args.verbose {
        "streamsight=debug"
    } else {
        "streamsight=info"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(default_filter)
            .add_directive(tracing::Level::WARN.into())
    });

    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .compact()
            .init();
    }

    let app = App::from_env(&args)?;

    match args.command {
        Command::List => app.list().await,
        Command::Blocks => app.blocks().await,
        Command::Detail { name } => app.detail(&name).await,
        Command::Upload { path } => app.upload(&path).await,
        Command::Download { name, output } => app.download(&name, output).await,
        Command::Delete { name } => app.delete(&name).await,
        Command::Restart => app.restart().await,
        Command::Status => app.status().await,
        Command::Watch => app.watch().await,
        Command::Alarms { status, pages } => app.alarms(status, pages).await,
        Command::Events { pages } => app.events(pages).await,
        Command::Samples { fetch } => app.samples(fetch).await,
    }
}

/// Confirmation prompt on the controlling terminal.
struct StdinConfirm {
    assume_yes: bool,
}

#[async_trait]
impl ConfirmationGate for StdinConfirm {
    async fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        let message = format!("{message} [y/N] ");
        tokio::task::spawn_blocking(move || {
            use std::io::Write;
            print!("{message}");
            if std::io::stdout().flush().is_err() {
                return false;
            }
            let mut answer = String::new();
            if std::io::stdin().read_line(&mut answer).is_err() {
                return false;
            }
            matches!(answer.trim(), "y" | "Y" | "yes")
        })
        .await
        .unwrap_or(false)
    }
}

/// Terminal notifications: banners on stdout, warnings on stderr.
struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn success(&self, message: &str) {
        println!("{message}");
    }

    fn warning(&self, message: &str) {
        eprintln!("Warning: {message}");
    }
}

/// Wired-up services behind the subcommands.
struct App {
    config: PlatformConfig,
    client: Arc<PlatformClient>,
    directory: ExtensionDirectory,
}

impl App {
    fn from_env(args: &Args) -> Result<Self> {
        let mut config = PlatformConfig::from_env().with_context(|| {
            format!(
                "platform connection not configured; set {} plus credentials",
                env_vars::BASE_URL
            )
        })?;
        if args.inventory_lookup {
            config = config.with_engine_id_strategy(EngineIdStrategy::InventoryLookup);
        }

        let client = Arc::new(PlatformClient::new(config.clone())?);
        let services = PlatformServices {
            inventory: client.clone(),
            binaries: client.clone(),
            engine: client.clone(),
            push: Arc::new(PollingPushChannel::new(client.clone())),
            confirm: Arc::new(StdinConfirm {
                assume_yes: args.yes,
            }),
            notifier: Arc::new(TerminalNotifier),
        };
        let directory = ExtensionDirectory::new(services)
            .with_engine_id_strategy(config.engine_id_strategy);

        Ok(Self {
            config,
            client,
            directory,
        })
    }

    /// Find an extension by name or managed-object id.
    async fn resolve(&self, name: &str) -> Result<ExtensionRecord> {
        let extensions = self.directory.list_enriched().await?;
        extensions
            .iter()
            .find(|e| e.name == name || e.id == name)
            .cloned()
            .with_context(|| format!("no extension named \"{name}\""))
    }

    async fn list(&self) -> Result<()> {
        let extensions = self.directory.list_enriched().await?;
        if extensions.is_empty() {
            println!("No extensions uploaded.");
            return Ok(());
        }
        println!("{:<30} {:>8} {:>8} {:>8}", "NAME", "ID", "LOADED", "BLOCKS");
        for ext in extensions.iter() {
            let blocks = ext
                .block_count
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{:<30} {:>8} {:>8} {:>8}",
                ext.name,
                ext.id,
                if ext.loaded { "yes" } else { "no" },
                blocks
            );
        }
        Ok(())
    }

    async fn blocks(&self) -> Result<()> {
        let blocks = self.directory.loaded_blocks().await?;
        if blocks.is_empty() {
            println!("No blocks loaded.");
            return Ok(());
        }
        for block in blocks.iter() {
            let kind = if block.custom { "custom" } else { "builtin" };
            println!("{:<30} {:<8} {:<24} {}", block.name, kind, block.extension, block.id);
        }
        Ok(())
    }

    async fn detail(&self, name: &str) -> Result<()> {
        match self.directory.get_detail(name).await? {
            Some(detail) => {
                println!("Extension: {}", detail.name);
                println!("Blocks:    {}", detail.analytics.len());
                for block in &detail.analytics {
                    println!("  {:<30} {}", block.name, block.id);
                }
            }
            None => println!("Extension \"{name}\" is not loaded in the engine."),
        }
        Ok(())
    }

    async fn upload(&self, path: &PathBuf) -> Result<()> {
        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("cannot read {}", path.display()))?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .context("archive path has no file name")?;
        let object = self.directory.upload(file_name, data).await?;
        println!("Uploaded {} as {}.", file_name, object.id);
        println!("Run `streamsight restart` to load it into the engine.");
        Ok(())
    }

    async fn download(&self, name: &str, output: Option<PathBuf>) -> Result<()> {
        let record = self.resolve(name).await?;
        let data = self.directory.download(&record).await?;
        let output = output.unwrap_or_else(|| PathBuf::from(format!("{}.zip", record.name)));
        tokio::fs::write(&output, data)
            .await
            .with_context(|| format!("cannot write {}", output.display()))?;
        println!("Saved {}.", output.display());
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let record = self.resolve(name).await?;
        match self.directory.delete(&record).await {
            Ok(()) => Ok(()),
            Err(Error::Cancelled) => {
                println!("Aborted.");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn restart(&self) -> Result<()> {
        self.directory.restart().await?;
        println!("Restart submitted. The engine will be unavailable for a moment.");
        Ok(())
    }

    async fn status(&self) -> Result<()> {
        let status = self.directory.engine_status().await?;
        println!("{}", serde_json::to_string_pretty(&status)?);
        Ok(())
    }

    async fn watch(&self) -> Result<()> {
        let mut subscription = self.directory.subscribe_status().await?;
        println!("Watching engine status. Press Ctrl-C to stop.");
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => break,
                changed = subscription.changed() => match changed {
                    Some(true) => println!("Engine is going down for a restart..."),
                    Some(false) => println!("Engine is back up."),
                    None => {
                        println!("Status feed ended.");
                        break;
                    }
                },
            }
        }
        Ok(())
    }

    async fn alarms(&self, status: Option<String>, pages: u32) -> Result<()> {
        let mut feed = self.monitor_feed().await?;
        feed.set_status_filter(status);
        let mut printed = 0usize;
        for step in 0..pages.max(1) {
            let page = feed.alarms_page(i32::from(step > 0)).await?;
            if page.is_empty() {
                break;
            }
            for alarm in &page.items {
                println!(
                    "{} {:<8} {:<12} {}",
                    alarm.time.to_rfc3339(),
                    alarm.severity,
                    alarm.status,
                    alarm.text
                );
                printed += 1;
            }
        }
        if printed == 0 {
            println!("No alarms.");
        }
        Ok(())
    }

    async fn events(&self, pages: u32) -> Result<()> {
        let mut feed = self.monitor_feed().await?;
        let mut printed = 0usize;
        for step in 0..pages.max(1) {
            let page = feed.events_page(i32::from(step > 0)).await?;
            if page.is_empty() {
                break;
            }
            for event in &page.items {
                println!(
                    "{} {:<24} {}",
                    event.time.to_rfc3339(),
                    event.event_type,
                    event.text
                );
                printed += 1;
            }
        }
        if printed == 0 {
            println!("No events.");
        }
        Ok(())
    }

    async fn monitor_feed(&self) -> Result<MonitorFeed> {
        let id = self
            .directory
            .engine_id()
            .await?
            .context("cannot determine the engine id")?;
        Ok(MonitorFeed::new(self.client.clone(), self.client.clone(), id))
    }

    async fn samples(&self, fetch: Option<String>) -> Result<()> {
        let catalog = SampleCatalog::new(
            self.config.samples_repo(),
            self.config.samples_token.clone(),
        )?;
        let samples = catalog.list().await?;
        match fetch {
            Some(name) => {
                let sample = samples
                    .iter()
                    .find(|s| s.name == name)
                    .with_context(|| format!("no sample named \"{name}\""))?;
                let source = catalog.fetch(sample).await?;
                println!("{source}");
            }
            None => {
                if samples.is_empty() {
                    println!("No samples available.");
                    return Ok(());
                }
                for sample in &samples {
                    println!("{:<40} {}", sample.name, sample.path);
                }
            }
        }
        Ok(())
    }
}
