//! Shellgate CLI - serve the gateway or inspect requests offline

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use shellgate::cli::{Args, SubCommand};
use shellgate::{
    format_output, ContainerRuntime, Dispatcher, DockerCli, GatewayConfig, MemoryRuntime,
    OutputFormat, Report, Server,
};

fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.log_json);

    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool, json: bool) {
    let default = if verbose { "shellgate=debug" } else { "shellgate=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<GatewayConfig> {
    match path {
        Some(path) => GatewayConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(GatewayConfig::default()),
    }
}

fn run(args: Args) -> Result<()> {
    let format = OutputFormat::from_json_flag(args.json);

    match args.command {
        SubCommand::Serve {
            bind,
            config,
            base_dir,
            runtime_binary,
            build_context,
            exec_shell,
            dry_run,
        } => {
            let mut config = load_config(config.as_ref())?;
            let server = &mut config.server;
            if let Some(bind) = bind {
                server.bind = bind;
            }
            if let Some(dir) = base_dir {
                server.base_dir = Some(dir);
            }
            if let Some(binary) = runtime_binary {
                server.runtime_binary = binary;
            }
            if let Some(dir) = build_context {
                server.build_context = dir;
            }
            if let Some(shell) = exec_shell {
                server.exec_shell = shell;
            }

            let runtime: Arc<dyn ContainerRuntime> = if dry_run {
                info!("dry run: containers are simulated in memory");
                Arc::new(MemoryRuntime::new())
            } else {
                Arc::new(
                    DockerCli::new(config.server.runtime_binary.clone())
                        .with_build_context(config.server.build_context.clone())
                        .with_exec_shell(config.server.exec_shell.clone()),
                )
            };
            let base_dir = config.base_dir()?;
            debug!(base_dir = %base_dir.display(), "session base directory");

            let dispatcher = Dispatcher::new(config.registry(), runtime);
            let rt = tokio::runtime::Runtime::new().context("starting async runtime")?;
            rt.block_on(async {
                let server = Server::bind(&config.server.bind, dispatcher, base_dir)
                    .await
                    .with_context(|| format!("binding {}", config.server.bind))?;
                server
                    .run_until(async {
                        // A failed signal handler leaves the server running.
                        if tokio::signal::ctrl_c().await.is_err() {
                            std::future::pending::<()>().await;
                        }
                    })
                    .await?;
                Ok::<(), anyhow::Error>(())
            })
        }

        SubCommand::Profiles { config } => {
            let registry = load_config(config.as_ref())?.registry();
            println!("{}", format_output(&Report::Profiles(&registry), &format));
            Ok(())
        }

        SubCommand::Check { payload, config } => {
            let registry = load_config(config.as_ref())?.registry();
            // Planning never touches the runtime.
            let dispatcher = Dispatcher::new(registry, Arc::new(MemoryRuntime::new()));
            let plan = dispatcher.plan(&payload)?;
            println!("{}", format_output(&Report::Plan(&plan), &format));
            Ok(())
        }
    }
}
