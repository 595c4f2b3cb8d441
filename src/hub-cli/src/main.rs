use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::debug;

use hub_client::{new_shared, K8Client, K8Config};
use hub_config::HubConfig;
use hub_workspace::{AcceleratorType, HubConsole, ResourceSpec, WorkspaceManager};

#[derive(Parser)]
#[command(name = "hub")]
#[command(about = "Manage notebook workspaces on the compute hub cluster")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Provision a workspace for a user
    Create(CreateOpt),
    /// Scale a workspace to one replica
    Start { identity: String },
    /// Scale a workspace to zero replicas, keeping its storage
    Stop { identity: String },
    /// Remove every resource of a workspace
    Delete { identity: String },
    /// List workspaces with their limits and status
    List {
        /// print descriptors as json
        #[arg(long)]
        json: bool,
    },
    /// Print the connection token of a running workspace
    Token { identity: String },
    /// Show which phase a workspace is in
    Inspect { identity: String },
}

#[derive(Args)]
struct CreateOpt {
    /// user email, the part before '@' names the workspace
    #[arg(long, default_value = "")]
    email: String,
    /// cores
    #[arg(long, default_value_t = 16)]
    cpu: u32,
    /// memory in Gi
    #[arg(long, default_value_t = 32)]
    memory: u32,
    /// storage in Gi
    #[arg(long, default_value_t = 200)]
    storage: u32,
    /// K40 or K80
    #[arg(long, default_value = "K80")]
    gpu_type: AcceleratorType,
    #[arg(long, default_value_t = 2)]
    gpu_count: u32,
}

impl From<CreateOpt> for ResourceSpec {
    fn from(opt: CreateOpt) -> Self {
        ResourceSpec {
            cpu: opt.cpu,
            memory: opt.memory,
            storage: opt.storage,
            accelerator: opt.gpu_type,
            accelerator_count: opt.gpu_count,
        }
    }
}

fn connect(config: HubConfig) -> Result<HubConsole<K8Client>> {
    let k8_config = match &config.kubeconfig {
        Some(path) => K8Config::load_from(path)?,
        None => K8Config::load()?,
    };
    debug!(api = k8_config.api_path(), namespace = %config.namespace, "connecting");

    let client = new_shared(k8_config)?;
    Ok(HubConsole::new(WorkspaceManager::new(client, config)))
}

#[tokio::main]
async fn main() -> Result<()> {
    fluvio_future::subscriber::init_tracer(None);

    let cli = Cli::parse();
    let console = connect(HubConfig::load()?)?;

    match cli.command {
        Command::Create(opt) => {
            let email = opt.email.clone();
            println!("{}", console.create(&opt.into(), &email).await);
        }
        Command::Start { identity } => println!("{}", console.start(&identity).await),
        Command::Stop { identity } => println!("{}", console.stop(&identity).await),
        Command::Delete { identity } => println!("{}", console.delete(&identity).await),
        Command::List { json } => {
            let listing = console.list().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&listing)?);
            } else {
                println!("{}", listing);
            }
        }
        Command::Token { identity } => {
            println!("{}", console.connection_token(&identity).await)
        }
        Command::Inspect { identity } => println!("{}", console.inspect(&identity).await),
    }

    Ok(())
}

#[cfg(test)]
mod test {

    use clap::Parser;

    use hub_workspace::{AcceleratorType, ResourceSpec};

    use super::{Cli, Command};

    #[test]
    fn test_create_defaults() {
        let cli = Cli::parse_from(["hub", "create", "--email", "jdoe@example.com"]);
        let opt = match cli.command {
            Command::Create(opt) => opt,
            _ => panic!("expected create"),
        };
        assert_eq!(opt.email, "jdoe@example.com");

        let spec: ResourceSpec = opt.into();
        assert_eq!(spec.cpu, 16);
        assert_eq!(spec.memory, 32);
        assert_eq!(spec.storage, 200);
        assert_eq!(spec.accelerator, AcceleratorType::K80);
        assert_eq!(spec.accelerator_count, 2);
    }
}
