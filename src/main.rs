use clap::{Parser, Subcommand};
use dotenv::dotenv;
use mailflow_rs::config::ClientConfig;
use mailflow_rs::flow::{FlowFileLoader, FlowSession};
use mailflow_rs::remote::{ExecutionTrigger, FlowPayload, FlowRecord, PersistenceGateway};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Backend base URL (overrides MAILFLOW_API_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Credential sent in the Authorization header (overrides MAILFLOW_API_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List saved flows
    List,
    /// Print one flow's nodes and edges
    Show {
        #[arg(short, long)]
        id: String,
    },
    /// Ask the backend to run a flow
    Execute {
        #[arg(short, long)]
        id: String,
    },
    /// Delete a flow
    Delete {
        #[arg(short, long)]
        id: String,
    },
    /// Save a flow file to the backend, creating it or updating `--id`
    Import {
        /// Path to a .yaml/.yml or .json flow file
        #[arg(short, long)]
        file: String,

        /// Existing flow to overwrite
        #[arg(short, long)]
        id: Option<String>,

        /// Name to save under instead of the file's
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Write a saved flow to a file
    Export {
        #[arg(short, long)]
        id: String,

        #[arg(short, long)]
        file: String,
    },
}

fn build_config(args: &Args) -> Result<ClientConfig, Box<dyn std::error::Error + Send + Sync>> {
    let config = match &args.base_url {
        Some(url) => {
            let token = std::env::var(mailflow_rs::config::TOKEN_VAR).ok();
            ClientConfig::new(url)?.with_token(token)
        }
        None => ClientConfig::from_env()?,
    };

    Ok(match &args.token {
        Some(token) => config.with_token(Some(token.clone())),
        None => config,
    })
}

fn print_flow(record: &FlowRecord) {
    println!("{} ({})", record.name, record.id);
    if let Some(created) = record.created_at {
        println!("  created: {}", created);
    }
    if let Some(updated) = record.updated_at {
        println!("  updated: {}", updated);
    }

    println!("  nodes:");
    for node in &record.graph.nodes {
        println!("    [{}] {}", node.kind(), node.id);
        for (field, value) in node.data.fields() {
            println!("        {}: {}", field, value);
        }
    }

    println!("  edges:");
    for edge in &record.graph.edges {
        println!("    {} -> {}", edge.source, edge.target);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    let config = build_config(&args)?;
    let gateway = PersistenceGateway::http(config)?;
    let backend = gateway.backend();

    match args.command {
        Commands::List => {
            let flows = gateway.list().await?;
            if flows.is_empty() {
                println!("No flows yet.");
            }
            for flow in flows {
                println!(
                    "{}  {}  ({} nodes, {} edges)",
                    flow.id,
                    flow.name,
                    flow.graph.nodes.len(),
                    flow.graph.edges.len()
                );
            }
        }
        Commands::Show { id } => {
            let record = gateway.fetch(&id).await?;
            print_flow(&record);
        }
        Commands::Execute { id } => {
            let ack = ExecutionTrigger::new(backend).execute(&id).await?;
            println!("{}", ack.message);
        }
        Commands::Delete { id } => {
            gateway.delete(&id).await?;
            println!("Deleted flow {}", id);
        }
        Commands::Import { file, id, name } => {
            let payload = FlowFileLoader::new().load(&file)?;
            let snapshot = payload.to_snapshot()?;

            let mut session = FlowSession::new(backend);
            if let Some(id) = &id {
                session.open(id).await?;
            }
            session.store().replace_all(snapshot.nodes, snapshot.edges);
            session.rename(name.unwrap_or(payload.name));

            let record = session.save().await?;
            let verb = if id.is_some() { "Updated" } else { "Created" };
            println!("{} flow {} ({})", verb, record.name, record.id);
        }
        Commands::Export { id, file } => {
            let mut session = FlowSession::new(backend);
            session.open(&id).await?;

            let payload = FlowPayload::from_snapshot(session.name(), &session.store().snapshot());
            FlowFileLoader::new().save(&file, &payload)?;
            log::info!("Exported flow {} to {}", id, file);
            println!("Wrote {}", file);
        }
    }

    Ok(())
}
