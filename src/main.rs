use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::rc::Rc;
use store_crud::Result;
use store_crud::render;
use store_crud::schema::BuiltinSchemas;
use store_crud::script;
use store_crud::store::{HostStore, ObjectStore, Path};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "store-crud")]
#[command(about = "Schema-driven CRUD components over a path-addressable store", long_about = None)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted session and render the final components to HTML.
    Run {
        #[arg(long)]
        store: String,

        #[arg(long)]
        script: String,

        #[arg(short = 'o', long)]
        out: String,

        /// Also write the final store contents as JSON.
        #[arg(long)]
        dump: Option<String>,
    },
    /// Print the value stored at a dotted path.
    Get {
        #[arg(long)]
        store: String,

        path: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.cmd {
        Commands::Run {
            store,
            script,
            out,
            dump,
        } => {
            // 1) Seed the store and load the session.
            let object_store = Rc::new(load_store(&store)?);
            let session = script::load_session(&script)?;

            // 2) Drive the components.
            let report = session.run(Rc::new(BuiltinSchemas::standard()), object_store.clone())?;
            for line in &report.lines {
                println!("{}", line);
            }

            // 3) Render HTML.
            let views: Vec<_> = report.views.into_iter().map(|(_, el)| el).collect();
            let snapshot = object_store.to_json();
            let html = render::render_page(&report.title, &views, &snapshot)?;
            std::fs::write(&out, html).with_context(|| format!("write {}", out))?;
            println!("Wrote {}", out);

            if let Some(dump) = dump {
                let json = serde_json::to_string_pretty(&snapshot)?;
                std::fs::write(&dump, json).with_context(|| format!("write {}", dump))?;
                println!("Wrote {}", dump);
            }
        }
        Commands::Get { store, path } => {
            let object_store = load_store(&store)?;
            let path = Path::parse(&path)?;
            match object_store.get(&path) {
                Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
                None => println!("undefined"),
            }
        }
    }

    Ok(())
}

fn load_store(path: &str) -> Result<ObjectStore> {
    let text = std::fs::read_to_string(path).with_context(|| format!("read store file {}", path))?;
    let seed: Value =
        serde_json::from_str(&text).with_context(|| format!("parse store file {}", path))?;
    match seed {
        Value::Object(map) => Ok(ObjectStore::from_json(map)),
        other => bail!("store file {} must hold a JSON object, found {}", path, kind(&other)),
    }
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
