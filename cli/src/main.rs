use std::collections::BTreeMap;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use strata_core::{ConfigStore, Value};

mod setup;

#[derive(Parser)]
#[command(name = "strata")]
#[command(about = "Query layered, lazily loaded configuration", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (overrides the default search paths)
    #[arg(short, long, global = true, env = "STRATA_CONFIG")]
    config: Option<String>,

    /// Treat unresolved keys as errors
    #[arg(long, global = true)]
    throw: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the value of a key
    Get {
        /// Key, e.g. `database.connections.default.host` or `database#replica.eu`
        key: String,
        #[arg(short, long, value_enum, default_value = "raw")]
        format: Format,
    },

    /// Check whether a key resolves (exit code 0 if it does, 1 otherwise)
    Has {
        key: String,
    },

    /// Print every loaded namespace
    Dump {
        #[arg(short, long, value_enum, default_value = "json")]
        format: Format,
        /// Namespaces to load before dumping
        #[arg(short, long, num_args = 1..)]
        load: Vec<String>,
    },

    /// List the configured loader chain in lookup order
    Loaders,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Yaml,
    Raw,
}

fn main() {
    let cli = Cli::parse();

    let config = match cli.config {
        Some(ref path) => strata_config::load_from_file(path),
        None => strata_config::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => fail(&format!("Failed to load configuration: {e}")),
    };

    setup::init_logging(&config);

    let store = match setup::build_store(&config, cli.throw) {
        Ok(store) => store,
        Err(e) => fail(&e),
    };

    let result = match cli.command {
        Commands::Get { key, format } => cmd_get(&store, &key, format),
        Commands::Has { key } => cmd_has(&store, &key),
        Commands::Dump { format, load } => cmd_dump(&store, &load, format),
        Commands::Loaders => cmd_loaders(&store),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => fail(&e),
    }
}

fn fail(message: &str) -> ! {
    eprintln!("{} {}", "Error:".red().bold(), message);
    std::process::exit(1);
}

fn cmd_get(store: &ConfigStore, key: &str, format: Format) -> Result<bool, String> {
    let value = store
        .get(key)
        .map_err(|e| e.to_string())?
        .unwrap_or_default();
    println!("{}", render(&value, format)?);
    Ok(true)
}

/// Loads the key's namespace first; the store's own `has` never loads.
fn cmd_has(store: &ConfigStore, key: &str) -> Result<bool, String> {
    match store.get(key) {
        Ok(_) => {}
        Err(e) if e.is_not_found() => {}
        Err(e) => return Err(e.to_string()),
    }
    let found = store.has(key);
    println!("{found}");
    Ok(found)
}

fn cmd_dump(store: &ConfigStore, namespaces: &[String], format: Format) -> Result<bool, String> {
    for namespace in namespaces {
        match store.get(namespace) {
            Ok(_) => {}
            Err(e) if e.is_not_found() => {
                tracing::warn!(namespace = %namespace, "namespace not found");
            }
            Err(e) => return Err(e.to_string()),
        }
    }

    let items: BTreeMap<String, Value> = store.all().into_iter().collect();
    let value = Value::Map(items);
    println!("{}", render(&value, format)?);
    Ok(true)
}

fn cmd_loaders(store: &ConfigStore) -> Result<bool, String> {
    println!("{}", "Loaders:".bold());
    let names = store.loader_names();
    if names.is_empty() {
        println!("  (none)");
    }
    for (i, name) in names.iter().enumerate() {
        println!("  {}. {}", i + 1, name.cyan());
    }
    Ok(true)
}

fn render(value: &Value, format: Format) -> Result<String, String> {
    match format {
        Format::Raw => Ok(value.to_string()),
        Format::Json => serde_json::to_string_pretty(value)
            .map_err(|e| format!("Failed to encode JSON: {e}")),
        Format::Yaml => serde_yaml::to_string(value)
            .map(|s| s.trim_end().to_string())
            .map_err(|e| format!("Failed to encode YAML: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use strata_core::MemoryLoader;

    #[test]
    fn cli_parses() {
        let cli =
            Cli::try_parse_from(["strata", "--throw", "get", "app.name", "-f", "json"]).unwrap();
        assert!(cli.throw);
        assert!(matches!(
            cli.command,
            Commands::Get { ref key, format: Format::Json } if key == "app.name"
        ));

        let cli = Cli::try_parse_from(["strata", "dump", "--load", "app", "db"]).unwrap();
        assert!(matches!(cli.command, Commands::Dump { ref load, .. } if load == &["app", "db"]));
    }

    #[test]
    fn render_formats() {
        let value = Value::from("strata");
        assert_eq!(render(&value, Format::Raw).unwrap(), "strata");
        assert_eq!(render(&value, Format::Json).unwrap(), "\"strata\"");
        assert_eq!(render(&Value::Null, Format::Raw).unwrap(), "null");
        assert_eq!(render(&Value::from(8080u64), Format::Yaml).unwrap(), "8080");
    }

    #[test]
    fn has_loads_before_checking() {
        let app = Value::from_iter([("name".to_string(), Value::from("strata"))]);
        let store = ConfigStore::new(vec![Arc::new(
            MemoryLoader::new("defaults").with_namespace("app", app),
        )]);
        assert!(cmd_has(&store, "app.name").unwrap());
        assert!(!cmd_has(&store, "app.missing").unwrap());
        assert!(cmd_has(&store, "").is_err());
    }
}
