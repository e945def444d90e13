//! Config command

use admkit_core::{default_configuration, ConfigMap, ConfigStore, ConfigValue};
use anyhow::{anyhow, Context, Result};

use crate::cli::{
    ConfigCommands, ConfigGetArgs, ConfigInitArgs, ConfigSetArgs, ConfigShowArgs, ConfigUnsetArgs,
};
use crate::output;

pub fn run(cmd: ConfigCommands, store: &ConfigStore) -> Result<()> {
    match cmd {
        ConfigCommands::Init(args) => init(args, store),
        ConfigCommands::Get(args) => get(args, store),
        ConfigCommands::Set(args) => set(args, store),
        ConfigCommands::Unset(args) => unset(args, store),
        ConfigCommands::Show(args) => show(args, store),
    }
}

fn init(args: ConfigInitArgs, store: &ConfigStore) -> Result<()> {
    let existed = store.path().exists();
    let map = store
        .initialize(default_configuration())
        .context("Failed to initialize configuration")?;

    if existed {
        output::info(&format!(
            "Configuration already exists: {}",
            store.path().display()
        ));
    } else {
        output::success(&format!("Created {}", store.path().display()));
    }

    print_map(&map, args.json)
}

fn get(args: ConfigGetArgs, store: &ConfigStore) -> Result<()> {
    let value = match args.default {
        Some(default) => store.get(&args.key, ConfigValue::parse_literal(&default)),
        None => store
            .load()
            .context("Failed to read configuration")?
            .remove(&args.key)
            .ok_or_else(|| {
                anyhow!(
                    "Key '{}' not found in {}. Use --default to supply a fallback.",
                    args.key,
                    store.path().display()
                )
            })?,
    };

    println!("{}", value);
    Ok(())
}

fn set(args: ConfigSetArgs, store: &ConfigStore) -> Result<()> {
    let value = ConfigValue::parse_literal(&args.value);
    let type_name = value.type_name();

    store
        .set(&args.key, value)
        .with_context(|| format!("Failed to set '{}'", args.key))?;

    output::success(&format!("Set {} ({})", args.key, type_name));
    Ok(())
}

fn unset(args: ConfigUnsetArgs, store: &ConfigStore) -> Result<()> {
    match store
        .remove(&args.key)
        .with_context(|| format!("Failed to remove '{}'", args.key))?
    {
        Some(_) => output::success(&format!("Removed {}", args.key)),
        None => output::warning(&format!("Key '{}' was not set", args.key)),
    }
    Ok(())
}

fn show(args: ConfigShowArgs, store: &ConfigStore) -> Result<()> {
    let map = store.load().context("Failed to read configuration")?;

    if map.is_empty() && !args.json {
        output::info(&format!("No configuration at {}", store.path().display()));
        output::kv("Hint", "run `admkit config init` to write the defaults");
        return Ok(());
    }

    print_map(&map, args.json)
}

fn print_map(map: &ConfigMap, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(map)?);
    } else {
        print!("{}", serde_yaml_ng::to_string(map)?);
    }
    Ok(())
}
