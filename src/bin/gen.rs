//! rulesmith-gen: CLI tool for building client rule lists from local sources.

use clap::{Parser, Subcommand};
use rulesmith::converter::{self, InputFormat};
use rulesmith::serializer::{self, Client};
use rulesmith::{KeywordIndexCache, LogicalTree, Options, RuleSet};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "rulesmith-gen")]
#[command(version = "0.1.0")]
#[command(about = "Normalize proxy rule lists and render them for each client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge, filter and serialize one rule set
    Build {
        /// Source as FORMAT:PATH, e.g. surge:ads.list or clash-domain:ads.yaml
        #[arg(short, long = "input", required = true)]
        inputs: Vec<String>,

        /// Options YAML file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Rule set name used for output file names
        #[arg(short, long)]
        name: String,

        /// Output directory, one subdirectory per client
        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,

        /// Client to render for (repeatable, default: all)
        #[arg(long = "client")]
        clients: Vec<String>,
    },

    /// Print a logical rule as a tree
    Tree {
        /// Rule text, e.g. "AND,((DOMAIN,a.com),(NOT,((PROTOCOL,UDP))))"
        expr: String,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Build {
            inputs,
            config,
            name,
            output_dir,
            clients,
        } => build(&inputs, config.as_deref(), &name, &output_dir, &clients),
        Commands::Tree { expr } => print_tree(&expr),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn parse_input(input: &str) -> Result<(InputFormat, PathBuf), Box<dyn std::error::Error>> {
    let (format, path) = input
        .split_once(':')
        .ok_or_else(|| format!("input must be FORMAT:PATH, got '{}'", input))?;
    let format =
        InputFormat::parse(format).ok_or_else(|| format!("unknown input format '{}'", format))?;
    Ok((format, PathBuf::from(path)))
}

fn parse_clients(names: &[String]) -> Result<Vec<Client>, Box<dyn std::error::Error>> {
    if names.is_empty() {
        return Ok(Client::ALL.to_vec());
    }
    let mut clients = Vec::with_capacity(names.len());
    for name in names {
        let client = Client::parse(name).ok_or_else(|| format!("unknown client '{}'", name))?;
        clients.push(client);
    }
    Ok(clients)
}

fn build(
    inputs: &[String],
    config: Option<&Path>,
    name: &str,
    output_dir: &Path,
    clients: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let options = match config {
        Some(path) => Options::load(path)?,
        None => Options::default(),
    };
    let clients = parse_clients(clients)?;

    let mut rules = RuleSet::new();
    for input in inputs {
        let (format, path) = parse_input(input)?;
        let content = fs::read_to_string(&path)?;
        let set = converter::convert(format, &content, &options)?;
        println!("Loaded {:?} as {} ({} rules)", path, format, set.len());
        rules.merge(&set);
    }

    let cache = KeywordIndexCache::new();
    let report = rules.filter(&options.processing, &cache)?;
    rules.sort();
    println!(
        "Filtered {} rules ({} by suffix, {} keywords, {} domains), {} remain",
        report.total(),
        report.suffixes,
        report.keywords,
        report.domains,
        rules.len()
    );

    let model = rules.to_model();
    for client in clients {
        let outputs = serializer::serialize(client, &model, &options.serialization)?;
        if outputs.is_empty() {
            println!("{}: nothing to write", client);
            continue;
        }
        let dir = output_dir.join(client.as_str());
        fs::create_dir_all(&dir)?;
        for output in outputs {
            let path = dir.join(output.file_name(name));
            fs::write(&path, &output.content)?;
            println!("{}: wrote {:?}", client, path);
        }
    }
    Ok(())
}

fn print_tree(expr: &str) -> Result<(), Box<dyn std::error::Error>> {
    let tree = LogicalTree::parse(expr)?;
    println!("{}", tree.render());
    Ok(())
}
