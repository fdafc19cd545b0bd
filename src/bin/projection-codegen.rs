//! generate graphql projection descriptors from a schema
//!
//! reads sdl from files and/or an http endpoint, runs one generation, and
//! writes the descriptor set (operations, projections, representations, and
//! constant tables) as pretty json.

use clap::Parser;
use projection_codegen::{
    read_schema_files, CodegenConfig, GenerationOutput, Generator, RemoteSchema,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "projection-codegen", version, about)]
struct Args {
    /// sdl file; repeat to merge several files
    #[arg(long = "schema", value_name = "FILE")]
    schemas: Vec<PathBuf>,

    /// endpoint serving the schema as sdl
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// extra request header for --url, as `name:value`
    #[arg(long = "header", value_name = "NAME:VALUE", value_parser = parse_header)]
    headers: Vec<(String, String)>,

    /// timeout for --url in seconds
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    timeout: u64,

    /// json configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// operation document; limits generation to the selected fields
    #[arg(long = "query", value_name = "FILE")]
    queries: Vec<PathBuf>,

    /// override the projection depth bound
    #[arg(long, value_name = "N")]
    max_depth: Option<usize>,

    /// remove the depth bound
    #[arg(long, conflicts_with = "max_depth")]
    unbounded: bool,

    /// abbreviate projection names
    #[arg(long)]
    short_names: bool,

    /// skip the federation `_entities` projection
    #[arg(long)]
    skip_entities: bool,

    /// output file; stdout when omitted
    #[arg(long, short = 'o', value_name = "FILE")]
    out: Option<PathBuf>,

    /// debug logging
    #[arg(long, short = 'v', conflicts_with = "quiet")]
    verbose: bool,

    /// errors only
    #[arg(long, short = 'q')]
    quiet: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logger(args.verbose, args.quiet);

    let output = match run(&args).await {
        Ok(output) => output,
        Err(err) => {
            eprintln!("codegen failed: {err}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        operations = output.operations.len(),
        projections = output.projections.len(),
        representations = output.representations.len(),
        "generation finished"
    );

    if let Err(err) = write_output(&args, &output) {
        eprintln!("failed to write output: {err}");
        std::process::exit(1);
    }
}

async fn run(args: &Args) -> projection_codegen::Result<GenerationOutput> {
    let config = load_config(args)?;

    let mut schema_sources = read_schema_files(&args.schemas)?;
    if let Some(url) = &args.url {
        let mut remote =
            RemoteSchema::new(url)?.with_timeout(Duration::from_secs(args.timeout));
        for (name, value) in &args.headers {
            remote = remote.with_header(name, value)?;
        }
        schema_sources.push(remote.fetch().await?);
    }
    if schema_sources.is_empty() {
        return Err(projection_codegen::Error::Config(
            "no schema given, pass --schema or --url".to_string(),
        ));
    }

    let query_sources = read_schema_files(&args.queries)?;
    let generator = Generator::new(config)?;
    generator.generate_from_sources(&schema_sources, &query_sources)
}

fn load_config(args: &Args) -> projection_codegen::Result<CodegenConfig> {
    let mut config = match &args.config {
        Some(path) => CodegenConfig::from_path(path)?,
        None => CodegenConfig::new(),
    };
    if args.unbounded {
        config = config.with_max_projection_depth(None);
    } else if let Some(depth) = args.max_depth {
        config = config.with_max_projection_depth(Some(depth));
    }
    if args.short_names {
        config = config.with_short_projection_names(true);
    }
    if args.skip_entities {
        config = config.with_skip_entity_queries(true);
    }
    if !args.queries.is_empty() {
        config = config.with_generate_client_api_for_defined_query(true);
    }
    Ok(config)
}

fn write_output(args: &Args, output: &GenerationOutput) -> projection_codegen::Result<()> {
    let json = serde_json::to_string_pretty(output)?;
    match &args.out {
        Some(path) => {
            std::fs::write(path, json)?;
            tracing::info!(path = %path.display(), "wrote descriptors");
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    match raw.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected `name:value`, got `{raw}`")),
    }
}

fn init_logger(verbose: bool, quiet: bool) {
    let filter = if verbose {
        EnvFilter::new("projection_codegen=debug")
    } else if quiet {
        EnvFilter::new("projection_codegen=error")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("projection_codegen=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}
