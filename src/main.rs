use clap::{Parser, Subcommand};
use gf_press::{config, generate, logging, output, source};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error};

/// Exit code for `--strict` builds where some pages failed.
const EXIT_PAGE_FAILURES: u8 = 2;

const SOURCE_ENV: &str = "GF_PRESS_SOURCE";
const OUTPUT_ENV: &str = "GF_PRESS_OUTPUT";

/// Flags for commands that read the catalog.
#[derive(clap::Args, Clone, Default)]
struct SourceArgs {
    /// JSON snapshot path or sqlite:// connection string [default: config source.connection]
    #[arg(long, env = SOURCE_ENV)]
    source: Option<String>,
}

/// Flags for `build`.
#[derive(clap::Args, Clone, Default)]
struct BuildArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Output directory [default: config build.output_dir]
    #[arg(long, env = OUTPUT_ENV)]
    output: Option<PathBuf>,

    /// Render workers, capped at the number of CPU cores
    #[arg(long, value_parser = parse_workers)]
    workers: Option<usize>,
}

/// At least one worker; rayon would read 0 as "one per core".
fn parse_workers(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

impl BuildArgs {
    /// What `build` sees when no subcommand was given.
    fn from_env() -> Self {
        Self {
            source: SourceArgs {
                source: std::env::var(SOURCE_ENV).ok(),
            },
            output: std::env::var_os(OUTPUT_ENV).map(PathBuf::from),
            workers: None,
        }
    }
}

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "gf-press")]
#[command(about = "Static site generator for a gluten-free recipe catalog")]
#[command(long_about = "\
Static site generator for a gluten-free recipe catalog

The recipe database is the data source. Every published recipe becomes a
page with schema.org structured data, categories and tags become listing
pages, and the whole tree is swapped into place only once it is complete.

Output structure:

  dist/
  ├── index.html                     # Home: hero, featured, categories, latest
  ├── recipes/index.html             # Searchable listing (page 1)
  ├── recipes/page/2/index.html      # Further listing pages
  ├── recipe/{slug}/index.html       # One page per published recipe
  ├── category/{slug}/index.html     # One page per category
  ├── tag/{slug}/index.html          # One page per tag
  ├── sitemap.xml
  └── robots.txt

Sources:
  recipes.json                 JSON export of the recipe tables
  sqlite://recipes.db          Read-only query against the live database

Run 'gf-press gen-config' to generate a documented gf-press.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (optional; stock defaults when missing)
    #[arg(long, default_value = config::CONFIG_FILENAME, global = true)]
    config: PathBuf,

    /// Log debug output to stderr (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Exit with code 2 when any page failed
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Export the catalog to a static site (the default)
    Build(BuildArgs),
    /// Read and validate the catalog without writing anything
    Check(SourceArgs),
    /// Print a stock gf-press.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let command = cli
        .command
        .unwrap_or_else(|| Command::Build(BuildArgs::from_env()));

    match command {
        Command::Build(args) => {
            let site_config = config::load_config(&cli.config)?;
            let connection = resolve_connection(&args.source, &site_config);
            let output_dir = args
                .output
                .unwrap_or_else(|| PathBuf::from(&site_config.build.output_dir));
            let source = source::open_source(&connection);
            debug!(source = %source.describe(), output = %output_dir.display(), "building");

            let options = generate::BuildOptions {
                workers: args.workers,
                ..generate::BuildOptions::current_year()
            };
            let report = generate::build(source.as_ref(), &site_config, &output_dir, &options)?;
            output::print_build_report(&report);

            if cli.strict && report.failed > 0 {
                return Ok(ExitCode::from(EXIT_PAGE_FAILURES));
            }
        }
        Command::Check(args) => {
            let site_config = config::load_config(&cli.config)?;
            let connection = resolve_connection(&args, &site_config);
            let source = source::open_source(&connection);
            let report = generate::check(source.as_ref(), &site_config)?;
            output::print_check_report(&report);

            if cli.strict && !report.rejected.is_empty() {
                return Ok(ExitCode::from(EXIT_PAGE_FAILURES));
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Flag or `GF_PRESS_SOURCE` first, then `source.connection` from config.
fn resolve_connection(args: &SourceArgs, site_config: &config::SiteConfig) -> String {
    args.source
        .clone()
        .unwrap_or_else(|| site_config.source.connection.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::path::Path;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_parses() {
        let cli = Cli::try_parse_from(["gf-press"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config, Path::new(config::CONFIG_FILENAME));
    }

    #[test]
    fn build_flags_parse() {
        let cli = Cli::try_parse_from([
            "gf-press", "--strict", "build", "--source", "r.json", "--output", "out", "--workers", "2",
        ])
        .unwrap();
        assert!(cli.strict);
        match cli.command {
            Some(Command::Build(args)) => {
                assert_eq!(args.source.source.as_deref(), Some("r.json"));
                assert_eq!(args.output, Some(PathBuf::from("out")));
                assert_eq!(args.workers, Some(2));
            }
            _ => panic!("expected build"),
        }
    }

    #[test]
    fn zero_workers_rejected() {
        let err = Cli::try_parse_from(["gf-press", "build", "--workers", "0"])
            .err()
            .expect("0 workers must not parse");
        assert!(err.to_string().contains("at least 1"));
        assert!(Cli::try_parse_from(["gf-press", "build", "--workers", "many"]).is_err());
        assert!(Cli::try_parse_from(["gf-press", "build", "--workers", "1"]).is_ok());
    }

    #[test]
    fn connection_flag_wins_over_config() {
        let site_config = config::SiteConfig::default();
        let args = SourceArgs {
            source: Some("sqlite://live.db".into()),
        };
        assert_eq!(resolve_connection(&args, &site_config), "sqlite://live.db");
        assert_eq!(
            resolve_connection(&SourceArgs::default(), &site_config),
            site_config.source.connection
        );
    }
}
