use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use std::path::PathBuf;

/// CLI arguments for eventfeed-server
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub port: Option<u16>,
    pub config_file: Option<PathBuf>,
    pub snapshot: Option<PathBuf>,
    pub feed_strategy: Option<String>,
    pub reindex_interval_secs: Option<u64>,
    pub enable_cors: Option<bool>,
    pub max_request_size: Option<usize>,
    pub log_level: Option<String>,
}

impl CliArgs {
    /// Parse command line arguments
    pub fn parse() -> Self {
        let matches = Self::command().get_matches();

        // Handle special help for environment variables
        if matches.get_flag("help_env") {
            Self::print_env_help();
            std::process::exit(0);
        }

        Self::from_matches(&matches)
    }

    /// Parse an explicit argument list
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let matches = Self::command().try_get_matches_from(args)?;
        Ok(Self::from_matches(&matches))
    }

    fn command() -> Command {
        Command::new("eventfeed-server")
            .version(eventfeed::VERSION)
            .about("HTTP API server for the eventfeed recommendation engine")
            .long_about(
                r#"eventfeed-server exposes personalized event feeds, similar-event lookups,
keyword search, feedback recording and embedding backfill over HTTP.

The server can be configured through command line arguments or environment
variables. Command line arguments take precedence over environment variables.

Examples:
  eventfeed-server --port 8080
  eventfeed-server --config eventfeed.toml --snapshot ./data/feed.json
  eventfeed-server --feed-strategy lexical --reindex-interval 300 --log-level debug"#,
            )
            .arg(
                Arg::new("port")
                    .short('p')
                    .long("port")
                    .value_name("PORT")
                    .help("Port to listen on")
                    .long_help(
                        "Port number for the HTTP server to listen on.
Environment variable: EVENTFEED_PORT",
                    )
                    .value_hint(ValueHint::Other)
                    .value_parser(clap::value_parser!(u16)),
            )
            .arg(
                Arg::new("config")
                    .short('c')
                    .long("config")
                    .value_name("FILE")
                    .help("Configuration file path")
                    .long_help(
                        "Path to a TOML, YAML or JSON configuration file for the
recommendation engine. Merged over defaults and under EVENTFEED_* variables.
Environment variable: EVENTFEED_CONFIG_FILE",
                    )
                    .value_hint(ValueHint::FilePath)
                    .value_parser(clap::value_parser!(PathBuf)),
            )
            .arg(
                Arg::new("snapshot")
                    .long("snapshot")
                    .value_name("FILE")
                    .help("Persist state to this JSON snapshot")
                    .long_help(
                        "Load the catalog, users and feedback from this JSON file
at startup and rewrite it after every change. Without it, state is kept in memory.
Environment variable: EVENTFEED_SNAPSHOT",
                    )
                    .value_hint(ValueHint::FilePath)
                    .value_parser(clap::value_parser!(PathBuf)),
            )
            .arg(
                Arg::new("feed_strategy")
                    .long("feed-strategy")
                    .value_name("STRATEGY")
                    .help("Feed scoring path")
                    .long_help(
                        "auto picks the vector path for users with an embedding and
the lexical path otherwise; lexical and vector force one path.
Environment variable: EVENTFEED_FEED_STRATEGY",
                    )
                    .value_parser(["auto", "lexical", "vector"]),
            )
            .arg(
                Arg::new("reindex_interval")
                    .long("reindex-interval")
                    .value_name("SECONDS")
                    .help("Background reindex interval in seconds (0 disables)")
                    .long_help(
                        "Run the embedding backfill every SECONDS seconds.
Environment variable: EVENTFEED_REINDEX_INTERVAL",
                    )
                    .value_parser(clap::value_parser!(u64)),
            )
            .arg(
                Arg::new("no_cors")
                    .long("no-cors")
                    .help("Disable the permissive CORS layer")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("max_request_size")
                    .long("max-request-size")
                    .value_name("BYTES")
                    .help("Maximum request body size in bytes")
                    .long_help(
                        "Maximum size allowed for HTTP request bodies.
Larger requests will be rejected.
Environment variable: EVENTFEED_MAX_REQUEST_SIZE",
                    )
                    .value_parser(clap::value_parser!(usize)),
            )
            .arg(
                Arg::new("log_level")
                    .long("log-level")
                    .value_name("LEVEL")
                    .help("Logging level")
                    .long_help(
                        "Set the logging level. Valid values: error, warn, info, debug, trace
Environment variable: RUST_LOG",
                    )
                    .value_parser(["error", "warn", "info", "debug", "trace"]),
            )
            .arg(
                Arg::new("help_env")
                    .long("help-env")
                    .help("Show all environment variables")
                    .action(ArgAction::SetTrue),
            )
    }

    fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            port: matches.get_one::<u16>("port").copied(),
            config_file: matches.get_one::<PathBuf>("config").cloned(),
            snapshot: matches.get_one::<PathBuf>("snapshot").cloned(),
            feed_strategy: matches.get_one::<String>("feed_strategy").cloned(),
            reindex_interval_secs: matches.get_one::<u64>("reindex_interval").copied(),
            enable_cors: if matches.get_flag("no_cors") {
                Some(false)
            } else {
                None
            },
            max_request_size: matches.get_one::<usize>("max_request_size").copied(),
            log_level: matches.get_one::<String>("log_level").cloned(),
        }
    }

    /// Print comprehensive environment variable help
    fn print_env_help() {
        println!("eventfeed-server Environment Variables");
        println!("======================================");
        println!();
        println!("Server Configuration:");
        println!("  EVENTFEED_PORT                 - Server port (default: 3000)");
        println!("  EVENTFEED_MAX_REQUEST_SIZE     - Max request body size in bytes (default: 1MB)");
        println!("  EVENTFEED_CONFIG_FILE          - Path to engine config file");
        println!("  EVENTFEED_SNAPSHOT             - JSON snapshot file (default: in-memory)");
        println!("  EVENTFEED_ENABLE_CORS          - Permissive CORS (default: true)");
        println!("  EVENTFEED_DEFAULT_LIMIT        - Default feed/search page size (default: 20)");
        println!("  EVENTFEED_MAX_LIMIT            - Max feed/search page size (default: 100)");
        println!();
        println!("Ranking:");
        println!("  EVENTFEED_FEED_STRATEGY        - auto, lexical or vector (default: auto)");
        println!("  EVENTFEED_REINDEX_INTERVAL     - Background reindex seconds (default: 0, off)");
        println!();
        println!("Engine settings (nested with __), for example:");
        println!("  EVENTFEED_RANKING__CANDIDATE_POOL=400");
        println!("  EVENTFEED_PROFILE__ALPHA=0.9");
        println!("  EVENTFEED_SUMMARY__MAX_WORDS=22");
        println!();
        println!("Logging:");
        println!("  RUST_LOG                       - Logging level (error, warn, info, debug, trace)");
        println!();
        println!("Note: Command line arguments take precedence over environment variables.");
        println!("Use --help for CLI argument documentation.");
    }
}
