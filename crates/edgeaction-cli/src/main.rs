//! # Edgeaction CLI Entry Point
//!
//! Main binary for edgeaction. Serves the demo actions or calls any action
//! from the shell.
//!
//! ## Usage
//!
//! ```bash
//! # Serve the demo actions
//! edgeaction serve -b 127.0.0.1:8787 -e REGION=eu
//!
//! # Call an action with JSON arguments (outputs raw JSON)
//! edgeaction call http://127.0.0.1:8787/echo -a '["hello", 42]'
//!
//! # Upload a file and save the file that comes back
//! edgeaction call http://127.0.0.1:8787/upload -f photo.png -o copy.png
//! ```
//!
//! ## URL Format
//!
//! Action URLs must include the `http://` or `https://` prefix:
//! - ✅ `http://127.0.0.1:8787/echo`
//! - ❌ `127.0.0.1:8787/echo`

use anyhow::Result;
use argh::FromArgs;
use edgeaction_cli::{
    default_bind, demo_server, load_call_arguments, parse_env_pair, validate_http_url, write_value,
};
use edgeaction_client::ActionClient;
use edgeaction_server::ServerConfig;
use hyper::Method;
use std::net::SocketAddr;
use std::path::PathBuf;
use url::Url;

#[derive(FromArgs)]
/// Edgeaction - call server functions over HTTP
struct Cli {
    #[argh(subcommand)]
    command: Commands,
}

/// Available CLI subcommands.
///
/// - **Serve**: Start a server with the demo actions
/// - **Call**: Call one action (unix-friendly output)
#[derive(FromArgs)]
#[argh(subcommand)]
enum Commands {
    Serve(ServeArgs),
    Call(CallArgs),
}

/// Arguments for serving the demo actions.
///
/// Mounts `/echo`, which describes whatever arguments it receives, and
/// `/upload`, which sends back the file it was given.
///
/// # Example
///
/// ```bash
/// edgeaction serve -b 0.0.0.0:8787 --cors --max-body-bytes 1048576
/// ```
#[derive(FromArgs)]
#[argh(subcommand, name = "serve")]
/// serve the demo actions
struct ServeArgs {
    /// address to bind the HTTP server to
    ///
    /// Defaults to $EDGEACTION_BIND, or 127.0.0.1:8787 when unset.
    #[argh(option, short = 'b', default = "default_bind()")]
    bind: String,

    /// answer 404 to requests without the x-server-action header
    #[argh(switch, long = "require-action-header")]
    require_action_header: bool,

    /// allow cross-origin requests from any origin
    #[argh(switch)]
    cors: bool,

    /// largest accepted request body in bytes (default: 100 MB)
    #[argh(option, long = "max-body-bytes")]
    max_body_bytes: Option<usize>,

    /// environment entry KEY=VALUE exposed to handlers; may be repeated
    #[argh(option, short = 'e', long = "env")]
    env: Vec<String>,
}

/// Arguments for calling one action.
///
/// The `call` command makes one call and writes the result to stdout: JSON
/// results as one compact line, binary results as raw bytes unless `-o` is
/// given. Errors go to stderr with a non-zero exit code.
///
/// Arguments are sent in this order: the elements of `-a`, one argument per
/// `-f` file, then all `--batch` files as a single argument.
///
/// # Examples
///
/// ```bash
/// edgeaction call http://127.0.0.1:8787/echo -m GET -a '["search", 10]'
/// edgeaction call http://127.0.0.1:8787/echo --batch a.txt --batch b.txt | jq '.arguments'
/// ```
#[derive(FromArgs)]
#[argh(subcommand, name = "call")]
/// call an action
struct CallArgs {
    /// action URL, including its path
    #[argh(positional)]
    url: String,

    /// verb to use (default: POST)
    #[argh(option, short = 'm', default = "String::from(\"POST\")")]
    method: String,

    /// arguments as a JSON array (default: [])
    #[argh(option, short = 'a', long = "args", default = "String::from(\"[]\")")]
    args: String,

    /// file sent as its own argument; may be repeated
    #[argh(option, short = 'f', long = "file")]
    files: Vec<String>,

    /// file added to a single batch argument; may be repeated
    #[argh(option, long = "batch")]
    batch: Vec<String>,

    /// write binary results to this path instead of stdout
    #[argh(option, short = 'o', long = "output")]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli: Cli = argh::from_env();

    // call keeps stdout clean for piping
    if !matches!(cli.command, Commands::Call(_)) {
        let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    match cli.command {
        Commands::Serve(args) => run_serve(args).await,
        Commands::Call(args) => run_call(args).await,
    }
}

/// Executes the `serve` subcommand.
async fn run_serve(args: ServeArgs) -> Result<()> {
    let addr: SocketAddr = args
        .bind
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid bind address {}: {}", args.bind, e))?;

    let env = args
        .env
        .iter()
        .map(|pair| parse_env_pair(pair))
        .collect::<Result<Vec<_>>>()?;

    let mut config = ServerConfig::new()
        .with_require_action_header(args.require_action_header)
        .with_cors(args.cors)
        .with_env(env);
    if let Some(max_body_bytes) = args.max_body_bytes {
        config = config.with_max_body_bytes(max_body_bytes);
    }

    tracing::info!(
        bind = %addr,
        require_action_header = config.require_action_header,
        cors = config.cors,
        max_body_bytes = config.max_body_bytes,
        "Starting edgeaction demo server"
    );

    demo_server(config).run(addr).await?;
    Ok(())
}

/// Executes the `call` subcommand.
///
/// No tracing is initialized for this command so the output can be piped.
async fn run_call(args: CallArgs) -> Result<()> {
    validate_http_url(&args.url, "action URL")?;

    let url = Url::parse(&args.url)
        .map_err(|e| anyhow::anyhow!("Invalid action URL {}: {}", args.url, e))?;
    let method = Method::from_bytes(args.method.to_uppercase().as_bytes())
        .map_err(|e| anyhow::anyhow!("Invalid method {}: {}", args.method, e))?;
    let call_args = load_call_arguments(&args.args, &args.files, &args.batch).await?;

    let client = ActionClient::new(&args.url)?;
    let value = client.call(url.path(), method, call_args).await?;

    let mut stdout = std::io::stdout();
    write_value(value, args.output.as_deref(), &mut stdout).await
}
