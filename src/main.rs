//! proxy-resolver - local invoker
//!
//! Resolves one proxy event against a few sample routes and prints the
//! response envelope. Handy for checking what a front door would receive:
//!
//! ```text
//! echo '{"httpMethod":"GET","path":"/hello/lessa"}' | proxy-resolver
//! proxy-resolver --proxy-type v2 --cors event.json
//! ```

use clap::Parser;
use proxy_resolver::prelude::*;
use serde_json::{json, Value};
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "proxy-resolver", about = "Resolve a proxy event against sample routes")]
struct Cli {
    /// Event JSON file; reads stdin when omitted or `-`.
    event: Option<PathBuf>,

    /// Front door that produced the event: rest, v2 or alb.
    #[arg(short, long, default_value = "rest")]
    proxy_type: ProxyType,

    /// Enable CORS with the default configuration.
    #[arg(long)]
    cors: bool,

    /// Include tracebacks in error bodies.
    #[arg(long)]
    debug: bool,

    /// Pretty-print the response.
    #[arg(long)]
    pretty: bool,
}

/// `GET /hello`
async fn hello(request: Request) -> HandlerResult {
    Ok(json!({
        "message": "hello",
        "source_ip": request.context.source_ip,
    })
    .into())
}

/// `GET /hello/<name>`
#[path_handler]
async fn greet(name: String) -> HandlerResult {
    Ok(json!({ "message": format!("hello {}", name) }).into())
}

/// `POST /echo`: returns the request body unchanged.
async fn echo(request: Request) -> HandlerResult {
    let body = request.decoded_body()?.unwrap_or_default();
    let content_type = request
        .get_header("content-type")
        .unwrap_or("application/octet-stream")
        .to_string();
    Ok(Response::binary(content_type, body).into())
}

/// `GET /fail`: always fails, to show error bodies.
async fn fail(_request: Request) -> HandlerResult {
    Err(HandlerError::with_code(503, "sample failure"))
}

fn build_resolver(cli: &Cli) -> Result<Resolver, ResolverError> {
    let mut config = ResolverConfig::from_env().proxy_type(cli.proxy_type);
    if cli.cors {
        config = config.cors(CorsConfig::default());
    }
    if cli.debug {
        config = config.debug(true);
    }

    let mut resolver = Resolver::new(config);
    resolver
        .get("/hello", RouteOptions::new(), hello)?
        .get(
            "/hello/<name>",
            RouteOptions::new().compress(true).cache_control("max-age=60"),
            GreetHandler,
        )?
        .post("/echo", RouteOptions::new(), echo)?
        .get("/fail", RouteOptions::new(), fail)?;
    Ok(resolver)
}

fn read_event(path: Option<&PathBuf>) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
    let text = match path {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)?,
        _ => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            text
        }
    };
    Ok(serde_json::from_str(&text)?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let resolver = build_resolver(&cli)?;
    tracing::info!(
        "Resolving {} event against {} routes",
        cli.proxy_type,
        resolver.routes().len()
    );

    let event = read_event(cli.event.as_ref())?;
    let ctx = InvocationContext::new("proxy-resolver-local", "local-invocation");
    let response = resolver.resolve(event, &ctx).await;

    let output = if cli.pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    println!("{}", output);
    Ok(())
}
