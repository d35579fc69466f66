use clap::{parser::ValueSource, ArgMatches, CommandFactory, FromArgMatches, Parser};
use matcher_http::{serve, ServeConfig};

#[derive(Parser)]
#[command(name = "resume-matcher", version, about = "Resume and job description matching server")]
struct Cli {
    #[arg(long, env = "MATCHER_BIND_ADDR")]
    bind_addr: Option<String>,
    #[arg(long, env = "MATCHER_PORT")]
    port: Option<u16>,

    /// Vector index service base URL. Overrides ENDEE_HOST.
    #[arg(long)]
    endee_host: Option<String>,

    /// Index to provision and query. Overrides ENDEE_INDEX_NAME.
    #[arg(long)]
    index_name: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cmd = Cli::command();
    let matches = cmd.get_matches();
    let cli = Cli::from_arg_matches(&matches)?;

    let bind_addr = resolve_bind_addr(&cli, &matches);
    let mut config = ServeConfig::from_env(bind_addr);
    apply_overrides(&cli, &mut config);
    serve(config).await
}

fn apply_overrides(cli: &Cli, config: &mut ServeConfig) {
    if let Some(host) = cli.endee_host.as_deref().filter(|h| !h.is_empty()) {
        config.settings.client.host = host.to_string();
    }
    if let Some(name) = cli.index_name.as_deref().filter(|n| !n.is_empty()) {
        config.settings.index.name = name.to_string();
    }
}

/// Command-line flags beat environment values; `--bind-addr` beats `--port`.
fn resolve_bind_addr(cli: &Cli, matches: &ArgMatches) -> String {
    let from_command_line = |arg: &str| matches.value_source(arg) == Some(ValueSource::CommandLine);

    if from_command_line("bind_addr") {
        if let Some(bind_addr) = &cli.bind_addr {
            return bind_addr.clone();
        }
    }
    if from_command_line("port") {
        if let Some(port) = cli.port {
            return format!("127.0.0.1:{port}");
        }
    }
    if let Some(bind_addr) = &cli.bind_addr {
        return bind_addr.clone();
    }
    if let Some(port) = cli.port {
        return format!("127.0.0.1:{port}");
    }
    matcher_http::server::DEFAULT_BIND_ADDR.to_string()
}
