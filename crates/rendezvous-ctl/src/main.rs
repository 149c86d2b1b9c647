//! rendezvous-ctl: command-line interface for the rendezvous daemon.

mod cmd;

use anyhow::{Context, Result};

use cmd::http::base_url;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;

fn print_usage() {
    println!("Usage: rendezvous-ctl [--host <host>] [--port <port>] <command>");
    println!();
    println!("Commands:");
    println!("  status                 Show daemon status");
    println!("  register [<port>] [--protocol <tls|tcp|udp>]");
    println!("                         Register this machine, optionally declaring a service");
    println!("  peers [filters]        List live peers");
    println!();
    println!("Peer filters:");
    println!("  --since <t>            Only peers seen continuously since server time t");
    println!("  --prefer <4|6>         Family listed first (default: 4)");
    println!("  --filter-port <port>   Only peers declaring this port");
    println!("  --subnet4 <cidr>       Restrict IPv4 peers to a block");
    println!("  --subnet6 <cidr>       Restrict IPv6 peers to a block");
    println!();
    println!("Options:");
    println!("  --host <host>   Daemon address (default: {})", DEFAULT_HOST);
    println!("  --port <port>   API port (default: {})", DEFAULT_PORT);
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    // Global options may appear anywhere; everything else is the command.
    let mut host = DEFAULT_HOST.to_string();
    let mut port = DEFAULT_PORT;
    let mut remaining: Vec<&str> = Vec::new();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--host" => {
                i += 1;
                host = args.get(i).context("--host requires a value")?.clone();
            }
            "--port" => {
                i += 1;
                port = args
                    .get(i)
                    .context("--port requires a value")?
                    .parse()
                    .context("--port must be a number")?;
            }
            _ => remaining.push(&args[i]),
        }
        i += 1;
    }

    let base = base_url(&host, port);

    match remaining.as_slice() {
        ["status"] | []                => cmd::status::cmd_status(&base).await,
        ["register", rest @ ..]        => cmd::register::cmd_register(&base, rest).await,
        ["peers", filters @ ..]        => cmd::peers::cmd_peers(&base, filters).await,
        ["help"] | ["--help"] | ["-h"] => { print_usage(); Ok(()) }
        other => {
            eprintln!("Unknown command: {}", other.join(" "));
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}
