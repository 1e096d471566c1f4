//! A simple CLI tool for talking to an EMS server.
//! Sends one `command[;payload]` request and prints the reply.

use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};

use ems_server::client::Client;

const PROGRAM_NAME: &str = "ems-cli";

const ABOUT_TEXT: &str = "Send a single request to an EMS server and print the reply.

EXIT CODES:
     0: The server replied successfully.
   255: The server replied with an ERROR.
     1: Could not reach the server.";

const COMMAND: &str = "COMMAND";
const PAYLOAD: &str = "PAYLOAD";
const SERVER: &str = "server";
const DEFAULT_SERVER: &str = "127.0.0.1:12346";
const TIMEOUT: &str = "timeout";

/// Construct the CLI configuration.
fn cli() -> Command {
    // Make the build dirty when the toml changes.
    include_str!("../Cargo.toml");

    clap::command!(PROGRAM_NAME)
        .about(ABOUT_TEXT)
        .arg(
            Arg::new(COMMAND)
                .help("Command name, e.g. `getElectionStatus`")
                .action(ArgAction::Set)
                .required(true),
        )
        .arg(
            Arg::new(PAYLOAD)
                .help("Comma-separated payload, e.g. `3520212345671,NA-1,C1`")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new(SERVER)
                .long(SERVER)
                .short('s')
                .help("Server address")
                .action(ArgAction::Set)
                .default_value(DEFAULT_SERVER),
        )
        .arg(
            Arg::new(TIMEOUT)
                .long(TIMEOUT)
                .short('t')
                .help("Seconds to wait for a reply")
                .value_parser(value_parser!(u64))
                .action(ArgAction::Set)
                .default_value("5"),
        )
}

/// Errors that this program may produce.
#[derive(Debug)]
enum Error {
    /// The server address could not be resolved.
    Address(String),
    /// The request failed in transit.
    Request(ems_server::error::Error),
}

fn resolve(server: &str) -> Result<SocketAddr, Error> {
    server
        .to_socket_addrs()
        .map_err(|err| Error::Address(format!("{server}: {err}")))?
        .next()
        .ok_or_else(|| Error::Address(format!("{server}: no addresses")))
}

async fn send(args: &ArgMatches) -> Result<String, Error> {
    // Arguments with defaults or marked required are guaranteed to be present.
    let command: &String = args.get_one(COMMAND).unwrap();
    let payload = args.get_one::<String>(PAYLOAD).map_or("", String::as_str);
    let server: &String = args.get_one(SERVER).unwrap();
    let timeout = *args.get_one::<u64>(TIMEOUT).unwrap();

    let client = Client::new(resolve(server)?).with_timeout(Duration::from_secs(timeout));
    client.send(command, payload).await.map_err(Error::Request)
}

/// Send the request, report the result, and return the exit code.
fn run(args: &ArgMatches) -> u8 {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("Failed to start runtime: {err}");
            return 1;
        }
    };
    match runtime.block_on(send(args)) {
        Ok(reply) => {
            println!("{reply}");
            if reply.starts_with("ERROR") {
                255
            } else {
                0
            }
        }
        Err(Error::Address(msg)) => {
            eprintln!("Bad server address: {msg}");
            1
        }
        Err(Error::Request(err)) => {
            eprintln!("Request failed: {err}");
            1
        }
    }
}

fn main() {
    let args = cli().get_matches();
    let exit_code = run(&args);
    std::process::exit(exit_code.into())
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use super::*;

    fn matches(args: &[&str]) -> ArgMatches {
        cli().try_get_matches_from(args).unwrap()
    }

    #[test]
    fn cli_is_valid() {
        cli().debug_assert();
    }

    #[test]
    fn unreachable_server() {
        // Bind then drop to find a port with nothing listening.
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let server = format!("127.0.0.1:{port}");
        assert_eq!(run(&matches(&["ems-cli", "ping", "--server", &server])), 1);
        assert_eq!(run(&matches(&["ems-cli", "ping", "--server", "not an address"])), 1);
    }

    #[test]
    fn exit_codes_follow_reply() {
        // This test actually enters backend code, so enable logging.
        log4rs_test_utils::test_logging::init_logging_once_for(["ems_server"], None, None);

        let runtime = tokio::runtime::Runtime::new().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let config = ems_server::Config::with_database(dir.path().join("ems.sqlite3"));
        let server = runtime.block_on(ems_server::build(config)).unwrap();
        let addr = server.local_addr().unwrap().to_string();
        runtime.spawn(server.run());

        assert_eq!(run(&matches(&["ems-cli", "ping", "-s", &addr])), 0);
        assert_eq!(run(&matches(&["ems-cli", "getElectionStatus", "-s", &addr])), 0);
        assert_eq!(run(&matches(&["ems-cli", "castVote", "a,b", "-s", &addr])), 255);
        assert_eq!(run(&matches(&["ems-cli", "bogus", "-s", &addr, "-t", "2"])), 255);
    }
}
