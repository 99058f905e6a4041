//! CLI client for the `explorerd` daemon.
//!
//! Examples:
//!   explorer-cli list
//!   explorer-cli open motion
//!   explorer-cli act '{"kind":"set_speed","speed":5}'
//!   explorer-cli act '{"kind":"start"}'
//!   explorer-cli status
//!   explorer-cli eval
//!   explorer-cli next
//!
//! `act` takes the action body for the open mission; a full
//! `{"mission":..,"action":..}` object is accepted too.
//!
//! By default it talks to 127.0.0.1:9877; override with `--addr host:port`.

use explorer_missions::catalog::UnknownMission;
use explorer_missions::MissionId;
use serde::Deserialize;
use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;
use std::process;
use std::time::Duration;

const DEFAULT_ADDR: &str = "127.0.0.1:9877";

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Response {
    Catalog {
        missions: Vec<CatalogEntry>,
        completed: usize,
        total: usize,
    },
    State(Value),
    Success {
        message: String,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    id: String,
    title: String,
    icon: String,
    description: String,
    completed: bool,
}

fn usage() -> ! {
    eprintln!("explorer-cli (talks to explorerd @ {DEFAULT_ADDR} by default)");
    eprintln!("Usage: explorer-cli [--addr host:port] <command> [args]\n");
    eprintln!("Commands:");
    eprintln!("  list                 Show missions and completion marks");
    eprintln!("  status               Show the active mission screen");
    eprintln!("  open <mission>       {}", mission_names());
    eprintln!("  back                 Leave the active mission");
    eprintln!("  act <json>           Send a control action to the active mission");
    eprintln!("  eval                 Check the experiment");
    eprintln!("  next                 Go to the next level");
    eprintln!("  shutdown             Stop the daemon");
    process::exit(1);
}

fn mission_names() -> String {
    MissionId::all()
        .iter()
        .map(|id| id.label())
        .collect::<Vec<_>>()
        .join("|")
}

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let mut addr = DEFAULT_ADDR.to_string();
    if args.len() >= 2 && args[0] == "--addr" {
        addr = args[1].clone();
        args.drain(0..2);
    }
    if args.is_empty() {
        usage();
    }
    (addr, args)
}

fn send_request(addr: &str, req: &Value) -> Result<Response, String> {
    let mut stream = TcpStream::connect(addr).map_err(|e| format!("connect: {e}"))?;
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .map_err(|e| format!("set_read_timeout: {e}"))?;
    let mut reader = BufReader::new(stream.try_clone().map_err(|e| format!("clone: {e}"))?);

    let line = serde_json::to_string(req).map_err(|e| format!("serialize: {e}"))?;
    stream
        .write_all(line.as_bytes())
        .and_then(|_| stream.write_all(b"\n"))
        .map_err(|e| format!("send: {e}"))?;

    let mut resp_line = String::new();
    reader
        .read_line(&mut resp_line)
        .map_err(|e| format!("recv: {e}"))?;
    serde_json::from_str(&resp_line).map_err(|e| format!("parse response: {e}"))
}

/// Current mission id, asked from the daemon so `act` can take a bare action.
fn active_mission(addr: &str) -> Result<String, String> {
    match send_request(addr, &json!({ "type": "GetState" }))? {
        Response::State(s) => s["active"]["mission"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| "no mission is open".to_string()),
        Response::Error { message } => Err(message),
        other => Err(format!("unexpected response: {other:?}")),
    }
}

fn action_request(addr: &str, raw: &str) -> Result<Value, String> {
    let body: Value = serde_json::from_str(raw).map_err(|e| format!("action json: {e}"))?;
    let action = if body.get("mission").is_some() {
        body
    } else {
        json!({ "mission": active_mission(addr)?, "action": body })
    };
    Ok(json!({ "type": "Act", "action": action }))
}

fn print_catalog(missions: &[CatalogEntry], completed: usize, total: usize) {
    println!("completed {completed}/{total}");
    for m in missions {
        println!(
            "{} {} {:<10} {:<24} {}",
            if m.completed { "✓" } else { " " },
            m.icon,
            m.id,
            m.title,
            m.description
        );
    }
}

fn print_state(s: &Value) {
    let completed = s["completed"].as_array().map_or(0, Vec::len);
    println!(
        "completed={}/{} ticking={} tick_ms={}",
        completed, s["total"], s["ticking"], s["tick_ms"]
    );
    let active = &s["active"];
    if active.is_null() {
        println!("no mission open");
        return;
    }
    println!(
        "mission={} level={} running={} complete={} can_advance={}",
        active["mission"].as_str().unwrap_or("?"),
        active["level"],
        active["running"],
        active["complete"],
        active["can_advance"],
    );
    if let (Some(all), Some(recent)) = (s["pass_rate"].as_f64(), s["recent_rate"].as_f64()) {
        println!(
            "checks={} passed={:.0}% recent={:.0}%",
            active["stats"]["evaluations"],
            all * 100.0,
            recent * 100.0
        );
    }
    println!("state:   {}", active["state"]);
    println!("readout: {}", active["readout"]);
    if let Some(text) = active["feedback"]["text"].as_str() {
        let mark = if active["feedback"]["passed"] == Value::Bool(true) {
            "pass"
        } else {
            "hint"
        };
        println!("feedback ({mark}):\n{text}");
    }
}

fn main() {
    let (addr, args) = parse_args();
    let cmd = &args[0];

    let make_error = |msg: &str| -> ! {
        eprintln!("{}", msg);
        process::exit(1);
    };

    let req = match cmd.as_str() {
        "list" => json!({ "type": "Catalog" }),
        "status" => json!({ "type": "GetState" }),
        "open" => {
            if args.len() < 2 {
                usage();
            }
            let mission: MissionId = args[1].parse().unwrap_or_else(|e: UnknownMission| {
                make_error(&format!("{e}; expected one of {}", mission_names()))
            });
            json!({ "type": "Open", "mission": mission })
        }
        "back" => json!({ "type": "Back" }),
        "act" => {
            if args.len() < 2 {
                usage();
            }
            action_request(&addr, &args[1]).unwrap_or_else(|e| make_error(&e))
        }
        "eval" => json!({ "type": "Evaluate" }),
        "next" => json!({ "type": "NextLevel" }),
        "shutdown" => json!({ "type": "Shutdown" }),
        _ => usage(),
    };

    match send_request(&addr, &req) {
        Ok(Response::Catalog {
            missions,
            completed,
            total,
        }) => print_catalog(&missions, completed, total),
        Ok(Response::State(s)) => print_state(&s),
        Ok(Response::Success { message }) => println!("{message}"),
        Ok(Response::Error { message }) => {
            eprintln!("Error: {message}");
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Failed: {e}");
            process::exit(1);
        }
    }
}
