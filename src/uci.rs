//! UCI front end.
//!
//! The engine runs on a worker thread fed by a command channel; the stdin
//! reader stays responsive and flips the shared stop/ponder flags
//! directly, which is how `stop` and `ponderhit` reach a running search.

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use crate::engine::{Engine, GoParams, ENGINE_AUTHOR, ENGINE_NAME, ENGINE_VERSION};
use crate::options::OptionKind;

#[derive(Debug)]
enum Command {
    Uci,
    IsReady,
    NewGame,
    Position {
        fen: Option<String>,
        moves: Vec<String>,
    },
    Go(GoParams),
    SetOption {
        name: String,
        value: Option<String>,
    },
    Perft(i32),
    Print,
    ShowStats,
    ResetStats,
    Quit,
}

fn parse_go(tokens: &[&str]) -> GoParams {
    fn num(token: Option<&&str>) -> u64 {
        token.and_then(|t| t.parse().ok()).unwrap_or(0)
    }

    let mut go = GoParams::default();
    let mut iter = tokens.iter();
    while let Some(&token) = iter.next() {
        match token {
            "depth" => go.depth = num(iter.next()) as i32,
            "movestogo" => go.movestogo = num(iter.next()) as i32,
            "movetime" => go.movetime = num(iter.next()),
            "wtime" => go.wtime = num(iter.next()),
            "winc" => go.winc = num(iter.next()),
            "btime" => go.btime = num(iter.next()),
            "binc" => go.binc = num(iter.next()),
            "infinite" => go.infinite = true,
            "ponder" => go.ponder = true,
            _ => {}
        }
    }
    go
}

fn parse_position(tokens: &[&str]) -> Command {
    let mut fen = None;
    let mut moves = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        match tokens[i] {
            "startpos" => i += 1,
            "fen" => {
                let end = tokens[i + 1..]
                    .iter()
                    .position(|t| *t == "moves")
                    .map_or(tokens.len(), |p| i + 1 + p);
                fen = Some(tokens[i + 1..end].join(" "));
                i = end;
            }
            "moves" => {
                moves = tokens[i + 1..].iter().map(|s| (*s).to_string()).collect();
                break;
            }
            _ => i += 1,
        }
    }
    Command::Position { fen, moves }
}

fn parse_setoption(tokens: &[&str]) -> Option<Command> {
    // setoption name <id> [value <x>]
    let name_at = tokens.iter().position(|t| *t == "name")? + 1;
    let value_at = tokens.iter().position(|t| *t == "value");
    let name_end = value_at.unwrap_or(tokens.len());
    let name = tokens[name_at..name_end].join(" ");
    let value = value_at.map(|v| tokens[v + 1..].join(" "));
    Some(Command::SetOption { name, value })
}

fn parse(line: &str) -> Option<Command> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    match tokens.first().copied()? {
        "uci" => Some(Command::Uci),
        "isready" => Some(Command::IsReady),
        "ucinewgame" => Some(Command::NewGame),
        "position" => Some(parse_position(&tokens[1..])),
        "go" => Some(Command::Go(parse_go(&tokens[1..]))),
        "setoption" => parse_setoption(&tokens[1..]),
        "perft" => Some(Command::Perft(
            tokens.get(1).and_then(|t| t.parse().ok()).unwrap_or(5),
        )),
        "print" | "d" => Some(Command::Print),
        "stats" => Some(Command::ShowStats),
        "resetstats" => Some(Command::ResetStats),
        "quit" => Some(Command::Quit),
        _ => None,
    }
}

fn print_options(engine: &Engine) {
    for opt in engine.options() {
        match opt.kind {
            OptionKind::Spin { default, min, max } => println!(
                "option name {} type spin default {default} min {min} max {max}",
                opt.name
            ),
            OptionKind::Check { default } => println!(
                "option name {} type check default {default}",
                opt.name
            ),
            OptionKind::Button => println!("option name {} type button", opt.name),
        }
    }
}

fn handle(engine: &mut Engine, cmd: Command) -> bool {
    match cmd {
        Command::Uci => {
            println!("id name {ENGINE_NAME} {ENGINE_VERSION}");
            println!("id author {ENGINE_AUTHOR}");
            print_options(engine);
            println!("uciok");
        }
        Command::IsReady => println!("readyok"),
        Command::NewGame => engine.clear_search_data(),
        Command::Position { fen, moves } => {
            let result = match fen {
                Some(fen) => engine.set_position(&fen),
                None => engine.set_position(
                    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
                ),
            };
            if let Err(err) = result {
                eprintln!("position rejected: {err}");
                return true;
            }
            for mv in moves {
                if let Err(err) = engine.make_move(&mv) {
                    eprintln!("move rejected: {err}");
                    break;
                }
            }
        }
        Command::Go(params) => {
            let result = engine.go(&params);
            match (result.best, result.ponder) {
                (Some(best), Some(ponder)) => println!("bestmove {best} ponder {ponder}"),
                (Some(best), None) => println!("bestmove {best}"),
                (None, _) => println!("bestmove 0000"),
            }
        }
        Command::SetOption { name, value } => {
            if !engine.set_option(&name, value.as_deref()) {
                eprintln!("unknown or invalid option: {name}");
            }
        }
        Command::Perft(depth) => {
            let count = engine.perft(depth);
            println!("perft {depth} = {count}");
        }
        Command::Print => print!("{}", engine.pretty()),
        Command::ShowStats => engine.show_stats_totals(),
        Command::ResetStats => engine.reset_stats_totals(),
        Command::Quit => {
            engine.quit();
            return false;
        }
    }
    true
}

/// Run the UCI session until `quit` or end of input.
pub fn run() {
    let stop = Arc::new(AtomicBool::new(false));
    let pondering = Arc::new(AtomicBool::new(false));
    let (tx, rx) = mpsc::channel::<Command>();

    let worker_stop = Arc::clone(&stop);
    let worker_ponder = Arc::clone(&pondering);
    let worker = thread::spawn(move || {
        let mut engine = Engine::with_flags(worker_stop, worker_ponder);
        engine.initialize();
        while let Ok(cmd) = rx.recv() {
            if !handle(&mut engine, cmd) {
                break;
            }
        }
    });

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let trimmed = line.trim();
        // stop and ponderhit act on the running search immediately; every
        // other command queues behind it.
        match trimmed {
            "stop" => {
                stop.store(true, Ordering::Relaxed);
                continue;
            }
            "ponderhit" => {
                pondering.store(false, Ordering::Relaxed);
                continue;
            }
            "quit" => {
                stop.store(true, Ordering::Relaxed);
                let _ = tx.send(Command::Quit);
                break;
            }
            _ => {}
        }
        if let Some(cmd) = parse(trimmed) {
            if tx.send(cmd).is_err() {
                break;
            }
        }
    }

    drop(tx);
    let _ = worker.join();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_go_tokens() {
        let Some(Command::Go(go)) =
            parse("go wtime 60000 btime 59000 winc 1000 binc 900 movestogo 20")
        else {
            panic!("go should parse");
        };
        assert_eq!(go.wtime, 60000);
        assert_eq!(go.btime, 59000);
        assert_eq!(go.winc, 1000);
        assert_eq!(go.binc, 900);
        assert_eq!(go.movestogo, 20);
        assert!(!go.infinite);
    }

    #[test]
    fn parses_position_with_fen_and_moves() {
        let Some(Command::Position { fen, moves }) = parse(
            "position fen 8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1 moves b4b1 h5h8",
        ) else {
            panic!("position should parse");
        };
        assert_eq!(fen.as_deref(), Some("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1"));
        assert_eq!(moves, vec!["b4b1".to_string(), "h5h8".to_string()]);
    }

    #[test]
    fn parses_setoption() {
        let Some(Command::SetOption { name, value }) =
            parse("setoption name Hash value 64")
        else {
            panic!("setoption should parse");
        };
        assert_eq!(name, "Hash");
        assert_eq!(value.as_deref(), Some("64"));
    }
}
