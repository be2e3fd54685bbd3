//! Line-oriented UCI-style driver around the search library.

use std::io::{self, BufRead, Write};
use std::time::{Duration, Instant};

use log::warn;
use magpie_core::{Position, apply_uci_moves, move_to_uci, perft, square_name};
use magpie_search::eval::MaterialEvaluator;
use magpie_search::{Evaluator, SearchConfig, SearchLimits, Searcher};

fn main() {
    env_logger::init();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    let mut config = SearchConfig::default();
    let mut pos = Position::startpos();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        let parts: Vec<&str> = line.trim().split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }

        match parts[0] {
            "uci" => {
                writeln!(stdout, "id name Magpie 0.1").ok();
                writeln!(stdout, "id author Magpie developers").ok();
                writeln!(
                    stdout,
                    "option name TreeMemory type spin default {} min 1 max 4096",
                    SearchConfig::default().tree_memory_mib
                )
                .ok();
                writeln!(
                    stdout,
                    "option name TTMemory type spin default {} min 1 max 4096",
                    SearchConfig::default().tt_memory_mib
                )
                .ok();
                writeln!(stdout, "uciok").ok();
                stdout.flush().ok();
            }
            "isready" => {
                writeln!(stdout, "readyok").ok();
                stdout.flush().ok();
            }
            "setoption" => set_option(&mut config, &parts[1..]),
            "ucinewgame" => {
                pos = Position::startpos();
            }
            "position" => {
                if let Err(err) = set_position(&mut pos, &parts[1..]) {
                    warn!("ignoring position command: {err}");
                }
            }
            "go" => go(&mut stdout, &pos, &config, &parts[1..]),
            "d" => debug_dump(&mut stdout, &pos),
            "quit" => break,
            _ => {
                // Unknown commands are ignored, as the protocol requires.
            }
        }
    }
}

fn set_option(config: &mut SearchConfig, args: &[&str]) {
    let name = args
        .iter()
        .position(|&a| a == "name")
        .and_then(|i| args.get(i + 1));
    let value = args
        .iter()
        .position(|&a| a == "value")
        .and_then(|i| args.get(i + 1));
    let (Some(&name), Some(&value)) = (name, value) else {
        return;
    };
    match name {
        "TreeMemory" => {
            if let Ok(mib) = value.parse::<usize>() {
                config.tree_memory_mib = mib.clamp(1, 4096);
            }
        }
        "TTMemory" => {
            if let Ok(mib) = value.parse::<usize>() {
                config.tt_memory_mib = mib.clamp(1, 4096);
            }
        }
        other => warn!("unknown option {other}"),
    }
}

fn set_position(pos: &mut Position, args: &[&str]) -> Result<(), String> {
    let moves_at = args.iter().position(|&a| a == "moves").unwrap_or(args.len());
    match args.first() {
        Some(&"startpos") => *pos = Position::startpos(),
        Some(&"fen") => {
            let fen = args[1..moves_at].join(" ");
            *pos = Position::from_fen(&fen).map_err(|e| e.to_string())?;
        }
        _ => return Err("expected startpos or fen".to_string()),
    }
    match args.get(moves_at + 1..) {
        Some(moves) => apply_uci_moves(pos, moves.iter().copied()),
        None => Ok(()),
    }
}

fn parse_limits(args: &[&str]) -> Option<SearchLimits> {
    let mut it = args.iter();
    while let Some(&arg) = it.next() {
        match arg {
            "nodes" => return it.next()?.parse().ok().map(SearchLimits::Nodes),
            "iterations" => return it.next()?.parse().ok().map(SearchLimits::Iterations),
            "movetime" => {
                let ms: u64 = it.next()?.parse().ok()?;
                return Some(SearchLimits::move_time(Duration::from_millis(ms)));
            }
            // No stop handling mid-search, so infinite is a long clock.
            "infinite" => return Some(SearchLimits::move_time(Duration::from_secs(3600))),
            _ => {}
        }
    }
    None
}

fn go(stdout: &mut io::Stdout, pos: &Position, config: &SearchConfig, args: &[&str]) {
    if let Some(i) = args.iter().position(|&a| a == "perft") {
        let depth: u8 = args
            .get(i + 1)
            .and_then(|d| d.parse().ok())
            .unwrap_or(5);
        let start = Instant::now();
        let nodes = perft(pos, depth);
        writeln!(
            stdout,
            "info string perft({depth}) = {nodes} in {:.2}s",
            start.elapsed().as_secs_f64()
        )
        .ok();
        stdout.flush().ok();
        return;
    }

    let limits =
        parse_limits(args).unwrap_or_else(|| SearchLimits::move_time(Duration::from_secs(5)));
    let mut searcher = Searcher::new(*pos, MaterialEvaluator::default(), config);
    let result = searcher.search_with_progress(limits, &mut |p| {
        let pv: Vec<String> = p.pv.iter().map(|&m| move_to_uci(m)).collect();
        println!(
            "info nodes {} score cp {} time {} string iterations {} pv {}",
            p.nodes,
            p.score_cp,
            p.elapsed_ms,
            p.iterations,
            pv.join(" ")
        );
        io::stdout().flush().ok();
    });

    let pv: Vec<String> = result.pv.iter().map(|&m| move_to_uci(m)).collect();
    writeln!(
        stdout,
        "info nodes {} score cp {} string iterations {} pv {}",
        result.nodes,
        result.score_cp,
        result.iterations,
        pv.join(" ")
    )
    .ok();
    match result.best_move {
        Some(mv) => writeln!(stdout, "bestmove {}", move_to_uci(mv)).ok(),
        None => writeln!(stdout, "bestmove 0000").ok(),
    };
    stdout.flush().ok();
}

/// Board, FEN, hash, static eval and the squares the opponent attacks.
fn debug_dump(stdout: &mut io::Stdout, pos: &Position) {
    for rank in (0..8u8).rev() {
        let mut row = String::new();
        for file in 0..8u8 {
            let sq = rank * 8 + file;
            let ch = match pos.piece_at(sq) {
                Some((color, kind)) => kind.fen_char(color),
                None => '.',
            };
            row.push(ch);
            row.push(' ');
        }
        writeln!(stdout, "{} {row}", rank + 1).ok();
    }
    writeln!(stdout, "  a b c d e f g h").ok();
    writeln!(stdout, "fen: {}", pos.to_fen()).ok();
    writeln!(stdout, "hash: {:016x}", pos.hash()).ok();

    let mut eval = MaterialEvaluator::default();
    eval.refresh(pos);
    writeln!(stdout, "static eval: {} cp", eval.evaluate(pos.side_to_move())).ok();

    let them = pos.side_to_move().opponent();
    let attacked: Vec<String> = (0..64u8)
        .filter(|&sq| pos.square_attacked_by(sq, them))
        .map(square_name)
        .collect();
    writeln!(stdout, "attacked by {them:?}: {}", attacked.join(" ")).ok();
    stdout.flush().ok();
}
