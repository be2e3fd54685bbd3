use std::time::Instant;

use rayon::prelude::*;

use magpie_core::{Position, perft};

const FULL_PERFT_ENV: &str = "FULL_PERFT";
const NODE_LIMIT: u64 = 10_000_000;

fn parse_epd_line(line: &str) -> Option<(String, Vec<(u8, u64)>)> {
    let mut parts = line.split(';');
    let fen = parts.next()?.trim();
    if fen.is_empty() {
        return None;
    }

    let mut depths = Vec::new();
    for part in parts {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let mut items = part.split_whitespace();
        let key = items.next().unwrap_or("");
        let val = items.next().unwrap_or("");
        if !key.starts_with('D') {
            continue;
        }
        let depth: u8 = key[1..]
            .parse()
            .unwrap_or_else(|_| panic!("bad depth token in EPD: {key}"));
        let expected: u64 = val
            .parse()
            .unwrap_or_else(|_| panic!("bad node count in EPD: {val}"));
        depths.push((depth, expected));
    }
    if depths.is_empty() {
        return None;
    }
    depths.sort_by_key(|(d, _)| *d);
    Some((fen.to_string(), depths))
}

#[test]
fn perft_suite() {
    let full = std::env::var(FULL_PERFT_ENV).is_ok();
    let data = include_str!("perft_suite.epd");
    let cases: Vec<(usize, String, Vec<(u8, u64)>)> = data
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            let line = line.trim();
            if line.is_empty() {
                return None;
            }
            parse_epd_line(line).map(|(fen, depths)| (idx, fen, depths))
        })
        .collect();

    cases.par_iter().for_each(|(idx, fen, depths)| {
        let pos = Position::from_fen(fen)
            .unwrap_or_else(|e| panic!("case {}: bad FEN '{fen}': {e}", idx + 1));
        let case_start = Instant::now();
        let mut total_nodes = 0u64;

        for (depth, expected) in depths {
            if !full && *expected > NODE_LIMIT {
                eprintln!(
                    "skipping depth {depth} for case {} ({expected} nodes) — set {FULL_PERFT_ENV}=1 to run all",
                    idx + 1
                );
                continue;
            }
            let got = perft(&pos, *depth);
            assert_eq!(
                got,
                *expected,
                "perft mismatch for FEN '{fen}' at depth {depth}"
            );
            total_nodes += got;
        }

        eprintln!(
            "case {}: {total_nodes} nodes in {:.2}s",
            idx + 1,
            case_start.elapsed().as_secs_f64()
        );
    });
}
