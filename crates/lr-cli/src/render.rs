//! Plain-text rendering of grids, results and status

use lr_slot::{DisplayState, Grid, SessionStats, SpinResult, SymbolCatalog, SymbolId};

fn cell(catalog: &SymbolCatalog, id: SymbolId) -> String {
    match catalog.get(id) {
        Some(symbol) if !symbol.glyph.is_empty() => symbol.glyph.clone(),
        Some(symbol) => symbol.key.clone(),
        None => id.to_string(),
    }
}

/// Grid as rows of cells, winning cells bracketed
pub fn grid(catalog: &SymbolCatalog, grid: &Grid, highlight: &[(usize, usize)]) -> String {
    let rows = grid.first().map_or(0, Vec::len);
    let mut out = String::new();

    for row in 0..rows {
        let line: Vec<String> = grid
            .iter()
            .enumerate()
            .map(|(reel, column)| {
                let text = column.get(row).map_or_else(|| "?".to_string(), |&id| cell(catalog, id));
                if highlight.contains(&(reel, row)) {
                    format!("[{text}]")
                } else {
                    format!(" {text} ")
                }
            })
            .collect();
        out.push_str(&line.join(" "));
        out.push('\n');
    }
    out
}

pub fn spin_result(catalog: &SymbolCatalog, result: &SpinResult) -> String {
    let cells: Vec<(usize, usize)> = result
        .hits
        .iter()
        .flat_map(|hit| hit.cells.iter().copied())
        .collect();

    let mut out = format!("{}  bet {}\n", result.spin_id, result.bet);
    out.push_str(&grid(catalog, &result.grid, &cells));

    for hit in &result.hits {
        out.push_str(&format!(
            "  line {}: {} x{} -> {} (x{})\n",
            hit.line_index + 1,
            cell(catalog, hit.symbol),
            hit.run_length,
            hit.win,
            hit.multiplier
        ));
    }
    if result.is_win() {
        out.push_str(&format!("  WIN {}  credits {}\n", result.total_win, result.credits_after));
    } else {
        out.push_str(&format!("  no win  credits {}\n", result.credits_after));
    }
    out
}

pub fn status(state: &DisplayState, degraded: bool) -> String {
    let mut out = format!(
        "credits {}  last win {}  RTP {}  seed {}\n",
        state.credits,
        state.last_win,
        state.rtp_label(),
        state.seed
    );
    if degraded {
        out.push_str("(persistence unavailable, state is in memory only)\n");
    }
    out
}

pub fn stats(stats: &SessionStats) -> String {
    let percent = |v: Option<f64>| v.map_or_else(|| "–".to_string(), |r| format!("{:.2}%", r * 100.0));
    format!(
        "spins {}  wins {}  hit rate {}\nwagered {}  paid {}  RTP {}  biggest win {}\n",
        stats.spins,
        stats.wins,
        percent(stats.hit_rate()),
        stats.total_wagered,
        stats.total_paid,
        percent(stats.return_to_player()),
        stats.biggest_win
    )
}
