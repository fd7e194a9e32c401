use std::fmt::Write as _;

use crate::retro::Analysis;

/// Plain-text summary: root line plus one row per depth.
pub fn render(analysis: &Analysis) -> String {
    let mut out = String::new();

    match &analysis.root {
        Some(root) => {
            let _ = writeln!(
                out,
                "root {}: {} -> {} safe moves{}",
                root.key,
                root.initial_moves,
                root.current_moves,
                if root.dead_end {
                    " (dead end)"
                } else if root.terminal_loss {
                    " (terminal loss)"
                } else {
                    ""
                }
            );
        }
        None => out.push_str("root not in the explored set\n"),
    }
    let _ = writeln!(
        out,
        "terminal losses: {}, dead ends: {}, propagation depth: {}",
        analysis.terminal_losses.len(),
        analysis.dead_ends.len(),
        analysis
            .propagation_depth
            .map_or_else(|| "none".to_string(), |d| d.to_string())
    );

    let _ = writeln!(
        out,
        "\n{:<6} {:>10} {:>12} {:>12} {:>7} {:>6} {:>10} {:>10}  verdict",
        "depth", "positions", "moves", "safe moves", "losses", "dead", "barrier", "refined"
    );
    for s in &analysis.depth_stats {
        let _ = writeln!(
            out,
            "{:<6} {:>10} {:>12} {:>12} {:>7} {:>6} {:>10} {:>10}  {:?}",
            s.depth,
            s.positions,
            s.initial_moves,
            s.current_moves,
            s.terminal_losses,
            s.dead_ends,
            s.barrier_ratio.to_string(),
            s.refined_ratio.to_string(),
            s.refined_ratio.verdict(),
        );
    }
    out
}
