use std::time::Duration;

use clap::Parser;
use rect_packer::config::DEFAULT_MAX_ATTEMPTS;
use rect_packer::packer::{Cell, insert_all};
use rect_packer::render;
use rect_packer::{NamedRect, Packer, Packing, Rect, SearchConfig};
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "rect_packer",
    about = "Packs rectangles into the narrowest bounding box"
)]
struct Cli {
    /// Rectangles as [NAME=]WxH[:QTY] (e.g. door=80x200 30x40:3)
    #[arg(long = "rects", num_args = 1.., required = true)]
    rects: Vec<String>,

    /// Maximum number of height bounds to try
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    max_attempts: usize,

    /// Stop searching after this many milliseconds
    #[arg(long)]
    time_limit_ms: Option<u64>,

    /// Show ASCII layout of the best packing
    #[arg(long)]
    layout: bool,

    /// Print the cell map of the best packing, one label per unit square
    #[arg(long)]
    cells: bool,

    /// Print the cut table of the best packing
    #[arg(long)]
    cuts: bool,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,

    /// Log every attempt to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn parse_dimensions(s: &str) -> Result<Rect, String> {
    let parts: Vec<&str> = s.split('x').collect();
    if parts.len() != 2 {
        return Err(format!("invalid dimensions '{}', expected WxH", s));
    }
    let w = parts[0]
        .parse::<u32>()
        .map_err(|_| format!("invalid width in '{}'", s))?;
    let h = parts[1]
        .parse::<u32>()
        .map_err(|_| format!("invalid height in '{}'", s))?;
    if w == 0 || h == 0 {
        return Err(format!("dimensions must be non-zero in '{}'", s));
    }
    Ok(Rect::new(w, h))
}

/// Parses `[NAME=]WxH[:QTY]`. Unnamed rectangles are numbered from
/// `next_id`; a named one with a quantity becomes `NAME.1`, `NAME.2`, ...
fn parse_rects(s: &str, next_id: &mut usize) -> Result<Vec<NamedRect>, String> {
    let (name, rest) = match s.split_once('=') {
        Some((name, rest)) if !name.is_empty() => (Some(name), rest),
        Some(_) => return Err(format!("empty name in '{}'", s)),
        None => (None, s),
    };
    let (dims, qty) = match rest.split_once(':') {
        Some((dims, qty)) => {
            let qty = qty
                .parse::<u32>()
                .map_err(|_| format!("invalid quantity in '{}'", s))?;
            if qty == 0 {
                return Err(format!("quantity must be non-zero in '{}'", s));
            }
            (dims, qty)
        }
        None => (rest, 1),
    };
    let rect = parse_dimensions(dims)?;

    let mut rects = Vec::new();
    for i in 1..=qty {
        let name = match name {
            Some(name) if qty == 1 => name.to_string(),
            Some(name) => format!("{name}.{i}"),
            None => {
                *next_id += 1;
                next_id.to_string()
            }
        };
        rects.push(NamedRect { name, rect });
    }
    Ok(rects)
}

enum GridView {
    Cells,
    Cuts,
}

/// Rebuilds the grid behind `best` and prints it with rectangle names.
fn render_grid(rects: &[NamedRect], best: &Packing, view: GridView) -> String {
    let dims: Vec<Rect> = rects.iter().map(|r| r.rect).collect();
    let attempt = insert_all(&dims, best.height_bound);
    let label = |cell: &Cell| match cell {
        Cell::Empty => ".".to_string(),
        Cell::Boundary => "X".to_string(),
        Cell::Occupied(id) => rects[id.0].name.clone(),
    };
    let pad = rects.iter().map(|r| r.name.len()).max().unwrap_or(1) + 1;
    match view {
        GridView::Cells => {
            render::render_cells(&attempt.grid, best.width, best.height_bound, pad, label)
        }
        GridView::Cuts => render::render_cuts(&attempt.grid, pad.max(6), label),
    }
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let mut next_id = 0;
    let mut rects = Vec::new();
    for spec in &cli.rects {
        match parse_rects(spec, &mut next_id) {
            Ok(parsed) => rects.extend(parsed),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }

    let mut config = SearchConfig::new().with_max_attempts(cli.max_attempts);
    if let Some(ms) = cli.time_limit_ms {
        config = config.with_time_limit(Duration::from_millis(ms));
    }

    let packer = Packer::new(rects, config).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    let report = packer.solve();

    if cli.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let Some(best) = &report.best else {
        eprintln!("Error: {}", report.outcome);
        std::process::exit(1);
    };

    for p in &best.placements {
        println!("  {} {} @ ({}, {})", p.name, p.rect, p.x, p.y);
    }
    if cli.layout {
        print!("{}", render::render_packing(best));
    }
    if cli.cells {
        print!("{}", render_grid(packer.rects(), best, GridView::Cells));
    }
    if cli.cuts {
        print!("{}", render_grid(packer.rects(), best, GridView::Cuts));
    }
    println!();

    println!(
        "Summary: {}x{} after {} attempt{} ({}), {:.1}% waste",
        best.width,
        best.height,
        report.history.len(),
        if report.history.len() == 1 { "" } else { "s" },
        report.outcome,
        best.waste_percent(),
    );
}
