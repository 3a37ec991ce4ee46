use crate::cut_grid::CutGrid;
use crate::types::Packing;

const MAX_WIDTH: f64 = 80.0;
const MAX_HEIGHT: f64 = 40.0;

pub fn render_packing(packing: &Packing) -> String {
    if packing.width == 0 || packing.height == 0 {
        return String::new();
    }
    let scale = f64::min(
        MAX_WIDTH / packing.width as f64,
        MAX_HEIGHT / packing.height as f64,
    );
    let grid_w = (packing.width as f64 * scale).round() as usize;
    let grid_h = (packing.height as f64 * scale).round() as usize;

    if grid_w == 0 || grid_h == 0 {
        return String::new();
    }

    let mut canvas = vec![vec![' '; grid_w + 1]; grid_h + 1];

    // Bounding box first
    draw_rect(&mut canvas, 0, 0, grid_w, grid_h);

    for p in &packing.placements {
        let sx = (p.x as f64 * scale).round() as usize;
        let sy = (p.y as f64 * scale).round() as usize;
        let sw = (p.rect.w as f64 * scale).round() as usize;
        let sh = (p.rect.h as f64 * scale).round() as usize;

        if sw == 0 || sh == 0 {
            continue;
        }

        draw_rect(&mut canvas, sx, sy, sw, sh);

        let label: Vec<char> = p.name.chars().collect();
        if sw > 1 && sh > 1 {
            let cx = sx + sw / 2;
            let cy = sy + sh / 2;
            let start_x = cx.saturating_sub(label.len() / 2);

            for (i, &ch) in label.iter().enumerate() {
                let x = start_x + i;
                if x > sx && x < sx + sw {
                    canvas[cy][x] = ch;
                }
            }
        }
    }

    let mut result = String::new();
    for row in &canvas {
        let line: String = row.iter().collect();
        result.push_str(line.trim_end());
        result.push('\n');
    }
    result
}

fn edge(current: char, crossing: char, own: char) -> char {
    if current == crossing || current == '+' {
        '+'
    } else {
        own
    }
}

#[allow(clippy::needless_range_loop)]
fn draw_rect(canvas: &mut [Vec<char>], x: usize, y: usize, w: usize, h: usize) {
    let rows = canvas.len();
    let cols = if rows > 0 { canvas[0].len() } else { return };

    for i in x..=x + w {
        if i >= cols {
            break;
        }
        for j in [y, y + h] {
            if j < rows {
                canvas[j][i] = edge(canvas[j][i], '|', '-');
            }
        }
    }

    for j in y..=y + h {
        if j >= rows {
            break;
        }
        for i in [x, x + w] {
            if i < cols {
                canvas[j][i] = edge(canvas[j][i], '-', '|');
            }
        }
    }

    for cx in [x, x + w] {
        for cy in [y, y + h] {
            if cy < rows && cx < cols {
                canvas[cy][cx] = '+';
            }
        }
    }
}

/// Prints the value at each unit point of `[0, width) × [0, height)`, one
/// row per line, each label right-aligned in `pad` columns.
pub fn render_cells<T, F>(
    grid: &CutGrid<T>,
    width: u32,
    height: u32,
    pad: usize,
    label: F,
) -> String
where
    T: Clone,
    F: Fn(&T) -> String,
{
    let mut result = String::new();
    for y in 0..height {
        for x in 0..width {
            result.push_str(&format!("{:>pad$}", label(grid.get_value(x, y))));
        }
        result.push('\n');
    }
    result
}

/// Lists the cuts on both axes with the cell value at each intersection.
pub fn render_cuts<T, F>(grid: &CutGrid<T>, pad: usize, label: F) -> String
where
    T: Clone,
    F: Fn(&T) -> String,
{
    let mut result = format!("{:pad$}", "");
    for x in grid.vertical_cuts() {
        result.push_str(&format!("{x:>pad$}"));
    }
    result.push('\n');
    for &y in grid.horizontal_cuts() {
        result.push_str(&format!("{y:>pad$}"));
        for &x in grid.vertical_cuts() {
            result.push_str(&format!("{:>pad$}", label(grid.get_value(x, y))));
        }
        result.push('\n');
    }
    result
}
