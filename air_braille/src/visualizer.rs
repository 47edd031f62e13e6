//! Software-rendered debug view using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────┬──────────────┐
//! │                                          │  CELL        │
//! │   landmarks + bones per hand             │   1 ● ○ 4    │
//! │   thumb palm circle                      │   2 ○ ● 5    │
//! │   stretched fingertips highlighted       │   3 ○ ○ 6    │
//! │                                          │   7 ○ ○ 8    │
//! │                                          │   0 ●   ● 9  │
//! │                                          │  [visible]   │
//! ├──────────────────────────────────────────┴──────────────┤
//! │  status bar                                             │
//! └─────────────────────────────────────────────────────────┘
//! ```

use anyhow::{anyhow, Result};
use braille_cell::{
    BrailleCode, DetectionFrame, EngineConfig, FingerClassifier, FingerKind, Hand, Handedness,
    Phase, SlotMap, LANDMARK_COUNT,
};
use minifb::{Key, KeyRepeat, Window, WindowOptions};

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:     usize = 720;
pub const WIN_H:     usize = 520;
const VIEW:          usize = 480;
const PANEL_X:       usize = VIEW;
const PANEL_W:       usize = WIN_W - VIEW;
const STATUS_Y:      usize = VIEW;
const DOT_R:         usize = 14;
const DOT_PITCH:     usize = 48;
const BG_COLOR:      u32   = 0xFF1A1A2E;
const PANEL_BG:      u32   = 0xFF16213E;
const TEXT_BG:       u32   = 0xFF0F3460;
const LEFT_COLOR:    u32   = 0xFF66AAFF;
const RIGHT_COLOR:   u32   = 0xFFFFAA66;
const STRETCH_COLOR: u32   = 0xFF44FF88;
const DOT_ON:        u32   = 0xFFFFD700;
const DOT_OFF:       u32   = 0xFF445577;
/// Off-view slack kept when mapping coordinates to pixels.
const MARGIN:        f32   = 64.0;

/// Normalised coordinate to a view pixel, clamped near the window so
/// wild detector output cannot blow up line drawing.
fn to_pixel(v: f32) -> isize {
    (v * VIEW as f32).clamp(-MARGIN, VIEW as f32 + MARGIN) as isize
}

/// (column, row) of each digit in the cell panel.
fn digit_position(digit: u8) -> (usize, usize) {
    match digit {
        1 => (0, 0), 2 => (0, 1), 3 => (0, 2), 7 => (0, 3),
        4 => (1, 0), 5 => (1, 1), 6 => (1, 2), 8 => (1, 3),
        0 => (0, 4),
        _ => (1, 4),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window:     Window,
    buf:        Vec<u32>,
    classifier: FingerClassifier,
    slots:      SlotMap,
}

impl Visualizer {
    pub fn new(config: EngineConfig) -> Result<Self> {
        let mut window = Window::new(
            "AirBraille - landmark debug view",
            WIN_W, WIN_H,
            WindowOptions { resize: false, ..WindowOptions::default() },
        )
        .map_err(|e| anyhow!("opening debug window: {}", e))?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16)));

        Ok(Visualizer {
            window,
            buf:        vec![BG_COLOR; WIN_W * WIN_H],
            classifier: config.classifier(),
            slots:      config.slots,
        })
    }

    /// Returns false once the window closes or `Q` / `Esc` is pressed.
    pub fn poll_input(&mut self) -> bool {
        if !self.window.is_open() { return false; }
        let quit = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);
        !(quit(Key::Q) || quit(Key::Escape))
    }

    /// Render one frame.
    pub fn render(
        &mut self,
        frame:   &DetectionFrame,
        code:    Option<BrailleCode>,
        visible: bool,
        phase:   Phase,
        status:  &str,
    ) {
        self.buf.fill(BG_COLOR);

        for detected in &frame.hands {
            // Hands that break the landmark contract are not drawn.
            if let Ok(hand) = Hand::from_detection(detected) {
                self.draw_hand(&hand);
            }
        }

        self.fill_rect(PANEL_X, 0, PANEL_W, STATUS_Y, PANEL_BG);
        self.draw_cell(code.unwrap_or(BrailleCode::EMPTY));
        let (label, color) = if visible { ("hands ok", STRETCH_COLOR) } else { ("no hands", 0xFFFF5555) };
        self.fill_rect(PANEL_X + 20, 330, 10, 10, color);
        self.draw_label(label, PANEL_X + 36, 332, 0xFFEEEEEE);
        self.draw_label(&format!("vote: {}", phase.name()), PANEL_X + 20, 350, 0xFF888888);

        self.fill_rect(0, STATUS_Y, WIN_W, WIN_H - STATUS_Y, TEXT_BG);
        self.draw_label(status, 10, STATUS_Y + 10, 0xFFEEEEEE);
        self.draw_label("q/esc=quit", 10, WIN_H - 14, 0xFF888888);

        self.window.update_with_buffer(&self.buf, WIN_W, WIN_H).ok();
    }

    // ── Hand ──────────────────────────────────────────────────────────────

    fn draw_hand(&mut self, hand: &Hand) {
        let color = match hand.handedness {
            Handedness::Left  => LEFT_COLOR,
            Handedness::Right => RIGHT_COLOR,
        };
        let px = |i: usize| {
            let l = &hand.landmarks()[i];
            (to_pixel(l.x), to_pixel(l.y))
        };

        // Bones: wrist to each finger base, then along the finger.
        for kind in FingerKind::ALL {
            let base = kind.first_landmark();
            self.draw_line(px(0), px(base), color);
            for j in base..base + 3 {
                self.draw_line(px(j), px(j + 1), color);
            }
        }
        // Knuckle line index → pinky.
        for k in [5, 9, 13] {
            self.draw_line(px(k), px(k + 4), color);
        }

        for i in 0..LANDMARK_COUNT {
            let (x, y) = px(i);
            self.fill_square(x, y, 2, color);
        }

        let states = hand.evaluate(&self.classifier);
        for (kind, stretched) in states.iter() {
            if stretched {
                let (x, y) = px(hand.finger(kind).tip().kind.index());
                self.fill_square(x, y, 4, STRETCH_COLOR);
            }
        }

        let circle = hand.palm().circle(1.0);
        let radius = (circle.radius * VIEW as f32).min(VIEW as f32);
        self.draw_circle(to_pixel(circle.center.x), to_pixel(circle.center.y), radius, color);

        let (wx, wy) = px(0);
        if wx >= 0 && wy >= 0 {
            let label = format!("{} {}", hand.handedness.label(), states.count_stretched());
            self.draw_label(&label, wx as usize + 6, wy as usize + 6, color);
        }
    }

    // ── Cell panel ────────────────────────────────────────────────────────

    fn draw_cell(&mut self, code: BrailleCode) {
        self.draw_label("CELL", PANEL_X + 20, 14, DOT_ON);
        self.draw_label(&code.to_string(), PANEL_X + 60, 14, 0xFFEEEEEE);

        for digit in 0..=9u8 {
            let (col, row) = digit_position(digit);
            let cx = PANEL_X + 70 + col * (DOT_PITCH + if row == 4 { 20 } else { 0 });
            let cy = 60 + row * DOT_PITCH + if row == 4 { 12 } else { 0 };
            let on = code.contains(digit);
            self.fill_disc(cx, cy, DOT_R, if on { DOT_ON } else { DOT_OFF });

            let lx = if col == 0 { cx - DOT_R - 12 } else { cx + DOT_R + 6 };
            self.draw_label(&digit.to_string(), lx, cy - 2, 0xFFAAAAAA);
        }

        // Reserved control digits.
        let thumbs = format!("thumbs {} {}", self.slots.left_thumb(), self.slots.right_thumb());
        self.draw_label(&thumbs, PANEL_X + 20, 300, 0xFF888888);
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(WIN_H) {
            for col in x..(x + w).min(WIN_W) {
                self.buf[row * WIN_W + col] = color;
            }
        }
    }

    fn set_pixel(&mut self, x: isize, y: isize, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < WIN_W && (y as usize) < WIN_H {
            self.buf[y as usize * WIN_W + x as usize] = color;
        }
    }

    fn fill_square(&mut self, cx: isize, cy: isize, r: isize, color: u32) {
        for y in cy - r..=cy + r {
            for x in cx - r..=cx + r {
                self.set_pixel(x, y, color);
            }
        }
    }

    fn fill_disc(&mut self, cx: usize, cy: usize, r: usize, color: u32) {
        let r2 = (r * r) as isize;
        for dy in -(r as isize)..=r as isize {
            for dx in -(r as isize)..=r as isize {
                if dx * dx + dy * dy <= r2 {
                    self.set_pixel(cx as isize + dx, cy as isize + dy, color);
                }
            }
        }
    }

    fn draw_circle(&mut self, cx: isize, cy: isize, r: f32, color: u32) {
        let steps = ((r * 8.0) as usize).clamp(16, 720);
        for i in 0..steps {
            let a = i as f32 / steps as f32 * std::f32::consts::TAU;
            self.set_pixel(cx + (r * a.cos()) as isize, cy + (r * a.sin()) as isize, color);
        }
    }

    /// Bresenham.
    fn draw_line(&mut self, (x0, y0): (isize, isize), (x1, y1): (isize, isize), color: u32) {
        let (dx, dy) = ((x1 - x0).abs(), -(y1 - y0).abs());
        let (sx, sy) = (if x0 < x1 { 1 } else { -1 }, if y0 < y1 { 1 } else { -1 });
        let (mut x, mut y, mut err) = (x0, y0, dx + dy);
        loop {
            self.set_pixel(x, y, color);
            if x == x1 && y == y1 { break; }
            let e2 = 2 * err;
            if e2 >= dy { err += dy; x += sx; }
            if e2 <= dx { err += dx; y += sy; }
        }
    }

    /// Minimal bitmap font, 3×5 per character.
    fn draw_label(&mut self, text: &str, x: usize, y: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.set_pixel((cx + col) as isize, (y + row) as isize, color);
                    }
                }
            }
            cx += 4;
            if cx + 4 > WIN_W { break; }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' | 'ä' | 'Ä' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' | 'ö' | 'Ö' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' | 'ß' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' | 'ü' | 'Ü' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '>' => [0b100, 0b010, 0b001, 0b010, 0b100],
        '?' => [0b111, 0b001, 0b010, 0b000, 0b010],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_positions_are_distinct() {
        let mut seen: Vec<_> = (0..=9u8).map(digit_position).collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 10);
    }

    #[test]
    fn dots_follow_braille_columns() {
        assert_eq!(digit_position(1), (0, 0));
        assert_eq!(digit_position(7), (0, 3));
        assert_eq!(digit_position(4), (1, 0));
        assert_eq!(digit_position(9), (1, 4));
    }

    #[test]
    fn pixels_stay_near_the_view() {
        assert_eq!(to_pixel(0.5), (VIEW / 2) as isize);
        let lo = -(MARGIN as isize);
        let hi = VIEW as isize + MARGIN as isize;
        for v in [f32::MAX, -f32::MAX, 1.0e30, f32::INFINITY, f32::NEG_INFINITY] {
            let p = to_pixel(v);
            assert!(lo <= p && p <= hi, "{} -> {}", v, p);
        }
    }

    #[test]
    fn umlauts_have_glyphs() {
        assert_eq!(char_glyph('ä'), char_glyph('a'));
        assert_ne!(char_glyph('q'), char_glyph('~'));
    }
}
