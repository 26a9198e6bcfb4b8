/// Terminal front-end: drives the arm interactively and draws it as ASCII
use anyhow::Result;
use armvis_core::{evaluate_with, Color as RgbColor, KinematicModel, RenderMode, SceneConfig};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use std::io::{stdout, Write};
use std::time::{Duration, Instant};

pub mod camera;
pub mod presets;
pub mod renderer;

pub use camera::OrbitCamera;
pub use renderer::AsciiRenderer;

/// Radians added or removed by one `+`/`-` press.
const NUDGE_STEP: f64 = 0.05;
const ORBIT_STEP: f32 = 0.1;
/// Rows reserved at the top for the status lines.
const HEADER_ROWS: u16 = 2;

/// Startup options for [`TerminalApp`]
#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    pub mode: RenderMode,
    /// Index into [`presets::PRESETS`] applied at startup.
    pub preset: Option<usize>,
    pub demo: bool,
}

/// Main application struct for the terminal arm viewer
pub struct TerminalApp {
    model: KinematicModel,
    angles: Vec<f64>,
    mode: RenderMode,
    scene: SceneConfig,
    selected: usize,
    preset: usize,
    demo: bool,
    demo_time: f64,
    camera: OrbitCamera,
    renderer: AsciiRenderer,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(model: KinematicModel, options: AppOptions) -> Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(Self::with_size(model, options, width, height))
    }

    /// Build an app for a fixed viewport without touching the terminal.
    pub fn with_size(model: KinematicModel, options: AppOptions, width: u16, height: u16) -> Self {
        let rows = height.saturating_sub(HEADER_ROWS).max(1);
        let preset = options.preset.unwrap_or(0);
        let angles = presets::PRESETS
            .get(preset)
            .map(|p| p.angles_for(model.joint_count()))
            .unwrap_or_else(|| model.home());

        Self {
            angles,
            mode: options.mode,
            scene: SceneConfig {
                // the default black overlay disappears on a dark terminal
                overlay_color: RgbColor::rgb(255, 255, 255),
                ..SceneConfig::default()
            },
            selected: 0,
            preset,
            demo: options.demo,
            demo_time: 0.0,
            camera: OrbitCamera::new(width as u32, rows as u32),
            renderer: AsciiRenderer::new(width as usize, rows as usize),
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
            model,
        }
    }

    pub fn angles(&self) -> &[f64] {
        &self.angles
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn selected_joint(&self) -> usize {
        self.selected
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn run(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            while event::poll(Duration::from_millis(0))? {
                match event::read()? {
                    Event::Key(KeyEvent {
                        code,
                        kind: KeyEventKind::Press | KeyEventKind::Repeat,
                        ..
                    }) => self.handle_key(code),
                    Event::Resize(width, height) => self.resize(width, height),
                    _ => {}
                }
            }

            self.update(target_frame_time.as_secs_f64());
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.running = false;
            }
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                if index < self.model.joint_count() {
                    self.selected = index;
                }
            }
            KeyCode::Char('+') | KeyCode::Char('=') => self.nudge(NUDGE_STEP),
            KeyCode::Char('-') | KeyCode::Char('_') => self.nudge(-NUDGE_STEP),
            KeyCode::Char('m') => {
                self.mode = self.mode.toggled();
            }
            KeyCode::Char('p') => {
                self.preset = (self.preset + 1) % presets::PRESETS.len();
                self.apply_preset(self.preset);
            }
            KeyCode::Char('r') => {
                self.preset = 0;
                self.demo = false;
                self.angles = self.model.home();
            }
            KeyCode::Char('d') => {
                self.demo = !self.demo;
            }
            KeyCode::Left => self.camera.orbit(-ORBIT_STEP, 0.0),
            KeyCode::Right => self.camera.orbit(ORBIT_STEP, 0.0),
            KeyCode::Up => self.camera.orbit(0.0, ORBIT_STEP),
            KeyCode::Down => self.camera.orbit(0.0, -ORBIT_STEP),
            _ => {}
        }
    }

    fn nudge(&mut self, delta: f64) {
        self.demo = false;
        if let (Some(angle), Some(joint)) =
            (self.angles.get_mut(self.selected), self.model.joints().get(self.selected))
        {
            *angle = joint.limits.clamp(*angle + delta);
        }
    }

    fn apply_preset(&mut self, index: usize) {
        if let Some(preset) = presets::PRESETS.get(index) {
            self.demo = false;
            self.angles = preset.angles_for(self.model.joint_count());
            tracing::debug!(preset = preset.name, "applied preset");
        }
    }

    fn resize(&mut self, width: u16, height: u16) {
        let rows = height.saturating_sub(HEADER_ROWS).max(1);
        self.renderer.resize(width as usize, rows as usize);
        self.camera.resize(width as u32, rows as u32);
    }

    /// Advance the demo motion by `dt` seconds.
    pub fn update(&mut self, dt: f64) {
        if self.demo {
            self.demo_time += dt;
            self.angles = presets::demo_angles(&self.model, self.demo_time);
        }
    }

    /// Evaluate the current pose and rasterize it into the back buffer.
    pub fn draw_frame(&mut self) -> Result<()> {
        let primitives = evaluate_with(&self.model, &self.angles, self.mode, &self.scene)?;
        self.renderer.clear();
        self.renderer.render_scene(&primitives, &self.camera);
        Ok(())
    }

    fn status_line(&self) -> String {
        let joint = match self.model.joints().get(self.selected) {
            Some(joint) => format!(
                "J{} {} = {:+.3} [{:.2}, {:.2}]",
                self.selected + 1,
                joint.name,
                self.angles.get(self.selected).copied().unwrap_or_default(),
                joint.limits.lower,
                joint.limits.upper,
            ),
            None => "no joints".to_string(),
        };
        let preset = presets::PRESETS.get(self.preset).map_or("-", |p| p.name);
        let demo = if self.demo { " | demo" } else { "" };

        format!(
            "armvis {} | {} | {} | preset: {}{} | FPS: {:.1}",
            self.model.name().unwrap_or("robot"),
            self.mode,
            joint,
            preset,
            demo,
            self.fps
        )
    }

    fn render(&mut self) -> Result<()> {
        self.draw_frame()?;

        let mut stdout = stdout();
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            terminal::Clear(ClearType::CurrentLine),
            SetForegroundColor(Color::Yellow),
            Print(self.status_line()),
            cursor::MoveTo(0, 1),
            terminal::Clear(ClearType::CurrentLine),
            SetForegroundColor(Color::DarkGrey),
            Print("1-9 joint  +/- move  m mode  p preset  d demo  r reset  arrows orbit  q quit"),
            ResetColor,
            cursor::MoveTo(0, HEADER_ROWS),
        )?;

        self.renderer.draw(&mut stdout)?;

        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use armvis_core::parse_str;

    const SIX_AXIS_ARM: &str = include_str!("../../urdf/six_axis_arm.urdf");

    fn app(options: AppOptions) -> TerminalApp {
        let model = parse_str(SIX_AXIS_ARM).expect("bundled arm should parse");
        TerminalApp::with_size(model, options, 80, 30)
    }

    #[test]
    fn test_starts_at_preset() {
        let app = app(AppOptions {
            preset: presets::find("vertical").map(|(i, _)| i),
            ..AppOptions::default()
        });
        assert_eq!(app.angles(), presets::PRESETS[2].angles);
    }

    #[test]
    fn test_select_and_nudge_clamps_to_limits() {
        let mut app = app(AppOptions::default());
        app.handle_key(KeyCode::Char('2'));
        assert_eq!(app.selected_joint(), 1);

        for _ in 0..200 {
            app.handle_key(KeyCode::Char('+'));
        }
        assert_eq!(app.angles()[1], 2.35);

        for _ in 0..200 {
            app.handle_key(KeyCode::Char('-'));
        }
        assert_eq!(app.angles()[1], -2.35);
        assert!(app.angles().iter().enumerate().all(|(i, a)| i == 1 || *a == 0.0));
    }

    #[test]
    fn test_out_of_range_joint_key_is_ignored() {
        let mut app = app(AppOptions::default());
        app.handle_key(KeyCode::Char('4'));
        app.handle_key(KeyCode::Char('9'));
        assert_eq!(app.selected_joint(), 3);
    }

    #[test]
    fn test_mode_preset_and_reset_keys() {
        let mut app = app(AppOptions::default());
        app.handle_key(KeyCode::Char('m'));
        assert_eq!(app.mode(), RenderMode::Detailed);

        app.handle_key(KeyCode::Char('p'));
        assert_eq!(app.angles(), presets::PRESETS[1].angles);

        app.handle_key(KeyCode::Char('r'));
        assert_eq!(app.angles(), vec![0.0; 6]);

        app.handle_key(KeyCode::Char('q'));
        assert!(!app.is_running());
    }

    #[test]
    fn test_demo_moves_joints() {
        let mut app = app(AppOptions {
            demo: true,
            ..AppOptions::default()
        });
        app.update(1.0);
        let expected = presets::demo_angles(&app.model, 1.0);
        assert_eq!(app.angles(), expected);

        // manual input stops the demo
        app.handle_key(KeyCode::Char('+'));
        app.update(1.0);
        assert_ne!(app.angles(), presets::demo_angles(&app.model, 2.0));
    }

    #[test]
    fn test_draw_frame_in_both_modes() {
        let mut app = app(AppOptions::default());
        app.draw_frame().expect("skeleton frame");
        assert!(app.renderer.covered_cells() > 0);

        app.handle_key(KeyCode::Char('m'));
        app.draw_frame().expect("detailed frame");
        assert!(app.renderer.covered_cells() > 0);
    }
}
