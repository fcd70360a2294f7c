//! The player loop: one `tick` per frame on the main thread.
//!
//! Per tick, in order: pump platform events, step the startup sequence,
//! poll the screen resolution, handle keys and IPC commands, advance content
//! animation, sample performance, publish status.

use std::time::{Duration, Instant};

use async_channel::Receiver;

use crate::config::Config;
use crate::geometry::{GeometryError, Resolution};
use crate::ipc::{self, IpcCommand, StatusSnapshot};
use crate::monitor::ResolutionMonitor;
use crate::performance::{PerformanceMonitor, SysinfoProbe};
use crate::pulse::Pulse;
use crate::rotation::ContentRotator;
use crate::startup::StartupSequencer;
use crate::surface::{
    ApplyReport, PixelCanvas, RectTransform, RenderTargets, SurfaceBinder, ViewportCamera,
};
use crate::window::{ChromeController, InputSource, Key, Platform, Screen, WindowStyleState};

pub struct App {
    config: Config,
    target: Resolution,
    chrome: ChromeController,
    screen: Box<dyn Screen>,
    input: Box<dyn InputSource>,
    binder: SurfaceBinder,
    /// One element per content item.
    elements: Vec<RectTransform>,
    /// The window's chrome. Shared by the startup sequence and the toggle.
    style: WindowStyleState,
    sequencer: StartupSequencer,
    monitor: ResolutionMonitor,
    rotator: ContentRotator,
    pulse: Pulse,
    pulse_scale: f64,
    performance: PerformanceMonitor,
    commands: Receiver<IpcCommand>,
    /// Toggle requested before the startup sequence finished.
    pending_toggle: bool,
    last_report: Option<ApplyReport>,
    geometry_passes: usize,
    quit: bool,
}

impl App {
    pub fn new(config: Config, platform: Platform) -> Self {
        Self::with_commands(config, platform, ipc::subscribe_ipc_commands())
    }

    pub fn with_commands(
        config: Config,
        platform: Platform,
        commands: Receiver<IpcCommand>,
    ) -> Self {
        let target = config.display.target();
        log::info!("Platform backend: {}, target {}", platform.name, target);

        let chrome = ChromeController::new(platform.windows);
        // Native windows are created with full chrome.
        let style = if chrome.supports_native_chrome() {
            WindowStyleState::Bordered
        } else {
            config.display.chrome
        };

        let binder = SurfaceBinder::new(
            target,
            RenderTargets {
                camera: Some(Box::new(ViewportCamera::default())),
                canvas: Some(Box::new(PixelCanvas::new(target))),
            },
        );
        let size = (f64::from(target.width), f64::from(target.height));
        let elements = config
            .rotation
            .items
            .iter()
            .map(|name| RectTransform::new(name.as_str(), (0.0, 0.0), size))
            .collect();

        let mut screen = platform.screen;
        if config.display.force_fullscreen && !screen.set_fullscreen(true) {
            log::warn!("Fullscreen is not supported by the {} backend", platform.name);
        }
        if config.display.lock_cursor {
            screen.set_cursor_locked(true);
        }

        Self {
            target,
            chrome,
            screen,
            input: platform.input,
            binder,
            elements,
            style,
            sequencer: StartupSequencer::new(config.display.chrome),
            monitor: ResolutionMonitor::new(config.display.enable_scaling),
            rotator: ContentRotator::new(config.rotation.items.clone(), config.rotation.interval()),
            pulse: Pulse::new(&config.pulse),
            pulse_scale: 1.0,
            performance: PerformanceMonitor::new(
                config.performance.clone(),
                Box::new(SysinfoProbe::new()),
            ),
            commands,
            pending_toggle: false,
            last_report: None,
            geometry_passes: 0,
            quit: false,
            config,
        }
    }

    /// Runs one frame. `dt` is the time since the previous frame.
    pub fn tick(&mut self, dt: Duration) {
        let pumped = self.input.pump();
        if pumped.close_requested {
            log::info!("Presentation window closed");
            self.quit = true;
        }

        let step = self
            .sequencer
            .on_frame(&mut self.chrome, &mut self.style, self.target);
        if step.ready {
            self.on_ready();
        }

        let polled = self
            .monitor
            .poll(self.screen.as_mut(), &mut self.binder, &mut self.elements);
        self.record(polled);

        if self.pending_toggle && self.sequencer.is_ready() {
            self.pending_toggle = false;
            self.toggle_chrome();
        }
        for key in pumped.keys {
            self.handle_key(&key);
        }
        while let Ok(cmd) = self.commands.try_recv() {
            self.handle_command(cmd);
        }

        self.rotator.advance(dt);
        self.sync_visibility();
        self.pulse_scale = self.pulse.advance(dt);

        self.performance.on_tick(dt);

        ipc::publish_status(self.status());
    }
}

#[cfg(test)]
impl App {
    pub fn style(&self) -> WindowStyleState {
        self.style
    }

    pub fn startup_state(&self) -> crate::startup::StartupState {
        self.sequencer.state()
    }

    pub fn rotator(&self) -> &ContentRotator {
        &self.rotator
    }

    pub fn screen(&self) -> &dyn Screen {
        self.screen.as_ref()
    }

    pub fn last_report(&self) -> Option<&ApplyReport> {
        self.last_report.as_ref()
    }

    /// Number of geometry passes applied so far.
    pub fn geometry_passes(&self) -> usize {
        self.geometry_passes
    }

    pub fn pulse_scale(&self) -> f64 {
        self.pulse_scale
    }

    pub fn is_quit(&self) -> bool {
        self.quit
    }
}

impl App {
    /// Ticks at the configured frame rate until a quit is requested.
    pub fn run(&mut self) {
        let frame = self.config.performance.frame_interval();
        let mut last = Instant::now();

        while !self.quit {
            let now = Instant::now();
            self.tick(now.duration_since(last));
            last = now;

            let spent = now.elapsed();
            if spent < frame {
                std::thread::sleep(frame - spent);
            }
        }

        self.shutdown();
    }

    fn shutdown(&mut self) {
        if self.config.display.lock_cursor {
            self.screen.set_cursor_locked(false);
        }
        log::info!("Signage player stopped");
    }

    fn on_ready(&mut self) {
        // The window may have moved; bind geometry again for the sampled size.
        let reapplied = self.monitor.reapply(&mut self.binder, &mut self.elements);
        self.record(reapplied);

        if self.config.rotation.auto_start {
            self.rotator.start();
        }
    }

    fn record(&mut self, outcome: Option<Result<ApplyReport, GeometryError>>) {
        if let Some(Ok(report)) = outcome {
            self.geometry_passes += 1;
            self.last_report = Some(report);
        }
    }

    fn handle_key(&mut self, key: &Key) {
        if *key == self.config.input.quit_key {
            log::info!("Quit key pressed");
            self.quit = true;
        } else if *key == self.config.input.toggle_chrome_key {
            self.request_toggle();
        }
    }

    fn handle_command(&mut self, cmd: IpcCommand) {
        log::debug!("IPC command: {:?}", cmd);
        match cmd {
            IpcCommand::ToggleChrome => self.request_toggle(),
            IpcCommand::Fullscreen(desired) => {
                let desired = desired.unwrap_or(!self.screen.is_fullscreen());
                if !self.screen.set_fullscreen(desired) {
                    log::warn!("Fullscreen is not supported on this platform");
                }
            }
            IpcCommand::Next => self.rotator.next(),
            IpcCommand::Prev => self.rotator.prev(),
            IpcCommand::Show(index) => {
                if let Err(e) = self.rotator.select(index) {
                    log::warn!("Cannot show content: {}", e);
                }
            }
            IpcCommand::StartRotation => self.rotator.start(),
            IpcCommand::StopRotation => self.rotator.stop(),
            IpcCommand::RotationInterval(interval) => {
                self.rotator.set_interval(interval);
                log::info!("Content rotation interval set to {:?}", self.rotator.interval());
            }
            IpcCommand::Reapply => {
                let reapplied = self.monitor.reapply(&mut self.binder, &mut self.elements);
                self.record(reapplied);
            }
            IpcCommand::Quit => {
                log::info!("Quit requested over IPC");
                self.quit = true;
            }
        }
    }

    fn sync_visibility(&mut self) {
        for (index, element) in self.elements.iter_mut().enumerate() {
            element.visible = self.rotator.visible(index);
        }
    }

    fn request_toggle(&mut self) {
        if self.sequencer.is_ready() {
            self.toggle_chrome();
        } else {
            // A second request before startup completes cancels the first.
            self.pending_toggle = !self.pending_toggle;
            log::debug!("Chrome toggle deferred until startup completes");
        }
    }

    fn toggle_chrome(&mut self) {
        match self.chrome.toggle(&mut self.style, self.target) {
            Ok(style) => log::info!("Window chrome toggled to {}", style),
            Err(e) => log::warn!("Window chrome toggle failed: {}", e),
        }
    }

    fn status(&self) -> StatusSnapshot {
        StatusSnapshot {
            target: Some(self.target),
            actual: self.monitor.current(),
            chrome: Some(self.style),
            startup: self.sequencer.state().to_string(),
            viewport: self.last_report.as_ref().map(|r| r.viewport),
            rotation_items: self.rotator.len(),
            rotation_current: self.rotator.current(),
            rotation_current_name: self.rotator.current_name().map(str::to_string),
            rotation_running: self.rotator.is_running(),
            rotation_interval: self.rotator.interval(),
            geometry_passes: self.geometry_passes,
            pulse_scale: self.pulse_scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::tests::ScriptedScreen;
    use crate::startup::StartupState;
    use crate::window::chrome::tests::{NativeLog, RecordingManipulator, BORDERED_STYLE};
    use crate::window::input::PumpResult;
    use crate::window::native::SetWindowPosFlags;
    use async_channel::Sender;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    const FRAME: Duration = Duration::from_millis(33);
    const UHD: Resolution = Resolution::new(3840, 2160);

    struct ScriptedInput(Rc<RefCell<VecDeque<PumpResult>>>);

    impl InputSource for ScriptedInput {
        fn pump(&mut self) -> PumpResult {
            self.0.borrow_mut().pop_front().unwrap_or_default()
        }
    }

    struct Harness {
        app: App,
        native: Rc<RefCell<NativeLog>>,
        input: Rc<RefCell<VecDeque<PumpResult>>>,
        commands: Sender<IpcCommand>,
    }

    impl Harness {
        fn new(config: Config, native: bool) -> Self {
            let (mut windows, log) = RecordingManipulator::new(BORDERED_STYLE);
            windows.native = native;
            let input = Rc::new(RefCell::new(VecDeque::new()));
            let (tx, rx) = async_channel::unbounded();
            let platform = Platform {
                name: "test",
                windows: Box::new(windows),
                screen: Box::new(ScriptedScreen::new(&[UHD])),
                input: Box::new(ScriptedInput(input.clone())),
            };
            Self {
                app: App::with_commands(config, platform, rx),
                native: log,
                input,
                commands: tx,
            }
        }

        fn press(&self, key: Key) {
            self.input.borrow_mut().push_back(PumpResult {
                keys: vec![key],
                close_requested: false,
            });
        }

        fn ticks(&mut self, n: usize) {
            for _ in 0..n {
                self.app.tick(FRAME);
            }
        }
    }

    fn config() -> Config {
        let mut config = Config::default();
        config.rotation.items = vec!["welcome".into(), "menu".into(), "promo".into()];
        config.display.lock_cursor = false;
        config
    }

    #[test]
    fn test_headless_applies_geometry_on_first_tick() {
        let mut h = Harness::new(config(), false);
        h.ticks(1);

        assert_eq!(h.app.startup_state(), StartupState::Positioned);
        assert_eq!(h.app.geometry_passes(), 1);
        let report = h.app.last_report().unwrap();
        assert_eq!(report.actual, UHD);
        assert_eq!(report.viewport.y, 0.5);
        assert!(h.app.rotator().is_running());
    }

    #[test]
    fn test_native_startup_sequence() {
        let mut h = Harness::new(config(), true);
        assert_eq!(h.app.style(), WindowStyleState::Bordered);

        h.ticks(5);
        assert_eq!(h.app.style(), WindowStyleState::Borderless);
        assert!(!h.app.rotator().is_running());
        assert_eq!(h.app.geometry_passes(), 1);

        h.ticks(1);
        assert_eq!(h.app.startup_state(), StartupState::Positioned);
        assert!(h.app.rotator().is_running());
        // Initial sample plus the reapply once the window is pinned.
        assert_eq!(h.app.geometry_passes(), 2);
        assert_eq!(
            h.native.borrow().positions.last(),
            Some(&(0, 0, 1920, 1080, SetWindowPosFlags::NO_ZORDER))
        );
    }

    #[test]
    fn test_toggle_before_ready_is_deferred() {
        let mut h = Harness::new(config(), true);
        h.ticks(1);
        h.press(Key::F11);
        h.ticks(4);
        assert_eq!(h.app.style(), WindowStyleState::Borderless);

        h.ticks(1);
        assert_eq!(h.app.style(), WindowStyleState::Bordered);
        assert_eq!(h.native.borrow().style, BORDERED_STYLE);
    }

    #[test]
    fn test_toggle_after_ready() {
        let mut h = Harness::new(config(), true);
        h.ticks(6);

        h.press(Key::F11);
        h.ticks(1);
        assert_eq!(h.app.style(), WindowStyleState::Bordered);

        h.commands.try_send(IpcCommand::ToggleChrome).unwrap();
        h.ticks(1);
        assert_eq!(h.app.style(), WindowStyleState::Borderless);
        assert_eq!(
            h.native.borrow().positions.last(),
            Some(&(0, 0, 1920, 1080, SetWindowPosFlags::NO_ZORDER))
        );
    }

    #[test]
    fn test_quit_key() {
        let mut h = Harness::new(config(), false);
        h.press(Key::Escape);
        h.ticks(1);
        assert!(h.app.is_quit());
    }

    #[test]
    fn test_configured_letter_keys_match_native_events() {
        let mut config = config();
        config.input.quit_key = Key::from("q");
        config.input.toggle_chrome_key = Key::from("t");

        let mut h = Harness::new(config.clone(), true);
        h.ticks(6);
        h.press(Key::from_virtual_key(0x54));
        h.ticks(1);
        assert_eq!(h.app.style(), WindowStyleState::Bordered);
        h.press(Key::from_virtual_key(0x51));
        h.ticks(1);
        assert!(h.app.is_quit());

        let mut h = Harness::new(config, false);
        h.press(Key::Escape);
        h.ticks(1);
        assert!(!h.app.is_quit());
        h.press(Key::from_mac_keycode(0x0C));
        h.ticks(1);
        assert!(h.app.is_quit());
    }

    #[test]
    fn test_window_close_quits() {
        let mut h = Harness::new(config(), false);
        h.input.borrow_mut().push_back(PumpResult {
            keys: Vec::new(),
            close_requested: true,
        });
        h.ticks(1);
        assert!(h.app.is_quit());
    }

    #[test]
    fn test_ipc_commands() {
        let mut h = Harness::new(config(), false);
        h.ticks(1);

        h.commands.try_send(IpcCommand::Show(2)).unwrap();
        h.commands.try_send(IpcCommand::Fullscreen(None)).unwrap();
        h.ticks(1);
        assert_eq!(h.app.rotator().current(), Some(2));
        assert!(h.app.screen().is_fullscreen());

        h.commands.try_send(IpcCommand::Next).unwrap();
        h.commands.try_send(IpcCommand::Reapply).unwrap();
        h.ticks(1);
        assert_eq!(h.app.rotator().current(), Some(0));
        assert_eq!(h.app.geometry_passes(), 2);

        h.commands.try_send(IpcCommand::Quit).unwrap();
        h.ticks(1);
        assert!(h.app.is_quit());
    }

    #[test]
    fn test_show_out_of_range_keeps_current_item() {
        let mut h = Harness::new(config(), false);
        h.commands.try_send(IpcCommand::Show(1)).unwrap();
        h.ticks(1);
        assert_eq!(h.app.rotator().current(), Some(1));

        h.commands.try_send(IpcCommand::Show(5)).unwrap();
        h.ticks(1);
        assert_eq!(h.app.rotator().current(), Some(1));
    }

    #[test]
    fn test_rotation_controls_over_ipc() {
        let mut h = Harness::new(config(), false);
        h.ticks(1);
        assert!(h.app.rotator().is_running());

        h.commands.try_send(IpcCommand::StopRotation).unwrap();
        h.ticks(1);
        h.app.tick(Duration::from_secs(5));
        assert_eq!(h.app.rotator().current(), Some(0));
        assert!(!h.app.status().rotation_running);

        h.commands
            .try_send(IpcCommand::RotationInterval(Duration::from_millis(500)))
            .unwrap();
        h.commands.try_send(IpcCommand::StartRotation).unwrap();
        h.ticks(1);
        h.app.tick(Duration::from_millis(500));

        let status = h.app.status();
        assert!(status.rotation_running);
        assert_eq!(status.rotation_interval, Duration::from_millis(500));
        assert_eq!(status.rotation_current, Some(1));
        assert_eq!(status.rotation_current_name.as_deref(), Some("menu"));
    }

    #[test]
    fn test_only_current_element_is_visible() {
        let mut h = Harness::new(config(), false);
        h.ticks(1);
        h.commands.try_send(IpcCommand::Show(2)).unwrap();
        h.ticks(1);

        let visible: Vec<bool> = h.app.elements.iter().map(|e| e.visible).collect();
        assert_eq!(visible, vec![false, false, true]);
    }

    #[test]
    fn test_rotation_advances_with_time() {
        let mut h = Harness::new(config(), false);
        h.ticks(1);
        h.app.tick(Duration::from_secs(2));
        assert_eq!(h.app.rotator().current(), Some(1));
    }

    #[test]
    fn test_scaling_disabled_skips_geometry() {
        let mut config = config();
        config.display.enable_scaling = false;
        let mut h = Harness::new(config, false);
        h.ticks(3);

        assert_eq!(h.app.geometry_passes(), 0);
        assert!(h.app.last_report().is_none());
    }

    #[test]
    fn test_pulse_runs_each_tick() {
        let mut h = Harness::new(config(), false);
        h.app.tick(Duration::from_millis(250));
        assert!(h.app.pulse_scale() > 0.8);
        assert!(h.app.pulse_scale() < 1.2);
    }
}
