//! End-to-end runs of the event loop against an in-memory terminal

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    backend::{Backend, ClearType, TestBackend, WindowSize},
    buffer::Cell,
    layout::{Position, Size},
    text::Text,
    Terminal,
};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tuidash_core::{
    layout::{LayoutConfig, UnitHints},
    tui::{panel::buffer_rows, run_app, Command, DashEvent, Dashboard, LoopExit, Scheduler, WidgetId},
    Payload, Widget, WidgetError,
};

/// Fails its first fetch, then waits an hour before retrying
struct Flaky {
    id: WidgetId,
    updates: Arc<AtomicUsize>,
    error: Option<WidgetError>,
}

impl Widget for Flaky {
    fn title(&self) -> &str {
        "Flaky"
    }

    fn init(&self) -> Option<Command> {
        Some(Command::fetch(self.id, async {
            Err(WidgetError::Fetch("boom".to_string()))
        }))
    }

    fn update(&mut self, event: &DashEvent) -> Option<Command> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        let result = event.fetched_for(self.id)?;
        if let Err(e) = result {
            self.error = Some(e.clone());
        }
        Some(Command::tick(self.id, Duration::from_secs(3600)))
    }

    fn render(&self, _width: u16, _height: u16) -> Text<'static> {
        match &self.error {
            Some(e) => Text::from(format!("Error: {e}")),
            None => Text::from("waiting"),
        }
    }
}

/// Static body, no commands
struct Label(&'static str);

impl Widget for Label {
    fn title(&self) -> &str {
        self.0
    }

    fn init(&self) -> Option<Command> {
        None
    }

    fn update(&mut self, _event: &DashEvent) -> Option<Command> {
        None
    }

    fn render(&self, _width: u16, _height: u16) -> Text<'static> {
        Text::from(format!("{} body", self.0))
    }
}

/// In-memory backend that counts completed frames
struct CountingBackend {
    inner: TestBackend,
    frames: Arc<AtomicUsize>,
}

impl Backend for CountingBackend {
    fn draw<'a, I>(&mut self, content: I) -> io::Result<()>
    where
        I: Iterator<Item = (u16, u16, &'a Cell)>,
    {
        self.inner.draw(content)
    }

    fn append_lines(&mut self, n: u16) -> io::Result<()> {
        self.inner.append_lines(n)
    }

    fn hide_cursor(&mut self) -> io::Result<()> {
        self.inner.hide_cursor()
    }

    fn show_cursor(&mut self) -> io::Result<()> {
        self.inner.show_cursor()
    }

    fn get_cursor_position(&mut self) -> io::Result<Position> {
        self.inner.get_cursor_position()
    }

    fn set_cursor_position<P: Into<Position>>(&mut self, position: P) -> io::Result<()> {
        self.inner.set_cursor_position(position)
    }

    fn clear(&mut self) -> io::Result<()> {
        self.inner.clear()
    }

    fn clear_region(&mut self, clear_type: ClearType) -> io::Result<()> {
        self.inner.clear_region(clear_type)
    }

    fn size(&self) -> io::Result<Size> {
        self.inner.size()
    }

    fn window_size(&mut self) -> io::Result<WindowSize> {
        self.inner.window_size()
    }

    fn flush(&mut self) -> io::Result<()> {
        self.frames.fetch_add(1, Ordering::SeqCst);
        self.inner.flush()
    }
}

fn quit_key() -> DashEvent {
    DashEvent::Key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE))
}

fn dashboard(widgets: Vec<Box<dyn Widget>>) -> Dashboard {
    Dashboard::new(widgets, UnitHints::default(), LayoutConfig::default())
}

#[tokio::test]
async fn test_quit_stops_processing() {
    let updates = Arc::new(AtomicUsize::new(0));
    let mut dash = dashboard(vec![Box::new(Flaky {
        id: WidgetId(0),
        updates: updates.clone(),
        error: None,
    })]);

    let (scheduler, mut rx) = Scheduler::channel();
    let tx = scheduler.sender();
    tx.send(quit_key()).unwrap();
    tx.send(DashEvent::Tick {
        widget: WidgetId(0),
        at: chrono::Local::now(),
    })
    .unwrap();

    let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
    let exit = run_app(&mut terminal, &mut dash, &scheduler, &mut rx)
        .await
        .unwrap();

    assert_eq!(exit, LoopExit::Quit);
    // Only the startup resize reached the widget; the tick queued after the
    // quit key was never dispatched
    assert_eq!(updates.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failed_fetch_renders_error() {
    let updates = Arc::new(AtomicUsize::new(0));
    let mut dash = dashboard(vec![
        Box::new(Flaky {
            id: WidgetId(0),
            updates: updates.clone(),
            error: None,
        }),
        Box::new(Label("Notes")),
    ]);

    let (scheduler, mut rx) = Scheduler::channel();
    let tx = scheduler.sender();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        let _ = tx.send(quit_key());
    });

    let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
    let exit = run_app(&mut terminal, &mut dash, &scheduler, &mut rx)
        .await
        .unwrap();
    assert_eq!(exit, LoopExit::Quit);

    let rows = buffer_rows(terminal.backend().buffer());
    assert!(rows.iter().any(|r| r.contains("Error: boom")), "{rows:#?}");
    // Narrow terminal: one column, panels stacked
    assert!(rows[2].contains("Flaky"));
    assert!(rows[12].contains("Notes"));
    assert!(rows[13].contains("Notes body"));
}

#[tokio::test]
async fn test_first_frame_is_laid_out() {
    let mut dash = dashboard(vec![Box::new(Label("Left")), Box::new(Label("Right"))]);

    let (scheduler, mut rx) = Scheduler::channel();
    let tx = scheduler.sender();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let _ = tx.send(quit_key());
    });

    let mut terminal = Terminal::new(TestBackend::new(120, 12)).unwrap();
    run_app(&mut terminal, &mut dash, &scheduler, &mut rx)
        .await
        .unwrap();

    let rows = buffer_rows(terminal.backend().buffer());
    assert!(!rows.iter().any(|r| r.contains(tuidash_core::tui::LOADING_PLACEHOLDER)));
    assert!(rows[2].contains("Left") && rows[2].contains("Right"));
}

#[tokio::test]
async fn test_one_frame_per_batch() {
    let mut dash = dashboard(vec![Box::new(Label("Left")), Box::new(Label("Right"))]);

    let (scheduler, mut rx) = Scheduler::channel();
    let tx = scheduler.sender();
    // Queued before the loop starts: drained into the first batch
    for _ in 0..5 {
        tx.send(DashEvent::Resize {
            width: 100,
            height: 30,
        })
        .unwrap();
    }
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(150)).await;
        let _ = tx.send(DashEvent::Resize {
            width: 100,
            height: 30,
        });
        tokio::time::sleep(Duration::from_millis(150)).await;
        let _ = tx.send(quit_key());
    });

    let frames = Arc::new(AtomicUsize::new(0));
    let backend = CountingBackend {
        inner: TestBackend::new(100, 30),
        frames: frames.clone(),
    };
    let mut terminal = Terminal::new(backend).unwrap();
    let exit = run_app(&mut terminal, &mut dash, &scheduler, &mut rx)
        .await
        .unwrap();

    assert_eq!(exit, LoopExit::Quit);
    // Seeded resize plus the queued events draw once, the late resize once,
    // and the quit batch not at all
    assert_eq!(frames.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_scheduled_fetch_reaches_widget() {
    let (scheduler, mut rx) = Scheduler::channel();
    scheduler.spawn(Command::fetch(WidgetId(4), async {
        Ok(Payload::Text("hello".to_string()))
    }));

    match rx.recv().await {
        Some(DashEvent::Fetched { widget, result }) => {
            assert_eq!(widget, WidgetId(4));
            assert_eq!(result, Ok(Payload::Text("hello".to_string())));
        }
        other => panic!("unexpected event: {other:?}"),
    }
}
