use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};
use indoc::indoc;
use serde_json::json;

use term_dock::LayoutManager;
use term_dock::components::{Component, ComponentRegistry, NoteComponent};
use term_dock::config::{LayoutConfig, ResolvedItemConfig};
use term_dock::constants::DRAG_HOLD_DELAY;
use term_dock::drag::DragListener;
use term_dock::drivers::console::{ConsoleInputDriver, ConsoleOutputDriver};
use term_dock::drivers::{InputDriver, OutputDriver};
use term_dock::event_loop::{ControlFlow, EventLoop};
use term_dock::tracing_sub;

const DEFAULT_LAYOUT: &str = indoc! {r#"
    {
        "dimensions": {
            "borderWidth": 1,
            "borderGrabWidth": 1,
            "minItemHeight": 3,
            "minItemWidth": 8,
            "headerHeight": 1,
            "dragProxyWidth": 24,
            "dragProxyHeight": 6,
            "dockEdgeSize": 2,
            "controlButtonWidth": 2
        },
        "settings": { "tabControlOffset": 2 },
        "root": {
            "type": "row",
            "content": [
                {
                    "type": "stack",
                    "width": 40,
                    "content": [
                        { "type": "component", "componentType": "note", "title": "readme",
                          "componentState": { "text": "Drag tabs by their titles.\nCtrl-N adds a note, Ctrl-Q quits." } },
                        { "type": "component", "componentType": "note", "title": "scratch" }
                    ]
                },
                {
                    "type": "column",
                    "content": [
                        { "type": "component", "componentType": "note", "title": "top" },
                        { "type": "component", "componentType": "note", "title": "bottom" }
                    ]
                }
            ]
        }
    }
"#};

/// Terminal host for the docking layout.
#[derive(Debug, Parser)]
#[command(name = "term-dock", version, about)]
struct Args {
    /// JSON layout config to load instead of the built-in one.
    #[arg(long)]
    layout: Option<PathBuf>,
    /// Write the layout here on exit.
    #[arg(long)]
    save: Option<PathBuf>,
    /// Save in the minified wire form.
    #[arg(long)]
    minified: bool,
    /// Send tracing output to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    // stderr would draw over the alternate screen; only log to a file.
    if let Some(path) = &args.log_file {
        tracing_sub::init_default(Some(path))?;
    }

    let config = load_config(args.layout.as_deref())?;
    let mut manager = LayoutManager::new(registry()?)
        .with_drag_listener(DragListener::new(1.0, Some(DRAG_HOLD_DELAY)));
    manager.load_layout(&config).map_err(io::Error::other)?;

    let mut output = ConsoleOutputDriver::new()?;
    output.enter()?;
    let mut input = ConsoleInputDriver::new();
    input.set_mouse_capture(true)?;
    let result = run(&mut manager, &mut output, input);
    output.exit()?;
    result?;

    if let Some(path) = &args.save {
        save_layout(&mut manager, path, args.minified)?;
    }
    manager.destroy().map_err(io::Error::other)
}

fn registry() -> io::Result<ComponentRegistry> {
    let mut registry = ComponentRegistry::new();
    registry
        .register(
            "note",
            Box::new(|config: &ResolvedItemConfig| -> Box<dyn Component> {
                Box::new(NoteComponent::from_state(config.component_state.as_ref()))
            }),
        )
        .map_err(io::Error::other)?;
    Ok(registry)
}

fn load_config(path: Option<&Path>) -> io::Result<LayoutConfig> {
    let text = match path {
        Some(path) => std::fs::read_to_string(path)?,
        None => DEFAULT_LAYOUT.to_string(),
    };
    LayoutConfig::from_json(&text).map_err(io::Error::other)
}

fn save_layout(manager: &mut LayoutManager, path: &Path, minified: bool) -> io::Result<()> {
    let value = if minified {
        manager.save_layout_minified().map_err(io::Error::other)?
    } else {
        let config = manager.save_layout().map_err(io::Error::other)?;
        serde_json::to_value(&config).map_err(io::Error::other)?
    };
    let text = serde_json::to_string_pretty(&value).map_err(io::Error::other)?;
    std::fs::write(path, text)?;
    tracing::info!(path = %path.display(), minified, "layout saved");
    Ok(())
}

fn run(
    manager: &mut LayoutManager,
    output: &mut ConsoleOutputDriver,
    input: ConsoleInputDriver,
) -> io::Result<()> {
    manager.init(output.size()?).map_err(io::Error::other)?;
    let mut event_loop = EventLoop::new(input, Duration::from_millis(16));
    event_loop.run(|_, event, elapsed| {
        if let Err(err) = manager.advance_time(elapsed) {
            tracing::warn!(%err, "timer task failed");
        }
        if let Some(event) = event {
            if is_ctrl(&event, 'q') {
                return Ok(ControlFlow::Quit);
            }
            if is_ctrl(&event, 'n') {
                let added = manager.add_component("note", Some(json!({ "text": "" })), Some("note"));
                match added {
                    Ok(component) => {
                        if let Err(err) = manager.focus_component(component) {
                            tracing::warn!(%err, "cannot focus new note");
                        }
                    }
                    Err(err) => tracing::warn!(%err, "cannot add note"),
                }
            } else if !manager.handle_event(&event) {
                manager.forward_event(&event);
            }
        }
        output.draw(|mut frame| manager.render(&mut frame))?;
        Ok(ControlFlow::Continue)
    })
}

fn is_ctrl(event: &Event, ch: char) -> bool {
    matches!(
        event,
        Event::Key(key)
            if key.kind == KeyEventKind::Press
                && key.code == KeyCode::Char(ch)
                && key.modifiers.contains(KeyModifiers::CONTROL)
    )
}
