#[cfg(test)]
mod tests {
    use crossterm::event::{
        Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    };
    use indoc::indoc;
    use ratatui::prelude::Rect;
    use std::cell::RefCell;
    use std::rc::Rc;
    use term_dock::LayoutManager;
    use term_dock::components::{Component, ComponentRegistry, NoteComponent};
    use term_dock::config::{ItemType, LayoutConfig, ResolvedItemConfig};
    use term_dock::constants::ANIMATION_FRAME;
    use term_dock::drag::DragListener;
    use term_dock::events::LayoutEvent;
    use term_dock::error::{ConfigError, LayoutError};
    use term_dock::items::ItemKey;
    use term_dock::manager::{DEFAULT_LOCATION_SELECTORS, LocationSelector};

    const DIMENSIONS: &str = indoc! {r#"
        "dimensions": {
            "borderWidth": 1,
            "borderGrabWidth": 1,
            "minItemHeight": 1,
            "minItemWidth": 1,
            "headerHeight": 1,
            "dragProxyWidth": 10,
            "dragProxyHeight": 4,
            "dockEdgeSize": 2,
            "controlButtonWidth": 2
        },
        "settings": { "tabControlOffset": 0 },
    "#};

    fn note(title: &str) -> String {
        format!(r#"{{ "type": "component", "componentType": "note", "title": "{title}" }}"#)
    }

    fn stack(titles: &[&str]) -> String {
        let content: Vec<String> = titles.iter().map(|t| note(t)).collect();
        format!(r#"{{ "type": "stack", "content": [{}] }}"#, content.join(", "))
    }

    fn manager(stacks: &[&[&str]], width: u16) -> LayoutManager {
        let content: Vec<String> = stacks.iter().map(|s| stack(s)).collect();
        let json = format!(
            r#"{{ {DIMENSIONS} "root": {{ "type": "row", "content": [{}] }} }}"#,
            content.join(", ")
        );
        let config = LayoutConfig::from_json(&json).unwrap();
        let mut registry = ComponentRegistry::new();
        registry
            .register(
                "note",
                Box::new(|config: &ResolvedItemConfig| -> Box<dyn Component> {
                    Box::new(NoteComponent::from_state(config.component_state.as_ref()))
                }),
            )
            .unwrap();
        let mut manager =
            LayoutManager::new(registry).with_drag_listener(DragListener::new(1.0, None));
        manager.load_layout(&config).unwrap();
        manager.init(Rect::new(0, 0, width, 10)).unwrap();
        manager
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn drag(manager: &mut LayoutManager, from: (u16, u16), to: (u16, u16)) {
        assert!(manager.handle_event(&mouse(MouseEventKind::Down(MouseButton::Left), from.0, from.1)));
        assert!(manager.handle_event(&mouse(MouseEventKind::Drag(MouseButton::Left), to.0, to.1)));
        assert!(manager.handle_event(&mouse(MouseEventKind::Up(MouseButton::Left), to.0, to.1)));
    }

    fn find(manager: &LayoutManager, title: &str) -> ItemKey {
        let tree = manager.tree();
        tree.components()
            .into_iter()
            .find(|c| tree.get(*c).unwrap().component().unwrap().title() == title)
            .unwrap()
    }

    fn tab_origin(manager: &LayoutManager, component: ItemKey) -> (u16, u16) {
        let tree = manager.tree();
        let stack = tree.parent(component).unwrap();
        let rect = tree
            .get(stack)
            .unwrap()
            .stack()
            .unwrap()
            .header()
            .tab_rect(component)
            .unwrap();
        (rect.x, rect.y)
    }

    fn titles(manager: &LayoutManager, stack: ItemKey) -> Vec<String> {
        let tree = manager.tree();
        tree.children(stack)
            .iter()
            .map(|c| tree.get(*c).unwrap().component().unwrap().title().to_string())
            .collect()
    }

    #[test]
    fn tabs_move_between_headers() {
        let mut manager = manager(&[&["a", "b"], &["c"]], 40);
        let b = find(&manager, "b");
        let from = tab_origin(&manager, b);
        drag(&mut manager, from, (30, 0));

        let root = manager.tree().root().unwrap();
        let right = manager.tree().children(root)[1];
        assert_eq!(titles(&manager, right), vec!["c", "b"]);
        assert_eq!(manager.tree().active_component(right), Some(b));

        let saved = manager.save_layout().unwrap();
        let stacks = &saved.root.unwrap().content;
        assert_eq!(stacks[0].content.len(), 1);
        assert_eq!(stacks[1].content[1].title, "b");
    }

    #[test]
    fn escape_puts_the_tab_back() {
        let mut manager = manager(&[&["a", "b"], &["c"]], 40);
        let b = find(&manager, "b");
        let left = manager.tree().parent(b).unwrap();
        let (x, y) = tab_origin(&manager, b);
        manager.handle_event(&mouse(MouseEventKind::Down(MouseButton::Left), x, y));
        manager.handle_event(&mouse(MouseEventKind::Drag(MouseButton::Left), 30, 6));
        assert!(manager.is_dragging());

        let esc = Event::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        assert!(manager.handle_event(&esc));
        assert!(!manager.is_dragging());
        assert_eq!(manager.tree().parent(b), Some(left));
        assert_eq!(manager.tree().index_in_parent(b), Some(1));
    }

    #[test]
    fn layout_edges_accept_drops() {
        let mut manager = manager(&[&["a"], &["b"], &["c"]], 62);
        let c = find(&manager, "c");
        let from = tab_origin(&manager, c);
        drag(&mut manager, from, (0, 5));

        let tree = manager.tree();
        let root = tree.root().unwrap();
        assert_eq!(tree.get(root).unwrap().item_type(), Some(ItemType::Row));
        assert_eq!(tree.children(root).len(), 3);
        let first = tree.children(root)[0];
        assert_eq!(tree.children(first), &[c]);
    }

    #[test]
    fn state_changes_wait_for_the_next_frame() {
        let mut manager = manager(&[&["a", "b"], &["c"]], 40);
        let seen = Rc::new(RefCell::new(0));
        let sink = seen.clone();
        manager.on(
            "stateChanged",
            Box::new(move |e| {
                if e.event == LayoutEvent::StateChanged {
                    *sink.borrow_mut() += 1;
                }
            }),
        );
        let b = find(&manager, "b");
        let from = tab_origin(&manager, b);
        drag(&mut manager, from, (30, 0));
        manager.set_title(b, "renamed").unwrap();
        assert_eq!(*seen.borrow(), 0);

        manager.advance_by(ANIMATION_FRAME).unwrap();
        let delivered = *seen.borrow();
        assert!(delivered > 0);
        manager.advance_by(ANIMATION_FRAME).unwrap();
        assert_eq!(*seen.borrow(), delivered);
    }

    #[test]
    fn clicking_a_body_focuses_its_component() {
        let mut manager = manager(&[&["a", "b"], &["c"]], 40);
        let c = find(&manager, "c");
        manager.handle_event(&mouse(MouseEventKind::Down(MouseButton::Left), 30, 5));
        assert_eq!(manager.focused_component(), Some(c));
        assert_eq!(manager.component_at(30, 5), Some(c));
    }

    #[test]
    fn rows_cannot_be_added_into_a_stack() {
        let mut manager = manager(&[&["a"], &["b"]], 40);
        let row = LayoutConfig::from_json(&format!(
            r#"{{ "root": {{ "type": "row", "content": [{}, {}] }} }}"#,
            stack(&["c"]),
            stack(&["d"])
        ))
        .unwrap()
        .resolve()
        .unwrap()
        .root
        .unwrap();

        let err = manager
            .add_item_at_location(&row, &DEFAULT_LOCATION_SELECTORS)
            .unwrap_err();
        assert!(matches!(err, LayoutError::Config(ConfigError::NotComponent(ref t)) if t == "row"));
        assert_eq!(manager.tree().components().len(), 2);

        let added = manager
            .add_item_at_location(&row, &[LocationSelector::FirstRowOrColumn])
            .unwrap();
        let tree = manager.tree();
        assert_eq!(tree.get(added).unwrap().item_type(), Some(ItemType::Row));
        assert_eq!(tree.children(added).len(), 2);
        assert_eq!(tree.components().len(), 4);
    }
}
