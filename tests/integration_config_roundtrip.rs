#[cfg(test)]
mod tests {
    use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
    use indoc::indoc;
    use ratatui::prelude::Rect;
    use term_dock::LayoutManager;
    use term_dock::components::{Component, ComponentRegistry, NoteComponent};
    use term_dock::config::minify::maxify;
    use term_dock::config::{
        ItemType, LayoutConfig, PopoutWindow, ResolvedItemConfig, ResolvedLayoutConfig,
        ResolvedPopoutConfig,
    };
    use term_dock::error::{ConfigError, LayoutError};

    const FIXTURE: &str = indoc! {r#"
        {
            "dimensions": { "borderWidth": 1, "minItemWidth": 4, "minItemHeight": 2, "headerHeight": 1, "controlButtonWidth": 2 },
            "settings": { "tabControlOffset": 0 },
            "root": {
                "type": "row",
                "content": [
                    {
                        "type": "stack",
                        "width": 40,
                        "activeItemIndex": 1,
                        "content": [
                            { "type": "component", "componentType": "note", "title": "one", "componentState": { "text": "first" } },
                            { "type": "component", "componentType": "note", "title": "two", "id": "second" }
                        ]
                    },
                    {
                        "type": "column",
                        "width": 60,
                        "content": [
                            { "type": "stack", "content": [{ "type": "component", "componentType": "note", "title": "three" }] },
                            { "type": "stack", "isClosable": false, "content": [{ "type": "component", "componentType": "note", "title": "four" }] }
                        ]
                    }
                ]
            }
        }
    "#};

    fn registry() -> ComponentRegistry {
        let mut registry = ComponentRegistry::new();
        registry
            .register(
                "note",
                Box::new(|config: &ResolvedItemConfig| -> Box<dyn Component> {
                    Box::new(NoteComponent::from_state(config.component_state.as_ref()))
                }),
            )
            .unwrap();
        registry
    }

    fn fresh() -> LayoutManager {
        let mut manager = LayoutManager::new(registry());
        manager.init(Rect::new(0, 0, 81, 20)).unwrap();
        manager
    }

    fn loaded(json: &str) -> LayoutManager {
        let mut manager = fresh();
        manager.load_layout(&LayoutConfig::from_json(json).unwrap()).unwrap();
        manager
    }

    #[test]
    fn saved_layouts_reload_identically() {
        let mut manager = loaded(FIXTURE);
        let saved = manager.save_layout().unwrap();
        let text = saved.to_json().unwrap();

        let parsed: ResolvedLayoutConfig = serde_json::from_str(&text).unwrap();
        let mut other = fresh();
        other.load_resolved(parsed).unwrap();
        assert_eq!(other.save_layout().unwrap(), saved);

        let root = saved.root.unwrap();
        assert_eq!(root.item_type, ItemType::Row);
        assert_eq!(root.content[0].active_item_index, Some(1));
        assert_eq!(root.content[0].content[1].id, "second");
        assert!(!root.content[1].content[1].is_closable);
        assert_eq!(root.content[1].content[0].height, Some(50.0));
    }

    #[test]
    fn minified_layouts_expand_back() {
        let mut manager = loaded(FIXTURE);
        let minified = manager.save_layout_minified().unwrap();
        assert!(minified.get("root").is_none());
        let expanded: ResolvedLayoutConfig = serde_json::from_value(maxify(&minified).unwrap()).unwrap();
        assert_eq!(expanded, manager.save_layout().unwrap());
    }

    #[test]
    fn invalid_configs_leave_the_layout_alone() {
        let mut manager = loaded(FIXTURE);
        let bad = LayoutConfig::from_json(indoc! {r#"
            { "root": { "type": "stack", "content": [{ "type": "row" }] } }
        "#})
        .unwrap();
        let err = manager.load_layout(&bad).unwrap_err();
        assert!(matches!(
            err,
            LayoutError::Config(ConfigError::StackChildNotComponent(_))
        ));
        assert_eq!(manager.tree().components().len(), 4);
    }

    #[test]
    fn legacy_content_arrays_become_the_root() {
        let manager = loaded(indoc! {r#"
            {
                "content": [{
                    "type": "column",
                    "content": [
                        { "type": "stack", "content": [{ "type": "component", "componentType": "note" }] },
                        { "type": "stack", "content": [{ "type": "component", "componentType": "note" }] }
                    ]
                }]
            }
        "#});
        let root = manager.tree().root().unwrap();
        assert_eq!(manager.tree().get(root).unwrap().item_type(), Some(ItemType::Column));
        assert_eq!(manager.tree().components().len(), 2);
    }

    #[test]
    fn maximised_stacks_survive_a_reload() {
        let mut manager = loaded(FIXTURE);
        let stack = manager.tree().stacks()[0];
        manager.toggle_maximise(stack).unwrap();
        let saved = manager.save_layout().unwrap();

        let mut other = fresh();
        other.load_resolved(saved).unwrap();
        let maximised = other.maximised_stack().unwrap();
        assert_eq!(other.tree().children(maximised).len(), 2);
    }

    #[test]
    fn component_state_is_collected_on_save() {
        let mut manager = loaded(FIXTURE);
        let three = manager.tree().components()[2];
        manager.focus_component(three).unwrap();
        let key = |c| Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        assert!(manager.forward_event(&key('h')));
        assert!(manager.forward_event(&key('i')));

        let saved = manager.save_layout().unwrap();
        let column = &saved.root.unwrap().content[1];
        assert_eq!(
            column.content[0].content[0].component_state,
            Some(serde_json::json!({ "text": "hi" }))
        );
    }

    #[test]
    fn a_broken_stored_popout_rejects_the_whole_load() {
        let mut manager = loaded(FIXTURE);
        let before = manager.save_layout().unwrap();

        let mut incoming = before.clone();
        let mut root = incoming.root.take().unwrap();
        let mut broken = root.content[0].clone();
        broken.content = vec![ResolvedItemConfig::row()];
        root.content.truncate(1);
        incoming.root = Some(root);
        incoming.open_popouts = vec![ResolvedPopoutConfig {
            root: Some(broken),
            dimensions: before.dimensions,
            settings: before.settings.clone(),
            header: before.header.clone(),
            parent_id: None,
            index_in_parent: None,
            window: PopoutWindow::default(),
        }];

        let err = manager.load_resolved(incoming).unwrap_err();
        assert!(matches!(
            err,
            LayoutError::Config(ConfigError::StackChildNotComponent(ref t)) if t == "row"
        ));
        assert_eq!(manager.save_layout().unwrap(), before);
        assert_eq!(manager.tree().components().len(), 4);
        assert!(manager.popouts().is_empty());
    }
}
