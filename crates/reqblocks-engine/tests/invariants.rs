//! Structural properties that must hold after every command.

use std::collections::HashSet;

use reqblocks_engine::{
    Cmd, Dictionary, DropTarget, Editor, Merger, MonospaceLayout, join_to_text, split_lines,
    tokenize,
};
use rstest::rstest;

fn input(text: &str) -> Cmd {
    Cmd::Input {
        text: text.to_string(),
    }
}

fn check_invariants(editor: &Editor, step: usize) {
    let blocks = editor.blocks();
    let lines = editor.lines();
    let breaks = blocks.iter().filter(|b| b.is_line_break()).count();
    assert_eq!(lines.len(), breaks + 1, "line count after step {step}");

    let caret = editor.caret();
    assert!(caret.line < lines.len(), "caret line after step {step}");
    assert!(
        caret.index_on_line <= lines[caret.line].len(),
        "caret position after step {step}"
    );

    let unique: HashSet<u64> = blocks.iter().map(|b| b.index).collect();
    assert_eq!(unique.len(), blocks.len(), "duplicate index after step {step}");
}

fn script() -> Vec<Cmd> {
    vec![
        input("while"),
        Cmd::Space,
        input("aircraft"),
        Cmd::Space,
        input("speed"),
        Cmd::Space,
        Cmd::Enter,
        Cmd::Enter,
        Cmd::Paste {
            text: "the LGS Warning System shall\nset left gear warning lamp to on".to_string(),
        },
        Cmd::ArrowUp,
        Cmd::ArrowLeft,
        Cmd::ArrowLeft,
        Cmd::Backspace { modifier: false },
        Cmd::Space,
        Cmd::ArrowDown,
        Cmd::ClickBlock {
            index: 0,
            shift: true,
        },
        Cmd::ClickBlock {
            index: 8,
            shift: true,
        },
        Cmd::DragMove {
            block: 0,
            target: DropTarget::Line(3),
        },
        Cmd::Backspace { modifier: true },
        Cmd::ClickLine {
            line: 0,
            x: 3.0,
            y: 0.0,
        },
        Cmd::Backspace { modifier: false },
        Cmd::Backspace { modifier: false },
        Cmd::ClickOutside,
        Cmd::Backspace { modifier: false },
        Cmd::InsertBlock {
            content: "on land".to_string(),
            category: None,
        },
        Cmd::DragMove {
            block: 99,
            target: DropTarget::Block(1),
        },
        Cmd::DeleteSelection,
    ]
}

#[rstest]
#[case(80)]
#[case(20)]
#[case(8)]
fn invariants_hold_through_an_editing_session(#[case] width: usize) {
    let mut editor = Editor::new(Dictionary::ears());

    for (step, cmd) in script().into_iter().enumerate() {
        editor.apply(cmd);
        check_invariants(&editor, step);

        let layout =
            MonospaceLayout::compute(&editor.lines(), width, editor.caret(), editor.pending());
        editor.after_layout(&layout);
        check_invariants(&editor, step);
    }
}

#[test]
fn moves_keep_block_identities() {
    let mut editor = Editor::from_text("a b c\nd e\n\nf", Dictionary::default());
    let before: HashSet<u64> = editor.blocks().iter().map(|b| b.index).collect();

    for (block, target) in [
        (0, DropTarget::Block(5)),
        (6, DropTarget::Line(0)),
        (2, DropTarget::Block(0)),
        (4, DropTarget::Line(9)),
    ] {
        editor.apply(Cmd::DragMove { block, target });
        let after: HashSet<u64> = editor.blocks().iter().map(|b| b.index).collect();
        assert_eq!(after, before);
    }
}

#[test]
fn inserts_and_deletes_never_renumber_survivors() {
    let mut editor = Editor::from_text("one two three\nfour", Dictionary::default());
    let original: Vec<(u64, String)> = editor
        .blocks()
        .iter()
        .map(|b| (b.index, b.content.clone()))
        .collect();

    editor.apply(Cmd::Paste {
        text: "x y".to_string(),
    });
    editor.apply(Cmd::ClickBlock {
        index: 1,
        shift: false,
    });
    editor.apply(Cmd::Backspace { modifier: true });
    editor.apply(Cmd::Enter);

    for block in editor.blocks() {
        if let Some((_, content)) = original.iter().find(|(index, _)| *index == block.index) {
            assert_eq!(&block.content, content);
        }
    }
    assert!(!editor.blocks().iter().any(|b| b.index == 1));
}

#[rstest]
#[case("while aircraft status is in air")]
#[case("req: 3 the LGS Warning System shall set left gear visual warning to active")]
#[case("if left gear state becomes hazardous\nthen\n\nreq: 4.1 has been on for 2 seconds")]
fn merge_pass_reaches_a_fixed_point(#[case] text: &str) {
    let dictionary = Dictionary::ears();
    let merger = Merger::new(&dictionary);
    let blocks = tokenize(text, 0, &dictionary);

    let merged = merger
        .merge_pass(&blocks, 0)
        .map_or(blocks, |outcome| outcome.blocks);
    assert_eq!(merger.merge_pass(&merged, 0), None);

    let lines = split_lines(&merged);
    assert_eq!(
        lines.len(),
        merged.iter().filter(|b| b.is_line_break()).count() + 1
    );
    assert_eq!(join_to_text(&merged), text);
}
