//! Template patching preserves everything outside the declaration

use pretty_assertions::assert_eq;
use sfb_program::{compile, Workspace};
use sfb_store::{find_declaration, patch, PatchError, DEFAULT_TEMPLATE};

const FIRMWARE_HEADER: &str = "#include <cstdint>

// generated by the block editor, do not hand edit the sequence
typedef enum {
    FORWARD,
    RIGHT,
    LEFT,
    BACK,
    NORMAL,
    FLIP,
} Direction_t;

Direction_t direction_sequence[] = {RIGHT, FORWARD,BACK,LEFT,FLIP};

uint8_t MAX_STATES_NUM = sizeof(direction_sequence) / sizeof(direction_sequence[0]);\r\n\t
";

#[test]
fn only_declaration_span_changes() {
    let literal = compile(&["take_off", "back_1s", "rotate", "land"]).literal;
    let span = find_declaration(FIRMWARE_HEADER).unwrap();
    let patched = patch(Some(FIRMWARE_HEADER), &literal).unwrap();

    assert_eq!(&patched[..span.start], &FIRMWARE_HEADER[..span.start]);
    assert_eq!(
        &patched[span.start + literal.len()..],
        &FIRMWARE_HEADER[span.end..]
    );
    assert_eq!(
        &patched[span.start..span.start + literal.len()],
        "Direction_t direction_sequence[] = {BACK, FLIP};"
    );
}

#[test]
fn patching_twice_is_idempotent() {
    let literal = compile(&["forward_1s", "forward_1s"]).literal;
    let once = patch(Some(FIRMWARE_HEADER), &literal).unwrap();
    let twice = patch(Some(&once), &literal).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn empty_program_patches_to_empty_array() {
    let ws = Workspace::new();
    let literal = sfb_program::compile_workspace(Some(&ws)).unwrap().literal;
    let patched = patch(None, &literal).unwrap();
    assert_eq!(patched, DEFAULT_TEMPLATE);
}

#[test]
fn header_without_declaration_is_mismatch() {
    let header = "#include <cstdint>\nint direction_sequence[] = {1, 2};\n";
    let literal = compile(&["rotate"]).literal;
    assert!(matches!(
        patch(Some(header), &literal),
        Err(PatchError::Mismatch { .. })
    ));
}
